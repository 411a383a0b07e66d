use crate::{count::normalize, utils, Extractor, Platform};
use lazy_regex::regex;
use scraper::Html;

#[derive(Debug, Clone)]
pub struct InstagramExtractor {
    pub base_url: String,
}

impl Extractor for InstagramExtractor {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn candidate_urls(&self, identifier: &str) -> Vec<String> {
        vec![format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            identifier
        )]
    }

    fn extract(&self, doc: &Html) -> Option<u64> {
        // Usually og:description: "1,004 Followers, 12 Following, 30 Posts - ..."
        utils::meta_contents(doc)
            .filter(|content| content.contains("Followers"))
            .find_map(followers_in)
            .or_else(|| {
                doc.select(&utils::TITLE)
                    .map(|title| title.text().collect::<String>())
                    .find_map(|title| followers_in(&title))
            })
    }
}

fn followers_in(text: &str) -> Option<u64> {
    regex!(r"(?i)([\d,.]+)([KMB]?)\s*Followers")
        .captures_iter(text)
        .find_map(|caps| normalize(format!("{}{}", &caps[1], &caps[2])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn extractor() -> InstagramExtractor {
        InstagramExtractor {
            base_url: "https://www.instagram.com/".to_string(),
        }
    }

    fn load(name: &str) -> Html {
        let html = fs::read_to_string(format!("tests/htmls/{}", name)).expect("Invalid file url");
        Html::parse_document(&html)
    }

    #[test]
    fn test_candidate_url() {
        assert_eq!(
            extractor().candidate_urls("some.band"),
            vec!["https://www.instagram.com/some.band/".to_string()]
        );
    }

    #[test]
    fn test_meta_description() {
        let doc = load("instagram_profile.html");
        assert_eq!(extractor().extract(&doc), Some(1234));
    }

    #[test]
    fn test_title_fallback() {
        let doc = load("instagram_title.html");
        assert_eq!(extractor().extract(&doc), Some(2_500_000));
    }

    #[test]
    fn test_no_followers_anywhere() {
        let doc = load("instagram_login.html");
        assert_eq!(extractor().extract(&doc), None);
    }

    #[test]
    fn test_lowercase_in_meta_is_ignored() {
        // The meta pass keys on the capitalised word; the title has nothing either.
        let doc = Html::parse_document(
            r#"<html><head><title>x</title><meta property="og:description" content="10 followers"></head></html>"#,
        );
        assert_eq!(extractor().extract(&doc), None);
    }
}
