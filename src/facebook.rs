use crate::{count::normalize, utils, Extractor, Platform};
use lazy_regex::regex;
use scraper::Html;

/// Public page markup on Facebook shifts often, so this extractor tries
/// several page variants and, on each, meta tags before visible text.
///
/// Zero is never accepted: pages render a placeholder `0` before the client
/// side script fills in the real number.
#[derive(Debug, Clone)]
pub struct FacebookExtractor {
    pub base_urls: Vec<String>,
}

impl Extractor for FacebookExtractor {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    fn candidate_urls(&self, identifier: &str) -> Vec<String> {
        self.base_urls
            .iter()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), identifier))
            .collect()
    }

    fn extract(&self, doc: &Html) -> Option<u64> {
        meta_count(doc).or_else(|| text_count(&utils::visible_text(doc)))
    }
}

fn meta_count(doc: &Html) -> Option<u64> {
    utils::meta_contents(doc)
        .filter(|content| {
            regex!(r"(?i)followers|likes|people follow|people like this").is_match(content)
        })
        .flat_map(|content| {
            regex!(r"(?i)([\d,.]+)([KMB]?)\s*(?:followers|likes|people follow|people like this)")
                .captures_iter(content)
        })
        .filter_map(|caps| normalize(format!("{}{}", &caps[1], &caps[2])))
        .find(|n| *n > 0)
}

fn text_count(text: &str) -> Option<u64> {
    [
        regex!(r"(?i)([\d,.]+)([KMB]?)\s+people follow"),
        regex!(r"(?i)([\d,.]+)([KMB]?)\s+followers"),
        regex!(r"(?i)([\d,.]+)([KMB]?)\s+likes"),
    ]
    .into_iter()
    .find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| normalize(format!("{}{}", &caps[1], &caps[2])))
            .find(|n| *n > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn extractor() -> FacebookExtractor {
        FacebookExtractor {
            base_urls: vec![
                "https://m.facebook.com".to_string(),
                "https://www.facebook.com/".to_string(),
            ],
        }
    }

    fn load(name: &str) -> Html {
        let html = fs::read_to_string(format!("tests/htmls/{}", name)).expect("Invalid file url");
        Html::parse_document(&html)
    }

    #[test]
    fn test_candidate_urls_in_order() {
        assert_eq!(
            extractor().candidate_urls("123456"),
            vec![
                "https://m.facebook.com/123456".to_string(),
                "https://www.facebook.com/123456".to_string(),
            ]
        );
    }

    #[test]
    fn test_meta_likes() {
        let doc = load("facebook_meta.html");
        assert_eq!(extractor().extract(&doc), Some(12_000));
    }

    #[test]
    fn test_zero_meta_falls_back_to_text() {
        let doc = load("facebook_zero_meta.html");
        assert_eq!(extractor().extract(&doc), Some(2000));
    }

    #[test]
    fn test_people_follow_text() {
        let doc = load("facebook_text.html");
        assert_eq!(extractor().extract(&doc), Some(5600));
    }

    #[test]
    fn test_text_patterns_in_priority_order() {
        assert_eq!(text_count("300 likes and 1.1K followers"), Some(1100));
        assert_eq!(text_count("9 followers, 4 people follow this"), Some(4));
        assert_eq!(text_count("0 people follow this 0 followers 15 likes"), Some(15));
        assert_eq!(text_count("nothing to see"), None);
    }

    #[test]
    fn test_people_like_this_meta() {
        let doc = Html::parse_document(
            r#"<html><head><meta name="description" content="Local venue. 3,210 people like this."></head><body></body></html>"#,
        );
        assert_eq!(extractor().extract(&doc), Some(3210));
    }
}
