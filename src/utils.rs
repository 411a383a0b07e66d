use chrono::{DateTime, FixedOffset, NaiveDate};
use itertools::Itertools;
use lazy_static::lazy_static;
use scraper::{Html, Node, Selector};
use sqlx::SqlitePool;

const E: &str = "Invalid selector";
lazy_static! {
    pub(crate) static ref META: Selector = Selector::parse("meta").expect(E);
    pub(crate) static ref TITLE: Selector = Selector::parse("title").expect(E);
}

pub(crate) async fn is_table_exists(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<bool, sqlx::Error> {
    Ok(
        sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?
            .is_some(),
    )
}

pub(crate) fn get_now() -> DateTime<FixedOffset> {
    chrono::offset::Local::now().into()
}

pub fn today() -> NaiveDate {
    chrono::offset::Local::now().date_naive()
}

/// `content` attributes of every `<meta>` tag, in document order.
pub(crate) fn meta_contents(doc: &Html) -> impl Iterator<Item = &str> {
    doc.select(&META)
        .filter_map(|el| el.value().attr("content"))
}

/// Text a reader would see: every text node outside `<script>`, `<style>`
/// and `<noscript>`, whitespace-trimmed and joined with single spaces.
pub(crate) fn visible_text(doc: &Html) -> String {
    doc.root_element()
        .descendants()
        .filter(|node| {
            !matches!(
                node.parent().map(|p| p.value()),
                Some(Node::Element(el)) if matches!(el.name(), "script" | "style" | "noscript")
            )
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .join(" ")
}
