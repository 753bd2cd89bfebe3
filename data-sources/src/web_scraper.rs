//! Wiki scraper for lore and game-mechanics pages.
//!
//! Fetches a small fixed set of wiki pages and reduces the HTML to plain
//! text with regex passes (drop script/style blocks, strip tags, collapse
//! whitespace). Good enough for indexing prose pages; no DOM fidelity needed.

use std::time::Duration;

use regex::Regex;
use tracing::{info, warn};

use crate::document::{DocMetadata, Document};
use crate::errors::{CollectorError, Result};

/// Cap on extracted text per page, characters.
const MAX_PAGE_CHARS: usize = 8000;

/// Collects lore and mechanics pages from the community wiki.
#[derive(Clone, Debug)]
pub struct WebScraperCollector {
    http: reqwest::Client,
    base_url: String,
}

impl WebScraperCollector {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        "WebScraper"
    }

    /// Scrape the configured pages. A single page failure is logged and
    /// skipped; the call fails only if the page list itself produced nothing
    /// because of transport errors.
    pub async fn collect(&self) -> Result<Vec<Document>> {
        let pages = [
            (format!("{}/wiki/Game_Mechanics", self.base_url), "game_mechanics"),
            (format!("{}/wiki/Lore", self.base_url), "lore"),
        ];

        let mut documents = Vec::new();
        let mut last_err: Option<CollectorError> = None;

        for (url, doc_type) in pages {
            match self.scrape_page(&url, doc_type).await {
                Ok(Some(doc)) => documents.push(doc),
                Ok(None) => warn!("Page {url} yielded no usable text"),
                Err(e) => {
                    warn!("Failed to scrape {url}: {e}");
                    last_err = Some(e);
                }
            }
        }

        if documents.is_empty() {
            if let Some(e) = last_err {
                return Err(e);
            }
        }

        info!("Collected {} web documents", documents.len());
        Ok(documents)
    }

    async fn scrape_page(&self, url: &str, doc_type: &str) -> Result<Option<Document>> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(CollectorError::HttpStatus {
                status: resp.status(),
                url: url.to_string(),
            });
        }

        let html = resp.text().await?;
        let text = html_to_text(&html);
        if text.len() < 100 {
            return Ok(None);
        }

        let mut text = text;
        if text.len() > MAX_PAGE_CHARS {
            let cut = floor_char_boundary(&text, MAX_PAGE_CHARS);
            text.truncate(cut);
        }

        Ok(Some(Document::new(
            text,
            DocMetadata {
                doc_type: doc_type.into(),
                source: "web_scraper".into(),
                ..Default::default()
            },
        )))
    }
}

/// Reduce an HTML page to whitespace-normalized plain text.
fn html_to_text(html: &str) -> String {
    // Unwraps are safe: the patterns are static and known-valid.
    let script = Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
        .unwrap();
    let tags = Regex::new(r"(?s)<[^>]+>").unwrap();
    let spaces = Regex::new(r"[ \t\x0b\r]+").unwrap();
    let blank_lines = Regex::new(r"\n{3,}").unwrap();

    let no_script = script.replace_all(html, " ");
    let no_tags = tags.replace_all(&no_script, "\n");
    let decoded = no_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let squeezed = spaces.replace_all(&decoded, " ");

    let lines: Vec<&str> = squeezed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let joined = lines.join("\n");
    blank_lines.replace_all(&joined, "\n\n").into_owned()
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_scripts() {
        let html = "<html><head><style>p {color:red}</style></head>\
                    <body><h1>Lore</h1><script>var x=1;</script>\
                    <p>Runeterra is a world of magic.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Lore"));
        assert!(text.contains("Runeterra is a world of magic."));
        assert!(!text.contains("color:red"));
        assert!(!text.contains("var x=1"));
    }

    #[test]
    fn decodes_common_entities() {
        let text = html_to_text("<p>Q &amp; A&nbsp;session</p>");
        assert_eq!(text, "Q & A session");
    }
}
