//! Detail page enrichment
//!
//! The catalog page truncates long credit lists. The detail page carries the
//! full director and cast in its `.attrs` blocks: the first block is the
//! director, the third (when present) is the cast.

use crate::crawler::fetcher::fetch_url;
use crate::crawler::fields::first_line;
use crate::crawler::parser::{element_text, selector};
use crate::crawler::throttle::RateLimiter;
use crate::record::Credits;
use crate::url::resolve_link;
use crate::{ExtractError, FetchError};
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Position of the cast among the `.attrs` blocks
const CAST_BLOCK: usize = 2;

/// Why a record kept its catalog credits
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Detail link {link:?} cannot be fetched")]
    InvalidLink { link: String },

    #[error("Detail page {url} has no {field} block")]
    MissingField { url: String, field: &'static str },
}

/// Re-derives director and cast from detail pages
pub struct DetailEnricher {
    attrs: Selector,
}

impl DetailEnricher {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            attrs: selector(".attrs")?,
        })
    }

    /// Fetches a detail page and reads its credits
    ///
    /// Waits one rate-limiter pause before the request. `link` is resolved
    /// against the catalog page it came from.
    pub async fn enrich(
        &self,
        client: &Client,
        link: &str,
        page_url: &Url,
        limiter: &mut RateLimiter,
    ) -> Result<Credits, EnrichError> {
        let url = resolve_link(link, page_url).ok_or_else(|| EnrichError::InvalidLink {
            link: link.to_string(),
        })?;

        limiter.pause().await;

        tracing::debug!("Fetching detail page {}", url);
        let markup = fetch_url(client, url.as_str()).await?;
        self.parse_detail(&markup, url.as_str())
    }

    /// Reads credits from detail page markup
    pub fn parse_detail(&self, markup: &str, url: &str) -> Result<Credits, EnrichError> {
        let document = Html::parse_document(markup);
        let blocks: Vec<String> = document
            .select(&self.attrs)
            .map(|block| first_line(&element_text(block)))
            .collect();

        let director = blocks
            .first()
            .cloned()
            .ok_or_else(|| EnrichError::MissingField {
                url: url.to_string(),
                field: "director",
            })?;

        // Some films list no cast at all
        let cast = blocks.get(CAST_BLOCK).cloned().unwrap_or_default();

        Ok(Credits { director, cast })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DETAIL: &str = r#"<html><body><div id="info">
        <span><span class="pl">导演</span>: <span class="attrs"><a href="/celebrity/1/">弗兰克·德拉邦特</a></span></span><br/>
        <span><span class="pl">编剧</span>: <span class="attrs"><a href="/celebrity/1/">弗兰克·德拉邦特</a> / <a href="/celebrity/2/">斯蒂芬·金</a></span></span><br/>
        <span class="actor"><span class="pl">主演</span>: <span class="attrs"><a href="/celebrity/3/">蒂姆·罗宾斯</a> / <a href="/celebrity/4/">摩根·弗里曼</a> / <a href="/celebrity/5/">鲍勃·冈顿</a></span></span><br/>
    </div></body></html>"#;

    #[test]
    fn test_parse_detail_with_cast() {
        let enricher = DetailEnricher::new().unwrap();
        let credits = enricher.parse_detail(DETAIL, "https://example.com/s/1/").unwrap();

        assert_eq!(credits.director, "弗兰克·德拉邦特");
        assert_eq!(credits.cast, "蒂姆·罗宾斯 / 摩根·弗里曼 / 鲍勃·冈顿");
    }

    #[test]
    fn test_parse_detail_without_cast() {
        let markup = r#"<div id="info">
            <span><span class="pl">导演</span>: <span class="attrs"><a>郭柯</a></span></span><br/>
            <span><span class="pl">编剧</span>: <span class="attrs"><a>郭柯</a></span></span><br/>
        </div>"#;
        let enricher = DetailEnricher::new().unwrap();
        let credits = enricher.parse_detail(markup, "https://example.com/s/2/").unwrap();

        assert_eq!(credits.director, "郭柯");
        assert_eq!(credits.cast, "");
    }

    #[test]
    fn test_parse_detail_without_blocks() {
        let enricher = DetailEnricher::new().unwrap();
        let result = enricher.parse_detail("<html><body>blocked</body></html>", "u");

        assert!(matches!(
            result,
            Err(EnrichError::MissingField { field: "director", .. })
        ));
    }

    #[tokio::test]
    async fn test_enrich_pauses_then_fetches() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subject/1292052/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL))
            .expect(1)
            .mount(&mock_server)
            .await;

        let page_url = Url::parse(&format!("{}/top250?start=0&filter=", mock_server.uri())).unwrap();
        let client = Client::new();
        let mut limiter = RateLimiter::new(Duration::from_millis(1));
        let enricher = DetailEnricher::new().unwrap();

        let credits = enricher
            .enrich(&client, "/subject/1292052/", &page_url, &mut limiter)
            .await
            .unwrap();

        assert_eq!(credits.director, "弗兰克·德拉邦特");
        assert_eq!(limiter.pauses_taken(), 1);
    }

    #[tokio::test]
    async fn test_enrich_fetch_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let page_url = Url::parse(&mock_server.uri()).unwrap();
        let mut limiter = RateLimiter::new(Duration::from_millis(1));
        let enricher = DetailEnricher::new().unwrap();

        let result = enricher
            .enrich(&Client::new(), "/subject/404/", &page_url, &mut limiter)
            .await;

        assert!(matches!(
            result,
            Err(EnrichError::Fetch(FetchError::Status { status: 404, .. }))
        ));
    }
}
