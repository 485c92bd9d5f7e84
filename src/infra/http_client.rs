use crate::app::ports::CatalogPort;
use crate::common::error::{Result, SwipeError};
use crate::config::ApiConfig;
use crate::domain::{Character, CharacterId, Page, PageCursor, SearchFilters};
use crate::observability::metrics::{FetchKind, SessionMetrics};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Listing envelope returned by the collection endpoint.
#[derive(Debug, Deserialize)]
struct ListingResponse {
    info: ListingInfo,
    #[serde(default)]
    results: Vec<Character>,
}

#[derive(Debug, Deserialize)]
struct ListingInfo {
    next: Option<String>,
}

/// Decodes a listing response. A 404 means zero matches and yields an empty page.
pub fn interpret_listing(status: u16, body: &[u8]) -> Result<Page> {
    if status == 404 {
        return Ok(Page::empty());
    }
    if !(200..300).contains(&status) {
        return Err(SwipeError::upstream(Some(status), body_excerpt(body)));
    }
    let listing: ListingResponse = serde_json::from_slice(body)
        .map_err(|e| SwipeError::upstream(Some(status), format!("undecodable listing: {}", e)))?;
    Ok(Page {
        items: listing.results,
        next: listing.info.next.filter(|n| !n.is_empty()).map(PageCursor::new),
    })
}

/// Decodes a single-character response.
pub fn interpret_character(id: CharacterId, status: u16, body: &[u8]) -> Result<Character> {
    if status == 404 {
        return Err(SwipeError::NotFound(format!("character {}", id)));
    }
    if !(200..300).contains(&status) {
        return Err(SwipeError::upstream(Some(status), body_excerpt(body)));
    }
    serde_json::from_slice(body)
        .map_err(|e| SwipeError::upstream(Some(status), format!("undecodable character: {}", e)))
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}

/// reqwest-backed client for the character collection endpoint.
pub struct RestCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestCatalogClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET returning status and body; transport failures become `Upstream`.
    async fn get(&self, kind: FetchKind, request: reqwest::RequestBuilder) -> Result<(u16, Vec<u8>)> {
        let started = Instant::now();
        let outcome = async {
            let resp = request.send().await?;
            let status = resp.status().as_u16();
            let bytes = resp.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>((status, bytes))
        }
        .await;
        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok((status, bytes)) => {
                debug!(status, bytes = bytes.len(), elapsed, "Catalog response");
                SessionMetrics::record_fetch(kind, status, elapsed);
                Ok((status, bytes))
            }
            Err(e) => {
                warn!(error = %e, "Catalog request failed");
                SessionMetrics::record_fetch_failure(kind);
                Err(SwipeError::upstream(e.status().map(|s| s.as_u16()), e.to_string()))
            }
        }
    }
}

#[async_trait]
impl CatalogPort for RestCatalogClient {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn search(&self, filters: &SearchFilters) -> Result<Page> {
        let request = self.client.get(&self.base_url).query(&filters.query_pairs());
        let (status, body) = self.get(FetchKind::Search, request).await?;
        interpret_listing(status, &body)
    }

    #[instrument(skip(self, cursor), fields(cursor = %cursor.as_str()))]
    async fn fetch_page(&self, cursor: &PageCursor) -> Result<Page> {
        let request = self.client.get(cursor.as_str());
        let (status, body) = self.get(FetchKind::LoadMore, request).await?;
        interpret_listing(status, &body)
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: CharacterId) -> Result<Character> {
        let request = self.client.get(format!("{}/{}", self.base_url, id));
        let (status, body) = self.get(FetchKind::Detail, request).await?;
        interpret_character(id, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(next: Option<&str>) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "info": { "count": 826, "pages": 42, "next": next, "prev": null },
            "results": [
                { "id": 1, "name": "Rick Sanchez", "status": "Alive", "species": "Human",
                  "gender": "Male", "origin": { "name": "Earth (C-137)", "url": "" },
                  "location": { "name": "Citadel of Ricks", "url": "" },
                  "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
                  "episode": ["https://rickandmortyapi.com/api/episode/1"] },
                { "id": 2, "name": "Morty Smith", "status": "Alive", "species": "Human",
                  "gender": "Male", "origin": { "name": "unknown", "url": "" },
                  "location": { "name": "Citadel of Ricks", "url": "" },
                  "image": "https://rickandmortyapi.com/api/character/avatar/2.jpeg",
                  "episode": [] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn listing_with_next_page() {
        let page = interpret_listing(200, &listing(Some("https://rickandmortyapi.com/api/character?page=2"))).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(
            page.next.as_ref().map(PageCursor::as_str),
            Some("https://rickandmortyapi.com/api/character?page=2")
        );
    }

    #[test]
    fn last_listing_page_has_no_cursor() {
        let page = interpret_listing(200, &listing(None)).unwrap();
        assert!(page.next.is_none());
    }

    #[test]
    fn listing_404_is_an_empty_page() {
        let page = interpret_listing(404, br#"{"error":"There is nothing here"}"#).unwrap();
        assert_eq!(page, Page::empty());
    }

    #[test]
    fn listing_server_error_is_upstream() {
        let err = interpret_listing(500, b"boom").unwrap_err();
        assert!(matches!(err, SwipeError::Upstream { status: Some(500), .. }));
    }

    #[test]
    fn undecodable_listing_is_upstream() {
        let err = interpret_listing(200, b"<html>").unwrap_err();
        assert!(matches!(err, SwipeError::Upstream { status: Some(200), .. }));
    }

    #[test]
    fn character_lookup_statuses() {
        let body = serde_json::to_vec(&json!({ "id": 5, "name": "Jerry Smith", "status": "Alive" })).unwrap();
        assert_eq!(interpret_character(5, 200, &body).unwrap().name, "Jerry Smith");
        assert!(matches!(
            interpret_character(5000, 404, b"{}").unwrap_err(),
            SwipeError::NotFound(_)
        ));
        assert!(matches!(
            interpret_character(5, 503, b"").unwrap_err(),
            SwipeError::Upstream { status: Some(503), .. }
        ));
    }

    #[test]
    fn base_url_is_normalised() {
        let config = ApiConfig {
            base_url: "https://example.test/api/character/".to_string(),
            ..ApiConfig::default()
        };
        let client = RestCatalogClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "https://example.test/api/character");
    }
}
