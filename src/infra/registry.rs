//! Usage: Server registry API client (search, view/download counters).

use std::time::Duration;

use serde::Deserialize;

/// Search is interactive; cap it hard instead of letting a slow backend hang
/// the browse page.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
const STATS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryServer {
    pub id: i64,
    pub name: String,
    pub developer: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub github_stars: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerPage {
    pub servers: Vec<RegistryServer>,
    pub has_next: bool,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct ServerQuery {
    pub page: u32,
    pub page_size: u32,
    pub category_id: Option<String>,
    pub search: String,
    pub sort: String,
    pub direction: String,
    pub developer: Option<String>,
}

impl Default for ServerQuery {
    fn default() -> Self {
        ServerQuery {
            page: 1,
            page_size: 10,
            category_id: None,
            search: String::new(),
            sort: "github_stars".to_string(),
            direction: "desc".to_string(),
            developer: None,
        }
    }
}

fn build_search_url(base_url: &str, query: &ServerQuery) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(&format!("{base_url}/servers/"))
        .map_err(|e| format!("SEC_INVALID_INPUT: invalid base_url={base_url}: {e}"))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("page", &query.page.to_string());
        pairs.append_pair("page_size", &query.page_size.to_string());
        // Null and empty values are omitted, not sent as empty strings.
        if let Some(category) = query.category_id.as_deref().filter(|v| !v.is_empty()) {
            pairs.append_pair("category_id", category);
        }
        if !query.search.trim().is_empty() {
            pairs.append_pair("search", query.search.trim());
        }
        pairs.append_pair("sort", &query.sort);
        pairs.append_pair("direction", &query.direction);
        if let Some(developer) = query.developer.as_deref().filter(|v| !v.is_empty()) {
            pairs.append_pair("developer", developer);
        }
    }

    Ok(url)
}

pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> Self {
        RegistryClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search the public registry. Failures (timeout included) degrade to an
    /// empty page so browsing keeps working without the backend.
    pub async fn fetch_servers(&self, query: &ServerQuery) -> ServerPage {
        match self.try_fetch_servers(query).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!("server search failed, returning empty page: {err}");
                ServerPage::default()
            }
        }
    }

    async fn try_fetch_servers(&self, query: &ServerQuery) -> Result<ServerPage, String> {
        let url = build_search_url(&self.base_url, query)?;

        let response = self
            .http
            .get(url)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("API_ERROR: {e}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "API_ERROR: server search returned {}",
                response.status()
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("API_ERROR: {e}"))?;
        serde_json::from_slice(&bytes).map_err(|e| format!("API_ERROR: invalid search response: {e}"))
    }

    pub async fn increment_views(&self, server_id: i64) {
        self.update_server_stats("views", server_id).await;
    }

    pub async fn increment_downloads(&self, server_id: i64) {
        self.update_server_stats("downloads", server_id).await;
    }

    /// Counters are best-effort telemetry; a failure is logged and forgotten.
    async fn update_server_stats(&self, stat: &str, server_id: i64) {
        let url = format!("{}/servers/{server_id}/{stat}", self.base_url);
        let result = self
            .http
            .post(&url)
            .timeout(STATS_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        if let Err(err) = result {
            tracing::warn!(server_id, stat, "failed to update server stats: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_omits_null_and_empty_params() {
        let query = ServerQuery {
            search: "  ".to_string(),
            category_id: Some(String::new()),
            ..ServerQuery::default()
        };
        let url = build_search_url("https://api.example.com", &query).expect("url");
        let query_string = url.query().expect("query");
        assert!(!query_string.contains("search="), "{query_string}");
        assert!(!query_string.contains("category_id="), "{query_string}");
        assert!(query_string.contains("page=1"), "{query_string}");
        assert!(query_string.contains("sort=github_stars"), "{query_string}");
    }

    #[test]
    fn search_url_carries_filters_when_set() {
        let query = ServerQuery {
            page: 3,
            search: "sqlite".to_string(),
            category_id: Some("database".to_string()),
            developer: Some("modelcontextprotocol".to_string()),
            ..ServerQuery::default()
        };
        let url = build_search_url("https://api.example.com", &query).expect("url");
        let query_string = url.query().expect("query");
        assert!(query_string.contains("page=3"), "{query_string}");
        assert!(query_string.contains("search=sqlite"), "{query_string}");
        assert!(query_string.contains("category_id=database"), "{query_string}");
        assert!(
            query_string.contains("developer=modelcontextprotocol"),
            "{query_string}"
        );
    }

    #[test]
    fn page_deserializes_with_missing_fields() {
        let page: ServerPage = serde_json::from_str(r#"{"servers": [{"id": 7, "name": "fetch"}]}"#)
            .expect("page");
        assert_eq!(page.servers.len(), 1);
        assert_eq!(page.servers[0].id, 7);
        assert!(!page.has_next);
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn unreachable_backend_degrades_to_empty_page() {
        // Reserved TEST-NET address: connection fails fast, nothing listens.
        let client = RegistryClient::new("http://192.0.2.1:9");
        let page = client.fetch_servers(&ServerQuery::default()).await;
        assert!(page.servers.is_empty());
        assert!(!page.has_next);
    }
}
