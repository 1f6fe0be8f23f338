//! Usage: HTTP adapter for cloud-stored user server configs.

use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::mcp::{CloudServerEntry, CloudStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Lets the backend reject uploads made with a different key than the one the
/// stored blobs were encrypted with, without ever seeing the key itself.
const FINGERPRINT_HEADER: &str = "x-encryption-key-fingerprint";

pub fn key_fingerprint(encryption_key: &str) -> String {
    let digest = Sha256::digest(encryption_key.trim().as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

pub struct CloudApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
    key_fingerprint: String,
}

impl CloudApiClient {
    pub fn new(base_url: &str, auth_token: &str, encryption_key: &str) -> Self {
        CloudApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
            key_fingerprint: key_fingerprint(encryption_key),
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.auth_token)
            .header(FINGERPRINT_HEADER, &self.key_fingerprint)
    }

    fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response, String> {
        let status = response.status();
        if !status.is_success() {
            return Err(format!("API_ERROR: {what} returned {status}"));
        }
        Ok(response)
    }
}

impl CloudStore for CloudApiClient {
    async fn list(&self) -> Result<Vec<CloudServerEntry>, String> {
        let url = format!("{}/user-server-configs", self.base_url);
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| format!("API_ERROR: {e}"))?;
        let response = Self::check_status(response, "cloud config list")?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("API_ERROR: {e}"))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| format!("API_ERROR: invalid cloud config response: {e}"))
    }

    async fn upsert(&self, entries: &[CloudServerEntry]) -> Result<u32, String> {
        let url = format!("{}/user-server-configs", self.base_url);
        let body = serde_json::to_vec(entries)
            .map_err(|e| format!("API_ERROR: failed to serialize cloud configs: {e}"))?;

        let response = self
            .request(reqwest::Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| format!("API_ERROR: {e}"))?;
        Self::check_status(response, "cloud config upload")?;

        Ok(entries.len() as u32)
    }

    async fn delete(&self, id: i64) -> Result<(), String> {
        let url = format!("{}/user-server-configs/{id}", self.base_url);
        let response = self
            .request(reqwest::Method::DELETE, url)
            .send()
            .await
            .map_err(|e| format!("API_ERROR: {e}"))?;
        Self::check_status(response, "cloud config delete")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_hex_sha256_shaped() {
        let fp = key_fingerprint("test-key");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_deterministic_and_key_sensitive() {
        assert_eq!(key_fingerprint("k1"), key_fingerprint("k1"));
        assert_ne!(key_fingerprint("k1"), key_fingerprint("k2"));
    }

    #[test]
    fn fingerprint_ignores_surrounding_whitespace() {
        assert_eq!(key_fingerprint(" k1 "), key_fingerprint("k1"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_api_error() {
        let client = CloudApiClient::new("http://192.0.2.1:9", "token", "key");
        let err = client.list().await.unwrap_err();
        assert!(err.starts_with("API_ERROR:"), "{err}");
    }
}
