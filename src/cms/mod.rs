//! Client for the headless-CMS matrices collection.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FetchFailed, MatrixError};
use crate::matrix::MatrixAttributes;

pub const DEFAULT_API_URL: &str = "http://localhost:1338/api/matrices?populate=*";

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MatrixRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub attributes: MatrixAttributes,
}

impl MatrixRecord {
    pub fn title(&self) -> String {
        self.attributes.title()
    }
}

#[derive(Debug, Deserialize)]
struct MatrixCollection {
    #[serde(default)]
    data: Option<Vec<MatrixRecord>>,
}

/// Decodes a collection document (`{"data": [...], "meta": {...}}`). A missing
/// or null `data` is an empty collection.
pub fn decode_collection(text: &str) -> Result<Vec<MatrixRecord>, serde_json::Error> {
    let collection: MatrixCollection = serde_json::from_str(text)?;
    Ok(collection.data.unwrap_or_default())
}

/// Reads a collection document from disk instead of the API.
pub async fn load_collection_file(path: &str) -> Result<Vec<MatrixRecord>, MatrixError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MatrixError::Read {
            path: path.to_string(),
            source: e,
        })?;
    decode_collection(&text).map_err(|e| MatrixError::Decode { source: e })
}

/// Origin of `api_url` (scheme, host and port), used as the default base for
/// relative media paths.
pub fn media_base_from_api(api_url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(api_url).ok()?;
    if !parsed.has_host() {
        return None;
    }
    Some(parsed.origin().ascii_serialization())
}

pub fn absolute_media_url(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    if relative.starts_with('/') {
        format!("{base}{relative}")
    } else {
        format!("{base}/{relative}")
    }
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub api_url: String,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CmsClient {
    client: reqwest::Client,
    api_url: String,
}

impl CmsClient {
    pub fn new(options: ClientOptions) -> Result<Self, MatrixError> {
        if reqwest::Url::parse(&options.api_url).is_err() {
            return Err(MatrixError::InvalidUrl {
                url: options.api_url,
            });
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let timeout = Duration::from_secs(options.timeout_seconds.try_into().unwrap_or(10));
        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("matrixview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout);

        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| MatrixError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| MatrixError::HttpClientBuild { source: e })?;
        Ok(Self {
            client,
            api_url: options.api_url,
        })
    }

    /// One GET of the collection. Every failure becomes [`FetchFailed`].
    pub async fn fetch_matrices(&self) -> Result<Vec<MatrixRecord>, FetchFailed> {
        let failed = |reason: String| {
            warn!(url = %self.api_url, %reason, "error fetching matrix data");
            FetchFailed {
                url: self.api_url.clone(),
                reason,
            }
        };

        let resp = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(failed(format!("unexpected status {status}")));
        }

        let body = resp.text().await.map_err(|e| failed(e.to_string()))?;
        let records = decode_collection(&body).map_err(|e| failed(e.to_string()))?;
        debug!(url = %self.api_url, count = records.len(), "fetched matrices");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_handles_null_and_missing_data() {
        assert!(decode_collection(r#"{"data": null}"#).unwrap().is_empty());
        assert!(decode_collection(r#"{"meta": {}}"#).unwrap().is_empty());
        assert!(decode_collection("not json").is_err());
    }

    #[test]
    fn decode_reads_records() {
        let records = decode_collection(
            r#"{"data":[{"id":7,"attributes":{"Title_Matrix":"Kitchen","Total_Price":1200}}],"meta":{}}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].title(), "Kitchen");
        assert_eq!(records[0].attributes.total_price(), 1200.0);
    }

    #[test]
    fn media_base_is_api_origin() {
        assert_eq!(
            media_base_from_api("http://localhost:1338/api/matrices?populate=*"),
            Some("http://localhost:1338".to_string())
        );
        assert_eq!(media_base_from_api("not a url"), None);
        assert_eq!(
            absolute_media_url("http://localhost:1338/", "/uploads/a.png"),
            "http://localhost:1338/uploads/a.png"
        );
    }

    #[test]
    fn client_rejects_invalid_url() {
        let err = CmsClient::new(ClientOptions {
            api_url: "::nope".to_string(),
            ..ClientOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, MatrixError::InvalidUrl { .. }));
    }
}
