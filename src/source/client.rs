//! Cloud Storage JSON API client.
//!
//! Credentials are obtained elsewhere; the client only attaches an optional
//! bearer token to each request.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use super::retry::with_backoff;
use super::{ObjectInfo, ObjectSource};
use crate::config::RetryPolicy;
use crate::error::RetrievalError;

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListedObject>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
    /// The API encodes sizes as decimal strings
    size: Option<String>,
}

pub struct BucketClient {
    client: Client,
    endpoint: Url,
    bucket: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl BucketClient {
    pub fn new(endpoint: &str, bucket: &str, token: Option<String>, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent("flight-ingest")
            .build()
            .context("Failed to create HTTP client")?;
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid endpoint: {}", endpoint))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("Endpoint cannot be used as a base URL: {}", endpoint);
        }

        Ok(Self {
            client,
            endpoint,
            bucket: bucket.to_string(),
            token,
            retry,
        })
    }

    /// `{endpoint}/storage/v1/b/{bucket}/o[/{object}]`
    fn objects_url(&self, object: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "b", self.bucket.as_str(), "o"]);
            if let Some(name) = object {
                segments.push(name);
            }
        }
        url
    }

    fn get(&self, url: Url, object: &str) -> Result<Response, RetrievalError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| RetrievalError::Unreachable {
            object: object.to_string(),
            message: e.to_string(),
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(RetrievalError::NotFound(object.to_string())),
            status => Err(RetrievalError::Status {
                object: object.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    fn list_page(&self, page_token: Option<&str>) -> Result<ListResponse, RetrievalError> {
        let mut url = self.objects_url(None);
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }

        let listing = format!("listing of {}", self.bucket);
        let text = self
            .get(url, &listing)?
            .text()
            .map_err(|e| RetrievalError::Unreachable {
                object: listing.clone(),
                message: e.to_string(),
            })?;

        serde_json::from_str(&text).map_err(|e| RetrievalError::InvalidResponse {
            object: listing,
            message: e.to_string(),
        })
    }
}

impl ObjectSource for BucketClient {
    fn describe(&self) -> String {
        format!("bucket {} at {}", self.bucket, self.endpoint)
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>, RetrievalError> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = with_backoff(self.retry, "list", || self.list_page(page_token.as_deref()))?;
            debug!(count = page.items.len(), "listed page");

            objects.extend(page.items.into_iter().map(|item| ObjectInfo {
                size: item.size.and_then(|s| s.parse().ok()),
                name: item.name,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(bucket = %self.bucket, count = objects.len(), "listed bucket");
        Ok(objects)
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        let mut url = self.objects_url(Some(name));
        url.query_pairs_mut().append_pair("alt", "media");

        with_backoff(self.retry, name, || {
            let response = self.get(url.clone(), name)?;
            response
                .bytes()
                .map(|body| body.to_vec())
                .map_err(|e| RetrievalError::Unreachable {
                    object: name.to_string(),
                    message: e.to_string(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> BucketClient {
        BucketClient::new(endpoint, "flight-data", None, RetryPolicy::none()).unwrap()
    }

    #[test]
    fn test_listing_url() {
        let url = client("https://storage.googleapis.com").objects_url(None);
        assert_eq!(url.as_str(), "https://storage.googleapis.com/storage/v1/b/flight-data/o");
    }

    #[test]
    fn test_object_names_are_escaped() {
        let url = client("http://localhost:4443/").objects_url(Some("flights/2023/07/flight_data.json"));
        assert_eq!(
            url.as_str(),
            "http://localhost:4443/storage/v1/b/flight-data/o/flights%2F2023%2F07%2Fflight_data.json"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(BucketClient::new("not a url", "b", None, RetryPolicy::none()).is_err());
        assert!(BucketClient::new("mailto:ops@example.com", "b", None, RetryPolicy::none()).is_err());
    }

    #[test]
    fn test_list_response_shape() {
        let page: ListResponse = serde_json::from_str(
            r#"{"kind": "storage#objects", "nextPageToken": "abc", "items": [{"name": "tickets.csv", "size": "120"}]}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].size.as_deref(), Some("120"));
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let empty: ListResponse = serde_json::from_str(r#"{"kind": "storage#objects"}"#).unwrap();
        assert!(empty.items.is_empty());
    }
}
