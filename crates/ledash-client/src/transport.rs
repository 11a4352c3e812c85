//! Blocking JSON-over-HTTP plumbing shared by the driver and datastore
//! bindings.
//!
//! Every request is sent with `Cache-Control: no-store`. A non-2xx response
//! becomes [`ClientError::Status`] carrying the status code and body text.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    fn method(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    pub(crate) fn new(
        base_url: &str,
        timeout: Option<Duration>,
        mut headers: HeaderMap,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::config("base URL cannot be empty"));
        }

        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Setup)?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a request; `path` includes any query string.
    pub(crate) fn request(&self, verb: Verb, path: &str) -> RequestBuilder {
        self.client.request(verb.method(), format!("{}{path}", self.base_url))
    }

    pub(crate) fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.dispatch(Verb::Get, path, self.request(Verb::Get, path))
    }

    pub(crate) fn send<B: Serialize + ?Sized>(
        &self,
        verb: Verb,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>> {
        self.dispatch(verb, path, self.request(verb, path).json(body))
    }

    pub(crate) fn dispatch(
        &self,
        verb: Verb,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Vec<u8>> {
        let network = |source| ClientError::Network {
            method: verb.as_str(),
            path: path.to_string(),
            source,
        };

        let response = request.send().map_err(network)?;
        let status = response.status();
        let body = response.bytes().map_err(network)?;
        debug!(
            method = verb.as_str(),
            path,
            status = status.as_u16(),
            bytes = body.len(),
            "request completed"
        );

        if !status.is_success() {
            return Err(ClientError::Status {
                method: verb.as_str(),
                path: path.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}
