//! Intercepted requests and single-consumption responses.
//!
//! A [`Response`] owns its body and is not `Clone`: reading the body moves
//! the response. Code that both returns a response and persists it must
//! split it first with [`Response::tee`].

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use swkit_core::{RequestKey, StoredResponse};
use url::Url;

use super::url::canonicalize_url;

/// A request issued by a controlled page.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), body: Bytes::new() }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Page navigation: a GET that accepts HTML.
    pub fn navigate(url: Url) -> Self {
        Self::get(url).with_header(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        )
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Whether the Accept header asks for HTML.
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/html"))
    }

    /// Normalized identity used to key stored responses.
    pub fn cache_key(&self) -> RequestKey {
        let url = canonicalize_url(self.url.clone())
            .map(String::from)
            .unwrap_or_else(|_| self.url.to_string());
        RequestKey::new(self.method.as_str(), &url)
    }
}

/// Response body. Readable once, by value.
#[derive(Debug)]
pub struct Body(Bytes);

impl Body {
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A response headed for a page, a store, or both.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Option<Url>,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self { status, headers, url: None, body: Body(body.into()) }
    }

    /// Synthesized `503` carrying a plain-text offline message.
    pub fn offline(message: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        Self::new(StatusCode::SERVICE_UNAVAILABLE, headers, message.to_string())
    }

    /// Rebuild a response from a stored snapshot. Header pairs that are no
    /// longer valid header names or values are dropped.
    pub fn from_stored(stored: StoredResponse) -> Self {
        let status = StatusCode::from_u16(stored.status).unwrap_or(StatusCode::OK);
        let mut headers = HeaderMap::new();
        for (name, value) in &stored.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                headers.append(name, value);
            }
        }
        Self::new(status, headers, stored.body)
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// 2xx status; only these are written to a store.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Duplicate the response so two consumers can each read the body.
    pub fn tee(self) -> (Response, Response) {
        let bytes = self.body.into_bytes();
        let copy = Response {
            status: self.status,
            headers: self.headers.clone(),
            url: self.url.clone(),
            body: Body(bytes.clone()),
        };
        (Response { status: self.status, headers: self.headers, url: self.url, body: Body(bytes) }, copy)
    }

    /// Consume the response, returning the body.
    pub fn bytes(self) -> Bytes {
        self.body.into_bytes()
    }

    /// Consume the response, decoding the body as UTF-8 (lossy).
    pub fn text(self) -> String {
        String::from_utf8_lossy(&self.body.into_bytes()).into_owned()
    }

    /// Consume the response into a storable snapshot.
    pub fn into_stored(self) -> StoredResponse {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();
        StoredResponse::new(self.status.as_u16(), headers, self.body.into_bytes().to_vec())
    }
}
