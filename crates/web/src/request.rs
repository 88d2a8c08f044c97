//! The request side of the facade handed to every chain entry.

use std::collections::HashMap;

use http::{HeaderMap, HeaderValue, Method, Uri, Version};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::body::RawBody;
use crate::params::PathParams;

/// Value of one query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    /// The key was repeated; values are kept in the order they appeared.
    Multiple(Vec<String>),
}

impl QueryValue {
    /// The value, or the first value of a repeated key.
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(value) => value,
            QueryValue::Multiple(values) => values.first().map(String::as_str).unwrap_or_default(),
        }
    }

    /// Every value of the key, in order.
    pub fn all(&self) -> Vec<&str> {
        match self {
            QueryValue::Single(value) => vec![value.as_str()],
            QueryValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => *self = QueryValue::Multiple(vec![std::mem::take(first), value]),
            QueryValue::Multiple(values) => values.push(value),
        }
    }
}

pub type QueryMap = HashMap<String, QueryValue>;

/// Decodes `key=value&key=value` pairs, collapsing repeated keys.
///
/// A query string that cannot be decoded yields an empty map.
pub(crate) fn parse_query(query: Option<&str>) -> QueryMap {
    let Some(query) = query.filter(|query| !query.is_empty()) else {
        return QueryMap::new();
    };

    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(e) => {
            debug!(query, cause = %e, "undecodable query string");
            return QueryMap::new();
        }
    };

    let mut map = QueryMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                map.insert(key, QueryValue::Single(value));
            }
        }
    }
    map
}

/// Per-request view of an inbound request.
///
/// Built by the dispatcher once a route matched and dropped when the chain
/// returns. Middleware may change it; later entries see those changes.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    query: QueryMap,
    params: PathParams,
    body: Option<Value>,
    raw_body: Option<RawBody>,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, params: PathParams, raw_body: RawBody) -> Self {
        let query = parse_query(parts.uri.query());
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            query,
            params,
            body: None,
            raw_body: Some(raw_body),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path of the request target, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn query(&self) -> &QueryMap {
        &self.query
    }

    /// Deserializes the raw query string into `T`, supporting nested keys such as `user[name]=x`.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, serde_qs::Error> {
        serde_qs::from_str(self.uri.query().unwrap_or_default())
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// The decoded body, present once a body decoder ran and succeeded.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Deserializes the decoded body into `T`, `None` when no body was decoded.
    pub fn body_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.body.as_ref().map(|body| T::deserialize(body))
    }

    /// Takes the raw body out of the request. Only the first caller gets it.
    pub fn take_raw_body(&mut self) -> Option<RawBody> {
        self.raw_body.take()
    }

    #[cfg(test)]
    pub(crate) fn for_test(uri: &str) -> Self {
        let (parts, ()) = http::Request::builder().uri(uri).body(()).unwrap().into_parts();
        Self::new(parts, PathParams::empty(), RawBody::empty())
    }
}
