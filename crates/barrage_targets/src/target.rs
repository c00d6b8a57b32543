use std::collections::btree_map::{self, BTreeMap};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, HOST};
use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RequestError;

/// Multi-valued header mapping that keeps the exact case of every name.
///
/// Unlike `http::HeaderMap`, names are never canonicalized so targets can
/// exercise servers that treat header names case-sensitively. Values of one
/// name keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(BTreeMap<String, Vec<String>>);

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the values of `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// Appends every value of `other`, name by name, after the existing ones.
    pub fn append(&mut self, other: &Header) {
        for (name, values) in &other.0 {
            self.0
                .entry(name.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// First value of `name`, matched exactly.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of `name`, matched exactly.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn host(&self) -> Option<&str> {
        self.get("Host")
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("host"))
                    .and_then(|(_, values)| values.first())
                    .map(String::as_str)
            })
            .filter(|host| !host.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for Header
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = Header::new();
        for (name, value) in iter {
            header.add(name, value);
        }
        header
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An HTTP request blueprint.
///
/// An empty `body` means no body and an empty `header` means no headers.
/// `name` is a reporting label and does not take part in equality.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub method: String,
    pub url: String,
    pub body: Bytes,
    pub header: Header,
    pub name: String,
}

impl Target {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Builds a transport request out of this target.
    ///
    /// Header values are copied into the request, so mutating the target
    /// afterwards never affects it. A `Host` header becomes the request's host.
    pub fn request(&self) -> Result<reqwest::Request, RequestError> {
        let method = Method::from_bytes(self.method.as_bytes())?;
        let url = Url::parse(&self.url)?;
        let mut request = reqwest::Request::new(method, url);

        let headers = request.headers_mut();
        for (name, values) in &self.header {
            if name.eq_ignore_ascii_case("host") {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes())?;
            for value in values {
                headers.append(name.clone(), HeaderValue::from_str(value)?);
            }
        }
        if let Some(host) = self.header.host() {
            headers.insert(HOST, HeaderValue::from_str(host)?);
        }

        if !self.body.is_empty() {
            *request.body_mut() = Some(self.body.clone().into());
        }
        Ok(request)
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.url == other.url
            && self.body == other.body
            && self.header == other.header
    }
}

impl Eq for Target {}
