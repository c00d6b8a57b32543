use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Header, HttpTargeter, JsonTargeter, TargeterProvider};

/// Identifiers of the supported target formats.
pub const TARGET_FORMATS: [&str; 2] = [TargetFormat::HTTP, TargetFormat::JSON];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetFormat {
    /// Line-oriented `METHOD URL` blocks, see [`HttpTargeter`].
    Http,
    /// One JSON object per line, see [`JsonTargeter`].
    #[default]
    Json,
}

impl TargetFormat {
    pub const HTTP: &'static str = "http";
    pub const JSON: &'static str = "json";

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Http => Self::HTTP,
            TargetFormat::Json => Self::JSON,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target format {0:?}, expected one of {formats:?}", formats = TARGET_FORMATS)]
pub struct UnknownFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::HTTP => Ok(TargetFormat::Http),
            Self::JSON => Ok(TargetFormat::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// How targets are read from a byte source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSettings {
    pub format: TargetFormat,
    /// Body of every target that does not carry its own.
    pub body: Bytes,
    /// Header values put in front of every target's own values.
    pub header: Header,
}

impl TargetSettings {
    /// Builds the decoder for `src` matching the configured format.
    pub fn provider<R>(&self, src: R) -> Arc<dyn TargeterProvider>
    where
        R: Read + Send + 'static,
    {
        let body = self.body.clone();
        let header = self.header.clone();
        match self.format {
            TargetFormat::Http => Arc::new(HttpTargeter::new(src, body, header)),
            TargetFormat::Json => Arc::new(JsonTargeter::new(src, body, header)),
        }
    }
}
