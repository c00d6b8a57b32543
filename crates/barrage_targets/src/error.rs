use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`Targeter::next`](crate::Targeter::next) and the encoders.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The source is exhausted. This is a termination signal, not a failure.
    #[error("no targets to attack")]
    NoTargets,
    #[error("nil target")]
    NilTarget,
    #[error("target: required method is missing")]
    NoMethod,
    #[error("target: required url is missing")]
    NoUrl,
    #[error("bad target: {0}")]
    BadTarget(String),
    #[error("bad method: {0}")]
    BadMethod(String),
    #[error("bad URL: {0}")]
    BadUrl(String),
    #[error("bad header: {0}")]
    BadHeader(String),
    #[error("bad body: {path}: {source}")]
    BadBody {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl TargetError {
    /// True for the exhaustion sentinel that ends a finite run.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TargetError::NoTargets)
    }
}

/// Failure to turn a [`Target`](crate::Target) into a transport request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid method: {0}")]
    Method(#[from] http::method::InvalidMethod),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header name: {0}")]
    HeaderName(#[from] http::header::InvalidHeaderName),
    #[error("invalid header value: {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),
}
