use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use barrage_logging::{barrage_debug, barrage_trace};
use bytes::Bytes;
use regex::Regex;
use url::Url;

use crate::scanner::PeekingScanner;
use crate::{Header, Target, TargetError, Targeter, TargeterProvider};

/// One or more uppercase ASCII letters followed by whitespace.
static HTTP_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+\s").expect("valid method pattern"));

fn starts_with_http_method(line: &str) -> bool {
    HTTP_METHOD.is_match(line)
}

type LineScanner = PeekingScanner<Box<dyn BufRead + Send>>;

/// Decodes targets from a line-oriented, HTTP-like text format:
///
/// ```text
/// GET https://foo.bar/a/b/c
/// Header-X: 123
/// Header-Y: 321
/// @/path/to/body/file
///
/// POST https://foo.bar/b/c/a
/// Header-X: 123
/// ```
///
/// Blocks are separated by blank lines and `#` lines are comments. Header
/// names keep their case. A block without an `@path` line gets the default
/// body; the default header values come before the block's own values.
///
/// A read error on the source ends the stream like a clean end of input.
pub struct HttpTargeter {
    scanner: Mutex<LineScanner>,
    body: Bytes,
    header: Header,
}

impl HttpTargeter {
    pub fn new<R>(src: R, body: Bytes, header: Header) -> Self
    where
        R: Read + Send + 'static,
    {
        barrage_debug!(
            "http targeter: default body {} bytes, {} default headers",
            body.len(),
            header.len()
        );
        let lines: Box<dyn BufRead + Send> = Box::new(BufReader::new(src));
        Self {
            scanner: Mutex::new(PeekingScanner::new(lines)),
            body,
            header,
        }
    }

    fn decode(&self, sc: &mut LineScanner) -> Result<Target, TargetError> {
        let line = loop {
            if !sc.scan() {
                return Err(exhausted(sc));
            }
            let line = sc.text().trim();
            if !line.is_empty() && !line.starts_with('#') {
                break line.to_owned();
            }
        };

        let Some((method, url)) = line.split_once(' ') else {
            return Err(TargetError::BadTarget(line.clone()));
        };
        if !starts_with_http_method(&line) {
            return Err(TargetError::BadMethod(method.to_owned()));
        }
        // `Url::parse` strips surrounding whitespace and control characters.
        if url.starts_with(char::is_whitespace)
            || url.contains(char::is_control)
            || Url::parse(url).is_err()
        {
            return Err(TargetError::BadUrl(url.to_owned()));
        }

        let mut target = Target {
            method: method.to_owned(),
            url: url.to_owned(),
            body: self.body.clone(),
            header: self.header.clone(),
            name: String::new(),
        };

        let has_section = sc.peek().is_some_and(|next| {
            let next = next.trim();
            !next.is_empty() && !starts_with_http_method(next)
        });
        if !has_section {
            return Ok(target);
        }

        while sc.scan() {
            let line = sc.text().trim();
            if line.is_empty() {
                break;
            }
            if let Some(path) = line.strip_prefix('@') {
                target.body = fs::read(path).map(Bytes::from).map_err(|source| {
                    TargetError::BadBody {
                        path: path.into(),
                        source,
                    }
                })?;
                break;
            }
            let (name, value) = parse_header(line)?;
            target.header.add(name, value);
        }
        if sc.err().is_some() {
            return Err(exhausted(sc));
        }
        Ok(target)
    }
}

fn parse_header(line: &str) -> Result<(&str, &str), TargetError> {
    let bad_header = || TargetError::BadHeader(line.to_owned());
    let (name, value) = line.split_once(':').ok_or_else(bad_header)?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(bad_header());
    }
    Ok((name, value))
}

fn exhausted(sc: &LineScanner) -> TargetError {
    match sc.err() {
        Some(err) => barrage_debug!("http targeter: read error treated as end of input: {err}"),
        None => barrage_debug!("http targeter: source exhausted"),
    }
    TargetError::NoTargets
}

impl Targeter for HttpTargeter {
    fn next(&self, target: Option<&mut Target>) -> Result<(), TargetError> {
        let target = target.ok_or(TargetError::NilTarget)?;
        // Held for the whole call: the look-ahead belongs to the block being decoded.
        let mut sc = self.scanner.lock().unwrap_or_else(PoisonError::into_inner);
        let decoded = self.decode(&mut sc).inspect_err(|err| {
            if !err.is_exhausted() {
                barrage_debug!("http targeter: {err}");
            }
        })?;
        barrage_trace!("http targeter: decoded {} {}", decoded.method, decoded.url);
        *target = decoded;
        Ok(())
    }
}

impl TargeterProvider for HttpTargeter {
    fn new_targeter(self: Arc<Self>) -> Arc<dyn Targeter> {
        self
    }
}
