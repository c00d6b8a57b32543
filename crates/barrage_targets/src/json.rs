use std::io::{BufRead, BufReader, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use barrage_logging::{barrage_debug, barrage_trace};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::{Header, Target, TargetError, Targeter, TargeterProvider};

/// One line of the JSON target format, as read.
///
/// Every field is optional at this level; `method` and `url` are checked
/// after parsing so that missing and empty values fail the same way.
#[serde_as]
#[derive(Debug, Deserialize)]
struct JsonTarget {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde_as(as = "Option<Base64>")]
    #[serde(default)]
    body: Option<Vec<u8>>,
    #[serde(default)]
    header: Option<Header>,
    #[serde(default)]
    name: Option<String>,
}

/// One line of the JSON target format, as written.
#[serde_as]
#[derive(Serialize)]
struct JsonTargetRef<'a> {
    method: &'a str,
    url: &'a str,
    #[serde_as(as = "Base64")]
    #[serde(skip_serializing_if = "<[u8]>::is_empty")]
    body: &'a [u8],
    #[serde(skip_serializing_if = "Header::is_empty")]
    header: &'a Header,
    #[serde(skip_serializing_if = "str::is_empty")]
    name: &'a str,
}

impl<'a> From<&'a Target> for JsonTargetRef<'a> {
    fn from(target: &'a Target) -> Self {
        Self {
            method: &target.method,
            url: &target.url,
            body: &target.body,
            header: &target.header,
            name: &target.name,
        }
    }
}

/// Decodes one target per line of newline-delimited JSON objects:
///
/// ```text
/// {"method":"POST", "url":"https://goku/1", "header":{"Content-Type":["text/plain"]}, "body":"Rk9P"}
/// {"method":"GET",  "url":"https://goku/2"}
/// ```
///
/// `body` is base64 encoded. Lines without a body get the default body, and
/// the default header values come before each line's own values.
pub struct JsonTargeter {
    reader: Mutex<Box<dyn BufRead + Send>>,
    body: Bytes,
    header: Header,
}

impl JsonTargeter {
    pub fn new<R>(src: R, body: Bytes, header: Header) -> Self
    where
        R: Read + Send + 'static,
    {
        barrage_debug!(
            "json targeter: default body {} bytes, {} default headers",
            body.len(),
            header.len()
        );
        Self {
            reader: Mutex::new(Box::new(BufReader::new(src))),
            body,
            header,
        }
    }

    /// Next non-blank line, trimmed. Only this step runs under the lock.
    fn read_line(&self) -> Result<Vec<u8>, TargetError> {
        let mut reader = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                barrage_debug!("json targeter: source exhausted");
                return Err(TargetError::NoTargets);
            }
            let trimmed = line.trim_ascii();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_vec());
            }
        }
    }
}

impl Targeter for JsonTargeter {
    fn next(&self, target: Option<&mut Target>) -> Result<(), TargetError> {
        let target = target.ok_or(TargetError::NilTarget)?;
        let line = self.read_line()?;

        let decoded: JsonTarget = serde_json::from_slice(&line)?;
        let method = decoded.method.filter(|m| !m.is_empty()).ok_or(TargetError::NoMethod)?;
        let url = decoded.url.filter(|u| !u.is_empty()).ok_or(TargetError::NoUrl)?;

        let body = match decoded.body {
            Some(body) if !body.is_empty() => Bytes::from(body),
            _ => self.body.clone(),
        };
        let mut header = Header::new();
        header.append(&self.header);
        if let Some(own) = &decoded.header {
            header.append(own);
        }

        barrage_trace!("json targeter: decoded {} {}", method, url);
        *target = Target {
            method,
            url,
            body,
            header,
            name: decoded.name.unwrap_or_default(),
        };
        Ok(())
    }
}

impl TargeterProvider for JsonTargeter {
    fn new_targeter(self: Arc<Self>) -> Arc<dyn Targeter> {
        self
    }
}

/// Writes targets in a format a [`Targeter`] can read back.
///
/// Any `FnMut(&Target) -> Result<(), TargetError>` closure is an encoder.
pub trait TargetEncoder {
    fn encode(&mut self, target: &Target) -> Result<(), TargetError>;
}

impl<F> TargetEncoder for F
where
    F: FnMut(&Target) -> Result<(), TargetError>,
{
    fn encode(&mut self, target: &Target) -> Result<(), TargetError> {
        self(target)
    }
}

/// Encodes targets in the format read by [`JsonTargeter`], one compact
/// object per line, flushing after every target.
pub struct JsonTargetEncoder<W> {
    writer: W,
    buf: Vec<u8>,
}

impl<W: Write> JsonTargetEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TargetEncoder for JsonTargetEncoder<W> {
    fn encode(&mut self, target: &Target) -> Result<(), TargetError> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, &JsonTargetRef::from(target))?;
        self.buf.push(b'\n');
        // One write per target keeps lines whole on shared writers.
        self.writer.write_all(&self.buf)?;
        self.writer.flush()?;
        Ok(())
    }
}
