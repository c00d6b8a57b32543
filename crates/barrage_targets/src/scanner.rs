use std::io::{self, BufRead};

/// Line scanner with one line of look-ahead.
///
/// `peek` reads the next line without taking it: the following `scan` reports
/// it as available and `text` hands it out exactly once. At most one line is
/// ever buffered.
///
/// Lines are split on `\n` with an optional `\r` before it. Bytes that are not
/// valid UTF-8 are replaced, so only the source itself can fail a scan.
pub(crate) struct PeekingScanner<R> {
    src: R,
    buf: Vec<u8>,
    current: String,
    peeked: Option<String>,
    err: Option<io::Error>,
}

impl<R: BufRead> PeekingScanner<R> {
    pub(crate) fn new(src: R) -> Self {
        Self {
            src,
            buf: Vec::new(),
            current: String::new(),
            peeked: None,
            err: None,
        }
    }

    /// Advances to the next line. Returns false at end of input or on a read
    /// error, which is then available through [`PeekingScanner::err`].
    pub(crate) fn scan(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        match self.read() {
            Some(line) => {
                self.current = line;
                true
            }
            None => false,
        }
    }

    /// The current line, taking over a pending peeked line first.
    pub(crate) fn text(&mut self) -> &str {
        if let Some(line) = self.peeked.take() {
            self.current = line;
        }
        &self.current
    }

    /// The line after the current one, or `None` at end of input.
    pub(crate) fn peek(&mut self) -> Option<&str> {
        if self.peeked.is_none() {
            self.peeked = self.read();
        }
        self.peeked.as_deref()
    }

    pub(crate) fn err(&self) -> Option<&io::Error> {
        self.err.as_ref()
    }

    fn read(&mut self) -> Option<String> {
        if self.err.is_some() {
            return None;
        }
        self.buf.clear();
        match self.src.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let mut line = self.buf.as_slice();
                if let Some(rest) = line.strip_suffix(b"\n") {
                    line = rest.strip_suffix(b"\r").unwrap_or(rest);
                }
                Some(String::from_utf8_lossy(line).into_owned())
            }
            Err(err) => {
                self.err = Some(err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, BufReader, Cursor, Read};

    use super::PeekingScanner;

    fn scanner(input: &str) -> PeekingScanner<Cursor<Vec<u8>>> {
        PeekingScanner::new(Cursor::new(input.as_bytes().to_vec()))
    }

    fn drain<R: BufRead>(sc: &mut PeekingScanner<R>) -> Vec<String> {
        let mut lines = Vec::new();
        while sc.scan() {
            lines.push(sc.text().to_string());
        }
        lines
    }

    #[test]
    fn scans_lines_in_order() {
        let mut sc = scanner("a\nb\r\n\nc");
        assert_eq!(drain(&mut sc), ["a", "b", "", "c"]);
        assert!(sc.err().is_none());
    }

    #[test]
    fn peeked_line_is_returned_exactly_once() {
        let mut sc = scanner("a\nb\nc\n");
        assert!(sc.scan());
        assert_eq!(sc.text(), "a");
        assert_eq!(sc.peek(), Some("b"));
        // Peeking again does not read further ahead.
        assert_eq!(sc.peek(), Some("b"));
        assert!(sc.scan());
        assert_eq!(sc.text(), "b");
        // Repeated text() keeps returning the current line.
        assert_eq!(sc.text(), "b");
        assert_eq!(drain(&mut sc), ["c"]);
    }

    #[test]
    fn peek_at_end_of_input() {
        let mut sc = scanner("only\n");
        assert!(sc.scan());
        assert_eq!(sc.text(), "only");
        assert_eq!(sc.peek(), None);
        assert!(!sc.scan());
    }

    #[test]
    fn peeked_blank_line_is_kept() {
        let mut sc = scanner("a\n\nb\n");
        assert!(sc.scan());
        assert_eq!(sc.peek(), Some(""));
        assert_eq!(drain(&mut sc), ["", "b"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_an_error() {
        let mut sc = PeekingScanner::new(Cursor::new(b"caf\xE9\r\nnext\n".to_vec()));
        assert_eq!(drain(&mut sc), ["caf\u{FFFD}", "next"]);
        assert!(sc.err().is_none());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn read_error_stops_scanning() {
        let mut sc = PeekingScanner::new(BufReader::new(FailingReader));
        assert!(!sc.scan());
        assert_eq!(sc.err().map(|e| e.to_string()), Some("boom".to_string()));
        assert_eq!(sc.peek(), None);
        assert!(!sc.scan());
    }
}
