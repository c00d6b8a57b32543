use std::error::Error;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use barrage_targets::{
    Header, HttpTargeter, JsonTargeter, StaticTargeter, Target, TargetError, Targeter,
    TargeterProvider,
};
use bytes::Bytes;

/// Stops handing out targets after too many failed requests.
struct CircuitBreaker {
    inner: StaticTargeter,
    failures: AtomicUsize,
    limit: usize,
}

impl Targeter for CircuitBreaker {
    fn next(&self, target: Option<&mut Target>) -> Result<(), TargetError> {
        if self.failures.load(Ordering::Relaxed) >= self.limit {
            return Err(TargetError::NoTargets);
        }
        self.inner.next(target)
    }

    fn result(&self, _body: &[u8], status: u16, err: Option<&(dyn Error + 'static)>) {
        if err.is_some() || status >= 500 {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl TargeterProvider for CircuitBreaker {
    fn new_targeter(self: Arc<Self>) -> Arc<dyn Targeter> {
        self
    }
}

#[test]
fn custom_targeters_react_to_results() {
    let provider = Arc::new(CircuitBreaker {
        inner: StaticTargeter::new(vec![Target::new("GET", "http://x/")]),
        failures: AtomicUsize::new(0),
        limit: 2,
    });
    let tr = provider.new_targeter();
    let mut target = Target::default();

    tr.next(Some(&mut target)).unwrap();
    tr.result(b"", 503, None);
    tr.next(Some(&mut target)).unwrap();
    let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
    tr.result(b"", 0, Some(&timeout));

    assert!(matches!(tr.next(Some(&mut target)), Err(TargetError::NoTargets)));
}

#[test]
fn builtin_targeters_ignore_results() {
    let targeters: Vec<Arc<dyn Targeter>> = vec![
        Arc::new(StaticTargeter::new(vec![Target::new("GET", "http://x/")])),
        Arc::new(JsonTargeter::new(
            Cursor::new(br#"{"method":"GET","url":"http://x/"}"#.to_vec()),
            Bytes::new(),
            Header::new(),
        )),
        Arc::new(HttpTargeter::new(
            Cursor::new(b"GET http://x/\n".to_vec()),
            Bytes::new(),
            Header::new(),
        )),
    ];

    for tr in targeters {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "refused");
        tr.result(b"oops", 500, Some(&error));
        let mut target = Target::default();
        tr.next(Some(&mut target)).unwrap();
        assert_eq!(target, Target::new("GET", "http://x/"));
    }
}
