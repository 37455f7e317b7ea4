//! Helpers shared by the test suites.

use crate::quantity::Quantity;
use crate::units::Unit;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::Level;

/// Draws an `f64` in `[lo, hi)`.
///
/// quickcheck will give us awkward f64 values (NaN, infinities, subnormals); those are skipped
/// and everything else is folded into the requested range.
pub(crate) fn arbitrary_in(g: &mut quickcheck::Gen, lo: f64, hi: f64) -> f64 {
    let f = loop {
        match <f64 as quickcheck::Arbitrary>::arbitrary(g) {
            0. => break 0.,
            f if f.is_normal() => break f,
            _ => {}
        }
    };
    lo + f.rem_euclid(hi - lo)
}

pub(crate) fn unit(s: &str) -> Unit {
    s.parse().expect("valid unit in test")
}

pub(crate) fn q(v: f64, u: &str) -> Quantity {
    Quantity::scalar(v, unit(u))
}

/// An in-memory log sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a thread-local subscriber at `level` and returns its output alongside the
/// formatted log lines.
pub(crate) fn capture_logs<T>(level: Level, f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(level)
        .without_time()
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().expect("log buffer poisoned").clone();
    let lines = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_owned)
        .collect();
    (out, lines)
}
