//! Shared utilities for integration tests.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use fieldlog::log::{Level, LineLogger};

/// An in-memory sink shared between a logger and the test.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_string).collect()
    }

    /// Every line parsed as a JSON event.
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .map(|line| serde_json::from_str(line).expect("line is not JSON"))
            .collect()
    }

    /// Events whose `msg` equals `msg`.
    #[allow(dead_code)]
    pub fn events_named(&self, msg: &str) -> Vec<serde_json::Value> {
        self.events().into_iter().filter(|e| e["msg"] == msg).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink that refuses every write.
#[allow(dead_code)]
pub struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A JSON logger at trace level writing into a fresh capture.
pub fn capture_logger() -> (Arc<LineLogger>, Capture) {
    let capture = Capture::default();
    let logger = LineLogger::new()
        .with_writer(capture.clone())
        .without_alt_writer()
        .with_level(Level::Trace);
    (Arc::new(logger), capture)
}

/// Attach a peer address the way the server's connect-info service does.
#[allow(dead_code)]
pub fn with_peer(mut req: Request<Body>, addr: &str) -> Request<Body> {
    let addr: SocketAddr = addr.parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

/// Parse a field that holds JSON text.
#[allow(dead_code)]
pub fn embedded(event: &serde_json::Value, key: &str) -> serde_json::Value {
    let text = event[key].as_str().expect("field is not a string");
    serde_json::from_str(text).unwrap()
}
