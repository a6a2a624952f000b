//! Deferred response capture.
//!
//! # Responsibilities
//! - Hold a handler's status, headers and body until logging is done
//! - Expose what was captured to the response logger
//! - Release the response exactly once, at the end of the chain
//!
//! # Design Decisions
//! - Writes never reach the client; they only grow the buffer
//! - Status becomes 200 on the first write if none was set
//! - Not suitable for streaming responses: the whole body is held in memory

use axum::body::Body;
use axum::http::{header, Extensions, HeaderMap, StatusCode, Version};
use axum::response::Response;
use bytes::BytesMut;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferedError {
    #[error("failed to read response body")]
    Body(#[source] axum::Error),

    #[error("failed to write response: content-length {declared:?} does not match body of {actual} bytes")]
    ContentLength { declared: String, actual: usize },
}

/// A response proxy that buffers everything written to it.
#[derive(Debug, Default)]
pub struct Buffered {
    status: Option<StatusCode>,
    version: Version,
    headers: HeaderMap,
    extensions: Extensions,
    buffer: BytesMut,
}

impl Buffered {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a handler's response in full.
    pub async fn capture(response: Response) -> Result<Self, BufferedError> {
        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(BufferedError::Body)?;

        let mut buf = Self {
            version: parts.version,
            headers: parts.headers,
            extensions: parts.extensions,
            ..Self::default()
        };
        buf.write_header(parts.status);
        buf.write(&bytes);
        Ok(buf)
    }

    /// Append to the body, defaulting the status to 200.
    pub fn write(&mut self, body: &[u8]) -> usize {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.buffer.extend_from_slice(body);
        body.len()
    }

    /// Record the status to send later.
    pub fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// The status recorded so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The buffered body.
    pub fn body(&self) -> &[u8] {
        &self.buffer
    }

    /// Release status, headers and body as the real response.
    ///
    /// Fails when a declared `content-length` disagrees with the buffered
    /// body, which the connection would otherwise reject mid-write.
    pub fn write_response(self) -> Result<Response, BufferedError> {
        if let Some(declared) = self.headers.get(header::CONTENT_LENGTH) {
            let matches = declared
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .is_some_and(|n| n == self.buffer.len());
            if !matches {
                return Err(BufferedError::ContentLength {
                    declared: String::from_utf8_lossy(declared.as_bytes()).into_owned(),
                    actual: self.buffer.len(),
                });
            }
        }

        let mut response = Response::new(Body::from(self.buffer.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        *response.extensions_mut() = self.extensions;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn write_without_header_defaults_to_ok() {
        let mut buf = Buffered::new();
        assert_eq!(buf.status(), None);

        assert_eq!(buf.write(b"hello"), 5);
        assert_eq!(buf.status(), Some(StatusCode::OK));
        assert_eq!(buf.body(), b"hello");
    }

    #[test]
    fn explicit_status_survives_write() {
        let mut buf = Buffered::new();
        buf.write_header(StatusCode::NOT_FOUND);
        buf.write(b"gone");
        buf.write(b" away");

        assert_eq!(buf.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(buf.body(), b"gone away");
    }

    #[tokio::test]
    async fn capture_then_release() {
        let mut original = Response::new(Body::from(r#"{"ima":"pc"}"#));
        *original.status_mut() = StatusCode::CREATED;
        original
            .headers_mut()
            .insert("content-type", HeaderValue::from_static("application/json"));

        let buf = Buffered::capture(original).await.unwrap();
        assert_eq!(buf.status(), Some(StatusCode::CREATED));
        assert_eq!(buf.body(), br#"{"ima":"pc"}"#);

        let released = buf.write_response().unwrap();
        assert_eq!(released.status(), StatusCode::CREATED);
        assert_eq!(released.headers()["content-type"], "application/json");
        let body = axum::body::to_bytes(released.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"ima":"pc"}"#);
    }

    #[test]
    fn mismatched_content_length_fails_release() {
        let mut buf = Buffered::new();
        buf.headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from_static("99"));
        buf.write(b"short");

        let err = buf.write_response().unwrap_err();
        assert!(matches!(err, BufferedError::ContentLength { actual: 5, .. }));
    }

    #[test]
    fn empty_buffer_releases_ok() {
        let response = Buffered::new().write_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
