// SPDX-License-Identifier: GPL-3.0-only

//! Motion-JPEG framing over `multipart/x-mixed-replace`
//!
//! Browsers render such a response in a plain `<img>` tag and replace the
//! picture each time a new part arrives.

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::{BufMut, Bytes, BytesMut};
use futures::Stream;
use std::convert::Infallible;

/// Content type of the stream response; the boundary is `frame`
pub const CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

const PART_HEADER: &[u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";
const PART_TRAILER: &[u8] = b"\r\n";

/// Wrap one JPEG image as a multipart part
pub fn encode_part(jpeg: &[u8]) -> Bytes {
    let mut part = BytesMut::with_capacity(PART_HEADER.len() + jpeg.len() + PART_TRAILER.len());
    part.put_slice(PART_HEADER);
    part.put_slice(jpeg);
    part.put_slice(PART_TRAILER);
    part.freeze()
}

/// Streaming response carrying already-framed parts
pub fn stream_response<S>(parts: S) -> Response
where
    S: Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
{
    (
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Body::from_stream(parts),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::http;

    #[test]
    fn test_part_is_byte_exact() {
        let part = encode_part(&[0xFF, 0xD8, 0x01, 0xFF, 0xD9]);
        let mut expected = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0xFF, 0xD8, 0x01, 0xFF, 0xD9]);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(part.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_boundary_matches_content_type() {
        assert!(CONTENT_TYPE.ends_with(&format!("boundary={}", http::BOUNDARY)));
        assert!(PART_HEADER.starts_with(format!("--{}\r\n", http::BOUNDARY).as_bytes()));
    }

    #[test]
    fn test_stream_response_headers() {
        let response = stream_response(futures::stream::empty());
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], CONTENT_TYPE);
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
    }
}
