// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the HTTP streaming server over real sockets

use image::{Rgb, RgbImage};
use std::sync::Arc;
use std::time::Duration;
use thermal_stream::server::{self, ServerState};
use thermal_stream::shutdown::Shutdown;
use thermal_stream::{AnnotatedFrame, FrameStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const PART_HEADER: &[u8] = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";
const READ_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    port: u16,
    store: Arc<FrameStore>,
    shutdown: Shutdown,
}

impl TestServer {
    async fn start(max_clients: Option<usize>) -> Self {
        let store = Arc::new(FrameStore::with_resend_interval(Duration::from_millis(50)));
        store.publish(test_frame(0));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(ServerState::new(Arc::clone(&store), 80, max_clients));
        let shutdown = Shutdown::new();

        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            server::serve(listener, state, async move { server_shutdown.wait().await })
                .await
                .unwrap();
        });

        Self {
            port,
            store,
            shutdown,
        }
    }

    async fn connect(&self, path: &str) -> TcpStream {
        let mut stream = TcpStream::connect(("127.0.0.1", self.port)).await.unwrap();
        // HTTP/1.0 keeps the body unchunked so the multipart bytes arrive as sent
        let request = format!("GET {} HTTP/1.0\r\nHost: localhost\r\n\r\n", path);
        stream.write_all(request.as_bytes()).await.unwrap();
        stream
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

fn test_frame(sequence: u64) -> AnnotatedFrame {
    let shade = (sequence % 256) as u8;
    AnnotatedFrame::new(
        RgbImage::from_pixel(32, 24, Rgb([shade, 0, 255 - shade])),
        20.0,
        sequence,
    )
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read until at least `parts` multipart parts have arrived
async fn read_parts(stream: &mut TcpStream, buf: &mut Vec<u8>, parts: usize) {
    let target = count(buf, PART_HEADER) + parts;
    timeout(READ_TIMEOUT, async {
        let mut chunk = [0u8; 4096];
        while count(buf, PART_HEADER) < target {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "Stream closed early");
            buf.extend_from_slice(&chunk[..n]);
        }
    })
    .await
    .expect("Timed out waiting for stream parts");
}

async fn read_to_close(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    timeout(READ_TIMEOUT, stream.read_to_end(&mut buf))
        .await
        .expect("Timed out waiting for response")
        .unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn test_index_page() {
    let server = TestServer::start(None).await;
    let mut stream = server.connect("/").await;
    let response = read_to_close(&mut stream).await;

    assert!(response.starts_with("HTTP/1.0 200") || response.starts_with("HTTP/1.1 200"));
    assert!(response.to_lowercase().contains("content-type: text/html"));
    assert!(response.contains(r#"<img src="/stream" />"#));
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = TestServer::start(None).await;
    let mut stream = server.connect("/does-not-exist").await;
    let response = read_to_close(&mut stream).await;

    assert!(response.contains(" 404 "), "Unexpected response: {}", response);
}

#[tokio::test]
async fn test_stream_framing_is_byte_exact() {
    let server = TestServer::start(None).await;
    let mut stream = server.connect("/stream").await;

    let mut buf = Vec::new();
    read_parts(&mut stream, &mut buf, 2).await;

    let head_end = find(&buf, b"\r\n\r\n").unwrap() + 4;
    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    assert!(head.contains("content-type: multipart/x-mixed-replace; boundary=frame"));

    // Body: part header, JPEG (SOI ... EOI), CRLF, next part header
    let body = &buf[head_end..];
    assert!(body.starts_with(PART_HEADER));
    let jpeg_start = PART_HEADER.len();
    assert_eq!(&body[jpeg_start..jpeg_start + 2], &[0xFF, 0xD8]);

    let next = find(&body[jpeg_start..], PART_HEADER).unwrap() + jpeg_start;
    assert_eq!(&body[next - 4..next], &[0xFF, 0xD9, b'\r', b'\n']);
}

#[tokio::test]
async fn test_two_clients_stream_independently() {
    let server = TestServer::start(None).await;
    let mut first = server.connect("/stream").await;
    let mut second = server.connect("/stream").await;

    let mut first_buf = Vec::new();
    let mut second_buf = Vec::new();
    read_parts(&mut first, &mut first_buf, 2).await;
    read_parts(&mut second, &mut second_buf, 2).await;

    // Closing one client does not affect the other
    drop(first);
    for sequence in 1..=3 {
        server.store.publish(test_frame(sequence));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    read_parts(&mut second, &mut second_buf, 3).await;

    // The server keeps accepting new streams
    let mut third = server.connect("/stream").await;
    let mut third_buf = Vec::new();
    read_parts(&mut third, &mut third_buf, 1).await;
}

#[tokio::test]
async fn test_stream_repeats_last_frame_without_publishes() {
    let server = TestServer::start(None).await;
    let mut stream = server.connect("/stream").await;

    // Only the initial frame was ever published
    let mut buf = Vec::new();
    read_parts(&mut stream, &mut buf, 3).await;
}

#[tokio::test]
async fn test_client_limit_returns_503() {
    let server = TestServer::start(Some(1)).await;
    let mut first = server.connect("/stream").await;
    let mut first_buf = Vec::new();
    read_parts(&mut first, &mut first_buf, 1).await;

    let mut rejected = server.connect("/stream").await;
    let response = read_to_close(&mut rejected).await;
    assert!(response.contains(" 503 "), "Unexpected response: {}", response);

    // The first client is unaffected
    read_parts(&mut first, &mut first_buf, 1).await;
}
