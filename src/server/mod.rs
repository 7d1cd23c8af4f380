// SPDX-License-Identifier: GPL-3.0-only

//! HTTP streaming server
//!
//! - `GET /`: viewer page embedding the stream
//! - `GET /stream`: endless MJPEG stream of the latest frames
//! - anything else: 404
//!
//! Every `/stream` connection runs as its own task with its own
//! [`FrameSubscriber`](crate::frame_store::FrameSubscriber), so a slow or
//! stalled client only holds up itself.

pub mod mjpeg;

use crate::constants::http;
use crate::errors::{FrameError, StreamError};
use crate::frame_store::FrameStore;
use crate::pipelines::AnnotatedFrame;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use bytes::Bytes;
use std::convert::Infallible;
use std::future::{Future, IntoFuture};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

const INDEX_HTML: &str = r#"<html>
<head>
    <title>Thermal Camera Stream</title>
</head>
<body>
    <h1>Thermal Camera Stream</h1>
    <img src="/stream" />
</body>
</html>
"#;

/// Shared state of all request handlers
pub struct ServerState {
    store: Arc<FrameStore>,
    jpeg_quality: u8,
    limiter: Option<Arc<Semaphore>>,
    next_client_id: AtomicU64,
}

impl ServerState {
    pub fn new(store: Arc<FrameStore>, jpeg_quality: u8, max_clients: Option<usize>) -> Self {
        Self {
            store,
            jpeg_quality,
            limiter: max_clients.map(|n| Arc::new(Semaphore::new(n))),
            next_client_id: AtomicU64::new(1),
        }
    }
}

/// Build the request router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(http::INDEX_PATH, get(index))
        .route(http::STREAM_PATH, get(stream))
        .fallback(not_found)
        .with_state(state)
}

/// Bind the listen socket on all interfaces
pub async fn bind(port: u16) -> Result<TcpListener, StreamError> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| StreamError::BindFailed(format!("{}: {}", addr, e)))
}

/// Serve requests until `shutdown` resolves
///
/// Returns as soon as shutdown is signalled; open streams are not waited
/// for and die with the runtime.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: F,
) -> Result<(), StreamError>
where
    F: Future<Output = ()> + Send,
{
    let app = router(state);
    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result.map_err(|e| StreamError::ServeFailed(e.to_string()))
        }
        _ = shutdown => {
            info!("HTTP server stopping");
            Ok(())
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Logs the end of a stream connection and frees its slot
struct ClientGuard {
    id: u64,
    frames_sent: u64,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        info!(client = self.id, frames = self.frames_sent, "Stream client disconnected");
    }
}

async fn stream(State(state): State<Arc<ServerState>>) -> Response {
    let permit = match &state.limiter {
        Some(limiter) => match Arc::clone(limiter).try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                warn!("Stream client limit reached, rejecting connection");
                return (StatusCode::SERVICE_UNAVAILABLE, "Too many stream clients").into_response();
            }
        },
        None => None,
    };

    let id = state.next_client_id.fetch_add(1, Ordering::Relaxed);
    info!(client = id, "Stream client connected");

    let client = ClientGuard {
        id,
        frames_sent: 0,
        _permit: permit,
    };
    let mut subscriber = state.store.subscribe();
    let quality = state.jpeg_quality;

    let parts = async_stream::stream! {
        // Bind the whole guard so it lives as long as the body, not just its fields
        let mut client = client;
        while let Some(frame) = subscriber.next().await {
            match frame_jpeg(frame, quality).await {
                Ok(jpeg) => {
                    client.frames_sent += 1;
                    yield Ok::<Bytes, Infallible>(mjpeg::encode_part(&jpeg));
                }
                Err(e) => warn!(client = client.id, error = %e, "Skipping frame"),
            }
        }
        debug!(client = client.id, "Frame store closed, ending stream");
    };

    mjpeg::stream_response(parts)
}

/// JPEG bytes of a frame, encoding off the async workers when not cached
async fn frame_jpeg(frame: Arc<AnnotatedFrame>, quality: u8) -> Result<Bytes, FrameError> {
    if let Some(jpeg) = frame.cached_jpeg(quality) {
        return Ok(jpeg);
    }
    tokio::task::spawn_blocking(move || frame.jpeg(quality))
        .await
        .map_err(|e| FrameError::EncodingFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use image::RgbImage;

    fn state_with_frame(max_clients: Option<usize>) -> Arc<ServerState> {
        let store = Arc::new(FrameStore::new());
        store.publish(AnnotatedFrame::new(RgbImage::new(32, 24), 21.5, 0));
        Arc::new(ServerState::new(store, 80, max_clients))
    }

    #[tokio::test]
    async fn test_index_embeds_stream() {
        let Html(page) = index().await;
        assert!(page.contains(r#"<img src="/stream" />"#));
    }

    #[tokio::test]
    async fn test_fallback_is_404() {
        assert_eq!(not_found().await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stream_content_type() {
        let response = stream(State(state_with_frame(None))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], mjpeg::CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_client_limit() {
        let state = state_with_frame(Some(1));
        let first = stream(State(Arc::clone(&state))).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = stream(State(Arc::clone(&state))).await;
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);

        // Dropping the first stream frees its slot
        drop(first);
        let third = stream(State(state)).await;
        assert_eq!(third.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_open_stream_holds_its_slot() {
        let state = state_with_frame(Some(2));
        let limiter = Arc::clone(state.limiter.as_ref().unwrap());

        let first = stream(State(Arc::clone(&state))).await;
        assert_eq!(limiter.available_permits(), 1, "Open stream should keep its permit");

        let second = stream(State(Arc::clone(&state))).await;
        assert_eq!(limiter.available_permits(), 0);

        drop(first);
        assert_eq!(limiter.available_permits(), 1);
        drop(second);
        assert_eq!(limiter.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_frame_jpeg_uses_cache() {
        let frame = Arc::new(AnnotatedFrame::new(RgbImage::new(8, 8), 0.0, 0));
        let first = frame_jpeg(Arc::clone(&frame), 80).await.unwrap();
        assert_eq!(frame.cached_jpeg(80), Some(first));
    }

    #[tokio::test]
    async fn test_bind_reports_port_in_use() {
        let taken = TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let err = bind(port).await.unwrap_err();
        assert!(matches!(err, StreamError::BindFailed(_)));
    }
}
