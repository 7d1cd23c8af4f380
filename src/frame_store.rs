// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot store for the most recent annotated frame
//!
//! The capture thread publishes, any number of HTTP streams read. Frames are
//! shared as `Arc<AnnotatedFrame>` so a reader always holds one complete,
//! immutable frame and can never observe a half-written one.
//!
//! ```text
//! capture thread ── publish ──▶ [ slot ] ──▶ subscriber ──▶ /stream client
//!                                   └──────▶ subscriber ──▶ /stream client
//! ```

use crate::constants::http;
use crate::pipelines::AnnotatedFrame;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

type Slot = Option<Arc<AnnotatedFrame>>;

/// Latest-value store for processed frames
///
/// Starts empty. Each `publish` replaces the previous frame; nothing is
/// queued, so slow readers simply skip frames.
pub struct FrameStore {
    tx: watch::Sender<Slot>,
    resend_interval: Duration,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::with_resend_interval(http::RESEND_INTERVAL)
    }

    /// Store whose subscribers repeat the current frame after `interval`
    /// without a new publish
    pub fn with_resend_interval(interval: Duration) -> Self {
        Self {
            tx: watch::Sender::new(None),
            resend_interval: interval,
        }
    }

    /// Replace the stored frame and wake all subscribers
    pub fn publish(&self, frame: impl Into<Arc<AnnotatedFrame>>) {
        self.tx.send_replace(Some(frame.into()));
    }

    /// The most recently published frame, or None before the first publish
    pub fn read(&self) -> Option<Arc<AnnotatedFrame>> {
        self.tx.borrow().clone()
    }

    /// Follow the store from the current frame onwards
    pub fn subscribe(&self) -> FrameSubscriber {
        FrameSubscriber {
            rx: self.tx.subscribe(),
            primed: false,
            resend_interval: self.resend_interval,
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A reader following a [`FrameStore`]
pub struct FrameSubscriber {
    rx: watch::Receiver<Slot>,
    primed: bool,
    resend_interval: Duration,
}

impl FrameSubscriber {
    /// Wait for the next frame to send
    ///
    /// The first call returns the current frame immediately if there is one.
    /// Later calls wait for a new publish; if none arrives within the resend
    /// interval the current frame is returned again, so a stream keeps
    /// delivering the last image after capture stops. While the store is
    /// still empty this keeps waiting. Returns None once the store is gone.
    pub async fn next(&mut self) -> Option<Arc<AnnotatedFrame>> {
        if !self.primed {
            self.primed = true;
            if let Some(frame) = self.rx.borrow_and_update().clone() {
                return Some(frame);
            }
        }

        loop {
            match timeout(self.resend_interval, self.rx.changed()).await {
                Ok(Ok(())) => {
                    if let Some(frame) = self.rx.borrow_and_update().clone() {
                        return Some(frame);
                    }
                }
                Ok(Err(_)) => return None,
                Err(_) => {
                    if let Some(frame) = self.rx.borrow().clone() {
                        return Some(frame);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::thread;

    fn uniform_frame(value: u8, sequence: u64) -> AnnotatedFrame {
        AnnotatedFrame::new(
            RgbImage::from_pixel(64, 48, Rgb([value, value, value])),
            value as f32,
            sequence,
        )
    }

    #[test]
    fn test_empty_store_reads_none() {
        let store = FrameStore::new();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_read_returns_latest() {
        let store = FrameStore::new();
        store.publish(uniform_frame(1, 1));
        store.publish(uniform_frame(2, 2));

        let frame = store.read().unwrap();
        assert_eq!(frame.sequence, 2);
        assert_eq!(frame.temperature, 2.0);
    }

    #[test]
    fn test_reader_keeps_its_frame_after_replace() {
        let store = FrameStore::new();
        store.publish(uniform_frame(1, 1));
        let held = store.read().unwrap();

        store.publish(uniform_frame(2, 2));
        assert_eq!(held.sequence, 1);
        assert_eq!(held.image.get_pixel(0, 0).0, [1, 1, 1]);
    }

    #[test]
    fn test_concurrent_readers_never_see_mixed_frames() {
        let store = Arc::new(FrameStore::new());
        store.publish(uniform_frame(0, 0));

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..=200u64 {
                    store.publish(uniform_frame((i % 256) as u8, i));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let frame = store.read().unwrap();
                        let first = frame.image.get_pixel(0, 0).0;
                        assert!(frame.image.pixels().all(|p| p.0 == first));
                        assert_eq!(frame.temperature, first[0] as f32);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.read().unwrap().sequence, 200);
    }

    #[tokio::test]
    async fn test_subscriber_starts_with_current_frame() {
        let store = FrameStore::new();
        store.publish(uniform_frame(5, 5));

        let mut subscriber = store.subscribe();
        let frame = subscriber.next().await.unwrap();
        assert_eq!(frame.sequence, 5);
    }

    #[tokio::test]
    async fn test_subscriber_waits_for_first_publish() {
        let store = Arc::new(FrameStore::with_resend_interval(Duration::from_millis(20)));
        let mut subscriber = store.subscribe();

        let publisher = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(60)).await;
                store.publish(uniform_frame(9, 9));
            })
        };

        let frame = subscriber.next().await.unwrap();
        assert_eq!(frame.sequence, 9);
        publisher.await.unwrap();
    }

    #[tokio::test]
    async fn test_subscriber_sees_updates() {
        let store = FrameStore::with_resend_interval(Duration::from_secs(10));
        store.publish(uniform_frame(1, 1));

        let mut subscriber = store.subscribe();
        assert_eq!(subscriber.next().await.unwrap().sequence, 1);

        store.publish(uniform_frame(2, 2));
        assert_eq!(subscriber.next().await.unwrap().sequence, 2);
    }

    #[tokio::test]
    async fn test_subscriber_resends_when_idle() {
        let store = FrameStore::with_resend_interval(Duration::from_millis(20));
        store.publish(uniform_frame(3, 3));

        let mut subscriber = store.subscribe();
        assert_eq!(subscriber.next().await.unwrap().sequence, 3);

        // No further publishes: the last frame keeps coming
        assert_eq!(subscriber.next().await.unwrap().sequence, 3);
        assert_eq!(subscriber.next().await.unwrap().sequence, 3);
    }

    #[tokio::test]
    async fn test_subscriber_ends_with_store() {
        let store = FrameStore::with_resend_interval(Duration::from_secs(10));
        let mut subscriber = store.subscribe();
        drop(store);
        assert!(subscriber.next().await.is_none());
    }

    #[test]
    fn test_subscriber_count() {
        let store = FrameStore::new();
        assert_eq!(store.subscriber_count(), 0);
        let a = store.subscribe();
        let _b = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(a);
        assert_eq!(store.subscriber_count(), 1);
    }
}
