//! Motion sample feed

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::MotionSample;

/// Motion sensor error types
#[derive(Error, Debug)]
pub enum MotionError {
    #[error("Motion sensors not available on this device")]
    Unavailable,

    #[error("Motion sensor read failed: {0}")]
    Read(String),
}

/// Platform accelerometer/gyroscope access
pub trait MotionReader {
    /// Whether the device has both an accelerometer and a gyroscope
    fn is_available(&self) -> bool;

    /// Blocking read of the latest sample
    fn read(&mut self) -> Result<MotionSample, MotionError>;
}

/// Push-based stream of motion samples.
///
/// An unavailable feed simply never yields; callers treat that as
/// "no motion checks this session".
pub struct MotionFeed {
    receiver: Option<mpsc::Receiver<MotionSample>>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl MotionFeed {
    /// Feed for a device without motion sensors
    pub fn unavailable() -> Self {
        Self {
            receiver: None,
            shutdown: None,
        }
    }

    /// Feed driven by an external producer
    pub fn channel(capacity: usize) -> (mpsc::Sender<MotionSample>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            tx,
            Self {
                receiver: Some(rx),
                shutdown: None,
            },
        )
    }

    /// Poll a platform reader on a dedicated thread at a fixed interval
    pub fn spawn<R>(mut reader: R, interval: Duration) -> Self
    where
        R: MotionReader + Send + 'static,
    {
        if !reader.is_available() {
            warn!("{}; motion checks disabled", MotionError::Unavailable);
            return Self::unavailable();
        }

        let (tx, rx) = mpsc::channel::<MotionSample>(100);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        info!("Starting motion feed at {:?} interval", interval);
        std::thread::spawn(move || {
            while !shutdown_clone.load(Ordering::SeqCst) {
                match reader.read() {
                    Ok(sample) => {
                        if tx.blocking_send(sample).is_err() {
                            debug!("Motion receiver dropped");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Motion read error: {}", e);
                    }
                }
                std::thread::sleep(interval);
            }
            debug!("Motion polling thread stopped");
        });

        Self {
            receiver: Some(rx),
            shutdown: Some(shutdown),
        }
    }

    pub fn is_available(&self) -> bool {
        self.receiver.is_some()
    }

    /// Next sample; `None` once closed or when unavailable
    pub async fn next(&mut self) -> Option<MotionSample> {
        match self.receiver.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Stop the producer and refuse further samples
    pub fn close(&mut self) {
        if let Some(flag) = &self.shutdown {
            flag.store(true, Ordering::SeqCst);
        }
        if let Some(rx) = self.receiver.as_mut() {
            rx.close();
        }
    }
}

impl Drop for MotionFeed {
    fn drop(&mut self) {
        if let Some(flag) = &self.shutdown {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FakeSensor {
        available: bool,
        reads: u32,
    }

    impl MotionReader for FakeSensor {
        fn is_available(&self) -> bool {
            self.available
        }

        fn read(&mut self) -> Result<MotionSample, MotionError> {
            self.reads += 1;
            if self.reads % 2 == 0 {
                return Err(MotionError::Read("glitch".to_string()));
            }
            Ok(MotionSample::new(self.reads as f64, 0.0, Utc::now()))
        }
    }

    #[tokio::test]
    async fn test_unavailable_feed_yields_nothing() {
        let mut feed = MotionFeed::unavailable();
        assert!(!feed.is_available());
        assert!(feed.next().await.is_none());
    }

    #[tokio::test]
    async fn test_spawn_without_sensors_degrades() {
        let feed = MotionFeed::spawn(
            FakeSensor {
                available: false,
                reads: 0,
            },
            Duration::from_millis(1),
        );
        assert!(!feed.is_available());
    }

    #[tokio::test]
    async fn test_spawned_feed_skips_read_errors() {
        let mut feed = MotionFeed::spawn(
            FakeSensor {
                available: true,
                reads: 0,
            },
            Duration::from_millis(1),
        );

        let first = feed.next().await.unwrap();
        let second = feed.next().await.unwrap();
        assert_eq!(first.acceleration_z, 1.0);
        assert_eq!(second.acceleration_z, 3.0);

        feed.close();
    }

    #[tokio::test]
    async fn test_channel_feed_close() {
        let (tx, mut feed) = MotionFeed::channel(4);
        tx.send(MotionSample::new(0.1, 0.2, Utc::now())).await.unwrap();
        assert!(feed.next().await.is_some());

        feed.close();
        assert!(tx.send(MotionSample::new(0.1, 0.2, Utc::now())).await.is_err());
        assert!(feed.next().await.is_none());
    }
}
