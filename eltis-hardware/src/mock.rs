//! In-memory serial link
//!
//! Used by the daemon's `--mock` mode and by tests. A recording connector
//! keeps every operation, and written bytes land one at a time on a shared
//! "wire" so that overlapping writes from concurrent sequences would be
//! visible. The daemon uses [`MockConnector::unrecorded`], which only logs.

use async_trait::async_trait;
use eltis_core::protocol::to_hex;
use eltis_core::{DeviceRef, EltisError, Frame, Result, FRAME_LEN};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

use crate::serial_driver::{LinkConnector, SerialLink};

/// Something that happened on a mock link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Opened { link: usize, device: String },
    Wrote { link: usize, frame: Vec<u8> },
    Read { link: usize, ok: bool },
    Closed { link: usize },
}

/// Failure injection and reply content
#[derive(Debug, Clone, Default)]
struct Behavior {
    fail_connect: bool,
    /// Index (per link) of the write that fails
    fail_write: Option<usize>,
    fail_read: bool,
    response: Vec<u8>,
    byte_delay: Option<Duration>,
}

struct Recorder {
    enabled: bool,
    events: Mutex<Vec<LinkEvent>>,
    wire: Mutex<Vec<u8>>,
    next_link: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Recorder {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Mutex::new(Vec::new()),
            wire: Mutex::new(Vec::new()),
            next_link: AtomicUsize::new(0),
        }
    }

    fn push(&self, event: LinkEvent) {
        if self.enabled {
            lock(&self.events).push(event);
        }
    }

    fn put_byte(&self, byte: u8) {
        if self.enabled {
            lock(&self.wire).push(byte);
        }
    }
}

/// Connector producing [`MockLink`]s that share one recorder
#[derive(Clone)]
pub struct MockConnector {
    behavior: Behavior,
    recorder: Arc<Recorder>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self {
            behavior: Behavior::default(),
            recorder: Arc::new(Recorder::new(true)),
        }
    }
}

impl MockConnector {
    /// Connector that records every operation
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector that only logs, for long-running use
    pub fn unrecorded() -> Self {
        Self {
            behavior: Behavior::default(),
            recorder: Arc::new(Recorder::new(false)),
        }
    }

    /// Bytes returned by every read
    pub fn with_response(mut self, response: impl Into<Vec<u8>>) -> Self {
        self.behavior.response = response.into();
        self
    }

    /// Refuse to open links
    pub fn failing_connect(mut self) -> Self {
        self.behavior.fail_connect = true;
        self
    }

    /// Fail the `index`-th write of every link (0 is the Init frame)
    pub fn failing_write(mut self, index: usize) -> Self {
        self.behavior.fail_write = Some(index);
        self
    }

    /// Make every read time out
    pub fn failing_read(mut self) -> Self {
        self.behavior.fail_read = true;
        self
    }

    /// Sleep between bytes instead of just yielding
    pub fn with_byte_delay(mut self, delay: Duration) -> Self {
        self.behavior.byte_delay = Some(delay);
        self
    }

    /// Everything recorded so far, in order
    pub fn events(&self) -> Vec<LinkEvent> {
        lock(&self.recorder.events).clone()
    }

    /// All bytes written by all links, in arrival order
    pub fn wire(&self) -> Vec<u8> {
        lock(&self.recorder.wire).clone()
    }

    /// Frames that were completely written, in order
    pub fn frames_written(&self) -> Vec<Vec<u8>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LinkEvent::Wrote { frame, .. } => Some(frame),
                _ => None,
            })
            .collect()
    }

    /// Number of links successfully opened
    pub fn connect_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LinkEvent::Opened { .. }))
            .count()
    }

    /// Number of links closed
    pub fn close_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LinkEvent::Closed { .. }))
            .count()
    }

    /// Number of reads attempted
    pub fn read_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, LinkEvent::Read { .. }))
            .count()
    }
}

#[async_trait]
impl LinkConnector for MockConnector {
    async fn connect(&self, device: &DeviceRef) -> Result<Box<dyn SerialLink>> {
        if self.behavior.fail_connect {
            return Err(EltisError::Connection(format!(
                "Failed to open serial port: {}: no such device",
                device.path
            )));
        }

        let id = self.recorder.next_link.fetch_add(1, Ordering::SeqCst);
        self.recorder.push(LinkEvent::Opened {
            link: id,
            device: device.path.clone(),
        });
        debug!("Mock link {} opened on {}", id, device.path);

        Ok(Box::new(MockLink {
            id,
            device: device.path.clone(),
            behavior: self.behavior.clone(),
            recorder: Arc::clone(&self.recorder),
            writes: 0,
            closed: false,
        }))
    }
}

/// A single recorded link
pub struct MockLink {
    id: usize,
    device: String,
    behavior: Behavior,
    recorder: Arc<Recorder>,
    writes: usize,
    closed: bool,
}

impl MockLink {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(EltisError::Connection("Serial port is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SerialLink for MockLink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.ensure_open()?;

        let index = self.writes;
        self.writes += 1;
        if self.behavior.fail_write == Some(index) {
            return Err(EltisError::Connection(
                "Write failed: simulated broken pipe".to_string(),
            ));
        }

        for &byte in frame.as_bytes() {
            self.recorder.put_byte(byte);
            match self.behavior.byte_delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
        }

        info!("Mock {} TX: {}", self.device, frame.to_hex());
        self.recorder.push(LinkEvent::Wrote {
            link: self.id,
            frame: frame.as_bytes().to_vec(),
        });
        Ok(())
    }

    async fn read_response(&mut self) -> Result<Vec<u8>> {
        self.ensure_open()?;

        if self.behavior.fail_read {
            self.recorder.push(LinkEvent::Read {
                link: self.id,
                ok: false,
            });
            return Err(EltisError::Timeout("Read operation timed out".to_string()));
        }

        let len = self.behavior.response.len().min(FRAME_LEN);
        let response = self.behavior.response[..len].to_vec();
        debug!("Mock {} RX: {}", self.device, to_hex(&response));
        self.recorder.push(LinkEvent::Read {
            link: self.id,
            ok: true,
        });
        Ok(response)
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.recorder.push(LinkEvent::Closed { link: self.id });
            debug!("Mock link {} closed", self.id);
        }
        Ok(())
    }

    fn device_path(&self) -> &str {
        &self.device
    }
}
