//! Door Controller - orchestrates one door-open sequence
//!
//! A sequence is: lock, resolve device, open link, Init frame, optional Init
//! reply, Open frame, close link, unlock. The board cannot cope with
//! overlapping sequences, so the whole sequence runs under a guard owned by
//! the controller.
//!
//! Each sequence runs in its own task. Dropping the future returned by
//! [`DoorController::open`] only stops waiting for the outcome; the frames
//! already started are still written whole and the link is still closed.

use crate::device::DeviceResolver;
use crate::serial_driver::{LinkConnector, SerialLink};
use eltis_core::protocol::to_hex;
use eltis_core::{
    Command, DeviceRef, DoorId, EltisError, InitResponsePolicy, LinkSettings, Result,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// Outcome of a successful door-open sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenReport {
    /// Door that was released
    pub door: DoorId,
    /// Device the frames were written to
    pub device: String,
    /// Raw Init reply, if one was read
    pub init_response: Option<Vec<u8>>,
}

/// Door controller interface
///
/// Created once at startup and shared by all request handlers.
pub struct DoorController {
    resolver: Arc<dyn DeviceResolver>,
    connector: Arc<dyn LinkConnector>,
    settings: LinkSettings,
    init_policy: InitResponsePolicy,
    /// Held for the full duration of one sequence
    guard: Arc<Mutex<()>>,
}

impl DoorController {
    /// Create a new DoorController with the default Init reply policy
    pub fn new(
        resolver: Arc<dyn DeviceResolver>,
        connector: Arc<dyn LinkConnector>,
        settings: LinkSettings,
    ) -> Self {
        Self {
            resolver,
            connector,
            settings,
            init_policy: InitResponsePolicy::default(),
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Set how the Init reply is handled
    pub fn with_init_policy(mut self, policy: InitResponsePolicy) -> Self {
        self.init_policy = policy;
        self
    }

    pub fn init_policy(&self) -> InitResponsePolicy {
        self.init_policy
    }

    pub fn settings(&self) -> LinkSettings {
        self.settings
    }

    /// Whether a sequence is currently running
    pub fn is_busy(&self) -> bool {
        self.guard.try_lock().is_err()
    }

    /// Release a door.
    ///
    /// Waits for any running sequence to finish first. On every exit path the
    /// link is closed before the guard is released. The sequence is detached
    /// from the caller, so cancelling this future does not cut it short.
    pub async fn open(&self, door: DoorId) -> Result<OpenReport> {
        let sequence = Sequence {
            resolver: Arc::clone(&self.resolver),
            connector: Arc::clone(&self.connector),
            settings: self.settings,
            init_policy: self.init_policy,
            guard: Arc::clone(&self.guard),
        };

        joined(tokio::spawn(sequence.run(door)).await)
    }
}

/// Everything one sequence needs, owned so it can run as its own task
struct Sequence {
    resolver: Arc<dyn DeviceResolver>,
    connector: Arc<dyn LinkConnector>,
    settings: LinkSettings,
    init_policy: InitResponsePolicy,
    guard: Arc<Mutex<()>>,
}

impl Sequence {
    async fn run(self, door: DoorId) -> Result<OpenReport> {
        let _guard = self.guard.lock().await;
        debug!("Open door {}", door);

        let resolver = Arc::clone(&self.resolver);
        let path = joined(tokio::task::spawn_blocking(move || resolver.resolve()).await)
            .map_err(|e| {
                error!("Device resolution failed: {}", e);
                e
            })?;
        let device = DeviceRef::new(path, self.settings);
        debug!("Using device: {}", device.path);

        let mut link = self.connector.connect(&device).await.map_err(|e| {
            error!("Connection to {} failed: {}", device.path, e);
            e
        })?;
        debug!("Link open on {}", link.device_path());

        let result = self.exchange(link.as_mut(), door).await;

        if let Err(e) = link.close().await {
            warn!("Failed to close {}: {}", device.path, e);
        }

        let init_response = result?;
        info!("Door {} opened via {}", door, device.path);

        Ok(OpenReport {
            door,
            device: device.path,
            init_response,
        })
    }

    /// Handshake and door command on an already open link
    async fn exchange(&self, link: &mut dyn SerialLink, door: DoorId) -> Result<Option<Vec<u8>>> {
        link.write_frame(&Command::Init.encode())
            .await
            .map_err(|e| {
                error!("Board initialization failed: {}", e);
                e
            })?;

        let init_response = self.read_init_response(link).await?;

        link.write_frame(&Command::Open(door).encode())
            .await
            .map_err(|e| {
                error!("Open command for door {} failed: {}", door, e);
                e
            })?;

        Ok(init_response)
    }

    async fn read_init_response(&self, link: &mut dyn SerialLink) -> Result<Option<Vec<u8>>> {
        match self.init_policy {
            InitResponsePolicy::Skip => Ok(None),
            InitResponsePolicy::BestEffort => match link.read_response().await {
                Ok(bytes) => {
                    debug!("Init reply: {}", to_hex(&bytes));
                    Ok(Some(bytes))
                }
                Err(e) => {
                    warn!("Init reply read failed, continuing: {}", e);
                    Ok(None)
                }
            },
            InitResponsePolicy::Required => {
                let bytes = link.read_response().await.map_err(|e| {
                    error!("Init reply read failed: {}", e);
                    e
                })?;
                debug!("Init reply: {}", to_hex(&bytes));
                Ok(Some(bytes))
            }
        }
    }
}

/// Unwrap a task outcome, re-raising panics on the awaiting side
fn joined<T>(outcome: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    match outcome {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(EltisError::Other(format!("Door sequence aborted: {}", e))),
    }
}
