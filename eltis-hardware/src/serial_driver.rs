//! Serial driver for low-level hardware communication
//!
//! Provides async serial I/O with the door controller board. A link lives for
//! exactly one door sequence and is closed afterwards.

use async_trait::async_trait;
use eltis_core::protocol::to_hex;
use eltis_core::{DeviceRef, EltisError, Frame, Result, FRAME_LEN};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, warn};

/// One open connection to the board
///
/// This trait enables testing of `DoorController` without real hardware
/// by allowing mock implementations.
#[async_trait]
pub trait SerialLink: Send {
    /// Transmit a whole frame
    async fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Read whatever the board sent back, at most one frame length
    async fn read_response(&mut self) -> Result<Vec<u8>>;

    /// Release the underlying port. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;

    /// Path of the device this link talks to
    fn device_path(&self) -> &str;
}

/// Opens links to a resolved device
#[async_trait]
pub trait LinkConnector: Send + Sync {
    async fn connect(&self, device: &DeviceRef) -> Result<Box<dyn SerialLink>>;
}

/// Serial driver for hardware communication
pub struct SerialDriver {
    port: Option<SerialStream>,
    port_path: String,
    timeout_duration: Duration,
}

impl SerialDriver {
    /// Open the serial port described by `device`
    ///
    /// The board expects 8N1 without flow control at the configured baud rate.
    pub fn new(device: &DeviceRef) -> Result<Self> {
        debug!("Opening serial port: {}", device.path);

        let timeout_duration = device.settings.read_timeout();

        let port = tokio_serial::new(&device.path, device.settings.baud_rate)
            .timeout(timeout_duration)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                error!("Failed to open serial port {}: {}", device.path, e);
                EltisError::Connection(format!("Failed to open serial port: {}", e))
            })?;

        // Leftovers from a previous actuation would be read as the Init reply
        if let Err(e) = port.clear(tokio_serial::ClearBuffer::Input) {
            warn!("Failed to clear input buffer: {}", e);
        }

        debug!("Serial port opened successfully");

        Ok(Self {
            port: Some(port),
            port_path: device.path.clone(),
            timeout_duration,
        })
    }

    fn port_mut(&mut self) -> Result<&mut SerialStream> {
        self.port
            .as_mut()
            .ok_or_else(|| EltisError::Connection("Serial port is closed".to_string()))
    }
}

#[async_trait]
impl SerialLink for SerialDriver {
    async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let limit = self.timeout_duration;
        debug!("TX: {}", frame.to_hex());

        let port = self.port_mut()?;

        timeout(limit, port.write_all(frame.as_bytes()))
            .await
            .map_err(|_| {
                error!("Write timeout");
                EltisError::Timeout("Write operation timed out".to_string())
            })?
            .map_err(|e| {
                error!("Write failed: {}", e);
                EltisError::Connection(format!("Write failed: {}", e))
            })?;

        // Flush to ensure data is sent
        timeout(limit, port.flush())
            .await
            .map_err(|_| EltisError::Timeout("Flush operation timed out".to_string()))?
            .map_err(|e| EltisError::Connection(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    async fn read_response(&mut self) -> Result<Vec<u8>> {
        let limit = self.timeout_duration;
        let port = self.port_mut()?;
        let mut buf = [0u8; FRAME_LEN];

        let n = timeout(limit, port.read(&mut buf))
            .await
            .map_err(|_| {
                error!("Read timeout");
                EltisError::Timeout("Read operation timed out".to_string())
            })?
            .map_err(|e| {
                error!("Read error: {}", e);
                EltisError::Connection(format!("Read error: {}", e))
            })?;

        if n == 0 {
            // EOF indicates device disconnection (USB unplugged, power loss, etc.)
            warn!("Serial port returned EOF - device may have been disconnected");
            return Err(EltisError::Connection(
                "Serial port returned EOF - device may have been unplugged".to_string(),
            ));
        }

        debug!("RX: {}", to_hex(&buf[..n]));
        Ok(buf[..n].to_vec())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(port) = self.port.take() {
            drop(port);
            debug!("Serial port closed: {}", self.port_path);
        }
        Ok(())
    }

    fn device_path(&self) -> &str {
        &self.port_path
    }
}

/// Connector that opens real serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

#[async_trait]
impl LinkConnector for SerialConnector {
    async fn connect(&self, device: &DeviceRef) -> Result<Box<dyn SerialLink>> {
        let driver = SerialDriver::new(device)?;
        Ok(Box::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eltis_core::LinkSettings;

    #[tokio::test]
    async fn test_connect_missing_device_is_connection_error() {
        let device = DeviceRef::new("/dev/eltis-test-no-such-device", LinkSettings::default());

        match SerialConnector.connect(&device).await {
            Err(e) => assert!(e.is_connection_error(), "unexpected error: {}", e),
            Ok(_) => panic!("Expected connection failure"),
        }
    }
}
