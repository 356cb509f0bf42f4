//! Door controller construction
//!
//! Wires the device resolver and link connector from the `eltis_hardware`
//! crate according to the configuration.

use eltis_core::DeviceConfig;
use eltis_hardware::{
    resolver_for, DeviceResolver, DoorController, FixedDevice, LinkConnector, MockConnector,
    SerialConnector,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Device name reported in mock mode when no path is configured
const MOCK_DEVICE: &str = "mock";

/// Build the door controller for this process.
///
/// In mock mode frames go to an in-memory link and are logged instead of
/// written to a serial port.
pub(crate) fn build_controller(device: &DeviceConfig, mock: bool) -> DoorController {
    let (resolver, connector): (Arc<dyn DeviceResolver>, Arc<dyn LinkConnector>) = if mock {
        info!("Mock mode: no serial port will be opened");
        let path = device
            .path
            .clone()
            .unwrap_or_else(|| MOCK_DEVICE.to_string());
        (
            Arc::new(FixedDevice::new(path)),
            Arc::new(MockConnector::unrecorded()),
        )
    } else {
        match &device.path {
            Some(path) => info!("Using configured device: {}", path),
            None => info!("Discovering device with pattern: {}", device.pattern),
        }
        (resolver_for(device), Arc::new(SerialConnector))
    };

    if !mock {
        probe(resolver.as_ref());
    }

    DoorController::new(resolver, connector, device.link_settings())
        .with_init_policy(device.init_response)
}

/// Report at startup whether a device is currently present.
///
/// Resolution runs again for every request, so a missing board is only a
/// warning here.
fn probe(resolver: &dyn DeviceResolver) {
    match resolver.resolve() {
        Ok(path) => info!("Device currently available at: {}", path),
        Err(e) => warn!("No device available yet ({}); requests will fail until one appears", e),
    }
}
