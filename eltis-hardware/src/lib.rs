//! eltis-hardware
//!
//! Hardware crate containing the serial link, device discovery and the door
//! controller that sequences the board's command frames. Used by the `eltisd`
//! server.
//
//! Public API:
//! - `door_controller::DoorController`: serialized Init + Open sequence
//! - `serial_driver::SerialDriver`: tokio-serial link to the board
//! - `device::{FixedDevice, GlobDevice}`: device path resolution
//! - `mock::MockConnector`: in-memory link for development and tests

pub mod device;
pub mod door_controller;
pub mod mock;
pub mod serial_driver;

pub use device::{resolver_for, DeviceResolver, FixedDevice, GlobDevice};
pub use door_controller::{DoorController, OpenReport};
pub use mock::{LinkEvent, MockConnector};
pub use serial_driver::{LinkConnector, SerialConnector, SerialDriver, SerialLink};

