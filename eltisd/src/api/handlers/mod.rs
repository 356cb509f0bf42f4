//! API request handlers for the door daemon.
//!
//! # Handler Modules
//!
//! - [`door`] - Door release endpoints (`/` and `/open/:id`)
//! - [`info`] - Server and device configuration information
//!
//! All handlers accept `State<AppState>` and return
//! `Result<Json<ApiResponse<T>>, ApiError>` for uniform responses.

pub mod door;
pub mod info;
