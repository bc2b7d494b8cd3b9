//! Tracing setup and the op-boundary macros
//!
//! Binaries call [`init`] once with the configured [`Profile`]. Library code
//! only emits through `log_op_start!`, `log_op_end!` and `log_op_error!`, which
//! stamp the field keys listed in [`crate::schema`]. Tests install
//! [`init_test_capture`] instead and read events back.
//!
//! ```rust
//! use nova4d_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
