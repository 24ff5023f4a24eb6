//! Host-side codec for the WMI control channel of a radio co-processor.
//!
//! The firmware speaks a TLV-framed message format: every command is a
//! sequence of `{tag, len}` records, and every event arrives as one. This
//! crate builds command buffers, validates and extracts event buffers,
//! translates device identifiers between host and firmware numbering, and
//! runs the one-shot ABI/capability negotiation at bring-up. It does no I/O
//! of its own; a [`transport::WmiTransport`] implementation moves the bytes.
//!
//! All state is per device, held in a [`device::WmiDevice`]. Wire-layout
//! constants and packed structs live in the `wmi-wire` crate.

pub mod builder;
pub mod device;
pub mod error;
pub mod events;
pub mod negotiation;
pub mod ops;
pub mod params;
pub mod parser;
pub mod pdev;
pub mod services;
pub mod transport;

#[cfg(test)]
mod proptests;

pub use device::{WmiConfig, WmiDevice};
pub use error::{Result, WmiError};
pub use events::WmiEvent;
pub use ops::{Backend, OpId};
