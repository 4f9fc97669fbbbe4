#![no_std]

//! A decoder for the binary status reports published by FGC gateways.
//!
//! A gateway multiplexes the status of its attached devices into one report:
//! a table of device names, a header identifying the gateway, and a fixed-size
//! status block per channel. A status server publishes these reports singly,
//! or concatenated for every known gateway.
//!
//! Most users should begin with the [`query::StatusClient`], or with the
//! functions in the [`avec`] module when they already hold report bytes. If
//! these prove insufficient, consider driving the state machine in the
//! [`sans`] module directly.
//!
//! Report dimensions differ between gateway builds; describe them with a
//! [`LayoutConstants`]. The fields of each status block depend on its device
//! class and are decoded by a [`DecoderRegistry`](avec::DecoderRegistry).
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).
//! - `serde`: deserialize layouts and serialize decoded reports.

extern crate alloc;

pub mod avec;
pub mod layout;
pub mod query;
pub mod sans;
pub mod status;

pub use layout::LayoutConstants;
pub use status::{DeviceStatus, GatewayReport, ReportCollection, ReportHeader, Value};
