//! Internal finite-state machine for implementing decoders.
//!
//! This module is intended for applications that need fine control over how
//! report bytes are read, for example when streaming from a device or a
//! socket. See [`crate::avec`] for implementations covering common decoding
//! patterns.
//!
//! # Architecture
//!
//! Each region of a report is represented by a non-copy state token. Once the
//! bytes of that region are available, transition to another state by calling
//! the token's `advance` method. This returns a successor state token, along
//! with any extracted data. Tokens advanced with a slice expect exactly the
//! number of bytes reported by their `width` or `size` method.
//!
//! A report is walked in this order:
//!
//! 1. [`ReportPrefix`](header::ReportPrefix): the four opaque leading bytes.
//! 2. [`NameField`](header::NameField): one entry of the name table per
//!    channel.
//! 3. [`HostName`](header::HostName): the gateway hostname. An empty hostname
//!    means no report was written at this position; the machine returns to
//!    [`ReportPrefix`](header::ReportPrefix), and the caller must skip the rest
//!    of the report before advancing it.
//! 4. [`Scalars`](header::Scalars): the eight header integers.
//! 5. [`DeviceBlock`](device::DeviceBlock): one status block per channel. The
//!    final block leads back to [`ReportPrefix`](header::ReportPrefix) for the
//!    next report of a batch.
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed. Decoding the fields of a status block is left to the caller,
//! which receives the block's class identifier from the machine.

pub mod device;
pub mod header;

/// Entrypoint to the finite-state machine.
pub type Decoder = header::ReportPrefix;
