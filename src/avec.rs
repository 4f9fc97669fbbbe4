//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module decode reports from data slices and readers,
//! handing each device status block to a [`BlockDecoder`] chosen from a
//! [`DecoderRegistry`] by the block's class identifier.
//!
//! Class decoders for blocks of a known shape can be derived. See the
//! [`StatusFields`](macro@StatusFields) macro and [`FieldLayout`] for details.

use core::marker::PhantomData;

use thiserror::Error;
use zerocopy::FromBytes;

use crate::status::DeviceStatus;

#[cfg(feature = "std")]
pub mod reader;
pub mod registry;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::{decode as decode_reader, scan as scan_reader};
pub use registry::DecoderRegistry;
pub use slice::{decode_devices, decode_header, decode_report, scan_all};

/// An error decoding the fields of a status block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    /// The block is shorter than the layout of its class.
    #[error("Status block of {found} bytes is shorter than its class layout ({needed} bytes).")]
    ShortBlock { needed: usize, found: usize },
}

/// Decode the fields of a status block of one device class.
///
/// Any `Fn(&[u8]) -> DeviceStatus` closure or function is a decoder. Decoders
/// are shared between threads, and so must be `Send` and `Sync`.
pub trait BlockDecoder: Send + Sync {
    /// Decode the fields of a status block.
    fn decode(&self, block: &[u8]) -> Result<DeviceStatus, BlockError>;
}

impl<F> BlockDecoder for F
where
    F: Fn(&[u8]) -> DeviceStatus + Send + Sync,
{
    fn decode(&self, block: &[u8]) -> Result<DeviceStatus, BlockError> {
        Ok(self(block))
    }
}

/// Derive [`StatusFields`] for a struct mirroring a status block.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// To publish a struct field, add the `field` attribute to it. The field is
/// published under its name in upper case, or under the name supplied as a
/// string literal. Fields without an attribute, such as padding, are skipped.
/// The field type must be `Copy` and convertible into a [`Value`].
///
/// ```
/// use fgc_statussrv::avec::StatusFields;
/// use zerocopy::{FromBytes, byteorder::big_endian};
///
/// #[repr(C)]
/// #[derive(FromBytes, StatusFields)]
/// struct Common {
///     #[field]
///     data_status: u8,
///     #[field]
///     class_id: u8,
///     #[field("ST_LATCHED")]
///     latched: big_endian::U16,
///     _reserved: [u8; 4],
/// }
/// ```
///
/// To convert a raw value before publishing it, supply a closure taking the
/// field value. Its result must be convertible into a [`Value`].
///
/// ```
/// # use fgc_statussrv::avec::StatusFields;
/// # use zerocopy::{FromBytes, byteorder::big_endian};
/// #[repr(C)]
/// #[derive(FromBytes, StatusFields)]
/// struct Class62 {
///     _common: [u8; 8],
///     #[field("I_MEAS", |v: big_endian::I32| v.get() as f64 / 1000.0)]
///     i_meas: big_endian::I32,
/// }
/// ```
///
/// [`Value`]: crate::status::Value
#[cfg(feature = "derive")]
pub use fgc_statussrv_derive::StatusFields;

/// Publish the fields of a decoded status block.
///
/// See the [`StatusFields`](macro@StatusFields) derive macro for an automatic
/// implementation of this trait.
pub trait StatusFields {
    /// Add every published field to a device status.
    fn add_fields(&self, status: &mut DeviceStatus);
}

/// A [`BlockDecoder`] reading a status block into a struct `T`.
///
/// The struct is read from the start of the block; trailing block bytes
/// beyond the struct are ignored.
pub struct FieldLayout<T>(PhantomData<fn() -> T>);

impl<T> FieldLayout<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FieldLayout<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for FieldLayout<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FieldLayout<{}>", core::any::type_name::<T>())
    }
}

impl<T: FromBytes + StatusFields> BlockDecoder for FieldLayout<T> {
    fn decode(&self, block: &[u8]) -> Result<DeviceStatus, BlockError> {
        let (fields, _) = T::read_from_prefix(block).map_err(|_| BlockError::ShortBlock {
            needed: size_of::<T>(),
            found: block.len(),
        })?;

        let mut status = DeviceStatus::new();
        fields.add_fields(&mut status);
        Ok(status)
    }
}
