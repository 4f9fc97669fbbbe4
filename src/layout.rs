//! Dimensions of a gateway status report.
//!
//! Every offset in a report is derived from the four values held by
//! [`LayoutConstants`]. They differ between gateway builds, so they are
//! supplied by the caller rather than compiled in.

use thiserror::Error;

/// Width in bytes of the hostname field used by production gateways.
pub const HOST_NAME_MAX: usize = 68;

/// Size in bytes of the unidentified prefix preceding every report.
pub const PREFIX_SIZE: usize = 4;

/// Size in bytes of the eight big-endian integers following the hostname.
pub const SCALARS_SIZE: usize = 8 * size_of::<i32>();

/// Offset of the class identifier within a device status block.
pub const CLASS_ID_OFFSET: usize = 1;

/// An error constructing a layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A dimension was zero.
    #[error("Layout dimension `{0}` must be non-zero.")]
    Zero(&'static str),
    /// Status blocks cannot hold a class identifier.
    #[error("Status blocks of {0} bytes cannot hold a class identifier.")]
    BlockTooSmall(usize),
    /// A derived size does not fit in `usize`.
    #[error("Layout sizes overflow the address space.")]
    Overflow,
}

/// The dimensions of a gateway status report.
///
/// Build once at startup and pass by value to every decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LayoutConfig")
)]
pub struct LayoutConstants {
    max_name_len: usize,
    max_devices: usize,
    host_name_width: usize,
    status_block_size: usize,
}

impl LayoutConstants {
    /// Validate and construct a layout.
    pub fn new(
        max_name_len: usize,
        max_devices: usize,
        host_name_width: usize,
        status_block_size: usize,
    ) -> Result<Self, LayoutError> {
        for (name, value) in [
            ("max_name_len", max_name_len),
            ("max_devices", max_devices),
            ("host_name_width", host_name_width),
            ("status_block_size", status_block_size),
        ] {
            if value == 0 {
                Err(LayoutError::Zero(name))?;
            }
        }

        if status_block_size <= CLASS_ID_OFFSET {
            Err(LayoutError::BlockTooSmall(status_block_size))?;
        }

        let layout = Self {
            max_name_len,
            max_devices,
            host_name_width,
            status_block_size,
        };
        layout.checked_stride().ok_or(LayoutError::Overflow)?;

        Ok(layout)
    }

    // Every derived size is a partial sum of the stride, so bounding the
    // stride bounds them all.
    fn checked_stride(&self) -> Option<usize> {
        let names = self.max_devices.checked_mul(self.max_name_len.checked_add(1)?)?;
        let devices = self.max_devices.checked_mul(self.status_block_size)?;

        names
            .checked_add(self.host_name_width)?
            .checked_add(SCALARS_SIZE)?
            .checked_add(PREFIX_SIZE)?
            .checked_add(devices)
    }

    /// Maximum length of a device name, excluding the terminator.
    pub fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    /// Number of device slots (channels) in every report.
    pub fn max_devices(&self) -> usize {
        self.max_devices
    }

    /// Width of the hostname field.
    pub fn host_name_width(&self) -> usize {
        self.host_name_width
    }

    /// Size of one device status block.
    pub fn status_block_size(&self) -> usize {
        self.status_block_size
    }

    /// Width of one entry of the name table.
    pub fn name_field_width(&self) -> usize {
        self.max_name_len + 1
    }

    /// Size of the name table.
    pub fn name_table_size(&self) -> usize {
        self.max_devices * self.name_field_width()
    }

    /// Size of the header: name table, hostname and scalar fields.
    pub fn header_size(&self) -> usize {
        self.name_table_size() + self.host_name_width + SCALARS_SIZE
    }

    /// Size of the device status region following the header.
    pub fn device_region_size(&self) -> usize {
        self.max_devices * self.status_block_size
    }

    /// Size of one complete report, including its prefix.
    ///
    /// Reports in a batch buffer are laid out back to back at this stride.
    pub fn stride(&self) -> usize {
        PREFIX_SIZE + self.header_size() + self.device_region_size()
    }
}

/// Unvalidated layout as read from configuration.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LayoutConfig {
    max_name_len: usize,
    max_devices: usize,
    #[serde(default = "default_host_name_width")]
    host_name_width: usize,
    status_block_size: usize,
}

#[cfg(feature = "serde")]
fn default_host_name_width() -> usize {
    HOST_NAME_MAX
}

#[cfg(feature = "serde")]
impl TryFrom<LayoutConfig> for LayoutConstants {
    type Error = LayoutError;

    fn try_from(c: LayoutConfig) -> Result<Self, Self::Error> {
        Self::new(
            c.max_name_len,
            c.max_devices,
            c.host_name_width,
            c.status_block_size,
        )
    }
}
