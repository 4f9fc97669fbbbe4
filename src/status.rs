//! Decoded report values.
//!
//! Everything here owns its data. A decoded report holds no reference to the
//! buffer it came from.

use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    string::String,
    sync::Arc,
    vec::Vec,
};

use zerocopy::byteorder::{ByteOrder, F32, F64, I16, I32, I64, U16, U32, U64};

/// Field injected into every device status with its channel number.
pub const CHANNEL: &str = "CHANNEL";
/// Field injected into the status of a named device with its name.
pub const NAME: &str = "NAME";

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    Int(i64),
    /// An unsigned integer beyond the range of [`Value::Int`].
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Value {
    /// The value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an unsigned integer, if it is a non-negative integer.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Int(v) => u64::try_from(*v).ok(),
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($variant:ident($into:ty): $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(<$into>::from(v))
                }
            }
        )*
    };
}

value_from!(Int(i64): i8, i16, i32, i64, u8, u16, u32);
value_from!(Float(f64): f32, f64);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::UInt(v), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

macro_rules! value_from_byteorder {
    ($variant:ident($into:ty): $($t:ident),*) => {
        $(
            impl<O: ByteOrder> From<$t<O>> for Value {
                fn from(v: $t<O>) -> Self {
                    Value::$variant(<$into>::from(v.get()))
                }
            }
        )*
    };
}

value_from_byteorder!(Int(i64): I16, I32, I64, U16, U32);
value_from_byteorder!(Float(f64): F32, F64);

impl<O: ByteOrder> From<U64<O>> for Value {
    fn from(v: U64<O>) -> Self {
        Value::from(v.get())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

/// A NUL-padded character field.
impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::Str(nul_terminated(&v))
    }
}

/// Read a string up to the first NUL byte, replacing invalid UTF-8.
pub(crate) fn nul_terminated(r: &[u8]) -> String {
    let end = r.iter().position(|&b| b == 0).unwrap_or(r.len());
    String::from_utf8_lossy(&r[..end]).into_owned()
}

/// The fields decoded from one device status block, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct DeviceStatus(BTreeMap<String, Value>);

impl DeviceStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The channel this status was decoded from.
    pub fn channel(&self) -> Option<usize> {
        self.get(CHANNEL)
            .and_then(Value::as_int)
            .and_then(|c| usize::try_from(c).ok())
    }

    /// The device name, for named slots.
    pub fn name(&self) -> Option<&str> {
        self.get(NAME).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The scalar fields heading a gateway report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReportHeader {
    pub hostname: String,
    pub recv_time_sec: i32,
    pub recv_time_usec: i32,
    pub id: i32,
    pub sequence: i32,
    pub send_time_sec: i32,
    pub send_time_usec: i32,
    pub time_sec: i32,
    pub time_usec: i32,
}

/// The device names of a report, indexed by channel.
///
/// Unnamed slots hold `None`.
pub type NameTable = Vec<Option<String>>;

/// Every device status of a report, indexed by channel.
pub type ChannelMap = Vec<Arc<DeviceStatus>>;

/// The statuses of named devices, keyed by name.
///
/// Values are shared with the [`ChannelMap`] of the same report.
pub type DeviceMap = BTreeMap<String, Arc<DeviceStatus>>;

/// Reports decoded from a batch buffer, keyed by hostname.
pub type ReportCollection = BTreeMap<String, GatewayReport>;

/// One decoded gateway report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GatewayReport {
    header: ReportHeader,
    channels: ChannelMap,
    devices: DeviceMap,
}

impl GatewayReport {
    pub(crate) fn new(header: ReportHeader, channels: ChannelMap, devices: DeviceMap) -> Self {
        Self {
            header,
            channels,
            devices,
        }
    }

    pub fn header(&self) -> &ReportHeader {
        &self.header
    }

    pub fn hostname(&self) -> &str {
        &self.header.hostname
    }

    /// The status of the device in a channel.
    pub fn channel(&self, channel: usize) -> Option<&Arc<DeviceStatus>> {
        self.channels.get(channel)
    }

    /// Every slot of the report, named or not, in channel order.
    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// The status of a named device.
    pub fn device(&self, name: &str) -> Option<&Arc<DeviceStatus>> {
        self.devices.get(name)
    }

    pub fn devices(&self) -> &DeviceMap {
        &self.devices
    }

    /// Split the report into its header and the status of one device.
    pub(crate) fn into_device(self, name: &str) -> Option<(ReportHeader, Arc<DeviceStatus>)> {
        let Self {
            header,
            mut devices,
            ..
        } = self;

        devices.remove(name).map(|status| (header, status))
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}
