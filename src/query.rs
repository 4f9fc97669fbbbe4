//! Queries against a status server.
//!
//! A [`StatusClient`] fetches report buffers through a [`Transport`] and
//! decodes them. Fetching is left to the transport: it may hold a session,
//! retry, or time out as it sees fit. Its errors are passed through untouched.

use alloc::{string::String, sync::Arc, vec::Vec};

use thiserror::Error;

use crate::{
    avec::{DecoderRegistry, slice},
    layout::LayoutConstants,
    status::{DeviceStatus, ReportCollection, ReportHeader},
};

/// Name of the device publishing gateway status reports.
pub const STATUS_SERVER: &str = "FGC_STATUS";

/// A request for status data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// The report of the gateway hosting a device.
    Device(&'a str),
    /// The reports of every known gateway, concatenated.
    All,
}

impl Query<'_> {
    /// The property requested from the status server.
    pub fn property(&self) -> &str {
        match self {
            Query::Device(name) => name,
            Query::All => "ALL",
        }
    }
}

/// Fetch raw report buffers.
pub trait Transport {
    /// An error fetching a buffer.
    type Error: core::error::Error + 'static;

    /// Fetch the buffer answering a query.
    fn fetch(&self, query: Query<'_>) -> Result<Vec<u8>, Self::Error>;
}

/// Errors occurring while querying a status server.
#[derive(Debug, Error)]
pub enum Error<E> {
    /// The transport failed to fetch a buffer.
    #[error("Failed to fetch status data: {0}")]
    Fetch(#[source] E),
    /// The fetched buffer could not be decoded.
    #[error("Failed to decode status data: {0}")]
    Decode(#[from] slice::Error),
    /// The device is absent from the report of its gateway.
    #[error("Device {0} not found in the gateway report.")]
    DeviceNotFound(String),
}

/// The status of one device, with the header of its gateway's report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceReport {
    pub header: ReportHeader,
    pub status: Arc<DeviceStatus>,
}

/// A client decoding reports fetched from a status server.
#[derive(Debug)]
pub struct StatusClient<T> {
    transport: T,
    layout: LayoutConstants,
    registry: DecoderRegistry,
}

impl<T: Transport> StatusClient<T> {
    pub fn new(transport: T, layout: LayoutConstants, registry: DecoderRegistry) -> Self {
        Self {
            transport,
            layout,
            registry,
        }
    }

    /// Fetch and decode the status of a single device.
    ///
    /// Set `common_only` to decode only the fields shared by every class.
    pub fn get_device(
        &self,
        name: &str,
        common_only: bool,
    ) -> Result<DeviceReport, Error<T::Error>> {
        let buffer = self
            .transport
            .fetch(Query::Device(name))
            .map_err(Error::Fetch)?;

        let report = slice::decode_report(&buffer, self.layout, &self.registry, common_only)?;

        let (header, status) = report
            .and_then(|report| report.into_device(name))
            .ok_or_else(|| Error::DeviceNotFound(name.into()))?;

        Ok(DeviceReport { header, status })
    }

    /// Fetch and decode the reports of every known gateway.
    ///
    /// Set `common_only` to decode only the fields shared by every class.
    pub fn get_all(&self, common_only: bool) -> Result<ReportCollection, Error<T::Error>> {
        let buffer = self.transport.fetch(Query::All).map_err(Error::Fetch)?;

        Ok(slice::scan_all(
            &buffer,
            self.layout,
            &self.registry,
            common_only,
        )?)
    }

    pub fn layout(&self) -> LayoutConstants {
        self.layout
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
