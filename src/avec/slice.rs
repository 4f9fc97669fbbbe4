//! Slice-based decoder implementation.

use alloc::{string::String, sync::Arc};

use either::Either::{self, Left, Right};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
    layout::LayoutConstants,
    sans::{
        Decoder,
        device::DeviceBlock,
        header::{NameField, ReportPrefix},
    },
    status::{
        CHANNEL, ChannelMap, DeviceMap, GatewayReport, NAME, NameTable, ReportCollection,
        ReportHeader,
    },
};

use super::{BlockError, DecoderRegistry};

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Unexpectedly reached the end of the slice.
    #[error("Unexpectedly reached the end of the slice ({needed} bytes needed, {available} available).")]
    TruncatedBuffer { needed: usize, available: usize },
    /// A class decoder rejected a status block.
    #[error("Failed to decode the status block of channel {channel}: {source}")]
    Block {
        channel: usize,
        #[source]
        source: BlockError,
    },
}

/// Decode the name table and header at the start of a slice.
///
/// The slice must begin at the name table, after the report prefix. Returns
/// `None` if the header holds an empty hostname, meaning no report was written
/// at this position.
pub fn decode_header(
    r: &[u8],
    layout: LayoutConstants,
) -> Result<Option<(ReportHeader, NameTable)>, Error> {
    let i = &mut 0;

    let header = decode_header_from(NameField::start(layout), r, i)?;

    Ok(header.left().map(|(header, names, _)| (header, names)))
}

/// Decode every device status block at the start of a slice.
///
/// The slice must begin at the device region, immediately after the header.
/// Returns the status of every channel, and the statuses of named channels
/// keyed by name.
pub fn decode_devices(
    r: &[u8],
    names: &NameTable,
    layout: LayoutConstants,
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<(ChannelMap, DeviceMap), Error> {
    let i = &mut 0;

    let (channels, devices, _) =
        decode_devices_from(DeviceBlock::start(layout), r, i, names, registry, common_only)?;

    Ok((channels, devices))
}

/// Decode a single report from the start of a slice.
///
/// Returns `None` if no report was written at this position.
pub fn decode_report(
    r: &[u8],
    layout: LayoutConstants,
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<Option<GatewayReport>, Error> {
    let (report, _) = decode_window(Decoder::new(layout), r, registry, common_only)?;
    Ok(report)
}

/// Decode every report of a batch buffer, keying them by hostname.
///
/// Reports are read at a fixed stride from the start of the slice. Positions
/// holding no report are skipped, as are trailing bytes too few to hold a
/// report. A later report replaces an earlier one with the same hostname.
pub fn scan_all(
    r: &[u8],
    layout: LayoutConstants,
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<ReportCollection, Error> {
    let stride = layout.stride();
    let windows = r.chunks_exact(stride);

    let trailing = windows.remainder().len();
    if trailing != 0 {
        debug!("Ignoring {trailing} trailing bytes after the last report.");
    }

    let mut reports = ReportCollection::new();
    let mut prefix = Decoder::new(layout);

    for (n, window) in windows.enumerate() {
        let (report, successor) = decode_window(prefix, window, registry, common_only)?;
        prefix = successor;

        match report {
            Some(report) => collect(&mut reports, report),
            None => debug!("No report at offset {}.", n * stride),
        }
    }

    Ok(reports)
}

/// Insert a report into a collection, replacing any with the same hostname.
pub(crate) fn collect(reports: &mut ReportCollection, report: GatewayReport) {
    let hostname = String::from(report.hostname());

    if reports.contains_key(&hostname) {
        warn!("Duplicate report for gateway {hostname}, keeping the later one.");
    }

    reports.insert(hostname, report);
}

/// Decode one report from the start of a slice, continuing from a prefix
/// state.
///
/// Returns the report if one was written, and the prefix state of the
/// following report.
pub(crate) fn decode_window(
    state: ReportPrefix,
    r: &[u8],
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<(Option<GatewayReport>, ReportPrefix), Error> {
    let i = &mut 0;

    let state = state.advance(take(r, i)?);

    let (header, names, state) = match decode_header_from(state, r, i)? {
        Left(header) => header,
        Right(successor) => return Ok((None, successor)),
    };

    let (channels, devices, successor) =
        decode_devices_from(state, r, i, &names, registry, common_only)?;

    trace!(
        "Decoded report of {} with {} named devices.",
        header.hostname,
        devices.len()
    );

    Ok((Some(GatewayReport::new(header, channels, devices)), successor))
}

type Header = (ReportHeader, NameTable, DeviceBlock);

fn decode_header_from(
    mut state: NameField,
    r: &[u8],
    i: &mut usize,
) -> Result<Either<Header, ReportPrefix>, Error> {
    // The header is fixed-size: refuse a short one even if it would turn out
    // to hold no report.
    let needed = *i + state.layout.header_size();
    if r.len() < needed {
        Err(Error::TruncatedBuffer {
            needed,
            available: r.len(),
        })?;
    }

    let mut names = NameTable::with_capacity(state.layout.max_devices());

    let state = loop {
        let width = state.width();
        let (_, name, successor) = state.advance(take_slice(r, i, width)?);
        names.push(name);

        state = match successor {
            Left(state) => state,
            Right(state) => break state,
        };
    };

    let width = state.width();
    let state = match state.advance(take_slice(r, i, width)?) {
        Left(state) => state,
        Right(successor) => return Ok(Right(successor)),
    };

    let (header, state) = state.advance(take(r, i)?);

    Ok(Left((header, names, state)))
}

fn decode_devices_from(
    mut state: DeviceBlock,
    r: &[u8],
    i: &mut usize,
    names: &NameTable,
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<(ChannelMap, DeviceMap, ReportPrefix), Error> {
    let mut channels = ChannelMap::with_capacity(state.layout.max_devices());
    let mut devices = DeviceMap::new();

    let successor = loop {
        let block = take_slice(r, i, state.size())?;
        let (channel, class_id, successor) = state.advance(block);

        trace!("Channel {channel} holds a device of class {class_id}.");

        let mut status = registry
            .select(class_id, common_only)
            .decode(block)
            .map_err(|source| Error::Block { channel, source })?;

        status.insert(CHANNEL, channel as i64);

        let name = names.get(channel).and_then(Option::as_ref);
        if let Some(name) = name {
            status.insert(NAME, name.as_str());
        }

        let status = Arc::new(status);
        if let Some(name) = name {
            devices.insert(name.clone(), Arc::clone(&status));
        }
        channels.push(status);

        state = match successor {
            Left(state) => state,
            Right(state) => break state,
        };
    };

    Ok((channels, devices, successor))
}

/// Take an exact number of bytes from an offset in a slice, advancing the offset.
fn take<const N: usize>(r: &[u8], i: &mut usize) -> Result<[u8; N], Error> {
    let mut buf = [0; N];
    buf.copy_from_slice(take_slice(r, i, N)?);
    Ok(buf)
}

/// Take a run of bytes from an offset in a slice, advancing the offset.
fn take_slice<'a>(r: &'a [u8], i: &mut usize, n: usize) -> Result<&'a [u8], Error> {
    let s = *i;
    let end = s + n;

    let bytes = r.get(s..end).ok_or(Error::TruncatedBuffer {
        needed: end,
        available: r.len(),
    })?;

    *i = end;
    Ok(bytes)
}
