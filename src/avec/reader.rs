//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{io::Read, vec};

use log::debug;
use thiserror::Error;

use crate::{
    layout::LayoutConstants,
    sans::Decoder,
    status::{GatewayReport, ReportCollection},
};

use super::{
    DecoderRegistry,
    slice::{self, collect, decode_window},
};

extern crate std;

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An error decoding the bytes of a report.
    #[error(transparent)]
    Slice(#[from] slice::Error),
}

/// Decode a single report from a reader.
///
/// Reads exactly one report's worth of bytes. Returns `None` if no report was
/// written at this position.
///
/// This method is also re-exported as `fgc_statussrv::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(
    r: &mut impl Read,
    layout: LayoutConstants,
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<Option<GatewayReport>, Error> {
    let mut window = vec![0; layout.stride()];
    r.read_exact(&mut window)?;

    let (report, _) = decode_window(Decoder::new(layout), &window, registry, common_only)?;
    Ok(report)
}

/// Decode every report from a reader of a batch buffer, keying them by
/// hostname.
///
/// Reads one report at a time until the end of the reader. A final partial
/// report is ignored. A later report replaces an earlier one with the same
/// hostname.
///
/// This method is also re-exported as `fgc_statussrv::avec::scan_reader`.
///
/// _Requires Cargo feature `std`._
pub fn scan(
    r: &mut impl Read,
    layout: LayoutConstants,
    registry: &DecoderRegistry,
    common_only: bool,
) -> Result<ReportCollection, Error> {
    let stride = layout.stride();
    let mut window = vec![0; stride];

    let mut reports = ReportCollection::new();
    let mut prefix = Decoder::new(layout);
    let mut offset = 0;

    loop {
        let filled = fill(r, &mut window)?;

        if filled < stride {
            if filled != 0 {
                debug!("Ignoring {filled} trailing bytes after the last report.");
            }
            break;
        }

        let (report, successor) = decode_window(prefix, &window, registry, common_only)?;
        prefix = successor;

        match report {
            Some(report) => collect(&mut reports, report),
            None => debug!("No report at offset {offset}."),
        }

        offset += stride;
    }

    Ok(reports)
}

/// Read from a reader until a buffer is full or the reader is exhausted.
///
/// Returns the number of bytes read.
fn fill(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => Err(e)?,
        }
    }

    Ok(filled)
}
