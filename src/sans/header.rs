//! States processing the report prefix and header.

use alloc::string::String;

use either::Either::{self, Left, Right};
use zerocopy::{FromBytes, byteorder::big_endian::I32};

use crate::{
    layout::{LayoutConstants, PREFIX_SIZE, SCALARS_SIZE},
    status::{ReportHeader, nul_terminated},
};

use super::device::DeviceBlock;

/// State token to decode the prefix of a report.
#[derive(Debug)]
pub struct ReportPrefix {
    pub(crate) layout: LayoutConstants,
}

impl ReportPrefix {
    /// Begin decoding a report of the given layout.
    pub fn new(layout: LayoutConstants) -> Self {
        Self { layout }
    }

    /// Transition to another state by decoding the prefix of a report.
    ///
    /// The meaning of the prefix is unknown, and its bytes are discarded.
    ///
    /// Returns the successor state token.
    pub fn advance(self, _r: [u8; PREFIX_SIZE]) -> NameField {
        NameField::start(self.layout)
    }
}

/// State token to decode one entry of the name table.
#[derive(Debug)]
pub struct NameField {
    pub(crate) layout: LayoutConstants,
    pub(crate) channel: usize,
}

impl NameField {
    /// Begin decoding at the first entry of the name table.
    pub(crate) fn start(layout: LayoutConstants) -> Self {
        Self { layout, channel: 0 }
    }

    /// Number of bytes expected by [`Self::advance`].
    pub fn width(&self) -> usize {
        self.layout.name_field_width()
    }

    /// Transition to another state by decoding one entry of the name table.
    ///
    /// Returns the channel of the entry, the device name if the slot is named,
    /// and a successor state token.
    pub fn advance(self, r: &[u8]) -> (usize, Option<String>, Either<NameField, HostName>) {
        let name = nul_terminated(r);
        let name = (!name.is_empty()).then_some(name);

        let channel = self.channel;
        let successor = if channel + 1 < self.layout.max_devices() {
            Left(NameField {
                layout: self.layout,
                channel: channel + 1,
            })
        } else {
            Right(HostName {
                layout: self.layout,
            })
        };

        (channel, name, successor)
    }
}

/// State token to decode the gateway hostname.
#[derive(Debug)]
pub struct HostName {
    pub(crate) layout: LayoutConstants,
}

impl HostName {
    /// Number of bytes expected by [`Self::advance`].
    pub fn width(&self) -> usize {
        self.layout.host_name_width()
    }

    /// Transition to another state by decoding the gateway hostname.
    ///
    /// An empty hostname marks a position holding no report. In that case the
    /// successor is the prefix state of the following report, and the caller
    /// must discard the remaining bytes of this one before advancing it.
    pub fn advance(self, r: &[u8]) -> Either<Scalars, ReportPrefix> {
        let hostname = nul_terminated(r);

        if hostname.is_empty() {
            Right(ReportPrefix {
                layout: self.layout,
            })
        } else {
            Left(Scalars {
                layout: self.layout,
                hostname,
            })
        }
    }
}

/// State token to decode the integer fields of the header.
#[derive(Debug)]
pub struct Scalars {
    pub(crate) layout: LayoutConstants,
    pub(crate) hostname: String,
}

impl Scalars {
    /// Transition to another state by decoding the integer fields of the
    /// header.
    ///
    /// Returns the complete header, and a successor state token.
    pub fn advance(self, r: [u8; SCALARS_SIZE]) -> (ReportHeader, DeviceBlock) {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct HeaderScalars {
            recv_time_sec: I32,
            recv_time_usec: I32,
            id: I32,
            sequence: I32,
            send_time_sec: I32,
            send_time_usec: I32,
            time_sec: I32,
            time_usec: I32,
        }

        let HeaderScalars {
            recv_time_sec,
            recv_time_usec,
            id,
            sequence,
            send_time_sec,
            send_time_usec,
            time_sec,
            time_usec,
        } = zerocopy::transmute!(r);

        let header = ReportHeader {
            hostname: self.hostname,
            recv_time_sec: recv_time_sec.get(),
            recv_time_usec: recv_time_usec.get(),
            id: id.get(),
            sequence: sequence.get(),
            send_time_sec: send_time_sec.get(),
            send_time_usec: send_time_usec.get(),
            time_sec: time_sec.get(),
            time_usec: time_usec.get(),
        };

        (header, DeviceBlock::start(self.layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LayoutConstants {
        LayoutConstants::new(3, 2, 8, 10).unwrap()
    }

    #[test]
    fn walks_name_table() {
        let state = ReportPrefix::new(layout()).advance([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(state.width(), 4);

        let (channel, name, successor) = state.advance(b"abc\0");
        assert_eq!((channel, name.as_deref()), (0, Some("abc")));

        let Left(state) = successor else {
            panic!("expected a second name field")
        };

        let (channel, name, successor) = state.advance(b"\0xyz");
        assert_eq!((channel, name), (1, None));
        assert!(successor.is_right());
    }

    #[test]
    fn empty_hostname_returns_to_prefix() {
        let state = HostName { layout: layout() };
        assert!(state.advance(&[0; 8]).is_right());

        let state = HostName { layout: layout() };
        let Left(scalars) = state.advance(b"h1\0\0\0\0\0\0") else {
            panic!("expected scalars")
        };
        assert_eq!(scalars.hostname, "h1");
    }

    #[test]
    fn decodes_big_endian_scalars() {
        let state = Scalars {
            layout: layout(),
            hostname: String::from("h1"),
        };

        let mut r = [0; SCALARS_SIZE];
        for (n, chunk) in r.chunks_exact_mut(4).enumerate() {
            chunk.copy_from_slice(&(n as i32 - 4).to_be_bytes());
        }

        let (header, block) = state.advance(r);

        assert_eq!(header.recv_time_sec, -4);
        assert_eq!(header.recv_time_usec, -3);
        assert_eq!(header.id, -2);
        assert_eq!(header.sequence, -1);
        assert_eq!(header.send_time_sec, 0);
        assert_eq!(header.send_time_usec, 1);
        assert_eq!(header.time_sec, 2);
        assert_eq!(header.time_usec, 3);
        assert_eq!(block.channel(), 0);
    }
}
