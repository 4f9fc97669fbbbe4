//! States processing device status blocks.

use either::Either::{self, Left, Right};

use crate::layout::{CLASS_ID_OFFSET, LayoutConstants};

use super::header::ReportPrefix;

/// State token to decode the status block of one channel.
#[derive(Debug)]
pub struct DeviceBlock {
    pub(crate) layout: LayoutConstants,
    pub(crate) channel: usize,
}

impl DeviceBlock {
    /// Begin decoding at the status block of the first channel.
    pub(crate) fn start(layout: LayoutConstants) -> Self {
        Self { layout, channel: 0 }
    }

    /// Number of bytes expected by [`Self::advance`].
    pub fn size(&self) -> usize {
        self.layout.status_block_size()
    }

    /// The channel whose block is decoded next.
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Transition to another state by reading a status block.
    ///
    /// The fields of the block are not decoded here; select a decoder with the
    /// returned class identifier and hand it the same bytes.
    ///
    /// Returns the channel of the block, its class identifier, and a successor
    /// state token. After the final channel, the successor is the prefix state
    /// of the following report.
    ///
    /// # Panics
    ///
    /// Panics if `r` is shorter than [`Self::size`].
    pub fn advance(self, r: &[u8]) -> (usize, u8, Either<DeviceBlock, ReportPrefix>) {
        assert!(
            r.len() >= self.size(),
            "status block of channel {} needs {} bytes, got {}",
            self.channel,
            self.size(),
            r.len()
        );
        let class_id = r[CLASS_ID_OFFSET];

        let channel = self.channel;
        let successor = if channel + 1 < self.layout.max_devices() {
            Left(DeviceBlock {
                layout: self.layout,
                channel: channel + 1,
            })
        } else {
            Right(ReportPrefix::new(self.layout))
        };

        (channel, class_id, successor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_class_identifier_and_leads_to_next_report() {
        let layout = LayoutConstants::new(3, 2, 8, 4).unwrap();
        let state = DeviceBlock::start(layout);
        assert_eq!(state.size(), 4);

        let (channel, class_id, successor) = state.advance(&[0xff, 0x3e, 0xff, 0xff]);
        assert_eq!((channel, class_id), (0, 0x3e));

        let Left(state) = successor else {
            panic!("expected a second block")
        };

        let (channel, class_id, successor) = state.advance(&[0x00, 0x01, 0x00, 0x00]);
        assert_eq!((channel, class_id), (1, 0x01));
        assert!(successor.is_right());
    }

    #[test]
    #[should_panic(expected = "status block of channel 0 needs 4 bytes, got 3")]
    fn rejects_short_blocks() {
        let layout = LayoutConstants::new(3, 2, 8, 4).unwrap();
        DeviceBlock::start(layout).advance(&[0x00, 0x01, 0x00]);
    }
}
