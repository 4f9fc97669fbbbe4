//! Dispatch of status blocks to class decoders.

use alloc::{boxed::Box, collections::BTreeMap};

use log::{debug, trace};

use super::BlockDecoder;

/// Class decoders keyed by class identifier, with a common fallback.
///
/// The common decoder produces the fields shared by every device class. It
/// decodes any block whose class has no registered decoder.
pub struct DecoderRegistry {
    common: Box<dyn BlockDecoder>,
    classes: BTreeMap<u8, Box<dyn BlockDecoder>>,
}

impl DecoderRegistry {
    /// Create a registry holding only the common decoder.
    pub fn new(common: impl BlockDecoder + 'static) -> Self {
        Self {
            common: Box::new(common),
            classes: BTreeMap::new(),
        }
    }

    /// Add the decoder of a device class, replacing any earlier one.
    pub fn with(mut self, class_id: u8, decoder: impl BlockDecoder + 'static) -> Self {
        self.register(class_id, decoder);
        self
    }

    /// Add the decoder of a device class.
    ///
    /// Returns the decoder previously registered for the class, if any.
    pub fn register(
        &mut self,
        class_id: u8,
        decoder: impl BlockDecoder + 'static,
    ) -> Option<Box<dyn BlockDecoder>> {
        self.classes.insert(class_id, Box::new(decoder))
    }

    /// The decoder registered for a class, if any.
    pub fn resolve(&self, class_id: u8) -> Option<&dyn BlockDecoder> {
        self.classes.get(&class_id).map(|d| d.as_ref())
    }

    /// The decoder of the fields common to every class.
    pub fn common(&self) -> &dyn BlockDecoder {
        self.common.as_ref()
    }

    /// Choose the decoder for a block of a class.
    ///
    /// Unregistered classes fall back to the common decoder, as does every
    /// class when `common_only` is set.
    pub fn select(&self, class_id: u8, common_only: bool) -> &dyn BlockDecoder {
        if common_only {
            trace!("Decoding class {class_id} with the common decoder.");
            return self.common();
        }

        self.resolve(class_id).unwrap_or_else(|| {
            debug!("No decoder for class {class_id}, falling back to the common decoder.");
            self.common()
        })
    }

    /// Identifiers of the registered classes, in ascending order.
    pub fn classes(&self) -> impl Iterator<Item = u8> + '_ {
        self.classes.keys().copied()
    }
}

impl core::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("classes", &self.classes.keys())
            .finish_non_exhaustive()
    }
}
