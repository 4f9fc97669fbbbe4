#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use fgc_statussrv::{DeviceStatus, LayoutConstants, avec::DecoderRegistry};

pub const UNREGISTERED_CLASS: u8 = 0x01;
pub const REGISTERED_CLASS: u8 = 0x02;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two channels, three-character names, an eight-byte hostname and ten-byte
/// status blocks.
pub fn layout() -> LayoutConstants {
    LayoutConstants::new(3, 2, 8, 10).unwrap()
}

/// Decode the fields shared by every class: the first two bytes of a block.
pub fn common(block: &[u8]) -> DeviceStatus {
    let mut status = DeviceStatus::new();
    status.insert("DATA_STATUS", block[0]);
    status.insert("CLASS_ID", block[1]);
    status.insert("DECODER", "common");
    status
}

/// Decode the common fields, and a measurement in the following four bytes.
pub fn measuring(block: &[u8]) -> DeviceStatus {
    let mut status = common(block);
    status.insert("DECODER", "measuring");
    status.insert("I_MEAS", i32::from_be_bytes(block[2..6].try_into().unwrap()));
    status
}

pub fn registry() -> DecoderRegistry {
    DecoderRegistry::new(common).with(REGISTERED_CLASS, measuring)
}

/// A registry counting every block it decodes.
pub fn counting_registry() -> (DecoderRegistry, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));

    let common_calls = Arc::clone(&calls);
    let class_calls = Arc::clone(&calls);

    let registry = DecoderRegistry::new(move |block: &[u8]| {
        common_calls.fetch_add(1, Ordering::SeqCst);
        common(block)
    })
    .with(REGISTERED_CLASS, move |block: &[u8]| {
        class_calls.fetch_add(1, Ordering::SeqCst);
        measuring(block)
    });

    (registry, calls)
}

/// Builder for the bytes of a single gateway report.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    layout: LayoutConstants,
    names: Vec<String>,
    hostname: String,
    scalars: [i32; 8],
    blocks: Vec<Vec<u8>>,
}

impl ReportBuilder {
    pub fn new(layout: LayoutConstants) -> Self {
        Self {
            layout,
            names: vec![String::new(); layout.max_devices()],
            hostname: String::new(),
            scalars: [0; 8],
            blocks: vec![vec![0; layout.status_block_size()]; layout.max_devices()],
        }
    }

    pub fn name(mut self, channel: usize, name: &str) -> Self {
        self.names[channel] = name.to_string();
        self
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn scalars(mut self, scalars: [i32; 8]) -> Self {
        self.scalars = scalars;
        self
    }

    pub fn class(mut self, channel: usize, class_id: u8) -> Self {
        self.blocks[channel][1] = class_id;
        self
    }

    /// Overwrite the start of a channel's status block.
    pub fn block(mut self, channel: usize, bytes: &[u8]) -> Self {
        self.blocks[channel][..bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut r = vec![0xca, 0xfe, 0x00, 0x01];

        for name in &self.names {
            r.extend(padded(name, self.layout.name_field_width()));
        }

        r.extend(padded(&self.hostname, self.layout.host_name_width()));

        for value in self.scalars {
            r.extend(value.to_be_bytes());
        }

        for block in &self.blocks {
            r.extend(block);
        }

        assert_eq!(r.len(), self.layout.stride());
        r
    }
}

fn padded(s: &str, width: usize) -> Vec<u8> {
    let mut field = s.as_bytes().to_vec();
    assert!(field.len() <= width);
    field.resize(width, 0);
    field
}

/// The report of the documented example: `abc` on an unregistered class in
/// channel 0, and an unnamed device of a registered class in channel 1.
pub fn example_report(hostname: &str) -> ReportBuilder {
    ReportBuilder::new(layout())
        .name(0, "abc")
        .hostname(hostname)
        .class(0, UNREGISTERED_CLASS)
        .class(1, REGISTERED_CLASS)
        .block(1, &[0x05, REGISTERED_CLASS, 0x00, 0x00, 0x04, 0xd2])
}
