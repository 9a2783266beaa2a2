//! Inspection and debugging tools for the realmwire protocol.
//!
//! This crate provides utilities for looking at encoded traffic:
//!
//! - Split a capture into frames and summarize opcodes and sizes
//! - Pack and unpack identifiers
//! - Show the MSB-first bit layout of a payload and split it into fields
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Every report has a pretty form and a JSON form.

use std::fmt;

use anyhow::{bail, Context, Result};
use bitstream::{BitReader, BitWriter};
use serde::Serialize;
use tracing::debug;
use wire::{Direction, FrameIter, Guid, Limits, Opcode};

/// Bytes of payload shown per frame in reports.
const PREVIEW_BYTES: usize = 16;

/// Parses hex bytes, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: String = input.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    if !digits.is_ascii() {
        bail!("hex input contains non-ASCII characters");
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits ({})", digits.len());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = &digits[i..i + 2];
            u8::from_str_radix(pair, 16)
                .with_context(|| format!("invalid hex byte `{pair}` at offset {}", i / 2))
        })
        .collect()
}

/// Parses a 64-bit identifier written in hex.
pub fn parse_guid(input: &str) -> Result<Guid> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let raw = u64::from_str_radix(digits, 16)
        .with_context(|| format!("invalid identifier `{trimmed}`"))?;
    Ok(Guid::new(raw))
}

/// Parses a limits JSON document; missing keys take their defaults.
pub fn parse_limits(json: &str) -> Result<Limits> {
    serde_json::from_str(json).context("parse limits json")
}

/// Formats bytes as space-separated upper-case hex.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// An identifier and its packed encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuidReport {
    pub guid: Guid,
    pub high_type: u16,
    pub counter: u64,
    pub mask: u8,
    pub packed: String,
}

impl GuidReport {
    fn new(guid: Guid) -> Self {
        let mut writer = BitWriter::with_capacity(guid.packed_len());
        guid.write_packed(&mut writer);
        Self {
            guid,
            high_type: guid.high_type(),
            counter: guid.counter(),
            mask: guid.mask(),
            packed: to_hex(&writer.finish()),
        }
    }
}

impl fmt::Display for GuidReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "guid: {}", self.guid)?;
        writeln!(f, "high_type: 0x{:04X} counter: {}", self.high_type, self.counter)?;
        writeln!(f, "mask: 0b{:08b}", self.mask)?;
        write!(f, "packed: {}", self.packed)
    }
}

/// Reports the packed form of `guid`.
pub fn pack_guid(guid: Guid) -> GuidReport {
    GuidReport::new(guid)
}

/// Decodes a packed identifier that fills `bytes` exactly.
pub fn unpack_guid(bytes: &[u8]) -> Result<GuidReport> {
    let mut reader = BitReader::new(bytes);
    let guid = Guid::read_packed(&mut reader).context("decode packed guid")?;
    if !reader.is_empty() {
        bail!("{} trailing bytes after packed guid", reader.remaining());
    }
    Ok(GuidReport::new(guid))
}

/// One frame found in a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub offset: usize,
    pub opcode: Opcode,
    pub payload_len: usize,
    pub frame_len: usize,
    pub preview: String,
}

/// Per-opcode totals across a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpcodeSummary {
    pub opcode: Opcode,
    pub frames: usize,
    pub payload_bytes: usize,
}

/// Result of splitting a capture into frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    pub direction: Direction,
    pub total_bytes: usize,
    pub frames: Vec<FrameReport>,
    pub opcodes: Vec<OpcodeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Splits a capture of back-to-back frames.
///
/// A malformed frame ends the scan; frames before it are still reported
/// and the failure is recorded in [`CaptureReport::error`].
pub fn inspect_capture(bytes: &[u8], direction: Direction, limits: &Limits) -> CaptureReport {
    let mut frames = Vec::new();
    let mut error = None;
    let mut iter = FrameIter::new(bytes, direction, limits);
    loop {
        let offset = iter.offset();
        match iter.next() {
            None => break,
            Some(Ok(frame)) => {
                debug!(offset, opcode = %frame.opcode, len = frame.payload.len(), "frame");
                let preview_len = frame.payload.len().min(PREVIEW_BYTES);
                frames.push(FrameReport {
                    offset,
                    opcode: frame.opcode,
                    payload_len: frame.payload.len(),
                    frame_len: iter.offset() - offset,
                    preview: to_hex(&frame.payload[..preview_len]),
                });
            }
            Some(Err(err)) => {
                error = Some(format!("at offset {offset}: {err}"));
            }
        }
    }
    CaptureReport {
        direction,
        total_bytes: bytes.len(),
        opcodes: summarize(&frames),
        frames,
        error,
    }
}

fn summarize(frames: &[FrameReport]) -> Vec<OpcodeSummary> {
    let mut summaries: Vec<OpcodeSummary> = Vec::new();
    for frame in frames {
        match summaries.iter_mut().find(|s| s.opcode == frame.opcode) {
            Some(summary) => {
                summary.frames += 1;
                summary.payload_bytes += frame.payload_len;
            }
            None => summaries.push(OpcodeSummary {
                opcode: frame.opcode,
                frames: 1,
                payload_bytes: frame.payload_len,
            }),
        }
    }
    summaries.sort_by(|a, b| {
        b.payload_bytes
            .cmp(&a.payload_bytes)
            .then_with(|| a.opcode.cmp(&b.opcode))
    });
    summaries
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "direction: {:?} bytes: {} frames: {}",
            self.direction,
            self.total_bytes,
            self.frames.len()
        )?;
        writeln!(f, "frames:")?;
        for frame in &self.frames {
            writeln!(
                f,
                "  @{:<8} {} {} bytes  {}",
                frame.offset, frame.opcode, frame.payload_len, frame.preview
            )?;
        }
        if !self.opcodes.is_empty() {
            writeln!(f, "opcodes by payload bytes:")?;
            for summary in &self.opcodes {
                writeln!(
                    f,
                    "  {}: {} frames, {} bytes",
                    summary.opcode, summary.frames, summary.payload_bytes
                )?;
            }
        }
        if let Some(error) = &self.error {
            writeln!(f, "error: {error}")?;
        }
        Ok(())
    }
}

/// MSB-first rendering of each byte: offset, hex and bits.
pub fn bit_layout(bytes: &[u8]) -> String {
    bytes
        .iter()
        .enumerate()
        .map(|(offset, byte)| format!("{offset:04}: 0x{byte:02X} {:04b}_{:04b}", byte >> 4, byte & 0xF))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A bit field read from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitField {
    pub bit_offset: usize,
    pub bits: u8,
    pub value: u32,
}

/// Reads consecutive bit fields of the given widths from the start of `bytes`.
pub fn split_bit_fields(bytes: &[u8], widths: &[u8]) -> Result<Vec<BitField>> {
    let mut reader = BitReader::new(bytes);
    let mut bit_offset = 0usize;
    let mut fields = Vec::with_capacity(widths.len());
    for (index, &bits) in widths.iter().enumerate() {
        let value = reader
            .read_bits(bits)
            .with_context(|| format!("field {index} ({bits} bits at bit {bit_offset})"))?;
        fields.push(BitField {
            bit_offset,
            bits,
            value,
        });
        bit_offset += usize::from(bits);
    }
    Ok(fields)
}
