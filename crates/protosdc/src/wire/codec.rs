// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary encoding of wire messages.
//!
//! Every message becomes one self-describing unit: a magic header, the
//! message type name and a tagged value per present field. Integers are
//! little-endian, strings and collections are prefixed by a `u32` length.

use super::message::{WireMessage, WireValue};
use crate::error::{Error, Result};

/// Unit header.
pub const MAGIC: [u8; 4] = *b"PSDC";

/// Maximum message nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

const TAG_STR: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_UINT: u8 = 3;
const TAG_ENUM: u8 = 4;
const TAG_MSG: u8 = 5;
const TAG_REPEATED: u8 = 6;

/// Encode a message into one unit.
pub fn encode_message(msg: &WireMessage) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.buffer.extend_from_slice(&MAGIC);
    encoder.encode_message(msg);
    encoder.into_bytes()
}

/// Decode one unit produced by [`encode_message`].
pub fn decode_message(bytes: &[u8]) -> Result<WireMessage> {
    let mut decoder = Decoder::new(bytes);
    let magic = decoder.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(Error::InvalidData(format!("bad magic {:02x?}", magic)));
    }
    let msg = decoder.decode_message(0)?;
    if decoder.remaining() != 0 {
        return Err(Error::InvalidData(format!(
            "{} trailing bytes after message",
            decoder.remaining()
        )));
    }
    Ok(msg)
}

struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn write_len(&mut self, len: usize) {
        self.buffer.extend(&(len as u32).to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.buffer.extend(s.as_bytes());
    }

    fn encode_message(&mut self, msg: &WireMessage) {
        self.write_str(msg.type_name());
        self.write_len(msg.len());
        for (name, value) in msg.fields() {
            self.write_str(name);
            self.encode_value(value);
        }
    }

    fn encode_value(&mut self, value: &WireValue) {
        match value {
            WireValue::Str(s) => {
                self.buffer.push(TAG_STR);
                self.write_str(s);
            }
            WireValue::Bool(b) => {
                self.buffer.push(TAG_BOOL);
                self.buffer.push(u8::from(*b));
            }
            WireValue::Int(v) => {
                self.buffer.push(TAG_INT);
                self.buffer.extend(&v.to_le_bytes());
            }
            WireValue::UInt(v) => {
                self.buffer.push(TAG_UINT);
                self.buffer.extend(&v.to_le_bytes());
            }
            WireValue::Enum(s) => {
                self.buffer.push(TAG_ENUM);
                self.write_str(s);
            }
            WireValue::Msg(m) => {
                self.buffer.push(TAG_MSG);
                self.encode_message(m);
            }
            WireValue::Repeated(items) => {
                self.buffer.push(TAG_REPEATED);
                self.write_len(items.len());
                for item in items {
                    self.encode_value(item);
                }
            }
        }
    }
}

struct Decoder<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::BufferTooSmall {
                need: self.offset + len,
                have: self.buffer.len(),
            });
        }
        let bytes = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_array8(&mut self) -> Result<[u8; 8]> {
        let mut out = [0u8; 8];
        out.copy_from_slice(self.read_bytes(8)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_le_bytes(raw) as usize)
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn decode_message(&mut self, depth: usize) -> Result<WireMessage> {
        check_depth(depth)?;
        let type_name = self.read_string()?;
        let count = self.read_len()?;
        let mut msg = WireMessage::new(type_name);
        for _ in 0..count {
            let name = self.read_string()?;
            let value = self.decode_value(depth)?;
            msg.set(name, value);
        }
        Ok(msg)
    }

    fn decode_value(&mut self, depth: usize) -> Result<WireValue> {
        check_depth(depth)?;
        let tag = self.read_u8()?;
        match tag {
            TAG_STR => Ok(WireValue::Str(self.read_string()?)),
            TAG_BOOL => match self.read_u8()? {
                0 => Ok(WireValue::Bool(false)),
                1 => Ok(WireValue::Bool(true)),
                other => Err(Error::InvalidData(format!("bool byte {}", other))),
            },
            TAG_INT => Ok(WireValue::Int(i64::from_le_bytes(self.read_array8()?))),
            TAG_UINT => Ok(WireValue::UInt(u64::from_le_bytes(self.read_array8()?))),
            TAG_ENUM => Ok(WireValue::Enum(self.read_string()?)),
            TAG_MSG => Ok(WireValue::Msg(self.decode_message(depth + 1)?)),
            TAG_REPEATED => {
                let count = self.read_len()?;
                // each element needs at least its tag byte
                if count > self.remaining() {
                    return Err(Error::BufferTooSmall {
                        need: self.offset + count,
                        have: self.buffer.len(),
                    });
                }
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.decode_value(depth + 1)?);
                }
                Ok(WireValue::Repeated(items))
            }
            other => Err(Error::InvalidData(format!("unknown value tag {}", other))),
        }
    }
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::InvalidData(format!(
            "value nesting exceeds {}",
            MAX_DEPTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WireMessage {
        let mut m = WireMessage::new("EpisodicReportStream");
        m.msg_mut("addressing", "AddressingMsg")
            .set("action", WireValue::Str("act".into()));
        let report = m.msg_mut("report", "EpisodicReportMsg");
        report.set("flag", WireValue::Bool(true));
        report.set("scale", WireValue::Int(-3));
        report.set("version", WireValue::UInt(u64::MAX));
        report.set("state", WireValue::Enum("NOT_RDY".into()));
        report.push("part", WireValue::Msg(WireMessage::new("PartMsg")));
        m
    }

    #[test]
    fn test_unit_roundtrip() {
        let m = sample();
        let bytes = encode_message(&m);
        assert_eq!(&bytes[..4], b"PSDC");
        let decoded = decode_message(&bytes).expect("decode");
        assert_eq!(decoded, m);
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        let bytes = encode_message(&sample());
        for cut in [0, 3, 10, bytes.len() - 1] {
            let err = decode_message(&bytes[..cut]).expect_err("truncated");
            assert!(matches!(err, Error::BufferTooSmall { .. }), "cut {}", cut);
        }
    }

    #[test]
    fn test_bad_magic_and_trailing_bytes() {
        let mut bytes = encode_message(&sample());
        bytes.push(0);
        assert!(matches!(
            decode_message(&bytes),
            Err(Error::InvalidData(_))
        ));
        bytes[0] = b'X';
        assert!(matches!(
            decode_message(&bytes),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_deeply_nested_repeated_is_rejected() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(b'T');
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(b'f');
        for _ in 0..100_000 {
            bytes.push(TAG_REPEATED);
            bytes.extend_from_slice(&1u32.to_le_bytes());
        }
        bytes.extend_from_slice(&[TAG_BOOL, 0]);
        assert!(matches!(
            decode_message(&bytes),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let mut value = WireValue::Bool(true);
        for _ in 0..MAX_DEPTH {
            value = WireValue::Repeated(vec![value]);
        }
        let m = WireMessage::new("Deep").with("f", value);
        assert_eq!(decode_message(&encode_message(&m)).expect("decode"), m);
    }
}
