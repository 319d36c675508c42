//! Structured binary I/O for index data.
//!
//! [`StructWriter`] appends little-endian fixed-width values, varints and
//! length-prefixed strings to a buffer while folding every byte into a
//! running CRC32. [`StructReader`] is its counterpart over a borrowed slice
//! (typically a memory map); it verifies the trailing checksum before
//! handing out any value.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{LoupeError, Result};
use crate::util::varint::{decode_u64, encode_u64_into, zigzag_decode, zigzag_encode};

/// Size of the trailing checksum in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// A checksumming writer for binary data.
pub struct StructWriter {
    buffer: Vec<u8>,
    hasher: crc32fast::Hasher,
}

impl Default for StructWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StructWriter {
    /// Create a new writer with an empty buffer.
    pub fn new() -> Self {
        StructWriter {
            buffer: Vec::new(),
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Create a writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        StructWriter {
            buffer: Vec::with_capacity(capacity),
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.append(|buf| buf.write_u8(value))
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.append(|buf| buf.write_u32::<LittleEndian>(value))
    }

    /// Write a u64 value (little-endian).
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.append(|buf| buf.write_u64::<LittleEndian>(value))
    }

    /// Write an i64 value (little-endian).
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.append(|buf| buf.write_i64::<LittleEndian>(value))
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let start = self.buffer.len();
        encode_u64_into(value, &mut self.buffer);
        self.hasher.update(&self.buffer[start..]);
        Ok(())
    }

    /// Write a signed value as a zig-zag varint.
    pub fn write_signed_varint(&mut self, value: i64) -> Result<()> {
        self.write_varint(zigzag_encode(value))
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_varint(value.len() as u64)?;
        self.write_raw(value.as_bytes())
    }

    /// Write raw bytes without length prefix.
    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(value);
        self.hasher.update(value);
        Ok(())
    }

    /// Write a strictly increasing sequence as a count followed by deltas.
    pub fn write_delta_u32s(&mut self, values: &[u32]) -> Result<()> {
        self.write_varint(values.len() as u64)?;

        let mut previous = 0u32;
        for (i, &value) in values.iter().enumerate() {
            if i > 0 && value <= previous {
                return Err(LoupeError::internal(format!(
                    "delta sequence not strictly increasing: {previous} then {value}"
                )));
            }
            self.write_varint((value - previous) as u64)?;
            previous = value;
        }

        Ok(())
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Append the checksum and return the finished buffer.
    pub fn finish(self) -> Vec<u8> {
        let mut buffer = self.buffer;
        let checksum = self.hasher.finalize();
        let mut trailer = [0u8; CHECKSUM_LEN];
        LittleEndian::write_u32(&mut trailer, checksum);
        buffer.extend_from_slice(&trailer);
        buffer
    }

    fn append<F>(&mut self, write: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>,
    {
        let start = self.buffer.len();
        write(&mut self.buffer)?;
        self.hasher.update(&self.buffer[start..]);
        Ok(())
    }
}

/// A reader over a checksummed buffer produced by [`StructWriter`].
pub struct StructReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> StructReader<'a> {
    /// Verify the trailing checksum and create a reader over the payload.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() < CHECKSUM_LEN {
            return Err(LoupeError::corrupted(format!(
                "file too short: {} bytes",
                data.len()
            )));
        }

        let (payload, trailer) = data.split_at(data.len() - CHECKSUM_LEN);
        let expected = LittleEndian::read_u32(trailer);
        let actual = crc32fast::hash(payload);
        if expected != actual {
            return Err(LoupeError::corrupted(format!(
                "checksum mismatch: stored {expected:08x}, computed {actual:08x}"
            )));
        }

        Ok(StructReader {
            data: payload,
            position: 0,
        })
    }

    /// Read a u8 value.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Read a u64 value (little-endian).
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    /// Read an i64 value (little-endian).
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = decode_u64(&self.data[self.position..])?;
        self.position += consumed;
        Ok(value)
    }

    /// Read a zig-zag encoded signed varint.
    pub fn read_signed_varint(&mut self) -> Result<i64> {
        Ok(zigzag_decode(self.read_varint()?))
    }

    /// Read a varint that must fit the given bound, e.g. a collection length.
    pub fn read_len(&mut self, what: &str) -> Result<usize> {
        let value = self.read_varint()?;
        if value > self.remaining() as u64 {
            return Err(LoupeError::corrupted(format!(
                "{what} {value} exceeds remaining {} bytes",
                self.remaining()
            )));
        }
        Ok(value as usize)
    }

    /// Read a string with length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_len("string length")?;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| LoupeError::corrupted(format!("invalid UTF-8: {e}")))
    }

    /// Read exact number of raw bytes.
    pub fn read_raw(&mut self, length: usize) -> Result<&'a [u8]> {
        self.take(length)
    }

    /// Read a sequence written by [`StructWriter::write_delta_u32s`].
    pub fn read_delta_u32s(&mut self) -> Result<Vec<u32>> {
        let length = self.read_len("sequence length")?;
        let mut values = Vec::with_capacity(length);
        let mut previous = 0u32;

        for i in 0..length {
            let delta = self.read_varint()?;
            let value = u32::try_from(previous as u64 + delta)
                .map_err(|_| LoupeError::corrupted("delta sequence overflows u32"))?;
            if i > 0 && delta == 0 {
                return Err(LoupeError::corrupted("delta sequence repeats a value"));
            }
            values.push(value);
            previous = value;
        }

        Ok(values)
    }

    /// Current offset into the payload.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left before the checksum.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Check if all payload bytes were consumed.
    pub fn is_eof(&self) -> bool {
        self.position >= self.data.len()
    }

    fn take(&mut self, length: usize) -> Result<&'a [u8]> {
        if length > self.remaining() {
            return Err(LoupeError::corrupted(format!(
                "unexpected end of data at offset {}: wanted {length} bytes, {} left",
                self.position,
                self.remaining()
            )));
        }
        let slice = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_writer_reader() {
        let mut writer = StructWriter::new();
        writer.write_raw(b"MAGC").unwrap();
        writer.write_u8(42).unwrap();
        writer.write_u32(12345).unwrap();
        writer.write_u64(9876543210).unwrap();
        writer.write_i64(-7).unwrap();
        writer.write_varint(300).unwrap();
        writer.write_signed_varint(-1000).unwrap();
        writer.write_string("中国 hello").unwrap();
        writer.write_delta_u32s(&[1, 5, 10, 15]).unwrap();
        let bytes = writer.finish();

        let mut reader = StructReader::new(&bytes).unwrap();
        assert_eq!(reader.read_raw(4).unwrap(), b"MAGC");
        assert_eq!(reader.read_u8().unwrap(), 42);
        assert_eq!(reader.read_u32().unwrap(), 12345);
        assert_eq!(reader.read_u64().unwrap(), 9876543210);
        assert_eq!(reader.read_i64().unwrap(), -7);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_signed_varint().unwrap(), -1000);
        assert_eq!(reader.read_string().unwrap(), "中国 hello");
        assert_eq!(reader.read_delta_u32s().unwrap(), vec![1, 5, 10, 15]);
        assert!(reader.is_eof());
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut writer = StructWriter::new();
        writer.write_string("payload").unwrap();
        let mut bytes = writer.finish();
        bytes[2] ^= 0xFF;

        assert!(matches!(
            StructReader::new(&bytes),
            Err(LoupeError::Corrupted(_))
        ));
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            StructReader::new(&[1, 2]),
            Err(LoupeError::Corrupted(_))
        ));

        let mut writer = StructWriter::new();
        writer.write_u8(1).unwrap();
        let bytes = writer.finish();
        let mut reader = StructReader::new(&bytes).unwrap();
        reader.read_u8().unwrap();
        assert!(matches!(reader.read_u32(), Err(LoupeError::Corrupted(_))));
    }

    #[test]
    fn test_delta_sequence_must_increase() {
        let mut writer = StructWriter::new();
        assert!(writer.write_delta_u32s(&[3, 3]).is_err());
    }
}
