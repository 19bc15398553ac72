//! Word-aligned output buffer
//!
//! Data is kept as a list of chunks so a reserved offset word can be
//! back-patched once the head length is known.

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};

pub const WORD_SIZE: usize = 32;

/// Handle to a reserved word, see [`Writer::write_updatable_value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatableSlot(usize);

#[derive(Debug, Clone, Default)]
pub struct Writer {
    chunks: Vec<Vec<u8>>,
    length: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn write_data(&mut self, data: Vec<u8>) -> usize {
        let written = data.len();
        self.chunks.push(data);
        self.length += written;
        written
    }

    pub fn append_writer(&mut self, writer: Writer) -> usize {
        let written = writer.length;
        self.chunks.extend(writer.chunks);
        self.length += written;
        written
    }

    /// Write raw bytes, right-padded to a word boundary.
    pub fn write_bytes(&mut self, value: &[u8]) -> usize {
        let mut data = value.to_vec();
        let remainder = data.len() % WORD_SIZE;
        if remainder != 0 {
            data.resize(data.len() + WORD_SIZE - remainder, 0);
        }
        self.write_data(data)
    }

    /// Write a non-negative integer as one left-padded word.
    pub fn write_value(&mut self, value: &BigNumber) -> AbiResult<usize> {
        let word = to_word(value)?;
        Ok(self.write_data(word))
    }

    /// Reserve a zero word to be filled in later.
    pub fn write_updatable_value(&mut self) -> UpdatableSlot {
        let slot = UpdatableSlot(self.chunks.len());
        self.write_data(vec![0u8; WORD_SIZE]);
        slot
    }

    pub fn update_value(&mut self, slot: UpdatableSlot, value: &BigNumber) -> AbiResult<()> {
        let word = to_word(value)?;
        match self.chunks.get_mut(slot.0) {
            Some(chunk) => {
                *chunk = word;
                Ok(())
            }
            None => Err(AbiError::buffer_overrun("invalid updatable slot", self.length, slot.0)),
        }
    }
}

fn to_word(value: &BigNumber) -> AbiResult<Vec<u8>> {
    if value.is_negative() {
        return Err(AbiError::invalid_argument(
            "cannot write negative value",
            "value",
            value.to_string(),
        ));
    }
    let bytes = value.magnitude_bytes();
    if bytes.len() > WORD_SIZE {
        return Err(AbiError::buffer_overrun("value out-of-bounds", WORD_SIZE, bytes.len()));
    }
    let mut word = vec![0u8; WORD_SIZE - bytes.len()];
    word.extend_from_slice(&bytes);
    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_bytes_pads_right() {
        let mut writer = Writer::new();
        assert_eq!(writer.write_bytes(&[0xab; 3]), 32);
        assert_eq!(writer.write_bytes(&[]), 0);
        let data = writer.data();
        assert_eq!(data.len(), 32);
        assert_eq!(&data[..3], &[0xab; 3]);
        assert!(data[3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_write_value_pads_left() {
        let mut writer = Writer::new();
        writer.write_value(&BigNumber::from(0x0102u32)).unwrap();
        let data = writer.data();
        assert_eq!(data.len(), 32);
        assert_eq!(&data[30..], &[1, 2]);
    }

    #[test]
    fn test_write_value_bounds() {
        let mut writer = Writer::new();
        let too_big = BigNumber::one().shl(256).unwrap();
        assert!(writer.write_value(&too_big).unwrap_err().is_buffer_overrun());
        assert!(writer.write_value(&BigNumber::from(-1i32)).is_err());
        assert!(writer.is_empty());
    }

    #[test]
    fn test_updatable_value() {
        let mut writer = Writer::new();
        let slot = writer.write_updatable_value();
        writer.write_value(&BigNumber::from(7u8)).unwrap();
        writer.update_value(slot, &BigNumber::from(64u8)).unwrap();
        let data = writer.data();
        assert_eq!(data[31], 64);
        assert_eq!(data[63], 7);
    }

    #[test]
    fn test_append_writer() {
        let mut inner = Writer::new();
        inner.write_value(&BigNumber::from(1u8)).unwrap();
        let mut outer = Writer::new();
        outer.write_value(&BigNumber::from(2u8)).unwrap();
        assert_eq!(outer.append_writer(inner), 32);
        assert_eq!(outer.len(), 64);
        assert_eq!(outer.data()[63], 1);
    }
}
