//! Word-aligned input cursor
//!
//! Every read is bounds-checked against the underlying slice. Running past
//! the end yields a buffer overrun, which decoders never defer.

use crate::bignumber::BigNumber;
use crate::error::{AbiError, AbiResult};
use crate::utils::strings::Utf8ErrorPolicy;

use super::writer::WORD_SIZE;

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
    allow_loose: bool,
    utf8_policy: Utf8ErrorPolicy,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], allow_loose: bool, utf8_policy: Utf8ErrorPolicy) -> Self {
        Reader {
            data,
            offset: 0,
            allow_loose,
            utf8_policy,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Bytes read so far
    pub fn consumed(&self) -> usize {
        self.offset
    }

    pub fn utf8_policy(&self) -> Utf8ErrorPolicy {
        self.utf8_policy
    }

    /// A reader over the data starting `offset` bytes past the cursor.
    /// An offset past the end gives an empty reader.
    pub fn sub_reader(&self, offset: usize) -> Reader<'a> {
        let start = self
            .offset
            .checked_add(offset)
            .filter(|start| *start <= self.data.len())
            .unwrap_or(self.data.len());
        Reader {
            data: &self.data[start..],
            offset: 0,
            allow_loose: self.allow_loose,
            utf8_policy: self.utf8_policy,
        }
    }

    fn peek_bytes(&self, length: usize, loose: bool) -> AbiResult<&'a [u8]> {
        let overrun = |end: usize| AbiError::buffer_overrun("data out-of-bounds", self.data.len(), end);

        let aligned = length
            .checked_add(WORD_SIZE - 1)
            .map(|l| l / WORD_SIZE * WORD_SIZE)
            .ok_or_else(|| overrun(usize::MAX))?;
        let end = self.offset.checked_add(aligned).ok_or_else(|| overrun(usize::MAX))?;

        if end <= self.data.len() {
            return Ok(&self.data[self.offset..end]);
        }

        // Loose mode tolerates missing padding after the last value
        match self.offset.checked_add(length) {
            Some(short_end) if self.allow_loose && loose && short_end <= self.data.len() => {
                Ok(&self.data[self.offset..short_end])
            }
            _ => Err(overrun(end)),
        }
    }

    /// Read `length` bytes, consuming them plus their word padding.
    pub fn read_bytes(&mut self, length: usize, loose: bool) -> AbiResult<&'a [u8]> {
        let bytes = self.peek_bytes(length, loose)?;
        self.offset += bytes.len();
        Ok(&bytes[..length])
    }

    pub fn read_value(&mut self) -> AbiResult<BigNumber> {
        let word = self.read_bytes(WORD_SIZE, false)?;
        Ok(BigNumber::from_be_bytes(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u8) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[31] = value;
        w
    }

    #[test]
    fn test_read_value() {
        let mut data = word(5).to_vec();
        data.extend_from_slice(&word(9));
        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        assert_eq!(reader.read_value().unwrap(), BigNumber::from(5u8));
        assert_eq!(reader.consumed(), 32);
        assert_eq!(reader.read_value().unwrap(), BigNumber::from(9u8));
        assert!(reader.read_value().unwrap_err().is_buffer_overrun());
    }

    #[test]
    fn test_read_bytes_consumes_padding() {
        let data = [0x61u8; 64];
        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        assert_eq!(reader.read_bytes(3, false).unwrap(), &[0x61; 3]);
        assert_eq!(reader.consumed(), 32);
    }

    #[test]
    fn test_loose_read() {
        let data = [0x61u8; 3];
        let mut strict = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        assert!(strict.read_bytes(3, true).unwrap_err().is_buffer_overrun());

        let mut loose = Reader::new(&data, true, Utf8ErrorPolicy::Error);
        assert_eq!(loose.read_bytes(3, true).unwrap(), &data);
        assert!(loose.read_bytes(3, false).is_err());
    }

    #[test]
    fn test_sub_reader() {
        let mut data = word(1).to_vec();
        data.extend_from_slice(&word(2));
        let mut reader = Reader::new(&data, false, Utf8ErrorPolicy::Error);
        reader.read_value().unwrap();

        let mut sub = reader.sub_reader(0);
        assert_eq!(sub.read_value().unwrap(), BigNumber::from(2u8));

        let empty = reader.sub_reader(1000);
        assert_eq!(empty.data_len(), 0);
        let huge = reader.sub_reader(usize::MAX);
        assert_eq!(huge.data_len(), 0);
    }

    #[test]
    fn test_huge_length_is_overrun() {
        let data = word(0);
        let mut reader = Reader::new(&data, true, Utf8ErrorPolicy::Error);
        assert!(reader.read_bytes(usize::MAX, true).unwrap_err().is_buffer_overrun());
    }
}
