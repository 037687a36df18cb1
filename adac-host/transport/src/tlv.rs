// Licensed under the Apache-2.0 license

//! TLV record walking
//!
//! Records are laid out back to back, each value padded to a word boundary.
//! The walker never reads past the end of the slice it was given: a header or
//! value that would cross the end is reported as an error and ends the walk.

use adac_host_command_types::{
    round_to_word, CommandError, CommandResult, TlvHeader, TLV_HEADER_SIZE,
};
use arrayvec::ArrayVec;
use zerocopy::FromBytes;

/// One TLV record borrowed from a larger buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    header: TlvHeader,
    value: &'a [u8],
    raw: &'a [u8],
}

impl<'a> Tlv<'a> {
    pub fn type_id(&self) -> u16 {
        self.header.type_id
    }

    pub fn reserved(&self) -> u16 {
        self.header.reserved
    }

    /// Unpadded value length
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn header(&self) -> &TlvHeader {
        &self.header
    }

    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Header, value and padding exactly as they appear in the source buffer
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }
}

/// Iterator over the TLV records of a buffer
#[derive(Debug, Clone)]
pub struct TlvIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> TlvIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            done: false,
        }
    }

    /// Byte offset of the next record
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = CommandResult<Tlv<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.offset..];
        let Ok((header, _)) = TlvHeader::read_from_prefix(rest) else {
            self.done = true;
            return Some(Err(CommandError::Truncated {
                needed: TLV_HEADER_SIZE,
                available: rest.len(),
            }));
        };

        let value_len = header.length_in_bytes as usize;
        let available = rest.len() - TLV_HEADER_SIZE;
        if value_len > available {
            self.done = true;
            return Some(Err(CommandError::TlvOverrun {
                offset: self.offset,
            }));
        }

        // The final record may omit its padding.
        let record_len = TLV_HEADER_SIZE + round_to_word(value_len).min(available);
        let tlv = Tlv {
            header,
            value: &rest[TLV_HEADER_SIZE..TLV_HEADER_SIZE + value_len],
            raw: &rest[..record_len],
        };
        self.offset += record_len;
        Some(Ok(tlv))
    }
}

/// Split `data` into at most `N` TLV records.
///
/// Fails if the records do not tile the buffer or if there are more than `N`.
pub fn split_tlvs<const N: usize>(data: &[u8]) -> CommandResult<ArrayVec<Tlv<'_>, N>> {
    let mut records = ArrayVec::new();
    for tlv in TlvIter::new(data) {
        records
            .try_push(tlv?)
            .map_err(|_| CommandError::TooManyExtensions { max: N })?;
    }
    Ok(records)
}
