//! A BER/DER reader for key files.
//!
//! [`BerReader`] walks a byte buffer one TLV at a time. Constructed values
//! (`SEQUENCE`, explicit context tags) are returned as sub-readers bounded to
//! their contents, so a parser follows the ASN.1 structure by nesting
//! readers. Both definite and indefinite lengths are accepted.
//!
//! Input is untrusted: every read checks the remaining length, and every
//! failure is a [`BerError`]. Nothing here panics on malformed data.

use num_bigint::{BigInt, BigUint};
use thiserror::Error;
use tracing::debug;

/// Decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BerError {
    /// The input ended inside a header or a value.
    #[error("truncated BER input")]
    Truncated,

    /// The value carries a different tag than the caller asked for.
    #[error("expected {expected}, found tag {found} ({class:?})")]
    UnexpectedTag {
        expected: &'static str,
        found: u32,
        class: TagClass,
    },

    /// Reserved or oversized length encoding.
    #[error("invalid length encoding")]
    InvalidLength,

    /// The indefinite-length marker on a primitive value.
    #[error("indefinite length on a primitive value")]
    IndefinitePrimitive,

    /// A multi-byte tag number above `u32::MAX`.
    #[error("tag number overflows u32")]
    TagOverflow,

    /// An `INTEGER` with no content octets.
    #[error("empty integer")]
    EmptyInteger,

    /// An `INTEGER` read as unsigned was negative.
    #[error("negative integer")]
    NegativeInteger,

    /// Content octets that do not form a valid value of their type.
    #[error("invalid {0}")]
    Invalid(&'static str),

    /// A value exceeded the configured [`BerLimits`].
    #[error("{0} limit exceeded")]
    LimitExceeded(&'static str),
}

type Result<T> = std::result::Result<T, BerError>;

/// The two class bits of an identifier octet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// The length octets of a header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    /// Contents end at the matching `00 00` end-of-contents marker.
    Indefinite,
}

/// A decoded TLV header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagInfo {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
    pub length: Length,
    /// Identifier plus length octets.
    pub header_len: usize,
}

impl TagInfo {
    fn is(&self, class: TagClass, constructed: bool, number: u32) -> bool {
        self.class == class && self.constructed == constructed && self.number == number
    }
}

/// Bounds applied to untrusted input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BerLimits {
    /// Largest definite length accepted for a single value.
    pub max_length: usize,
    /// Deepest nesting of constructed values.
    pub max_depth: usize,
}

impl Default for BerLimits {
    fn default() -> Self {
        Self {
            max_length: 16 * 1024 * 1024,
            max_depth: 32,
        }
    }
}

/// A `BIT STRING` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitString<'a> {
    /// Unused bits in the last byte, `0..=7`.
    pub unused_bits: u8,
    pub bytes: &'a [u8],
}

const TAG_INTEGER: u32 = 2;
const TAG_BIT_STRING: u32 = 3;
const TAG_OCTET_STRING: u32 = 4;
const TAG_NULL: u32 = 5;
const TAG_OID: u32 = 6;
const TAG_SEQUENCE: u32 = 16;

/// Cursor over BER-encoded data.
#[derive(Clone, Debug)]
pub struct BerReader<'a> {
    data: &'a [u8],
    pos: usize,
    limits: BerLimits,
    depth: usize,
}

impl<'a> BerReader<'a> {
    /// A reader over `data` with the default [`BerLimits`].
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, BerLimits::default())
    }

    /// A reader over `data` with caller-supplied bounds. Sub-readers
    /// inherit them.
    pub fn with_limits(data: &'a [u8], limits: BerLimits) -> Self {
        Self {
            data,
            pos: 0,
            limits,
            depth: 0,
        }
    }

    /// Offset of the cursor from the start of this reader's data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decodes the next header without consuming it.
    pub fn peek_tag_info(&self) -> Result<TagInfo> {
        parse_header(&self.data[self.pos..], &self.limits)
    }

    /// Decodes the next header and advances past it, leaving the cursor on
    /// the first content octet.
    pub fn read_tag_info(&mut self) -> Result<TagInfo> {
        let info = self.peek_tag_info().inspect_err(log_failure)?;
        self.pos += info.header_len;
        Ok(info)
    }

    /// Reads a `SEQUENCE` (`0x30`) and returns a reader over its contents.
    pub fn read_sequence(&mut self) -> Result<BerReader<'a>> {
        self.read_constructed(TagClass::Universal, TAG_SEQUENCE, "SEQUENCE")
    }

    /// Reads an explicit context-specific tag `[number]` and returns a
    /// reader over its contents.
    pub fn read_context_specific(&mut self, number: u32) -> Result<BerReader<'a>> {
        self.read_constructed(TagClass::ContextSpecific, number, "context-specific tag")
    }

    /// Returns `true` when the next value is the context tag `[number]`.
    pub fn peek_context_specific(&self, number: u32) -> bool {
        self.peek_tag_info()
            .is_ok_and(|info| info.class == TagClass::ContextSpecific && info.number == number)
    }

    /// Reads an `INTEGER` (`0x02`) as a two's-complement big-endian value.
    pub fn read_integer(&mut self) -> Result<BigInt> {
        let content = self.read_primitive(TAG_INTEGER, "INTEGER")?;
        if content.is_empty() {
            return fail(BerError::EmptyInteger);
        }
        Ok(BigInt::from_signed_bytes_be(content))
    }

    /// Reads an `INTEGER` that must not be negative.
    pub fn read_unsigned_integer(&mut self) -> Result<BigUint> {
        match self.read_integer()?.to_biguint() {
            Some(v) => Ok(v),
            None => fail(BerError::NegativeInteger),
        }
    }

    /// Reads a primitive `OCTET STRING`.
    pub fn read_octet_string(&mut self) -> Result<&'a [u8]> {
        self.read_primitive(TAG_OCTET_STRING, "OCTET STRING")
    }

    /// Reads a primitive `BIT STRING`.
    pub fn read_bit_string(&mut self) -> Result<BitString<'a>> {
        let content = self.read_primitive(TAG_BIT_STRING, "BIT STRING")?;
        match content {
            [] => fail(BerError::Invalid("bit string")),
            [unused, rest @ ..] if *unused > 7 || (rest.is_empty() && *unused != 0) => {
                fail(BerError::Invalid("bit string"))
            }
            [unused, rest @ ..] => Ok(BitString {
                unused_bits: *unused,
                bytes: rest,
            }),
        }
    }

    /// Reads an `OBJECT IDENTIFIER` in dotted form, e.g. `1.2.840.10045.3.1.7`.
    pub fn read_object_identifier(&mut self) -> Result<String> {
        let content = self.read_primitive(TAG_OID, "OBJECT IDENTIFIER")?;
        decode_oid(content).inspect_err(log_failure)
    }

    /// Reads a `NULL`.
    pub fn read_null(&mut self) -> Result<()> {
        let content = self.read_primitive(TAG_NULL, "NULL")?;
        if !content.is_empty() {
            return fail(BerError::Invalid("null"));
        }
        Ok(())
    }

    /// Skips one complete value of any type.
    pub fn skip_value(&mut self) -> Result<()> {
        let info = self.peek_tag_info().inspect_err(log_failure)?;
        let body = &self.data[self.pos + info.header_len..];
        let total = match info.length {
            Length::Definite(len) => {
                if len > body.len() {
                    return fail(BerError::Truncated);
                }
                len
            }
            Length::Indefinite => {
                indefinite_len(body, &self.limits, self.depth + 1).inspect_err(log_failure)? + 2
            }
        };
        self.pos += info.header_len + total;
        Ok(())
    }

    fn read_primitive(&mut self, number: u32, expected: &'static str) -> Result<&'a [u8]> {
        let info = self.peek_tag_info().inspect_err(log_failure)?;
        if !info.is(TagClass::Universal, false, number) {
            return fail(BerError::UnexpectedTag {
                expected,
                found: info.number,
                class: info.class,
            });
        }
        let Length::Definite(len) = info.length else {
            return fail(BerError::IndefinitePrimitive);
        };
        let start = self.pos + info.header_len;
        if len > self.data.len() - start {
            return fail(BerError::Truncated);
        }
        self.pos = start + len;
        Ok(&self.data[start..start + len])
    }

    fn read_constructed(
        &mut self,
        class: TagClass,
        number: u32,
        expected: &'static str,
    ) -> Result<BerReader<'a>> {
        let info = self.peek_tag_info().inspect_err(log_failure)?;
        if !info.is(class, true, number) {
            return fail(BerError::UnexpectedTag {
                expected,
                found: info.number,
                class: info.class,
            });
        }
        let depth = self.depth + 1;
        if depth > self.limits.max_depth {
            return fail(BerError::LimitExceeded("depth"));
        }

        let start = self.pos + info.header_len;
        let body = &self.data[start..];
        let (content_len, consumed) = match info.length {
            Length::Definite(len) => {
                if len > body.len() {
                    return fail(BerError::Truncated);
                }
                (len, len)
            }
            Length::Indefinite => {
                let len = indefinite_len(body, &self.limits, depth).inspect_err(log_failure)?;
                (len, len + 2)
            }
        };

        self.pos = start + consumed;
        Ok(BerReader {
            data: &self.data[start..start + content_len],
            pos: 0,
            limits: self.limits,
            depth,
        })
    }
}

fn log_failure(err: &BerError) {
    debug!(error = %err, "BER decode failed");
}

fn fail<T>(err: BerError) -> Result<T> {
    log_failure(&err);
    Err(err)
}

fn parse_header(data: &[u8], limits: &BerLimits) -> Result<TagInfo> {
    let mut bytes = data.iter().copied();
    let first = bytes.next().ok_or(BerError::Truncated)?;

    let class = match first >> 6 {
        0 => TagClass::Universal,
        1 => TagClass::Application,
        2 => TagClass::ContextSpecific,
        _ => TagClass::Private,
    };
    let constructed = first & 0x20 != 0;

    let mut used = 1;
    let mut number = u32::from(first & 0x1f);
    if number == 0x1f {
        number = 0;
        loop {
            let b = bytes.next().ok_or(BerError::Truncated)?;
            used += 1;
            if number > (u32::MAX >> 7) {
                return Err(BerError::TagOverflow);
            }
            number = (number << 7) | u32::from(b & 0x7f);
            if b & 0x80 == 0 {
                break;
            }
        }
    }

    let len_byte = bytes.next().ok_or(BerError::Truncated)?;
    used += 1;
    let length = match len_byte {
        0x80 => {
            if !constructed {
                return Err(BerError::IndefinitePrimitive);
            }
            Length::Indefinite
        }
        0xff => return Err(BerError::InvalidLength),
        b if b & 0x80 == 0 => Length::Definite(usize::from(b)),
        b => {
            let count = usize::from(b & 0x7f);
            let mut len = 0usize;
            for _ in 0..count {
                let next = bytes.next().ok_or(BerError::Truncated)?;
                used += 1;
                len = len
                    .checked_mul(256)
                    .and_then(|l| l.checked_add(usize::from(next)))
                    .ok_or(BerError::InvalidLength)?;
            }
            Length::Definite(len)
        }
    };

    if matches!(length, Length::Definite(len) if len > limits.max_length) {
        return Err(BerError::LimitExceeded("length"));
    }

    Ok(TagInfo {
        class,
        constructed,
        number,
        length,
        header_len: used,
    })
}

/// Length of indefinite-length contents, up to but excluding the
/// terminating `00 00`.
fn indefinite_len(data: &[u8], limits: &BerLimits, depth: usize) -> Result<usize> {
    if depth > limits.max_depth {
        return Err(BerError::LimitExceeded("depth"));
    }
    let mut pos = 0;
    loop {
        match data.get(pos..pos + 2) {
            None => return Err(BerError::Truncated),
            Some([0, 0]) => return Ok(pos),
            Some(_) => {}
        }
        let info = parse_header(&data[pos..], limits)?;
        pos += info.header_len;
        match info.length {
            Length::Definite(len) => {
                if len > data.len() - pos {
                    return Err(BerError::Truncated);
                }
                pos += len;
            }
            Length::Indefinite => {
                pos += indefinite_len(&data[pos..], limits, depth + 1)? + 2;
            }
        }
    }
}

fn decode_oid(content: &[u8]) -> Result<String> {
    if content.is_empty() || content[content.len() - 1] & 0x80 != 0 {
        return Err(BerError::Invalid("object identifier"));
    }

    let mut arcs: Vec<u64> = Vec::new();
    let mut value = 0u64;
    for &b in content {
        if value > (u64::MAX >> 7) {
            return Err(BerError::Invalid("object identifier"));
        }
        value = (value << 7) | u64::from(b & 0x7f);
        if b & 0x80 == 0 {
            if arcs.is_empty() {
                let (first, second) = match value {
                    0..=39 => (0, value),
                    40..=79 => (1, value - 40),
                    _ => (2, value - 80),
                };
                arcs.push(first);
                arcs.push(second);
            } else {
                arcs.push(value);
            }
            value = 0;
        }
    }

    Ok(arcs
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("."))
}
