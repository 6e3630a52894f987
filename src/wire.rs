//! SSH binary data types (RFC 4251 section 5): `uint32`, `string` and
//! `mpint`, as used inside signature and key blobs.

use bytes::{BufMut, BytesMut};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{CryptoError, Result};

/// Appends SSH-encoded values to a growable buffer.
#[derive(Debug, Default)]
pub struct SshWriter {
    buf: BytesMut,
}

impl SshWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a big-endian `uint32`.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32(value);
        self
    }

    /// Writes a length-prefixed byte string.
    pub fn write_string(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_u32(bytes.len() as u32);
        self.buf.put_slice(bytes);
        self
    }

    /// Writes a non-negative integer in minimal two's complement: no
    /// leading zero bytes, except one when the top bit would otherwise be
    /// set. Zero is the empty string.
    pub fn write_mpint(&mut self, value: &BigUint) -> &mut Self {
        if value.is_zero() {
            self.buf.put_u32(0);
            return self;
        }
        let magnitude = value.to_bytes_be();
        let pad = magnitude[0] & 0x80 != 0;
        self.buf.put_u32((magnitude.len() + usize::from(pad)) as u32);
        if pad {
            self.buf.put_u8(0);
        }
        self.buf.put_slice(&magnitude);
        self
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Reads SSH-encoded values from a borrowed buffer. Every read checks the
/// remaining length first and fails with [`CryptoError::MalformedInput`].
#[derive(Debug, Clone)]
pub struct SshReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SshReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads a big-endian `uint32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a length-prefixed byte string without copying.
    pub fn read_string(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    /// Reads a non-negative `mpint`. Negative values and encodings with
    /// superfluous leading bytes are rejected.
    pub fn read_mpint(&mut self) -> Result<BigUint> {
        let bytes = self.read_string()?;
        match bytes {
            [] => Ok(BigUint::zero()),
            [first, ..] if first & 0x80 != 0 => {
                Err(CryptoError::MalformedInput("negative mpint"))
            }
            [0] => Err(CryptoError::MalformedInput("non-minimal mpint")),
            [0, second, ..] if second & 0x80 == 0 => {
                Err(CryptoError::MalformedInput("non-minimal mpint"))
            }
            _ => Ok(BigUint::from_bytes_be(bytes)),
        }
    }

    /// Fails when unread bytes remain.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CryptoError::MalformedInput("trailing bytes after blob"))
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CryptoError::MalformedInput("blob truncated"));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpint_encodings_from_rfc4251() {
        let cases: [(&[u8], &[u8]); 3] = [
            (&[], &[0, 0, 0, 0]),
            (
                &[0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7],
                &[0, 0, 0, 8, 0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7],
            ),
            (&[0x80], &[0, 0, 0, 2, 0x00, 0x80]),
        ];
        for (value, encoded) in cases {
            let n = BigUint::from_bytes_be(value);
            let mut w = SshWriter::new();
            w.write_mpint(&n);
            assert_eq!(w.as_slice(), encoded);

            let mut r = SshReader::new(encoded);
            assert_eq!(r.read_mpint().unwrap(), n);
            assert!(r.finish().is_ok());
        }
    }

    #[test]
    fn rejects_negative_and_padded_mpints() {
        let mut r = SshReader::new(&[0, 0, 0, 1, 0xff]);
        assert!(r.read_mpint().is_err());
        let mut r = SshReader::new(&[0, 0, 0, 2, 0x00, 0x7f]);
        assert!(r.read_mpint().is_err());
    }

    #[test]
    fn string_framing() {
        let mut w = SshWriter::new();
        w.write_string(b"ecdsa-sha2-nistp256").write_u32(7);
        let mut r = SshReader::new(w.as_slice());
        assert_eq!(r.read_string().unwrap(), b"ecdsa-sha2-nistp256");
        assert_eq!(r.read_u32().unwrap(), 7);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_string_is_an_error() {
        let mut r = SshReader::new(&[0, 0, 0, 5, 1, 2]);
        assert!(r.read_string().is_err());
    }
}
