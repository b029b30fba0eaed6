//! Byte-level helpers for the persisted index image
//!
//! The on-disk format is positional: structures write their fields in a fixed
//! order with no version tag, and readers must consume exactly what writers
//! produced. Variable-length fields are length-prefixed so each field is
//! self-describing. All integers are little-endian.

use std::io::{self, Read, Write};

/// Write a `u64` in little-endian byte order.
#[inline]
pub fn write_u64<W: Write + ?Sized>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a little-endian `u64`.
#[inline]
pub fn read_u64<R: Read + ?Sized>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a `u32` in little-endian byte order.
#[inline]
pub fn write_u32<W: Write + ?Sized>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a little-endian `u32`.
#[inline]
pub fn read_u32<R: Read + ?Sized>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Write a length-prefixed byte vector.
pub fn write_bytes<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    write_u64(writer, bytes.len() as u64)?;
    writer.write_all(bytes)
}

/// Read a length-prefixed byte vector, rejecting lengths above `max_len`.
///
/// The length bound keeps a corrupt prefix from turning into an absurd
/// allocation before the stream runs dry.
pub fn read_bytes<R: Read + ?Sized>(reader: &mut R, max_len: usize) -> io::Result<Vec<u8>> {
    let len = read_u64(reader)? as usize;
    if len > max_len {
        return Err(invalid_data(format!(
            "byte field length {} exceeds limit {}",
            len, max_len
        )));
    }
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Write a length-prefixed `u64` vector.
pub fn write_u64_vec<W: Write + ?Sized>(writer: &mut W, values: &[u64]) -> io::Result<()> {
    write_u64(writer, values.len() as u64)?;
    for &value in values {
        write_u64(writer, value)?;
    }
    Ok(())
}

/// Read a length-prefixed `u64` vector, rejecting lengths above `max_len`.
pub fn read_u64_vec<R: Read + ?Sized>(reader: &mut R, max_len: usize) -> io::Result<Vec<u64>> {
    let len = read_u64(reader)? as usize;
    if len > max_len {
        return Err(invalid_data(format!(
            "integer field length {} exceeds limit {}",
            len, max_len
        )));
    }
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(read_u64(reader)?);
    }
    Ok(values)
}

/// Build an `InvalidData` error with the given message.
#[inline]
pub fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}
