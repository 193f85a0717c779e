//! Fixed-width integer primitives and the 7-bit-continuation string codec
//! IDAT files are built from. All multi-byte integers are little-endian.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{FormatError, Result};

pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    Ok(reader.read_u8()?)
}

pub fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    Ok(reader.read_u16::<LittleEndian>()?)
}

pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(reader.read_u32::<LittleEndian>()?)
}

pub fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    Ok(reader.read_u64::<LittleEndian>()?)
}

pub fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<()> {
    writer.write_u8(value)?;
    Ok(())
}

pub fn write_u16<W: Write>(writer: &mut W, value: u16) -> Result<()> {
    writer.write_u16::<LittleEndian>(value)?;
    Ok(())
}

pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_u32::<LittleEndian>(value)?;
    Ok(())
}

pub fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<()> {
    writer.write_u64::<LittleEndian>(value)?;
    Ok(())
}

/// Reads `n` bytes and decodes them as UTF-8. Used for the 4-byte magic.
pub fn read_char_block<R: Read>(reader: &mut R, n: usize) -> Result<String> {
    let mut buf = vec![0u8; n];
    reader.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf).map_err(FormatError::InvalidUtf8)?)
}

pub fn write_char_block<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Decodes a 7-bit-continuation length prefix: read bytes until one has its
/// high bit clear, accumulating `(byte & 0x7F) * 128^i`.
pub fn read_varint_len<R: Read>(reader: &mut R) -> Result<u64> {
    let mut len: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = reader.read_u8()?;
        len |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok(len)
}

/// Encodes `len` using the shortest 7-bit-continuation representation.
pub fn encode_varint_len(mut len: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    loop {
        let byte = (len & 0x7F) as u8;
        len >>= 7;
        if len > 0 {
            out.push(byte | 0x80);
        } else {
            out.push(byte);
            break;
        }
    }
    out
}

pub fn write_varint_len<W: Write>(writer: &mut W, len: u64) -> Result<()> {
    writer.write_all(&encode_varint_len(len))?;
    Ok(())
}

/// Implementation-chosen ceiling on a single string section's declared byte
/// length, enforced before the body buffer is allocated. No legitimate IDAT
/// field (manifest name, barcode, description, ...) approaches this size;
/// a declared length past it is corrupt input, not a large valid string.
pub const MAX_STRING_LEN: u64 = 1 << 28;

/// Reads a length-prefixed UTF-8 string: varint byte count, then that many bytes.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_varint_len(reader)?;
    if len > MAX_STRING_LEN {
        return Err(FormatError::StringLengthOverflow {
            found: len,
            limit: MAX_STRING_LEN,
        }
        .into());
    }
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf).map_err(FormatError::InvalidUtf8)?)
}

/// Writes a length-prefixed UTF-8 string: varint byte count, then the bytes.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    write_varint_len(writer, value.len() as u64)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// `len(encode_varint_len(len(s))) + len(s)` — the serialized size of a string
/// section body. The Writer must use this, never a hardcoded constant, since
/// the prefix width varies with string length.
pub fn encoded_string_length(s: &str) -> u64 {
    encode_varint_len(s.len() as u64).len() as u64 + s.len() as u64
}
