use crate::jvm::Error;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Result;

/// Utility trait for serializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - all multi-byte quantities are big-endian
///   - tags are always `u8`
///   - sequences are prefixed by a `u8` or `u16` count (see [`u8_count`] and [`u16_count`])
///
pub trait Serialize: Sized {
    /// Serialize construct into a binary output stream
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()>;
}

impl Serialize for u8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)
    }
}

impl Serialize for u16 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<BigEndian>(*self)
    }
}

impl Serialize for u32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<BigEndian>(*self)
    }
}

impl Serialize for i32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<BigEndian>(*self)
    }
}

impl Serialize for i64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_i64::<BigEndian>(*self)
    }
}

impl Serialize for f32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<BigEndian>(*self)
    }
}

impl Serialize for f64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        writer.write_f64::<BigEndian>(*self)
    }
}

/// Narrow the length of a sequence to the `u16` count that prefixes it
pub fn u16_count(what: &'static str, count: usize) -> std::result::Result<u16, Error> {
    u16::try_from(count).map_err(|_| Error::TooManyEntries {
        what,
        count,
        max: u16::MAX as usize,
    })
}

/// Narrow the length of a sequence to the `u8` count that prefixes it
pub fn u8_count(what: &'static str, count: usize) -> std::result::Result<u8, Error> {
    u8::try_from(count).map_err(|_| Error::TooManyEntries {
        what,
        count,
        max: u8::MAX as usize,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn big_endian_layout() {
        let mut out: Vec<u8> = vec![];
        0xCAFEu16.serialize(&mut out).unwrap();
        0xDEADBEEFu32.serialize(&mut out).unwrap();
        (-2i32).serialize(&mut out).unwrap();
        1.0f32.serialize(&mut out).unwrap();
        assert_eq!(
            out,
            vec![0xCA, 0xFE, 0xDE, 0xAD, 0xBE, 0xEF, 0xFF, 0xFF, 0xFF, 0xFE, 0x3F, 0x80, 0, 0]
        );
    }

    #[test]
    fn counts_at_their_limits() {
        assert_eq!(u16_count("things", 65535).unwrap(), u16::MAX);
        assert_eq!(u8_count("things", 255).unwrap(), u8::MAX);
        assert!(matches!(
            u16_count("things", 65536),
            Err(Error::TooManyEntries {
                what: "things",
                count: 65536,
                max: 65535
            })
        ));
        assert!(matches!(
            u8_count("things", 256),
            Err(Error::TooManyEntries { max: 255, .. })
        ));
    }
}
