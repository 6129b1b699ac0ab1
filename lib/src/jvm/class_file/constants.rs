use crate::jvm::{Error, Serialize};
use crate::util::{Offset, OffsetVec, Width};
use byteorder::WriteBytesExt;
use std::collections::HashMap;
use std::hash::Hash;
use std::result::Result;

/// Interning of the constants referenced from attribute bodies
///
/// Every method gets or inserts the relevant entry and returns its index, so calling twice with
/// the same value returns the same index. Entries may be freshly added by any call: growing the
/// pool is the expected side effect of writing attributes.
pub trait ConstantPool {
    /// Get or insert a `CONSTANT_Utf8_info`
    fn utf8(&mut self, utf8: &str) -> Result<Utf8ConstantIndex, Error>;

    /// Get or insert a `CONSTANT_Class_info` for a binary class name (eg. `java/lang/Object`)
    fn class_info(&mut self, name: &str) -> Result<ClassConstantIndex, Error>;

    /// Get or insert a `CONSTANT_Integer_info`
    fn integer(&mut self, integer: i32) -> Result<ConstantIndex, Error>;

    /// Get or insert a `CONSTANT_Long_info`
    fn long_info(&mut self, long: i64) -> Result<ConstantIndex, Error>;

    /// Get or insert a `CONSTANT_Double_info`
    fn double_info(&mut self, double: f64) -> Result<ConstantIndex, Error>;

    /// Get or insert a `CONSTANT_Float_info`
    fn float_info(&mut self, float: f32) -> Result<ConstantIndex, Error>;

    /// Get or insert a `CONSTANT_String_info`
    fn string(&mut self, string: &str) -> Result<StringConstantIndex, Error>;
}

/// Class file constants pool builder
///
/// The pool is append only. Floating point constants are interned by their bit pattern, so
/// `0.0` and `-0.0` get distinct entries and a `NaN` gets a stable one.
pub struct ConstantsPool {
    constants: OffsetVec<Constant>,

    utf8s: HashMap<String, Utf8ConstantIndex>,
    classes: HashMap<Utf8ConstantIndex, ClassConstantIndex>,
    strings: HashMap<Utf8ConstantIndex, StringConstantIndex>,
    integers: HashMap<i32, ConstantIndex>,
    floats: HashMap<u32, ConstantIndex>,
    longs: HashMap<i64, ConstantIndex>,
    doubles: HashMap<u64, ConstantIndex>,
}

impl ConstantsPool {
    /// Make a fresh empty constants pool
    pub fn new() -> ConstantsPool {
        ConstantsPool {
            constants: OffsetVec::new_starting_at(Offset(1)),
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            strings: HashMap::new(),
            integers: HashMap::new(),
            floats: HashMap::new(),
            longs: HashMap::new(),
            doubles: HashMap::new(),
        }
    }

    /// Number of entries in the pool (`long` and `double` entries count once)
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Index that the next inserted constant would get
    ///
    /// This is also the `constant_pool_count` of the class file.
    pub fn next_index(&self) -> u16 {
        self.constants.offset_len().0 as u16
    }

    /// Look up the constant at an index
    ///
    /// Returns `None` for index 0, for the unusable index following a `long` or `double`, and for
    /// indices past the end of the pool.
    pub fn get(&self, index: ConstantIndex) -> Option<&Constant> {
        self.constants.get_offset(Offset(index.0 as usize)).ok()
    }

    /// Iterate over all constants along with their indices
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &Constant)> + '_ {
        self.constants
            .iter()
            .map(|(offset, _, constant)| (ConstantIndex(offset.0 as u16), constant))
    }

    /// Push a constant into the constant pool, provided there is space for it
    ///
    /// Note: the largest valid index is 65535, indexing starts at 1, and some constants take two
    /// spaces.
    fn push_constant(&mut self, constant: Constant) -> Result<ConstantIndex, ConstantPoolOverflow> {
        let offset: u16 = self.constants.offset_len().0 as u16;

        // Detect if the next constant would overflow the pool
        if offset.checked_add(constant.width() as u16).is_none() {
            return Err(ConstantPoolOverflow { constant, offset });
        }

        log::debug!("Interning constant #{} = {:?}", offset, constant);
        self.constants.push(constant);
        Ok(ConstantIndex(offset))
    }

    /// Get or insert one of the numeric constants, keyed in its own interning table
    fn get_numeric<K: Hash + Eq>(
        &mut self,
        table: fn(&mut Self) -> &mut HashMap<K, ConstantIndex>,
        key: K,
        constant: Constant,
    ) -> Result<ConstantIndex, Error> {
        if let Some(idx) = table(self).get(&key) {
            return Ok(*idx);
        }
        let idx = self.push_constant(constant)?;
        table(self).insert(key, idx);
        Ok(idx)
    }
}

impl Default for ConstantsPool {
    fn default() -> Self {
        ConstantsPool::new()
    }
}

impl ConstantPool for ConstantsPool {
    fn utf8(&mut self, utf8: &str) -> Result<Utf8ConstantIndex, Error> {
        if let Some(idx) = self.utf8s.get(utf8) {
            return Ok(*idx);
        }

        let length = modified_utf8_len(utf8);
        if length > u16::MAX as usize {
            return Err(Error::Utf8TooLong { length });
        }

        let idx = Utf8ConstantIndex(self.push_constant(Constant::Utf8(utf8.to_owned()))?);
        self.utf8s.insert(utf8.to_owned(), idx);
        Ok(idx)
    }

    fn class_info(&mut self, name: &str) -> Result<ClassConstantIndex, Error> {
        let name = self.utf8(name)?;
        if let Some(idx) = self.classes.get(&name) {
            Ok(*idx)
        } else {
            let idx = ClassConstantIndex(self.push_constant(Constant::Class(name))?);
            self.classes.insert(name, idx);
            Ok(idx)
        }
    }

    fn integer(&mut self, integer: i32) -> Result<ConstantIndex, Error> {
        self.get_numeric(|pool| &mut pool.integers, integer, Constant::Integer(integer))
    }

    fn long_info(&mut self, long: i64) -> Result<ConstantIndex, Error> {
        self.get_numeric(|pool| &mut pool.longs, long, Constant::Long(long))
    }

    fn double_info(&mut self, double: f64) -> Result<ConstantIndex, Error> {
        self.get_numeric(
            |pool| &mut pool.doubles,
            double.to_bits(),
            Constant::Double(double),
        )
    }

    fn float_info(&mut self, float: f32) -> Result<ConstantIndex, Error> {
        self.get_numeric(|pool| &mut pool.floats, float.to_bits(), Constant::Float(float))
    }

    fn string(&mut self, string: &str) -> Result<StringConstantIndex, Error> {
        let contents = self.utf8(string)?;
        if let Some(idx) = self.strings.get(&contents) {
            Ok(*idx)
        } else {
            let idx = StringConstantIndex(self.push_constant(Constant::String(contents))?);
            self.strings.insert(contents, idx);
            Ok(idx)
        }
    }
}

/// Serializes as `constant_pool_count` followed by the `constant_pool` table
impl Serialize for ConstantsPool {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.next_index().serialize(writer)?;
        for (_, _, constant) in &self.constants {
            constant.serialize(writer)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ConstantPoolOverflow {
    pub constant: Constant,
    pub offset: u16,
}

/// Constants as in the constant pool
///
/// Note: only the constants which attribute bodies refer to are included
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Constant primitive of type `int` (also used for `char`, `short`, `byte`, `boolean`)
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (the encoding of the
    /// null character `\u{0000}` and the encoding of supplementary characters
    /// is different).
    Utf8(String),
}

impl Serialize for Constant {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Constant::Utf8(string) => {
                1u8.serialize(writer)?;
                let buffer: Vec<u8> = encode_modified_utf8(string);
                (buffer.len() as u16).serialize(writer)?;
                writer.write_all(&buffer)?;
            }
            Constant::Integer(integer) => {
                3u8.serialize(writer)?;
                integer.serialize(writer)?;
            }
            Constant::Float(float) => {
                4u8.serialize(writer)?;
                float.serialize(writer)?;
            }
            Constant::Long(long) => {
                5u8.serialize(writer)?;
                long.serialize(writer)?;
            }
            Constant::Double(double) => {
                6u8.serialize(writer)?;
                double.serialize(writer)?;
            }
            Constant::Class(name) => {
                7u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::String(contents) => {
                8u8.serialize(writer)?;
                contents.serialize(writer)?;
            }
        };
        Ok(())
    }
}

/// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`. Quoting
/// the JVM specification:
///
/// > All 8-byte constants take up two entries in the constant_pool table of the class file. If a
/// > CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the constant_pool table
/// > at index n, then the next usable item in the pool is located at index n+2. The constant_pool
/// > index n+1 must be valid but is considered unusable.
impl Width for Constant {
    fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = Vec::with_capacity(modified_utf8_len(string));
    for c in string.chars() {
        let code: u32 = c as u32;

        match modified_utf8_char_len(c) {
            1 => buffer.push(code as u8),
            2 => {
                buffer.push((code >> 6 & 0x1F) as u8 | 0b1100_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
            3 => {
                buffer.push((code >> 12 & 0x0F) as u8 | 0b1110_0000);
                buffer.push((code >> 6 & 0x3F) as u8 | 0b1000_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }

            // Supplementary characters: encoded as a surrogate pair, 3 bytes per surrogate
            _ => {
                buffer.push(0b1110_1101);
                buffer.push(((code >> 16 & 0x0F) as u8).wrapping_sub(1) & 0x0F | 0b1010_0000);
                buffer.push((code >> 10 & 0x3F) as u8 | 0b1000_0000);

                buffer.push(0b1110_1101);
                buffer.push(((code >> 6 & 0x0F) as u8) | 0b1011_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
        }
    }
    buffer
}

/// Length in bytes of the modified UTF-8 encoding of a string
pub fn modified_utf8_len(string: &str) -> usize {
    string.chars().map(modified_utf8_char_len).sum()
}

fn modified_utf8_char_len(c: char) -> usize {
    match c {
        '\u{0000}' => 2,
        c if c.len_utf8() == 4 => 6,
        c => c.len_utf8(),
    }
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ConstantIndex(pub u16);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Utf8ConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct StringConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ClassConstantIndex(pub ConstantIndex);

impl From<Utf8ConstantIndex> for ConstantIndex {
    fn from(index: Utf8ConstantIndex) -> ConstantIndex {
        index.0
    }
}
impl From<StringConstantIndex> for ConstantIndex {
    fn from(index: StringConstantIndex) -> ConstantIndex {
        index.0
    }
}
impl From<ClassConstantIndex> for ConstantIndex {
    fn from(index: ClassConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}
impl Serialize for Utf8ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}
impl Serialize for StringConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}
impl Serialize for ClassConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

#[cfg(test)]
mod encode_modified_utf8_tests {
    use super::*;

    #[test]
    fn containing_null_byte() {
        assert_eq!(encode_modified_utf8("a\x00a"), vec![97, 192, 128, 97]);
        assert_eq!(modified_utf8_len("a\x00a"), 4);
    }

    #[test]
    fn simple_ascii() {
        assert_eq!(encode_modified_utf8("foo"), vec![102, 111, 111]);
        assert_eq!(modified_utf8_len("Ljava/lang/String;"), 18);
    }

    #[test]
    fn two_and_three_byte_encodings() {
        assert_eq!(encode_modified_utf8("Ąअ"), vec![196, 132, 224, 164, 133]);
    }

    #[test]
    fn supplementary_characters() {
        let encoded = encode_modified_utf8("\u{10000}\u{10FFFF}");
        assert_eq!(
            encoded,
            vec![237, 160, 128, 237, 176, 128, 237, 175, 191, 237, 191, 191]
        );
        assert_eq!(modified_utf8_len("\u{10000}\u{10FFFF}"), encoded.len());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut pool = ConstantsPool::new();
        let sig = pool.utf8("Signature").unwrap();
        assert_eq!(sig, Utf8ConstantIndex(ConstantIndex(1)));
        assert_eq!(pool.utf8("Signature").unwrap(), sig);
        assert_eq!(pool.integer(7).unwrap(), ConstantIndex(2));
        assert_eq!(pool.integer(7).unwrap(), ConstantIndex(2));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn wide_constants_take_two_slots() {
        let mut pool = ConstantsPool::new();
        assert_eq!(pool.long_info(1).unwrap(), ConstantIndex(1));
        assert_eq!(pool.double_info(2.5).unwrap(), ConstantIndex(3));
        assert_eq!(pool.float_info(2.5).unwrap(), ConstantIndex(5));
        assert_eq!(pool.next_index(), 6);
        assert_eq!(pool.get(ConstantIndex(2)), None);
        assert_eq!(pool.get(ConstantIndex(3)), Some(&Constant::Double(2.5)));
    }

    #[test]
    fn floats_interned_by_bits() {
        let mut pool = ConstantsPool::new();
        let zero = pool.float_info(0.0).unwrap();
        let negative_zero = pool.float_info(-0.0).unwrap();
        assert_ne!(zero, negative_zero);
        let nan = pool.double_info(f64::NAN).unwrap();
        assert_eq!(pool.double_info(f64::NAN).unwrap(), nan);
    }

    #[test]
    fn class_and_string_share_utf8() {
        let mut pool = ConstantsPool::new();
        let class = pool.class_info("java/lang/Object").unwrap();
        let string = pool.string("java/lang/Object").unwrap();
        assert_eq!(class, ClassConstantIndex(ConstantIndex(2)));
        assert_eq!(string, StringConstantIndex(ConstantIndex(3)));
        assert_eq!(
            pool.get(ConstantIndex(3)),
            Some(&Constant::String(Utf8ConstantIndex(ConstantIndex(1))))
        );
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn overlong_utf8_is_rejected() {
        let mut pool = ConstantsPool::new();
        let huge = "\u{0800}".repeat(30000);
        assert!(matches!(
            pool.utf8(&huge),
            Err(Error::Utf8TooLong { length: 90000 })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn pool_overflow() {
        let mut pool = ConstantsPool::new();
        for i in 0..65534 {
            pool.integer(i).unwrap();
        }
        assert_eq!(pool.next_index(), 65535);
        assert!(matches!(
            pool.long_info(0),
            Err(Error::ConstantPoolOverflow(ConstantPoolOverflow {
                offset: 65535,
                ..
            }))
        ));
        assert!(matches!(
            pool.integer(-1),
            Err(Error::ConstantPoolOverflow(_))
        ));
        assert_eq!(pool.integer(5).unwrap(), ConstantIndex(6));
    }

    #[test]
    fn serialized_pool() {
        let mut pool = ConstantsPool::new();
        pool.class_info("A").unwrap();
        pool.long_info(-1).unwrap();
        let mut bytes = vec![];
        pool.serialize(&mut bytes).unwrap();
        assert_eq!(
            bytes,
            vec![
                0, 5, // constant_pool_count
                1, 0, 1, b'A', // #1 Utf8 "A"
                7, 0, 1, // #2 Class #1
                5, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // #3 Long -1
            ]
        );
    }
}
