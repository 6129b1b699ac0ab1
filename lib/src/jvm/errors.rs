use crate::jvm::class_file::ConstantPoolOverflow;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    ConstantPoolOverflow(ConstantPoolOverflow),

    /// A string whose modified UTF-8 encoding does not fit in a `CONSTANT_Utf8_info`
    Utf8TooLong { length: usize },

    /// A sequence has more entries than the count which prefixes it can express
    ///
    /// Attribute constructors report this before the attribute ever reaches a writer, and the
    /// writer re-checks before emitting any header bytes.
    TooManyEntries {
        what: &'static str,
        count: usize,
        max: usize,
    },

    IoError(std::io::Error),
}

impl From<ConstantPoolOverflow> for Error {
    fn from(err: ConstantPoolOverflow) -> Error {
        Error::ConstantPoolOverflow(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConstantPoolOverflow(overflow) => write!(
                f,
                "constant pool overflow at offset {} inserting {:?}",
                overflow.offset, overflow.constant
            ),
            Error::Utf8TooLong { length } => write!(
                f,
                "modified UTF-8 string of {} bytes exceeds the 65535 byte limit",
                length
            ),
            Error::TooManyEntries { what, count, max } => {
                write!(f, "{} {} exceeds the limit of {}", count, what, max)
            }
            Error::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}
