use std::string::FromUtf8Error;

use thiserror::Error;

use crate::Marker;

#[derive(Error, Debug)]
pub enum DecodingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended cleanly before the first byte of a value.
    #[error("End of stream")]
    EndOfStream,

    /// The stream ended in the middle of a value.
    #[error("Unexpected EOF")]
    UnexpectedEof,

    #[error("Unsupported marker: {0:#04x}")]
    UnsupportedMarker(u8),

    #[error("Not assignable to receiver value: {reason} (target: {target})")]
    NotAssignable {
        reason: &'static str,
        target: &'static str,
    },

    #[error("Not ended with object-end, found {0:#04x}")]
    MissingObjectEnd(u8),

    #[error("Invalid UTF-8 sequence")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("Unexpected object-end marker outside of an object")]
    UnexpectedObjectEnd,

    #[error("Length of array/slice is different: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Unsupported array length: {length} (max {max})")]
    ArrayTooLong { length: u32, max: u32 },

    #[error("Date is not representable: {0} ms")]
    InvalidDate(f64),

    #[error("Decoding of {0} is not implemented")]
    Unimplemented(Marker),

    #[error("Nesting too deep (max {0})")]
    NestingTooDeep(usize),
}

impl DecodingError {
    /// Returns true for violations of the AMF0 grammar itself, as opposed to
    /// stream failures or host-type mismatches.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DecodingError::MissingObjectEnd(_)
                | DecodingError::InvalidUtf8(_)
                | DecodingError::UnexpectedObjectEnd
        )
    }

    pub(crate) fn not_assignable(reason: &'static str, target: &'static str) -> Self {
        DecodingError::NotAssignable { reason, target }
    }
}

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported kind: {0}")]
    UnsupportedKind(&'static str),

    #[error("Unsupported key kind: {0} should be string")]
    UnexpectedKeyType(&'static str),

    #[error("Encoding of {0} is not implemented")]
    Unimplemented(&'static str),

    /// An empty key reads back as the object-end terminator.
    #[error("Empty key in object or ECMA array")]
    EmptyKey,

    #[error("Key too long: {0} bytes (max {})", u16::MAX)]
    KeyTooLong(usize),

    #[error("Array too long: {0} elements (max {})", u32::MAX)]
    ArrayTooLong(usize),

    #[error("Nesting too deep (max {0})")]
    NestingTooDeep(usize),
}
