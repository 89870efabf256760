use std::fmt;

use crate::DecodingError;

/// One-byte type tag that precedes every AMF0 value on the wire.
///
/// Per the AMF0 format document (https://rtmp.veriskope.com/pdf/amf0-file-format-specification.pdf),
/// `MovieClip` and `RecordSet` are reserved and never produced by conforming encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Marker {
    Number = 0x00,
    Boolean = 0x01,
    String = 0x02,
    Object = 0x03,
    MovieClip = 0x04,
    Null = 0x05,
    Undefined = 0x06,
    Reference = 0x07,
    EcmaArray = 0x08,
    ObjectEnd = 0x09,
    StrictArray = 0x0A,
    Date = 0x0B,
    LongString = 0x0C,
    Unsupported = 0x0D,
    RecordSet = 0x0E,
    XmlDocument = 0x0F,
    TypedObject = 0x10,
}

impl Marker {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Marker {
    type Error = DecodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let marker = match value {
            0x00 => Marker::Number,
            0x01 => Marker::Boolean,
            0x02 => Marker::String,
            0x03 => Marker::Object,
            0x04 => Marker::MovieClip,
            0x05 => Marker::Null,
            0x06 => Marker::Undefined,
            0x07 => Marker::Reference,
            0x08 => Marker::EcmaArray,
            0x09 => Marker::ObjectEnd,
            0x0A => Marker::StrictArray,
            0x0B => Marker::Date,
            0x0C => Marker::LongString,
            0x0D => Marker::Unsupported,
            0x0E => Marker::RecordSet,
            0x0F => Marker::XmlDocument,
            0x10 => Marker::TypedObject,
            _ => return Err(DecodingError::UnsupportedMarker(value)),
        };
        Ok(marker)
    }
}

impl From<Marker> for u8 {
    fn from(marker: Marker) -> Self {
        marker.as_u8()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({:#04x})", self.as_u8())
    }
}
