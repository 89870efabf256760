use indexmap::IndexMap;

/// Decoded AMF0 value.
///
/// Numbers are always double precision on the wire, so every numeric host
/// type widens to `Number` when encoded and comes back as `f64`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Amf0Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Object(IndexMap<String, Amf0Value>),
    #[default]
    Null,
    /// Encodes as the Undefined marker. Decoding that marker is not
    /// implemented.
    Undefined,
    EcmaArray(IndexMap<String, Amf0Value>),
    StrictArray(Vec<Amf0Value>),
    Date(Amf0Date),
    /// Standalone object-end marker. Only produced by decoders configured
    /// with `object_end_sentinel`.
    ObjectEnd,
}

impl Amf0Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Properties of an Object or an ECMA array.
    pub fn as_properties(&self) -> Option<&IndexMap<String, Amf0Value>> {
        match self {
            Amf0Value::Object(map) | Amf0Value::EcmaArray(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Amf0Value]> {
        match self {
            Amf0Value::StrictArray(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Amf0Value::Null)
    }
}

/// AMF0 date: milliseconds since the Unix epoch (UTC) and a timezone offset
/// in minutes.
///
/// The offset is carried through but never applied. Decoded timestamps are
/// always interpreted as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Amf0Date {
    pub unix_time: f64,
    pub timezone_offset: i16,
}

impl Amf0Date {
    pub fn from_millis(unix_time: f64) -> Self {
        Self {
            unix_time,
            timezone_offset: 0,
        }
    }
}

/// Marks a string-keyed map to be encoded as an ECMA array instead of an
/// Object. Decoding into it behaves exactly like decoding into the inner map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EcmaArray<M>(pub M);

impl<M> EcmaArray<M> {
    pub fn into_inner(self) -> M {
        self.0
    }
}

/// Element of a sequence encoded in the flat ECMA array form: marker, u32
/// count and the key/value pairs with no object-end terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct EcmaPair<V> {
    pub key: String,
    pub value: V,
}

impl<V> EcmaPair<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
