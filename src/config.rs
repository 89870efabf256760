/// Default limit on Object/ECMA array/Strict array nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum nesting of composite values. Deeper input fails with
    /// `DecodingError::NestingTooDeep`.
    pub max_depth: usize,
    /// When set, a standalone object-end marker decodes as
    /// `Amf0Value::ObjectEnd` instead of failing with
    /// `DecodingError::UnexpectedObjectEnd`.
    pub object_end_sentinel: bool,
    /// Largest strict array count accepted from the wire.
    pub max_strict_array_len: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            object_end_sentinel: false,
            max_strict_array_len: i32::MAX as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Emit object and ECMA array keys in ascending byte order, so that
    /// unordered host maps produce reproducible output.
    pub sort_keys: bool,
    pub max_depth: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sort_keys: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
