//! AMF0 (Action Message Format, version 0) codec.
//!
//! [`Decoder`] reads values from any [`std::io::Read`] into destinations
//! implementing [`DecodeSink`], [`Encoder`] writes anything implementing
//! [`Encode`] to a [`std::io::Write`]. [`Amf0Value`] works on both sides as
//! the dynamic value type.

mod config;
mod error;
mod key;
mod marker;
mod value;

pub mod decoding;
pub mod encoding;

#[cfg(test)]
mod codec_tests;

pub use config::{DEFAULT_MAX_DEPTH, DecoderConfig, EncoderConfig};
pub use decoding::{
    Decoder, decode_amf0_values,
    sink::{DecodeSink, Fill, MapKind, MappingSink, SequenceSink, system_time_from_millis},
};
pub use encoding::{
    Encoder, encode_amf0_values,
    source::{Encode, KeyRef, MapSource, SequenceSource, Shape},
};
pub use error::{DecodingError, EncodingError};
pub use key::MapKey;
pub use marker::Marker;
pub use value::{Amf0Date, Amf0Value, EcmaArray, EcmaPair};
