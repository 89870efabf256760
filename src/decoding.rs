use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{Buf, Bytes};
use tracing::{debug, trace, warn};

use crate::{Amf0Date, Amf0Value, DecoderConfig, DecodingError, Marker};

pub mod sink;

use sink::{DecodeSink, MapKind, MappingSink};

/// Decode AMF0 encoded messages.
///
/// `amf_bytes` must include whole AMF0 values. It can be a payload of `rtmp` Data or Command message.
pub fn decode_amf0_values(amf_bytes: Bytes) -> Result<Vec<Amf0Value>, DecodingError> {
    let mut decoder = Decoder::new(amf_bytes.reader());
    let mut amf_values = vec![];
    loop {
        match decoder.decode_next() {
            Ok(value) => amf_values.push(value),
            Err(DecodingError::EndOfStream) => return Ok(amf_values),
            Err(err) => return Err(err),
        }
    }
}

/// Reads AMF0 values from a byte stream into caller-owned destinations.
///
/// The decoder keeps no state between calls besides the reader. After an
/// error the reader is left wherever the failure happened; repositioning it
/// is up to the caller.
pub struct Decoder<R> {
    reader: R,
    config: DecoderConfig,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self { reader, config }
    }

    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    pub fn reset(&mut self, reader: R) {
        self.reader = reader;
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Decodes exactly one value into `dst`.
    ///
    /// Returns `DecodingError::EndOfStream` if the stream ends before the
    /// marker byte, and `DecodingError::UnexpectedEof` if it ends after it.
    pub fn decode<T: DecodeSink>(&mut self, dst: &mut T) -> Result<(), DecodingError> {
        self.decode_value(dst, 0)
    }

    /// Like [`Decoder::decode`], but for a destination that may be absent.
    ///
    /// With `None` the marker byte is consumed and validated, then the call
    /// fails with `NotAssignable`. The payload stays unread.
    pub fn decode_opt<T: DecodeSink>(&mut self, dst: Option<&mut T>) -> Result<(), DecodingError> {
        match dst {
            Some(dst) => self.decode(dst),
            None => {
                let marker = self.read_marker(0)?;
                trace!(%marker, "No destination for decoded value");
                Err(DecodingError::not_assignable(
                    "nil destination",
                    std::any::type_name::<T>(),
                ))
            }
        }
    }

    /// Decodes exactly one value into its dynamic representation.
    pub fn decode_next(&mut self) -> Result<Amf0Value, DecodingError> {
        let mut value = Amf0Value::Null;
        self.decode(&mut value)?;
        Ok(value)
    }

    fn decode_value(&mut self, dst: &mut dyn DecodeSink, depth: usize) -> Result<(), DecodingError> {
        let marker = self.read_marker(depth)?;

        match marker {
            Marker::Number => {
                let number = self.read_f64()?;
                dst.set_number(number)
            }
            Marker::Boolean => {
                let boolean = self.read_u8()? != 0;
                dst.set_boolean(boolean)
            }
            Marker::String => {
                let string = self.read_utf8()?;
                dst.set_string(string)
            }
            Marker::Object => self.decode_object(dst, depth),
            Marker::Null => dst.set_null(),
            Marker::EcmaArray => self.decode_ecma_array(dst, depth),
            Marker::ObjectEnd if self.config.object_end_sentinel => dst.set_object_end(),
            Marker::ObjectEnd => Err(DecodingError::UnexpectedObjectEnd),
            Marker::StrictArray => self.decode_strict_array(dst, depth),
            Marker::Date => self.decode_date(dst),
            Marker::MovieClip
            | Marker::Undefined
            | Marker::Reference
            | Marker::LongString
            | Marker::Unsupported
            | Marker::RecordSet
            | Marker::XmlDocument
            | Marker::TypedObject => {
                trace!(%marker, "Unimplemented AMF0 marker");
                Err(DecodingError::Unimplemented(marker))
            }
        }
    }

    fn decode_object(&mut self, dst: &mut dyn DecodeSink, depth: usize) -> Result<(), DecodingError> {
        let depth = self.enter(depth)?;
        let map = dst.mapping(MapKind::Object)?;
        self.decode_object_pairs(map, depth)?;
        Ok(())
    }

    fn decode_ecma_array(
        &mut self,
        dst: &mut dyn DecodeSink,
        depth: usize,
    ) -> Result<(), DecodingError> {
        let depth = self.enter(depth)?;
        let map = dst.mapping(MapKind::EcmaArray)?;

        // The count is advisory, the object-end terminator is authoritative.
        let array_size = self.read_u32()?;
        let decoded = self.decode_object_pairs(map, depth)?;
        if decoded != array_size as usize {
            debug!(array_size, decoded, "ECMA array count differs from decoded entries.");
        }
        Ok(())
    }

    fn decode_strict_array(
        &mut self,
        dst: &mut dyn DecodeSink,
        depth: usize,
    ) -> Result<(), DecodingError> {
        let depth = self.enter(depth)?;

        let length = self.read_u32()?;
        let max = self.config.max_strict_array_len;
        if length > max {
            return Err(DecodingError::ArrayTooLong { length, max });
        }
        let len = usize::try_from(length).map_err(|_| DecodingError::ArrayTooLong {
            length,
            max: usize::MAX as u32,
        })?;

        let array = dst.sequence(len)?;
        for index in 0..len {
            array.push_with(index, &mut |slot: &mut dyn DecodeSink| {
                self.decode_value(slot, depth)
            })?;
        }
        Ok(())
    }

    fn decode_date(&mut self, dst: &mut dyn DecodeSink) -> Result<(), DecodingError> {
        let unix_time = self.read_f64()?;
        let timezone_offset = self.read_i16()?;
        if timezone_offset != 0x00_00 {
            warn!(timezone_offset, "Timezone offset is not zero, it is not applied.");
        }

        dst.set_date(Amf0Date {
            unix_time,
            timezone_offset,
        })
    }

    /// Reads key/value pairs up to the empty key and object-end marker.
    /// Returns the number of pairs read.
    fn decode_object_pairs(
        &mut self,
        map: &mut dyn MappingSink,
        depth: usize,
    ) -> Result<usize, DecodingError> {
        let mut pairs = 0;
        loop {
            let key = self.read_utf8()?;
            if key.is_empty() {
                let marker = self.read_u8()?;
                if marker != Marker::ObjectEnd.as_u8() {
                    return Err(DecodingError::MissingObjectEnd(marker));
                }
                return Ok(pairs);
            }

            map.insert_with(key, &mut |slot: &mut dyn DecodeSink| {
                self.decode_value(slot, depth)
            })?;
            pairs += 1;
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, DecodingError> {
        let depth = depth + 1;
        if depth > self.config.max_depth {
            return Err(DecodingError::NestingTooDeep(self.config.max_depth));
        }
        Ok(depth)
    }

    /// A clean EOF is only possible before a top-level value.
    fn read_marker(&mut self, depth: usize) -> Result<Marker, DecodingError> {
        let marker = match self.reader.read_u8() {
            Ok(marker) => marker,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof && depth == 0 => {
                return Err(DecodingError::EndOfStream);
            }
            Err(err) => return Err(mid_value(err)),
        };
        Marker::try_from(marker)
    }

    fn read_u8(&mut self) -> Result<u8, DecodingError> {
        self.reader.read_u8().map_err(mid_value)
    }

    fn read_u16(&mut self) -> Result<u16, DecodingError> {
        self.reader.read_u16::<BigEndian>().map_err(mid_value)
    }

    fn read_i16(&mut self) -> Result<i16, DecodingError> {
        self.reader.read_i16::<BigEndian>().map_err(mid_value)
    }

    fn read_u32(&mut self) -> Result<u32, DecodingError> {
        self.reader.read_u32::<BigEndian>().map_err(mid_value)
    }

    fn read_f64(&mut self) -> Result<f64, DecodingError> {
        self.reader.read_f64::<BigEndian>().map_err(mid_value)
    }

    fn read_utf8(&mut self) -> Result<String, DecodingError> {
        let size = self.read_u16()? as usize;
        if size == 0 {
            return Ok(String::new());
        }

        let mut string_bytes = vec![0; size];
        self.reader
            .read_exact(&mut string_bytes)
            .map_err(mid_value)?;
        Ok(String::from_utf8(string_bytes)?)
    }
}

/// Any EOF after the marker byte means the value was cut short.
fn mid_value(err: io::Error) -> DecodingError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => DecodingError::UnexpectedEof,
        _ => DecodingError::Io(err),
    }
}
