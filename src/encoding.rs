use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::{Amf0Date, Amf0Value, EncoderConfig, EncodingError, Marker};

pub mod source;

use source::{Encode, KeyRef, MapSource, SequenceSource, Shape};

pub fn encode_amf0_values(amf_values: &[Amf0Value]) -> Result<Bytes, EncodingError> {
    let mut encoder = Encoder::new(BytesMut::new().writer());
    for value in amf_values {
        encoder.encode(value)?;
    }
    Ok(encoder.into_inner().into_inner().freeze())
}

/// Writes host values to a byte sink in the AMF0 layout.
///
/// Output is written as the value tree is walked, so a failed `encode` may
/// leave a partial value in the sink.
pub struct Encoder<W> {
    writer: W,
    config: EncoderConfig,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, EncoderConfig::default())
    }

    /// Encoder that emits map keys in ascending byte order.
    pub fn sorted(writer: W) -> Self {
        let config = EncoderConfig {
            sort_keys: true,
            ..Default::default()
        };
        Self::with_config(writer, config)
    }

    pub fn with_config(writer: W, config: EncoderConfig) -> Self {
        Self { writer, config }
    }

    pub fn config(&self) -> EncoderConfig {
        self.config
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn encode<T: Encode>(&mut self, value: &T) -> Result<(), EncodingError> {
        self.encode_value(value, 0)
    }

    fn encode_value(&mut self, value: &dyn Encode, depth: usize) -> Result<(), EncodingError> {
        match value.shape() {
            Shape::Number(n) => self.put_number(n),
            Shape::Boolean(b) => self.put_bool(b),
            Shape::Text(s) => self.put_string(s),
            Shape::Map {
                entries,
                ecma_array: false,
            } => self.put_object(entries, depth),
            Shape::Map {
                entries,
                ecma_array: true,
            } => self.put_ecma_array(entries, depth),
            Shape::Sequence(elements) => self.put_sequence(elements, depth),
            Shape::Date(date) => self.put_date(date),
            Shape::Null => self.put_null(),
            Shape::Undefined => self.put_undefined(),
            Shape::ObjectEnd => self.put_marker(Marker::ObjectEnd),
            Shape::Unsupported => Err(EncodingError::UnsupportedKind(value.kind())),
        }
    }

    fn put_marker(&mut self, marker: Marker) -> Result<(), EncodingError> {
        self.writer.write_u8(marker.as_u8())?;
        Ok(())
    }

    fn put_number(&mut self, n: f64) -> Result<(), EncodingError> {
        self.put_marker(Marker::Number)?;
        self.writer.write_f64::<BigEndian>(n)?;
        Ok(())
    }

    fn put_bool(&mut self, b: bool) -> Result<(), EncodingError> {
        self.put_marker(Marker::Boolean)?;
        self.writer.write_u8(b.into())?;
        Ok(())
    }

    fn put_string(&mut self, s: &str) -> Result<(), EncodingError> {
        if s.len() > u16::MAX as usize {
            return Err(EncodingError::Unimplemented("long string"));
        }
        self.put_marker(Marker::String)?;
        self.put_utf8(s)
    }

    fn put_null(&mut self) -> Result<(), EncodingError> {
        self.put_marker(Marker::Null)
    }

    fn put_undefined(&mut self) -> Result<(), EncodingError> {
        self.put_marker(Marker::Undefined)
    }

    fn put_date(&mut self, date: Amf0Date) -> Result<(), EncodingError> {
        self.put_marker(Marker::Date)?;
        self.writer.write_f64::<BigEndian>(date.unix_time)?;
        if date.timezone_offset != 0 {
            warn!(
                timezone_offset = date.timezone_offset,
                "Timezone offset is not zero."
            );
        }
        self.writer.write_i16::<BigEndian>(date.timezone_offset)?;
        Ok(())
    }

    fn put_object(&mut self, map: &dyn MapSource, depth: usize) -> Result<(), EncodingError> {
        let depth = self.enter(depth)?;
        let entries = self.string_keyed(map)?;
        self.put_marker(Marker::Object)?;
        self.put_keyval_map(&entries, depth)
    }

    fn put_ecma_array(&mut self, map: &dyn MapSource, depth: usize) -> Result<(), EncodingError> {
        let depth = self.enter(depth)?;
        let entries = self.string_keyed(map)?;
        self.put_marker(Marker::EcmaArray)?;
        // Decoders rely on the terminator, the count is informational.
        let count = u32::try_from(entries.len()).unwrap_or(u32::MAX);
        self.writer.write_u32::<BigEndian>(count)?;
        self.put_keyval_map(&entries, depth)
    }

    fn put_sequence(
        &mut self,
        sequence: &dyn SequenceSource,
        depth: usize,
    ) -> Result<(), EncodingError> {
        let depth = self.enter(depth)?;
        let elements = sequence.elements();
        let pairs: Vec<(&str, &dyn Encode)> = elements
            .iter()
            .copied()
            .filter_map(|element| element.ecma_pair())
            .collect();

        match (pairs.len(), elements.len()) {
            (0, _) => self.put_strict_array(&elements, depth),
            (pairs_len, elements_len) if pairs_len == elements_len => {
                self.put_ecma_pairs(&pairs, depth)
            }
            _ => Err(EncodingError::Unimplemented(
                "sequence mixing ECMA pairs and plain values",
            )),
        }
    }

    fn put_strict_array(
        &mut self,
        elements: &[&dyn Encode],
        depth: usize,
    ) -> Result<(), EncodingError> {
        let len = u32::try_from(elements.len())
            .map_err(|_| EncodingError::ArrayTooLong(elements.len()))?;
        self.put_marker(Marker::StrictArray)?;
        self.writer.write_u32::<BigEndian>(len)?;
        for element in elements {
            self.encode_value(*element, depth)?;
        }
        Ok(())
    }

    /// Flat ECMA array: marker, count and key/value pairs, with no
    /// object-end terminator.
    fn put_ecma_pairs(
        &mut self,
        pairs: &[(&str, &dyn Encode)],
        depth: usize,
    ) -> Result<(), EncodingError> {
        let len =
            u32::try_from(pairs.len()).map_err(|_| EncodingError::ArrayTooLong(pairs.len()))?;
        if pairs.iter().any(|(key, _)| key.is_empty()) {
            return Err(EncodingError::EmptyKey);
        }
        self.put_marker(Marker::EcmaArray)?;
        self.writer.write_u32::<BigEndian>(len)?;
        for (key, value) in pairs {
            self.put_key(key)?;
            self.encode_value(*value, depth)?;
        }
        Ok(())
    }

    /// Checks that every key is a non-empty string and applies the configured
    /// order.
    fn string_keyed<'a>(
        &self,
        map: &'a dyn MapSource,
    ) -> Result<Vec<(&'a str, &'a dyn Encode)>, EncodingError> {
        let mut entries = map
            .entries()
            .into_iter()
            .map(|(key, value)| match key {
                KeyRef::Str("") => Err(EncodingError::EmptyKey),
                KeyRef::Str(key) => Ok((key, value)),
                KeyRef::Other(kind) => Err(EncodingError::UnexpectedKeyType(kind)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if self.config.sort_keys {
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
        }
        Ok(entries)
    }

    fn put_keyval_map(
        &mut self,
        entries: &[(&str, &dyn Encode)],
        depth: usize,
    ) -> Result<(), EncodingError> {
        for (key, value) in entries {
            self.put_key(key)?;
            self.encode_value(*value, depth)?;
        }
        self.put_object_end()
    }

    fn put_object_end(&mut self) -> Result<(), EncodingError> {
        self.writer.write_u16::<BigEndian>(0)?;
        self.put_marker(Marker::ObjectEnd)
    }

    fn put_key(&mut self, key: &str) -> Result<(), EncodingError> {
        if key.len() > u16::MAX as usize {
            return Err(EncodingError::KeyTooLong(key.len()));
        }
        self.put_utf8(key)
    }

    fn put_utf8(&mut self, s: &str) -> Result<(), EncodingError> {
        self.writer.write_u16::<BigEndian>(s.len() as u16)?;
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<usize, EncodingError> {
        let depth = depth + 1;
        if depth > self.config.max_depth {
            return Err(EncodingError::NestingTooDeep(self.config.max_depth));
        }
        Ok(depth)
    }
}
