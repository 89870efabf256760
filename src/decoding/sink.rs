use std::{
    any::type_name,
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    rc::Rc,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use indexmap::IndexMap;

use crate::{Amf0Date, Amf0Value, DecodingError, EcmaArray, MapKey};

/// Upper bound on capacity reserved up front for a strict array. The wire
/// count is untrusted, so vectors grow past this only as elements arrive.
const PREALLOC_LIMIT: usize = 1024;

/// Decodes the next wire value into the given slot.
pub type Fill<'a> = dyn FnMut(&mut dyn DecodeSink) -> Result<(), DecodingError> + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Object,
    EcmaArray,
}

/// Caller-owned location that a decoded value is written into.
///
/// Every method defaults to a `NotAssignable` error, so an implementation only
/// opts into the wire shapes it can hold.
pub trait DecodeSink {
    fn target(&self) -> &'static str {
        type_name::<Self>()
    }

    fn set_number(&mut self, _value: f64) -> Result<(), DecodingError> {
        Err(DecodingError::not_assignable("not numeric type", self.target()))
    }

    fn set_boolean(&mut self, _value: bool) -> Result<(), DecodingError> {
        Err(DecodingError::not_assignable("not boolean type", self.target()))
    }

    fn set_string(&mut self, _value: String) -> Result<(), DecodingError> {
        Err(DecodingError::not_assignable("not string type", self.target()))
    }

    fn set_date(&mut self, _value: Amf0Date) -> Result<(), DecodingError> {
        Err(DecodingError::not_assignable("not date type", self.target()))
    }

    /// Only nilable, dynamic, map and vector destinations accept null.
    fn set_null(&mut self) -> Result<(), DecodingError> {
        Err(DecodingError::not_assignable("not reference type", self.target()))
    }

    fn set_object_end(&mut self) -> Result<(), DecodingError> {
        Err(DecodingError::not_assignable("not dynamic type", self.target()))
    }

    /// Prepares the destination for the key/value pairs of an Object or an
    /// ECMA array.
    fn mapping(&mut self, _kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        Err(DecodingError::not_assignable("not map type", self.target()))
    }

    /// Prepares the destination for `len` strict array elements.
    fn sequence(&mut self, _len: usize) -> Result<&mut dyn SequenceSink, DecodingError> {
        Err(DecodingError::not_assignable(
            "not array or slice type",
            self.target(),
        ))
    }
}

pub trait MappingSink {
    fn insert_with(&mut self, key: String, fill: &mut Fill<'_>) -> Result<(), DecodingError>;
}

pub trait SequenceSink {
    fn push_with(&mut self, index: usize, fill: &mut Fill<'_>) -> Result<(), DecodingError>;
}

macro_rules! numeric_sink {
    ($($ty:ty),*) => {$(
        impl DecodeSink for $ty {
            // `as` saturates out-of-range values and truncates toward zero.
            fn set_number(&mut self, value: f64) -> Result<(), DecodingError> {
                *self = value as $ty;
                Ok(())
            }
        }
    )*};
}

numeric_sink!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl DecodeSink for bool {
    fn set_boolean(&mut self, value: bool) -> Result<(), DecodingError> {
        *self = value;
        Ok(())
    }
}

impl DecodeSink for String {
    fn set_string(&mut self, value: String) -> Result<(), DecodingError> {
        *self = value;
        Ok(())
    }
}

impl DecodeSink for Box<str> {
    fn set_string(&mut self, value: String) -> Result<(), DecodingError> {
        *self = value.into_boxed_str();
        Ok(())
    }
}

impl DecodeSink for Arc<str> {
    fn set_string(&mut self, value: String) -> Result<(), DecodingError> {
        *self = value.into();
        Ok(())
    }
}

impl DecodeSink for Rc<str> {
    fn set_string(&mut self, value: String) -> Result<(), DecodingError> {
        *self = value.into();
        Ok(())
    }
}

impl DecodeSink for Amf0Date {
    fn set_date(&mut self, value: Amf0Date) -> Result<(), DecodingError> {
        *self = value;
        Ok(())
    }
}

impl DecodeSink for SystemTime {
    fn set_date(&mut self, value: Amf0Date) -> Result<(), DecodingError> {
        *self = system_time_from_millis(value.unix_time)?;
        Ok(())
    }
}

/// Interprets `millis` as milliseconds since the Unix epoch, in UTC.
pub fn system_time_from_millis(millis: f64) -> Result<SystemTime, DecodingError> {
    let offset = Duration::try_from_secs_f64(millis.abs() / 1000.0)
        .map_err(|_| DecodingError::InvalidDate(millis))?;
    let time = if millis >= 0.0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    };
    time.ok_or(DecodingError::InvalidDate(millis))
}

impl DecodeSink for Amf0Value {
    fn set_number(&mut self, value: f64) -> Result<(), DecodingError> {
        *self = Amf0Value::Number(value);
        Ok(())
    }

    fn set_boolean(&mut self, value: bool) -> Result<(), DecodingError> {
        *self = Amf0Value::Boolean(value);
        Ok(())
    }

    fn set_string(&mut self, value: String) -> Result<(), DecodingError> {
        *self = Amf0Value::String(value);
        Ok(())
    }

    fn set_date(&mut self, value: Amf0Date) -> Result<(), DecodingError> {
        *self = Amf0Value::Date(value);
        Ok(())
    }

    fn set_null(&mut self) -> Result<(), DecodingError> {
        *self = Amf0Value::Null;
        Ok(())
    }

    fn set_object_end(&mut self) -> Result<(), DecodingError> {
        *self = Amf0Value::ObjectEnd;
        Ok(())
    }

    fn mapping(&mut self, kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        *self = match kind {
            MapKind::Object => Amf0Value::Object(IndexMap::new()),
            MapKind::EcmaArray => Amf0Value::EcmaArray(IndexMap::new()),
        };
        Ok(self)
    }

    fn sequence(&mut self, len: usize) -> Result<&mut dyn SequenceSink, DecodingError> {
        *self = Amf0Value::StrictArray(Vec::with_capacity(len.min(PREALLOC_LIMIT)));
        Ok(self)
    }
}

/// Inserts into the properties of an Object or ECMA array value.
impl MappingSink for Amf0Value {
    fn insert_with(&mut self, key: String, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        match self {
            Amf0Value::Object(map) | Amf0Value::EcmaArray(map) => {
                MappingSink::insert_with(map, key, fill)
            }
            _ => Err(DecodingError::not_assignable("not map type", self.target())),
        }
    }
}

/// Appends to the elements of a StrictArray value.
impl SequenceSink for Amf0Value {
    fn push_with(&mut self, index: usize, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        match self {
            Amf0Value::StrictArray(arr) => arr.push_with(index, fill),
            _ => Err(DecodingError::not_assignable(
                "not array or slice type",
                self.target(),
            )),
        }
    }
}

impl<T> DecodeSink for Option<T>
where
    T: DecodeSink + Default,
{
    fn set_number(&mut self, value: f64) -> Result<(), DecodingError> {
        let mut inner = T::default();
        inner.set_number(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn set_boolean(&mut self, value: bool) -> Result<(), DecodingError> {
        let mut inner = T::default();
        inner.set_boolean(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn set_string(&mut self, value: String) -> Result<(), DecodingError> {
        let mut inner = T::default();
        inner.set_string(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn set_date(&mut self, value: Amf0Date) -> Result<(), DecodingError> {
        let mut inner = T::default();
        inner.set_date(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn set_null(&mut self) -> Result<(), DecodingError> {
        *self = None;
        Ok(())
    }

    fn set_object_end(&mut self) -> Result<(), DecodingError> {
        let mut inner = T::default();
        inner.set_object_end()?;
        *self = Some(inner);
        Ok(())
    }

    // A shape the inner type rejects leaves the destination unchanged.
    fn mapping(&mut self, kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        T::default().mapping(kind)?;
        self.insert(T::default()).mapping(kind)
    }

    fn sequence(&mut self, len: usize) -> Result<&mut dyn SequenceSink, DecodingError> {
        T::default().sequence(len)?;
        self.insert(T::default()).sequence(len)
    }
}

impl<M> DecodeSink for EcmaArray<M>
where
    M: DecodeSink,
{
    fn target(&self) -> &'static str {
        self.0.target()
    }

    fn set_null(&mut self) -> Result<(), DecodingError> {
        self.0.set_null()
    }

    fn mapping(&mut self, kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        self.0.mapping(kind)
    }
}

impl<T> DecodeSink for Vec<T>
where
    T: DecodeSink + Default,
{
    fn set_null(&mut self) -> Result<(), DecodingError> {
        self.clear();
        Ok(())
    }

    fn sequence(&mut self, len: usize) -> Result<&mut dyn SequenceSink, DecodingError> {
        self.clear();
        self.reserve(len.min(PREALLOC_LIMIT));
        Ok(self)
    }
}

impl<T> SequenceSink for Vec<T>
where
    T: DecodeSink + Default,
{
    fn push_with(&mut self, _index: usize, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        let mut element = T::default();
        fill(&mut element as &mut dyn DecodeSink)?;
        self.push(element);
        Ok(())
    }
}

impl<T, const N: usize> DecodeSink for [T; N]
where
    T: DecodeSink,
{
    fn sequence(&mut self, len: usize) -> Result<&mut dyn SequenceSink, DecodingError> {
        if len != N {
            return Err(DecodingError::LengthMismatch {
                expected: len,
                actual: N,
            });
        }
        Ok(self)
    }
}

impl<T, const N: usize> SequenceSink for [T; N]
where
    T: DecodeSink,
{
    fn push_with(&mut self, index: usize, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        let slot = self
            .get_mut(index)
            .ok_or(DecodingError::LengthMismatch {
                expected: index + 1,
                actual: N,
            })?;
        fill(slot as &mut dyn DecodeSink)
    }
}

fn check_string_key<K: MapKey>() -> Result<(), DecodingError> {
    if K::STRING_LIKE {
        Ok(())
    } else {
        Err(DecodingError::not_assignable(
            "key of map is not string type",
            type_name::<K>(),
        ))
    }
}

fn decode_entry<K, V>(key: String, fill: &mut Fill<'_>) -> Result<(K, V), DecodingError>
where
    K: MapKey,
    V: DecodeSink + Default,
{
    let key = K::from_key(key).ok_or_else(|| {
        DecodingError::not_assignable("key of map is not string type", type_name::<K>())
    })?;
    let mut value = V::default();
    fill(&mut value as &mut dyn DecodeSink)?;
    Ok((key, value))
}

impl<K, V, S> DecodeSink for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: DecodeSink + Default,
    S: BuildHasher,
{
    fn set_null(&mut self) -> Result<(), DecodingError> {
        self.clear();
        Ok(())
    }

    fn mapping(&mut self, _kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        check_string_key::<K>()?;
        self.clear();
        Ok(self)
    }
}

impl<K, V, S> MappingSink for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: DecodeSink + Default,
    S: BuildHasher,
{
    fn insert_with(&mut self, key: String, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        let (key, value) = decode_entry(key, fill)?;
        self.insert(key, value);
        Ok(())
    }
}

impl<K, V> DecodeSink for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: DecodeSink + Default,
{
    fn set_null(&mut self) -> Result<(), DecodingError> {
        self.clear();
        Ok(())
    }

    fn mapping(&mut self, _kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        check_string_key::<K>()?;
        self.clear();
        Ok(self)
    }
}

impl<K, V> MappingSink for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: DecodeSink + Default,
{
    fn insert_with(&mut self, key: String, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        let (key, value) = decode_entry(key, fill)?;
        self.insert(key, value);
        Ok(())
    }
}

impl<K, V, S> DecodeSink for IndexMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: DecodeSink + Default,
    S: BuildHasher,
{
    fn set_null(&mut self) -> Result<(), DecodingError> {
        self.clear();
        Ok(())
    }

    fn mapping(&mut self, _kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        check_string_key::<K>()?;
        self.clear();
        Ok(self)
    }
}

impl<K, V, S> MappingSink for IndexMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: DecodeSink + Default,
    S: BuildHasher,
{
    fn insert_with(&mut self, key: String, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        let (key, value) = decode_entry(key, fill)?;
        self.insert(key, value);
        Ok(())
    }
}
