use std::{
    any::type_name,
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    rc::Rc,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use indexmap::IndexMap;

use crate::{Amf0Date, Amf0Value, EcmaArray, EcmaPair, MapKey};

/// Wire shape a host value is encoded as.
pub enum Shape<'a> {
    Number(f64),
    Boolean(bool),
    Text(&'a str),
    Map {
        entries: &'a dyn MapSource,
        ecma_array: bool,
    },
    Sequence(&'a dyn SequenceSource),
    Date(Amf0Date),
    Null,
    Undefined,
    ObjectEnd,
    /// No AMF0 representation.
    Unsupported,
}

/// Host value that can be written by the encoder.
pub trait Encode {
    fn shape(&self) -> Shape<'_>;

    /// Key and value of a sequence element meant for the flat ECMA array form.
    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        None
    }

    fn kind(&self) -> &'static str {
        type_name::<Self>()
    }
}

pub enum KeyRef<'a> {
    Str(&'a str),
    /// Key that is not string-like, named by its type.
    Other(&'static str),
}

impl<'a> KeyRef<'a> {
    fn from_key<K: MapKey>(key: &'a K) -> Self {
        match key.as_key() {
            Some(key) => KeyRef::Str(key),
            None => KeyRef::Other(type_name::<K>()),
        }
    }
}

pub trait MapSource {
    fn entries(&self) -> Vec<(KeyRef<'_>, &dyn Encode)>;
}

pub trait SequenceSource {
    fn elements(&self) -> Vec<&dyn Encode>;
}

macro_rules! numeric_source {
    ($($ty:ty),*) => {$(
        impl Encode for $ty {
            fn shape(&self) -> Shape<'_> {
                Shape::Number(*self as f64)
            }
        }
    )*};
}

numeric_source!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl Encode for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Boolean(*self)
    }
}

impl Encode for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }
}

impl Encode for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }
}

impl Encode for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Unsupported
    }
}

impl Encode for Amf0Date {
    fn shape(&self) -> Shape<'_> {
        Shape::Date(*self)
    }
}

impl Encode for SystemTime {
    fn shape(&self) -> Shape<'_> {
        let unix_time = match self.duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_secs_f64() * 1000.0,
            Err(err) => -err.duration().as_secs_f64() * 1000.0,
        };
        Shape::Date(Amf0Date::from_millis(unix_time))
    }
}

impl Encode for Amf0Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Amf0Value::Number(n) => Shape::Number(*n),
            Amf0Value::Boolean(b) => Shape::Boolean(*b),
            Amf0Value::String(s) => Shape::Text(s),
            Amf0Value::Object(map) => Shape::Map {
                entries: map,
                ecma_array: false,
            },
            Amf0Value::Null => Shape::Null,
            Amf0Value::Undefined => Shape::Undefined,
            Amf0Value::EcmaArray(map) => Shape::Map {
                entries: map,
                ecma_array: true,
            },
            Amf0Value::StrictArray(arr) => Shape::Sequence(arr),
            Amf0Value::Date(date) => Shape::Date(*date),
            Amf0Value::ObjectEnd => Shape::ObjectEnd,
        }
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        (**self).ecma_pair()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        (**self).ecma_pair()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

impl<T: Encode + ?Sized> Encode for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        (**self).ecma_pair()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

impl<T: Encode + ?Sized> Encode for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        (**self).ecma_pair()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

impl<T: Encode> Encode for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }

    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        self.as_ref().and_then(Encode::ecma_pair)
    }
}

impl<V: Encode> Encode for EcmaPair<V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Unsupported
    }

    fn ecma_pair(&self) -> Option<(&str, &dyn Encode)> {
        Some((self.key.as_str(), &self.value as &dyn Encode))
    }
}

impl<M: MapSource> Encode for EcmaArray<M> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map {
            entries: &self.0,
            ecma_array: true,
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self)
    }
}

impl<T: Encode> SequenceSource for Vec<T> {
    fn elements(&self) -> Vec<&dyn Encode> {
        self.iter().map(|e| e as &dyn Encode).collect()
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self)
    }
}

impl<T: Encode, const N: usize> SequenceSource for [T; N] {
    fn elements(&self) -> Vec<&dyn Encode> {
        self.iter().map(|e| e as &dyn Encode).collect()
    }
}

impl<K: MapKey, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map {
            entries: self,
            ecma_array: false,
        }
    }
}

impl<K: MapKey, V: Encode, S: BuildHasher> MapSource for HashMap<K, V, S> {
    fn entries(&self) -> Vec<(KeyRef<'_>, &dyn Encode)> {
        self.iter()
            .map(|(k, v)| (KeyRef::from_key(k), v as &dyn Encode))
            .collect()
    }
}

impl<K: MapKey, V: Encode> Encode for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map {
            entries: self,
            ecma_array: false,
        }
    }
}

impl<K: MapKey, V: Encode> MapSource for BTreeMap<K, V> {
    fn entries(&self) -> Vec<(KeyRef<'_>, &dyn Encode)> {
        self.iter()
            .map(|(k, v)| (KeyRef::from_key(k), v as &dyn Encode))
            .collect()
    }
}

impl<K: MapKey, V: Encode, S> Encode for IndexMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map {
            entries: self,
            ecma_array: false,
        }
    }
}

impl<K: MapKey, V: Encode, S> MapSource for IndexMap<K, V, S> {
    fn entries(&self) -> Vec<(KeyRef<'_>, &dyn Encode)> {
        self.iter()
            .map(|(k, v)| (KeyRef::from_key(k), v as &dyn Encode))
            .collect()
    }
}
