use std::{rc::Rc, sync::Arc};

/// Key type of a host map that takes part in Object/ECMA array coding.
///
/// AMF0 keys are always strings. Maps keyed by anything else can still be
/// named as destinations or sources, but fail at runtime: decoding reports
/// `NotAssignable`, encoding reports `UnexpectedKeyType`.
pub trait MapKey: Sized {
    const STRING_LIKE: bool;

    fn from_key(key: String) -> Option<Self>;

    fn as_key(&self) -> Option<&str>;
}

impl MapKey for String {
    const STRING_LIKE: bool = true;

    fn from_key(key: String) -> Option<Self> {
        Some(key)
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl MapKey for Box<str> {
    const STRING_LIKE: bool = true;

    fn from_key(key: String) -> Option<Self> {
        Some(key.into_boxed_str())
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl MapKey for Arc<str> {
    const STRING_LIKE: bool = true;

    fn from_key(key: String) -> Option<Self> {
        Some(key.into())
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl MapKey for Rc<str> {
    const STRING_LIKE: bool = true;

    fn from_key(key: String) -> Option<Self> {
        Some(key.into())
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

macro_rules! non_string_key {
    ($($ty:ty),*) => {$(
        impl MapKey for $ty {
            const STRING_LIKE: bool = false;

            fn from_key(_key: String) -> Option<Self> {
                None
            }

            fn as_key(&self) -> Option<&str> {
                None
            }
        }
    )*};
}

non_string_key!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);
