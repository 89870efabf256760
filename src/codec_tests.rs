use std::{
    io::Cursor,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use indexmap::IndexMap;
use proptest::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::{
    Amf0Date, Amf0Value, DecodeSink, Decoder, DecodingError, Encode, Encoder, EncodingError,
    Fill, KeyRef, MapKind, MapSource, MappingSink, Marker, Shape, decode_amf0_values,
    encode_amf0_values,
};

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

struct TestCase {
    name: &'static str,
    value: Amf0Value,
    binary: &'static [u8],
}

fn test_cases() -> Vec<TestCase> {
    vec![
        TestCase {
            name: "number",
            value: Amf0Value::Number(10.0),
            binary: &[0x00, 0x40, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        },
        TestCase {
            name: "boolean false",
            value: Amf0Value::Boolean(false),
            binary: &[0x01, 0x00],
        },
        TestCase {
            name: "boolean true",
            value: Amf0Value::Boolean(true),
            binary: &[0x01, 0x01],
        },
        TestCase {
            name: "string",
            value: Amf0Value::String("abc".to_string()),
            binary: &[0x02, 0x00, 0x03, 0x61, 0x62, 0x63],
        },
        TestCase {
            name: "null",
            value: Amf0Value::Null,
            binary: &[0x05],
        },
        TestCase {
            name: "ecma array",
            value: Amf0Value::EcmaArray(IndexMap::from([
                ("a".to_string(), Amf0Value::String("str".to_string())),
                ("b".to_string(), Amf0Value::Number(10.0)),
            ])),
            binary: &[
                0x08, 0x00, 0x00, 0x00, 0x02, // ecma array, count 2
                0x00, 0x01, 0x61, 0x02, 0x00, 0x03, 0x73, 0x74, 0x72, // "a": "str"
                0x00, 0x01, 0x62, 0x00, 0x40, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // "b": 10
                0x00, 0x00, 0x09,
            ],
        },
        TestCase {
            name: "strict array",
            value: Amf0Value::StrictArray(vec![
                Amf0Value::String("str".to_string()),
                Amf0Value::Number(10.0),
            ]),
            binary: &[
                0x0A, 0x00, 0x00, 0x00, 0x02, // strict array, 2 elements
                0x02, 0x00, 0x03, 0x73, 0x74, 0x72, // "str"
                0x00, 0x40, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 10
            ],
        },
        TestCase {
            name: "date",
            value: Amf0Value::Date(Amf0Date::from_millis(4_660_000.0)),
            binary: &[
                0x0B, 0x41, 0x51, 0xC6, 0xC8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ],
        },
    ]
}

const SAMPLE_OBJECT: [u8; 23] = [
    0x03, // object
    0x00, 0x01, 0x61, 0x02, 0x00, 0x01, 0x73, // "a": "s"
    0x00, 0x01, 0x62, 0x00, 0x40, 0x45, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // "b": 42
    0x00, 0x00, 0x09,
];

/// Host record with fixed fields, wired up by hand.
#[derive(Debug, Default, PartialEq)]
struct SampleObject {
    a: String,
    b: i32,
}

impl Encode for SampleObject {
    fn shape(&self) -> Shape<'_> {
        Shape::Map {
            entries: self,
            ecma_array: false,
        }
    }
}

impl MapSource for SampleObject {
    fn entries(&self) -> Vec<(KeyRef<'_>, &dyn Encode)> {
        vec![
            (KeyRef::Str("a"), &self.a as &dyn Encode),
            (KeyRef::Str("b"), &self.b as &dyn Encode),
        ]
    }
}

impl DecodeSink for SampleObject {
    fn mapping(&mut self, _kind: MapKind) -> Result<&mut dyn MappingSink, DecodingError> {
        Ok(self)
    }
}

impl MappingSink for SampleObject {
    fn insert_with(&mut self, key: String, fill: &mut Fill<'_>) -> Result<(), DecodingError> {
        match key.as_str() {
            "a" => fill(&mut self.a as &mut dyn DecodeSink),
            "b" => fill(&mut self.b as &mut dyn DecodeSink),
            _ => fill(&mut Amf0Value::Null as &mut dyn DecodeSink),
        }
    }
}

#[test]
fn test_encode_cases() {
    init_logger();
    for case in test_cases() {
        let mut encoder = Encoder::sorted(Vec::new());
        encoder.encode(&case.value).unwrap();
        assert_eq!(encoder.into_inner(), case.binary, "{}", case.name);
    }
}

#[test]
fn test_decode_cases() {
    init_logger();
    for case in test_cases() {
        let mut decoder = Decoder::new(Cursor::new(case.binary));
        let value = decoder.decode_next().unwrap();
        assert_eq!(value, case.value, "{}", case.name);

        let err = decoder.decode_next().unwrap_err();
        assert!(matches!(err, DecodingError::EndOfStream), "{}", case.name);
    }
}

#[test]
fn test_decode_date_into_system_time() {
    let mut time = SystemTime::now();
    let mut decoder = Decoder::new(Cursor::new(test_cases()[7].binary));
    decoder.decode(&mut time).unwrap();
    assert_eq!(time, UNIX_EPOCH + Duration::from_secs(0x1234));
}

#[test]
fn test_sample_object() {
    let object = SampleObject {
        a: "s".to_string(),
        b: 42,
    };
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&object).unwrap();
    assert_eq!(encoder.into_inner(), SAMPLE_OBJECT);

    let mut decoded = SampleObject::default();
    let mut decoder = Decoder::new(Cursor::new(SAMPLE_OBJECT));
    decoder.decode(&mut decoded).unwrap();
    assert_eq!(decoded, object);
}

#[test]
fn test_sample_object_skips_unknown_keys() {
    let mut bytes = vec![0x03];
    bytes.extend_from_slice(&[0x00, 0x01, 0x7A, 0x01, 0x01]); // "z": true
    bytes.extend_from_slice(&SAMPLE_OBJECT[1..]);

    let mut decoded = SampleObject::default();
    Decoder::new(Cursor::new(bytes))
        .decode(&mut decoded)
        .unwrap();
    assert_eq!(decoded.a, "s");
    assert_eq!(decoded.b, 42);
}

#[test]
fn test_values_in_sequence() {
    init_logger();
    let values = vec![
        Amf0Value::String("connect".to_string()),
        Amf0Value::Number(1.0),
        Amf0Value::Object(IndexMap::from([(
            "app".to_string(),
            Amf0Value::String("live".to_string()),
        )])),
        Amf0Value::Null,
    ];

    let bytes = encode_amf0_values(&values).unwrap();
    assert_eq!(decode_amf0_values(bytes).unwrap(), values);
}

#[test]
fn test_undefined_is_encode_only() {
    let values = vec![
        Amf0Value::Undefined,
        Amf0Value::StrictArray(vec![Amf0Value::Undefined]),
    ];
    let bytes = encode_amf0_values(&values).unwrap();
    assert_eq!(&bytes[..], [0x06, 0x0A, 0x00, 0x00, 0x00, 0x01, 0x06]);

    let err = decode_amf0_values(bytes).unwrap_err();
    assert!(matches!(err, DecodingError::Unimplemented(Marker::Undefined)));
}

#[test]
fn test_empty_key_is_not_encoded() {
    let value = Amf0Value::Object(IndexMap::from([
        (String::new(), Amf0Value::ObjectEnd),
        ("b".to_string(), Amf0Value::Number(1.0)),
    ]));
    let err = encode_amf0_values(&[value]).unwrap_err();
    assert!(matches!(err, EncodingError::EmptyKey));
}

#[test]
fn test_decode_values_truncated() {
    let bytes = Bytes::from_static(&[0x05, 0x02, 0x00, 0x03, 0x61]);
    let err = decode_amf0_values(bytes).unwrap_err();
    assert!(matches!(err, DecodingError::UnexpectedEof));

    assert!(decode_amf0_values(Bytes::new()).unwrap().is_empty());
}

fn amf0_value() -> impl Strategy<Value = Amf0Value> {
    let leaf = prop_oneof![
        (-1e15f64..1e15).prop_map(Amf0Value::Number),
        any::<bool>().prop_map(Amf0Value::Boolean),
        ".{0,16}".prop_map(Amf0Value::String),
        Just(Amf0Value::Null),
        ((-1e12f64..1e12), any::<i16>()).prop_map(|(unix_time, timezone_offset)| {
            Amf0Value::Date(Amf0Date {
                unix_time,
                timezone_offset,
            })
        }),
    ];

    // Empty keys are rejected by the encoder.
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(("[a-z]{1,8}", inner.clone()), 0..6)
                .prop_map(|pairs| Amf0Value::Object(pairs.into_iter().collect())),
            prop::collection::vec(("[a-z]{1,8}", inner.clone()), 0..6)
                .prop_map(|pairs| Amf0Value::EcmaArray(pairs.into_iter().collect())),
            prop::collection::vec(inner, 0..6).prop_map(Amf0Value::StrictArray),
        ]
    })
}

proptest! {
    #[test]
    fn prop_decode_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut decoder = Decoder::new(Cursor::new(bytes));
        while decoder.decode_next().is_ok() {}
    }

    #[test]
    fn prop_round_trip(value in amf0_value()) {
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode(&value).unwrap();
        let bytes = encoder.into_inner();

        let mut decoder = Decoder::new(Cursor::new(bytes));
        prop_assert_eq!(decoder.decode_next().unwrap(), value);
        prop_assert!(matches!(decoder.decode_next(), Err(DecodingError::EndOfStream)));
    }
}
