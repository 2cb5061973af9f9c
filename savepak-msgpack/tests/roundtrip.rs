//! Round-trip and wire-format tests for the MessagePack codec.

use savepak_core::bitfield::BitField;
use savepak_core::enumdef::EnumDef;
use savepak_core::types::{Color, ObjectRef, PlayerRef, Rotation, Vec2, Vec3, Vec4};
use savepak_msgpack::{
    decode, decode_prefix, decode_with, encode, encoded_len, ArrayMode, DecodeRegistry,
    EncodeOptions, FloatMode, IntMode, MsgPackError, StringMode, Value,
};

fn roundtrip(value: &Value, options: &EncodeOptions) {
    let bytes = encode(value, options).unwrap();
    assert_eq!(&decode(&bytes).unwrap(), value, "options {options:?}");
    assert_eq!(encoded_len(value, options).unwrap(), bytes.len());
}

fn sample_values() -> Vec<Value> {
    vec![
        Value::Nil,
        Value::Bool(true),
        Value::Int(0),
        Value::Int(127),
        Value::Int(128),
        Value::Int(-32),
        Value::Int(-33),
        Value::Int(i64::MIN),
        Value::Int(i64::MAX),
        Value::UInt(u64::MAX),
        Value::F32(3.5),
        Value::F64(-0.125),
        Value::Str(String::new()),
        Value::Str("fixstr".into()),
        Value::Str("s".repeat(40)),
        Value::Str("s".repeat(70_000)),
        Value::Bin(vec![0u8, 255, 7]),
        Value::Bin(vec![0xAB; 300]),
        Value::Array(vec![Value::Int(1), Value::Str("two".into()), Value::Bool(false)]),
        Value::Map(vec![
            (Value::Str("hp".into()), Value::Int(20)),
            (Value::Str("pos".into()), Value::Vector3(Vec3::new(1.5, 2.5, 3.5))),
        ]),
        Value::Ext(64, vec![9, 8, 7]),
        Value::Vector2(Vec2::new(4.0, -4.0)),
        Value::Vector3(Vec3::new(0.25, 0.5, 0.75)),
        Value::Vector4(Vec4::new(1.0, 2.0, 3.0, 5.0)),
        Value::Rotation(Rotation::new(90.0, 0.0, -45.0)),
        Value::Color(Color::rgba(12, 34, 56, 78)),
        Value::Player(PlayerRef::new("00a1b2c3d4e5f60718293a4b5c6d7e8f")),
        Value::Player(PlayerRef::new("guest-42")),
        Value::Object(ObjectRef::new("0000dead0000beef")),
        Value::Object(ObjectRef::new("spawn_pad_3")),
        Value::Bits(BitField::new(17, true)),
        Value::Enum(EnumDef::new([("LOBBY", 0), ("ROUND", 1), ("SCORES", 2)]).unwrap()),
    ]
}

#[test]
fn roundtrip_sample_values_across_configs() {
    // Configurations under which every sample value round-trips exactly.
    // Single-precision floats and map-collapsing array modes have
    // documented lossy cases and are exercised separately.
    let configs = [
        EncodeOptions::PIPELINE,
        EncodeOptions {
            string: StringMode::Compat,
            ..EncodeOptions::PIPELINE
        },
        EncodeOptions {
            int: IntMode::Signed,
            ..EncodeOptions::PIPELINE
        },
    ];
    for options in &configs {
        for value in sample_values() {
            roundtrip(&value, options);
        }
    }
}

#[test]
fn roundtrip_nested_structures() {
    let profile = Value::Map(vec![
        (
            Value::Str("inventory".into()),
            Value::Array(vec![
                Value::Map(vec![
                    (Value::Str("item".into()), Value::Str("rusty_sword".into())),
                    (Value::Str("count".into()), Value::Int(1)),
                ]),
                Value::Map(vec![
                    (Value::Str("item".into()), Value::Str("bread".into())),
                    (Value::Str("count".into()), Value::Int(12)),
                ]),
            ]),
        ),
        (
            Value::Str("unlocks".into()),
            Value::Bits(BitField::new(96, false)),
        ),
        (
            Value::Str("home".into()),
            Value::Vector3(Vec3::new(-12.0, 3.0, 88.5)),
        ),
    ]);
    roundtrip(&profile, &EncodeOptions::PIPELINE);
}

#[test]
fn ext_payload_layouts_are_contractual() {
    // Vector3 (tag 0): ext8, 12-byte payload of big-endian float32.
    let bytes = encode(
        &Value::Vector3(Vec3::new(1.0, 2.0, 3.0)),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(
        bytes,
        [
            0xC7, 12, 0x00, 0x3F, 0x80, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x40, 0x40,
            0x00, 0x00
        ]
    );

    // Color (tag 2): fixext4, r g b a.
    let bytes = encode(
        &Value::Color(Color::rgba(1, 2, 3, 4)),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(bytes, [0xD6, 0x02, 1, 2, 3, 4]);

    // Vector2 (tag 3): fixext8.
    let bytes = encode(
        &Value::Vector2(Vec2::new(1.0, -2.0)),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(
        bytes,
        [0xD7, 0x03, 0x3F, 0x80, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00]
    );

    // Vector4 (tag 4): fixext16.
    let bytes = encode(
        &Value::Vector4(Vec4::new(1.0, 1.0, 1.0, 2.0)),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(bytes[..2], [0xD8, 0x04]);
    assert_eq!(bytes.len(), 18);

    // Rotation (tag 1): ext8, 12-byte payload.
    let bytes = encode(
        &Value::Rotation(Rotation::new(90.0, 0.0, 0.0)),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(bytes[..3], [0xC7, 12, 0x01]);

    // Player id in canonical form (tag 5): fixext16, two big-endian u64.
    let bytes = encode(
        &Value::Player(PlayerRef::new("00000000000000ff00000000000000aa")),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(
        bytes,
        [
            0xD8, 0x05, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0xAA
        ]
    );

    // Non-canonical player id (tag 6): verbatim bytes.
    let bytes = encode(
        &Value::Player(PlayerRef::new("guest-1")),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(bytes[..3], [0xC7, 7, 0x06]);
    assert_eq!(&bytes[3..], b"guest-1");

    // Object ref in canonical form (tag 7): fixext8.
    let bytes = encode(
        &Value::Object(ObjectRef::new("00000000000000a5")),
        &EncodeOptions::PIPELINE,
    )
    .unwrap();
    assert_eq!(bytes, [0xD7, 0x07, 0, 0, 0, 0, 0, 0, 0, 0xA5]);

    // Bit array (tag 41): bits-in-last-byte prefix, then packed bytes.
    let mut bits = BitField::new(11, false);
    bits.set(0, true).unwrap().set(10, true).unwrap();
    let bytes = encode(&Value::Bits(bits), &EncodeOptions::PIPELINE).unwrap();
    assert_eq!(bytes, [0xC7, 3, 0x29, 3, 0x01, 0x04]);
}

#[test]
fn well_known_constants_use_selector_form() {
    // White is palette slot 0, selector 10.
    let bytes = encode(&Value::Color(Color::WHITE), &EncodeOptions::PIPELINE).unwrap();
    assert_eq!(bytes, [0xD4, 0x28, 10]);
    assert_eq!(decode(&bytes).unwrap(), Value::Color(Color::WHITE));

    // The full palette, in selector order.
    for (offset, color) in [
        Color::WHITE,
        Color::GRAY,
        Color::BLACK,
        Color::TRANSPARENT,
        Color::RED,
        Color::GREEN,
        Color::BLUE,
        Color::CYAN,
        Color::MAGENTA,
        Color::YELLOW,
        Color::ORANGE,
        Color::PURPLE,
        Color::BROWN,
        Color::PINK,
        Color::TAN,
        Color::RUBY,
        Color::EMERALD,
        Color::SAPPHIRE,
        Color::SILVER,
        Color::SMOKE,
    ]
    .into_iter()
    .enumerate()
    {
        let bytes = encode(&Value::Color(color), &EncodeOptions::PIPELINE).unwrap();
        assert_eq!(bytes, [0xD4, 0x28, 10 + offset as u8]);
    }

    // Vectors, rotation, unassigned reference.
    for (value, selector) in [
        (Value::Vector2(Vec2::ONE), 40u8),
        (Value::Vector2(Vec2::ZERO), 41),
        (Value::Vector3(Vec3::ONE), 51),
        (Value::Vector3(Vec3::ZERO), 52),
        (Value::Vector3(Vec3::FORWARD), 53),
        (Value::Vector3(Vec3::UP), 54),
        (Value::Vector3(Vec3::RIGHT), 55),
        (Value::Vector4(Vec4::ONE), 60),
        (Value::Vector4(Vec4::ZERO), 61),
        (Value::Rotation(Rotation::ZERO), 70),
        (Value::Object(ObjectRef::UNASSIGNED), 0),
    ] {
        let bytes = encode(&value, &EncodeOptions::PIPELINE).unwrap();
        assert_eq!(bytes, [0xD4, 0x28, selector], "{value:?}");
        assert_eq!(decode(&bytes).unwrap(), value);
    }
}

#[test]
fn unknown_constant_selector_fails() {
    let err = decode(&[0xD4, 0x28, 5]).unwrap_err();
    assert!(matches!(err, MsgPackError::UnknownConstant { selector: 5 }));
    let err = decode(&[0xD4, 0x28, 200]).unwrap_err();
    assert!(matches!(err, MsgPackError::UnknownConstant { selector: 200 }));
}

#[test]
fn unknown_reserved_extension_fails() {
    // fixext1 with tag 20: reserved for built-ins, none registered.
    let err = decode(&[0xD4, 20, 0]).unwrap_err();
    assert!(matches!(err, MsgPackError::UnknownExtension { tag: 20 }));
}

#[test]
fn user_extension_roundtrips_and_hooks() {
    let value = Value::Ext(77, vec![1, 2, 3, 4, 5]);
    let bytes = encode(&value, &EncodeOptions::PIPELINE).unwrap();
    assert_eq!(decode(&bytes).unwrap(), value);

    let mut registry = DecodeRegistry::new();
    registry
        .register(77, |payload| Ok(Value::Int(i64::from(payload[0]))))
        .unwrap();
    assert_eq!(decode_with(&bytes, &registry).unwrap(), Value::Int(1));
}

#[test]
fn enum_roundtrips_with_order() {
    let ascending = EnumDef::new([("C", 30), ("A", 10), ("B", 20)]).unwrap();
    roundtrip(&Value::Enum(ascending), &EncodeOptions::PIPELINE);

    let descending = EnumDef::descending([("C", 30), ("A", 10), ("B", 20)]).unwrap();
    let bytes = encode(&Value::Enum(descending.clone()), &EncodeOptions::PIPELINE).unwrap();
    let Value::Enum(rebuilt) = decode(&bytes).unwrap() else {
        panic!("expected enum");
    };
    assert_eq!(rebuilt, descending);
    let values: Vec<i64> = rebuilt.iter().map(|(_, v)| v).collect();
    assert_eq!(values, [30, 20, 10]);
}

#[test]
fn bitfield_roundtrip_sizes() {
    for len in [0usize, 1, 7, 8, 9, 64, 577] {
        let mut bits = BitField::new(len, false);
        if len > 0 {
            bits.set(len - 1, true).unwrap();
        }
        roundtrip(&Value::Bits(bits), &EncodeOptions::PIPELINE);
    }
}

#[test]
fn decode_prefix_leaves_trailing_bytes() {
    let mut bytes = encode(&Value::Str("head".into()), &EncodeOptions::PIPELINE).unwrap();
    let head_len = bytes.len();
    bytes.extend_from_slice(&[0xAA, 0xBB]);
    let (value, consumed) = decode_prefix(&bytes).unwrap();
    assert_eq!(value, Value::Str("head".into()));
    assert_eq!(consumed, head_len);
    assert!(matches!(
        decode(&bytes).unwrap_err(),
        MsgPackError::ExtraBytes { remaining: 2 }
    ));
}

#[test]
fn array_mode_collapses_are_symmetric() {
    // WithoutHole: a dense 1-based integer map comes back as an array.
    let map = Value::Map(vec![
        (Value::Int(1), Value::Str("a".into())),
        (Value::Int(2), Value::Str("b".into())),
    ]);
    let bytes = encode(&map, &EncodeOptions::PIPELINE).unwrap();
    assert_eq!(
        decode(&bytes).unwrap(),
        Value::Array(vec![Value::Str("a".into()), Value::Str("b".into())])
    );

    // WithHole: sparse integer map round-trips as a nil-padded array.
    let options = EncodeOptions {
        array: ArrayMode::WithHole,
        ..EncodeOptions::PIPELINE
    };
    let sparse = Value::Map(vec![
        (Value::Int(1), Value::Str("a".into())),
        (Value::Int(4), Value::Str("d".into())),
    ]);
    let bytes = encode(&sparse, &options).unwrap();
    assert_eq!(
        decode(&bytes).unwrap(),
        Value::Array(vec![
            Value::Str("a".into()),
            Value::Nil,
            Value::Nil,
            Value::Str("d".into()),
        ])
    );

    // A holey array under WithHole encodes verbatim and round-trips.
    roundtrip(
        &Value::Array(vec![Value::Int(1), Value::Nil, Value::Int(3)]),
        &options,
    );
}

#[test]
fn float_mode_single_narrows() {
    let options = EncodeOptions {
        float: FloatMode::Single,
        ..EncodeOptions::PIPELINE
    };
    let bytes = encode(&Value::F64(1.5), &options).unwrap();
    assert_eq!(decode(&bytes).unwrap(), Value::F32(1.5));
}
