//! The well-known-constant table.
//!
//! Frequently stored engine values (palette colors, unit vectors, the
//! unassigned object reference) get a one-byte selector under extension
//! tag 40 instead of their full payload. The table is built forward
//! (selector → value) once; the reverse direction scans the same
//! immutable table, which stays correct by construction.

use std::sync::OnceLock;

use savepak_core::types::{Color, ObjectRef, Rotation, Vec2, Vec3, Vec4};

use crate::value::Value;

/// Palette colors in selector order, starting at selector 10.
const PALETTE: [Color; 20] = [
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
];

static TABLE: OnceLock<Vec<(u8, Value)>> = OnceLock::new();

fn table() -> &'static [(u8, Value)] {
    TABLE.get_or_init(|| {
        let mut entries = Vec::with_capacity(30);
        entries.push((0, Value::Object(ObjectRef::UNASSIGNED)));
        for (offset, color) in PALETTE.into_iter().enumerate() {
            entries.push((10 + offset as u8, Value::Color(color)));
        }
        entries.push((40, Value::Vector2(Vec2::ONE)));
        entries.push((41, Value::Vector2(Vec2::ZERO)));
        entries.push((51, Value::Vector3(Vec3::ONE)));
        entries.push((52, Value::Vector3(Vec3::ZERO)));
        entries.push((53, Value::Vector3(Vec3::FORWARD)));
        entries.push((54, Value::Vector3(Vec3::UP)));
        entries.push((55, Value::Vector3(Vec3::RIGHT)));
        entries.push((60, Value::Vector4(Vec4::ONE)));
        entries.push((61, Value::Vector4(Vec4::ZERO)));
        entries.push((70, Value::Rotation(Rotation::ZERO)));
        entries
    })
}

/// The value registered under `selector`, if any.
pub(crate) fn value_for(selector: u8) -> Option<Value> {
    table()
        .iter()
        .find(|(s, _)| *s == selector)
        .map(|(_, v)| v.clone())
}

/// The selector registered for a value that compares equal to `value`.
pub(crate) fn selector_for(value: &Value) -> Option<u8> {
    table().iter().find(|(_, v)| v == value).map(|(s, _)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_directions_agree() {
        for (selector, value) in table() {
            assert_eq!(selector_for(value), Some(*selector));
            assert_eq!(value_for(*selector).as_ref(), Some(value));
        }
    }

    #[test]
    fn test_selector_layout() {
        assert_eq!(value_for(0), Some(Value::Object(ObjectRef::UNASSIGNED)));
        assert_eq!(value_for(10), Some(Value::Color(Color::WHITE)));
        assert_eq!(value_for(29), Some(Value::Color(Color::SMOKE)));
        assert_eq!(value_for(53), Some(Value::Vector3(Vec3::FORWARD)));
        assert_eq!(value_for(70), Some(Value::Rotation(Rotation::ZERO)));
        assert_eq!(value_for(1), None);
        assert_eq!(value_for(30), None);
        assert_eq!(value_for(255), None);
    }

    #[test]
    fn test_near_miss_values_are_not_constants() {
        assert_eq!(
            selector_for(&Value::Color(Color::rgba(255, 255, 255, 254))),
            None
        );
        assert_eq!(
            selector_for(&Value::Vector3(Vec3::new(0.0, 0.0, 1.0001))),
            None
        );
    }
}
