//! JSON ↔ value conversion for the CLI.
//!
//! Scalars, arrays and string-keyed maps translate structurally. Types
//! JSON cannot express are wrapped in single-key objects (`$vec3`,
//! `$color`, `$bits`, ...) so a packed blob survives a JSON round trip.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use savepak_core::bitfield::BitField;
use savepak_core::enumdef::EnumDef;
use savepak_core::types::{Color, ObjectRef, PlayerRef, Rotation, Vec2, Vec3, Vec4};
use savepak_msgpack::Value;

type CliError = Box<dyn std::error::Error>;

/// Render a decoded value as JSON.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, CliError> {
    Ok(match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::UInt(u) => json!(u),
        Value::F32(f) => number(f64::from(*f))?,
        Value::F64(f) => number(*f)?,
        Value::Str(s) => json!(s),
        Value::Bin(bytes) => json!({ "$bin": BASE64.encode(bytes) }),
        Value::Array(items) => {
            let rendered: Result<Vec<_>, CliError> = items.iter().map(value_to_json).collect();
            serde_json::Value::Array(rendered?)
        }
        Value::Map(entries) => {
            if entries
                .iter()
                .all(|(k, _)| matches!(k, Value::Str(_)))
            {
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, val) in entries {
                    let Value::Str(key) = key else { unreachable!() };
                    object.insert(key.clone(), value_to_json(val)?);
                }
                serde_json::Value::Object(object)
            } else {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, val) in entries {
                    pairs.push(json!([value_to_json(key)?, value_to_json(val)?]));
                }
                json!({ "$map": pairs })
            }
        }
        Value::Ext(tag, payload) => {
            json!({ "$ext": { "tag": tag, "data": BASE64.encode(payload) } })
        }
        Value::Vector2(v) => json!({ "$vec2": [v.x, v.y] }),
        Value::Vector3(v) => json!({ "$vec3": [v.x, v.y, v.z] }),
        Value::Vector4(v) => json!({ "$vec4": [v.x, v.y, v.z, v.w] }),
        Value::Rotation(r) => json!({ "$rot": [r.pitch, r.yaw, r.roll] }),
        Value::Color(c) => json!({ "$color": [c.r, c.g, c.b, c.a] }),
        Value::Player(p) => json!({ "$player": p.id() }),
        Value::Object(o) => json!({ "$object": o.id() }),
        Value::Bits(bits) => json!({
            "$bits": { "len": bits.len(), "data": BASE64.encode(bits.as_bytes()) }
        }),
        Value::Enum(def) => {
            let keys: Vec<&str> = def.iter().map(|(k, _)| k).collect();
            let values: Vec<i64> = def.iter().map(|(_, v)| v).collect();
            json!({ "$enum": { "keys": keys, "values": values } })
        }
    })
}

fn number(f: f64) -> Result<serde_json::Value, CliError> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or_else(|| format!("{f} has no JSON representation").into())
}

/// Parse a JSON document into a packable value.
pub fn json_to_value(json: &serde_json::Value) -> Result<Value, CliError> {
    Ok(match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::F64(n.as_f64().ok_or("unrepresentable number")?)
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => {
            let parsed: Result<Vec<_>, CliError> = items.iter().map(json_to_value).collect();
            Value::Array(parsed?)
        }
        serde_json::Value::Object(object) => {
            if object.len() == 1 {
                let (key, inner) = object.iter().next().ok_or("empty object")?;
                if let Some(value) = tagged_value(key, inner)? {
                    return Ok(value);
                }
            }
            let mut entries = Vec::with_capacity(object.len());
            for (key, val) in object {
                entries.push((Value::Str(key.clone()), json_to_value(val)?));
            }
            Value::Map(entries)
        }
    })
}

/// Interpret a `{"$tag": ...}` wrapper, if `key` is one.
fn tagged_value(key: &str, inner: &serde_json::Value) -> Result<Option<Value>, CliError> {
    Ok(Some(match key {
        "$bin" => {
            let text = inner.as_str().ok_or("$bin expects a base64 string")?;
            Value::Bin(BASE64.decode(text)?)
        }
        "$map" => {
            let pairs = inner.as_array().ok_or("$map expects an array of pairs")?;
            let mut entries = Vec::with_capacity(pairs.len());
            for pair in pairs {
                let pair = pair.as_array().filter(|p| p.len() == 2).ok_or(
                    "$map entries must be [key, value] pairs",
                )?;
                entries.push((json_to_value(&pair[0])?, json_to_value(&pair[1])?));
            }
            Value::Map(entries)
        }
        "$ext" => {
            let tag = inner
                .get("tag")
                .and_then(serde_json::Value::as_i64)
                .ok_or("$ext expects a tag")?;
            let tag = i8::try_from(tag).map_err(|_| "$ext tag must fit i8")?;
            let data = inner
                .get("data")
                .and_then(serde_json::Value::as_str)
                .ok_or("$ext expects base64 data")?;
            Value::Ext(tag, BASE64.decode(data)?)
        }
        "$vec2" => {
            let [x, y] = float_components::<2>(inner)?;
            Value::Vector2(Vec2::new(x, y))
        }
        "$vec3" => {
            let [x, y, z] = float_components::<3>(inner)?;
            Value::Vector3(Vec3::new(x, y, z))
        }
        "$vec4" => {
            let [x, y, z, w] = float_components::<4>(inner)?;
            Value::Vector4(Vec4::new(x, y, z, w))
        }
        "$rot" => {
            let [pitch, yaw, roll] = float_components::<3>(inner)?;
            Value::Rotation(Rotation::new(pitch, yaw, roll))
        }
        "$color" => {
            let channels = inner.as_array().ok_or("$color expects [r, g, b, a]")?;
            if channels.len() != 4 {
                return Err("$color expects [r, g, b, a]".into());
            }
            let mut rgba = [0u8; 4];
            for (slot, channel) in rgba.iter_mut().zip(channels) {
                let n = channel.as_u64().ok_or("$color channel must be 0..=255")?;
                *slot = u8::try_from(n).map_err(|_| "$color channel must be 0..=255")?;
            }
            Value::Color(Color::rgba(rgba[0], rgba[1], rgba[2], rgba[3]))
        }
        "$player" => {
            let id = inner.as_str().ok_or("$player expects an id string")?;
            Value::Player(PlayerRef::new(id))
        }
        "$object" => {
            let id = inner.as_str().ok_or("$object expects an id string")?;
            Value::Object(ObjectRef::new(id))
        }
        "$bits" => {
            let len = inner
                .get("len")
                .and_then(serde_json::Value::as_u64)
                .ok_or("$bits expects a len")? as usize;
            let data = inner
                .get("data")
                .and_then(serde_json::Value::as_str)
                .ok_or("$bits expects base64 data")?;
            Value::Bits(BitField::from_raw_parts(len, BASE64.decode(data)?)?)
        }
        "$enum" => {
            let keys = inner
                .get("keys")
                .and_then(serde_json::Value::as_array)
                .ok_or("$enum expects keys")?;
            let values = inner
                .get("values")
                .and_then(serde_json::Value::as_array)
                .ok_or("$enum expects values")?;
            let keys: Option<Vec<String>> = keys
                .iter()
                .map(|k| k.as_str().map(str::to_string))
                .collect();
            let values: Option<Vec<i64>> =
                values.iter().map(serde_json::Value::as_i64).collect();
            Value::Enum(EnumDef::from_ordered_pairs(
                keys.ok_or("$enum keys must be strings")?,
                values.ok_or("$enum values must be integers")?,
            )?)
        }
        _ => return Ok(None),
    }))
}

fn float_components<const N: usize>(inner: &serde_json::Value) -> Result<[f32; N], CliError> {
    let items = inner.as_array().ok_or("expected an array of components")?;
    if items.len() != N {
        return Err(format!("expected {N} components, got {}", items.len()).into());
    }
    let mut components = [0f32; N];
    for (slot, item) in components.iter_mut().zip(items) {
        *slot = item.as_f64().ok_or("component must be a number")? as f32;
    }
    Ok(components)
}

/// Human-readable byte count.
pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 {
        format!("{} bytes ({:.1} KiB)", bytes, bytes as f64 / 1024.0)
    } else {
        format!("{bytes} bytes")
    }
}
