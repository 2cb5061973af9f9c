//! Game domain values carried through the codec.
//!
//! These are the host-engine value types a save blob can contain. They are
//! deliberately plain: exact-component equality, no arithmetic. The codec
//! layer maps each of them to a MessagePack extension payload.

/// A 2-component single-precision vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vec2 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// All components one.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Create a vector from components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 3-component single-precision vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All components one.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    /// Unit forward (+Z).
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);
    /// Unit up (+Y).
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit right (+X).
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);

    /// Create a vector from components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A 4-component single-precision vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec4 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component.
    pub w: f32,
}

impl Vec4 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// All components one.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Create a vector from components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// An Euler rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Rotation about X.
    pub pitch: f32,
    /// Rotation about Y.
    pub yaw: f32,
    /// Rotation about Z.
    pub roll: f32,
}

impl Rotation {
    /// The identity rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a rotation from Euler angles.
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Opaque cyan.
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    /// Opaque magenta.
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// Opaque orange.
    pub const ORANGE: Self = Self::rgb(255, 165, 0);
    /// Opaque purple.
    pub const PURPLE: Self = Self::rgb(128, 0, 128);
    /// Opaque brown.
    pub const BROWN: Self = Self::rgb(150, 75, 0);
    /// Opaque pink.
    pub const PINK: Self = Self::rgb(255, 192, 203);
    /// Opaque tan.
    pub const TAN: Self = Self::rgb(210, 180, 140);
    /// Opaque ruby.
    pub const RUBY: Self = Self::rgb(224, 17, 95);
    /// Opaque emerald.
    pub const EMERALD: Self = Self::rgb(80, 200, 120);
    /// Opaque sapphire.
    pub const SAPPHIRE: Self = Self::rgb(15, 82, 186);
    /// Opaque silver.
    pub const SILVER: Self = Self::rgb(192, 192, 192);
    /// Opaque white smoke.
    pub const SMOKE: Self = Self::rgb(245, 245, 245);

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A reference to a player account by its host-assigned id string.
///
/// Ids issued by the host are 32 lowercase hex characters; such ids have a
/// lossless 16-byte compact form. Any other id (test fixtures, imported
/// data) is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    id: String,
}

impl PlayerRef {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The id string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The 16-byte compact form, when the id is exactly 32 lowercase hex
    /// characters: two big-endian u64 halves. Re-formatting the halves
    /// reproduces the id byte-for-byte, so the round trip is lossless.
    pub fn compact128(&self) -> Option<(u64, u64)> {
        if self.id.len() != 32 || !is_lower_hex(&self.id) {
            return None;
        }
        let hi = u64::from_str_radix(&self.id[..16], 16).ok()?;
        let lo = u64::from_str_radix(&self.id[16..], 16).ok()?;
        Some((hi, lo))
    }

    /// Rebuild a reference from its compact form.
    pub fn from_compact128(hi: u64, lo: u64) -> Self {
        Self {
            id: format!("{hi:016x}{lo:016x}"),
        }
    }
}

/// A reference to a placed game object by its reference id string.
///
/// Host reference ids are 16 lowercase hex characters and compact to a
/// single u64; anything else is carried verbatim. The empty id is the
/// "unassigned" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    id: String,
}

impl ObjectRef {
    /// The unassigned sentinel.
    pub const UNASSIGNED: Self = Self { id: String::new() };

    /// Wrap a reference id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The reference id string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True for the unassigned sentinel.
    pub fn is_unassigned(&self) -> bool {
        self.id.is_empty()
    }

    /// The 8-byte compact form, when the id is exactly 16 lowercase hex
    /// characters. Lossless by the same argument as
    /// [`PlayerRef::compact128`].
    pub fn compact64(&self) -> Option<u64> {
        if self.id.len() != 16 || !is_lower_hex(&self.id) {
            return None;
        }
        u64::from_str_radix(&self.id, 16).ok()
    }

    /// Rebuild a reference from its compact form.
    pub fn from_compact64(bits: u64) -> Self {
        Self {
            id: format!("{bits:016x}"),
        }
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
