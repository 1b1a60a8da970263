//! Plain records shared between section layouts.
//!
//! All of these map byte-for-byte onto their on-disk form and are read with
//! zerocopy.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A 3-component float vector (positions, normals, translations).
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A texture coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
}

/// An 8-bit per channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// An axis-aligned box stored max-first.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct BoundingBox {
    pub max: Vec3,
    pub min: Vec3,
}

/// A triangle with its material index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Face {
    pub material: u16,
    pub vertex1: u16,
    pub vertex2: u16,
    pub vertex3: u16,
}

/// Ambient, specular and diffuse lighting coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SurfaceProperties {
    pub ambient: f32,
    pub specular: f32,
    pub diffuse: f32,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    #[default]
    None,
    Nearest,
    Linear,
    MipNearest,
    MipLinear,
    LinearMipNearest,
    Trilinear,
    /// A value outside the known range, kept verbatim.
    Other(u8),
}

impl FilterMode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Nearest,
            2 => Self::Linear,
            3 => Self::MipNearest,
            4 => Self::MipLinear,
            5 => Self::LinearMipNearest,
            6 => Self::Trilinear,
            other => Self::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "No Filtering",
            Self::Nearest => "Nearest",
            Self::Linear => "Linear",
            Self::MipNearest => "Mip Nearest",
            Self::MipLinear => "Mip Linear",
            Self::LinearMipNearest => "Linear Mip Nearest",
            Self::Trilinear => "Trilinear",
            Self::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Texture addressing mode for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    #[default]
    None,
    Wrap,
    Mirror,
    Clamp,
    Border,
    /// A value outside the known range, kept verbatim.
    Other(u8),
}

impl AddressMode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Wrap,
            2 => Self::Mirror,
            3 => Self::Clamp,
            4 => Self::Border,
            other => Self::Other(other),
        }
    }

    /// Split a combined address byte into `(u, v)`: U is the high nibble.
    pub fn split(combined: u8) -> (Self, Self) {
        (Self::from_u8(combined >> 4), Self::from_u8(combined & 0x0F))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "No Tiling",
            Self::Wrap => "Tile",
            Self::Mirror => "Mirror",
            Self::Clamp => "Clamp",
            Self::Border => "Border",
            Self::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for AddressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
