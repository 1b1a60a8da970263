//! Keyframe animation sections.

use std::fmt;

use rwbs_common::{DiagnosticSink, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{capacity_hint, Section, Vec3};
use crate::Chunk;

/// Keyframe interpolation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Rotation quaternion plus translation.
    #[default]
    Standard,
    /// UV animation, layout not decoded.
    Uvb,
    Other(u32),
}

impl Interpolation {
    pub const fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Standard,
            20 => Self::Uvb,
            other => Self::Other(other),
        }
    }

    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Standard => 1,
            Self::Uvb => 20,
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Uvb => f.write_str("uvb"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// A standard keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct KeyFrame {
    pub time: f32,
    /// Quaternion, x y z w.
    pub rotation: [f32; 4],
    pub translation: Vec3,
    /// Byte offset of the previous keyframe for the same node.
    pub previous_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimAnimation {
    pub version: u32,
    pub interpolation: Interpolation,
    pub frame_count: u32,
    pub flags: u32,
    pub duration: f32,
    /// Empty unless the interpolation is [`Interpolation::Standard`].
    pub frames: Vec<KeyFrame>,
}

pub(crate) fn project_anim_animation(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut content = chunk.buffer();
    let mut animation = AnimAnimation {
        version: content.read_u32()?,
        interpolation: Interpolation::from_u32(content.read_u32()?),
        frame_count: content.read_u32()?,
        flags: content.read_u32()?,
        duration: content.read_f32()?,
        frames: Vec::new(),
    };

    if animation.interpolation == Interpolation::Standard {
        animation.frames = content.read_array(animation.frame_count as usize)?;
    } else {
        sink.warn(format_args!(
            "Unsupported interpolation type in Anim Animation: {}",
            animation.interpolation
        ));
    }

    Ok(Section::AnimAnimation(animation))
}

/// One interpolation segment of a delta morph track.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct DeltaMorphFrame {
    pub start: f32,
    pub end: f32,
    pub duration: f32,
    pub recip_duration: f32,
    /// Index of the following frame, -1 at the end.
    pub next_id: i32,
}

/// Frames driving a single delta morph target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeltaMorphTrack {
    pub frames: Vec<DeltaMorphFrame>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeltaMorphAnimation {
    pub version: u32,
    pub interpolation: Interpolation,
    pub target_count: u32,
    pub total_frame_count: u32,
    pub tracks: Vec<DeltaMorphTrack>,
}

/// Bytes of embedded struct header preceding the animation fields.
const DELTA_MORPH_PREFIX: usize = 12;

pub(crate) fn project_delta_morph_animation(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut content = chunk.buffer();
    content.skip(DELTA_MORPH_PREFIX)?;

    let version = content.read_u32()?;
    let interpolation = Interpolation::from_u32(content.read_u32()?);
    let target_count = content.read_u32()?;
    let total_frame_count = content.read_u32()?;

    let mut tracks = Vec::with_capacity(capacity_hint(&content, target_count, 4));
    for _ in 0..target_count {
        let count = content.read_u32()? as usize;
        tracks.push(DeltaMorphTrack {
            frames: content.read_array(count)?,
        });
    }

    let total: usize = tracks.iter().map(|t| t.frames.len()).sum();
    if total != total_frame_count as usize {
        sink.warn(format_args!(
            "Delta Morph Animation frame total {total} does not match header ({total_frame_count})"
        ));
    }

    Ok(Section::DeltaMorphAnimation(DeltaMorphAnimation {
        version,
        interpolation,
        target_count,
        total_frame_count,
        tracks,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::testing::{bytes, V36};
    use crate::ChunkType;
    use rwbs_common::{CollectingSink, Error};

    fn anim_payload(interpolation: u32, frames: u32) -> Vec<u8> {
        bytes(|b| {
            b.write_u32(0x100)?;
            b.write_u32(interpolation)?;
            b.write_u32(frames)?;
            b.write_u32(0)?;
            b.write_f32(1.5)?;
            for i in 0..frames {
                b.write_struct(&KeyFrame {
                    time: i as f32 * 0.5,
                    rotation: [0.0, 0.0, 0.0, 1.0],
                    translation: Vec3 { x: i as f32, y: 0.0, z: 0.0 },
                    previous_offset: 0,
                })?;
            }
            Ok(())
        })
    }

    #[test]
    fn test_key_frame_layout() {
        assert_eq!(std::mem::size_of::<KeyFrame>(), 36);
        assert_eq!(std::mem::size_of::<DeltaMorphFrame>(), 20);
    }

    #[test]
    fn test_anim_animation_standard() {
        let chunk = Chunk::data(ChunkType::ANIM_ANIMATION, V36, anim_payload(1, 4));
        let sink = CollectingSink::new();
        let section = project_anim_animation(&chunk, &sink).unwrap();
        let anim = section.as_anim_animation().unwrap();

        assert_eq!(anim.version, 0x100);
        assert_eq!(anim.interpolation, Interpolation::Standard);
        assert_eq!(anim.duration, 1.5);
        assert_eq!(anim.frames.len(), 4);
        assert_eq!(anim.frames[3].time, 1.5);
        assert_eq!(anim.frames[2].translation.x, 2.0);
        assert_eq!(anim.frames[0].rotation[3], 1.0);
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_anim_animation_uvb_is_not_decoded() {
        let mut payload = anim_payload(20, 0);
        payload.extend_from_slice(&[0u8; 40]);
        let chunk = Chunk::data(ChunkType::ANIM_ANIMATION, V36, payload);
        let sink = CollectingSink::new();
        let section = project_anim_animation(&chunk, &sink).unwrap();
        let anim = section.as_anim_animation().unwrap();

        assert_eq!(anim.interpolation, Interpolation::Uvb);
        assert!(anim.frames.is_empty());
        assert!(sink.contains("Unsupported interpolation type in Anim Animation: uvb"));
    }

    #[test]
    fn test_anim_animation_truncated_frames() {
        let mut payload = anim_payload(1, 2);
        payload.truncate(payload.len() - 4);
        let chunk = Chunk::data(ChunkType::ANIM_ANIMATION, V36, payload);
        let result = project_anim_animation(&chunk, &CollectingSink::new());
        assert!(matches!(result, Err(Error::BufferOverrun { .. })));
    }

    #[test]
    fn test_delta_morph_animation() {
        let frame = |start: f32, next_id: i32| DeltaMorphFrame {
            start,
            end: start + 1.0,
            duration: 2.0,
            recip_duration: 0.5,
            next_id,
        };
        let payload = bytes(|b| {
            b.write(&[0u8; DELTA_MORPH_PREFIX])?;
            b.write_u32(0x100)?;
            b.write_u32(1)?;
            b.write_u32(2)?;
            b.write_u32(4)?;
            b.write_u32(1)?;
            b.write_struct(&frame(0.0, -1))?;
            b.write_u32(2)?;
            b.write_struct(&frame(0.0, 1))?;
            b.write_struct(&frame(1.0, -1))
        });
        let chunk = Chunk::data(ChunkType::DELTA_MORPH_ANIMATION, V36, payload);
        let sink = CollectingSink::new();
        let section = project_delta_morph_animation(&chunk, &sink).unwrap();
        let anim = section.as_delta_morph_animation().unwrap();

        assert_eq!(anim.target_count, 2);
        assert_eq!(anim.tracks.len(), 2);
        assert_eq!(anim.tracks[1].frames[0].next_id, 1);
        assert_eq!(anim.tracks[1].frames[1].end, 2.0);
        assert!(sink.contains("frame total 3 does not match header (4)"));
    }
}
