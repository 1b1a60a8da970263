//! Geometry, Geometry List and Delta Morph PLG sections.

use rwbs_common::{Buffer, DiagnosticSink, Result, Version};

use super::{capacity_hint, claim_single, unsupported, Face, Rgba, Section, Sphere, StructSlot, SurfaceProperties, TexCoord, Vec3};
use crate::{Chunk, ChunkType};

/// Geometry format flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeometryFormat(pub u32);

impl GeometryFormat {
    /// Triangle strip instead of triangle list.
    pub const TRISTRIP: u32 = 0x0000_0001;
    pub const POSITIONS: u32 = 0x0000_0002;
    /// One set of texture coordinates.
    pub const TEXTURED: u32 = 0x0000_0004;
    /// Per-vertex colors.
    pub const PRELIT: u32 = 0x0000_0008;
    pub const NORMALS: u32 = 0x0000_0010;
    pub const LIGHT: u32 = 0x0000_0020;
    pub const MODULATE_MATERIAL_COLOR: u32 = 0x0000_0040;
    /// Two sets of texture coordinates.
    pub const TEXTURED2: u32 = 0x0000_0080;
    /// Vertex data lives in a platform-specific extension.
    pub const NATIVE: u32 = 0x0100_0000;

    /// Whether any bit of `flags` is set.
    #[inline]
    pub const fn has(self, flags: u32) -> bool {
        self.0 & flags != 0
    }

    /// Number of texture coordinate sets stored per vertex.
    ///
    /// Bits 16..23 hold an explicit count; when zero, `TEXTURED` means one set
    /// and `TEXTURED2` two.
    pub const fn tex_coord_sets(self) -> u32 {
        if !self.has(Self::TEXTURED | Self::TEXTURED2) {
            return 0;
        }
        match (self.0 & 0x00FF_0000) >> 16 {
            0 if self.has(Self::TEXTURED) => 1,
            0 => 2,
            explicit => explicit,
        }
    }
}

/// One morph target of a geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphTarget {
    pub bounding_sphere: Sphere,
    pub has_vertices: bool,
    pub has_normals: bool,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// A mesh: vertex attributes, triangles and morph targets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub format: GeometryFormat,
    pub triangle_count: u32,
    pub vertex_count: u32,
    pub morph_target_count: u32,
    /// Present before 3.4.0.0.
    pub surface: Option<SurfaceProperties>,
    pub colors: Vec<Rgba>,
    pub uv_layers: Vec<Vec<TexCoord>>,
    /// Triangles with material and vertex indices in logical order.
    pub faces: Vec<Face>,
    pub morph_targets: Vec<MorphTarget>,
    /// Child index of the Material List.
    pub material_list: Option<usize>,
    /// Child indices of Extension lists.
    pub extensions: Vec<usize>,
}

impl Geometry {
    fn read_struct(&mut self, content: &mut Buffer<'_>, version: Version, sink: &dyn DiagnosticSink) -> Result<()> {
        self.format = GeometryFormat(content.read_u32()?);
        self.triangle_count = content.read_u32()?;
        self.vertex_count = content.read_u32()?;
        self.morph_target_count = content.read_u32()?;

        if version.unpacked() < 0x34000 {
            self.surface = Some(content.read_struct()?);
        }

        let vertices = self.vertex_count as usize;
        if !self.format.has(GeometryFormat::NATIVE) {
            if self.format.has(GeometryFormat::PRELIT) {
                self.colors = content.read_array(vertices)?;
            }
            for _ in 0..self.format.tex_coord_sets() {
                self.uv_layers.push(content.read_array(vertices)?);
            }

            self.faces = content.read_array(self.triangle_count as usize)?;
            // vertex 2 and material are stored swapped
            for face in &mut self.faces {
                std::mem::swap(&mut face.material, &mut face.vertex2);
            }
        }

        for _ in 0..self.morph_target_count {
            let bounding_sphere = content.read_struct()?;
            let has_vertices = content.read_bool32()?;
            let has_normals = content.read_bool32()?;
            let positions = if has_vertices { content.read_array(vertices)? } else { Vec::new() };
            let normals = if has_normals { content.read_array(vertices)? } else { Vec::new() };
            self.morph_targets.push(MorphTarget {
                bounding_sphere,
                has_vertices,
                has_normals,
                positions,
                normals,
            });
        }

        if !content.is_empty() {
            sink.warn(format_args!("Excess data in Geometry struct ({} bytes)", content.remaining()));
        }
        Ok(())
    }
}

pub(crate) fn project_geometry(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut geometry = Geometry::default();
    let mut slot = StructSlot::new("Geometry");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    geometry.read_struct(&mut content, chunk.version(), sink)?;
                }
            }
            ChunkType::MATERIAL_LIST => {
                claim_single(&mut geometry.material_list, index, "Material Lists", "Geometry", sink);
            }
            ChunkType::EXTENSION => geometry.extensions.push(index),
            _ => unsupported("Geometry", child, sink),
        }
    }

    slot.finish(sink);
    if geometry.material_list.is_none() {
        sink.warn(format_args!("Geometry is missing Material List"));
    }
    Ok(Section::Geometry(geometry))
}

/// A list of geometries, referenced by index from Atomics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryList {
    /// Count declared in the struct; only used as a consistency check.
    pub declared_count: u32,
    /// Child indices of the Geometry chunks.
    pub geometries: Vec<usize>,
}

impl GeometryList {
    /// The geometry chunks, in order.
    pub fn geometries<'c>(&'c self, owner: &'c Chunk) -> impl Iterator<Item = &'c Chunk> + 'c {
        self.geometries.iter().filter_map(move |&i| owner.child(i))
    }
}

pub(crate) fn project_geometry_list(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut list = GeometryList::default();
    let mut slot = StructSlot::new("Geometry List");

    for (index, child) in chunk.children().iter().enumerate() {
        match child.kind() {
            ChunkType::STRUCT => {
                if let Some(mut content) = slot.claim(child, sink) {
                    list.declared_count = content.read_u32()?;
                }
            }
            ChunkType::GEOMETRY => list.geometries.push(index),
            ChunkType::EXTENSION => {}
            _ => unsupported("Geometry List", child, sink),
        }
    }

    slot.finish(sink);
    if list.declared_count as usize != list.geometries.len() {
        sink.warn(format_args!(
            "Geometry List actual children count {} does not match header ({})",
            list.geometries.len(),
            list.declared_count
        ));
    }
    Ok(Section::GeometryList(list))
}

/// A run in a delta morph vertex mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphRun {
    /// The next `n` vertices are left untouched.
    Skip(u8),
    /// The next `n` vertices take the next `n` deltas.
    Add(u8),
}

impl MorphRun {
    pub const fn from_byte(byte: u8) -> Self {
        let count = byte & 0x7F;
        if byte & 0x80 != 0 {
            Self::Add(count)
        } else {
            Self::Skip(count)
        }
    }
}

/// One delta morph target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeltaMorphTarget {
    pub name: String,
    /// Geometry format flags describing which deltas are present.
    pub flags: GeometryFormat,
    pub unknown: u32,
    /// Run-length vertex mapping; see [`MorphRun`].
    pub mapping: Vec<u8>,
    pub points: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub bounding_sphere: Sphere,
}

impl DeltaMorphTarget {
    /// The mapping decoded into runs.
    pub fn runs(&self) -> impl Iterator<Item = MorphRun> + '_ {
        self.mapping.iter().map(|&b| MorphRun::from_byte(b))
    }

    /// Total vertices covered by `Add` runs.
    pub fn mapped_points(&self) -> usize {
        self.runs()
            .map(|run| match run {
                MorphRun::Add(n) => n as usize,
                MorphRun::Skip(_) => 0,
            })
            .sum()
    }
}

/// Delta morph plug-in data attached to a geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeltaMorph {
    pub targets: Vec<DeltaMorphTarget>,
}

pub(crate) fn project_delta_morph(chunk: &Chunk, sink: &dyn DiagnosticSink) -> Result<Section> {
    let mut content = chunk.buffer();
    let target_count = content.read_u32()?;
    let mut morph = DeltaMorph {
        targets: Vec::with_capacity(capacity_hint(&content, target_count, 24)),
    };

    for _ in 0..target_count {
        let name_len = content.read_u32()? as usize;
        let name = super::c_string(content.read_bytes(name_len)?);
        let flags = GeometryFormat(content.read_u32()?);
        let unknown = content.read_u32()?;
        let mapping_len = content.read_u32()? as usize;
        let point_count = content.read_u32()? as usize;

        let mapping = content.read_bytes(mapping_len)?.to_vec();
        let points = content.read_array(point_count)?;
        let normals = if flags.has(GeometryFormat::NORMALS) {
            content.read_array(point_count)?
        } else {
            Vec::new()
        };
        let bounding_sphere = content.read_struct()?;

        let target = DeltaMorphTarget {
            name,
            flags,
            unknown,
            mapping,
            points,
            normals,
            bounding_sphere,
        };
        if target.mapped_points() != point_count {
            sink.warn(format_args!(
                "Delta Morph target '{}' maps {} points but stores {}",
                target.name,
                target.mapped_points(),
                point_count
            ));
        }
        morph.targets.push(target);
    }

    Ok(Section::DeltaMorph(morph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::testing::{bytes, structure, V31, V36};
    use rwbs_common::{CollectingSink, Level};

    fn material_list() -> Chunk {
        Chunk::list(ChunkType::MATERIAL_LIST, V36, vec![])
    }

    /// Three prelit vertices, one triangle, one morph target with positions.
    fn triangle_struct(face_slots: [u16; 4]) -> Vec<u8> {
        bytes(|b| {
            b.write_u32(GeometryFormat::POSITIONS | GeometryFormat::PRELIT)?;
            b.write_u32(1)?;
            b.write_u32(3)?;
            b.write_u32(1)?;
            for color in [0xFF00_00FFu32, 0xFF00_FF00, 0xFFFF_0000] {
                b.write_u32(color)?;
            }
            for slot in face_slots {
                b.write_u16(slot)?;
            }
            for v in [0.0, 0.5, 1.0, 4.0] {
                b.write_f32(v)?;
            }
            b.write_u32(1)?;
            b.write_u32(0)?;
            for i in 0..9 {
                b.write_f32(i as f32)?;
            }
            Ok(())
        })
    }

    #[test]
    fn test_face_material_swap() {
        // file slots: vertex2, vertex1, material, vertex3
        let chunk = Chunk::list(
            ChunkType::GEOMETRY,
            V36,
            vec![structure(V36, triangle_struct([1, 0, 5, 2])), material_list()],
        );
        let sink = CollectingSink::new();
        let section = project_geometry(&chunk, &sink).unwrap();
        let geometry = section.as_geometry().unwrap();

        assert_eq!(
            geometry.faces,
            vec![Face {
                material: 5,
                vertex1: 0,
                vertex2: 1,
                vertex3: 2
            }]
        );
        assert_eq!(geometry.colors.len(), 3);
        assert_eq!(geometry.colors[0], Rgba { r: 0xFF, g: 0, b: 0, a: 0xFF });
        assert!(geometry.uv_layers.is_empty());
        assert!(geometry.surface.is_none());
        assert_eq!(geometry.morph_targets.len(), 1);
        assert_eq!(geometry.morph_targets[0].positions[2], Vec3 { x: 6.0, y: 7.0, z: 8.0 });
        assert_eq!(geometry.morph_targets[0].bounding_sphere.radius, 4.0);
        assert!(geometry.morph_targets[0].normals.is_empty());
        assert_eq!(geometry.material_list, Some(1));
        assert!(!sink.has_warnings(), "{:?}", sink.diagnostics());
    }

    #[test]
    fn test_surface_properties_gated_by_version() {
        let payload = bytes(|b| {
            b.write_u32(GeometryFormat::NATIVE)?;
            b.write_u32(0)?;
            b.write_u32(0)?;
            b.write_u32(0)?;
            b.write_f32(1.0)?;
            b.write_f32(0.5)?;
            b.write_f32(0.25)
        });
        let chunk = Chunk::list(ChunkType::GEOMETRY, V31, vec![structure(V31, payload), material_list()]);
        let sink = CollectingSink::new();
        let section = project_geometry(&chunk, &sink).unwrap();
        let geometry = section.as_geometry().unwrap();

        assert_eq!(
            geometry.surface,
            Some(SurfaceProperties {
                ambient: 1.0,
                specular: 0.5,
                diffuse: 0.25
            })
        );
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_uv_layers_and_excess_data() {
        let format = GeometryFormat::TEXTURED2 | (3 << 16);
        let payload = bytes(|b| {
            b.write_u32(format)?;
            b.write_u32(0)?;
            b.write_u32(1)?;
            b.write_u32(0)?;
            for layer in 0..3 {
                b.write_f32(layer as f32)?;
                b.write_f32(0.0)?;
            }
            b.write_u32(0xDEAD)
        });
        let chunk = Chunk::list(ChunkType::GEOMETRY, V36, vec![structure(V36, payload)]);
        let sink = CollectingSink::new();
        let section = project_geometry(&chunk, &sink).unwrap();
        let geometry = section.as_geometry().unwrap();

        assert_eq!(geometry.uv_layers.len(), 3);
        assert_eq!(geometry.uv_layers[2][0].u, 2.0);
        assert!(sink.contains("Excess data in Geometry struct"));
        assert!(sink.contains("Geometry is missing Material List"));
    }

    #[test]
    fn test_tex_coord_sets() {
        assert_eq!(GeometryFormat(GeometryFormat::TEXTURED).tex_coord_sets(), 1);
        assert_eq!(GeometryFormat(GeometryFormat::TEXTURED2).tex_coord_sets(), 2);
        assert_eq!(GeometryFormat(GeometryFormat::TEXTURED | 0x0004_0000).tex_coord_sets(), 4);
        assert_eq!(GeometryFormat(GeometryFormat::PRELIT | 0x0004_0000).tex_coord_sets(), 0);
    }

    #[test]
    fn test_geometry_truncated_struct_is_overrun() {
        let payload = triangle_struct([1, 0, 5, 2]);
        let chunk = Chunk::list(
            ChunkType::GEOMETRY,
            V36,
            vec![structure(V36, payload[..30].to_vec())],
        );
        let err = project_geometry(&chunk, &CollectingSink::new()).unwrap_err();
        assert!(matches!(err, rwbs_common::Error::BufferOverrun { .. }));
    }

    #[test]
    fn test_geometry_list_count_mismatch() {
        let chunk = Chunk::list(
            ChunkType::GEOMETRY_LIST,
            V36,
            vec![
                structure(V36, 2u32.to_le_bytes().to_vec()),
                Chunk::list(ChunkType::GEOMETRY, V36, vec![]),
                Chunk::data(ChunkType::LIGHT, V36, vec![]),
            ],
        );
        let sink = CollectingSink::new();
        let section = project_geometry_list(&chunk, &sink).unwrap();
        let list = section.as_geometry_list().unwrap();

        assert_eq!(list.declared_count, 2);
        assert_eq!(list.geometries, vec![1]);
        assert_eq!(list.geometries(&chunk).count(), 1);
        assert!(sink.contains("Unsupported chunk in Geometry List: Light"));
        assert!(sink.contains("does not match header (2)"));
        assert_eq!(sink.count(Level::Warn), 2);
    }

    #[test]
    fn test_delta_morph_targets() {
        let payload = bytes(|b| {
            b.write_u32(1)?;
            b.write_u32(6)?;
            b.write(b"smile\0")?;
            b.write_u32(GeometryFormat::POSITIONS | GeometryFormat::NORMALS)?;
            b.write_u32(0)?;
            b.write_u32(2)?;
            b.write_u32(2)?;
            b.write(&[0x03, 0x82])?;
            for v in [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0] {
                b.write_f32(v)?;
            }
            for v in [0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0] {
                b.write_f32(v)?;
            }
            for v in [0.0f32, 0.0, 0.0, 2.0] {
                b.write_f32(v)?;
            }
            Ok(())
        });
        let chunk = Chunk::data(ChunkType::DELTA_MORPH_PLG, V36, payload);
        let sink = CollectingSink::new();
        let section = project_delta_morph(&chunk, &sink).unwrap();
        let morph = section.as_delta_morph().unwrap();

        assert_eq!(morph.targets.len(), 1);
        let target = &morph.targets[0];
        assert_eq!(target.name, "smile");
        assert_eq!(target.runs().collect::<Vec<_>>(), vec![MorphRun::Skip(3), MorphRun::Add(2)]);
        assert_eq!(target.points.len(), 2);
        assert_eq!(target.normals[1].z, 1.0);
        assert_eq!(target.bounding_sphere.radius, 2.0);
        assert!(!sink.has_warnings());
    }

    #[test]
    fn test_delta_morph_mapping_mismatch() {
        let payload = bytes(|b| {
            b.write_u32(1)?;
            b.write_u32(0)?;
            b.write_u32(0)?;
            b.write_u32(0)?;
            b.write_u32(1)?;
            b.write_u32(1)?;
            // one point stored, but the only run skips
            b.write(&[0x01])?;
            for v in [0.0f32; 7] {
                b.write_f32(v)?;
            }
            Ok(())
        });
        let chunk = Chunk::data(ChunkType::DELTA_MORPH_PLG, V36, payload);
        let sink = CollectingSink::new();
        project_delta_morph(&chunk, &sink).unwrap();
        assert!(sink.contains("maps 0 points but stores 1"));
    }
}
