//! glTF 2.0 decoding into a [`ModelAsset`].
//!
//! Handles `.gltf` JSON with embedded data URIs or external buffers, and
//! binary `.glb` containers. Only triangle primitives are kept; normals are
//! generated when the asset has none.

use ::gltf::animation::util::ReadOutputs;
use ::gltf::buffer::Source;
use ::gltf::mesh::Mode;
use glam::{Quat, Vec3};

use super::source::AssetSource;
use super::ModelAsset;
use crate::animation::{AnimationClip, Interpolation, Track, TrackValues};
use crate::error::GlobeError;
use crate::scene::{Material, Mesh, SubtreeNode, Transform};

/// Decode `bytes` (the asset at `path`), fetching external buffers through
/// `source`.
///
/// # Errors
///
/// [`GlobeError::ModelParse`] for malformed documents and
/// [`GlobeError::AssetFetch`] when an external buffer cannot be fetched.
pub fn parse_model(
    path: &str,
    bytes: &[u8],
    source: &dyn AssetSource,
) -> Result<ModelAsset, GlobeError> {
    let ::gltf::Gltf { document, blob } = ::gltf::Gltf::from_slice(bytes)?;
    let buffers = load_buffers(path, &document, blob, source)?;

    let mut meshes = Vec::new();
    let mut mesh_slots: Vec<Vec<usize>> = Vec::new();
    for mesh in document.meshes() {
        let mut slots = Vec::new();
        for primitive in mesh.primitives() {
            if let Some(converted) = convert_primitive(&primitive, &buffers) {
                slots.push(meshes.len());
                meshes.push(converted);
            }
        }
        mesh_slots.push(slots);
    }

    let nodes: Vec<SubtreeNode> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            SubtreeNode {
                name: node.name().map(str::to_owned),
                transform: Transform {
                    translation: Vec3::from(translation),
                    rotation: Quat::from_array(rotation).normalize(),
                    scale: Vec3::from(scale),
                },
                meshes: node
                    .mesh()
                    .and_then(|m| mesh_slots.get(m.index()).cloned())
                    .unwrap_or_default(),
                children: node.children().map(|c| c.index()).collect(),
            }
        })
        .collect();

    let roots = scene_roots(&document, &nodes);
    let clips = document
        .animations()
        .map(|animation| convert_animation(&animation, &buffers))
        .collect();

    Ok(ModelAsset {
        nodes,
        roots,
        meshes,
        clips,
    })
}

fn load_buffers(
    path: &str,
    document: &::gltf::Document,
    blob: Option<Vec<u8>>,
    source: &dyn AssetSource,
) -> Result<Vec<Vec<u8>>, GlobeError> {
    let is_external = |b: &::gltf::Buffer<'_>| {
        matches!(b.source(), Source::Uri(uri) if !uri.starts_with("data:"))
    };

    if !document.buffers().any(|b| is_external(&b)) {
        let data = ::gltf::import_buffers(document, None, blob)?;
        return Ok(data.into_iter().map(|d| d.0).collect());
    }

    let mut buffers = Vec::with_capacity(document.buffers().len());
    for buffer in document.buffers() {
        let mut data = match buffer.source() {
            Source::Bin => blob.clone().ok_or_else(|| {
                GlobeError::ModelParse("missing binary chunk".to_owned())
            })?,
            Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(GlobeError::ModelParse(
                    "data URIs mixed with external buffers are not supported"
                        .to_owned(),
                ));
            }
            Source::Uri(uri) => {
                let resolved = source.resolve(path, uri);
                log::debug!("fetching buffer {resolved}");
                source.fetch(&resolved, &mut |_, _| {})?
            }
        };
        if data.len() < buffer.length() {
            return Err(GlobeError::ModelParse(format!(
                "buffer {} is {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        while data.len() % 4 != 0 {
            data.push(0);
        }
        buffers.push(data);
    }
    Ok(buffers)
}

fn convert_primitive(
    primitive: &::gltf::Primitive<'_>,
    buffers: &[Vec<u8>],
) -> Option<Mesh> {
    if primitive.mode() != Mode::Triangles {
        log::debug!("skipping {:?} primitive", primitive.mode());
        return None;
    }
    let reader =
        primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let normals = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => vertex_normals(&positions, &indices),
    };
    let material = primitive.material();
    Some(Mesh {
        positions,
        normals,
        indices,
        material: Material {
            base_color: material.pbr_metallic_roughness().base_color_factor(),
        },
        cast_shadow: false,
        receive_shadow: false,
    })
}

/// Area-weighted vertex normals.
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len()
        {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - pa)
            .cross(Vec3::from(positions[c]) - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}

/// Root nodes of the default scene, else the first scene, else every node
/// that is nobody's child.
fn scene_roots(document: &::gltf::Document, nodes: &[SubtreeNode]) -> Vec<usize> {
    if let Some(scene) =
        document.default_scene().or_else(|| document.scenes().next())
    {
        return scene.nodes().map(|n| n.index()).collect();
    }
    let mut is_child = vec![false; nodes.len()];
    for node in nodes {
        for &child in &node.children {
            if let Some(flag) = is_child.get_mut(child) {
                *flag = true;
            }
        }
    }
    (0..nodes.len()).filter(|&i| !is_child[i]).collect()
}

fn convert_animation(
    animation: &::gltf::Animation<'_>,
    buffers: &[Vec<u8>],
) -> AnimationClip {
    let mut tracks = Vec::new();
    for channel in animation.channels() {
        let reader =
            channel.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
        let (Some(inputs), Some(outputs)) =
            (reader.read_inputs(), reader.read_outputs())
        else {
            continue;
        };
        let values = match outputs {
            ReadOutputs::Translations(v) => {
                TrackValues::Translation(v.map(Vec3::from).collect())
            }
            ReadOutputs::Rotations(v) => TrackValues::Rotation(
                v.into_f32().map(Quat::from_array).collect(),
            ),
            ReadOutputs::Scales(v) => {
                TrackValues::Scale(v.map(Vec3::from).collect())
            }
            ReadOutputs::MorphTargetWeights(_) => continue,
        };
        let interpolation = match channel.sampler().interpolation() {
            ::gltf::animation::Interpolation::Linear => Interpolation::Linear,
            ::gltf::animation::Interpolation::Step => Interpolation::Step,
            ::gltf::animation::Interpolation::CubicSpline => {
                Interpolation::CubicSpline
            }
        };
        tracks.push(Track {
            target: channel.target().node().index(),
            interpolation,
            times: inputs.collect(),
            values,
        });
    }
    AnimationClip::new(animation.name().map(str::to_owned), tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::source::FileSource;
    use crate::testing::TWO_CLIP_GLTF;

    #[test]
    fn parses_embedded_document() {
        let asset = parse_model(
            "scene.gltf",
            TWO_CLIP_GLTF.as_bytes(),
            &FileSource::default(),
        )
        .unwrap();

        assert_eq!(asset.nodes.len(), 2);
        assert_eq!(asset.roots, vec![0]);
        assert_eq!(asset.nodes[0].name.as_deref(), Some("globe"));
        assert_eq!(asset.nodes[0].children, vec![1]);
        assert_eq!(asset.nodes[0].meshes, vec![0]);
        assert_eq!(asset.nodes[1].transform.translation, Vec3::new(0.0, 0.5, 0.0));

        assert_eq!(asset.meshes.len(), 1);
        let mesh = &asset.meshes[0];
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        // Generated normals face +Z for a counter-clockwise XY triangle.
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert!(!mesh.cast_shadow && !mesh.receive_shadow);
    }

    #[test]
    fn reads_animation_clips() {
        let asset = parse_model(
            "scene.gltf",
            TWO_CLIP_GLTF.as_bytes(),
            &FileSource::default(),
        )
        .unwrap();
        let names: Vec<&str> =
            asset.clips.iter().map(AnimationClip::display_name).collect();
        assert_eq!(names, vec!["spin", "bob"]);
        assert_eq!(asset.clips[0].duration(), 1.0);
        assert_eq!(asset.clips[1].tracks[0].interpolation, Interpolation::Step);
        assert_eq!(asset.clips[1].tracks[0].target, 1);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let result =
            parse_model("scene.gltf", b"not a model", &FileSource::default());
        assert!(matches!(result, Err(GlobeError::ModelParse(_))));
    }

    #[test]
    fn missing_external_buffer_is_a_fetch_error() {
        let doc = r#"{
            "asset": {"version": "2.0"},
            "buffers": [{"uri": "missing-orbis-buffer.bin", "byteLength": 4}]
        }"#;
        let result = parse_model(
            "does/not/exist/scene.gltf",
            doc.as_bytes(),
            &FileSource::default(),
        );
        assert!(matches!(result, Err(GlobeError::AssetFetch { .. })));
    }

    #[test]
    fn vertex_normals_fall_back_to_up_for_degenerate_faces() {
        let normals = vertex_normals(&[[0.0; 3]; 3], &[0, 1, 2]);
        assert_eq!(normals, vec![[0.0, 1.0, 0.0]; 3]);
    }
}
