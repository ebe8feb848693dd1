use std::path::Path;

use glam::{DMat3, DVec3};

use crate::core::face::Face;
use crate::error::{Result, TraceError};
use crate::obj::{FaceIndex, Record};

/// The nearest intersection a ray found in a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: DVec3,
    pub normal: DVec3,
    pub distance: f64,
}

/// An indexed triangle-soup-of-polygons mesh. Vertices and normals live in
/// flat arenas; faces reference them by index, so arena position i is OBJ
/// index i + 1 and export needs no separate index bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub faces: Vec<Face>,
    /// Running sum of vertex positions at load time, consumed by
    /// [`Mesh::centering`].
    center_offset: DVec3,
}

impl Mesh {
    /// Builds a mesh from parsed OBJ records, in record order. Faces may only
    /// reference geometry declared at or before their own record; a face with
    /// fewer than 3 vertices or an unresolvable index aborts the load.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut mesh = Mesh::default();
        let mut face_no = 0usize;

        for record in records {
            match record {
                Record::Name(name) => mesh.name = name,
                Record::Vertex(x, y, z) => {
                    let v = DVec3::new(x, y, z);
                    mesh.center_offset += v;
                    mesh.vertices.push(v);
                }
                Record::Normal(x, y, z) => mesh.normals.push(DVec3::new(x, y, z)),
                Record::Face(indices) => {
                    face_no += 1;
                    mesh.push_face(face_no, &indices)?;
                }
            }
        }

        log::debug!(
            "built mesh '{}': {} vertices, {} normals, {} faces",
            mesh.name,
            mesh.vertices.len(),
            mesh.normals.len(),
            mesh.faces.len()
        );
        Ok(mesh)
    }

    fn push_face(&mut self, face_no: usize, indices: &[FaceIndex]) -> Result<()> {
        if indices.len() < 3 {
            return Err(TraceError::InvalidMesh(format!(
                "face {face_no} has {} vertices, need at least 3",
                indices.len()
            )));
        }

        // One normal per face: the first tuple's normal index is authoritative.
        let normal = resolve_index(indices[0].normal, self.normals.len(), face_no, "normal")?;
        let loop_verts = indices
            .iter()
            .map(|fi| resolve_index(fi.vertex, self.vertices.len(), face_no, "vertex"))
            .collect::<Result<Vec<_>>>()?;

        let mut face = Face::new(loop_verts, normal)?;
        face.triangulate();
        self.faces.push(face);
        Ok(())
    }

    /// Translates the mesh so its vertex centroid lands on the origin.
    ///
    /// One intentional pass over the load-time centroid: calling it a second
    /// time shifts the mesh again by the same amount.
    pub fn centering(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let centroid = self.center_offset / self.vertices.len() as f64;
        for v in &mut self.vertices {
            *v -= centroid;
        }
    }

    /// Rotates every vertex and normal around the world z-axis. Repeated
    /// calls compose, which is how the spin loop animates.
    pub fn rotate(&mut self, theta: f64) {
        let rot = DMat3::from_rotation_z(theta);
        for v in &mut self.vertices {
            *v = rot * *v;
        }
        for n in &mut self.normals {
            *n = rot * *n;
        }
    }

    /// Casts a ray against every face and returns the hit nearest to `orig`,
    /// ties going to the earliest face. Individual faces only report their
    /// first internal hit, so this pass is what guarantees depth ordering.
    pub fn intersect(&self, orig: DVec3, dir: DVec3) -> Option<Hit> {
        let mut nearest: Option<Hit> = None;
        for face in &self.faces {
            if let Some(point) = face.intersect(&self.vertices, orig, dir) {
                let distance = (point - orig).length();
                if nearest.map_or(true, |h| distance < h.distance) {
                    nearest = Some(Hit {
                        point,
                        normal: self.normals[face.normal],
                        distance,
                    });
                }
            }
        }
        nearest
    }

    /// Serializes the mesh back to OBJ text: `o`, `v`, `vn`, then `f v//n`
    /// lines with 1-based indices in insertion order. Texture coordinates are
    /// not modeled and do not round-trip.
    pub fn to_obj(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("o {}\n", self.name));
        for v in &self.vertices {
            out.push_str(&format!("v {} {} {}\n", v.x, v.y, v.z));
        }
        for n in &self.normals {
            out.push_str(&format!("vn {} {} {}\n", n.x, n.y, n.z));
        }
        for face in &self.faces {
            out.push('f');
            for &vi in &face.loop_verts {
                out.push_str(&format!(" {}//{}", vi + 1, face.normal + 1));
            }
            out.push('\n');
        }
        out
    }

    /// Writes [`Mesh::to_obj`] output to a file. A write failure is reported
    /// to the caller and leaves the mesh untouched.
    pub fn write_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_obj())?;
        log::info!("exported mesh '{}' to {}", self.name, path.as_ref().display());
        Ok(())
    }
}

/// Resolves a raw 1-based OBJ index against an arena of `len` entries.
/// Negative indices count back from the end of the list declared so far;
/// zero is always malformed.
fn resolve_index(raw: i64, len: usize, face_no: usize, kind: &str) -> Result<usize> {
    let resolved = if raw > 0 {
        let idx = (raw - 1) as usize;
        (idx < len).then_some(idx)
    } else if raw < 0 {
        len.checked_sub(raw.unsigned_abs() as usize)
    } else {
        None
    };
    resolved.ok_or_else(|| {
        TraceError::InvalidMesh(format!(
            "face {face_no}: {kind} index {raw} out of range ({len} declared so far)"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj;

    fn records(src: &str) -> Vec<Record> {
        obj::parse_str(src).unwrap()
    }

    // Two unit squares stacked along z, both facing +z.
    const STACKED_SQUARES: &str = "\
o stacked
vn 0 0 1
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
v 0 0 2
v 1 0 2
v 1 1 2
v 0 1 2
f 1//1 2//1 3//1 4//1
f 5//1 6//1 7//1 8//1
";

    #[test]
    fn nearest_hit_wins_across_faces() {
        let mesh = Mesh::from_records(records(STACKED_SQUARES)).unwrap();
        let orig = DVec3::new(0.25, 0.25, 5.0);
        let hit = mesh.intersect(orig, -DVec3::Z).unwrap();
        // The z=2 square is nearer to the origin than the z=1 square.
        assert!((hit.distance - 3.0).abs() < 1e-12);
        assert!((hit.point.z - 2.0).abs() < 1e-12);
        assert_eq!(hit.normal, DVec3::Z);
    }

    #[test]
    fn miss_returns_none() {
        let mesh = Mesh::from_records(records(STACKED_SQUARES)).unwrap();
        assert!(mesh.intersect(DVec3::new(5.0, 5.0, 5.0), -DVec3::Z).is_none());
    }

    #[test]
    fn centering_moves_centroid_to_origin() {
        let src = "vn 0 0 1\nv 0 0 0\nv 2 0 0\nv 0 2 0\nf 1//1 2//1 3//1\n";
        let mut mesh = Mesh::from_records(records(src)).unwrap();
        mesh.centering();

        let expected_shift = DVec3::new(2.0 / 3.0, 2.0 / 3.0, 0.0);
        assert!((mesh.vertices[0] - (DVec3::ZERO - expected_shift)).length() < 1e-12);
        assert!((mesh.vertices[1] - (DVec3::new(2.0, 0.0, 0.0) - expected_shift)).length() < 1e-12);

        let centroid: DVec3 =
            mesh.vertices.iter().sum::<DVec3>() / mesh.vertices.len() as f64;
        assert!(centroid.length() < 1e-12);
    }

    #[test]
    fn rotation_composes_around_z() {
        let src = "vn 1 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1//1 2//1 3//1\n";
        let mut mesh = Mesh::from_records(records(src)).unwrap();
        let quarter = std::f64::consts::FRAC_PI_2;
        mesh.rotate(quarter / 2.0);
        mesh.rotate(quarter / 2.0);
        assert!((mesh.vertices[0] - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
        assert!((mesh.normals[0] - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
        // z-axis points stay put.
        assert!((mesh.vertices[2] - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn face_with_too_few_vertices_fails_load() {
        let src = "vn 0 0 1\nv 0 0 0\nv 1 0 0\nf 1//1 2//1\n";
        assert!(Mesh::from_records(records(src)).is_err());
    }

    #[test]
    fn out_of_range_indices_fail_load() {
        // Vertex index past the declared list.
        let src = "vn 0 0 1\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 9//1\n";
        assert!(Mesh::from_records(records(src)).is_err());
        // Normal index with no normals declared yet.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        assert!(Mesh::from_records(records(src)).is_err());
    }

    #[test]
    fn negative_indices_resolve_from_list_end() {
        let src = "vn 0 0 1\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf -3//-1 -2//-1 -1//-1\n";
        let mesh = Mesh::from_records(records(src)).unwrap();
        assert_eq!(mesh.faces[0].loop_verts, vec![0, 1, 2]);
        assert_eq!(mesh.faces[0].normal, 0);

        let src = "vn 0 0 1\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 0//1\n";
        assert!(Mesh::from_records(records(src)).is_err(), "index 0 is malformed");
    }

    #[test]
    fn unnamed_mesh_export_round_trips() {
        // No `o` record at all: the export's bare `o` line must still reload.
        let src = "vn 0 0 1\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        let mesh = Mesh::from_records(records(src)).unwrap();
        assert!(mesh.name.is_empty());

        let reloaded = Mesh::from_records(records(&mesh.to_obj())).unwrap();
        assert!(reloaded.name.is_empty());
        assert_eq!(reloaded.vertices.len(), mesh.vertices.len());
        assert_eq!(reloaded.normals.len(), mesh.normals.len());
        assert_eq!(reloaded.faces.len(), mesh.faces.len());
        assert_eq!(reloaded.faces[0].loop_verts, mesh.faces[0].loop_verts);
    }

    #[test]
    fn export_round_trips() {
        let mesh = Mesh::from_records(records(STACKED_SQUARES)).unwrap();
        let reloaded = Mesh::from_records(records(&mesh.to_obj())).unwrap();

        assert_eq!(reloaded.name, mesh.name);
        assert_eq!(reloaded.vertices.len(), mesh.vertices.len());
        assert_eq!(reloaded.normals.len(), mesh.normals.len());
        assert_eq!(reloaded.faces.len(), mesh.faces.len());
        for (a, b) in mesh.faces.iter().zip(&reloaded.faces) {
            assert_eq!(a.loop_verts, b.loop_verts);
            assert_eq!(a.normal, b.normal);
        }
        for (a, b) in mesh.vertices.iter().zip(&reloaded.vertices) {
            assert!((*a - *b).length() < 1e-12);
        }
    }
}
