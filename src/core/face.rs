use std::collections::VecDeque;

use glam::DVec3;

use crate::core::intersect;
use crate::error::{Result, TraceError};

/// A planar polygon loop with one normal, decomposed into triangles for
/// intersection testing. Vertices and the normal are indices into the owning
/// mesh's arenas, so a face never copies or aliases geometry.
#[derive(Debug, Clone)]
pub struct Face {
    pub loop_verts: Vec<usize>,
    pub normal: usize,
    pub tris: Vec<[usize; 3]>,
}

impl Face {
    /// A face needs at least 3 vertices; anything smaller cannot be
    /// triangulated and is rejected outright.
    pub fn new(loop_verts: Vec<usize>, normal: usize) -> Result<Self> {
        if loop_verts.len() < 3 {
            return Err(TraceError::InvalidMesh(format!(
                "face has {} vertices, need at least 3",
                loop_verts.len()
            )));
        }
        Ok(Self {
            loop_verts,
            normal,
            tris: Vec::new(),
        })
    }

    /// Splits the N-vertex loop into N-2 triangles, assuming convexity
    /// (non-convex input is undefined, no validation is attempted).
    ///
    /// Vertices are consumed alternately from the front and the back of the
    /// loop, each paired with the current front and back. Compared to a plain
    /// fan from vertex 0 this spreads the triangles across the polygon, which
    /// avoids long sliver triangles on elongated faces.
    pub fn triangulate(&mut self) {
        let mut pending: VecDeque<usize> = self.loop_verts.iter().copied().collect();
        self.tris.clear();

        let mut pop_front = true;
        while pending.len() > 3 {
            let v0 = if pop_front {
                pending.pop_front()
            } else {
                pending.pop_back()
            };
            let Some(v0) = v0 else { break };
            self.tris.push([v0, pending[0], pending[pending.len() - 1]]);
            pop_front = !pop_front;
        }
        self.tris.push([pending[0], pending[1], pending[2]]);
    }

    /// Tests the ray against this face's triangles, returning the hit point
    /// of the first triangle that reports one.
    ///
    /// Within a face this is not necessarily the nearest triangle; that only
    /// matters when a face self-overlaps after triangulation, which convex
    /// loops cannot do. Depth ordering across faces is handled by the mesh's
    /// nearest-hit pass.
    pub fn intersect(&self, verts: &[DVec3], orig: DVec3, dir: DVec3) -> Option<DVec3> {
        debug_assert!(!self.tris.is_empty(), "intersect called before triangulate");
        for tri in &self.tris {
            let hit = intersect::moller_trumbore(
                orig,
                dir,
                verts[tri[0]],
                verts[tri[1]],
                verts[tri[2]],
            );
            if let Some(hit) = hit {
                return Some(hit.point);
            }
        }
        None
    }
}
