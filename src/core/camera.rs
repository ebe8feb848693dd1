use glam::DVec3;
use rayon::prelude::*;

use crate::core::canvas::Canvas;
use crate::core::mesh::Mesh;

/// Glyphs from visually densest to lightest; brightness indexes into this.
const BRUSH: &[u8] = b"$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,^`'.";

/// Brightness of a pixel whose ray missed the mesh. Distinguishable from any
/// finite shading value.
const MISS: f64 = f64::NEG_INFINITY;

/// A viewpoint looking at the world origin, with the orthonormal view-plane
/// basis derived from it, a light source, and the canvas it renders into.
pub struct Camera {
    origin: DVec3,
    /// Anchor point on the view plane, one unit toward the scene.
    view_point: DVec3,
    basis_u: DVec3,
    basis_v: DVec3,
    light: DVec3,
    canvas: Canvas,
}

impl Camera {
    pub fn new(origin: DVec3, canvas: Canvas) -> Self {
        let (view_point, basis_u, basis_v, light) = orient(origin);
        Self {
            origin,
            view_point,
            basis_u,
            basis_v,
            light,
            canvas,
        }
    }

    /// Moves the camera; the basis, view plane, and light are functions of
    /// the origin, so they are all rebuilt.
    pub fn set_origin(&mut self, origin: DVec3) {
        self.origin = origin;
        (self.view_point, self.basis_u, self.basis_v, self.light) = orient(origin);
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Casts one ray per canvas cell against the mesh and paints the result.
    ///
    /// The pixel pass is embarrassingly parallel: the mesh is borrowed
    /// immutably for the whole pass, each pixel produces exactly one slot of
    /// the stroke buffer, and the min/max reduction in [`Camera::paint`] runs
    /// over the complete buffer afterwards. Rows are farmed out to rayon.
    pub fn ray_trace(&mut self, mesh: &Mesh) {
        let rows = self.canvas.rows();
        let cols = self.canvas.cols();
        let s1: Vec<f64> = (0..rows).map(|i| self.canvas.ndc_y(i)).collect();
        let s2: Vec<f64> = (0..cols).map(|j| self.canvas.ndc_x(j)).collect();

        let origin = self.origin;
        let view_point = self.view_point;
        let basis_u = self.basis_u;
        let basis_v = self.basis_v;
        let light = self.light;

        let strokes: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map_iter(|i| {
                let s2 = &s2;
                let row_s1 = s1[i];
                (0..cols).map(move |j| {
                    let dir = (view_point + row_s1 * basis_u + s2[j] * basis_v) - origin;
                    match mesh.intersect(origin, dir) {
                        Some(hit) => {
                            let incident = -dir.normalize();
                            let to_light = (light - hit.point).normalize();
                            // Half-vector approximation; normalize_or_zero so
                            // an exactly opposed light/incident pair shades to
                            // zero instead of NaN.
                            let half = (incident / 2.0 + to_light / 2.0).normalize_or_zero();
                            hit.normal.dot(half)
                        }
                        None => MISS,
                    }
                })
            })
            .collect();

        self.paint(&strokes);
    }

    /// Maps the stroke buffer onto glyphs. Brightness is normalized against
    /// the frame's own min/max so every frame uses the full ramp; misses stay
    /// blank. With no brightness variation at all (a single hit, or uniform
    /// shading) every hit pixel gets the densest glyph instead of dividing by
    /// zero.
    fn paint(&mut self, strokes: &[f64]) {
        let mut brightest = f64::NEG_INFINITY;
        let mut darkest = f64::INFINITY;
        for &shine in strokes {
            if shine.is_finite() {
                brightest = brightest.max(shine);
                darkest = darkest.min(shine);
            }
        }
        let range = brightest - darkest;

        let cols = self.canvas.cols();
        for (idx, &shine) in strokes.iter().enumerate() {
            let ch = if shine == MISS {
                ' '
            } else if range <= 0.0 {
                BRUSH[0] as char
            } else {
                let inter = (brightest - shine) / range;
                let pick = (inter * BRUSH.len() as f64) as usize;
                BRUSH[pick.min(BRUSH.len() - 1)] as char
            };
            self.canvas.draw(ch, idx / cols, idx % cols);
        }
    }
}

/// Derives the view geometry for an origin that looks at the world origin:
/// the view-plane anchor one unit along the forward direction, the
/// orthonormal basis spanning the view plane (world z projected out of
/// forward, and its cross product), and the light source as the fixed
/// (y, -x, z) permutation of the origin.
fn orient(origin: DVec3) -> (DVec3, DVec3, DVec3, DVec3) {
    let forward = origin.normalize();
    let up = DVec3::Z;
    let basis_u = (up - up.dot(forward) * forward).normalize();
    let basis_v = forward.cross(basis_u).normalize();
    let light = DVec3::new(origin.y, -origin.x, origin.z);
    (origin - forward, basis_u, basis_v, light)
}
