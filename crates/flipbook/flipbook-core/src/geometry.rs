//! Geometry kernel: 4x4 homogeneous transforms for the turning page.
//!
//! Book-local space puts the spine at `x = 0`, measures x in page widths and y
//! in page heights (`0` at the top edge), with +z pointing at the reader.
//! Every function here is pure.

use std::f32::consts::PI;

use nalgebra::{Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::FlipError;
use crate::state::Stack;

const DETERMINANT_EPSILON: f32 = 1e-9;
const PERSPECTIVE_EPSILON: f32 = 1e-6;

/// Immutable 4x4 matrix, serialized column-major (CSS `matrix3d` order).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 16]", into = "[f32; 16]")]
pub struct TransformMatrix(Matrix4<f32>);

impl TransformMatrix {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)))
    }

    /// Rotation about the y axis. Negative angles lift +x toward the reader.
    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
            -s,  0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Self(m)
    }

    /// CSS `perspective(d)`: `w = 1 - z / d`. Non-positive distances disable it.
    pub fn perspective(distance: f32) -> Self {
        let mut m = Matrix4::identity();
        if distance.is_finite() && distance > 0.0 {
            m[(3, 2)] = -1.0 / distance;
        }
        Self(m)
    }

    pub fn determinant(&self) -> f32 {
        self.0.determinant()
    }

    pub fn as_matrix(&self) -> &Matrix4<f32> {
        &self.0
    }

    /// Column-major elements.
    pub fn to_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.0.as_slice());
        out
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f32; 16]> for TransformMatrix {
    fn from(cols: [f32; 16]) -> Self {
        Self(Matrix4::from_column_slice(&cols))
    }
}

impl From<TransformMatrix> for [f32; 16] {
    fn from(m: TransformMatrix) -> Self {
        m.to_array()
    }
}

/// Vertical hinge line at `x`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeAxis {
    pub x: f32,
}

impl EdgeAxis {
    pub const SPINE: EdgeAxis = EdgeAxis { x: 0.0 };
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// `a · b`: applies `b` first, then `a`.
#[inline]
pub fn compose(a: &TransformMatrix, b: &TransformMatrix) -> TransformMatrix {
    TransformMatrix(a.0 * b.0)
}

/// Compose a stack left to right (outermost first).
pub fn compose_all(stack: &[TransformMatrix]) -> TransformMatrix {
    stack
        .iter()
        .fold(TransformMatrix::identity(), |acc, m| compose(&acc, m))
}

pub fn invert(m: &TransformMatrix) -> Result<TransformMatrix, FlipError> {
    let determinant = m.determinant();
    if !determinant.is_finite() || determinant.abs() < DETERMINANT_EPSILON {
        return Err(FlipError::DegenerateTransform { determinant });
    }
    m.0.try_inverse()
        .map(TransformMatrix)
        .ok_or(FlipError::DegenerateTransform { determinant })
}

/// Rotation that lifts a page off the hinge at `edge`.
pub fn rotate_around_edge(angle: f32, edge: EdgeAxis) -> TransformMatrix {
    compose_all(&[
        TransformMatrix::translate(edge.x, 0.0, 0.0),
        TransformMatrix::rotate_y(angle),
        TransformMatrix::translate(-edge.x, 0.0, 0.0),
    ])
}

/// Angle of the y-axis rotation carried by `m`, in `(-PI, PI]`.
///
/// Translations and perspective rows do not affect the result.
pub fn rotation_about_y(m: &TransformMatrix) -> f32 {
    let r = m.as_matrix();
    let angle = r[(0, 2)].atan2(r[(0, 0)]);
    if angle <= -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Transform a point and apply the perspective divide when `w` is usable.
pub fn project(point: ScreenPoint, m: &TransformMatrix) -> ScreenPoint {
    let v = m.0 * Vector4::new(point.x, point.y, point.z, 1.0);
    if v.w.abs() < PERSPECTIVE_EPSILON {
        ScreenPoint {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    } else {
        ScreenPoint {
            x: v.x / v.w,
            y: v.y / v.w,
            z: v.z / v.w,
        }
    }
}

/// True when the unit XY plane faces away from the viewer after `m`.
pub fn backface_hidden(m: &TransformMatrix) -> bool {
    let at = |x, y| project(ScreenPoint { x, y, z: 0.0 }, m);
    let p0 = at(0.0, 0.0);
    let p1 = at(1.0, 0.0);
    let p2 = at(0.0, 1.0);

    let ux = [p1.x - p0.x, p1.y - p0.y];
    let uy = [p2.x - p0.x, p2.y - p0.y];
    ux[0] * uy[1] - ux[1] * uy[0] < 0.0
}

/// Hinge angle of a page leaving `from` at `progress`.
///
/// A flat right-hand page sits at 0 and a flat left-hand page at `-PI`, so
/// both directions lift the page toward the reader.
pub fn turn_angle(from: Stack, progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    match from {
        Stack::Right => -PI * p,
        Stack::Left => -PI * (1.0 - p),
    }
}

/// Flat placement of a page lying on `stack`.
pub fn flat_matrix(stack: Stack) -> TransformMatrix {
    match stack {
        Stack::Right => TransformMatrix::identity(),
        Stack::Left => rotate_around_edge(-PI, EdgeAxis::SPINE),
    }
}

/// Split a hinged page into `count` vertical strips bent by `bend` radians in total.
///
/// Strip `i` covers local `x` in `[0, 1/count]`; its matrix is chained onto the
/// previous strip's right seam so neighbouring strips stay joined.
pub fn bend_strips(hinge: &TransformMatrix, count: u32, bend: f32) -> Vec<TransformMatrix> {
    let count = count.max(1);
    let width = 1.0 / count as f32;
    let seam_angle = if count > 1 {
        bend / (count - 1) as f32
    } else {
        0.0
    };

    let mut strips = Vec::with_capacity(count as usize);
    let mut current = *hinge;
    for i in 0..count {
        if i > 0 {
            current = compose_all(&[
                current,
                TransformMatrix::translate(width, 0.0, 0.0),
                TransformMatrix::rotate_y(seam_angle),
            ]);
        }
        strips.push(current);
    }
    strips
}

/// Diffuse and specular terms for a strip rotated by `angle`.
///
/// Diffuse falls from 1 (facing the reader) to `ambient` (edge-on); the gloss
/// highlight peaks when the strip is 30 degrees off the view axis.
pub fn strip_lighting(angle: f32, ambient: f32, gloss: f32) -> (f32, f32) {
    let ambient = ambient.clamp(0.0, 1.0);
    let facing = angle.cos().abs();
    let diffuse = 1.0 - (1.0 - facing) * (1.0 - ambient);

    let lobe = |a: f32| a.cos().max(0.0).powi(200);
    let offset = PI / 6.0;
    let specular = gloss.max(0.0) * lobe(angle + offset).max(lobe(angle - offset));
    (diffuse, specular)
}
