//! # Obstacle coupling
//!
//! Artificial potential field coupling term. Given the current state and an
//! obstacle it produces a corrective acceleration that rotates the velocity
//! away from the obstacle. The magnitude grows with the angle between the
//! velocity and the obstacle direction and decays with distance.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod geometry;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::{Rotation3, Unit, Vector3};
use std::f64::consts::FRAC_PI_2;

// Internal
use geometry::GeometryError;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Guards the angle and rotation axis calculations against near-zero norms.
pub const EPSILON: f64 = 1e-10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Coupling coefficients padded to the length the coupling term needs.
///
/// Build with [`CouplingGains::normalised`], which pads missing entries with
/// zeros and ignores extra ones.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CouplingGains {
    /// Angle coefficients: centroid (or point), nearest vertex
    pub beta: [f64; 2],

    /// Amplitudes: centroid (or point), nearest vertex, nearest vertex distance only
    pub gamma: [f64; 3],

    /// Distance coefficients, in the same order as `gamma`
    pub k: [f64; 3],

    /// Coupling scale per meter of obstacle extent
    pub scale_m: f64,

    /// Constant coupling scale
    pub scale_n: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An obstacle to avoid.
#[derive(Debug, Clone, PartialEq)]
pub enum Obstacle {
    None,

    /// A single point obstacle
    Point(Vector3<f64>),

    /// A sample of an obstacle's boundary
    Vertices(Vec<Vector3<f64>>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CouplingGains {
    pub fn normalised(beta: &[f64], gamma: &[f64], k: &[f64], scale_m: f64, scale_n: f64) -> Self {
        Self {
            beta: pad(beta),
            gamma: pad(gamma),
            k: pad(k),
            scale_m,
            scale_n,
        }
    }
}

impl Obstacle {
    /// Interpret a flat list of coordinates as an obstacle.
    ///
    /// Three values are a point, a larger multiple of three is a vertex list
    /// and anything else is no obstacle.
    pub fn from_flat(values: &[f64]) -> Self {
        match values.len() {
            0 => Obstacle::None,
            3 => Obstacle::Point(Vector3::new(values[0], values[1], values[2])),
            n if n % 3 == 0 => Obstacle::Vertices(
                values
                    .chunks(3)
                    .map(|c| Vector3::new(c[0], c[1], c[2]))
                    .collect(),
            ),
            n => {
                warn!(
                    "Obstacle has {} values which is not a multiple of 3, it will be ignored",
                    n
                );
                Obstacle::None
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Obstacle::None)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the coupling acceleration for position `x` moving at velocity `v`.
///
/// A vertex list obstacle sums three terms, all using the rotation toward the
/// centroid:
/// 1. the centroid term,
/// 2. a nearest vertex term using the nearest vertex's angle and distance,
/// 3. a nearest vertex term with no angular factor.
///
/// The sum is then scaled by the obstacle's bounding box as
/// `(n + m * ext_x, n + m * ext_y, n + m * ext_y)`. The z scale uses the y
/// extent.
pub fn apf_coupling(
    x: &Vector3<f64>,
    v: &Vector3<f64>,
    obstacle: &Obstacle,
    gains: &CouplingGains,
) -> Result<Vector3<f64>, GeometryError> {
    match obstacle {
        Obstacle::None => Ok(Vector3::zeros()),
        Obstacle::Point(o) => {
            let diff = o - x;
            let rot = rotation_away(&diff, v);

            Ok(angular_term(&rot, &diff, v, gains.gamma[0], gains.beta[0], gains.k[0]))
        }
        Obstacle::Vertices(vertices) => {
            let extents = geometry::bounding_box_extents(vertices)?;
            let centroid = geometry::centroid(vertices)?;
            let nearest = geometry::nearest_vertex(vertices, x)?;

            let centroid_diff = centroid - x;
            let nearest_diff = nearest - x;
            let rot = rotation_away(&centroid_diff, v);

            let mut coupling = angular_term(
                &rot,
                &centroid_diff,
                v,
                gains.gamma[0],
                gains.beta[0],
                gains.k[0],
            );
            coupling += angular_term(
                &rot,
                &nearest_diff,
                v,
                gains.gamma[1],
                gains.beta[1],
                gains.k[1],
            );
            coupling += gains.gamma[2] * (rot * v) * (-gains.k[2] * nearest_diff.norm()).exp();

            let scale = Vector3::new(
                gains.scale_n + gains.scale_m * extents.x,
                gains.scale_n + gains.scale_m * extents.y,
                gains.scale_n + gains.scale_m * extents.y,
            );

            Ok(coupling.component_mul(&scale))
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn pad<const N: usize>(values: &[f64]) -> [f64; N] {
    let mut padded = [0f64; N];
    for (p, v) in padded.iter_mut().zip(values.iter()) {
        *p = *v;
    }
    padded
}

/// Rotation by `pi/2 * |diff x v|` about `diff x v`.
///
/// If `diff` and `v` are parallel (or either is zero) there is no rotation.
fn rotation_away(diff: &Vector3<f64>, v: &Vector3<f64>) -> Rotation3<f64> {
    let axis = diff.cross(v);
    let angle = FRAC_PI_2 * axis.norm();

    match Unit::try_new(axis, EPSILON) {
        Some(axis) => Rotation3::from_axis_angle(&axis, angle),
        None => Rotation3::identity(),
    }
}

/// Angle between the velocity and the direction to the obstacle.
fn approach_angle(diff: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let cos_theta = diff.dot(v) / (diff.norm() * v.norm() + EPSILON);
    clamp(cos_theta, -1.0, 1.0).acos()
}

fn angular_term(
    rot: &Rotation3<f64>,
    diff: &Vector3<f64>,
    v: &Vector3<f64>,
    gamma: f64,
    beta: f64,
    k: f64,
) -> Vector3<f64> {
    let theta = approach_angle(diff, v);
    gamma * (rot * v) * theta * (-beta * theta).exp() * (-k * diff.norm()).exp()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_4;

    fn unit_gains() -> CouplingGains {
        CouplingGains::normalised(&[0.0, 0.0], &[1.0, 1.0, 1.0], &[0.0, 0.0, 0.0], 0.0, 1.0)
    }

    #[test]
    fn test_from_flat() {
        assert_eq!(Obstacle::from_flat(&[]), Obstacle::None);
        assert_eq!(
            Obstacle::from_flat(&[1.0, 2.0, 3.0]),
            Obstacle::Point(Vector3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            Obstacle::from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Obstacle::Vertices(vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0)])
        );
        assert!(Obstacle::from_flat(&[1.0, 2.0]).is_none());
        assert!(Obstacle::from_flat(&[1.0, 2.0, 3.0, 4.0]).is_none());
    }

    #[test]
    fn test_normalised_gains() {
        let gains = CouplingGains::normalised(&[0.5], &[1.0], &[2.0, 3.0, 4.0, 5.0], 0.1, 1.0);

        assert_eq!(gains.beta, [0.5, 0.0]);
        assert_eq!(gains.gamma, [1.0, 0.0, 0.0]);
        assert_eq!(gains.k, [2.0, 3.0, 4.0]);

        let empty = CouplingGains::normalised(&[], &[], &[], 0.0, 0.0);
        assert_eq!(empty.gamma, [0.0; 3]);
    }

    #[test]
    fn test_point_obstacle_deflects_velocity() {
        // Moving along +x with the obstacle ahead and to the left (+y), the
        // velocity is rotated toward -y
        let x = Vector3::zeros();
        let v = Vector3::new(1.0, 0.0, 0.0);
        let obstacle = Obstacle::Point(Vector3::new(1.0, 1.0, 0.0));

        let c = apf_coupling(&x, &v, &obstacle, &unit_gains()).unwrap();

        assert_abs_diff_eq!(c.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, -FRAC_PI_4, epsilon = 1e-6);
        assert_abs_diff_eq!(c.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_obstacle_decays_with_distance() {
        let x = Vector3::zeros();
        let v = Vector3::new(1.0, 0.0, 0.0);
        let gains = CouplingGains::normalised(&[1.0], &[1.0], &[1.0], 0.0, 1.0);

        let near = apf_coupling(&x, &v, &Obstacle::Point(Vector3::new(1.0, 0.5, 0.0)), &gains)
            .unwrap();
        let far = apf_coupling(&x, &v, &Obstacle::Point(Vector3::new(4.0, 2.0, 0.0)), &gains)
            .unwrap();

        assert!(near.norm() > far.norm());
    }

    #[test]
    fn test_zero_gamma_is_zero() {
        let x = Vector3::new(0.1, -0.3, 0.2);
        let v = Vector3::new(1.0, 0.5, -0.2);
        let gains =
            CouplingGains::normalised(&[3.0, 2.0], &[0.0, 0.0, 0.0], &[0.5, 1.0, 2.0], 1.0, 1.0);

        let obstacles = vec![
            Obstacle::Point(Vector3::new(1.0, 1.0, 0.0)),
            Obstacle::Point(Vector3::new(2.0, 0.65, -0.18)),
            Obstacle::Vertices(vec![
                Vector3::new(1.0, 1.0, 1.0),
                Vector3::new(2.0, 0.0, 1.0),
                Vector3::new(1.5, 2.0, -1.0),
            ]),
        ];

        for o in &obstacles {
            assert_eq!(apf_coupling(&x, &v, o, &gains).unwrap(), Vector3::zeros());
        }

        // A stationary state is also never deflected
        assert_eq!(
            apf_coupling(&x, &Vector3::zeros(), &obstacles[0], &unit_gains()).unwrap(),
            Vector3::zeros()
        );
    }

    #[test]
    fn test_vertex_scale_reuses_y_extent_for_z() {
        // Extents (2, 4, 6) centred on (1, 0, 1). Moving along +x the rotation
        // about +y swings the velocity into -z, so the z scale is observable.
        let vertices = Obstacle::Vertices(vec![
            Vector3::new(0.0, -2.0, -2.0),
            Vector3::new(2.0, 2.0, 4.0),
        ]);
        let x = Vector3::zeros();
        let v = Vector3::new(1.0, 0.0, 0.0);

        let unscaled =
            CouplingGains::normalised(&[0.2, 0.1], &[1.0, 0.5, 0.25], &[0.3, 0.2, 0.1], 0.0, 1.0);
        let scaled = CouplingGains {
            scale_m: 1.0,
            scale_n: 0.0,
            ..unscaled
        };

        let base = apf_coupling(&x, &v, &vertices, &unscaled).unwrap();
        let c = apf_coupling(&x, &v, &vertices, &scaled).unwrap();

        assert!(base.z.abs() > 1e-3);
        assert_abs_diff_eq!(c.x, base.x * 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, base.y * 4.0, epsilon = 1e-9);
        // Uses the y extent (4), not the z extent (6)
        assert_abs_diff_eq!(c.z, base.z * 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vertex_coupling_value() {
        // Planar triangle ahead of the state. Its centroid is (0.6, 0.3, 0)
        // and its nearest vertex is (0.5, 0.1, 0), with extents (0.5, 0.4, 0).
        let vertices = Obstacle::Vertices(vec![
            Vector3::new(0.5, 0.1, 0.0),
            Vector3::new(0.9, 0.3, 0.0),
            Vector3::new(0.4, 0.5, 0.0),
        ]);
        let x = Vector3::zeros();
        let v = Vector3::new(1.0, 0.0, 0.0);
        let gains =
            CouplingGains::normalised(&[2.0, 1.0], &[3.0, 5.0, 7.0], &[0.5, 1.5, 2.5], 2.0, 1.0);

        // All three terms share the rotation taken from the centroid, where
        // |centroid x v| = 0.3, turning v clockwise about z
        let phi = FRAC_PI_2 * 0.3;
        let (rv_x, rv_y) = (phi.cos(), -phi.sin());

        let theta_centroid = 0.3f64.atan2(0.6);
        let dist_centroid = 0.45f64.sqrt();
        let theta_nearest = 0.1f64.atan2(0.5);
        let dist_nearest = 0.26f64.sqrt();

        let magnitude = 3.0
            * theta_centroid
            * (-2.0 * theta_centroid).exp()
            * (-0.5 * dist_centroid).exp()
            + 5.0 * theta_nearest * (-theta_nearest).exp() * (-1.5 * dist_nearest).exp()
            + 7.0 * (-2.5 * dist_nearest).exp();

        let c = apf_coupling(&x, &v, &vertices, &gains).unwrap();

        // Scales are 1 + 2 * 0.5 in x and 1 + 2 * 0.4 in y
        assert_abs_diff_eq!(c.x, magnitude * rv_x * 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, magnitude * rv_y * 1.8, epsilon = 1e-9);
        assert_abs_diff_eq!(c.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_vertex_list_is_reported() {
        let gains = unit_gains();
        assert_eq!(
            apf_coupling(
                &Vector3::zeros(),
                &Vector3::new(1.0, 0.0, 0.0),
                &Obstacle::Vertices(Vec::new()),
                &gains
            ),
            Err(GeometryError::EmptyVertexList)
        );
    }
}
