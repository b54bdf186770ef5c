//! This module computes the forces that act on every node in one pass of the
//! simulation. There are four independent contributions:
//!  - repulsion between every pair of nodes,
//!  - attraction between the two ends of every edge,
//!  - repulsion from the four sides of the frame,
//!  - repulsion of nodes from the edges that they are not part of.
//!
//! All of them read a snapshot of the positions, and return one force per
//! node. Nothing is cached between passes.

#[cfg(feature = "log")]
extern crate log;

use super::config::Forces;
use super::function::ForceFunction;
use crate::core::geometry::{fuzzy_zero, Point, Segment, Vector};
use rand::Rng;

/// A large finite number that replaces zero distances and undefined
/// magnitudes.
pub const SENTINEL: f64 = i32::MAX as f64;

/// \returns \p distance, or the sentinel if the distance is zero.
fn guard_distance(distance: f64) -> f64 {
    if fuzzy_zero(distance) {
        return SENTINEL;
    }
    distance
}

/// Evaluate \p f and replace NaN and infinities with the sentinel.
fn magnitude(f: &ForceFunction, distance: f64) -> f64 {
    let m = f.evaluate(distance);
    if m.is_finite() {
        return m;
    }
    #[cfg(feature = "log")]
    log::trace!("Force at distance {} is {}, using the sentinel.", distance, m);
    SENTINEL
}

/// \returns a unit vector that points in a random direction.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector {
    Vector::unit().rotate_deg(rng.gen_range(0. ..360.))
}

/// \returns the edges whose ends are both in 0..nodes. The calculator
/// rejects graphs with other edges before it gets here.
fn valid_edges(edges: &[(usize, usize)], nodes: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    edges.iter().copied().filter(move |&(a, b)| a < nodes && b < nodes)
}

pub struct ForceModel<'a> {
    forces: &'a Forces,
}

impl<'a> ForceModel<'a> {
    pub fn new(forces: &'a Forces) -> Self {
        Self { forces }
    }

    /// The sum of all of the forces, for every node.
    pub fn net_forces<R: Rng + ?Sized>(
        &self,
        positions: &[Point],
        edges: &[(usize, usize)],
        rng: &mut R,
    ) -> Vec<Vector> {
        let attractive = self.attractive_forces(positions, edges, rng);
        let repulsive = self.repulsive_forces(positions);
        let frame = self.frame_forces(positions);
        let lines = self.line_forces(positions, edges, rng);

        (0..positions.len())
            .map(|i| attractive[i] + repulsive[i] + frame[i] + lines[i])
            .collect()
    }

    /// The force that every other node applies on \p target. Points away
    /// from the other nodes. Coincident nodes don't push each other.
    fn repulsion_on(&self, target: usize, positions: &[Point]) -> Vector {
        let me = positions[target];
        let mut force = Vector::zero();
        for (other, it) in positions.iter().enumerate() {
            if other == target {
                continue;
            }
            let direction = Vector::between(*it, me);
            let distance = guard_distance(direction.magnitude());
            let scalar = magnitude(&self.forces.repulsive, distance);
            force += direction / distance * scalar;
        }
        force
    }

    pub fn repulsive_forces(&self, positions: &[Point]) -> Vec<Vector> {
        let targets = 0..positions.len();
        // Every target owns its accumulator, so the targets can be computed
        // in parallel without synchronization.
        #[cfg(feature = "parallel")]
        let forces: Vec<Vector> = {
            use rayon::prelude::*;
            targets
                .into_par_iter()
                .map(|target| self.repulsion_on(target, positions))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let forces: Vec<Vector> = targets
            .map(|target| self.repulsion_on(target, positions))
            .collect();
        forces
    }

    /// Pull the two ends of every edge towards each other. Both ends get the
    /// same magnitude. If the ends are on top of each other then each end is
    /// sent in its own random direction.
    pub fn attractive_forces<R: Rng + ?Sized>(
        &self,
        positions: &[Point],
        edges: &[(usize, usize)],
        rng: &mut R,
    ) -> Vec<Vector> {
        let mut forces = vec![Vector::zero(); positions.len()];
        for (a, b) in valid_edges(edges, positions.len()) {
            let mut dir_a = Vector::between(positions[a], positions[b]);
            let mut dir_b = dir_a.neg();
            let mut distance = dir_a.magnitude();

            if fuzzy_zero(distance) {
                #[cfg(feature = "log")]
                log::trace!("Nodes {} and {} coincide.", a, b);
                distance = SENTINEL;
                dir_a = random_direction(rng);
                dir_b = random_direction(rng);
            } else {
                dir_a = dir_a / distance;
                dir_b = dir_b / distance;
            }

            let scalar = magnitude(&self.forces.attractive, distance);
            forces[a] += dir_a * scalar;
            forces[b] += dir_b * scalar;
        }
        forces
    }

    /// Push every node away from the four sides of the frame.
    pub fn frame_forces(&self, positions: &[Point]) -> Vec<Vector> {
        let frame = self.forces.frame;
        let f = &self.forces.frame_repulsive;
        let push = |distance: f64, direction: Vector| -> Vector {
            direction * magnitude(f, guard_distance(distance))
        };

        positions
            .iter()
            .map(|pos| {
                push(pos.y, Vector::new(0., 1.)) // From the top.
                    + push(frame.y - pos.y, Vector::new(0., -1.)) // Bottom.
                    + push(pos.x, Vector::new(1., 0.)) // Left.
                    + push(frame.x - pos.x, Vector::new(-1., 0.)) // Right.
            })
            .collect()
    }

    /// Push every node away from the nearest point of the edges that it is
    /// not part of.
    pub fn line_forces<R: Rng + ?Sized>(
        &self,
        positions: &[Point],
        edges: &[(usize, usize)],
        rng: &mut R,
    ) -> Vec<Vector> {
        let mut forces = vec![Vector::zero(); positions.len()];
        for (target, node) in positions.iter().enumerate() {
            for (a, b) in valid_edges(edges, positions.len()) {
                if target == a || target == b {
                    continue;
                }
                let section = Segment::new(positions[a], positions[b]);
                let nearest = section.nearest_point(*node);

                let mut direction = Vector::between(nearest, *node);
                let mut distance = direction.magnitude();
                if fuzzy_zero(distance) {
                    #[cfg(feature = "log")]
                    log::trace!("Node {} lies on edge ({}, {}).", target, a, b);
                    distance = SENTINEL;
                    direction = random_direction(rng);
                } else {
                    direction = direction / distance;
                }

                let scalar = magnitude(&self.forces.line_repulsive, distance);
                forces[target] += direction * scalar;
            }
        }
        forces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::config::ForceConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn forces(repulsive: &str, attractive: &str) -> Forces {
        ForceConfig::new(
            repulsive.parse().unwrap(),
            attractive.parse().unwrap(),
        )
        .with_frame_force("0".parse().unwrap())
        .with_line_force("0".parse().unwrap())
        .validate()
        .unwrap()
    }

    fn close(a: Vector, b: Vector) -> bool {
        (a - b).magnitude() < 1e-9
    }

    #[test]
    fn repulsion_points_away() {
        let f = forces("1000 / x", "0");
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(100., 100.), Point::new(110., 100.)];
        let r = model.repulsive_forces(&pos);
        assert!(close(r[0], Vector::new(-100., 0.)));
        assert!(close(r[1], Vector::new(100., 0.)));
    }

    #[test]
    fn coincident_nodes_stay_finite() {
        let f = forces("1 / x", "x");
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(300., 300.), Point::new(300., 300.)];
        let mut rng = SmallRng::seed_from_u64(1);
        let net = model.net_forces(&pos, &[(0, 1)], &mut rng);
        for v in net {
            assert!(v.x.is_finite() && v.y.is_finite());
        }
        // Coincident nodes don't repel.
        let r = model.repulsive_forces(&pos);
        assert_eq!(r[0], Vector::zero());
    }

    #[test]
    fn infinite_magnitude_is_bounded() {
        let f = forces("1 / 0", "0 / 0");
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(0., 0.), Point::new(3., 4.)];
        let r = model.repulsive_forces(&pos);
        assert!(close(r[1] / SENTINEL, Vector::new(0.6, 0.8)));
        // NaN is replaced too.
        let mut rng = SmallRng::seed_from_u64(9);
        let a = model.attractive_forces(&pos, &[(0, 1)], &mut rng);
        assert!(close(a[0] / SENTINEL, Vector::new(0.6, 0.8)));
    }

    #[test]
    fn attraction_is_symmetric() {
        let f = forces("0", "x / 10");
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(0., 0.), Point::new(0., 50.), Point::new(9., 9.)];
        let mut rng = SmallRng::seed_from_u64(7);
        let a = model.attractive_forces(&pos, &[(0, 1)], &mut rng);
        assert!(close(a[0], Vector::new(0., 5.)));
        assert!(close(a[1], Vector::new(0., -5.)));
        assert_eq!(a[2], Vector::zero());
    }

    #[test]
    fn attraction_of_coincident_nodes_is_random() {
        let f = forces("0", "1");
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(10., 10.), Point::new(10., 10.)];
        let mut rng = SmallRng::seed_from_u64(42);

        // Count the directions that land in each quadrant.
        let quadrant = |v: Vector| {
            let angle = v.y.atan2(v.x).rem_euclid(std::f64::consts::TAU);
            ((angle / std::f64::consts::FRAC_PI_2) as usize).min(3)
        };
        let mut quadrants = [[0usize; 4]; 2];
        // Both ends land in the same quadrant about a quarter of the time
        // if their directions are independent.
        let mut same = 0;
        let mut opposite = 0;
        let trials = 4000;
        for _ in 0..trials {
            let a = model.attractive_forces(&pos, &[(0, 1)], &mut rng);
            assert!((a[0].magnitude() - 1.).abs() < 1e-9);
            assert!((a[1].magnitude() - 1.).abs() < 1e-9);
            let (q0, q1) = (quadrant(a[0]), quadrant(a[1]));
            quadrants[0][q0] += 1;
            quadrants[1][q1] += 1;
            if q0 == q1 {
                same += 1;
            }
            if (a[0] + a[1]).magnitude() < 1e-6 {
                opposite += 1;
            }
        }
        for end in quadrants {
            for count in end {
                assert!(count > trials / 4 - 200 && count < trials / 4 + 200);
            }
        }
        assert!(same > trials / 4 - 200 && same < trials / 4 + 200);
        assert!(opposite < 10);
    }

    #[test]
    fn out_of_range_edges_are_ignored() {
        let f = forces("0", "x / 10");
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(0., 0.), Point::new(0., 50.)];
        let mut rng = SmallRng::seed_from_u64(3);
        let edges = [(0, 7), (9, 1), (0, 1)];
        let a = model.attractive_forces(&pos, &edges, &mut rng);
        assert!(close(a[0], Vector::new(0., 5.)));
        assert!(close(a[1], Vector::new(0., -5.)));
        let l = model.line_forces(&pos, &edges, &mut rng);
        assert_eq!(l, vec![Vector::zero(); 2]);
        assert_eq!(model.net_forces(&pos, &edges, &mut rng).len(), 2);
    }

    #[test]
    fn frame_pushes_inward() {
        let mut f = forces("0", "0");
        f.frame_repulsive = "100 / x".parse().unwrap();
        let model = ForceModel::new(&f);
        // Closer to the left and the top.
        let pos = vec![Point::new(100., 200.), Point::new(500., 500.)];
        let r = model.frame_forces(&pos);
        assert!(close(r[0], Vector::new(1. - 100. / 900., 0.5 - 100. / 800.)));
        assert!(close(r[1], Vector::zero()));
    }

    #[test]
    fn lines_push_nodes_off_edges() {
        let mut f = forces("0", "0");
        f.line_repulsive = "100 / x".parse().unwrap();
        let model = ForceModel::new(&f);
        let pos = vec![
            Point::new(0., 0.),
            Point::new(100., 0.),
            // Above the middle of the edge.
            Point::new(50., 10.),
            // Beyond the end of the edge.
            Point::new(130., -40.),
        ];
        let mut rng = SmallRng::seed_from_u64(3);
        let r = model.line_forces(&pos, &[(0, 1)], &mut rng);
        // The ends of the edge are not pushed by their own edge.
        assert_eq!(r[0], Vector::zero());
        assert_eq!(r[1], Vector::zero());
        assert!(close(r[2], Vector::new(0., 10.)));
        assert!(close(r[3], Vector::new(0.6, -0.8) * 2.));
    }

    #[test]
    fn node_on_an_edge_gets_a_random_push() {
        let mut f = forces("0", "0");
        f.line_repulsive = "1".parse().unwrap();
        let model = ForceModel::new(&f);
        let pos = vec![Point::new(0., 0.), Point::new(100., 0.), Point::new(40., 0.)];
        let mut rng = SmallRng::seed_from_u64(5);
        let r = model.line_forces(&pos, &[(0, 1)], &mut rng);
        assert!((r[2].magnitude() - 1.).abs() < 1e-9);
    }
}
