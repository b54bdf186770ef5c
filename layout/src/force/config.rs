//! The user-facing configuration of a force-directed layout, and its
//! validated form.

use super::function::ForceFunction;
use crate::core::geometry::Point;
use crate::error::ConfigError;
use crate::topo::schedule::CoolingSchedule;
use std::time::Duration;

/// Edge-proximity repulsion defaults to the node repulsion divided by this.
pub const LINES_REPULSIVE_DIVISOR: f64 = 10.;
/// Frame repulsion defaults to the node repulsion divided by this.
pub const FRAME_REPULSIVE_DIVISOR: f64 = 7.;
pub const MINIMAL_TEMPERATURE: f64 = 10.;
pub const COOLING_FACTOR: f64 = 1.01;
pub const THROTTLE_DELAY: Duration = Duration::from_millis(1);

/// Describes the forces, the sizes and the cooling schedule of a layout.
/// The node position is the center of the node, and the frame spans
/// (0, 0) .. (frame_width, frame_height).
#[derive(Debug, Clone)]
pub struct ForceConfig {
    /// Node to node repulsion. Required.
    pub repulsive_force: Option<ForceFunction>,
    /// Attraction along the edges. Required.
    pub attractive_force: Option<ForceFunction>,
    /// Repulsion from the four sides of the frame.
    pub frame_repulsive_force: Option<ForceFunction>,
    /// Repulsion of nodes from edges that they are not part of.
    pub line_repulsive_force: Option<ForceFunction>,

    pub node_width: f64,
    pub node_height: f64,
    pub frame_width: f64,
    pub frame_height: f64,

    /// Sleep for `throttle_delay` after every pass, so that observers are
    /// not flooded with updates.
    pub enable_throttling: bool,
    pub throttle_delay: Duration,

    /// Defaults to the diagonal of the frame.
    pub initial_temperature: Option<f64>,
    pub minimal_temperature: f64,
    pub cooling_factor: f64,

    /// Seed for the random directions that break up coincident nodes. Runs
    /// with the same seed are reproducible.
    pub random_seed: Option<u64>,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            repulsive_force: None,
            attractive_force: None,
            frame_repulsive_force: None,
            line_repulsive_force: None,
            node_width: 100.,
            node_height: 100.,
            frame_width: 1000.,
            frame_height: 1000.,
            enable_throttling: true,
            throttle_delay: THROTTLE_DELAY,
            initial_temperature: None,
            minimal_temperature: MINIMAL_TEMPERATURE,
            cooling_factor: COOLING_FACTOR,
            random_seed: None,
        }
    }
}

impl ForceConfig {
    pub fn new(repulsive: ForceFunction, attractive: ForceFunction) -> Self {
        Self {
            repulsive_force: Some(repulsive),
            attractive_force: Some(attractive),
            ..Self::default()
        }
    }

    pub fn with_frame_force(mut self, f: ForceFunction) -> Self {
        self.frame_repulsive_force = Some(f);
        self
    }

    pub fn with_line_force(mut self, f: ForceFunction) -> Self {
        self.line_repulsive_force = Some(f);
        self
    }

    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    pub fn with_frame_size(mut self, width: f64, height: f64) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self
    }

    pub fn with_throttling(mut self, enable: bool) -> Self {
        self.enable_throttling = enable;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_schedule(
        mut self,
        initial: Option<f64>,
        minimal: f64,
        cooling_factor: f64,
    ) -> Self {
        self.initial_temperature = initial;
        self.minimal_temperature = minimal;
        self.cooling_factor = cooling_factor;
        self
    }

    /// \returns the length of the frame diagonal.
    pub fn frame_diagonal(&self) -> f64 {
        self.frame_width.hypot(self.frame_height)
    }

    /// Check the configuration and resolve the defaults.
    pub fn validate(&self) -> Result<Forces, ConfigError> {
        let extents = [
            ("node width", self.node_width),
            ("node height", self.node_height),
            ("frame width", self.frame_width),
            ("frame height", self.frame_height),
        ];
        for (name, value) in extents {
            // Written this way to reject NaN too.
            if !(value >= 0.) {
                return Err(ConfigError::NegativeExtent { name, value });
            }
        }

        let repulsive = self
            .repulsive_force
            .clone()
            .ok_or(ConfigError::MissingRepulsiveForce)?;
        let attractive = self
            .attractive_force
            .clone()
            .ok_or(ConfigError::MissingAttractiveForce)?;
        let frame_repulsive = match &self.frame_repulsive_force {
            Some(f) => f.clone(),
            None => repulsive.divided_by(FRAME_REPULSIVE_DIVISOR),
        };
        let line_repulsive = match &self.line_repulsive_force {
            Some(f) => f.clone(),
            None => repulsive.divided_by(LINES_REPULSIVE_DIVISOR),
        };

        let initial = self.initial_temperature.unwrap_or_else(|| self.frame_diagonal());
        if !(initial.is_finite() && initial >= 0.) {
            return Err(ConfigError::Temperature {
                name: "initial temperature",
                value: initial,
            });
        }
        // The schedule never reaches a zero floor.
        let minimal = self.minimal_temperature;
        if !(minimal.is_finite() && minimal > 0.) {
            return Err(ConfigError::Temperature {
                name: "minimal temperature",
                value: minimal,
            });
        }
        if !(self.cooling_factor.is_finite() && self.cooling_factor > 1.) {
            return Err(ConfigError::CoolingFactor(self.cooling_factor));
        }

        Ok(Forces {
            repulsive,
            attractive,
            frame_repulsive,
            line_repulsive,
            frame: Point::new(self.frame_width, self.frame_height),
            node: Point::new(self.node_width, self.node_height),
            schedule: CoolingSchedule::new(
                initial,
                self.minimal_temperature,
                self.cooling_factor,
            ),
            throttle: if self.enable_throttling {
                Some(self.throttle_delay)
            } else {
                None
            },
        })
    }
}

/// A validated configuration: every force function is present, and the
/// sizes and the schedule make sense.
#[derive(Debug, Clone)]
pub struct Forces {
    pub repulsive: ForceFunction,
    pub attractive: ForceFunction,
    pub frame_repulsive: ForceFunction,
    pub line_repulsive: ForceFunction,
    /// Width and height of the frame.
    pub frame: Point,
    /// Width and height of a node.
    pub node: Point,
    pub schedule: CoolingSchedule,
    pub throttle: Option<Duration>,
}

impl Forces {
    /// \returns the rectangle that node centers are kept in.
    pub fn bounds(&self) -> (Point, Point) {
        let half = Point::new(self.node.x / 2., self.node.y / 2.);
        let lo = half;
        let hi = Point::new(self.frame.x - half.x, self.frame.y - half.y);
        (lo, hi)
    }
}

#[cfg(test)]
fn simple_config() -> ForceConfig {
    ForceConfig::new(
        ForceFunction::native(|d| 1000. / d),
        ForceFunction::native(|d| d / 10.),
    )
}

#[test]
fn test_validate_defaults() {
    let forces = simple_config().validate().unwrap();
    // The derived forces are weaker versions of the node repulsion.
    assert_eq!(forces.frame_repulsive.evaluate(10.), 100. / 7.);
    assert_eq!(forces.line_repulsive.evaluate(10.), 10.);
    assert_eq!(forces.schedule.initial(), 1000_f64.hypot(1000.));
    assert_eq!(forces.schedule.minimal(), 10.);
    assert_eq!(forces.bounds(), (Point::splat(50.), Point::splat(950.)));
    assert_eq!(forces.throttle, Some(THROTTLE_DELAY));

    let explicit = simple_config()
        .with_frame_force(ForceFunction::native(|_| 1.))
        .with_throttling(false)
        .validate()
        .unwrap();
    assert_eq!(explicit.frame_repulsive.evaluate(10.), 1.);
    assert_eq!(explicit.throttle, None);
}

#[test]
fn test_validate_errors() {
    let err = ForceConfig::default().validate().unwrap_err();
    assert_eq!(err, ConfigError::MissingRepulsiveForce);

    let mut config = simple_config();
    config.attractive_force = None;
    assert_eq!(config.validate().unwrap_err(), ConfigError::MissingAttractiveForce);

    let err = simple_config().with_node_size(-1., 5.).validate().unwrap_err();
    assert_eq!(
        err,
        ConfigError::NegativeExtent {
            name: "node width",
            value: -1.
        }
    );
    let err = simple_config().with_frame_size(5., -3.).validate().unwrap_err();
    assert!(matches!(err, ConfigError::NegativeExtent { name: "frame height", .. }));

    let err = simple_config().with_schedule(None, 10., 1.).validate().unwrap_err();
    assert_eq!(err, ConfigError::CoolingFactor(1.));
    let err = simple_config()
        .with_schedule(Some(f64::INFINITY), 10., 1.01)
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Temperature { .. }));

    for minimal in [0., -1., f64::NAN] {
        let err = simple_config()
            .with_schedule(None, minimal, 1.01)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Temperature {
                name: "minimal temperature",
                ..
            }
        ));
    }
    // Any positive floor is fine.
    let forces = simple_config().with_schedule(Some(1.), 1e-9, 2.).validate().unwrap();
    assert_eq!(forces.schedule.iterations(), 30);
}
