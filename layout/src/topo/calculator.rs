//! This module contains the simulation driver. It owns the cooling schedule,
//! runs passes of the force model until the temperature drops to the floor
//! or someone asks it to stop, and writes the new positions back into the
//! graph.
//!
//! A run is a single task. It can run on the caller's thread (run), or on
//! one worker thread (spawn). The same calculator refuses to start a second
//! run while one is in progress. Cancellation is cooperative: the flag is
//! checked before every pass, and a pass that started is always completed.

#[cfg(feature = "log")]
extern crate log;

use crate::core::geometry::Vector;
use crate::core::graph::PositionedGraph;
use crate::error::{LayoutError, Result};
use crate::force::{ForceConfig, ForceModel, Forces};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A cloneable handle for cancelling a run from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the current (or the next) run to stop before its next pass.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    // Consume a pending request.
    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// The number of completed passes.
    pub iterations: usize,
    /// The temperature that the next pass would have used.
    pub final_temperature: f64,
    /// True if the run ended because of a stop request.
    pub cancelled: bool,
}

// Clears the running flag when the run ends, even by panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The force-directed layout calculator.
#[derive(Debug, Default)]
pub struct ForcedCalculator {
    config: ForceConfig,
    stop: StopHandle,
    running: AtomicBool,
}

impl ForcedCalculator {
    pub fn new(config: ForceConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next run.
    pub fn set_config(&mut self, config: ForceConfig) {
        self.config = config;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Lay out \p graph on the current thread. Blocks until the temperature
    /// reaches the floor or a stop is requested.
    /// \returns an error, without touching the graph, if the configuration
    /// is invalid, an edge is out of range, or another run is in progress.
    pub fn run<G: PositionedGraph + ?Sized>(&self, graph: &mut G) -> Result<RunReport> {
        let forces = match self.config.validate() {
            Ok(forces) => forces,
            Err(err) => {
                #[cfg(feature = "log")]
                log::error!("Refusing to start the layout: {}", err);
                return Err(err.into());
            }
        };
        check_edges(graph)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LayoutError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let mut rng = match self.config.random_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let schedule = forces.schedule;
        #[cfg(feature = "log")]
        log::info!(
            "Starting layout of {} nodes and {} edges. Temperature {:.3} -> {:.3}, {} passes.",
            graph.nodes_count(),
            graph.edges_count(),
            schedule.initial(),
            schedule.minimal(),
            schedule.iterations()
        );

        let mut report = RunReport {
            iterations: 0,
            final_temperature: schedule.initial(),
            cancelled: false,
        };
        for temperature in schedule.temperatures() {
            if self.stop.take() {
                report.cancelled = true;
                break;
            }
            step(&forces, temperature, graph, &mut rng);
            if let Some(delay) = forces.throttle {
                thread::sleep(delay);
            }
            report.iterations += 1;
            report.final_temperature = temperature / schedule.factor();
        }
        // A request that arrived after the last check belongs to this run.
        self.stop.clear();

        #[cfg(feature = "log")]
        log::info!(
            "Layout finished after {} passes (temperature {:.3}{}).",
            report.iterations,
            report.final_temperature,
            if report.cancelled { ", cancelled" } else { "" }
        );
        Ok(report)
    }

    /// Perform one pass at \p temperature with the current configuration.
    /// This is for callers that drive the simulation themselves; it does not
    /// look at the running flag or the stop flag.
    pub fn iteration<G, R>(&self, temperature: f64, graph: &mut G, rng: &mut R) -> Result<()>
    where
        G: PositionedGraph + ?Sized,
        R: Rng + ?Sized,
    {
        let forces = self.config.validate()?;
        iteration(&forces, temperature, graph, rng)
    }

    /// Run the layout on a new worker thread. The thread hands the graph
    /// back when it is done.
    pub fn spawn<G>(self: Arc<Self>, mut graph: G) -> JoinHandle<(G, Result<RunReport>)>
    where
        G: PositionedGraph + Send + 'static,
    {
        thread::spawn(move || {
            let result = self.run(&mut graph);
            (graph, result)
        })
    }
}

/// Check that every edge refers to existing nodes.
fn check_edges<G: PositionedGraph + ?Sized>(graph: &G) -> Result<()> {
    let nodes = graph.nodes_count();
    for edge in 0..graph.edges_count() {
        let (a, b) = graph.edge(edge);
        for node in [a, b] {
            if node >= nodes {
                return Err(LayoutError::InvalidEdge { edge, node, nodes });
            }
        }
    }
    Ok(())
}

/// Perform a single pass at \p temperature: compute the forces from the
/// current positions, move every node by at most the temperature along
/// each axis (towards the positive side; negative moves are not capped),
/// keep the node inside the frame, and commit the pass.
/// \returns an error, without touching the graph, if an edge is out of
/// range.
pub fn iteration<G, R>(forces: &Forces, temperature: f64, graph: &mut G, rng: &mut R) -> Result<()>
where
    G: PositionedGraph + ?Sized,
    R: Rng + ?Sized,
{
    check_edges(graph)?;
    step(forces, temperature, graph, rng);
    Ok(())
}

// The edges of the graph were checked.
fn step<G, R>(forces: &Forces, temperature: f64, graph: &mut G, rng: &mut R)
where
    G: PositionedGraph + ?Sized,
    R: Rng + ?Sized,
{
    let positions = graph.positions();
    let edges = graph.edges();
    let net = ForceModel::new(forces).net_forces(&positions, &edges, rng);
    let (lo, hi) = forces.bounds();

    for (node, (pos, force)) in positions.iter().zip(net).enumerate() {
        let delta = Vector::new(temperature.min(force.x), temperature.min(force.y));
        graph.set_node_position(node, pos.translate(delta).clamp(lo, hi));
    }
    graph.commit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adt::graph::Graph;
    use crate::core::geometry::Point;
    use crate::error::ConfigError;
    use crate::force::ForceFunction;

    fn config() -> ForceConfig {
        ForceConfig::new(
            ForceFunction::native(|d| 10000. / (d * d)),
            ForceFunction::native(|d| d / 10.),
        )
        .with_throttling(false)
        .with_seed(17)
    }

    #[test]
    fn invalid_config_is_a_no_op() {
        let mut g = Graph::new();
        g.add_node("a", Point::new(10., 10.));
        let mut c = config();
        c.attractive_force = None;
        let calc = ForcedCalculator::new(c);
        let err = calc.run(&mut g).unwrap_err();
        assert_eq!(err, LayoutError::Config(ConfigError::MissingAttractiveForce));
        assert_eq!(g.node(0).position, Point::new(10., 10.));
        assert_eq!(g.passes(), 0);
        assert!(!calc.is_running());
    }

    #[test]
    fn invalid_edge_is_rejected() {
        let mut g = Graph::with_nodes(2);
        g.add_edge_unchecked(0, 5);
        let calc = ForcedCalculator::new(config());
        let err = calc.run(&mut g).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidEdge {
                edge: 0,
                node: 5,
                nodes: 2
            }
        );
        assert_eq!(g.passes(), 0);
    }

    #[test]
    fn single_pass_rejects_invalid_edge() {
        let forces = config().validate().unwrap();
        let mut g = Graph::with_nodes(2);
        g.set_node_position(1, Point::new(300., 300.));
        g.add_edge_unchecked(0, 7);
        let mut rng = SmallRng::seed_from_u64(2);
        let err = iteration(&forces, 5., &mut g, &mut rng).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidEdge {
                edge: 0,
                node: 7,
                nodes: 2
            }
        );
        assert_eq!(g.node(0).position, Point::zero());
        assert_eq!(g.node(1).position, Point::new(300., 300.));
        assert_eq!(g.passes(), 0);

        let calc = ForcedCalculator::new(config());
        assert!(calc.iteration(5., &mut g, &mut rng).is_err());
        assert_eq!(g.passes(), 0);
    }

    #[test]
    fn run_counts_passes() {
        let mut g = Graph::with_nodes(3);
        g.add_edge(0, 1);
        let calc = ForcedCalculator::new(config());
        let report = calc.run(&mut g).unwrap();
        let schedule = calc.config().validate().unwrap().schedule;
        assert_eq!(report.iterations, schedule.iterations());
        assert_eq!(g.passes(), report.iterations);
        assert!(report.final_temperature <= 10.);
        assert!(!report.cancelled);
        assert!(!calc.is_running());
    }

    #[test]
    fn stop_before_run_cancels_immediately() {
        let mut g = Graph::with_nodes(2);
        let calc = ForcedCalculator::new(config());
        calc.request_stop();
        let report = calc.run(&mut g).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.iterations, 0);
        assert_eq!(g.passes(), 0);
        // The request was consumed.
        assert!(!calc.stop_handle().is_stop_requested());
        let report = calc.run(&mut g).unwrap();
        assert!(!report.cancelled);
    }

    #[test]
    fn step_moves_at_most_the_temperature() {
        let forces = config().validate().unwrap();
        let mut g = Graph::new();
        g.add_node("a", Point::new(500., 500.));
        g.add_node("b", Point::new(501., 500.));
        let mut rng = SmallRng::seed_from_u64(1);
        iteration(&forces, 3., &mut g, &mut rng).unwrap();
        // 'b' is pushed to the right by a large force, but only moves 3.
        assert_eq!(g.node(1).position.x, 504.);
        // 'a' is pushed to the left, and that move is not capped.
        assert!(g.node(0).position.x < 497.);
        assert_eq!(g.passes(), 1);
    }

    #[test]
    fn positions_are_clamped_to_the_frame() {
        let forces = config().validate().unwrap();
        let mut g = Graph::new();
        g.add_node("a", Point::new(-100., 2000.));
        g.add_node("b", Point::new(f64::NAN, 500.));
        let mut rng = SmallRng::seed_from_u64(1);
        iteration(&forces, 1., &mut g, &mut rng).unwrap();
        for i in 0..2 {
            let p = g.node(i).position;
            assert!(p.x >= 50. && p.x <= 950., "{}", p);
            assert!(p.y >= 50. && p.y <= 950., "{}", p);
        }
    }

    #[test]
    fn single_step_checks_the_config() {
        let mut g = Graph::with_nodes(2);
        g.set_node_position(1, Point::new(300., 300.));
        let mut rng = SmallRng::seed_from_u64(4);
        let calc = ForcedCalculator::new(config());
        calc.iteration(5., &mut g, &mut rng).unwrap();
        assert_eq!(g.passes(), 1);

        let calc = ForcedCalculator::new(config().with_node_size(f64::NAN, 1.));
        assert!(calc.iteration(5., &mut g, &mut rng).is_err());
        assert_eq!(g.passes(), 1);
    }
}
