use forcelayout::adt::{Graph, ObservedGraph};
use forcelayout::core::geometry::Point;
use forcelayout::core::graph::PositionedGraph;
use forcelayout::force::{ForceConfig, ForceFunction};
use forcelayout::topo::{ForcedCalculator, StopHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use forcelayout::error::{ConfigError, ExprError, LayoutError};
    use forcelayout::expr::Expression;
    use forcelayout::force::ForceModel;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn standard_config() -> ForceConfig {
        ForceConfig::new(
            "10000 / x^2".parse().unwrap(),
            "x / 10".parse().unwrap(),
        )
        .with_throttling(false)
        .with_seed(1)
    }

    fn pairwise_sum(positions: &[Point]) -> f64 {
        let mut sum = 0.;
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                sum += positions[i].distance_to(positions[j]);
            }
        }
        sum
    }

    /// Wraps a graph and runs a check after every committed pass.
    struct Inspected<F: FnMut(usize, &[Point])> {
        graph: Graph,
        passes: usize,
        check: F,
    }

    impl<F: FnMut(usize, &[Point])> PositionedGraph for Inspected<F> {
        fn nodes_count(&self) -> usize {
            self.graph.nodes_count()
        }
        fn edges_count(&self) -> usize {
            self.graph.edges_count()
        }
        fn edge(&self, index: usize) -> (usize, usize) {
            self.graph.edge(index)
        }
        fn node_position(&self, index: usize) -> Point {
            self.graph.node_position(index)
        }
        fn set_node_position(&mut self, index: usize, position: Point) {
            self.graph.set_node_position(index, position)
        }
        fn commit(&mut self) {
            self.graph.commit();
            self.passes += 1;
            let positions = self.graph.positions();
            (self.check)(self.passes, &positions);
        }
    }

    fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
        let start = Instant::now();
        while !cond() {
            assert!(start.elapsed() < Duration::from_secs(30), "{}", what);
            thread::sleep(Duration::from_micros(100));
        }
    }

    #[test]
    fn test_expressions() {
        let e = Expression::compile("2+3*4").unwrap();
        assert_eq!(e.evaluate(0.), 14.);
        assert_eq!(e.evaluate(-7.), 14.);
        assert_eq!(Expression::compile("(2+3)*4").unwrap().evaluate(1.), 20.);
        assert!(Expression::compile("sin(x)").unwrap().evaluate(0.).abs() < 1e-9);
        assert_eq!(Expression::compile("x^2").unwrap().evaluate(3.), 9.);

        assert_eq!(Expression::compile(""), Err(ExprError::Empty));
        assert!(Expression::compile("(x").is_err());
        assert!(Expression::compile("x +").is_err());
        assert!("1 / x".parse::<ForceFunction>().is_ok());
    }

    #[test]
    fn test_positions_stay_in_frame() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut graph = Graph::with_nodes(20);
        for _ in 0..30 {
            let a = rng.gen_range(0..20);
            let b = rng.gen_range(0..20);
            graph.add_edge(a, b);
        }
        // Start some of the nodes outside of the frame.
        graph.set_random_positions(&mut rng, 1500., 1500.);

        let config = standard_config().with_frame_size(800., 600.).with_node_size(40., 20.);
        let mut violations = 0;
        let mut inspected = Inspected {
            graph,
            passes: 0,
            check: |_: usize, positions: &[Point]| {
                for p in positions {
                    if !(p.x >= 20. && p.x <= 780. && p.y >= 10. && p.y <= 590.) {
                        violations += 1;
                    }
                }
            },
        };
        let report = ForcedCalculator::new(config).run(&mut inspected).unwrap();
        assert!(report.iterations > 0);
        assert_eq!(inspected.passes, report.iterations);
        drop(inspected);
        assert_eq!(violations, 0);
    }

    #[test]
    fn test_iteration_count() {
        let config = standard_config().with_schedule(Some(100.), 1., 2.);
        let calc = ForcedCalculator::new(config);
        let mut graph = Graph::with_nodes(3);
        let report = calc.run(&mut graph).unwrap();
        // ceil(log(100 / 1) / log(2)) = 7.
        assert_eq!(report.iterations, 7);
        assert_eq!(graph.passes(), 7);
        assert_eq!(report.final_temperature, 100. / 128.);

        // The default schedule cools from the frame diagonal to 10.
        let calc = ForcedCalculator::new(standard_config());
        let report = calc.run(&mut Graph::with_nodes(2)).unwrap();
        let expected = (1000_f64.hypot(1000.) / 10.).ln() / 1.01_f64.ln();
        assert_eq!(report.iterations, expected.ceil() as usize);
    }

    #[test]
    fn test_coincident_nodes() {
        let config = ForceConfig::new(
            "1 / x".parse().unwrap(),
            "x / 10".parse().unwrap(),
        )
        .with_throttling(false)
        .with_seed(9);

        let forces = config.validate().unwrap();
        let model = ForceModel::new(&forces);
        let positions = vec![Point::new(500., 500.), Point::new(500., 500.)];
        let mut rng = SmallRng::seed_from_u64(0);
        for f in model.net_forces(&positions, &[], &mut rng) {
            assert!(f.x.is_finite() && f.y.is_finite());
        }

        let mut graph = Graph::new();
        graph.add_node("a", Point::new(500., 500.));
        graph.add_node("b", Point::new(500., 500.));
        graph.add_edge(0, 1);
        ForcedCalculator::new(config).run(&mut graph).unwrap();
        for p in graph.positions() {
            assert!(p.is_finite());
            assert!(p.x >= 50. && p.x <= 950. && p.y >= 50. && p.y <= 950.);
        }
    }

    #[test]
    fn test_two_nodes_converge() {
        let mut graph = Graph::new();
        graph.add_node("a", Point::new(250., 500.));
        graph.add_node("b", Point::new(750., 500.));
        graph.add_edge(0, 1);

        let report = ForcedCalculator::new(standard_config()).run(&mut graph).unwrap();
        assert!(report.final_temperature <= 10.);

        let a = graph.node(0).position;
        let b = graph.node(1).position;
        for p in [a, b] {
            assert!(p.x >= 50. && p.x <= 950. && p.y >= 50. && p.y <= 950.);
        }
        // At rest the attraction balances the repulsion: d / 10 = 10000 / d^2.
        let d = a.distance_to(b);
        let attraction = d / 10.;
        let repulsion = 10000. / (d * d);
        assert!((attraction - repulsion).abs() / repulsion < 0.05, "d = {}", d);
    }

    #[test]
    fn test_nodes_spread_apart() {
        let mut graph = Graph::new();
        for (x, y) in [(480., 480.), (520., 480.), (500., 520.), (470., 510.), (530., 515.)] {
            graph.add_node("n", Point::new(x, y));
        }
        let start = pairwise_sum(&graph.positions());

        let mut history = vec![start];
        let mut inspected = Inspected {
            graph,
            passes: 0,
            check: |_: usize, positions: &[Point]| history.push(pairwise_sum(positions)),
        };
        ForcedCalculator::new(standard_config()).run(&mut inspected).unwrap();
        drop(inspected);

        for pair in history.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-6, "{} -> {}", pair[0], pair[1]);
        }
        assert!(history[history.len() - 1] > 4. * start);
    }

    #[test]
    fn test_stop_from_commit() {
        let calc = ForcedCalculator::new(standard_config());
        let stop: StopHandle = calc.stop_handle();
        let mut committed: Vec<Point> = Vec::new();
        let mut graph = Graph::with_nodes(6);
        graph.set_random_positions(&mut SmallRng::seed_from_u64(5), 1000., 1000.);
        let mut inspected = Inspected {
            graph,
            passes: 0,
            check: |pass: usize, positions: &[Point]| {
                committed = positions.to_vec();
                if pass == 5 {
                    stop.request_stop();
                }
            },
        };
        let report = calc.run(&mut inspected).unwrap();
        assert!(report.cancelled);
        // The pass that was running completed, and no new pass started.
        assert_eq!(report.iterations, 5);
        assert_eq!(inspected.passes, 5);
        let last = inspected.graph.positions();
        drop(inspected);
        assert_eq!(last, committed);
        assert!(!calc.is_running());
    }

    #[test]
    fn test_stop_worker_thread() {
        // A long, throttled schedule, so that the run is still going when
        // the stop arrives.
        let config = standard_config()
            .with_throttling(true)
            .with_schedule(Some(1000.), 0.001, 1.01);
        let calc = Arc::new(ForcedCalculator::new(config));

        let mut graph = Graph::with_nodes(8);
        graph.set_random_positions(&mut SmallRng::seed_from_u64(8), 1000., 1000.);
        let observed = ObservedGraph::new(graph);
        let snapshot = observed.snapshot();
        let handle = calc.clone().spawn(observed);

        wait_for("no pass was committed", || snapshot.latest().pass >= 3);
        assert!(calc.is_running());

        // A second run on the same calculator is refused.
        let mut other = Graph::with_nodes(2);
        assert_eq!(calc.run(&mut other), Err(LayoutError::AlreadyRunning));
        assert_eq!(other.passes(), 0);

        calc.request_stop();
        let (observed, report) = handle.join().unwrap();
        let report = report.unwrap();
        assert!(report.cancelled);
        assert!(!calc.is_running());

        // The last published frame is the final layout.
        let frame = snapshot.latest();
        assert_eq!(frame.pass, report.iterations);
        assert_eq!(*frame.positions, observed.positions());
        assert_eq!(observed.into_inner().passes(), report.iterations);
    }

    #[test]
    fn test_refused_run_leaves_graph_alone() {
        let mut graph = Graph::new();
        graph.add_node("a", Point::new(1., 2.));
        graph.add_node("b", Point::new(3., 4.));
        graph.add_edge(0, 1);
        let before = graph.positions();

        let calc = ForcedCalculator::new(standard_config().with_frame_size(-5., 10.));
        let err = calc.run(&mut graph).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Config(ConfigError::NegativeExtent {
                name: "frame width",
                value: -5.
            })
        );
        assert_eq!(graph.positions(), before);
        assert_eq!(graph.passes(), 0);
    }
}
