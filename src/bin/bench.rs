//! This is a sample program that lays out graphs of growing size, so we can
//! see how the running time of a full simulation scales with the number of
//! nodes.

use forcelayout::adt::Graph;
use forcelayout::force::{ForceConfig, ForceFunction};
use forcelayout::topo::ForcedCalculator;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn test_main(n_node: usize, n_edge: usize) {
    let mut rng = SmallRng::seed_from_u64(n_node as u64);
    let mut g = Graph::with_nodes(n_node);
    for _ in 0..n_edge {
        let from = rng.gen_range(0..n_node);
        let to = rng.gen_range(0..n_node);
        g.add_edge(from, to);
    }
    g.set_random_positions(&mut rng, 1000., 1000.);

    let config = ForceConfig::new(
        ForceFunction::native(|d| 10000. / (d * d)),
        ForceFunction::native(|d| d / 10.),
    )
    .with_throttling(false)
    .with_seed(n_node as u64);
    let calc = ForcedCalculator::new(config);

    let t0 = std::time::Instant::now();
    let report = calc.run(&mut g);
    let duration = t0.elapsed();

    match report {
        Ok(report) => println!(
            "{} nodes, {} edges, {} passes: {:?}",
            n_node, n_edge, report.iterations, duration
        ),
        Err(err) => println!("{} nodes: {}", n_node, err),
    }
    println!("--------------------------------------");
}

fn main() {
    let n_edge = 16;
    for n_node in [16, 32, 64, 128, 256, 512, 1024] {
        test_main(n_node, n_edge);
    }
}
