/*!
This crate provides a force-directed (spring) layout for graphs. Nodes push
each other away, edges pull their endpoints together, the sides of the frame
push nodes inward and edges push away the nodes that they do not connect.
The simulation runs under a cooling schedule: the temperature bounds how far
a node may move in one pass, and it decays until it reaches a floor.

The force magnitudes are functions of distance. They can be Rust closures,
or expressions that are compiled from text like "1000 / x^2".

The project also comes with a command line utility that lays out edge-list
files, and prints the node positions.

# Expression example: compile and evaluate a force

```rust
    use forcelayout::expr::{self, Expression};

    let force = Expression::compile("10000 / x^2").unwrap();
    assert_eq!(force.evaluate(10.), 100.);

    // Print the compiled program.
    expr::dump_rpn(&force);

    // Malformed expressions are rejected, with a readable error message.
    let mut parser = expr::ExprParser::new("3 * (x + 1");
    if parser.process().is_err() {
        parser.print_error();
    }
```

# Layout example: place a small graph

```rust
    use forcelayout::adt::Graph;
    use forcelayout::core::geometry::Point;
    use forcelayout::force::{ForceConfig, ForceFunction};
    use forcelayout::topo::ForcedCalculator;

    // Create a new graph:
    let mut g = Graph::new();
    let a = g.add_node("a", Point::new(100., 100.));
    let b = g.add_node("b", Point::new(120., 900.));
    let c = g.add_node("c", Point::new(900., 500.));
    g.add_edge(a, b);
    g.add_edge(b, c);

    // Describe the forces:
    let config = ForceConfig::new(
        "10000 / x".parse::<ForceFunction>().unwrap(),
        ForceFunction::native(|d| d / 5.),
    )
    .with_throttling(false)
    .with_seed(7);

    // Run the simulation on this thread.
    let calc = ForcedCalculator::new(config);
    let report = calc.run(&mut g).unwrap();
    assert!(!report.cancelled);
    print!("{}", g.dump());
```

*/

pub mod adt;
pub mod core;
pub mod error;
pub mod expr;
pub mod force;
pub mod topo;

pub use error::{ConfigError, ExprError, LayoutError};
