//! This is the command line tool that loads edge-list files, lays out the
//! graph with the force-directed calculator, and prints or saves the node
//! positions.
//!
//! The input has one edge per line: two node labels separated by
//! whitespace. A line with a single label declares a node without edges.
//! Lines that start with '#' are ignored.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, ArgAction, Command};
use forcelayout::adt::Graph;
use forcelayout::core::geometry::Point;
use forcelayout::core::utils::save_to_file;
use forcelayout::expr::{self, ExprParser, Expression};
use forcelayout::force::{ForceConfig, ForceFunction};
use forcelayout::topo::ForcedCalculator;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;
use std::process::exit;

/// Parse the edge list in \p contents.
fn parse_edge_list(contents: &str) -> Result<Graph, String> {
    let mut g = Graph::new();
    let node = |g: &mut Graph, label: &str| match g.find(label) {
        Some(idx) => idx,
        None => g.add_node(label, Point::zero()),
    };

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [a] => {
                node(&mut g, *a);
            }
            [a, b] => {
                let from = node(&mut g, *a);
                let to = node(&mut g, *b);
                g.add_edge(from, to);
            }
            _ => {
                return Err(format!(
                    "line {}: expected one or two labels, found {}",
                    lineno + 1,
                    words.len()
                ));
            }
        }
    }
    Ok(g)
}

/// Compile \p source, or report the error and quit.
fn compile_or_exit(name: &str, source: &str, dump: bool) -> ForceFunction {
    match Expression::compile(source) {
        Result::Ok(e) => {
            if dump {
                expr::dump_rpn(&e);
            }
            ForceFunction::from(e)
        }
        Result::Err(err) => {
            // Run the parser again to point at the error.
            let mut parser = ExprParser::new(source);
            let _ = parser.process();
            parser.print_error();
            log::error!("Invalid {} force: {}", name, err);
            exit(1);
        }
    }
}

/// Parse an extent like "1000x800".
fn parse_size(text: &str) -> Result<(f64, f64), String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, found '{}'", text))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width '{}'", w))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height '{}'", h))?;
    Ok((w, h))
}

fn main() {
    let matches = Command::new("forcelayout")
        .version("0.1")
        .about("Lay out a graph with a force-directed simulation")
        .arg(
            Arg::new("repulsive")
                .short('r')
                .long("repulsive")
                .value_name("EXPR")
                .default_value("10000 / x^2")
                .help("Node to node repulsion, as a function of x (the distance)"),
        )
        .arg(
            Arg::new("attractive")
                .short('a')
                .long("attractive")
                .value_name("EXPR")
                .default_value("x / 10")
                .help("Attraction along the edges"),
        )
        .arg(
            Arg::new("frame-force")
                .long("frame-force")
                .value_name("EXPR")
                .help("Repulsion from the sides of the frame"),
        )
        .arg(
            Arg::new("line-force")
                .long("line-force")
                .value_name("EXPR")
                .help("Repulsion of nodes from edges"),
        )
        .arg(
            Arg::new("frame")
                .long("frame")
                .value_name("WxH")
                .default_value("1000x1000")
                .help("Size of the frame"),
        )
        .arg(
            Arg::new("node")
                .long("node")
                .value_name("WxH")
                .default_value("100x100")
                .help("Size of a node"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Seed for the initial placement and the random forces"),
        )
        .arg(
            Arg::new("no-throttle")
                .long("no-throttle")
                .action(ArgAction::SetTrue)
                .help("Do not pause between passes"),
        )
        .arg(
            Arg::new("dump-rpn")
                .long("dump-rpn")
                .action(ArgAction::SetTrue)
                .help("Print the compiled force expressions"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path of the output file"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .index(1),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let dump = matches.get_flag("dump-rpn");
    let string_arg = |name: &str| matches.get_one::<String>(name).cloned();

    let size_arg = |name: &str| {
        let text = string_arg(name).unwrap_or_default();
        match parse_size(&text) {
            Ok(size) => size,
            Err(err) => {
                log::error!("Invalid --{}: {}", name, err);
                exit(1);
            }
        }
    };
    let (frame_w, frame_h) = size_arg("frame");
    let (node_w, node_h) = size_arg("node");

    let repulsive = compile_or_exit("repulsive", &string_arg("repulsive").unwrap_or_default(), dump);
    let attractive = compile_or_exit("attractive", &string_arg("attractive").unwrap_or_default(), dump);

    let mut config = ForceConfig::new(repulsive, attractive)
        .with_frame_size(frame_w, frame_h)
        .with_node_size(node_w, node_h)
        .with_throttling(!matches.get_flag("no-throttle"));
    if let Some(src) = string_arg("frame-force") {
        config = config.with_frame_force(compile_or_exit("frame", &src, dump));
    }
    if let Some(src) = string_arg("line-force") {
        config = config.with_line_force(compile_or_exit("line", &src, dump));
    }
    let seed = matches.get_one::<u64>("seed").copied();
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let input_path = string_arg("INPUT").unwrap_or_default();
    let contents = match fs::read_to_string(&input_path) {
        Ok(contents) => contents,
        Err(err) => {
            log::error!("Can't open the file {}: {}", input_path, err);
            exit(1);
        }
    };
    let mut graph = match parse_edge_list(&contents) {
        Ok(g) => g,
        Err(err) => {
            log::error!("{}: {}", input_path, err);
            exit(1);
        }
    };

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    graph.set_random_positions(&mut rng, frame_w, frame_h);

    let calc = ForcedCalculator::new(config);
    match calc.run(&mut graph) {
        Result::Err(err) => {
            log::error!("Error: {}", err);
            exit(1);
        }
        Result::Ok(report) => {
            log::info!(
                "Placed {} nodes in {} passes",
                graph.len(),
                report.iterations
            );
        }
    }

    let content = graph.dump();
    match matches.get_one::<String>("output") {
        Some(path) => {
            if let Result::Err(err) = save_to_file(path, &content) {
                log::error!("Could not write the file {}", path);
                log::error!("Error {}", err);
                exit(1);
            }
        }
        None => print!("{}", content),
    }
}
