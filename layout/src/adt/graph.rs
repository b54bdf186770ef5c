//! This module implements a simple in-memory graph. Every node has a label
//! and a position, and the edges are unordered pairs of node indices. It is
//! the graph that the command line tools lay out, and a reference
//! implementation of PositionedGraph.

use crate::core::geometry::Point;
use crate::core::graph::PositionedGraph;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub position: Point,
}

impl Node {
    pub fn new(label: &str, position: Point) -> Self {
        Node {
            label: label.to_string(),
            position,
        }
    }
}

/// The graph data structure.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// A list of nodes in the graph.
    nodes: Vec<Node>,

    /// Pairs of node indices.
    edges: Vec<(usize, usize)>,

    /// Number of committed layout passes.
    passes: usize,
}

/// Node iterator for iterating over nodes in the graph.
#[derive(Debug)]
pub struct NodeIterator {
    curr: usize,
    last: usize,
}

impl Iterator for NodeIterator {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.curr == self.last {
            return None;
        }
        let item = Some(self.curr);
        self.curr += 1;
        item
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with \p n unlabeled nodes at the origin.
    pub fn with_nodes(n: usize) -> Self {
        let mut g = Self::new();
        for i in 0..n {
            g.add_node(&i.to_string(), Point::zero());
        }
        g
    }

    pub fn iter(&self) -> NodeIterator {
        NodeIterator {
            curr: 0,
            last: self.nodes.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// \returns the node with the index \p idx.
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// \returns the index of the first node labeled \p label.
    pub fn find(&self, label: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.label == label)
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, label: &str, position: Point) -> usize {
        self.nodes.push(Node::new(label, position));
        self.nodes.len() - 1
    }

    /// Connect the nodes \p from and \p to.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        assert!(from < self.len(), "Invalid node");
        assert!(to < self.len(), "Invalid node");
        self.edges.push((from, to));
    }

    /// Connect \p from and \p to without checking that they exist. The
    /// calculators reject such graphs before they start.
    pub fn add_edge_unchecked(&mut self, from: usize, to: usize) {
        self.edges.push((from, to));
    }

    /// Scatter the nodes uniformly over the rectangle (0,0)..(width,height).
    pub fn set_random_positions<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f64, height: f64) {
        for node in self.nodes.iter_mut() {
            node.position = Point::new(
                rng.gen::<f64>() * width.max(0.),
                rng.gen::<f64>() * height.max(0.),
            );
        }
    }

    /// \returns the number of layout passes committed to this graph.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Render the nodes as lines of "label x y".
    pub fn dump(&self) -> String {
        let mut sb = String::new();
        for node in &self.nodes {
            sb.push_str(&format!(
                "{} {:.3} {:.3}\n",
                node.label, node.position.x, node.position.y
            ));
        }
        sb
    }
}

impl PositionedGraph for Graph {
    fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    fn edges_count(&self) -> usize {
        self.edges.len()
    }

    fn edge(&self, index: usize) -> (usize, usize) {
        self.edges[index]
    }

    fn node_position(&self, index: usize) -> Point {
        self.nodes[index].position
    }

    fn set_node_position(&mut self, index: usize, position: Point) {
        self.nodes[index].position = position;
    }

    fn commit(&mut self) {
        self.passes += 1;
    }
}

#[test]
fn test_graph_construction() {
    let mut g = Graph::new();
    assert!(g.is_empty());
    let a = g.add_node("a", Point::new(1., 2.));
    let b = g.add_node("b", Point::new(3., 4.));
    let c = g.add_node("c", Point::zero());
    g.add_edge(a, b);
    g.add_edge(c, b);

    assert_eq!(g.len(), 3);
    assert_eq!(g.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(g.find("c"), Some(2));
    assert_eq!(g.find("d"), None);
    assert_eq!(g.edges_count(), 2);
    assert_eq!(g.edge(1), (2, 1));
    assert!(g.is_adjacent(a, b));
    assert!(g.is_adjacent(b, c));
    assert!(!g.is_adjacent(a, c));
    assert_eq!(g.positions()[1], Point::new(3., 4.));
    assert_eq!(g.dump(), "a 1.000 2.000\nb 3.000 4.000\nc 0.000 0.000\n");
}

#[test]
fn test_random_positions() {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    let mut g = Graph::with_nodes(50);
    let mut rng = SmallRng::seed_from_u64(3);
    g.set_random_positions(&mut rng, 200., 100.);
    for i in g.iter() {
        let p = g.node(i).position;
        assert!((0. ..=200.).contains(&p.x));
        assert!((0. ..=100.).contains(&p.y));
    }
    // The nodes are not all in one place.
    assert!(g.node(0).position != g.node(1).position);
}
