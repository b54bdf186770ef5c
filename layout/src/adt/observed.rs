//! A graph wrapper that publishes the positions of every committed pass, so
//! that other threads can watch a layout while it runs.

use crate::core::geometry::Point;
use crate::core::graph::PositionedGraph;
use std::sync::{Arc, RwLock};

/// The positions of the nodes after some pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// The number of passes committed so far. Zero is the initial layout.
    pub pass: usize,
    pub positions: Arc<Vec<Point>>,
}

/// A cloneable reader of the latest published frame.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    latest: Arc<RwLock<Frame>>,
}

impl Snapshot {
    /// \returns the last frame that was committed.
    pub fn latest(&self) -> Frame {
        match self.latest.read() {
            Ok(frame) => frame.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, frame: Frame) {
        match self.latest.write() {
            Ok(mut latest) => *latest = frame,
            Err(poisoned) => *poisoned.into_inner() = frame,
        }
    }
}

/// Wraps a graph. Readers never see the positions of a half-done pass.
#[derive(Debug)]
pub struct ObservedGraph<G> {
    graph: G,
    snapshot: Snapshot,
    pass: usize,
}

impl<G: PositionedGraph> ObservedGraph<G> {
    pub fn new(graph: G) -> Self {
        let snapshot = Snapshot::default();
        snapshot.publish(Frame {
            pass: 0,
            positions: Arc::new(graph.positions()),
        });
        Self {
            graph,
            snapshot,
            pass: 0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn inner(&self) -> &G {
        &self.graph
    }

    pub fn into_inner(self) -> G {
        self.graph
    }
}

impl<G: PositionedGraph> PositionedGraph for ObservedGraph<G> {
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
        self.pass += 1;
        self.snapshot.publish(Frame {
            pass: self.pass,
            positions: Arc::new(self.graph.positions()),
        });
    }

    fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.graph.is_adjacent(a, b)
    }
}

#[test]
fn test_publish_on_commit() {
    use crate::adt::graph::Graph;

    let mut g = Graph::new();
    g.add_node("a", Point::new(1., 1.));
    let mut observed = ObservedGraph::new(&mut g);
    let snapshot = observed.snapshot();
    assert_eq!(snapshot.latest().pass, 0);

    observed.set_node_position(0, Point::new(5., 5.));
    // Not visible until the pass is committed.
    assert_eq!(snapshot.latest().positions[0], Point::new(1., 1.));
    observed.commit();
    let frame = snapshot.latest();
    assert_eq!(frame.pass, 1);
    assert_eq!(frame.positions[0], Point::new(5., 5.));
    assert_eq!(observed.inner().passes(), 1);
    drop(observed);
    assert_eq!(g.passes(), 1);
}
