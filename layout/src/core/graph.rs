//! Defines the interface that the layout calculators use for reading and
//! updating the graph.

use super::geometry::Point;

/// This is the trait that every graph that can be laid out needs to
/// implement. The calculators only see node indices (0..nodes_count) and
/// edge indices (0..edges_count); everything else about the nodes and edges
/// belongs to the implementation. The counts must not change during a run.
pub trait PositionedGraph {
    /// \return the number of nodes in the graph.
    fn nodes_count(&self) -> usize;
    /// \return the number of edges in the graph.
    fn edges_count(&self) -> usize;
    /// \return the pair of node indices that edge \p index connects. Edges
    /// are unordered.
    fn edge(&self, index: usize) -> (usize, usize);
    /// \return the current position of the node \p index.
    fn node_position(&self, index: usize) -> Point;
    /// Update the position of the node \p index.
    fn set_node_position(&mut self, index: usize, position: Point);
    /// Called once after every completed pass over all of the nodes. All of
    /// the positions that were written during the pass are final.
    fn commit(&mut self) {}

    /// \return True if some edge connects \p a and \p b.
    fn is_adjacent(&self, a: usize, b: usize) -> bool {
        (0..self.edges_count()).any(|i| {
            let (from, to) = self.edge(i);
            (from, to) == (a, b) || (from, to) == (b, a)
        })
    }

    /// \return the positions of all of the nodes, in index order.
    fn positions(&self) -> Vec<Point> {
        (0..self.nodes_count())
            .map(|i| self.node_position(i))
            .collect()
    }

    /// \return all of the edges, in index order.
    fn edges(&self) -> Vec<(usize, usize)> {
        (0..self.edges_count()).map(|i| self.edge(i)).collect()
    }
}

impl<G: PositionedGraph + ?Sized> PositionedGraph for &mut G {
    fn nodes_count(&self) -> usize {
        (**self).nodes_count()
    }
    fn edges_count(&self) -> usize {
        (**self).edges_count()
    }
    fn edge(&self, index: usize) -> (usize, usize) {
        (**self).edge(index)
    }
    fn node_position(&self, index: usize) -> Point {
        (**self).node_position(index)
    }
    fn set_node_position(&mut self, index: usize, position: Point) {
        (**self).set_node_position(index, position)
    }
    fn commit(&mut self) {
        (**self).commit()
    }
    fn is_adjacent(&self, a: usize, b: usize) -> bool {
        (**self).is_adjacent(a, b)
    }
}
