//! Graph-based image segmentation.
//!
//! Implemented based on the paper "Efficient Graph-Based Image Segmentation" by
//! Felzenszwalb and Huttenlocher (2004)

pub mod pixel_grid;
pub mod universe;

pub use pixel_grid::PixelGrid;
pub use universe::Universe;

use image::{ImageBuffer, Luma};

use crate::LabelImage;

/// Position of a pixel; the node type of [`PixelGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoordinate {
    pub x: u32,
    pub y: u32,
}

/// An undirected, weighted edge between two node indexes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub w: f32,
}

/// Segment a graph of `num_nodes` nodes.
///
/// `edges` is sorted in place by non-decreasing weight. The sort is stable, so
/// edges of equal weight keep their generation order. Larger `c` makes larger
/// components.
pub fn segment_graph(num_nodes: usize, edges: &mut [Edge], c: f32) -> Universe {
    let mut universe = Universe::new(num_nodes);
    // Largest edge weight inside each component, indexed by root.
    let mut int_diff = vec![0.0f32; num_nodes];

    // Sort E by non-decreasing edge weight.
    edges.sort_by(|a, b| a.w.total_cmp(&b.w));

    for edge in edges.iter() {
        let a = universe.find(edge.a);
        let b = universe.find(edge.b);

        // If a and b are in disjoint components and the edge weight is small
        // compared to the internal difference of both components, then merge
        // the two components, otherwise do nothing.
        if a == b {
            continue;
        }
        let mint = f32::min(
            int_diff[a] + c / universe.size(a) as f32,
            int_diff[b] + c / universe.size(b) as f32,
        );
        if edge.w > mint {
            continue;
        }

        // Edges arrive in increasing order, so this one is the new maximum.
        let root = universe.join(a, b);
        int_diff[root] = edge.w;
    }

    universe
}

/// Force every component smaller than `min_size` into a neighbour.
///
/// Ignores edge weights; which neighbour absorbs a small component depends on
/// the order of `edges`.
pub fn merge_small_components(universe: &mut Universe, edges: &[Edge], min_size: usize) {
    for edge in edges {
        let a = universe.find(edge.a);
        let b = universe.find(edge.b);
        if a != b && (universe.size(a) < min_size || universe.size(b) < min_size) {
            universe.join(a, b);
        }
    }
}

/// Label every pixel of a `width` x `height` grid with its component.
///
/// Labels start at 1 and are handed out in raster order of first appearance.
pub fn assign_labels(universe: &mut Universe, width: u32, height: u32) -> LabelImage {
    // Map from roots to labels; 0 means not seen yet.
    let mut root_labels = vec![0u32; universe.len()];
    let mut next_label = 1;

    ImageBuffer::from_fn(width, height, |x, y| {
        let root = universe.find(y as usize * width as usize + x as usize);
        if root_labels[root] == 0 {
            root_labels[root] = next_label;
            next_label += 1;
        }
        Luma([root_labels[root]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: usize, b: usize, w: f32) -> Edge {
        Edge { a, b, w }
    }

    #[test]
    fn sorts_edges_stably() {
        let mut edges = vec![
            edge(0, 1, 2.0),
            edge(1, 2, 1.0),
            edge(2, 3, 2.0),
            edge(3, 4, 1.0),
        ];
        segment_graph(5, &mut edges, 0.0);
        let order: Vec<(usize, usize)> = edges.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(order, vec![(1, 2), (3, 4), (0, 1), (2, 3)]);
    }

    #[test]
    fn merges_below_adaptive_threshold() {
        // A chain 0 - 1 - 2 - 3 with one strong edge in the middle.
        let mut edges = vec![edge(0, 1, 1.0), edge(1, 2, 50.0), edge(2, 3, 1.0)];
        let mut u = segment_graph(4, &mut edges, 10.0);
        assert_eq!(u.num_sets(), 2);
        assert_eq!(u.find(0), u.find(1));
        assert_eq!(u.find(2), u.find(3));
        assert_ne!(u.find(1), u.find(2));
    }

    #[test]
    fn threshold_shrinks_as_components_grow() {
        // Singletons accept w <= c, but a pair only accepts w <= 1 + c / 2.
        let mut edges = vec![edge(0, 1, 1.0), edge(1, 2, 4.0)];
        let u = segment_graph(3, &mut edges, 5.0);
        assert_eq!(u.num_sets(), 2);

        let mut edges = vec![edge(0, 1, 1.0), edge(1, 2, 3.5)];
        let u = segment_graph(3, &mut edges, 5.0);
        assert_eq!(u.num_sets(), 1);
    }

    #[test]
    fn zero_weight_edges_always_merge() {
        let mut edges = vec![edge(0, 1, 0.0), edge(1, 2, 0.0), edge(2, 3, 0.0)];
        let u = segment_graph(4, &mut edges, 0.0);
        assert_eq!(u.num_sets(), 1);
    }

    #[test]
    fn small_components_are_absorbed() {
        // {0, 1, 2} and {4, 5} merge; 3 is left on its own.
        let mut edges = vec![
            edge(0, 1, 1.0),
            edge(1, 2, 1.0),
            edge(2, 3, 100.0),
            edge(3, 4, 100.0),
            edge(4, 5, 1.0),
        ];
        let mut u = segment_graph(6, &mut edges, 5.0);
        assert_eq!(u.num_sets(), 3);

        merge_small_components(&mut u, &edges, 2);
        assert_eq!(u.num_sets(), 2);
        for i in 0..u.len() {
            let root = u.find(i);
            assert!(u.size(root) >= 2);
        }
    }

    #[test]
    fn oversized_floor_leaves_one_component() {
        let mut edges = vec![edge(0, 1, 100.0), edge(1, 2, 100.0)];
        let mut u = segment_graph(3, &mut edges, 1.0);
        merge_small_components(&mut u, &edges, 10);
        assert_eq!(u.num_sets(), 1);
    }

    #[test]
    fn labels_follow_raster_discovery() {
        // 3x2 grid: columns 0 and 2 share a component, column 1 is its own.
        let mut u = Universe::new(6);
        u.join(2, 0);
        u.join(3, 5);
        u.join(0, 3);
        u.join(1, 4);
        let labels = assign_labels(&mut u, 3, 2);
        assert_eq!(labels.into_raw(), vec![1, 2, 1, 1, 2, 1]);
    }
}
