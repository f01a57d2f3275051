use image::{GenericImageView, Luma};
use petgraph::visit::{Data, EdgeRef as _, GraphBase, IntoEdgeReferences, NodeIndexable};

use super::{Edge, PixelCoordinate};

/// Represent a three-channel image as a graph where pixels are nodes and
/// edges are created between each pixel and the 8 pixels surrounding it.
///
/// Each undirected edge is produced once, from its left (or upper) endpoint.
/// Edge weights are the Euclidean distance between the two pixels' channel
/// triples.
///
/// All three channels must have the same dimensions.
pub struct PixelGrid<I>(pub [I; 3]);

impl<I> PixelGrid<I>
where
    I: GenericImageView<Pixel = Luma<f32>>,
{
    pub fn width(&self) -> u32 {
        self.0[0].width()
    }

    pub fn height(&self) -> u32 {
        self.0[0].height()
    }

    /// Flatten the grid into a list of node-index edges, in generation order.
    pub fn edges(&self) -> Vec<Edge> {
        self.edge_references()
            .map(|edge| Edge {
                a: self.to_index(edge.source()),
                b: self.to_index(edge.target()),
                w: edge.weight,
            })
            .collect()
    }

    fn sample(&self, c: PixelCoordinate) -> [f32; 3] {
        let [r, g, b] = &self.0;
        [
            r.get_pixel(c.x, c.y).0[0],
            g.get_pixel(c.x, c.y).0[0],
            b.get_pixel(c.x, c.y).0[0],
        ]
    }

    fn diff(&self, a: PixelCoordinate, b: PixelCoordinate) -> f32 {
        let a = self.sample(a);
        let b = self.sample(b);
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }
}

impl<I> GraphBase for PixelGrid<I>
where
    I: GenericImageView<Pixel = Luma<f32>>,
{
    type EdgeId = GridEdge;
    type NodeId = PixelCoordinate;
}

impl<I> Data for PixelGrid<I>
where
    I: GenericImageView<Pixel = Luma<f32>>,
{
    type NodeWeight = ();
    type EdgeWeight = f32;
}

impl<I> NodeIndexable for PixelGrid<I>
where
    I: GenericImageView<Pixel = Luma<f32>>,
{
    fn node_bound(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    fn to_index(&self, node: Self::NodeId) -> usize {
        node.y as usize * self.width() as usize + node.x as usize
    }

    fn from_index(&self, i: usize) -> Self::NodeId {
        PixelCoordinate {
            x: (i % self.width() as usize) as u32,
            y: (i / self.width() as usize) as u32,
        }
    }
}

impl<'a, I> IntoEdgeReferences for &'a PixelGrid<I>
where
    I: GenericImageView<Pixel = Luma<f32>>,
{
    type EdgeRef = EdgeRef;
    type EdgeReferences = std::vec::IntoIter<Self::EdgeRef>;

    fn edge_references(self) -> Self::EdgeReferences {
        let width = self.width();
        let height = self.height();
        let mut output = Vec::with_capacity(4 * self.node_bound());
        for y in 0..height {
            for x in 0..width {
                let base = PixelCoordinate { x, y };
                let has_right = x + 1 < width;

                if has_right {
                    output.push(EdgeRef::new(self, base, Neighbor::Right));
                }
                if y + 1 < height {
                    output.push(EdgeRef::new(self, base, Neighbor::Down));
                }
                if has_right && y + 1 < height {
                    output.push(EdgeRef::new(self, base, Neighbor::DownRight));
                }
                if has_right && y > 0 {
                    output.push(EdgeRef::new(self, base, Neighbor::UpRight));
                }
            }
        }
        output.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridEdge {
    base: PixelCoordinate,
    neighbor: Neighbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Neighbor {
    Right,
    Down,
    DownRight,
    UpRight,
}

impl Neighbor {
    fn apply(&self, c: PixelCoordinate) -> PixelCoordinate {
        match self {
            Self::Right => PixelCoordinate { x: c.x + 1, y: c.y },
            Self::Down => PixelCoordinate { x: c.x, y: c.y + 1 },
            Self::DownRight => PixelCoordinate {
                x: c.x + 1,
                y: c.y + 1,
            },
            Self::UpRight => PixelCoordinate {
                x: c.x + 1,
                y: c.y - 1,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeRef {
    edge: GridEdge,
    weight: f32,
}

impl EdgeRef {
    fn new<I>(src: &PixelGrid<I>, base: PixelCoordinate, neighbor: Neighbor) -> Self
    where
        I: GenericImageView<Pixel = Luma<f32>>,
    {
        let weight = src.diff(base, neighbor.apply(base));
        Self {
            edge: GridEdge { base, neighbor },
            weight,
        }
    }
}

impl petgraph::visit::EdgeRef for EdgeRef {
    type NodeId = PixelCoordinate;
    type EdgeId = GridEdge;
    type Weight = f32;

    fn source(&self) -> Self::NodeId {
        self.edge.base
    }

    fn target(&self) -> Self::NodeId {
        self.edge.neighbor.apply(self.edge.base)
    }

    fn weight(&self) -> &Self::Weight {
        &self.weight
    }

    fn id(&self) -> Self::EdgeId {
        self.edge
    }
}

#[cfg(test)]
mod tests {
    use image::ImageBuffer;
    use petgraph::visit::{EdgeRef as _, IntoEdgeReferences, NodeIndexable};

    use super::*;
    use crate::Channel;

    fn flat(width: u32, height: u32, value: f32) -> [Channel; 3] {
        let plane = ImageBuffer::from_pixel(width, height, Luma([value]));
        [plane.clone(), plane.clone(), plane]
    }

    #[test]
    fn edge_count_matches_eight_connectivity() {
        for (w, h) in [(1, 1), (1, 5), (5, 1), (2, 2), (4, 3), (7, 9)] {
            let grid = PixelGrid(flat(w, h, 0.0));
            let edges = grid.edges();
            let (w, h) = (w as usize, h as usize);
            // horizontal + vertical + two diagonal directions
            let expected = (w - 1) * h + w * (h - 1) + 2 * (w - 1) * (h - 1);
            assert_eq!(edges.len(), expected, "{w}x{h}");
            assert!(edges.len() <= 4 * w * h);
        }
    }

    #[test]
    fn edges_are_emitted_in_neighbor_order() {
        let grid = PixelGrid(flat(2, 2, 0.0));
        let pairs: Vec<(usize, usize)> = grid.edges().iter().map(|e| (e.a, e.b)).collect();
        // (0,0): right, down, down-right; (1,0): down; (0,1): right, up-right
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 3), (2, 3), (2, 1)]);
    }

    #[test]
    fn each_undirected_edge_appears_once() {
        let grid = PixelGrid(flat(4, 4, 0.0));
        let mut pairs: Vec<(usize, usize)> = grid
            .edges()
            .iter()
            .map(|e| (e.a.min(e.b), e.a.max(e.b)))
            .collect();
        let total = pairs.len();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), total);
    }

    #[test]
    fn weight_is_euclidean_color_distance() {
        let mut channels = flat(2, 1, 0.0);
        channels[0].put_pixel(1, 0, Luma([3.0]));
        channels[2].put_pixel(1, 0, Luma([4.0]));
        let grid = PixelGrid(channels);
        let edges = grid.edges();
        assert_eq!(edges.len(), 1);
        assert!((edges[0].w - 5.0).abs() < 1e-6);
    }

    #[test]
    fn petgraph_view_is_consistent() {
        let grid = PixelGrid(flat(3, 2, 1.0));
        assert_eq!(grid.node_bound(), 6);
        for i in 0..grid.node_bound() {
            assert_eq!(grid.to_index(grid.from_index(i)), i);
        }
        for edge in (&grid).edge_references() {
            let s = edge.source();
            let t = edge.target();
            assert!(s.x.abs_diff(t.x) <= 1 && s.y.abs_diff(t.y) <= 1);
            assert_eq!(*edge.weight(), 0.0);
            assert_eq!(edge.id().base, s);
        }
    }
}
