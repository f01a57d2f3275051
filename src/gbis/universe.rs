//! Disjoint-set forest over pixel node ids.
//!
//! Every node starts as its own singleton component. Components only ever
//! grow: `join` is irreversible and there is no split operation.

#[derive(Clone, Debug)]
pub struct Universe {
    parent: Vec<usize>,
    rank: Vec<u8>,
    size: Vec<usize>,
    num_sets: usize,
}

impl Universe {
    /// Create a forest of `n` singleton components.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            size: vec![1; n],
            num_sets: n,
        }
    }

    /// Number of elements in the forest.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative root of the component containing `node`.
    ///
    /// Compresses the walked path so later lookups are shallow.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Merge the components containing `a` and `b`, returning the surviving
    /// root.
    ///
    /// The lower-rank root is attached below the higher-rank one. On a tie,
    /// `b`'s root goes below `a`'s. Joining a component with itself does
    /// nothing.
    pub fn join(&mut self, a: usize, b: usize) -> usize {
        let mut a = self.find(a);
        let mut b = self.find(b);
        if a == b {
            return a;
        }
        if self.rank[a] < self.rank[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
        if self.rank[a] == self.rank[b] {
            self.rank[a] = self.rank[a].saturating_add(1);
        }
        self.num_sets -= 1;
        a
    }

    /// Pixel count of the component rooted at `root`.
    ///
    /// Only meaningful for roots; resolve with [`Universe::find`] first.
    pub fn size(&self, root: usize) -> usize {
        self.size[root]
    }

    /// Current number of distinct components.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }
}
