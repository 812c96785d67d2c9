//! Union-find flooding
//!
//! Pixels are processed from the most extreme value to the least extreme.
//! Each processed pixel becomes the provisional parent of every component
//! already flooded around it; a second pass collapses equal-valued chains so
//! that each plateau has one canonical pixel, and a third pass turns the
//! canonical pixels into nodes.
//!
//! Reference:
//! Berger, C. et al. (2007). Effective component tree computation with
//! application to pattern recognition in astronomical imaging. *ICIP*.

use morphtree_core::raster::{unravel_index, Neighborhood, RasterElement};
use morphtree_core::{ComponentTree, Connectivity, Error, NodeId, Result, Spacing, TreeOrdering};

const UNVISITED: usize = usize::MAX;

/// Disjoint sets over pixels with union by rank.
///
/// `repr` tracks, per set root, the pixel that currently stands for the
/// whole flooded component in the provisional parent array.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    repr: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: vec![UNVISITED; n],
            rank: vec![0; n],
            repr: vec![0; n],
        }
    }

    fn make_set(&mut self, x: usize) {
        self.parent[x] = x;
        self.repr[x] = x;
    }

    fn is_visited(&self, x: usize) -> bool {
        self.parent[x] != UNVISITED
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]]; // path halving
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, ra: usize, rb: usize) -> usize {
        let (root, child) = if self.rank[ra] >= self.rank[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };

        self.parent[child] = root;
        if self.rank[root] == self.rank[child] {
            self.rank[root] = self.rank[root].saturating_add(1);
        }
        root
    }
}

/// Build a component tree from row-major pixel values.
///
/// Within a plateau the pixel with the lowest linear index becomes the
/// canonical one, and nodes are numbered from the root downwards in order
/// of increasing extremeness, so node ids are reproducible.
pub(crate) fn flood<T: RasterElement>(
    values: &[T],
    shape: &[usize],
    spacing: Spacing,
    ordering: TreeOrdering,
    connectivity: Connectivity,
) -> Result<ComponentTree<T>> {
    let n = values.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if let Some(bad) = values.iter().position(|v| v.partial_cmp(v).is_none()) {
        return Err(Error::InvalidParameter {
            name: "image",
            value: format!("pixel {}", bad),
            reason: "NaN values cannot be ordered".into(),
        });
    }

    // Most extreme first; equal values by descending index so the lowest
    // index of a plateau is processed last and becomes its canonical pixel
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| {
        ordering
            .compare(values[b], values[a])
            .then_with(|| b.cmp(&a))
    });

    let neighborhood = Neighborhood::new(shape, connectivity);
    let mut sets = UnionFind::new(n);
    let mut parent = vec![0usize; n];
    let mut coord = vec![0usize; shape.len()];

    for &p in &order {
        sets.make_set(p);
        parent[p] = p;
        unravel_index(p, shape, &mut coord);

        for q in neighborhood.neighbors(&coord, p) {
            if !sets.is_visited(q) {
                continue;
            }
            let rq = sets.find(q);
            let rp = sets.find(p);
            if rq != rp {
                parent[sets.repr[rq]] = p;
                let root = sets.union(rq, rp);
                sets.repr[root] = p;
            }
        }
    }

    // Point every pixel at the canonical pixel of its level component
    for &p in order.iter().rev() {
        let q = parent[p];
        if values[parent[q]] == values[q] {
            parent[p] = parent[q];
        }
    }

    let mut node_of: Vec<NodeId> = vec![0; n];
    let mut node_values = Vec::new();
    let mut node_parents = Vec::new();
    for &p in order.iter().rev() {
        let q = parent[p];
        if q == p || values[q] != values[p] {
            let id = node_values.len();
            node_values.push(values[p]);
            node_parents.push(if q == p { None } else { Some(node_of[q]) });
            node_of[p] = id;
        } else {
            node_of[p] = node_of[q];
        }
    }

    ComponentTree::from_parts(shape, spacing, ordering, node_values, node_parents, &node_of)
}
