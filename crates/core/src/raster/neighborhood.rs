//! Neighborhood operations for n-dimensional pixel grids

use super::image::strides_of;

/// Which pixels count as adjacent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Pixels sharing a face: 4 in 2-D, 6 in 3-D (2n neighbors)
    #[default]
    Face,
    /// Pixels sharing a face, edge or corner: 8 in 2-D, 26 in 3-D (3^n - 1)
    Full,
}

impl Connectivity {
    /// Whether a relative position (excluding the center) is adjacent
    pub fn contains(&self, offset: &[isize]) -> bool {
        let nonzero = offset.iter().filter(|&&d| d != 0).count();
        if nonzero == 0 || offset.iter().any(|d| d.abs() > 1) {
            return false;
        }
        match self {
            Connectivity::Face => nonzero == 1,
            Connectivity::Full => true,
        }
    }
}

/// Precomputed neighbor offsets for one image shape and connectivity
#[derive(Debug, Clone)]
pub struct Neighborhood {
    shape: Vec<usize>,
    /// Per-axis offsets of each neighbor
    offsets: Vec<Vec<isize>>,
    /// Linear index delta of each neighbor
    deltas: Vec<isize>,
}

impl Neighborhood {
    pub fn new(shape: &[usize], connectivity: Connectivity) -> Self {
        let ndim = shape.len();
        let strides = strides_of(shape);
        let mut offsets = Vec::new();

        // Enumerate {-1, 0, 1}^ndim in lexicographic order
        let total = 3usize.pow(ndim as u32);
        for code in 0..total {
            let mut rest = code;
            let mut offset = vec![0isize; ndim];
            for axis in (0..ndim).rev() {
                offset[axis] = (rest % 3) as isize - 1;
                rest /= 3;
            }
            if connectivity.contains(&offset) {
                offsets.push(offset);
            }
        }

        let deltas = offsets
            .iter()
            .map(|o| o.iter().zip(&strides).map(|(d, s)| d * *s as isize).sum())
            .collect();

        Self {
            shape: shape.to_vec(),
            offsets,
            deltas,
        }
    }

    /// Number of neighbors of an interior pixel
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Relative positions of the neighbors
    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    /// In-bounds neighbors of the pixel at `coord` whose linear index is `index`
    pub fn neighbors<'a>(&'a self, coord: &'a [usize], index: usize) -> NeighborhoodIterator<'a> {
        NeighborhoodIterator {
            neighborhood: self,
            center: coord,
            center_index: index,
            next: 0,
        }
    }
}

/// Iterator over the linear indexes of a pixel's in-bounds neighbors
pub struct NeighborhoodIterator<'a> {
    neighborhood: &'a Neighborhood,
    center: &'a [usize],
    center_index: usize,
    next: usize,
}

impl<'a> Iterator for NeighborhoodIterator<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let nb = self.neighborhood;
        while self.next < nb.offsets.len() {
            let k = self.next;
            self.next += 1;

            let inside = nb.offsets[k]
                .iter()
                .zip(self.center)
                .zip(&nb.shape)
                .all(|((&d, &c), &extent)| {
                    let pos = c as isize + d;
                    pos >= 0 && pos < extent as isize
                });

            if inside {
                return Some((self.center_index as isize + nb.deltas[k]) as usize);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.neighborhood.offsets.len() - self.next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighborhood_sizes() {
        assert_eq!(Neighborhood::new(&[5, 5], Connectivity::Face).len(), 4);
        assert_eq!(Neighborhood::new(&[5, 5], Connectivity::Full).len(), 8);
        assert_eq!(Neighborhood::new(&[5, 5, 5], Connectivity::Face).len(), 6);
        assert_eq!(Neighborhood::new(&[5, 5, 5], Connectivity::Full).len(), 26);
        assert_eq!(Neighborhood::new(&[9], Connectivity::Full).len(), 2);
    }

    #[test]
    fn test_interior_neighbors() {
        let nb = Neighborhood::new(&[3, 3], Connectivity::Face);
        let mut n: Vec<usize> = nb.neighbors(&[1, 1], 4).collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_edge_neighbors_clipped() {
        let nb = Neighborhood::new(&[3, 3], Connectivity::Full);
        let mut n: Vec<usize> = nb.neighbors(&[0, 2], 2).collect();
        n.sort_unstable();
        assert_eq!(n, vec![1, 4, 5]);
    }
}
