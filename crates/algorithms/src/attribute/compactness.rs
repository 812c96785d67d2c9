//! Shape compactness from second-order moments
//!
//! Every subtree accumulates its zeroth, first and second moments over the
//! physical pixel coordinates. The compactness is the ratio of the smallest
//! to the largest eigenvalue of the resulting covariance matrix: 1.0 for an
//! isotropic blob, approaching 0 for thin elongated structures.
//!
//! Each pixel is treated as a uniform box rather than a point, which adds
//! `step^2 / 12` per axis to the covariance. A single pixel therefore has
//! compactness 1 instead of an undefined 0/0.

use morphtree_core::tree::AttributeSlot;
use morphtree_core::raster::unravel_index;
use morphtree_core::{ComponentTree, NodeId, RasterElement};

use super::walk::level;

/// Running moments of one subtree
#[derive(Debug, Clone)]
struct Moments {
    /// Total weight (pixel count when unweighted)
    s0: f64,
    /// Weighted coordinate sums
    s1: Vec<f64>,
    /// Weighted coordinate products, row-major `ndim x ndim`
    s2: Vec<f64>,
}

impl Moments {
    fn zero(ndim: usize) -> Self {
        Self {
            s0: 0.0,
            s1: vec![0.0; ndim],
            s2: vec![0.0; ndim * ndim],
        }
    }

    fn add_point(&mut self, x: &[f64], w: f64) {
        let d = x.len();
        self.s0 += w;
        for i in 0..d {
            self.s1[i] += w * x[i];
            for j in 0..d {
                self.s2[i * d + j] += w * x[i] * x[j];
            }
        }
    }

    fn absorb(&mut self, other: &Moments) {
        self.s0 += other.s0;
        for (a, b) in self.s1.iter_mut().zip(&other.s1) {
            *a += b;
        }
        for (a, b) in self.s2.iter_mut().zip(&other.s2) {
            *a += b;
        }
    }

    /// min/max eigenvalue ratio of the covariance
    fn compactness(&self, steps: &[f64]) -> f64 {
        if self.s0 <= 0.0 {
            return 1.0;
        }
        let d = self.s1.len();
        let mean: Vec<f64> = self.s1.iter().map(|s| s / self.s0).collect();
        let mut cov = vec![vec![0.0; d]; d];
        for i in 0..d {
            for j in 0..d {
                cov[i][j] = self.s2[i * d + j] / self.s0 - mean[i] * mean[j];
            }
            cov[i][i] += steps[i] * steps[i] / 12.0;
        }

        let eigenvalues = jacobi_eigenvalues(&cov, d);
        let max = eigenvalues.iter().cloned().fold(f64::MIN, f64::max);
        let min = eigenvalues.iter().cloned().fold(f64::MAX, f64::min);
        if max <= 0.0 {
            return 1.0;
        }
        (min / max).clamp(0.0, 1.0)
    }
}

/// Eigenvalues of a symmetric matrix by Jacobi rotations
fn jacobi_eigenvalues(matrix: &[Vec<f64>], n: usize) -> Vec<f64> {
    let max_iter = 100 * n * n;
    let eps = 1e-12;

    let mut a: Vec<Vec<f64>> = matrix.to_vec();

    for _ in 0..max_iter {
        // Find largest off-diagonal element
        let mut max_val = 0.0;
        let mut p = 0;
        let mut q = 1;
        for i in 0..n {
            for j in (i + 1)..n {
                if a[i][j].abs() > max_val {
                    max_val = a[i][j].abs();
                    p = i;
                    q = j;
                }
            }
        }

        if max_val < eps {
            break;
        }

        let theta = if (a[p][p] - a[q][q]).abs() < eps {
            std::f64::consts::FRAC_PI_4
        } else {
            0.5 * (2.0 * a[p][q] / (a[p][p] - a[q][q])).atan()
        };
        let cos_t = theta.cos();
        let sin_t = theta.sin();

        let mut new_a = a.clone();
        for i in 0..n {
            if i != p && i != q {
                new_a[i][p] = cos_t * a[i][p] + sin_t * a[i][q];
                new_a[p][i] = new_a[i][p];
                new_a[i][q] = -sin_t * a[i][p] + cos_t * a[i][q];
                new_a[q][i] = new_a[i][q];
            }
        }
        new_a[p][p] = cos_t * cos_t * a[p][p] + 2.0 * sin_t * cos_t * a[p][q] + sin_t * sin_t * a[q][q];
        new_a[q][q] = sin_t * sin_t * a[p][p] - 2.0 * sin_t * cos_t * a[p][q] + cos_t * cos_t * a[q][q];
        new_a[p][q] = 0.0;
        new_a[q][p] = 0.0;
        a = new_a;
    }

    (0..n).map(|i| a[i][i]).collect()
}

/// Compactness of every subtree.
///
/// With `weighted`, each pixel's contribution to the moments is scaled by
/// its intensity; subtrees whose total weight is not positive get 1.0.
pub fn compactness<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot, weighted: bool) {
    let shape = tree.shape().to_vec();
    let steps = tree.spacing().as_slice().to_vec();
    let ndim = shape.len();

    let mut moments: Vec<Option<Moments>> = vec![None; tree.slot_count()];
    let order: Vec<NodeId> = tree.post_order().collect();
    let mut coord = vec![0usize; ndim];
    let mut x = vec![0.0; ndim];

    for id in order {
        let node = &tree[id];
        let w = if weighted { level(node.value()) } else { 1.0 };

        let mut m = Moments::zero(ndim);
        for p in tree.links().iter(node.first_pixel()) {
            unravel_index(p, &shape, &mut coord);
            for axis in 0..ndim {
                x[axis] = coord[axis] as f64 * steps[axis];
            }
            m.add_point(&x, w);
        }
        for &c in node.children() {
            if let Some(child) = moments[c].take() {
                m.absorb(&child);
            }
        }

        let value = m.compactness(&steps);
        tree[id].set_attribute(slot, value);
        moments[id] = Some(m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Raster};

    fn slot() -> AttributeSlot {
        AttributeSlot::new(0).unwrap()
    }

    #[test]
    fn test_jacobi_diagonal() {
        let m = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
        let mut e = jacobi_eigenvalues(&m, 2);
        e.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((e[0] - 1.0).abs() < 1e-9);
        assert!((e[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_is_compact() {
        let mut data = vec![0u8; 25];
        for r in 1..4 {
            for c in 1..4 {
                data[r * 5 + c] = 9;
            }
        }
        let raster = Raster::from_vec(data, &[5, 5]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        compactness(&mut tree, slot(), false);
        let leaf = tree.leaves().next().unwrap();
        assert!((tree[leaf].attribute(slot()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_is_elongated() {
        let mut data = vec![0u8; 15];
        for c in 1..4 {
            data[5 + c] = 9;
        }
        let raster = Raster::from_vec(data, &[3, 5]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        compactness(&mut tree, slot(), false);
        let leaf = tree.leaves().next().unwrap();
        // variances 1/12 and 2/3 + 1/12
        assert!((tree[leaf].attribute(slot()) - 1.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_pixel_and_weighted() {
        let raster = Raster::from_vec(vec![0u8, 0, 5, 0], &[2, 2]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        compactness(&mut tree, slot(), true);
        let leaf = tree.leaves().next().unwrap();
        assert!((tree[leaf].attribute(slot()) - 1.0).abs() < 1e-9);
        // root pixels weigh 0 but the leaf's weight carries over
        assert!((tree[tree.root()].attribute(slot()) - 1.0).abs() < 1e-9);
    }
}
