//! Per-pixel singly linked lists holding each node's own pixels

/// Marks the last pixel of a node's list
const END: usize = usize::MAX;
/// Marks a pixel that belongs to no list
const UNLINKED: usize = usize::MAX - 1;

/// One "next" slot per image pixel.
///
/// Every node owns a segment described by its head and tail pixel; two
/// segments are joined in O(1) by pointing the first tail at the second head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelLinks {
    next: Vec<usize>,
}

impl PixelLinks {
    /// Links for `len` pixels, none of them attached to a list
    pub fn new(len: usize) -> Self {
        Self {
            next: vec![UNLINKED; len],
        }
    }

    /// Number of pixels covered
    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Pixel following `pixel` in its list, if any
    pub fn next(&self, pixel: usize) -> Option<usize> {
        match self.next.get(pixel) {
            Some(&n) if n != END && n != UNLINKED => Some(n),
            _ => None,
        }
    }

    /// Whether `pixel` currently belongs to some list
    pub fn is_linked(&self, pixel: usize) -> bool {
        matches!(self.next.get(pixel), Some(&n) if n != UNLINKED)
    }

    /// Terminate a list at `pixel`
    pub(crate) fn set_end(&mut self, pixel: usize) {
        self.next[pixel] = END;
    }

    /// Detach `pixel` from any list
    pub(crate) fn unlink(&mut self, pixel: usize) {
        self.next[pixel] = UNLINKED;
    }

    /// Make `to` follow `from`
    pub(crate) fn join(&mut self, from: usize, to: usize) {
        self.next[from] = to;
    }

    /// Walk a list starting at `head`
    pub fn iter(&self, head: Option<usize>) -> PixelIter<'_> {
        PixelIter {
            links: self,
            current: head,
        }
    }
}

/// Iterator over the pixels of one list
#[derive(Debug, Clone)]
pub struct PixelIter<'a> {
    links: &'a PixelLinks,
    current: Option<usize>,
}

impl Iterator for PixelIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let pixel = self.current?;
        self.current = self.links.next(pixel);
        Some(pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_walk() {
        let mut links = PixelLinks::new(6);
        links.join(4, 1);
        links.join(1, 3);
        links.set_end(3);

        let pixels: Vec<usize> = links.iter(Some(4)).collect();
        assert_eq!(pixels, vec![4, 1, 3]);
        assert!(links.is_linked(3));
        assert!(!links.is_linked(0));
        assert_eq!(links.iter(None).count(), 0);
    }

    #[test]
    fn test_unlink() {
        let mut links = PixelLinks::new(2);
        links.set_end(0);
        assert!(links.is_linked(0));
        links.unlink(0);
        assert!(!links.is_linked(0));
        assert_eq!(links.next(0), None);
    }
}
