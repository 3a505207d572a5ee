//! Dense multi-dimensional storage indexed by 1-based action tuples.
//!
//! The tensor maps an index tuple to a flat offset by mixed-radix composition,
//! with the first dimension most significant:
//!
//! ```text
//! offset = ((idx[0]-1) * size[1] + (idx[1]-1)) * size[2] + ... + (idx[n-1]-1)
//! ```
//!
//! No bounds checking is performed on the logical indices beyond what slice
//! indexing does; callers (profile iterators) are trusted to stay in range.

use serde::{Deserialize, Serialize};

/// Generic tensor keyed by per-dimension 1-based indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericTensor<T> {
    dimensions: Vec<usize>,
    values: Vec<T>,
}

impl<T: Clone> GenericTensor<T> {
    /// Create a tensor with the given dimension sizes, every cell set to `fill`.
    pub fn new(dimensions: &[usize], fill: T) -> Self {
        let size = dimensions.iter().product();
        Self {
            dimensions: dimensions.to_vec(),
            values: vec![fill; size],
        }
    }

    /// Re-shape the tensor, discarding the previous contents.
    pub fn init(&mut self, dimensions: &[usize], fill: T) {
        *self = Self::new(dimensions, fill);
    }
}

impl<T> GenericTensor<T> {
    /// Translate a 1-based index tuple into a flat offset.
    pub fn offset(&self, indices: &[usize]) -> usize {
        let mut offset = indices[0] - 1;
        for (dim, &index) in indices.iter().enumerate().skip(1) {
            offset *= self.dimensions[dim];
            offset += index - 1;
        }
        offset
    }

    /// Inverse of [`offset`](Self::offset): rebuild the 1-based index tuple.
    pub fn indices(&self, mut offset: usize) -> Vec<usize> {
        let mut indices = vec![0; self.dimensions.len()];
        for dim in (0..self.dimensions.len()).rev() {
            let size = self.dimensions[dim];
            indices[dim] = offset % size + 1;
            offset /= size;
        }
        indices
    }

    /// Value stored at an index tuple.
    pub fn get(&self, indices: &[usize]) -> &T {
        &self.values[self.offset(indices)]
    }

    /// Mutable value stored at an index tuple.
    pub fn get_mut(&mut self, indices: &[usize]) -> &mut T {
        let offset = self.offset(indices);
        &mut self.values[offset]
    }

    /// Overwrite the value at an index tuple.
    pub fn set(&mut self, indices: &[usize], value: T) {
        let offset = self.offset(indices);
        self.values[offset] = value;
    }

    /// Value at a flat offset.
    pub fn get_flat(&self, offset: usize) -> &T {
        &self.values[offset]
    }

    /// Mutable value at a flat offset.
    pub fn get_flat_mut(&mut self, offset: usize) -> &mut T {
        &mut self.values[offset]
    }

    /// Overwrite the value at a flat offset.
    pub fn set_flat(&mut self, offset: usize, value: T) {
        self.values[offset] = value;
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Number of dimensions.
    pub fn num_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// Size of a single dimension (0-based dimension index).
    pub fn size_of_dim(&self, dim: usize) -> usize {
        self.dimensions[dim]
    }

    /// All dimension sizes.
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Iterate over all cells in flat-offset order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Mutably iterate over all cells in flat-offset order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.values.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_mixed_radix() {
        let tensor = GenericTensor::new(&[2, 3, 4], 0u8);
        assert_eq!(tensor.size(), 24);
        assert_eq!(tensor.offset(&[1, 1, 1]), 0);
        assert_eq!(tensor.offset(&[1, 1, 2]), 1);
        assert_eq!(tensor.offset(&[1, 2, 1]), 4);
        assert_eq!(tensor.offset(&[2, 1, 1]), 12);
        assert_eq!(tensor.offset(&[2, 3, 4]), 23);
    }

    #[test]
    fn test_indices_inverts_offset() {
        let tensor = GenericTensor::new(&[3, 2, 5], 0u8);
        for offset in 0..tensor.size() {
            let indices = tensor.indices(offset);
            assert_eq!(tensor.offset(&indices), offset);
        }
    }

    #[test]
    fn test_get_set_by_tuple_and_flat() {
        let mut tensor = GenericTensor::new(&[2, 2], 0.0f64);
        tensor.set(&[2, 1], 3.5);
        assert_eq!(*tensor.get(&[2, 1]), 3.5);
        assert_eq!(*tensor.get_flat(2), 3.5);

        tensor.set_flat(3, -1.0);
        assert_eq!(*tensor.get(&[2, 2]), -1.0);

        *tensor.get_mut(&[1, 2]) += 2.0;
        assert_eq!(*tensor.get_flat(1), 2.0);
    }

    #[test]
    fn test_init_reshapes() {
        let mut tensor = GenericTensor::new(&[2], 1u32);
        tensor.init(&[3, 3], 7);
        assert_eq!(tensor.num_dimensions(), 2);
        assert_eq!(tensor.size_of_dim(1), 3);
        assert!(tensor.values().all(|&v| v == 7));
    }
}
