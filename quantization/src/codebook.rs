use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::EncodingError;

/// Dimensions of a codebook tensor in `(m, k, d)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookShape {
    /// Number of subspaces, `M`.
    pub subspaces: usize,
    /// Codewords per subspace, `K`.
    pub centroids: usize,
    /// Length of one codeword, `Ds`.
    pub subspace_dim: usize,
}

impl CodebookShape {
    pub fn new(subspaces: usize, centroids: usize, subspace_dim: usize) -> Self {
        Self {
            subspaces,
            centroids,
            subspace_dim,
        }
    }

    /// Dimension of the full vectors this codebook encodes.
    pub fn dim(&self) -> usize {
        self.subspaces * self.subspace_dim
    }

    /// Total number of scalars held by a codebook of this shape.
    pub fn len(&self) -> usize {
        self.subspaces * self.centroids * self.subspace_dim
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), EncodingError> {
        if self.subspaces == 0 {
            return Err(EncodingError::ConfigurationError(
                "codebook must have at least one subspace".to_string(),
            ));
        }
        if self.centroids == 0 {
            return Err(EncodingError::ConfigurationError(
                "codebook must have at least one codeword per subspace".to_string(),
            ));
        }
        if self.subspace_dim == 0 {
            return Err(EncodingError::ConfigurationError(
                "subspace dimension must be positive".to_string(),
            ));
        }
        let total = self
            .subspaces
            .checked_mul(self.centroids)
            .and_then(|v| v.checked_mul(self.subspace_dim));
        if total.is_none() {
            return Err(EncodingError::ConfigurationError(format!(
                "codebook shape {}x{}x{} is too large",
                self.subspaces, self.centroids, self.subspace_dim
            )));
        }
        Ok(())
    }
}

/// Per-subspace codewords stored in one allocation.
///
/// Element `(m, k, d)` lives at `(m * K + k) * Ds + d`.
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook<T> {
    shape: CodebookShape,
    data: Vec<T>,
}

impl<T: Float> Codebook<T> {
    pub fn from_flat(shape: CodebookShape, data: Vec<T>) -> Result<Self, EncodingError> {
        shape.validate()?;
        if data.len() != shape.len() {
            return Err(EncodingError::ConfigurationError(format!(
                "codebook of shape {}x{}x{} needs {} values, got {}",
                shape.subspaces,
                shape.centroids,
                shape.subspace_dim,
                shape.len(),
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build a codebook from `codewords[m][k][d]`.
    pub fn from_nested(codewords: Vec<Vec<Vec<T>>>) -> Result<Self, EncodingError> {
        let subspaces = codewords.len();
        let centroids = codewords.first().map(|c| c.len()).unwrap_or(0);
        let subspace_dim = codewords
            .first()
            .and_then(|c| c.first())
            .map(|c| c.len())
            .unwrap_or(0);
        let shape = CodebookShape::new(subspaces, centroids, subspace_dim);
        shape.validate()?;

        let mut data = Vec::with_capacity(shape.len());
        for (subspace_index, subspace) in codewords.into_iter().enumerate() {
            if subspace.len() != centroids {
                return Err(EncodingError::ConfigurationError(format!(
                    "subspace {subspace_index} has {} codewords, expected {centroids}",
                    subspace.len()
                )));
            }
            for (codeword_index, codeword) in subspace.into_iter().enumerate() {
                if codeword.len() != subspace_dim {
                    return Err(EncodingError::ShapeError {
                        what: "codeword",
                        index: subspace_index * centroids + codeword_index,
                        expected: subspace_dim,
                        actual: codeword.len(),
                    });
                }
                data.extend(codeword);
            }
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> CodebookShape {
        self.shape
    }

    #[inline]
    pub fn codeword(&self, subspace: usize, centroid: usize) -> &[T] {
        let ds = self.shape.subspace_dim;
        let start = (subspace * self.shape.centroids + centroid) * ds;
        &self.data[start..start + ds]
    }

    /// Codewords of one subspace in index order.
    pub fn subspace(&self, subspace: usize) -> std::slice::ChunksExact<'_, T> {
        let block = self.shape.centroids * self.shape.subspace_dim;
        self.data[subspace * block..(subspace + 1) * block].chunks_exact(self.shape.subspace_dim)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_layout() {
        let shape = CodebookShape::new(2, 3, 2);
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let codebook = Codebook::from_flat(shape, data).unwrap();

        assert_eq!(codebook.codeword(0, 0), &[0.0, 1.0]);
        assert_eq!(codebook.codeword(0, 2), &[4.0, 5.0]);
        assert_eq!(codebook.codeword(1, 1), &[8.0, 9.0]);
        assert_eq!(codebook.subspace(1).count(), 3);
        assert_eq!(codebook.subspace(1).next().unwrap(), &[6.0, 7.0]);
        assert_eq!(shape.dim(), 4);
    }

    #[test]
    fn test_nested_matches_flat() {
        let nested = vec![
            vec![vec![0.0f64, 0.0], vec![10.0, 10.0]],
            vec![vec![0.0, 0.0], vec![5.0, 5.0]],
        ];
        let codebook = Codebook::from_nested(nested).unwrap();
        let flat = Codebook::from_flat(
            CodebookShape::new(2, 2, 2),
            vec![0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 5.0, 5.0],
        )
        .unwrap();
        assert_eq!(codebook, flat);
    }

    #[test]
    fn test_wrong_length() {
        let result = Codebook::from_flat(CodebookShape::new(1, 2, 2), vec![0.0f32; 3]);
        assert!(matches!(result, Err(EncodingError::ConfigurationError(_))));
    }

    #[test]
    fn test_empty_subspace_rejected() {
        let result = Codebook::<f32>::from_flat(CodebookShape::new(2, 0, 4), vec![]);
        assert!(matches!(result, Err(EncodingError::ConfigurationError(_))));

        let result = Codebook::<f32>::from_nested(vec![vec![], vec![]]);
        assert!(matches!(result, Err(EncodingError::ConfigurationError(_))));
    }

    #[test]
    fn test_oversized_shape() {
        let shape = CodebookShape::new(usize::MAX / 2, 4, 4);
        assert!(matches!(
            shape.validate(),
            Err(EncodingError::ConfigurationError(_))
        ));
        let result = Codebook::from_flat(shape, vec![0.0f32; 3]);
        assert!(matches!(result, Err(EncodingError::ConfigurationError(_))));
    }

    #[test]
    fn test_ragged_codeword() {
        let nested = vec![vec![vec![0.0f32, 0.0], vec![1.0]]];
        match Codebook::from_nested(nested) {
            Err(EncodingError::ShapeError {
                index,
                expected,
                actual,
                ..
            }) => {
                assert_eq!(index, 1);
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            _ => panic!("expected shape error"),
        }
    }

    #[test]
    fn test_ragged_subspace() {
        let nested = vec![
            vec![vec![0.0f32], vec![1.0]],
            vec![vec![0.0]],
        ];
        assert!(matches!(
            Codebook::from_nested(nested),
            Err(EncodingError::ConfigurationError(_))
        ));
    }
}
