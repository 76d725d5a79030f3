use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::EncodingError;

/// Integer type a code matrix stores its codeword indexes in.
pub trait CodeStoreType: Copy + Default + Display + Send + Sync + 'static {
    /// Largest codebook size `K` whose indexes fit into this type.
    fn max_centroids() -> usize;

    /// Caller guarantees `index < max_centroids()`.
    fn from_index(index: usize) -> Self;

    fn to_index(self) -> usize;
}

impl CodeStoreType for u8 {
    fn max_centroids() -> usize {
        u8::MAX as usize + 1
    }

    fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::max_centroids());
        index as u8
    }

    fn to_index(self) -> usize {
        self as usize
    }
}

impl CodeStoreType for u16 {
    fn max_centroids() -> usize {
        u16::MAX as usize + 1
    }

    fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::max_centroids());
        index as u16
    }

    fn to_index(self) -> usize {
        self as usize
    }
}

impl CodeStoreType for u32 {
    fn max_centroids() -> usize {
        (u32::MAX as usize).saturating_add(1)
    }

    fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::max_centroids());
        index as u32
    }

    fn to_index(self) -> usize {
        self as usize
    }
}

/// Narrowest code type able to address a codebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeWidth {
    U8,
    U16,
    U32,
}

impl CodeWidth {
    pub fn for_centroids(centroids: usize) -> Result<Self, EncodingError> {
        if centroids == 0 {
            Err(EncodingError::ConfigurationError(
                "codebook must have at least one codeword per subspace".to_string(),
            ))
        } else if centroids <= u8::max_centroids() {
            Ok(CodeWidth::U8)
        } else if centroids <= u16::max_centroids() {
            Ok(CodeWidth::U16)
        } else if centroids <= u32::max_centroids() {
            Ok(CodeWidth::U32)
        } else {
            Err(EncodingError::ConfigurationError(format!(
                "{centroids} codewords per subspace do not fit into 32-bit codes"
            )))
        }
    }

    pub fn bytes(&self) -> usize {
        match self {
            CodeWidth::U8 => 1,
            CodeWidth::U16 => 2,
            CodeWidth::U32 => 4,
        }
    }
}

/// `rows x subspaces` matrix of codes, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatrix<C: CodeStoreType> {
    pub(crate) codes: Vec<C>,
    pub(crate) rows: usize,
    pub(crate) subspaces: usize,
}

impl<C: CodeStoreType> CodeMatrix<C> {
    pub(crate) fn zeroed(rows: usize, subspaces: usize) -> Self {
        Self {
            codes: vec![C::default(); rows * subspaces],
            rows,
            subspaces,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn subspaces(&self) -> usize {
        self.subspaces
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[C] {
        &self.codes[index * self.subspaces..(index + 1) * self.subspaces]
    }

    #[inline]
    pub fn get(&self, row: usize, subspace: usize) -> usize {
        self.codes[row * self.subspaces + subspace].to_index()
    }

    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, C> {
        // `chunks_exact` rejects a zero chunk size; an encoder never produces zero subspaces
        self.codes.chunks_exact(self.subspaces.max(1))
    }

    pub fn as_slice(&self) -> &[C] {
        &self.codes
    }
}
