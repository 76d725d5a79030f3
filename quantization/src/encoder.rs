use num_traits::Float;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codebook::Codebook;
use crate::codes::{CodeMatrix, CodeStoreType};
use crate::distance::DistanceMode;
use crate::EncodingError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParameters {
    /// Dimension `D` of every input vector.
    pub dim: usize,
    #[serde(default)]
    pub distance: DistanceMode,
    /// Worker threads used by `encode`. `0` and `1` both mean the calling thread only.
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
}

fn default_max_threads() -> usize {
    1
}

impl EncodingParameters {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            distance: DistanceMode::default(),
            max_threads: default_max_threads(),
        }
    }
}

/// Product quantization encoder: maps vectors to one codeword index per subspace.
pub struct PqEncoder<T> {
    codebook: Codebook<T>,
    parameters: EncodingParameters,
}

impl<T: Float + Send + Sync> PqEncoder<T> {
    pub fn new(
        codebook: Codebook<T>,
        parameters: EncodingParameters,
    ) -> Result<Self, EncodingError> {
        let shape = codebook.shape();
        shape.validate()?;
        if parameters.dim != shape.dim() {
            return Err(EncodingError::ConfigurationError(format!(
                "vector dimension {} is not {} subspaces of size {}",
                parameters.dim, shape.subspaces, shape.subspace_dim
            )));
        }
        Ok(Self {
            codebook,
            parameters,
        })
    }

    pub fn codebook(&self) -> &Codebook<T> {
        &self.codebook
    }

    pub fn parameters(&self) -> &EncodingParameters {
        &self.parameters
    }

    /// Encode every vector of `data`.
    ///
    /// All vectors are checked before any work starts, a single vector of wrong dimension
    /// rejects the whole run. `stop_condition` is polled before each subspace.
    pub fn encode<C, V>(
        &self,
        data: &[V],
        stop_condition: impl Fn() -> bool + Sync,
    ) -> Result<CodeMatrix<C>, EncodingError>
    where
        C: CodeStoreType,
        V: AsRef<[T]> + Sync,
    {
        self.validate_code_type::<C>()?;
        self.validate_data(data)?;

        let shape = self.codebook.shape();
        info!(
            vectors = data.len(),
            subspaces = shape.subspaces,
            centroids = shape.centroids,
            threads = self.parameters.max_threads,
            "encoding vectors"
        );

        let mut codes = CodeMatrix::<C>::zeroed(data.len(), shape.subspaces);
        if self.parameters.max_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.parameters.max_threads)
                .thread_name(|index| format!("pq-encode-{index}"))
                .build()
                .map_err(|err| {
                    EncodingError::ConfigurationError(format!(
                        "failed to start encoding threads: {err}"
                    ))
                })?;
            pool.install(|| self.encode_subspaces(data, &mut codes, &stop_condition, true))?;
        } else {
            self.encode_subspaces(data, &mut codes, &stop_condition, false)?;
        }

        info!(vectors = codes.rows(), "encoding finished");
        Ok(codes)
    }

    pub fn encode_vector<C: CodeStoreType>(&self, vector: &[T]) -> Result<Vec<C>, EncodingError> {
        self.validate_code_type::<C>()?;
        self.validate_vector(0, vector)?;
        let subspace_dim = self.codebook.shape().subspace_dim;
        Ok(vector
            .chunks_exact(subspace_dim)
            .enumerate()
            .map(|(subspace, subvector)| C::from_index(self.nearest_centroid(subspace, subvector)))
            .collect())
    }

    /// Reconstruct a vector from its codes by concatenating the selected codewords.
    pub fn decode_vector<C: CodeStoreType>(&self, codes: &[C]) -> Result<Vec<T>, EncodingError> {
        let shape = self.codebook.shape();
        if codes.len() != shape.subspaces {
            return Err(EncodingError::ConfigurationError(format!(
                "expected {} codes, got {}",
                shape.subspaces,
                codes.len()
            )));
        }
        let mut vector = Vec::with_capacity(shape.dim());
        for (subspace, code) in codes.iter().enumerate() {
            let centroid = code.to_index();
            if centroid >= shape.centroids {
                return Err(EncodingError::ConfigurationError(format!(
                    "code {centroid} of subspace {subspace} is out of range 0..{}",
                    shape.centroids
                )));
            }
            vector.extend_from_slice(self.codebook.codeword(subspace, centroid));
        }
        Ok(vector)
    }

    fn encode_subspaces<C, V>(
        &self,
        data: &[V],
        codes: &mut CodeMatrix<C>,
        stop_condition: &(impl Fn() -> bool + Sync),
        parallel: bool,
    ) -> Result<(), EncodingError>
    where
        C: CodeStoreType,
        V: AsRef<[T]> + Sync,
    {
        let shape = self.codebook.shape();
        for subspace in 0..shape.subspaces {
            if stop_condition() {
                return Err(EncodingError::Stopped);
            }
            debug!("Encoding the subspace: {} / {}", subspace + 1, shape.subspaces);

            let range = subspace * shape.subspace_dim..(subspace + 1) * shape.subspace_dim;
            if parallel {
                codes
                    .codes
                    .par_chunks_mut(shape.subspaces)
                    .zip(data.par_iter())
                    .for_each(|(row, vector)| {
                        let subvector = &vector.as_ref()[range.clone()];
                        row[subspace] = C::from_index(self.nearest_centroid(subspace, subvector));
                    });
            } else {
                for (row, vector) in codes.codes.chunks_exact_mut(shape.subspaces).zip(data) {
                    let subvector = &vector.as_ref()[range.clone()];
                    row[subspace] = C::from_index(self.nearest_centroid(subspace, subvector));
                }
            }
        }
        Ok(())
    }

    /// Index of the closest codeword of `subspace`; the lowest index wins ties.
    #[inline]
    fn nearest_centroid(&self, subspace: usize, subvector: &[T]) -> usize {
        let distance_mode = self.parameters.distance;
        let mut min_distance = T::infinity();
        let mut min_centroid_index = 0;
        for (centroid_index, centroid) in self.codebook.subspace(subspace).enumerate() {
            let distance = distance_mode.distance(subvector, centroid);
            if distance < min_distance {
                min_distance = distance;
                min_centroid_index = centroid_index;
            }
        }
        min_centroid_index
    }

    fn validate_code_type<C: CodeStoreType>(&self) -> Result<(), EncodingError> {
        let centroids = self.codebook.shape().centroids;
        if centroids > C::max_centroids() {
            return Err(EncodingError::ConfigurationError(format!(
                "{centroids} codewords per subspace do not fit into a code type of {} values",
                C::max_centroids()
            )));
        }
        Ok(())
    }

    fn validate_data<V: AsRef<[T]>>(&self, data: &[V]) -> Result<(), EncodingError> {
        data.iter()
            .enumerate()
            .try_for_each(|(index, vector)| self.validate_vector(index, vector.as_ref()))
    }

    fn validate_vector(&self, index: usize, vector: &[T]) -> Result<(), EncodingError> {
        if vector.len() != self.parameters.dim {
            return Err(EncodingError::ShapeError {
                what: "vector",
                index,
                expected: self.parameters.dim,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}
