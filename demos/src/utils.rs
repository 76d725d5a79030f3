use pq_quantization::distance::squared_l2;
use pq_quantization::{Codebook, CodebookShape, CodeMatrix, CodeStoreType, PqEncoder};
use rand::Rng;

pub fn random_vectors(rng: &mut impl Rng, count: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|_| (0..dim).map(|_| rng.gen::<f32>()).collect())
        .collect()
}

/// Codebook whose codewords are subvectors of randomly picked dataset vectors.
pub fn sample_codebook(
    rng: &mut impl Rng,
    data: &[Vec<f32>],
    shape: CodebookShape,
) -> Codebook<f32> {
    let mut codewords = Vec::with_capacity(shape.len());
    for subspace in 0..shape.subspaces {
        let range = subspace * shape.subspace_dim..(subspace + 1) * shape.subspace_dim;
        for _ in 0..shape.centroids {
            let vector = &data[rng.gen_range(0..data.len())];
            codewords.extend_from_slice(&vector[range.clone()]);
        }
    }
    Codebook::from_flat(shape, codewords).unwrap()
}

/// Mean squared distance between every vector and its reconstruction.
pub fn mean_distortion<C: CodeStoreType>(
    encoder: &PqEncoder<f32>,
    data: &[Vec<f32>],
    codes: &CodeMatrix<C>,
) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let total: f32 = data
        .iter()
        .zip(codes.iter_rows())
        .map(|(vector, row)| squared_l2(vector, &encoder.decode_vector(row).unwrap()))
        .sum();
    total / data.len() as f32
}
