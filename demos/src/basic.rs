mod utils;

use pq_quantization::{CodeMatrix, CodebookShape, EncodingParameters, PqEncoder};
use rand::SeedableRng;

fn main() {
    let vectors_count = 10_000;
    let shape = CodebookShape::new(16, 256, 4);

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let vector_data = utils::random_vectors(&mut rng, vectors_count, shape.dim());
    let codebook = utils::sample_codebook(&mut rng, &vector_data, shape);

    for threads in [1, num_cpus::get()] {
        let parameters = EncodingParameters {
            max_threads: threads,
            ..EncodingParameters::new(shape.dim())
        };
        let encoder = PqEncoder::new(codebook.clone(), parameters).unwrap();

        let timer = std::time::Instant::now();
        let codes: CodeMatrix<u8> = encoder.encode(&vector_data, || false).unwrap();
        println!(
            "threads: {}, encoding time: {}ms",
            threads,
            timer.elapsed().as_millis()
        );
        println!(
            "mean distortion: {}",
            utils::mean_distortion(&encoder, &vector_data, &codes)
        );
    }
    println!(
        "original size: {} bytes, encoded size: {} bytes",
        vectors_count * shape.dim() * std::mem::size_of::<f32>(),
        vectors_count * shape.subspaces
    );
}
