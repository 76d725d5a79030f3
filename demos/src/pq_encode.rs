use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use pq_quantization::text_io::{read_codebook_file, read_vectors_file, write_codes_file};
use pq_quantization::{
    CodeMatrix, CodeStoreType, CodeWidth, DistanceMode, EncoderConfig, EncodingError, PqEncoder,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Encode a text dataset with a precomputed product quantization codebook.
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Args {
    /// Variables file (`Ds M verbose x y z`) or a `.json` config
    #[clap(long, default_value = "outs/variables.txt")]
    pub config: PathBuf,

    /// One vector per line
    #[clap(long, default_value = "outs/vecs.txt")]
    pub vectors: PathBuf,

    /// Codewords in (subspace, codeword, component) order
    #[clap(long, default_value = "outs/codewords.txt")]
    pub codebook: PathBuf,

    #[clap(long, default_value = "outs/encoded.txt")]
    pub output: PathBuf,

    #[clap(long, value_enum, default_value_t = Distance::Squared)]
    pub distance: Distance,

    /// Encoding threads, defaults to the number of CPUs
    #[clap(long)]
    pub threads: Option<usize>,

    #[clap(long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Distance {
    Squared,
    Euclidean,
}

impl From<Distance> for DistanceMode {
    fn from(distance: Distance) -> Self {
        match distance {
            Distance::Squared => DistanceMode::Squared,
            Distance::Euclidean => DistanceMode::Euclidean,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match EncoderConfig::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {}: {err}", args.config.display());
            return ExitCode::FAILURE;
        }
    };

    let level = if args.verbose || config.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &EncoderConfig) -> Result<(), EncodingError> {
    config.validate()?;
    let threads = args.threads.unwrap_or_else(num_cpus::get);

    let vectors = read_vectors_file::<f32>(&args.vectors)?;
    let codebook = read_codebook_file::<f32>(&args.codebook, config.codebook_shape)?;
    info!(
        vectors = vectors.len(),
        dim = config.dim(),
        "loaded {} and {}",
        args.vectors.display(),
        args.codebook.display()
    );

    let encoder = PqEncoder::new(
        codebook,
        config.encoding_parameters(args.distance.into(), threads),
    )?;

    let timer = Instant::now();
    let width = CodeWidth::for_centroids(config.codebook_shape.centroids)?;
    let rows = match width {
        CodeWidth::U8 => encode_to_file::<u8>(&encoder, &vectors, &args.output)?,
        CodeWidth::U16 => encode_to_file::<u16>(&encoder, &vectors, &args.output)?,
        CodeWidth::U32 => encode_to_file::<u32>(&encoder, &vectors, &args.output)?,
    };
    info!(
        rows,
        code_bytes = width.bytes(),
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "codes written to {}",
        args.output.display()
    );
    Ok(())
}

fn encode_to_file<C: CodeStoreType>(
    encoder: &PqEncoder<f32>,
    vectors: &[Vec<f32>],
    output: &Path,
) -> Result<usize, EncodingError> {
    let codes: CodeMatrix<C> = encoder.encode(vectors, || false)?;
    write_codes_file(output, &codes)?;
    Ok(codes.rows())
}
