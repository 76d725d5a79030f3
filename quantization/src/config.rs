use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codebook::CodebookShape;
use crate::distance::DistanceMode;
use crate::encoder::EncodingParameters;
use crate::text_io::{numbered_tokens, parse_token};
use crate::EncodingError;

/// Scalar settings shipped alongside a dataset and its codebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// `Ds`
    pub subspace_dim: usize,
    /// `M`
    pub subspaces: usize,
    #[serde(default)]
    pub verbose: bool,
    pub codebook_shape: CodebookShape,
}

impl EncoderConfig {
    /// Parse the variables format: `Ds M verbose x y z`, whitespace separated.
    pub fn from_variables(mut reader: impl Read) -> Result<Self, EncodingError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut tokens = numbered_tokens(&text);
        let mut last_line = 1;
        let mut next = |name: &str| match tokens.next() {
            Some((line, token)) => {
                last_line = line;
                Ok((line, token))
            }
            None => Err(EncodingError::ParseError {
                line: last_line,
                message: format!("missing {name}"),
            }),
        };

        let (line, token) = next("subspace dimension")?;
        let subspace_dim: usize = parse_token(line, token)?;
        let (line, token) = next("number of subspaces")?;
        let subspaces: usize = parse_token(line, token)?;
        let (line, token) = next("verbose flag")?;
        let verbose = parse_flag(line, token)?;
        let (line, token) = next("codebook subspaces")?;
        let shape_subspaces: usize = parse_token(line, token)?;
        let (line, token) = next("codebook centroids")?;
        let shape_centroids: usize = parse_token(line, token)?;
        let (line, token) = next("codebook subspace dimension")?;
        let shape_subspace_dim: usize = parse_token(line, token)?;

        Ok(Self {
            subspace_dim,
            subspaces,
            verbose,
            codebook_shape: CodebookShape::new(
                shape_subspaces,
                shape_centroids,
                shape_subspace_dim,
            ),
        })
    }

    /// Load a config file; `.json` files are parsed as JSON, anything else as variables text.
    pub fn load(path: &Path) -> Result<Self, EncodingError> {
        let file = File::open(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            serde_json::from_reader(file).map_err(|err| EncodingError::ParseError {
                line: err.line(),
                message: err.to_string(),
            })
        } else {
            Self::from_variables(file)
        }
    }

    pub fn validate(&self) -> Result<(), EncodingError> {
        self.codebook_shape.validate()?;
        if self.codebook_shape.subspaces != self.subspaces {
            return Err(EncodingError::ConfigurationError(format!(
                "codebook has {} subspaces, expected {}",
                self.codebook_shape.subspaces, self.subspaces
            )));
        }
        if self.codebook_shape.subspace_dim != self.subspace_dim {
            return Err(EncodingError::ConfigurationError(format!(
                "codewords have dimension {}, expected {}",
                self.codebook_shape.subspace_dim, self.subspace_dim
            )));
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.subspaces * self.subspace_dim
    }

    pub fn encoding_parameters(
        &self,
        distance: DistanceMode,
        max_threads: usize,
    ) -> EncodingParameters {
        EncodingParameters {
            dim: self.dim(),
            distance,
            max_threads,
        }
    }
}

fn parse_flag(line: usize, token: &str) -> Result<bool, EncodingError> {
    match token {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        _ => Err(EncodingError::ParseError {
            line,
            message: format!("invalid flag {token:?}"),
        }),
    }
}
