//! Plain text exchange: whitespace-separated numbers, one record per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use num_traits::Float;

use crate::codebook::{Codebook, CodebookShape};
use crate::codes::{CodeMatrix, CodeStoreType};
use crate::EncodingError;

/// Cap on values reserved before the codebook stream has been counted.
const MAX_PREALLOCATED_VALUES: usize = 1 << 20;

/// Read one vector per non-blank line.
pub fn read_vectors<T, R>(reader: R) -> Result<Vec<Vec<T>>, EncodingError>
where
    T: Float + FromStr,
    R: BufRead,
{
    let mut vectors = Vec::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let vector = line
            .split_whitespace()
            .map(|token| parse_token(line_index + 1, token))
            .collect::<Result<Vec<T>, _>>()?;
        vectors.push(vector);
    }
    Ok(vectors)
}

/// Read a codebook stored as a flat stream of values in `(m, k, d)` order.
///
/// Line breaks carry no meaning, so both one line per subspace and one value per line work.
pub fn read_codebook<T, R>(
    mut reader: R,
    shape: CodebookShape,
) -> Result<Codebook<T>, EncodingError>
where
    T: Float + FromStr,
    R: Read,
{
    shape.validate()?;
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut data = Vec::with_capacity(shape.len().min(MAX_PREALLOCATED_VALUES));
    for (line, token) in numbered_tokens(&text) {
        data.push(parse_token(line, token)?);
    }
    Codebook::from_flat(shape, data)
}

/// Write one row of codes per line, separated by single spaces.
pub fn write_codes<C, W>(mut writer: W, codes: &CodeMatrix<C>) -> Result<(), EncodingError>
where
    C: CodeStoreType,
    W: Write,
{
    for row in codes.iter_rows() {
        for (index, code) in row.iter().enumerate() {
            if index > 0 {
                writer.write_all(b" ")?;
            }
            write!(writer, "{code}")?;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_vectors_file<T>(path: &Path) -> Result<Vec<Vec<T>>, EncodingError>
where
    T: Float + FromStr,
{
    read_vectors(BufReader::new(File::open(path)?))
}

pub fn read_codebook_file<T>(
    path: &Path,
    shape: CodebookShape,
) -> Result<Codebook<T>, EncodingError>
where
    T: Float + FromStr,
{
    read_codebook(BufReader::new(File::open(path)?), shape)
}

pub fn write_codes_file<C: CodeStoreType>(
    path: &Path,
    codes: &CodeMatrix<C>,
) -> Result<(), EncodingError> {
    path.parent().map(std::fs::create_dir_all).transpose()?;
    write_codes(BufWriter::new(File::create(path)?), codes)
}

/// Whitespace-separated tokens with their 1-based line number.
pub(crate) fn numbered_tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .flat_map(|(index, line)| line.split_whitespace().map(move |token| (index + 1, token)))
}

pub(crate) fn parse_token<T: FromStr>(line: usize, token: &str) -> Result<T, EncodingError> {
    token.parse().map_err(|_| EncodingError::ParseError {
        line,
        message: format!("invalid value {token:?}"),
    })
}
