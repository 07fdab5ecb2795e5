//! Text header of the sparse vector image format.
//!
//! One `Key = value` pair per line, values separated by whitespace:
//!
//! ```text
//! NDims = 3
//! DimSize = 2 4 4 4
//! ElementSpacing = 1 1 1 1
//! ElementType = float
//! Offset = 0 0 0
//! TransformMatrix = 1 0 0 0 1 0 0 0 1
//! KeyElementDataFile = image_key.nrrd
//! ValueElementDataFile = image_value.nrrd
//! ```
//!
//! `NDims` is the spatial dimension. The first `DimSize` token is the vector
//! length and the first `ElementSpacing` token is a placeholder. `Offset`,
//! `TransformMatrix` (row-major) and `ElementType` are optional.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::str::FromStr;

/// Largest spatial dimension accepted in a header.
pub const MAX_DIMENSIONS: usize = 16;

/// Parsed sparse image header.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseHeader {
    pub ndims: usize,
    pub vector_length: usize,
    pub size: Vec<usize>,
    pub spacing: Vec<f64>,
    pub element_type: Option<String>,
    pub offset: Option<Vec<f64>>,
    pub transform_matrix: Option<Vec<f64>>,
    pub key_file: String,
    pub value_file: String,
}

fn parse_values<T: FromStr>(key: &str, value: &str) -> Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .with_context(|| format!("Invalid value '{}' for {}", token, key))
        })
        .collect()
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl SparseHeader {
    /// Parse header text. Unknown keys and `#` comments are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut ndims = None;
        let mut dim_size: Option<Vec<usize>> = None;
        let mut element_spacing: Option<Vec<f64>> = None;
        let mut element_type = None;
        let mut offset = None;
        let mut transform_matrix = None;
        let mut key_file = None;
        let mut value_file = None;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                bail!("Line {}: expected 'Key = value', got '{}'", line_no + 1, line);
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "NDims" => {
                    ndims = Some(
                        value
                            .parse::<usize>()
                            .with_context(|| format!("Invalid NDims '{}'", value))?,
                    )
                }
                "DimSize" => dim_size = Some(parse_values(key, value)?),
                "ElementSpacing" => element_spacing = Some(parse_values(key, value)?),
                "ElementType" => element_type = Some(value.to_string()),
                "Offset" => offset = Some(parse_values(key, value)?),
                "TransformMatrix" => transform_matrix = Some(parse_values(key, value)?),
                "KeyElementDataFile" => key_file = Some(value.to_string()),
                "ValueElementDataFile" => value_file = Some(value.to_string()),
                other => tracing::debug!("Ignoring header key '{}'", other),
            }
        }

        let ndims = ndims.context("Missing NDims")?;
        if ndims == 0 || ndims > MAX_DIMENSIONS {
            bail!("NDims {} is outside 1..={}", ndims, MAX_DIMENSIONS);
        }
        let dim_size = dim_size.context("Missing DimSize")?;
        let element_spacing = element_spacing.context("Missing ElementSpacing")?;
        let key_file = key_file.context("Missing KeyElementDataFile")?;
        let value_file = value_file.context("Missing ValueElementDataFile")?;

        if dim_size.len() != ndims + 1 {
            bail!(
                "DimSize has {} values, expected vector length plus {} sizes",
                dim_size.len(),
                ndims
            );
        }
        if element_spacing.len() != ndims + 1 {
            bail!(
                "ElementSpacing has {} values, expected {}",
                element_spacing.len(),
                ndims + 1
            );
        }
        if let Some(offset) = &offset {
            if offset.len() != ndims {
                bail!("Offset has {} values, expected {}", offset.len(), ndims);
            }
        }
        if let Some(matrix) = &transform_matrix {
            if matrix.len() != ndims * ndims {
                bail!(
                    "TransformMatrix has {} values, expected {}",
                    matrix.len(),
                    ndims * ndims
                );
            }
        }

        Ok(Self {
            ndims,
            vector_length: dim_size[0],
            size: dim_size[1..].to_vec(),
            spacing: element_spacing[1..].to_vec(),
            element_type,
            offset,
            transform_matrix,
            key_file,
            value_file,
        })
    }

    /// Number of addressable cells, or `None` if it overflows `usize`.
    pub fn number_of_pixels(&self) -> Option<usize> {
        self.size.iter().try_fold(1usize, |acc, &s| acc.checked_mul(s))
    }
}

impl FromStr for SparseHeader {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SparseHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NDims = {}", self.ndims)?;
        writeln!(f, "DimSize = {} {}", self.vector_length, join(&self.size))?;
        writeln!(f, "ElementSpacing = 1 {}", join(&self.spacing))?;
        if let Some(element_type) = &self.element_type {
            writeln!(f, "ElementType = {}", element_type)?;
        }
        if let Some(offset) = &self.offset {
            writeln!(f, "Offset = {}", join(offset))?;
        }
        if let Some(matrix) = &self.transform_matrix {
            writeln!(f, "TransformMatrix = {}", join(matrix))?;
        }
        writeln!(f, "KeyElementDataFile = {}", self.key_file)?;
        writeln!(f, "ValueElementDataFile = {}", self.value_file)
    }
}
