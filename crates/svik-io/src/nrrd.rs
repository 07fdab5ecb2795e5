//! Minimal NRRD support for the 1-D key and value data files.
//!
//! Writes attached-header, raw, little-endian files. Reads raw files of
//! either endianness; other encodings and detached data are rejected.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::Path;

/// Scalar types that can be stored in an NRRD data file.
pub trait NrrdElement: Copy + Sized {
    /// Canonical NRRD type name.
    const TYPE_NAME: &'static str;
    const SIZE: usize;

    fn extend_le(self, out: &mut Vec<u8>);
    fn from_le(bytes: &[u8]) -> Self;
    fn from_be(bytes: &[u8]) -> Self;
}

macro_rules! impl_nrrd_element {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl NrrdElement for $t {
                const TYPE_NAME: &'static str = $name;
                const SIZE: usize = std::mem::size_of::<$t>();

                fn extend_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn from_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_le_bytes(buf)
                }

                fn from_be(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_be_bytes(buf)
                }
            }
        )*
    };
}

impl_nrrd_element!(
    i8 => "int8",
    u8 => "uint8",
    i16 => "int16",
    u16 => "uint16",
    i32 => "int32",
    u32 => "uint32",
    i64 => "int64",
    u64 => "uint64",
    f32 => "float",
    f64 => "double",
);

/// Map an NRRD type spelling to its canonical name.
pub fn canonical_type_name(name: &str) -> Option<&'static str> {
    let canonical = match name.trim() {
        "signed char" | "int8" | "int8_t" => "int8",
        "uchar" | "unsigned char" | "uint8" | "uint8_t" => "uint8",
        "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
            "int16"
        }
        "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => "uint16",
        "int" | "signed int" | "int32" | "int32_t" => "int32",
        "uint" | "unsigned int" | "uint32" | "uint32_t" => "uint32",
        "longlong" | "long long" | "long long int" | "signed long long"
        | "signed long long int" | "int64" | "int64_t" => "int64",
        "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64" | "uint64_t" => {
            "uint64"
        }
        "float" => "float",
        "double" => "double",
        _ => return None,
    };
    Some(canonical)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Fields of an NRRD header that matter to the sparse format.
#[derive(Debug, Clone, PartialEq)]
pub struct NrrdHeader {
    pub element_type: &'static str,
    pub sizes: Vec<usize>,
    pub endian: Endian,
}

impl NrrdHeader {
    /// Number of stored elements, or `None` if it overflows `usize`.
    pub fn element_count(&self) -> Option<usize> {
        self.sizes.iter().try_fold(1usize, |acc, &s| acc.checked_mul(s))
    }
}

/// Parse the attached header and return it with the byte offset of the data.
pub fn parse_header(bytes: &[u8]) -> Result<(NrrdHeader, usize)> {
    let mut pos = 0usize;
    let mut next_line = || -> Option<String> {
        if pos >= bytes.len() {
            return None;
        }
        let end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| pos + p)
            .unwrap_or(bytes.len());
        let line = String::from_utf8_lossy(&bytes[pos..end])
            .trim_end_matches('\r')
            .to_string();
        pos = (end + 1).min(bytes.len());
        Some(line)
    };

    let magic = next_line().context("Empty NRRD file")?;
    if !magic.starts_with("NRRD000") {
        bail!("Not an NRRD file (magic '{}')", magic);
    }

    let mut element_type = None;
    let mut dimension = None;
    let mut sizes = None;
    let mut endian = None;
    let mut encoding = None;

    loop {
        let line = next_line().context("NRRD header is not terminated by a blank line")?;
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        // key/value pairs use ":=" and are not fields
        if line.contains(":=") {
            continue;
        }
        let Some((field, value)) = line.split_once(": ") else {
            bail!("Malformed NRRD header line '{}'", line);
        };
        let value = value.trim();
        match field.trim() {
            "type" => {
                element_type = Some(
                    canonical_type_name(value)
                        .ok_or_else(|| anyhow!("Unsupported NRRD type '{}'", value))?,
                )
            }
            "dimension" => {
                dimension = Some(
                    value
                        .parse::<usize>()
                        .with_context(|| format!("Invalid NRRD dimension '{}'", value))?,
                )
            }
            "sizes" => {
                sizes = Some(
                    value
                        .split_whitespace()
                        .map(|s| {
                            s.parse::<usize>()
                                .with_context(|| format!("Invalid NRRD size '{}'", s))
                        })
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            "endian" => {
                endian = Some(match value {
                    "little" => Endian::Little,
                    "big" => Endian::Big,
                    other => bail!("Unsupported NRRD endian '{}'", other),
                })
            }
            "encoding" => encoding = Some(value.to_string()),
            "data file" | "datafile" => bail!("Detached NRRD data files are not supported"),
            other => tracing::trace!("Ignoring NRRD field '{}'", other),
        }
    }

    let element_type = element_type.context("NRRD header has no type field")?;
    let sizes = sizes.context("NRRD header has no sizes field")?;
    if let Some(dimension) = dimension {
        if dimension != sizes.len() {
            bail!(
                "NRRD dimension {} does not match {} sizes",
                dimension,
                sizes.len()
            );
        }
    }
    match encoding.as_deref() {
        Some("raw") => {}
        Some(other) => bail!("Unsupported NRRD encoding '{}'", other),
        None => bail!("NRRD header has no encoding field"),
    }
    let endian = match endian {
        Some(endian) => endian,
        None if element_type == "int8" || element_type == "uint8" => Endian::Little,
        None => bail!("NRRD header has no endian field"),
    };

    Ok((
        NrrdHeader {
            element_type,
            sizes,
            endian,
        },
        pos,
    ))
}

/// Decode the data section following a parsed header.
pub fn decode_data<E: NrrdElement>(header: &NrrdHeader, data: &[u8]) -> Result<Vec<E>> {
    if header.element_type != E::TYPE_NAME {
        bail!(
            "NRRD type '{}' does not match requested '{}'",
            header.element_type,
            E::TYPE_NAME
        );
    }
    let count = header
        .element_count()
        .context("NRRD sizes overflow the addressable range")?;
    let needed = count
        .checked_mul(E::SIZE)
        .context("NRRD data size overflows the addressable range")?;
    if data.len() < needed {
        bail!(
            "NRRD data is truncated: {} bytes for {} elements of {} bytes",
            data.len(),
            count,
            E::SIZE
        );
    }
    let values = data[..needed]
        .chunks_exact(E::SIZE)
        .map(|chunk| match header.endian {
            Endian::Little => E::from_le(chunk),
            Endian::Big => E::from_be(chunk),
        })
        .collect();
    Ok(values)
}

/// Read a raw NRRD file as a flat list of elements.
pub fn read_nrrd<E: NrrdElement, P: AsRef<Path>>(path: P) -> Result<Vec<E>> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let (header, data_start) =
        parse_header(&bytes).with_context(|| format!("Invalid NRRD header in {:?}", path))?;
    decode_data(&header, &bytes[data_start..])
        .with_context(|| format!("Invalid NRRD data in {:?}", path))
}

/// Read only the header of an NRRD file.
pub fn read_nrrd_header<P: AsRef<Path>>(path: P) -> Result<NrrdHeader> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let (header, _) =
        parse_header(&bytes).with_context(|| format!("Invalid NRRD header in {:?}", path))?;
    Ok(header)
}

/// Encode a 1-D raw little-endian NRRD file.
pub fn encode_nrrd_1d<E: NrrdElement>(values: &[E]) -> Vec<u8> {
    let header = format!(
        "NRRD0004\ntype: {}\ndimension: 1\nsizes: {}\nendian: little\nencoding: raw\n\n",
        E::TYPE_NAME,
        values.len()
    );
    let mut bytes = Vec::with_capacity(header.len() + values.len() * E::SIZE);
    bytes.extend_from_slice(header.as_bytes());
    for &value in values {
        value.extend_le(&mut bytes);
    }
    bytes
}

/// Write a 1-D raw little-endian NRRD file.
pub fn write_nrrd_1d<E: NrrdElement, P: AsRef<Path>>(path: P, values: &[E]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, encode_nrrd_1d(values)).with_context(|| format!("Failed to write {:?}", path))
}
