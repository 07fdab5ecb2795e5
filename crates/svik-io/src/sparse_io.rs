//! Reading and writing sparse vector images.
//!
//! An image is stored as three files: a `.spr` text header plus two 1-D NRRD
//! files named `<base>_key.nrrd` and `<base>_value.nrrd` in the same
//! directory. Keys are element identifiers (`offset * K + k`) and values are
//! the matching components, sorted by key.

use crate::header::SparseHeader;
use crate::nrrd::{self, NrrdElement};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use svik_core::image::{ImageMetadata, ImageRegion, PixelComponent, SparseVectorImage};
use svik_core::spatial::{Direction, Point, Spacing};

/// Header file extension.
pub const HEADER_EXTENSION: &str = "spr";

/// Header path the writer uses for `path`, with the extension forced to `.spr`.
pub fn header_path_for<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(HEADER_EXTENSION) => path.to_path_buf(),
        _ => {
            tracing::warn!("Renaming extension of {:?} to .{}", path, HEADER_EXTENSION);
            path.with_extension(HEADER_EXTENSION)
        }
    }
}

fn data_file_names(header_path: &Path) -> Result<(String, String)> {
    let stem = header_path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid file name {:?}", header_path))?;
    Ok((format!("{}_key.nrrd", stem), format!("{}_value.nrrd", stem)))
}

fn header_dir(header_path: &Path) -> &Path {
    header_path.parent().unwrap_or_else(|| Path::new(""))
}

/// Read and parse only the text header.
pub fn read_sparse_header<P: AsRef<Path>>(path: P) -> Result<SparseHeader> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read header {:?}", path))?;
    SparseHeader::parse(&text).with_context(|| format!("Invalid sparse header {:?}", path))
}

/// Number of stored entries, taken from the key file header.
pub fn read_entry_count<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let header = read_sparse_header(path)?;
    let key_header = nrrd::read_nrrd_header(header_dir(path).join(&header.key_file))?;
    key_header
        .element_count()
        .context("Key file sizes overflow the addressable range")
}

fn read_keys(path: &Path) -> Result<Vec<u64>> {
    let header = nrrd::read_nrrd_header(path)?;
    match header.element_type {
        "uint64" => nrrd::read_nrrd::<u64, _>(path),
        "uint32" => Ok(nrrd::read_nrrd::<u32, _>(path)?
            .into_iter()
            .map(u64::from)
            .collect()),
        other => bail!("Key file {:?} has non-integer type '{}'", path, other),
    }
}

fn metadata_from_header<const D: usize>(header: &SparseHeader) -> Result<ImageMetadata<D>> {
    let spacing: [f64; D] = header
        .spacing
        .as_slice()
        .try_into()
        .context("ElementSpacing does not match NDims")?;
    let origin: [f64; D] = match &header.offset {
        Some(offset) => offset
            .as_slice()
            .try_into()
            .context("Offset does not match NDims")?,
        None => [0.0; D],
    };
    let direction = match &header.transform_matrix {
        Some(matrix) => {
            Direction::from_row_slice(matrix).context("TransformMatrix does not match NDims")?
        }
        None => Direction::identity(),
    };
    Ok(ImageMetadata::new(
        Point::new(origin),
        Spacing::new(spacing),
        direction,
    ))
}

/// Read a sparse vector image.
///
/// The image starts at the zero index with a zero fill value. Stored values
/// equal to zero are skipped, so they read back as implicit entries.
pub fn read_sparse_vector_image<T, const D: usize, P>(path: P) -> Result<SparseVectorImage<T, D>>
where
    T: PixelComponent + NrrdElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let header = read_sparse_header(path)?;

    if header.ndims != D {
        bail!(
            "{:?} is a {}-D image, expected {}-D",
            path,
            header.ndims,
            D
        );
    }
    if let Some(element_type) = &header.element_type {
        let canonical = nrrd::canonical_type_name(element_type);
        if canonical != Some(T::TYPE_NAME) {
            bail!(
                "{:?} stores '{}' components, expected '{}'",
                path,
                element_type,
                T::TYPE_NAME
            );
        }
    }

    let size: [usize; D] = header
        .size
        .as_slice()
        .try_into()
        .context("DimSize does not match NDims")?;
    let metadata = metadata_from_header::<D>(&header)?;
    let mut image =
        SparseVectorImage::<T, D>::new(ImageRegion::from_size(size), metadata, header.vector_length)
            .with_context(|| format!("Invalid geometry in {:?}", path))?;
    image.fill_buffer(&vec![T::zero(); header.vector_length])?;

    let dir = header_dir(path);
    let key_path = dir.join(&header.key_file);
    let value_path = dir.join(&header.value_file);
    let keys = read_keys(&key_path)?;
    let values = nrrd::read_nrrd::<T, _>(&value_path)?;
    if keys.len() != values.len() {
        bail!(
            "Key file has {} entries but value file has {}",
            keys.len(),
            values.len()
        );
    }

    for (&key, &value) in keys.iter().zip(values.iter()) {
        if value == T::zero() {
            continue;
        }
        image
            .insert_element(key, value)
            .with_context(|| format!("Invalid key in {:?}", key_path))?;
    }

    tracing::info!(
        "Read {:?}: size {:?}, vector length {}, {} entries",
        path,
        image.shape(),
        image.vector_length(),
        image.entry_count()
    );
    Ok(image)
}

/// Entries to store on disk, sorted by key.
///
/// The reader fills with zero, so with a zero fill value the pixel map is
/// enough. Otherwise every non-zero component is written out, including the
/// implicit ones that take the fill value.
fn stored_entries<T, const D: usize>(image: &SparseVectorImage<T, D>) -> Vec<(u64, T)>
where
    T: PixelComponent,
{
    if image.fill_value().iter().all(|&v| v == T::zero()) {
        return image.container().sorted_entries();
    }

    tracing::warn!(
        "Fill value {:?} is non-zero, writing every non-zero component",
        image.fill_value()
    );
    let k_len = image.vector_length();
    let accessor = image.pixel_accessor();
    let mut entries = Vec::new();
    for offset in 0..image.number_of_pixels() {
        for k in 0..k_len {
            let value = accessor.get_component(offset, k);
            if value != T::zero() {
                entries.push(((offset * k_len + k) as u64, value));
            }
        }
    }
    entries
}

/// Write a sparse vector image and return the header path actually used.
///
/// A non-zero start index is folded into the stored origin, so the image
/// reads back at the zero index with the same physical placement. An empty
/// pixel map is stored as a single `0 -> 0` entry.
pub fn write_sparse_vector_image<T, const D: usize, P>(
    path: P,
    image: &SparseVectorImage<T, D>,
) -> Result<PathBuf>
where
    T: PixelComponent + NrrdElement,
    P: AsRef<Path>,
{
    let header_path = header_path_for(path);
    let (key_file, value_file) = data_file_names(&header_path)?;
    let dir = header_dir(&header_path);

    let mut entries = stored_entries(image);
    if entries.is_empty() {
        tracing::warn!("Pixel map is empty, writing a single zero entry");
        entries.push((0, T::zero()));
    }
    let (keys, values): (Vec<u64>, Vec<T>) = entries.into_iter().unzip();

    let origin = image.transform_index_to_physical_point(&image.start_index());
    let header = SparseHeader {
        ndims: D,
        vector_length: image.vector_length(),
        size: image.shape().to_vec(),
        spacing: image.spacing().to_vec(),
        element_type: Some(T::TYPE_NAME.to_string()),
        offset: Some(origin.to_vec()),
        transform_matrix: Some(image.direction().to_row_vec()),
        key_file,
        value_file,
    };

    nrrd::write_nrrd_1d(dir.join(&header.key_file), &keys)?;
    nrrd::write_nrrd_1d(dir.join(&header.value_file), &values)?;
    fs::write(&header_path, header.to_string())
        .with_context(|| format!("Failed to write header {:?}", header_path))?;

    tracing::info!(
        "Wrote {:?}: {} entries, vector length {}",
        header_path,
        keys.len(),
        header.vector_length
    );
    Ok(header_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_path_for() {
        assert_eq!(header_path_for("a/b.spr"), PathBuf::from("a/b.spr"));
        assert_eq!(header_path_for("a/b.mha"), PathBuf::from("a/b.spr"));
        assert_eq!(header_path_for("a/b"), PathBuf::from("a/b.spr"));
        assert_eq!(header_path_for("a.d/b.x.y"), PathBuf::from("a.d/b.x.spr"));
    }

    #[test]
    fn test_data_file_names() {
        let (key, value) = data_file_names(Path::new("/tmp/out/scan.spr")).unwrap();
        assert_eq!(key, "scan_key.nrrd");
        assert_eq!(value, "scan_value.nrrd");
    }

    #[test]
    fn test_metadata_from_header() {
        let header = SparseHeader {
            ndims: 2,
            vector_length: 1,
            size: vec![3, 4],
            spacing: vec![0.5, 2.0],
            element_type: None,
            offset: Some(vec![1.0, -1.0]),
            transform_matrix: Some(vec![0.0, -1.0, 1.0, 0.0]),
            key_file: "k".into(),
            value_file: "v".into(),
        };
        let metadata = metadata_from_header::<2>(&header).unwrap();
        assert_eq!(metadata.origin(), &Point::new([1.0, -1.0]));
        assert_eq!(metadata.spacing(), &Spacing::new([0.5, 2.0]));
        assert_eq!(metadata.direction()[(0, 1)], -1.0);
        assert!(metadata_from_header::<3>(&header).is_err());
    }
}
