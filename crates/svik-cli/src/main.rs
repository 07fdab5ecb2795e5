use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use svik_core::filter::{
    ConsoleProgressCallback, ProgressCallback, ResampleSparseVectorImageFilter,
    ShrinkSparseVectorImageFilter,
};
use svik_core::interpolation::InterpolatorKind;
use svik_core::spatial::Spacing;
use svik_core::transform::IdentityTransform;
use svik_core::SparseVectorImage;
use svik_io::{
    read_entry_count, read_sparse_header, read_sparse_vector_image, write_sparse_vector_image,
};
use tracing::info;

/// Images handled by the command line tools.
type Volume = SparseVectorImage<f32, 3>;

#[derive(Parser)]
#[command(name = "svik")]
#[command(about = "Tools for sparse vector images stored as .spr + NRRD key/value files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header of a sparse image
    Info {
        /// Header file (.spr)
        path: PathBuf,
    },

    /// Shrink a 3-D float image by a real-valued factor
    Shrink {
        input: PathBuf,
        output: PathBuf,

        /// Shrink factor applied to every axis
        #[arg(short, long, default_value_t = 2.0)]
        factor: f64,

        /// Minimum output size per axis
        #[arg(long, default_value_t = 5)]
        min_size: usize,

        /// Worker threads (defaults to the rayon pool size)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Resample a 3-D float image onto an isotropic grid covering the same extent
    Resample {
        input: PathBuf,
        output: PathBuf,

        /// Output spacing on every axis
        #[arg(short, long)]
        spacing: f64,

        /// Interpolator (nearest, linear)
        #[arg(short, long, default_value = "linear")]
        interpolator: InterpolatorKind,

        /// Value written where the input is not covered
        #[arg(short, long, default_value_t = 0.0)]
        default_value: f64,

        /// Worker threads (defaults to the rayon pool size)
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { path } => {
            print_info(&path)?;
        }
        Commands::Shrink {
            input,
            output,
            factor,
            min_size,
            workers,
        } => {
            shrink(&input, &output, factor, min_size, workers)?;
        }
        Commands::Resample {
            input,
            output,
            spacing,
            interpolator,
            default_value,
            workers,
        } => {
            resample(&input, &output, spacing, interpolator, default_value, workers)?;
        }
    }

    Ok(())
}

fn print_info(path: &Path) -> Result<()> {
    let header = read_sparse_header(path)?;
    let entries = read_entry_count(path)?;
    let cells = header
        .number_of_pixels()
        .and_then(|n| n.checked_mul(header.vector_length))
        .context("Image size overflows the addressable range")?;

    println!("File:          {}", path.display());
    println!("Dimensions:    {}", header.ndims);
    println!("Size:          {:?}", header.size);
    println!("Vector length: {}", header.vector_length);
    println!("Spacing:       {:?}", header.spacing);
    if let Some(element_type) = &header.element_type {
        println!("Element type:  {}", element_type);
    }
    if let Some(offset) = &header.offset {
        println!("Origin:        {:?}", offset);
    }
    if let Some(matrix) = &header.transform_matrix {
        println!("Direction:     {:?}", matrix);
    }
    let density = if cells == 0 {
        0.0
    } else {
        100.0 * entries as f64 / cells as f64
    };
    println!("Entries:       {} ({:.3}% of {})", entries, density, cells);
    Ok(())
}

fn progress() -> Arc<dyn ProgressCallback> {
    Arc::new(ConsoleProgressCallback::new(10.0))
}

fn shrink(
    input: &Path,
    output: &Path,
    factor: f64,
    min_size: usize,
    workers: Option<usize>,
) -> Result<()> {
    let image: Volume = read_sparse_vector_image(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let mut filter = ShrinkSparseVectorImageFilter::<3>::new()
        .with_shrink_factors(factor)
        .with_min_size(min_size)
        .with_progress_callback(progress());
    if let Some(workers) = workers {
        filter = filter.with_number_of_workers(workers);
    }
    let shrunk = filter.update(&image)?;
    info!("Shrunk {:?} to {:?}", image.shape(), shrunk.shape());

    let written = write_sparse_vector_image(output, &shrunk)?;
    info!("Saved {}", written.display());
    Ok(())
}

fn resample(
    input: &Path,
    output: &Path,
    spacing: f64,
    interpolator: InterpolatorKind,
    default_value: f64,
    workers: Option<usize>,
) -> Result<()> {
    anyhow::ensure!(spacing > 0.0, "Spacing must be positive, got {}", spacing);
    let image: Volume = read_sparse_vector_image(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let input_size = image.shape();
    let input_spacing = image.spacing();
    let size: [usize; 3] = std::array::from_fn(|i| {
        ((input_size[i] as f64 * input_spacing[i] / spacing).round() as usize).max(1)
    });

    let mut filter = ResampleSparseVectorImageFilter::new(
        size,
        image.transform_index_to_physical_point(&image.start_index()),
        Spacing::uniform(spacing),
        *image.direction(),
        Box::new(IdentityTransform),
        interpolator,
    )
    .with_default_pixel_value(vec![default_value; image.vector_length()])
    .with_progress_callback(progress());
    if let Some(workers) = workers {
        filter = filter.with_number_of_workers(workers);
    }
    let resampled = filter.update(&image)?;
    info!(
        "Resampled {:?} to {:?} with {} interpolation",
        input_size, size, interpolator
    );

    let written = write_sparse_vector_image(output, &resampled)?;
    info!("Saved {}", written.display());
    Ok(())
}
