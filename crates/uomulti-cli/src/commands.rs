//! Subcommand implementations.

use crate::cli::{Cli, Command, ContainerArgs, ContainerLocation};
use anyhow::{Context, Result, anyhow, bail};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::info;
use uomulti_formats::uop::refresh_block_hashes;
use uomulti_storage::{MultiStorage, StorageConfig, build_legacy, build_modern};

/// Load the storage configuration named on the command line, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<StorageConfig> {
    match path {
        Some(path) => StorageConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(StorageConfig::default()),
    }
}

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Extract {
            directory,
            container,
            housing,
        } => extract(&directory, &container, housing.as_deref(), &config),
        Command::Create {
            directory,
            container,
            housing,
        } => create(&directory, &container, housing.as_deref(), &config),
        Command::Convert {
            container,
            output,
            output_idx,
            housing_file,
        } => convert(
            &container,
            &output,
            output_idx.as_deref(),
            housing_file.as_deref(),
            &config,
        ),
        Command::Rehash { file } => rehash(&file, &config),
    }
}

fn location(container: &ContainerArgs) -> Result<ContainerLocation> {
    container
        .location()
        .ok_or_else(|| anyhow!("select either --uop or both --idx and --mul"))
}

fn open(container: &ContainerArgs, config: &StorageConfig) -> Result<MultiStorage> {
    match location(container)? {
        ContainerLocation::Modern(path) => MultiStorage::open_modern(&path, config)
            .with_context(|| format!("opening {}", path.display())),
        ContainerLocation::Legacy { data, index } => {
            MultiStorage::open_legacy(&data, &index, config).with_context(|| {
                format!("opening {} and {}", data.display(), index.display())
            })
        }
    }
}

/// Export a container to text files
pub fn extract(
    directory: &Path,
    container: &ContainerArgs,
    housing: Option<&str>,
    config: &StorageConfig,
) -> Result<()> {
    let mut storage = open(container, config)?;
    let summary = storage
        .export_text(directory, housing)
        .with_context(|| format!("exporting to {}", directory.display()))?;

    info!(
        "Extracted {} multis to {}",
        summary.collections,
        directory.display()
    );
    if let Some(path) = summary.housing {
        info!("Housing data written to {}", path.display());
    }
    Ok(())
}

/// Build a container from text files
pub fn create(
    directory: &Path,
    container: &ContainerArgs,
    housing: Option<&str>,
    config: &StorageConfig,
) -> Result<()> {
    let summary = match location(container)? {
        ContainerLocation::Modern(output) => build_modern(directory, &output, housing, config)
            .with_context(|| format!("creating {}", output.display()))?,
        ContainerLocation::Legacy { data, index } => {
            build_legacy(directory, &data, &index, config).with_context(|| {
                format!("creating {} and {}", data.display(), index.display())
            })?
        }
    };

    info!(
        "Created container from {} sources (highest id {})",
        summary.sources, summary.max_id
    );
    Ok(())
}

/// Convert a container to the other variant
///
/// UOP output needs housing data: from `--housing-file` when given,
/// otherwise from the input container.
pub fn convert(
    container: &ContainerArgs,
    output: &Path,
    output_idx: Option<&Path>,
    housing_file: Option<&Path>,
    config: &StorageConfig,
) -> Result<()> {
    let mut storage = open(container, config)?;

    let housing = match (output_idx, housing_file) {
        (Some(_), _) => Vec::new(),
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("reading housing file {}", path.display()))?
        }
        (None, None) => storage
            .read_housing()
            .context("UOP output needs housing data; pass --housing-file")?,
    };

    storage
        .save(output, output_idx, &housing)
        .with_context(|| format!("writing {}", output.display()))?;

    info!("Converted {} multis to {}", storage.len(), output.display());
    Ok(())
}

/// Recompute block hashes of a UOP container in place
pub fn rehash(file: &Path, config: &StorageConfig) -> Result<()> {
    if !file.is_file() {
        bail!("{} does not exist", file.display());
    }

    let mut stream = OpenOptions::new()
        .read(true)
        .write(true)
        .open(file)
        .with_context(|| format!("opening {}", file.display()))?;
    let rewritten = refresh_block_hashes(&mut stream, &config.layout)
        .with_context(|| format!("rehashing {}", file.display()))?;

    info!("Updated {} entries in {}", rewritten, file.display());
    Ok(())
}
