//! Command-line arguments.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Extract, create, convert and rehash multi containers.
#[derive(Debug, Parser)]
#[command(
    name = "uomulti",
    about = "Work with Ultima Online multi collections (UOP and IDX/MUL)",
    version
)]
pub struct Cli {
    /// JSON storage configuration file
    #[arg(long, global = true, env = "UOMULTI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export every multi of a container as text files
    Extract {
        /// Output directory
        directory: PathBuf,

        #[command(flatten)]
        container: ContainerArgs,

        /// File name for the housing blob (UOP input only)
        #[arg(long)]
        housing: Option<String>,
    },

    /// Build a container from a directory of text files
    Create {
        /// Source directory
        directory: PathBuf,

        #[command(flatten)]
        container: ContainerArgs,

        /// File name of the housing blob inside the source directory (UOP output only)
        #[arg(long)]
        housing: Option<String>,
    },

    /// Convert a container to the other format
    Convert {
        #[command(flatten)]
        container: ContainerArgs,

        /// Output file (`.uop`, or `.mul` together with --output-idx)
        #[arg(short, long)]
        output: PathBuf,

        /// Output index, selects legacy output
        #[arg(long)]
        output_idx: Option<PathBuf>,

        /// Housing blob for UOP output (taken from the input when it is a UOP)
        #[arg(long)]
        housing_file: Option<PathBuf>,
    },

    /// Recompute the block hashes of a UOP container in place
    Rehash {
        /// UOP container to update
        file: PathBuf,
    },
}

/// Container selection: a UOP file or a legacy index/data pair
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = true)]
pub struct ContainerArgs {
    /// UOP container
    #[arg(long, conflicts_with_all = ["idx", "mul"])]
    pub uop: Option<PathBuf>,

    /// Legacy index file
    #[arg(long, requires = "mul")]
    pub idx: Option<PathBuf>,

    /// Legacy data file
    #[arg(long, requires = "idx")]
    pub mul: Option<PathBuf>,
}

/// Resolved container selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerLocation {
    /// UOP container path
    Modern(PathBuf),
    /// Legacy data and index paths
    Legacy {
        /// `.mul` path
        data: PathBuf,
        /// `.idx` path
        index: PathBuf,
    },
}

impl ContainerArgs {
    /// Resolve the selected container
    pub fn location(&self) -> Option<ContainerLocation> {
        match (&self.uop, &self.mul, &self.idx) {
            (Some(uop), None, None) => Some(ContainerLocation::Modern(uop.clone())),
            (None, Some(data), Some(index)) => Some(ContainerLocation::Legacy {
                data: data.clone(),
                index: index.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("uomulti").chain(args.iter().copied()))
    }

    #[test]
    fn test_extract_uop() {
        let cli = parse(&["extract", "out", "--uop", "MultiCollection.uop"]).unwrap();
        let Command::Extract {
            directory,
            container,
            housing,
        } = cli.command
        else {
            panic!("expected extract");
        };
        assert_eq!(directory, PathBuf::from("out"));
        assert_eq!(housing, None);
        assert_eq!(
            container.location(),
            Some(ContainerLocation::Modern("MultiCollection.uop".into()))
        );
    }

    #[test]
    fn test_create_legacy_with_globals() {
        let cli = parse(&[
            "-vv",
            "create",
            "src",
            "--idx",
            "multi.idx",
            "--mul",
            "multi.mul",
            "--config",
            "uomulti.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("uomulti.json")));

        let Command::Create { container, .. } = cli.command else {
            panic!("expected create");
        };
        assert_eq!(
            container.location(),
            Some(ContainerLocation::Legacy {
                data: "multi.mul".into(),
                index: "multi.idx".into(),
            })
        );
    }

    #[test]
    fn test_container_selection_errors() {
        // Nothing selected
        assert!(parse(&["extract", "out"]).is_err());
        // Index without data
        assert!(parse(&["extract", "out", "--idx", "multi.idx"]).is_err());
        // Both variants
        assert!(
            parse(&[
                "extract", "out", "--uop", "a.uop", "--idx", "b.idx", "--mul", "b.mul"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_convert() {
        let cli = parse(&[
            "convert",
            "--uop",
            "in.uop",
            "--output",
            "out.mul",
            "--output-idx",
            "out.idx",
        ])
        .unwrap();
        let Command::Convert {
            output,
            output_idx,
            housing_file,
            ..
        } = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(output, PathBuf::from("out.mul"));
        assert_eq!(output_idx, Some(PathBuf::from("out.idx")));
        assert_eq!(housing_file, None);

        assert!(parse(&["convert", "--uop", "in.uop"]).is_err());
    }

    #[test]
    fn test_rehash() {
        let cli = parse(&["rehash", "MultiCollection.uop"]).unwrap();
        assert!(matches!(cli.command, Command::Rehash { file } if file == PathBuf::from("MultiCollection.uop")));
        assert_eq!(cli.verbose, 0);
    }
}
