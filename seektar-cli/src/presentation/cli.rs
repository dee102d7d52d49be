use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "seektar: serve a directory as a seekable tar stream", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// How the virtual archive is built from a directory.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory to archive
    pub dir: PathBuf,

    /// Store content under this top-level directory name
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Zero mtimes and owners so identical trees give identical bytes
    #[arg(long)]
    pub deterministic: bool,

    /// Archive symlink targets instead of skipping symlinks
    #[arg(long)]
    pub follow_links: bool,

    /// Leave out the two zero blocks that end a tar stream
    #[arg(long)]
    pub no_trailer: bool,

    /// Build through the virtual filesystem layer instead of walking directly.
    /// Entry order and bytes match the direct walk; symlinks never lead outside DIR
    #[arg(long)]
    pub vfs: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print archive size, piece and entry counts, and etag
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List archive entries with their offsets
    Ls {
        #[command(flatten)]
        source: SourceArgs,
        /// show mode, size, mtime and offsets
        #[arg(long)]
        long: bool,
        /// print the entry table as JSON
        #[arg(long, conflicts_with = "long")]
        json: bool,
    },

    /// Stream the archive (or a byte range of it) to stdout
    Cat {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 0)]
        start: u64,
        #[arg(long)]
        len: Option<u64>,
    },

    /// Write the archive (or a byte range of it) to a file
    Get {
        #[command(flatten)]
        source: SourceArgs,
        out: PathBuf,
        #[arg(long, default_value_t = 0)]
        start: u64,
        #[arg(long)]
        len: Option<u64>,
    },
}
