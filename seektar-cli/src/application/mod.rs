pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use seektar_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Info { source } => handlers::handle_info(source),
        Commands::Ls { source, long, json } => handlers::handle_ls(source, long, json),
        Commands::Cat { source, start, len } => handlers::handle_cat(source, start, len),
        Commands::Get {
            source,
            out,
            start,
            len,
        } => handlers::handle_get(source, out, start, len),
    }
}
