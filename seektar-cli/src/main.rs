mod application;
mod presentation {
    pub mod cli;
}

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = application::run() {
        eprintln!("seektar: {e}");
        std::process::exit(1);
    }
}
