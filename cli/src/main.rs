mod app;
mod config;

use cmdtree_core::{Console, validate_tree};
use tracing::debug;

fn main() {
    let settings = match config::load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            std::process::exit(1);
        }
    };

    init_tracing(settings.verbose);
    debug!(?settings, "Loaded settings");

    let mut tree = match app::build(settings) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };

    let problems = validate_tree(&tree);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("ERROR: {problem}");
        }
        std::process::exit(1);
    }

    std::process::exit(tree.execute_with(std::env::args(), &mut Console::stdio()));
}

/// Logs go to stderr; `RUST_LOG` wins over the configured verbosity.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .init();
}
