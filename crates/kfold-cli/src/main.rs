use anyhow::Result;
use log::LevelFilter;

use kfold_cli::cli::build_cli;
use kfold_cli::orchestrator::{self, Invocation, LibraryClassifier};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("KFOLD_LOG", "error,kfold=info"))
        .init();

    let matches = build_cli().get_matches();
    let invocation = Invocation::from_matches(&matches)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    orchestrator::run(&invocation, &LibraryClassifier, &mut out)
}
