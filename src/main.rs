// peerview - Show one image across many windows and keep them aligned
// Runs a headless session: opens virtual windows, simulates the refresh timers
// and scripted drags, then prints where every window ended up

use anyhow::Result;
use log::info;
use peerview::{cli, session};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args()?;
    let config = &args.session;

    info!(
        "Starting peerview with content: {:?}, {} windows, scale: {}",
        config.image_path, config.windows, config.settings.scale
    );

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let summary = session::run(config, rng)?;
    println!("{}", summary);
    Ok(())
}
