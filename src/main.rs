mod app;
mod audio;
mod config;
mod ecs;
mod panel;
mod peep;
mod platform;
mod render;
mod sprite;
mod surface;
mod util;

use clap::Parser;

use crate::config::{Cli, Config};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Desktop Peeps starting up");

    let cli = Cli::parse();
    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Fatal error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = app::run(config) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
