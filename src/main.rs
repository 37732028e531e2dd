mod core;
mod window;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::context::Context;
use crate::window::error::WmError;
use crate::window::manager::WindowManager;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// X display to manage (defaults to $DISPLAY)
    #[arg(long)]
    display: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    info!("Starting framewm...");

    let ctx = match Context::new(args.display.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to connect to X server: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Connected to X server. Screen: {}, root window: {}",
        ctx.screen_num, ctx.root_window
    );

    let mut wm = WindowManager::new(ctx);
    match wm.run() {
        Ok(()) => Ok(()),
        Err(WmError::AlreadyManaged) => {
            error!("Another window manager is already running on this display");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            Err(e.into())
        }
    }
}
