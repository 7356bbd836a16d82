//! quickcanvas - 运行画布脚本

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use quickcanvas::config::{BackendKind, CanvasConfig};

#[derive(Parser, Debug)]
#[command(name = "quickcanvas", version, about = "Run a canvas script")]
struct Cli {
    /// Entry script (defaults to the config's entryScript, then main.js).
    script: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without opening windows.
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Log filter, env_logger syntax (overrides RUST_LOG).
    #[arg(long = "log")]
    log_filter: Option<String>,
}

fn load_config(cli: Cli) -> anyhow::Result<CanvasConfig> {
    let mut config = match &cli.config {
        Some(path) => CanvasConfig::load(path).with_context(|| "loading configuration")?,
        None => CanvasConfig::default(),
    };
    if let Some(script) = cli.script {
        config.entry_script = script;
    }
    if cli.headless {
        config.backend = BackendKind::Headless;
    }
    if cli.log_filter.is_some() {
        config.log_filter = cli.log_filter;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match load_config(cli) {
        Ok(config) => quickcanvas::runtime::run(&config),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
