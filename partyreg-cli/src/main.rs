use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use partyreg_cli::commands;
use partyreg_cli::commands::Cli;
use partyreg_cli::error::CliError;
use partyreg_cli::paths;
use partyreg_cli::settings::Settings;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("Warning: cannot write log file {}: {e}", path.display()),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let path = cli.settings.clone().or_else(paths::settings_file);
    let settings = match &path {
        Some(p) => Settings::load(p)?,
        None => Settings::default(),
    };
    let settings = cli.apply_to(settings.apply_env()?);
    log::debug!("using API at {}", settings.api_url);

    commands::execute(cli.command, settings, path).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
