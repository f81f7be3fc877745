#[cfg(feature = "cli")]
pub mod cli;
pub mod teos10;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
fn init_logging(level: Option<&str>) {
    use log::LevelFilter;

    let level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Warn);
    // stdout carries the results; logs go to stderr
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .try_init();
    log::debug!("logger initialized (level: {level})");
}

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{
        Args, Command, density_summary, parse_alkalinity_input, print_alkalinity, print_density,
    };
    use crate::alkalinity::{estimate_alkalinity_or_linear, estimate_alkalinity_with};

    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match &args.command {
        Command::Density {
            temp,
            salinity,
            teos10,
        } => {
            let out = density_summary(*salinity, *temp, *teos10)?;
            print_density(&out, &args)?;
        }
        Command::Alkalinity {
            input,
            sample_json,
            allow_linear_fallback,
        } => {
            let req = parse_alkalinity_input(input.as_ref(), sample_json.as_ref())?;
            let out = if *allow_linear_fallback {
                estimate_alkalinity_or_linear(&req.sample, &req.constants, &req.options)?
            } else {
                estimate_alkalinity_with(&req.sample, &req.constants, &req.options)?
            };
            print_alkalinity(&out, &args)?;
        }
    }

    Ok(())
}
