use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};

use crate::adapters::teos10::rho_surface;
use crate::chemistry::PhysicalConstants;
use crate::density::eos80::{pure_water_density, seawater_density};
use crate::error::AppError;
use crate::models::{AlkalinityResult, FitOptions, TitrationSample};

#[derive(Parser, Debug)]
#[command(author, version, about = "Seawater density (EOS-80) and titration alkalinity, optional JSON output", long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        help = "Log level (error, warn, info, debug, trace); defaults to RUST_LOG or warn"
    )]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Density of pure water and seawater at atmospheric pressure
    Density {
        #[arg(long, allow_hyphen_values = true, help = "Temperature [°C, ITS-90]")]
        temp: f64,
        #[arg(
            long,
            default_value_t = 0.0,
            allow_hyphen_values = true,
            help = "Practical salinity [PSS-78]"
        )]
        salinity: f64,
        #[arg(long, help = "Also report the TEOS-10 density for comparison")]
        teos10: bool,
    },
    /// Total alkalinity from potentiometric titration data
    Alkalinity {
        #[arg(
            long,
            value_name = "FILE",
            help = "JSON document with a sample and optional constants/options; '-' reads from stdin"
        )]
        input: Option<String>,
        #[arg(
            long,
            value_name = "JSON",
            help = "Inline JSON titration sample (overrides --input)"
        )]
        sample_json: Option<String>,
        #[arg(
            long,
            help = "Report the linear Gran estimate if the non-linear fit does not converge"
        )]
        allow_linear_fallback: bool,
    },
}

#[derive(serde::Deserialize)]
struct CmdInput {
    sample: TitrationSample,
    #[serde(default)]
    constants: Option<PhysicalConstants>,
    #[serde(default)]
    options: Option<FitOptions>,
}

/// Parsed alkalinity request.
pub struct AlkalinityRequest {
    pub sample: TitrationSample,
    pub constants: PhysicalConstants,
    pub options: FitOptions,
}

fn parse_cmd_input_doc(doc: &str) -> Result<AlkalinityRequest, AppError> {
    let parsed: CmdInput =
        serde_json::from_str(doc).map_err(|source| AppError::ParseInputDocument { source })?;
    Ok(AlkalinityRequest {
        sample: parsed.sample,
        constants: parsed.constants.unwrap_or_default(),
        options: parsed.options.unwrap_or_default(),
    })
}

pub fn parse_alkalinity_input(
    input: Option<&String>,
    sample_json: Option<&String>,
) -> Result<AlkalinityRequest, AppError> {
    match (sample_json, input) {
        (Some(inline), _) => {
            let sample: TitrationSample = serde_json::from_str(inline)
                .map_err(|source| AppError::ParseSampleJson { source })?;
            Ok(AlkalinityRequest {
                sample,
                constants: PhysicalConstants::default(),
                options: FitOptions::default(),
            })
        }
        (None, Some(path)) if path == "-" => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|source| AppError::ReadStdin { source })?;
            parse_cmd_input_doc(&s)
        }
        (None, Some(path)) => {
            let s = fs::read_to_string(path).map_err(|source| AppError::ReadFile {
                path: path.clone(),
                source,
            })?;
            parse_cmd_input_doc(&s)
        }
        (None, None) => Err(AppError::MissingInputData),
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct DensitySummary {
    pub salinity: f64,
    pub temperature_c: f64,
    pub pure_water_kg_per_m3: f64,
    pub seawater_kg_per_m3: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teos10_kg_per_m3: Option<f64>,
}

pub fn density_summary(
    salinity: f64,
    temp_c: f64,
    teos10: bool,
) -> Result<DensitySummary, AppError> {
    let seawater = seawater_density(salinity, temp_c)? * 1000.0;
    let teos10_kg_per_m3 = if teos10 {
        Some(rho_surface(salinity, temp_c)?)
    } else {
        None
    };
    Ok(DensitySummary {
        salinity,
        temperature_c: temp_c,
        pure_water_kg_per_m3: pure_water_density(temp_c),
        seawater_kg_per_m3: seawater,
        teos10_kg_per_m3,
    })
}

fn print_json<T: Serialize>(out: &T) -> Result<(), AppError> {
    let s = serde_json::to_string_pretty(out)
        .map_err(|source| AppError::SerializeOutput { source })?;
    println!("{}", s);
    Ok(())
}

pub fn print_density(out: &DensitySummary, args: &Args) -> Result<(), AppError> {
    if args.json {
        return print_json(out);
    }
    println!("Pure water: {:.5} kg/m^3", out.pure_water_kg_per_m3);
    println!("Seawater (EOS-80): {:.5} kg/m^3", out.seawater_kg_per_m3);
    if let Some(rho) = out.teos10_kg_per_m3 {
        println!("Seawater (TEOS-10): {:.5} kg/m^3", rho);
    }
    Ok(())
}

pub fn print_alkalinity(out: &AlkalinityResult, args: &Args) -> Result<(), AppError> {
    if args.json {
        return print_json(out);
    }
    println!("TA: {:.2} umol/kg", out.micromol_per_kg());
    println!("Method: {:?}", out.method);
    println!("Points used: {}", out.points_used);
    if let Some(d) = &out.diagnostics {
        println!("Gran estimate: {:.2} umol/kg", d.linear_estimate * 1e6);
        println!("f: {:.5}", d.f);
        println!("E0: {:.5} V", d.e0_volts);
    }
    Ok(())
}
