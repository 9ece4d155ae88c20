//! # Texgate CLI
//!
//! Command-line interface for the texgate validation core.
//!
//! ## Commands
//! - `caps` - Print implementation limits and the sample-count table
//! - `profile` - Write a device profile preset as JSON
//! - `replay` - Run a JSON call script against a fresh context

pub mod replay;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use texgate_core::{
    ApiVersion, Context, ContextConfig, Extension, InternalFormat, Limits, TextureTarget,
};

/// Texgate multisample validation CLI
#[derive(Parser)]
#[command(name = "texgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print implementation limits and the sample-count table
    Caps {
        /// Built-in device profile
        #[arg(short, long, default_value = "es31-d3d11")]
        preset: String,

        /// Device profile JSON file, overrides the preset
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a device profile preset as JSON
    Profile {
        /// Built-in device profile
        #[arg(short, long, default_value = "es31-d3d11")]
        preset: String,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a JSON call script against a fresh context
    Replay {
        /// Script file
        script: PathBuf,

        /// Built-in device profile
        #[arg(short, long, default_value = "es31-d3d11")]
        preset: String,

        /// Device profile JSON file, overrides the preset
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

/// Resolve the context configuration from a preset name or a profile file
pub fn load_config(preset: &str, profile: Option<&Path>) -> Result<ContextConfig> {
    let config = match profile {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read profile {}", path.display()))?;
            serde_json::from_str::<ContextConfig>(&text)
                .with_context(|| format!("failed to parse profile {}", path.display()))?
        }
        None => ContextConfig::preset(preset).ok_or_else(|| {
            anyhow!(
                "unknown preset '{}', expected one of {:?}",
                preset,
                ContextConfig::PRESETS
            )
        })?,
    };
    config.validate()?;
    Ok(config)
}

/// One row of the sample-count table
#[derive(Debug, Serialize)]
pub struct CapsRow {
    pub target: TextureTarget,
    pub format: InternalFormat,
    pub counts: Vec<u32>,
}

/// Everything `caps` prints
#[derive(Debug, Serialize)]
pub struct CapsReport {
    pub client_version: ApiVersion,
    pub webgl_compatibility: bool,
    pub enabled_extensions: Vec<&'static str>,
    pub requestable_extensions: Vec<&'static str>,
    pub limits: Limits,
    pub sample_counts: Vec<CapsRow>,
}

impl CapsReport {
    pub fn new(ctx: &Context) -> Self {
        let mut sample_counts: Vec<CapsRow> = ctx
            .caps()
            .iter()
            .map(|(target, format, counts)| CapsRow {
                target,
                format,
                counts: counts.to_vec(),
            })
            .collect();
        sample_counts.sort_by_key(|row| (row.target.raw(), row.format.raw()));

        let requestable_extensions = Extension::ALL
            .into_iter()
            .map(Extension::name)
            .filter(|name| ctx.extension_requestable(name))
            .collect();

        Self {
            client_version: ctx.extensions().version(),
            webgl_compatibility: ctx.config().webgl_compatibility,
            enabled_extensions: ctx.extensions().enabled_names(),
            requestable_extensions,
            limits: *ctx.limits(),
            sample_counts,
        }
    }

    fn print(&self) {
        println!("Client version: {}", self.client_version);
        println!("WebGL compatibility: {}", self.webgl_compatibility);
        println!("Enabled extensions: {:?}", self.enabled_extensions);
        println!("Requestable extensions: {:?}", self.requestable_extensions);

        let limits = &self.limits;
        println!("MAX_TEXTURE_SIZE: {}", limits.max_texture_size);
        println!("MAX_3D_TEXTURE_SIZE: {}", limits.max_3d_texture_size);
        println!("MAX_ARRAY_TEXTURE_LAYERS: {}", limits.max_array_texture_layers);
        println!("MAX_COLOR_ATTACHMENTS: {}", limits.max_color_attachments);
        println!("MAX_SAMPLES: {}", limits.max_samples);
        println!("MAX_INTEGER_SAMPLES: {}", limits.max_integer_samples);
        println!("MAX_COLOR_TEXTURE_SAMPLES: {}", limits.max_color_texture_samples);
        println!("MAX_DEPTH_TEXTURE_SAMPLES: {}", limits.max_depth_texture_samples);

        for row in &self.sample_counts {
            println!("{:?} {:?}: {:?}", row.target, row.format, row.counts);
        }
    }
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Caps {
            preset,
            profile,
            json,
        } => {
            let config = load_config(&preset, profile.as_deref())?;
            let ctx = Context::new(config)?;
            let report = CapsReport::new(&ctx);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
        }

        Commands::Profile { preset, output } => {
            let config = load_config(&preset, None)?;
            let text = serde_json::to_string_pretty(&config)?;
            match output {
                Some(path) => {
                    fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    log::info!("Wrote profile '{}' to {}", preset, path.display());
                }
                None => println!("{}", text),
            }
        }

        Commands::Replay {
            script,
            preset,
            profile,
        } => {
            let config = load_config(&preset, profile.as_deref())?;
            let text = fs::read_to_string(&script)
                .with_context(|| format!("failed to read script {}", script.display()))?;
            let calls = replay::parse_script(&text)?;

            log::info!("Replaying {} calls from {}", calls.len(), script.display());
            let steps = replay::run(config, &calls)?;
            for step in &steps {
                println!("{}", step);
            }

            let failed = steps.iter().filter(|step| step.result.is_err()).count();
            log::info!("Replay complete: {} calls, {} errors", steps.len(), failed);
        }
    }

    Ok(())
}
