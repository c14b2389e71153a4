use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process, str::FromStr};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug, error, info};

use chenerd::config::load_config;
use chenerd::extract::{build_prompt, parse_reply};
use chenerd::layout::LayoutEngine;
use chenerd::schema::Schema;
use chenerd::svg::SvgRenderer;

#[derive(Parser, Debug)]
#[command(name = "chenerd", version, about = "Chen-notation ER diagrams from schema JSON")]
struct Args {
    /// Schema JSON file, or stdin when omitted or '-'
    input: Option<PathBuf>,

    /// Output file. Defaults to stdout for svg and json
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "svg")]
    format: OutputFormat,

    /// Layout and theme overrides (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input is a raw extraction reply, possibly wrapped in a ```json fence
    #[arg(long)]
    reply: bool,

    /// Input is a plain-language description; print the extraction prompt
    /// for it instead of rendering
    #[arg(long, conflicts_with = "reply")]
    prompt: bool,

    /// Scale factor for png output
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Svg,
    Png,
    Json,
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    if let Err(err) = run(&args) {
        error!("{err:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    if args.prompt {
        return write_text(&build_prompt(input.trim()), args.output.as_deref());
    }
    let schema = if args.reply {
        parse_reply(&input)?
    } else {
        Schema::from_json(&input)?
    };

    let layout = LayoutEngine::new(config.layout).layout(&schema);
    let layout = layout.context("Schema has no entities, nothing to render")?;
    info!(nodes = layout.nodes.len(), links = layout.links.len(); "Layout computed");

    match args.format {
        OutputFormat::Json => write_text(&serde_json::to_string_pretty(&layout)?, args.output.as_deref()),
        OutputFormat::Svg => {
            let svg = SvgRenderer::new(config.layout, config.theme).render(&layout);
            write_text(&svg, args.output.as_deref())
        }
        OutputFormat::Png => write_png(args, &config, &layout),
    }
}

#[cfg(feature = "png")]
fn write_png(
    args: &Args,
    config: &chenerd::config::Config,
    layout: &chenerd::layout::LayoutResult,
) -> Result<()> {
    let output = args
        .output
        .as_deref()
        .context("PNG output requires --output")?;
    anyhow::ensure!(args.scale > 0.0, "Scale must be positive, got {}", args.scale);
    let svg = SvgRenderer::new(config.layout, config.theme.clone()).render(layout);
    chenerd::png::write_png(&svg, &config.theme.font_family, args.scale, output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(
    _args: &Args,
    _config: &chenerd::config::Config,
    _layout: &chenerd::layout::LayoutResult,
) -> Result<()> {
    anyhow::bail!("PNG output requires building with the `png` feature")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = path.display().to_string(); "Output written");
        }
        None => print!("{}", text),
    }
    Ok(())
}
