use crate::config::load_config;
use crate::ir::parse_structure;
use crate::layout::{Diagram, layout_or_placeholder};
use crate::layout_dump::{DiagramDump, write_layout_dump};
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "docmap",
    version,
    about = "Lay out extracted document structure as a node/edge diagram"
)]
pub struct Args {
    /// Structure JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for json and svg.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Identifier used in fallback labels. Defaults to the input file stem.
    #[arg(short = 'd', long = "documentId")]
    pub document_id: Option<String>,

    /// Skip the overlap passes and keep the initial positions
    #[arg(long = "no-optimize")]
    pub no_optimize: bool,

    /// Fail on undecodable input instead of emitting the placeholder diagram
    #[arg(long = "strict")]
    pub strict: bool,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("loading config {:?}", args.config))?;
    if args.no_optimize {
        config.layout.optimizer.enabled = false;
    }

    let document_id = args
        .document_id
        .clone()
        .unwrap_or_else(|| default_document_id(args.input.as_deref()));
    let input = read_input(args.input.as_deref())?;

    let parsed = match parse_structure(&input) {
        Err(err) if args.strict => return Err(err.into()),
        other => other,
    };
    let diagram = layout_or_placeholder(parsed.as_ref(), &document_id, &config.layout);
    let response = parsed.ok();

    match args.output_format {
        OutputFormat::Json => {
            let dump = DiagramDump::from_diagram(&diagram, &document_id, response.as_ref());
            match args.output.as_deref() {
                Some(path) => write_layout_dump(path, &dump)?,
                None => println!("{}", dump.to_json()?),
            }
        }
        OutputFormat::Svg => {
            let svg = render_svg(&diagram, &config.theme, &config.layout, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&diagram, &config, args.output.as_deref())?,
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(diagram: &Diagram, config: &crate::config::Config, output: Option<&Path>) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(diagram, &config.theme, &config.layout, &config.render);
    crate::render::write_output_png(&svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_diagram: &Diagram, _config: &crate::config::Config, _output: Option<&Path>) -> Result<()> {
    Err(anyhow::anyhow!("png output requires the `png` feature"))
}

fn init_tracing(verbose: u8) {
    let directive = match verbose {
        0 => "docmap=warn",
        1 => "docmap=debug",
        _ => "docmap=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let mut buf = String::new();
    match path {
        Some(path) if path != Path::new("-") => {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
        _ => {
            io::stdin().read_to_string(&mut buf)?;
        }
    }
    Ok(buf)
}

fn default_document_id(input: Option<&Path>) -> String {
    input
        .filter(|path| *path != Path::new("-"))
        .and_then(|path| path.file_stem())
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "stdin".to_string())
}
