//! tomd - convert an HTML file to Markdown on standard output.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tomd::{plugins, CodeBlockStyle, Converter, HeadingStyle, LinkStyle, Options};
use tracing_subscriber::EnvFilter;

/// Convert HTML to Markdown
#[derive(Parser, Debug)]
#[command(name = "tomd")]
#[command(version, about)]
struct Args {
    /// HTML file to convert, or `-` for standard input
    file: PathBuf,

    /// Domain used to resolve relative links and images
    #[arg(long, default_value = "")]
    domain: String,

    /// Heading style: atx or setext
    #[arg(long, default_value = "atx")]
    heading_style: HeadingStyle,

    /// Bullet list marker
    #[arg(long, default_value_t = '-')]
    bullet: char,

    /// Code block style: indented or fenced
    #[arg(long, default_value = "indented")]
    code_block_style: CodeBlockStyle,

    /// Link style: inlined or referenced
    #[arg(long, default_value = "inlined")]
    link_style: LinkStyle,

    /// Disable tables, strikethrough and task lists
    #[arg(long)]
    no_gfm: bool,

    /// Extract code blocks from syntax highlighter markup
    #[arg(long)]
    robust_code: bool,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut html = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin()
            .read_to_end(&mut html)
            .context("Error reading file")?;
        return Ok(html);
    }

    let mut file = File::open(path)
        .with_context(|| format!("Error opening file {}", path.display()))?;
    file.read_to_end(&mut html)
        .with_context(|| format!("Error reading file {}", path.display()))?;
    Ok(html)
}

fn build_converter(args: &Args) -> Converter {
    let options = Options::default()
        .with_heading_style(args.heading_style)
        .with_bullet_list_marker(args.bullet)
        .with_code_block_style(args.code_block_style)
        .with_link_style(args.link_style);

    let converter = Converter::new(&args.domain, true, Some(options));
    if !args.no_gfm {
        converter.use_plugin(plugins::github_flavored());
    }
    if args.robust_code {
        converter.use_plugin(plugins::robust_code_block());
    }
    converter
}

fn run(args: &Args) -> Result<()> {
    let html = read_input(&args.file)?;
    tracing::debug!(bytes = html.len(), file = %args.file.display(), "read input");

    let converter = build_converter(args);
    let markdown = converter.convert_bytes(&html).context("Error converting")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{markdown}").context("Error writing output")?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
