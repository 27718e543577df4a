use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use spindle::logger::CliLogger;
use spindle::{CharStream, Debugger};
use termcolor::ColorChoice;

/// Parse a JSON document and print it back out.
#[derive(Debug, Parser)]
#[command(name = "spindle-json", version, about = "Parse JSON with spindle combinators.")]
struct Args {
    /// File to parse. Reads standard input when omitted.
    path: Option<PathBuf>,

    /// Trace every parser invocation to stderr.
    #[arg(long)]
    debug: bool,

    /// Pretty-print the parsed document.
    #[arg(long)]
    pretty: bool,

    /// When to color the trace.
    #[arg(long, value_enum, default_value_t = Color::Auto)]
    color: Color,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Color {
    Auto,
    Always,
    Never,
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> ColorChoice {
        match color {
            Color::Auto => ColorChoice::Auto,
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let grammar = spindle_json::grammar()?;

    let mut stream = match &args.path {
        Some(path) => CharStream::open(path)?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            CharStream::new(text)
        }
    };

    let mut debugger = if args.debug {
        Some(Debugger::new(CliLogger::stderr(args.color.into())))
    } else {
        None
    };

    let value = spindle_json::parse_stream(&grammar, &mut stream, debugger.as_mut())?;
    let out = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", out);
    Ok(())
}
