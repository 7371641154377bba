//! fastagi Script Binary
//!
//! Standalone AGI: Asterisk runs this once per call with the session on
//! stdin/stdout, e.g. `AGI(fastagi-script)` or `EAGI(fastagi-script,--eagi)`.
//!
//! Logs go to stderr because stdout carries the protocol.

use std::fs::File;
use std::time::Duration;

use clap::Parser;
use fastagi::session::EAGI_FD_PATH;
use fastagi::{Session, TracingTranscript};
use tracing_subscriber::{fmt, EnvFilter};

/// fastagi Script
#[derive(Parser, Debug)]
#[command(name = "fastagi-script")]
#[command(about = "Standalone AGI script: greets the caller and reads back a digit")]
#[command(version)]
struct Args {
    /// Sound file played before waiting for a digit
    #[arg(short, long, default_value = "hello-world")]
    greeting: String,

    /// Milliseconds to wait for a digit
    #[arg(short, long, default_value = "5000")]
    wait_ms: u64,

    /// Open the EAGI audio stream on fd 3
    #[arg(long)]
    eagi: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,fastagi=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        if e.is_hangup() {
            tracing::info!("Caller hung up");
            return;
        }
        tracing::error!("AGI script failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> fastagi::Result<()> {
    let mut builder =
        Session::builder(std::io::stdin(), std::io::stdout()).transcript(TracingTranscript);
    if args.eagi {
        builder = builder.eagi(File::open(EAGI_FD_PATH)?);
    }
    let session = builder.build()?;

    tracing::info!(
        "AGI request {} on {}",
        session.variable("agi_request").unwrap_or("-"),
        session.variable("agi_channel").unwrap_or("-"),
    );

    session.answer()?;
    session.verbose("fastagi-script started", 3)?;
    session.stream_file(&args.greeting, "", 0)?;

    match session.wait_for_digit(Duration::from_millis(args.wait_ms))? {
        Some(digit) => {
            session.say_alpha(&digit.to_string(), "")?;
        }
        None => tracing::info!("No digit pressed"),
    }

    session.hangup()
}
