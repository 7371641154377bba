//! fastagi Server Binary
//!
//! Runs a FastAGI service: answers each call, plays a greeting and hangs up.
//!
//! Point Asterisk at it with `AGI(agi://127.0.0.1:4573/greeting)`.

use clap::Parser;
use fastagi::network::Server;
use fastagi::{Config, Session, TracingTranscript, DEFAULT_LISTEN_ADDR};
use tracing_subscriber::{fmt, EnvFilter};

/// fastagi Server
#[derive(Parser, Debug)]
#[command(name = "fastagi-server")]
#[command(about = "FastAGI service that greets callers")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,

    /// Sound file played to each caller
    #[arg(short, long, default_value = "hello-world")]
    greeting: String,

    /// Read timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,

    /// Log every command and response
    #[arg(short, long)]
    transcript: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fastagi=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    tracing::info!("fastagi server v{}", fastagi::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let server = match Server::bind(config) {
        Ok(server) if args.transcript => server.transcript(TracingTranscript),
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let greeting = args.greeting;
    let result = server.run(move |session: Session| {
        greet(&session, &greeting);
        if let Err(e) = session.close() {
            tracing::warn!("Failed to close session: {}", e);
        }
    });

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Answer, play the greeting, hang up
fn greet(session: &Session, greeting: &str) {
    let request = session.variable("agi_request").unwrap_or("-");
    let caller = session.variable("agi_callerid").unwrap_or("unknown");
    tracing::info!("Call from {} for {}", caller, request);

    let result = session
        .answer()
        .and_then(|_| session.stream_file(greeting, "", 0))
        .and_then(|_| session.hangup());

    match result {
        Ok(()) => {}
        Err(e) if e.is_hangup() => tracing::info!("Caller {} hung up", caller),
        Err(e) => tracing::warn!("Call from {} failed: {}", caller, e),
    }
}
