//! Monitoring plugin checking a SIP server with a single OPTIONS or INVITE request.
//!
//! Prints one `SIP <STATUS> - <message>` line and exits with 0 (OK), 1 (WARNING),
//! 2 (CRITICAL) or 3 (UNKNOWN).

use clap::Parser;
use cli::Args;
use sip_core::Verdict;
use sip_core::exchange::{self, RawExchange};
use tracing_subscriber::filter::LevelFilter;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let verdict = check().await;

    println!("{verdict}");

    std::process::exit(verdict.exit_code());
}

async fn check() -> Verdict {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return Verdict::unknown(cli::parse_error_message(&e)),
    };

    init_logging(args.debug);

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => return Verdict::from(&e),
    };

    match exchange::run(&config).await {
        Ok(result) => {
            if let Some(raw) = result.raw() {
                dump(raw);
            }

            result.verdict()
        }
        Err(e) => {
            log::debug!("{} exchange failed: {e:?}", e.transport_kind());

            Verdict::from(&e)
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn dump(raw: &RawExchange) {
    eprintln!("===== request =====");
    eprint!("{}", raw.request);
    eprintln!("===== response =====");

    for line in &raw.response {
        eprintln!("{line}");
    }
}
