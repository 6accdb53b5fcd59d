// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::Context;
use clap::Parser;
use cmdsrv_client::post_json;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// The server answered with something other than `200 OK`.
const EXIT_NOT_OK: u8 = 1;
/// No response was received.
const EXIT_TRANSPORT: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "cmdsrv-client",
    version,
    about = "Post a raw JSON request to a cmdsrv server",
    after_help = "Example: cmdsrv-client http://localhost:8055/cmd '{\"cmd\":[\"echo\",\"dummy\",\"cmdsrv\"]}'"
)]
struct Args {
    /// Full URL of the endpoint, e.g. http://localhost:8055/cmd
    url: String,

    /// Request body, sent verbatim.
    request: String,

    /// Print request and response diagnostics to stderr.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    diag(args.debug, &format!("Server location : {}", args.url));
    diag(args.debug, &format!("Request         : {}", args.request));

    let http = match build_http() {
        Ok(http) => http,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(EXIT_TRANSPORT);
        }
    };

    match post_json(&http, &args.url, args.request).await {
        Ok(raw) => {
            diag(args.debug, &format!("{} : {}", raw.status, raw.reason));
            println!("{}", raw.body.trim_end_matches(&['\r', '\n'][..]));
            if raw.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_NOT_OK)
            }
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(EXIT_TRANSPORT)
        }
    }
}

fn build_http() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("build HTTP client")
}

fn diag(enabled: bool, line: &str) {
    if enabled {
        eprintln!("[stderr] {line}");
    }
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cmdsrv={level}")));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        diag(debug, &format!("tracing disabled: {err}"));
    }
}
