mod config;
mod prober;
mod util;

use clap::Parser;
use config::ProbeConfig;
use std::process::ExitCode;
use tracing::debug;

const ENV_HELP: &str = "\
environment variables:
  CONN_TYPE     connection type: tcp, udp, http, https (default: tcp)
  DEST_HOST     destination hostname or IP (default: localhost)
  DEST_PORT     destination port number (default: 80)
  CONN_TIMEOUT  connection timeout in seconds, 0 disables it (default: 5)
  HTTPS_VERIFY  verify HTTPS certificates (default: true)
  LOG_LEVEL     log verbosity on stderr: trace, debug, info, warn, error (default: info)
exit codes:
  0  connection successful
  1  connection failed";

/// Probe one destination once and report whether it is reachable
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, after_help = ENV_HELP)]
struct Cli {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = Cli::try_parse() {
        let _ = e.print();
        // --help and --version land here too
        return if e.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    let config = match ProbeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config) {
        println!("{:#}", e);
        return ExitCode::FAILURE;
    }
    if let Ok(json) = serde_json::to_string(&config) {
        debug!("config: {}", json);
    }

    println!("testing {} connection to {}", config.conn_type, config.address());

    match prober::run(&config).await {
        Ok(outcome) => {
            println!("{}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("{} probe failed: {:?}", config.conn_type, e);
            println!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &ProbeConfig) -> anyhow::Result<()> {
    let log_level = config.get_tracing_level()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("conn_probe={}", log_level.as_str().to_lowercase()).parse()?,
            ),
        )
        .init();
    Ok(())
}
