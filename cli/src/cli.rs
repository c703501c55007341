//! Command-line trigger for event posts.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use event_post_core::{
    BodyEncoding, Callbacks, EventDispatcher, RequestError, RequestParams, UreqPoster,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::{self, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "event-post")]
#[command(about = "Post analytics events to a collector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send the configured demo report, as the app's button does.
    Demo {
        /// Collector address; defaults to `server_address` from the config.
        #[arg(long)]
        address: Option<String>,
        /// Event name; defaults to `event_name` from the config.
        #[arg(long)]
        event: Option<String>,
    },

    /// Send an event with the given parameters.
    Send {
        /// Event name substituted into the path.
        #[arg(long)]
        event: String,
        /// Collector address; defaults to `server_address` from the config.
        #[arg(long)]
        address: Option<String>,
        /// Parameter as KEY=VALUE. Repeatable; the value may be empty.
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        /// Extra header as NAME=VALUE. Repeatable.
        #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,
        /// Send parameters form-encoded instead of as JSON.
        #[arg(long)]
        form: bool,
        /// Read timeout for this request, in milliseconds.
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Demo { address, event } => {
                let address = address.unwrap_or_else(|| cfg.server_address.clone());
                let event = event.unwrap_or_else(|| cfg.event_name.clone());
                let mut params = cfg.report.clone().into_params();
                apply_config(&mut params, &cfg);
                post_and_wait(&cfg, &address, &event, &params).await?;
            }
            CliCommand::Send {
                event,
                address,
                params: pairs,
                headers,
                form,
                timeout_ms,
            } => {
                let address = address.unwrap_or_else(|| cfg.server_address.clone());
                let mut params = RequestParams::from_pairs(pairs);
                apply_config(&mut params, &cfg);
                for (name, value) in headers {
                    params.add_header(name, value);
                }
                if form {
                    params.with_encoding(BodyEncoding::Form);
                }
                if let Some(ms) = timeout_ms {
                    params.read_timeout(Duration::from_millis(ms));
                }
                post_and_wait(&cfg, &address, &event, &params).await?;
            }
            CliCommand::Config => {
                println!("{}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        }

        Ok(())
    }
}

/// Configured encoding and headers; explicit flags applied afterwards win.
fn apply_config(params: &mut RequestParams, cfg: &AppConfig) {
    params.with_encoding(cfg.encoding);
    for (name, value) in &cfg.headers {
        params.add_header(name.clone(), value.clone());
    }
}

/// Dispatch one event and wait for whichever callback fires.
async fn post_and_wait(
    cfg: &AppConfig,
    address: &str,
    event: &str,
    params: &RequestParams,
) -> Result<()> {
    let poster = UreqPoster::new(&cfg.transport, Handle::current());
    let dispatcher = EventDispatcher::new(poster);
    let (callbacks, mut rx) = forwarding_callbacks(event);

    let id = dispatcher.dispatch(address, event, params, callbacks);
    tracing::info!(%id, %event, %address, "event dispatched");

    let outcome = tokio::time::timeout(Duration::from_secs(cfg.wait_secs), rx.recv())
        .await
        .with_context(|| format!("no response within {}s", cfg.wait_secs))?
        .ok_or_else(|| anyhow!("request {id} completed without a callback"))?;

    let response = outcome?;
    if let Some(body) = response {
        println!("{body}");
    }
    Ok(())
}

/// Log the outcome, then forward it to the waiting command.
fn forwarding_callbacks(
    event: &str,
) -> (
    Callbacks,
    mpsc::UnboundedReceiver<Result<Option<String>, RequestError>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let failure_tx = tx.clone();
    let success_event = event.to_string();
    let failure_event = event.to_string();
    let callbacks = Callbacks::new(
        move |response| {
            tracing::info!(event = %success_event, "event accepted");
            let _ = tx.send(Ok(response));
        },
        move |err| {
            tracing::warn!(event = %failure_event, error = %err, "event rejected");
            let _ = failure_tx.send(Err(err));
        },
    );
    (callbacks, rx)
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
