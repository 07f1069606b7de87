// # cartond - carton command host
//
// This binary is a THIN integration layer:
// - All record, lifecycle and resolution logic lives in carton-core
// - Configuration is via environment variables only
// - It wires a table store, a notifier and the HTTP request authority,
//   runs one command and exits
//
// ## Commands
//
// - `cartond resolve <payload-file>`: resolve a queued payload and print the request
// - `cartond box <component-id>`: fetch a component and print its provisioning view
// - `cartond status <component-id> <status>`: persist a status and emit its event
//
// ## Configuration
//
// ### Table Store
// - `CARTON_STORE_TYPE`: Type of table store (memory, file). `box` and
//   `status` need `file`; memory is only useful for `resolve`
// - `CARTON_STORE_PATH`: Path to the store file (for file store)
//
// ### Request Authority
// - `CARTON_API_URL`: Gateway base URL (default `http://localhost:9000/v2`)
// - `CARTON_API_EMAIL`: Account email (optional)
// - `CARTON_API_KEY`: API key (optional)
// - `CARTON_API_TIMEOUT_SECS`: HTTP timeout in seconds
//
// ### Events
// - `CARTON_EVENT_CAPACITY`: Status event channel capacity
//
// ### Logging
// - `CARTON_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export CARTON_STORE_TYPE=file
// export CARTON_STORE_PATH=/var/lib/carton/store.json
// export CARTON_API_URL=https://api.megam.io/v2
//
// cartond box COM1270493491542269952
// ```

use anyhow::{Context, Result};
use carton_api_http::HttpRequestAuthority;
use carton_core::config::{ApiConfig, CartonConfig, EventsConfig, StoreConfig};
use carton_core::{ChannelNotifier, Components, Payload, PayloadResolver, Status, StatusUpdate};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Command succeeded
/// - 1: Configuration or usage error
/// - 2: Command failed
#[derive(Debug, Clone, Copy)]
enum CartonExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<CartonExitCode> for ExitCode {
    fn from(code: CartonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// One command per invocation
#[derive(Debug)]
enum Command {
    Resolve { payload_file: String },
    Box { component_id: String },
    Status { component_id: String, status: String },
}

impl Command {
    fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [cmd, file] if cmd == "resolve" => Ok(Self::Resolve {
                payload_file: file.clone(),
            }),
            [cmd, id] if cmd == "box" => Ok(Self::Box {
                component_id: id.clone(),
            }),
            [cmd, id, status] if cmd == "status" => Ok(Self::Status {
                component_id: id.clone(),
                status: status.clone(),
            }),
            _ => anyhow::bail!(
                "usage: cartond resolve <payload-file> | box <component-id> | status <component-id> <status>"
            ),
        }
    }

    /// Reject store settings the command cannot work with
    ///
    /// `box` and `status` read existing rows. A memory store starts empty
    /// in every invocation, so they would only ever report NotFound.
    fn check_store(&self, store: &StoreConfig) -> Result<()> {
        match (self, store) {
            (Self::Box { .. } | Self::Status { .. }, StoreConfig::Memory) => anyhow::bail!(
                "this command reads stored components and needs a persistent store. \
                Set CARTON_STORE_TYPE=file and CARTON_STORE_PATH"
            ),
            _ => Ok(()),
        }
    }
}

/// Application configuration
struct Config {
    carton: CartonConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let store = match env::var("CARTON_STORE_TYPE")
            .unwrap_or_else(|_| "memory".to_string())
            .as_str()
        {
            "memory" => StoreConfig::Memory,
            "file" => StoreConfig::File {
                path: env::var("CARTON_STORE_PATH").context(
                    "CARTON_STORE_PATH is required when CARTON_STORE_TYPE=file",
                )?,
            },
            other => anyhow::bail!(
                "CARTON_STORE_TYPE '{}' is not supported. Supported types: memory, file",
                other
            ),
        };

        let mut api = match env::var("CARTON_API_URL") {
            Ok(url) => ApiConfig::new(url),
            Err(_) => ApiConfig::default(),
        };
        api.email = env::var("CARTON_API_EMAIL").ok();
        api.api_key = env::var("CARTON_API_KEY").ok();
        if let Ok(raw) = env::var("CARTON_API_TIMEOUT_SECS") {
            api.timeout_secs = raw
                .parse()
                .with_context(|| format!("CARTON_API_TIMEOUT_SECS is not a number: {}", raw))?;
        }

        let mut events = EventsConfig::default();
        if let Ok(raw) = env::var("CARTON_EVENT_CAPACITY") {
            events.channel_capacity = raw
                .parse()
                .with_context(|| format!("CARTON_EVENT_CAPACITY is not a number: {}", raw))?;
        }

        Ok(Self {
            carton: CartonConfig { store, api, events },
            log_level: env::var("CARTON_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.carton.validate()?;

        if let StoreConfig::File { path } = &self.carton.store
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            anyhow::bail!(
                "CARTON_STORE_PATH parent directory does not exist: {}",
                parent.display()
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CARTON_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::from_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{}", e);
            return CartonExitCode::ConfigError.into();
        }
    };

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return CartonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config
        .validate()
        .and_then(|()| command.check_store(&config.carton.store))
    {
        eprintln!("Configuration validation error: {:#}", e);
        return CartonExitCode::ConfigError.into();
    }

    // Logs go to stderr so stdout carries only command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CartonExitCode::ConfigError.into();
    }

    info!("Store type: {}", config.carton.store.type_name());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CartonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(command, config.carton).await {
            Ok(()) => CartonExitCode::Success,
            Err(e) => {
                error!("Command failed: {:#}", e);
                CartonExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run one command
async fn run(command: Command, config: CartonConfig) -> Result<()> {
    match command {
        Command::Resolve { payload_file } => {
            let bytes = tokio::fs::read(&payload_file)
                .await
                .with_context(|| format!("Failed to read payload file {}", payload_file))?;
            let payload = Payload::from_bytes(&bytes)?;

            let authority = HttpRequestAuthority::from_config(&config.api)?;
            let resolver = PayloadResolver::new(Arc::new(authority));
            let request = resolver.resolve(&payload).await?;

            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Box { component_id } => {
            let (components, _events) = components(&config).await?;
            let component = components.fetch(&component_id).await?;

            println!("{}", serde_json::to_string_pretty(&component.mk_box())?);
        }
        Command::Status {
            component_id,
            status,
        } => {
            let (components, mut events) = components(&config).await?;
            let mut component = components.fetch(&component_id).await?;

            match components
                .set_status(&mut component, Status::from(status))
                .await?
            {
                StatusUpdate::Notified => {
                    while let Ok(event) = events.try_recv() {
                        info!("Event: {:?}", event);
                    }
                }
                StatusUpdate::NotifyFailed(reason) => {
                    warn!("Status saved but event not delivered: {}", reason);
                }
            }

            println!("{}", component);
        }
    }

    Ok(())
}

async fn components(
    config: &CartonConfig,
) -> Result<(
    Components,
    tokio::sync::mpsc::Receiver<carton_core::ComponentEvent>,
)> {
    let store = carton_core::store::open(&config.store).await?;
    let (notifier, events) = ChannelNotifier::new(config.events.channel_capacity);
    Ok((Components::new(store, Arc::new(notifier)), events))
}
