//! micro-router CLI.
//!
//! Inspect a route configuration and replay navigation scripts through the
//! orchestrator without a browser.
//!
//! ```text
//! micro-router check routes.toml
//! micro-router resolve routes.toml /seller/7 /nope
//! micro-router replay routes.toml nav.script --load-delay-ms 100
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use micro_router::assets::{AssetConfig, AssetLifecycle, AssetRef};
use micro_router::config::{load_config, ConfigError, ConfigWatcher};
use micro_router::lifecycle::shutdown::trigger_on_ctrl_c;
use micro_router::observability::logging::init_logging;
use micro_router::{
    ChannelHooks, LoadFailure, MemoryHistory, Orchestrator, RouteMatch, RouterRuntime, Shutdown,
    SignalSender,
};

#[derive(Parser)]
#[command(name = "micro-router")]
#[command(about = "Resolve and replay micro-frontend routes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Check { config: PathBuf },
    /// Print the resolved route for each URL as JSON
    Resolve {
        config: PathBuf,
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Replay a navigation script and print router events as JSON lines
    Replay {
        config: PathBuf,
        script: PathBuf,
        /// Simulated asset load time
        #[arg(long, default_value_t = 50)]
        load_delay_ms: u64,
        /// Keep assets whose URL contains this text on unload
        #[arg(long)]
        keep_asset: Vec<String>,
        /// Keep running after the script, reloading routes on config change
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => check(&config),
        Commands::Resolve { config, urls } => resolve(&config, &urls),
        Commands::Replay {
            config,
            script,
            load_delay_ms,
            keep_asset,
            watch,
        } => {
            replay(
                &config,
                &script,
                Duration::from_millis(load_delay_ms),
                keep_asset,
                watch,
            )
            .await
        }
    }
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            for error in &errors {
                eprintln!("error: {error}");
            }
            return Err(format!("{} validation error(s)", errors.len()).into());
        }
        Err(e) => return Err(e.into()),
    };

    for (index, route) in config.routes.iter().enumerate() {
        let paths: Vec<String> = route.rules().into_iter().map(|r| r.value).collect();
        println!("{}\t{}", route.label(index), paths.join(", "));
    }
    println!("ok: {} route(s)", config.routes.len());
    Ok(())
}

fn resolve(path: &Path, urls: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    init_logging(&config.observability)?;

    let parser = config.location_parser()?;
    let table = config.route_table();
    for url in urls {
        let location = parser.parse(url)?;
        let matched = table.resolve(&location);
        println!("{}", json!({ "url": url, "match": matched }));
    }
    Ok(())
}

async fn replay(
    path: &Path,
    script: &Path,
    load_delay: Duration,
    keep_assets: Vec<String>,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    init_logging(&config.observability)?;
    let steps = parse_script(&fs::read_to_string(script)?)?;

    let asset_config = AssetConfig::new()
        .with_removal_policy(move |asset| !keep_assets.iter().any(|k| asset.url.contains(k.as_str())));
    let (hooks, mut events) = ChannelHooks::new();
    let history = MemoryHistory::new("/");

    let mut orchestrator = Orchestrator::new(
        config.route_table(),
        hooks,
        SimulatedAssets::new(load_delay),
    )
    .with_parser(config.location_parser()?)
    .with_asset_config(asset_config);
    let mut source = history.clone();
    orchestrator.start(&mut source);

    let signals = orchestrator.sender();
    let shutdown = Shutdown::new();
    let runtime = RouterRuntime::new(orchestrator);
    let router = tokio::spawn(runtime.run(shutdown.subscribe()));

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode event"),
            }
        }
    });

    for step in steps {
        match step {
            Step::Push(url) => history.push(url),
            Step::Replace(url) => history.replace(url),
            Step::Back => {
                if !history.back() {
                    tracing::warn!("Nothing to go back to");
                }
            }
            Step::Forward => {
                if !history.forward() {
                    tracing::warn!("Nothing to go forward to");
                }
            }
            Step::Fail(message) => {
                signals.error(LoadFailure::new(message));
            }
            Step::Wait(duration) => tokio::time::sleep(duration).await,
        }
    }

    // Let in-flight loads report back.
    tokio::time::sleep(load_delay + Duration::from_millis(20)).await;

    if watch {
        let _watcher = ConfigWatcher::new(path, signals.clone()).run()?;
        trigger_on_ctrl_c(shutdown.clone()).await;
    }
    shutdown.trigger();

    let orchestrator = router.await?;
    let snapshot = orchestrator.snapshot();
    drop(orchestrator);
    printer.await?;

    println!("{}", json!({ "event": "final", "snapshot": snapshot }));
    Ok(())
}

/// Asset collaborator that pretends every load takes a fixed time.
struct SimulatedAssets {
    delay: Duration,
    config: AssetConfig,
    signals: Option<SignalSender>,
}

impl SimulatedAssets {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            config: AssetConfig::default(),
            signals: None,
        }
    }
}

impl AssetLifecycle for SimulatedAssets {
    fn initialize(&mut self, config: &AssetConfig, signals: SignalSender) {
        self.config = config.clone();
        signals.initialized();
        self.signals = Some(signals);
    }

    fn load(&mut self, app: &RouteMatch) {
        let Some(signals) = self.signals.clone() else {
            return;
        };
        let key = app.key.clone();
        let delay = self.delay;
        signals.loading_started(key.clone());
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            signals.loading_finished(key);
        });
    }

    fn unload(&mut self, app: &RouteMatch) {
        for asset in AssetRef::from_content(app.definition.content()) {
            if self.config.should_remove_asset(&asset) {
                tracing::debug!(app = %app.key, url = %asset.url, "Removing asset");
            } else {
                tracing::debug!(app = %app.key, url = %asset.url, "Keeping asset");
            }
        }
    }

    fn teardown(&mut self) {
        self.signals = None;
    }
}

#[derive(Debug, PartialEq)]
enum Step {
    Push(String),
    Replace(String),
    Back,
    Forward,
    Fail(String),
    Wait(Duration),
}

#[derive(Debug, thiserror::Error)]
#[error("script line {line}: {message}")]
struct ScriptError {
    line: usize,
    message: String,
}

/// Parse a navigation script. Blank lines and `#` comments are skipped.
fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        let error = |message: String| ScriptError {
            line: index + 1,
            message,
        };

        let step = match (command, arg) {
            ("push", url) if !url.is_empty() => Step::Push(url.to_string()),
            ("replace", url) if !url.is_empty() => Step::Replace(url.to_string()),
            ("back", "") => Step::Back,
            ("forward", "") => Step::Forward,
            ("fail", message) if !message.is_empty() => Step::Fail(message.to_string()),
            ("wait", ms) => {
                let ms: u64 = ms
                    .parse()
                    .map_err(|_| error(format!("invalid wait '{ms}'")))?;
                Step::Wait(Duration::from_millis(ms))
            }
            _ => return Err(error(format!("unrecognised step '{line}'"))),
        };
        steps.push(step);
    }
    Ok(steps)
}
