//! Command-line tool for inspecting route dispatch.
//!
//! - `probe` prints the route keys checked for each path
//! - `simulate` registers the handlers of a route manifest and replays a
//!   navigation sequence through the event bridge

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use page_dispatch::bridge::{BridgeError, EventBridge, ManualHost, MemoryLocation, Signal};
use page_dispatch::config::{load_config, DispatchConfig};
use page_dispatch::observability::logging::init_logging;
use page_dispatch::routing::{path, Callback, Dispatcher};

#[derive(Parser)]
#[command(name = "page-dispatch")]
#[command(about = "Inspect how page paths map to route callbacks", long_about = None)]
struct Cli {
    /// Emit diagnostic notices for registration and dispatch.
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the probe sequence of each path
    Probe {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Replay a navigation sequence against a route manifest
    Simulate {
        /// TOML configuration with `[[routes]]` entries.
        #[arg(short, long)]
        config: PathBuf,

        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { paths } => {
            init_logging(&Default::default(), cli.debug);
            for raw in &paths {
                let probes: Vec<String> = path::probe_sequence(raw)
                    .iter()
                    .map(|key| format!("{:?}", key))
                    .collect();
                println!("{}: {}", raw, probes.join(" -> "));
            }
        }
        Commands::Simulate { config, paths } => {
            let mut config = load_config(&config)?;
            config.debug |= cli.debug;
            init_logging(&config.observability, config.debug);

            let results = simulate(&config, &paths)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

/// Register one recording callback per manifest handler, then navigate.
fn simulate(config: &DispatchConfig, paths: &[String]) -> Result<Value, BridgeError> {
    let trace: Rc<RefCell<Vec<String>>> = Rc::default();
    let mut dispatcher: Dispatcher = Dispatcher::from_config(config);

    for manifest in &config.routes {
        for name in &manifest.handlers {
            let sink = Rc::clone(&trace);
            let label = name.clone();
            let count = dispatcher.register(
                &manifest.route,
                Callback::new(name.as_str(), move |cx| {
                    sink.borrow_mut().push(label.clone());
                    let visits = cx.data().get("visits").and_then(Value::as_u64).unwrap_or(0);
                    cx.data().insert("visits".into(), json!(visits + 1));
                    Ok(())
                }),
            );
            tracing::info!(route = %manifest.route, handler = %name, count, "Registered handler");
        }
    }

    let dispatcher = Rc::new(RefCell::new(dispatcher));
    let location = MemoryLocation::default();
    let bridge = EventBridge::new(Rc::clone(&dispatcher), location.clone(), config.bridge.clone());
    let mut host = ManualHost::new();
    EventBridge::subscribe(&bridge, &mut host)?;

    let mut steps = Vec::new();
    for (i, raw) in paths.iter().enumerate() {
        let signal = if i == 0 {
            Signal::DocumentReady
        } else {
            Signal::ContentSettled
        };
        location.set(raw.as_str());
        host.fire(config.bridge.event_name(signal));

        let executed: Vec<String> = trace.borrow_mut().drain(..).collect();
        let segment = path::top_segment(raw).to_string();
        let view = dispatcher
            .borrow()
            .view()
            .view(&segment)
            .cloned()
            .unwrap_or_default();
        steps.push(json!({
            "path": raw,
            "signal": signal,
            "executed": executed,
            "view": { "segment": segment, "data": view },
        }));
    }

    Ok(Value::Array(steps))
}
