use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use frontier_events::events::{DispatchError, EventHandler};
use frontier_events::{
    DelegationConfig, Document, EventDispatchers, Features, HostEnvironment, NativeEvent, NodeId,
    TokioMacrotaskScheduler,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(DelegationConfig::default_path);

    let config = DelegationConfig::load(config_path).unwrap_or_else(|err| {
        eprintln!("Failed to load event configuration: {err}. Using defaults.");
        DelegationConfig::default()
    });

    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str())),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|err| {
            eprintln!("Failed to start runtime: {err}");
            std::process::exit(1);
        });

    let local = tokio::task::LocalSet::new();
    if let Err(err) = local.block_on(&rt, run_scenario(&config)) {
        error!(error = %err, "scenario failed");
        std::process::exit(1);
    }
}

async fn run_scenario(config: &DelegationConfig) -> Result<()> {
    let document = Document::new("html");
    let body = document.append_child(Document::ROOT, "body")?;
    let form = document.append_child(body, "form")?;
    let button = document.append_child(form, "button")?;

    let features = Features::detect(&*document).with_config(config);
    let environment = HostEnvironment::new(
        document.clone(),
        document.clone(),
        Rc::new(TokioMacrotaskScheduler::new()),
        features,
    );
    let dispatchers = EventDispatchers::from_config(environment, config)?;
    info!(kinds = dispatchers.len(), "dispatchers ready");

    let click = dispatchers
        .get("click")
        .ok_or_else(|| anyhow!("click dispatcher missing"))?;

    for (node, label) in [(button, "button"), (form, "form")] {
        document.attach_handler(
            node,
            EventHandler::new(Rc::clone(&click), move |event| {
                info!(handler = label, target = event.target(), "click delivered");
                Ok(())
            }),
        )?;
    }
    info!(
        listeners = document.listener_count("click"),
        "handlers attached"
    );

    fire_click(&document, button).context("click dispatch failed")?;

    document.detach_all_handlers(button)?;
    document.detach_all_handlers(form)?;
    info!(
        listeners = document.listener_count("click"),
        "handlers detached, teardown pending"
    );

    // Let the deferred teardown run.
    tokio::time::sleep(Duration::from_millis(5)).await;
    info!(
        listeners = document.listener_count("click"),
        removals = document.remove_listener_calls(),
        "deferred phase finished"
    );
    Ok(())
}

fn fire_click(document: &Document, target: NodeId) -> Result<(), DispatchError> {
    document.fire(NativeEvent::new("click", target))
}
