use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{TealiumConfig, load_config};
use crate::forms::FormAnalytics;
use crate::handlers::EventOutcome;
use crate::models::{PageEvent, PageSnapshot};
use crate::page::{PageSession, ResumeOutcome, RetryPolicy, WindowLoadReport};
use crate::sdk::{RecordingSdk, SdkCall, SdkHandle};
use crate::storage::{MemoryStorage, PageStores};

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// `window.TealiumConfig` JSON that replaces the scenario's own config.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fail with exit code 2 unless exactly this many SDK calls were made.
    #[arg(long, value_name = "N")]
    pub expect_calls: Option<usize>,
}

/// A recorded page visit: what the template rendered, what the DOM held,
/// what storage carried over from the previous page and what happened next.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Scenario {
    pub config: TealiumConfig,
    pub page: PageSnapshot,
    pub session_storage: BTreeMap<String, String>,
    pub local_storage: BTreeMap<String, String>,
    /// Whether the vendor SDK is loaded at all.
    pub sdk_ready: bool,
    pub events: Vec<PageEvent>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            config: TealiumConfig::default(),
            page: PageSnapshot::default(),
            session_storage: BTreeMap::new(),
            local_storage: BTreeMap::new(),
            sdk_ready: true,
            events: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct ReplayReport {
    pub window_load: WindowLoadReport,
    pub resume: ResumeOutcome,
    pub outcomes: Vec<EventOutcome>,
    pub calls: Vec<SdkCall>,
    pub form_analytics: FormAnalytics,
    pub session_storage: BTreeMap<String, String>,
    pub local_storage: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct ReplayExpectationFailure {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for ReplayExpectationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "replay expected {} SDK call(s) but observed {}.",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for ReplayExpectationFailure {}

pub fn run(args: &ReplayArgs) -> Result<()> {
    println!("replay: start scenario={}", args.scenario.display());
    let mut scenario = load_scenario(&args.scenario)?;
    if let Some(path) = &args.config {
        scenario.config = load_config(path)?;
    }
    println!(
        "replay: loaded page_type={} events={} sdk_ready={}",
        scenario.config.page_type,
        scenario.events.len(),
        scenario.sdk_ready
    );

    let report = replay(&scenario, RetryPolicy::default(), std::thread::sleep);
    for call in &report.calls {
        println!("{}", serde_json::to_string(call)?);
    }
    println!(
        "replay: complete calls={} forms_tracked={} forms_with_interaction={} forms_submitted={}",
        report.calls.len(),
        report.form_analytics.total_forms_tracked,
        report.form_analytics.forms_with_interaction,
        report.form_analytics.forms_submitted
    );

    if let Some(expected) = args.expect_calls
        && expected != report.calls.len()
    {
        eprintln!(
            "replay: failed expected_calls={expected} actual_calls={}",
            report.calls.len()
        );
        return Err(ReplayExpectationFailure {
            expected,
            actual: report.calls.len(),
        }
        .into());
    }
    Ok(())
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid scenario json {}", path.display()))
}

/// Runs the page phases in browser order, then every recorded event.
pub fn replay(
    scenario: &Scenario,
    policy: RetryPolicy,
    sleep: impl FnMut(Duration),
) -> ReplayReport {
    let session_store = MemoryStorage::with_entries(scenario.session_storage.clone());
    let local_store = MemoryStorage::with_entries(scenario.local_storage.clone());
    let stores = PageStores {
        session: Rc::new(session_store.clone()),
        local: Rc::new(local_store.clone()),
    };

    let sdk = RecordingSdk::new();
    let handle = if scenario.sdk_ready {
        SdkHandle::with_sdk(sdk.clone())
    } else {
        SdkHandle::empty()
    };

    let mut session = PageSession::initialize(
        scenario.config.clone(),
        &scenario.page.location.href,
        handle,
        &stores,
    );
    session.document_ready(&scenario.page);
    let window_load = session.window_load();
    let resume = session.resume_pending_click(policy, sleep);

    let outcomes = scenario
        .events
        .iter()
        .map(|event| {
            let outcome = session.handle_event(event);
            debug!(event = event.dom_name(), ?outcome, "replayed event");
            outcome
        })
        .collect();

    ReplayReport {
        window_load,
        resume,
        outcomes,
        calls: sdk.calls(),
        form_analytics: session.form_analytics(),
        session_storage: session_store.snapshot(),
        local_storage: local_store.snapshot(),
    }
}
