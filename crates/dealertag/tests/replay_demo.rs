use std::path::PathBuf;

use dealertag::cli::commands::replay::{load_scenario, replay};
use dealertag::handlers::EventOutcome;
use dealertag::page::{ResumeOutcome, RetryPolicy};
use dealertag::storage::LIMITED_TIME_OFFER_FLAG_KEY;
use serde_json::json;

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn product_page_demo_replays_a_quote_request() {
    let scenario = load_scenario(&demo_path("product-page.json")).expect("demo should load");

    let report = replay(&scenario, RetryPolicy::default(), |_| {});

    assert_eq!(report.resume, ResumeOutcome::NothingPending);
    assert_eq!(report.window_load.forms_loaded, 1);
    let events: Vec<_> = report
        .calls
        .iter()
        .map(|call| call.tealium_event().unwrap_or("view").to_string())
        .collect();
    assert_eq!(
        events,
        [
            "view",
            "form_load",
            "form_interaction",
            "did_get_a_quote_form_submit"
        ]
    );
    assert_eq!(report.outcomes.last(), Some(&EventOutcome::Stored));
    assert_eq!(
        report.local_storage.get(LIMITED_TIME_OFFER_FLAG_KEY).map(String::as_str),
        Some("true")
    );

    let submit = report.calls[3].payload();
    assert_eq!(submit["product_id"], json!("501"));
    assert_eq!(submit["customer_email"], json!("rider@example.test"));
    assert_eq!(report.form_analytics.forms_submitted, 1);
}
