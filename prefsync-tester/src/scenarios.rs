use anyhow::{Result, anyhow, ensure};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use prefsync_core::memory::{MemoryCache, PageCall, RecordingPage, RecordingPresentation, ScriptedRemote};
use prefsync_core::remote::parse_settings_response;
use prefsync_core::{
    KeyInput, LocalCache, ReconcileReport, SettingsStore, ShortcutConfig, ShortcutDispatcher,
    SyncError, SyncStatus, SyncSummary, Synchronizer,
};

type Store = SettingsStore<MemoryCache, RecordingPresentation>;
type Check = fn(&mut Outcome) -> Result<()>;

/// What the scripted server does with the settings request.
#[derive(Debug, Clone)]
pub enum RemoteScript {
    Body(String),
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub key: String,
    pub description: String,
    local: Vec<(String, String)>,
    remote: RemoteScript,
    check: Option<Check>,
}

impl Scenario {
    fn new(key: &str, description: &str, local: &[(&str, &str)], remote: RemoteScript, check: Check) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            local: local
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            remote,
            check: Some(check),
        }
    }

    /// A scenario built from user-supplied fixtures. It only fails if the
    /// run itself cannot complete.
    pub fn ad_hoc(local: BTreeMap<String, String>, remote: RemoteScript) -> Self {
        Self {
            key: "ad-hoc".to_string(),
            description: "Fixtures supplied on the command line".to_string(),
            local: local.into_iter().collect(),
            remote,
            check: None,
        }
    }
}

/// State left behind by one page-load run, for checks to inspect.
pub struct Outcome {
    pub store: Store,
    pub sync: Synchronizer<ScriptedRemote>,
    pub summary: SyncSummary,
    remote_body: Option<String>,
}

impl Outcome {
    fn has_class(&self, class: &str) -> bool {
        self.store.presentation().has_class(class)
    }

    fn cached(&self, key: &str) -> Option<String> {
        self.store.cache().get(key)
    }

    /// Reconcile the same remote body a second time.
    fn reconcile_again(&mut self) -> Result<ReconcileReport> {
        let body = self
            .remote_body
            .as_deref()
            .ok_or_else(|| anyhow!("scenario has no remote body"))?;
        let remote = parse_settings_response(body)?;
        Ok(self
            .sync
            .reconcile(&self.store, &mut self.summary.local, &remote.prefs))
    }

    fn shortcuts(&self) -> ShortcutDispatcher {
        ShortcutDispatcher::from_store(&self.store, ShortcutConfig::default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub status: String,
    pub changed: Vec<String>,
    pub classes: Vec<String>,
    pub style_vars: BTreeMap<String, String>,
    pub failures: Vec<String>,
    pub duration: Duration,
}

fn status_label(status: &SyncStatus) -> String {
    match status {
        SyncStatus::Reconciled(_) => "reconciled".to_string(),
        SyncStatus::Failed(err) => format!("failed ({})", err.kind()),
    }
}

pub async fn run_scenario(scenario: &Scenario, verbose: bool) -> ScenarioResult {
    let start = Instant::now();
    let cache = MemoryCache::with_entries(
        scenario
            .local
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    let store = SettingsStore::new(cache, RecordingPresentation::default());
    let (remote, remote_body) = match &scenario.remote {
        RemoteScript::Body(body) => (ScriptedRemote::default().respond(body.clone()), Some(body.clone())),
        RemoteScript::Transport(reason) => (
            ScriptedRemote::default().fail(SyncError::Transport(reason.clone())),
            None,
        ),
    };
    let sync = Synchronizer::new(remote);
    let summary = sync.run(&store).await;
    if verbose {
        log::info!("{}: {:?}", scenario.key, summary.status);
    }

    let mut outcome = Outcome {
        store,
        sync,
        summary,
        remote_body,
    };
    let mut failures = Vec::new();
    if let Some(check) = scenario.check
        && let Err(err) = check(&mut outcome)
    {
        failures.push(format!("{err:#}"));
    }

    let changed = match &outcome.summary.status {
        SyncStatus::Reconciled(report) => report.changed.iter().map(ToString::to_string).collect(),
        SyncStatus::Failed(_) => Vec::new(),
    };
    let presentation = outcome.store.presentation();
    ScenarioResult {
        scenario_name: scenario.key.clone(),
        passed: failures.is_empty(),
        status: status_label(&outcome.summary.status),
        changed,
        classes: presentation.classes().into_iter().collect(),
        style_vars: presentation.style_vars(),
        failures,
        duration: start.elapsed(),
    }
}

fn body(json: &str) -> RemoteScript {
    RemoteScript::Body(json.to_string())
}

#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "remote-overrides",
            "Empty cache, remote enables dark mode and sets text size 120",
            &[],
            body(r#"{"success": true, "settings": {"dark_mode": true, "font_size": 120}}"#),
            remote_overrides,
        ),
        Scenario::new(
            "local-only",
            "Cached values apply before and without the server",
            &[("high_contrast", "true"), ("line_spacing", "1.5")],
            RemoteScript::Transport("offline".to_string()),
            local_only,
        ),
        Scenario::new(
            "transport-failure",
            "Network failure keeps the cached presentation",
            &[("dark_mode", "true")],
            RemoteScript::Transport("connection refused".to_string()),
            transport_failure,
        ),
        Scenario::new(
            "absent-keys-untouched",
            "Keys the server omits keep their cached values",
            &[("focus_mode", "true"), ("font_size", "140")],
            body(r#"{"success": true, "settings": {"dark_mode": true}}"#),
            absent_keys_untouched,
        ),
        Scenario::new(
            "idempotent-reconcile",
            "Reconciling the same remote twice applies nothing the second time",
            &[("dark_mode", "false")],
            body(r#"{"success": true, "settings": {"dark_mode": true, "line_spacing": 2.0}}"#),
            idempotent_reconcile,
        ),
        Scenario::new(
            "alias-equivalence",
            "reduce_animations=true behaves like reduced_motion=true",
            &[("reduce_animations", "true")],
            RemoteScript::Transport("offline".to_string()),
            alias_equivalence,
        ),
        Scenario::new(
            "malformed-value",
            "One bad remote value is skipped, the rest reconcile",
            &[],
            body(r#"{"success": true, "settings": {"font_size": "huge", "dark_mode": true}}"#),
            malformed_value,
        ),
        Scenario::new(
            "malformed-payload",
            "A non-JSON response is a parse failure",
            &[("dyslexia_font", "true")],
            body("<html>Login required</html>"),
            malformed_payload,
        ),
        Scenario::new(
            "rejected-session",
            "success=false keeps local state",
            &[("focus_mode", "true")],
            body(r#"{"success": false, "message": "Not logged in"}"#),
            rejected_session,
        ),
        Scenario::new(
            "shortcuts-disabled",
            "No chord navigates when keyboard_shortcuts is unset",
            &[],
            RemoteScript::Transport("offline".to_string()),
            shortcuts_disabled,
        ),
        Scenario::new(
            "shortcuts-enabled-remotely",
            "A remote keyboard_shortcuts=true is cached for the next page",
            &[],
            body(r#"{"success": true, "settings": {"keyboard_shortcuts": true}}"#),
            shortcuts_enabled_remotely,
        ),
    ]
}

#[must_use]
pub fn list_scenarios() -> Vec<(String, String)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn find_scenario(key: &str) -> Option<Scenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

fn expect_failure(outcome: &Outcome, kind: &str) -> Result<()> {
    match &outcome.summary.status {
        SyncStatus::Failed(err) => {
            ensure!(err.kind() == kind, "expected {kind} failure, got {err}");
            Ok(())
        }
        SyncStatus::Reconciled(_) => Err(anyhow!("expected {kind} failure, sync reconciled")),
    }
}

fn remote_overrides(outcome: &mut Outcome) -> Result<()> {
    ensure!(outcome.has_class("dark-mode"), "dark-mode class missing");
    let factor = outcome.store.presentation().style_var("--text-size-factor");
    ensure!(factor.as_deref() == Some("1.2"), "text size factor was {factor:?}");
    ensure!(outcome.cached("dark_mode").as_deref() == Some("true"), "dark_mode not cached");
    ensure!(outcome.cached("font_size").as_deref() == Some("120"), "font_size not cached");
    Ok(())
}

fn local_only(outcome: &mut Outcome) -> Result<()> {
    ensure!(outcome.has_class("high-contrast"), "high-contrast class missing");
    let spacing = outcome.store.presentation().style_var("--line-spacing");
    ensure!(spacing.as_deref() == Some("1.5"), "line spacing was {spacing:?}");
    expect_failure(outcome, "transport")
}

fn transport_failure(outcome: &mut Outcome) -> Result<()> {
    expect_failure(outcome, "transport")?;
    ensure!(outcome.has_class("dark-mode"), "cached dark mode lost");
    Ok(())
}

fn absent_keys_untouched(outcome: &mut Outcome) -> Result<()> {
    ensure!(outcome.has_class("focus-mode"), "focus-mode class removed");
    ensure!(outcome.cached("focus_mode").as_deref() == Some("true"), "focus_mode cache changed");
    ensure!(outcome.cached("font_size").as_deref() == Some("140"), "font_size cache changed");
    ensure!(outcome.has_class("dark-mode"), "remote dark mode not applied");
    Ok(())
}

fn idempotent_reconcile(outcome: &mut Outcome) -> Result<()> {
    outcome.store.presentation().clear_calls();
    let second = outcome.reconcile_again()?;
    ensure!(second.changed.is_empty(), "second pass changed {:?}", second.changed);
    let calls = outcome.store.presentation().call_count();
    ensure!(calls == 0, "second pass made {calls} presentation calls");
    Ok(())
}

fn alias_equivalence(outcome: &mut Outcome) -> Result<()> {
    ensure!(outcome.has_class("reduced-motion"), "reduced-motion class missing");
    ensure!(outcome.has_class("reduce-animations"), "reduce-animations class missing");
    Ok(())
}

fn malformed_value(outcome: &mut Outcome) -> Result<()> {
    ensure!(outcome.has_class("dark-mode"), "valid key not reconciled");
    ensure!(outcome.cached("font_size").is_none(), "malformed font_size was cached");
    ensure!(
        outcome.store.presentation().style_var("--text-size-factor").as_deref() == Some("1"),
        "text size moved off its default"
    );
    Ok(())
}

fn malformed_payload(outcome: &mut Outcome) -> Result<()> {
    expect_failure(outcome, "parse")?;
    ensure!(outcome.has_class("dyslexia-font"), "cached dyslexia font lost");
    Ok(())
}

fn rejected_session(outcome: &mut Outcome) -> Result<()> {
    expect_failure(outcome, "rejected")?;
    ensure!(outcome.has_class("focus-mode"), "cached focus mode lost");
    Ok(())
}

fn shortcuts_disabled(outcome: &mut Outcome) -> Result<()> {
    let mut dispatcher = outcome.shortcuts();
    let page = RecordingPage::default().with_search();
    for input in [KeyInput::new("h").with_alt(), KeyInput::new("F1"), KeyInput::new("/")] {
        dispatcher.handle(&input, &page);
    }
    let calls = page.calls();
    ensure!(calls.is_empty(), "disabled dispatcher acted: {calls:?}");
    Ok(())
}

fn shortcuts_enabled_remotely(outcome: &mut Outcome) -> Result<()> {
    let mut dispatcher = outcome.shortcuts();
    ensure!(dispatcher.is_enabled(), "keyboard_shortcuts not cached");
    let page = RecordingPage::default();
    dispatcher.handle(&KeyInput::new("G").with_alt(), &page);
    ensure!(
        page.calls() == vec![PageCall::Navigate("/grades".to_string())],
        "Alt+G did not navigate"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_catalog_scenario_passes() {
        for scenario in catalog() {
            let result = run_scenario(&scenario, false).await;
            assert!(result.passed, "{}: {:?}", result.scenario_name, result.failures);
        }
    }

    #[tokio::test]
    async fn ad_hoc_runs_report_state_without_checks() {
        let local = BTreeMap::from([("dark_mode".to_string(), "true".to_string())]);
        let scenario = Scenario::ad_hoc(
            local,
            RemoteScript::Body(r#"{"success": true, "settings": {"focus_mode": true}}"#.into()),
        );
        let result = run_scenario(&scenario, false).await;
        assert!(result.passed);
        assert_eq!(result.status, "reconciled");
        assert_eq!(result.changed, vec!["focus_mode".to_string()]);
        assert!(result.classes.contains(&"dark-mode".to_string()));
    }

    #[test]
    fn scenario_keys_are_unique() {
        let mut keys: Vec<String> = list_scenarios().into_iter().map(|(k, _)| k).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert!(find_scenario("remote-overrides").is_some());
        assert!(find_scenario("nope").is_none());
    }
}
