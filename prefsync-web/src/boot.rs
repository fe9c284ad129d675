//! Page-load wiring: apply cached preferences synchronously, then reconcile
//! with the server in the background.

use std::rc::Rc;

use log::{debug, info, warn};
use prefsync_core::{
    DomConfig, Preference, PreferenceSet, SettingsStore, ShortcutDispatcher, SyncStatus,
    Synchronizer,
};
use wasm_bindgen_futures::spawn_local;
use yew::{Callback, Renderer};

use crate::components::PreferencesPanel;
use crate::components::preferences_panel::Props as PanelProps;
use crate::presentation::DocumentPresentation;
use crate::remote::HttpRemote;
use crate::storage::BrowserCache;
use crate::{config, dom, listeners, shortcuts};

type BrowserStore = SettingsStore<BrowserCache, Rc<DocumentPresentation>>;

pub fn boot() {
    let config = config::load_from_static();
    let presentation = Rc::new(DocumentPresentation::from_document());
    let store = Rc::new(SettingsStore::new(
        BrowserCache::open(),
        Rc::clone(&presentation),
    ));
    let sync = Rc::new(Synchronizer::new(HttpRemote::new(config.endpoints.clone())));

    let local = sync.load_and_apply_local(&store);
    listeners::install_input_mode(presentation);
    let dispatcher = ShortcutDispatcher::from_store(&store, config.shortcuts.clone());
    shortcuts::install(dispatcher, config.dom.clone());

    let dom_config = config.dom;
    spawn_local(async move {
        let summary = sync.sync_remote(&store, local).await;
        if let SyncStatus::Reconciled(report) = &summary.status
            && !report.cache_failures.is_empty()
        {
            warn!("{} preferences applied but not cached", report.cache_failures.len());
        }
        mount_panel(&dom_config, store, sync, summary.local);
    });
    info!("prefsync started");
}

/// Render the preferences panel into its container, if the page has one.
fn mount_panel(
    dom_config: &DomConfig,
    store: Rc<BrowserStore>,
    sync: Rc<Synchronizer<HttpRemote>>,
    prefs: PreferenceSet,
) {
    let Some(root) =
        dom::document().and_then(|doc| doc.get_element_by_id(&dom_config.panel_container_id))
    else {
        debug!("no #{} on this page", dom_config.panel_container_id);
        return;
    };
    let on_change = Callback::from(move |pref: Preference| {
        let store = Rc::clone(&store);
        let sync = Rc::clone(&sync);
        spawn_local(async move {
            if let Err(err) = sync.push_update(&store, &pref).await {
                warn!("could not save {} ({}): {err}", pref.key(), err.kind());
            }
        });
    });
    Renderer::<PreferencesPanel>::with_root_and_props(root, PanelProps { prefs, on_change })
        .render();
}
