//! The preference synchronizer: apply cached values, fetch the authoritative
//! set, apply only the deltas and write them back.

use log::{debug, info, warn};
use serde::Serialize;

use crate::effects::Presentation;
use crate::error::{CacheError, SyncError};
use crate::keys::PreferenceKey;
use crate::preference::{Preference, PreferenceSet};
use crate::remote::{
    FetchOutcome, RemoteSource, UpdateBody, parse_settings_response, parse_update_reply,
};
use crate::store::{LocalCache, SettingsStore};

/// What one `reconcile` pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Keys whose remote value differed and was applied and cached.
    pub changed: Vec<PreferenceKey>,
    /// Keys the remote confirmed unchanged.
    pub unchanged: Vec<PreferenceKey>,
    #[serde(skip)]
    pub cache_failures: Vec<CacheError>,
}

/// How the page-load sequence ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Reconciled(ReconcileReport),
    Failed(SyncError),
}

/// Result of [`Synchronizer::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    /// Last known value for every key.
    pub local: PreferenceSet,
    pub status: SyncStatus,
}

/// Drives the page-load synchronization against one remote source.
#[derive(Debug, Clone)]
pub struct Synchronizer<R> {
    remote: R,
}

impl<R: RemoteSource> Synchronizer<R> {
    pub const fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Read the cache and apply every preference before any network I/O.
    pub fn load_and_apply_local<C, P>(&self, store: &SettingsStore<C, P>) -> PreferenceSet
    where
        C: LocalCache,
        P: Presentation,
    {
        let read = store.read_local();
        for preference in read.prefs.iter() {
            store.apply(&preference);
        }
        debug!("applied {} cached preferences", read.prefs.len());
        read.prefs
    }

    /// Issue the single remote request. Failures are returned as a tag, never raised.
    pub async fn fetch_remote(&self) -> FetchOutcome {
        let body = match self.remote.fetch_settings().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::Failure(err),
        };
        match parse_settings_response(&body) {
            Ok(settings) => {
                for failure in &settings.skipped {
                    warn!("skipping remote preference: {failure}");
                }
                FetchOutcome::Success(settings)
            }
            Err(err) => FetchOutcome::Failure(err),
        }
    }

    /// Apply and cache every remote value that differs from `local`.
    ///
    /// Keys absent from `remote` are left alone. `local` is updated in place,
    /// so reconciling the same `remote` again applies nothing.
    pub fn reconcile<C, P>(
        &self,
        store: &SettingsStore<C, P>,
        local: &mut PreferenceSet,
        remote: &PreferenceSet,
    ) -> ReconcileReport
    where
        C: LocalCache,
        P: Presentation,
    {
        let mut report = ReconcileReport::default();
        for preference in remote.iter() {
            let key = preference.key();
            if local.get(key) == Some(preference.value()) {
                report.unchanged.push(key);
                continue;
            }
            store.apply(&preference);
            if let Err(err) = store.persist(&preference) {
                warn!("could not cache {key}: {err}");
                report.cache_failures.push(err);
            }
            local.insert(preference);
            report.changed.push(key);
        }
        report
    }

    /// The full page-load sequence. Never panics on remote failure; the
    /// locally applied state stays in place.
    pub async fn run<C, P>(&self, store: &SettingsStore<C, P>) -> SyncSummary
    where
        C: LocalCache,
        P: Presentation,
    {
        let local = self.load_and_apply_local(store);
        self.sync_remote(store, local).await
    }

    /// The asynchronous half of [`run`](Self::run): fetch, then reconcile
    /// against the already-applied `local` set.
    pub async fn sync_remote<C, P>(
        &self,
        store: &SettingsStore<C, P>,
        mut local: PreferenceSet,
    ) -> SyncSummary
    where
        C: LocalCache,
        P: Presentation,
    {
        let status = match self.fetch_remote().await {
            FetchOutcome::Success(settings) => {
                let report = self.reconcile(store, &mut local, &settings.prefs);
                info!(
                    "preferences reconciled: {} changed, {} unchanged",
                    report.changed.len(),
                    report.unchanged.len()
                );
                SyncStatus::Reconciled(report)
            }
            FetchOutcome::Failure(err) => {
                warn!("keeping cached preferences, remote sync failed ({}): {err}", err.kind());
                SyncStatus::Failed(err)
            }
        };
        SyncSummary { local, status }
    }

    /// Apply and cache a user-chosen preference, then send it to the server.
    ///
    /// The local change stays in effect whatever the server answers.
    ///
    /// # Errors
    ///
    /// Returns the transport, parse or rejection error from the update request.
    pub async fn push_update<C, P>(
        &self,
        store: &SettingsStore<C, P>,
        preference: &Preference,
    ) -> Result<(), SyncError>
    where
        C: LocalCache,
        P: Presentation,
    {
        store.apply(preference);
        if let Err(err) = store.persist(preference) {
            warn!("could not cache {}: {err}", preference.key());
        }
        let body = serde_json::to_string(&UpdateBody::for_preference(preference))
            .map_err(|err| SyncError::Parse(err.to_string()))?;
        let reply = self.remote.send_update(body).await?;
        parse_update_reply(&reply)
    }
}
