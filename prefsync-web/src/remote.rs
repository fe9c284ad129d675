//! `fetch`-backed remote source.

use async_trait::async_trait;
use prefsync_core::{Endpoints, RemoteSource, SyncError};

use crate::dom;

#[derive(Debug, Clone)]
pub struct HttpRemote {
    endpoints: Endpoints,
}

impl HttpRemote {
    pub const fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait(?Send)]
impl RemoteSource for HttpRemote {
    async fn fetch_settings(&self) -> Result<String, SyncError> {
        dom::fetch_text("GET", &self.endpoints.fetch, None)
            .await
            .map_err(|err| SyncError::Transport(dom::js_error_message(&err)))
    }

    async fn send_update(&self, body: String) -> Result<String, SyncError> {
        dom::fetch_text("POST", &self.endpoints.update, Some(&body))
            .await
            .map_err(|err| SyncError::Transport(dom::js_error_message(&err)))
    }
}
