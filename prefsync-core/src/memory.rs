//! In-memory collaborators for headless hosts (the tester, unit tests).

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;

use crate::effects::Presentation;
use crate::error::{CacheError, SyncError};
use crate::remote::RemoteSource;
use crate::shortcuts::PageHost;
use crate::store::LocalCache;

/// String map standing in for browser `localStorage`. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryCache {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let cache = Self::default();
        cache.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        cache
    }

    /// Make every subsequent write fail, as a full or blocked store would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if self.fail_writes.get() {
            return Err(CacheError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One presentation mutation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationCall {
    Class { name: String, enabled: bool },
    StyleVar { name: String, value: String },
}

/// Presentation that records its class set, style variables and every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    classes: Rc<RefCell<BTreeSet<String>>>,
    vars: Rc<RefCell<BTreeMap<String, String>>>,
    calls: Rc<RefCell<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.borrow().contains(name)
    }

    #[must_use]
    pub fn classes(&self) -> BTreeSet<String> {
        self.classes.borrow().clone()
    }

    #[must_use]
    pub fn style_var(&self, name: &str) -> Option<String> {
        self.vars.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn style_vars(&self) -> BTreeMap<String, String> {
        self.vars.borrow().clone()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Presentation for RecordingPresentation {
    fn set_class(&self, class: &str, enabled: bool) {
        if enabled {
            self.classes.borrow_mut().insert(class.to_string());
        } else {
            self.classes.borrow_mut().remove(class);
        }
        self.calls.borrow_mut().push(PresentationCall::Class {
            name: class.to_string(),
            enabled,
        });
    }

    fn set_style_var(&self, name: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self.calls.borrow_mut().push(PresentationCall::StyleVar {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
}

/// Remote source that answers from queued canned responses.
///
/// An empty queue answers with a transport failure.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRemote {
    fetches: Rc<RefCell<VecDeque<Result<String, SyncError>>>>,
    updates: Rc<RefCell<VecDeque<Result<String, SyncError>>>>,
    sent: Rc<RefCell<Vec<String>>>,
    fetch_count: Rc<Cell<usize>>,
}

impl ScriptedRemote {
    /// Queue one response body for the next fetch.
    #[must_use]
    pub fn respond(self, body: impl Into<String>) -> Self {
        self.fetches.borrow_mut().push_back(Ok(body.into()));
        self
    }

    /// Queue one failure for the next fetch.
    #[must_use]
    pub fn fail(self, err: SyncError) -> Self {
        self.fetches.borrow_mut().push_back(Err(err));
        self
    }

    /// Queue one reply for the next update.
    #[must_use]
    pub fn reply_to_update(self, reply: Result<String, SyncError>) -> Self {
        self.updates.borrow_mut().push_back(reply);
        self
    }

    /// Bodies sent to the update endpoint, oldest first.
    #[must_use]
    pub fn sent_updates(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }
}

#[async_trait(?Send)]
impl RemoteSource for ScriptedRemote {
    async fn fetch_settings(&self) -> Result<String, SyncError> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        self.fetches
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Transport("no scripted response".into())))
    }

    async fn send_update(&self, body: String) -> Result<String, SyncError> {
        self.sent.borrow_mut().push(body);
        self.updates
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(r#"{"success": true}"#.to_string()))
    }
}

/// What a [`RecordingPage`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Navigate(String),
    FocusSearch,
    CloseModal,
    ShowHelper,
    HideHelper,
}

/// Page host that records requests; search input and modal presence are configurable.
#[derive(Debug, Clone, Default)]
pub struct RecordingPage {
    has_search: Cell<bool>,
    has_open_modal: Cell<bool>,
    calls: RefCell<Vec<PageCall>>,
}

impl RecordingPage {
    #[must_use]
    pub fn with_search(self) -> Self {
        self.has_search.set(true);
        self
    }

    #[must_use]
    pub fn with_open_modal(self) -> Self {
        self.has_open_modal.set(true);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.borrow().clone()
    }
}

impl PageHost for RecordingPage {
    fn navigate(&self, path: &str) {
        self.calls
            .borrow_mut()
            .push(PageCall::Navigate(path.to_string()));
    }

    fn focus_search(&self) -> bool {
        if self.has_search.get() {
            self.calls.borrow_mut().push(PageCall::FocusSearch);
        }
        self.has_search.get()
    }

    fn close_modal(&self) -> bool {
        if self.has_open_modal.get() {
            self.calls.borrow_mut().push(PageCall::CloseModal);
            self.has_open_modal.set(false);
            return true;
        }
        false
    }

    fn show_helper(&self) {
        self.calls.borrow_mut().push(PageCall::ShowHelper);
    }

    fn hide_helper(&self) {
        self.calls.borrow_mut().push(PageCall::HideHelper);
    }
}
