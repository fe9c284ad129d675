//! Browser host for the keyboard shortcut dispatcher.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use prefsync_core::{DomConfig, HelperEntry, KeyInput, PageHost, ShortcutDispatcher};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, KeyboardEvent};
use yew::{AppHandle, Callback, Renderer};

use crate::components::ShortcutHelper;
use crate::components::shortcut_helper::Props as HelperProps;
use crate::dom;
use crate::listeners;

/// Extract the fields the dispatcher matches on.
#[must_use]
pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        alt: event.alt_key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
    }
}

/// [`PageHost`] over the live document.
pub struct BrowserPage {
    dom: DomConfig,
    entries: Vec<HelperEntry>,
    on_helper_close: Callback<()>,
    helper: RefCell<Option<AppHandle<ShortcutHelper>>>,
}

impl BrowserPage {
    #[must_use]
    pub const fn new(
        dom_config: DomConfig,
        entries: Vec<HelperEntry>,
        on_helper_close: Callback<()>,
    ) -> Self {
        Self {
            dom: dom_config,
            entries,
            on_helper_close,
            helper: RefCell::new(None),
        }
    }

    fn helper_root(&self) -> Option<Element> {
        let doc = dom::document()?;
        if let Some(existing) = doc.get_element_by_id(&self.dom.helper_container_id) {
            return Some(existing);
        }
        let root = doc.create_element("div").ok()?;
        root.set_id(&self.dom.helper_container_id);
        doc.body()?.append_child(&root).ok()?;
        Some(root)
    }
}

impl PageHost for BrowserPage {
    fn navigate(&self, path: &str) {
        let Some(win) = dom::window() else {
            return;
        };
        if let Err(err) = win.location().set_href(path) {
            warn!("navigation to {path} failed: {}", dom::js_error_message(&err));
        }
    }

    fn focus_search(&self) -> bool {
        dom::query_html(&self.dom.search_selector).is_some_and(|input| input.focus().is_ok())
    }

    fn close_modal(&self) -> bool {
        dom::query_html(&self.dom.modal_close_selector)
            .map(|button| button.click())
            .is_some()
    }

    fn show_helper(&self) {
        let mut helper = self.helper.borrow_mut();
        if helper.is_some() {
            return;
        }
        let Some(root) = self.helper_root() else {
            warn!("no document to show the shortcut helper in");
            return;
        };
        let props = HelperProps {
            entries: self.entries.clone(),
            on_close: self.on_helper_close.clone(),
        };
        *helper = Some(Renderer::<ShortcutHelper>::with_root_and_props(root, props).render());
    }

    fn hide_helper(&self) {
        if let Some(handle) = self.helper.borrow_mut().take() {
            handle.destroy();
        }
        if let Some(root) = dom::document()
            .and_then(|doc| doc.get_element_by_id(&self.dom.helper_container_id))
        {
            root.remove();
        }
    }
}

/// The dispatcher together with the page it drives.
pub struct ShortcutController {
    dispatcher: RefCell<ShortcutDispatcher>,
    page: BrowserPage,
}

impl ShortcutController {
    #[must_use]
    pub fn new(dispatcher: ShortcutDispatcher, dom_config: DomConfig) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            // The helper's close button fires inside its own render tree, so
            // tearing it down waits for the next tick.
            let on_close = Callback::from(move |()| {
                let weak = weak.clone();
                spawn_local(async move {
                    if let Some(controller) = weak.upgrade() {
                        controller.dismiss();
                    }
                });
            });
            let entries = dispatcher.helper_entries();
            Self {
                dispatcher: RefCell::new(dispatcher),
                page: BrowserPage::new(dom_config, entries, on_close),
            }
        })
    }

    pub fn on_keydown(&self, event: &KeyboardEvent) {
        let input = key_input(event);
        let disposition = self.dispatcher.borrow_mut().handle(&input, &self.page);
        if disposition.prevents_default() {
            event.prevent_default();
        }
    }

    pub fn dismiss(&self) {
        self.dispatcher.borrow_mut().dismiss_helper(&self.page);
    }
}

/// Listen for shortcuts on the document. Nothing is installed when the
/// dispatcher is disabled.
/// The listener owns the controller for the rest of the page.
pub fn install(dispatcher: ShortcutDispatcher, dom_config: DomConfig) {
    if !dispatcher.is_enabled() {
        debug!("keyboard shortcuts disabled");
        return;
    }
    let Some(doc) = dom::document() else {
        warn!("no document to listen for shortcuts on");
        return;
    };
    let controller = ShortcutController::new(dispatcher, dom_config);
    listeners::listen(doc.as_ref(), "keydown", move |e: KeyboardEvent| {
        controller.on_keydown(&e);
    });
    debug!("keyboard shortcuts installed");
}
