//! DOM presentation: classes on `<body>`, style variables on `<html>`.

use log::warn;
use prefsync_core::Presentation;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::dom;

/// Presentation over the current document.
///
/// Roots are looked up on every mutation, so a `<body>` that is parsed or
/// replaced after construction still receives classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentPresentation;

impl DocumentPresentation {
    #[must_use]
    pub const fn from_document() -> Self {
        Self
    }

    fn class_root() -> Option<HtmlElement> {
        dom::document()?.body()
    }

    fn style_root() -> Option<HtmlElement> {
        dom::document()?
            .document_element()?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl Presentation for DocumentPresentation {
    fn set_class(&self, class: &str, enabled: bool) {
        let Some(root) = Self::class_root() else {
            warn!("no <body> yet, dropping class {class}={enabled}");
            return;
        };
        let result = if enabled {
            root.class_list().add_1(class)
        } else {
            root.class_list().remove_1(class)
        };
        if let Err(err) = result {
            warn!("could not set class {class}: {}", dom::js_error_message(&err));
        }
    }

    fn set_style_var(&self, name: &str, value: &str) {
        let Some(root) = Self::style_root() else {
            warn!("no document element, dropping {name}={value}");
            return;
        };
        if let Err(err) = root.style().set_property(name, value) {
            warn!("could not set {name}: {}", dom::js_error_message(&err));
        }
    }
}
