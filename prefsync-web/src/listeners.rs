//! Document-level event listeners that live for the whole page.

use std::cell::Cell;
use std::rc::Rc;

use log::warn;
use prefsync_core::{InputModeTracker, Presentation};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, KeyboardEvent};

use crate::dom;

/// Attach `handler` for `event` on `target`, typed to the concrete event.
///
/// The closure is leaked: page-lifetime listeners are never removed.
pub fn listen<E, F>(target: &EventTarget, event: &str, mut handler: F)
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(move |raw: Event| {
        if let Ok(typed) = raw.dyn_into::<E>() {
            handler(typed);
        }
    });
    if let Err(err) =
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        warn!(
            "could not listen for {event}: {}",
            dom::js_error_message(&err)
        );
    }
    closure.forget();
}

/// Run `start` once the document has parsed its `<body>`.
///
/// Scripts loaded from `<head>` see `readyState == "loading"`; those wait for
/// a single `DOMContentLoaded`. Otherwise `start` runs immediately.
pub fn when_ready<F>(start: F)
where
    F: FnOnce() + 'static,
{
    let Some(doc) = dom::document() else {
        warn!("no document, prefsync not started");
        return;
    };
    if doc.ready_state() != "loading" {
        start();
        return;
    }
    let handler = Closure::once_into_js(start);
    if let Err(err) =
        doc.add_event_listener_with_callback("DOMContentLoaded", handler.unchecked_ref())
    {
        warn!(
            "could not wait for DOMContentLoaded: {}",
            dom::js_error_message(&err)
        );
    }
}

/// Toggle the `using-mouse` class on pointer and Tab input.
pub fn install_input_mode<P>(presentation: Rc<P>)
where
    P: Presentation + 'static,
{
    let Some(doc) = dom::document() else {
        return;
    };
    let target: &EventTarget = doc.as_ref();
    let tracker = Rc::new(Cell::new(InputModeTracker::default()));

    {
        let tracker = Rc::clone(&tracker);
        let presentation = Rc::clone(&presentation);
        listen(target, "mousedown", move |_: Event| {
            let mut state = tracker.get();
            state.pointer_down(&*presentation);
            tracker.set(state);
        });
    }
    listen(target, "keydown", move |e: KeyboardEvent| {
        let mut state = tracker.get();
        state.key_down(&e.key(), &*presentation);
        tracker.set(state);
    });
}
