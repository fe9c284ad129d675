//! Tracks whether the user is navigating with a pointer or the keyboard, so
//! focus rings can be hidden for mouse users.

use crate::effects::Presentation;

pub const USING_MOUSE_CLASS: &str = "using-mouse";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputModeTracker {
    using_mouse: bool,
}

impl InputModeTracker {
    #[must_use]
    pub const fn using_mouse(&self) -> bool {
        self.using_mouse
    }

    pub fn pointer_down<P: Presentation + ?Sized>(&mut self, presentation: &P) {
        if !self.using_mouse {
            presentation.set_class(USING_MOUSE_CLASS, true);
            self.using_mouse = true;
        }
    }

    pub fn key_down<P: Presentation + ?Sized>(&mut self, key: &str, presentation: &P) {
        if key == "Tab" && self.using_mouse {
            presentation.set_class(USING_MOUSE_CLASS, false);
            self.using_mouse = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RecordingPresentation;

    #[test]
    fn pointer_then_tab_toggles_class_once_each() {
        let presentation = RecordingPresentation::default();
        let mut tracker = InputModeTracker::default();
        tracker.pointer_down(&presentation);
        tracker.pointer_down(&presentation);
        assert!(presentation.has_class(USING_MOUSE_CLASS));
        tracker.key_down("a", &presentation);
        assert!(tracker.using_mouse());
        tracker.key_down("Tab", &presentation);
        tracker.key_down("Tab", &presentation);
        assert!(!presentation.has_class(USING_MOUSE_CLASS));
        assert_eq!(presentation.call_count(), 2);
    }
}
