//! Keyboard event handling.
//!
//! Converts DOM keyboard events into core [`KeyCombo`]s and wires a
//! [`HistoryController`] up to `keydown`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use missive_editor_core::{EditorSurface, HistoryController, Key, KeyCombo, KeydownResult, Modifiers};
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, KeyboardEvent};

/// Parse a `KeyboardEvent.key` value.
pub fn parse_browser_key(s: &str) -> Key {
    match s {
        " " => Key::Space,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Enter" => Key::Enter,

        "ArrowLeft" => Key::ArrowLeft,
        "ArrowRight" => Key::ArrowRight,
        "ArrowUp" => Key::ArrowUp,
        "ArrowDown" => Key::ArrowDown,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,

        "Alt" => Key::Alt,
        "Control" => Key::Control,
        "Meta" => Key::Meta,
        "Shift" => Key::Shift,

        "Cut" => Key::Cut,
        "Paste" => Key::Paste,
        "Undo" => Key::Undo,
        "Redo" => Key::Redo,

        "" | "Unidentified" => Key::Unidentified,
        other if other.chars().count() == 1 => Key::character(other),
        _ => Key::Unidentified,
    }
}

pub fn key_combo_from_event(event: &KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        parse_browser_key(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// Route `keydown` on `target` (usually the document) through `controller`.
///
/// Handled shortcuts prevent the browser default, and the restored caret is
/// applied right after the synchronous content swap. Dropping the returned
/// listener detaches it.
pub fn attach_history_shortcuts<S>(
    target: &EventTarget,
    controller: Rc<RefCell<HistoryController<S>>>,
) -> EventListener
where
    S: EditorSurface + 'static,
{
    let options = EventListenerOptions::enable_prevent_default();
    EventListener::new_with_options(target, "keydown", options, move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if event.is_composing() {
            return;
        }

        let combo = key_combo_from_event(event);
        let Ok(mut controller) = controller.try_borrow_mut() else {
            tracing::warn!(target: "missive::history", "history controller busy, dropping keydown");
            return;
        };

        let outcome = controller.handle_keydown(&combo);
        if outcome.result == KeydownResult::Handled {
            event.prevent_default();
        }
        if let Some(pending) = outcome.pending {
            controller.apply_pending(pending);
        }
    })
}
