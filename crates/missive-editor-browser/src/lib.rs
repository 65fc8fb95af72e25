//! Browser DOM layer for the missive composer.
//!
//! This crate binds the platform-independent history engine to a live
//! contenteditable element. It assumes a `wasm32-unknown-unknown` target
//! environment.
//!
//! # Architecture
//!
//! - `surface`: [`ContentEditableSurface`], the Selection API caret locator
//! - `events`: keydown → [`KeyCombo`](missive_editor_core::KeyCombo), and the
//!   shortcut listener
//!
//! # Re-exports
//!
//! This crate re-exports `missive-editor-core` for convenience, so consumers
//! only need to depend on `missive-editor-browser`.

// Re-export core crate
pub use missive_editor_core;
pub use missive_editor_core::*;

pub mod events;
pub mod surface;

pub use events::{attach_history_shortcuts, key_combo_from_event, parse_browser_key};
pub use surface::ContentEditableSurface;

/// Install a console subscriber for the composer's traces.
///
/// Call once at startup. Later calls are ignored.
#[cfg(feature = "console-log")]
pub fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let filter = EnvFilter::new("info,missive=debug");
    let reg = Registry::default().with(filter).with(wasm_layer);

    let _ = set_global_default(reg);
}
