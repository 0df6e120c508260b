//! Signpad Application
//!
//! Session state tying a capture surface, an optional upload and export
//! settings together, plus the platform shells: a draw-script runner for
//! native builds and a `wasm-bindgen` pad for the browser.

mod delivery;
mod session;

#[cfg(not(target_arch = "wasm32"))]
mod script;

#[cfg(not(target_arch = "wasm32"))]
pub use delivery::DirectorySink;
#[cfg(target_arch = "wasm32")]
pub use delivery::BrowserDownload;
#[cfg(not(target_arch = "wasm32"))]
pub use script::{DrawScript, ScriptError};
pub use session::{Notice, NoticeLevel, PendingExport, SignatureSession};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{run_wasm, SignaturePad};
