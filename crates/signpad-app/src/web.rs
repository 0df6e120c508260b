//! WebAssembly entry point and the JS-facing signature pad.

use crate::delivery::BrowserDownload;
use crate::session::SignatureSession;
use kurbo::{Point, Rect};
use signpad_core::{
    ConfigField, ExportProfile, PixelRatio, PointerEvent, PointerPhase, PRESET_COLORS,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Initialize logging for the WASM module.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {}", e).into());
    }

    log::info!("Starting Signpad (WASM)");
}

/// A signature page as seen from JavaScript.
///
/// The host forwards DOM pointer/touch events and form input, paints
/// `ink_rgba()` into its canvas and shows the notices passed to the export
/// callback.
#[wasm_bindgen]
pub struct SignaturePad {
    session: Rc<RefCell<SignatureSession>>,
}

#[wasm_bindgen]
impl SignaturePad {
    /// `profile` is `"signature"` or `"resize"`; `pixel_ratio` is
    /// `window.devicePixelRatio`.
    #[wasm_bindgen(constructor)]
    pub fn new(profile: &str, pixel_ratio: f64) -> Result<SignaturePad, JsValue> {
        let profile = ExportProfile::from_name(profile).unwrap_or_default();
        let session = SignatureSession::new(profile, PixelRatio::new(pixel_ratio))
            .map_err(|e| JsValue::from_str(&e.user_message()))?;
        Ok(Self {
            session: Rc::new(RefCell::new(session)),
        })
    }

    /// The canvas's bounding client rect.
    pub fn set_screen_rect(&self, x: f64, y: f64, width: f64, height: f64) {
        self.session
            .borrow_mut()
            .set_screen_rect(Rect::new(x, y, x + width, y + height));
    }

    pub fn set_pixel_ratio(&self, pixel_ratio: f64) -> bool {
        self.session
            .borrow_mut()
            .set_pixel_ratio(PixelRatio::new(pixel_ratio))
    }

    /// Forward a DOM event by its `type` (`mousedown`, `touchmove`...).
    ///
    /// For Pointer Events pass the event's `pointerType`, so touch and pen
    /// input can suppress scrolling. Returns whether the host should call
    /// `preventDefault()`.
    pub fn pointer_event(
        &self,
        event_type: &str,
        pointer_type: Option<String>,
        client_x: f64,
        client_y: f64,
    ) -> bool {
        let parsed = PointerPhase::from_dom_event(event_type, pointer_type.as_deref());
        let Some((phase, source)) = parsed else {
            log::debug!("Ignoring event type {}", event_type);
            return false;
        };
        let event = PointerEvent::new(phase, source, Point::new(client_x, client_y));
        self.session.borrow_mut().handle_pointer(event).prevent_default
    }

    // --- Settings, as typed in the form ---

    pub fn set_width(&self, raw: &str) -> bool {
        self.session
            .borrow_mut()
            .set_from_input(ConfigField::Width, raw)
    }

    pub fn set_height(&self, raw: &str) -> bool {
        self.session
            .borrow_mut()
            .set_from_input(ConfigField::Height, raw)
    }

    pub fn set_max_size_kb(&self, raw: &str) -> bool {
        self.session
            .borrow_mut()
            .set_from_input(ConfigField::MaxSizeKb, raw)
    }

    pub fn set_background_enabled(&self, enabled: bool) {
        self.session.borrow_mut().set_background_enabled(enabled);
    }

    pub fn set_background_color(&self, color: &str) -> bool {
        self.session.borrow_mut().set_background_color(color)
    }

    pub fn set_format(&self, name: &str) -> bool {
        self.session.borrow_mut().set_format_name(name)
    }

    /// `[[name, value], ...]` swatches for the background picker.
    pub fn preset_colors() -> js_sys::Array {
        PRESET_COLORS
            .iter()
            .map(|preset| {
                let pair = js_sys::Array::new();
                pair.push(&JsValue::from_str(preset.name));
                pair.push(&JsValue::from_str(preset.value));
                JsValue::from(pair)
            })
            .collect()
    }

    // --- Sources ---

    /// Use an uploaded file as the export source.
    pub fn upload(&self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .upload(bytes)
            .map_err(|notice| JsValue::from_str(&notice.message))
    }

    pub fn clear_upload(&self) {
        self.session.borrow_mut().clear_upload();
    }

    pub fn clear(&self) {
        self.session.borrow_mut().clear_drawing();
    }

    // --- Pixels for the host canvas ---

    pub fn buffer_width(&self) -> u32 {
        self.session.borrow().surface().raster().width()
    }

    pub fn buffer_height(&self) -> u32 {
        self.session.borrow().surface().raster().height()
    }

    /// The ink buffer as straight RGBA, for `putImageData`.
    pub fn ink_rgba(&self) -> Vec<u8> {
        self.session.borrow().surface().raster().to_straight_rgba()
    }

    pub fn upload_width(&self) -> Option<u32> {
        self.session.borrow().uploaded().map(|upload| upload.width())
    }

    pub fn upload_height(&self) -> Option<u32> {
        self.session.borrow().uploaded().map(|upload| upload.height())
    }

    /// Background-removal preview of the upload at its native size.
    pub fn preview_rgba(&self) -> Option<Vec<u8>> {
        self.session
            .borrow()
            .removal_preview()
            .map(|preview| preview.to_straight_rgba())
    }

    // --- Export ---

    /// Whether an export is still encoding.
    pub fn busy(&self) -> bool {
        self.session.borrow().busy()
    }

    /// Export once. `on_done(level, message)` is called when it settles.
    ///
    /// The output is composited now; encoding and download finish later
    /// without holding the session.
    pub fn export(&self, on_done: js_sys::Function) {
        let pending = self.session.borrow().start_export();

        wasm_bindgen_futures::spawn_local(async move {
            let notice = pending.finish(&mut BrowserDownload).await;
            let level = JsValue::from_str(notice.level.as_str());
            let message = JsValue::from_str(&notice.message);
            if let Err(e) = on_done.call2(&JsValue::NULL, &level, &message) {
                log::error!("Export callback failed: {:?}", e);
            }
        });
    }
}
