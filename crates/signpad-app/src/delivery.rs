//! Platform download sinks.

use signpad_core::{DownloadSink, ExportError, ExportFile, ExportResult};

/// Writes exports into a directory, named like the browser download would be.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: std::path::PathBuf,
    written: Vec<std::path::PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySink {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    pub fn written(&self) -> &[std::path::PathBuf] {
        &self.written
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file: &ExportFile) -> ExportResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ExportError::Delivery(e.to_string()))?;
        let path = self.dir.join(&file.name);
        std::fs::write(&path, &file.bytes).map_err(|e| ExportError::Delivery(e.to_string()))?;
        log::info!("Saved {} ({} bytes)", path.display(), file.bytes.len());
        self.written.push(path);
        Ok(())
    }
}

/// Triggers a browser download through a temporary object URL.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownload;

#[cfg(target_arch = "wasm32")]
impl DownloadSink for BrowserDownload {
    fn deliver(&mut self, file: &ExportFile) -> ExportResult<()> {
        download_binary_file(&file.name, &file.bytes, file.mime_type)
            .map_err(|e| ExportError::Delivery(format!("{:?}", e)))
    }
}

#[cfg(target_arch = "wasm32")]
fn download_binary_file(
    filename: &str,
    data: &[u8],
    mime_type: &str,
) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let uint8_array = js_sys::Uint8Array::from(data);
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&uint8_array);

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let a = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    a.set_href(&url);
    a.set_download(filename);
    a.click();

    web_sys::Url::revoke_object_url(&url).ok();
    Ok(())
}
