//! JSON draw scripts for the native binary.
//!
//! A script describes one signature page: the profile, optional settings, an
//! optional image to upload and the strokes to replay as mouse input.
//!
//! ```json
//! {
//!   "pixel_ratio": 2.0,
//!   "config": { "profile": "resize", "width": 400, "format": "JPEG", "background_enabled": true },
//!   "strokes": [[[10, 40], [60, 20], [120, 70]]]
//! }
//! ```

use crate::session::SignatureSession;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use signpad_core::{
    ExportConfig, ExportError, ExportProfile, PixelRatio, PointerEvent, PointerPhase,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or applying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Upload {}: {message}", path.display())]
    Upload { path: PathBuf, message: String },
    #[error(transparent)]
    Export(#[from] ExportError),
}

fn default_pixel_ratio() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawScript {
    #[serde(default)]
    pub profile: ExportProfile,
    /// Full settings, used instead of `profile`'s defaults.
    #[serde(default)]
    pub config: Option<ExportConfig>,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    /// Image to upload, relative to the script's directory.
    #[serde(default)]
    pub upload: Option<PathBuf>,
    /// Each stroke is a list of `[x, y]` client coordinates.
    #[serde(default)]
    pub strokes: Vec<Vec<[f64; 2]>>,
}

impl DrawScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// A `config` block replaces the profile defaults entirely, including its
    /// own `profile` field.
    fn initial_config(&self) -> ExportConfig {
        match &self.config {
            Some(config) => config.validated(),
            None => ExportConfig::for_profile(self.profile),
        }
    }

    /// Build a session and replay the script into it.
    ///
    /// `base_dir` resolves a relative upload path.
    pub fn build_session(&self, base_dir: &Path) -> Result<SignatureSession, ScriptError> {
        let pixel_ratio = PixelRatio::new(self.pixel_ratio);
        let mut session = SignatureSession::with_config(self.initial_config(), pixel_ratio)?;

        if let Some(upload) = &self.upload {
            let path = base_dir.join(upload);
            let bytes = std::fs::read(&path)?;
            session.upload(&bytes).map_err(|notice| ScriptError::Upload {
                path,
                message: notice.message,
            })?;
        }

        self.replay(&mut session);
        Ok(session)
    }

    /// Replay every stroke as mouse down, moves and up.
    pub fn replay(&self, session: &mut SignatureSession) {
        for stroke in &self.strokes {
            let mut points = stroke.iter().map(|&[x, y]| Point::new(x, y));
            let Some(first) = points.next() else {
                continue;
            };
            session.handle_pointer(PointerEvent::mouse(PointerPhase::Down, first));
            let mut last = first;
            for point in points {
                session.handle_pointer(PointerEvent::mouse(PointerPhase::Move, point));
                last = point;
            }
            session.handle_pointer(PointerEvent::mouse(PointerPhase::Up, last));
        }
        log::debug!("Replayed {} strokes", self.strokes.len());
    }
}
