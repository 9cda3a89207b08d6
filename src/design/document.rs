//! Serializable form of a design, for persistence and sharing.
//!
//! The document is plain JSON (numbers, strings, nested objects/arrays).
//! Colors are hex strings. Loading a document re-applies every invariant,
//! so a hand-edited or older document can never produce an out-of-range
//! state.

use serde::{Deserialize, Serialize};

use super::DesignState;
use super::types::{BackgroundSpec, DeviceCanvas, MAX_CANVAS_SIDE, QrSpec};
use crate::error::{QrwallError, Result};

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

fn current_version() -> u32 {
    DOCUMENT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    pub device: DeviceCanvas,
    #[serde(default)]
    pub background: BackgroundSpec,
    #[serde(default)]
    pub qr: QrSpec,
}

impl DesignDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn to_serializable(state: &DesignState) -> DesignDocument {
    DesignDocument {
        version: DOCUMENT_VERSION,
        device: *state.device(),
        background: state.background().clone(),
        qr: state.qr().clone(),
    }
}

pub fn from_serializable(doc: DesignDocument) -> Result<DesignState> {
    if doc.version == 0 || doc.version > DOCUMENT_VERSION {
        return Err(QrwallError::Document(format!(
            "unsupported document version {} (expected 1..={})",
            doc.version, DOCUMENT_VERSION
        )));
    }
    // Clamping a huge canvas would silently change the design
    if !doc.device.fits() {
        return Err(QrwallError::Document(format!(
            "device canvas {}x{} exceeds the {}px side limit",
            doc.device.pixel_width, doc.device.pixel_height, MAX_CANVAS_SIDE
        )));
    }
    Ok(DesignState::new(doc.device, doc.background, doc.qr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::design::{BackgroundFill, GradientSpec, GradientStop, Percent2, QrPatch};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_json_shape() {
        let state = DesignState::default();
        let json = serde_json::to_value(to_serializable(&state)).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["device"]["pixel_width"], 1290);
        assert_eq!(json["background"]["fill"]["style"], "solid");
        assert_eq!(json["background"]["fill"]["color"], "#FFFFFF");
        assert_eq!(json["qr"]["style"]["primary_color"], "#000000");
    }

    #[test]
    fn test_restore_equals_original() {
        let mut state = DesignState::default();
        state.update_qr(QrPatch::position(0.3, 0.6));
        state.update_background(crate::design::BackgroundPatch::fill(BackgroundFill::Gradient {
            gradient: GradientSpec::radial(
                Percent2::new(0.2, 0.8),
                vec![
                    GradientStop::new(0.0, Rgba::rgb(10, 20, 30)),
                    GradientStop::new(1.0, Rgba::new(1, 2, 3, 4)),
                ],
            ),
        }));

        let text = to_serializable(&state).to_json_pretty().unwrap();
        let restored = from_serializable(DesignDocument::from_json(&text).unwrap()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_loading_reapplies_invariants() {
        let text = r##"{
            "device": { "pixel_width": 1000, "pixel_height": 1000 },
            "qr": {
                "payload_url": "https://example.com",
                "position_percent": { "x": 5.0, "y": -2.0 },
                "scale": 3.0,
                "rotation_degrees": 270.0,
                "style": {
                    "primary_color": "#000",
                    "secondary_color": "#fff",
                    "border_color": "#fff",
                    "border_size_ratio": 900,
                    "corner_radius_ratio": -3
                }
            }
        }"##;
        let state = from_serializable(DesignDocument::from_json(text).unwrap()).unwrap();
        // A 200% border triples the footprint
        assert!((state.qr().scale - 1.0 / 3.0).abs() < 1e-5);
        assert_eq!(state.qr().rotation_degrees, -90.0);
        assert_eq!(state.qr().position_percent, Percent2::CENTER);
        assert_eq!(state.qr().style.border_size_ratio, 200.0);
        assert_eq!(state.qr().style.corner_radius_ratio, 0.0);
    }

    #[test]
    fn test_future_version_rejected() {
        let mut doc = to_serializable(&DesignState::default());
        doc.version = 99;
        assert!(from_serializable(doc).is_err());
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let mut doc = to_serializable(&DesignState::default());
        doc.device.pixel_width = 4_000_000_000;
        assert!(matches!(from_serializable(doc), Err(QrwallError::Document(_))));

        let mut doc = to_serializable(&DesignState::default());
        doc.device.pixel_height = MAX_CANVAS_SIDE;
        assert_eq!(from_serializable(doc).unwrap().device().pixel_height, MAX_CANVAS_SIDE);
    }
}
