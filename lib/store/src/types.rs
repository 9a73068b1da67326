//! Persisted document types for the label designer.
//!
//! Wire names are camelCase where they differ from the field name. The
//! canvas editor owns its object shapes; persistence treats them as opaque
//! JSON values.

use serde::{Deserialize, Serialize};

use crate::schema::{Document, SchemaIssue, join_path};

/// Direction the label leaves the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintDirection {
    Top,
    Left,
}

/// Physical label dimensions in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSize {
    pub width: f64,
    pub height: f64,
}

impl LabelSize {
    fn check_into(&self, issues: &mut Vec<SchemaIssue>) {
        if !(self.width.is_finite() && self.width > 0.0) {
            issues.push(SchemaIssue::new("size.width", "must be a positive number"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            issues.push(SchemaIssue::new("size.height", "must be a positive number"));
        }
    }
}

/// Properties of the label being designed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelProps {
    pub size: LabelSize,
    #[serde(rename = "printDirection")]
    pub print_direction: PrintDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

impl Document for LabelProps {
    fn kind() -> &'static str {
        "label_props"
    }

    fn check(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        self.size.check_into(&mut issues);
        issues
    }
}

/// Serialized canvas document, as produced by the canvas editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasJson {
    pub version: String,
    pub objects: Vec<serde_json::Value>,
}

impl Document for CanvasJson {
    fn kind() -> &'static str {
        "canvas_json"
    }

    fn check(&self) -> Vec<SchemaIssue> {
        if self.version.is_empty() {
            vec![SchemaIssue::new("version", "must not be empty")]
        } else {
            Vec::new()
        }
    }
}

/// One saved label: design properties plus the canvas document.
///
/// `id` is the storage key the template was loaded from. It is never part of
/// the persisted value — it is attached on load and always equals the owning
/// key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTemplate {
    pub label: LabelProps,
    pub canvas: CanvasJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip)]
    pub id: Option<String>,
}

impl Document for LabelTemplate {
    fn kind() -> &'static str {
        "label_template"
    }

    fn check(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        for issue in self.label.check() {
            issues.push(SchemaIssue::new(join_path("label", &issue.path), issue.message));
        }
        for issue in self.canvas.check() {
            issues.push(SchemaIssue::new(join_path("canvas", &issue.path), issue.message));
        }
        if let Some(ts) = self.timestamp {
            if ts < 0 {
                issues.push(SchemaIssue::new("timestamp", "must not be negative"));
            }
        }
        issues
    }
}

/// A quick-pick label size preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPreset {
    pub width: f64,
    pub height: f64,
    pub dpmm: f64,
    pub unit: String,
}

impl Document for LabelPreset {
    fn kind() -> &'static str {
        "label_preset"
    }

    fn check(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        if !(self.width.is_finite() && self.width > 0.0) {
            issues.push(SchemaIssue::new("width", "must be a positive number"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            issues.push(SchemaIssue::new("height", "must be a positive number"));
        }
        if !(self.dpmm.is_finite() && self.dpmm > 0.0) {
            issues.push(SchemaIssue::new("dpmm", "must be a positive number"));
        }
        issues
    }
}

/// Print-preview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewProps {
    pub zoom: f64,
    #[serde(rename = "showGrid")]
    pub show_grid: bool,
}

impl Document for PreviewProps {
    fn kind() -> &'static str {
        "preview_props"
    }

    fn check(&self) -> Vec<SchemaIssue> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            vec![SchemaIssue::new("zoom", "must be a positive number")]
        } else {
            Vec::new()
        }
    }
}

/// Automation settings: what happens without the user clicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationProps {
    #[serde(rename = "connectOnStart")]
    pub connect_on_start: bool,
    #[serde(rename = "printOnOpen", default, skip_serializing_if = "Option::is_none")]
    pub print_on_open: Option<String>,
}

impl Document for AutomationProps {
    fn kind() -> &'static str {
        "automation_props"
    }
}

/// A device label profile, as read from an RFID paper-roll tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfidProfile {
    pub name: String,
    #[serde(rename = "widthMm")]
    pub width_mm: f64,
    #[serde(rename = "heightMm")]
    pub height_mm: f64,
    #[serde(rename = "paperType", default, skip_serializing_if = "Option::is_none")]
    pub paper_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<u8>,
}

impl Document for RfidProfile {
    fn kind() -> &'static str {
        "rfid_profile"
    }

    fn check(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        if self.name.is_empty() {
            issues.push(SchemaIssue::new("name", "must not be empty"));
        }
        if !(self.width_mm.is_finite() && self.width_mm > 0.0) {
            issues.push(SchemaIssue::new("widthMm", "must be a positive number"));
        }
        if !(self.height_mm.is_finite() && self.height_mm > 0.0) {
            issues.push(SchemaIssue::new("heightMm", "must be a positive number"));
        }
        issues
    }
}

/// Transport used to reach the printer.
///
/// Persisted as the raw transport name, not as a JSON document; anything
/// outside the known set reads as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Bluetooth,
    Serial,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Bluetooth => "bluetooth",
            ConnectionType::Serial => "serial",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bluetooth" => Some(ConnectionType::Bluetooth),
            "serial" => Some(ConnectionType::Serial),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Document;

    fn label_props() -> LabelProps {
        LabelProps {
            size: LabelSize {
                width: 40.0,
                height: 12.0,
            },
            print_direction: PrintDirection::Left,
            shape: None,
        }
    }

    fn canvas_json() -> CanvasJson {
        CanvasJson {
            version: "6.0.0".into(),
            objects: vec![serde_json::json!({"type": "textbox", "text": "hello"})],
        }
    }

    #[test]
    fn label_props_wire_names() {
        let json = serde_json::to_value(label_props()).unwrap();
        assert_eq!(json["printDirection"], "left");
        assert_eq!(json["size"]["width"], 40.0);
        assert!(json.get("shape").is_none());
    }

    #[test]
    fn label_props_round_trip() {
        let props = label_props();
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(LabelProps::validate(json).unwrap(), props);
    }

    #[test]
    fn label_props_rejects_zero_width() {
        let mut props = label_props();
        props.size.width = 0.0;
        let err = props.checked().unwrap_err();
        assert_eq!(err.issues[0].path, "size.width");
    }

    #[test]
    fn template_id_is_not_persisted() {
        let template = LabelTemplate {
            label: label_props(),
            canvas: canvas_json(),
            timestamp: Some(1700000000),
            id: Some("saved_label_1700000000_0".into()),
        };
        let json = serde_json::to_value(&template).unwrap();
        assert!(json.get("id").is_none());

        let loaded = LabelTemplate::validate(json).unwrap();
        assert!(loaded.id.is_none());
    }

    #[test]
    fn template_check_prefixes_nested_paths() {
        let mut template = LabelTemplate {
            label: label_props(),
            canvas: canvas_json(),
            timestamp: Some(-1),
            id: None,
        };
        template.label.size.height = -3.0;
        template.canvas.version = String::new();

        let issues = template.check();
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["label.size.height", "canvas.version", "timestamp"]);
    }

    #[test]
    fn template_without_timestamp_is_valid() {
        let template = LabelTemplate {
            label: label_props(),
            canvas: canvas_json(),
            timestamp: None,
            id: None,
        };
        assert!(template.checked().is_ok());
        let json = serde_json::to_value(&template).unwrap();
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn preset_validation() {
        let preset = LabelPreset {
            width: 40.0,
            height: 12.0,
            dpmm: 8.0,
            unit: "mm".into(),
        };
        assert!(preset.checked().is_ok());

        let bad = LabelPreset { dpmm: 0.0, ..preset };
        assert_eq!(bad.checked().unwrap_err().issues[0].path, "dpmm");
    }

    #[test]
    fn rfid_profile_requires_name() {
        let profile = RfidProfile {
            name: String::new(),
            width_mm: 30.0,
            height_mm: 20.0,
            paper_type: None,
            density: Some(3),
        };
        let err = profile.checked().unwrap_err();
        assert_eq!(err.issues[0].path, "name");
    }

    #[test]
    fn connection_type_raw_strings() {
        assert_eq!(ConnectionType::Bluetooth.as_str(), "bluetooth");
        assert_eq!(ConnectionType::parse("serial"), Some(ConnectionType::Serial));
        assert_eq!(ConnectionType::parse("usb"), None);
        assert_eq!(ConnectionType::parse("Bluetooth"), None);
    }
}
