//! Document repositories — one reserved key per scalar document, each with
//! its own recovery policy.
//!
//! Recovery is deliberately non-uniform. Self-healing repositories clear a
//! rejected value and read it as absent; preview and automation propagate
//! load failures, since those are checked right where they are read. The
//! font cache never fails — callers treat it as a list to augment, not as
//! an optional signal.

use std::sync::Arc;

use labelforge_kv::KVStore;
use tracing::error;

use crate::codec::ObjectCodec;
use crate::error::PersistError;
use crate::schema::{Document, SchemaError};
use crate::types::{
    AutomationProps, ConnectionType, LabelPreset, LabelProps, LabelTemplate, PreviewProps,
    RfidProfile,
};

pub(crate) const KEY_LAST_LABEL_PROPS: &str = "last_label_props";
pub(crate) const KEY_PREVIEW_PROPS: &str = "saved_preview_props";
pub(crate) const KEY_LABEL_PRESETS: &str = "label_presets";
pub(crate) const KEY_CONNECTION_TYPE: &str = "connection_type";
pub(crate) const KEY_AUTOMATION: &str = "automation";
pub(crate) const KEY_DEFAULT_TEMPLATE: &str = "default_template";
pub(crate) const KEY_FONT_CACHE: &str = "font_cache";
pub(crate) const KEY_RFID_PROFILES: &str = "rfid_label_profiles";

/// Facade over every document repository. One instance per running app.
pub struct Persistence {
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) codec: ObjectCodec,
}

impl Persistence {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let codec = ObjectCodec::new(Arc::clone(&kv));
        Self { kv, codec }
    }

    /// The underlying codec, for wiring persisted cells.
    pub fn codec(&self) -> &ObjectCodec {
        &self.codec
    }

    /// See [`ObjectCodec::used_space_kb`].
    pub fn used_space_kb(&self) -> u64 {
        self.codec.used_space_kb()
    }

    // ── Label in progress ───────────────────────────────────────────

    pub fn load_last_label_props(&self) -> Option<LabelProps> {
        self.load_self_healing(KEY_LAST_LABEL_PROPS)
    }

    pub fn save_last_label_props(&self, props: &LabelProps) -> Result<(), PersistError> {
        self.codec.save_validated(KEY_LAST_LABEL_PROPS, Some(props))
    }

    // ── Preview props ───────────────────────────────────────────────

    pub fn load_saved_preview_props(&self) -> Result<Option<PreviewProps>, SchemaError> {
        self.codec.load_validated(KEY_PREVIEW_PROPS)
    }

    pub fn save_preview_props(&self, props: &PreviewProps) -> Result<(), PersistError> {
        self.codec.save_validated(KEY_PREVIEW_PROPS, Some(props))
    }

    // ── Label presets ───────────────────────────────────────────────

    /// An empty stored list reads as absent.
    pub fn load_label_presets(&self) -> Option<Vec<LabelPreset>> {
        let presets: Vec<LabelPreset> = self.load_self_healing(KEY_LABEL_PRESETS)?;
        if presets.is_empty() { None } else { Some(presets) }
    }

    pub fn save_label_presets(&self, presets: &[LabelPreset]) -> Result<(), PersistError> {
        self.codec
            .save_validated(KEY_LABEL_PRESETS, Some(&presets.to_vec()))
    }

    // ── Connection preference ───────────────────────────────────────

    /// Stored as the raw transport name, not as a JSON document.
    pub fn load_last_connection_type(&self) -> Option<ConnectionType> {
        let bytes = self.kv.get(KEY_CONNECTION_TYPE).ok().flatten()?;
        let raw = String::from_utf8(bytes).ok()?;
        ConnectionType::parse(&raw)
    }

    pub fn save_last_connection_type(&self, value: ConnectionType) -> Result<(), PersistError> {
        self.kv.set(KEY_CONNECTION_TYPE, value.as_str().as_bytes())?;
        Ok(())
    }

    // ── Automation ──────────────────────────────────────────────────

    pub fn load_automation(&self) -> Result<Option<AutomationProps>, SchemaError> {
        self.codec.load_validated(KEY_AUTOMATION)
    }

    /// `None` clears the stored settings.
    pub fn save_automation(&self, value: Option<&AutomationProps>) -> Result<(), PersistError> {
        self.codec.save_validated(KEY_AUTOMATION, value)
    }

    // ── Default template ────────────────────────────────────────────

    pub fn load_default_template(&self) -> Option<LabelTemplate> {
        self.load_self_healing(KEY_DEFAULT_TEMPLATE)
    }

    /// `None` reverts to the built-in default.
    pub fn save_default_template(&self, value: Option<&LabelTemplate>) -> Result<(), PersistError> {
        self.codec.save_validated(KEY_DEFAULT_TEMPLATE, value)
    }

    /// True iff a custom default template is stored, valid or not.
    pub fn has_custom_default_template(&self) -> bool {
        matches!(self.kv.get(KEY_DEFAULT_TEMPLATE), Ok(Some(_)))
    }

    // ── Font cache ──────────────────────────────────────────────────

    /// A rejected value reads as empty but stays in the store.
    pub fn load_cached_fonts(&self) -> Vec<String> {
        match self.codec.load_validated(KEY_FONT_CACHE) {
            Ok(Some(fonts)) => fonts,
            Ok(None) => Vec::new(),
            Err(e) => {
                error!("cached fonts rejected, reading as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save_cached_fonts(&self, fonts: &[String]) -> Result<(), PersistError> {
        self.codec
            .save_validated(KEY_FONT_CACHE, Some(&fonts.to_vec()))
    }

    // ── Device (RFID) profiles ──────────────────────────────────────

    pub fn load_rfid_profiles(&self) -> Vec<RfidProfile> {
        match self.codec.load_validated(KEY_RFID_PROFILES) {
            Ok(Some(profiles)) => profiles,
            Ok(None) => Vec::new(),
            Err(e) => {
                error!("stored rfid profiles rejected, clearing: {}", e);
                self.codec.discard(KEY_RFID_PROFILES);
                Vec::new()
            }
        }
    }

    pub fn save_rfid_profiles(&self, profiles: &[RfidProfile]) -> Result<(), PersistError> {
        self.codec
            .save_validated(KEY_RFID_PROFILES, Some(&profiles.to_vec()))
    }

    // ── Shared recovery ─────────────────────────────────────────────

    /// Load; on a schema rejection, log, delete the offending key, and read
    /// as absent.
    fn load_self_healing<T: Document>(&self, key: &str) -> Option<T> {
        match self.codec.load_validated(key) {
            Ok(value) => value,
            Err(e) => {
                error!("stored value at '{}' rejected, clearing: {}", key, e);
                self.codec.discard(key);
                None
            }
        }
    }
}
