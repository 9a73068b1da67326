//! The saved-label collection — one key per template under the
//! `saved_label_` family — and the one-time migration of the legacy
//! single-document layout into it.

use tracing::{error, warn};

use crate::error::PersistError;
use crate::repo::Persistence;
use crate::schema::SchemaError;
use crate::timestamp;
use crate::types::{CanvasJson, LabelProps, LabelTemplate};

/// Key family owned by the collection. One live key per template.
pub const SAVED_LABEL_PREFIX: &str = "saved_label_";

/// Fixed keys of the legacy single-document layout. Erased the first time
/// they are observed, whatever their content.
const LEGACY_PROPS_KEY: &str = "saved_canvas_props";
const LEGACY_CANVAS_KEY: &str = "saved_canvas_data";

/// Per-document failures collected by [`Persistence::save_labels`]. The batch
/// itself never raises; documents after a failing one are still attempted.
#[derive(Debug, Default)]
pub struct SaveLabelsOutcome {
    pub validation_errors: Vec<SchemaError>,
    pub other_errors: Vec<PersistError>,
}

impl SaveLabelsOutcome {
    pub fn is_clean(&self) -> bool {
        self.validation_errors.is_empty() && self.other_errors.is_empty()
    }
}

impl Persistence {
    /// Smallest-counter key of the form `saved_label_<timestamp>_<counter>`
    /// that does not collide with a live key. Deterministic given store
    /// state; relies on the single-writer execution model.
    pub fn create_uid_for_label(&self, timestamp: i64) -> String {
        let basename = format!("{}{}", SAVED_LABEL_PREFIX, timestamp);
        let mut counter = 0;
        loop {
            let key = format!("{}_{}", basename, counter);
            if !self.contains_key(&key) {
                return key;
            }
            counter += 1;
        }
    }

    /// Full replace of the collection: every existing `saved_label_` key is
    /// deleted, then each template is validated and saved under a fresh UID.
    /// Templates without a timestamp get the current time. Best-effort:
    /// per-document failures land in the outcome lists.
    pub fn save_labels(&self, labels: Vec<LabelTemplate>) -> SaveLabelsOutcome {
        let mut outcome = SaveLabelsOutcome::default();

        for key in self.collection_keys() {
            if let Err(e) = self.kv.delete(&key) {
                outcome.other_errors.push(PersistError::Storage(e));
            }
        }

        for mut label in labels {
            let ts = *label
                .timestamp
                .get_or_insert_with(timestamp::unix_timestamp);
            let uid = self.create_uid_for_label(ts);
            match self.codec.save_validated(&uid, Some(&label)) {
                Ok(()) => {}
                Err(PersistError::Validation(e)) => outcome.validation_errors.push(e),
                Err(other) => outcome.other_errors.push(other),
            }
        }

        outcome
    }

    /// Load every template in the collection, in lexical key order, after
    /// running the legacy migration. A template that fails validation is
    /// logged and skipped — its key is kept for manual recovery. Each loaded
    /// template carries its owning key as `id`. Never fails; an unreadable
    /// store reads as empty.
    pub fn load_labels(&self) -> Vec<LabelTemplate> {
        self.migrate_legacy_label();

        let mut items = Vec::new();
        for key in self.collection_keys() {
            match self.codec.load_validated::<LabelTemplate>(&key) {
                Ok(Some(mut item)) => {
                    item.id = Some(key);
                    items.push(item);
                }
                Ok(None) => {}
                Err(e) => error!("skipping stored label '{}': {}", key, e),
            }
        }
        items
    }

    /// Absorb the legacy two-key layout into the collection. Runs at most
    /// once per store lifetime: the legacy keys are erased before the
    /// synthesized template is saved, so a failing save cannot re-trigger
    /// migration on a later call.
    fn migrate_legacy_label(&self) {
        if !self.contains_key(LEGACY_PROPS_KEY) && !self.contains_key(LEGACY_CANVAS_KEY) {
            return;
        }

        let props = self.codec.load_validated::<LabelProps>(LEGACY_PROPS_KEY);
        let canvas = self.codec.load_validated::<CanvasJson>(LEGACY_CANVAS_KEY);

        self.codec.discard(LEGACY_PROPS_KEY);
        self.codec.discard(LEGACY_CANVAS_KEY);

        let (props, canvas) = match (props, canvas) {
            (Ok(Some(props)), Ok(Some(canvas))) => (props, canvas),
            (Err(e), _) | (_, Err(e)) => {
                warn!("legacy label rejected, dropping it: {}", e);
                return;
            }
            // Half-present layout: nothing usable to migrate.
            _ => return,
        };

        let template = LabelTemplate {
            label: props,
            canvas,
            timestamp: Some(timestamp::unix_timestamp()),
            id: None,
        };
        let uid = self.create_uid_for_label(template.timestamp.unwrap_or_default());
        if let Err(e) = self.codec.save_validated(&uid, Some(&template)) {
            error!("saving migrated legacy label failed: {}", e);
        }
    }

    /// Live collection keys in lexical order. An unreadable store reads as
    /// empty.
    fn collection_keys(&self) -> Vec<String> {
        match self.kv.keys() {
            Ok(keys) => {
                let mut keys: Vec<String> = keys
                    .into_iter()
                    .filter(|k| k.starts_with(SAVED_LABEL_PREFIX))
                    .collect();
                keys.sort();
                keys
            }
            Err(e) => {
                error!("listing stored labels failed: {}", e);
                Vec::new()
            }
        }
    }

    fn contains_key(&self, key: &str) -> bool {
        matches!(self.kv.get(key), Ok(Some(_)))
    }
}
