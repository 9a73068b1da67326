//! LabelForge persistence — validated documents over a key-value store.
//!
//! The contract: typed in-memory documents are serialized as JSON and
//! schema-checked on both write and read. Repositories pair one document
//! kind with one reserved key (or key family) and a recovery policy;
//! [`PersistedCell`] wraps a single entry as an observable value cell.

pub mod cell;
pub mod codec;
pub mod error;
pub mod labels;
pub mod repo;
pub mod schema;
mod timestamp;
pub mod types;

pub use cell::{PersistedCell, SubscriptionId};
pub use codec::ObjectCodec;
pub use error::PersistError;
pub use labels::{SAVED_LABEL_PREFIX, SaveLabelsOutcome};
pub use repo::Persistence;
pub use schema::{Document, SchemaError, SchemaIssue};
pub use types::{
    AutomationProps, CanvasJson, ConnectionType, LabelPreset, LabelProps, LabelSize,
    LabelTemplate, PreviewProps, PrintDirection, RfidProfile,
};
