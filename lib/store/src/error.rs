use labelforge_kv::KVError;
use thiserror::Error;

use crate::schema::SchemaError;

/// Errors surfaced by the persistence layer.
///
/// Validation failures keep their structured issue list; storage failures
/// carry the backend message. Unparseable stored bytes are never an error —
/// the codec treats them as absent data.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("{0}")]
    Validation(#[from] SchemaError),

    #[error("storage error: {0}")]
    Storage(#[from] KVError),
}
