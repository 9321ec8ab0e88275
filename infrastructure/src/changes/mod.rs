//! Change-feed wire format
//!
//! Decodes the store's change-capture events into the application layer's
//! [`ChangeItem`]s. Records arrive as attribute maps (string attributes
//! under an `S` tag, the usual change-capture encoding); each record is
//! decoded independently so one malformed record fails only itself.

pub mod record;

pub use record::{decode_batch, decode_record, ChangeBatchEvent, ChangeParseError, ChangeRecord};
