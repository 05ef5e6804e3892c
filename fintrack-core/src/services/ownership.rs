//! Ownership guard
//!
//! Every record-scoped read, update and delete goes through [`ensure_owner`]
//! before touching the record.

use crate::domain::result::{Error, Result};
use crate::domain::{Owned, User};

/// Check that `record` exists and belongs to `user`
///
/// `what` names the record kind in the not-found message.
pub fn ensure_owner<T: Owned>(record: Option<T>, user: &User, what: &str) -> Result<T> {
    let record = record.ok_or_else(|| Error::not_found(what))?;
    if record.owner_id() != user.id {
        return Err(Error::Forbidden);
    }
    Ok(record)
}
