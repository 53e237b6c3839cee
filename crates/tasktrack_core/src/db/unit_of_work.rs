//! Caller-scoped transactions spanning several repository calls.

use super::DbError;
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `work` inside one IMMEDIATE transaction on `conn`.
///
/// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
/// Repositories built inside the closure borrow the transaction (it derefs
/// to `Connection`) and must not commit on their own.
///
/// # Errors
/// - Returns the closure error unchanged after rollback.
/// - Returns a storage error (via `From<DbError>`) when begin/commit fails.
pub fn unit_of_work<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<DbError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| E::from(DbError::Sqlite(err)))?;

    match work(&tx) {
        Ok(value) => {
            tx.commit().map_err(|err| E::from(DbError::Sqlite(err)))?;
            debug!("event=unit_of_work module=db status=committed");
            Ok(value)
        }
        Err(err) => {
            // Dropping an uncommitted transaction rolls it back; do it
            // explicitly so a rollback failure is at least logged.
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=unit_of_work module=db status=rollback_failed error={}",
                    rollback_err
                );
            } else {
                debug!("event=unit_of_work module=db status=rolled_back");
            }
            Err(err)
        }
    }
}
