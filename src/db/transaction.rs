/*!
 * Transaction Helper Utilities
 *
 * Runs a closure inside a database transaction: commit on `Ok`, rollback on `Err`.
 */

use crate::errors::ServiceError;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute a function within a database transaction
///
/// The closure's own `ServiceError` is handed back unchanged so callers can
/// still distinguish `NotFound` from storage failures after the rollback.
///
/// # Example
///
/// ```rust,ignore
/// let txn_model = with_transaction(&db, move |txn| {
///     Box::pin(async move {
///         let model = ledger_row.insert(txn).await?;
///         decrement_stock(txn, item_id).await?;
///         Ok(model)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<F, T>(db: &DatabaseConnection, f: F) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    db.transaction::<F, T, ServiceError>(f)
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => {
                warn!(error = %service_err, "Transaction rolled back");
                service_err
            }
        })
}
