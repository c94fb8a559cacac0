//! Unit of work for one import call.
//!
//! Importers receive the open transaction explicitly; the caller decides
//! whether it ends in [`ImportTransaction::commit`] or
//! [`ImportTransaction::rollback`].

use std::ops::{Deref, DerefMut};

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use vitrine_core::AppError;

/// A database transaction scoped to a single import batch.
///
/// Dropping it without calling `commit` rolls back everything written
/// through it.
///
/// # Example
///
/// ```ignore
/// let mut tx = ImportTransaction::begin(&pool).await?;
/// BrandRepository::insert(&mut tx, &fields).await?;
/// tx.commit().await?;
/// ```
pub struct ImportTransaction {
    transaction: Transaction<'static, Sqlite>,
}

impl ImportTransaction {
    /// Begin a new database transaction
    pub async fn begin(pool: &SqlitePool) -> Result<Self, AppError> {
        let transaction = pool.begin().await?;
        tracing::debug!("Import transaction started");
        Ok(Self { transaction })
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.transaction.commit().await?;
        tracing::debug!("Import transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), AppError> {
        self.transaction.rollback().await?;
        tracing::debug!("Import transaction rolled back");
        Ok(())
    }

    /// Connection bound to this transaction.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.transaction
    }
}

impl Deref for ImportTransaction {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}

impl DerefMut for ImportTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.transaction
    }
}
