use crate::database::{Database, DatabaseTransaction, Result};

/// A unit of work against a [`Database`].
///
/// The transaction is begun on first use and lives until [`Session::commit`]
/// or [`Session::rollback`]. Whatever is uncommitted when the session is
/// dropped is rolled back. After a commit the next access begins a fresh
/// transaction.
pub struct Session<D: Database> {
    database: D,
    transaction: Option<D::Transaction>,
}

impl<D: Database> Session<D> {
    pub fn new(database: D) -> Self {
        Self {
            database,
            transaction: None,
        }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub async fn tx(&mut self) -> Result<&mut D::Transaction> {
        let transaction = match self.transaction.take() {
            Some(transaction) => transaction,
            None => self.database.transaction().await?,
        };
        Ok(self.transaction.insert(transaction))
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Commits pending writes, if any.
    pub async fn commit(&mut self) -> Result<()> {
        match self.transaction.take() {
            Some(transaction) => transaction.commit().await,
            None => Ok(()),
        }
    }

    pub fn rollback(&mut self) {
        self.transaction = None;
    }
}
