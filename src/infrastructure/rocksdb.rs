use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::io;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::document::{PayoutDocument, PayoutDocumentChange};
use crate::domain::ports::{DocumentFilter, PayoutChangeStore, PayoutDocumentStore};
use crate::error::{PayoutError, Result};

/// Column Family for payout documents, keyed by document id.
pub const CF_DOCUMENTS: &str = "payout_documents";
/// Column Family for the append-only change records, keyed by
/// document id + change id so one document's trail is contiguous.
pub const CF_CHANGES: &str = "payout_document_changes";

/// Persistent store implementation using RocksDB.
///
/// Serves both the document collection and the audit trail through separate
/// Column Families. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// both column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_documents = ColumnFamilyDescriptor::new(CF_DOCUMENTS, Options::default());
        let cf_changes = ColumnFamilyDescriptor::new(CF_CHANGES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_documents, cf_changes])
            .map_err(|e| PayoutError::Storage(io::Error::other(e.to_string())))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> io::Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| io::Error::other(format!("{name} column family not found")))
    }

    fn put_document(&self, document: &PayoutDocument) -> io::Result<()> {
        let cf = self.cf(CF_DOCUMENTS)?;
        let value = serde_json::to_vec(document)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.db
            .put_cf(&cf, document.id.as_bytes(), value)
            .map_err(io::Error::other)
    }

    fn scan_documents(&self, filter: &DocumentFilter) -> io::Result<Vec<PayoutDocument>> {
        let cf = self.cf(CF_DOCUMENTS)?;
        let mut matched = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(io::Error::other)?;
            let document: PayoutDocument = serde_json::from_slice(&value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            if filter.matches(&document) {
                matched.push(document);
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl PayoutDocumentStore for RocksDBStore {
    async fn insert(&self, document: PayoutDocument) -> io::Result<()> {
        self.put_document(&document)
    }

    async fn update(&self, document: PayoutDocument) -> io::Result<()> {
        self.put_document(&document)
    }

    async fn get(&self, id: Uuid) -> io::Result<Option<PayoutDocument>> {
        let cf = self.cf(CF_DOCUMENTS)?;
        let result = self
            .db
            .get_cf(&cf, id.as_bytes())
            .map_err(io::Error::other)?;
        match result {
            Some(bytes) => {
                let document = serde_json::from_slice(&bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    async fn find(
        &self,
        filter: &DocumentFilter,
        limit: usize,
        offset: usize,
    ) -> io::Result<Vec<PayoutDocument>> {
        let mut matched = self.scan_documents(filter)?;
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &DocumentFilter) -> io::Result<usize> {
        Ok(self.scan_documents(filter)?.len())
    }
}

#[async_trait]
impl PayoutChangeStore for RocksDBStore {
    async fn append(&self, change: PayoutDocumentChange) -> io::Result<()> {
        let cf = self.cf(CF_CHANGES)?;
        let mut key = Vec::with_capacity(32);
        key.extend_from_slice(change.payout_document_id.as_bytes());
        key.extend_from_slice(change.id.as_bytes());
        let value =
            serde_json::to_vec(&change).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.db.put_cf(&cf, key, value).map_err(io::Error::other)
    }

    async fn for_document(&self, document_id: Uuid) -> io::Result<Vec<PayoutDocumentChange>> {
        let cf = self.cf(CF_CHANGES)?;
        let prefix = document_id.as_bytes();
        let mut changes = Vec::new();
        let iter = self.db.iterator_cf(
            cf,
            rocksdb::IteratorMode::From(prefix, rocksdb::Direction::Forward),
        );
        for item in iter {
            let (key, value) = item.map_err(io::Error::other)?;
            if !key.starts_with(prefix) {
                break;
            }
            let change: PayoutDocumentChange = serde_json::from_slice(&value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            changes.push(change);
        }
        // Change ids are random, so key order within one document is not
        // chronological.
        changes.sort_by_key(|change| change.occurred_at);
        Ok(changes)
    }
}
