use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::document::{PayoutDocument, PayoutDocumentChange};
use crate::domain::ports::{
    DocumentCache, DocumentFilter, PayoutChangeStore, PayoutDocumentStore, RoyaltyReports,
};
use crate::domain::report::{ReportStatus, RoyaltyReport};

/// Thread-safe in-memory payout document store.
///
/// `Clone` shares the underlying map, so a test can keep a handle into a
/// store that has been boxed behind the port.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<Uuid, PayoutDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayoutDocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: PayoutDocument) -> io::Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id, document);
        Ok(())
    }

    async fn update(&self, document: PayoutDocument) -> io::Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id, document);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> io::Result<Option<PayoutDocument>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&id).cloned())
    }

    async fn find(
        &self,
        filter: &DocumentFilter,
        limit: usize,
        offset: usize,
    ) -> io::Result<Vec<PayoutDocument>> {
        let documents = self.documents.read().await;
        let mut matched: Vec<PayoutDocument> = documents
            .values()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &DocumentFilter) -> io::Result<usize> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .filter(|document| filter.matches(document))
            .count())
    }
}

/// In-memory append-only audit trail, keyed by parent document.
#[derive(Default, Clone)]
pub struct InMemoryChangeStore {
    changes: Arc<RwLock<HashMap<Uuid, Vec<PayoutDocumentChange>>>>,
}

impl InMemoryChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct view of one document's trail, for assertions.
    pub async fn snapshot_for(&self, document_id: Uuid) -> Vec<PayoutDocumentChange> {
        let changes = self.changes.read().await;
        changes.get(&document_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl PayoutChangeStore for InMemoryChangeStore {
    async fn append(&self, change: PayoutDocumentChange) -> io::Result<()> {
        let mut changes = self.changes.write().await;
        changes
            .entry(change.payout_document_id)
            .or_default()
            .push(change);
        Ok(())
    }

    async fn for_document(&self, document_id: Uuid) -> io::Result<Vec<PayoutDocumentChange>> {
        let changes = self.changes.read().await;
        Ok(changes.get(&document_id).cloned().unwrap_or_default())
    }
}

/// Single-entity document cache backed by a shared map.
#[derive(Default, Clone)]
pub struct InMemoryDocumentCache {
    entries: Arc<RwLock<HashMap<Uuid, PayoutDocument>>>,
}

impl InMemoryDocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}

#[async_trait]
impl DocumentCache for InMemoryDocumentCache {
    async fn get(&self, id: Uuid) -> io::Result<Option<PayoutDocument>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).cloned())
    }

    async fn put(&self, document: PayoutDocument) -> io::Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(document.id, document);
        Ok(())
    }
}

/// Royalty report source backed by a fixed set of reports, as loaded from a
/// fixture file or seeded by a test.
#[derive(Default, Clone)]
pub struct InMemoryRoyaltyReports {
    reports: Arc<Vec<RoyaltyReport>>,
}

impl InMemoryRoyaltyReports {
    pub fn new(reports: Vec<RoyaltyReport>) -> Self {
        Self {
            reports: Arc::new(reports),
        }
    }
}

#[async_trait]
impl RoyaltyReports for InMemoryRoyaltyReports {
    async fn accepted(&self, merchant_id: Uuid, ids: &[Uuid]) -> io::Result<Vec<RoyaltyReport>> {
        let mut matched: Vec<RoyaltyReport> = self
            .reports
            .iter()
            .filter(|report| {
                report.merchant_id == merchant_id
                    && report.status == ReportStatus::Accepted
                    && ids.contains(&report.id)
            })
            .cloned()
            .collect();
        matched.sort_by_key(|report| report.period_from);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{ChangeSource, PayoutStatus};
    use crate::domain::merchant::BankingDetails;
    use rust_decimal_macros::dec;

    fn document(status: PayoutStatus) -> PayoutDocument {
        PayoutDocument::new(
            Uuid::new_v4(),
            status,
            dec!(100),
            "USD".to_string(),
            vec![Uuid::new_v4()],
            "payout".to_string(),
            BankingDetails::default(),
        )
    }

    #[tokio::test]
    async fn test_document_store_roundtrip() {
        let store = InMemoryDocumentStore::new();
        let doc = document(PayoutStatus::Pending);

        store.insert(doc.clone()).await.unwrap();
        let fetched = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(fetched, doc);

        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_filters_by_status() {
        let store = InMemoryDocumentStore::new();
        let pending = document(PayoutStatus::Pending);
        let skipped = document(PayoutStatus::Skip);
        store.insert(pending.clone()).await.unwrap();
        store.insert(skipped).await.unwrap();

        let filter = DocumentFilter {
            statuses: vec![PayoutStatus::Pending],
            ..DocumentFilter::default()
        };
        let found = store.find(&filter, 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, pending.id);
        assert_eq!(store.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_change_store_appends_in_order() {
        let store = InMemoryChangeStore::new();
        let doc = document(PayoutStatus::Pending);

        for source in [ChangeSource::Merchant, ChangeSource::Admin] {
            store
                .append(PayoutDocumentChange::for_document(&doc, source, None))
                .await
                .unwrap();
        }

        let trail = store.for_document(doc.id).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].source, ChangeSource::Merchant);
        assert_eq!(trail[1].source, ChangeSource::Admin);
    }

    #[tokio::test]
    async fn test_cache_put_get() {
        let cache = InMemoryDocumentCache::new();
        let doc = document(PayoutStatus::Pending);
        cache.put(doc.clone()).await.unwrap();
        assert_eq!(cache.get(doc.id).await.unwrap().unwrap(), doc);

        cache.clear().await;
        assert!(cache.get(doc.id).await.unwrap().is_none());
    }
}
