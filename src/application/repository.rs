use chrono::Utc;
use std::net::IpAddr;
use tracing::error;
use uuid::Uuid;

use crate::domain::document::{ChangeSource, PayoutDocument, PayoutDocumentChange};
use crate::domain::ports::{
    DocumentCacheBox, DocumentFilter, PayoutChangeStoreBox, PayoutDocumentStoreBox,
};
use crate::error::Result;

/// One page of a document query.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DocumentPage {
    pub total: usize,
    pub documents: Vec<PayoutDocument>,
}

/// Owns persisted payout document state: the durable collections, the
/// append-only audit trail, and the single-entity cache.
///
/// Every accepted mutation goes through [`insert`](Self::insert) or
/// [`update`](Self::update), which append exactly one change record hashed
/// over the persisted snapshot. A failed audit append aborts the mutation.
pub struct DocumentRepository {
    documents: PayoutDocumentStoreBox,
    changes: PayoutChangeStoreBox,
    cache: DocumentCacheBox,
}

impl DocumentRepository {
    pub fn new(
        documents: PayoutDocumentStoreBox,
        changes: PayoutChangeStoreBox,
        cache: DocumentCacheBox,
    ) -> Self {
        Self {
            documents,
            changes,
            cache,
        }
    }

    pub async fn insert(
        &self,
        document: &PayoutDocument,
        ip: Option<IpAddr>,
        source: ChangeSource,
    ) -> Result<()> {
        self.documents
            .insert(document.clone())
            .await
            .map_err(|err| {
                error!(
                    operation = "payout_document_insert",
                    collection = "payout_documents",
                    document_id = %document.id,
                    error = %err,
                    "failed to persist payout document"
                );
                err
            })?;
        self.append_change(document, ip, source).await?;
        self.cache.put(document.clone()).await?;
        Ok(())
    }

    /// Replaces the persisted document. Refreshes `updated_at` first so the
    /// audit hash covers the stored snapshot.
    pub async fn update(
        &self,
        document: &mut PayoutDocument,
        ip: Option<IpAddr>,
        source: ChangeSource,
    ) -> Result<()> {
        document.updated_at = Utc::now();
        self.documents
            .update(document.clone())
            .await
            .map_err(|err| {
                error!(
                    operation = "payout_document_update",
                    collection = "payout_documents",
                    document_id = %document.id,
                    error = %err,
                    "failed to persist payout document"
                );
                err
            })?;
        self.append_change(document, ip, source).await?;
        self.cache.put(document.clone()).await?;
        Ok(())
    }

    async fn append_change(
        &self,
        document: &PayoutDocument,
        ip: Option<IpAddr>,
        source: ChangeSource,
    ) -> Result<()> {
        let change = PayoutDocumentChange::for_document(document, source, ip);
        self.changes.append(change).await.map_err(|err| {
            error!(
                operation = "payout_change_append",
                collection = "payout_document_changes",
                document_id = %document.id,
                error = %err,
                "failed to append audit record"
            );
            err.into()
        })
    }

    /// Single-entity cache-aside lookup.
    pub async fn by_id(&self, id: Uuid) -> Result<Option<PayoutDocument>> {
        if let Some(document) = self.cache.get(id).await? {
            return Ok(Some(document));
        }
        let document = self.documents.get(id).await?;
        if let Some(document) = &document {
            self.cache.put(document.clone()).await?;
        }
        Ok(document)
    }

    /// Filtered lookup, newest first. List results are never cached.
    pub async fn find(
        &self,
        filter: &DocumentFilter,
        limit: usize,
        offset: usize,
    ) -> Result<DocumentPage> {
        let total = self.documents.count(filter).await?;
        let documents = if total == 0 {
            Vec::new()
        } else {
            self.documents.find(filter, limit, offset).await?
        };
        Ok(DocumentPage { total, documents })
    }

    pub async fn changes_for(&self, document_id: Uuid) -> Result<Vec<PayoutDocumentChange>> {
        Ok(self.changes.for_document(document_id).await?)
    }
}
