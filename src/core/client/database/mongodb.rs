use super::error::DatabaseError;
use crate::core::client::database::constant::{EVIDENCE_COLLECTION, EXECUTIONS_COLLECTION, TEMPLATES_COLLECTION};
use crate::core::client::database::DatabaseClient;
use crate::types::evidence::EvidenceItem;
use crate::types::execution::{ExecutionStatus, ExecutionUpdates, ScanExecution};
use crate::types::params::DatabaseArgs;
use crate::types::template::{ScanTemplate, TemplateUpdates};
use crate::utils::metrics::ORCHESTRATOR_METRICS;
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOneOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use opentelemetry::KeyValue;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};
use uuid::Uuid;

/// MongoDB client implementation
pub struct MongoDbClient {
    client: Client,
    database: Arc<Database>,
}

impl MongoDbClient {
    pub async fn new(config: &DatabaseArgs) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(&config.connection_uri).await?;
        let database = Arc::new(client.database(&config.database_name));
        Ok(Self { client, database })
    }

    /// Mongodb client uses Arc internally, reducing the cost of clone.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    fn get_template_collection(&self) -> Collection<ScanTemplate> {
        self.database.collection(TEMPLATES_COLLECTION)
    }

    fn get_execution_collection(&self) -> Collection<ScanExecution> {
        self.database.collection(EXECUTIONS_COLLECTION)
    }

    fn get_evidence_collection(&self) -> Collection<EvidenceItem> {
        self.database.collection(EVIDENCE_COLLECTION)
    }

    /// find - Find multiple documents in a collection through an aggregation
    /// pipeline with optional sort and limit
    async fn find<T>(
        &self,
        collection: Collection<T>,
        filter: Document,
        sort: Option<Document>,
        limit: Option<i64>,
    ) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync + Sized,
    {
        let start = Instant::now();
        let mut pipeline = vec![doc! {
            "$match": filter
        }];
        if let Some(sort) = sort {
            pipeline.push(doc! {
                "$sort": sort
            });
        }
        if let Some(limit) = limit {
            pipeline.push(doc! {
                "$limit": limit
            });
        }

        let cursor = collection.aggregate(pipeline, None).await?;
        let vec_items: Vec<T> = cursor
            .map_err(|e| {
                error!(error = %e, "Error retrieving document");
                DatabaseError::FailedToSerializeDocument(format!("Failed to retrieve document: {}", e))
            })
            .and_then(|doc| {
                futures::future::ready(bson::from_document::<T>(doc).map_err(|e| {
                    error!(error = %e, "Deserialization error");
                    DatabaseError::FailedToSerializeDocument(format!("Failed to deserialize document: {}", e))
                }))
            })
            .try_collect()
            .await?;
        debug!(result_count = vec_items.len(), "Fetched data from collection");
        let attributes = [KeyValue::new("db_operation_name", "find")];
        ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
        Ok(vec_items)
    }
}

/// Builds the `$set`/`$unset` update document for an execution transition.
///
/// `updated_at` is always refreshed; clearable fields use `$unset` so reloads
/// see `None` rather than stale values.
fn execution_update_document(update: &ExecutionUpdates) -> Result<Document, DatabaseError> {
    let mut set_doc = doc! {
        "updated_at": bson::DateTime::from_chrono(Utc::now()),
    };
    let mut unset_doc = Document::new();

    if let Some(status) = update.status {
        set_doc.insert("status", bson::to_bson(&status)?);
    }
    if let Some(started_at) = update.started_at {
        set_doc.insert("started_at", bson::DateTime::from_chrono(started_at));
    }
    if let Some(completed_at) = update.completed_at {
        set_doc.insert("completed_at", bson::DateTime::from_chrono(completed_at));
    }
    if let Some(ref result) = update.result {
        set_doc.insert("result", bson::to_bson(result)?);
    }
    match &update.error_message {
        Some(Some(message)) => {
            set_doc.insert("error_message", message.clone());
        }
        Some(None) => {
            unset_doc.insert("error_message", Bson::Null);
        }
        None => {}
    }
    match &update.executor_id {
        Some(Some(executor_id)) => {
            set_doc.insert("executor_id", executor_id.clone());
        }
        Some(None) => {
            unset_doc.insert("executor_id", Bson::Null);
        }
        None => {}
    }
    if let Some(retry_count) = update.retry_count {
        set_doc.insert("retry_count", retry_count as i64);
    }

    let mut update_doc = doc! { "$set": set_doc };
    if !unset_doc.is_empty() {
        update_doc.insert("$unset", unset_doc);
    }
    Ok(update_doc)
}

#[async_trait]
impl DatabaseClient for MongoDbClient {
    async fn create_template(&self, template: ScanTemplate) -> Result<ScanTemplate, DatabaseError> {
        let start = Instant::now();
        self.get_template_collection().insert_one(&template, None).await?;
        let attributes = [KeyValue::new("db_operation_name", "create_template")];
        ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
        Ok(template)
    }

    async fn get_template_by_id(&self, id: Uuid) -> Result<Option<ScanTemplate>, DatabaseError> {
        Ok(self.get_template_collection().find_one(doc! { "id": id }, None).await?)
    }

    async fn list_templates(&self, only_active: bool) -> Result<Vec<ScanTemplate>, DatabaseError> {
        let filter = if only_active { doc! { "active": true } } else { doc! {} };
        self.find(self.get_template_collection(), filter, Some(doc! { "created_at": -1 }), None).await
    }

    async fn update_template(
        &self,
        current: &ScanTemplate,
        update: TemplateUpdates,
    ) -> Result<ScanTemplate, DatabaseError> {
        let start = Instant::now();
        let mut set_doc = doc! {
            "updated_at": bson::DateTime::from_chrono(Utc::now()),
        };
        if let Some(description) = update.description {
            set_doc.insert("description", description);
        }
        if let Some(ref parameters) = update.parameters {
            set_doc.insert("parameters", bson::to_bson(parameters)?);
        }
        if let Some(active) = update.active {
            set_doc.insert("active", active);
        }

        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        let updated = self
            .get_template_collection()
            .find_one_and_update(doc! { "id": current.id }, doc! { "$set": set_doc }, options)
            .await?
            .ok_or_else(|| DatabaseError::UpdateFailed(format!("template {} not found", current.id)))?;

        let attributes = [KeyValue::new("db_operation_name", "update_template")];
        ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
        Ok(updated)
    }

    async fn create_execution(&self, execution: ScanExecution) -> Result<ScanExecution, DatabaseError> {
        let start = Instant::now();
        // Plain insert: redelivered messages intentionally produce a fresh
        // execution row rather than being deduplicated.
        self.get_execution_collection().insert_one(&execution, None).await?;
        let attributes = [KeyValue::new("db_operation_name", "create_execution")];
        ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
        Ok(execution)
    }

    async fn get_execution_by_id(&self, id: Uuid) -> Result<Option<ScanExecution>, DatabaseError> {
        Ok(self.get_execution_collection().find_one(doc! { "id": id }, None).await?)
    }

    /// Guarded read-modify-write: the filter pins the status the caller based
    /// its transition on, so a concurrent transition (e.g. a user cancel while
    /// the scan is in flight) makes this update match nothing instead of
    /// resurrecting an absorbing state.
    async fn update_execution(
        &self,
        current: &ScanExecution,
        update: ExecutionUpdates,
    ) -> Result<ScanExecution, DatabaseError> {
        let start = Instant::now();
        let filter = doc! {
            "id": current.id,
            "status": bson::to_bson(&current.status)?,
        };
        let update_doc = execution_update_document(&update)?;

        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();
        let updated = self
            .get_execution_collection()
            .find_one_and_update(filter, update_doc, options)
            .await?
            .ok_or_else(|| {
                DatabaseError::UpdateFailed(format!("execution {} is no longer in status {}", current.id, current.status))
            })?;

        let attributes = [KeyValue::new("db_operation_name", "update_execution")];
        ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
        Ok(updated)
    }

    async fn get_executions_by_evidence_id(&self, evidence_id: &str) -> Result<Vec<ScanExecution>, DatabaseError> {
        self.find(
            self.get_execution_collection(),
            doc! { "evidence_id": evidence_id },
            Some(doc! { "created_at": -1 }),
            None,
        )
        .await
    }

    async fn get_latest_pending_execution(&self, evidence_id: &str) -> Result<Option<ScanExecution>, DatabaseError> {
        let filter = doc! {
            "evidence_id": evidence_id,
            "status": bson::to_bson(&ExecutionStatus::Pending)?,
        };
        let options = FindOneOptions::builder().sort(doc! { "created_at": -1 }).build();
        Ok(self.get_execution_collection().find_one(filter, options).await?)
    }

    async fn get_executions_by_status_for_owner(
        &self,
        status: ExecutionStatus,
        owner_id: &str,
    ) -> Result<Vec<ScanExecution>, DatabaseError> {
        let owned_evidence =
            self.find(self.get_evidence_collection(), doc! { "owner_id": owner_id }, None, None).await?;
        let evidence_ids: Vec<String> = owned_evidence.into_iter().map(|evidence| evidence.id).collect();
        if evidence_ids.is_empty() {
            return Ok(Vec::new());
        }

        let filter = doc! {
            "status": bson::to_bson(&status)?,
            "evidence_id": { "$in": evidence_ids },
        };
        self.find(self.get_execution_collection(), filter, Some(doc! { "created_at": -1 }), None).await
    }

    async fn delete_executions_by_evidence_id(&self, evidence_id: &str) -> Result<u64, DatabaseError> {
        let result =
            self.get_execution_collection().delete_many(doc! { "evidence_id": evidence_id }, None).await?;
        Ok(result.deleted_count)
    }

    async fn get_evidence_by_id(&self, evidence_id: &str) -> Result<Option<EvidenceItem>, DatabaseError> {
        Ok(self.get_evidence_collection().find_one(doc! { "id": evidence_id }, None).await?)
    }

    async fn create_evidence(&self, evidence: EvidenceItem) -> Result<EvidenceItem, DatabaseError> {
        self.get_evidence_collection().insert_one(&evidence, None).await?;
        Ok(evidence)
    }

    async fn set_latest_execution(&self, evidence_id: &str, execution_id: Uuid) -> Result<(), DatabaseError> {
        let start = Instant::now();
        // Unconditional overwrite: concurrent executions for the same evidence
        // race on this pointer and last write wins.
        self.get_evidence_collection()
            .update_one(
                doc! { "id": evidence_id },
                doc! { "$set": { "latest_execution_id": execution_id } },
                None,
            )
            .await?;
        let attributes = [KeyValue::new("db_operation_name", "set_latest_execution")];
        ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
        Ok(())
    }
}
