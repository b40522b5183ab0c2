//! In-process document store.
//!
//! Supports the subset of MongoDB query semantics the services issue:
//! equality and `$gte` predicates, `$set` updates, and `$group` (with
//! `$sum` accumulators) plus `$limit` pipeline stages. Results come back
//! in insertion order.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use tokio::sync::RwLock;

use super::store::{DocumentStore, UpdateOutcome};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_of(document: &Document) -> Option<ObjectId> {
    document.get_object_id("_id").ok()
}

fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    match (left, right) {
        (Bson::DateTime(l), Bson::DateTime(r)) => Some(l.cmp(r)),
        (Bson::String(l), Bson::String(r)) => Some(l.cmp(r)),
        (l, r) => match (as_i64(l), as_i64(r)) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => as_f64(l)?.partial_cmp(&as_f64(r)?),
        },
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn values_equal(left: &Bson, right: &Bson) -> bool {
    compare(left, right) == Some(Ordering::Equal) || left == right
}

fn matches(document: &Document, filter: &Document) -> AppResult<bool> {
    for (field, condition) in filter {
        let value = document.get(field);

        let ok = match condition {
            Bson::Document(operators) if operators.keys().any(|k| k.starts_with('$')) => {
                let mut ok = true;
                for (op, bound) in operators {
                    ok &= match op.as_str() {
                        "$gte" => value
                            .and_then(|v| compare(v, bound))
                            .is_some_and(|ord| ord != Ordering::Less),
                        other => {
                            return Err(AppError::Internal(format!(
                                "unsupported query operator: {other}"
                            )))
                        }
                    };
                }
                ok
            }
            expected => value.is_some_and(|v| values_equal(v, expected)),
        };

        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn group(documents: Vec<Document>, spec: &Document) -> AppResult<Vec<Document>> {
    let key_path = match spec.get("_id") {
        Some(Bson::String(path)) if path.starts_with('$') => path[1..].to_string(),
        other => {
            return Err(AppError::Internal(format!(
                "unsupported $group key: {other:?}"
            )))
        }
    };

    let mut accumulators = Vec::new();
    for (name, accumulator) in spec.iter().filter(|(name, _)| name.as_str() != "_id") {
        let increment = accumulator
            .as_document()
            .and_then(|acc| acc.get("$sum"))
            .and_then(as_f64)
            .ok_or_else(|| {
                AppError::Internal(format!("unsupported $group accumulator: {name}"))
            })?;
        accumulators.push((name.clone(), increment));
    }

    let mut groups: Vec<(Bson, Vec<f64>)> = Vec::new();
    for document in &documents {
        let key = document.get(&key_path).cloned().unwrap_or(Bson::Null);
        let index = match groups.iter().position(|(k, _)| values_equal(k, &key)) {
            Some(index) => index,
            None => {
                groups.push((key, vec![0.0; accumulators.len()]));
                groups.len() - 1
            }
        };
        for (total, (_, increment)) in groups[index].1.iter_mut().zip(&accumulators) {
            *total += increment;
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, totals)| {
            let mut out = Document::new();
            out.insert("_id", key);
            for ((name, increment), total) in accumulators.iter().zip(totals) {
                // MongoDB keeps integer sums integral
                if increment.fract() == 0.0 {
                    out.insert(name.as_str(), total as i64);
                } else {
                    out.insert(name.as_str(), total);
                }
            }
            out
        })
        .collect())
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> AppResult<ObjectId> {
        let id = match id_of(&document) {
            Some(id) => id,
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|d| id_of(d) == Some(id)) {
            return Err(AppError::Internal(format!("duplicate _id: {id}")));
        }
        documents.push(document);
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut found = Vec::new();
        for document in collections.get(collection).into_iter().flatten() {
            if limit > 0 && found.len() as i64 >= limit {
                break;
            }
            if matches(document, &filter)? {
                found.push(document.clone());
            }
        }
        Ok(found)
    }

    async fn find_one(&self, collection: &str, id: ObjectId) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| id_of(d) == Some(id)))
            .cloned())
    }

    async fn update_one(
        &self,
        collection: &str,
        id: ObjectId,
        fields: Document,
    ) -> AppResult<UpdateOutcome> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|d| id_of(d) == Some(id)))
        else {
            return Ok(UpdateOutcome::default());
        };

        let mut changed = false;
        for (field, value) in fields {
            if field == "_id" {
                return Err(AppError::Internal("_id is immutable".to_string()));
            }
            if document.get(&field) != Some(&value) {
                document.insert(field, value);
                changed = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> AppResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match documents.iter().position(|d| id_of(d) == Some(id)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> AppResult<Vec<Document>> {
        let mut documents = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();

        for stage in &pipeline {
            let (name, argument) = stage
                .iter()
                .next()
                .ok_or_else(|| AppError::Internal("empty pipeline stage".to_string()))?;
            documents = match (name.as_str(), argument) {
                ("$group", Bson::Document(spec)) => group(documents, spec)?,
                ("$limit", limit) => {
                    let limit = as_f64(limit)
                        .ok_or_else(|| AppError::Internal("$limit must be numeric".to_string()))?;
                    documents.into_iter().take(limit as usize).collect()
                }
                (other, _) => {
                    return Err(AppError::Internal(format!(
                        "unsupported pipeline stage: {other}"
                    )))
                }
            };
        }

        Ok(documents)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::debug!("In-memory store dropped on shutdown");
    }
}
