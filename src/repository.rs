//! Persistence collaborator
//!
//! Records are stored as rows: JSON objects mapping storage attributes
//! (`title_translations`) to their translation maps. The [`Repository`]
//! trait is the seam to a real database; [`MemoryRepository`] keeps rows as
//! serialized JSON text so that every save and reload goes through a full
//! serialization round trip.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::error::{Result, TranslateError};
use crate::schema::TranslationPredicate;

pub trait Repository {
    /// Store a new row and return its id.
    fn insert(&mut self, model: &str, row: Value) -> Result<u64>;

    /// Overwrite the attributes present in `row`, keeping the others.
    fn update(&mut self, model: &str, id: u64, row: Value) -> Result<()>;

    fn find(&self, model: &str, id: u64) -> Result<Value>;

    /// Row with the highest id.
    fn last(&self, model: &str) -> Result<Option<(u64, Value)>>;

    /// Rows satisfying `predicate`, in id order.
    fn filter(&self, model: &str, predicate: &TranslationPredicate) -> Result<Vec<(u64, Value)>>;
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: HashMap<String, BTreeMap<u64, String>>,
    next_id: u64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        MemoryRepository::default()
    }

    pub fn count(&self, model: &str) -> usize {
        self.tables.get(model).map_or(0, BTreeMap::len)
    }

    fn table(&self, model: &str) -> Option<&BTreeMap<u64, String>> {
        self.tables.get(model)
    }

    fn not_found(model: &str, id: u64) -> TranslateError {
        TranslateError::RecordNotFound {
            model: model.to_string(),
            id,
        }
    }
}

impl Repository for MemoryRepository {
    fn insert(&mut self, model: &str, row: Value) -> Result<u64> {
        self.next_id += 1;
        let id = self.next_id;
        let text = serde_json::to_string(&row)?;
        tracing::debug!(model, id, "inserting row");
        self.tables
            .entry(model.to_string())
            .or_default()
            .insert(id, text);
        Ok(id)
    }

    fn update(&mut self, model: &str, id: u64, row: Value) -> Result<()> {
        let mut stored = self.find(model, id)?;
        if let (Some(target), Value::Object(changes)) = (stored.as_object_mut(), row) {
            tracing::debug!(
                model,
                id,
                attributes = ?changes.keys().collect::<Vec<_>>(),
                "updating row"
            );
            target.extend(changes);
        }

        let text = serde_json::to_string(&stored)?;
        self.tables
            .get_mut(model)
            .and_then(|table| table.get_mut(&id))
            .map(|slot| *slot = text)
            .ok_or_else(|| MemoryRepository::not_found(model, id))
    }

    fn find(&self, model: &str, id: u64) -> Result<Value> {
        let text = self
            .table(model)
            .and_then(|table| table.get(&id))
            .ok_or_else(|| MemoryRepository::not_found(model, id))?;
        Ok(serde_json::from_str(text)?)
    }

    fn last(&self, model: &str) -> Result<Option<(u64, Value)>> {
        match self.table(model).and_then(|table| table.last_key_value()) {
            Some((id, text)) => Ok(Some((*id, serde_json::from_str(text)?))),
            None => Ok(None),
        }
    }

    fn filter(&self, model: &str, predicate: &TranslationPredicate) -> Result<Vec<(u64, Value)>> {
        let mut rows = Vec::new();
        if let Some(table) = self.table(model) {
            for (id, text) in table {
                let row: Value = serde_json::from_str(text)?;
                if predicate.matches(&row) {
                    rows.push((*id, row));
                }
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, TranslatesOptions};
    use serde_json::json;

    #[test]
    fn test_insert_find_update() {
        let mut repo = MemoryRepository::new();
        let id = repo
            .insert("Post", json!({"title_translations": {"en": "A"}, "body_translations": {}}))
            .unwrap();
        assert_eq!(repo.count("Post"), 1);

        repo.update("Post", id, json!({"title_translations": {"en": "B"}}))
            .unwrap();
        assert_eq!(
            repo.find("Post", id).unwrap(),
            json!({"title_translations": {"en": "B"}, "body_translations": {}})
        );
    }

    #[test]
    fn test_missing_rows() {
        let mut repo = MemoryRepository::new();
        assert!(matches!(
            repo.find("Post", 7),
            Err(TranslateError::RecordNotFound { id: 7, .. })
        ));
        assert!(repo.update("Post", 7, json!({})).is_err());
        assert_eq!(repo.last("Post").unwrap(), None);
    }

    #[test]
    fn test_last_and_filter() {
        let mut repo = MemoryRepository::new();
        repo.insert("Post", json!({"title_translations": {"en": "A"}})).unwrap();
        let second = repo
            .insert("Post", json!({"title_translations": {"en": "B", "fr": "A"}}))
            .unwrap();
        repo.insert("Other", json!({"title_translations": {"en": "A"}})).unwrap();

        assert_eq!(repo.last("Post").unwrap().map(|(id, _)| id), Some(second));

        let schema = Schema::builder("Post")
            .translates("title", TranslatesOptions::new())
            .build();
        let predicate = schema.with_translation_in("title", "A", "en").unwrap();
        let ids: Vec<u64> = repo
            .filter("Post", &predicate)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![1]);
    }
}
