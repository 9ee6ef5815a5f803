use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranslateError};
use crate::schema::{Schema, TranslatesOptions};

/// One `translates` declaration in a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub field: String,
    #[serde(flatten)]
    pub options: TranslatesOptions,
}

/// Schema declarations as stored on disk.
///
/// ```json
/// {
///     "name": "PostDetailed",
///     "translates": [
///         { "field": "title", "locales": ["en", "fr"] },
///         { "field": "comment", "locales": ["en", "fr"], "fallback": false }
///     ]
/// }
/// ```
///
/// Fields are a list rather than an object so declaration order survives
/// parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub name: String,
    #[serde(default)]
    pub translates: Vec<FieldConfig>,
}

impl SchemaConfig {
    pub fn build(self) -> Arc<Schema> {
        self.translates
            .into_iter()
            .fold(Schema::builder(&self.name), |builder, field| {
                builder.translates(&field.field, field.options)
            })
            .build()
    }
}

/// Load one schema from a JSON file
///
/// # Errors
/// - File read errors
/// - Invalid JSON or a document that is not a schema
pub fn load_schema_from_file(path: &Path) -> Result<Arc<Schema>> {
    let content = fs::read_to_string(path).map_err(|e| TranslateError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config: SchemaConfig =
        serde_json::from_str(&content).map_err(|e| TranslateError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(config.build())
}

/// Load every `*.json` schema in a directory, keyed by schema name
///
/// # Errors
/// - Directory not found or unreadable
/// - Any schema file failing to load
pub fn load_schemas_from_dir(dir: &Path) -> Result<HashMap<String, Arc<Schema>>> {
    if !dir.is_dir() {
        return Err(TranslateError::Load {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut schemas = HashMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let schema = load_schema_from_file(&path)?;
        schemas.insert(schema.name().to_string(), schema);
    }

    if schemas.is_empty() {
        tracing::warn!(dir = %dir.display(), "no schema files found");
    }

    Ok(schemas)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST_DETAILED: &str = r#"{
        "name": "PostDetailed",
        "translates": [
            { "field": "title", "locales": ["en", "fr"] },
            { "field": "comment", "locales": ["en", "fr"], "fallback": false }
        ]
    }"#;

    #[test]
    fn test_load_schema_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post_detailed.json");
        fs::write(&path, POST_DETAILED).unwrap();

        let schema = load_schema_from_file(&path).unwrap();
        assert_eq!(schema.name(), "PostDetailed");
        assert_eq!(
            schema.permitted_translated_attributes(),
            vec!["title_en", "title_fr", "comment_en", "comment_fr"]
        );
        assert_eq!(schema.field("comment").unwrap().fallback(), Some(false));
        assert_eq!(schema.field("title").unwrap().fallback(), None);
    }

    #[test]
    fn test_load_schema_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_schema_from_file(&missing),
            Err(TranslateError::Load { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"translates": []}"#).unwrap();
        let err = load_schema_from_file(&bad).unwrap_err();
        assert!(err.to_string().starts_with("failed to load"));
    }

    #[test]
    fn test_load_schemas_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("post_detailed.json"), POST_DETAILED).unwrap();
        fs::write(
            dir.path().join("post.json"),
            r#"{"name": "Post", "translates": [{"field": "title"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let schemas = load_schemas_from_dir(dir.path()).unwrap();
        assert_eq!(schemas.len(), 2);
        assert!(schemas["Post"].responds_to("title_de"));
        assert!(!schemas["PostDetailed"].responds_to("title_de"));

        assert!(load_schemas_from_dir(&dir.path().join("post.json")).is_err());
    }
}
