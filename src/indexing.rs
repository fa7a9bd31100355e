//! Index update helpers.
//!
//! Records are flattened into [`IndexDocument`]s by a [`DocumentMapper`]:
//! the primary key and the owning type tag are added, and the reserved
//! metadata key (carrying document and per-field boosts) is stripped from the
//! field map and parsed. An [`Indexer`] sends the resulting
//! [`UpdateCommand`]s through the search transport.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::SearchConfig;
use crate::error::{PikeError, Result};
use crate::filter::{Binding, PlaceholderMode, assemble, escape_term};
use crate::record::{Keyed, PrimaryKey};
use crate::search::SearchTransport;

/// A record that can be written to the search index.
pub trait Searchable: Keyed {
    /// Tag identifying the record's type (typically its table name).
    fn type_tag(&self) -> String;

    /// Flat field mapping to index, optionally containing the metadata key.
    fn searchable_fields(&self) -> Map<String, Value>;
}

/// Boost metadata supplied under the reserved metadata key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexMetadata {
    /// Document-level boost.
    pub boost: Option<f32>,
    /// Per-field boosts.
    pub fields: BTreeMap<String, f32>,
}

/// A document ready to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Field values, including the primary key and type tag.
    pub fields: Map<String, Value>,
    /// Document-level boost.
    pub boost: Option<f32>,
    /// Per-field boosts.
    pub field_boosts: BTreeMap<String, f32>,
}

/// A delete-by-query with placeholder bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteQuery {
    /// Query template.
    pub template: String,
    /// Bound values.
    pub bindings: Vec<Binding>,
}

impl DeleteQuery {
    /// The query with its bindings substituted.
    pub fn assembled(&self) -> Result<String> {
        assemble(&self.template, &self.bindings)
    }
}

/// A batch of index changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCommand {
    /// Documents to add or replace.
    pub documents: Vec<IndexDocument>,
    /// Delete queries.
    pub deletes: Vec<DeleteQuery>,
    /// Commit after applying the changes.
    pub commit: bool,
}

impl UpdateCommand {
    /// Whether the command changes nothing.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.deletes.is_empty()
    }
}

/// Prepares index documents and delete queries.
#[derive(Debug, Clone)]
pub struct DocumentMapper {
    pk_field: String,
    type_field: String,
    metadata_key: String,
}

impl DocumentMapper {
    /// Create a mapper from the configured field names.
    pub fn new(config: &SearchConfig) -> Self {
        DocumentMapper {
            pk_field: config.pk_field_name.clone(),
            type_field: config.type_field_name.clone(),
            metadata_key: config.metadata_key.clone(),
        }
    }

    /// Build the index document for a record.
    ///
    /// Returns `None` when the record has nothing to index.
    pub fn prepare(
        &self,
        key: &PrimaryKey,
        type_tag: &str,
        mut fields: Map<String, Value>,
    ) -> Result<Option<IndexDocument>> {
        let metadata = match fields.remove(&self.metadata_key) {
            None | Some(Value::Null) => IndexMetadata::default(),
            Some(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|e| {
                PikeError::invalid_argument(format!(
                    "invalid '{}' metadata for record {key}: {e}",
                    self.metadata_key
                ))
            })?,
            Some(other) => {
                return Err(PikeError::invalid_argument(format!(
                    "'{}' metadata for record {key} must be an object, got {other}",
                    self.metadata_key
                )));
            }
        };

        if fields.is_empty() {
            return Ok(None);
        }

        fields.insert(
            self.pk_field.clone(),
            serde_json::to_value(key).map_err(PikeError::from)?,
        );
        fields.insert(self.type_field.clone(), Value::String(type_tag.to_string()));

        Ok(Some(IndexDocument {
            fields,
            boost: metadata.boost,
            field_boosts: metadata.fields,
        }))
    }

    /// Delete query removing the given keys.
    pub fn delete_keys(&self, keys: &[PrimaryKey]) -> DeleteQuery {
        let joined = keys
            .iter()
            .map(|key| escape_term(&key.to_string()))
            .collect::<Vec<_>>()
            .join(" ");
        DeleteQuery {
            template: format!("{}:({})", self.pk_field, PlaceholderMode::Literal.token(1)),
            bindings: vec![Binding::Text(joined)],
        }
    }

    /// Delete query removing every record of a type.
    pub fn delete_type(&self, type_tag: &str) -> DeleteQuery {
        DeleteQuery {
            template: format!("{}:{}", self.type_field, PlaceholderMode::Term.token(1)),
            bindings: vec![Binding::from(type_tag)],
        }
    }
}

/// Writes records to the index through the transport.
#[derive(Debug, Clone)]
pub struct Indexer {
    transport: Arc<dyn SearchTransport>,
    config: SearchConfig,
    mapper: DocumentMapper,
    endpoint: String,
}

impl Indexer {
    /// Create an indexer writing to the configured default endpoint.
    pub fn new(transport: Arc<dyn SearchTransport>, config: SearchConfig) -> Self {
        let mapper = DocumentMapper::new(&config);
        let endpoint = config.default_endpoint.clone();
        Indexer {
            transport,
            config,
            mapper,
            endpoint,
        }
    }

    /// Write to a different endpoint.
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The document mapper used by this indexer.
    pub fn mapper(&self) -> &DocumentMapper {
        &self.mapper
    }

    /// Add or replace records; returns the number of documents sent.
    pub fn update<R: Searchable>(&self, records: &[R]) -> Result<usize> {
        if !self.config.enabled || records.is_empty() {
            return Ok(0);
        }

        let mut command = UpdateCommand {
            commit: true,
            ..UpdateCommand::default()
        };
        for record in records {
            let key = record.primary_key();
            if let Some(document) =
                self.mapper
                    .prepare(&key, &record.type_tag(), record.searchable_fields())?
            {
                command.documents.push(document);
            }
        }

        let sent = command.documents.len();
        if sent > 0 {
            self.send(command)?;
        }
        Ok(sent)
    }

    /// Remove records from the index.
    pub fn delete<R: Keyed>(&self, records: &[R]) -> Result<()> {
        if !self.config.enabled || records.is_empty() {
            return Ok(());
        }

        let keys: Vec<PrimaryKey> = records.iter().map(Keyed::primary_key).collect();
        self.send(UpdateCommand {
            deletes: vec![self.mapper.delete_keys(&keys)],
            commit: true,
            ..UpdateCommand::default()
        })
    }

    /// Remove every record of a type from the index.
    pub fn delete_type(&self, type_tag: &str) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        self.send(UpdateCommand {
            deletes: vec![self.mapper.delete_type(type_tag)],
            commit: true,
            ..UpdateCommand::default()
        })
    }

    fn send(&self, command: UpdateCommand) -> Result<()> {
        self.config.endpoint(&self.endpoint)?;
        for delete in &command.deletes {
            delete.assembled()?;
        }
        debug!(
            "index update on '{}': {} documents, {} deletes",
            self.endpoint,
            command.documents.len(),
            command.deletes.len()
        );
        self.transport.update(&self.endpoint, &command)
    }
}
