//! Raw search results returned by the transport.

use serde::{Deserialize, Serialize};

use crate::facet::FacetSet;
use crate::record::PrimaryKey;

/// A matched document as identified by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Primary key of the record.
    pub key: PrimaryKey,
    /// Owning type tag, when the engine stores one.
    pub type_tag: Option<String>,
    /// Relevance score, when requested.
    pub score: Option<f32>,
}

impl SearchHit {
    /// Create a hit with only a key.
    pub fn new<K: Into<PrimaryKey>>(key: K) -> Self {
        SearchHit {
            key: key.into(),
            type_tag: None,
            score: None,
        }
    }

    /// Set the type tag.
    pub fn with_type<S: Into<String>>(mut self, type_tag: S) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Set the score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// A full corrected query proposed by the spellchecker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collation {
    /// Corrected query text.
    pub query: String,
    /// Estimated number of hits for the corrected query.
    pub hits: Option<u64>,
}

/// Suggestions for one misspelled term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSuggestion {
    /// The misspelled term.
    pub term: String,
    /// Suggested replacements, best first.
    pub suggestions: Vec<String>,
}

/// Spellcheck section of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcheckResult {
    /// Whether the engine considered the query correctly spelled.
    pub correctly_spelled: bool,
    /// Per-term suggestions, in query order.
    pub suggestions: Vec<TermSuggestion>,
    /// Collations, best first.
    pub collations: Vec<Collation>,
}

impl SpellcheckResult {
    /// Best collation, if any.
    pub fn collation(&self) -> Option<&Collation> {
        self.collations.first()
    }

    /// Suggestions for a term.
    pub fn suggestions_for(&self, term: &str) -> Option<&[String]> {
        self.suggestions
            .iter()
            .find(|s| s.term == term)
            .map(|s| s.suggestions.as_slice())
    }

    /// Add suggestions for a term.
    pub fn with_suggestion<S: Into<String>>(mut self, term: S, suggestions: Vec<String>) -> Self {
        self.suggestions.push(TermSuggestion {
            term: term.into(),
            suggestions,
        });
        self
    }

    /// Add a collation.
    pub fn with_collation<S: Into<String>>(mut self, query: S, hits: Option<u64>) -> Self {
        self.collations.push(Collation {
            query: query.into(),
            hits,
        });
        self
    }
}

/// Result of a single search round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched documents in relevance order.
    pub hits: Vec<SearchHit>,
    /// Total number of matches, beyond the returned window.
    pub total: u64,
    /// Facet results.
    pub facets: FacetSet,
    /// Spellcheck section, when spellchecking was requested.
    pub spellcheck: Option<SpellcheckResult>,
    /// Query text used by an automatic spellcheck retry.
    pub corrected_query: Option<String>,
}

impl SearchResult {
    /// A result with no matches.
    pub fn empty() -> Self {
        SearchResult::default()
    }

    /// Build a result from keys in relevance order.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<PrimaryKey>,
    {
        let hits: Vec<SearchHit> = keys.into_iter().map(SearchHit::new).collect();
        SearchResult {
            total: hits.len() as u64,
            hits,
            ..SearchResult::default()
        }
    }

    /// Set the total match count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    /// Set the facet results.
    pub fn with_facets(mut self, facets: FacetSet) -> Self {
        self.facets = facets;
        self
    }

    /// Set the spellcheck section.
    pub fn with_spellcheck(mut self, spellcheck: SpellcheckResult) -> Self {
        self.spellcheck = Some(spellcheck);
        self
    }

    /// Keys in relevance order.
    pub fn keys(&self) -> Vec<PrimaryKey> {
        self.hits.iter().map(|hit| hit.key.clone()).collect()
    }

    /// Whether no document was returned.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Best spellcheck collation, if any.
    pub fn collation(&self) -> Option<&Collation> {
        self.spellcheck.as_ref()?.collation()
    }
}
