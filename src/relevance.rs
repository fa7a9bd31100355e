//! Relevance parser selection and field boosts.
//!
//! Free text containing a wildcard is handed to the extended dismax parser,
//! boosted (or explicitly dismax) searches to dismax, and everything else to
//! the standard field-qualified parser.

use serde::{Deserialize, Serialize};

use crate::error::{PikeError, Result};

/// Query that matches every document.
pub const MATCH_ALL: &str = "*:*";

/// Query parser used to score the main query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelevanceMode {
    /// Strict field-qualified parser.
    #[default]
    Standard,
    /// Disjunction max parser over weighted fields.
    Dismax,
    /// Extended dismax, which also understands wildcards and full syntax.
    ExtendedDismax,
}

impl RelevanceMode {
    /// Value of the engine's `defType` parameter, if any.
    pub fn def_type(&self) -> Option<&'static str> {
        match self {
            RelevanceMode::Standard => None,
            RelevanceMode::Dismax => Some("dismax"),
            RelevanceMode::ExtendedDismax => Some("edismax"),
        }
    }

    /// Whether this mode scores against weighted fields.
    pub fn is_dismax(&self) -> bool {
        !matches!(self, RelevanceMode::Standard)
    }
}

/// Ordered field weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoostSpec {
    boosts: Vec<(String, f32)>,
}

impl BoostSpec {
    /// Create an empty boost spec.
    pub fn new() -> Self {
        BoostSpec::default()
    }

    /// Set the weight of a field, replacing an earlier weight for it.
    pub fn set<S: Into<String>>(&mut self, field: S, weight: f32) {
        let field = field.into();
        match self.boosts.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = weight,
            None => self.boosts.push((field, weight)),
        }
    }

    /// Weight of a field, if set.
    pub fn get(&self, field: &str) -> Option<f32> {
        self.boosts
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, weight)| *weight)
    }

    /// Whether no boost has been set.
    pub fn is_empty(&self) -> bool {
        self.boosts.is_empty()
    }

    /// Iterate over `(field, weight)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.boosts.iter().map(|(field, weight)| (field.as_str(), *weight))
    }

    /// Reject weights that are not finite and positive.
    pub fn validate(&self) -> Result<()> {
        for (field, weight) in &self.boosts {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(PikeError::query(format!(
                    "boost for field '{field}' must be a positive number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    /// Render as the engine's query-fields list, e.g. `title^2 body^0.5`.
    pub fn query_fields(&self) -> String {
        self.boosts
            .iter()
            .map(|(field, weight)| format!("{field}^{weight}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Relevance-related request parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceParams {
    /// Selected parser.
    pub mode: RelevanceMode,
    /// Weighted query fields, only set for dismax modes with boosts.
    pub query_fields: Option<String>,
    /// Alternative query used when the main query is empty.
    pub query_alternative: Option<String>,
}

/// Chooses the relevance mode for a query.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceModeSelector;

impl RelevanceModeSelector {
    /// Create a new selector.
    pub fn new() -> Self {
        RelevanceModeSelector
    }

    /// Select the parser for `query_text`.
    pub fn select(&self, query_text: &str, boosts: &BoostSpec, force_dismax: bool) -> RelevanceMode {
        if has_wildcard(query_text) {
            RelevanceMode::ExtendedDismax
        } else if force_dismax || !boosts.is_empty() {
            RelevanceMode::Dismax
        } else {
            RelevanceMode::Standard
        }
    }

    /// Select the parser and assemble the parameters that go with it.
    ///
    /// A dismax-family query with empty text gets the match-all alternative
    /// query so the engine returns the whole corpus instead of nothing.
    pub fn params(
        &self,
        query_text: &str,
        boosts: &BoostSpec,
        force_dismax: bool,
    ) -> Result<RelevanceParams> {
        boosts.validate()?;

        let mode = self.select(query_text, boosts, force_dismax);
        if !mode.is_dismax() {
            return Ok(RelevanceParams::default());
        }

        Ok(RelevanceParams {
            mode,
            query_fields: (!boosts.is_empty()).then(|| boosts.query_fields()),
            query_alternative: query_text
                .trim()
                .is_empty()
                .then(|| MATCH_ALL.to_string()),
        })
    }
}

/// Whether the text contains an unescaped `*` or `?`.
pub fn has_wildcard(text: &str) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boosted() -> BoostSpec {
        let mut boosts = BoostSpec::new();
        boosts.set("title", 2.0);
        boosts
    }

    #[test]
    fn test_mode_selection() {
        let selector = RelevanceModeSelector::new();

        assert_eq!(
            selector.select("bas*ball", &BoostSpec::new(), false),
            RelevanceMode::ExtendedDismax
        );
        assert_eq!(
            selector.select("baseball", &boosted(), false),
            RelevanceMode::Dismax
        );
        assert_eq!(
            selector.select("baseball", &BoostSpec::new(), false),
            RelevanceMode::Standard
        );
        assert_eq!(
            selector.select("baseball", &BoostSpec::new(), true),
            RelevanceMode::Dismax
        );
        assert_eq!(
            selector.select("bas*ball", &boosted(), true),
            RelevanceMode::ExtendedDismax
        );
    }

    #[test]
    fn test_escaped_wildcard_is_literal() {
        assert!(!has_wildcard("what\\?"));
        assert!(has_wildcard("wh?t"));
        assert!(!has_wildcard(""));
    }

    #[test]
    fn test_empty_dismax_query_gets_match_all() {
        let params = RelevanceModeSelector::new()
            .params("", &boosted(), false)
            .unwrap();

        assert_eq!(params.mode, RelevanceMode::Dismax);
        assert_eq!(params.query_fields.as_deref(), Some("title^2"));
        assert_eq!(params.query_alternative.as_deref(), Some(MATCH_ALL));

        let params = RelevanceModeSelector::new()
            .params("", &BoostSpec::new(), false)
            .unwrap();
        assert_eq!(params, RelevanceParams::default());
    }

    #[test]
    fn test_boost_ordering_and_replacement() {
        let mut boosts = BoostSpec::new();
        boosts.set("title", 3.0);
        boosts.set("body", 0.5);
        boosts.set("title", 1.5);

        assert_eq!(boosts.query_fields(), "title^1.5 body^0.5");
        assert_eq!(boosts.get("body"), Some(0.5));
    }

    #[test]
    fn test_invalid_boost_is_rejected() {
        let mut boosts = BoostSpec::new();
        boosts.set("title", 0.0);

        let result = RelevanceModeSelector::new().params("q", &boosts, false);
        assert!(matches!(result, Err(PikeError::Query(_))));
    }
}
