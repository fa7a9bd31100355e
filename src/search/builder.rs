//! Fluent builder describing one search.

use std::collections::BTreeMap;

use crate::facet::FacetSpec;
use crate::filter::{Binding, BooleanOp, FilterBuilder, PlaceholderMode};
use crate::relevance::BoostSpec;
use crate::search::request::{SortDirection, SortField, SpellcheckOptions};

/// Describes a single search: query text, filters, facets, relevance hints,
/// pagination, sorting and spellcheck behaviour.
///
/// A builder is created per search, consumed by
/// [`SearchExecutor`](crate::search::SearchExecutor), and then dropped.
///
/// # Example
///
/// ```
/// use pike::search::{QueryBuilder, SortDirection};
///
/// let builder = QueryBuilder::new("laptop")
///     .where_eq("in_stock", true)
///     .where_range("price", 500, 1500)
///     .facet_field("brand")
///     .boost_field("title", 2.0)
///     .order_by("price", SortDirection::Asc)
///     .take(20);
///
/// assert_eq!(builder.query_text(), "laptop");
/// assert!(builder.is_dismax());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    text: String,
    terms: Vec<(String, String)>,
    filters: FilterBuilder,
    facets: Vec<FacetSpec>,
    facet_options: BTreeMap<String, serde_json::Value>,
    boosts: BoostSpec,
    use_dismax: bool,
    start: Option<usize>,
    rows: Option<usize>,
    sort: Vec<SortField>,
    spellcheck: SpellcheckOptions,
    endpoint: Option<String>,
    type_tag: Option<String>,
}

impl QueryBuilder {
    /// Create a builder for free query text (may be empty).
    pub fn new<S: Into<String>>(text: S) -> Self {
        QueryBuilder {
            text: text.into(),
            ..QueryBuilder::default()
        }
    }

    /// Add a `field:value` term to the query text.
    pub fn match_field<F: Into<String>, V: Into<String>>(mut self, field: F, value: V) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    /// Rendered query text: the free text followed by the field terms.
    pub fn query_text(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.terms.len() + 1);
        let text = self.text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
        parts.extend(
            self.terms
                .iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(field, value)| format!("{field}:{value}")),
        );
        parts.join(" ")
    }

    /// Replace the whole query text, dropping field terms.
    pub fn with_query_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self.terms.clear();
        self
    }

    /// Edit the filter builder in place.
    pub fn filter<F>(mut self, edit: F) -> Self
    where
        F: FnOnce(FilterBuilder) -> FilterBuilder,
    {
        self.filters = edit(std::mem::take(&mut self.filters));
        self
    }

    /// Set the default placeholder mode of simple filters.
    pub fn filter_mode(self, mode: PlaceholderMode) -> Self {
        self.filter(|f| f.with_mode(mode))
    }

    /// Filter on `field` matching `value`, joined with AND.
    pub fn where_eq<V: Into<Binding>>(self, field: &str, value: V) -> Self {
        self.filter(|f| f.where_eq(field, value))
    }

    /// Filter on `field` matching `value`, joined with OR.
    pub fn or_where<V: Into<Binding>>(self, field: &str, value: V) -> Self {
        self.filter(|f| f.or_where(field, value))
    }

    /// Filter on `field` matching any of `values`.
    pub fn where_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Binding>,
    {
        self.filter(|f| f.where_in(field, values))
    }

    /// Filter on `field` within `[low TO high]`.
    pub fn where_range<L: Into<Binding>, H: Into<Binding>>(self, field: &str, low: L, high: H) -> Self {
        self.filter(|f| f.where_range(field, low, high))
    }

    /// Filter with a raw placeholder template.
    pub fn where_template<S: Into<String>>(
        self,
        template: S,
        bindings: Vec<Binding>,
        boolean: BooleanOp,
    ) -> Self {
        self.filter(|f| f.where_template(template, bindings, boolean))
    }

    /// Add a nested filter group, joined with AND.
    pub fn where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(FilterBuilder) -> FilterBuilder,
    {
        self.filter(|f| f.where_group(build))
    }

    /// Add a nested filter group, joined with OR.
    pub fn or_where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(FilterBuilder) -> FilterBuilder,
    {
        self.filter(|f| f.or_where_group(build))
    }

    /// Facet on the values of `field`.
    pub fn facet_field<S: Into<String>>(mut self, field: S) -> Self {
        self.facets.push(FacetSpec::field(field));
        self
    }

    /// Add a facet query on `field`; repeated calls for one field form a
    /// multi-query facet.
    pub fn facet_query<F: Into<String>, Q: Into<String>>(mut self, field: F, query: Q) -> Self {
        let field = field.into();
        let query = query.into();

        let existing = self.facets.iter_mut().find_map(|spec| match spec {
            FacetSpec::Query { field: f, queries } if *f == field => Some(queries),
            _ => None,
        });
        match existing {
            Some(queries) => queries.push(query),
            None => self.facets.push(FacetSpec::Query {
                field,
                queries: vec![query],
            }),
        }
        self
    }

    /// Facet on a pivot of `fields`.
    pub fn facet_pivot<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets.push(FacetSpec::pivot(fields));
        self
    }

    /// Set an engine facet option, passed through verbatim.
    pub fn facet_option<S: Into<String>, V: Into<serde_json::Value>>(mut self, option: S, value: V) -> Self {
        self.facet_options.insert(option.into(), value.into());
        self
    }

    /// Weight matches in `field`; switches the search to dismax scoring.
    pub fn boost_field<S: Into<String>>(mut self, field: S, weight: f32) -> Self {
        self.use_dismax = true;
        self.boosts.set(field, weight);
        self
    }

    /// Request dismax scoring without boosts.
    pub fn use_dismax(mut self) -> Self {
        self.use_dismax = true;
        self
    }

    /// Skip the first `start` results.
    pub fn skip(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    /// Return at most `rows` results.
    pub fn take(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Add a sort clause.
    pub fn order_by<S: Into<String>>(mut self, field: S, direction: SortDirection) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            direction,
        });
        self
    }

    /// Ask for spelling suggestions.
    pub fn spellcheck(mut self) -> Self {
        self.spellcheck.enabled = true;
        self
    }

    /// Ask for collations alongside suggestions.
    pub fn spellcheck_collate(mut self) -> Self {
        self.spellcheck.enabled = true;
        self.spellcheck.collate = true;
        self
    }

    /// Re-run the search once with the best collation when one is returned.
    pub fn spellcheck_auto_retry(mut self) -> Self {
        self.spellcheck.enabled = true;
        self.spellcheck.collate = true;
        self.spellcheck.auto_retry = true;
        self
    }

    /// Query a specific endpoint instead of the configured default.
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Restrict reconciliation to records of one type.
    pub fn for_type<S: Into<String>>(mut self, type_tag: S) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    /// Filter builder.
    pub fn filters(&self) -> &FilterBuilder {
        &self.filters
    }

    /// Facet specs in request order.
    pub fn facets(&self) -> &[FacetSpec] {
        &self.facets
    }

    /// Facet options.
    pub fn facet_options(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.facet_options
    }

    /// Field boosts.
    pub fn boosts(&self) -> &BoostSpec {
        &self.boosts
    }

    /// Whether dismax scoring was requested explicitly or through a boost.
    pub fn is_dismax(&self) -> bool {
        self.use_dismax
    }

    /// Explicit start offset.
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    /// Explicit row limit.
    pub fn rows(&self) -> Option<usize> {
        self.rows
    }

    /// Sort clauses.
    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    /// Spellcheck options.
    pub fn spellcheck_options(&self) -> SpellcheckOptions {
        self.spellcheck
    }

    /// Requested endpoint.
    pub fn endpoint_name(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Requested type tag.
    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }
}
