//! Single-owner builder for filter trees.

use crate::filter::node::{Binding, BooleanOp, FilterNode, PlaceholderMode};

/// Builds the top-level sequence of filter nodes.
///
/// Every method consumes and returns the builder. Nested groups are built by
/// a closure that receives a fresh builder and returns it once populated.
///
/// # Example
///
/// ```
/// use pike::filter::{FilterBuilder, FilterCompiler};
///
/// let filters = FilterBuilder::new()
///     .where_eq("category", "books")
///     .where_group(|g| g.where_eq("format", "paperback").or_where("format", "ebook"))
///     .where_range("price", "10", "20");
///
/// let compiled = FilterCompiler::new().compile(&filters.build()).unwrap();
/// assert_eq!(
///     compiled.query,
///     "(category:%L1% AND (format:%L2% OR format:%L3%) AND price:[%L4% TO %L5%])"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBuilder {
    nodes: Vec<FilterNode>,
    mode: PlaceholderMode,
}

impl FilterBuilder {
    /// Create an empty builder using literal placeholders.
    pub fn new() -> Self {
        FilterBuilder::default()
    }

    /// Set the placeholder mode used by `where_eq`, `or_where` and `where_in`.
    pub fn with_mode(mut self, mode: PlaceholderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append an already-built node.
    pub fn push(mut self, node: FilterNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Match `field` against `value`, joined with AND.
    pub fn where_eq<V: Into<Binding>>(self, field: &str, value: V) -> Self {
        let mode = self.mode;
        self.where_with(field, value, BooleanOp::And, mode)
    }

    /// Match `field` against `value`, joined with OR.
    pub fn or_where<V: Into<Binding>>(self, field: &str, value: V) -> Self {
        let mode = self.mode;
        self.where_with(field, value, BooleanOp::Or, mode)
    }

    /// Match `field` against `value` with an explicit operator and mode.
    pub fn where_with<V: Into<Binding>>(
        self,
        field: &str,
        value: V,
        boolean: BooleanOp,
        mode: PlaceholderMode,
    ) -> Self {
        self.push(FilterNode::field_equals(field, value, mode, boolean))
    }

    /// Match `field` against any of `values`, joined with AND.
    ///
    /// An empty value list adds nothing.
    pub fn where_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Binding>,
    {
        self.in_values(field, values, BooleanOp::And)
    }

    /// Match `field` against any of `values`, joined with OR.
    pub fn or_where_in<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Binding>,
    {
        self.in_values(field, values, BooleanOp::Or)
    }

    fn in_values<I, V>(self, field: &str, values: I, boolean: BooleanOp) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Binding>,
    {
        let bindings: Vec<Binding> = values.into_iter().map(Into::into).collect();
        if bindings.is_empty() {
            return self;
        }

        let alternatives: Vec<String> = (1..=bindings.len())
            .map(|i| format!("{}:{}", field, self.mode.token(i)))
            .collect();
        let template = format!("({})", alternatives.join(" OR "));
        self.push(FilterNode::leaf(template, bindings, boolean))
    }

    /// Match `field` within the inclusive range `[low TO high]`, joined with AND.
    ///
    /// Bounds are inserted literally so `*` can be used for open ranges.
    pub fn where_range<L: Into<Binding>, H: Into<Binding>>(self, field: &str, low: L, high: H) -> Self {
        self.range(field, low, high, BooleanOp::And)
    }

    /// Match `field` within the inclusive range `[low TO high]`, joined with OR.
    pub fn or_where_range<L: Into<Binding>, H: Into<Binding>>(
        self,
        field: &str,
        low: L,
        high: H,
    ) -> Self {
        self.range(field, low, high, BooleanOp::Or)
    }

    fn range<L: Into<Binding>, H: Into<Binding>>(
        self,
        field: &str,
        low: L,
        high: H,
        boolean: BooleanOp,
    ) -> Self {
        self.push(FilterNode::leaf(
            format!("{field}:[%L1% TO %L2%]"),
            vec![low.into(), high.into()],
            boolean,
        ))
    }

    /// Append a raw template whose placeholders are numbered from 1.
    pub fn where_template<S: Into<String>>(
        self,
        template: S,
        bindings: Vec<Binding>,
        boolean: BooleanOp,
    ) -> Self {
        self.push(FilterNode::leaf(template, bindings, boolean))
    }

    /// Append a nested group, joined with AND.
    pub fn where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(FilterBuilder) -> FilterBuilder,
    {
        self.group(build, BooleanOp::And)
    }

    /// Append a nested group, joined with OR.
    pub fn or_where_group<F>(self, build: F) -> Self
    where
        F: FnOnce(FilterBuilder) -> FilterBuilder,
    {
        self.group(build, BooleanOp::Or)
    }

    fn group<F>(self, build: F, boolean: BooleanOp) -> Self
    where
        F: FnOnce(FilterBuilder) -> FilterBuilder,
    {
        let nested = build(FilterBuilder::new().with_mode(self.mode));
        self.push(FilterNode::group(nested.nodes, boolean))
    }

    /// Top-level nodes added so far.
    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    /// Whether no node has been added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finish building; the top-level sequence becomes the root group.
    pub fn build(self) -> FilterNode {
        FilterNode::group(self.nodes, BooleanOp::And)
    }
}
