//! Boolean predicate tree used to express filter queries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Boolean operator joining a node to the expression accumulated before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BooleanOp {
    /// Both sides must match.
    #[default]
    And,
    /// Either side may match.
    Or,
}

impl BooleanOp {
    /// The operator as written in the filter query language.
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a bound value is rendered when its placeholder is substituted.
///
/// The mode is the letter in a `%<mode><index>%` placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaceholderMode {
    /// Inserted verbatim.
    #[default]
    Literal,
    /// Query syntax characters are backslash-escaped.
    Term,
    /// Wrapped in double quotes with quotes and backslashes escaped.
    Phrase,
    /// Rendered as a UTC timestamp (`YYYY-MM-DDThh:mm:ssZ`).
    Date,
}

impl PlaceholderMode {
    /// Single-letter code used inside placeholder tokens.
    pub fn code(&self) -> char {
        match self {
            PlaceholderMode::Literal => 'L',
            PlaceholderMode::Term => 'T',
            PlaceholderMode::Phrase => 'P',
            PlaceholderMode::Date => 'D',
        }
    }

    /// Parse a placeholder mode letter (case-insensitive).
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'L' => Some(PlaceholderMode::Literal),
            'T' => Some(PlaceholderMode::Term),
            'P' => Some(PlaceholderMode::Phrase),
            'D' => Some(PlaceholderMode::Date),
            _ => None,
        }
    }

    /// Render the placeholder token for a 1-based binding index.
    pub fn token(&self, index: usize) -> String {
        format!("%{}{}%", self.code(), index)
    }
}

/// A scalar value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// DateTime value
    DateTime(DateTime<Utc>),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Text(s) => f.write_str(s),
            Binding::Integer(i) => write!(f, "{i}"),
            Binding::Float(v) => write!(f, "{v}"),
            Binding::Boolean(b) => write!(f, "{b}"),
            Binding::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
        }
    }
}

impl From<&str> for Binding {
    fn from(value: &str) -> Self {
        Binding::Text(value.to_string())
    }
}

impl From<String> for Binding {
    fn from(value: String) -> Self {
        Binding::Text(value)
    }
}

impl From<i64> for Binding {
    fn from(value: i64) -> Self {
        Binding::Integer(value)
    }
}

impl From<i32> for Binding {
    fn from(value: i32) -> Self {
        Binding::Integer(value as i64)
    }
}

impl From<u32> for Binding {
    fn from(value: u32) -> Self {
        Binding::Integer(value as i64)
    }
}

impl From<f64> for Binding {
    fn from(value: f64) -> Self {
        Binding::Float(value)
    }
}

impl From<bool> for Binding {
    fn from(value: bool) -> Self {
        Binding::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Binding {
    fn from(value: DateTime<Utc>) -> Self {
        Binding::DateTime(value)
    }
}

/// A node of the filter tree.
///
/// The `boolean` of the first node in a sequence is never rendered: nothing
/// precedes it. Every later node is joined to the expression accumulated so
/// far with its own operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterNode {
    /// A single predicate with local placeholders `%M1%..%Mn%`.
    Leaf {
        /// Predicate text containing placeholder tokens.
        template: String,
        /// Values bound to the template's placeholders, in index order.
        bindings: Vec<Binding>,
        /// Operator joining this node to its predecessors.
        boolean: BooleanOp,
    },
    /// A parenthesised sequence of nodes.
    Group {
        /// Child nodes in evaluation order.
        children: Vec<FilterNode>,
        /// Operator joining this group to its predecessors.
        boolean: BooleanOp,
    },
}

impl FilterNode {
    /// Create a leaf from a template and its bindings.
    pub fn leaf<S: Into<String>>(template: S, bindings: Vec<Binding>, boolean: BooleanOp) -> Self {
        FilterNode::Leaf {
            template: template.into(),
            bindings,
            boolean,
        }
    }

    /// Create a leaf matching `field` against one bound value.
    pub fn field_equals<V: Into<Binding>>(
        field: &str,
        value: V,
        mode: PlaceholderMode,
        boolean: BooleanOp,
    ) -> Self {
        FilterNode::leaf(
            format!("{}:{}", field, mode.token(1)),
            vec![value.into()],
            boolean,
        )
    }

    /// Create a group from child nodes.
    pub fn group(children: Vec<FilterNode>, boolean: BooleanOp) -> Self {
        FilterNode::Group { children, boolean }
    }

    /// Operator joining this node to its predecessors.
    pub fn boolean(&self) -> BooleanOp {
        match self {
            FilterNode::Leaf { boolean, .. } | FilterNode::Group { boolean, .. } => *boolean,
        }
    }

    /// Total number of bindings in this subtree.
    pub fn binding_count(&self) -> usize {
        match self {
            FilterNode::Leaf { bindings, .. } => bindings.len(),
            FilterNode::Group { children, .. } => {
                children.iter().map(FilterNode::binding_count).sum()
            }
        }
    }

    /// Whether this subtree renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterNode::Leaf { template, .. } => template.trim().is_empty(),
            FilterNode::Group { children, .. } => children.iter().all(FilterNode::is_empty),
        }
    }
}
