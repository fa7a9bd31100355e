//! Faceting: specifications, their compilation into engine requests, and the
//! facet results attached to search responses.

pub mod compiler;
pub mod result;
pub mod spec;

pub use self::compiler::FacetCompiler;
pub use self::result::{FacetResult, FacetSet, FacetValueCount, PivotNode};
pub use self::spec::{FacetEntry, FacetRequest, FacetSpec, FacetSubQuery};
