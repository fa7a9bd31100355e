//! Filter queries: the boolean predicate tree, its builder, the compiler that
//! renders it with globally numbered placeholders, and safe value binding.

pub mod binding;
pub mod builder;
pub mod compiler;
pub mod node;

pub use self::binding::{Placeholder, assemble, escape_phrase, escape_term, placeholders};
pub use self::builder::FilterBuilder;
pub use self::compiler::{CompiledFilter, FilterCompiler};
pub use self::node::{Binding, BooleanOp, FilterNode, PlaceholderMode};
