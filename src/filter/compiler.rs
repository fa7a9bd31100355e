//! Compiles a [`FilterNode`] tree into a filter query string.
//!
//! Compilation is a depth-first, left-to-right walk. Each leaf's local
//! placeholders (`%M1%..%Mn%`) are renumbered into the next free global range
//! and its bindings are appended to one flat binding list, so the rendered
//! string always references `1..=N` with `N` the total number of bindings.

use std::collections::BTreeSet;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{PikeError, Result};
use crate::filter::binding::{PLACEHOLDER, parse_placeholder};
use crate::filter::node::{Binding, FilterNode};

/// Output of a compile pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledFilter {
    /// Rendered filter query with globally numbered placeholders.
    pub query: String,
    /// Bound values; `bindings[i]` belongs to placeholder index `i + 1`.
    pub bindings: Vec<Binding>,
    /// Number of placeholder indices allocated; the next binding gets `next_index + 1`.
    pub next_index: usize,
}

impl CompiledFilter {
    /// Whether the tree rendered to nothing; no filter clause should be sent.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}

/// Running state of a single compile pass.
#[derive(Debug)]
struct CompileState {
    bindings: Vec<Binding>,
    next_index: usize,
}

/// Renders filter trees into the engine's boolean filter syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCompiler;

impl FilterCompiler {
    /// Create a new compiler.
    pub fn new() -> Self {
        FilterCompiler
    }

    /// Compile a tree with placeholder numbering starting at 1.
    pub fn compile(&self, node: &FilterNode) -> Result<CompiledFilter> {
        self.compile_from(node, 0)
    }

    /// Compile a sequence of top-level nodes as one implicit group.
    pub fn compile_all(&self, nodes: &[FilterNode]) -> Result<CompiledFilter> {
        let mut state = CompileState {
            bindings: Vec::new(),
            next_index: 0,
        };
        let query = self.render_group(nodes, &mut state)?;
        Ok(self.finish(query, state))
    }

    /// Compile a tree whose first placeholder will be `next_index + 1`.
    ///
    /// The returned bindings only cover this tree; callers concatenating
    /// several passes append them in order.
    pub fn compile_from(&self, node: &FilterNode, next_index: usize) -> Result<CompiledFilter> {
        let mut state = CompileState {
            bindings: Vec::new(),
            next_index,
        };

        let query = match node {
            FilterNode::Leaf { .. } => {
                let body = self.render(node, &mut state)?;
                if body.is_empty() {
                    body
                } else {
                    format!("({body})")
                }
            }
            FilterNode::Group { children, .. } => self.render_group(children, &mut state)?,
        };

        Ok(self.finish(query, state))
    }

    fn finish(&self, query: String, state: CompileState) -> CompiledFilter {
        trace!(
            "compiled filter '{}' with {} bindings",
            query,
            state.bindings.len()
        );
        CompiledFilter {
            query,
            bindings: state.bindings,
            next_index: state.next_index,
        }
    }

    fn render(&self, node: &FilterNode, state: &mut CompileState) -> Result<String> {
        match node {
            FilterNode::Leaf {
                template, bindings, ..
            } => self.render_leaf(template, bindings, state),
            FilterNode::Group { children, .. } => self.render_group(children, state),
        }
    }

    fn render_group(&self, children: &[FilterNode], state: &mut CompileState) -> Result<String> {
        let mut body = String::new();

        for child in children {
            let rendered = self.render(child, state)?;
            if rendered.is_empty() {
                continue;
            }
            if !body.is_empty() {
                body.push(' ');
                body.push_str(child.boolean().as_str());
                body.push(' ');
            }
            body.push_str(&rendered);
        }

        if body.is_empty() {
            Ok(body)
        } else {
            Ok(format!("({body})"))
        }
    }

    fn render_leaf(
        &self,
        template: &str,
        bindings: &[Binding],
        state: &mut CompileState,
    ) -> Result<String> {
        let template = template.trim();
        if template.is_empty() {
            if !bindings.is_empty() {
                return Err(PikeError::query(format!(
                    "empty filter template with {} bindings",
                    bindings.len()
                )));
            }
            return Ok(String::new());
        }

        let offset = state.next_index;
        let mut referenced = BTreeSet::new();
        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let placeholder = parse_placeholder(&caps)?;
            if placeholder.index > bindings.len() {
                return Err(PikeError::query(format!(
                    "placeholder '{}' in '{}' has no bound value ({} bindings supplied)",
                    whole.as_str(),
                    template,
                    bindings.len()
                )));
            }
            referenced.insert(placeholder.index);

            rendered.push_str(&template[last..whole.start()]);
            rendered.push_str(&placeholder.mode.token(offset + placeholder.index));
            last = whole.end();
        }
        rendered.push_str(&template[last..]);

        if referenced.len() != bindings.len() {
            return Err(PikeError::query(format!(
                "filter '{}' binds {} values but references {}",
                template,
                bindings.len(),
                referenced.len()
            )));
        }

        state.bindings.extend(bindings.iter().cloned());
        state.next_index += bindings.len();

        Ok(rendered)
    }
}
