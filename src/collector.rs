//! Collector - walks a parsed stylesheet and gathers the text worth inspecting

use crate::parser::{NodeKind, Position, StyleNode, Stylesheet};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("Malformed stylesheet tree: {kind} at line {line}, column {column}: {reason}")]
    MalformedTree {
        kind: &'static str,
        line: usize,
        column: usize,
        reason: &'static str,
    },
}

/// A top-level comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub text: String,
    pub position: Position,
}

/// The selector group of one rule, selectors joined with a single space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorNode {
    pub selector_text: String,
    pub position: Position,
}

/// One declaration, flattened out of its rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationNode {
    pub property: String,
    pub value: String,
    pub position: Position,
}

/// Everything a stylesheet contributes for inspection.
///
/// No list ever holds two structurally equal nodes; the first occurrence
/// wins and insertion order is otherwise preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTexts {
    pub comments: Vec<CommentNode>,
    pub selectors: Vec<SelectorNode>,
    pub declarations: Vec<DeclarationNode>,
}

impl CodeTexts {
    /// Add a comment unless an equal one is already present
    pub fn add_comment(&mut self, node: CommentNode) -> bool {
        insert_unique(&mut self.comments, node)
    }

    /// Add a selector unless an equal one is already present
    pub fn add_selector(&mut self, node: SelectorNode) -> bool {
        insert_unique(&mut self.selectors, node)
    }

    /// Add a declaration unless an equal one is already present
    pub fn add_declaration(&mut self, node: DeclarationNode) -> bool {
        insert_unique(&mut self.declarations, node)
    }

    pub fn len(&self) -> usize {
        self.comments.len() + self.selectors.len() + self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Push `item` unless the list already holds an equal value.
/// Returns whether it was added.
fn insert_unique<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    if list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}

/// Label for declarations nested in a rule block in `MalformedTree` errors
const DECLARATION_KIND: &str = "declaration";

fn check_position(kind: &'static str, position: Position) -> Result<(), CollectError> {
    if position.line == 0 || position.column == 0 {
        return Err(CollectError::MalformedTree {
            kind,
            line: position.line,
            column: position.column,
            reason: "positions are 1-based",
        });
    }
    Ok(())
}

/// Gather comments, selectors and declarations from the top level of a stylesheet.
///
/// At-rules are skipped, as are comments inside rule blocks.
pub fn collect(stylesheet: &Stylesheet) -> Result<CodeTexts, CollectError> {
    let mut texts = CodeTexts::default();

    for node in &stylesheet.rules {
        match node {
            StyleNode::Comment(comment) => {
                check_position(NodeKind::Comment.as_str(), comment.position)?;
                texts.add_comment(CommentNode {
                    text: comment.text.clone(),
                    position: comment.position,
                });
            }
            StyleNode::Rule(rule) => {
                check_position(NodeKind::Rule.as_str(), rule.position)?;
                if rule.selectors.is_empty() {
                    return Err(CollectError::MalformedTree {
                        kind: NodeKind::Rule.as_str(),
                        line: rule.position.line,
                        column: rule.position.column,
                        reason: "rule has no selectors",
                    });
                }

                texts.add_selector(SelectorNode {
                    selector_text: rule.selectors.join(" "),
                    position: rule.position,
                });

                for declaration in rule.declarations() {
                    check_position(DECLARATION_KIND, declaration.position)?;
                    texts.add_declaration(DeclarationNode {
                        property: declaration.property.clone(),
                        value: declaration.value.clone(),
                        position: declaration.position,
                    });
                }
            }
            StyleNode::AtRule(_) => {}
        }
    }

    debug!(
        "Collected {} comments, {} selectors, {} declarations",
        texts.comments.len(),
        texts.selectors.len(),
        texts.declarations.len()
    );

    Ok(texts)
}
