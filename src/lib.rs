//! # WBS - Web Building Script front-end
//!
//! WBS is a small domain-specific language for generating web artifacts.
//! This crate is the compiler front-end the WBS editor and emitters build
//! on: it turns source text into a forest of phrase nodes plus a list of
//! positioned diagnostics.
//!
//! ## Overview
//!
//! The pipeline is strictly linear:
//!
//! ```text
//! source text → lexeme stream → classified token stream → phrase tree + diagnostics
//! ```
//!
//! The interesting part is the tree builder: there is no grammar table.
//! Tokens are classified one at a time against the evolving tree and spliced
//! into it with local rewrites — operator fusion (`<` + `=` becomes `≤`),
//! gobble-up restructuring for infix operators, bracket matching across
//! ancestors, and trailing-comma cleanup on list closure.
//!
//! ## Quick Start
//!
//! ```rust
//! use wbs::{parse, build_tree};
//!
//! let lexemes = parse("const x = 3");
//! let (tree, errors) = build_tree(&lexemes);
//!
//! assert!(errors.is_empty());
//! let root = tree.root().unwrap();
//! assert_eq!(tree.token(root).to_string(), "CONST:const");
//! ```
//!
//! ## Modules
//!
//! - [`lexer`]: Source text to positioned lexemes
//! - [`token`]: Token kinds, classification, arity and acceptance tables
//! - [`tree`]: The phrase-tree arena and its mutation primitives
//! - [`builder`]: The incremental tree builder
//! - [`error`]: Positioned syntax diagnostics
//! - [`treeview`]: Heap-index arithmetic for the debug tree view
//!
//! ## Error handling
//!
//! The front-end is total. The lexer cannot fail; the builder records
//! malformed input as [`SyntaxError`] values and keeps going, so the result
//! is always a tree — possibly with unknown leaves and incomplete phrases
//! that consumers must tolerate.

#![doc(html_root_url = "https://docs.rs/wbs/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod error;
pub mod lexer;
pub mod token;
pub mod tree;
pub mod treeview;

// Re-exports for convenience
pub use builder::TreeBuilder;
pub use error::{SyntaxError, SyntaxErrorKind};
pub use lexer::{Lexeme, Lexer};
pub use token::{classify_literal, ClassifyContext, Dialect, Token, TokenKind};
pub use tree::{NodeId, PhraseTree};

/// Runs the lexer alone: source text to positioned lexemes.
///
/// Kept separate from tree building so the editor's debug view can show the
/// raw lexeme stream.
///
/// # Example
///
/// ```rust
/// use wbs::parse;
///
/// let lexemes = parse("open /index.html");
/// let values: Vec<&str> = lexemes.iter().map(|l| l.value.as_str()).collect();
/// assert_eq!(values, ["open", "/", "index.html"]);
/// ```
pub fn parse(source: &str) -> Vec<Lexeme> {
    Lexer::new(source).tokenize()
}

/// Builds the phrase tree from a lexeme stream, under the default
/// [`Dialect`].
///
/// Always returns a tree; problems come back as diagnostics in source
/// order.
pub fn build_tree(lexemes: &[Lexeme]) -> (PhraseTree, Vec<SyntaxError>) {
    TreeBuilder::new().build(lexemes)
}

/// Lexes and builds in one call.
///
/// # Example
///
/// ```rust
/// use wbs::parse_and_build;
///
/// let (tree, errors) = parse_and_build("colorset r = 1 g = 2 b = 3");
/// assert!(errors.is_empty());
/// assert_eq!(tree.children_count(tree.root().unwrap()), 3);
/// ```
pub fn parse_and_build(source: &str) -> (PhraseTree, Vec<SyntaxError>) {
    build_tree(&parse(source))
}
