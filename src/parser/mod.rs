//! Parser module for building the syntax tree of a source file.
//!
//! This module contains the parser that transforms a stream of tokens
//! into a [`ModuleAst`](crate::ast::items::ModuleAst). It uses a Pratt parser
//! for expressions with proper operator precedence and handles:
//!
//! - Item parsing (functions, imports, globals, structs, submodules)
//! - Statement parsing (declarations, assignments, control flow)
//! - Expression parsing into postfix token sequences
//! - Type annotations
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod items;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
