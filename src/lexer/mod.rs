//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, dotted identifiers, numeric literals and operators
//! - Numeric base prefixes and width suffixes
//! - Newlines and `;` as explicit statement terminators
//! - `#` directives, collected separately from the tokens
//! - Line/column tracking for error reporting

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
