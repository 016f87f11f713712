#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod passes;
pub mod resolver;
pub mod type_checker;

extern crate regex;

/// A 1-based line/column location inside a named source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(line: u32, column: u32, file: Rc<String>) -> Self {
        Position { line, column, file }
    }

    pub fn null() -> Self {
        Position::new(0, 0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn at(position: Position) -> Self {
        Span {
            start: position.clone(),
            end: position,
        }
    }

    pub fn null() -> Self {
        Span::at(Position::null())
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }
}

pub fn get_line_at_position(content: &str, line: u32) -> Option<String> {
    if line == 0 {
        return None;
    }

    content
        .split_inclusive('\n')
        .nth(line as usize - 1)
        .map(|text| text.trim_end_matches(['\n', '\r']).to_string())
}

pub fn display_error(error: &Error, source: &str) -> String {
    /*
        Error: message
        -> final.eb
           |
        20 | x := #
           | -----^
    */

    let position = error.get_position();
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_message()
        ));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!(
        "-> {}:{}:{}\n",
        position.file, position.line, position.column
    ));

    let Some(line_text) = get_line_at_position(source, position.line) else {
        return out;
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ' || *c == '\t').count();

    (String::from(&string[start..]), start)
}
