// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod constraint;
mod evaluator;

use crate::ast::{Ref, Term};
use crate::lexer::Source;
use crate::parser::Parser;

// Parse a single expression with the built-in functions.
pub fn term(text: &str) -> Ref<Term> {
    let source = Source::from_contents("<test>".to_string(), text.to_string())
        .unwrap_or_else(|e| panic!("{e}"));
    let mut parser = Parser::new(&source).unwrap_or_else(|e| panic!("{e}"));
    parser.parse_term().unwrap_or_else(|e| panic!("{e}"))
}
