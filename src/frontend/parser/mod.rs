use crate::frontend::span::{Pos, Span};
use crate::frontend::tree::*;
use pest::iterators::Pair;
use pest::Parser;

include!("program.rs");
include!("item.rs");
include!("expr.rs");
include!("util.rs");

#[derive(pest_derive::Parser)]
#[grammar = "./grammar/grammar.pest"]
pub struct GoParser;

/// Syntax error reported by the parser collaborator, with the byte span it refers to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn at(span: Span, message: impl Into<String>) -> Self {
        ParseError { message: message.into(), span }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        use pest::error::InputLocation;
        let span = match e.location {
            InputLocation::Pos(p) => Span { start: p, end: p },
            InputLocation::Span((start, end)) => Span { start, end },
        };
        let e = e.renamed_rules(rule_label);
        ParseError { message: e.variant.message().into_owned(), span }
    }
}

fn rule_label(rule: &Rule) -> String {
    match rule {
        Rule::top_line => "a declaration".into(),
        Rule::ident => "an identifier".into(),
        Rule::paren => "`(`".into(),
        Rule::brace => "`{`".into(),
        Rule::package_clause => "`package` clause".into(),
        Rule::EOI => "end of input".into(),
        other => format!("{:?}", other),
    }
}
