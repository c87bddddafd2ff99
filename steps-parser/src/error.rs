//! The parse error kinds, each reported with the offending character offset.

use crate::tokenizer::TokenKind;
use ariadne::{Fmt, Label, Report, ReportKind};
use std::ops::Range;
use steps_error::{ErrorKind, EXPR};

/// Builds a report with one label per span, in the house style shared by every kind below.
fn build<'a>(
    src_id: &'a str,
    spans: &[Range<usize>],
    message: String,
    labels: Vec<String>,
    help: Option<String>,
) -> Report<'a, (&'a str, Range<usize>)> {
    let mut builder =
        Report::build(ReportKind::Error, src_id, spans.first().map_or(0, |span| span.start))
            .with_message(message)
            .with_labels(labels.into_iter().enumerate().map(|(i, text)| {
                let mut label =
                    Label::new((src_id, spans.get(i).cloned().unwrap_or(0..0))).with_color(EXPR);
                if !text.is_empty() {
                    label = label.with_message(text);
                }
                label
            }));
    if let Some(help) = help {
        builder.set_help(help);
    }
    builder.finish()
}

/// The input contained no expression at all.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyInput;

impl ErrorKind for EmptyInput {
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<'a, (&'a str, Range<usize>)> {
        build(
            src_id,
            spans,
            "empty input".to_string(),
            vec![format!("expected an {} here", "expression".fg(EXPR))],
            None,
        )
    }
}

/// A token appeared somewhere the grammar cannot place it. `found` is [`None`] when the input
/// ended instead.
#[derive(Debug, Clone, PartialEq)]
pub struct UnexpectedToken {
    /// The token that was found, or [`None`] at the end of the input.
    pub found: Option<TokenKind>,
}

impl ErrorKind for UnexpectedToken {
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<'a, (&'a str, Range<usize>)> {
        let message = match self.found {
            Some(_) => "unexpected token".to_string(),
            None => "unexpected end of input".to_string(),
        };
        build(
            src_id,
            spans,
            message,
            vec![format!("I could not understand the {} here", "expression".fg(EXPR))],
            self.found.map(|found| format!("found {found:?}")),
        )
    }
}

/// A parenthesis with no partner.
#[derive(Debug, Clone, PartialEq)]
pub struct UnbalancedParentheses {
    /// Whether the unmatched parenthesis was an opening `(`. Otherwise, it was a closing `)`.
    pub opening: bool,
}

impl ErrorKind for UnbalancedParentheses {
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<'a, (&'a str, Range<usize>)> {
        build(
            src_id,
            spans,
            "unbalanced parentheses".to_string(),
            vec![if self.opening {
                "this parenthesis is not closed".to_string()
            } else {
                "this parenthesis has no match".to_string()
            }],
            Some(if self.opening {
                "add a closing parenthesis `)` somewhere after this".to_string()
            } else {
                "add an opening parenthesis `(` somewhere before this".to_string()
            }),
        )
    }
}

/// An identifier was called like a function, but no function goes by that name.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownFunction {
    /// The name that was called.
    pub name: String,
}

impl ErrorKind for UnknownFunction {
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<'a, (&'a str, Range<usize>)> {
        build(
            src_id,
            spans,
            format!("unknown function: `{}`", self.name),
            vec!["this is not a known function".to_string()],
            Some(format!("the known functions are: {}", "abs, sgn".fg(EXPR))),
        )
    }
}
