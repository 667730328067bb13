//! Error types for markup parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Span;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed markup: {message}")]
    Malformed { span: Span, message: String },

    #[error("mismatched close tag </{found}>, expected </{expected}>")]
    MismatchedClose {
        span: Span,
        found: String,
        expected: String,
    },

    #[error("close tag </{name}> without a matching open tag")]
    UnmatchedClose { span: Span, name: String },

    #[error("unclosed element <{name}>")]
    UnclosedElement { span: Span, name: String },
}

impl ParseError {
    /// Byte range of the offending token in the source text.
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Malformed { span, .. }
            | ParseError::MismatchedClose { span, .. }
            | ParseError::UnmatchedClose { span, .. }
            | ParseError::UnclosedElement { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let message = self.to_string();

        Report::build(ReportKind::Error, filename, self.span().start)
            .with_message(&message)
            .with_label(
                Label::new((filename, self.span().clone()))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();

        String::from_utf8(buf).unwrap()
    }
}
