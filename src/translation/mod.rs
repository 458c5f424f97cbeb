use std::borrow::Cow;

use tracing::debug;

mod parsers;
mod scanner;

use parsers::scan_placeholder;
pub use scanner::{SpanKind, StatementSpan, split_spans};

use crate::bind_store::BindStore;
use crate::quoting::{LiteralQuoter, quote_list};
use crate::types::BindValue;

/// A statement after sequence values have been inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten<'a> {
    /// Final statement text; borrowed when nothing was substituted.
    pub statement: Cow<'a, str>,
    /// Placeholder names still needing driver-level binding, unique, in order of first use.
    pub placeholders: Vec<String>,
}

impl<'a> Rewritten<'a> {
    fn unchanged(sql: &'a str) -> Self {
        Self {
            statement: Cow::Borrowed(sql),
            placeholders: Vec::new(),
        }
    }

    /// True when the statement text was returned as-is.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self.statement, Cow::Borrowed(_))
    }
}

/// Inline sequence-valued bindings and collect the scalar placeholders left for the driver.
///
/// Only code spans are scanned, so `:name` text inside a quoted literal is never touched.
/// A `:name` bound to a sequence is replaced by the quoted, comma-joined list (every
/// occurrence). A `:name` bound to a scalar, or not bound at all, stays in the text and is
/// reported once in [`Rewritten::placeholders`].
///
/// With an empty bind store the statement is returned unchanged without scanning.
///
/// ```rust
/// use sqlbind::prelude::*;
///
/// let mut binds = BindStore::new();
/// binds.bind("list", vec![1, 2, 3, 4]);
/// binds.bind("id", 5);
///
/// let out = rewrite(
///     "SELECT * FROM t WHERE id IN (:list) OR id = :id",
///     &binds,
///     &AnsiLiteralQuoter,
/// );
/// assert_eq!(out.statement, "SELECT * FROM t WHERE id IN (1, 2, 3, 4) OR id = :id");
/// assert_eq!(out.placeholders, vec!["id".to_string()]);
/// ```
pub fn rewrite<'a, Q: LiteralQuoter + ?Sized>(
    sql: &'a str,
    binds: &BindStore,
    quoter: &Q,
) -> Rewritten<'a> {
    if binds.is_empty() {
        return Rewritten::unchanged(sql);
    }

    let mut out: Option<String> = None;
    let mut placeholders: Vec<String> = Vec::new();
    let mut inlined = 0usize;
    let mut offset = 0;

    for span in split_spans(sql) {
        match span.kind {
            SpanKind::Literal => {
                if let Some(buf) = out.as_mut() {
                    buf.push_str(span.text);
                }
            }
            SpanKind::Code => {
                let bytes = span.text.as_bytes();
                let mut copied = 0;
                let mut idx = 0;
                while idx < bytes.len() {
                    let Some(end) = scan_placeholder(bytes, idx) else {
                        idx += 1;
                        continue;
                    };
                    let name = &span.text[idx + 1..end];
                    match binds.get(name) {
                        Some(BindValue::Sequence(values)) => {
                            let buf = out.get_or_insert_with(|| sql[..offset].to_string());
                            buf.push_str(&span.text[copied..idx]);
                            buf.push_str(&quote_list(quoter, values));
                            copied = end;
                            inlined += 1;
                        }
                        _ => {
                            if !placeholders.iter().any(|p| p == name) {
                                placeholders.push(name.to_string());
                            }
                        }
                    }
                    idx = end;
                }
                if let Some(buf) = out.as_mut() {
                    buf.push_str(&span.text[copied..]);
                }
            }
        }
        offset += span.text.len();
    }

    debug!(
        inlined,
        placeholders = placeholders.len(),
        "rewrote statement bindings"
    );

    Rewritten {
        statement: out.map_or(Cow::Borrowed(sql), Cow::Owned),
        placeholders,
    }
}
