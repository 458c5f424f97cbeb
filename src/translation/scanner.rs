/// Whether a span is executable SQL or the inside of a quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Code,
    Literal,
}

/// A contiguous slice of a statement. Literal spans include their delimiting quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSpan<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
}

#[derive(Clone, Copy)]
enum State {
    Code,
    /// Inside a literal opened by `quote`; `backslashed` when the opener was `\'` or `\"`.
    Quoted { quote: u8, backslashed: bool },
}

/// Width of the literal opener at `idx`: a bare `'`/`"`, or a backslash-escaped one.
fn literal_opener(bytes: &[u8], idx: usize) -> Option<(u8, usize)> {
    match bytes[idx] {
        quote @ (b'\'' | b'"') => Some((quote, 1)),
        b'\\' => match bytes.get(idx + 1) {
            Some(&quote @ (b'\'' | b'"')) => Some((quote, 2)),
            _ => None,
        },
        _ => None,
    }
}

/// Split `sql` into alternating code and literal spans in a single pass.
///
/// A literal ends at the next occurrence of its own quote character; a doubled quote (`''`)
/// inside it is content and a backslash is an ordinary byte, so `'C:\'` is complete. A literal
/// opened by an escaped quote (`\'`) is closed by the next escaped quote of the same kind. An
/// unterminated literal runs to the end of the input; the split is best-effort and never
/// fails. Concatenating the spans always reproduces `sql`.
#[must_use]
pub fn split_spans(sql: &str) -> Vec<StatementSpan<'_>> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut state = State::Code;
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        match state {
            State::Code => {
                if let Some((quote, width)) = literal_opener(bytes, idx) {
                    if idx > start {
                        spans.push(StatementSpan {
                            kind: SpanKind::Code,
                            text: &sql[start..idx],
                        });
                    }
                    start = idx;
                    state = State::Quoted {
                        quote,
                        backslashed: width == 2,
                    };
                    idx += width;
                    continue;
                }
            }
            State::Quoted { quote, backslashed } => {
                let b = bytes[idx];
                let next = bytes.get(idx + 1).copied();
                if backslashed {
                    // Closed only by the same escaped quote that opened it.
                    if b == b'\\' && next == Some(quote) {
                        spans.push(StatementSpan {
                            kind: SpanKind::Literal,
                            text: &sql[start..idx + 2],
                        });
                        start = idx + 2;
                        state = State::Code;
                        idx += 2;
                        continue;
                    }
                    idx += 1;
                    continue;
                }
                if b == quote {
                    if next == Some(quote) {
                        idx += 2; // doubled quote is content
                        continue;
                    }
                    spans.push(StatementSpan {
                        kind: SpanKind::Literal,
                        text: &sql[start..=idx],
                    });
                    start = idx + 1;
                    state = State::Code;
                }
            }
        }
        idx += 1;
    }

    if start < bytes.len() {
        let kind = match state {
            State::Code => SpanKind::Code,
            State::Quoted { .. } => SpanKind::Literal,
        };
        spans.push(StatementSpan {
            kind,
            text: &sql[start..],
        });
    }
    spans
}
