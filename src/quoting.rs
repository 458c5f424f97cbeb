//! Value and identifier quoting.
//!
//! Literal escaping belongs to the driver: [`quote`] only walks a bind value and hands each
//! scalar to a [`LiteralQuoter`]. Identifier quoting is handled here, with a configurable
//! prefix/suffix pair per dialect.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlBindError;
use crate::translation::{SpanKind, split_spans};
use crate::types::{BindValue, Dialect, SqlValue};

const DEFAULT_WORD: &str = "[A-Za-z_][A-Za-z0-9_]*";

static DOTTED_NAME: LazyLock<Regex> =
    LazyLock::new(|| dotted_pattern(DEFAULT_WORD).expect("default identifier pattern compiles"));
static BARE_NAME: LazyLock<Regex> =
    LazyLock::new(|| bare_pattern(DEFAULT_WORD).expect("default identifier pattern compiles"));

fn dotted_pattern(word: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b(?:{word})(?:\.(?:{word}))+\b"))
}

fn bare_pattern(word: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"^(?:{word})$"))
}

/// Driver-specific rendering of one scalar as an SQL literal.
pub trait LiteralQuoter {
    fn quote_literal(&self, value: &SqlValue) -> String;
}

impl<Q: LiteralQuoter + ?Sized> LiteralQuoter for &Q {
    fn quote_literal(&self, value: &SqlValue) -> String {
        (**self).quote_literal(value)
    }
}

/// Standard SQL literal rules: numbers bare, strings single-quoted with `''` doubling.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiLiteralQuoter;

impl LiteralQuoter for AnsiLiteralQuoter {
    fn quote_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Int(i) => i.to_string(),
            // Debug keeps the fraction, so 1.0 stays a REAL.
            SqlValue::Float(f) if f.is_finite() => format!("{f:?}"),
            SqlValue::Float(f) => quote_text(&f.to_string()),
            SqlValue::Text(s) => quote_text(s),
            SqlValue::Bool(true) => "TRUE".to_string(),
            SqlValue::Bool(false) => "FALSE".to_string(),
            SqlValue::Timestamp(dt) => quote_text(&dt.format("%F %T%.f").to_string()),
            SqlValue::Null => "NULL".to_string(),
            SqlValue::JSON(json) => quote_text(&json.to_string()),
            SqlValue::Blob(bytes) => quote_blob(bytes),
        }
    }
}

/// Single-quote `text`, doubling embedded quotes.
#[must_use]
pub fn quote_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Hex blob literal, `X'0a1b'`.
#[must_use]
pub fn quote_blob(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out.push('\'');
    out
}

/// Quote a bind value for inline use.
///
/// A scalar is passed straight to the driver's quoter. A sequence has each element quoted on
/// its own, in order, joined with `", "`; elements are never flattened. An empty sequence
/// yields an empty string.
pub fn quote<Q: LiteralQuoter + ?Sized>(quoter: &Q, value: &BindValue) -> String {
    match value {
        BindValue::Scalar(scalar) => quoter.quote_literal(scalar),
        BindValue::Sequence(values) => quote_list(quoter, values),
    }
}

pub fn quote_list<Q: LiteralQuoter + ?Sized>(quoter: &Q, values: &[SqlValue]) -> String {
    values
        .iter()
        .map(|value| quoter.quote_literal(value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which side of an identifier a quote string belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSide {
    Prefix,
    Suffix,
}

/// Reject empty or whitespace-only identifier quote strings.
///
/// # Errors
/// Returns `SqlBindError::AttributeValidationError` when `value` is blank.
pub fn validate_quote_chars(side: QuoteSide, value: &str) -> Result<(), SqlBindError> {
    if value.trim().is_empty() {
        let which = match side {
            QuoteSide::Prefix => "prefix",
            QuoteSide::Suffix => "suffix",
        };
        return Err(SqlBindError::AttributeValidationError(format!(
            "identifier quote {which} must not be empty or whitespace, got {value:?}"
        )));
    }
    Ok(())
}

/// Wraps table, column and alias names in identifier quotes.
///
/// ```rust
/// use sqlbind::prelude::*;
///
/// let quoter = IdentifierQuoter::default();
/// assert_eq!(quoter.quote_name("table.col AS alias"), r#""table"."col" AS "alias""#);
/// assert_eq!(quoter.quote_name("*.*"), "*.*");
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierQuoter {
    prefix: String,
    suffix: String,
    dotted: Regex,
    bare: Regex,
}

impl Default for IdentifierQuoter {
    fn default() -> Self {
        Self::for_dialect(Dialect::Ansi)
    }
}

impl IdentifierQuoter {
    /// Build a quoter with a custom prefix/suffix pair.
    ///
    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` if either side is blank.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self, SqlBindError> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        validate_quote_chars(QuoteSide::Prefix, &prefix)?;
        validate_quote_chars(QuoteSide::Suffix, &suffix)?;
        Ok(Self {
            prefix,
            suffix,
            dotted: DOTTED_NAME.clone(),
            bare: BARE_NAME.clone(),
        })
    }

    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        let (prefix, suffix) = dialect.identifier_quotes();
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            dotted: DOTTED_NAME.clone(),
            bare: BARE_NAME.clone(),
        }
    }

    /// Replace the pattern used to recognise one identifier segment in `quote_names_in`.
    ///
    /// # Errors
    /// Returns `SqlBindError::ConfigError` if the pattern does not compile.
    pub fn with_identifier_pattern(mut self, word: &str) -> Result<Self, SqlBindError> {
        let invalid =
            |e: regex::Error| SqlBindError::ConfigError(format!("bad identifier pattern: {e}"));
        self.dotted = dotted_pattern(word).map_err(invalid)?;
        self.bare = bare_pattern(word).map_err(invalid)?;
        Ok(self)
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` if `prefix` is blank.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> Result<(), SqlBindError> {
        let prefix = prefix.into();
        validate_quote_chars(QuoteSide::Prefix, &prefix)?;
        self.prefix = prefix;
        Ok(())
    }

    /// # Errors
    /// Returns `SqlBindError::AttributeValidationError` if `suffix` is blank.
    pub fn set_suffix(&mut self, suffix: impl Into<String>) -> Result<(), SqlBindError> {
        let suffix = suffix.into();
        validate_quote_chars(QuoteSide::Suffix, &suffix)?;
        self.suffix = suffix;
        Ok(())
    }

    /// Quote a name such as `table`, `table.col`, `table.col AS alias` or `table alias`.
    ///
    /// Each dotted segment is wrapped separately; `*` is never quoted.
    #[must_use]
    pub fn quote_name(&self, name: &str) -> String {
        let name = name.trim();

        // Uppercasing ASCII keeps byte offsets stable.
        if let Some(pos) = name.to_ascii_uppercase().rfind(" AS ")
            && pos > 0
        {
            return format!(
                "{} AS {}",
                self.quote_name(&name[..pos]),
                self.wrap(&name[pos + 4..])
            );
        }

        if let Some(pos) = name.rfind(' ')
            && pos > 0
        {
            return format!(
                "{} {}",
                self.quote_name(&name[..pos]),
                self.wrap(&name[pos + 1..])
            );
        }

        name.split('.')
            .map(|segment| self.wrap(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote the dotted names in a fragment of SQL, plus a trailing ` AS alias`.
    ///
    /// Quoted spans are copied through untouched, so `'foo.bar'` stays a string literal.
    /// Function names, keywords and other bare words are left alone; only `a.b` style names
    /// and an alias introduced by the fragment's final `AS` are quoted.
    #[must_use]
    pub fn quote_names_in(&self, text: &str) -> String {
        let spans = split_spans(text);
        let last = spans.len().saturating_sub(1);
        let mut out = String::with_capacity(text.len() + 16);

        for (idx, span) in spans.iter().enumerate() {
            match span.kind {
                SpanKind::Literal => out.push_str(span.text),
                SpanKind::Code if idx == last => out.push_str(&self.quote_trailing_alias(
                    &self.quote_dotted_names(span.text),
                )),
                SpanKind::Code => out.push_str(&self.quote_dotted_names(span.text)),
            }
        }
        out
    }

    fn quote_dotted_names(&self, text: &str) -> String {
        // An unterminated quote leaves quote characters in a code span; leave it alone.
        if text.contains(['\'', '"']) {
            return text.to_string();
        }
        self.dotted
            .replace_all(text, |caps: &regex::Captures<'_>| {
                caps[0]
                    .split('.')
                    .map(|segment| self.wrap(segment))
                    .collect::<Vec<_>>()
                    .join(".")
            })
            .into_owned()
    }

    /// Quote the identifier after the last ` AS ` of the fragment, if that is all that follows.
    fn quote_trailing_alias(&self, text: &str) -> String {
        // Uppercasing ASCII keeps byte offsets stable.
        let Some(pos) = text.to_ascii_uppercase().rfind(" AS ") else {
            return text.to_string();
        };
        let rest = &text[pos + 4..];
        let alias = rest.trim();
        if !self.bare.is_match(alias) {
            return text.to_string();
        }
        let lead = rest.len() - rest.trim_start().len();
        format!(
            "{}{}{}",
            &text[..pos + 4 + lead],
            self.wrap(alias),
            &rest[lead + alias.len()..]
        )
    }

    fn wrap(&self, segment: &str) -> String {
        let segment = segment.trim();
        if segment == "*" {
            return segment.to_string();
        }
        let escaped = segment.replace(&self.suffix, &self.suffix.repeat(2));
        format!("{}{}{}", self.prefix, escaped, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quotes_scalars_with_ansi_rules() {
        let q = AnsiLiteralQuoter;
        assert_eq!(q.quote_literal(&SqlValue::Int(5)), "5");
        assert_eq!(q.quote_literal(&SqlValue::Text("O'Brien".into())), "'O''Brien'");
        assert_eq!(q.quote_literal(&SqlValue::Null), "NULL");
        assert_eq!(q.quote_literal(&SqlValue::Blob(vec![0x0a, 0xff])), "X'0aff'");
        assert_eq!(q.quote_literal(&SqlValue::Float(1.0)), "1.0");
        assert_eq!(q.quote_literal(&SqlValue::Float(-0.25)), "-0.25");
    }

    #[test]
    fn quote_sequence_keeps_order_and_joins() {
        let value = BindValue::from(vec!["b", "a", "c"]);
        assert_eq!(quote(&AnsiLiteralQuoter, &value), "'b', 'a', 'c'");
    }

    #[test]
    fn quote_empty_sequence_is_empty() {
        let value = BindValue::Sequence(Vec::new());
        assert_eq!(quote(&AnsiLiteralQuoter, &value), "");
    }

    #[test]
    fn nested_json_array_is_one_opaque_literal() {
        let value = BindValue::from(json!([1, [2, 3]]));
        assert_eq!(quote(&AnsiLiteralQuoter, &value), "1, '[2,3]'");
    }

    #[test]
    fn quote_name_forms() {
        let q = IdentifierQuoter::default();
        assert_eq!(q.quote_name("table"), r#""table""#);
        assert_eq!(q.quote_name("table.col"), r#""table"."col""#);
        assert_eq!(q.quote_name("table.col AS alias"), r#""table"."col" AS "alias""#);
        assert_eq!(q.quote_name("table.col as alias"), r#""table"."col" AS "alias""#);
        assert_eq!(q.quote_name("table alias"), r#""table" "alias""#);
        assert_eq!(q.quote_name("  table  "), r#""table""#);
    }

    #[test]
    fn star_is_never_quoted() {
        let q = IdentifierQuoter::default();
        assert_eq!(q.quote_name("*"), "*");
        assert_eq!(q.quote_name("*.*"), "*.*");
        assert_eq!(q.quote_name("t.*"), r#""t".*"#);
    }

    #[test]
    fn embedded_suffix_is_doubled() {
        let q = IdentifierQuoter::for_dialect(Dialect::Mysql);
        assert_eq!(q.quote_name("we`ird"), "`we``ird`");
    }

    #[test]
    fn quote_names_in_leaves_literals_alone() {
        let q = IdentifierQuoter::default();
        assert_eq!(
            q.quote_names_in(r#"*, *.*, foo.bar, CONCAT('foo.bar', "baz.dib") AS zim"#),
            r#"*, *.*, "foo"."bar", CONCAT('foo.bar', "baz.dib") AS "zim""#
        );
    }

    #[test]
    fn quote_names_in_with_brackets() {
        let q = IdentifierQuoter::for_dialect(Dialect::Sqlsrv);
        assert_eq!(q.quote_names_in("a.b, c.d AS total"), "[a].[b], [c].[d] AS [total]");
    }

    #[test]
    fn quote_names_in_leaves_keywords_and_bare_lists() {
        let q = IdentifierQuoter::default();
        assert_eq!(q.quote_names_in("t.a DESC"), r#""t"."a" DESC"#);
        assert_eq!(q.quote_names_in("t.id IS NULL"), r#""t"."id" IS NULL"#);
        assert_eq!(q.quote_names_in("a, b, c"), "a, b, c");
        assert_eq!(q.quote_names_in("count(*) as total"), r#"count(*) as "total""#);
        assert_eq!(q.quote_names_in("COALESCE(x AS y)"), "COALESCE(x AS y)");
    }

    #[test]
    fn blank_quote_chars_rejected() {
        assert!(IdentifierQuoter::new(" ", "\"").is_err());
        assert!(IdentifierQuoter::new("\"", "").is_err());
        let mut q = IdentifierQuoter::default();
        let err = q.set_suffix("\t").unwrap_err();
        assert!(err.is_attribute_validation_error());
        assert_eq!(q.suffix(), "\"");
    }

    #[test]
    fn custom_identifier_pattern() {
        let q = IdentifierQuoter::default()
            .with_identifier_pattern("[a-z]+")
            .unwrap();
        assert_eq!(q.quote_names_in("a.b, A.B"), r#""a"."b", A.B"#);
        assert!(IdentifierQuoter::default().with_identifier_pattern("(").is_err());
    }
}
