use serde_json::json;
use sqlbind::prelude::*;

fn store<const N: usize>(pairs: [(&str, BindValue); N]) -> BindStore {
    let mut binds = BindStore::new();
    binds.bind_values(pairs);
    binds
}

#[test]
fn empty_store_returns_input() {
    let sql = "SELECT * FROM t WHERE a = :a AND b IN (:b)";
    let out = rewrite(sql, &BindStore::new(), &AnsiLiteralQuoter);
    assert_eq!(out.statement, sql);
    assert!(out.placeholders.is_empty());
    assert!(out.is_unchanged());
}

#[test]
fn statement_without_placeholders_is_untouched() {
    let binds = store([("a", BindValue::from(vec![1, 2]))]);
    let sql = "SELECT 'a:b', x FROM t";
    let out = rewrite(sql, &binds, &AnsiLiteralQuoter);
    assert_eq!(out.statement, sql);
    assert!(out.placeholders.is_empty());
}

#[test]
fn sequence_and_scalar_scenario() {
    let binds = store([
        ("list", BindValue::from(vec![1, 2, 3, 4])),
        ("id", BindValue::from(5)),
    ]);
    let out = rewrite(
        "SELECT * FROM t WHERE id IN (:list) OR id = :id",
        &binds,
        &AnsiLiteralQuoter,
    );
    assert_eq!(out.statement, "SELECT * FROM t WHERE id IN (1, 2, 3, 4) OR id = :id");
    assert_eq!(out.placeholders, vec!["id".to_string()]);
    assert_eq!(binds.get("id"), Some(&BindValue::Scalar(SqlValue::Int(5))));
}

#[test]
fn literal_with_doubled_quotes_is_left_alone() {
    let sql = "SELECT * FROM t WHERE note = 'leave '':foo'' alone' AND tag IN (:foo)";

    let seq = store([("foo", BindValue::from(vec!["x"]))]);
    let out = rewrite(sql, &seq, &AnsiLiteralQuoter);
    assert_eq!(
        out.statement,
        "SELECT * FROM t WHERE note = 'leave '':foo'' alone' AND tag IN ('x')"
    );
    assert!(out.placeholders.is_empty());

    let scalar = store([("foo", BindValue::from("x"))]);
    let out = rewrite(sql, &scalar, &AnsiLiteralQuoter);
    assert_eq!(out.statement, sql);
    assert_eq!(out.placeholders, vec!["foo".to_string()]);
}

#[test]
fn placeholders_in_literals_never_recorded() {
    let binds = store([("foo", BindValue::from(1)), ("bar", BindValue::from(vec![1]))]);
    let out = rewrite(
        r#"SELECT ':foo', ":bar" FROM t"#,
        &binds,
        &AnsiLiteralQuoter,
    );
    assert!(out.is_unchanged());
    assert!(out.placeholders.is_empty());
}

#[test]
fn scalar_names_recorded_once_in_first_use_order() {
    let binds = store([("x", BindValue::from(1))]);
    let out = rewrite(
        "SELECT :b, :x FROM t WHERE a = :x OR c = :missing OR d = :b",
        &binds,
        &AnsiLiteralQuoter,
    );
    assert!(out.is_unchanged());
    assert_eq!(out.placeholders, vec!["b", "x", "missing"]);
}

#[test]
fn sequence_used_twice_expands_twice() {
    let binds = store([("ids", BindValue::from(vec![7, 8]))]);
    let out = rewrite(
        "SELECT * FROM a WHERE id IN (:ids) UNION SELECT * FROM b WHERE id IN (:ids)",
        &binds,
        &AnsiLiteralQuoter,
    );
    assert_eq!(
        out.statement,
        "SELECT * FROM a WHERE id IN (7, 8) UNION SELECT * FROM b WHERE id IN (7, 8)"
    );
}

#[test]
fn casts_and_mid_word_colons_are_not_placeholders() {
    let binds = store([("text", BindValue::from(vec![1])), ("v", BindValue::from(2))]);
    let out = rewrite(
        "SELECT col::text, a:text, :v FROM t",
        &binds,
        &AnsiLiteralQuoter,
    );
    assert_eq!(out.statement, "SELECT col::text, a:text, :v FROM t");
    assert_eq!(out.placeholders, vec!["v"]);
}

#[test]
fn nested_arrays_stay_opaque() {
    let binds = store([("vals", BindValue::from(json!([[1, 2], 3, "o'k"])))]);
    let out = rewrite("VALUES (:vals)", &binds, &AnsiLiteralQuoter);
    assert_eq!(out.statement, "VALUES ('[1,2]', 3, 'o''k')");
}

#[test]
fn empty_sequence_renders_nothing() {
    let binds = store([("ids", BindValue::Sequence(Vec::new()))]);
    let out = rewrite("SELECT 1 WHERE id IN (:ids)", &binds, &AnsiLiteralQuoter);
    assert_eq!(out.statement, "SELECT 1 WHERE id IN ()");
}

#[test]
fn backslash_before_closing_quote_ends_the_literal() {
    let binds = store([("ids", BindValue::from(vec![1, 2])), ("p", BindValue::from("x"))]);
    let out = rewrite(
        r"SELECT 1 WHERE p <> 'C:\' AND id IN (:ids) AND q = :p",
        &binds,
        &AnsiLiteralQuoter,
    );
    assert_eq!(out.statement, r"SELECT 1 WHERE p <> 'C:\' AND id IN (1, 2) AND q = :p");
    assert_eq!(out.placeholders, vec!["p"]);
}

#[test]
fn spans_cover_the_statement() {
    let sql = r#"SELECT 'a', "b" FROM t WHERE c = 'it''s' AND d = :d"#;
    let spans = split_spans(sql);
    let joined: String = spans.iter().map(|s| s.text).collect();
    assert_eq!(joined, sql);

    let literals: Vec<&str> = spans
        .iter()
        .filter(|s| s.kind == SpanKind::Literal)
        .map(|s| s.text)
        .collect();
    assert_eq!(literals, vec!["'a'", "\"b\"", "'it''s'"]);
}

#[test]
fn binds_merge_later_wins() {
    let mut binds = BindStore::new();
    binds.bind_values([("a", 1)]);
    binds.bind_values([("b", 2)]);
    assert_eq!(binds.len(), 2);
    assert_eq!(binds.get("a"), Some(&BindValue::from(1)));

    binds.bind_values([("a", 3)]);
    assert_eq!(binds.get("a"), Some(&BindValue::from(3)));
    assert_eq!(binds.get("b"), Some(&BindValue::from(2)));
}
