//! Column-order-insensitive comparison of table schema dumps.

/// Split a schema dump on `(`, `)` and `,` into sorted, trimmed tokens.
pub fn dump_tokens(dump: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = dump
        .split(['(', ')', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens
}

/// True when two dumps declare the same table pieces in any order.
pub fn dumps_equal(dump1: &str, dump2: &str) -> bool {
    dump_tokens(dump1) == dump_tokens(dump2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_order_is_ignored() {
        assert!(dumps_equal(
            "CREATE TABLE dump1 (id STRING HASH KEY,bar NUMBER RANGE KEY)",
            "CREATE TABLE dump1 (bar NUMBER RANGE KEY,id STRING HASH KEY)",
        ));
    }

    #[test]
    fn missing_column_is_detected() {
        assert!(!dumps_equal(
            "CREATE TABLE dump1 (id STRING HASH KEY,bar NUMBER RANGE KEY)",
            "CREATE TABLE dump1 (id STRING HASH KEY)",
        ));
    }

    #[test]
    fn tokens_are_trimmed_and_sorted() {
        assert_eq!(
            dump_tokens("CREATE TABLE t ( b , a )"),
            vec!["CREATE TABLE t", "a", "b"]
        );
    }
}
