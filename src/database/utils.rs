use regex::Regex;

/// Collapse whitespace in a query literal and rewrite `?` placeholders into
/// numbered Postgres `$n` parameters.
pub fn sql(query: &str) -> String {
    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let re = Regex::new(r"\?").unwrap();
    let mut param_index = 1;
    let mut result = cleaned;
    while let Some(mat) = re.find(&result) {
        let replacement = format!("${}", param_index);
        result.replace_range(mat.range(), &replacement);
        param_index += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::sql;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_placeholders_in_order() {
        assert_eq!(
            sql("SELECT * FROM appointments WHERE id = ? AND status = ?"),
            "SELECT * FROM appointments WHERE id = $1 AND status = $2"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sql("SELECT\n    id\nFROM\n    users"), "SELECT id FROM users");
    }
}
