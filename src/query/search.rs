//! Free-text `search` parameter

use sqlx::{Postgres, QueryBuilder};

use super::Conditions;

/// Columns a collection can be searched on
#[derive(Debug, Clone, Copy)]
pub struct SearchFilter {
    fields: &'static [&'static str],
}

impl SearchFilter {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    /// Push one predicate per term: every term must be found in at least one field
    pub fn push_where(
        &self,
        builder: &mut QueryBuilder<'_, Postgres>,
        conditions: &mut Conditions,
        param: Option<&str>,
    ) {
        for term in terms(param.unwrap_or_default()) {
            let pattern = format!("%{}%", escape_like(term));
            conditions.next(builder);
            builder.push("(");
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push(*field);
                builder.push(" ILIKE ");
                builder.push_bind(pattern.clone());
            }
            builder.push(")");
        }
    }
}

/// Split on whitespace and commas, dropping empty terms
pub fn terms(param: &str) -> Vec<&str> {
    param
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .collect()
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHORS: SearchFilter = SearchFilter::new(&["a.last_name", "a.first_name", "a.middle_name"]);

    fn where_clause(param: Option<&str>) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM authors a");
        AUTHORS.push_where(&mut builder, &mut Conditions::new(), param);
        builder.sql().to_string()
    }

    #[test]
    fn test_no_search() {
        assert_eq!(where_clause(None), "SELECT 1 FROM authors a");
        assert_eq!(where_clause(Some("  , ")), "SELECT 1 FROM authors a");
    }

    #[test]
    fn test_single_term_matches_any_field() {
        assert_eq!(
            where_clause(Some("tolstoy")),
            "SELECT 1 FROM authors a WHERE (a.last_name ILIKE $1 OR a.first_name ILIKE $2 OR a.middle_name ILIKE $3)"
        );
    }

    #[test]
    fn test_every_term_must_match() {
        let sql = where_clause(Some("Leo, Tolstoy"));
        assert!(sql.contains(") AND ("));
        assert!(sql.ends_with("a.middle_name ILIKE $6)"));
    }

    #[test]
    fn test_terms() {
        assert_eq!(terms("Leo  Nikolayevich,Tolstoy"), vec!["Leo", "Nikolayevich", "Tolstoy"]);
        assert!(terms("").is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
        assert_eq!(escape_like("war"), "war");
    }
}
