//! Allow-listed `ordering` parameter

use sqlx::{Postgres, QueryBuilder};

/// Ordering allowed on a collection
#[derive(Debug, Clone, Copy)]
pub struct OrderingFilter {
    /// Public field name -> SQL expression
    fields: &'static [(&'static str, &'static str)],
    /// Applied when the request names no allowed field
    default: &'static [&'static str],
    /// Appended last so that pages are stable
    tiebreak: &'static str,
}

impl OrderingFilter {
    pub const fn new(
        fields: &'static [(&'static str, &'static str)],
        default: &'static [&'static str],
        tiebreak: &'static str,
    ) -> Self {
        Self {
            fields,
            default,
            tiebreak,
        }
    }

    fn lookup(&self, term: &str) -> Option<(&'static str, bool)> {
        let term = term.trim();
        let (name, descending) = match term.strip_prefix('-') {
            Some(name) => (name, true),
            None => (term, false),
        };
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, expr)| (*expr, descending))
    }

    /// SQL expressions and direction for an `ordering` value
    pub fn resolve(&self, param: Option<&str>) -> Vec<(&'static str, bool)> {
        let requested: Vec<_> = param
            .unwrap_or_default()
            .split(',')
            .filter_map(|term| self.lookup(term))
            .collect();
        if !requested.is_empty() {
            return requested;
        }
        self.default.iter().filter_map(|term| self.lookup(term)).collect()
    }

    pub fn push_order_by(&self, builder: &mut QueryBuilder<'_, Postgres>, param: Option<&str>) {
        builder.push(" ORDER BY ");
        for (expr, descending) in self.resolve(param) {
            builder.push(expr);
            builder.push(if descending { " DESC, " } else { " ASC, " });
        }
        builder.push(self.tiebreak);
        builder.push(" ASC");
    }
}
