use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Condition, Expr, Func};

/// Case-insensitive substring filter over one or more text columns.
///
/// Returns `None` for a blank term, which callers treat as "match all".
/// Comparison lowercases both sides so the behavior is the same on Postgres
/// and SQLite.
pub fn contains_ci<C>(columns: &[C], term: &str) -> Option<Condition>
where
    C: ColumnTrait,
{
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let pattern = format!("%{}%", term.to_lowercase());
    let mut condition = Condition::any();
    for column in columns {
        condition = condition.add(Expr::expr(Func::lower(Expr::col(*column))).like(&pattern));
    }

    Some(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::persons;

    #[test]
    fn test_blank_term_matches_all() {
        assert!(contains_ci(&[persons::Column::Name], "").is_none());
        assert!(contains_ci(&[persons::Column::Name], "   ").is_none());
    }

    #[test]
    fn test_non_blank_term_builds_condition() {
        let condition =
            contains_ci(&[persons::Column::Name, persons::Column::Email], "Ana");
        assert!(condition.is_some());
    }
}
