//! Statement assembly.
//!
//! Rendering is a pure function of [`QueryState`]. Clauses always come out in the
//! order `SELECT`, `FROM`, `WHERE`, `ORDER BY`, `LIMIT`, each one only when its
//! state is non-empty. Every clause but `LIMIT` is followed by a single space.

use super::state::{QueryState, StatementKind};

/// How predicate values appear in the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStyle {
    /// `$1, $2, ...`, bound at execution time.
    Placeholder,
    /// Quoted, escaped literals. For previews and logs, never for execution.
    Literal,
}

/// Render `state` into statement text.
pub fn render(state: &QueryState, style: ValueStyle) -> String {
    let mut sql = String::new();

    match state.kind {
        StatementKind::Select => {
            if state.selected_columns.is_empty() {
                sql.push_str("SELECT * ");
            } else {
                sql.push_str("SELECT ");
                sql.push_str(&state.selected_columns.join(", "));
                sql.push(' ');
            }
            push_from(&mut sql, state);
            push_where(&mut sql, state, style);

            if let Some(ref column) = state.order_by {
                sql.push_str(&format!("ORDER BY {} ", column));
            }

            if let Some(limit) = state.limit {
                sql.push_str(&format!("LIMIT {}", limit));
            }
        }
        StatementKind::Delete => {
            sql.push_str("DELETE ");
            push_from(&mut sql, state);
            if state.predicates.is_empty() && !state.allow_delete_all {
                sql.push_str("WHERE 1=0 ");
            } else {
                push_where(&mut sql, state, style);
            }
        }
    }

    sql
}

fn push_from(sql: &mut String, state: &QueryState) {
    if !state.table.is_empty() {
        sql.push_str(&format!("FROM {} ", state.table));
    }
}

fn push_where(sql: &mut String, state: &QueryState, style: ValueStyle) {
    if state.predicates.is_empty() {
        return;
    }

    let conditions: Vec<String> = state
        .predicates
        .iter()
        .enumerate()
        .map(|(i, p)| match style {
            ValueStyle::Placeholder => format!("{} = ${}", p.column, i + 1),
            ValueStyle::Literal => format!("{} = {}", p.column, p.value.to_literal()),
        })
        .collect();

    sql.push_str("WHERE ");
    sql.push_str(&conditions.join(" AND "));
    sql.push(' ');
}
