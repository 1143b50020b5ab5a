//! Declarative query specification and its SQL compiler.
//!
//! A [`QuerySpec`] describes one query intent — projection, joins, filters,
//! grouping, ordering, pagination — and compiles to parameterized SQL with
//! positional `?N` placeholders. Bound values are never interpolated into
//! the query text; that is the injection-safety boundary for every report.

use crate::error::{ReportError, Result};
use crate::row::Value;

/// Compiled form of a spec: SQL text plus its bound parameters in
/// placeholder order.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone)]
struct Join {
    table: String,
    alias: String,
    on: Vec<String>,
}

#[derive(Debug, Clone)]
struct Condition {
    template: String,
    args: Vec<Value>,
}

/// A declarative query specification.
///
/// Conditions and their bound values are appended together through
/// [`QuerySpec::filter`], so placeholder order can never drift from
/// argument order across separate lists.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    alias: Option<String>,
    select: Vec<String>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short name for the primary table in the generated SQL.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Append one projection expression (raw, or `expr AS name`).
    pub fn select(mut self, expr: &str) -> Self {
        self.select.push(expr.to_string());
        self
    }

    /// Append a join; each `on` entry is a raw boolean expression, multiple
    /// entries AND together.
    pub fn join(mut self, table: &str, alias: &str, on: &[&str]) -> Self {
        self.joins.push(Join {
            table: table.to_string(),
            alias: alias.to_string(),
            on: on.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Append a condition template and its bound values as one atomic step.
    /// `?` marks a placeholder; the compiler rewrites each to the driver's
    /// positional `?N` form.
    pub fn filter(mut self, template: &str, args: Vec<Value>) -> Self {
        self.conditions.push(Condition {
            template: template.to_string(),
            args,
        });
        self
    }

    pub fn group_by(mut self, expr: &str) -> Self {
        self.group_by.push(expr.to_string());
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by.push(expr.to_string());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Compile the spec into a parameterized `SELECT` against `table`.
    ///
    /// Clause order is fixed: SELECT, FROM, JOIN, WHERE, GROUP BY,
    /// ORDER BY, LIMIT/OFFSET. Fails with [`ReportError::SpecInvalid`]
    /// before execution if the projection is empty or any condition's
    /// placeholder count disagrees with its argument count.
    pub fn build(&self, table: &str) -> Result<CompiledQuery> {
        self.render(table, true)
    }

    /// Compile the companion count query: the spec without `LIMIT`/`OFFSET`,
    /// wrapped in `SELECT COUNT(*)`. For grouped specs this yields the
    /// number of groups matching the filter, not the number of raw rows,
    /// which is what pagination totals need.
    pub fn build_count(&self, table: &str) -> Result<CompiledQuery> {
        let inner = self.render(table, false)?;
        Ok(CompiledQuery {
            sql: format!("SELECT COUNT(*) AS total FROM ({}) AS grouped", inner.sql),
            params: inner.params,
        })
    }

    fn render(&self, table: &str, paginate: bool) -> Result<CompiledQuery> {
        if self.select.is_empty() {
            return Err(ReportError::SpecInvalid(
                "projection is empty; at least one select expression is required".to_string(),
            ));
        }

        let mut sql = String::with_capacity(256);
        sql.push_str("SELECT ");
        sql.push_str(&self.select.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(table);
        if let Some(alias) = &self.alias {
            sql.push(' ');
            sql.push_str(alias);
        }

        for join in &self.joins {
            sql.push_str(" JOIN ");
            sql.push_str(&join.table);
            sql.push(' ');
            sql.push_str(&join.alias);
            sql.push_str(" ON ");
            sql.push_str(&join.on.join(" AND "));
        }

        let mut params = Vec::new();
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            let mut rendered = Vec::with_capacity(self.conditions.len());
            for cond in &self.conditions {
                rendered.push(number_placeholders(cond, params.len())?);
                params.extend(cond.args.iter().cloned());
            }
            sql.push_str(&rendered.join(" AND "));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        if paginate {
            if let Some(limit) = self.limit {
                sql.push_str(&format!(" LIMIT {limit}"));
                let offset = self.offset.unwrap_or(0);
                if offset > 0 {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
        }

        Ok(CompiledQuery { sql, params })
    }
}

/// Rewrite each `?` in one condition template to `?N`, numbering from
/// `bound + 1`. The template's placeholder count must equal its argument
/// count exactly.
fn number_placeholders(cond: &Condition, bound: usize) -> Result<String> {
    let mut out = String::with_capacity(cond.template.len() + 4);
    let mut seen = 0usize;
    for ch in cond.template.chars() {
        if ch == '?' {
            seen += 1;
            out.push_str(&format!("?{}", bound + seen));
        } else {
            out.push(ch);
        }
    }
    if seen != cond.args.len() {
        return Err(ReportError::SpecInvalid(format!(
            "condition `{}` has {} placeholder(s) but {} bound value(s)",
            cond.template,
            seen,
            cond.args.len()
        )));
    }
    Ok(out)
}
