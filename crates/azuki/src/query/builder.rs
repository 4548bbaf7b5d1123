//! Positional parameter bookkeeping for compiled statements.

/// Collects the arguments of a statement and hands out their `$N` placeholders.
///
/// The placeholder for an argument is its 1-based position in the list, so the
/// statement and its arguments can never drift apart.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    args: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the arguments and returns its placeholder.
    pub fn bind(&mut self, value: impl Into<String>) -> String {
        self.args.push(value.into());
        format!("${}", self.args.len())
    }

    /// Pairs the collected arguments with the finished statement text.
    pub fn finish(self, sql: String) -> CompiledQuery {
        CompiledQuery {
            sql,
            args: self.args,
        }
    }
}

/// A SQL statement with `$1..$N` placeholders and its text arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    sql: String,
    args: Vec<String>,
}

impl CompiledQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.sql, self.args)
    }
}
