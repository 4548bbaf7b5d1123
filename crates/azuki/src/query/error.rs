//! Error types for request validation and query compilation.

use thiserror::Error;

use super::period::PeriodParseError;

/// Errors raised while validating a course query or compiling it to SQL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A filter type other than `and` / `or`
    #[error("{field} error: {value:?}, expected \"and\" or \"or\"")]
    InvalidCombinator { field: &'static str, value: String },

    /// None of the searchable fields carries a value
    #[error("no search condition given: course_name, course_overview, course_number, period and term are all empty")]
    EmptyRequest,

    #[error("limit is negative: {value}")]
    NegativeLimit { value: i64 },

    #[error("offset is negative: {value}")]
    NegativeOffset { value: i64 },

    /// The period expression could not be parsed
    #[error("'period' parse error: {0}")]
    Period(#[from] PeriodParseError),

    /// The term expression mentions no known term
    #[error("'term' parse error: no known term in {input:?}")]
    UnrecognizedTerm { input: String },

    #[error("unknown term label: {label}")]
    UnknownTermLabel { label: String },

    /// A stored term code outside the known enumeration
    #[error("unknown term code: {code}")]
    UnknownTermCode { code: i32 },
}

impl QueryError {
    /// Returns true if the error was caused by the client's input rather than
    /// by data or code that disagrees with the term enumeration.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            QueryError::UnknownTermCode { .. } | QueryError::UnknownTermLabel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(QueryError::EmptyRequest.is_client_error());
        assert!(QueryError::NegativeLimit { value: -1 }.is_client_error());
        assert!(QueryError::UnrecognizedTerm {
            input: "冬".to_string()
        }
        .is_client_error());
        assert!(QueryError::Period(PeriodParseError::MissingDay {
            group: "3".to_string()
        })
        .is_client_error());
    }

    #[test]
    fn test_term_table_violations() {
        assert!(!QueryError::UnknownTermCode { code: 12 }.is_client_error());
        assert!(!QueryError::UnknownTermLabel {
            label: "冬A".to_string()
        }
        .is_client_error());
    }
}
