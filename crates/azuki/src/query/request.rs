//! Course query request types and their validation.

use serde::{Deserialize, Serialize};

use super::error::QueryError;
use super::period;
use super::term::recognize_terms;

/// Boolean operator joining words within a field, or fields within a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// Parses the wire value of the filter type named `field`.
    pub fn parse(field: &'static str, value: &str) -> Result<Self, QueryError> {
        match value {
            "and" => Ok(Combinator::And),
            "or" => Ok(Combinator::Or),
            _ => Err(QueryError::InvalidCombinator {
                field,
                value: value.to_string(),
            }),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }
}

/// The JSON body accepted by the course endpoints.
///
/// Every searchable field is free text; an empty string means "not searched".
/// Filter types are kept as raw strings so that bad values surface as
/// validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseQuery {
    #[serde(default)]
    pub course_number: String,
    /// Falls back to `course_overview_filter_type` when absent.
    #[serde(default)]
    pub course_number_filter_type: Option<String>,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub course_name_filter_type: String,
    #[serde(default)]
    pub course_overview: String,
    #[serde(default)]
    pub course_overview_filter_type: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub filter_type: String,
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// A free-text search on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFilter {
    pub value: String,
    pub combinator: Combinator,
}

/// A validated search request, ready to be compiled.
///
/// Blank fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub course_name: Option<TextFilter>,
    pub course_overview: Option<TextFilter>,
    pub course_number: Option<TextFilter>,
    pub period: Option<String>,
    pub term: Option<String>,
    pub filter_type: Combinator,
    pub limit: u64,
    pub offset: u64,
}

impl SearchRequest {
    /// Returns true if at least one field restricts the result set.
    pub fn has_condition(&self) -> bool {
        self.course_name.is_some()
            || self.course_overview.is_some()
            || self.course_number.is_some()
            || self.period.is_some()
            || self.term.is_some()
    }

    /// Replaces the pagination window.
    pub fn with_page(mut self, limit: u64, offset: u64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn text_filter(
    value: String,
    field: &'static str,
    filter_type: &str,
) -> Result<Option<TextFilter>, QueryError> {
    let Some(value) = non_blank(value) else {
        // The filter type of an unused field is never looked at
        return Ok(None);
    };
    let combinator = Combinator::parse(field, filter_type)?;
    Ok(Some(TextFilter { value, combinator }))
}

impl CourseQuery {
    /// Checks the query and converts it into a [`SearchRequest`].
    ///
    /// Rejects unknown filter types, a query without any condition, period
    /// expressions that do not parse, term expressions naming no known term
    /// and negative pagination values.
    pub fn validate(self) -> Result<SearchRequest, QueryError> {
        let filter_type = Combinator::parse("filter_type", &self.filter_type)?;

        let course_name = text_filter(
            self.course_name,
            "course_name_filter_type",
            &self.course_name_filter_type,
        )?;
        let course_overview = text_filter(
            self.course_overview,
            "course_overview_filter_type",
            &self.course_overview_filter_type,
        )?;
        let number_filter_type = self
            .course_number_filter_type
            .as_deref()
            .unwrap_or(&self.course_overview_filter_type);
        let course_number = text_filter(
            self.course_number,
            "course_number_filter_type",
            number_filter_type,
        )?;

        // Separators alone normalize to nothing and do not count as a condition
        let period = match non_blank(self.period) {
            Some(raw) if period::normalize(&raw)?.is_empty() => None,
            other => other,
        };

        let term = non_blank(self.term);
        if let Some(term) = &term {
            if recognize_terms(term).is_empty() {
                return Err(QueryError::UnrecognizedTerm {
                    input: term.clone(),
                });
            }
        }

        let limit = u64::try_from(self.limit)
            .map_err(|_| QueryError::NegativeLimit { value: self.limit })?;
        let offset = u64::try_from(self.offset)
            .map_err(|_| QueryError::NegativeOffset { value: self.offset })?;

        let request = SearchRequest {
            course_name,
            course_overview,
            course_number,
            period,
            term,
            filter_type,
            limit,
            offset,
        };

        if !request.has_condition() {
            return Err(QueryError::EmptyRequest);
        }

        Ok(request)
    }
}
