/// Row types for the course catalog
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i32,
    pub course_number: String,
    pub course_name: String,
    pub instructional_type: i32,
    pub credits: String,
    pub standard_registration_year: Vec<String>,
    /// Term codes, see [`crate::query::TermCode`]
    pub term: Vec<i32>,
    /// Period tokens such as `月3` or `集中`
    pub period: Vec<String>,
    pub classroom: String,
    pub instructor: Vec<String>,
    pub course_overview: String,
    pub remarks: String,
    pub credited_auditors: i32,
    pub application_conditions: String,
    pub alt_course_name: String,
    pub course_code: String,
    pub course_code_name: String,
    pub csv_updated_at: DateTime<Utc>,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Number of matching courses offered in one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub term: i32,
    pub term_count: i64,
}

// Nullable text columns are read as empty strings
fn text(row: &Row, column: &str) -> Result<String, tokio_postgres::Error> {
    Ok(row.try_get::<_, Option<String>>(column)?.unwrap_or_default())
}

impl TryFrom<&Row> for Course {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Course {
            id: row.try_get("id")?,
            course_number: row.try_get("course_number")?,
            course_name: row.try_get("course_name")?,
            instructional_type: row.try_get("instructional_type")?,
            credits: row.try_get("credits")?,
            standard_registration_year: row.try_get("standard_registration_year")?,
            term: row.try_get("term")?,
            period: row.try_get("period_")?,
            classroom: text(row, "classroom")?,
            instructor: row.try_get("instructor")?,
            course_overview: text(row, "course_overview")?,
            remarks: text(row, "remarks")?,
            credited_auditors: row.try_get("credited_auditors")?,
            application_conditions: text(row, "application_conditions")?,
            alt_course_name: text(row, "alt_course_name")?,
            course_code: text(row, "course_code")?,
            course_code_name: text(row, "course_code_name")?,
            csv_updated_at: row.try_get("csv_updated_at")?,
            year: row.try_get("year")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<&Row> for Facet {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Facet {
            term: row.try_get("term")?,
            term_count: row.try_get("term_count")?,
        })
    }
}
