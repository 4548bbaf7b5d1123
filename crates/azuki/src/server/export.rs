//! CSV rendering of course search results.

use chrono::SecondsFormat;
use csv::{Terminator, WriterBuilder};
use thiserror::Error;

use crate::db::Course;
use crate::query::{QueryError, TermCode};

/// Column headers of the exported file, in order.
pub const CSV_HEADERS: [&str; 17] = [
    "科目番号",
    "科目名",
    "授業方法",
    "単位数",
    "標準履修年次",
    "実施学期",
    "曜時限",
    "教室",
    "担当教員",
    "授業概要",
    "備考",
    "科目等履修生申請可否",
    "申請条件",
    "英語(日本語)科目名",
    "科目コード",
    "要件科目名",
    "データ更新日",
];

#[derive(Debug, Error)]
pub enum ExportError {
    /// A course carries a term code outside the known enumeration
    #[error(transparent)]
    Term(#[from] QueryError),

    #[error("CSV error: {message}")]
    Csv { message: String },
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv {
            message: err.to_string(),
        }
    }
}

/// Concatenates the labels of the given term codes, e.g. `[1, 2]` → `春A春B`.
fn term_labels(codes: &[i32]) -> Result<String, QueryError> {
    codes
        .iter()
        .map(|&code| TermCode::from_code(code).map(TermCode::label))
        .collect()
}

fn record(course: &Course) -> Result<[String; 17], QueryError> {
    Ok([
        course.course_number.clone(),
        course.course_name.clone(),
        course.instructional_type.to_string(),
        course.credits.clone(),
        course.standard_registration_year.join(","),
        term_labels(&course.term)?,
        course.period.join(","),
        course.classroom.clone(),
        course.instructor.join(","),
        course.course_overview.clone(),
        course.remarks.clone(),
        course.credited_auditors.to_string(),
        course.application_conditions.clone(),
        course.alt_course_name.clone(),
        course.course_code.clone(),
        course.course_code_name.clone(),
        course
            .updated_at
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
    ])
}

/// Renders `courses` as a CSV document with a header row.
pub fn courses_to_csv(courses: &[Course]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for course in courses {
        writer.write_record(record(course)?)?;
    }

    writer.into_inner().map_err(|e| ExportError::Csv {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_course() -> Course {
        let timestamp = Utc.with_ymd_and_hms(2021, 4, 1, 9, 30, 0).unwrap();
        Course {
            id: 1,
            course_number: "GA10101".to_string(),
            course_name: "情報社会と法制度".to_string(),
            instructional_type: 1,
            credits: "2.0".to_string(),
            standard_registration_year: vec!["1".to_string(), "2".to_string()],
            term: vec![1, 2],
            period: vec!["月3".to_string(), "木4".to_string()],
            classroom: String::new(),
            instructor: vec!["筑波 太郎".to_string()],
            course_overview: "情報社会, 法".to_string(),
            remarks: String::new(),
            credited_auditors: 1,
            application_conditions: String::new(),
            alt_course_name: "Information Society and Law".to_string(),
            course_code: "GA10101".to_string(),
            course_code_name: String::new(),
            csv_updated_at: timestamp,
            year: 2021,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    #[test]
    fn test_term_labels() {
        assert_eq!(term_labels(&[1, 2, 3]).unwrap(), "春A春B春C");
        assert_eq!(term_labels(&[9]).unwrap(), "通年");
        assert_eq!(term_labels(&[]).unwrap(), "");
        assert_eq!(
            term_labels(&[1, 0]),
            Err(QueryError::UnknownTermCode { code: 0 })
        );
    }

    #[test]
    fn test_csv_rows() {
        let csv = courses_to_csv(&[sample_course()]).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "GA10101,情報社会と法制度,1,2.0,\"1,2\",春A春B,\"月3,木4\",,筑波 太郎,\"情報社会, 法\",,1,,Information Society and Law,GA10101,,2021-04-01T09:30:00Z"
        );
    }

    #[test]
    fn test_header_only_when_empty() {
        let csv = String::from_utf8(courses_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv, format!("{}\n", CSV_HEADERS.join(",")));
    }

    #[test]
    fn test_unknown_term_fails() {
        let mut course = sample_course();
        course.term = vec![12];
        let err = courses_to_csv(&[course]).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Term(QueryError::UnknownTermCode { code: 12 })
        ));
    }
}
