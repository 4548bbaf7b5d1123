//! Compiles a validated [`SearchRequest`] into a parameterized PostgreSQL statement.

use super::builder::{CompiledQuery, QueryBuilder};
use super::error::QueryError;
use super::period;
use super::request::{Combinator, SearchRequest, TextFilter};
use super::term::recognize_terms;

/// The statement shape to produce from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Matching course rows, ordered and paginated.
    Search,
    /// Number of matching courses per term code.
    Facet,
}

/// Element type of an array column, used to cast the literal array.
#[derive(Debug, Clone, Copy)]
enum ArrayType {
    Varchar,
    Int,
}

impl ArrayType {
    fn as_sql(self) -> &'static str {
        match self {
            ArrayType::Varchar => "varchar[]",
            ArrayType::Int => "int[]",
        }
    }
}

/// Builds the SQL text and argument list for `request`.
///
/// Predicates are generated in a fixed field order: course name, course
/// overview, course number, period and term. Every argument is text; the
/// placeholder of the n-th argument is `$n`.
pub fn compile(request: &SearchRequest, mode: CompileMode) -> Result<CompiledQuery, QueryError> {
    let mut builder = QueryBuilder::new();

    let predicates = [
        text_predicate(&mut builder, "course_name", request.course_name.as_ref()),
        text_predicate(
            &mut builder,
            "course_overview",
            request.course_overview.as_ref(),
        ),
        text_predicate(&mut builder, "course_number", request.course_number.as_ref()),
        period_predicate(&mut builder, request.period.as_deref())?,
        term_predicate(&mut builder, request.term.as_deref())?,
    ];

    let filter = join_predicates(&predicates, request.filter_type);
    let where_clause = if filter == "()" {
        String::new()
    } else {
        format!("where {filter}")
    };

    let sql = match mode {
        CompileMode::Search => {
            let limit = builder.bind(request.limit.to_string());
            let offset = builder.bind(request.offset.to_string());
            format!(
                "select * from courses {where_clause}order by id asc limit {limit} offset {offset}"
            )
        }
        CompileMode::Facet => format!(
            "select term, count(term) as term_count from(select unnest(term) as term from courses {where_clause}) as s1 group by term"
        ),
    };

    Ok(builder.finish(sql))
}

/// One `like` test per whitespace-separated word, joined by the field's combinator.
fn text_predicate(builder: &mut QueryBuilder, column: &str, filter: Option<&TextFilter>) -> String {
    let Some(filter) = filter else {
        return String::new();
    };

    let mut predicate = String::new();
    for (index, word) in filter.value.split_whitespace().enumerate() {
        let placeholder = builder.bind(format!("%{word}%"));
        if index == 0 {
            predicate.push_str(&format!("{column} like {placeholder} "));
        } else {
            predicate.push_str(&format!(
                "{} {column} like {placeholder} ",
                filter.combinator.as_sql()
            ));
        }
    }
    predicate
}

/// Requires the column to be non-empty and contained in the given values.
fn array_predicate<I>(builder: &mut QueryBuilder, column: &str, ty: ArrayType, values: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let placeholders: Vec<String> = values.into_iter().map(|v| builder.bind(v)).collect();
    if placeholders.is_empty() {
        return String::new();
    }

    let ty = ty.as_sql();
    format!(
        "array[{}]::{ty} @> {column} and array[]::{ty} <> {column}",
        placeholders.join(", ")
    )
}

fn period_predicate(builder: &mut QueryBuilder, raw: Option<&str>) -> Result<String, QueryError> {
    let Some(raw) = raw else {
        return Ok(String::new());
    };
    let periods = period::normalize(raw)?;
    Ok(array_predicate(
        builder,
        "period_",
        ArrayType::Varchar,
        periods.to_strings(),
    ))
}

fn term_predicate(builder: &mut QueryBuilder, raw: Option<&str>) -> Result<String, QueryError> {
    let Some(raw) = raw else {
        return Ok(String::new());
    };
    if raw.trim().is_empty() {
        return Ok(String::new());
    }

    let terms = recognize_terms(raw);
    if terms.is_empty() {
        return Err(QueryError::UnrecognizedTerm {
            input: raw.to_string(),
        });
    }
    Ok(array_predicate(
        builder,
        "term",
        ArrayType::Int,
        terms.into_iter().map(|term| term.code().to_string()),
    ))
}

/// Parenthesizes each non-empty predicate and joins them with `combinator`.
/// With no predicates at all the result is `()`.
fn join_predicates(predicates: &[String], combinator: Combinator) -> String {
    let joined = predicates
        .iter()
        .filter(|predicate| !predicate.is_empty())
        .map(|predicate| format!("({predicate})"))
        .collect::<Vec<_>>()
        .join(combinator.as_sql());
    format!("({joined})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PeriodParseError;
    use regex::Regex;

    fn text(value: &str, combinator: Combinator) -> Option<TextFilter> {
        Some(TextFilter {
            value: value.to_string(),
            combinator,
        })
    }

    fn base_request() -> SearchRequest {
        SearchRequest {
            course_name: None,
            course_overview: None,
            course_number: None,
            period: None,
            term: None,
            filter_type: Combinator::And,
            limit: 100,
            offset: 50,
        }
    }

    fn assert_placeholders_gap_free(query: &CompiledQuery) {
        let re = Regex::new(r"\$(\d+)").unwrap();
        let ordinals: Vec<usize> = re
            .captures_iter(query.sql())
            .map(|c| c[1].parse().unwrap())
            .collect();
        let expected: Vec<usize> = (1..=query.args().len()).collect();
        assert_eq!(ordinals, expected, "{}", query.sql());
    }

    #[test]
    fn test_name_and_overview() {
        let request = SearchRequest {
            course_name: text("情報", Combinator::And),
            course_overview: text("科学", Combinator::And),
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((course_name like $1 )and(course_overview like $2 ))order by id asc limit $3 offset $4"
        );
        assert_eq!(query.args(), ["%情報%", "%科学%", "100", "50"]);
    }

    #[test]
    fn test_name_or_overview() {
        let request = SearchRequest {
            course_name: text("情報", Combinator::And),
            course_overview: text("科学", Combinator::And),
            filter_type: Combinator::Or,
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((course_name like $1 )or(course_overview like $2 ))order by id asc limit $3 offset $4"
        );
    }

    #[test]
    fn test_single_field() {
        let request = SearchRequest {
            course_name: text("情報", Combinator::And),
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((course_name like $1 ))order by id asc limit $2 offset $3"
        );
        assert_eq!(query.args(), ["%情報%", "100", "50"]);

        let request = SearchRequest {
            course_overview: text("科学", Combinator::Or),
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((course_overview like $1 ))order by id asc limit $2 offset $3"
        );
    }

    #[test]
    fn test_words_use_field_combinator() {
        let request = SearchRequest {
            course_name: text("情報 社会", Combinator::Or),
            course_overview: text("法　制度 入門", Combinator::And),
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((course_name like $1 or course_name like $2 )and(course_overview like $3 and course_overview like $4 and course_overview like $5 ))order by id asc limit $6 offset $7"
        );
        assert_eq!(
            query.args(),
            ["%情報%", "%社会%", "%法%", "%制度%", "%入門%", "100", "50"]
        );
        assert_placeholders_gap_free(&query);
    }

    #[test]
    fn test_period_predicate() {
        let request = SearchRequest {
            period: Some("木3木4".to_string()),
            limit: 50,
            offset: 0,
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((array[$1, $2]::varchar[] @> period_ and array[]::varchar[] <> period_))order by id asc limit $3 offset $4"
        );
        assert_eq!(query.args(), ["木3", "木4", "50", "0"]);
    }

    #[test]
    fn test_term_predicate() {
        let request = SearchRequest {
            term: Some("春A春B".to_string()),
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses where ((array[$1, $2]::int[] @> term and array[]::int[] <> term))order by id asc limit $3 offset $4"
        );
        assert_eq!(query.args(), ["1", "2", "100", "50"]);
    }

    #[test]
    fn test_every_field() {
        let request = SearchRequest {
            course_name: text("情報", Combinator::And),
            course_overview: text("科学 技術", Combinator::Or),
            course_number: text("GA1", Combinator::And),
            period: Some("月火3".to_string()),
            term: Some("秋ABC".to_string()),
            filter_type: Combinator::Or,
            ..base_request()
        };
        let query = compile(&request, CompileMode::Search).unwrap();
        assert_eq!(
            query.args(),
            ["%情報%", "%科学%", "%技術%", "%GA1%", "月3", "火3", "4", "5", "6", "100", "50"]
        );
        assert!(query.sql().contains(")or(course_number like $4 )or("));
        assert_placeholders_gap_free(&query);
    }

    #[test]
    fn test_statement_text_follows_input_shape() {
        let mut statements = Vec::new();
        for (name, period) in [("情報", "月1"), ("情報 社会", "月1"), ("情報", "月1-3"), ("法", "火2")] {
            let request = SearchRequest {
                course_name: text(name, Combinator::And),
                period: Some(period.to_string()),
                ..base_request()
            };
            statements.push(compile(&request, CompileMode::Search).unwrap().into_parts().0);
        }

        assert_ne!(statements[0], statements[1]);
        assert_ne!(statements[0], statements[2]);
        assert_eq!(statements[0], statements[3]);
    }

    #[test]
    fn test_facet() {
        let request = SearchRequest {
            course_name: text("情報", Combinator::And),
            term: Some("通年".to_string()),
            ..base_request()
        };
        let query = compile(&request, CompileMode::Facet).unwrap();
        assert_eq!(
            query.sql(),
            "select term, count(term) as term_count from(select unnest(term) as term from courses where ((course_name like $1 )and(array[$2]::int[] @> term and array[]::int[] <> term))) as s1 group by term"
        );
        assert_eq!(query.args(), ["%情報%", "9"]);
        assert!(!query.sql().contains("limit"));
        assert!(!query.sql().contains("offset"));
        assert!(!query.sql().contains("order by"));
    }

    #[test]
    fn test_empty_filter_omits_where() {
        let query = compile(&base_request(), CompileMode::Search).unwrap();
        assert_eq!(
            query.sql(),
            "select * from courses order by id asc limit $1 offset $2"
        );
        assert_eq!(query.args(), ["100", "50"]);

        let query = compile(&base_request(), CompileMode::Facet).unwrap();
        assert_eq!(
            query.sql(),
            "select term, count(term) as term_count from(select unnest(term) as term from courses ) as s1 group by term"
        );
        assert!(query.args().is_empty());
    }

    #[test]
    fn test_errors_propagate() {
        let request = SearchRequest {
            period: Some("3".to_string()),
            ..base_request()
        };
        let err = compile(&request, CompileMode::Search).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Period(PeriodParseError::MissingDay { .. })
        ));

        let request = SearchRequest {
            term: Some("冬".to_string()),
            ..base_request()
        };
        let err = compile(&request, CompileMode::Facet).unwrap_err();
        assert!(matches!(err, QueryError::UnrecognizedTerm { .. }));
    }
}
