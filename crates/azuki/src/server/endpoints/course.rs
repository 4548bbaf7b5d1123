//! Course search endpoints.
//!
//! Every endpoint takes a JSON [`CourseQuery`] body, validates it and runs it
//! against the course repository.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::RepositoryError;
use crate::query::{CourseQuery, QueryError, SearchRequest};
use crate::server::export::{courses_to_csv, ExportError};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Row limit applied to CSV exports, whatever the request asked for.
const CSV_EXPORT_LIMIT: u64 = 10_000_000;

#[derive(Debug, Serialize)]
struct FacetResponse {
    term_facet: BTreeMap<i32, i64>,
}

fn rejection_to_response(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    ApiErrorType::from((
        rejection.status(),
        "Invalid request body",
        Some(rejection.body_text()),
    ))
    .into_response()
}

fn query_error_to_response(error: QueryError) -> Response {
    if error.is_client_error() {
        warn!("Invalid course query: {}", error);
        ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "Invalid course query",
            Some(error.to_string()),
        ))
        .into_response()
    } else {
        error!("Course data disagrees with the term table: {}", error);
        ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unexpected course data",
            Some(error.to_string()),
        ))
        .into_response()
    }
}

fn repository_error_to_response(error: RepositoryError, message: &str) -> Response {
    if error.is_client_error() {
        warn!("Invalid course query: {}", error);
        ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "Invalid course query",
            Some(error.to_string()),
        ))
        .into_response()
    } else {
        error!("{}: {}", message, error);
        ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            Some(error.to_string()),
        ))
        .into_response()
    }
}

/// Unwraps and validates the request body.
fn validated(
    payload: Result<Json<CourseQuery>, JsonRejection>,
) -> Result<SearchRequest, Response> {
    let Json(query) = payload.map_err(rejection_to_response)?;
    query.validate().map_err(query_error_to_response)
}

/// POST /course/search
///
/// Returns the matching courses as a JSON array.
pub async fn post_search(
    State(s): State<Arc<AppState>>,
    payload: Result<Json<CourseQuery>, JsonRejection>,
) -> Response {
    info!("POST /course/search");

    let request = match validated(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match s.repository.search(&request).await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => repository_error_to_response(e, "Failed to search courses"),
    }
}

/// POST /course/csv
///
/// Returns every matching course as a CSV file. Pagination in the request is
/// ignored.
pub async fn post_csv(
    State(s): State<Arc<AppState>>,
    payload: Result<Json<CourseQuery>, JsonRejection>,
) -> Response {
    info!("POST /course/csv");

    let request = match validated(payload) {
        Ok(request) => request.with_page(CSV_EXPORT_LIMIT, 0),
        Err(response) => return response,
    };

    let courses = match s.repository.search(&request).await {
        Ok(courses) => courses,
        Err(e) => return repository_error_to_response(e, "Failed to search courses"),
    };

    match courses_to_csv(&courses) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=UTF-8")],
            body,
        )
            .into_response(),
        Err(ExportError::Term(e)) => query_error_to_response(e),
        Err(e) => {
            error!("Failed to render CSV: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to render CSV",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// POST /course/facet
///
/// Returns the number of matching courses per term code, as
/// `{"term_facet": {"<code>": <count>}}`.
pub async fn post_facet(
    State(s): State<Arc<AppState>>,
    payload: Result<Json<CourseQuery>, JsonRejection>,
) -> Response {
    info!("POST /course/facet");

    let request = match validated(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match s.repository.facet(&request).await {
        Ok(facets) => {
            let term_facet = facets
                .into_iter()
                .map(|facet| (facet.term, facet.term_count))
                .collect();
            (StatusCode::OK, Json(FacetResponse { term_facet })).into_response()
        }
        Err(e) => repository_error_to_response(e, "Failed to compute facets"),
    }
}
