/// Database module for querying the course catalog
mod types;

pub use types::{Course, Facet};

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, PoolError, Runtime};
use thiserror::Error;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{NoTls, Row};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::query::{compile, CompileMode, CompiledQuery, QueryError, SearchRequest};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_courses.sql");

/// Errors that can occur while running a course query.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The pool could not be built or did not hand out a connection
    #[error("Connection pool error: {message}")]
    Pool { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    /// The statement and its arguments disagree on the number of parameters
    #[error("Statement expects {expected} parameters, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// A text argument could not be converted to its parameter type
    #[error("Cannot bind {value:?} as {sql_type}")]
    Argument { value: String, sql_type: String },

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl RepositoryError {
    /// Returns true if the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            RepositoryError::Query(e) => e.is_client_error(),
            _ => false,
        }
    }
}

impl From<tokio_postgres::Error> for RepositoryError {
    fn from(err: tokio_postgres::Error) -> Self {
        RepositoryError::Database {
            message: err.to_string(),
        }
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::Pool {
            message: err.to_string(),
        }
    }
}

/// Read access to the course catalog.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Returns the courses matching `request`, ordered by id and paginated.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Course>, RepositoryError>;

    /// Counts the courses matching `request` per term code.
    async fn facet(&self, request: &SearchRequest) -> Result<Vec<Facet>, RepositoryError>;
}

pub struct PostgresCourseRepository {
    pool: Pool,
}

impl PostgresCourseRepository {
    /// Creates a repository backed by a new connection pool.
    ///
    /// No connection is opened until the first query.
    pub fn new(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());

        let pool = cfg
            .builder(NoTls)
            .map_err(|e| RepositoryError::Pool {
                message: format!("Failed to create pool builder: {}", e),
            })?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RepositoryError::Pool {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Creates the `courses` table and its indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), RepositoryError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn query(&self, query: &CompiledQuery) -> Result<Vec<Row>, RepositoryError> {
        debug!("Executing {} with {:?}", query.sql(), query.args());

        let client = self.pool.get().await?;
        // Statement text depends on word and token counts, so it is not cached
        let statement = client.prepare(query.sql()).await?;
        let params = coerce_args(statement.params(), query.args())?;
        let param_refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        Ok(client.query(&statement, &param_refs).await?)
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Course>, RepositoryError> {
        let query = compile(request, CompileMode::Search)?;
        let rows = self.query(&query).await?;
        let courses = rows
            .iter()
            .map(Course::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Search returned {} courses", courses.len());
        Ok(courses)
    }

    async fn facet(&self, request: &SearchRequest) -> Result<Vec<Facet>, RepositoryError> {
        let query = compile(request, CompileMode::Facet)?;
        let rows = self.query(&query).await?;
        Ok(rows
            .iter()
            .map(Facet::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

/// Converts the text arguments to the parameter types the server inferred.
///
/// Integer parameters (`limit`, `offset`, ...) are parsed; everything else is
/// sent as text.
fn coerce_args(
    types: &[Type],
    args: &[String],
) -> Result<Vec<Box<dyn ToSql + Sync + Send>>, RepositoryError> {
    if types.len() != args.len() {
        return Err(RepositoryError::ArgumentCount {
            expected: types.len(),
            actual: args.len(),
        });
    }

    let mut params: Vec<Box<dyn ToSql + Sync + Send>> = Vec::with_capacity(args.len());
    for (ty, value) in types.iter().zip(args) {
        let invalid = || RepositoryError::Argument {
            value: value.clone(),
            sql_type: ty.name().to_string(),
        };

        if *ty == Type::INT2 {
            params.push(Box::new(value.parse::<i16>().map_err(|_| invalid())?));
        } else if *ty == Type::INT4 {
            params.push(Box::new(value.parse::<i32>().map_err(|_| invalid())?));
        } else if *ty == Type::INT8 {
            params.push(Box::new(value.parse::<i64>().map_err(|_| invalid())?));
        } else {
            params.push(Box::new(value.clone()));
        }
    }

    Ok(params)
}
