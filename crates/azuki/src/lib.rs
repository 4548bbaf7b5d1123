//! Course catalog search backend.
//!
//! Course queries arrive as JSON, are validated into a [`query::SearchRequest`],
//! compiled to a single parameterized PostgreSQL statement and run through a
//! [`db::CourseRepository`].

pub mod config;
pub mod db;
pub mod query;
pub mod server;
pub mod types;
