//! Course query validation and compilation to SQL.

mod builder;
mod compile;
mod error;
pub mod period;
mod request;
pub mod term;

pub use builder::{CompiledQuery, QueryBuilder};
pub use compile::{compile, CompileMode};
pub use error::QueryError;
pub use period::{normalize, DayClass, PeriodParseError, PeriodSet, PeriodToken};
pub use request::{Combinator, CourseQuery, SearchRequest, TextFilter};
pub use term::{recognize_terms, TermCode};
