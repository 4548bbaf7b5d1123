//! Term-of-offering recognition (春A, 秋BC, 通年, ...) and the stable term codes.

use regex::RegexSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::error::QueryError;

/// A term of offering. The discriminant is the code stored in the `term` column
/// and exposed to clients, so it must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermCode {
    SpringA = 1,
    SpringB = 2,
    SpringC = 3,
    FallA = 4,
    FallB = 5,
    FallC = 6,
    SummerRecess = 7,
    SpringRecess = 8,
    FullYear = 9,
    SpringSemester = 10,
    FallSemester = 11,
}

impl TermCode {
    /// Every term, in code order.
    pub const ALL: [TermCode; 11] = [
        TermCode::SpringA,
        TermCode::SpringB,
        TermCode::SpringC,
        TermCode::FallA,
        TermCode::FallB,
        TermCode::FallC,
        TermCode::SummerRecess,
        TermCode::SpringRecess,
        TermCode::FullYear,
        TermCode::SpringSemester,
        TermCode::FallSemester,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Canonical label, e.g. `春A`.
    pub fn label(self) -> &'static str {
        match self {
            TermCode::SpringA => "春A",
            TermCode::SpringB => "春B",
            TermCode::SpringC => "春C",
            TermCode::FallA => "秋A",
            TermCode::FallB => "秋B",
            TermCode::FallC => "秋C",
            TermCode::SummerRecess => "夏季休業中",
            TermCode::SpringRecess => "春季休業中",
            TermCode::FullYear => "通年",
            TermCode::SpringSemester => "春学期",
            TermCode::FallSemester => "秋学期",
        }
    }

    /// Substrings whose presence selects this term. Module spans such as
    /// `春AB` or `春ABC` select every module they cover.
    fn triggers(self) -> &'static [&'static str] {
        match self {
            TermCode::SpringA => &["春A", "春AA", "春AB", "春BA", "春AC", "春CA", "春ABC"],
            TermCode::SpringB => &["春B", "春BA", "春AB", "春BB", "春BC", "春CB", "春ABC"],
            TermCode::SpringC => &["春C", "春CA", "春AC", "春CB", "春BC", "春CC", "春ABC"],
            TermCode::FallA => &["秋A", "秋AA", "秋AB", "秋BA", "秋AC", "秋CA", "秋ABC"],
            TermCode::FallB => &["秋B", "秋BA", "秋AB", "秋BB", "秋BC", "秋CB", "秋ABC"],
            TermCode::FallC => &["秋C", "秋CA", "秋AC", "秋CB", "秋BC", "秋CC", "秋ABC"],
            TermCode::SummerRecess => &["夏季休業中"],
            TermCode::SpringRecess => &["春季休業中"],
            TermCode::FullYear => &["通年"],
            TermCode::SpringSemester => &["春学期"],
            TermCode::FallSemester => &["秋学期"],
        }
    }

    /// Looks up a term by its stored code.
    pub fn from_code(code: i32) -> Result<Self, QueryError> {
        TermCode::ALL
            .into_iter()
            .find(|term| term.code() == code)
            .ok_or(QueryError::UnknownTermCode { code })
    }
}

impl FromStr for TermCode {
    type Err = QueryError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        TermCode::ALL
            .into_iter()
            .find(|term| term.label() == label)
            .ok_or_else(|| QueryError::UnknownTermLabel {
                label: label.to_string(),
            })
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// One pattern per entry of `TermCode::ALL`, so match indices map straight back
static TERM_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(TermCode::ALL.iter().map(|term| {
        term.triggers()
            .iter()
            .map(|trigger| regex::escape(trigger))
            .collect::<Vec<_>>()
            .join("|")
    }))
    .unwrap()
});

/// Returns every term mentioned in `raw`, in code order.
///
/// Terms are tested independently, so a span like `春ABC` yields all three
/// spring modules. An empty result on non-empty input means the expression
/// contains no known term.
pub fn recognize_terms(raw: &str) -> Vec<TermCode> {
    if raw.is_empty() {
        return Vec::new();
    }

    TERM_PATTERNS
        .matches(raw)
        .into_iter()
        .map(|index| TermCode::ALL[index])
        .collect()
}
