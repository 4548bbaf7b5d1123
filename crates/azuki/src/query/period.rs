//! Normalization of compact schedule expressions such as `月1-3木4` or `集中`.
//!
//! An expression is a sequence of groups. Each group is one or more day-classes
//! followed by one or more period digits, and every group expands to the
//! cartesian product of its days and periods. The special words 集中, 応談
//! and 随時 are a day-class with the placeholder period `0`.

use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a period expression.
///
/// Positions and fragments refer to the expression after whitespace and
/// list separators have been stripped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    /// A character that is neither a day-class, a period digit nor a dash
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    /// A range whose bounds are not ascending periods between 1 and 8
    #[error("invalid period range: {range}")]
    InvalidRange { range: String },

    /// Day-classes that are never followed by a period
    #[error("no period given for: {group}")]
    MissingPeriod { group: String },

    /// Periods that are not preceded by any day-class
    #[error("no day given for: {group}")]
    MissingDay { group: String },
}

/// A weekday or one of the special scheduling classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayClass {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    /// 集中
    Intensive,
    /// 応談
    ByArrangement,
    /// 随時
    Anytime,
}

impl DayClass {
    fn from_symbol(c: char) -> Option<Self> {
        let day = match c {
            '月' => DayClass::Monday,
            '火' => DayClass::Tuesday,
            '水' => DayClass::Wednesday,
            '木' => DayClass::Thursday,
            '金' => DayClass::Friday,
            '土' => DayClass::Saturday,
            '日' => DayClass::Sunday,
            '集' => DayClass::Intensive,
            '応' => DayClass::ByArrangement,
            '随' => DayClass::Anytime,
            _ => return None,
        };
        Some(day)
    }

    /// Second character of the special word, e.g. `中` for 集中.
    fn word_tail(self) -> Option<char> {
        match self {
            DayClass::Intensive => Some('中'),
            DayClass::ByArrangement => Some('談'),
            DayClass::Anytime => Some('時'),
            _ => None,
        }
    }

    /// Returns true for the non-weekday classes.
    pub fn is_special(self) -> bool {
        self.word_tail().is_some()
    }

    /// The text this class renders as inside a period token.
    pub fn as_str(self) -> &'static str {
        match self {
            DayClass::Monday => "月",
            DayClass::Tuesday => "火",
            DayClass::Wednesday => "水",
            DayClass::Thursday => "木",
            DayClass::Friday => "金",
            DayClass::Saturday => "土",
            DayClass::Sunday => "日",
            DayClass::Intensive => "集中",
            DayClass::ByArrangement => "応談",
            DayClass::Anytime => "随時",
        }
    }
}

/// A canonical `<day><period>` token such as `木3` or `集中`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodToken {
    day: DayClass,
    /// `0` is the placeholder slot of the special classes
    period: u8,
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.day.is_special() && self.period == 0 {
            f.write_str(self.day.as_str())
        } else {
            write!(f, "{}{}", self.day.as_str(), self.period)
        }
    }
}

/// Distinct period tokens in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodSet(Vec<PeriodToken>);

impl PeriodSet {
    fn insert(&mut self, token: PeriodToken) {
        if !self.0.contains(&token) {
            self.0.push(token);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders every token, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Lexeme {
    Day(DayClass),
    Period(u8),
}

/// A lexeme together with the char range it was read from.
#[derive(Debug, Clone, Copy)]
struct Spanned {
    lexeme: Lexeme,
    start: usize,
    end: usize,
}

struct Group {
    days: Vec<DayClass>,
    periods: Vec<u8>,
    start: usize,
    end: usize,
}

/// Parses a period expression into its distinct tokens.
///
/// Empty (or whitespace-only) input yields an empty set.
pub fn normalize(raw: &str) -> Result<PeriodSet, PeriodParseError> {
    let chars = strip_separators(raw);
    let lexemes = lex(&chars)?;

    let mut tokens = PeriodSet::default();
    for group in group(&chars, &lexemes)? {
        for &day in &group.days {
            for &period in &group.periods {
                tokens.insert(PeriodToken { day, period });
            }
        }
    }

    Ok(tokens)
}

fn strip_separators(raw: &str) -> Vec<char> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '・' | ','))
        .map(|c| if matches!(c, 'ー' | '－') { '-' } else { c })
        .collect()
}

fn period_digit(c: char) -> Option<u8> {
    c.to_digit(10).filter(|d| *d <= 8).map(|d| d as u8)
}

fn lex(chars: &[char]) -> Result<Vec<Spanned>, PeriodParseError> {
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(day) = DayClass::from_symbol(c) {
            let is_word = day
                .word_tail()
                .is_some_and(|tail| chars.get(i + 1) == Some(&tail));
            if is_word {
                lexemes.push(Spanned { lexeme: Lexeme::Day(day), start: i, end: i + 2 });
                lexemes.push(Spanned { lexeme: Lexeme::Period(0), start: i, end: i + 2 });
                i += 2;
            } else {
                lexemes.push(Spanned { lexeme: Lexeme::Day(day), start: i, end: i + 1 });
                i += 1;
            }
            continue;
        }

        let Some(first) = period_digit(c) else {
            return Err(PeriodParseError::UnexpectedChar { ch: c, position: i });
        };
        let start = i;
        lexemes.push(Spanned { lexeme: Lexeme::Period(first), start, end: i + 1 });
        i += 1;

        // `1-3-5` chains: each range starts where the previous one ended
        let mut low = first;
        while chars.get(i) == Some(&'-') {
            match chars.get(i + 1).copied().and_then(period_digit) {
                Some(high) if low >= 1 && low < high => {
                    for period in low + 1..=high {
                        lexemes.push(Spanned { lexeme: Lexeme::Period(period), start, end: i + 2 });
                    }
                    low = high;
                    i += 2;
                }
                _ => {
                    let end = (i + 2).min(chars.len());
                    return Err(PeriodParseError::InvalidRange {
                        range: chars[start..end].iter().collect(),
                    });
                }
            }
        }
    }

    Ok(lexemes)
}

fn group(chars: &[char], lexemes: &[Spanned]) -> Result<Vec<Group>, PeriodParseError> {
    let text = |start: usize, end: usize| chars[start..end].iter().collect::<String>();

    let mut groups = Vec::new();
    let mut current: Option<Group> = None;

    for spanned in lexemes {
        match spanned.lexeme {
            Lexeme::Day(day) => match current.as_mut() {
                Some(group) if group.periods.is_empty() => {
                    group.days.push(day);
                    group.end = spanned.end;
                }
                _ => {
                    let next = Group {
                        days: vec![day],
                        periods: Vec::new(),
                        start: spanned.start,
                        end: spanned.end,
                    };
                    if let Some(done) = current.replace(next) {
                        groups.push(done);
                    }
                }
            },
            Lexeme::Period(period) => match current.as_mut() {
                Some(group) => {
                    group.periods.push(period);
                    group.end = group.end.max(spanned.end);
                }
                None => {
                    let end = lexemes
                        .iter()
                        .find(|s| matches!(s.lexeme, Lexeme::Day(_)))
                        .map_or(chars.len(), |s| s.start);
                    return Err(PeriodParseError::MissingDay {
                        group: text(spanned.start, end),
                    });
                }
            },
        }
    }

    if let Some(last) = current {
        if last.periods.is_empty() {
            return Err(PeriodParseError::MissingPeriod {
                group: text(last.start, last.end),
            });
        }
        groups.push(last);
    }

    Ok(groups)
}
