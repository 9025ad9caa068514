//! Transaction selection shared by the insights aggregator and drill-down
//!
//! Both views run the exact same predicate so a drill-down table always lists
//! the transactions behind the aggregate it was opened from.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Account, Transaction, TransactionSource};

/// Label used for transactions without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Trailing time range selected when no explicit month/year is given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// The last N days, ending today
    TrailingDays(u32),
    /// January 1st of the current year through today
    YearToDate,
    All,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::TrailingDays(365)
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "ytd" => Ok(Self::YearToDate),
            "all" => Ok(Self::All),
            _ => s
                .strip_suffix('d')
                .and_then(|days| days.parse::<u32>().ok())
                .map(Self::TrailingDays)
                .ok_or_else(|| format!("Unknown time range: {} (valid: Nd, ytd, all)", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrailingDays(days) => write!(f, "{}d", days),
            Self::YearToDate => write!(f, "ytd"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Restrict transactions by where they came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    #[default]
    All,
    Manual,
    Linked,
}

impl SourceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Manual => "manual",
            Self::Linked => "linked",
        }
    }

    pub fn accepts(&self, source: TransactionSource) -> bool {
        match self {
            Self::All => true,
            Self::Manual => source == TransactionSource::Manual,
            Self::Linked => source == TransactionSource::Linked,
        }
    }
}

impl FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "manual" => Ok(Self::Manual),
            "linked" | "plaid" => Ok(Self::Linked),
            _ => Err(format!(
                "Unknown source filter: {} (valid: all, manual, linked)",
                s
            )),
        }
    }
}

impl std::fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The span of dates a filter selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Range(TimeRange),
    /// One calendar month; takes precedence over any time range
    Month { year: i32, month: u32 },
    /// One calendar year
    Year(i32),
}

impl Default for Period {
    fn default() -> Self {
        Self::Range(TimeRange::default())
    }
}

impl Period {
    /// Combine the optional month/year selectors with a fallback time range
    pub fn resolve(month: Option<u32>, year: Option<i32>, range: TimeRange) -> Result<Self> {
        match (month, year) {
            (Some(month), Some(year)) => {
                if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
                    return Err(Error::InvalidData(format!(
                        "Invalid month: {}-{:02}",
                        year, month
                    )));
                }
                Ok(Self::Month { year, month })
            }
            (None, Some(year)) => {
                if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
                    return Err(Error::InvalidData(format!("Invalid year: {}", year)));
                }
                Ok(Self::Year(year))
            }
            (Some(month), None) => Err(Error::InvalidData(format!(
                "Month {} given without a year",
                month
            ))),
            (None, None) => Ok(Self::Range(range)),
        }
    }

    /// Resolve the inclusive date window relative to `today`
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        match *self {
            Self::Range(TimeRange::All) => DateWindow::UNBOUNDED,
            Self::Range(TimeRange::YearToDate) => DateWindow {
                start: NaiveDate::from_ymd_opt(today.year(), 1, 1),
                end: Some(today),
            },
            Self::Range(TimeRange::TrailingDays(days)) => DateWindow {
                start: Some(
                    today
                        .checked_sub_days(Days::new(u64::from(days)))
                        .unwrap_or(NaiveDate::MIN),
                ),
                end: Some(today),
            },
            Self::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1);
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                };
                match (start, next.and_then(|d| d.pred_opt())) {
                    (Some(start), Some(end)) => DateWindow {
                        start: Some(start),
                        end: Some(end),
                    },
                    _ => DateWindow::EMPTY,
                }
            }
            Self::Year(year) => {
                match (
                    NaiveDate::from_ymd_opt(year, 1, 1),
                    NaiveDate::from_ymd_opt(year, 12, 31),
                ) {
                    (Some(start), Some(end)) => DateWindow {
                        start: Some(start),
                        end: Some(end),
                    },
                    _ => DateWindow::EMPTY,
                }
            }
        }
    }
}

/// Inclusive date bounds; `None` leaves that side open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub const UNBOUNDED: Self = Self {
        start: None,
        end: None,
    };

    const EMPTY: Self = Self {
        start: Some(NaiveDate::MAX),
        end: Some(NaiveDate::MIN),
    };

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Active insight filter
///
/// `Filter::default()` selects the trailing 365 days from every source with no
/// exclusions. Hosts add the configured transfer/payment exclusions with
/// [`Filter::with_exclusions`].
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub period: Period,
    pub source: SourceFilter,
    /// Only this category (`None` = all)
    pub category: Option<String>,
    pub excluded_categories: Vec<String>,
    pub excluded_patterns: Vec<Regex>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn source(mut self, source: SourceFilter) -> Self {
        self.source = source;
        self
    }

    /// Restrict to one category; "All" or an empty string clears the restriction
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_string);
        self
    }

    /// Exclude internal money movement (transfers, card payments)
    ///
    /// Categories compare case-insensitively; patterns are case-insensitive
    /// regexes matched against the description.
    pub fn with_exclusions(mut self, categories: &[String], patterns: &[String]) -> Result<Self> {
        self.excluded_categories = categories.to_vec();
        self.excluded_patterns = patterns
            .iter()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(self)
    }

    fn is_excluded(&self, tx: &Transaction) -> bool {
        let category_excluded = tx.category.as_deref().is_some_and(|c| {
            self.excluded_categories
                .iter()
                .any(|ex| ex.eq_ignore_ascii_case(c))
        });
        category_excluded || self.excluded_patterns.iter().any(|re| re.is_match(&tx.description))
    }
}

/// Display category for a transaction, folding missing/empty into `UNCATEGORIZED`
pub fn category_label(tx: &Transaction) -> &str {
    match tx.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => UNCATEGORIZED,
    }
}

/// A filter resolved against a point in time and an account set
pub(crate) struct Selection<'a> {
    filter: &'a Filter,
    window: DateWindow,
    accounts: HashMap<i64, &'a Account>,
}

impl<'a> Selection<'a> {
    pub(crate) fn new(filter: &'a Filter, accounts: &'a [Account], today: NaiveDate) -> Self {
        Self {
            filter,
            window: filter.period.window(today),
            accounts: accounts.iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub(crate) fn window(&self) -> DateWindow {
        self.window
    }

    /// Whether a transaction belongs to the selected subset
    ///
    /// Transactions of hidden accounts never match. A transaction whose account
    /// is unknown is treated as manually entered.
    pub(crate) fn matches(&self, tx: &Transaction) -> bool {
        if !self.window.contains(tx.date) {
            return false;
        }

        let source = match self.accounts.get(&tx.account_id) {
            Some(account) if account.is_hidden => return false,
            Some(account) => account.source(),
            None => TransactionSource::Manual,
        };
        if !self.filter.source.accepts(source) {
            return false;
        }

        if let Some(ref wanted) = self.filter.category {
            // Same key the distribution groups by
            if category_label(tx) != wanted.as_str() {
                return false;
            }
        }

        !self.filter.is_excluded(tx)
    }
}
