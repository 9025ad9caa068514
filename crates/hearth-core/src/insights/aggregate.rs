//! Monthly spend trend and category distribution

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::filter::{category_label, DateWindow, Filter, Selection};
use crate::models::{Account, Transaction};

/// Bounded windows wider than this are walked from the first to the last populated month
const MAX_TREND_MONTHS: i64 = 1200;

/// Fixed vs variable spend for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// e.g. "Jan 2025"
    pub period: String,
    pub fixed: f64,
    pub variable: f64,
}

/// Total spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingInsights {
    pub trend: Vec<TrendPoint>,
    pub distribution: Vec<CategoryTotal>,
}

/// Bucket the transactions passing `filter` into a trend and a distribution
///
/// Amounts are summed as stored: refunds reduce their bucket.
pub fn aggregate(
    transactions: &[Transaction],
    accounts: &[Account],
    filter: &Filter,
    today: NaiveDate,
) -> SpendingInsights {
    let selection = Selection::new(filter, accounts, today);

    // (year, month) -> (fixed, variable)
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    let mut categories: HashMap<&str, f64> = HashMap::new();
    let mut matched = 0usize;

    for tx in transactions.iter().filter(|tx| selection.matches(tx)) {
        matched += 1;
        let bucket = months
            .entry((tx.date.year(), tx.date.month()))
            .or_insert((0.0, 0.0));
        if tx.is_fixed == Some(true) {
            bucket.0 += tx.amount;
        } else {
            bucket.1 += tx.amount;
        }
        *categories.entry(category_label(tx)).or_insert(0.0) += tx.amount;
    }

    debug!(
        matched,
        total = transactions.len(),
        "Aggregated spending insights"
    );

    SpendingInsights {
        trend: build_trend(&months, selection.window()),
        distribution: distribution_from(categories),
    }
}

/// Sum amounts per category, sorted by value descending then name ascending
pub fn distribution<'a, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut categories: HashMap<&str, f64> = HashMap::new();
    for tx in transactions {
        *categories.entry(category_label(tx)).or_insert(0.0) += tx.amount;
    }
    distribution_from(categories)
}

fn distribution_from(categories: HashMap<&str, f64>) -> Vec<CategoryTotal> {
    let mut distribution: Vec<CategoryTotal> = categories
        .into_iter()
        .map(|(category, value)| CategoryTotal {
            category: category.to_string(),
            value,
        })
        .collect();
    distribution.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.category.cmp(&b.category))
    });
    distribution
}

/// One point per month of the window, zero-filled where nothing was spent
///
/// An unbounded window spans the first to the last populated month. No matches
/// yields an empty trend.
fn build_trend(months: &BTreeMap<(i32, u32), (f64, f64)>, window: DateWindow) -> Vec<TrendPoint> {
    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    let (start, end) = match (window.start, window.end) {
        (Some(s), Some(e)) if month_span(s, e) <= MAX_TREND_MONTHS => (
            (s.year(), s.month()).min(first),
            (e.year(), e.month()).max(last),
        ),
        _ => (first, last),
    };

    let mut trend = Vec::new();
    let (mut year, mut month) = start;
    while (year, month) <= end {
        let (fixed, variable) = months.get(&(year, month)).copied().unwrap_or((0.0, 0.0));
        trend.push(TrendPoint {
            period: month_label(year, month),
            fixed,
            variable,
        });
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    trend
}

fn month_span(start: NaiveDate, end: NaiveDate) -> i64 {
    i64::from(end.year() - start.year()) * 12 + i64::from(end.month()) - i64::from(start.month())
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:02} {}", month, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::filter::{Period, SourceFilter, TimeRange};
    use crate::insights::drill_down;
    use crate::models::AccountType;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tx(id: i64, d: &str, amount: f64, category: Option<&str>, fixed: Option<bool>) -> Transaction {
        Transaction {
            id,
            account_id: 1,
            date: date(d),
            description: format!("Purchase {}", id),
            amount,
            category: category.map(str::to_string),
            tax_deductible: false,
            tags: None,
            is_fixed: fixed,
            created_at: Utc::now(),
        }
    }

    fn january_2025() -> Filter {
        Filter::new().period(Period::Month {
            year: 2025,
            month: 1,
        })
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(1, "2024-11-03", 40.0, Some("Dining"), None),
            tx(2, "2025-01-05", 1200.0, Some("Rent"), Some(true)),
            tx(3, "2025-01-09", 80.0, Some("Groceries"), Some(false)),
            tx(4, "2025-01-15", -20.0, Some("Groceries"), None),
            tx(5, "2025-02-02", 35.0, None, None),
            tx(6, "2025-02-10", 35.0, Some(""), None),
        ]
    }

    #[test]
    fn test_january_scenario() {
        let transactions = vec![
            tx(1, "2025-01-10", 100.0, None, Some(true)),
            tx(2, "2025-01-20", 50.0, None, Some(false)),
        ];
        let insights = aggregate(&transactions, &[], &january_2025(), date("2025-03-01"));
        assert_eq!(
            insights.trend,
            vec![TrendPoint {
                period: "Jan 2025".to_string(),
                fixed: 100.0,
                variable: 50.0,
            }]
        );
    }

    #[test]
    fn test_empty_window_yields_empty_arrays() {
        let filter = Filter::new().period(Period::Month {
            year: 2019,
            month: 6,
        });
        let insights = aggregate(&sample(), &[], &filter, date("2025-03-01"));
        assert!(insights.trend.is_empty());
        assert!(insights.distribution.is_empty());

        assert_eq!(
            aggregate(&[], &[], &Filter::default(), date("2025-03-01")),
            SpendingInsights::default()
        );
    }

    #[test]
    fn test_trend_fills_gaps() {
        let filter = Filter::new().period(Period::Range(TimeRange::All));
        let insights = aggregate(&sample(), &[], &filter, date("2025-03-01"));
        let periods: Vec<&str> = insights.trend.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["Nov 2024", "Dec 2024", "Jan 2025", "Feb 2025"]);
        assert_eq!(insights.trend[1].fixed, 0.0);
        assert_eq!(insights.trend[1].variable, 0.0);
    }

    #[test]
    fn test_trend_covers_bounded_window() {
        let transactions = vec![tx(1, "2025-02-10", 25.0, Some("Dining"), None)];

        let trailing = Filter::new().period(Period::Range(TimeRange::TrailingDays(89)));
        let insights = aggregate(&transactions, &[], &trailing, date("2025-03-31"));
        let periods: Vec<&str> = insights.trend.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);
        assert_eq!(insights.trend[0].variable, 0.0);
        assert_eq!(insights.trend[1].variable, 25.0);
        assert_eq!(insights.trend[2].variable, 0.0);

        let june = vec![tx(1, "2024-06-15", 10.0, None, None)];
        let year = Filter::new().period(Period::Year(2024));
        let insights = aggregate(&june, &[], &year, date("2025-03-31"));
        assert_eq!(insights.trend.len(), 12);
        assert_eq!(insights.trend[0].period, "Jan 2024");
        assert_eq!(insights.trend[11].period, "Dec 2024");
        assert_eq!(insights.trend[5].variable, 10.0);
    }

    #[test]
    fn test_oversized_window_falls_back_to_data_span() {
        let transactions = vec![
            tx(1, "2025-01-10", 5.0, None, None),
            tx(2, "2025-03-10", 5.0, None, None),
        ];
        let filter = Filter::new().period(Period::Range(TimeRange::TrailingDays(u32::MAX)));
        let insights = aggregate(&transactions, &[], &filter, date("2025-03-31"));
        assert_eq!(insights.trend.len(), 3);
    }

    #[test]
    fn test_trend_sum_matches_passing_amounts() {
        let filter = Filter::new().period(Period::Range(TimeRange::All));
        let today = date("2025-03-01");
        let insights = aggregate(&sample(), &[], &filter, today);

        let trend_total: f64 = insights.trend.iter().map(|p| p.fixed + p.variable).sum();
        let passing_total: f64 = drill_down(&sample(), &[], &filter, today)
            .iter()
            .map(|t| t.amount)
            .sum();
        assert!((trend_total - passing_total).abs() < 1e-9);
    }

    #[test]
    fn test_refunds_summed_as_is() {
        let insights = aggregate(&sample(), &[], &january_2025(), date("2025-03-01"));
        let groceries = insights
            .distribution
            .iter()
            .find(|c| c.category == "Groceries")
            .unwrap();
        assert_eq!(groceries.value, 60.0);
        assert_eq!(insights.trend[0].variable, 60.0);
    }

    #[test]
    fn test_uncategorized_and_ordering() {
        let filter = Filter::new().period(Period::Range(TimeRange::All));
        let insights = aggregate(&sample(), &[], &filter, date("2025-03-01"));

        assert_eq!(insights.distribution[0].category, "Rent");
        let uncategorized = insights
            .distribution
            .iter()
            .find(|c| c.category == "Uncategorized")
            .unwrap();
        assert_eq!(uncategorized.value, 70.0);

        let tied = distribution(&[
            tx(1, "2025-01-01", 10.0, Some("Zoo"), None),
            tx(2, "2025-01-01", 10.0, Some("Art"), None),
        ]);
        assert_eq!(tied[0].category, "Art");
        assert_eq!(tied[1].category, "Zoo");
    }

    #[test]
    fn test_distribution_matches_drill_down() {
        let accounts = vec![Account {
            id: 1,
            name: "Checking".to_string(),
            account_type: AccountType::Checking,
            balance: 0.0,
            institution_name: "Bank".to_string(),
            item_id: Some("item".to_string()),
            is_hidden: false,
            created_at: Utc::now(),
        }];
        let today = date("2025-03-01");

        for source in [SourceFilter::All, SourceFilter::Linked, SourceFilter::Manual] {
            let filter = Filter::new()
                .period(Period::Range(TimeRange::TrailingDays(90)))
                .source(source);
            let insights = aggregate(&sample(), &accounts, &filter, today);
            let rows = drill_down(&sample(), &accounts, &filter, today);
            assert_eq!(insights.distribution, distribution(&rows), "{}", source);
        }
    }

    #[test]
    fn test_category_drill_down_matches_its_bar() {
        let transactions = vec![
            tx(1, "2025-01-05", 10.0, Some("Groceries"), None),
            tx(2, "2025-01-06", 5.0, Some("groceries"), None),
        ];
        let today = date("2025-03-01");
        let all = Filter::new().period(Period::Range(TimeRange::All));
        let insights = aggregate(&transactions, &[], &all, today);
        assert_eq!(insights.distribution.len(), 2);

        for bar in &insights.distribution {
            let filter = all.clone().category(Some(bar.category.as_str()));
            let rows = drill_down(&transactions, &[], &filter, today);
            let total: f64 = rows.iter().map(|t| t.amount).sum();
            assert_eq!(rows.len(), 1, "{}", bar.category);
            assert_eq!(total, bar.value);
        }
    }
}
