//! Spending insights
//!
//! Turns transaction history into two views over the same filtered subset:
//!
//! - **Aggregate** - monthly fixed/variable trend and per-category distribution
//! - **Drill-down** - the matching transactions themselves, newest first
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_core::insights::{aggregate, drill_down, Filter, Period, TimeRange};
//!
//! let filter = Filter::new().period(Period::Range(TimeRange::TrailingDays(90)));
//! let insights = aggregate(&snapshot.transactions, &snapshot.accounts, &filter, today);
//! let rows = drill_down(&snapshot.transactions, &snapshot.accounts, &filter, today);
//! ```

pub mod aggregate;
pub mod drilldown;
pub mod filter;

pub use aggregate::{aggregate, distribution, CategoryTotal, SpendingInsights, TrendPoint};
pub use drilldown::{drill_down, DrillDownPage, DEFAULT_DISPLAY_LIMIT};
pub use filter::{
    category_label, DateWindow, Filter, Period, SourceFilter, TimeRange, UNCATEGORIZED,
};
