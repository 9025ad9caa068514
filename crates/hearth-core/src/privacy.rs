//! Privacy overlay for rendered values
//!
//! Monetary figures are hidden behind fixed placeholders until the household PIN
//! is entered. The gate is a plain value handed to whatever renders output;
//! aggregation code never sees it.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Placeholder for hidden currency values
pub const MASKED_CURRENCY: &str = "$ *,***,**4";
/// Placeholder for hidden percentages
pub const MASKED_PERCENT: &str = "**.5%";
/// Placeholder for hidden free text
pub const MASKED_TEXT: &str = "**** Hidden ****";

/// Kind of value being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskKind {
    Currency,
    Percent,
    Text,
}

impl MaskKind {
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Currency => MASKED_CURRENCY,
            Self::Percent => MASKED_PERCENT,
            Self::Text => MASKED_TEXT,
        }
    }
}

/// Locked/unlocked presentation state. Starts locked.
#[derive(Clone)]
pub struct PrivacyGate {
    pin: String,
    unlocked: bool,
}

impl std::fmt::Debug for PrivacyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivacyGate")
            .field("unlocked", &self.unlocked)
            .finish_non_exhaustive()
    }
}

impl PrivacyGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            unlocked: false,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Check a PIN attempt without changing state
    pub fn verify(&self, attempt: &str) -> bool {
        self.pin.as_bytes().ct_eq(attempt.as_bytes()).into()
    }

    /// Reveal values if `attempt` matches the shared PIN
    pub fn unlock(&mut self, attempt: &str) -> Result<()> {
        if self.verify(attempt) {
            self.unlocked = true;
            info!("Privacy overlay unlocked");
            Ok(())
        } else {
            warn!("Privacy unlock rejected: incorrect PIN");
            Err(Error::Privacy("Incorrect PIN".to_string()))
        }
    }

    /// Hide values again; needs no credential
    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    pub fn currency(&self, value: f64) -> String {
        if self.unlocked {
            format_currency(value)
        } else {
            MASKED_CURRENCY.to_string()
        }
    }

    pub fn percent(&self, value: f64) -> String {
        if self.unlocked {
            format!("{:.1}%", value)
        } else {
            MASKED_PERCENT.to_string()
        }
    }

    pub fn text(&self, value: &str) -> String {
        if self.unlocked {
            value.to_string()
        } else {
            MASKED_TEXT.to_string()
        }
    }
}

/// Format a dollar amount with thousands separators, e.g. `-$1,234.56`
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${}", value);
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
