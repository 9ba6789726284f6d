use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::LoanTypeId;
use crate::loan::LoanRequest;

/// Page geometry in millimetres. Defaults to portrait A4.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// first usable line below the page header
    pub content_top: f64,
    pub bottom_margin: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 15.0,
            content_top: 40.0,
            bottom_margin: 20.0,
        }
    }
}

/// Minimum space, in page units, that must remain before a section starts;
/// anything less moves the section to a new page.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PageBreakThresholds {
    pub key_facts: f64,
    pub market_comparison: f64,
    pub amortization: f64,
    pub closing: f64,
}

impl Default for PageBreakThresholds {
    fn default() -> Self {
        Self {
            key_facts: 80.0,
            market_comparison: 60.0,
            amortization: 60.0,
            closing: 60.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct TruncationPolicy {
    /// schedules up to this length are shown in full
    pub full_limit: u32,
    pub head_rows: u32,
    pub tail_rows: u32,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            full_limit: 25,
            head_rows: 12,
            tail_rows: 12,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ReportConfig {
    pub app_name: String,
    pub currency_symbol: String,
    pub helpline: String,
    pub page: PageLayout,
    pub thresholds: PageBreakThresholds,
    pub truncation: TruncationPolicy,
    pub default_loan_type: LoanTypeId,
    pub sample_loan: LoanRequest,
    pub sample_loan_type: LoanTypeId,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            app_name: "LoanView".to_string(),
            currency_symbol: "₹".to_string(),
            helpline: "1-800-LOAN-VIEW".to_string(),
            page: PageLayout::default(),
            thresholds: PageBreakThresholds::default(),
            truncation: TruncationPolicy::default(),
            default_loan_type: LoanTypeId::Home,
            sample_loan: LoanRequest::new(dec!(500000), dec!(8.5), 60),
            sample_loan_type: LoanTypeId::Personal,
        }
    }
}

impl ReportConfig {
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::LoanViewResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_sample_loan(mut self, principal: Decimal, rate: Decimal, tenure_months: u32) -> Self {
        self.sample_loan = LoanRequest::new(principal, rate, tenure_months);
        self
    }
}
