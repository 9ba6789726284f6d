//! Loan report assembly and layout.
//!
//! [`ReportAssembler`] turns application data, a loan calculation and the
//! catalog into an ordered list of [`ReportSection`]s. [`ReportWriter`] lays
//! those sections out on a [`DocumentSink`](crate::sink::DocumentSink),
//! breaking pages and stamping every page with a header and footer.

mod assemble;
mod comparison;
mod format;
mod schedule;
mod writer;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::catalog::LoanTypeId;
use crate::loan::LoanDetails;
use crate::sink::Table;

pub use assemble::ReportAssembler;
pub use comparison::{market_comparison, ComparisonRow};
pub use format::{format_currency, format_percent, format_years};
pub use schedule::{truncate_schedule, DisplayRow};
pub use writer::ReportWriter;

#[derive(Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PersonalDetails {
    pub full_name: Option<String>,
    pub father_husband_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
}

#[derive(Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct LoanRequirement {
    pub purpose: Option<String>,
    pub amount: Option<Decimal>,
    pub repayment_period: Option<String>,
    pub loan_type: Option<String>,
}

/// What the applicant filled in on the loan application form.
#[derive(Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ApplicationData {
    pub personal_details: PersonalDetails,
    pub loan_requirement: LoanRequirement,
}

/// A finished calculation, tagged with the loan type it was made for.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ReportLoan {
    pub details: LoanDetails,
    pub loan_type: Option<LoanTypeId>,
}

impl ReportLoan {
    pub fn new(details: LoanDetails, loan_type: Option<LoanTypeId>) -> Self {
        Self { details, loan_type }
    }
}

/// Report sections in the order they are emitted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum SectionKind {
    ApplicationSummary,
    KeyFacts,
    MarketComparison,
    AmortizationSchedule,
    NextSteps,
    Disclaimers,
    SupportContact,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Block {
    Table(Table),
    /// paragraphs; an empty string is a blank line
    Text(Vec<String>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportSection {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Text(_) => None,
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Report {
    pub sections: Vec<ReportSection>,
    /// the loan the report was built from, which is the sample loan when none
    /// was supplied
    pub details: LoanDetails,
    pub loan_type: LoanTypeId,
}

impl Report {
    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// `{app}_Report_{dd/mm/yyyy}.{ext}` with anything outside `[A-Za-z0-9_.-]`
/// replaced by an underscore.
pub fn report_filename(app_name: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_Report_{}.{}", app_name, date.format("%d/%m/%Y"), extension)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
