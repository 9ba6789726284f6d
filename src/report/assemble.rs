use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::comparison::market_comparison;
use super::format::{format_currency, format_percent, format_years};
use super::schedule::{truncate_schedule, DisplayRow};
use super::{ApplicationData, Block, Report, ReportLoan, ReportSection, SectionKind};
use crate::catalog::{Catalog, LoanTypeId};
use crate::config::ReportConfig;
use crate::loan::{validate_request, LoanDetails};
use crate::sink::{Table, TableStyle};
use crate::LoanViewResult;

const NOT_AVAILABLE: &str = "N/A";

pub struct ReportAssembler<'a> {
    catalog: &'a Catalog,
    config: &'a ReportConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a ReportConfig) -> Self {
        Self { catalog, config }
    }

    /// Builds every section of the report in its fixed order. Without a loan
    /// the configured sample loan is calculated and used in its place.
    pub fn assemble(
        &self,
        application: Option<&ApplicationData>,
        loan: Option<&ReportLoan>,
    ) -> LoanViewResult<Report> {
        let (details, loan_type) = match loan {
            Some(loan) => {
                let d = &loan.details;
                validate_request(d.principal, d.annual_rate_percent, d.tenure_months)?;
                (loan.details, loan.loan_type)
            }
            None => {
                warn!(
                    "no loan calculation supplied, using sample loan of {} at {}% for {} months",
                    self.config.sample_loan.principal,
                    self.config.sample_loan.annual_rate_percent,
                    self.config.sample_loan.tenure_months
                );
                (
                    self.config.sample_loan.calculate()?,
                    Some(self.config.sample_loan_type),
                )
            }
        };
        let loan_type = self.resolve_loan_type(loan_type, application);

        let mut sections = Vec::with_capacity(7);
        if let Some(application) = application {
            sections.push(self.application_summary(application));
        }
        sections.push(self.key_facts(&details));
        sections.push(self.market_comparison(loan_type, &details)?);
        sections.push(self.amortization_schedule(&details));
        sections.push(next_steps());
        sections.push(disclaimers());
        sections.push(self.support_contact());

        for section in &sections {
            debug!("assembled section {:?} '{}'", section.kind, section.title);
        }
        info!(
            "assembled {} section report for {} loan: {}",
            sections.len(),
            loan_type,
            details
        );

        Ok(Report {
            sections,
            details,
            loan_type,
        })
    }

    fn resolve_loan_type(
        &self,
        from_loan: Option<LoanTypeId>,
        application: Option<&ApplicationData>,
    ) -> LoanTypeId {
        if let Some(loan_type) = from_loan {
            return loan_type;
        }
        let requested = application.and_then(|a| a.loan_requirement.loan_type.as_deref());
        match requested.map(str::parse::<LoanTypeId>) {
            Some(Ok(loan_type)) => loan_type,
            Some(Err(e)) => {
                warn!("{}, falling back to {}", e, self.config.default_loan_type);
                self.config.default_loan_type
            }
            None => self.config.default_loan_type,
        }
    }

    fn money(&self, amount: Decimal, fraction_digits: u32) -> String {
        format_currency(amount, &self.config.currency_symbol, fraction_digits)
    }

    fn application_summary(&self, application: &ApplicationData) -> ReportSection {
        let p = &application.personal_details;
        let personal = two_column_table(&[
            ("Full Name", p.full_name.clone()),
            ("Father's/Husband's Name", p.father_husband_name.clone()),
            ("Date of Birth", p.dob.clone()),
            ("Gender", p.gender.clone()),
            ("Marital Status", p.marital_status.clone()),
            ("Phone Number", p.phone.clone()),
            ("Email Address", p.email.clone()),
            ("ID Number", p.id_number.clone()),
            ("Current Address", p.current_address.clone()),
            ("Permanent Address", p.permanent_address.clone()),
        ]);

        let r = &application.loan_requirement;
        let requirement = two_column_table(&[
            ("Purpose of Loan", r.purpose.clone()),
            ("Loan Amount", r.amount.map(|a| self.money(a, 2))),
            ("Repayment Period", r.repayment_period.clone()),
            ("Loan Type", r.loan_type.clone()),
        ]);

        ReportSection {
            kind: SectionKind::ApplicationSummary,
            title: "Loan Application Summary".to_string(),
            blocks: vec![Block::Table(personal), Block::Table(requirement)],
        }
    }

    fn key_facts(&self, details: &LoanDetails) -> ReportSection {
        let mut table = Table::new(TableStyle::Grid, 10.0, 3.0).with_bold_first_column();
        table.push_row(["Loan Amount".to_string(), self.money(details.principal, 2)]);
        table.push_row([
            "Interest Rate (p.a.)".to_string(),
            format_percent(details.annual_rate_percent),
        ]);
        table.push_row(["Loan Tenure".to_string(), format_years(details.tenure_months)]);
        table.push_row(["Monthly EMI".to_string(), self.money(details.emi, 2)]);
        table.push_row([
            "Total Interest Payable".to_string(),
            self.money(details.total_interest, 2),
        ]);
        table.push_row([
            "Total Amount Payable".to_string(),
            self.money(details.total_payment, 2),
        ]);

        ReportSection {
            kind: SectionKind::KeyFacts,
            title: "Key Facts Statement".to_string(),
            blocks: vec![Block::Table(table)],
        }
    }

    fn market_comparison(
        &self,
        loan_type: LoanTypeId,
        details: &LoanDetails,
    ) -> LoanViewResult<ReportSection> {
        let rows = market_comparison(
            self.catalog,
            loan_type,
            details.principal,
            details.tenure_months,
        )?;
        let name = self
            .catalog
            .loan_type(loan_type)
            .map(|lt| lt.name.clone())
            .unwrap_or_else(|_| loan_type.to_string());

        let mut table = Table::new(TableStyle::Striped, 9.0, 2.0).with_head([
            "Bank",
            "Interest Rate",
            "Est. Monthly EMI",
        ]);
        for row in &rows {
            table.push_row([
                row.bank_name.clone(),
                format_percent(row.interest_rate),
                self.money(row.emi, 0),
            ]);
        }

        Ok(ReportSection {
            kind: SectionKind::MarketComparison,
            title: format!("Market Comparison for {}", name),
            blocks: vec![Block::Table(table)],
        })
    }

    fn amortization_schedule(&self, details: &LoanDetails) -> ReportSection {
        let mut table = Table::new(TableStyle::Grid, 9.0, 2.0).with_head([
            "Month",
            "Principal",
            "Interest",
            "Balance",
        ]);
        for row in truncate_schedule(details.schedule(), &self.config.truncation) {
            match row {
                DisplayRow::Period(r) => table.push_row([
                    r.period.to_string(),
                    self.money(r.principal_component, 0),
                    self.money(r.interest_component, 0),
                    self.money(r.remaining_balance, 0),
                ]),
                DisplayRow::Ellipsis => table.push_row(["...", "...", "...", "..."]),
            }
        }

        ReportSection {
            kind: SectionKind::AmortizationSchedule,
            title: "Amortization Schedule".to_string(),
            blocks: vec![Block::Table(table)],
        }
    }

    fn support_contact(&self) -> ReportSection {
        ReportSection {
            kind: SectionKind::SupportContact,
            title: "Customer Support".to_string(),
            blocks: vec![Block::Text(vec![format!("Helpline: {}", self.config.helpline)])],
        }
    }
}

fn two_column_table(entries: &[(&str, Option<String>)]) -> Table {
    let mut table = Table::new(TableStyle::Plain, 9.0, 1.5).with_bold_first_column();
    for (label, value) in entries {
        let value = value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(NOT_AVAILABLE);
        table.push_row([label.to_string(), value.to_string()]);
    }
    table
}

fn next_steps() -> ReportSection {
    ReportSection {
        kind: SectionKind::NextSteps,
        title: "Next Steps".to_string(),
        blocks: vec![Block::Text(vec![
            "Contact your preferred bank to confirm the current rate and start a formal application."
                .to_string(),
            String::new(),
            "Keep your KYC documents, income proof and recent bank statements ready to speed up processing."
                .to_string(),
        ])],
    }
}

fn disclaimers() -> ReportSection {
    ReportSection {
        kind: SectionKind::Disclaimers,
        title: "Disclaimers".to_string(),
        blocks: vec![Block::Text(vec![
            "Figures in this report are estimates based on published rates and may differ from the final terms offered by the bank."
                .to_string(),
            String::new(),
            "Banks never ask for your OTP, PIN or password. Do not share them with anyone claiming to represent a bank."
                .to_string(),
        ])],
    }
}
