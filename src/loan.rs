use log::trace;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use std::fmt;

use crate::{LoanViewError, LoanViewResult};

// residue left on the last period below this is treated as rounding drift
const SETTLEMENT_TOLERANCE: Decimal = dec!(0.01);

/// Inputs of a single loan calculation.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanRequest {
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub tenure_months: u32,
}

impl LoanRequest {
    pub fn new(principal: Decimal, annual_rate_percent: Decimal, tenure_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_months,
        }
    }

    pub fn calculate(&self) -> LoanViewResult<LoanDetails> {
        calculate_loan_details(self.principal, self.annual_rate_percent, self.tenure_months)
    }
}

/// Output of the calculation engine.
///
/// `total_payment == principal + total_interest` holds exactly; the rate and
/// tenure are carried along so the schedule can be regenerated from the
/// details alone.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanDetails {
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub tenure_months: u32,
    pub emi: Decimal,
    pub total_interest: Decimal,
    pub total_payment: Decimal,
}

impl LoanDetails {
    pub fn monthly_rate(&self) -> Decimal {
        monthly_rate(self.annual_rate_percent)
    }

    pub fn schedule(&self) -> AmortizationSchedule {
        generate_amortization_schedule(self)
    }

    pub fn request(&self) -> LoanRequest {
        LoanRequest::new(self.principal, self.annual_rate_percent, self.tenure_months)
    }

    pub fn show_amortization(&self) {
        for row in self.schedule() {
            println!("{}", row);
        }
    }
}

impl fmt::Display for LoanDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal {}, rate {}%, tenure {} months, emi {}, total interest {}, total payment {}",
            round(self.principal, 2).normalize(),
            round(self.annual_rate_percent, 2).normalize(),
            self.tenure_months,
            round(self.emi, 2).normalize(),
            round(self.total_interest, 2).normalize(),
            round(self.total_payment, 2).normalize()
        )
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmortizationRow {
    pub period: u32,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    pub remaining_balance: Decimal,
}

impl fmt::Display for AmortizationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period {}, principal paid {}, interest paid {}, ending balance {}",
            self.period,
            round(self.principal_component, 2).normalize(),
            round(self.interest_component, 2).normalize(),
            round(self.remaining_balance, 2).normalize()
        )
    }
}

/// Lazy period-by-period schedule. Cloning it before iteration gives an
/// independent copy that replays the same rows.
#[derive(Clone, Debug)]
pub struct AmortizationSchedule {
    emi: Decimal,
    monthly_rate: Decimal,
    tenure_months: u32,
    period: u32,
    balance: Decimal,
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<AmortizationRow> {
        if self.period >= self.tenure_months {
            return None;
        }
        self.period += 1;

        let interest = self.balance * self.monthly_rate;
        let principal = self.emi - interest;
        let mut end_balance = (self.balance - principal).max(Decimal::ZERO);
        if self.period == self.tenure_months && end_balance < SETTLEMENT_TOLERANCE {
            end_balance = Decimal::ZERO;
        }
        trace!(
            "period {}, interest {}, principal {}, end bal {}",
            self.period,
            interest,
            principal,
            end_balance
        );
        self.balance = end_balance;

        Some(AmortizationRow {
            period: self.period,
            principal_component: principal,
            interest_component: interest,
            remaining_balance: end_balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.tenure_months - self.period) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}

/// Rounds half away from zero to `dec_places`.
pub fn round(amt: Decimal, dec_places: u32) -> Decimal {
    if amt.is_zero() {
        Decimal::ZERO
    } else {
        amt.round_dp_with_strategy(dec_places, RoundingStrategy::MidpointAwayFromZero)
    }
}

fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(12) / dec!(100)
}

/// Rejects negative amounts and rates and tenures shorter than a month.
pub fn validate_request(
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
) -> LoanViewResult<()> {
    if tenure_months < 1 {
        return Err(LoanViewError::invalid(
            "tenure_months",
            "tenure must be at least one month",
        ));
    }
    if principal < Decimal::ZERO {
        return Err(LoanViewError::invalid(
            "principal",
            "principal cannot be negative",
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanViewError::invalid(
            "annual_rate_percent",
            "interest rate cannot be negative",
        ));
    }
    Ok(())
}

/// Computes the fixed monthly installment and loan totals.
///
/// The installment is taken in its discounted form `P·r / (1 − (1+r)^−n)`,
/// which stays bounded for long tenures at high rates and tends to `P·r`. A
/// zero rate degenerates to straight division of the principal over the
/// tenure.
pub fn calculate_loan_details(
    principal: Decimal,           // amount borrowed
    annual_rate_percent: Decimal, // nominal annual rate as a percentage (8.5, 11.2)
    tenure_months: u32,           // number of monthly installments
) -> LoanViewResult<LoanDetails> {
    validate_request(principal, annual_rate_percent, tenure_months)?;

    let months = Decimal::from(tenure_months);
    let rate = monthly_rate(annual_rate_percent);
    let overflow = || {
        LoanViewError::invalid(
            "annual_rate_percent",
            "installment does not fit the decimal range",
        )
    };

    let emi = if rate.is_zero() {
        principal / months
    } else {
        let interest_only = principal.checked_mul(rate).ok_or_else(overflow)?;
        // the discount factor is below one, so its powers only shrink toward zero
        let discounted = (Decimal::ONE / (Decimal::ONE + rate))
            .checked_powu(u64::from(tenure_months))
            .unwrap_or(Decimal::ZERO);
        let annuity = Decimal::ONE - discounted;
        if annuity.is_zero() {
            // vanishingly small rates round the discount factor to one
            principal / months
        } else {
            interest_only.checked_div(annuity).ok_or_else(overflow)?
        }
    };

    let total_payment = emi.checked_mul(months).ok_or_else(overflow)?;
    let total_interest = total_payment - principal;
    trace!(
        "emi {} over {} months, total payment {}, total interest {}",
        emi,
        tenure_months,
        total_payment,
        total_interest
    );

    Ok(LoanDetails {
        principal,
        annual_rate_percent,
        tenure_months,
        emi,
        total_interest,
        total_payment,
    })
}

/// Starts the amortization schedule for `details`. Rows are produced on
/// demand and never truncated here.
pub fn generate_amortization_schedule(details: &LoanDetails) -> AmortizationSchedule {
    AmortizationSchedule {
        emi: details.emi,
        monthly_rate: details.monthly_rate(),
        tenure_months: details.tenure_months,
        period: 0,
        balance: details.principal,
    }
}


#[cfg(test)]
mod properties {
    use super::{calculate_loan_details, Decimal};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    // principal in paise, rate in basis points of a percent
    fn loan() -> impl Strategy<Value = (Decimal, Decimal, u32)> {
        (0i64..10_000_000_000, 0i64..3_600, 1u32..481).prop_map(|(paise, bp, tenure)| {
            (Decimal::new(paise, 2), Decimal::new(bp, 2), tenure)
        })
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_totals_are_consistent((principal, rate, tenure) in loan()) {
            let d = calculate_loan_details(principal, rate, tenure).unwrap();
            prop_assert_eq!(d.total_payment, d.principal + d.total_interest);
            prop_assert!((d.total_payment - d.emi * Decimal::from(tenure)).abs() < dec!(0.01));
        }

        #[test]
        fn prop_schedule_repays_principal((principal, rate, tenure) in loan()) {
            let d = calculate_loan_details(principal, rate, tenure).unwrap();
            let rows: Vec<_> = d.schedule().collect();
            prop_assert_eq!(rows.len(), tenure as usize);

            let last = rows.last().unwrap();
            prop_assert_eq!(last.remaining_balance, Decimal::ZERO);
            prop_assert!(rows.iter().all(|r| r.remaining_balance >= Decimal::ZERO));

            let repaid: Decimal = rows.iter().map(|r| r.principal_component).sum();
            prop_assert!((repaid - principal).abs() <= dec!(0.01) * Decimal::from(tenure));
        }
    }
}
