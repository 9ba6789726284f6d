use log::debug;
use rust_decimal::Decimal;

use crate::catalog::{Catalog, LoanTypeId, RateType};
use crate::loan::calculate_loan_details;
use crate::LoanViewResult;

#[derive(Clone, PartialEq, Debug)]
pub struct ComparisonRow {
    pub bank_id: String,
    pub bank_name: String,
    pub interest_rate: Decimal,
    pub rate_type: RateType,
    pub emi: Decimal,
}

/// Prices the requested loan at every bank offering `loan_type`, cheapest
/// rate first. Banks without the product are left out; equal rates keep
/// catalog order.
pub fn market_comparison(
    catalog: &Catalog,
    loan_type: LoanTypeId,
    principal: Decimal,
    tenure_months: u32,
) -> LoanViewResult<Vec<ComparisonRow>> {
    let mut rows = catalog
        .products_of_type(loan_type)
        .map(|(bank, product)| {
            let details = calculate_loan_details(principal, product.interest_rate, tenure_months)?;
            Ok(ComparisonRow {
                bank_id: bank.id.clone(),
                bank_name: bank.name.clone(),
                interest_rate: product.interest_rate,
                rate_type: product.rate_type,
                emi: details.emi,
            })
        })
        .collect::<LoanViewResult<Vec<_>>>()?;

    rows.sort_by_key(|row| row.interest_rate);
    debug!(
        "{} of {} banks offer {} loans",
        rows.len(),
        catalog.banks().len(),
        loan_type
    );
    Ok(rows)
}
