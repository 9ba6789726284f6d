use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::{fmt, str::FromStr};

use crate::loan::LoanRequest;
use crate::{LoanViewError, LoanViewResult};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LoanTypeId {
    Home,
    Personal,
    Education,
    Vehicle,
    Business,
    Gold,
}

impl LoanTypeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanTypeId::Home => "home",
            LoanTypeId::Personal => "personal",
            LoanTypeId::Education => "education",
            LoanTypeId::Vehicle => "vehicle",
            LoanTypeId::Business => "business",
            LoanTypeId::Gold => "gold",
        }
    }
}

impl fmt::Display for LoanTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanTypeId {
    type Err = LoanViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(LoanTypeId::Home),
            "personal" => Ok(LoanTypeId::Personal),
            "education" => Ok(LoanTypeId::Education),
            "vehicle" => Ok(LoanTypeId::Vehicle),
            "business" => Ok(LoanTypeId::Business),
            "gold" => Ok(LoanTypeId::Gold),
            _ => Err(LoanViewError::MissingCatalogEntry {
                kind: "loan type",
                id: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RateType {
    Fixed,
    Floating,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BankCategory {
    #[cfg_attr(feature = "serde", serde(rename = "Public Sector"))]
    PublicSector,
    #[cfg_attr(feature = "serde", serde(rename = "Private Sector"))]
    PrivateSector,
    #[cfg_attr(feature = "serde", serde(rename = "Small Finance Bank"))]
    SmallFinanceBank,
    #[cfg_attr(feature = "serde", serde(rename = "Foreign Bank"))]
    ForeignBank,
    #[cfg_attr(feature = "serde", serde(rename = "NBFC"))]
    Nbfc,
}

impl fmt::Display for BankCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BankCategory::PublicSector => "Public Sector",
            BankCategory::PrivateSector => "Private Sector",
            BankCategory::SmallFinanceBank => "Small Finance Bank",
            BankCategory::ForeignBank => "Foreign Bank",
            BankCategory::Nbfc => "NBFC",
        };
        f.write_str(name)
    }
}

/// Low/medium/high grouping of an annual rate, as shown on rate tables.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RateBand {
    Low,
    Medium,
    High,
}

impl RateBand {
    pub const LOW_CEILING: Decimal = dec!(9.0);
    pub const MEDIUM_CEILING: Decimal = dec!(12.0);

    pub fn classify(annual_rate_percent: Decimal) -> Self {
        if annual_rate_percent <= Self::LOW_CEILING {
            RateBand::Low
        } else if annual_rate_percent <= Self::MEDIUM_CEILING {
            RateBand::Medium
        } else {
            RateBand::High
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanType {
    pub id: LoanTypeId,
    pub name: String,
    pub interest_rate: Decimal,
    pub rate_type: RateType,
    pub min_tenure_months: u32,
    pub max_tenure_months: u32,
    pub max_amount: Decimal,
}

impl LoanType {
    /// Checks a request against the tenure window and amount ceiling of this
    /// loan type.
    pub fn check_request(&self, request: &LoanRequest) -> LoanViewResult<()> {
        if request.tenure_months < self.min_tenure_months
            || request.tenure_months > self.max_tenure_months
        {
            return Err(LoanViewError::invalid(
                "tenure_months",
                format!(
                    "{} loans run {} to {} months, got {}",
                    self.id, self.min_tenure_months, self.max_tenure_months, request.tenure_months
                ),
            ));
        }
        if request.principal > self.max_amount {
            return Err(LoanViewError::invalid(
                "principal",
                format!("{} loans are capped at {}", self.id, self.max_amount),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanProduct {
    pub loan_type_id: LoanTypeId,
    pub interest_rate: Decimal,
    pub rate_type: RateType,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bank {
    pub id: String,
    pub name: String,
    pub category: BankCategory,
    pub application_url: String,
    pub loan_products: Vec<LoanProduct>,
}

impl Bank {
    pub fn product(&self, loan_type: LoanTypeId) -> Option<&LoanProduct> {
        self.loan_products
            .iter()
            .find(|p| p.loan_type_id == loan_type)
    }
}

/// One bank's offer for one loan type, flattened for tabular listings.
#[derive(Clone, PartialEq, Debug)]
pub struct BankLoanProduct<'a> {
    pub bank_id: &'a str,
    pub bank_name: &'a str,
    pub bank_category: BankCategory,
    pub loan_type_id: LoanTypeId,
    pub interest_rate: Decimal,
    pub rate_type: RateType,
    pub rate_band: RateBand,
}

/// Immutable reference data: banks and loan types in display order.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    banks: Vec<Bank>,
    loan_types: Vec<LoanType>,
}

impl Catalog {
    pub fn new(banks: Vec<Bank>, loan_types: Vec<LoanType>) -> Self {
        Self { banks, loan_types }
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> LoanViewResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn loan_types(&self) -> &[LoanType] {
        &self.loan_types
    }

    pub fn bank(&self, id: &str) -> Option<&Bank> {
        self.banks.iter().find(|b| b.id == id)
    }

    pub fn loan_type(&self, id: LoanTypeId) -> LoanViewResult<&LoanType> {
        self.loan_types
            .iter()
            .find(|lt| lt.id == id)
            .ok_or_else(|| LoanViewError::MissingCatalogEntry {
                kind: "loan type",
                id: id.to_string(),
            })
    }

    /// Banks offering `loan_type`, with their product, in catalog order.
    pub fn products_of_type(
        &self,
        loan_type: LoanTypeId,
    ) -> impl Iterator<Item = (&Bank, &LoanProduct)> + '_ {
        self.banks
            .iter()
            .filter_map(move |bank| bank.product(loan_type).map(|p| (bank, p)))
    }

    pub fn all_products(&self) -> impl Iterator<Item = BankLoanProduct<'_>> + '_ {
        self.banks.iter().flat_map(|bank| {
            bank.loan_products.iter().map(move |p| BankLoanProduct {
                bank_id: &bank.id,
                bank_name: &bank.name,
                bank_category: bank.category,
                loan_type_id: p.loan_type_id,
                interest_rate: p.interest_rate,
                rate_type: p.rate_type,
                rate_band: RateBand::classify(p.interest_rate),
            })
        })
    }

    /// The built-in market snapshot of seven Indian lenders and six loan types.
    pub fn standard() -> Self {
        use LoanTypeId::*;
        use RateType::*;

        let loan_type = |id, name: &str, rate, rate_type, min, max, amount| LoanType {
            id,
            name: name.to_string(),
            interest_rate: rate,
            rate_type,
            min_tenure_months: min,
            max_tenure_months: max,
            max_amount: amount,
        };
        let loan_types = vec![
            loan_type(Home, "Home Loan", dec!(8.5), Floating, 60, 360, dec!(7500000)),
            loan_type(Personal, "Personal Loan", dec!(11.2), Fixed, 12, 60, dec!(1000000)),
            loan_type(Education, "Education Loan", dec!(9.0), Fixed, 24, 180, dec!(4000000)),
            loan_type(Vehicle, "Vehicle Loan", dec!(9.5), Fixed, 12, 84, dec!(2000000)),
            loan_type(Business, "Business Loan", dec!(12.5), Floating, 12, 120, dec!(10000000)),
            loan_type(Gold, "Gold Loan", dec!(7.0), Fixed, 6, 36, dec!(5000000)),
        ];

        let bank = |id: &str,
                    name: &str,
                    category,
                    url: &str,
                    products: &[(LoanTypeId, Decimal, RateType)]| Bank {
            id: id.to_string(),
            name: name.to_string(),
            category,
            application_url: url.to_string(),
            loan_products: products
                .iter()
                .map(|&(loan_type_id, interest_rate, rate_type)| LoanProduct {
                    loan_type_id,
                    interest_rate,
                    rate_type,
                })
                .collect(),
        };
        let banks = vec![
            bank(
                "sbi",
                "State Bank of India",
                BankCategory::PublicSector,
                "https://sbi.co.in/web/personal-banking/loans",
                &[
                    (Home, dec!(8.60), Floating),
                    (Personal, dec!(11.15), Fixed),
                    (Vehicle, dec!(8.85), Fixed),
                    (Education, dec!(9.20), Fixed),
                    (Business, dec!(12.00), Floating),
                    (Gold, dec!(7.50), Fixed),
                ],
            ),
            bank(
                "hdfc",
                "HDFC Bank",
                BankCategory::PrivateSector,
                "https://www.hdfcbank.com/personal/borrow",
                &[
                    (Home, dec!(8.70), Floating),
                    (Personal, dec!(10.50), Fixed),
                    (Vehicle, dec!(9.40), Fixed),
                    (Business, dec!(11.50), Floating),
                    (Gold, dec!(9.00), Fixed),
                ],
            ),
            bank(
                "icici",
                "ICICI Bank",
                BankCategory::PrivateSector,
                "https://www.icicibank.com/personal-banking/loans",
                &[
                    (Home, dec!(8.75), Floating),
                    (Personal, dec!(10.75), Fixed),
                    (Vehicle, dec!(9.00), Fixed),
                    (Education, dec!(9.50), Fixed),
                    (Business, dec!(12.25), Floating),
                    (Gold, dec!(8.00), Fixed),
                ],
            ),
            bank(
                "axis",
                "Axis Bank",
                BankCategory::PrivateSector,
                "https://www.axisbank.com/retail/loans",
                &[
                    (Home, dec!(8.80), Floating),
                    (Personal, dec!(10.99), Fixed),
                    (Vehicle, dec!(9.20), Fixed),
                    (Business, dec!(11.75), Floating),
                ],
            ),
            bank(
                "pnb",
                "Punjab National Bank",
                BankCategory::PublicSector,
                "https://www.pnbindia.in/loans-we-offer.html",
                &[
                    (Home, dec!(8.50), Floating),
                    (Personal, dec!(11.80), Fixed),
                    (Education, dec!(8.90), Fixed),
                    (Business, dec!(12.50), Floating),
                    (Gold, dec!(7.75), Fixed),
                ],
            ),
            bank(
                "kotak",
                "Kotak Mahindra Bank",
                BankCategory::PrivateSector,
                "https://www.kotak.com/en/personal-banking/loans.html",
                &[
                    (Home, dec!(8.70), Floating),
                    (Personal, dec!(10.99), Fixed),
                    (Vehicle, dec!(9.50), Fixed),
                    (Business, dec!(11.90), Floating),
                    (Gold, dec!(8.25), Fixed),
                ],
            ),
            bank(
                "bob",
                "Bank of Baroda",
                BankCategory::PublicSector,
                "https://www.bankofbaroda.in/personal-banking/loans",
                &[
                    (Home, dec!(8.40), Floating),
                    (Personal, dec!(11.50), Fixed),
                    (Vehicle, dec!(8.75), Fixed),
                    (Education, dec!(9.15), Fixed),
                    (Gold, dec!(7.85), Fixed),
                ],
            ),
        ];

        Self::new(banks, loan_types)
    }
}
