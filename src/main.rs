use chrono::Local;
use log::{info, warn};
use loanview::catalog::{Catalog, LoanTypeId};
use loanview::config::ReportConfig;
use loanview::loan::LoanRequest;
use loanview::report::{
    report_filename, ApplicationData, LoanRequirement, PersonalDetails, ReportAssembler,
    ReportLoan, ReportWriter,
};
use loanview::sink::{DocumentSink, TextDocument};
use loanview::LoanViewResult;
use rust_decimal_macros::dec;
use simple_logger::SimpleLogger;
use std::path::Path;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    if let Err(e) = run() {
        log::error!("report generation failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> LoanViewResult<()> {
    let catalog = Catalog::standard();
    let config = ReportConfig::default();

    let request = LoanRequest::new(dec!(2500000), dec!(8.6), 240);
    if let Err(e) = catalog.loan_type(LoanTypeId::Home)?.check_request(&request) {
        warn!("{}", e);
    }
    let details = request.calculate()?;
    info!("{}", details);
    details.show_amortization();

    let application = ApplicationData {
        personal_details: PersonalDetails {
            full_name: Some("Asha Verma".to_string()),
            phone: Some("+91 98765 43210".to_string()),
            ..Default::default()
        },
        loan_requirement: LoanRequirement {
            purpose: Some("Purchase of first home".to_string()),
            amount: Some(request.principal),
            repayment_period: Some("20 years".to_string()),
            loan_type: Some("home".to_string()),
        },
    };

    let report = ReportAssembler::new(&catalog, &config).assemble(
        Some(&application),
        Some(&ReportLoan::new(details, Some(LoanTypeId::Home))),
    )?;

    let today = Local::now().date_naive();
    let mut doc = TextDocument::new(config.page);
    ReportWriter::new(&config).write(&report, &mut doc, today)?;

    let filename = report_filename(&config.app_name, today, doc.file_extension());
    doc.save(Path::new(&filename))
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<loanview::loan::LoanDetails>();
    is_normal::<loanview::loan::AmortizationSchedule>();
    is_normal::<loanview::report::Report>();
    is_normal::<TextDocument>();
}
