pub mod audit;
pub mod demo;
pub mod lookup;
pub mod pay;
pub mod reset;
pub mod stats;

pub use audit::AuditCommand;
pub use demo::DemoCommand;
pub use lookup::LookupCommand;
pub use pay::PayCommand;
pub use reset::ResetCommand;
pub use stats::StatsCommand;

use serde::Serialize;

use crate::workflows::ViewModel;

/// Print one titled JSON panel, or its placeholder when there is nothing to show.
pub(crate) fn print_panel<T: Serialize>(title: &str, value: Option<&T>, placeholder: &str) {
    println!("== {title} ==");
    match value.map(serde_json::to_string_pretty) {
        Some(Ok(json)) => println!("{json}"),
        Some(Err(err)) => println!("<unprintable: {err}>"),
        None => println!("{placeholder}"),
    }
    println!();
}

pub(crate) fn print_decision(view: &ViewModel) {
    print_panel("Decision result", view.payment.as_ref(), "Awaiting submission.");
}

pub(crate) fn print_transaction(view: &ViewModel) {
    print_panel("Transaction record", view.transaction.as_ref(), "No lookup yet.");
}

pub(crate) fn print_audits(view: &ViewModel) {
    let audits = (!view.audits.is_empty()).then_some(&view.audits);
    print_panel("Audit trail", audits, "No audit logs found.");
}

pub(crate) fn print_stats(view: &ViewModel) {
    print_panel("Current stats", view.stats.as_ref(), "Gathering stats…");
}
