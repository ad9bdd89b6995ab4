#![warn(missing_docs)]
//! Библиотека помесячного расчёта ICMS и PIS/COFINS по реестру накладных
//! с переносом неиспользованного кредита на следующие месяцы.

mod aggregate;
mod error;
mod export;
mod filter;
mod raw;
mod report;
mod rollover;
mod simulator;
mod types;
mod utils;

pub use crate::aggregate::{MonthlyBases, aggregate};
pub use crate::error::ReportError;
pub use crate::export::{write_projection_csv, write_report_csv};
pub use crate::filter::{
    CategoryPredicate, DEFAULT_ELIGIBLE_CATEGORIES, EligibleCategories, select, select_tax_basis,
};
pub use crate::raw::{AvailablePeriods, Ledger, RawLedger, RawLedgerRow};
pub use crate::report::{FiscalReport, ReportBuilder, ReportOptions};
pub use crate::rollover::{opening_balance, roll, run_months, step};
pub use crate::simulator::{
    Bucket, IcmsBreakdown, IcmsBuckets, PisCofinsBuckets, Projection, ProjectionSimulator,
    SimulationInputs,
};
pub use crate::types::*;
pub use crate::utils::{
    AmountCell, MONTH_NAMES_PT, format_brl, month_from_name, month_name, parse_amount, parse_date,
};
