//! CLI: читает CSV-реестр накладных и выводит помесячный перенос кредита.

use std::env;
use std::fs;
use std::io;

use chrono::{Datelike, Local};
use fiscal_rollover::{
    Ledger, RawLedger, ReportBuilder, Settlement, TaxKind, format_brl, month_name,
    write_report_csv,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let as_csv = args.iter().any(|a| a == "--csv");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));

    let Some(path) = positional.next() else {
        println!("Usage: fiscal-rollover <ledger.csv> [year] [--csv]");
        return Ok(());
    };

    let text = fs::read_to_string(path)?;
    let delimiter = if text.lines().next().is_some_and(|h| h.contains(';')) {
        b';'
    } else {
        b','
    };
    let raw = RawLedger::from_reader_with_delimiter(text.as_bytes(), delimiter)?;
    let ledger = Ledger::from_raw(&raw);

    let year = match positional.next() {
        Some(y) => y.parse::<i32>()?,
        None => ledger
            .available_periods()
            .years
            .last()
            .copied()
            .unwrap_or_else(|| Local::now().year()),
    };

    let report = ReportBuilder::new(&ledger, year).run();
    if as_csv {
        write_report_csv(io::stdout().lock(), &report)?;
        return Ok(());
    }

    for period in report.periods() {
        println!(
            "{} {}: entradas {}, saídas {}",
            month_name(period.month).unwrap_or_default(),
            period.year,
            format_brl(period.basis.inbound_net_total),
            format_brl(period.basis.outbound_net_total)
        );
        for kind in TaxKind::ALL {
            let r = period.result(kind);
            println!(
                "  {kind}: início {}, crédito {}, débito {}, a pagar {}, transportado {}",
                format_brl(r.opening_credit),
                format_brl(r.period_credit),
                format_brl(r.period_debit),
                format_brl(r.amount_payable),
                format_brl(r.closing_credit)
            );
        }
    }

    if let Some(latest) = report.latest() {
        println!(
            "Período vigente: {} {}",
            month_name(latest.month).unwrap_or_default(),
            latest.year
        );
        for kind in TaxKind::ALL {
            match latest.result(kind).settlement() {
                Settlement::Payable(amount) => println!("  {kind} a pagar: {}", format_brl(amount)),
                Settlement::CarriedCredit(amount) => {
                    println!("  Crédito {kind} a transportar: {}", format_brl(amount));
                }
                Settlement::Settled => println!("  {kind}: sem saldo"),
            }
        }
    }
    Ok(())
}
