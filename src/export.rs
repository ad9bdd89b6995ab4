//! Выгрузка отчёта и прогноза в CSV: одна строка на период.

use std::io::Write;

use serde::Serialize;

use crate::error::ReportError;
use crate::report::FiscalReport;
use crate::simulator::Projection;
use crate::types::{Money, PeriodResult, TaxKind};
use crate::utils::month_name;

#[derive(Serialize)]
struct ReportCsvRow {
    #[serde(rename = "Ano")]
    year: i32,
    #[serde(rename = "Mês")]
    month: &'static str,
    #[serde(rename = "Entradas (Revenda + Frete)")]
    inbound_net: String,
    #[serde(rename = "Saídas")]
    outbound_net: String,
    #[serde(rename = "Resultado Líquido")]
    net_result: String,
    #[serde(rename = "ICMS Entradas")]
    icms_credit: String,
    #[serde(rename = "ICMS Saídas")]
    icms_debit: String,
    #[serde(rename = "Crédito ICMS Acum. (início)")]
    icms_opening: String,
    #[serde(rename = "ICMS a Pagar")]
    icms_payable: String,
    #[serde(rename = "Crédito ICMS Transportado")]
    icms_closing: String,
    #[serde(rename = "PIS/COFINS Entradas")]
    pis_cofins_credit: String,
    #[serde(rename = "PIS/COFINS Saídas")]
    pis_cofins_debit: String,
    #[serde(rename = "Crédito PIS/COFINS Acum. (início)")]
    pis_cofins_opening: String,
    #[serde(rename = "PIS/COFINS a Pagar")]
    pis_cofins_payable: String,
    #[serde(rename = "Crédito PIS/COFINS Transportado")]
    pis_cofins_closing: String,
}

#[derive(Serialize)]
struct ProjectionCsvRow {
    #[serde(rename = "Ano")]
    year: i32,
    #[serde(rename = "Mês")]
    month: &'static str,
    #[serde(rename = "Imposto")]
    tax: String,
    #[serde(rename = "Crédito Acum. (início)")]
    opening: String,
    #[serde(rename = "Crédito do Período")]
    credit: String,
    #[serde(rename = "Débito do Período")]
    debit: String,
    #[serde(rename = "A Pagar")]
    payable: String,
    #[serde(rename = "Crédito Transportado")]
    closing: String,
}

/// Денежные значения пишутся с двумя знаками после точки.
fn cell(value: Money) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn label(month: u32) -> &'static str {
    month_name(month).unwrap_or_default()
}

/// Пишет помесячный отчёт в CSV.
pub fn write_report_csv<W: Write>(writer: W, report: &FiscalReport) -> Result<(), ReportError> {
    let mut wrt = csv::Writer::from_writer(writer);
    for period in report.periods() {
        let (icms, pc) = (&period.icms, &period.pis_cofins);
        wrt.serialize(ReportCsvRow {
            year: period.year,
            month: label(period.month),
            inbound_net: cell(period.basis.inbound_net_total),
            outbound_net: cell(period.basis.outbound_net_total),
            net_result: cell(period.basis.net_result()?),
            icms_credit: cell(icms.period_credit),
            icms_debit: cell(icms.period_debit),
            icms_opening: cell(icms.opening_credit),
            icms_payable: cell(icms.amount_payable),
            icms_closing: cell(icms.closing_credit),
            pis_cofins_credit: cell(pc.period_credit),
            pis_cofins_debit: cell(pc.period_debit),
            pis_cofins_opening: cell(pc.opening_credit),
            pis_cofins_payable: cell(pc.amount_payable),
            pis_cofins_closing: cell(pc.closing_credit),
        })?;
    }
    wrt.flush()?;
    Ok(())
}

fn projection_row(kind: TaxKind, result: &PeriodResult) -> ProjectionCsvRow {
    ProjectionCsvRow {
        year: result.year,
        month: label(result.month),
        tax: kind.to_string(),
        opening: cell(result.opening_credit),
        credit: cell(result.period_credit),
        debit: cell(result.period_debit),
        payable: cell(result.amount_payable),
        closing: cell(result.closing_credit),
    }
}

/// Пишет прогноз в CSV: сначала все месяцы ICMS, затем PIS/COFINS.
pub fn write_projection_csv<W: Write>(
    writer: W,
    projection: &Projection,
) -> Result<(), ReportError> {
    let mut wrt = csv::Writer::from_writer(writer);
    let rows = projection
        .icms
        .iter()
        .map(|r| projection_row(TaxKind::Icms, r))
        .chain(
            projection
                .pis_cofins
                .iter()
                .map(|r| projection_row(TaxKind::PisCofins, r)),
        );
    for row in rows {
        wrt.serialize(row)?;
    }
    wrt.flush()?;
    Ok(())
}
