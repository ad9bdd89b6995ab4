use chrono::NaiveDate;
use fiscal_rollover::{
    Bucket, Direction, Ledger, LedgerRow, ProjectionSimulator, RawLedger, ReportBuilder,
    ReportError, SimulationInputs, format_brl, month_from_name, month_name, parse_amount,
    parse_date, write_projection_csv, write_report_csv,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn parses_brazilian_currency_text() {
    assert_eq!(parse_amount("R$ 1.234,56"), dec!(1234.56));
    assert_eq!(parse_amount("abc"), Decimal::ZERO);
    assert_eq!(parse_amount(""), Decimal::ZERO);
    assert_eq!(parse_amount("1.000.000,5"), dec!(1000000.5));
    assert_eq!(parse_amount("-R$ 10,00"), dec!(-10));
    assert_eq!(parse_amount("12,34,56"), Decimal::ZERO);
    assert_eq!(parse_amount(1234.5_f64), dec!(1234.5));
    assert_eq!(parse_amount(f64::NAN), Decimal::ZERO);
}

#[test]
fn parses_dates_and_months() {
    assert!(parse_date("15/01/2025").is_ok());
    assert!(parse_date("2025-01-15").is_ok());
    assert!(parse_date("32/01/2025").is_err());
    assert_eq!(month_name(3), Some("Março"));
    assert_eq!(month_name(13), None);
    assert_eq!(month_from_name("marco"), Some(3));
    assert_eq!(month_from_name("DEZEMBRO"), Some(12));
    assert_eq!(month_from_name("7"), Some(7));
}

#[test]
fn formats_brl() {
    assert_eq!(format_brl(dec!(12345.678)), "R$ 12.345,68");
    assert_eq!(format_brl(dec!(0)), "R$ 0,00");
    assert_eq!(format_brl(dec!(-1000)), "-R$ 1.000,00");
    assert_eq!(format_brl(dec!(999.5)), "R$ 999,50");
}

#[test]
fn report_csv_has_one_row_per_period() {
    let raw = RawLedger::from_str(
        "Data Emissão,Tipo,Classificação,Valor Líquido,Valor ICMS\n\
         15/01/2025,Entrada,Mercadoria para Revenda,\"1.000,00\",\"180,00\"\n\
         20/01/2025,Saída,Venda,\"500,00\",\"50,00\"\n",
    )
    .unwrap();
    let ledger = Ledger::from_raw(&raw);
    let report = ReportBuilder::new(&ledger, 2025).run();

    let mut out = Vec::new();
    write_report_csv(&mut out, &report).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 13);
    assert!(lines[0].starts_with("Ano,Mês,Entradas (Revenda + Frete),Saídas"));
    assert!(lines[0].ends_with("Crédito PIS/COFINS Transportado"));
    let january = "2025,Janeiro,1000.00,500.00,-500.00,180.00,50.00,0.00,0.00,130.00";
    assert!(lines[1].starts_with(january));
    assert!(lines[12].starts_with("2025,Dezembro,"));
}

#[test]
fn net_result_overflow_is_reported_by_export() {
    let ledger = Ledger::new(vec![
        LedgerRow {
            emission_date: NaiveDate::from_ymd_opt(2025, 1, 5),
            direction: Direction::Inbound,
            classification: "Mercadoria para Revenda".to_string(),
            net_value: Decimal::from_i128_with_scale(-10_i128.pow(27), 0),
            tax_value: Decimal::ZERO,
        },
        LedgerRow {
            emission_date: NaiveDate::from_ymd_opt(2025, 1, 6),
            direction: Direction::Outbound,
            classification: "Venda".to_string(),
            net_value: Decimal::MAX,
            tax_value: Decimal::ZERO,
        },
    ]);
    let report = ReportBuilder::new(&ledger, 2025).try_run().unwrap();
    let january = report.period(2025, 1).unwrap();
    assert!(matches!(
        january.basis.net_result(),
        Err(ReportError::Overflow { .. })
    ));

    let mut out = Vec::new();
    let err = write_report_csv(&mut out, &report).unwrap_err();
    assert!(matches!(err, ReportError::Overflow { .. }));
}

#[test]
fn projection_csv_lists_both_taxes() {
    let ledger = Ledger::default();
    let mut inputs = SimulationInputs::new();
    inputs.set(2025, 11, Bucket::IcmsOutbound12, dec!(100)).unwrap();
    let projection = ProjectionSimulator::new(&ledger)
        .reference_date(NaiveDate::from_ymd_opt(2025, 10, 31).unwrap())
        .run(&inputs);

    let mut out = Vec::new();
    write_projection_csv(&mut out, &projection).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "2025,Novembro,ICMS,0.00,0.00,12.00,12.00,0.00");
    assert!(lines[3].starts_with("2025,Novembro,PIS/COFINS,"));
}
