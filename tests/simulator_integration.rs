use chrono::{Datelike, NaiveDate};
use fiscal_rollover::{
    Bucket, IcmsBuckets, Ledger, PisCofinsBuckets, ProjectionSimulator, RawLedger,
    ReportError, SimulationInputs, TaxKind,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fixture_ledger() -> Ledger {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("ledger.csv");
    let raw = RawLedger::from_reader(std::fs::File::open(path).unwrap()).unwrap();
    Ledger::from_raw(&raw)
}

#[test]
fn icms_buckets_apply_tier_rates() {
    let buckets = IcmsBuckets {
        inbound_4: dec!(1000),
        inbound_7: dec!(1000),
        inbound_12: dec!(1000),
        inbound_19: dec!(1000),
        outbound_11: dec!(1000),
        outbound_12: dec!(1000),
        outbound_19: dec!(1000),
    };
    let breakdown = buckets.breakdown();
    assert_eq!(breakdown.credit_7, dec!(70));
    assert_eq!(breakdown.debit_11, dec!(110));
    assert_eq!(breakdown.debit_protege, dec!(10));
    assert_eq!(breakdown.total_credit(), dec!(420));
    assert_eq!(breakdown.total_debit(), dec!(430));

    let input = buckets.period_input();
    assert_eq!(input.credit, dec!(420));
    assert_eq!(input.debit, dec!(430));
}

#[test]
fn pis_cofins_buckets_use_combined_rate() {
    let input = PisCofinsBuckets {
        inbound: dec!(50000),
        outbound: dec!(70000),
    }
    .period_input();
    assert_eq!(input.credit, dec!(4625));
    assert_eq!(input.debit, dec!(6475));
}

#[test]
fn projection_starts_from_historical_closing() {
    let ledger = fixture_ledger();
    let mut inputs = SimulationInputs::new();
    inputs.set(2025, 4, Bucket::IcmsInbound4, dec!(1000)).unwrap();
    inputs.set(2025, 4, Bucket::IcmsInbound19, dec!(100)).unwrap();
    inputs.set_text(2025, 4, Bucket::IcmsOutbound11, "R$ 1.000,00").unwrap();
    inputs.set(2025, 4, Bucket::IcmsOutbound12, dec!(500)).unwrap();
    inputs.set(2025, 5, Bucket::IcmsOutbound19, dec!(1000)).unwrap();
    inputs.set(2025, 4, Bucket::PisCofinsInbound, dec!(1000)).unwrap();
    inputs.set(2025, 4, Bucket::PisCofinsOutbound, dec!(4000)).unwrap();

    let projection = ProjectionSimulator::new(&ledger).run(&inputs);
    assert_eq!(projection.reference_date, NaiveDate::from_ymd_opt(2025, 3, 18));
    assert_eq!(projection.historical_icms_credit, dec!(260));
    assert_eq!(projection.historical_pis_cofins_credit, dec!(185));
    assert_eq!(projection.icms.len(), 9);
    assert_eq!(projection.pis_cofins.len(), 9);

    let apr = projection.period(TaxKind::Icms, 4).unwrap();
    assert_eq!(apr.opening_credit, dec!(260));
    assert_eq!(apr.period_credit, dec!(59));
    assert_eq!(apr.period_debit, dec!(180));
    assert_eq!(apr.closing_credit, dec!(139));

    let may = projection.period(TaxKind::Icms, 5).unwrap();
    assert_eq!(may.opening_credit, dec!(139));
    assert_eq!(may.amount_payable, dec!(51));
    assert_eq!(may.closing_credit, Decimal::ZERO);

    let pis_apr = projection.period(TaxKind::PisCofins, 4).unwrap();
    assert_eq!(pis_apr.amount_payable, dec!(92.5));
    assert_eq!(pis_apr.closing_credit, Decimal::ZERO);

    assert!(projection.period(TaxKind::Icms, 3).is_none());
    let dec_icms = projection.period(TaxKind::Icms, 12).unwrap();
    assert_eq!(dec_icms.closing_credit, Decimal::ZERO);
}

#[test]
fn projection_in_december_has_nothing_to_project() {
    let ledger = Ledger::default();
    let projection = ProjectionSimulator::new(&ledger)
        .reference_date(NaiveDate::from_ymd_opt(2025, 12, 10).unwrap())
        .run(&SimulationInputs::new());
    assert!(projection.is_empty());
    assert_eq!(projection.historical_icms_credit, Decimal::ZERO);
}

#[test]
fn empty_ledger_projects_from_today() {
    let ledger = Ledger::default();
    let projection = ProjectionSimulator::new(&ledger).run(&SimulationInputs::new());
    let today = projection.reference_date.expect("reference date");
    assert_eq!(projection.icms.len(), (12 - today.month()) as usize);
    assert!(projection.icms.iter().all(|r| r.closing_credit.is_zero()));
}

#[test]
fn inputs_reject_negative_and_bad_month() {
    let mut inputs = SimulationInputs::new();
    assert!(matches!(
        inputs.set(2025, 4, Bucket::IcmsInbound7, dec!(-1)),
        Err(ReportError::NegativeInput {
            bucket: "entrada_7",
            ..
        })
    ));
    assert!(matches!(
        inputs.set(2025, 13, Bucket::IcmsInbound7, dec!(1)),
        Err(ReportError::InvalidMonth { .. })
    ));
    inputs.set_text(2025, 4, Bucket::IcmsInbound7, "abc").unwrap();
    assert_eq!(inputs.get(2025, 4, Bucket::IcmsInbound7), Decimal::ZERO);
    assert_eq!(inputs.get(2025, 5, Bucket::IcmsInbound12), Decimal::ZERO);
}

#[test]
fn bucket_names_round_trip() {
    for bucket in Bucket::ALL {
        assert_eq!(bucket.name().parse::<Bucket>().unwrap(), bucket);
    }
    assert!(matches!(
        "entrada_5".parse::<Bucket>(),
        Err(ReportError::UnknownBucket(_))
    ));
}
