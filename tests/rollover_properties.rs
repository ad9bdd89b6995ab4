use std::collections::BTreeSet;

use chrono::NaiveDate;
use fiscal_rollover::{
    Direction, FiscalReport, Ledger, LedgerRow, MonthSelection, PeriodInput, PeriodResult,
    ReportBuilder, RolloverState, TaxKind, roll,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

const CLASSIFICATIONS: [&str; 3] = ["Mercadoria para Revenda", "Frete sobre Compras", "Serviços"];

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn period_input_strategy() -> impl Strategy<Value = PeriodInput> {
    (amount_strategy(), amount_strategy())
        .prop_map(|(credit, debit)| PeriodInput { credit, debit })
}

fn ledger_row_strategy() -> impl Strategy<Value = LedgerRow> {
    (
        1u32..=12,
        1u32..=28,
        any::<bool>(),
        0usize..CLASSIFICATIONS.len(),
        amount_strategy(),
        amount_strategy(),
    )
        .prop_map(|(month, day, inbound, class, net, tax)| LedgerRow {
            emission_date: NaiveDate::from_ymd_opt(2025, month, day),
            direction: if inbound {
                Direction::Inbound
            } else {
                Direction::Outbound
            },
            classification: CLASSIFICATIONS[class].to_string(),
            net_value: net,
            tax_value: tax,
        })
}

fn ledger_strategy() -> impl Strategy<Value = Ledger> {
    prop::collection::vec(ledger_row_strategy(), 0..40).prop_map(Ledger::new)
}

fn check_period(r: &PeriodResult) {
    let available = r.opening_credit + r.period_credit;
    assert!(r.opening_credit >= Decimal::ZERO);
    assert!(r.amount_payable >= Decimal::ZERO);
    assert!(r.closing_credit >= Decimal::ZERO);
    assert!(r.amount_payable == Decimal::ZERO || r.closing_credit == Decimal::ZERO);
    assert_eq!(r.closing_credit, (available - r.period_debit).max(Decimal::ZERO));
    assert_eq!(r.amount_payable, (r.period_debit - available).max(Decimal::ZERO));
}

fn check_chain(results: &[&PeriodResult]) {
    for pair in results.windows(2) {
        assert_eq!(pair[1].month, pair[0].month + 1);
        assert_eq!(pair[1].opening_credit, pair[0].closing_credit);
    }
}

fn full_year(ledger: &Ledger) -> FiscalReport {
    ReportBuilder::new(ledger, 2025).try_run().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn roll_keeps_credit_non_negative_and_chained(
        opening in amount_strategy(),
        inputs in prop::collection::vec(period_input_strategy(), 0..24),
    ) {
        let months = (1u32..).zip(inputs);
        let (state, results) = roll(RolloverState::new(opening), 2025, months).unwrap();

        prop_assert_eq!(results.first().map_or(opening, |r| r.opening_credit), opening);
        for r in &results {
            check_period(r);
        }
        check_chain(&results.iter().collect::<Vec<_>>());
        let last_closing = results.last().map_or(opening, |r| r.closing_credit);
        prop_assert_eq!(state.credit(), last_closing);
    }

    #[test]
    fn full_year_report_satisfies_rollover_rules(ledger in ledger_strategy()) {
        let report = full_year(&ledger);
        prop_assert_eq!(report.len(), 12);

        for kind in TaxKind::ALL {
            let results: Vec<_> = report.results(kind).collect();
            prop_assert_eq!(results[0].opening_credit, Decimal::ZERO);
            for r in &results {
                check_period(r);
            }
            check_chain(&results);
        }
    }

    #[test]
    fn trailing_range_opens_with_full_year_balance(ledger in ledger_strategy()) {
        let full = full_year(&ledger);

        for first in 1u32..=12 {
            let partial = ReportBuilder::new(&ledger, 2025)
                .months(MonthSelection::months(first..=12).unwrap())
                .try_run()
                .unwrap();
            prop_assert_eq!(partial.len(), (13 - first) as usize);

            let reference = full.period(2025, first).unwrap();
            let opening = partial.period(2025, first).unwrap();
            for kind in TaxKind::ALL {
                prop_assert_eq!(
                    opening.result(kind).opening_credit,
                    reference.result(kind).opening_credit
                );
            }
            prop_assert_eq!(partial.periods(), &full.periods()[(first - 1) as usize..]);
        }
    }

    #[test]
    fn any_month_subset_matches_full_year(
        ledger in ledger_strategy(),
        months in prop::collection::btree_set(1u32..=12, 1..=12),
    ) {
        let full = full_year(&ledger);
        let subset = ReportBuilder::new(&ledger, 2025)
            .months(MonthSelection::months(months.iter().copied()).unwrap())
            .try_run()
            .unwrap();

        let emitted: BTreeSet<u32> = subset.periods().iter().map(|p| p.month).collect();
        prop_assert_eq!(&emitted, &months);
        for period in subset.periods() {
            prop_assert_eq!(Some(period), full.period(2025, period.month));
        }
    }

    #[test]
    fn recomputing_gives_identical_report(ledger in ledger_strategy()) {
        prop_assert_eq!(full_year(&ledger), full_year(&ledger));
    }
}
