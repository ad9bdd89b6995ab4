//! Перенос кредита между месяцами: сначала гасим дебет кредитом,
//! недостачу платим, остаток переносим. Кредит никогда не уходит в минус.

use rust_decimal::Decimal;

use crate::aggregate::MonthlyBases;
use crate::error::ReportError;
use crate::types::{PeriodInput, PeriodResult, RolloverState, TaxKind};

/// Один шаг переноса: остаток на начало месяца и кредит/дебет месяца
/// дают результат месяца и остаток на следующий.
///
/// При равенстве доступного кредита и дебета к уплате ноль и переносится ноль.
pub fn step(
    state: RolloverState,
    input: PeriodInput,
    year: i32,
    month: u32,
) -> Result<(RolloverState, PeriodResult), ReportError> {
    let opening_credit = state.credit();
    let total_available = opening_credit
        .checked_add(input.credit)
        .ok_or(ReportError::Overflow {
            context: "available credit",
        })?;

    let (amount_payable, closing_credit) = if total_available >= input.debit {
        let closing = total_available
            .checked_sub(input.debit)
            .ok_or(ReportError::Overflow {
                context: "closing credit",
            })?;
        (Decimal::ZERO, closing)
    } else {
        let payable = input
            .debit
            .checked_sub(total_available)
            .ok_or(ReportError::Overflow {
                context: "amount payable",
            })?;
        (payable, Decimal::ZERO)
    };

    let result = PeriodResult {
        year,
        month,
        opening_credit,
        period_credit: input.credit,
        period_debit: input.debit,
        amount_payable,
        closing_credit,
    };
    Ok((RolloverState::new(closing_credit), result))
}

/// Прогоняет последовательность месяцев, передавая остаток дальше.
/// Месяцы обрабатываются в переданном порядке.
pub fn roll<I>(
    opening: RolloverState,
    year: i32,
    periods: I,
) -> Result<(RolloverState, Vec<PeriodResult>), ReportError>
where
    I: IntoIterator<Item = (u32, PeriodInput)>,
{
    periods
        .into_iter()
        .try_fold((opening, Vec::new()), |(state, mut results), (month, input)| {
            let (next, result) = step(state, input, year, month)?;
            results.push(result);
            Ok((next, results))
        })
}

/// Остаток кредита на начало `first_month`: прогон всех месяцев года
/// с января до `first_month` (не включая). Для января это ноль.
pub fn opening_balance(
    bases: &MonthlyBases,
    kind: TaxKind,
    first_month: u32,
) -> Result<RolloverState, ReportError> {
    let (state, _) = roll(
        RolloverState::ZERO,
        bases.year(),
        (1..first_month).map(|month| (month, kind.period_input(&bases.get(month)))),
    )?;
    Ok(state)
}

/// Результаты по налогу за запрошенные месяцы.
///
/// Месяцы сортируются по возрастанию. Входящий остаток первого месяца
/// получается прогоном года с января, дальше цепочка идёт через все месяцы
/// до последнего запрошенного (включая пропущенные в запросе), а в выдачу
/// попадают только запрошенные.
pub fn run_months(
    bases: &MonthlyBases,
    kind: TaxKind,
    months: &[u32],
) -> Result<Vec<PeriodResult>, ReportError> {
    let mut requested = months.to_vec();
    requested.sort_unstable();
    requested.dedup();
    let (Some(&first), Some(&last)) = (requested.first(), requested.last()) else {
        return Ok(Vec::new());
    };

    let opening = opening_balance(bases, kind, first)?;
    let (_, chain) = roll(
        opening,
        bases.year(),
        (first..=last).map(|month| (month, kind.period_input(&bases.get(month)))),
    )?;
    Ok(chain
        .into_iter()
        .filter(|r| requested.binary_search(&r.month).is_ok())
        .collect())
}
