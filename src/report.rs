//! Построение помесячного отчёта по ICMS и PIS/COFINS.

use std::collections::BTreeMap;

use crate::aggregate::aggregate;
use crate::error::ReportError;
use crate::filter::{EligibleCategories, select_tax_basis};
use crate::raw::Ledger;
use crate::rollover::run_months;
use crate::types::{FiscalPeriod, MonthSelection, PeriodResult, TaxKind};

/// Параметры расчёта отчёта.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Год расчёта.
    pub year: i32,
    /// Запрошенные месяцы.
    pub months: MonthSelection,
    /// Категории входящих накладных, дающие кредит.
    pub categories: EligibleCategories,
}

impl ReportOptions {
    /// Весь год с категориями по умолчанию.
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            months: MonthSelection::All,
            categories: EligibleCategories::default(),
        }
    }
}

/// Помесячный отчёт: упорядоченные периоды и индекс по (год, месяц).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiscalReport {
    periods: Vec<FiscalPeriod>,
    index: BTreeMap<(i32, u32), usize>,
}

impl FiscalReport {
    /// Считает отчёт по снимку реестра.
    pub fn compute(ledger: &Ledger, options: &ReportOptions) -> Result<Self, ReportError> {
        let basis_rows = select_tax_basis(&ledger.rows, &options.categories);
        let bases = aggregate(basis_rows, options.year)?;
        let months = options.months.resolve();

        let icms = run_months(&bases, TaxKind::Icms, &months)?;
        let pis_cofins = run_months(&bases, TaxKind::PisCofins, &months)?;

        let periods: Vec<FiscalPeriod> = icms
            .into_iter()
            .zip(pis_cofins)
            .map(|(icms, pis_cofins)| FiscalPeriod {
                year: icms.year,
                month: icms.month,
                basis: bases.get(icms.month),
                icms,
                pis_cofins,
            })
            .collect();

        tracing::info!(
            year = options.year,
            periods = periods.len(),
            "fiscal report computed"
        );
        Ok(Self::from_periods(periods))
    }

    fn from_periods(periods: Vec<FiscalPeriod>) -> Self {
        let index = periods
            .iter()
            .enumerate()
            .map(|(idx, p)| ((p.year, p.month), idx))
            .collect();
        Self { periods, index }
    }

    /// Периоды в хронологическом порядке.
    #[inline]
    pub fn periods(&self) -> &[FiscalPeriod] {
        &self.periods
    }

    /// `true`, если в отчёте нет ни одного периода.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Число периодов.
    #[inline]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Период по году и месяцу.
    pub fn period(&self, year: i32, month: u32) -> Option<&FiscalPeriod> {
        self.index
            .get(&(year, month))
            .and_then(|idx| self.periods.get(*idx))
    }

    /// Результаты по одному налогу в хронологическом порядке.
    pub fn results(&self, kind: TaxKind) -> impl Iterator<Item = &PeriodResult> {
        self.periods.iter().map(move |p| p.result(kind))
    }

    /// Результаты по ICMS.
    #[inline]
    pub fn icms(&self) -> impl Iterator<Item = &PeriodResult> {
        self.results(TaxKind::Icms)
    }

    /// Результаты по PIS/COFINS.
    #[inline]
    pub fn pis_cofins(&self) -> impl Iterator<Item = &PeriodResult> {
        self.results(TaxKind::PisCofins)
    }

    /// Последний (текущий) период отчёта.
    #[inline]
    pub fn latest(&self) -> Option<&FiscalPeriod> {
        self.periods.last()
    }
}

/// Builder для расчёта `FiscalReport` с выбором месяцев и категорий.
pub struct ReportBuilder<'a> {
    ledger: &'a Ledger,
    options: ReportOptions,
}

impl<'a> ReportBuilder<'a> {
    /// Создаёт builder для реестра и года: весь год, категории по умолчанию.
    ///
    /// # Пример
    ///
    /// ```
    /// # use fiscal_rollover::{Ledger, MonthSelection, ReportBuilder};
    /// # let ledger = Ledger::default();
    /// let report = ReportBuilder::new(&ledger, 2025)
    ///     .months(MonthSelection::months([3, 4, 5]).unwrap())
    ///     .run();
    /// assert_eq!(report.len(), 3);
    /// ```
    #[inline]
    pub fn new(ledger: &'a Ledger, year: i32) -> Self {
        Self {
            ledger,
            options: ReportOptions::for_year(year),
        }
    }

    /// Задаёт запрошенные месяцы.
    #[inline]
    #[must_use]
    pub fn months(mut self, months: MonthSelection) -> Self {
        self.options.months = months;
        self
    }

    /// Задаёт категории входящих накладных, дающие кредит.
    #[inline]
    #[must_use]
    pub fn categories(mut self, categories: EligibleCategories) -> Self {
        self.options.categories = categories;
        self
    }

    /// Текущие параметры.
    #[inline]
    pub const fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Выполняет расчёт, возвращая ошибку вызывающему.
    #[inline]
    pub fn try_run(self) -> Result<FiscalReport, ReportError> {
        FiscalReport::compute(self.ledger, &self.options)
    }

    /// Выполняет расчёт. Ошибка пишется в лог и даёт пустой отчёт:
    /// частичный результат никогда не возвращается.
    pub fn run(self) -> FiscalReport {
        let year = self.options.year;
        self.try_run().unwrap_or_else(|err| {
            tracing::error!(year, error = %err, "fiscal report failed");
            FiscalReport::default()
        })
    }
}
