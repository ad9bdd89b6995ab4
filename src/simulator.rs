//! Прогноз переноса кредита на оставшиеся месяцы года по суммам,
//! введённым вручную по ставкам.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;

use crate::aggregate::aggregate;
use crate::error::ReportError;
use crate::filter::{EligibleCategories, select_tax_basis};
use crate::raw::Ledger;
use crate::rollover::{opening_balance, roll};
use crate::types::{Money, PIS_COFINS_RATE, PeriodInput, PeriodResult, TaxKind};
use crate::utils::parse_amount;

const RATE_1: Money = Decimal::from_parts(1, 0, 0, false, 2);
const RATE_4: Money = Decimal::from_parts(4, 0, 0, false, 2);
const RATE_7: Money = Decimal::from_parts(7, 0, 0, false, 2);
const RATE_11: Money = Decimal::from_parts(11, 0, 0, false, 2);
const RATE_12: Money = Decimal::from_parts(12, 0, 0, false, 2);
const RATE_19: Money = Decimal::from_parts(19, 0, 0, false, 2);

/// Корзина ввода симулятора: направление и ставка.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// Входящие по ставке ICMS 4%.
    IcmsInbound4,
    /// Входящие по ставке ICMS 7%.
    IcmsInbound7,
    /// Входящие по ставке ICMS 12%.
    IcmsInbound12,
    /// Входящие по ставке ICMS 19%.
    IcmsInbound19,
    /// Исходящие по ставке 11% с надбавкой PROTEGE 1%.
    IcmsOutbound11,
    /// Исходящие по ставке ICMS 12%.
    IcmsOutbound12,
    /// Исходящие по ставке ICMS 19%.
    IcmsOutbound19,
    /// Входящие с правом на кредит PIS/COFINS.
    PisCofinsInbound,
    /// Облагаемая выручка PIS/COFINS.
    PisCofinsOutbound,
}

impl Bucket {
    /// Все корзины.
    pub const ALL: [Self; 9] = [
        Self::IcmsInbound4,
        Self::IcmsInbound7,
        Self::IcmsInbound12,
        Self::IcmsInbound19,
        Self::IcmsOutbound11,
        Self::IcmsOutbound12,
        Self::IcmsOutbound19,
        Self::PisCofinsInbound,
        Self::PisCofinsOutbound,
    ];

    /// Имя корзины во входных данных.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IcmsInbound4 => "entrada_4",
            Self::IcmsInbound7 => "entrada_7",
            Self::IcmsInbound12 => "entrada_12",
            Self::IcmsInbound19 => "entrada_19",
            Self::IcmsOutbound11 => "saida_11",
            Self::IcmsOutbound12 => "saida_12",
            Self::IcmsOutbound19 => "saida_19",
            Self::PisCofinsInbound => "entrada_pis",
            Self::PisCofinsOutbound => "saida_pis",
        }
    }
}

impl FromStr for Bucket {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| ReportError::UnknownBucket(s.trim().to_string()))
    }
}

/// Суммы ICMS одного месяца по ставкам.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IcmsBuckets {
    /// Входящие 4%.
    pub inbound_4: Money,
    /// Входящие 7%.
    pub inbound_7: Money,
    /// Входящие 12%.
    pub inbound_12: Money,
    /// Входящие 19%.
    pub inbound_19: Money,
    /// Исходящие 11% (+1% PROTEGE на ту же базу).
    pub outbound_11: Money,
    /// Исходящие 12%.
    pub outbound_12: Money,
    /// Исходящие 19%.
    pub outbound_19: Money,
}

/// Кредиты и дебеты ICMS по ставкам.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IcmsBreakdown {
    /// Кредит 4%.
    pub credit_4: Money,
    /// Кредит 7%.
    pub credit_7: Money,
    /// Кредит 12%.
    pub credit_12: Money,
    /// Кредит 19%.
    pub credit_19: Money,
    /// Дебет 11%.
    pub debit_11: Money,
    /// Надбавка PROTEGE 1% к базе 11%.
    pub debit_protege: Money,
    /// Дебет 12%.
    pub debit_12: Money,
    /// Дебет 19%.
    pub debit_19: Money,
}

impl IcmsBreakdown {
    /// Сумма кредитов.
    pub fn total_credit(&self) -> Money {
        self.credit_4 + self.credit_7 + self.credit_12 + self.credit_19
    }

    /// Сумма дебетов, включая PROTEGE.
    pub fn total_debit(&self) -> Money {
        self.debit_11 + self.debit_protege + self.debit_12 + self.debit_19
    }
}

impl IcmsBuckets {
    /// Разложение на кредиты и дебеты по ставкам.
    pub fn breakdown(&self) -> IcmsBreakdown {
        IcmsBreakdown {
            credit_4: self.inbound_4 * RATE_4,
            credit_7: self.inbound_7 * RATE_7,
            credit_12: self.inbound_12 * RATE_12,
            credit_19: self.inbound_19 * RATE_19,
            debit_11: self.outbound_11 * RATE_11,
            debit_protege: self.outbound_11 * RATE_1,
            debit_12: self.outbound_12 * RATE_12,
            debit_19: self.outbound_19 * RATE_19,
        }
    }

    /// Кредит и дебет месяца.
    pub fn period_input(&self) -> PeriodInput {
        let breakdown = self.breakdown();
        PeriodInput {
            credit: breakdown.total_credit(),
            debit: breakdown.total_debit(),
        }
    }
}

/// Суммы PIS/COFINS одного месяца.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PisCofinsBuckets {
    /// Входящие с правом на кредит.
    pub inbound: Money,
    /// Облагаемая выручка.
    pub outbound: Money,
}

impl PisCofinsBuckets {
    /// Кредит и дебет месяца по ставке 9,25%.
    pub fn period_input(&self) -> PeriodInput {
        PeriodInput {
            credit: self.inbound * PIS_COFINS_RATE,
            debit: self.outbound * PIS_COFINS_RATE,
        }
    }
}

/// Введённые вручную суммы по (год, месяц, корзина).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationInputs {
    entries: BTreeMap<(i32, u32, Bucket), Money>,
}

impl SimulationInputs {
    /// Пустой набор: все корзины нулевые.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Записывает сумму. Отрицательные суммы и месяцы вне 1..=12 отклоняются.
    pub fn set(
        &mut self,
        year: i32,
        month: u32,
        bucket: Bucket,
        amount: Money,
    ) -> Result<(), ReportError> {
        if !(1..=12).contains(&month) {
            return Err(ReportError::InvalidMonth {
                value: month.to_string(),
            });
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ReportError::NegativeInput {
                bucket: bucket.name(),
                value: amount.to_string(),
            });
        }
        self.entries.insert((year, month, bucket), amount);
        Ok(())
    }

    /// Записывает сумму из текста (`10.000,00`); нечисловой текст даёт ноль.
    #[inline]
    pub fn set_text(
        &mut self,
        year: i32,
        month: u32,
        bucket: Bucket,
        raw: &str,
    ) -> Result<(), ReportError> {
        self.set(year, month, bucket, parse_amount(raw))
    }

    /// Сумма в корзине; незаполненная корзина даёт ноль.
    #[inline]
    pub fn get(&self, year: i32, month: u32, bucket: Bucket) -> Money {
        self.entries
            .get(&(year, month, bucket))
            .copied()
            .unwrap_or_default()
    }

    /// `true`, если ни одна корзина не заполнена.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Корзины ICMS месяца.
    pub fn icms_buckets(&self, year: i32, month: u32) -> IcmsBuckets {
        IcmsBuckets {
            inbound_4: self.get(year, month, Bucket::IcmsInbound4),
            inbound_7: self.get(year, month, Bucket::IcmsInbound7),
            inbound_12: self.get(year, month, Bucket::IcmsInbound12),
            inbound_19: self.get(year, month, Bucket::IcmsInbound19),
            outbound_11: self.get(year, month, Bucket::IcmsOutbound11),
            outbound_12: self.get(year, month, Bucket::IcmsOutbound12),
            outbound_19: self.get(year, month, Bucket::IcmsOutbound19),
        }
    }

    /// Корзины PIS/COFINS месяца.
    pub fn pis_cofins_buckets(&self, year: i32, month: u32) -> PisCofinsBuckets {
        PisCofinsBuckets {
            inbound: self.get(year, month, Bucket::PisCofinsInbound),
            outbound: self.get(year, month, Bucket::PisCofinsOutbound),
        }
    }
}

/// Результат прогноза на оставшиеся месяцы года.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Дата, от которой считается прогноз.
    pub reference_date: Option<NaiveDate>,
    /// Фактический остаток кредита ICMS на конец последнего исторического месяца.
    pub historical_icms_credit: Money,
    /// То же для PIS/COFINS.
    pub historical_pis_cofins_credit: Money,
    /// Прогноз ICMS по месяцам.
    pub icms: Vec<PeriodResult>,
    /// Прогноз PIS/COFINS по месяцам.
    pub pis_cofins: Vec<PeriodResult>,
    index: BTreeMap<u32, usize>,
}

impl Projection {
    /// Прогнозный результат налога за месяц.
    pub fn period(&self, kind: TaxKind, month: u32) -> Option<&PeriodResult> {
        let idx = *self.index.get(&month)?;
        match kind {
            TaxKind::Icms => self.icms.get(idx),
            TaxKind::PisCofins => self.pis_cofins.get(idx),
        }
    }

    /// `true`, если прогнозировать нечего (отчётный месяц: декабрь).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.icms.is_empty()
    }
}

/// Симулятор: фактический остаток кредита из реестра плюс ручные суммы
/// на каждый оставшийся месяц года.
pub struct ProjectionSimulator<'a> {
    ledger: &'a Ledger,
    categories: EligibleCategories,
    reference_date: Option<NaiveDate>,
}

impl<'a> ProjectionSimulator<'a> {
    /// Симулятор по реестру с категориями по умолчанию.
    #[inline]
    pub fn new(ledger: &'a Ledger) -> Self {
        Self {
            ledger,
            categories: EligibleCategories::default(),
            reference_date: None,
        }
    }

    /// Категории входящих накладных для исторической части.
    #[inline]
    #[must_use]
    pub fn categories(mut self, categories: EligibleCategories) -> Self {
        self.categories = categories;
        self
    }

    /// Явно задаёт «сегодня» вместо последней даты реестра.
    #[inline]
    #[must_use]
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// «Сегодня»: заданная дата, иначе последняя дата реестра, иначе текущая дата.
    pub fn resolve_reference_date(&self) -> NaiveDate {
        self.reference_date
            .or_else(|| self.ledger.latest_emission_date())
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Считает прогноз, возвращая ошибку вызывающему.
    pub fn try_run(&self, inputs: &SimulationInputs) -> Result<Projection, ReportError> {
        let now = self.resolve_reference_date();
        let year = now.year();
        let last_historical = now.month();

        let basis_rows = select_tax_basis(&self.ledger.rows, &self.categories);
        let bases = aggregate(basis_rows, year)?;
        let icms_opening = opening_balance(&bases, TaxKind::Icms, last_historical + 1)?;
        let pis_opening = opening_balance(&bases, TaxKind::PisCofins, last_historical + 1)?;

        let projected: Vec<u32> = (last_historical + 1..=12).collect();
        let (_, icms) = roll(
            icms_opening,
            year,
            projected
                .iter()
                .map(|&m| (m, inputs.icms_buckets(year, m).period_input())),
        )?;
        let (_, pis_cofins) = roll(
            pis_opening,
            year,
            projected
                .iter()
                .map(|&m| (m, inputs.pis_cofins_buckets(year, m).period_input())),
        )?;

        tracing::info!(
            %now,
            projected_months = projected.len(),
            "projection computed"
        );

        Ok(Projection {
            reference_date: Some(now),
            historical_icms_credit: icms_opening.credit(),
            historical_pis_cofins_credit: pis_opening.credit(),
            index: projected
                .iter()
                .enumerate()
                .map(|(idx, m)| (*m, idx))
                .collect(),
            icms,
            pis_cofins,
        })
    }

    /// Считает прогноз. Ошибка пишется в лог и даёт пустой прогноз.
    pub fn run(&self, inputs: &SimulationInputs) -> Projection {
        self.try_run(inputs).unwrap_or_else(|err| {
            tracing::error!(error = %err, "projection failed");
            Projection::default()
        })
    }
}
