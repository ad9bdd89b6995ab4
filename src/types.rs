//! Доменные типы: строки реестра, помесячные базы и результаты переноса кредита.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ReportError;
use crate::utils::month_from_name;

/// Денежное значение, используем `Decimal` для точных расчётов.
pub type Money = Decimal;

/// Совокупная ставка PIS/COFINS (9,25%).
pub const PIS_COFINS_RATE: Money = Decimal::from_parts(925, 0, 0, false, 4);

/// Направление операции по накладной.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Входящая накладная («Entrada»), источник кредита.
    Inbound,
    /// Исходящая накладная («Saída»), источник дебета.
    Outbound,
}

impl Direction {
    /// Распознаёт маркер направления из реестра.
    ///
    /// Понимает «Entrada»/«Saída» (без учёта регистра и с акцентом или без),
    /// а также `inbound`/`outbound`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_lowercase().as_str() {
            "entrada" | "entradas" | "inbound" => Some(Self::Inbound),
            "saída" | "saídas" | "saida" | "saidas" | "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }
}

/// Вид налога, для которого ведётся перенос кредита.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxKind {
    /// ICMS: кредит и дебет берутся из колонки налога.
    Icms,
    /// PIS/COFINS: кредит и дебет считаются от чистой стоимости по ставке 9,25%.
    PisCofins,
}

impl TaxKind {
    /// Оба вида налога в порядке вывода.
    pub const ALL: [Self; 2] = [Self::Icms, Self::PisCofins];

    /// Кредит и дебет периода для данного налога по месячной базе.
    pub fn period_input(self, basis: &MonthlyBasis) -> PeriodInput {
        match self {
            Self::Icms => PeriodInput {
                credit: basis.inbound_tax_total,
                debit: basis.outbound_tax_total,
            },
            Self::PisCofins => PeriodInput {
                credit: basis.inbound_net_total * PIS_COFINS_RATE,
                debit: basis.outbound_net_total * PIS_COFINS_RATE,
            },
        }
    }
}

impl std::fmt::Display for TaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Icms => write!(f, "ICMS"),
            Self::PisCofins => write!(f, "PIS/COFINS"),
        }
    }
}

/// Одна накладная из реестра.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    /// Дата выставления; `None`, если дату не удалось разобрать.
    pub emission_date: Option<NaiveDate>,
    /// Направление операции.
    pub direction: Direction,
    /// Классификация в свободной форме («Mercadoria para Revenda», «Frete»...).
    pub classification: String,
    /// Чистая стоимость.
    pub net_value: Money,
    /// Сумма налога (ICMS) по накладной.
    pub tax_value: Money,
}

/// Суммы по одному календарному месяцу.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyBasis {
    /// Чистая стоимость входящих накладных.
    pub inbound_net_total: Money,
    /// Чистая стоимость исходящих накладных.
    pub outbound_net_total: Money,
    /// Налог по входящим накладным.
    pub inbound_tax_total: Money,
    /// Налог по исходящим накладным.
    pub outbound_tax_total: Money,
}

impl MonthlyBasis {
    /// Чистый результат месяца: исходящие минус входящие.
    pub fn net_result(&self) -> Result<Money, ReportError> {
        self.outbound_net_total
            .checked_sub(self.inbound_net_total)
            .ok_or(ReportError::Overflow {
                context: "net result",
            })
    }
}

/// Кредит и дебет, возникшие за период.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodInput {
    /// Кредит периода.
    pub credit: Money,
    /// Дебет периода.
    pub debit: Money,
}

/// Переносимый остаток кредита по одному налогу. Всегда неотрицателен.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RolloverState(Money);

impl RolloverState {
    /// Нулевой остаток, с которого начинается январь.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Создаёт остаток, отрицательные значения обрезаются до нуля.
    #[inline]
    pub fn new(credit: Money) -> Self {
        Self(credit.max(Decimal::ZERO))
    }

    /// Сумма переносимого кредита.
    #[inline]
    pub const fn credit(self) -> Money {
        self.0
    }
}

/// Итог одного месяца по одному налогу.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodResult {
    /// Год.
    pub year: i32,
    /// Месяц (1..=12).
    pub month: u32,
    /// Кредит на начало месяца.
    pub opening_credit: Money,
    /// Кредит, возникший за месяц.
    pub period_credit: Money,
    /// Дебет, возникший за месяц.
    pub period_debit: Money,
    /// Сумма к уплате.
    pub amount_payable: Money,
    /// Кредит на конец месяца, он же входящий кредит следующего.
    pub closing_credit: Money,
}

impl PeriodResult {
    /// Итог месяца в виде одного значения.
    pub fn settlement(&self) -> Settlement {
        if self.amount_payable > Decimal::ZERO {
            Settlement::Payable(self.amount_payable)
        } else if self.closing_credit > Decimal::ZERO {
            Settlement::CarriedCredit(self.closing_credit)
        } else {
            Settlement::Settled
        }
    }
}

/// Итог месяца: налог к уплате, перенос кредита или ноль.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Кредита не хватило, остаток к уплате.
    Payable(Money),
    /// Кредит покрыл дебет, остаток переносится.
    CarriedCredit(Money),
    /// Кредит в точности покрыл дебет.
    Settled,
}

/// Строка помесячного отчёта: база и результаты по обоим налогам.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalPeriod {
    /// Год.
    pub year: i32,
    /// Месяц (1..=12).
    pub month: u32,
    /// Суммы по отобранным накладным месяца.
    pub basis: MonthlyBasis,
    /// Перенос кредита по ICMS.
    pub icms: PeriodResult,
    /// Перенос кредита по PIS/COFINS.
    pub pis_cofins: PeriodResult,
}

impl FiscalPeriod {
    /// Результат по конкретному налогу.
    #[inline]
    pub const fn result(&self, kind: TaxKind) -> &PeriodResult {
        match kind {
            TaxKind::Icms => &self.icms,
            TaxKind::PisCofins => &self.pis_cofins,
        }
    }
}

/// Набор месяцев, запрошенных для отчёта.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MonthSelection {
    /// Весь год.
    #[default]
    All,
    /// Только указанные месяцы.
    Months(BTreeSet<u32>),
}

impl MonthSelection {
    /// Выбор по номерам месяцев; пустой список означает весь год.
    pub fn months<I: IntoIterator<Item = u32>>(months: I) -> Result<Self, ReportError> {
        let mut set = BTreeSet::new();
        for month in months {
            if !(1..=12).contains(&month) {
                return Err(ReportError::InvalidMonth {
                    value: month.to_string(),
                });
            }
            set.insert(month);
        }
        if set.is_empty() {
            Ok(Self::All)
        } else {
            Ok(Self::Months(set))
        }
    }

    /// Выбор по названиям месяцев на португальском («Março», «Todos»...).
    pub fn from_names<I, S>(names: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut months = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.to_lowercase().starts_with("todos") {
                return Ok(Self::All);
            }
            let month = month_from_name(name).ok_or_else(|| ReportError::InvalidMonth {
                value: name.to_string(),
            })?;
            months.push(month);
        }
        Self::months(months)
    }

    /// Месяцы в порядке возрастания, независимо от порядка запроса.
    pub fn resolve(&self) -> Vec<u32> {
        match self {
            Self::All => (1..=12).collect(),
            Self::Months(set) => set.iter().copied().collect(),
        }
    }
}
