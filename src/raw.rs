//! Чтение реестра накладных из CSV и приведение строк к типизированному виду.

use std::collections::BTreeSet;
use std::io::Read;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::ReportError;
use crate::types::{Direction, LedgerRow};
use crate::utils::{normalize_whitespace, parse_amount, parse_date};

/// Строка реестра в исходном текстовом виде.
///
/// Отсутствующие колонки читаются как пустые строки: расчёт по такому
/// реестру даёт нули, а не ошибку.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawLedgerRow {
    /// Дата выставления, `dd/mm/yyyy`.
    #[serde(rename = "Data Emissão", default)]
    pub emission_date: String,
    /// «Entrada» или «Saída».
    #[serde(rename = "Tipo", default)]
    pub direction: String,
    /// Классификация накладной.
    #[serde(rename = "Classificação", default)]
    pub classification: String,
    /// Чистая стоимость.
    #[serde(rename = "Valor Líquido", default)]
    pub net_value: String,
    /// Сумма ICMS.
    #[serde(rename = "Valor ICMS", default)]
    pub tax_value: String,
}

/// Исходный реестр без разбора значений.
#[derive(Debug, Clone, Default)]
pub struct RawLedger {
    /// Строки реестра.
    pub rows: Vec<RawLedgerRow>,
}

impl RawLedger {
    /// Читает CSV с разделителем `,` из произвольного `Read`.
    #[inline]
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReportError> {
        Self::from_reader_with_delimiter(reader, b',')
    }

    /// Читает CSV с заданным разделителем (`;` в локальных выгрузках).
    pub fn from_reader_with_delimiter<R: Read>(
        reader: R,
        delimiter: u8,
    ) -> Result<Self, ReportError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let rows = rdr
            .deserialize::<RawLedgerRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Создаёт реестр из готовой CSV-строки.
    #[inline]
    pub fn from_str(s: &str) -> Result<Self, ReportError> {
        Self::from_reader(s.as_bytes())
    }
}

/// Годы и месяцы, встречающиеся в реестре.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailablePeriods {
    /// Годы по возрастанию.
    pub years: Vec<i32>,
    /// Месяцы по возрастанию (по всем годам).
    pub months: Vec<u32>,
}

/// Типизированный снимок реестра, с которым работает расчёт.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Накладные.
    pub rows: Vec<LedgerRow>,
}

impl Ledger {
    /// Создаёт реестр из готовых строк.
    #[inline]
    pub const fn new(rows: Vec<LedgerRow>) -> Self {
        Self { rows }
    }

    /// Разбирает текстовые строки. Строки с неизвестным направлением
    /// отбрасываются, нераспознанная дата превращается в `None`.
    pub fn from_raw(raw: &RawLedger) -> Self {
        let rows = raw
            .rows
            .iter()
            .filter_map(|row| {
                let Some(direction) = Direction::from_marker(&row.direction) else {
                    tracing::debug!(marker = %row.direction, "row with unknown direction dropped");
                    return None;
                };
                Some(LedgerRow {
                    emission_date: parse_date(&row.emission_date).ok(),
                    direction,
                    classification: normalize_whitespace(&row.classification),
                    net_value: parse_amount(&row.net_value),
                    tax_value: parse_amount(&row.tax_value),
                })
            })
            .collect();
        Self { rows }
    }

    /// Самая поздняя дата выставления в реестре.
    pub fn latest_emission_date(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(|r| r.emission_date).max()
    }

    /// Годы и месяцы, для которых в реестре есть накладные.
    pub fn available_periods(&self) -> AvailablePeriods {
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();
        for date in self.rows.iter().filter_map(|r| r.emission_date) {
            years.insert(date.year());
            months.insert(date.month());
        }
        AvailablePeriods {
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
        }
    }
}
