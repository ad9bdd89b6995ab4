//! Вспомогательные парсеры сумм, дат и названий месяцев.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

use crate::error::ReportError;
use crate::types::Money;

/// Названия месяцев на португальском, как в выгрузках реестра.
pub const MONTH_NAMES_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d.%m.%Y"];

/// Значение денежной ячейки: текст в бразильском формате или готовое число.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountCell<'a> {
    /// Текст вида `R$ 1.234,56`.
    Text(&'a str),
    /// Число, уже прочитанное как `f64`.
    Number(f64),
}

impl<'a> From<&'a str> for AmountCell<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for AmountCell<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AmountCell<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Нормализует денежную строку: `.` считается разделителем тысяч, `,` десятичным.
/// Символ валюты, пробелы и прочий мусор отбрасываются.
fn normalize_amount(input: &str) -> String {
    input
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(*ch, ',' | '-'))
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect()
}

/// Нормализует последовательность символов, схлопывая группы пробельных.
pub fn normalize_whitespace(input: &str) -> String {
    let mut output = String::new();
    let mut prev_space = false;
    for ch in input.chars() {
        let is_space = ch.is_whitespace();
        if is_space {
            if !prev_space {
                output.push(' ');
            }
        } else {
            output.push(ch);
        }
        prev_space = is_space;
    }
    output.trim().to_string()
}

/// Разбирает денежное значение. Никогда не возвращает ошибку:
/// пустая или нечисловая ячейка даёт ноль.
///
/// # Пример
///
/// ```
/// # use fiscal_rollover::parse_amount;
/// # use std::str::FromStr;
/// # use rust_decimal::Decimal;
/// assert_eq!(parse_amount("R$ 1.234,56"), Decimal::from_str("1234.56").unwrap());
/// assert_eq!(parse_amount("abc"), Decimal::ZERO);
/// ```
pub fn parse_amount<'a>(cell: impl Into<AmountCell<'a>>) -> Money {
    match cell.into() {
        AmountCell::Number(value) => Decimal::from_f64(value).unwrap_or_else(|| {
            tracing::debug!(value, "non-finite amount coerced to zero");
            Decimal::ZERO
        }),
        AmountCell::Text(value) => {
            let normalized = normalize_amount(value);
            if normalized.is_empty() {
                if !value.trim().is_empty() {
                    tracing::debug!(value, "non-numeric amount coerced to zero");
                }
                return Decimal::ZERO;
            }
            Decimal::from_str(&normalized).unwrap_or_else(|_| {
                tracing::debug!(value, "malformed amount coerced to zero");
                Decimal::ZERO
            })
        }
    }
}

/// Разбирает дату выставления: `dd/mm/yyyy`, `yyyy-mm-dd` или `dd.mm.yyyy`.
/// Время после даты (выгрузки из таблиц) отбрасывается.
pub fn parse_date(value: &str) -> Result<NaiveDate, ReportError> {
    let date_part = value.split_whitespace().next().unwrap_or_default();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| ReportError::Date {
            value: value.trim().to_string(),
        })
}

/// Название месяца по номеру (1..=12).
#[inline]
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES_PT.get(idx).copied()
}

/// Номер месяца по названию («Março», «marco») или по числу («3»).
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim();
    if let Ok(month) = name.parse::<u32>() {
        return (1..=12).contains(&month).then_some(month);
    }
    let folded = fold_accents(&name.to_lowercase());
    MONTH_NAMES_PT
        .iter()
        .position(|candidate| fold_accents(&candidate.to_lowercase()) == folded)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

fn fold_accents(input: &str) -> String {
    input
        .chars()
        .map(|ch| match ch {
            'ç' => 'c',
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

/// Форматирует сумму по-бразильски: `R$ 12.345,67`.
pub fn format_brl(value: Money) -> String {
    let rounded = value.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{frac_part}")
}
