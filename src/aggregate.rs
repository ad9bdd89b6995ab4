//! Суммирование отобранных накладных по календарным месяцам.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::error::ReportError;
use crate::types::{Direction, LedgerRow, Money, MonthlyBasis};

/// Месячные базы за один год.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyBases {
    year: i32,
    months: BTreeMap<u32, MonthlyBasis>,
}

impl MonthlyBases {
    /// Год, за который собраны базы.
    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// База месяца; месяц без накладных даёт нулевую базу.
    #[inline]
    pub fn get(&self, month: u32) -> MonthlyBasis {
        self.months.get(&month).copied().unwrap_or_default()
    }

    /// Месяцы, в которых были накладные, по возрастанию.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &MonthlyBasis)> {
        self.months.iter().map(|(month, basis)| (*month, basis))
    }
}

fn add(acc: &mut Money, value: Money, context: &'static str) -> Result<(), ReportError> {
    *acc = acc
        .checked_add(value)
        .ok_or(ReportError::Overflow { context })?;
    Ok(())
}

/// Группирует уже отобранные накладные по месяцам указанного года
/// и суммирует чистую стоимость и налог по направлениям.
/// Накладные других годов и без даты пропускаются.
pub fn aggregate<'a, I>(rows: I, year: i32) -> Result<MonthlyBases, ReportError>
where
    I: IntoIterator<Item = &'a LedgerRow>,
{
    let mut months: BTreeMap<u32, MonthlyBasis> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.emission_date else {
            continue;
        };
        if date.year() != year {
            continue;
        }
        let entry = months.entry(date.month()).or_default();
        match row.direction {
            Direction::Inbound => {
                add(&mut entry.inbound_net_total, row.net_value, "inbound net total")?;
                add(&mut entry.inbound_tax_total, row.tax_value, "inbound tax total")?;
            }
            Direction::Outbound => {
                add(&mut entry.outbound_net_total, row.net_value, "outbound net total")?;
                add(&mut entry.outbound_tax_total, row.tax_value, "outbound tax total")?;
            }
        }
    }
    Ok(MonthlyBases { year, months })
}
