//! Отбор накладных по направлению и категории для налоговой базы.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::ReportError;
use crate::types::{Direction, LedgerRow};

/// Категории входящих накладных, дающие право на кредит по умолчанию.
pub const DEFAULT_ELIGIBLE_CATEGORIES: [&str; 2] = ["Mercadoria para Revenda", "Frete"];

static DEFAULT_CATEGORIES: LazyLock<EligibleCategories> = LazyLock::new(|| {
    EligibleCategories::new(DEFAULT_ELIGIBLE_CATEGORIES).expect("valid default categories")
});

/// Правило, решающее, даёт ли классификация входящей накладной право на кредит.
pub trait CategoryPredicate {
    /// `true`, если накладная с такой классификацией входит в базу кредита.
    fn is_eligible(&self, classification: &str) -> bool;
}

/// Список разрешённых категорий. Совпадение ищется как подстрока без учёта регистра.
#[derive(Debug, Clone)]
pub struct EligibleCategories {
    categories: Vec<String>,
    pattern: Option<Regex>,
}

impl EligibleCategories {
    /// Собирает правило из списка категорий. Пустой список не пропускает ничего.
    pub fn new<I, S>(categories: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories
            .into_iter()
            .map(Into::into)
            .filter(|c| !c.trim().is_empty())
            .collect();
        let pattern = if categories.is_empty() {
            None
        } else {
            let alternation = categories
                .iter()
                .map(|c| regex::escape(c.trim()))
                .collect::<Vec<_>>()
                .join("|");
            let re = RegexBuilder::new(&format!("({alternation})"))
                .case_insensitive(true)
                .build()
                .map_err(|e| ReportError::Regex(e.to_string()))?;
            Some(re)
        };
        Ok(Self {
            categories,
            pattern,
        })
    }

    /// Категории, из которых собрано правило.
    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl Default for EligibleCategories {
    fn default() -> Self {
        DEFAULT_CATEGORIES.clone()
    }
}

impl CategoryPredicate for EligibleCategories {
    fn is_eligible(&self, classification: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|re| re.is_match(classification))
    }
}

/// Отбирает накладные одного направления.
///
/// Для входящих накладных, если задано правило категорий, в базу попадают
/// только подходящие классификации. Исходящие по категориям не фильтруются.
/// Строки без даты исключаются всегда.
pub fn select<'a, P>(
    rows: &'a [LedgerRow],
    direction: Direction,
    categories: Option<&P>,
) -> Vec<&'a LedgerRow>
where
    P: CategoryPredicate + ?Sized,
{
    rows.iter()
        .filter(|row| row.direction == direction && row.emission_date.is_some())
        .filter(|row| match (direction, categories) {
            (Direction::Inbound, Some(rule)) => rule.is_eligible(&row.classification),
            _ => true,
        })
        .collect()
}

/// Строки, формирующие налоговую базу: подходящие входящие и все исходящие.
pub fn select_tax_basis<'a, P>(rows: &'a [LedgerRow], categories: &P) -> Vec<&'a LedgerRow>
where
    P: CategoryPredicate + ?Sized,
{
    let mut selected = select(rows, Direction::Inbound, Some(categories));
    selected.extend(select::<P>(rows, Direction::Outbound, None));
    selected
}

impl<F> CategoryPredicate for F
where
    F: Fn(&str) -> bool,
{
    fn is_eligible(&self, classification: &str) -> bool {
        self(classification)
    }
}
