//! Ошибки загрузки реестра и помесячного расчёта налогов.

/// Ошибка загрузки реестра, настройки или расчёта отчёта.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// Ошибка ввода-вывода при чтении или записи файла.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Ошибка чтения или записи CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Ошибка разбора даты.
    #[error("Invalid date '{value}'")]
    Date {
        /// Некорректная дата.
        value: String,
    },
    /// Номер месяца вне диапазона 1..=12 или неизвестное название месяца.
    #[error("Invalid month '{value}'")]
    InvalidMonth {
        /// Исходное значение.
        value: String,
    },
    /// Неизвестное имя корзины симулятора.
    #[error("Unknown simulation bucket '{0}'")]
    UnknownBucket(String),
    /// Отрицательная сумма во входных данных симулятора.
    #[error("Negative amount {value} for bucket '{bucket}'")]
    NegativeInput {
        /// Имя корзины.
        bucket: &'static str,
        /// Переданная сумма.
        value: String,
    },
    /// Не удалось собрать регулярное выражение для категорий.
    #[error("Regex error: {0}")]
    Regex(String),
    /// Переполнение при денежных вычислениях.
    #[error("Arithmetic overflow in {context}")]
    Overflow {
        /// Где произошло переполнение.
        context: &'static str,
    },
}
