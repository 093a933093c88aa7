use serde::{Deserialize, Serialize};

/// Названия месяцев, индекс 0 соответствует январю
pub const MONTH_NAMES: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

/// Элемент списка месяцев для фильтров
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthChoice {
    pub value: u32,
    pub name: String,
}

/// Название месяца по номеру (1..=12)
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Подпись периода вида "Март 2024"
///
/// Для номера месяца вне диапазона подставляется сам номер.
pub fn period_label(year: i32, month: u32) -> String {
    match month_name(month) {
        Some(name) => format!("{} {}", name, year),
        None => format!("{} {}", month, year),
    }
}

pub fn month_choices() -> Vec<MonthChoice> {
    MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, value)| MonthChoice {
            value,
            name: (*name).to_string(),
        })
        .collect()
}
