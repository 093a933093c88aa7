use serde::{Deserialize, Serialize};

use super::aggregate::SalesRecordRow;
use crate::shared::months::MonthChoice;
use crate::shared::pagination::Paginated;

/// Фильтр выборки записей о продажах
///
/// Отсутствующее поле означает отсутствие ограничения по этому измерению.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Точное совпадение названия, с учётом регистра
    pub products: Vec<String>,
}

impl SalesFilter {
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.products.is_empty()
    }
}

/// Значения для фильтров: годы по убыванию, товары по алфавиту, месяцы
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub products: Vec<String>,
    pub months: Vec<MonthChoice>,
}

/// Ответ табличного представления
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTableResponse {
    #[serde(flatten)]
    pub sales: Paginated<SalesRecordRow>,
    /// Применённый фильтр
    pub filter: SalesFilter,
    #[serde(flatten)]
    pub options: FilterOptions,
}
