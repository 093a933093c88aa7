use sales_contracts::domain::a001_monthly_sales::SalesFilter;

use crate::shared::error::{SalesError, SalesResult};
use crate::shared::query::QueryParams;

/// Как поступать с некорректными значениями параметров
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Диаграммы: некорректный год игнорируется, месяц не читается
    Lenient,
    /// Таблицы: некорректный год или месяц отклоняется
    Strict,
}

/// Параметры фильтра в том виде, в каком они пришли в запросе
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilterParams {
    pub year: Option<String>,
    pub month: Option<String>,
    pub products: Vec<String>,
}

impl RawFilterParams {
    pub fn from_query(params: &QueryParams) -> Self {
        Self {
            year: params.first("year").map(str::to_string),
            month: params.first("month").map(str::to_string),
            products: params.all(&["products[]", "products"]),
        }
    }
}

/// Построить фильтр из параметров запроса
pub fn resolve(raw: &RawFilterParams, policy: FilterPolicy) -> SalesResult<SalesFilter> {
    let year = match non_blank(raw.year.as_deref()) {
        None => None,
        Some(value) => match value.parse::<i32>() {
            Ok(year) => Some(year),
            Err(_) if policy == FilterPolicy::Lenient => {
                tracing::debug!("Ignoring malformed year filter {:?}", value);
                None
            }
            Err(_) => return Err(invalid("year", value)),
        },
    };

    let month = match (policy, non_blank(raw.month.as_deref())) {
        (FilterPolicy::Lenient, _) | (_, None) => None,
        (FilterPolicy::Strict, Some(value)) => match value.parse::<u32>() {
            Ok(month) if (1..=12).contains(&month) => Some(month),
            _ => return Err(invalid("month", value)),
        },
    };

    let products = raw.products.iter().map(|p| p.trim()).filter(|p| !p.is_empty());

    Ok(SalesFilter {
        year,
        month,
        ..SalesFilter::default()
    }
    .with_products(products))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(param: &'static str, value: &str) -> SalesError {
    SalesError::InvalidFilter {
        param,
        value: value.to_string(),
    }
}
