use rust_decimal::Decimal;
use sales_contracts::domain::a001_monthly_sales::SalesRecord;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Выручка за один календарный месяц
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
}

/// Итоги по одному товару
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTotal {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

/// Показатель для ранжирования товаров
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductMetric {
    Quantity,
    Revenue,
}

/// Сумма выручки по месяцам, по возрастанию (год, месяц)
///
/// Месяцы без записей в результат не попадают.
pub fn revenue_by_month(records: &[SalesRecord]) -> Vec<MonthlyRevenue> {
    let mut sums: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for record in records {
        let sum = sums.entry(record.period()).or_default();
        *sum = sum.saturating_add(record.revenue);
    }
    sums.into_iter()
        .map(|((year, month), revenue)| MonthlyRevenue {
            year,
            month,
            revenue,
        })
        .collect()
}

/// Итоги по товарам, по убыванию выбранного показателя
///
/// При равенстве показателя товары идут по алфавиту.
/// Суммы насыщаются на границе типа, а не переполняются.
pub fn totals_by_product(records: &[SalesRecord], metric: ProductMetric) -> Vec<ProductTotal> {
    let mut totals: HashMap<&str, (i64, Decimal)> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.product_name.as_str()).or_default();
        entry.0 = entry.0.saturating_add(record.quantity);
        entry.1 = entry.1.saturating_add(record.revenue);
    }

    let mut result: Vec<ProductTotal> = totals
        .into_iter()
        .map(|(name, (quantity, revenue))| ProductTotal {
            product_name: name.to_string(),
            quantity,
            revenue,
        })
        .collect();

    result.sort_by(|a, b| {
        let by_metric = match metric {
            ProductMetric::Quantity => b.quantity.cmp(&a.quantity),
            ProductMetric::Revenue => b.revenue.cmp(&a.revenue),
        };
        match by_metric {
            Ordering::Equal => a.product_name.cmp(&b.product_name),
            other => other,
        }
    });
    result
}
