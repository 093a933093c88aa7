use sales_contracts::dashboards::d100_sales_charts::{
    ChartDataset, ChartPayload, ChartType, ChartValue, ColorSpec, DatasetStyle,
};
use sales_contracts::domain::a001_monthly_sales::{SalesFilter, SalesRecord};
use sales_contracts::shared::months::period_label;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

use super::aggregator::{self, ProductMetric};
use crate::domain::a001_monthly_sales::repository::{self, RecordOrder};
use crate::shared::error::SalesResult;

const REVENUE_LABEL: &str = "Выручка (руб.)";
const QUANTITY_LABEL: &str = "Количество проданных единиц";

const LINE_BORDER: &str = "rgb(75, 192, 192)";
const LINE_BACKGROUND: &str = "rgba(75, 192, 192, 0.2)";
const LINE_TENSION: f64 = 0.1;

/// Палитра гистограммы: (заливка, граница)
const BAR_PALETTE: [(&str, &str); 5] = [
    ("rgba(255, 99, 132, 0.7)", "rgba(255, 99, 132, 1)"),
    ("rgba(54, 162, 235, 0.7)", "rgba(54, 162, 235, 1)"),
    ("rgba(255, 206, 86, 0.7)", "rgba(255, 206, 86, 1)"),
    ("rgba(75, 192, 192, 0.7)", "rgba(75, 192, 192, 1)"),
    ("rgba(153, 102, 255, 0.7)", "rgba(153, 102, 255, 1)"),
];

const PIE_PALETTE: [&str; 6] = [
    "rgba(255, 99, 132, 0.8)",
    "rgba(54, 162, 235, 0.8)",
    "rgba(255, 206, 86, 0.8)",
    "rgba(75, 192, 192, 0.8)",
    "rgba(153, 102, 255, 0.8)",
    "rgba(255, 159, 64, 0.8)",
];

/// Данные диаграммы по записям, выбранным фильтром
pub async fn get_chart_data(
    db: &DatabaseConnection,
    chart_type: ChartType,
    filter: &SalesFilter,
) -> SalesResult<ChartPayload> {
    let records = repository::find(db, filter, RecordOrder::Chronological).await?;
    tracing::debug!(
        "Building {} chart from {} records ({})",
        chart_type,
        records.len(),
        if filter.is_empty() { "unfiltered" } else { "filtered" }
    );
    Ok(build_chart(chart_type, filter, &records))
}

/// Построить диаграмму по уже отфильтрованным записям
pub fn build_chart(
    chart_type: ChartType,
    filter: &SalesFilter,
    records: &[SalesRecord],
) -> ChartPayload {
    match chart_type {
        ChartType::Line => revenue_line(filter.year, records),
        ChartType::Bar => quantity_bar(records),
        ChartType::Pie => revenue_pie(records),
    }
}

fn revenue_line(year: Option<i32>, records: &[SalesRecord]) -> ChartPayload {
    let monthly = aggregator::revenue_by_month(records);
    let by_period: HashMap<(i32, u32), _> = monthly
        .iter()
        .map(|m| ((m.year, m.month), m.revenue))
        .collect();

    let periods: Vec<(i32, u32)> = match year {
        Some(year) => (1..=12).map(|month| (year, month)).collect(),
        None => match (monthly.first(), monthly.last()) {
            (Some(first), Some(last)) => {
                month_range((first.year, first.month), (last.year, last.month))
            }
            _ => Vec::new(),
        },
    };

    let labels: Vec<String> = periods
        .iter()
        .map(|&(year, month)| period_label(year, month))
        .collect();
    let data: Vec<ChartValue> = periods
        .iter()
        .map(|period| ChartValue::Amount(by_period.get(period).copied().unwrap_or_default()))
        .collect();

    ChartPayload {
        labels,
        datasets: vec![ChartDataset {
            label: REVENUE_LABEL.to_string(),
            data,
            style: DatasetStyle {
                border_color: Some(ColorSpec::Single(LINE_BORDER.to_string())),
                background_color: Some(ColorSpec::Single(LINE_BACKGROUND.to_string())),
                tension: Some(LINE_TENSION),
                ..DatasetStyle::default()
            },
        }],
    }
}

fn quantity_bar(records: &[SalesRecord]) -> ChartPayload {
    let totals = aggregator::totals_by_product(records, ProductMetric::Quantity);
    let fills = cycle_colors(totals.len(), BAR_PALETTE.iter().map(|(fill, _)| *fill));
    let borders = cycle_colors(totals.len(), BAR_PALETTE.iter().map(|(_, border)| *border));

    let (labels, data): (Vec<String>, Vec<ChartValue>) = totals
        .into_iter()
        .map(|t| (t.product_name, ChartValue::Count(t.quantity)))
        .unzip();

    ChartPayload {
        labels,
        datasets: vec![ChartDataset {
            label: QUANTITY_LABEL.to_string(),
            data,
            style: DatasetStyle {
                background_color: Some(ColorSpec::PerPoint(fills)),
                border_color: Some(ColorSpec::PerPoint(borders)),
                border_width: Some(1),
                ..DatasetStyle::default()
            },
        }],
    }
}

fn revenue_pie(records: &[SalesRecord]) -> ChartPayload {
    let totals = aggregator::totals_by_product(records, ProductMetric::Revenue);
    let fills = cycle_colors(totals.len(), PIE_PALETTE.iter().copied());

    let (labels, data): (Vec<String>, Vec<ChartValue>) = totals
        .into_iter()
        .map(|t| (t.product_name, ChartValue::Amount(t.revenue)))
        .unzip();

    ChartPayload {
        labels,
        datasets: vec![ChartDataset {
            label: REVENUE_LABEL.to_string(),
            data,
            style: DatasetStyle {
                background_color: Some(ColorSpec::PerPoint(fills)),
                border_width: Some(2),
                ..DatasetStyle::default()
            },
        }],
    }
}

/// Цвета палитры по кругу, по одному на позицию
fn cycle_colors<'a, I>(count: usize, palette: I) -> Vec<String>
where
    I: Iterator<Item = &'a str> + Clone,
{
    palette.cycle().take(count).map(str::to_string).collect()
}

/// Все месяцы от `from` до `to` включительно
///
/// Перебор идёт по сквозному номеру месяца в `i64`, поэтому крайние годы
/// `i32` не переполняют счётчик.
fn month_range(from: (i32, u32), to: (i32, u32)) -> Vec<(i32, u32)> {
    let index = |(year, month): (i32, u32)| i64::from(year) * 12 + i64::from(month) - 1;
    (index(from)..=index(to))
        .filter_map(|i| {
            let year = i32::try_from(i.div_euclid(12)).ok()?;
            let month = u32::try_from(i.rem_euclid(12)).ok()? + 1;
            Some((year, month))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::setup_test_db;
    use rust_decimal::Decimal;
    use sales_contracts::domain::a001_monthly_sales::{MonthlySalesDto, SalesRecordId};
    use serde_json::json;

    fn record(year: i32, month: u32, product: &str, quantity: i64, revenue: i64) -> SalesRecord {
        SalesRecord {
            id: SalesRecordId(0),
            year,
            month,
            product_name: product.to_string(),
            quantity,
            revenue: Decimal::new(revenue * 100, 2),
        }
    }

    fn sample() -> Vec<SalesRecord> {
        vec![
            record(2024, 1, "A", 10, 500_000),
            record(2024, 1, "B", 20, 600_000),
            record(2024, 2, "A", 15, 750_000),
        ]
    }

    fn counts(payload: &ChartPayload) -> Vec<i64> {
        payload.datasets[0]
            .data
            .iter()
            .map(|v| match v {
                ChartValue::Count(n) => *n,
                ChartValue::Amount(_) => panic!("unexpected amount"),
            })
            .collect()
    }

    fn amounts(payload: &ChartPayload) -> Vec<Decimal> {
        payload.datasets[0]
            .data
            .iter()
            .map(|v| match v {
                ChartValue::Amount(d) => *d,
                ChartValue::Count(_) => panic!("unexpected count"),
            })
            .collect()
    }

    #[test]
    fn test_bar_orders_by_quantity() {
        let payload = build_chart(ChartType::Bar, &SalesFilter::default(), &sample());
        assert_eq!(payload.labels, vec!["A", "B"]);
        assert_eq!(counts(&payload), vec![25, 20]);
        // сумма столбцов равна сумме количества
        assert_eq!(counts(&payload).iter().sum::<i64>(), 45);
    }

    #[test]
    fn test_bar_palette_cycles() {
        let records: Vec<SalesRecord> = (0..7)
            .map(|i| record(2024, 1, &format!("P{i}"), 100 - i, 1))
            .collect();
        let payload = build_chart(ChartType::Bar, &SalesFilter::default(), &records);
        let Some(ColorSpec::PerPoint(fills)) = &payload.datasets[0].style.background_color else {
            panic!("expected per-bar colors");
        };
        assert_eq!(fills.len(), 7);
        assert_eq!(fills[5], fills[0]);
        assert_eq!(fills[6], "rgba(54, 162, 235, 0.7)");
    }

    #[test]
    fn test_pie_orders_by_revenue() {
        let payload = build_chart(ChartType::Pie, &SalesFilter::default(), &sample());
        assert_eq!(payload.labels, vec!["A", "B"]);
        assert_eq!(
            amounts(&payload),
            vec![Decimal::new(1_250_000, 0), Decimal::new(600_000, 0)]
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["datasets"][0]["data"], json!([1250000.0, 600000.0]));
        assert_eq!(json["datasets"][0]["borderWidth"], 2);
        assert!(json["datasets"][0].get("borderColor").is_none());
    }

    #[test]
    fn test_line_with_year_has_twelve_points() {
        let filter = SalesFilter::for_year(2024);
        let payload = build_chart(ChartType::Line, &filter, &sample());
        assert_eq!(payload.labels.len(), 12);
        assert_eq!(payload.labels[0], "Январь 2024");
        assert_eq!(payload.labels[11], "Декабрь 2024");
        let values = amounts(&payload);
        assert_eq!(values.len(), 12);
        assert_eq!(values[0], Decimal::new(1_100_000, 0));
        assert_eq!(values[1], Decimal::new(750_000, 0));
        assert!(values[2..].iter().all(|v| v.is_zero()));

        let empty = build_chart(ChartType::Line, &SalesFilter::for_year(1999), &[]);
        assert_eq!(empty.labels.len(), 12);
    }

    #[test]
    fn test_line_without_year_fills_gaps() {
        let records = vec![record(2024, 3, "A", 1, 100), record(2024, 6, "A", 1, 200)];
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &records);
        assert_eq!(
            payload.labels,
            vec!["Март 2024", "Апрель 2024", "Май 2024", "Июнь 2024"]
        );
        let values = amounts(&payload);
        assert_eq!(values[0], Decimal::new(100, 0));
        assert!(values[1].is_zero() && values[2].is_zero());
        assert_eq!(values[3], Decimal::new(200, 0));
    }

    #[test]
    fn test_line_crosses_year_boundary() {
        let records = vec![record(2023, 11, "A", 1, 1), record(2024, 2, "A", 1, 1)];
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &records);
        assert_eq!(
            payload.labels,
            vec!["Ноябрь 2023", "Декабрь 2023", "Январь 2024", "Февраль 2024"]
        );
    }

    #[test]
    fn test_line_at_extreme_years() {
        let last = vec![record(i32::MAX, 12, "A", 1, 7)];
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &last);
        assert_eq!(payload.labels, vec!["Декабрь 2147483647"]);
        assert_eq!(amounts(&payload), vec![Decimal::new(7, 0)]);

        let records = vec![record(i32::MAX, 11, "A", 1, 1), record(i32::MAX, 12, "A", 1, 2)];
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &records);
        assert_eq!(payload.labels.len(), 2);

        let records = vec![record(i32::MIN, 1, "A", 1, 1), record(i32::MIN, 2, "A", 1, 2)];
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &records);
        assert_eq!(payload.labels, vec!["Январь -2147483648", "Февраль -2147483648"]);

        let payload = build_chart(ChartType::Line, &SalesFilter::for_year(i32::MAX), &last);
        assert_eq!(payload.labels.len(), 12);
        assert_eq!(amounts(&payload)[11], Decimal::new(7, 0));
    }

    #[test]
    fn test_month_range_spans_years() {
        assert_eq!(month_range((2024, 5), (2024, 5)), vec![(2024, 5)]);
        assert_eq!(month_range((-1, 12), (0, 1)), vec![(-1, 12), (0, 1)]);
        assert_eq!(month_range((2000, 1), (2009, 12)).len(), 120);
        assert!(month_range((2024, 2), (2024, 1)).is_empty());
    }

    #[test]
    fn test_bar_with_huge_quantities() {
        let records = vec![
            record(2024, 1, "A", i64::MAX, 1),
            record(2024, 2, "A", i64::MAX, 1),
            record(2024, 1, "B", i64::from(i32::MAX), 1),
            record(2024, 2, "B", i64::from(i32::MAX), 1),
        ];
        let payload = build_chart(ChartType::Bar, &SalesFilter::default(), &records);
        assert_eq!(payload.labels, vec!["A", "B"]);
        assert_eq!(counts(&payload), vec![i64::MAX, 2 * i64::from(i32::MAX)]);
    }

    #[test]
    fn test_empty_line_without_year() {
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &[]);
        assert!(payload.labels.is_empty());
        assert_eq!(payload.datasets.len(), 1);
        assert!(payload.datasets[0].data.is_empty());
    }

    #[test]
    fn test_line_styling() {
        let payload = build_chart(ChartType::Line, &SalesFilter::default(), &sample());
        let json = serde_json::to_value(&payload).unwrap();
        let dataset = &json["datasets"][0];
        assert_eq!(dataset["label"], "Выручка (руб.)");
        assert_eq!(dataset["borderColor"], "rgb(75, 192, 192)");
        assert_eq!(dataset["backgroundColor"], "rgba(75, 192, 192, 0.2)");
        assert_eq!(dataset["tension"], 0.1);
    }

    #[tokio::test]
    async fn test_product_filter_applies_to_every_chart() {
        let db = setup_test_db().await.unwrap();
        for (month, product, quantity) in [(1, "Ноутбук", 10), (1, "Смартфон", 20), (2, "Ноутбук", 5)] {
            let dto = MonthlySalesDto {
                year: 2024,
                month,
                product_name: product.to_string(),
                quantity,
                revenue: Decimal::new(100_000, 0),
            };
            repository::insert(&db, &dto).await.unwrap();
        }

        let filter = SalesFilter::default().with_products(["Ноутбук"]);
        let bar = get_chart_data(&db, ChartType::Bar, &filter).await.unwrap();
        assert_eq!(bar.labels, vec!["Ноутбук"]);
        assert_eq!(counts(&bar), vec![15]);

        let pie = get_chart_data(&db, ChartType::Pie, &filter).await.unwrap();
        assert_eq!(pie.labels, vec!["Ноутбук"]);

        let line = get_chart_data(&db, ChartType::Line, &filter).await.unwrap();
        assert_eq!(line.labels, vec!["Январь 2024", "Февраль 2024"]);
        assert_eq!(
            amounts(&line),
            vec![Decimal::new(100_000, 0), Decimal::new(100_000, 0)]
        );
    }
}
