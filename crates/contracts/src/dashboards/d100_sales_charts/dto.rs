use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Тип диаграммы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Выручка по месяцам
    Line,
    /// Количество проданных единиц по товарам
    Bar,
    /// Доля выручки по товарам
    Pie,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
        }
    }
}

impl Default for ChartType {
    fn default() -> Self {
        ChartType::Line
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Нераспознанное значение параметра `type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChartType(pub String);

impl FromStr for ChartType {
    type Err = UnknownChartType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "pie" => Ok(ChartType::Pie),
            other => Err(UnknownChartType(other.to_string())),
        }
    }
}

/// Значение точки диаграммы
///
/// Количество сериализуется целым числом, суммы выручки числом с плавающей точкой.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartValue {
    Count(i64),
    Amount(#[serde(with = "rust_decimal::serde::float")] Decimal),
}

/// Цвет набора данных: один на весь набор или по цвету на точку
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Single(String),
    PerPoint(Vec<String>),
}

/// Оформление набора данных
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

/// Набор данных диаграммы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<ChartValue>,
    #[serde(flatten)]
    pub style: DatasetStyle,
}

/// Ответ API диаграмм: подписи и наборы данных, позиционно выровненные
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// Тело ответа об ошибке
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
