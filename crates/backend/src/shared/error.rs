use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sales_contracts::dashboards::d100_sales_charts::ErrorResponse;
use sales_contracts::domain::a001_monthly_sales::{FieldError, SalesRecordId};
use sales_contracts::shared::months::period_label;
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// Текст ошибки для нераспознанного типа диаграммы, часть контракта API
pub const INVALID_CHART_TYPE_MESSAGE: &str = "Invalid chart type";

/// Ошибки операций с данными о продажах
#[derive(Debug, Error)]
pub enum SalesError {
    #[error("Ошибка валидации данных")]
    Validation(Vec<FieldError>),

    #[error("{}", duplicate_message(.year, .month, .product_name))]
    UniqueConstraintViolation {
        year: i32,
        month: u32,
        product_name: String,
    },

    #[error("Запись {0} не найдена")]
    NotFound(SalesRecordId),

    #[error("Invalid chart type")]
    InvalidChartType(String),

    #[error("Некорректное значение параметра {param}: {value:?}")]
    InvalidFilter { param: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type SalesResult<T> = Result<T, SalesError>;

fn duplicate_message(year: &i32, month: &u32, product_name: &str) -> String {
    format!(
        "Запись за {} для товара «{}» уже существует",
        period_label(*year, *month),
        product_name
    )
}

impl SalesError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SalesError::Validation(_)
            | SalesError::UniqueConstraintViolation { .. }
            | SalesError::InvalidChartType(_)
            | SalesError::InvalidFilter { .. } => StatusCode::BAD_REQUEST,
            SalesError::NotFound(_) => StatusCode::NOT_FOUND,
            SalesError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Ошибки полей формы, к которым относится ошибка
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            SalesError::Validation(errors) => errors.clone(),
            SalesError::UniqueConstraintViolation { .. } => {
                vec![FieldError::new("__all__", self.to_string())]
            }
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for SalesError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            SalesError::Validation(_) | SalesError::UniqueConstraintViolation { .. } => json!({
                "error": self.to_string(),
                "fields": self.field_errors(),
            }),
            SalesError::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({ "error": "Internal server error" })
            }
            _ => json!(ErrorResponse {
                error: self.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
