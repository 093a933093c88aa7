use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::months::{month_name, period_label};

/// Максимальная длина названия товара
pub const PRODUCT_NAME_MAX_LEN: usize = 200;

/// Верхняя граница количества: 32-битное целое, как в исходной схеме
pub const QUANTITY_MAX: i64 = i32::MAX as i64;

/// Количество знаков после запятой в выручке
pub const REVENUE_SCALE: u32 = 2;

/// Верхняя граница выручки: 12 значащих цифр, 2 из них дробные
pub const REVENUE_MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

// ============================================================================
// ID Type
// ============================================================================

/// Идентификатор записи о продажах
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesRecordId(pub i64);

impl SalesRecordId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SalesRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Record
// ============================================================================

/// Продажи одного товара за один месяц
///
/// Тройка (year, month, product_name) уникальна в хранилище.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: SalesRecordId,
    pub year: i32,
    pub month: u32,
    pub product_name: String,
    /// Количество проданных единиц
    pub quantity: i64,
    /// Выручка в рублях, 2 знака после запятой
    pub revenue: Decimal,
}

impl SalesRecord {
    /// Ключ хронологической сортировки
    pub fn period(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

impl fmt::Display for SalesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            period_label(self.year, self.month),
            self.product_name
        )
    }
}

/// Строка таблицы: запись плюс название месяца для отображения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecordRow {
    #[serde(flatten)]
    pub record: SalesRecord,
    pub month_name: String,
}

impl From<SalesRecord> for SalesRecordRow {
    fn from(record: SalesRecord) -> Self {
        let month_name = month_name(record.month).unwrap_or_default().to_string();
        Self { record, month_name }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Ошибка конкретного поля формы
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// DTO для создания/обновления записи о продажах
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySalesDto {
    pub year: i32,
    pub month: u32,
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

impl MonthlySalesDto {
    /// Валидация и нормализация данных формы
    ///
    /// Название товара обрезается по краям. Возвращаются все ошибки сразу.
    pub fn validate(&self) -> Result<MonthlySalesDto, Vec<FieldError>> {
        let mut errors = Vec::new();
        let product_name = self.product_name.trim().to_string();

        if !(1..=12).contains(&self.month) {
            errors.push(FieldError::new(
                "month",
                "Месяц должен быть в диапазоне от 1 до 12",
            ));
        }

        if product_name.is_empty() {
            errors.push(FieldError::new(
                "product_name",
                "Название товара не может быть пустым",
            ));
        } else if product_name.chars().count() > PRODUCT_NAME_MAX_LEN {
            errors.push(FieldError::new(
                "product_name",
                format!(
                    "Название товара не может быть длиннее {} символов",
                    PRODUCT_NAME_MAX_LEN
                ),
            ));
        }

        if self.quantity < 0 {
            errors.push(FieldError::new(
                "quantity",
                "Количество не может быть отрицательным",
            ));
        } else if self.quantity > QUANTITY_MAX {
            errors.push(FieldError::new(
                "quantity",
                format!("Количество не может превышать {}", QUANTITY_MAX),
            ));
        }

        if self.revenue < Decimal::ZERO {
            errors.push(FieldError::new("revenue", "Выручка не может быть отрицательной"));
        } else if self.revenue.normalize().scale() > REVENUE_SCALE {
            errors.push(FieldError::new(
                "revenue",
                "Выручка может содержать не более 2 знаков после запятой",
            ));
        } else if self.revenue > REVENUE_MAX {
            errors.push(FieldError::new(
                "revenue",
                "Выручка не может содержать более 12 цифр",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut revenue = self.revenue;
        revenue.rescale(REVENUE_SCALE);

        Ok(MonthlySalesDto {
            year: self.year,
            month: self.month,
            product_name,
            quantity: self.quantity,
            revenue,
        })
    }
}
