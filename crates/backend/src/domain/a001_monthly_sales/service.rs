use sales_contracts::domain::a001_monthly_sales::{
    FilterOptions, MonthlySalesDto, SalesFilter, SalesRecord, SalesRecordId, SalesRecordRow,
    SalesTableResponse,
};
use sales_contracts::shared::months::month_choices;
use sea_orm::DatabaseConnection;

use super::repository::{self, RecordOrder};
use crate::shared::error::{SalesError, SalesResult};

/// Создание новой записи о продажах
pub async fn create(db: &DatabaseConnection, dto: MonthlySalesDto) -> SalesResult<SalesRecord> {
    // Валидация
    let valid = dto.validate().map_err(SalesError::Validation)?;

    let record = repository::insert(db, &valid).await?;
    tracing::info!("Created sales record {} ({})", record.id, record);
    Ok(record)
}

/// Полное обновление существующей записи
pub async fn update(
    db: &DatabaseConnection,
    id: SalesRecordId,
    dto: MonthlySalesDto,
) -> SalesResult<SalesRecord> {
    let valid = dto.validate().map_err(SalesError::Validation)?;

    let record = repository::update(db, id, &valid).await?;
    tracing::info!("Updated sales record {} ({})", record.id, record);
    Ok(record)
}

pub async fn delete(db: &DatabaseConnection, id: SalesRecordId) -> SalesResult<()> {
    repository::delete(db, id).await?;
    tracing::info!("Deleted sales record {}", id);
    Ok(())
}

pub async fn get_by_id(db: &DatabaseConnection, id: SalesRecordId) -> SalesResult<SalesRecord> {
    repository::get_by_id(db, id)
        .await?
        .ok_or(SalesError::NotFound(id))
}

/// Значения для выпадающих списков фильтров
pub async fn filter_options(db: &DatabaseConnection) -> SalesResult<FilterOptions> {
    Ok(FilterOptions {
        years: repository::distinct_years(db).await?,
        products: repository::distinct_products(db).await?,
        months: month_choices(),
    })
}

/// Страница таблицы продаж, новые периоды сверху
pub async fn list_table(
    db: &DatabaseConnection,
    filter: SalesFilter,
    requested_page: Option<&str>,
    page_size: u64,
) -> SalesResult<SalesTableResponse> {
    let page = repository::find_page(
        db,
        &filter,
        RecordOrder::NewestFirst,
        requested_page,
        page_size,
    )
    .await?;
    let options = filter_options(db).await?;

    Ok(SalesTableResponse {
        sales: page.map(SalesRecordRow::from),
        filter,
        options,
    })
}
