use rust_decimal::Decimal;
use sales_contracts::domain::a001_monthly_sales::aggregate::REVENUE_SCALE;
use sales_contracts::domain::a001_monthly_sales::{
    FieldError, MonthlySalesDto, SalesFilter, SalesRecord, SalesRecordId,
};
use sales_contracts::shared::pagination::{PageWindow, Paginated};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveValue::NotSet, ConnectionTrait, IntoActiveModel, PaginatorTrait, QueryOrder,
    QuerySelect, Select, Set, SqlErr, TransactionTrait,
};

use crate::shared::error::{SalesError, SalesResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "monthly_sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub year: i32,
    pub month: i32,
    pub product_name: String,
    pub quantity: i64,
    /// Выручка в копейках
    pub revenue_kopecks: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SalesRecord {
    fn from(m: Model) -> Self {
        SalesRecord {
            id: SalesRecordId(m.id),
            year: m.year,
            month: u32::try_from(m.month).unwrap_or_default(),
            product_name: m.product_name,
            quantity: m.quantity,
            revenue: Decimal::new(m.revenue_kopecks, REVENUE_SCALE),
        }
    }
}

/// Порядок выдачи записей
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    /// По возрастанию (год, месяц), затем по товару
    Chronological,
    /// Сначала новые периоды, внутри периода по товару
    NewestFirst,
}

fn to_kopecks(revenue: Decimal) -> SalesResult<i64> {
    let mut scaled = revenue;
    scaled.rescale(REVENUE_SCALE);
    i64::try_from(scaled.mantissa()).map_err(|_| {
        SalesError::Validation(vec![FieldError::new(
            "revenue",
            "Выручка вне допустимого диапазона",
        )])
    })
}

fn duplicate_of(dto: &MonthlySalesDto) -> SalesError {
    SalesError::UniqueConstraintViolation {
        year: dto.year,
        month: dto.month,
        product_name: dto.product_name.clone(),
    }
}

/// Ошибка уникального индекса хранилища превращается в ту же ошибку,
/// что и проверка на уровне приложения
fn map_write_error(err: DbErr, dto: &MonthlySalesDto) -> SalesError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_of(dto),
        _ => SalesError::Database(err),
    }
}

fn filtered(filter: &SalesFilter) -> Select<Entity> {
    let mut query = Entity::find();
    if let Some(year) = filter.year {
        query = query.filter(Column::Year.eq(year));
    }
    if let Some(month) = filter.month {
        query = query.filter(Column::Month.eq(month));
    }
    if !filter.products.is_empty() {
        query = query.filter(Column::ProductName.is_in(filter.products.iter().cloned()));
    }
    query
}

fn ordered(query: Select<Entity>, order: RecordOrder) -> Select<Entity> {
    match order {
        RecordOrder::Chronological => query
            .order_by_asc(Column::Year)
            .order_by_asc(Column::Month)
            .order_by_asc(Column::ProductName),
        RecordOrder::NewestFirst => query
            .order_by_desc(Column::Year)
            .order_by_desc(Column::Month)
            .order_by_asc(Column::ProductName),
    }
}

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    dto: &MonthlySalesDto,
    exclude: Option<i64>,
) -> SalesResult<()> {
    let mut query = Entity::find()
        .filter(Column::Year.eq(dto.year))
        .filter(Column::Month.eq(dto.month))
        .filter(Column::ProductName.eq(dto.product_name.as_str()));
    if let Some(id) = exclude {
        query = query.filter(Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(duplicate_of(dto));
    }
    Ok(())
}

/// Вставить проверенную запись
///
/// Проверка уникальности и вставка выполняются в одной транзакции.
pub async fn insert(db: &DatabaseConnection, dto: &MonthlySalesDto) -> SalesResult<SalesRecord> {
    let revenue_kopecks = to_kopecks(dto.revenue)?;
    let txn = db.begin().await?;
    ensure_unique(&txn, dto, None).await?;

    let active = ActiveModel {
        id: NotSet,
        year: Set(dto.year),
        month: Set(month_column(dto.month)),
        product_name: Set(dto.product_name.clone()),
        quantity: Set(dto.quantity),
        revenue_kopecks: Set(revenue_kopecks),
    };
    let model = active
        .insert(&txn)
        .await
        .map_err(|e| map_write_error(e, dto))?;
    txn.commit().await?;
    Ok(model.into())
}

/// Обновить запись целиком
pub async fn update(
    db: &DatabaseConnection,
    id: SalesRecordId,
    dto: &MonthlySalesDto,
) -> SalesResult<SalesRecord> {
    let revenue_kopecks = to_kopecks(dto.revenue)?;
    let txn = db.begin().await?;

    let existing = Entity::find_by_id(id.value())
        .one(&txn)
        .await?
        .ok_or(SalesError::NotFound(id))?;
    ensure_unique(&txn, dto, Some(id.value())).await?;

    let mut active = existing.into_active_model();
    active.year = Set(dto.year);
    active.month = Set(month_column(dto.month));
    active.product_name = Set(dto.product_name.clone());
    active.quantity = Set(dto.quantity);
    active.revenue_kopecks = Set(revenue_kopecks);

    let model = active
        .update(&txn)
        .await
        .map_err(|e| map_write_error(e, dto))?;
    txn.commit().await?;
    Ok(model.into())
}

/// Удалить запись безвозвратно
pub async fn delete(db: &DatabaseConnection, id: SalesRecordId) -> SalesResult<()> {
    let result = Entity::delete_by_id(id.value()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(SalesError::NotFound(id));
    }
    Ok(())
}

pub async fn get_by_id(db: &DatabaseConnection, id: SalesRecordId) -> SalesResult<Option<SalesRecord>> {
    let result = Entity::find_by_id(id.value()).one(db).await?;
    Ok(result.map(Into::into))
}

/// Все записи, удовлетворяющие фильтру
pub async fn find(
    db: &DatabaseConnection,
    filter: &SalesFilter,
    order: RecordOrder,
) -> SalesResult<Vec<SalesRecord>> {
    let items = ordered(filtered(filter), order)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Одна страница отфильтрованной и упорядоченной выборки
pub async fn find_page(
    db: &DatabaseConnection,
    filter: &SalesFilter,
    order: RecordOrder,
    requested_page: Option<&str>,
    page_size: u64,
) -> SalesResult<Paginated<SalesRecord>> {
    let total = filtered(filter).count(db).await?;
    let window = PageWindow::resolve(requested_page, total, page_size);

    let items = ordered(filtered(filter), order)
        .offset(window.offset())
        .limit(window.limit())
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Paginated::new(items, total, window))
}

/// Годы, за которые есть данные, по убыванию
pub async fn distinct_years(db: &DatabaseConnection) -> SalesResult<Vec<i32>> {
    let years = Entity::find()
        .select_only()
        .column(Column::Year)
        .distinct()
        .order_by_desc(Column::Year)
        .into_tuple::<i32>()
        .all(db)
        .await?;
    Ok(years)
}

/// Названия товаров, по алфавиту
pub async fn distinct_products(db: &DatabaseConnection) -> SalesResult<Vec<String>> {
    let products = Entity::find()
        .select_only()
        .column(Column::ProductName)
        .distinct()
        .order_by_asc(Column::ProductName)
        .into_tuple::<String>()
        .all(db)
        .await?;
    Ok(products)
}

fn month_column(month: u32) -> i32 {
    i32::try_from(month).unwrap_or(i32::MAX)
}
