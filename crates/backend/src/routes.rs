use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::shared::state::AppState;
use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    // Маршруты только для вошедших пользователей
    let protected = Router::new()
        .route(
            "/api/system/auth/me",
            get(system::handlers::auth::current_user),
        )
        .route(
            "/api/sales/manage",
            get(handlers::a001_monthly_sales::manage),
        )
        .route("/api/sales", post(handlers::a001_monthly_sales::create))
        .route(
            "/api/sales/:id",
            get(handlers::a001_monthly_sales::get_by_id)
                .put(handlers::a001_monthly_sales::update)
                .delete(handlers::a001_monthly_sales::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            system::auth::middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route(
            "/api/system/auth/login",
            post(system::handlers::auth::login),
        )
        .route(
            "/api/system/auth/refresh",
            post(system::handlers::auth::refresh),
        )
        .route(
            "/api/system/auth/logout",
            post(system::handlers::auth::logout),
        )
        // ========================================
        // D100 Sales charts
        // ========================================
        .route(
            "/api/chart-data",
            get(handlers::d100_sales_charts::chart_data),
        )
        // ========================================
        // A001 Monthly sales (public views)
        // ========================================
        .route(
            "/api/sales/filter-options",
            get(handlers::a001_monthly_sales::filter_options),
        )
        .route("/api/sales/table", get(handlers::a001_monthly_sales::table))
        .merge(protected)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_monthly_sales::repository;
    use crate::shared::config::Config;
    use crate::shared::data::db::setup_test_db;
    use crate::system::initialization::ensure_admin_user_exists;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use sales_contracts::domain::a001_monthly_sales::MonthlySalesDto;
    use sea_orm::DatabaseConnection;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> (Router, DatabaseConnection) {
        let db = setup_test_db().await.unwrap();
        let config = Config::default();
        ensure_admin_user_exists(&db, &config.auth).await.unwrap();
        let state = AppState::new(db.clone(), config, "test-secret".to_string());
        (configure_routes(state), db)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn login(app: &Router) -> Value {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/system/auth/login",
                None,
                json!({ "username": "admin", "password": "admin" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn seed(db: &DatabaseConnection, rows: &[(i32, u32, &str, i64, i64)]) {
        for &(year, month, product, quantity, revenue) in rows {
            let dto = MonthlySalesDto {
                year,
                month,
                product_name: product.to_string(),
                quantity,
                revenue: Decimal::new(revenue, 0),
            };
            repository::insert(db, &dto).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app().await;
        let (status, body) = send(&app, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_chart_type() {
        let (app, _) = test_app().await;
        for uri in ["/api/chart-data?type=invalid", "/api/chart-data?type=", "/api/chart-data?type=LINE"] {
            let (status, body) = send(&app, get_request(uri, None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "error": "Invalid chart type" }));
        }
    }

    #[tokio::test]
    async fn test_chart_types_succeed() {
        let (app, db) = test_app().await;
        seed(
            &db,
            &[
                (2024, 1, "A", 10, 500_000),
                (2024, 2, "A", 15, 750_000),
                (2024, 1, "B", 20, 600_000),
            ],
        )
        .await;

        let (status, body) = send(&app, get_request("/api/chart-data?type=bar", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"], json!(["A", "B"]));
        assert_eq!(body["datasets"][0]["data"], json!([25, 20]));
        assert_eq!(body["datasets"][0]["label"], "Количество проданных единиц");

        let (status, body) = send(&app, get_request("/api/chart-data?type=pie", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"], json!(["A", "B"]));

        // без type строится линейная диаграмма, кривой год игнорируется
        let (status, body) = send(&app, get_request("/api/chart-data?year=abc", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"], json!(["Январь 2024", "Февраль 2024"]));

        let (status, body) =
            send(&app, get_request("/api/chart-data?type=line&year=2024", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"].as_array().unwrap().len(), 12);
        assert_eq!(body["datasets"][0]["data"][0], json!(1100000.0));
        assert_eq!(body["datasets"][0]["data"][11], json!(0.0));
    }

    #[tokio::test]
    async fn test_chart_product_filter() {
        let (app, db) = test_app().await;
        seed(
            &db,
            &[(2024, 1, "Ноутбук", 10, 100), (2024, 1, "Смартфон", 20, 200)],
        )
        .await;

        let uri = "/api/chart-data?type=bar&products%5B%5D=%D0%9D%D0%BE%D1%83%D1%82%D0%B1%D1%83%D0%BA";
        let (status, body) = send(&app, get_request(uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"], json!(["Ноутбук"]));
        assert_eq!(body["datasets"][0]["data"], json!([10]));
    }

    #[tokio::test]
    async fn test_table_is_public_and_strict() {
        let (app, db) = test_app().await;
        seed(&db, &[(2024, 3, "A", 1, 1), (2023, 5, "B", 1, 1)]).await;

        let (status, body) = send(&app, get_request("/api/sales/table?year=2024", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["page_size"], 20);
        assert_eq!(body["items"][0]["month_name"], "Март");
        assert_eq!(body["years"], json!([2024, 2023]));
        assert_eq!(body["months"].as_array().unwrap().len(), 12);

        let (status, _) = send(&app, get_request("/api/sales/table?year=abc", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, get_request("/api/sales/table?month=13", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, get_request("/api/sales/filter-options", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"], json!(["A", "B"]));
    }

    #[tokio::test]
    async fn test_management_requires_auth() {
        let (app, _) = test_app().await;
        let (status, _) = send(&app, get_request("/api/sales/manage", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, get_request("/api/sales/manage", Some("bogus"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(
            &app,
            json_request("POST", "/api/sales", None, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_management_crud() {
        let (app, _) = test_app().await;
        let auth = login(&app).await;
        let token = auth["access_token"].as_str().unwrap().to_string();
        let token = Some(token.as_str());

        let form = json!({
            "year": 2024,
            "month": 1,
            "product_name": " X ",
            "quantity": 10,
            "revenue": 50000.5
        });
        let (status, created) = send(&app, json_request("POST", "/api/sales", token, form.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["product_name"], "X");
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, json_request("POST", "/api/sales", token, form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "__all__");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/sales",
                token,
                json!({ "year": 2024, "month": 0, "product_name": "", "quantity": -1, "revenue": -1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"].as_array().unwrap().len(), 4);

        let uri = format!("/api/sales/{id}");
        let (status, updated) = send(
            &app,
            json_request(
                "PUT",
                &uri,
                token,
                json!({ "year": 2024, "month": 1, "product_name": "Y", "quantity": 11, "revenue": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["product_name"], "Y");

        let (status, fetched) = send(&app, get_request(&uri, token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["quantity"], 11);

        let (status, body) = send(&app, get_request("/api/sales/manage?page=abc", token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 10);
        assert_eq!(body["total"], 1);

        let delete = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header("Authorization", format!("Bearer {}", token.unwrap_or_default()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, delete).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, get_request(&uri, token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                &uri,
                token,
                json!({ "year": 2024, "month": 1, "product_name": "Y", "quantity": 1, "revenue": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_flow() {
        let (app, _) = test_app().await;

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/system/auth/login",
                None,
                json!({ "username": "admin", "password": "wrong" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let auth = login(&app).await;
        assert_eq!(auth["token_type"], "Bearer");
        assert_eq!(auth["expires_in"], 24 * 3600);
        let access = auth["access_token"].as_str().unwrap();
        let refresh = auth["refresh_token"].clone();

        let (status, me) = send(&app, get_request("/api/system/auth/me", Some(access))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "admin");
        assert_eq!(me["is_admin"], true);

        let body = json!({ "refresh_token": refresh });
        let (status, refreshed) = send(
            &app,
            json_request("POST", "/api/system/auth/refresh", None, body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(refreshed["access_token"].is_string());

        let (status, _) = send(
            &app,
            json_request("POST", "/api/system/auth/logout", None, body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            json_request("POST", "/api/system/auth/refresh", None, body),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
