//! Integration test: prediction API endpoints

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ndarray::array;
use phone_forecast::preprocessing::LabelEncoder;
use phone_forecast::server::{create_router, AppState, LoadedModels, ServerConfig};
use phone_forecast::training::{LinearRegression, PriceModel};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn fitted(x: ndarray::Array2<f64>, y: ndarray::Array1<f64>) -> LinearRegression {
    let mut model = LinearRegression::new();
    model.fit(&x, &y).unwrap();
    model
}

fn test_models(with_india: bool) -> LoadedModels {
    // revenue = 100 * year + 2 * rnd - 200000
    let revenue_x = array![[2020.0, 100.0], [2021.0, 150.0], [2022.0, 120.0], [2023.0, 300.0]];
    let revenue_y = revenue_x.map_axis(ndarray::Axis(1), |r| 100.0 * r[0] + 2.0 * r[1] - 200_000.0);
    let revenue_global = fitted(revenue_x.clone(), revenue_y.clone());
    let revenue_india = with_india.then(|| fitted(revenue_x, revenue_y / 50.0));

    let mut encoder = LabelEncoder::new();
    encoder.fit(&["Base", "Pro", "Pro Max"]).unwrap();
    // price = 3333 * (year - 2020) + 25025 * code + 69950
    let price_x = array![[2020.0, 0.0], [2021.0, 1.0], [2022.0, 2.0], [2023.0, 0.0], [2024.0, 2.0]];
    let price_y = price_x.map_axis(ndarray::Axis(1), |r| {
        3333.0 * (r[0] - 2020.0) + 25025.0 * r[1] + 69950.0
    });
    let price = PriceModel {
        model: fitted(price_x, price_y),
        encoder,
    };

    LoadedModels {
        revenue_global,
        revenue_india,
        price,
    }
}

fn test_app_with(with_india: bool) -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        models_dir: "/tmp/phone-forecast-test-models".to_string(),
        cors_origin: None,
    };
    let state = Arc::new(AppState::new(config, test_models(with_india)));
    create_router(state)
}

fn test_app() -> axum::Router {
    test_app_with(true)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_predict_revenue() {
    let response = test_app()
        .oneshot(post_json("/predict-revenue", json!({"year": 2025, "rnd": 200})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let value = body["predictedRevenue"].as_f64().unwrap();
    assert!(value.is_finite());
    assert!((value - 2900.0).abs() < 1e-4, "got {}", value);
}

#[tokio::test]
async fn test_predict_revenue_india() {
    let response = test_app()
        .oneshot(post_json(
            "/predict-revenue",
            json!({"year": 2025, "rnd": 200, "region": "india"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await["predictedRevenue"].as_f64().unwrap();
    assert!((value - 58.0).abs() < 1e-4, "got {}", value);
}

#[tokio::test]
async fn test_predict_revenue_india_not_loaded() {
    let response = test_app_with(false)
        .oneshot(post_json(
            "/predict-revenue",
            json!({"year": 2025, "rnd": 200, "region": "india"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn assert_generic_failure(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body, json!({"error": true, "message": "Prediction failed"}));
}

#[tokio::test]
async fn test_predict_revenue_missing_field() {
    let response = test_app()
        .oneshot(post_json("/predict-revenue", json!({"year": 2025})))
        .await
        .unwrap();
    assert_generic_failure(response).await;
}

#[tokio::test]
async fn test_predict_revenue_non_numeric() {
    let response = test_app()
        .oneshot(post_json("/predict-revenue", json!({"year": "next", "rnd": 200})))
        .await
        .unwrap();
    assert_generic_failure(response).await;
}

#[tokio::test]
async fn test_predict_price_missing_variant() {
    let response = test_app()
        .oneshot(post_json("/predict-price", json!({"year": 2025})))
        .await
        .unwrap();
    assert_generic_failure(response).await;
}

#[tokio::test]
async fn test_predict_price_invalid_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict-price")
        .header("content-type", "application/json")
        .body(Body::from("{\"year\": 2025,"))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_generic_failure(response).await;
}

#[tokio::test]
async fn test_predict_price_is_multiple_of_100() {
    let app = test_app();
    for variant in ["Base", "Pro", "Pro Max"] {
        for year in [2024, 2025, 2026, 2030] {
            let response = app
                .clone()
                .oneshot(post_json("/predict-price", json!({"year": year, "variant": variant})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let price = body_json(response).await["predictedPrice"].as_i64().unwrap();
            assert_eq!(price % 100, 0, "{} {} -> {}", variant, year, price);
        }
    }
}

#[tokio::test]
async fn test_predict_price_value() {
    // 3333 * 5 + 25025 * 1 + 69950 = 111640 -> 111600
    let response = test_app()
        .oneshot(post_json("/predict-price", json!({"year": 2025, "variant": "Pro"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body, json!({"predictedPrice": 111600}));
}

#[tokio::test]
async fn test_predict_price_unknown_variant() {
    let response = test_app()
        .oneshot(post_json("/predict-price", json!({"year": 2025, "variant": "Mini"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert!(body.get("predictedPrice").is_none());
}

#[tokio::test]
async fn test_revenue_trend() {
    let response = test_app()
        .oneshot(post_json(
            "/predict-revenue/trend",
            json!({"targetYear": 2026, "region": "global"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let points = body.as_array().unwrap();
    let years: Vec<i64> = points.iter().map(|p| p["year"].as_i64().unwrap()).collect();
    assert_eq!(years, vec![2024, 2025, 2026]);
    assert!(points.iter().all(|p| p["isPrediction"] == json!(true)));

    // 100 * 2024 + 2 * 200000 - 200000
    let first = points[0]["value"].as_f64().unwrap();
    assert!((first - 402_400.0).abs() < 1e-2, "got {}", first);
}

#[tokio::test]
async fn test_revenue_trend_before_start_is_empty() {
    let response = test_app()
        .oneshot(post_json("/predict-revenue/trend", json!({"targetYear": 2020})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_revenue_trend_too_long() {
    let response = test_app()
        .oneshot(post_json("/predict-revenue/trend", json!({"targetYear": 9999})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app_with(false)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["models"]["revenueIndia"], json!(false));
    assert_eq!(body["variants"], json!(["Base", "Pro", "Pro Max"]));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict-revenue")
        .header("origin", "http://localhost:8080")
        .header("content-type", "application/json")
        .body(Body::from(json!({"year": 2025, "rnd": 200}).to_string()))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_get_on_predict_is_method_not_allowed() {
    let response = test_app()
        .oneshot(Request::builder().uri("/predict-price").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let response = test_app()
        .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
