use std::sync::Arc;

use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer, Responder, ResponseError};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::order::{CreateOrderRequest, OrderError, OrderStatus};
use crate::metrics::Metrics;
use crate::service::OrderService;

// ============================================================================
// HTTP API - Request/response mapping over the lifecycle engine
// ============================================================================
//
// Thin by design: handlers translate transport framing to the four lifecycle
// operations plus the read-side lookups, and map the error taxonomy onto
// status codes. No business rules live here.
//
// ============================================================================

pub struct AppState {
    pub service: Arc<OrderService>,
    pub metrics: Arc<Metrics>,
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ if self.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, OrderError> {
    let order = state.service.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, OrderError> {
    let order_id = path.into_inner();
    match state.service.get(order_id).await? {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(OrderError::NotFound(order_id)),
    }
}

async fn orders_by_customer(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, OrderError> {
    let orders = state.service.by_customer(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn orders_by_restaurant(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, OrderError> {
    let orders = state.service.by_restaurant(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn orders_by_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, OrderError> {
    let status: OrderStatus = match path.into_inner().parse() {
        Ok(status) => status,
        Err(reason) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": reason })))
        }
    };
    let orders = state.service.by_status(status).await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[derive(Debug, Deserialize)]
struct OrderFilter {
    customer_id: Option<u64>,
    restaurant_id: Option<u64>,
    status: Option<String>,
}

/// Collection lookup with optional filters, first match wins:
/// customer, then restaurant, then status. No filter yields an empty list
/// (unfiltered listing would need pagination this surface does not offer).
async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<OrderFilter>,
) -> Result<HttpResponse, OrderError> {
    let filter = query.into_inner();

    let orders = if let Some(customer_id) = filter.customer_id {
        state.service.by_customer(customer_id).await?
    } else if let Some(restaurant_id) = filter.restaurant_id {
        state.service.by_restaurant(restaurant_id).await?
    } else if let Some(status) = filter.status {
        match status.parse::<OrderStatus>() {
            Ok(status) => state.service.by_status(status).await?,
            Err(reason) => {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": reason })))
            }
        }
    } else {
        Vec::new()
    };

    Ok(HttpResponse::Ok().json(orders))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: String,
}

async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, OrderError> {
    let new_status: OrderStatus = match query.status.parse() {
        Ok(status) => status,
        Err(reason) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "error": reason })))
        }
    };
    let order = state.service.transition(path.into_inner(), new_status).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn cancel_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, OrderError> {
    let order = state.service.cancel(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "food-order-service"
    }))
}

async fn metrics_endpoint(state: web::Data<AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %error, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/customer/{customer_id}", web::get().to(orders_by_customer))
            .route("/restaurant/{restaurant_id}", web::get().to(orders_by_restaurant))
            .route("/status/{status}", web::get().to(orders_by_status))
            .route("/{order_id}/status", web::put().to(update_status))
            .route("/{order_id}/cancel", web::put().to(cancel_order))
            .route("/{order_id}", web::get().to(get_order)),
    )
    .route("/health", web::get().to(health))
    .route("/metrics", web::get().to(metrics_endpoint));
}

/// Start the HTTP server on the given port. Blocks until shutdown.
pub async fn run(state: AppState, port: u16) -> std::io::Result<()> {
    tracing::info!(port, "Starting HTTP server");

    let data = web::Data::new(state);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

// ============================================================================
// Handler Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    use crate::messaging::{EventPublisher, InMemoryChannel};
    use crate::pricing::FlatRateCatalog;
    use crate::store::InMemoryOrderStore;

    fn state() -> web::Data<AppState> {
        let metrics = Arc::new(Metrics::new().unwrap());
        let publisher = EventPublisher::new(Arc::new(InMemoryChannel::new()), metrics.clone());
        let service = OrderService::new(
            Arc::new(InMemoryOrderStore::new()),
            publisher,
            Arc::new(FlatRateCatalog::default()),
            metrics.clone(),
        );
        web::Data::new(AppState {
            service: Arc::new(service),
            metrics,
        })
    }

    fn order_body(quantity: u32) -> serde_json::Value {
        serde_json::json!({
            "customer_id": 1,
            "restaurant_id": 7,
            "items": [{ "menu_item_id": 42, "quantity": quantity }],
            "delivery_address": "1 Main St",
            "contact_phone": "+15551234567"
        })
    }

    #[actix_web::test]
    async fn create_returns_201_with_order() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/orders")
                .set_json(order_body(2))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = test::read_body(resp).await;
        let order: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(order["status"], "PENDING");
        assert_eq!(order["total_amount"], "20.00");
    }

    #[actix_web::test]
    async fn invalid_quantity_maps_to_400() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/orders")
                .set_json(order_body(51))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_order_maps_to_404() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/orders/{}", Uuid::new_v4()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn status_update_and_repeat_cancel() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/orders")
                .set_json(order_body(1))
                .to_request(),
        )
        .await;
        let body = test::read_body(resp).await;
        let order: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let id = order["id"].as_str().unwrap().to_string();

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/orders/{id}/status?status=CONFIRMED"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/orders/{id}/cancel"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        // Second cancel is an invalid transition, not a no-op.
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/orders/{id}/cancel"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn bad_status_literal_maps_to_400() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders/status/SHIPPED")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn collection_route_filters_orders() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        for customer_id in [1, 1, 2] {
            let mut body = order_body(1);
            body["customer_id"] = serde_json::json!(customer_id);
            let resp = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/orders")
                    .set_json(body)
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders?customer_id=1")
                .to_request(),
        )
        .await;
        let orders: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(orders.as_array().unwrap().len(), 2);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders?status=PENDING")
                .to_request(),
        )
        .await;
        let orders: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(orders.as_array().unwrap().len(), 3);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders?status=SHIPPED")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/orders").to_request(),
        )
        .await;
        let orders: serde_json::Value =
            serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert!(orders.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn health_and_metrics_respond() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure)).await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
