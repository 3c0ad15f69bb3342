//! HTTP handlers

use crate::error::ApiError;
use crate::metrics;
use crate::models::HealthResponse;
use actix_web::{web, HttpResponse};
use payment_core::{PaymentRequest, PlanRequest, RefundRequest};
use payment_service::PaymentProcessor;
use prometheus::TextEncoder;
use risk_engine::TransactionContext;
use uuid::Uuid;

// ===== Health and metrics =====

/// `GET /health`
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: metrics::STARTED_AT.elapsed().as_secs(),
    })
}

/// `GET /metrics`
pub async fn metrics_export() -> HttpResponse {
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&prometheus::gather()) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

// ===== Payments =====

/// `POST /api/v1/payments`
pub async fn create_payment(
    processor: web::Data<PaymentProcessor>,
    request: web::Json<PaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    match processor.process_payment(&request).await {
        Ok(payment) => {
            metrics::PAYMENTS_TOTAL.with_label_values(&["accepted"]).inc();
            Ok(HttpResponse::Created().json(payment))
        }
        Err(err) => {
            metrics::PAYMENTS_TOTAL.with_label_values(&["rejected"]).inc();
            Err(err.into())
        }
    }
}

/// `GET /api/v1/payments`
pub async fn list_payments(
    processor: web::Data<PaymentProcessor>,
) -> Result<HttpResponse, ApiError> {
    let payments = processor.list_payments().await?;
    Ok(HttpResponse::Ok().json(payments))
}

/// `GET /api/v1/payments/{id}`
pub async fn get_payment(
    processor: web::Data<PaymentProcessor>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let payment = processor.get_payment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payment))
}

/// `POST /api/v1/payments/{id}/refunds`
pub async fn refund_payment(
    processor: web::Data<PaymentProcessor>,
    path: web::Path<Uuid>,
    request: web::Json<RefundRequest>,
) -> Result<HttpResponse, ApiError> {
    match processor.refund_payment(path.into_inner(), &request).await {
        Ok(outcome) => {
            metrics::REFUNDS_TOTAL.with_label_values(&["accepted"]).inc();
            Ok(HttpResponse::Created().json(outcome))
        }
        Err(err) => {
            metrics::REFUNDS_TOTAL.with_label_values(&["rejected"]).inc();
            Err(err.into())
        }
    }
}

/// `POST /api/v1/payments/{id}/cancel`
pub async fn cancel_payment(
    processor: web::Data<PaymentProcessor>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let payment = processor.cancel_payment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payment))
}

/// `POST /api/v1/payments/{id}/settle`
pub async fn settle_payment(
    processor: web::Data<PaymentProcessor>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let payment = processor.settle_payment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payment))
}

// ===== Plans, fraud checks, statistics =====

/// `POST /api/v1/installment-plans`
pub async fn create_installment_plan(
    processor: web::Data<PaymentProcessor>,
    request: web::Json<PlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let plan = processor.create_installment_plan(&request).await?;
    Ok(HttpResponse::Created().json(plan))
}

/// `POST /api/v1/fraud-checks`
pub async fn fraud_check(
    processor: web::Data<PaymentProcessor>,
    request: web::Json<TransactionContext>,
) -> Result<HttpResponse, ApiError> {
    let assessment = processor.detect_fraud(&request);
    Ok(HttpResponse::Ok().json(assessment))
}

/// `GET /api/v1/stats`
pub async fn stats(processor: web::Data<PaymentProcessor>) -> Result<HttpResponse, ApiError> {
    let stats = processor.get_payment_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
