use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use payment_api::{config::ApiConfig, handlers};
use payment_core::SystemClock;
use payment_service::{InMemoryPaymentRepository, MockGateway, PaymentProcessor, ServiceConfig};
use risk_engine::ThreadRngSource;
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| "payment_api=info,payment_service=info,actix_web=info".into(),
        ))
        .init();

    info!("Starting ClinPay payment API...");

    // Load configuration
    let api_config = ApiConfig::from_env();
    let service_config = match std::env::var("CLINPAY_CONFIG") {
        Ok(path) => ServiceConfig::from_file(&path)
            .with_context(|| format!("loading config file {}", path))?,
        Err(_) => ServiceConfig::from_env().context("loading config from environment")?,
    };

    info!(
        "Gateway '{}': {}ms latency, {:.1}% simulated failures",
        service_config.gateway.provider,
        service_config.gateway.latency_ms,
        service_config.gateway.failure_rate * 100.0
    );

    // Wire the processor and its collaborators
    let random = Arc::new(ThreadRngSource);
    let repository = Arc::new(InMemoryPaymentRepository::new());
    let gateway = Arc::new(MockGateway::new(
        service_config.gateway.clone(),
        random.clone(),
    ));
    let processor = PaymentProcessor::new(
        &service_config,
        repository,
        gateway,
        random,
        Arc::new(SystemClock),
    )
    .context("building payment processor")?;
    let processor = web::Data::new(processor);

    info!("Listening on {}:{}", api_config.host, api_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(processor.clone())
            .route("/health", web::get().to(handlers::health_check))
            .route("/metrics", web::get().to(handlers::metrics_export))
            .service(
                web::scope("/api/v1")
                    .route("/payments", web::post().to(handlers::create_payment))
                    .route("/payments", web::get().to(handlers::list_payments))
                    .route("/payments/{id}", web::get().to(handlers::get_payment))
                    .route(
                        "/payments/{id}/refunds",
                        web::post().to(handlers::refund_payment),
                    )
                    .route(
                        "/payments/{id}/cancel",
                        web::post().to(handlers::cancel_payment),
                    )
                    .route(
                        "/payments/{id}/settle",
                        web::post().to(handlers::settle_payment),
                    )
                    .route(
                        "/installment-plans",
                        web::post().to(handlers::create_installment_plan),
                    )
                    .route("/fraud-checks", web::post().to(handlers::fraud_check))
                    .route("/stats", web::get().to(handlers::stats)),
            )
    })
    .bind((api_config.host.as_str(), api_config.port))?
    .run()
    .await?;

    Ok(())
}
