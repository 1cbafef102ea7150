//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::coils;
use crate::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;

/// Assemble the application: tracing middleware, extractor error handlers,
/// the coil API under `/api`, and the health probes.
///
/// # Examples
/// ```
/// use actix_web::web;
/// use coil_inventory::inbound::http::health::HealthState;
/// use coil_inventory::inbound::http::state::HttpState;
/// use coil_inventory::server::build_app;
///
/// let app = build_app(
///     web::Data::new(HealthState::new()),
///     web::Data::new(HttpState::fixtures()),
/// );
/// # let _ = app;
/// ```
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(Trace)
        .service(web::scope("/api").configure(coils::configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the listener is bound.
/// - `config`: pre-built [`ServerConfig`] containing the bind address and store pool.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(config.db_pool.as_ref());
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    use super::*;

    #[actix_web::test]
    async fn routes_coil_requests_through_the_api_scope() {
        let app = actix_test::init_service(build_app(
            web::Data::new(HealthState::new()),
            build_http_state(None),
        ))
        .await;
        let request = actix_test::TestRequest::get().uri("/api/coil/1").to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(crate::domain::TRACE_ID_HEADER));
    }

    #[actix_web::test]
    async fn readiness_reflects_health_state() {
        let health = web::Data::new(HealthState::new());
        let app =
            actix_test::init_service(build_app(health.clone(), build_http_state(None))).await;

        let before = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        health.mark_ready();
        let after = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;

        assert_eq!(before.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(after.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn malformed_json_is_reported_as_invalid_request() {
        let app = actix_test::init_service(build_app(
            web::Data::new(HealthState::new()),
            build_http_state(None),
        ))
        .await;
        let request = actix_test::TestRequest::post()
            .uri("/api/coil")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();

        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let body: serde_json::Value = actix_test::read_body_json(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }
}
