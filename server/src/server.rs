/// HTTP server factory and configuration.
/// Provides the route table and a reusable function to create the HTTP server
/// for use in both the main binary and tests.

use crate::handlers::{
    get_statistics, health, index, json_error_handler, list_users, login, query_error_handler,
    register, save_statistics,
};
use crate::state::AppState;
use actix_web::{middleware, web, App, HttpServer};

/// Register extractor configuration and every route on an app or scope
///
/// # Example
/// ```ignore
/// let app = App::new().app_data(state).configure(server::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/save-statistics", web::post().to(save_statistics))
        .route("/get-statistics", web::get().to(get_statistics))
        .route("/users", web::get().to(list_users));
}

/// Create a configured HTTP server
///
/// Takes the shared application state and a bind address, then returns a
/// fully configured server ready to be awaited.
///
/// # Arguments
/// * `state` - Application state (connected or degraded store) wrapped in web::Data
/// * `bind_addr` - Address to bind the server to (e.g., "0.0.0.0:10000")
pub fn create_http_server(
    state: web::Data<AppState>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::in_memory(4).expect("Failed to open in-memory store"))
    }

    #[actix_web::test]
    async fn test_create_http_server_with_test_state() {
        let result = create_http_server(test_state(), "127.0.0.1:0");
        assert!(result.is_ok(), "create_http_server should succeed");
    }

    #[actix_web::test]
    async fn test_create_http_server_invalid_address() {
        let result = create_http_server(test_state(), "invalid_address:99999");
        assert!(result.is_err(), "create_http_server should fail with invalid address");
    }

    #[actix_web::test]
    async fn test_index_endpoint() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        assert_eq!(body, web::Bytes::from_static(b"Backend is running"));
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_unknown_route_is_404() {
        let app =
            test::init_service(App::new().app_data(test_state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/does-not-exist").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
