//! Server construction and middleware wiring.

mod config;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppState, build_app_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use lostfound::ApiDoc;
use lostfound::inbound::http::configure_api;
use lostfound::inbound::http::health::{HealthState, live, ready};
use lostfound::middleware::Authenticate;
use lostfound::Trace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    state: AppState,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        state,
    } = deps;

    let api = web::scope("/api/v1").configure(configure_api);

    // Authenticate runs inside Trace so gate logs carry the trace id.
    let app = App::new()
        .app_data(health_state)
        .app_data(web::Data::new(state.http))
        .wrap(Authenticate::new(state.gate))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `config`: pre-built [`ServerConfig`] carrying the bind address, signing
///   key, deletion policy and optional database pool.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let state = build_app_state(&config);
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            state: state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Middleware ordering and route registration for the assembled app.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use lostfound::domain::{TRACE_ID_HEADER, TokenSigningKey};
    use std::net::SocketAddr;

    fn deps() -> AppDependencies {
        let bind_addr: SocketAddr = "127.0.0.1:0".parse().expect("loopback address");
        let config = ServerConfig::new(bind_addr, TokenSigningKey::generate());
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            state: build_app_state(&config),
        }
    }

    #[actix_web::test]
    async fn protected_routes_answer_401_with_a_trace_id() {
        let app = test::init_service(build_app(deps())).await;
        let req = test::TestRequest::get().uri("/api/v1/requests").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[actix_web::test]
    async fn public_routes_and_probes_are_reachable() {
        let deps = deps();
        deps.health_state.mark_ready();
        let app = test::init_service(build_app(deps)).await;

        for uri in ["/api/v1/items", "/health/ready", "/health/live"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK, "{uri}");
        }
    }
}
