//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_http_state;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::error;

use crate::Trace;
use crate::inbound::http::assets::{StaticAssets, stylesheet};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users;
use crate::inbound::http::views::PageTemplates;
use crate::outbound::persistence::{DbPool, DieselUserRepository};

/// Shared state handed to every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    /// Readiness and liveness flags.
    pub health_state: web::Data<HealthState>,
    /// Domain ports used by the roster handlers.
    pub http_state: web::Data<HttpState>,
    /// Stylesheet location.
    pub assets: web::Data<StaticAssets>,
    /// Roster page templates.
    pub pages: web::Data<PageTemplates>,
}

/// Assemble the application: roster pages, stylesheets and health checks,
/// all behind the trace middleware.
#[must_use]
pub fn build_app(
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
        http_state,
        assets,
        pages,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(assets)
        .app_data(pages)
        .wrap(Trace)
        .service(users::scope())
        .service(stylesheet)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server backed by `pool`.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the listener is bound.
/// - `config`: bind address plus static, export and template locations.
/// - `pool`: PostgreSQL pool with migrations already applied.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Returns [`std::io::Error`] when a page template under the static
/// directory cannot be loaded, or when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    pool: DbPool,
) -> std::io::Result<Server> {
    let pages = web::Data::new(PageTemplates::load(&config.static_dir).map_err(|err| {
        error!(%err, "page templates unavailable");
        std::io::Error::other(err)
    })?);
    let server_health_state = health_state.clone();
    let users = Arc::new(DieselUserRepository::new(pool));
    let http_state = web::Data::new(build_http_state(&config, users, Arc::new(DefaultClock)));
    let ServerConfig {
        bind_addr,
        static_dir,
        ..
    } = config;
    let assets = web::Data::new(StaticAssets::new(static_dir));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            assets: assets.clone(),
            pages: pages.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
