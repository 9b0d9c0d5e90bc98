// API layer - HTTP endpoints
pub mod admin_auth;
pub mod audit;
pub mod core;
pub mod crud;
pub mod health;
pub mod helpers;
pub mod sys;

#[cfg(test)]
mod helpers_test;

pub use admin_auth::AdminAuth;
pub use audit::AuditApi;
pub use core::CoreApi;
pub use health::HealthApi;
pub use sys::SysApi;

use poem::{EndpointExt, IntoEndpoint, Route};
use poem_openapi::OpenApiService;

use crate::app_data::AppData;
use crate::audit::{AuditEmitter, AuditInterceptor};

/// Build the application routes
///
/// - `/api/health` is public
/// - `/api/admin/core/*` and `/api/admin/sys/*` require a bearer token and are audited
/// - `/api/admin/audit/*` requires a bearer token and is not audited itself
/// - `/swagger` serves the admin API documentation
///
/// Errors raised under `/api/admin` are rendered in the response envelope.
pub fn routes(app_data: &AppData, emitter: AuditEmitter, server_url: &str) -> Route {
    let admin_service = OpenApiService::new(
        (
            CoreApi::new(app_data.document_store.clone()),
            SysApi::new(app_data.document_store.clone()),
        ),
        "Document Administration API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("{}/api/admin", server_url));
    let ui = admin_service.swagger_ui();

    let audit_service = OpenApiService::new(
        AuditApi::new(app_data.audit_store.clone(), app_data.rollback_engine.clone()),
        "Audit API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("{}/api/admin/audit", server_url));

    let health_service = OpenApiService::new(HealthApi, "Health API", env!("CARGO_PKG_VERSION"))
        .server(format!("{}/api", server_url));

    Route::new()
        .nest(
            "/api/admin/audit",
            audit_service
                .into_endpoint()
                .catch_all_error(helpers::envelope_error)
                .with(AdminAuth::new(app_data.token_provider.clone())),
        )
        .nest(
            "/api/admin",
            admin_service
                .into_endpoint()
                .catch_all_error(helpers::envelope_error)
                .with(AuditInterceptor::new(app_data.document_store.clone(), emitter))
                .with(AdminAuth::new(app_data.token_provider.clone())),
        )
        .nest("/api", health_service)
        .nest("/swagger", ui)
}
