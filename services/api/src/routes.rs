use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use job_intake::intake::{intake_router, IntakeService, Mailer};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct PortalInfo {
    pub(crate) app_title: String,
    pub(crate) hr_email: String,
    pub(crate) footer: String,
}

pub(crate) fn with_intake_routes<M>(service: Arc<IntakeService<M>>) -> axum::Router
where
    M: Mailer + 'static,
{
    intake_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/portal", axum::routing::get(portal_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Title, HR contact, and footer line for the form front end.
pub(crate) async fn portal_endpoint(Extension(state): Extension<AppState>) -> Json<PortalInfo> {
    let portal = &state.portal;
    Json(PortalInfo {
        app_title: portal.app_title.clone(),
        hr_email: portal.hr_email.clone(),
        footer: format!("© {} - {}", current_year(), portal.from_name),
    })
}

fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use job_intake::config::PortalConfig;
    use job_intake::intake::{IntakeSettings, NotifyError, OutboundEmail};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct NullMailer;

    impl Mailer for NullMailer {
        fn send(&self, _email: &OutboundEmail) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn router() -> axum::Router {
        let service = IntakeService::new(
            IntakeSettings::from(&PortalConfig::default()),
            Arc::new(NullMailer),
        );
        with_intake_routes(Arc::new(service)).layer(Extension(state(true)))
    }

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            portal: Arc::new(PortalConfig {
                app_title: "Careers at Example".to_string(),
                ..PortalConfig::default()
            }),
        }
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn portal_endpoint_exposes_title_and_hr_contact() {
        let Json(info) = portal_endpoint(Extension(state(true))).await;
        assert_eq!(info.app_title, "Careers at Example");
        assert_eq!(info.hr_email, "hr@example.com");
        assert!(info.footer.ends_with("Recruiting Team"));
    }

    #[tokio::test]
    async fn health_and_portal_routes_are_mounted() {
        for uri in ["/health", "/ready", "/api/v1/portal", "/metrics"] {
            let response = router()
                .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
                .await
                .expect("router responds");
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
