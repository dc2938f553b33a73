use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPersonnelRepository, OutboxNotifier};
use crate::routes::with_personnel_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use personnel_compliance::config::AppConfig;
use personnel_compliance::error::AppError;
use personnel_compliance::roster::{DocumentRequestTemplate, PersonnelService};
use personnel_compliance::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if !config.notification.attachment_path.is_file() {
        warn!(
            path = %config.notification.attachment_path.display(),
            "document request attachment not found; mail requests will fail"
        );
    }

    let repository = Arc::new(InMemoryPersonnelRepository::default());
    let notifier = Arc::new(OutboxNotifier::default());
    let template = DocumentRequestTemplate::from_config(&config.notification);
    let personnel_service = Arc::new(PersonnelService::new(repository, notifier, template));

    let app = with_personnel_routes(personnel_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "personnel compliance roster ready");

    axum::serve(listener, app).await?;
    Ok(())
}
