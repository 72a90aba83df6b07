use crate::cli::ServeArgs;
use crate::infra::{seed_administrator, AppState};
use crate::routes::with_giving_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use giving_project::config::AppConfig;
use giving_project::error::AppError;
use giving_project::telemetry;
use giving_project::workflows::giving::{
    spawn_notification_worker, ChannelNotificationQueue, GivingProject, InMemoryGivingStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (queue, receiver) = ChannelNotificationQueue::channel();
    let _worker = spawn_notification_worker(receiver);

    let store = Arc::new(InMemoryGivingStore::new());
    match args.admin_email.take() {
        Some(email) => {
            let admin = seed_administrator(&store, &email)?;
            info!(user_id = %admin.id, email = %admin.email, "administrator account ready");
        }
        None => warn!("no --admin-email given; the store starts without any accounts"),
    }

    let project = Arc::new(GivingProject::new(
        store,
        Arc::new(queue),
        config.notifications.clone(),
    ));

    let app = with_giving_routes(project)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, public_url = %config.notifications.public_url, "giving project service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
