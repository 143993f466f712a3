use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::collector::{exposition, TelemetryCollector};
use crate::config::HttpdConfig;
use crate::envoy::DeviceClient;
use crate::get_unix_ts;

/// Shared by all actix workers
pub struct ApiState<C> {
    collector: TelemetryCollector<C>,
    start_time: Instant,
}

impl<C: DeviceClient> ApiState<C> {
    pub fn new(collector: TelemetryCollector<C>) -> Self {
        ApiState {
            collector,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub target: String,
    pub device_connected: bool,
    pub metric_families: usize,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

/// Scrape endpoint. Always answers 200, an unreachable device gives an
/// exposition without any envoy metric.
async fn metrics<C: DeviceClient>(state: web::Data<ApiState<C>>) -> impl Responder {
    let observations = state.collector.collect().await;

    match exposition::render(observations) {
        Ok(body) => HttpResponse::Ok().content_type(exposition::CONTENT_TYPE).body(body),
        Err(e) => {
            error!("Unable to encode metrics: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Liveness of the exporter itself, the device is not contacted
async fn health_check<C: DeviceClient>(state: web::Data<ApiState<C>>) -> impl Responder {
    let response = HealthResponse {
        status: "healthy".to_string(),
        target: state.collector.target().to_string(),
        device_connected: state.collector.is_connected(),
        metric_families: state.collector.describe().len(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: get_unix_ts(),
    };

    HttpResponse::Ok().json(response)
}

pub fn routes<C: DeviceClient>(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics::<C>))
        .route("/health", web::get().to(health_check::<C>));
}

pub struct ApiManager {
    config: HttpdConfig,
}

impl ApiManager {
    pub fn new(config: HttpdConfig) -> Self {
        return ApiManager { config };
    }

    pub async fn start_thread<C: DeviceClient>(&self, collector: TelemetryCollector<C>) -> std::io::Result<()> {
        let state = web::Data::new(ApiState::new(collector));

        info!("Serving metrics on http://{}:{}/metrics", self.config.listen, self.config.port);
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .configure(routes::<C>)
        })
        .bind((self.config.listen.as_str(), self.config.port))?
        .run()
        .await
    }
}
