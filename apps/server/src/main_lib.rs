use std::sync::Arc;

use crate::config::Config;
use flexile_core::cap_table::{CapTableService, CapTableServiceTrait};
use flexile_core::dividends::{DividendService, DividendServiceTrait};
use flexile_storage_sqlite::{
    cap_table::CapTableRepository,
    db::{self, spawn_writer},
    dividends::{DividendComputationRepository, DividendRoundRepository},
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub cap_table_service: Arc<dyn CapTableServiceTrait + Send + Sync>,
    pub dividend_service: Arc<dyn DividendServiceTrait + Send + Sync>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FLEXILE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let cap_table_repository = Arc::new(CapTableRepository::new(pool.clone(), writer.clone()));
    let computation_repository = Arc::new(DividendComputationRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let round_repository = Arc::new(DividendRoundRepository::new(pool.clone(), writer));

    let cap_table_service = Arc::new(CapTableService::new(cap_table_repository.clone()));
    let dividend_service = Arc::new(DividendService::new(
        cap_table_repository,
        computation_repository,
        round_repository,
    ));

    Ok(Arc::new(AppState {
        cap_table_service,
        dividend_service,
    }))
}
