//! Application state and shared resources.

use anyhow::Result;
use reqwest::Client;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::print_info::{ParcelLookup, PgParcelLookup};

/// Shared application state.
///
/// Built once at startup; handlers receive it through `Extension<Arc<AppState>>`.
pub struct AppState {
    pub config: ServiceConfig,
    pub db: PgPool,
    pub http: Client,
    pub parcel_lookup: Arc<dyn ParcelLookup>,
}

impl AppState {
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        let http = Client::builder().build()?;

        let parcel_lookup: Arc<dyn ParcelLookup> =
            Arc::new(PgParcelLookup::new(db.clone(), &config.printinfo_table));

        Ok(Self {
            config,
            db,
            http,
            parcel_lookup,
        })
    }
}
