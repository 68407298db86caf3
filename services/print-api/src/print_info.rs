//! Parcel metadata lookup via point containment.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use landreg_common::{LandregError, LandregResult};

/// SRID of lookup coordinates (LV95).
pub const LOOKUP_SRID: i32 = 2056;

/// One row of parcel print metadata, keyed by spatial containment of the
/// requested map center.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ParcelInfo {
    pub nfgeometer: String,
    pub lieferdatum: String,
    pub anschrift: String,
    pub kontakt: String,
    pub gemeinde: String,
}

/// Point-in-polygon lookup capability.
///
/// The print pipeline depends only on this contract; any storage layer that
/// can answer spatial containment queries satisfies it.
#[async_trait]
pub trait ParcelLookup: Send + Sync {
    /// Return the parcel row containing `(x, y)` in the given SRID, if any.
    async fn lookup(&self, x: f64, y: f64, srid: i32) -> LandregResult<Option<ParcelInfo>>;
}

/// PostGIS-backed parcel lookup.
pub struct PgParcelLookup {
    pool: PgPool,
    table: String,
}

impl PgParcelLookup {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ParcelLookup for PgParcelLookup {
    async fn lookup(&self, x: f64, y: f64, srid: i32) -> LandregResult<Option<ParcelInfo>> {
        // The table name is an operator-configured identifier; point
        // coordinates and SRID are always bound, never interpolated.
        let sql = format!(
            "SELECT nfgeometer, lieferdatum::text AS lieferdatum, anschrift, kontakt, gemeinde \
             FROM {} \
             WHERE ST_Contains(geometrie, ST_SetSRID(ST_MakePoint($1, $2), $3))",
            self.table
        );

        // fetch_optional checks a connection out of the pool for this one
        // query and returns it on every path, including query failure.
        let row = sqlx::query_as::<_, ParcelInfo>(&sql)
            .bind(x)
            .bind(y)
            .bind(srid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LandregError::DatabaseError(format!("Parcel lookup failed: {}", e)))?;

        Ok(row)
    }
}
