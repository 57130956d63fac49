//! Upstream feed acquisition.
//!
//! One async function per source feed, each wrapped in its own timeout.
//! The set is invoked concurrently by [`fetch_all`]; a single source
//! failing never fails the tick — it surfaces as a `dataHealth` entry and
//! the assembler substitutes a prior or empty value.

mod donki;
mod swpc;

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::types::{
    ActiveAlertProduct, ActiveRegion, CmeEvent, DataHealthEntry, FlareEvent, HssEvent, IpsEvent,
    MagneticField, MpcEvent, SepEvent, SolarWind, StormEvent,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("upstream response had an unexpected shape: {0}")]
    UnexpectedShape(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Thin wrapper around a [`reqwest::Client`] configured with the
/// fetch timeout from [`crate::config::AppConfig`].
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl FetchClient {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");
        Self { http, timeout }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let fut = async {
            let resp = self.http.get(url).send().await?.error_for_status()?;
            let bytes = resp.bytes().await?;
            serde_json::from_slice::<T>(&bytes).map_err(FetchError::from)
        };
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    async fn get_text(&self, url: &str) -> FetchResult<String> {
        let fut = async {
            let resp = self.http.get(url).send().await?.error_for_status()?;
            Ok(resp.text().await?)
        };
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }
}

/// Every fetcher output for one tick, each slot independently `Ok`/`Err`.
/// Mirrors spec.md §4.A: a failing source never prevents assembly.
pub struct FetchSet {
    pub kp: FetchResult<f64>,
    pub kp_forecast_24h: FetchResult<Vec<f64>>,
    pub solar_wind: FetchResult<SolarWind>,
    pub magnetic_field: FetchResult<MagneticField>,
    pub xray_flux: FetchResult<f64>,
    pub recent_flares: FetchResult<Vec<FlareEvent>>,
    pub cmes: FetchResult<Vec<CmeEvent>>,
    pub recent_storms: FetchResult<Vec<StormEvent>>,
    pub seps: FetchResult<Vec<SepEvent>>,
    pub hss: FetchResult<Vec<HssEvent>>,
    pub ips: FetchResult<Vec<IpsEvent>>,
    pub mpc: FetchResult<Vec<MpcEvent>>,
    pub active_regions: FetchResult<Vec<ActiveRegion>>,
    pub active_alerts: FetchResult<Vec<ActiveAlertProduct>>,
    pub forecast_3day: FetchResult<String>,
}

/// Run every fetcher concurrently. Each has its own deadline; none can
/// block or fail the others.
pub async fn fetch_all(client: &FetchClient) -> FetchSet {
    let (
        kp,
        kp_forecast_24h,
        solar_wind,
        magnetic_field,
        xray_flux,
        recent_flares,
        cmes,
        recent_storms,
        seps,
        hss,
        ips,
        mpc,
        active_regions,
        active_alerts,
        forecast_3day,
    ) = tokio::join!(
        swpc::fetch_kp_index(client),
        swpc::fetch_kp_forecast(client),
        swpc::fetch_solar_wind(client),
        swpc::fetch_magnetic_field(client),
        swpc::fetch_xray_flux(client),
        swpc::fetch_recent_flares(client),
        donki::fetch_cmes(client),
        donki::fetch_storms(client),
        donki::fetch_seps(client),
        donki::fetch_hss(client),
        donki::fetch_ips(client),
        donki::fetch_mpc(client),
        swpc::fetch_active_regions(client),
        swpc::fetch_active_alerts(client),
        swpc::fetch_forecast_3day(client),
    );

    FetchSet {
        kp,
        kp_forecast_24h,
        solar_wind,
        magnetic_field,
        xray_flux,
        recent_flares,
        cmes,
        recent_storms,
        seps,
        hss,
        ips,
        mpc,
        active_regions,
        active_alerts,
        forecast_3day,
    }
}

/// Build the `dataHealth` map for this tick: `ok`/`lastError` come from the
/// current attempt, but `lastSuccess` is carried forward from the previous
/// state when the current attempt failed (spec.md §4.A).
pub fn health_entry<T>(
    previous: Option<&DataHealthEntry>,
    result: &FetchResult<T>,
) -> DataHealthEntry {
    let now = Utc::now();
    match result {
        Ok(_) => DataHealthEntry {
            ok: true,
            last_success: Some(now),
            last_error: None,
        },
        Err(e) => DataHealthEntry {
            ok: false,
            last_success: previous.and_then(|p| p.last_success),
            last_error: Some(e.to_string()),
        },
    }
}

/// Build the full `dataHealth` map for a tick from the named fetch results
/// and the previous tick's map.
pub fn build_data_health(
    set: &FetchSet,
    previous: &HashMap<String, DataHealthEntry>,
) -> HashMap<String, DataHealthEntry> {
    let mut out = HashMap::new();
    out.insert("kp".to_string(), health_entry(previous.get("kp"), &set.kp));
    out.insert(
        "kpForecast24h".to_string(),
        health_entry(previous.get("kpForecast24h"), &set.kp_forecast_24h),
    );
    out.insert(
        "solarWind".to_string(),
        health_entry(previous.get("solarWind"), &set.solar_wind),
    );
    out.insert(
        "magneticField".to_string(),
        health_entry(previous.get("magneticField"), &set.magnetic_field),
    );
    out.insert(
        "xrayFlux".to_string(),
        health_entry(previous.get("xrayFlux"), &set.xray_flux),
    );
    out.insert(
        "recentFlares".to_string(),
        health_entry(previous.get("recentFlares"), &set.recent_flares),
    );
    out.insert(
        "cmes".to_string(),
        health_entry(previous.get("cmes"), &set.cmes),
    );
    out.insert(
        "recentStorms".to_string(),
        health_entry(previous.get("recentStorms"), &set.recent_storms),
    );
    out.insert(
        "seps".to_string(),
        health_entry(previous.get("seps"), &set.seps),
    );
    out.insert(
        "hss".to_string(),
        health_entry(previous.get("hss"), &set.hss),
    );
    out.insert(
        "ips".to_string(),
        health_entry(previous.get("ips"), &set.ips),
    );
    out.insert(
        "mpc".to_string(),
        health_entry(previous.get("mpc"), &set.mpc),
    );
    out.insert(
        "activeRegions".to_string(),
        health_entry(previous.get("activeRegions"), &set.active_regions),
    );
    out.insert(
        "activeAlerts".to_string(),
        health_entry(previous.get("activeAlerts"), &set.active_alerts),
    );
    out.insert(
        "forecast3Day".to_string(),
        health_entry(previous.get("forecast3Day"), &set.forecast_3day),
    );
    out
}
