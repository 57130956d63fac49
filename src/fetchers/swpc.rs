//! NOAA Space Weather Prediction Center feeds: geomagnetic index, solar
//! wind plasma/field, X-ray flux, active regions, and text products.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{ActiveAlertProduct, ActiveRegion, FlareEvent, MagneticField, SolarWind};

use super::{FetchClient, FetchError, FetchResult};

const PLANETARY_K_INDEX: &str = "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json";
const PLASMA_REALTIME: &str = "https://services.swpc.noaa.gov/products/solar-wind/plasma-2-hour.json";
const PLASMA_7DAY: &str = "https://services.swpc.noaa.gov/products/solar-wind/plasma-7-day.json";
const MAG_REALTIME: &str = "https://services.swpc.noaa.gov/products/solar-wind/mag-2-hour.json";
const MAG_7DAY: &str = "https://services.swpc.noaa.gov/products/solar-wind/mag-7-day.json";
const XRAY_FLUX: &str = "https://services.swpc.noaa.gov/json/goes/primary/xrays-6-hour.json";
const XRAY_FLARES: &str = "https://services.swpc.noaa.gov/json/goes/primary/xray-flares-latest.json";
const SOLAR_REGIONS: &str = "https://services.swpc.noaa.gov/json/solar_regions.json";
const ALERTS: &str = "https://services.swpc.noaa.gov/products/alerts.json";
const FORECAST_3DAY: &str = "https://services.swpc.noaa.gov/text/3-day-forecast.txt";

/// The planetary K-index feed is an array-of-arrays table, header row
/// first: `["time_tag", "Kp", "a_running", "station_count"]`.
pub async fn fetch_kp_index(client: &FetchClient) -> FetchResult<f64> {
    let rows: Vec<Vec<serde_json::Value>> = client.get_json(PLANETARY_K_INDEX).await?;
    let last = rows
        .into_iter()
        .skip(1)
        .next_back()
        .ok_or_else(|| FetchError::UnexpectedShape("planetary k-index had no data rows".into()))?;
    let kp_str = last
        .get(1)
        .and_then(|v| v.as_str())
        .ok_or_else(|| FetchError::UnexpectedShape("missing Kp column".into()))?;
    kp_str
        .parse::<f64>()
        .map_err(|_| FetchError::UnexpectedShape(format!("unparseable Kp value {kp_str:?}")))
}

/// Last eight readings, oldest first, for `kpForecast24h`.
pub async fn fetch_kp_forecast(client: &FetchClient) -> FetchResult<Vec<f64>> {
    let rows: Vec<Vec<serde_json::Value>> = client.get_json(PLANETARY_K_INDEX).await?;
    let values: Vec<f64> = rows
        .into_iter()
        .skip(1)
        .filter_map(|row| row.get(1)?.as_str()?.parse::<f64>().ok())
        .collect();
    let start = values.len().saturating_sub(8);
    Ok(values[start..].to_vec())
}

#[derive(Debug, Deserialize)]
struct PlasmaRow(
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

async fn fetch_plasma(client: &FetchClient, url: &str) -> FetchResult<SolarWind> {
    let rows: Vec<PlasmaRow> = client.get_json(url).await?;
    let row = rows
        .into_iter()
        .next_back()
        .ok_or_else(|| FetchError::UnexpectedShape("plasma feed had no data rows".into()))?;
    Ok(SolarWind {
        density: row.1.and_then(|s| s.parse().ok()).unwrap_or(0.0),
        speed: row.2.and_then(|s| s.parse().ok()).unwrap_or(0.0),
        temperature: row.3.and_then(|s| s.parse().ok()).unwrap_or(0.0),
    })
}

/// Prefer the realtime (2-hour) plasma feed, falling back to the 7-day
/// feed on failure — spec.md §4.B precedence rule.
pub async fn fetch_solar_wind(client: &FetchClient) -> FetchResult<SolarWind> {
    match fetch_plasma(client, PLASMA_REALTIME).await {
        Ok(v) => Ok(v),
        Err(_) => fetch_plasma(client, PLASMA_7DAY).await,
    }
}

#[derive(Debug, Deserialize)]
struct MagRow(
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

async fn fetch_mag(client: &FetchClient, url: &str) -> FetchResult<MagneticField> {
    let rows: Vec<MagRow> = client.get_json(url).await?;
    let row = rows
        .into_iter()
        .next_back()
        .ok_or_else(|| FetchError::UnexpectedShape("magnetic field feed had no data rows".into()))?;
    Ok(MagneticField {
        bx: row.1.and_then(|s| s.parse().ok()).unwrap_or(0.0),
        by: row.2.and_then(|s| s.parse().ok()).unwrap_or(0.0),
        bz: row.3.and_then(|s| s.parse().ok()).unwrap_or(0.0),
        bt: row.4.and_then(|s| s.parse().ok()).unwrap_or(0.0),
    })
}

pub async fn fetch_magnetic_field(client: &FetchClient) -> FetchResult<MagneticField> {
    match fetch_mag(client, MAG_REALTIME).await {
        Ok(v) => Ok(v),
        Err(_) => fetch_mag(client, MAG_7DAY).await,
    }
}

#[derive(Debug, Deserialize)]
struct XrayFluxRow {
    #[serde(default)]
    flux: Option<f64>,
    energy: Option<String>,
}

/// Most recent long-band (`0.1-0.8nm`) flux reading, W/m².
pub async fn fetch_xray_flux(client: &FetchClient) -> FetchResult<f64> {
    let rows: Vec<XrayFluxRow> = client.get_json(XRAY_FLUX).await?;
    rows.into_iter()
        .rev()
        .find(|r| r.energy.as_deref() == Some("0.1-0.8nm"))
        .and_then(|r| r.flux)
        .ok_or_else(|| FetchError::UnexpectedShape("no long-band flux reading found".into()))
}

#[derive(Debug, Deserialize)]
struct XrayFlareRow {
    flare_id: String,
    begin_time: DateTime<Utc>,
    max_class: Option<String>,
    current_class: Option<String>,
    #[serde(default)]
    active_region: Option<u32>,
}

pub async fn fetch_recent_flares(client: &FetchClient) -> FetchResult<Vec<FlareEvent>> {
    let rows: Vec<XrayFlareRow> = client.get_json(XRAY_FLARES).await?;
    Ok(rows
        .into_iter()
        .map(|r| FlareEvent {
            id: r.flare_id,
            begin_time: r.begin_time,
            class_type: r
                .max_class
                .or(r.current_class)
                .unwrap_or_else(|| "A0.0".to_string()),
            source_region: r.active_region,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct SolarRegionRow {
    region: u32,
    location: Option<String>,
    #[serde(default)]
    mag_class: Option<String>,
    #[serde(default)]
    number_spots: Option<u32>,
    #[serde(default)]
    c_flare_probability: Option<f64>,
    #[serde(default)]
    m_flare_probability: Option<f64>,
    #[serde(default)]
    x_flare_probability: Option<f64>,
    #[serde(default)]
    proton_probability: Option<f64>,
}

pub async fn fetch_active_regions(client: &FetchClient) -> FetchResult<Vec<ActiveRegion>> {
    let rows: Vec<SolarRegionRow> = client.get_json(SOLAR_REGIONS).await?;
    Ok(rows
        .into_iter()
        .map(|r| ActiveRegion {
            region_number: r.region,
            location: r.location.unwrap_or_default(),
            magnetic_class: r.mag_class.unwrap_or_default(),
            number_spots: r.number_spots.unwrap_or(0),
            flare_prob_c: r.c_flare_probability.unwrap_or(0.0),
            flare_prob_m: r.m_flare_probability.unwrap_or(0.0),
            flare_prob_x: r.x_flare_probability.unwrap_or(0.0),
            proton_prob: r.proton_probability.unwrap_or(0.0),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct AlertRow {
    product_id: String,
    issue_datetime: DateTime<Utc>,
    message: String,
}

pub async fn fetch_active_alerts(client: &FetchClient) -> FetchResult<Vec<ActiveAlertProduct>> {
    let rows: Vec<AlertRow> = client.get_json(ALERTS).await?;
    Ok(rows
        .into_iter()
        .map(|r| ActiveAlertProduct {
            id: r.product_id.clone(),
            product_id: r.product_id,
            issue_time: r.issue_datetime,
            message: r.message,
        })
        .collect())
}

pub async fn fetch_forecast_3day(client: &FetchClient) -> FetchResult<String> {
    client.get_text(FORECAST_3DAY).await
}
