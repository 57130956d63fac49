//! NASA DONKI (Database Of Notifications, Knowledge, Information) feeds:
//! CMEs, geomagnetic storms, SEPs, HSS arrivals, interplanetary shocks,
//! and magnetopause crossings.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::types::{CmeEvent, HssEvent, IpsEvent, MpcEvent, SepEvent, StormEvent};

use super::{FetchClient, FetchResult};

const DONKI_BASE: &str = "https://api.nasa.gov/DONKI";
const LOOKBACK_DAYS: i64 = 7;

fn api_key() -> String {
    crate::config::get()
        .feed_headers
        .get("donki_api_key")
        .cloned()
        .unwrap_or_else(|| "DEMO_KEY".to_string())
}

fn window_url(endpoint: &str) -> String {
    let end = Utc::now();
    let start = end - Duration::days(LOOKBACK_DAYS);
    format!(
        "{DONKI_BASE}/{endpoint}?startDate={}&endDate={}&api_key={}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        api_key()
    )
}

#[derive(Debug, Clone, Deserialize)]
struct EnlilEntry {
    #[serde(rename = "isEarthGB", default)]
    is_earth_gb: bool,
    #[serde(rename = "estimatedShockArrivalTime")]
    estimated_shock_arrival_time: Option<DateTime<Utc>>,
    #[serde(rename = "kp_180", default)]
    kp_180: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CmeAnalysis {
    #[serde(rename = "isMostAccurate", default)]
    is_most_accurate: bool,
    #[serde(default)]
    speed: Option<f64>,
    #[serde(rename = "enlilList", default)]
    enlil_list: Option<Vec<EnlilEntry>>,
}

#[derive(Debug, Deserialize)]
struct CmeRow {
    #[serde(rename = "activityID")]
    activity_id: String,
    #[serde(rename = "startTime")]
    start_time: DateTime<Utc>,
    #[serde(rename = "cmeAnalyses", default)]
    cme_analyses: Option<Vec<CmeAnalysis>>,
}

pub async fn fetch_cmes(client: &FetchClient) -> FetchResult<Vec<CmeEvent>> {
    let rows: Vec<CmeRow> = client.get_json(&window_url("CME")).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let analyses = row.cme_analyses.unwrap_or_default();
            let analysis = analyses.iter().find(|a| a.is_most_accurate).or(analyses.first());
            let speed_km_s = analysis.and_then(|a| a.speed);
            let enlil = analysis
                .and_then(|a| a.enlil_list.clone())
                .unwrap_or_default();
            let is_earth_directed = enlil.iter().any(|e| e.is_earth_gb);
            let predicted_kp = enlil
                .iter()
                .filter_map(|e| e.kp_180)
                .fold(None, |acc: Option<f64>, v| {
                    Some(acc.map_or(v, |a| a.max(v)))
                });
            let predicted_arrival = enlil
                .iter()
                .find(|e| e.is_earth_gb)
                .and_then(|e| e.estimated_shock_arrival_time);
            CmeEvent {
                id: row.activity_id,
                start_time: row.start_time,
                predicted_kp,
                predicted_arrival,
                is_earth_directed,
                speed_km_s,
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct KpIndexEntry {
    #[serde(rename = "kpIndex")]
    kp_index: f64,
    #[serde(rename = "observedTime")]
    observed_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GstRow {
    #[serde(rename = "gstID")]
    gst_id: String,
    #[serde(rename = "allKpIndex", default)]
    all_kp_index: Vec<KpIndexEntry>,
}

pub async fn fetch_storms(client: &FetchClient) -> FetchResult<Vec<StormEvent>> {
    let rows: Vec<GstRow> = client.get_json(&window_url("GST")).await?;
    Ok(rows
        .into_iter()
        .flat_map(|row| {
            row.all_kp_index.into_iter().enumerate().map(move |(i, k)| StormEvent {
                id: format!("{}-{i}", row.gst_id),
                time_tag: k.observed_time,
                kp_index: k.kp_index,
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct SepRow {
    #[serde(rename = "sepID")]
    sep_id: String,
    #[serde(rename = "eventTime")]
    event_time: DateTime<Utc>,
}

pub async fn fetch_seps(client: &FetchClient) -> FetchResult<Vec<SepEvent>> {
    let rows: Vec<SepRow> = client.get_json(&window_url("SEP")).await?;
    Ok(rows
        .into_iter()
        .map(|r| SepEvent {
            id: r.sep_id,
            event_time: r.event_time,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct HssRow {
    #[serde(rename = "hssID")]
    hss_id: String,
    #[serde(rename = "eventTime")]
    event_time: DateTime<Utc>,
}

pub async fn fetch_hss(client: &FetchClient) -> FetchResult<Vec<HssEvent>> {
    let rows: Vec<HssRow> = client.get_json(&window_url("HSS")).await?;
    Ok(rows
        .into_iter()
        .map(|r| HssEvent {
            id: r.hss_id,
            arrival_time: r.event_time,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct IpsRow {
    #[serde(rename = "activityID")]
    activity_id: String,
    #[serde(rename = "eventTime")]
    event_time: DateTime<Utc>,
}

pub async fn fetch_ips(client: &FetchClient) -> FetchResult<Vec<IpsEvent>> {
    let rows: Vec<IpsRow> = client.get_json(&window_url("IPS")).await?;
    Ok(rows
        .into_iter()
        .map(|r| IpsEvent {
            id: r.activity_id,
            time_tag: r.event_time,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct MpcRow {
    #[serde(rename = "activityID")]
    activity_id: String,
    #[serde(rename = "eventTime")]
    event_time: DateTime<Utc>,
}

pub async fn fetch_mpc(client: &FetchClient) -> FetchResult<Vec<MpcEvent>> {
    let rows: Vec<MpcRow> = client.get_json(&window_url("MPC")).await?;
    Ok(rows
        .into_iter()
        .map(|r| MpcEvent {
            id: r.activity_id,
            time_tag: r.event_time,
        })
        .collect())
}
