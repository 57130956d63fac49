//! Snapshot assembler — spec.md §4.B.
//!
//! Pure function: combines one tick's [`FetchSet`] with the previous
//! [`CheckerState`] into a [`Snapshot`]. Never performs I/O; every
//! substitution rule for a failed source lives here.

use chrono::Utc;

use crate::fetchers::FetchSet;
use crate::types::{CheckerState, GScale, RScale, SScale, Snapshot};

/// Coarse R-scale bucket from X-ray flux, W/m² (NOAA convention).
fn r_scale_from_flux(flux: f64) -> RScale {
    if flux >= 2e-3 {
        RScale::R5
    } else if flux >= 1e-3 {
        RScale::R4
    } else if flux >= 1e-4 {
        RScale::R3
    } else if flux >= 5e-5 {
        RScale::R2
    } else if flux >= 1e-5 {
        RScale::R1
    } else {
        RScale::R0
    }
}

/// Coarse S-scale bucket; without a dedicated proton-flux feed this is
/// derived from the highest active-region proton probability, a rough
/// stand-in the evaluator does not otherwise rely on.
fn s_scale_from_proton_prob(max_proton_prob: f64) -> SScale {
    if max_proton_prob >= 90.0 {
        SScale::S3
    } else if max_proton_prob >= 50.0 {
        SScale::S2
    } else if max_proton_prob >= 10.0 {
        SScale::S1
    } else {
        SScale::S0
    }
}

pub fn assemble(set: FetchSet, previous: &CheckerState) -> Snapshot {
    let now = Utc::now();

    let kp = set.kp.unwrap_or(previous.last_kp);
    let kp_forecast_24h = set.kp_forecast_24h.unwrap_or_default();
    let g_scale = Some(GScale::from_kp(kp));

    let solar_wind = set.solar_wind.ok();
    let magnetic_field = set.magnetic_field.ok();

    let xray_flux = set.xray_flux.ok();
    let r_scale = xray_flux.map(r_scale_from_flux);

    let recent_flares = set.recent_flares.unwrap_or_default();
    let latest_flare = recent_flares.last().cloned();

    let cmes = set.cmes.unwrap_or_default();
    let earth_directed_cmes: Vec<_> = cmes.iter().filter(|c| c.is_earth_directed).cloned().collect();

    let recent_storms = set.recent_storms.unwrap_or_default();
    let seps = set.seps.unwrap_or_default();
    let hss = set.hss.unwrap_or_default();
    let ips = set.ips.unwrap_or_default();
    let mpc = set.mpc.unwrap_or_default();

    let active_regions = set.active_regions.unwrap_or_default();
    let max_proton_prob = active_regions
        .iter()
        .map(|r| r.proton_prob)
        .fold(0.0_f64, f64::max);
    let s_scale = Some(s_scale_from_proton_prob(max_proton_prob));

    let active_alerts = set.active_alerts.unwrap_or_default();
    let forecast_3day = set.forecast_3day.ok();

    Snapshot {
        timestamp: now,
        fetched_at: now,
        kp,
        kp_forecast_24h,
        g_scale,
        xray_flux,
        latest_flare,
        s_scale,
        r_scale,
        solar_wind,
        magnetic_field,
        cmes,
        earth_directed_cmes,
        recent_flares,
        recent_storms,
        seps,
        hss,
        ips,
        mpc,
        active_alerts,
        forecast_3day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::FetchError;

    fn empty_set() -> FetchSet {
        FetchSet {
            kp: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            kp_forecast_24h: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            solar_wind: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            magnetic_field: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            xray_flux: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            recent_flares: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            cmes: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            recent_storms: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            seps: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            hss: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            ips: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            mpc: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            active_regions: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            active_alerts: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
            forecast_3day: Err(FetchError::Timeout(std::time::Duration::from_secs(1))),
        }
    }

    #[test]
    fn falls_back_to_last_kp_when_fetch_fails() {
        let mut previous = CheckerState::default();
        previous.last_kp = 3.7;
        let snapshot = assemble(empty_set(), &previous);
        assert_eq!(snapshot.kp, 3.7);
        assert!(snapshot.solar_wind.is_none());
        assert!(snapshot.earth_directed_cmes.is_empty());
    }

    #[test]
    fn latest_flare_is_last_of_recent_flares() {
        let mut set = empty_set();
        set.recent_flares = Ok(vec![
            crate::types::FlareEvent {
                id: "f1".into(),
                begin_time: Utc::now(),
                class_type: "C1.0".into(),
                source_region: None,
            },
            crate::types::FlareEvent {
                id: "f2".into(),
                begin_time: Utc::now(),
                class_type: "M3.0".into(),
                source_region: None,
            },
        ]);
        let snapshot = assemble(set, &CheckerState::default());
        assert_eq!(snapshot.latest_flare.unwrap().id, "f2");
    }
}
