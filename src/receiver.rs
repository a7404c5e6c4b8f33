// Ground receiver reference data

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geodesy::Ellipsoid;

/// A fixed ground receiver as supplied by the station registry.
///
/// Coordinates are optional so that a malformed registry entry can be
/// loaded and skipped instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverStation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub alt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ReceiverStation {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, alt: f64) -> Self {
        ReceiverStation {
            id: id.into(),
            lat: Some(lat),
            lon: Some(lon),
            alt: Some(alt),
            name: None,
        }
    }

    /// Returns [lat, lon, alt] if all coordinates are present and finite.
    /// A missing altitude is not tolerated: the solver needs full 3D positions.
    pub fn position_llh(&self) -> Option<[f64; 3]> {
        match (self.lat, self.lon, self.alt) {
            (Some(lat), Some(lon), Some(alt))
                if lat.is_finite() && lon.is_finite() && alt.is_finite() =>
            {
                Some([lat, lon, alt])
            }
            _ => None,
        }
    }
}

/// A receiver with its ECEF position precomputed
#[derive(Debug, Clone)]
pub struct Receiver {
    pub id: String,
    /// [lat, lon, alt] in degrees, degrees, meters
    pub position_llh: [f64; 3],
    /// ECEF [x, y, z] in meters
    pub position: [f64; 3],
}

impl Receiver {
    fn from_station(station: &ReceiverStation, ellipsoid: &Ellipsoid) -> Option<Self> {
        let position_llh = station.position_llh()?;
        let (x, y, z) = ellipsoid.llh2ecef(position_llh[0], position_llh[1], position_llh[2]);
        Some(Receiver {
            id: station.id.clone(),
            position_llh,
            position: [x, y, z],
        })
    }
}

/// Receivers indexed by id. Stations without usable coordinates are left out.
#[derive(Debug, Clone, Default)]
pub struct ReceiverSet {
    receivers: HashMap<String, Receiver>,
}

impl ReceiverSet {
    pub fn new(stations: &[ReceiverStation], ellipsoid: &Ellipsoid) -> Self {
        let mut receivers = HashMap::with_capacity(stations.len());
        for station in stations {
            if station.id.is_empty() {
                debug!("Skipping receiver without id");
                continue;
            }
            match Receiver::from_station(station, ellipsoid) {
                Some(receiver) => {
                    receivers.insert(receiver.id.clone(), receiver);
                }
                None => debug!(receiver_id = %station.id, "Skipping receiver without coordinates"),
            }
        }
        ReceiverSet { receivers }
    }

    pub fn get(&self, id: &str) -> Option<&Receiver> {
        self.receivers.get(id)
    }

    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }
}
