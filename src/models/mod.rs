use serde::{Deserialize, Deserializer, Serialize};

/// The part of the Envoy `/production.json?details=1` document we translate.
///
/// The device also reports a `storage` array (AC batteries); it has no
/// metric family and is left to serde's unknown-field handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionReport {
    pub production: Vec<Section>,
    pub consumption: Vec<Section>,
}

/// One entry of the `production` or `consumption` arrays.
///
/// Production entries are told apart by `type`, consumption entries by
/// `measurementType`. Not every field is populated for every entry, absent
/// and `null` values read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: String,
    pub measurement_type: Option<String>,
    /// Number of devices (micro inverters or meters) reporting
    #[serde(deserialize_with = "null_as_zero")]
    pub active_count: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub wh_lifetime: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub wh_today: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub w_now: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub rms_current: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub rms_voltage: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub react_pwr: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub apprnt_pwr: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub pwr_factor: f64,
}

// Some firmware sends `null` for readings it has no value for
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}
