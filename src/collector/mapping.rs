//! Metric schema of the exporter.
//!
//! Each section kind owns a fixed list of metrics. The collector only looks
//! kinds up here, adding a metric means adding a row.

use std::fmt;

use crate::models::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Latest reading, replaces the previous value
    Gauge,
    /// Lifetime total kept monotonic by the device
    Counter,
}

pub struct MetricSpec {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub extract: fn(&Section) -> f64,
}

impl fmt::Debug for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Report sections that produce metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `production[type = "inverters"]`, the sum over all micro inverters
    Inverters,
    /// `production[type = "eim"]`, the production CT
    ProductionMeter,
    /// `consumption[measurementType = "total-consumption"]`
    TotalConsumption,
    /// `consumption[measurementType = "net-consumption"]`, exchange with the grid
    NetConsumption,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Inverters,
        SectionKind::ProductionMeter,
        SectionKind::TotalConsumption,
        SectionKind::NetConsumption,
    ];

    pub fn from_production_tag(tag: &str) -> Option<Self> {
        match tag {
            "inverters" => Some(SectionKind::Inverters),
            "eim" => Some(SectionKind::ProductionMeter),
            _ => None,
        }
    }

    pub fn from_consumption_tag(tag: &str) -> Option<Self> {
        match tag {
            "total-consumption" => Some(SectionKind::TotalConsumption),
            "net-consumption" => Some(SectionKind::NetConsumption),
            _ => None,
        }
    }

    pub fn metrics(self) -> &'static [MetricSpec] {
        match self {
            SectionKind::Inverters => &INVERTER_METRICS,
            SectionKind::ProductionMeter => &PRODUCTION_METRICS,
            SectionKind::TotalConsumption => &CONSUMPTION_METRICS,
            SectionKind::NetConsumption => &GRID_METRICS,
        }
    }
}

/// Every metric the exporter can emit, in table order
pub fn all_metrics() -> impl Iterator<Item = &'static MetricSpec> {
    SectionKind::ALL.into_iter().flat_map(|kind| kind.metrics().iter())
}

fn active_count(s: &Section) -> f64 {
    s.active_count
}

fn wh_lifetime(s: &Section) -> f64 {
    s.wh_lifetime
}

fn wh_today(s: &Section) -> f64 {
    s.wh_today
}

fn w_now(s: &Section) -> f64 {
    s.w_now
}

fn rms_current(s: &Section) -> f64 {
    s.rms_current
}

fn rms_voltage(s: &Section) -> f64 {
    s.rms_voltage
}

fn react_pwr(s: &Section) -> f64 {
    s.react_pwr
}

fn apprnt_pwr(s: &Section) -> f64 {
    s.apprnt_pwr
}

fn pwr_factor(s: &Section) -> f64 {
    s.pwr_factor
}

static INVERTER_METRICS: [MetricSpec; 3] = [
    MetricSpec {
        name: "envoy_active_panel_count",
        help: "Number of panels producing power",
        kind: MetricKind::Gauge,
        extract: active_count,
    },
    MetricSpec {
        name: "envoy_production_inverter_watthours",
        help: "Amount of watthours produced per inverter",
        kind: MetricKind::Counter,
        extract: wh_lifetime,
    },
    MetricSpec {
        name: "envoy_production_inverter_watts",
        help: "Amount of watts being produced per inverter",
        kind: MetricKind::Gauge,
        extract: w_now,
    },
];

/// The eight metrics of a metering CT, named `envoy_<prefix>_*`.
macro_rules! meter_metrics {
    ($prefix: literal, $flow: literal) => {
        [
            MetricSpec {
                name: concat!("envoy_", $prefix, "_rms_current_amps"),
                help: concat!("RMS current ", $flow, " in amps"),
                kind: MetricKind::Gauge,
                extract: rms_current,
            },
            MetricSpec {
                name: concat!("envoy_", $prefix, "_rms_voltage_volts"),
                help: concat!("RMS voltage of the metered line ", $flow, " in volts"),
                kind: MetricKind::Gauge,
                extract: rms_voltage,
            },
            MetricSpec {
                name: concat!("envoy_", $prefix, "_reactive_power_watts"),
                help: concat!("Reactive power ", $flow),
                kind: MetricKind::Gauge,
                extract: react_pwr,
            },
            MetricSpec {
                name: concat!("envoy_", $prefix, "_apparent_power_watts"),
                help: concat!("Apparent power ", $flow),
                kind: MetricKind::Gauge,
                extract: apprnt_pwr,
            },
            MetricSpec {
                name: concat!("envoy_", $prefix, "_power_factor"),
                help: concat!("Power factor ", $flow),
                kind: MetricKind::Gauge,
                extract: pwr_factor,
            },
            MetricSpec {
                name: concat!("envoy_", $prefix, "_watthours"),
                help: concat!("Amount of watthours ", $flow),
                kind: MetricKind::Counter,
                extract: wh_lifetime,
            },
            // For net-consumption this has only ever been seen at 0. The
            // mapping is kept as is until it is checked against a live device.
            MetricSpec {
                name: concat!("envoy_", $prefix, "_watthours_today"),
                help: concat!("Amount of watthours ", $flow, " today"),
                kind: MetricKind::Counter,
                extract: wh_today,
            },
            MetricSpec {
                name: concat!("envoy_", $prefix, "_watts"),
                help: concat!("Amount of watts ", $flow),
                kind: MetricKind::Gauge,
                extract: w_now,
            },
        ]
    };
}

static PRODUCTION_METRICS: [MetricSpec; 8] = meter_metrics!("production", "produced");
static CONSUMPTION_METRICS: [MetricSpec; 8] = meter_metrics!("consumption", "consumed");
static GRID_METRICS: [MetricSpec; 8] = meter_metrics!("consumption_grid", "consumed from the grid");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tags() {
        assert_eq!(SectionKind::from_production_tag("inverters"), Some(SectionKind::Inverters));
        assert_eq!(SectionKind::from_production_tag("eim"), Some(SectionKind::ProductionMeter));
        assert_eq!(SectionKind::from_production_tag("rgms"), None);
        assert_eq!(SectionKind::from_production_tag("total-consumption"), None);

        assert_eq!(SectionKind::from_consumption_tag("total-consumption"), Some(SectionKind::TotalConsumption));
        assert_eq!(SectionKind::from_consumption_tag("net-consumption"), Some(SectionKind::NetConsumption));
        assert_eq!(SectionKind::from_consumption_tag("eim"), None);
        assert_eq!(SectionKind::from_consumption_tag("production"), None);
    }

    #[test]
    fn test_schema_is_complete() {
        let names: Vec<&str> = all_metrics().map(|m| m.name).collect();
        assert_eq!(names.len(), 27);

        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len(), "metric names must be unique");

        for name in [
            "envoy_active_panel_count",
            "envoy_production_inverter_watts",
            "envoy_production_inverter_watthours",
            "envoy_production_watts",
            "envoy_production_watthours",
            "envoy_production_watthours_today",
            "envoy_production_rms_current_amps",
            "envoy_production_rms_voltage_volts",
            "envoy_production_reactive_power_watts",
            "envoy_production_apparent_power_watts",
            "envoy_production_power_factor",
            "envoy_consumption_watts",
            "envoy_consumption_watthours_today",
            "envoy_consumption_power_factor",
            "envoy_consumption_grid_watts",
            "envoy_consumption_grid_watthours",
            "envoy_consumption_grid_rms_voltage_volts",
        ] {
            assert!(unique.contains(name), "{name} missing from the schema");
        }
    }

    #[test]
    fn test_counters() {
        let counters: Vec<&str> = all_metrics()
            .filter(|m| m.kind == MetricKind::Counter)
            .map(|m| m.name)
            .collect();

        assert_eq!(
            counters,
            vec![
                "envoy_production_inverter_watthours",
                "envoy_production_watthours",
                "envoy_production_watthours_today",
                "envoy_consumption_watthours",
                "envoy_consumption_watthours_today",
                "envoy_consumption_grid_watthours",
                "envoy_consumption_grid_watthours_today",
            ]
        );
    }

    #[test]
    fn test_extract() {
        let section = Section {
            wh_lifetime: 1.0,
            wh_today: 2.0,
            w_now: 3.0,
            rms_current: 4.0,
            rms_voltage: 5.0,
            react_pwr: 6.0,
            apprnt_pwr: 7.0,
            pwr_factor: 8.0,
            ..Default::default()
        };

        let values: Vec<(&str, f64)> = SectionKind::NetConsumption
            .metrics()
            .iter()
            .map(|m| (m.name, (m.extract)(&section)))
            .collect();

        assert_eq!(
            values,
            vec![
                ("envoy_consumption_grid_rms_current_amps", 4.0),
                ("envoy_consumption_grid_rms_voltage_volts", 5.0),
                ("envoy_consumption_grid_reactive_power_watts", 6.0),
                ("envoy_consumption_grid_apparent_power_watts", 7.0),
                ("envoy_consumption_grid_power_factor", 8.0),
                ("envoy_consumption_grid_watthours", 1.0),
                ("envoy_consumption_grid_watthours_today", 2.0),
                ("envoy_consumption_grid_watts", 3.0),
            ]
        );
    }
}
