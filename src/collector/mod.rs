use log::{debug, error};
use std::sync::Arc;
use std::time::Duration;

use crate::envoy::{DeviceClient, DeviceError, DeviceHandle};
use crate::models::ProductionReport;

pub mod exposition;
pub mod mapping;

use mapping::{MetricKind, MetricSpec, SectionKind};

/// One value of one metric for a single scrape.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub spec: &'static MetricSpec,
    pub value: f64,
}

impl Observation {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn kind(&self) -> MetricKind {
        self.spec.kind
    }
}

impl PartialEq for Observation {
    fn eq(&self, other: &Self) -> bool {
        self.spec.name == other.spec.name && self.value.to_bits() == other.value.to_bits()
    }
}

/// Scrape side of the exporter, bound to the device behind `handle`.
pub struct TelemetryCollector<C> {
    handle: Arc<DeviceHandle<C>>,
    timeout: Duration,
}

impl<C: DeviceClient> TelemetryCollector<C> {
    pub fn new(handle: Arc<DeviceHandle<C>>, timeout: Duration) -> Self {
        TelemetryCollector { handle, timeout }
    }

    pub fn target(&self) -> &str {
        self.handle.target()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_connected()
    }

    /// All metrics this collector may emit, without values
    pub fn describe(&self) -> Vec<&'static MetricSpec> {
        mapping::all_metrics().collect()
    }

    /// Fetches a fresh report and translates it.
    ///
    /// Any failure to get the report is logged and yields no observations at
    /// all. The next scrape simply tries again.
    pub async fn collect(&self) -> Vec<Observation> {
        let report = match self.fetch().await {
            Ok(report) => report,
            Err(e) => {
                error!("failed to get production data from device {}: {}", self.target(), e);
                return Vec::new();
            }
        };

        let observations = translate(&report);
        debug!(
            "[{}] {} production and {} consumption sections gave {} observations",
            self.target(),
            report.production.len(),
            report.consumption.len(),
            observations.len()
        );
        observations
    }

    async fn fetch(&self) -> Result<ProductionReport, DeviceError> {
        let client = self.handle.get().await?;
        match tokio::time::timeout(self.timeout, client.fetch_production()).await {
            Ok(result) => result,
            Err(_) => Err(DeviceError::Timeout(self.timeout)),
        }
    }
}

/// Maps every known section of `report` to its metric family.
///
/// Observations keep the order of the sections in the report and the table
/// order within a section. Sections with unknown tags are skipped, and so is
/// every section after the first of its kind: the families are unlabeled and
/// a second set of samples would make the whole exposition invalid.
pub fn translate(report: &ProductionReport) -> Vec<Observation> {
    let production = report
        .production
        .iter()
        .filter_map(|s| SectionKind::from_production_tag(&s.section_type).map(|kind| (kind, s)));

    let consumption = report.consumption.iter().filter_map(|s| {
        s.measurement_type
            .as_deref()
            .and_then(SectionKind::from_consumption_tag)
            .map(|kind| (kind, s))
    });

    let mut seen: Vec<SectionKind> = Vec::with_capacity(SectionKind::ALL.len());
    let mut observations = Vec::new();
    for (kind, section) in production.chain(consumption) {
        if seen.contains(&kind) {
            debug!("Skipping repeated {:?} section", kind);
            continue;
        }
        seen.push(kind);

        observations.extend(kind.metrics().iter().map(|spec| Observation {
            spec,
            value: (spec.extract)(section),
        }));
    }
    observations
}
