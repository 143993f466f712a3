//! OpenMetrics text rendering of a scrape.

use prometheus_client::collector::Collector;
use prometheus_client::encoding::{text, DescriptorEncoder, EncodeMetric};
use prometheus_client::metrics::counter::ConstCounter;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;

use super::mapping::MetricKind;
use super::Observation;

pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Observations of one scrape, handed to the registry as a collector.
#[derive(Debug)]
struct Scrape(Vec<Observation>);

impl Collector for Scrape {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        for observation in &self.0 {
            let spec = observation.spec;
            match spec.kind {
                MetricKind::Gauge => {
                    let gauge = ConstGauge::new(observation.value);
                    let metric_encoder = encoder.encode_descriptor(spec.name, spec.help, None, gauge.metric_type())?;
                    gauge.encode(metric_encoder)?;
                }
                MetricKind::Counter => {
                    let counter = ConstCounter::new(observation.value);
                    let metric_encoder = encoder.encode_descriptor(spec.name, spec.help, None, counter.metric_type())?;
                    counter.encode(metric_encoder)?;
                }
            }
        }
        Ok(())
    }
}

/// Renders `observations` in the text exposition format. Counter samples get
/// the `_total` suffix OpenMetrics asks for.
pub fn render(observations: Vec<Observation>) -> Result<String, std::fmt::Error> {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(Scrape(observations)));

    let mut body = String::new();
    text::encode(&mut body, &registry)?;
    Ok(body)
}
