use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{DeviceClient, DeviceError};
use crate::models::{ProductionReport, Section};

enum Answer {
    Report(ProductionReport),
    Rejected,
    Stalled,
}

/// Stand-in for the Envoy that answers every fetch the same way.
pub(crate) struct StaticClient {
    answer: Answer,
    fetches: AtomicUsize,
}

impl StaticClient {
    pub(crate) fn new(report: ProductionReport) -> Self {
        Self::with_answer(Answer::Report(report))
    }

    /// Behaves like a device that no longer accepts the token
    pub(crate) fn rejecting() -> Self {
        Self::with_answer(Answer::Rejected)
    }

    /// Never answers
    pub(crate) fn stalled() -> Self {
        Self::with_answer(Answer::Stalled)
    }

    fn with_answer(answer: Answer) -> Self {
        StaticClient {
            answer,
            fetches: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DeviceClient for StaticClient {
    async fn fetch_production(&self) -> Result<ProductionReport, DeviceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Report(report) => Ok(report.clone()),
            Answer::Rejected => Err(DeviceError::Status(StatusCode::UNAUTHORIZED)),
            Answer::Stalled => std::future::pending().await,
        }
    }
}

pub(crate) fn production_section(tag: &str) -> Section {
    Section {
        section_type: tag.to_string(),
        ..Default::default()
    }
}

pub(crate) fn consumption_section(measurement_type: &str) -> Section {
    Section {
        section_type: "eim".to_string(),
        measurement_type: Some(measurement_type.to_string()),
        ..Default::default()
    }
}

/// Meter section whose fields all carry distinct values, offset by `base`
pub(crate) fn meter_values(mut section: Section, base: f64) -> Section {
    section.active_count = 1.0;
    section.wh_lifetime = base + 1.0;
    section.wh_today = base + 2.0;
    section.w_now = base + 3.0;
    section.rms_current = base + 4.0;
    section.rms_voltage = base + 5.0;
    section.react_pwr = base + 6.0;
    section.apprnt_pwr = base + 7.0;
    section.pwr_factor = base + 8.0;
    section
}
