//! Dwell alert records and store adapters.
//!
//! The original deployment wrote alert documents to a hosted document
//! database; here the store is a seam ([`crate::traits::AlertSink`]) with
//! two adapters: an in-memory vec for tests and a JSON-lines file that
//! keeps the one-document-per-alert shape.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::traits::{AlertSink, AlertStoreError};

/// A vehicle lingered inside a restricted zone past the dwell threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellAlert {
    pub zone_id: String,
    /// Seconds spent inside the zone when the alert fired.
    pub dwell_secs: f64,
    /// Configured threshold that was crossed.
    pub threshold_secs: f64,
    /// Vehicle position at the moment the alert fired.
    pub position: GeoPoint,
    /// Simulation clock (seconds since tracking started).
    pub elapsed_secs: f64,
}

/// Vec-backed sink for tests and in-process consumers.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    alerts: Vec<DwellAlert>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[DwellAlert] {
        &self.alerts
    }
}

impl AlertSink for MemoryAlertStore {
    fn record(&mut self, alert: &DwellAlert) -> Result<(), AlertStoreError> {
        self.alerts.push(alert.clone());
        Ok(())
    }
}

/// Appends one JSON document per alert to a file.
#[derive(Debug)]
pub struct JsonFileAlertStore {
    writer: BufWriter<File>,
}

impl JsonFileAlertStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AlertStoreError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl AlertSink for JsonFileAlertStore {
    fn record(&mut self, alert: &DwellAlert) -> Result<(), AlertStoreError> {
        serde_json::to_writer(&mut self.writer, alert)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
