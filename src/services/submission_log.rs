use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::models::booking::{BookingPayload, DispatchOutcome};

const HEADERS: [&str; 11] = [
    "recorded_at",
    "outcome",
    "full_name",
    "email",
    "phone_number",
    "pet_type",
    "service",
    "appointment_date",
    "appointment_time",
    "subject",
    "message",
];

// One dispatched booking as stored in the CSV ledger
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub recorded_at: String, // RFC 3339
    pub outcome: DispatchOutcome,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pet_type: String,
    pub service: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub subject: String,
    pub message: String,
}

impl SubmissionRecord {
    pub fn new(payload: &BookingPayload, outcome: DispatchOutcome) -> Self {
        Self {
            recorded_at: Utc::now().to_rfc3339(),
            outcome,
            full_name: payload.full_name.clone(),
            email: payload.email.clone(),
            phone_number: payload.phone_number.clone(),
            pet_type: payload.pet_type.clone(),
            service: payload.service.clone(),
            appointment_date: payload.appointment_date.clone(),
            appointment_time: payload.appointment_time.clone(),
            subject: payload.subject.clone(),
            message: payload.message.clone(),
        }
    }
}

/// Append-only CSV record of every booking handed to the intake endpoint.
///
/// Transport failures are invisible to the visitor, so this file is the
/// only place a lost booking can be recovered from.
pub struct SubmissionLog {
    csv_path: String,
    file_mutex: Mutex<()>,
}

impl SubmissionLog {
    pub fn new(csv_path: &str) -> Result<Self, String> {
        // Create the CSV file if it doesn't exist with proper headers
        if !Path::new(csv_path).exists() {
            info!("Creating new submission log at {}", csv_path);

            let file = File::create(csv_path)
                .map_err(|e| format!("Failed to create submission log: {}", e))?;

            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer
                .write_record(HEADERS)
                .map_err(|e| format!("Failed to write headers: {}", e))?;
            writer
                .flush()
                .map_err(|e| format!("Failed to flush headers: {}", e))?;
        }

        Ok(Self {
            csv_path: csv_path.to_string(),
            file_mutex: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &str {
        &self.csv_path
    }

    pub fn record(&self, payload: &BookingPayload, outcome: DispatchOutcome) -> Result<(), String> {
        self.write_record(&SubmissionRecord::new(payload, outcome))
    }

    // Read every record in insertion order
    pub fn read_all(&self) -> Result<Vec<SubmissionRecord>, String> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| format!("Failed to acquire mutex: {}", e))?;

        let file = File::open(&self.csv_path)
            .map_err(|e| format!("Failed to open submission log: {}", e))?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let mut records = Vec::new();

        for result in reader.deserialize::<SubmissionRecord>() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable submission log row: {}", e),
            }
        }

        Ok(records)
    }

    // Helper to write a record to the CSV
    fn write_record(&self, record: &SubmissionRecord) -> Result<(), String> {
        let _lock = self
            .file_mutex
            .lock()
            .map_err(|e| format!("Failed to acquire mutex: {}", e))?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| format!("Failed to open submission log: {}", e))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer
            .serialize(record)
            .map_err(|e| format!("Failed to serialize record: {}", e))?;

        writer
            .flush()
            .map_err(|e| format!("Failed to flush writer: {}", e))?;

        info!(
            "Logged booking for {} on {} ({})",
            record.email,
            record.appointment_date,
            record.outcome.as_str()
        );

        Ok(())
    }
}

/// Open the ledger at `SUBMISSION_LOG_PATH` (default `submissions.csv`).
/// An empty path disables it.
pub fn create_submission_log() -> Result<Option<Arc<SubmissionLog>>, String> {
    let csv_path =
        std::env::var("SUBMISSION_LOG_PATH").unwrap_or_else(|_| "submissions.csv".to_string());

    if csv_path.trim().is_empty() {
        info!("Submission log disabled");
        return Ok(None);
    }

    if let Some(dir) = Path::new(&csv_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create submission log directory: {}", e))?;
        }
    }

    SubmissionLog::new(&csv_path).map(|log| Some(Arc::new(log)))
}
