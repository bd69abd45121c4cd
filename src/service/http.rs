use super::{types::*, ScanService};
use crate::{config::Config, error::ApiError, util::join_url};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub struct HttpScanService {
    http: Client,
    base_url: String,
}

impl HttpScanService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let base_url = cfg.server.resolve_base_url();
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(cfg.server.connect_timeout_seconds))
            .timeout(Duration::from_secs(cfg.server.request_timeout_seconds))
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn get_json<O: DeserializeOwned>(&self, path: &str) -> Result<O, ApiError> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = self.http.get(&url).send().map_err(transport)?;
        decode(resp)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn decode<O: DeserializeOwned>(resp: Response) -> Result<O, ApiError> {
    let status = resp.status();
    let body = resp.text().map_err(transport)?;
    if !status.is_success() {
        return Err(error_from(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn error_from(status: StatusCode, body: &str) -> ApiError {
    // FastAPI-style error bodies carry the message under "detail".
    let detail = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.detail)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        StatusCode::BAD_REQUEST => ApiError::Validation(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::CONFLICT => ApiError::Conflict(detail),
        _ => ApiError::Unexpected {
            status: status.as_u16(),
            detail,
        },
    }
}

/// The backend signals "already restored/deleted" on the quarantine action
/// endpoints as a plain 400, so validation errors there mean conflict.
fn conflict_on_validation(err: ApiError) -> ApiError {
    match err {
        ApiError::Validation(msg) => ApiError::Conflict(msg),
        other => other,
    }
}

impl ScanService for HttpScanService {
    fn start_scan(
        &self,
        directory_path: &str,
        scan_type: ScanType,
    ) -> Result<ScanStarted, ApiError> {
        let url = self.url("/api/scan/start");
        debug!("POST {url}");
        let body = serde_json::json!({
            "directory_path": directory_path,
            "scan_type": scan_type,
        });
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(transport)?;
        decode(resp)
    }

    fn scan_status(&self, scan_id: &str) -> Result<ScanJob, ApiError> {
        self.get_json(&format!("/api/scan/status/{scan_id}"))
    }

    fn scan_results(&self, scan_id: &str) -> Result<Vec<ScanResultEntry>, ApiError> {
        let env: ResultsEnvelope = self.get_json(&format!("/api/scan/results/{scan_id}"))?;
        Ok(env.results)
    }

    fn scan_history(&self) -> Result<Vec<ScanSummary>, ApiError> {
        let env: HistoryEnvelope = self.get_json("/api/scans/history")?;
        Ok(env.scans)
    }

    fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json("/api/dashboard/stats")
    }

    fn quarantine_list(&self) -> Result<Vec<QuarantineEntry>, ApiError> {
        let env: QuarantineEnvelope = self.get_json("/api/quarantine")?;
        Ok(env.quarantine_items)
    }

    fn restore_quarantine(&self, quarantine_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/quarantine/restore/{quarantine_id}"));
        debug!("POST {url}");
        let resp = self.http.post(&url).send().map_err(transport)?;
        decode::<serde_json::Value>(resp)
            .map(|_| ())
            .map_err(conflict_on_validation)
    }

    fn delete_quarantine(&self, quarantine_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/quarantine/delete/{quarantine_id}"));
        debug!("DELETE {url}");
        let resp = self.http.delete(&url).send().map_err(transport)?;
        decode::<serde_json::Value>(resp)
            .map(|_| ())
            .map_err(conflict_on_validation)
    }

    fn health(&self) -> Result<Health, ApiError> {
        self.get_json("/api/health")
    }
}
