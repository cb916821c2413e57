use std::time::Duration;

use url::Url;

use emissions_core::{JobKey, MapPayload, StatusReport, SummaryPayload};

use crate::error::{map_reqwest_error, ServiceError};
use crate::service::{ExistsReply, JobService, StartReply};

/// Connection settings for the remote job service.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed client for the emissions backend.
///
/// Day keys address path-parameter endpoints (`/co2/summary/{date}`),
/// range keys the query-parameter variants (`/co2/range/summary`).
#[derive(Debug, Clone)]
pub struct HttpJobService {
    base: Url,
    client: reqwest::Client,
}

impl HttpJobService {
    pub fn new(base: Url, settings: HttpSettings) -> Result<Self, ServiceError> {
        let mut base = base;
        // Url::join treats a base without a trailing slash as a file,
        // which would drop the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, key: &JobKey, day_path: &str, range_path: &str) -> Result<Url, ServiceError> {
        let mut url = match key {
            JobKey::Day(date) => self.base.join(&format!("{day_path}/{date}")),
            JobKey::Range { .. } => self.base.join(range_path),
        }
        .map_err(|err| ServiceError::InvalidUrl(err.to_string()))?;
        if let JobKey::Range { start, end } = key {
            url.query_pairs_mut()
                .append_pair("start", &start.to_string())
                .append_pair("end", &end.to_string());
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }

    /// GET that treats 404 as a valid "not found" answer.
    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, ServiceError> {
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response)?;
        response.json::<T>().await.map(Some).map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl JobService for HttpJobService {
    async fn exists(
        &self,
        key: &JobKey,
        include_summary: bool,
    ) -> Result<ExistsReply, ServiceError> {
        let mut url = self.endpoint(key, "co2/exists", "co2/range/exists")?;
        if include_summary {
            url.query_pairs_mut().append_pair("include_summary", "true");
        }
        self.get_json(url).await
    }

    async fn start(&self, key: &JobKey) -> Result<StartReply, ServiceError> {
        let url = self.endpoint(key, "co2/ingest", "co2/range/ingest")?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        response.json::<StartReply>().await.map_err(map_reqwest_error)
    }

    async fn status(&self, key: &JobKey) -> Result<StatusReport, ServiceError> {
        let url = match key {
            JobKey::Day(date) => self
                .base
                .join(&format!("co2/ingest/{date}/status"))
                .map_err(|err| ServiceError::InvalidUrl(err.to_string()))?,
            JobKey::Range { .. } => self.endpoint(key, "", "co2/range/ingest/status")?,
        };
        self.get_json(url).await
    }

    async fn cancel(&self, key: &JobKey) -> Result<(), ServiceError> {
        let url = match key {
            JobKey::Day(date) => self
                .base
                .join(&format!("co2/ingest/{date}/cancel"))
                .map_err(|err| ServiceError::InvalidUrl(err.to_string()))?,
            JobKey::Range { .. } => self.endpoint(key, "", "co2/range/ingest/cancel")?,
        };
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        check_status(response)?;
        Ok(())
    }

    async fn load_summary(&self, key: &JobKey) -> Result<Option<SummaryPayload>, ServiceError> {
        let url = self.endpoint(key, "co2/summary", "co2/range/summary")?;
        self.get_optional(url).await
    }

    async fn load_map(&self, key: &JobKey) -> Result<Option<MapPayload>, ServiceError> {
        if key.is_range() {
            // The backend has no aggregated map payload.
            return Ok(None);
        }
        let url = self.endpoint(key, "co2/map", "")?;
        self.get_optional(url).await
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ServiceError::Http {
            status: status.as_u16(),
        })
    }
}
