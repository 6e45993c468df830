// Condition-monitoring REST API repository implementation
use crate::application::monitoring_repository::MonitoringRepository;
use crate::domain::asset::{MotionAsset, Site};
use crate::domain::lenient;
use crate::domain::measurement::{
    AssetMeasurements, ChannelInfo, ChannelSeries, MeasurementTypeId, RawTimestamp, Reading,
};
use crate::domain::window::MeasurementWindow;
use crate::infrastructure::config::ApiSettings;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

const QUERY_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S";

/// Tokens are renewed this long before the API would expire them
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response from {url} has no payload")]
    MissingPayload { url: String },
    #[error("token lifetime of {expiration}s is out of range")]
    InvalidExpiration { expiration: i64 },
}

/// Every response is wrapped as `{ payload, code, message }`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenGrant {
    access_token: String,
    /// Lifetime in seconds
    expiration: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Instant a token issued at `issued_at` stops being accepted
fn token_expiry(issued_at: DateTime<Utc>, expiration: i64) -> Result<DateTime<Utc>, ApiError> {
    Duration::try_seconds(expiration)
        .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        .ok_or(ApiError::InvalidExpiration { expiration })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstalledBaseEntry {
    base_info: MotionAsset,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeasurementPayload {
    base_info: AssetBaseInfo,
    #[serde(default)]
    measurements: Vec<ChannelPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetBaseInfo {
    asset_id: String,
    asset_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelPayload {
    base_info: ChannelInfo,
    #[serde(default)]
    data_points: Vec<DataPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataPoint {
    #[serde(default, deserialize_with = "lenient::optional_number")]
    measurement_value: Option<f64>,
    #[serde(default)]
    timestamp: Option<RawTimestamp>,
}

impl From<ChannelPayload> for ChannelSeries {
    fn from(channel: ChannelPayload) -> Self {
        let readings = channel
            .data_points
            .into_iter()
            .map(|p| Reading {
                timestamp: p.timestamp,
                value: p.measurement_value,
            })
            .collect();

        ChannelSeries {
            info: channel.base_info,
            readings,
        }
    }
}

pub struct MotionApiClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    secret: String,
    base_api: u32,
    measurement_type_ids: Vec<MeasurementTypeId>,
    token: RwLock<Option<AccessToken>>,
}

impl MotionApiClient {
    pub fn new(settings: &ApiSettings, measurement_type_ids: Vec<MeasurementTypeId>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id.clone(),
            secret: settings.secret.clone(),
            base_api: settings.base_api,
            measurement_type_ids,
            token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn access_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_valid(Utc::now()) {
                return Ok(token.value.clone());
            }
        }
        self.renew_token().await
    }

    async fn renew_token(&self) -> Result<String, ApiError> {
        let url = self.url("Auth/ConnectAccount");
        let issued_at = Utc::now();

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(&ConnectRequest {
                client_id: &self.client_id,
                secret: &self.secret,
            })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let grant: TokenGrant = Self::read_payload(&url, response).await?;
        let token = AccessToken {
            value: grant.access_token,
            expires_at: token_expiry(issued_at, grant.expiration)?,
        };

        tracing::info!("Renewed API access token, valid until {}", token.expires_at);
        let value = token.value.clone();
        *self.token.write().await = Some(token);
        Ok(value)
    }

    async fn send_get(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<Response, ApiError> {
        self.http
            .get(url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// GET with the cached token, renewing it once if the API rejects it
    async fn get_payload<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let token = self.access_token().await?;
        let mut response = self.send_get(&url, query, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Token rejected by {}, renewing", url);
            let token = self.renew_token().await?;
            response = self.send_get(&url, query, &token).await?;
        }

        Self::read_payload(&url, response).await
    }

    async fn read_payload<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })?;

        envelope.payload.ok_or_else(|| ApiError::MissingPayload {
            url: url.to_string(),
        })
    }

    fn measurement_query(&self, asset_id: &str, window: &MeasurementWindow) -> Vec<(&'static str, String)> {
        let type_ids = self
            .measurement_type_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        vec![
            ("motionAssetId", asset_id.to_string()),
            ("measurementTypeIds", type_ids),
            ("from", window.from.format(QUERY_TIMESTAMP).to_string()),
            ("to", window.to.format(QUERY_TIMESTAMP).to_string()),
        ]
    }
}

#[async_trait]
impl MonitoringRepository for MotionApiClient {
    async fn list_sites(&self) -> anyhow::Result<Vec<Site>> {
        let sites: Vec<Site> = self.get_payload("Site", &[]).await?;
        tracing::debug!("Fetched {} sites", sites.len());
        Ok(sites)
    }

    async fn list_assets(&self, site_id: &str) -> anyhow::Result<Vec<MotionAsset>> {
        let path = format!(
            "InstalledBase/Site/{}/{}",
            self.base_api,
            urlencoding::encode(site_id)
        );
        let entries: Vec<InstalledBaseEntry> = self.get_payload(&path, &[]).await?;
        tracing::debug!("Fetched {} assets for site {}", entries.len(), site_id);
        Ok(entries.into_iter().map(|e| e.base_info).collect())
    }

    async fn asset_measurements(
        &self,
        asset_id: &str,
        window: &MeasurementWindow,
    ) -> anyhow::Result<Option<AssetMeasurements>> {
        let query = self.measurement_query(asset_id, window);
        let payload: Vec<MeasurementPayload> = match self.get_payload("Measurement", &query).await {
            Ok(payload) => payload,
            Err(ApiError::MissingPayload { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let Some(data) = payload.into_iter().next() else {
            return Ok(None);
        };

        let channels: Vec<ChannelSeries> = data.measurements.into_iter().map(Into::into).collect();
        tracing::debug!(
            "Fetched {} channels for asset {}",
            channels.len(),
            data.base_info.asset_id
        );

        Ok(Some(AssetMeasurements {
            asset_id: data.base_info.asset_id,
            asset_name: data.base_info.asset_name,
            channels,
        }))
    }
}
