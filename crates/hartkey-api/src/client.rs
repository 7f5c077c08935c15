// Hand-crafted async HTTP client for the Hartkey household and events APIs.
//
// Household base: https://household.key.rt.ru/api/v2/app/
// Events base:    https://events.key.rt.ru/api/v2/
// Auth: `Authorization: Bearer <token>` header

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::EventsQuery;

const DEFAULT_HOUSEHOLD_URL: &str = "https://household.key.rt.ru/api/v2/app/";
const DEFAULT_EVENTS_URL: &str = "https://events.key.rt.ru/api/v2/";

// ── Endpoints ────────────────────────────────────────────────────────

/// Base URLs of the two API hosts. Both always end with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub household: Url,
    pub events: Url,
}

impl Endpoints {
    pub fn new(household: &str, events: &str) -> Result<Self, Error> {
        Ok(Self {
            household: normalize_base_url(household)?,
            events: normalize_base_url(events)?,
        })
    }

    /// The production vendor hosts.
    pub fn vendor() -> Self {
        Self::new(DEFAULT_HOUSEHOLD_URL, DEFAULT_EVENTS_URL)
            .expect("built-in vendor URLs should parse")
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::vendor()
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Hartkey API.
///
/// Responses from the read endpoints are returned as raw JSON; turning
/// them into domain types is the caller's job.
#[derive(Debug, Clone)]
pub struct HartkeyClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HartkeyClient {
    /// Build from a bearer token. The header is marked sensitive so it
    /// never shows up in debug output.
    pub fn new(
        endpoints: Endpoints,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid bearer token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // ── Public API ───────────────────────────────────────────────────

    /// `GET devices/intercom`: raw device list payload.
    pub async fn list_devices(&self) -> Result<Value, Error> {
        let url = self.endpoints.household.join("devices/intercom")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let err = parse_error(status, resp).await;
            if let Error::Api { status, body } = &err {
                error!(status, body = %body, "device list request failed");
            }
            return Err(err);
        }
        read_json(resp).await
    }

    /// `POST devices/{id}/open` with an empty JSON object.
    pub async fn open_device(&self, device_id: &str) -> Result<(), Error> {
        let url = self
            .endpoints
            .household
            .join(&format!("devices/{device_id}/open"))?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    /// `GET events/list`: raw event list payload.
    pub async fn list_events(&self, query: &EventsQuery) -> Result<Value, Error> {
        let url = self.endpoints.events.join("events/list")?;
        let params = query.to_params();
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(&params).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(parse_error(status, resp).await);
        }
        read_json(resp).await
    }

    /// Check that the token is accepted, without parsing the device list.
    ///
    /// Distinguishes [`Error::InvalidToken`] from everything else
    /// (connection failures, server errors).
    pub async fn validate_token(&self) -> Result<(), Error> {
        self.list_devices().await.map(|_| ())
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn read_json(resp: reqwest::Response) -> Result<Value, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::InvalidToken;
    }

    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST {
        Error::Validation { body }
    } else {
        Error::Api {
            status: status.as_u16(),
            body,
        }
    }
}
