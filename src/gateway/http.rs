//! reqwest-backed gateway with session-cookie propagation.

use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::cookie::Cookie;
use reqwest::header::COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde_json::Value;

use super::contract::{ApiRequest, ErrorBody};
use super::{parse_lenient, reject_not_ok, Gateway};
use crate::config::{ClientConfig, EndpointPaths};
use crate::error::{ClientError, Result};
use crate::session::SessionStore;

/// HTTP gateway talking JSON to the dashboard backend.
///
/// The session cookie is attached to every request. Cookies set or expired
/// by responses are tracked in memory and mirrored to the optional
/// [`SessionStore`].
///
/// # Example
/// ```no_run
/// use dashclient::config::ClientConfig;
/// use dashclient::gateway::HttpGateway;
///
/// let gateway = HttpGateway::new(&ClientConfig::new("http://127.0.0.1:8000"))?;
/// # Ok::<(), dashclient::error::ClientError>(())
/// ```
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    endpoints: EndpointPaths,
    cookie_name: String,
    session: RwLock<Option<String>>,
    session_store: Option<Arc<dyn SessionStore>>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .field("cookie_name", &self.cookie_name)
            .field("has_session", &self.session().is_some())
            .field("session_store", &self.session_store.as_ref().map(|_| ".."))
            .finish()
    }
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.parsed_base_url()?,
            endpoints: config.endpoints.clone(),
            cookie_name: config.session_cookie.clone(),
            session: RwLock::new(None),
            session_store: None,
        })
    }

    /// Attach a persistent store and restore any session it holds.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Result<Self> {
        let restored = store.load()?;
        if restored.is_some() {
            tracing::debug!("Restored stored session");
        }
        self.session = RwLock::new(restored);
        self.session_store = Some(store);
        Ok(self)
    }

    /// Current session cookie value.
    pub fn session(&self) -> Option<String> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    pub fn set_session(&self, value: Option<String>) -> Result<()> {
        if let Ok(mut guard) = self.session.write() {
            *guard = value.clone();
        }
        if let Some(store) = &self.session_store {
            match value {
                Some(v) => store.save(&v)?,
                None => store.clear()?,
            }
        }
        Ok(())
    }

    /// Drop the session locally, regardless of what the server answered.
    pub fn clear_session(&self) -> Result<()> {
        self.set_session(None)
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let template = request.path_template(&self.endpoints);
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::Configuration(format!("base URL cannot carry a path: {}", self.base_url))
            })?;
            segments.pop_if_empty();
            for part in template.split('/').filter(|p| !p.is_empty()) {
                if part == "{id}" {
                    let id = request.resource_id().ok_or_else(|| {
                        ClientError::Configuration(format!(
                            "endpoint {template} needs a resource id for {}",
                            request.action()
                        ))
                    })?;
                    segments.push(id);
                } else {
                    segments.push(part);
                }
            }
        }
        let query = request.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn capture_session(&self, response: &Response) -> Result<()> {
        for cookie in response.cookies().filter(|c| c.name() == self.cookie_name) {
            if is_expired(&cookie, SystemTime::now()) {
                tracing::debug!(cookie = %self.cookie_name, "Session cookie expired by server");
                self.set_session(None)?;
            } else {
                tracing::debug!(cookie = %self.cookie_name, "Session cookie updated");
                self.set_session(Some(cookie_value(&cookie).to_string()))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.url_for(request)?;
        let method = request.method();
        tracing::debug!(action = request.action(), %method, path = url.path(), "Sending request");

        let mut builder = self.client.request(method, url);
        if let Some(body) = request.body() {
            builder = builder.json(&body);
        }
        if let Some((field, filename, mime, data)) = request.upload() {
            let part = Part::bytes(data.to_vec())
                .file_name(filename.to_string())
                .mime_str(mime)?;
            builder = builder.multipart(Form::new().part(field, part));
        }
        if let Some(session) = self.session() {
            builder = builder.header(COOKIE, format!("{}={session}", self.cookie_name));
        }

        let response = builder.send().await?;
        let status = response.status();
        self.capture_session(&response)?;
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = ErrorBody::parse(&bytes).into_error(status.as_u16());
            tracing::warn!(
                action = request.action(),
                status = status.as_u16(),
                code = err.server_code().unwrap_or("-"),
                "Request failed"
            );
            return Err(err);
        }

        if request.expects_text() {
            return Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        }

        reject_not_ok(status.as_u16(), parse_lenient(&bytes)).map_err(|err| {
            tracing::warn!(
                action = request.action(),
                code = err.server_code().unwrap_or("-"),
                "Backend reported ok=false"
            );
            err
        })
    }

    fn forget_session(&self) -> Result<()> {
        self.clear_session()
    }
}

fn cookie_value<'a>(cookie: &'a Cookie<'_>) -> &'a str {
    cookie.value().trim_matches('"')
}

/// A cookie is a deletion when it is blank, has no remaining max-age, or
/// its expiry date has passed.
fn is_expired(cookie: &Cookie<'_>, now: SystemTime) -> bool {
    cookie_value(cookie).is_empty()
        || cookie.max_age().is_some_and(|age| age == Duration::ZERO)
        || cookie.expires().is_some_and(|at| at <= now)
}
