//! vSphere distributed switch lookup.
//!
//! The host transport node profile references the compute VDS by its vCenter
//! UUID, while operators only know the switch name. [`VsphereClient`] resolves
//! one to the other over the vSphere VI/JSON API:
//!
//! 1. log in and take the `vmware-api-session-id` token
//! 2. read the service content for the root folder and view manager
//! 3. create a recursive container view over every `DistributedVirtualSwitch`
//! 4. compare each switch name and read the UUID of the first match
//! 5. destroy the view and log out

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::VsphereConfig;
use crate::error::{Error, Result};
use crate::params::ParamFile;

/// Header carrying the session token on every authenticated call.
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// Default VI/JSON API release.
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolves a distributed switch name to its UUID.
#[async_trait]
pub trait SwitchLookup: Send + Sync {
    /// Return the UUID of the switch called `name`.
    async fn switch_uuid(&self, name: &str) -> Result<String>;
}

/// vCenter login details, taken from the compute manager section of the user config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcenterCredentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl VcenterCredentials {
    /// Read `vcenter_fqdn`, `vcenter_username` and `vcenter_password`.
    pub fn from_params(user: &ParamFile) -> Result<Self> {
        Ok(Self {
            host: user.string("vcenter_fqdn")?,
            username: user.string("vcenter_username")?,
            password: user.string("vcenter_password")?,
        })
    }
}

/// Reference to a vSphere managed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MoRef {
    #[serde(rename = "_typeName", default = "moref_type_name")]
    type_name: String,
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

fn moref_type_name() -> String {
    "ManagedObjectReference".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceContent {
    root_folder: MoRef,
    view_manager: MoRef,
}

/// Builder for creating a [`VsphereClient`]
pub struct VsphereClientBuilder {
    base_url: Option<String>,
    credentials: Option<VcenterCredentials>,
    release: String,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl VsphereClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            release: DEFAULT_API_RELEASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            accept_invalid_certs: true,
        }
    }

    /// Apply the `[vsphere]` section of the tool configuration
    pub fn config(mut self, config: &VsphereConfig) -> Self {
        if let Some(url) = &config.url {
            self.base_url = Some(url.clone());
        }
        self.release(config.api_release.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .accept_invalid_certs(config.accept_invalid_certs)
    }

    /// Set the login credentials. Unless a base URL is set, the API is
    /// reached at `https://<host>/`.
    pub fn credentials(mut self, credentials: VcenterCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the VI/JSON API release
    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept self-signed vCenter certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VsphereClient> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::Config("vCenter credentials are required".to_string()))?;

        let raw = self
            .base_url
            .unwrap_or_else(|| format!("https://{}/", credentials.host));
        let base = Url::parse(&raw)
            .map_err(|e| Error::vsphere(&credentials.host, format!("invalid URL '{raw}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::vsphere(
                &credentials.host,
                format!("'{raw}' cannot be used as an API base URL"),
            ));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("nsx-install/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| Error::vsphere(&credentials.host, format!("HTTP client setup failed: {e}")))?;

        Ok(VsphereClient {
            client,
            base,
            release: self.release,
            credentials,
        })
    }
}

impl Default for VsphereClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the vSphere VI/JSON API
pub struct VsphereClient {
    client: Client,
    base: Url,
    release: String,
    credentials: VcenterCredentials,
}

impl VsphereClient {
    /// Create a new builder
    pub fn builder() -> VsphereClientBuilder {
        VsphereClientBuilder::new()
    }

    fn host(&self) -> &str {
        &self.credentials.host
    }

    /// `<base>/sdk/vim25/<release>/<segments...>`
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["sdk", "vim25", self.release.as_str()])
                .extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], session: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(segments))
            .header(SESSION_HEADER, session)
    }

    async fn check(&self, what: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::vsphere(
            self.host(),
            format!("{what} failed with HTTP {status}: {}", body.trim()),
        ))
    }

    /// Send a request and check its status. Transport failures carry their
    /// whole cause chain, since reqwest only names the URL at the top.
    async fn send(&self, what: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            let mut message = format!("{what} request failed: {e}");
            let mut source = StdError::source(&e);
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            Error::vsphere(self.host(), message)
        })?;
        self.check(what, response).await
    }

    async fn fetch<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> Result<T> {
        let response = self.send(what, request).await?;
        response
            .json()
            .await
            .map_err(|e| Error::vsphere(self.host(), format!("{what} returned an unexpected body: {e}")))
    }

    async fn login(&self) -> Result<String> {
        let url = self.endpoint(&["SessionManager", "SessionManager", "Login"]);
        debug!(host = self.host(), user = %self.credentials.username, "Logging in to vCenter");

        let request = self.client.post(url).json(&json!({
            "userName": self.credentials.username,
            "password": self.credentials.password,
        }));
        let response = self.send("Login", request).await?;

        response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::vsphere(self.host(), format!("Login response has no {SESSION_HEADER} header")))
    }

    async fn logout(&self, session: &str) -> Result<()> {
        let request = self.request(
            Method::POST,
            &["SessionManager", "SessionManager", "Logout"],
            session,
        );
        self.send("Logout", request).await?;
        Ok(())
    }

    async fn find_switch(&self, session: &str, name: &str) -> Result<String> {
        let content: ServiceContent = self
            .fetch(
                "RetrieveServiceContent",
                self.request(
                    Method::GET,
                    &["ServiceInstance", "ServiceInstance", "content"],
                    session,
                ),
            )
            .await?;

        let view: MoRef = self
            .fetch(
                "CreateContainerView",
                self.request(
                    Method::POST,
                    &[
                        content.view_manager.kind.as_str(),
                        content.view_manager.value.as_str(),
                        "CreateContainerView",
                    ],
                    session,
                )
                .json(&json!({
                    "container": content.root_folder,
                    "type": ["DistributedVirtualSwitch"],
                    "recursive": true,
                })),
            )
            .await?;

        let result = self.search_view(session, &view, name).await;

        let destroy = self.request(
            Method::POST,
            &[view.kind.as_str(), view.value.as_str(), "DestroyView"],
            session,
        );
        if let Err(e) = self.send("DestroyView", destroy).await {
            warn!(error = %e, "Failed to destroy container view");
        }

        result
    }

    async fn search_view(&self, session: &str, view: &MoRef, name: &str) -> Result<String> {
        let switches: Vec<MoRef> = self
            .fetch(
                "ContainerView.view",
                self.request(
                    Method::GET,
                    &[view.kind.as_str(), view.value.as_str(), "view"],
                    session,
                ),
            )
            .await?;
        debug!(count = switches.len(), "Distributed switches visible");

        for switch in &switches {
            let switch_name: String = self
                .fetch(
                    "DistributedVirtualSwitch.name",
                    self.request(
                        Method::GET,
                        &[switch.kind.as_str(), switch.value.as_str(), "name"],
                        session,
                    ),
                )
                .await?;

            if switch_name == name {
                return self
                    .fetch(
                        "DistributedVirtualSwitch.uuid",
                        self.request(
                            Method::GET,
                            &[switch.kind.as_str(), switch.value.as_str(), "uuid"],
                            session,
                        ),
                    )
                    .await;
            }
        }

        Err(Error::SwitchNotFound {
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl SwitchLookup for VsphereClient {
    async fn switch_uuid(&self, name: &str) -> Result<String> {
        let session = self.login().await?;
        let result = self.find_switch(&session, name).await;

        if let Err(e) = self.logout(&session).await {
            warn!(host = self.host(), error = %e, "vCenter logout failed");
        }

        let uuid = result?;
        info!(switch = name, %uuid, "Resolved distributed switch");
        Ok(uuid)
    }
}
