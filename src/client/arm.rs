//! reqwest-based client for the management REST API.
//!
//! Thin by design: one bearer token acquired through the OAuth2
//! client-credentials flow and cached until near expiry, PUT/GET/DELETE
//! with an `api-version` query, and a polling loop that waits for
//! `provisioningState` to reach a terminal value after a create. Retry and
//! backoff beyond that are left to the service and to reqwest.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use async_trait::async_trait;

use crate::config::Credentials;
use crate::error::{Error, Result};

use super::{Resource, ResourceClient, ResourceKind};

const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";
const TOKEN_SCOPE: &str = "https://management.azure.com/.default";

/// Resource groups sit outside any provider namespace and carry their own
/// api-version.
const GROUP_API_VERSION: &str = "2022-09-01";

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const POLL_LIMIT: u32 = 150;

/// Client for the real management service.
pub struct ArmClient {
    http: HttpClient,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ResourceList {
    #[serde(default)]
    value: Vec<Resource>,
}

impl ArmClient {
    /// Builds a client for the given service principal.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Returns a bearer token, fetching a fresh one when the cached token
    /// is absent or about to expire.
    async fn token(&self) -> Result<String> {
        {
            let cache = self.token.lock();
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.value.clone());
                }
            }
        }

        let url = format!(
            "{LOGIN_ENDPOINT}/{}/oauth2/v2.0/token",
            self.credentials.tenant_id
        );
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", TOKEN_SCOPE),
        ];

        let response = self.http.post(&url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        let value = token.access_token;
        // Refresh a minute early so in-flight requests never race expiry.
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in.saturating_sub(60));

        let mut cache = self.token.lock();
        *cache = Some(CachedToken {
            value: value.clone(),
            expires_at,
        });
        Ok(value)
    }

    fn group_path(&self, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourcegroups/{name}",
            self.credentials.subscription_id
        )
    }

    fn child_path(&self, kind: ResourceKind, group: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{group}/providers/{}/{name}",
            self.credentials.subscription_id,
            kind.provider_path()
        )
    }

    fn collection_path(&self, kind: ResourceKind, group: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{group}/providers/{}",
            self.credentials.subscription_id,
            kind.provider_path()
        )
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        api_version: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let token = self.token().await?;
        let url = url::Url::parse_with_params(
            &format!("{MANAGEMENT_ENDPOINT}{path}"),
            [("api-version", api_version)],
        )?;

        tracing::debug!(%method, %url, "management API request");

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Turns a non-success response into a typed error.
    ///
    /// `creating` changes how a not-found error code is interpreted: a 404
    /// on GET means the resource is absent, while a `*NotFound` code on a
    /// create means the request referenced a dependency that does not exist.
    fn decode_error(
        status: StatusCode,
        body: &str,
        creating: bool,
        kind: &str,
        name: &str,
    ) -> Error {
        if status == StatusCode::NOT_FOUND && !creating {
            return Error::not_found(kind, name);
        }

        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error);
        let code = detail
            .as_ref()
            .and_then(|d| d.code.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| body.to_string());

        if creating && code.ends_with("NotFound") {
            return Error::dependency_not_found(kind, message);
        }
        Error::api(status.as_u16(), code, message)
    }

    async fn expect_resource(
        response: reqwest::Response,
        creating: bool,
        kind: &str,
        name: &str,
    ) -> Result<Resource> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::decode_error(status, &body, creating, kind, name));
        }
        Ok(response.json().await?)
    }

    /// Polls a freshly created resource until its provisioning state is
    /// terminal.
    async fn wait_for_provisioning(
        &self,
        kind: ResourceKind,
        group: &str,
        name: &str,
        mut resource: Resource,
    ) -> Result<Resource> {
        for _ in 0..POLL_LIMIT {
            match resource.provisioning_state() {
                Some("Succeeded") | None => return Ok(resource),
                Some("Failed") | Some("Canceled") => {
                    let state = resource.provisioning_state().unwrap_or("Failed").to_string();
                    return Err(Error::OperationFailed {
                        kind: kind.collection().to_string(),
                        name: name.to_string(),
                        state,
                    });
                }
                Some(state) => {
                    tracing::debug!(kind = %kind, name, state, "waiting for provisioning");
                    tokio::time::sleep(POLL_INTERVAL).await;
                    resource = self.get(kind, group, name).await?;
                }
            }
        }
        Err(Error::OperationTimeout {
            kind: kind.collection().to_string(),
            name: name.to_string(),
            secs: POLL_INTERVAL.as_secs() * u64::from(POLL_LIMIT),
        })
    }
}

#[async_trait]
impl ResourceClient for ArmClient {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<Resource> {
        let body = serde_json::json!({ "location": location });
        let response = self
            .request(
                Method::PUT,
                &self.group_path(name),
                GROUP_API_VERSION,
                Some(&body),
            )
            .await?;
        Self::expect_resource(response, true, "resourceGroups", name).await
    }

    async fn get_resource_group(&self, name: &str) -> Result<Resource> {
        let response = self
            .request(Method::GET, &self.group_path(name), GROUP_API_VERSION, None)
            .await?;
        Self::expect_resource(response, false, "resourceGroups", name).await
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        let response = self
            .request(
                Method::DELETE,
                &self.group_path(name),
                GROUP_API_VERSION,
                None,
            )
            .await?;
        let status = response.status();
        // 202: cascade deletion continues server-side. 404: already gone,
        // deleting twice is fine.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::decode_error(status, &body, false, "resourceGroups", name))
    }

    async fn create_or_update(
        &self,
        kind: ResourceKind,
        group: &str,
        name: &str,
        body: Value,
    ) -> Result<Resource> {
        let response = self
            .request(
                Method::PUT,
                &self.child_path(kind, group, name),
                kind.api_version(),
                Some(&body),
            )
            .await?;
        let resource = Self::expect_resource(response, true, kind.collection(), name).await?;
        self.wait_for_provisioning(kind, group, name, resource).await
    }

    async fn get(&self, kind: ResourceKind, group: &str, name: &str) -> Result<Resource> {
        let response = self
            .request(
                Method::GET,
                &self.child_path(kind, group, name),
                kind.api_version(),
                None,
            )
            .await?;
        Self::expect_resource(response, false, kind.collection(), name).await
    }

    async fn delete(&self, kind: ResourceKind, group: &str, name: &str) -> Result<()> {
        let response = self
            .request(
                Method::DELETE,
                &self.child_path(kind, group, name),
                kind.api_version(),
                None,
            )
            .await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::decode_error(status, &body, false, kind.collection(), name))
    }

    async fn list(&self, kind: ResourceKind, group: &str) -> Result<Vec<Resource>> {
        let response = self
            .request(
                Method::GET,
                &self.collection_path(kind, group),
                kind.api_version(),
                None,
            )
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::decode_error(status, &body, false, kind.collection(), ""));
        }
        let list: ResourceList = response.json().await?;
        Ok(list.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ArmClient {
        ArmClient::new(Credentials {
            client_id: "client".into(),
            client_secret: "secret".into(),
            tenant_id: "tenant".into(),
            subscription_id: "sub1".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_paths() {
        let client = client();
        assert_eq!(client.group_path("rg1"), "/subscriptions/sub1/resourcegroups/rg1");
        assert_eq!(
            client.child_path(ResourceKind::LoadBalancer, "rg1", "lb1"),
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/loadBalancers/lb1"
        );
        assert_eq!(
            client.collection_path(ResourceKind::VirtualMachine, "rg1"),
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines"
        );
    }

    #[test]
    fn test_decode_error_get_404_is_not_found() {
        let err = ArmClient::decode_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":"ResourceNotFound","message":"no such thing"}}"#,
            false,
            "loadBalancers",
            "lb1",
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_error_create_not_found_is_dependency() {
        let err = ArmClient::decode_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":"SubnetNotFound","message":"subnet missing"}}"#,
            true,
            "loadBalancers",
            "lb1",
        );
        assert!(matches!(err, Error::DependencyNotFound { .. }));
    }

    #[test]
    fn test_decode_error_envelope_fallback() {
        let err = ArmClient::decode_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "not json at all",
            false,
            "virtualMachines",
            "vm1",
        );
        match err {
            Error::Api { status, code, message } => {
                assert_eq!(status, 500);
                assert_eq!(code, "Unknown");
                assert_eq!(message, "not json at all");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
