//! Compute Engine v1 REST adapter implementing the `ComputeApi` port.
//!
//! Requests carry a caller-supplied OAuth2 access token
//! (e.g. `gcloud auth print-access-token`).

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::application::ports::ComputeApi;
use crate::domain::compute::{
    Firewall, FirewallSpec, Instance, InstanceSpec, Operation, OperationScope, StaticIp,
};
use crate::domain::{CloudError, GuestAttributes, InstanceLocator, RegionLocator};

/// Public Compute Engine endpoint.
pub const COMPUTE_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Operation `wait` calls block server-side for up to two minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(150);

/// HTTP client for one access token.
pub struct GceComputeClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl GceComputeClient {
    /// Client for the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(COMPUTE_BASE_URL, access_token)
    }

    /// Client for an alternative endpoint (emulators, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, access_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("outline-gcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn url(&self, project_id: &str, path: &str) -> String {
        format!("{}/projects/{project_id}/{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<T, CloudError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;
        let status = response.status();
        tracing::debug!(resource, status = status.as_u16(), "compute API response");
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| CloudError::Decode(format!("{resource}: {e}")));
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(resource, status.as_u16(), &body))
    }
}

impl ComputeApi for GceComputeClient {
    async fn get_instance(&self, locator: &InstanceLocator) -> Result<Instance, CloudError> {
        let url = self.url(&locator.project_id, &instance_path(locator));
        self.send(&format!("instance {}", locator.instance_name), self.http.get(url))
            .await
    }

    async fn insert_instance(
        &self,
        locator: &InstanceLocator,
        spec: &InstanceSpec,
    ) -> Result<Operation, CloudError> {
        let url = self.url(
            &locator.project_id,
            &format!("zones/{}/instances", locator.zone_id),
        );
        let body = instance_body(locator, spec);
        self.send(
            &format!("zone {}", locator.zone_id),
            self.http.post(url).json(&body),
        )
        .await
    }

    async fn delete_instance(&self, locator: &InstanceLocator) -> Result<Operation, CloudError> {
        let url = self.url(&locator.project_id, &instance_path(locator));
        self.send(&format!("instance {}", locator.instance_name), self.http.delete(url))
            .await
    }

    async fn list_instances(
        &self,
        project_id: &str,
        label: &str,
    ) -> Result<Vec<Instance>, CloudError> {
        let url = self.url(project_id, "aggregated/instances");
        let filter = format!("labels.{label}=true");
        let mut instances = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.http.get(&url).query(&[("filter", filter.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: AggregatedInstances =
                self.send(&format!("project {project_id}"), request).await?;
            instances.extend(page.items.into_values().flat_map(|scope| scope.instances));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(instances)
    }

    async fn get_static_ip(&self, region: &RegionLocator, name: &str) -> Result<StaticIp, CloudError> {
        let url = self.url(
            &region.project_id,
            &format!("regions/{}/addresses/{name}", region.region_id),
        );
        self.send(&format!("address {name}"), self.http.get(url)).await
    }

    async fn insert_static_ip(
        &self,
        region: &RegionLocator,
        name: &str,
        address: &str,
    ) -> Result<Operation, CloudError> {
        let url = self.url(
            &region.project_id,
            &format!("regions/{}/addresses", region.region_id),
        );
        let body = json!({ "name": name, "address": address });
        self.send(&format!("region {}", region.region_id), self.http.post(url).json(&body))
            .await
    }

    async fn delete_static_ip(
        &self,
        region: &RegionLocator,
        name: &str,
    ) -> Result<Operation, CloudError> {
        let url = self.url(
            &region.project_id,
            &format!("regions/{}/addresses/{name}", region.region_id),
        );
        self.send(&format!("address {name}"), self.http.delete(url)).await
    }

    async fn get_firewall(&self, project_id: &str, name: &str) -> Result<Firewall, CloudError> {
        let url = self.url(project_id, &format!("global/firewalls/{name}"));
        self.send(&format!("firewall {name}"), self.http.get(url)).await
    }

    async fn insert_firewall(
        &self,
        project_id: &str,
        spec: &FirewallSpec,
    ) -> Result<Operation, CloudError> {
        let url = self.url(project_id, "global/firewalls");
        self.send(
            &format!("project {project_id}"),
            self.http.post(url).json(&firewall_body(spec)),
        )
        .await
    }

    async fn guest_attributes(
        &self,
        locator: &InstanceLocator,
        namespace: &str,
    ) -> Result<GuestAttributes, CloudError> {
        let url = self.url(
            &locator.project_id,
            &format!("{}/getGuestAttributes", instance_path(locator)),
        );
        let response: GuestAttributesResponse = self
            .send(
                &format!("guest attributes of {}", locator.instance_name),
                self.http.get(url).query(&[("queryPath", namespace)]),
            )
            .await?;
        Ok(response.into_attributes())
    }

    async fn wait_operation(
        &self,
        project_id: &str,
        operation: &Operation,
    ) -> Result<Operation, CloudError> {
        let url = self.url(project_id, &operation_wait_path(operation));
        self.send(
            &format!("operation {}", operation.name),
            self.http.post(url).json(&json!({})),
        )
        .await
    }
}

fn instance_path(locator: &InstanceLocator) -> String {
    format!("zones/{}/instances/{}", locator.zone_id, locator.instance_name)
}

fn operation_wait_path(operation: &Operation) -> String {
    match operation.scope() {
        OperationScope::Zone(zone) => format!("zones/{zone}/operations/{}/wait", operation.name),
        OperationScope::Region(region) => {
            format!("regions/{region}/operations/{}/wait", operation.name)
        }
        OperationScope::Global => format!("global/operations/{}/wait", operation.name),
    }
}

/// Map a non-success response to a [`CloudError`]. 404 is always `NotFound`.
fn api_error(resource: &str, status: u16, body: &str) -> CloudError {
    if status == 404 {
        return CloudError::not_found(resource);
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                format!("{resource}: empty response")
            } else {
                body.chars().take(200).collect()
            }
        });
    CloudError::Api { status, message }
}

fn instance_body(locator: &InstanceLocator, spec: &InstanceSpec) -> Value {
    let metadata: Vec<Value> = spec
        .metadata
        .iter()
        .map(|(key, value)| json!({ "key": key, "value": value }))
        .collect();
    json!({
        "name": locator.instance_name,
        "description": spec.description,
        "machineType": format!("zones/{}/machineTypes/{}", locator.zone_id, spec.machine_type),
        "tags": { "items": spec.tags },
        "labels": spec.labels,
        "metadata": { "items": metadata },
        "disks": [{
            "boot": true,
            "autoDelete": true,
            "initializeParams": { "sourceImage": spec.source_image },
        }],
        "networkInterfaces": [{
            "network": "global/networks/default",
            "accessConfigs": [{ "type": "ONE_TO_ONE_NAT", "name": "External NAT" }],
        }],
    })
}

fn firewall_body(spec: &FirewallSpec) -> Value {
    json!({
        "name": spec.name,
        "direction": "INGRESS",
        "priority": 1000,
        "targetTags": [spec.target_tag],
        "sourceRanges": [spec.source_range],
        "allowed": [{ "IPProtocol": "tcp" }, { "IPProtocol": "udp" }],
    })
}

// ── Wire-only response shapes ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregatedInstances {
    #[serde(default)]
    items: BTreeMap<String, ScopedInstances>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ScopedInstances {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuestAttributesResponse {
    #[serde(default)]
    query_value: Option<GuestAttributeList>,
}

#[derive(Deserialize)]
struct GuestAttributeList {
    #[serde(default)]
    items: Vec<GuestAttributeEntry>,
}

#[derive(Deserialize)]
struct GuestAttributeEntry {
    key: String,
    #[serde(default)]
    value: String,
}

impl GuestAttributesResponse {
    fn into_attributes(self) -> GuestAttributes {
        self.query_value
            .map(|list| list.items)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }
}
