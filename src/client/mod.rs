//! Client seam for the resource-management service.
//!
//! Everything the workflow does goes through the [`ResourceClient`] trait:
//! create-or-update, get, delete and list with "resource state or not
//! found" semantics. Two implementations exist:
//!
//! - [`arm::ArmClient`]: the real thing, a thin reqwest client against the
//!   management REST API.
//! - [`memory::InMemoryClient`]: a fake service for tests and `--dry-run`,
//!   with an ordered call log and dependency validation.
//!
//! The trait is deliberately untyped at the payload level (bodies are
//! `serde_json::Value`); the typed payload structs in [`crate::resources`]
//! serialize into it. That keeps the seam identical for every resource kind
//! and lets the fake store exactly what was sent.

pub mod arm;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The kinds of child resources the workflow manages inside a resource
/// group. Resource groups themselves are addressed by dedicated trait
/// methods because they live outside any provider namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    VirtualNetwork,
    PublicIpAddress,
    LoadBalancer,
    NetworkInterface,
    AvailabilitySet,
    VirtualMachine,
}

impl ResourceKind {
    /// Provider path, e.g. `Microsoft.Network/loadBalancers`.
    pub fn provider_path(self) -> &'static str {
        match self {
            Self::VirtualNetwork => "Microsoft.Network/virtualNetworks",
            Self::PublicIpAddress => "Microsoft.Network/publicIPAddresses",
            Self::LoadBalancer => "Microsoft.Network/loadBalancers",
            Self::NetworkInterface => "Microsoft.Network/networkInterfaces",
            Self::AvailabilitySet => "Microsoft.Compute/availabilitySets",
            Self::VirtualMachine => "Microsoft.Compute/virtualMachines",
        }
    }

    /// The collection segment of the provider path.
    pub fn collection(self) -> &'static str {
        // provider_path always has the form "Namespace/collection"
        self.provider_path()
            .split('/')
            .next_back()
            .unwrap_or_default()
    }

    /// api-version query value for this kind.
    pub fn api_version(self) -> &'static str {
        match self {
            Self::AvailabilitySet | Self::VirtualMachine => "2023-07-01",
            _ => "2023-04-01",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A resource as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Full resource id
    pub id: String,
    /// Resource name
    pub name: String,
    /// Region, absent for some list results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Kind-specific properties, untyped
    #[serde(default)]
    pub properties: Value,
}

impl Resource {
    /// The provisioning state embedded in the properties, if any.
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties.get("provisioningState").and_then(Value::as_str)
    }
}

/// The remote management service, reduced to the verbs the workflow needs.
///
/// Deletes are idempotent: deleting something that does not exist is `Ok`,
/// matching the service's 204 semantics. Absence surfaces through `get`,
/// which returns [`crate::error::Error::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Create or update a resource group.
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<Resource>;

    /// Fetch a resource group.
    async fn get_resource_group(&self, name: &str) -> Result<Resource>;

    /// Delete a resource group and everything in it.
    async fn delete_resource_group(&self, name: &str) -> Result<()>;

    /// Create or update a child resource. Waits for the operation to reach
    /// a terminal provisioning state before returning.
    async fn create_or_update(
        &self,
        kind: ResourceKind,
        group: &str,
        name: &str,
        body: Value,
    ) -> Result<Resource>;

    /// Fetch a child resource.
    async fn get(&self, kind: ResourceKind, group: &str, name: &str) -> Result<Resource>;

    /// Delete a child resource.
    async fn delete(&self, kind: ResourceKind, group: &str, name: &str) -> Result<()>;

    /// List the resources of one kind in a group.
    async fn list(&self, kind: ResourceKind, group: &str) -> Result<Vec<Resource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_paths() {
        assert_eq!(
            ResourceKind::LoadBalancer.provider_path(),
            "Microsoft.Network/loadBalancers"
        );
        assert_eq!(ResourceKind::LoadBalancer.collection(), "loadBalancers");
        assert_eq!(
            ResourceKind::VirtualMachine.provider_path(),
            "Microsoft.Compute/virtualMachines"
        );
        assert_eq!(ResourceKind::AvailabilitySet.to_string(), "availabilitySets");
    }

    #[test]
    fn test_api_versions_split_by_namespace() {
        assert_eq!(ResourceKind::VirtualNetwork.api_version(), "2023-04-01");
        assert_eq!(ResourceKind::VirtualMachine.api_version(), "2023-07-01");
    }

    #[test]
    fn test_resource_provisioning_state() {
        let res: Resource = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/loadBalancers/lb",
            "name": "lb",
            "properties": { "provisioningState": "Succeeded" }
        }))
        .unwrap();
        assert_eq!(res.provisioning_state(), Some("Succeeded"));
    }
}
