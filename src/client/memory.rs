//! In-memory fake of the management service.
//!
//! Backs `--dry-run` and the test suite. The fake keeps every resource the
//! workflow creates in a map, hands out the same id strings the real
//! service would, and checks the one invariant the real service enforces
//! that matters here: a create may only reference ids that already exist
//! (parents before children). It also records every operation in order,
//! which is what the workflow-sequencing tests assert against.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::naming::{child_id, group_id};

use super::{Resource, ResourceClient, ResourceKind};

/// Fake subscription id used when none is given.
pub const FAKE_SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

/// An in-memory stand-in for the remote management service.
pub struct InMemoryClient {
    subscription: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    groups: HashMap<String, Resource>,
    resources: HashMap<(ResourceKind, String, String), Resource>,
    /// Every id the service has handed out, including subnet and
    /// load-balancer child ids. Creates validate their references here.
    known_ids: HashSet<String>,
    calls: Vec<String>,
    fail_patterns: Vec<String>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::with_subscription(FAKE_SUBSCRIPTION)
    }

    pub fn with_subscription(subscription: &str) -> Self {
        Self {
            subscription: subscription.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    /// The operations issued so far, in order, e.g.
    /// `"create loadBalancers/lb1"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Makes the next operation whose call string starts with `pattern`
    /// fail once with an injected server error.
    pub fn fail_on(&self, pattern: &str) {
        self.state.lock().fail_patterns.push(pattern.to_string());
    }

    /// True if the group currently exists.
    pub fn group_exists(&self, name: &str) -> bool {
        self.state.lock().groups.contains_key(name)
    }

    fn record(state: &mut State, call: String) -> Result<()> {
        state.calls.push(call.clone());
        if let Some(pos) = state
            .fail_patterns
            .iter()
            .position(|p| call.starts_with(p.as_str()))
        {
            state.fail_patterns.remove(pos);
            return Err(Error::api(
                500,
                "InternalServerError",
                format!("injected failure for '{call}'"),
            ));
        }
        Ok(())
    }

    /// Collects every `"id"` string reachable in the value.
    fn collect_ids(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, inner) in map {
                    if key == "id" {
                        if let Some(id) = inner.as_str() {
                            out.push(id.to_string());
                        }
                    }
                    Self::collect_ids(inner, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    Self::collect_ids(item, out);
                }
            }
            _ => {}
        }
    }

    /// Registers the ids of named sub-resources (subnets, frontend
    /// configs, pools, probes, rules) so later creates may reference them.
    fn register_children(state: &mut State, parent_id: &str, properties: &Value) {
        let Some(map) = properties.as_object() else {
            return;
        };
        for (collection, value) in map {
            let Some(items) = value.as_array() else {
                continue;
            };
            for item in items {
                if let Some(name) = item.get("name").and_then(Value::as_str) {
                    state
                        .known_ids
                        .insert(child_id(parent_id, collection, name));
                }
            }
        }
    }

    fn succeeded(properties: Value) -> Value {
        let mut map = match properties {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(
            "provisioningState".to_string(),
            Value::String("Succeeded".to_string()),
        );
        Value::Object(map)
    }
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceClient for InMemoryClient {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<Resource> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("create resourceGroups/{name}"))?;

        let id = group_id(&self.subscription, name);
        let resource = Resource {
            id: id.clone(),
            name: name.to_string(),
            location: Some(location.to_string()),
            properties: serde_json::json!({ "provisioningState": "Succeeded" }),
        };
        state.known_ids.insert(id);
        state.groups.insert(name.to_string(), resource.clone());
        Ok(resource)
    }

    async fn get_resource_group(&self, name: &str) -> Result<Resource> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("get resourceGroups/{name}"))?;
        state
            .groups
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found("resourceGroups", name))
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.groups.contains_key(name) {
            Self::record(&mut state, format!("delete resourceGroups/{name}"))?;
            let id = group_id(&self.subscription, name);
            state.groups.remove(name);
            // Cascade: everything scoped under the group goes with it.
            state.resources.retain(|(_, group, _), _| group != name);
            let prefix = format!("{id}/");
            state
                .known_ids
                .retain(|known| known != &id && !known.starts_with(&prefix));
            Ok(())
        } else {
            // Absent: the service reports not-found but the delete verb is
            // idempotent, so the caller sees success.
            Self::record(&mut state, format!("delete resourceGroups/{name} (not found)"))?;
            Ok(())
        }
    }

    async fn create_or_update(
        &self,
        kind: ResourceKind,
        group: &str,
        name: &str,
        body: Value,
    ) -> Result<Resource> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("create {}/{name}", kind.collection()))?;

        if !state.groups.contains_key(group) {
            return Err(Error::dependency_not_found(
                kind.collection(),
                group_id(&self.subscription, group),
            ));
        }

        let id = crate::naming::resource_id(
            &self.subscription,
            group,
            kind.provider_path(),
            name,
        );

        // Everything the payload points at must already exist, except the
        // resource's own sub-resources, which are being created with it.
        let mut referenced = Vec::new();
        Self::collect_ids(&body, &mut referenced);
        for reference in referenced {
            if reference.starts_with(&id) {
                continue;
            }
            if !state.known_ids.contains(&reference) {
                return Err(Error::dependency_not_found(kind.collection(), reference));
            }
        }

        let properties = Self::succeeded(body.get("properties").cloned().unwrap_or(Value::Null));
        let resource = Resource {
            id: id.clone(),
            name: name.to_string(),
            location: body
                .get("location")
                .and_then(Value::as_str)
                .map(str::to_string),
            properties: properties.clone(),
        };

        state.known_ids.insert(id.clone());
        Self::register_children(&mut state, &id, &properties);
        state
            .resources
            .insert((kind, group.to_string(), name.to_string()), resource.clone());
        Ok(resource)
    }

    async fn get(&self, kind: ResourceKind, group: &str, name: &str) -> Result<Resource> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("get {}/{name}", kind.collection()))?;
        state
            .resources
            .get(&(kind, group.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(kind.collection(), name))
    }

    async fn delete(&self, kind: ResourceKind, group: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock();
        let key = (kind, group.to_string(), name.to_string());
        if state.resources.contains_key(&key) {
            Self::record(&mut state, format!("delete {}/{name}", kind.collection()))?;
            if let Some(resource) = state.resources.remove(&key) {
                let prefix = format!("{}/", resource.id);
                state
                    .known_ids
                    .retain(|known| known != &resource.id && !known.starts_with(&prefix));
            }
        } else {
            Self::record(
                &mut state,
                format!("delete {}/{name} (not found)", kind.collection()),
            )?;
        }
        Ok(())
    }

    async fn list(&self, kind: ResourceKind, group: &str) -> Result<Vec<Resource>> {
        let mut state = self.state.lock();
        Self::record(&mut state, format!("list {}", kind.collection()))?;
        let mut found: Vec<Resource> = state
            .resources
            .iter()
            .filter(|((k, g, _), _)| *k == kind && g == group)
            .map(|(_, resource)| resource.clone())
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::subnet_id;
    use crate::resources;

    #[tokio::test]
    async fn test_group_create_get_delete() {
        let fake = InMemoryClient::new();
        fake.create_resource_group("rg1", "westus").await.unwrap();
        assert!(fake.group_exists("rg1"));

        let group = fake.get_resource_group("rg1").await.unwrap();
        assert_eq!(group.name, "rg1");
        assert_eq!(group.location.as_deref(), Some("westus"));

        fake.delete_resource_group("rg1").await.unwrap();
        assert!(!fake.group_exists("rg1"));
        assert!(fake.get_resource_group("rg1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_group_twice_is_idempotent() {
        let fake = InMemoryClient::new();
        fake.create_resource_group("rg1", "westus").await.unwrap();
        fake.delete_resource_group("rg1").await.unwrap();
        fake.delete_resource_group("rg1").await.unwrap();

        let calls = fake.calls();
        assert_eq!(calls.last().unwrap(), "delete resourceGroups/rg1 (not found)");
    }

    #[tokio::test]
    async fn test_create_without_group_is_rejected() {
        let fake = InMemoryClient::new();
        let body = serde_json::to_value(resources::default_vnet("westus")).unwrap();
        let err = fake
            .create_or_update(ResourceKind::VirtualNetwork, "rg1", "vnet1", body)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyNotFound { .. }));
    }

    #[tokio::test]
    async fn test_dangling_reference_is_rejected() {
        let fake = InMemoryClient::new();
        fake.create_resource_group("rg1", "westus").await.unwrap();

        let lb_id = crate::naming::resource_id(
            FAKE_SUBSCRIPTION,
            "rg1",
            "Microsoft.Network/loadBalancers",
            "lb1",
        );
        let missing_subnet = subnet_id(FAKE_SUBSCRIPTION, "rg1", "no-such-vnet", "frontend");
        let body = serde_json::to_value(resources::internal_load_balancer(
            "westus",
            &lb_id,
            &missing_subnet,
        ))
        .unwrap();

        let err = fake
            .create_or_update(ResourceKind::LoadBalancer, "rg1", "lb1", body)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyNotFound { ref id, .. } if *id == missing_subnet));
    }

    #[tokio::test]
    async fn test_self_references_are_allowed_and_children_registered() {
        let fake = InMemoryClient::new();
        fake.create_resource_group("rg1", "westus").await.unwrap();

        let vnet = serde_json::to_value(resources::default_vnet("westus")).unwrap();
        fake.create_or_update(ResourceKind::VirtualNetwork, "rg1", "vnet1", vnet)
            .await
            .unwrap();

        let pip = serde_json::to_value(resources::default_public_ip("westus", "label1")).unwrap();
        fake.create_or_update(ResourceKind::PublicIpAddress, "rg1", "pip1", pip)
            .await
            .unwrap();

        let lb_id = crate::naming::resource_id(
            FAKE_SUBSCRIPTION,
            "rg1",
            "Microsoft.Network/loadBalancers",
            "lb1",
        );
        let pip_id = crate::naming::resource_id(
            FAKE_SUBSCRIPTION,
            "rg1",
            "Microsoft.Network/publicIPAddresses",
            "pip1",
        );
        let lb = serde_json::to_value(resources::default_load_balancer("westus", &lb_id, &pip_id))
            .unwrap();
        fake.create_or_update(ResourceKind::LoadBalancer, "rg1", "lb1", lb)
            .await
            .unwrap();

        // A NIC may now reference the balancer's pool and NAT rule.
        let subnet = subnet_id(FAKE_SUBSCRIPTION, "rg1", "vnet1", resources::FRONTEND_SUBNET);
        let pool = child_id(&lb_id, "backendAddressPools", resources::BACKEND_POOL_NAME);
        let nat = child_id(&lb_id, "inboundNatRules", resources::NAT_RULE_NAMES[0]);
        let nic = serde_json::to_value(resources::default_nic("westus", &subnet, &pool, &nat))
            .unwrap();
        fake.create_or_update(ResourceKind::NetworkInterface, "rg1", "nic1", nic)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fail_on_injects_single_failure() {
        let fake = InMemoryClient::new();
        fake.fail_on("create resourceGroups");
        let err = fake.create_resource_group("rg1", "westus").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));

        // Injection is one-shot.
        fake.create_resource_group("rg1", "westus").await.unwrap();
    }

    #[tokio::test]
    async fn test_call_log_order() {
        let fake = InMemoryClient::new();
        fake.create_resource_group("rg1", "westus").await.unwrap();
        let vnet = serde_json::to_value(resources::default_vnet("westus")).unwrap();
        fake.create_or_update(ResourceKind::VirtualNetwork, "rg1", "vnet1", vnet)
            .await
            .unwrap();
        fake.list(ResourceKind::LoadBalancer, "rg1").await.unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "create resourceGroups/rg1",
                "create virtualNetworks/vnet1",
                "list loadBalancers",
            ]
        );
    }

    #[tokio::test]
    async fn test_group_delete_cascades() {
        let fake = InMemoryClient::new();
        fake.create_resource_group("rg1", "westus").await.unwrap();
        let vnet = serde_json::to_value(resources::default_vnet("westus")).unwrap();
        fake.create_or_update(ResourceKind::VirtualNetwork, "rg1", "vnet1", vnet)
            .await
            .unwrap();

        fake.delete_resource_group("rg1").await.unwrap();
        let err = fake
            .get(ResourceKind::VirtualNetwork, "rg1", "vnet1")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
