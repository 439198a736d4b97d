//! Resource naming helpers.
//!
//! Resource ids follow the management API convention
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{type}/{name}`,
//! and sub-resources of a load balancer hang off their parent id. Children
//! reference parents by these id strings, so the workflow builds every id
//! from the same helpers the service would.

use rand::Rng;

/// Returns `prefix` followed by a bounded random integer.
///
/// No uniqueness guarantee: two calls can collide. The sample accepts that
/// risk; a collision just means a re-run reuses a name.
pub fn random_name(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(10_000..100_000);
    format!("{prefix}{suffix}")
}

/// Id of a resource group.
pub fn group_id(subscription: &str, group: &str) -> String {
    format!("/subscriptions/{subscription}/resourceGroups/{group}")
}

/// Id of a resource under a provider path such as
/// `Microsoft.Network/loadBalancers`.
pub fn resource_id(subscription: &str, group: &str, provider_path: &str, name: &str) -> String {
    format!(
        "/subscriptions/{subscription}/resourceGroups/{group}/providers/{provider_path}/{name}"
    )
}

/// Id of a subnet inside a virtual network.
pub fn subnet_id(subscription: &str, group: &str, vnet: &str, subnet: &str) -> String {
    format!(
        "{}/subnets/{subnet}",
        resource_id(subscription, group, "Microsoft.Network/virtualNetworks", vnet)
    )
}

/// Id of a sub-resource (frontend config, backend pool, probe, NAT rule)
/// under a parent resource id.
pub fn child_id(parent_id: &str, collection: &str, name: &str) -> String {
    format!("{parent_id}/{collection}/{name}")
}
