//! Resource-id conventions across kinds.

use lbtopo::client::ResourceKind;
use lbtopo::naming::{child_id, resource_id, subnet_id};

const SUB: &str = "00000000-0000-0000-0000-000000000000";

#[test]
fn test_every_kind_builds_a_provider_scoped_id() {
    let kinds = [
        (ResourceKind::VirtualNetwork, "Microsoft.Network"),
        (ResourceKind::PublicIpAddress, "Microsoft.Network"),
        (ResourceKind::LoadBalancer, "Microsoft.Network"),
        (ResourceKind::NetworkInterface, "Microsoft.Network"),
        (ResourceKind::AvailabilitySet, "Microsoft.Compute"),
        (ResourceKind::VirtualMachine, "Microsoft.Compute"),
    ];
    for (kind, provider) in kinds {
        let id = resource_id(SUB, "rg1", kind.provider_path(), "r1");
        assert!(id.starts_with(&format!("/subscriptions/{SUB}/resourceGroups/rg1/providers/")));
        assert!(id.contains(provider), "{id}");
        assert!(id.ends_with(&format!("/{}/r1", kind.collection())), "{id}");
    }
}

#[test]
fn test_subnet_is_a_child_of_the_vnet() {
    let vnet = resource_id(SUB, "rg1", ResourceKind::VirtualNetwork.provider_path(), "vnet1");
    assert_eq!(
        subnet_id(SUB, "rg1", "vnet1", "frontend"),
        child_id(&vnet, "subnets", "frontend")
    );
}
