//! Request payload types for the provisioned topology.
//!
//! Every type here mirrors the management API wire shape: camelCase keys and
//! a `properties` envelope. The `default_*` functions are pure builders —
//! given a location, a name and the parent ids they produce the full request
//! payload with the sample's defaults, no I/O, deterministic.
//!
//! Sub-resource names inside the load balancer are fixed constants; the
//! workflow and the builders must agree on them because children are wired
//! together by id strings.

use serde::{Deserialize, Serialize};

use crate::naming::child_id;

/// Frontend IP configuration name on the public load balancer.
pub const FRONTEND_NAME: &str = "frontend";
/// Backend address pool name.
pub const BACKEND_POOL_NAME: &str = "backendpool";
/// HTTP health probe name.
pub const HTTP_PROBE_NAME: &str = "httpProbe";
/// HTTPS health probe name.
pub const HTTPS_PROBE_NAME: &str = "httpsProbe";
/// HTTP balancing rule name.
pub const HTTP_RULE_NAME: &str = "httpRule";
/// HTTPS balancing rule name.
pub const HTTPS_RULE_NAME: &str = "httpsRule";
/// Inbound NAT rule names, one per VM, mapping external ports to SSH.
pub const NAT_RULE_NAMES: [&str; 2] = ["natssh1", "natssh2"];
/// External ports of the two NAT rules.
pub const NAT_FRONTEND_PORTS: [u16; 2] = [5000, 5001];

/// Reference to another resource by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    /// Full resource id
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// SKU of a load balancer or public IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
}

// ============================================================================
// Virtual network
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetwork {
    pub location: String,
    pub properties: VirtualNetworkProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    pub address_space: AddressSpace,
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub name: String,
    pub properties: SubnetProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    pub address_prefix: String,
}

/// Subnet hosting the load balancer frontends and the VMs.
pub const FRONTEND_SUBNET: &str = "frontend";
/// Second subnet, used by the internal load balancer frontend.
pub const BACKEND_SUBNET: &str = "backend";

/// A /16 network with two /24 subnets.
pub fn default_vnet(location: &str) -> VirtualNetwork {
    VirtualNetwork {
        location: location.to_string(),
        properties: VirtualNetworkProperties {
            address_space: AddressSpace {
                address_prefixes: vec!["10.0.0.0/16".to_string()],
            },
            subnets: vec![
                Subnet {
                    name: FRONTEND_SUBNET.to_string(),
                    properties: SubnetProperties {
                        address_prefix: "10.0.1.0/24".to_string(),
                    },
                },
                Subnet {
                    name: BACKEND_SUBNET.to_string(),
                    properties: SubnetProperties {
                        address_prefix: "10.0.2.0/24".to_string(),
                    },
                },
            ],
        },
    }
}

// ============================================================================
// Public IP address
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddress {
    pub location: String,
    pub properties: PublicIpAddressProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    /// "Static" or "Dynamic"
    #[serde(rename = "publicIPAllocationMethod")]
    pub public_ip_allocation_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_settings: Option<DnsSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_in_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSettings {
    pub domain_name_label: String,
}

/// A statically allocated public IP with a DNS label.
pub fn default_public_ip(location: &str, dns_label: &str) -> PublicIpAddress {
    PublicIpAddress {
        location: location.to_string(),
        properties: PublicIpAddressProperties {
            public_ip_allocation_method: "Static".to_string(),
            dns_settings: Some(DnsSettings {
                domain_name_label: dns_label.to_string(),
            }),
            idle_timeout_in_minutes: Some(10),
        },
    }
}

// ============================================================================
// Load balancer
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    pub properties: LoadBalancerProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadBalancerProperties {
    #[serde(rename = "frontendIPConfigurations")]
    pub frontend_ip_configurations: Vec<FrontendIpConfiguration>,
    pub backend_address_pools: Vec<BackendAddressPool>,
    pub probes: Vec<Probe>,
    pub load_balancing_rules: Vec<LoadBalancingRule>,
    pub inbound_nat_rules: Vec<InboundNatRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendIpConfiguration {
    pub name: String,
    pub properties: FrontendIpConfigurationProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontendIpConfigurationProperties {
    #[serde(rename = "publicIPAddress", skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    #[serde(rename = "privateIPAllocationMethod", skip_serializing_if = "Option::is_none")]
    pub private_ip_allocation_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendAddressPool {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub name: String,
    pub properties: ProbeProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeProperties {
    /// "Http", "Https" or "Tcp"
    pub protocol: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
    pub interval_in_seconds: u32,
    pub number_of_probes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancingRule {
    pub name: String,
    pub properties: LoadBalancingRuleProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancingRuleProperties {
    pub protocol: String,
    pub frontend_port: u16,
    pub backend_port: u16,
    pub idle_timeout_in_minutes: u32,
    pub enable_floating_ip: bool,
    #[serde(rename = "frontendIPConfiguration")]
    pub frontend_ip_configuration: SubResource,
    pub backend_address_pool: SubResource,
    pub probe: SubResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundNatRule {
    pub name: String,
    pub properties: InboundNatRuleProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundNatRuleProperties {
    pub protocol: String,
    pub frontend_port: u16,
    pub backend_port: u16,
    #[serde(rename = "frontendIPConfiguration")]
    pub frontend_ip_configuration: SubResource,
}

/// The internet-facing load balancer: one public frontend, one backend
/// pool, HTTP/HTTPS probes and rules, and one SSH NAT rule per VM.
///
/// `lb_id` is the id the balancer will have once created; sub-resources
/// reference each other through ids derived from it.
pub fn default_load_balancer(location: &str, lb_id: &str, public_ip_id: &str) -> LoadBalancer {
    let frontend_id = child_id(lb_id, "frontendIPConfigurations", FRONTEND_NAME);
    let pool_id = child_id(lb_id, "backendAddressPools", BACKEND_POOL_NAME);

    let rule = |name: &str, probe_name: &str, port: u16| LoadBalancingRule {
        name: name.to_string(),
        properties: LoadBalancingRuleProperties {
            protocol: "Tcp".to_string(),
            frontend_port: port,
            backend_port: port,
            idle_timeout_in_minutes: 4,
            enable_floating_ip: false,
            frontend_ip_configuration: SubResource::new(&frontend_id),
            backend_address_pool: SubResource::new(&pool_id),
            probe: SubResource::new(child_id(lb_id, "probes", probe_name)),
        },
    };

    let probe = |name: &str, protocol: &str, port: u16| Probe {
        name: name.to_string(),
        properties: ProbeProperties {
            protocol: protocol.to_string(),
            port,
            request_path: Some("/".to_string()),
            interval_in_seconds: 10,
            number_of_probes: 2,
        },
    };

    let nat_rules = NAT_RULE_NAMES
        .iter()
        .zip(NAT_FRONTEND_PORTS)
        .map(|(name, port)| InboundNatRule {
            name: (*name).to_string(),
            properties: InboundNatRuleProperties {
                protocol: "Tcp".to_string(),
                frontend_port: port,
                backend_port: 22,
                frontend_ip_configuration: SubResource::new(&frontend_id),
            },
        })
        .collect();

    LoadBalancer {
        location: location.to_string(),
        sku: Some(Sku {
            name: "Standard".to_string(),
        }),
        properties: LoadBalancerProperties {
            frontend_ip_configurations: vec![FrontendIpConfiguration {
                name: FRONTEND_NAME.to_string(),
                properties: FrontendIpConfigurationProperties {
                    public_ip_address: Some(SubResource::new(public_ip_id)),
                    subnet: None,
                    private_ip_allocation_method: None,
                },
            }],
            backend_address_pools: vec![BackendAddressPool {
                name: BACKEND_POOL_NAME.to_string(),
            }],
            probes: vec![
                probe(HTTP_PROBE_NAME, "Http", 80),
                probe(HTTPS_PROBE_NAME, "Https", 443),
            ],
            load_balancing_rules: vec![
                rule(HTTP_RULE_NAME, HTTP_PROBE_NAME, 80),
                rule(HTTPS_RULE_NAME, HTTPS_PROBE_NAME, 443),
            ],
            inbound_nat_rules: nat_rules,
        },
    }
}

/// A second, internal-facing balancer whose frontend sits on a subnet
/// instead of a public IP.
pub fn internal_load_balancer(location: &str, lb_id: &str, subnet_id: &str) -> LoadBalancer {
    let frontend_id = child_id(lb_id, "frontendIPConfigurations", FRONTEND_NAME);
    let pool_id = child_id(lb_id, "backendAddressPools", BACKEND_POOL_NAME);

    LoadBalancer {
        location: location.to_string(),
        sku: Some(Sku {
            name: "Standard".to_string(),
        }),
        properties: LoadBalancerProperties {
            frontend_ip_configurations: vec![FrontendIpConfiguration {
                name: FRONTEND_NAME.to_string(),
                properties: FrontendIpConfigurationProperties {
                    public_ip_address: None,
                    subnet: Some(SubResource::new(subnet_id)),
                    private_ip_allocation_method: Some("Dynamic".to_string()),
                },
            }],
            backend_address_pools: vec![BackendAddressPool {
                name: BACKEND_POOL_NAME.to_string(),
            }],
            probes: vec![Probe {
                name: HTTP_PROBE_NAME.to_string(),
                properties: ProbeProperties {
                    protocol: "Http".to_string(),
                    port: 80,
                    request_path: Some("/".to_string()),
                    interval_in_seconds: 10,
                    number_of_probes: 2,
                },
            }],
            load_balancing_rules: vec![LoadBalancingRule {
                name: HTTP_RULE_NAME.to_string(),
                properties: LoadBalancingRuleProperties {
                    protocol: "Tcp".to_string(),
                    frontend_port: 80,
                    backend_port: 80,
                    idle_timeout_in_minutes: 4,
                    enable_floating_ip: false,
                    frontend_ip_configuration: SubResource::new(&frontend_id),
                    backend_address_pool: SubResource::new(&pool_id),
                    probe: SubResource::new(child_id(lb_id, "probes", HTTP_PROBE_NAME)),
                },
            }],
            inbound_nat_rules: Vec::new(),
        },
    }
}

// ============================================================================
// Network interface
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub location: String,
    pub properties: NetworkInterfaceProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    pub ip_configurations: Vec<NicIpConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicIpConfiguration {
    pub name: String,
    pub properties: NicIpConfigurationProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicIpConfigurationProperties {
    pub subnet: SubResource,
    #[serde(rename = "privateIPAllocationMethod")]
    pub private_ip_allocation_method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancer_backend_address_pools: Vec<SubResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancer_inbound_nat_rules: Vec<SubResource>,
}

/// A NIC on `subnet_id`, joined to one backend pool and one NAT rule.
pub fn default_nic(
    location: &str,
    subnet_id: &str,
    backend_pool_id: &str,
    nat_rule_id: &str,
) -> NetworkInterface {
    NetworkInterface {
        location: location.to_string(),
        properties: NetworkInterfaceProperties {
            ip_configurations: vec![NicIpConfiguration {
                name: "primary".to_string(),
                properties: NicIpConfigurationProperties {
                    subnet: SubResource::new(subnet_id),
                    private_ip_allocation_method: "Dynamic".to_string(),
                    load_balancer_backend_address_pools: vec![SubResource::new(backend_pool_id)],
                    load_balancer_inbound_nat_rules: vec![SubResource::new(nat_rule_id)],
                },
            }],
        },
    }
}

// ============================================================================
// Availability set
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySet {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    pub properties: AvailabilitySetProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySetProperties {
    pub platform_fault_domain_count: u32,
    pub platform_update_domain_count: u32,
}

/// An aligned availability set spreading the sample VMs across
/// fault/update domains.
pub fn default_availability_set(location: &str) -> AvailabilitySet {
    AvailabilitySet {
        location: location.to_string(),
        sku: Some(Sku {
            name: "Aligned".to_string(),
        }),
        properties: AvailabilitySetProperties {
            platform_fault_domain_count: 2,
            platform_update_domain_count: 5,
        },
    }
}

// ============================================================================
// Virtual machine
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    pub location: String,
    pub properties: VirtualMachineProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    pub hardware_profile: HardwareProfile,
    pub storage_profile: StorageProfile,
    pub os_profile: OsProfile,
    pub network_profile: NetworkProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_set: Option<SubResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub image_reference: ImageReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsProfile {
    pub computer_name: String,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub network_interfaces: Vec<SubResource>,
}

/// A small Ubuntu VM attached to one NIC and the availability set.
pub fn default_vm(
    location: &str,
    computer_name: &str,
    admin_username: &str,
    admin_password: &str,
    nic_id: &str,
    availability_set_id: &str,
) -> VirtualMachine {
    VirtualMachine {
        location: location.to_string(),
        properties: VirtualMachineProperties {
            hardware_profile: HardwareProfile {
                vm_size: "Standard_B1s".to_string(),
            },
            storage_profile: StorageProfile {
                image_reference: ImageReference {
                    publisher: "Canonical".to_string(),
                    offer: "0001-com-ubuntu-server-jammy".to_string(),
                    sku: "22_04-lts-gen2".to_string(),
                    version: "latest".to_string(),
                },
            },
            os_profile: OsProfile {
                computer_name: computer_name.to_string(),
                admin_username: admin_username.to_string(),
                admin_password: admin_password.to_string(),
            },
            network_profile: NetworkProfile {
                network_interfaces: vec![SubResource::new(nic_id)],
            },
            availability_set: Some(SubResource::new(availability_set_id)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{resource_id, subnet_id};

    const SUB: &str = "00000000-0000-0000-0000-000000000000";

    #[test]
    fn test_default_vnet_shape() {
        let vnet = default_vnet("westus");
        assert_eq!(vnet.location, "westus");
        assert_eq!(vnet.properties.address_space.address_prefixes, vec!["10.0.0.0/16"]);
        assert_eq!(vnet.properties.subnets.len(), 2);
        assert_eq!(vnet.properties.subnets[0].name, FRONTEND_SUBNET);
        assert_eq!(vnet.properties.subnets[1].name, BACKEND_SUBNET);
    }

    #[test]
    fn test_vnet_serializes_camel_case() {
        let json = serde_json::to_value(default_vnet("westus")).unwrap();
        assert!(json["properties"]["addressSpace"]["addressPrefixes"].is_array());
        assert_eq!(
            json["properties"]["subnets"][0]["properties"]["addressPrefix"],
            "10.0.1.0/24"
        );
    }

    #[test]
    fn test_default_public_ip_is_static_with_label() {
        let pip = default_public_ip("westus", "mylabel");
        assert_eq!(pip.properties.public_ip_allocation_method, "Static");
        assert_eq!(
            pip.properties.dns_settings.as_ref().unwrap().domain_name_label,
            "mylabel"
        );
    }

    #[test]
    fn test_default_load_balancer_wiring() {
        let lb_id = resource_id(SUB, "rg1", "Microsoft.Network/loadBalancers", "lb1");
        let pip_id = resource_id(SUB, "rg1", "Microsoft.Network/publicIPAddresses", "pip1");
        let lb = default_load_balancer("westus", &lb_id, &pip_id);

        assert_eq!(lb.properties.frontend_ip_configurations.len(), 1);
        assert_eq!(
            lb.properties.frontend_ip_configurations[0]
                .properties
                .public_ip_address
                .as_ref()
                .unwrap()
                .id,
            pip_id
        );
        assert_eq!(lb.properties.backend_address_pools.len(), 1);
        assert_eq!(lb.properties.probes.len(), 2);
        assert_eq!(lb.properties.load_balancing_rules.len(), 2);
        assert_eq!(lb.properties.inbound_nat_rules.len(), 2);

        // Every rule points at children of the balancer itself.
        for rule in &lb.properties.load_balancing_rules {
            assert!(rule.properties.frontend_ip_configuration.id.starts_with(&lb_id));
            assert!(rule.properties.backend_address_pool.id.starts_with(&lb_id));
            assert!(rule.properties.probe.id.starts_with(&lb_id));
        }
        for nat in &lb.properties.inbound_nat_rules {
            assert_eq!(nat.properties.backend_port, 22);
            assert!(nat.properties.frontend_ip_configuration.id.starts_with(&lb_id));
        }
    }

    #[test]
    fn test_internal_load_balancer_uses_subnet_frontend() {
        let lb_id = resource_id(SUB, "rg1", "Microsoft.Network/loadBalancers", "lb2");
        let subnet = subnet_id(SUB, "rg1", "vnet1", BACKEND_SUBNET);
        let lb = internal_load_balancer("westus", &lb_id, &subnet);

        let frontend = &lb.properties.frontend_ip_configurations[0].properties;
        assert!(frontend.public_ip_address.is_none());
        assert_eq!(frontend.subnet.as_ref().unwrap().id, subnet);
        assert_eq!(frontend.private_ip_allocation_method.as_deref(), Some("Dynamic"));
    }

    #[test]
    fn test_default_nic_associations() {
        let subnet = subnet_id(SUB, "rg1", "vnet1", FRONTEND_SUBNET);
        let lb_id = resource_id(SUB, "rg1", "Microsoft.Network/loadBalancers", "lb1");
        let pool = child_id(&lb_id, "backendAddressPools", BACKEND_POOL_NAME);
        let nat = child_id(&lb_id, "inboundNatRules", NAT_RULE_NAMES[0]);

        let nic = default_nic("westus", &subnet, &pool, &nat);
        let ip_config = &nic.properties.ip_configurations[0].properties;
        assert_eq!(ip_config.subnet.id, subnet);
        assert_eq!(ip_config.load_balancer_backend_address_pools[0].id, pool);
        assert_eq!(ip_config.load_balancer_inbound_nat_rules[0].id, nat);
    }

    #[test]
    fn test_default_vm_profile() {
        let nic = resource_id(SUB, "rg1", "Microsoft.Network/networkInterfaces", "nic1");
        let avset = resource_id(SUB, "rg1", "Microsoft.Compute/availabilitySets", "avset1");
        let vm = default_vm("westus", "vm1", "lbadmin", "pw", &nic, &avset);

        assert_eq!(vm.properties.hardware_profile.vm_size, "Standard_B1s");
        assert_eq!(vm.properties.storage_profile.image_reference.publisher, "Canonical");
        assert_eq!(vm.properties.network_profile.network_interfaces[0].id, nic);
        assert_eq!(vm.properties.availability_set.as_ref().unwrap().id, avset);
    }

    #[test]
    fn test_load_balancer_properties_round_trip() {
        let lb_id = resource_id(SUB, "rg1", "Microsoft.Network/loadBalancers", "lb1");
        let pip_id = resource_id(SUB, "rg1", "Microsoft.Network/publicIPAddresses", "pip1");
        let lb = default_load_balancer("westus", &lb_id, &pip_id);

        let json = serde_json::to_value(&lb.properties).unwrap();
        let back: LoadBalancerProperties = serde_json::from_value(json).unwrap();
        assert_eq!(back.backend_address_pools.len(), 1);
        assert_eq!(back.probes.len(), 2);
        assert_eq!(back.inbound_nat_rules.len(), 2);
    }
}
