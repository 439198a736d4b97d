//! The provisioning and teardown run.
//!
//! `Workflow::run` drives the whole sample topology in dependency order:
//! resource group, network, public balancer, NICs, availability set, VMs,
//! then the update / internal-balancer / list / delete exercises. Whatever
//! happens during provisioning, the resource group is deleted afterwards
//! (unless `keep` is set and everything succeeded), so a failed run does
//! not strand paid resources.

use std::sync::Arc;

use futures::try_join;
use serde_json::json;

use crate::client::{Resource, ResourceClient, ResourceKind};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::naming::{child_id, random_name, subnet_id};
use crate::output::Reporter;
use crate::resources::{
    self, LoadBalancerProperties, BACKEND_POOL_NAME, FRONTEND_SUBNET, NAT_RULE_NAMES,
};

/// Idle timeout (minutes) the update step raises every rule to.
const UPDATED_IDLE_TIMEOUT: u32 = 15;

/// The generated names for one run. All share the same random suffix
/// style so a run's resources are recognisable in the portal.
#[derive(Debug, Clone)]
pub struct TopologyNames {
    pub group: String,
    pub vnet: String,
    pub public_ip1: String,
    pub public_ip2: String,
    pub dns_label1: String,
    pub dns_label2: String,
    pub load_balancer1: String,
    pub load_balancer2: String,
    pub nic1: String,
    pub nic2: String,
    pub availability_set: String,
    pub vm1: String,
    pub vm2: String,
}

impl TopologyNames {
    pub fn generate(prefix: &str) -> Self {
        Self {
            group: random_name(&format!("{prefix}-rg-")),
            vnet: random_name(&format!("{prefix}-vnet-")),
            public_ip1: random_name(&format!("{prefix}-pip-")),
            public_ip2: random_name(&format!("{prefix}-pip-")),
            dns_label1: random_name(&format!("{prefix}dns")),
            dns_label2: random_name(&format!("{prefix}dns")),
            load_balancer1: random_name(&format!("{prefix}-lb-")),
            load_balancer2: random_name(&format!("{prefix}-ilb-")),
            nic1: random_name(&format!("{prefix}-nic-")),
            nic2: random_name(&format!("{prefix}-nic-")),
            availability_set: random_name(&format!("{prefix}-avset-")),
            vm1: random_name(&format!("{prefix}-vm-")),
            vm2: random_name(&format!("{prefix}-vm-")),
        }
    }
}

/// Outcome of a run. `error` is the provisioning failure, if any;
/// `cleanup_error` is a failure during teardown, reported separately so
/// a provisioning error is never masked by one.
#[derive(Debug)]
pub struct WorkflowReport {
    pub group: String,
    pub error: Option<Error>,
    pub cleanup_error: Option<Error>,
}

impl WorkflowReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.cleanup_error.is_none()
    }
}

pub struct Workflow {
    client: Arc<dyn ResourceClient>,
    settings: Settings,
    reporter: Reporter,
    subscription: String,
    names: TopologyNames,
}

impl Workflow {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        settings: Settings,
        reporter: Reporter,
        subscription: &str,
    ) -> Self {
        let names = TopologyNames::generate(&settings.prefix);
        Self::with_names(client, settings, reporter, subscription, names)
    }

    /// Like `new` but with fixed names, for tests.
    pub fn with_names(
        client: Arc<dyn ResourceClient>,
        settings: Settings,
        reporter: Reporter,
        subscription: &str,
        names: TopologyNames,
    ) -> Self {
        Self {
            client,
            settings,
            reporter,
            subscription: subscription.to_string(),
            names,
        }
    }

    pub fn names(&self) -> &TopologyNames {
        &self.names
    }

    /// Runs provisioning, then teardown. Teardown always runs after a
    /// failure; after success it is skipped only when `keep` is set.
    pub async fn run(&self) -> WorkflowReport {
        let error = self.provision().await.err();
        if let Some(err) = &error {
            self.reporter.error(&format!("provisioning failed: {err}"));
        }

        let cleanup_error = if error.is_none() && self.settings.keep {
            self.reporter.warn(&format!(
                "keeping resource group {} as requested",
                self.names.group
            ));
            None
        } else {
            self.cleanup().await.err()
        };
        if let Some(err) = &cleanup_error {
            self.reporter.error(&format!("cleanup failed: {err}"));
        }

        WorkflowReport {
            group: self.names.group.clone(),
            error,
            cleanup_error,
        }
    }

    /// Deletes the resource group and everything in it. Absence is fine,
    /// a failed run may not have gotten far enough to create it.
    pub async fn cleanup(&self) -> Result<()> {
        self.reporter.section("Cleaning up");
        match self.client.delete_resource_group(&self.names.group).await {
            Ok(()) => {
                self.reporter
                    .info(&format!("deleted resource group {}", self.names.group));
                Ok(())
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn id(&self, kind: ResourceKind, name: &str) -> String {
        crate::naming::resource_id(
            &self.subscription,
            &self.names.group,
            kind.provider_path(),
            name,
        )
    }

    async fn provision(&self) -> Result<()> {
        let n = &self.names;
        let location = &self.settings.location;
        let client = &self.client;

        // 1. Resource group
        self.reporter.section("Creating resource group");
        let group = client.create_resource_group(&n.group, location).await?;
        self.reporter.resource("created", &n.group, &group.id);

        // 2. Virtual network with frontend/backend subnets
        self.reporter.section("Creating virtual network");
        let vnet = self
            .create(ResourceKind::VirtualNetwork, &n.vnet, resources::default_vnet(location))
            .await?;
        self.reporter.resource("created", &n.vnet, &vnet.id);

        // 3. Public IP for the public balancer
        self.reporter.section("Creating public IP address");
        let pip1 = self
            .create(
                ResourceKind::PublicIpAddress,
                &n.public_ip1,
                resources::default_public_ip(location, &n.dns_label1),
            )
            .await?;
        self.reporter.resource("created", &n.public_ip1, &pip1.id);

        // 4. Public load balancer with probes, rules and NAT
        self.reporter.section("Creating load balancer");
        let lb1_id = self.id(ResourceKind::LoadBalancer, &n.load_balancer1);
        let lb1 = self
            .create(
                ResourceKind::LoadBalancer,
                &n.load_balancer1,
                resources::default_load_balancer(location, &lb1_id, &pip1.id),
            )
            .await?;
        self.reporter.resource("created", &n.load_balancer1, &lb1.id);

        // 5. Two NICs in the frontend subnet, one per NAT rule
        self.reporter.section("Creating network interfaces");
        let subnet = subnet_id(&self.subscription, &n.group, &n.vnet, FRONTEND_SUBNET);
        let pool = child_id(&lb1.id, "backendAddressPools", BACKEND_POOL_NAME);
        let (nic1, nic2) = try_join!(
            self.create(
                ResourceKind::NetworkInterface,
                &n.nic1,
                resources::default_nic(
                    location,
                    &subnet,
                    &pool,
                    &child_id(&lb1.id, "inboundNatRules", NAT_RULE_NAMES[0]),
                ),
            ),
            self.create(
                ResourceKind::NetworkInterface,
                &n.nic2,
                resources::default_nic(
                    location,
                    &subnet,
                    &pool,
                    &child_id(&lb1.id, "inboundNatRules", NAT_RULE_NAMES[1]),
                ),
            ),
        )?;
        self.reporter.resource("created", &n.nic1, &nic1.id);
        self.reporter.resource("created", &n.nic2, &nic2.id);

        // 6. Availability set
        self.reporter.section("Creating availability set");
        let avset = self
            .create(
                ResourceKind::AvailabilitySet,
                &n.availability_set,
                resources::default_availability_set(location),
            )
            .await?;
        self.reporter.resource("created", &n.availability_set, &avset.id);

        // 7. Two VMs behind the balancer
        self.reporter.section("Creating virtual machines");
        let (vm1, vm2) = try_join!(
            self.create(
                ResourceKind::VirtualMachine,
                &n.vm1,
                resources::default_vm(
                    location,
                    &n.vm1,
                    &self.settings.admin_username,
                    &self.settings.admin_password,
                    &nic1.id,
                    &avset.id,
                ),
            ),
            self.create(
                ResourceKind::VirtualMachine,
                &n.vm2,
                resources::default_vm(
                    location,
                    &n.vm2,
                    &self.settings.admin_username,
                    &self.settings.admin_password,
                    &nic2.id,
                    &avset.id,
                ),
            ),
        )?;
        self.reporter.resource("created", &n.vm1, &vm1.id);
        self.reporter.resource("created", &n.vm2, &vm2.id);

        // 8. Update: raise the idle timeout on every balancing rule
        self.reporter.section("Updating load balancer idle timeout");
        let updated = self.raise_idle_timeout(&n.load_balancer1).await?;
        self.reporter
            .resource("updated", &n.load_balancer1, &updated.id);

        // 9. Second public IP plus an internal balancer on the frontend subnet
        self.reporter.section("Creating internal load balancer");
        let pip2 = self
            .create(
                ResourceKind::PublicIpAddress,
                &n.public_ip2,
                resources::default_public_ip(location, &n.dns_label2),
            )
            .await?;
        self.reporter.resource("created", &n.public_ip2, &pip2.id);
        let lb2_id = self.id(ResourceKind::LoadBalancer, &n.load_balancer2);
        let lb2 = self
            .create(
                ResourceKind::LoadBalancer,
                &n.load_balancer2,
                resources::internal_load_balancer(location, &lb2_id, &subnet),
            )
            .await?;
        self.reporter.resource("created", &n.load_balancer2, &lb2.id);

        // 10. List the balancers in the group
        self.reporter.section("Listing load balancers");
        let balancers = client.list(ResourceKind::LoadBalancer, &n.group).await?;
        for lb in &balancers {
            self.reporter.resource("found", &lb.name, &lb.id);
        }

        // 11. Delete the internal balancer on its own
        self.reporter.section("Deleting internal load balancer");
        client
            .delete(ResourceKind::LoadBalancer, &n.group, &n.load_balancer2)
            .await?;
        self.reporter
            .info(&format!("deleted load balancer {}", n.load_balancer2));

        Ok(())
    }

    async fn create<T: serde::Serialize>(
        &self,
        kind: ResourceKind,
        name: &str,
        payload: T,
    ) -> Result<Resource> {
        let body = serde_json::to_value(payload)?;
        self.client
            .create_or_update(kind, &self.names.group, name, body)
            .await
    }

    /// Read-modify-write on the public balancer: fetch the current rules,
    /// bump every idle timeout, and PUT the full object back. Pools,
    /// probes and NAT rules ride along unchanged.
    async fn raise_idle_timeout(&self, name: &str) -> Result<Resource> {
        let current = self
            .client
            .get(ResourceKind::LoadBalancer, &self.names.group, name)
            .await?;
        let mut properties: LoadBalancerProperties =
            serde_json::from_value(current.properties.clone())?;
        for rule in &mut properties.load_balancing_rules {
            rule.properties.idle_timeout_in_minutes = UPDATED_IDLE_TIMEOUT;
        }
        let body = json!({
            "location": current.location.as_deref().unwrap_or(&self.settings.location),
            "sku": resources::Sku { name: "Standard".to_string() },
            "properties": serde_json::to_value(&properties)?,
        });
        self.client
            .create_or_update(ResourceKind::LoadBalancer, &self.names.group, name, body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockResourceClient;

    fn names() -> TopologyNames {
        TopologyNames {
            group: "rg1".into(),
            vnet: "vnet1".into(),
            public_ip1: "pip1".into(),
            public_ip2: "pip2".into(),
            dns_label1: "dns1".into(),
            dns_label2: "dns2".into(),
            load_balancer1: "lb1".into(),
            load_balancer2: "lb2".into(),
            nic1: "nic1".into(),
            nic2: "nic2".into(),
            availability_set: "avset1".into(),
            vm1: "vm1".into(),
            vm2: "vm2".into(),
        }
    }

    #[tokio::test]
    async fn test_group_failure_still_cleans_up() {
        let mut mock = MockResourceClient::new();
        mock.expect_create_resource_group()
            .times(1)
            .returning(|_, _| Err(Error::api(500, "InternalServerError", "boom")));
        // Nothing past the group may be created.
        mock.expect_create_or_update().times(0);
        mock.expect_delete_resource_group()
            .times(1)
            .returning(|_| Ok(()));

        let (reporter, _capture) = Reporter::capture();
        let workflow = Workflow::with_names(
            Arc::new(mock),
            Settings::default(),
            reporter,
            "00000000-0000-0000-0000-000000000000",
            names(),
        );
        let report = workflow.run().await;
        assert!(report.error.is_some());
        assert!(report.cleanup_error.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_swallows_absent_group() {
        let mut mock = MockResourceClient::new();
        mock.expect_delete_resource_group()
            .times(1)
            .returning(|name| Err(Error::not_found("resourceGroups", name)));

        let (reporter, _capture) = Reporter::capture();
        let workflow = Workflow::with_names(
            Arc::new(mock),
            Settings::default(),
            reporter,
            "00000000-0000-0000-0000-000000000000",
            names(),
        );
        workflow.cleanup().await.unwrap();
    }

    #[test]
    fn test_generated_names_share_prefix() {
        let names = TopologyNames::generate("demo");
        assert!(names.group.starts_with("demo-rg-"));
        assert!(names.vnet.starts_with("demo-vnet-"));
        assert!(names.dns_label1.starts_with("demodns"));
        assert_ne!(names.nic1, names.nic2);
    }
}
