//! Provisioning and extension workflows
//!
//! Each step builds a descriptor, submits it and waits for the operation to
//! finish before returning. Steps that depend on another resource take the
//! earlier step's [`ProvisionedResource`], so nothing can be submitted with an
//! id that was not returned by a finished step.

use crate::descriptor::{self, ScaleSetParams};
use crate::error::Result;
use crate::operation::{PollConfig, poll_until_done};
use crate::provider::ResourceManager;
use crate::resource::{ProvisionedResource, ResourceKind, ResourcePath, ResourceRequest};
use crate::script;
use crate::secret::AdminCredentials;
use armflow_config::{ResourceNames, Settings};

/// Instance upgraded by the extension workflow
pub const UPGRADE_INSTANCE_ID: &str = "0";

/// Submit a create-or-update and wait for the resulting resource
pub async fn submit_and_wait<M>(
    manager: &M,
    request: &ResourceRequest,
    poll: &PollConfig,
) -> Result<ProvisionedResource>
where
    M: ResourceManager + ?Sized,
{
    tracing::debug!("Submitting {} {}", request.kind, request.path);
    let handle = manager.begin_create_or_update(request).await?;
    let outcome = poll_until_done(manager, &handle, poll).await?;

    let body = outcome.resource.unwrap_or_default();
    ProvisionedResource::from_body(request.kind, &body)
}

/// Submit an action and wait for its terminal status line
pub async fn act_and_wait<M>(
    manager: &M,
    request: &ResourceRequest,
    poll: &PollConfig,
) -> Result<String>
where
    M: ResourceManager + ?Sized,
{
    tracing::debug!("Submitting action {}", request.path);
    let handle = manager.begin_action(request).await?;
    let outcome = poll_until_done(manager, &handle, poll).await?;
    Ok(outcome.status)
}

/// Everything created by [`Workflow::provision`]
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub resource_group: ProvisionedResource,
    pub virtual_network: ProvisionedResource,
    pub subnet: ProvisionedResource,
    pub scale_set: ProvisionedResource,
    pub public_ip: ProvisionedResource,
    pub bastion_subnet: ProvisionedResource,
    pub bastion_host: ProvisionedResource,
    pub admin: AdminCredentials,
}

/// Result of [`Workflow::extend`]
#[derive(Debug, Clone)]
pub struct ExtensionReport {
    pub extension: ProvisionedResource,
    pub upgrade_status: String,
}

/// Fixed step sequence against one resource manager
pub struct Workflow<'a, M: ResourceManager + ?Sized> {
    manager: &'a M,
    settings: &'a Settings,
    names: ResourceNames,
    poll: PollConfig,
}

impl<'a, M: ResourceManager + ?Sized> Workflow<'a, M> {
    pub fn new(manager: &'a M, settings: &'a Settings) -> Self {
        Self {
            manager,
            settings,
            names: settings.names(),
            poll: PollConfig::fixed(settings.poll_interval),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    async fn create(&self, request: ResourceRequest) -> Result<ProvisionedResource> {
        let resource = submit_and_wait(self.manager, &request, &self.poll).await?;
        tracing::info!("{}: {}", resource.kind, resource.id);
        Ok(resource)
    }

    pub async fn create_resource_group(&self) -> Result<ProvisionedResource> {
        self.create(ResourceRequest::new(
            ResourceKind::ResourceGroup,
            ResourcePath::resource_group(&self.names.resource_group),
            &descriptor::resource_group(&self.settings.location),
        )?)
        .await
    }

    pub async fn create_virtual_network(&self) -> Result<ProvisionedResource> {
        self.create(ResourceRequest::new(
            ResourceKind::VirtualNetwork,
            ResourcePath::virtual_network(&self.names.resource_group, &self.names.virtual_network),
            &descriptor::virtual_network(
                &self.settings.location,
                &[descriptor::VIRTUAL_NETWORK_PREFIX],
            ),
        )?)
        .await
    }

    pub async fn create_subnet(
        &self,
        name: &str,
        address_prefix: &str,
    ) -> Result<ProvisionedResource> {
        self.create(ResourceRequest::new(
            ResourceKind::Subnet,
            ResourcePath::subnet(
                &self.names.resource_group,
                &self.names.virtual_network,
                name,
            ),
            &descriptor::subnet(address_prefix),
        )?)
        .await
    }

    pub async fn create_scale_set(
        &self,
        subnet: &ProvisionedResource,
        admin: &AdminCredentials,
    ) -> Result<ProvisionedResource> {
        let subnet_id = subnet.expect(ResourceKind::Subnet)?;
        let body = descriptor::scale_set(&ScaleSetParams {
            name: &self.names.scale_set,
            location: &self.settings.location,
            subnet_id,
            admin,
        });

        self.create(ResourceRequest::new(
            ResourceKind::VirtualMachineScaleSet,
            ResourcePath::scale_set(&self.names.resource_group, &self.names.scale_set),
            &body,
        )?)
        .await
    }

    pub async fn create_public_ip(&self) -> Result<ProvisionedResource> {
        self.create(ResourceRequest::new(
            ResourceKind::PublicIpAddress,
            ResourcePath::public_ip(&self.names.resource_group, &self.names.public_ip),
            &descriptor::public_ip(&self.names.public_ip, &self.settings.location),
        )?)
        .await
    }

    pub async fn create_bastion_host(
        &self,
        subnet: &ProvisionedResource,
        public_ip: &ProvisionedResource,
    ) -> Result<ProvisionedResource> {
        let subnet_id = subnet.expect(ResourceKind::Subnet)?;
        let public_ip_id = public_ip.expect(ResourceKind::PublicIpAddress)?;

        self.create(ResourceRequest::new(
            ResourceKind::BastionHost,
            ResourcePath::bastion_host(&self.names.resource_group, &self.names.bastion_host),
            &descriptor::bastion_host(
                &self.names.bastion_host,
                &self.settings.location,
                subnet_id,
                public_ip_id,
            ),
        )?)
        .await
    }

    pub async fn add_extension(&self) -> Result<ProvisionedResource> {
        self.create(ResourceRequest::new(
            ResourceKind::ScaleSetExtension,
            ResourcePath::scale_set_extension(
                &self.names.resource_group,
                &self.names.scale_set,
                &self.names.scale_set_extension,
            ),
            &descriptor::script_extension(
                script::encoded_provisioning_script(),
                self.settings.extension_version,
            ),
        )?)
        .await
    }

    /// Apply the scale set's current model to the given instances
    pub async fn upgrade_instances(&self, instance_ids: &[&str]) -> Result<String> {
        let request = ResourceRequest::new(
            ResourceKind::VirtualMachineScaleSet,
            ResourcePath::scale_set(&self.names.resource_group, &self.names.scale_set)
                .child("manualupgrade"),
            &descriptor::instance_ids(instance_ids),
        )?;

        let status = act_and_wait(self.manager, &request, &self.poll).await?;
        tracing::info!("virtual machine scale set vm updated: {}", status);
        Ok(status)
    }

    /// Resource group → network → subnet → scale set → public IP → bastion
    pub async fn provision(&self, admin: AdminCredentials) -> Result<ProvisionReport> {
        tracing::info!(
            "Provisioning {} in {} via {}",
            self.names.resource_group,
            self.settings.location,
            self.manager.name()
        );

        let resource_group = self.create_resource_group().await?;
        let virtual_network = self.create_virtual_network().await?;
        let subnet = self
            .create_subnet(&self.names.subnet, descriptor::SUBNET_PREFIX)
            .await?;
        let scale_set = self.create_scale_set(&subnet, &admin).await?;
        let public_ip = self.create_public_ip().await?;
        let bastion_subnet = self
            .create_subnet(&self.names.bastion_subnet, descriptor::BASTION_SUBNET_PREFIX)
            .await?;
        let bastion_host = self.create_bastion_host(&bastion_subnet, &public_ip).await?;

        Ok(ProvisionReport {
            resource_group,
            virtual_network,
            subnet,
            scale_set,
            public_ip,
            bastion_subnet,
            bastion_host,
            admin,
        })
    }

    /// Extension → upgrade of instance 0
    pub async fn extend(&self) -> Result<ExtensionReport> {
        tracing::info!(
            "Updating {} with extension version {}",
            self.names.scale_set,
            self.settings.extension_version
        );

        let extension = self.add_extension().await?;
        let upgrade_status = self.upgrade_instances(&[UPGRADE_INSTANCE_ID]).await?;

        Ok(ExtensionReport {
            extension,
            upgrade_status,
        })
    }
}
