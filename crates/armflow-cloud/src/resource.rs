//! Resource kinds, request paths and provisioned results

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// Kind of remote resource a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ResourceGroup,
    VirtualNetwork,
    Subnet,
    PublicIpAddress,
    BastionHost,
    VirtualMachineScaleSet,
    ScaleSetExtension,
}

impl ResourceKind {
    /// ARM api-version used for requests against this kind
    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "2021-04-01",
            ResourceKind::VirtualNetwork
            | ResourceKind::Subnet
            | ResourceKind::PublicIpAddress
            | ResourceKind::BastionHost => "2021-05-01",
            ResourceKind::VirtualMachineScaleSet | ResourceKind::ScaleSetExtension => {
                "2021-07-01"
            }
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::ResourceGroup => write!(f, "resource group"),
            ResourceKind::VirtualNetwork => write!(f, "virtual network"),
            ResourceKind::Subnet => write!(f, "subnet"),
            ResourceKind::PublicIpAddress => write!(f, "public IP"),
            ResourceKind::BastionHost => write!(f, "bastion host"),
            ResourceKind::VirtualMachineScaleSet => write!(f, "virtual machine scale set"),
            ResourceKind::ScaleSetExtension => write!(f, "virtual machine scale set extension"),
        }
    }
}

/// Resource path relative to `/subscriptions/{id}/`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn resource_group(group: &str) -> Self {
        Self(format!("resourceGroups/{}", group))
    }

    pub fn virtual_network(group: &str, network: &str) -> Self {
        Self::network(group, "virtualNetworks", network)
    }

    pub fn subnet(group: &str, network: &str, subnet: &str) -> Self {
        Self::virtual_network(group, network).child("subnets").child(subnet)
    }

    pub fn public_ip(group: &str, name: &str) -> Self {
        Self::network(group, "publicIPAddresses", name)
    }

    pub fn bastion_host(group: &str, name: &str) -> Self {
        Self::network(group, "bastionHosts", name)
    }

    pub fn scale_set(group: &str, name: &str) -> Self {
        Self(format!(
            "resourceGroups/{}/providers/Microsoft.Compute/virtualMachineScaleSets/{}",
            group, name
        ))
    }

    pub fn scale_set_extension(group: &str, scale_set: &str, extension: &str) -> Self {
        Self::scale_set(group, scale_set)
            .child("extensions")
            .child(extension)
    }

    fn network(group: &str, collection: &str, name: &str) -> Self {
        Self(format!(
            "resourceGroups/{}/providers/Microsoft.Network/{}/{}",
            group, collection, name
        ))
    }

    /// Append a path segment (child collection, child name or action)
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully built request: target, api-version source and JSON body
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub kind: ResourceKind,
    pub path: ResourcePath,
    pub body: serde_json::Value,
}

impl ResourceRequest {
    pub fn new<T: Serialize>(kind: ResourceKind, path: ResourcePath, body: &T) -> Result<Self> {
        Ok(Self {
            kind,
            path,
            body: serde_json::to_value(body)?,
        })
    }

    pub fn api_version(&self) -> &'static str {
        self.kind.api_version()
    }
}

/// A resource returned by a finished create-or-update operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedResource {
    pub kind: ResourceKind,

    /// Full resource id (`/subscriptions/.../name`)
    pub id: String,

    pub name: Option<String>,

    pub provisioning_state: Option<String>,
}

impl ProvisionedResource {
    /// Extract the resource identity from a response body
    pub fn from_body(kind: ResourceKind, body: &serde_json::Value) -> Result<Self> {
        let id = body
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .ok_or(CloudError::MissingIdentifier(kind))?;

        Ok(Self {
            kind,
            id: id.to_string(),
            name: body.get("name").and_then(|v| v.as_str()).map(String::from),
            provisioning_state: body
                .pointer("/properties/provisioningState")
                .and_then(|v| v.as_str())
                .map(String::from),
        })
    }

    /// Use this resource as a dependency of the given kind
    pub fn expect(&self, kind: ResourceKind) -> Result<&str> {
        if self.kind != kind {
            return Err(CloudError::InvalidDependency {
                expected: kind,
                actual: self.kind,
            });
        }
        Ok(&self.id)
    }
}
