//! Desired-state descriptors
//!
//! One builder per resource kind. Builders are pure: they only shape the JSON
//! body that a provisioning step submits.

use crate::secret::AdminCredentials;
use serde::Serialize;

pub const VIRTUAL_NETWORK_PREFIX: &str = "10.1.0.0/16";
pub const SUBNET_PREFIX: &str = "10.1.0.0/24";
pub const BASTION_SUBNET_PREFIX: &str = "10.1.1.0/24";

pub const SCALE_SET_SKU: &str = "Basic_A0";
pub const SCALE_SET_CAPACITY: i64 = 1;
pub const COMPUTER_NAME_PREFIX: &str = "vmss";

pub const BASTION_IP_CONFIGURATION: &str = "IpConf";

pub const EXTENSION_PUBLISHER: &str = "Microsoft.Azure.Extensions";
pub const EXTENSION_TYPE: &str = "CustomScript";
pub const EXTENSION_HANDLER_VERSION: &str = "2.1";

/// Reference to another resource by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubResource {
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// ============ Resource group ============

#[derive(Debug, Clone, Serialize)]
pub struct ResourceGroup {
    pub location: String,
}

pub fn resource_group(location: &str) -> ResourceGroup {
    ResourceGroup {
        location: location.to_string(),
    }
}

// ============ Network ============

#[derive(Debug, Clone, Serialize)]
pub struct VirtualNetwork {
    pub location: String,
    pub properties: VirtualNetworkProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    pub address_space: AddressSpace,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<String>,
}

pub fn virtual_network(location: &str, address_prefixes: &[&str]) -> VirtualNetwork {
    VirtualNetwork {
        location: location.to_string(),
        properties: VirtualNetworkProperties {
            address_space: AddressSpace {
                address_prefixes: address_prefixes.iter().map(|p| p.to_string()).collect(),
            },
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subnet {
    pub properties: SubnetProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    pub address_prefix: String,
}

pub fn subnet(address_prefix: &str) -> Subnet {
    Subnet {
        properties: SubnetProperties {
            address_prefix: address_prefix.to_string(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IpAllocationMethod {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublicIpSkuName {
    Basic,
    Standard,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicIpAddress {
    pub name: String,
    pub location: String,
    pub sku: PublicIpSku,
    pub properties: PublicIpAddressProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicIpSku {
    pub name: PublicIpSkuName,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicIpAddressProperties {
    #[serde(rename = "publicIPAllocationMethod")]
    pub allocation_method: IpAllocationMethod,
}

/// Static, Standard-SKU address (the SKU a bastion host requires)
pub fn public_ip(name: &str, location: &str) -> PublicIpAddress {
    PublicIpAddress {
        name: name.to_string(),
        location: location.to_string(),
        sku: PublicIpSku {
            name: PublicIpSkuName::Standard,
        },
        properties: PublicIpAddressProperties {
            allocation_method: IpAllocationMethod::Static,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BastionHost {
    pub name: String,
    pub location: String,
    pub properties: BastionHostProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BastionHostProperties {
    pub ip_configurations: Vec<BastionIpConfiguration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BastionIpConfiguration {
    pub name: String,
    pub properties: BastionIpConfigurationProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct BastionIpConfigurationProperties {
    #[serde(rename = "publicIPAddress")]
    pub public_ip_address: SubResource,
    pub subnet: SubResource,
}

pub fn bastion_host(
    name: &str,
    location: &str,
    subnet_id: &str,
    public_ip_id: &str,
) -> BastionHost {
    BastionHost {
        name: name.to_string(),
        location: location.to_string(),
        properties: BastionHostProperties {
            ip_configurations: vec![BastionIpConfiguration {
                name: BASTION_IP_CONFIGURATION.to_string(),
                properties: BastionIpConfigurationProperties {
                    public_ip_address: SubResource::new(public_ip_id),
                    subnet: SubResource::new(subnet_id),
                },
            }],
        },
    }
}

// ============ Compute ============

#[derive(Debug, Clone, Serialize)]
pub struct VirtualMachineScaleSet {
    pub location: String,
    pub sku: Sku,
    pub properties: ScaleSetProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sku {
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetProperties {
    pub overprovision: bool,
    pub upgrade_policy: UpgradePolicy,
    pub virtual_machine_profile: VirtualMachineProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpgradeMode {
    Automatic,
    Manual,
    Rolling,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradePolicy {
    pub mode: UpgradeMode,
    #[serde(rename = "automaticOSUpgradePolicy")]
    pub automatic_os_upgrade_policy: AutomaticOsUpgradePolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutomaticOsUpgradePolicy {
    #[serde(rename = "enableAutomaticOSUpgrade")]
    pub enable_automatic_os_upgrade: bool,
    #[serde(rename = "disableAutomaticRollback")]
    pub disable_automatic_rollback: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProfile {
    pub os_profile: OsProfile,
    pub storage_profile: StorageProfile,
    pub network_profile: NetworkProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OsProfile {
    pub computer_name_prefix: String,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub image_reference: ImageReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl ImageReference {
    pub fn ubuntu_18_04() -> Self {
        Self {
            publisher: "Canonical".to_string(),
            offer: "UbuntuServer".to_string(),
            sku: "18.04-LTS".to_string(),
            version: "latest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub network_interface_configurations: Vec<NetworkInterfaceConfiguration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkInterfaceConfiguration {
    pub name: String,
    pub properties: NetworkInterfaceProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkInterfaceProperties {
    pub primary: bool,
    #[serde(rename = "enableIPForwarding")]
    pub enable_ip_forwarding: bool,
    #[serde(rename = "ipConfigurations")]
    pub ip_configurations: Vec<IpConfiguration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IpConfiguration {
    pub name: String,
    pub properties: IpConfigurationProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct IpConfigurationProperties {
    pub subnet: SubResource,
}

/// Inputs of the scale set builder
#[derive(Debug, Clone)]
pub struct ScaleSetParams<'a> {
    pub name: &'a str,
    pub location: &'a str,
    pub subnet_id: &'a str,
    pub admin: &'a AdminCredentials,
}

/// Single-instance Ubuntu scale set with manual upgrades, attached to one subnet
pub fn scale_set(params: &ScaleSetParams<'_>) -> VirtualMachineScaleSet {
    VirtualMachineScaleSet {
        location: params.location.to_string(),
        sku: Sku {
            name: SCALE_SET_SKU.to_string(),
            capacity: SCALE_SET_CAPACITY,
        },
        properties: ScaleSetProperties {
            overprovision: false,
            upgrade_policy: UpgradePolicy {
                mode: UpgradeMode::Manual,
                automatic_os_upgrade_policy: AutomaticOsUpgradePolicy {
                    enable_automatic_os_upgrade: false,
                    disable_automatic_rollback: false,
                },
            },
            virtual_machine_profile: VirtualMachineProfile {
                os_profile: OsProfile {
                    computer_name_prefix: COMPUTER_NAME_PREFIX.to_string(),
                    admin_username: params.admin.username.clone(),
                    admin_password: params.admin.password.clone(),
                },
                storage_profile: StorageProfile {
                    image_reference: ImageReference::ubuntu_18_04(),
                },
                network_profile: NetworkProfile {
                    network_interface_configurations: vec![NetworkInterfaceConfiguration {
                        name: params.name.to_string(),
                        properties: NetworkInterfaceProperties {
                            primary: true,
                            enable_ip_forwarding: true,
                            ip_configurations: vec![IpConfiguration {
                                name: params.name.to_string(),
                                properties: IpConfigurationProperties {
                                    subnet: SubResource::new(params.subnet_id),
                                },
                            }],
                        },
                    }],
                },
            },
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaleSetExtension {
    pub properties: ScaleSetExtensionProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetExtensionProperties {
    pub publisher: String,
    #[serde(rename = "type")]
    pub extension_type: String,
    pub type_handler_version: String,
    pub auto_upgrade_minor_version: bool,
    pub protected_settings: ProtectedSettings,
    pub force_update_tag: String,
}

/// Secret-bearing settings; never echoed back by the API
#[derive(Clone, Serialize)]
pub struct ProtectedSettings {
    pub script: String,
}

impl std::fmt::Debug for ProtectedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedSettings")
            .field("script", &"<redacted>")
            .finish()
    }
}

/// Custom-script extension running `encoded_script`
///
/// Bumping `version` changes `forceUpdateTag`, which makes the platform run
/// the script again even when nothing else changed.
pub fn script_extension(encoded_script: String, version: u32) -> ScaleSetExtension {
    ScaleSetExtension {
        properties: ScaleSetExtensionProperties {
            publisher: EXTENSION_PUBLISHER.to_string(),
            extension_type: EXTENSION_TYPE.to_string(),
            type_handler_version: EXTENSION_HANDLER_VERSION.to_string(),
            auto_upgrade_minor_version: true,
            protected_settings: ProtectedSettings {
                script: encoded_script,
            },
            force_update_tag: version.to_string(),
        },
    }
}

/// Body of an instance-targeted scale set action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceIds {
    pub instance_ids: Vec<String>,
}

pub fn instance_ids(ids: &[&str]) -> InstanceIds {
    InstanceIds {
        instance_ids: ids.iter().map(|id| id.to_string()).collect(),
    }
}
