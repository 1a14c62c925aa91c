//! Resource names derived from the naming prefix

/// Subnet name Azure requires for a bastion host
pub const BASTION_SUBNET_NAME: &str = "AzureBastionSubnet";

/// Names of every resource the workflows touch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub resource_group: String,
    pub virtual_network: String,
    pub subnet: String,
    pub bastion_subnet: String,
    pub scale_set: String,
    pub scale_set_extension: String,
    pub public_ip: String,
    pub bastion_host: String,
}

impl ResourceNames {
    pub fn new(prefix: &str) -> Self {
        Self {
            resource_group: format!("{}-rg", prefix),
            virtual_network: format!("{}-vn", prefix),
            subnet: format!("{}-subnet", prefix),
            bastion_subnet: BASTION_SUBNET_NAME.to_string(),
            scale_set: format!("{}-vmss", prefix),
            scale_set_extension: format!("{}-vmssExt", prefix),
            public_ip: format!("{}-ip", prefix),
            bastion_host: format!("{}-bhost", prefix),
        }
    }
}
