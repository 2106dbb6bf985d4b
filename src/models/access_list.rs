use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_security_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_after_date: Option<String>,
}

impl AccessListEntry {
    /// The entry as addressed in paths: CIDR block, IP address or security group.
    pub fn entry(&self) -> &str {
        self.cidr_block
            .as_deref()
            .or(self.ip_address.as_deref())
            .or(self.aws_security_group.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessListEntryType {
    #[default]
    IpAddress,
    CidrBlock,
    AwsSecurityGroup,
}

impl FromStr for AccessListEntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ipAddress" => Ok(Self::IpAddress),
            "cidrBlock" => Ok(Self::CidrBlock),
            "awsSecurityGroup" => Ok(Self::AwsSecurityGroup),
            _ => Err(format!(
                "invalid entry type '{s}', use one of: ipAddress, cidrBlock, awsSecurityGroup"
            )),
        }
    }
}

impl Display for AccessListEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IpAddress => write!(f, "ipAddress"),
            Self::CidrBlock => write!(f, "cidrBlock"),
            Self::AwsSecurityGroup => write!(f, "awsSecurityGroup"),
        }
    }
}

impl AccessListEntryType {
    pub fn build_entry(
        &self,
        value: String,
        comment: Option<String>,
        delete_after_date: Option<String>,
    ) -> AccessListEntry {
        let mut entry = AccessListEntry {
            comment,
            delete_after_date,
            ..Default::default()
        };
        match self {
            Self::IpAddress => entry.ip_address = Some(value),
            Self::CidrBlock => entry.cidr_block = Some(value),
            Self::AwsSecurityGroup => entry.aws_security_group = Some(value),
        }
        entry
    }
}
