use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Aws,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "us-west-2")]
    UsWest2,
    #[serde(rename = "eu-west-1")]
    EuWest1,
    #[serde(rename = "eu-central-1")]
    EuCentral1,
    #[serde(rename = "ap-southeast-1")]
    ApSoutheast1,
}

impl Region {
    pub fn parse(value: &str) -> Option<Region> {
        match value {
            "us-east-1" => Some(Region::UsEast1),
            "us-west-2" => Some(Region::UsWest2),
            "eu-west-1" => Some(Region::EuWest1),
            "eu-central-1" => Some(Region::EuCentral1),
            "ap-southeast-1" => Some(Region::ApSoutheast1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UsEast1 => "us-east-1",
            Region::UsWest2 => "us-west-2",
            Region::EuWest1 => "eu-west-1",
            Region::EuCentral1 => "eu-central-1",
            Region::ApSoutheast1 => "ap-southeast-1",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HintLevel {
    Low,
    #[default]
    Standard,
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hints {
    #[serde(default)]
    pub cost: HintLevel,
    #[serde(default)]
    pub perf: HintLevel,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Http,
    Worker,
    Cron,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub kind: ServiceKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Postgres,
    Mysql,
}

impl DbKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbKind::Postgres => "postgres",
            DbKind::Mysql => "mysql",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Redis,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct DataSpec {
    #[serde(default)]
    pub db: Option<DbKind>,
    #[serde(default)]
    pub cache: Option<CacheKind>,
}

/// Normalized deployment intent, produced by the external request parser.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeploySpec {
    pub app_name: String,
    #[serde(default)]
    pub cloud: CloudProvider,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub hints: Hints,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
    #[serde(default)]
    pub data: DataSpec,
    #[serde(default)]
    pub domain: Option<String>,
}
