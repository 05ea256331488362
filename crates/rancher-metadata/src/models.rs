//! Metadata domain models.
//!
//! Models capture the fields callers commonly need and keep everything else in
//! an `extra` map, since the metadata schema grows between API versions.

use rancher_metadata_core::types::coerce_int;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A container as reported by the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Container {
    /// Container name, unique within one query result.
    pub name: String,
    /// Creation order within the service.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_index: Option<i64>,
    /// Index of the container within its service.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_index: Option<i64>,
    /// UUID of the host running the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_uuid: Option<String>,
    /// Address on the managed network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_ip: Option<String>,
    /// Hostname inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Owning service name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Owning stack name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,
    /// Any fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A service as reported by the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    /// Service name.
    pub name: String,
    /// Owning stack name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,
    /// Service kind (e.g. `service`, `loadBalancerService`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Service UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Service hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Fully qualified domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    /// Virtual IP, when one is allocated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip: Option<String>,
    /// Declared number of containers.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub scale: Option<i64>,
    /// Creation order.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_index: Option<i64>,
    /// Labels applied to the service.
    #[serde(
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    /// User metadata attached to the service.
    #[serde(
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub metadata: BTreeMap<String, Value>,
    /// Linked services mapped to their aliases.
    #[serde(
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub links: BTreeMap<String, Value>,
    /// Any fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A stack as reported by the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stack {
    /// Stack name.
    pub name: String,
    /// Stack UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Environment the stack belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    /// Any fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A host as reported by the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Host {
    /// Host name.
    pub name: String,
    /// Host UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Address the agent registered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_ip: Option<String>,
    /// Hostname of the machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Labels applied to the host.
    #[serde(
        default,
        deserialize_with = "deserialize_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    /// Any fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Containers of one service keyed by name, in the order the service listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceContainers {
    containers: Vec<Container>,
}

impl ServiceContainers {
    /// Group records by name. A repeated name replaces the earlier record in place.
    #[must_use]
    pub fn from_records(records: Vec<Container>) -> Self {
        let mut containers: Vec<Container> = Vec::with_capacity(records.len());

        for record in records {
            match containers.iter_mut().find(|c| c.name == record.name) {
                Some(existing) => *existing = record,
                None => containers.push(record),
            }
        }

        Self { containers }
    }

    /// Look up a container by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// Returns true if a container with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Container names in service order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.name.as_str())
    }

    /// Containers in service order.
    pub fn iter(&self) -> std::slice::Iter<'_, Container> {
        self.containers.iter()
    }

    /// Number of distinct containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Returns true if the service has no containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Consume into the underlying records.
    #[must_use]
    pub fn into_vec(self) -> Vec<Container> {
        self.containers
    }
}

impl<'a> IntoIterator for &'a ServiceContainers {
    type Item = &'a Container;
    type IntoIter = std::slice::Iter<'a, Container>;

    fn into_iter(self) -> Self::IntoIter {
        self.containers.iter()
    }
}

fn deserialize_map<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let value = Option::<BTreeMap<String, V>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn deserialize_lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_int))
}
