//! Typed accessors for services, stacks, containers and hosts.
//!
//! Accessors resolve a [`Resource`] path, fetch it and map the answer onto a
//! model. A path the service reports as missing yields `None` for single values
//! and an empty collection for lists.

use crate::client::MetadataClient;
use crate::models::{Container, Host, Service, ServiceContainers, Stack};
use crate::Result;
use rancher_metadata_core::{MetadataResponse, Resource, ServiceRef};
use serde_json::Value;
use tracing::debug;

impl MetadataClient {
    // Services

    /// List every service.
    pub async fn get_services(&self) -> Result<Vec<Service>> {
        Ok(self.get_as(Resource::Services).await?.unwrap_or_default())
    }

    /// Fetch a service.
    pub async fn get_service(&self, service: &ServiceRef) -> Result<Option<Service>> {
        self.get_as(Resource::Service(service)).await
    }

    /// Fetch one field of a service.
    pub async fn get_service_field(
        &self,
        field: &str,
        service: &ServiceRef,
    ) -> Result<MetadataResponse> {
        self.fetch_resource(Resource::ServiceField(service, field))
            .await
    }

    /// Declared scale of a service, 0 when the service does not report one.
    pub async fn get_service_scale_size(&self, service: &ServiceRef) -> Result<i64> {
        let scale = self.get_service_field("scale", service).await?;
        Ok(scale.as_int().unwrap_or(0))
    }

    /// Containers of a service keyed by name.
    pub async fn get_service_containers(&self, service: &ServiceRef) -> Result<ServiceContainers> {
        let records: Option<Vec<Container>> = self
            .get_as(Resource::ServiceField(service, "containers"))
            .await?;
        let containers = ServiceContainers::from_records(records.unwrap_or_default());

        debug!(count = containers.len(), "fetched service containers");
        Ok(containers)
    }

    /// User metadata attached to a service.
    pub async fn get_service_metadata(&self, service: &ServiceRef) -> Result<Option<Value>> {
        Ok(self.get_service_field("metadata", service).await?.into_value())
    }

    /// Links of a service.
    pub async fn get_service_links(&self, service: &ServiceRef) -> Result<Option<Value>> {
        Ok(self.get_service_field("links", service).await?.into_value())
    }

    // Stacks

    /// List every stack.
    pub async fn get_stacks(&self) -> Result<Vec<Stack>> {
        Ok(self.get_as(Resource::Stacks).await?.unwrap_or_default())
    }

    /// Fetch a stack by name, or the caller's own stack.
    pub async fn get_stack(&self, stack_name: Option<&str>) -> Result<Option<Stack>> {
        self.get_as(Resource::Stack(stack_name)).await
    }

    /// Services of a stack by name, or of the caller's own stack.
    pub async fn get_stack_services(&self, stack_name: Option<&str>) -> Result<Vec<Service>> {
        Ok(self
            .get_as(Resource::StackServices(stack_name))
            .await?
            .unwrap_or_default())
    }

    // Containers

    /// List every container.
    pub async fn get_containers(&self) -> Result<Vec<Container>> {
        Ok(self.get_as(Resource::Containers).await?.unwrap_or_default())
    }

    /// Fetch a container by name, or the caller's own container.
    pub async fn get_container(&self, container_name: Option<&str>) -> Result<Option<Container>> {
        self.get_as(Resource::Container(container_name)).await
    }

    /// Fetch one field of a container.
    pub async fn get_container_field(
        &self,
        field: &str,
        container_name: Option<&str>,
    ) -> Result<MetadataResponse> {
        self.fetch_resource(Resource::ContainerField(container_name, field))
            .await
    }

    /// Creation index of a container.
    pub async fn get_container_create_index(
        &self,
        container_name: Option<&str>,
    ) -> Result<Option<i64>> {
        let index = self.get_container_field("create_index", container_name).await?;
        Ok(index.as_int())
    }

    /// Index of a container within its service.
    pub async fn get_container_service_index(
        &self,
        container_name: Option<&str>,
    ) -> Result<Option<i64>> {
        let index = self.get_container_field("service_index", container_name).await?;
        Ok(index.as_int())
    }

    /// Address a container is reachable on.
    ///
    /// For a named container this is its `primary_ip`. For the caller's own
    /// container it is the managed-network `primary_ip` when the container is on
    /// the managed network, and the host's agent IP otherwise.
    pub async fn get_container_ip(&self, container_name: Option<&str>) -> Result<Option<String>> {
        if container_name.is_some() {
            return self.container_string(container_name, "primary_ip").await;
        }

        if self.is_network_managed().await? {
            self.container_string(None, "primary_ip").await
        } else {
            self.get_host_ip(None).await
        }
    }

    /// Name of a container.
    pub async fn get_container_name(&self, container_name: Option<&str>) -> Result<Option<String>> {
        self.container_string(container_name, "name").await
    }

    /// Service a container belongs to.
    pub async fn get_container_service_name(
        &self,
        container_name: Option<&str>,
    ) -> Result<Option<String>> {
        self.container_string(container_name, "service_name").await
    }

    /// Stack a container belongs to.
    pub async fn get_container_stack_name(
        &self,
        container_name: Option<&str>,
    ) -> Result<Option<String>> {
        self.container_string(container_name, "stack_name").await
    }

    /// Hostname of a container.
    pub async fn get_container_hostname(
        &self,
        container_name: Option<&str>,
    ) -> Result<Option<String>> {
        self.container_string(container_name, "hostname").await
    }

    /// UUID of the host a container runs on.
    pub async fn get_container_host_uuid(
        &self,
        container_name: Option<&str>,
    ) -> Result<Option<String>> {
        self.container_string(container_name, "host_uuid").await
    }

    /// Whether the caller's container is on the managed network.
    ///
    /// Only managed containers report a `create_index`.
    pub async fn is_network_managed(&self) -> Result<bool> {
        Ok(self.get_container_create_index(None).await?.is_some())
    }

    async fn container_string(
        &self,
        container_name: Option<&str>,
        field: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .get_container_field(field, container_name)
            .await?
            .as_string())
    }

    // Hosts

    /// Fetch a host by name, or the host the caller runs on.
    pub async fn get_host(&self, host_name: Option<&str>) -> Result<Option<Host>> {
        self.get_as(Resource::Host(host_name)).await
    }

    /// Fetch one field of a host.
    pub async fn get_host_field(
        &self,
        field: &str,
        host_name: Option<&str>,
    ) -> Result<MetadataResponse> {
        self.fetch_resource(Resource::HostField(host_name, field))
            .await
    }

    /// Address the host agent registered with.
    pub async fn get_host_ip(&self, host_name: Option<&str>) -> Result<Option<String>> {
        Ok(self.get_host_field("agent_ip", host_name).await?.as_string())
    }

    /// UUID of a host.
    pub async fn get_host_uuid(&self, host_name: Option<&str>) -> Result<Option<String>> {
        Ok(self.get_host_field("uuid", host_name).await?.as_string())
    }

    /// Name of a host.
    pub async fn get_host_name(&self, host_name: Option<&str>) -> Result<Option<String>> {
        Ok(self.get_host_field("name", host_name).await?.as_string())
    }
}
