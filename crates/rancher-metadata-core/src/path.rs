//! Resource references and query path resolution.
//!
//! Every metadata query is a relative path appended to an endpoint base URL.
//! Omitting an identifier resolves to the "self" form of the path, meaning the
//! entity the querying process belongs to.

use crate::error::{Error, Result};

/// Collection path listing every service.
pub const SERVICES_PATH: &str = "/services";
/// Collection path listing every stack.
pub const STACKS_PATH: &str = "/stacks";
/// Collection path listing every container.
pub const CONTAINERS_PATH: &str = "/containers";

/// Identifies a service by name, optionally scoped to a stack.
///
/// The default value refers to the caller's own service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ServiceRef {
    stack_name: Option<String>,
    service_name: Option<String>,
}

impl ServiceRef {
    /// Reference the service the querying container belongs to.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            stack_name: None,
            service_name: None,
        }
    }

    /// Reference a service by name within the caller's own stack.
    #[must_use]
    pub fn named(service_name: impl Into<String>) -> Self {
        Self {
            stack_name: None,
            service_name: Some(service_name.into()),
        }
    }

    /// Scope the reference to an explicit stack.
    #[must_use]
    pub fn in_stack(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    /// Stack name, if one was given.
    #[must_use]
    pub fn stack_name(&self) -> Option<&str> {
        self.stack_name.as_deref()
    }

    /// Service name, if one was given.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    /// Returns true when this refers to the caller's own service.
    #[must_use]
    pub const fn is_current(&self) -> bool {
        self.stack_name.is_none() && self.service_name.is_none()
    }

    fn base_path(&self) -> Result<String> {
        match (self.stack_name.as_deref(), self.service_name.as_deref()) {
            (None, None) => Ok("/self/service".to_string()),
            (None, Some(service)) => Ok(format!("/self/stack/services/{service}")),
            (Some(stack), Some(service)) => Ok(format!("/stacks/{stack}/services/{service}")),
            (Some(stack), None) => Err(Error::InvalidArgument(format!(
                "service name is required when looking up a service in stack `{stack}`"
            ))),
        }
    }
}

/// A metadata resource that can be resolved to a query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    /// All services
    Services,
    /// All stacks
    Stacks,
    /// All containers
    Containers,
    /// A single service
    Service(&'a ServiceRef),
    /// One field of a service
    ServiceField(&'a ServiceRef, &'a str),
    /// A stack by name, or the caller's own stack
    Stack(Option<&'a str>),
    /// Services of a stack by name, or of the caller's own stack
    StackServices(Option<&'a str>),
    /// A container by name, or the caller's own container
    Container(Option<&'a str>),
    /// One field of a container
    ContainerField(Option<&'a str>, &'a str),
    /// A host by name, or the host the caller runs on
    Host(Option<&'a str>),
    /// One field of a host
    HostField(Option<&'a str>, &'a str),
}

impl Resource<'_> {
    /// Resolve the resource into a path relative to an endpoint base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a service is scoped to a stack
    /// without naming the service.
    pub fn path(&self) -> Result<String> {
        let path = match *self {
            Self::Services => SERVICES_PATH.to_string(),
            Self::Stacks => STACKS_PATH.to_string(),
            Self::Containers => CONTAINERS_PATH.to_string(),
            Self::Service(service) => service.base_path()?,
            Self::ServiceField(service, field) => format!("{}/{field}", service.base_path()?),
            Self::Stack(stack) => match stack {
                Some(stack) => format!("/stacks/{stack}"),
                None => "/self/stack".to_string(),
            },
            Self::StackServices(stack) => match stack {
                Some(stack) => format!("/stacks/{stack}/services"),
                None => "/self/stack/services".to_string(),
            },
            Self::Container(name) => match name {
                Some(name) => format!("/containers/{name}"),
                None => "/self/container".to_string(),
            },
            Self::ContainerField(name, field) => match name {
                Some(name) => format!("/containers/{name}/{field}"),
                None => format!("/self/container/{field}"),
            },
            Self::Host(name) => match name {
                Some(name) => format!("/hosts/{name}"),
                None => "/self/host".to_string(),
            },
            Self::HostField(name, field) => match name {
                Some(name) => format!("/hosts/{name}/{field}"),
                None => format!("/self/host/{field}"),
            },
        };

        Ok(path)
    }
}
