use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use serde_json::{Map, Value};

use super::{Resource, ResourceStatus};
use crate::error::{ClientError, Result};
use crate::gateway::contract::{AddResponse, ResourceList, ToggleResponse};
use crate::gateway::{call, ApiRequest, Gateway, NewResource, ToggleAction};

/// Claim on a resource id; at most one exists per id at a time.
///
/// Released when dropped, including when the owning future is abandoned.
#[derive(Debug)]
pub struct InFlight {
    id: String,
    registry: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn resource_id(&self) -> &str {
        &self.id
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.registry.lock() {
            ids.remove(&self.id);
        }
    }
}

/// Last-known resource list, mutated only from server-confirmed results.
///
/// Every method takes `&self`: requests for different resources may run
/// concurrently, while toggle, remove, update and activation steps for the
/// same resource are serialized through [`ResourceStore::claim`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use dashclient::config::ClientConfig;
/// use dashclient::gateway::HttpGateway;
/// use dashclient::resources::ResourceStore;
///
/// # async fn example() -> dashclient::error::Result<()> {
/// let gateway = Arc::new(HttpGateway::new(&ClientConfig::new("http://127.0.0.1:8000"))?);
/// let store = ResourceStore::new(gateway);
/// for resource in store.list().await? {
///     println!("{} {}", resource.id, resource.status);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResourceStore<G: Gateway> {
    gateway: Arc<G>,
    resources: RwLock<Vec<Resource>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<G: Gateway> ResourceStore<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            resources: RwLock::new(Vec::new()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Copy of the cached list, in backend order.
    pub fn snapshot(&self) -> Vec<Resource> {
        self.resources
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<Resource> {
        self.resources
            .read()
            .ok()
            .and_then(|items| items.iter().find(|r| r.id == id).cloned())
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .map(|ids| ids.contains(id))
            .unwrap_or(false)
    }

    /// Reserve `id` for one outstanding request.
    pub fn claim(&self, id: &str) -> Result<InFlight> {
        let mut ids = self
            .in_flight
            .lock()
            .map_err(|_| ClientError::InvalidState("in-flight registry poisoned".to_string()))?;
        if !ids.insert(id.to_string()) {
            tracing::debug!(resource_id = id, "Rejected concurrent request");
            return Err(ClientError::Busy {
                resource_id: id.to_string(),
            });
        }
        Ok(InFlight {
            id: id.to_string(),
            registry: Arc::clone(&self.in_flight),
        })
    }

    /// Fetch the full list and replace the cache with it.
    pub async fn list(&self) -> Result<Vec<Resource>> {
        let response: ResourceList = call(self.gateway.as_ref(), &ApiRequest::ListResources).await?;
        tracing::debug!(count = response.items.len(), "Resource list refreshed");
        if let Ok(mut items) = self.resources.write() {
            *items = response.items.clone();
        }
        Ok(response.items)
    }

    /// Flip a cached resource between active and paused.
    ///
    /// The cached status afterwards is whatever the backend returned, even if
    /// it differs from the requested transition.
    pub async fn toggle(&self, id: &str) -> Result<Resource> {
        let id = require_id(id)?;
        let cached = self.find(id).ok_or_else(|| {
            ClientError::Validation(format!("Resource {id} is not loaded; refresh the list first"))
        })?;
        let _claim = self.claim(id)?;

        let action = ToggleAction::inverse_of(cached.status);
        let request = ApiRequest::ToggleResource {
            id: id.to_string(),
            action,
        };
        let response: ToggleResponse = call(self.gateway.as_ref(), &request).await?;
        let requested = match action {
            ToggleAction::Activate => ResourceStatus::Active,
            ToggleAction::Pause => ResourceStatus::Paused,
        };
        if response.status != requested {
            tracing::warn!(
                resource_id = id,
                %action,
                status = %response.status,
                "Backend kept a status different from the requested transition"
            );
        }

        let updated = self.apply(id, |resource| {
            resource.status = response.status;
            if let Some(phase) = &response.phase {
                resource.phase = Some(phase.clone());
            }
        });
        tracing::info!(resource_id = id, status = %response.status, "Resource toggled");
        Ok(updated.unwrap_or(Resource {
            status: response.status,
            phase: response.phase.or(cached.phase.clone()),
            ..cached
        }))
    }

    /// Create a resource; appended to the cache only after the backend accepts it.
    pub async fn add(&self, new: NewResource) -> Result<Resource> {
        let provider = new.provider.trim().to_string();
        if provider.is_empty() {
            return Err(ClientError::Validation("Choose a provider".to_string()));
        }
        let label = new
            .label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let metadata = new.metadata.clone();
        let request = ApiRequest::AddResource(NewResource {
            provider: provider.clone(),
            label: label.clone(),
            metadata: metadata.clone(),
        });
        let response: AddResponse = call(self.gateway.as_ref(), &request).await?;

        let resource = Resource {
            id: response.id,
            provider: response.provider.unwrap_or_else(|| provider.clone()),
            label: response.label.or(label).unwrap_or(provider),
            status: response.status.unwrap_or(ResourceStatus::Pending),
            phase: response.phase,
            last_error_code: None,
            metadata: metadata.unwrap_or_default(),
            valid: None,
            issues: Vec::new(),
        };
        if let Ok(mut items) = self.resources.write() {
            items.push(resource.clone());
        }
        tracing::info!(resource_id = %resource.id, provider = %resource.provider, "Resource added");
        Ok(resource)
    }

    /// Delete a resource; dropped from the cache only after the backend confirms.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let _claim = self.claim(id)?;
        self.gateway
            .send(&ApiRequest::DeleteResource { id: id.to_string() })
            .await?;
        if let Ok(mut items) = self.resources.write() {
            items.retain(|r| r.id != id);
        }
        tracing::info!(resource_id = id, "Resource removed");
        Ok(())
    }

    /// Fetch one resource with its full metadata, refreshing its cached copy.
    pub async fn get(&self, id: &str) -> Result<Resource> {
        let id = require_id(id)?;
        let request = ApiRequest::GetResource { id: id.to_string() };
        let resource: Resource = call(self.gateway.as_ref(), &request).await?;
        self.apply(id, |cached| *cached = resource.clone());
        Ok(resource)
    }

    /// Save a resource's label and metadata, then cache the server's copy.
    ///
    /// The backend merges `metadata` into what it already stores, so the
    /// cached entry is taken from the response (or refetched when the
    /// response only acknowledges), never from the values sent.
    pub async fn update(
        &self,
        id: &str,
        label: &str,
        metadata: Map<String, Value>,
    ) -> Result<Resource> {
        let id = require_id(id)?;
        let label = label.trim();
        if label.is_empty() {
            return Err(ClientError::Validation("Label must not be empty".to_string()));
        }
        let _claim = self.claim(id)?;
        let request = ApiRequest::UpdateResource {
            id: id.to_string(),
            label: label.to_string(),
            metadata,
        };
        let body = self.gateway.send(&request).await?;
        let resource = match serde_json::from_value::<Resource>(body) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::debug!(resource_id = id, error = %e, "Update acknowledged without a resource; refetching");
                let request = ApiRequest::GetResource { id: id.to_string() };
                call(self.gateway.as_ref(), &request).await?
            }
        };
        self.apply(id, |cached| *cached = resource.clone());
        tracing::info!(resource_id = id, "Resource settings saved");
        Ok(resource)
    }

    fn apply(&self, id: &str, change: impl FnOnce(&mut Resource)) -> Option<Resource> {
        let mut items = self.resources.write().ok()?;
        let resource = items.iter_mut().find(|r| r.id == id)?;
        change(resource);
        Some(resource.clone())
    }
}

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::Validation("Resource id is required".to_string()));
    }
    Ok(id)
}
