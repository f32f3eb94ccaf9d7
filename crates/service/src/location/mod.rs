//! Resolves a library location to the remote storage facility holding it.
//!
//! The real mapping subsystem lives elsewhere; the queue only needs to know
//! whether a location is remote and, if so, which configuration owns it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMapping {
    pub folio_location_id: String,
    pub configuration_id: String,
}

#[async_trait]
pub trait LocationMappingResolver: Send + Sync {
    /// `None` when the location is not served by remote storage.
    async fn mapping_for_location(&self, location_id: &str) -> Result<Option<LocationMapping>, ServiceError>;
}

/// Static mappings taken from `[[location_mappings]]` in the config file.
#[derive(Debug, Default, Clone)]
pub struct ConfiguredLocationMappings {
    by_location: HashMap<String, LocationMapping>,
}

impl ConfiguredLocationMappings {
    pub fn new(mappings: impl IntoIterator<Item = LocationMapping>) -> Self {
        let by_location = mappings
            .into_iter()
            .map(|m| (m.folio_location_id.clone(), m))
            .collect();
        Self { by_location }
    }

    pub fn from_config(entries: &[configs::LocationMappingConfig]) -> Self {
        Self::new(entries.iter().map(|e| LocationMapping {
            folio_location_id: e.folio_location_id.clone(),
            configuration_id: e.configuration_id.clone(),
        }))
    }

    pub fn len(&self) -> usize { self.by_location.len() }

    pub fn is_empty(&self) -> bool { self.by_location.is_empty() }
}

#[async_trait]
impl LocationMappingResolver for ConfiguredLocationMappings {
    async fn mapping_for_location(&self, location_id: &str) -> Result<Option<LocationMapping>, ServiceError> {
        Ok(self.by_location.get(location_id).cloned())
    }
}
