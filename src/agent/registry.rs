use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use super::prompt::BUILTIN_PERSONALITIES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Personality {
    pub name: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("personality name and prompt must both be non-empty")]
    InvalidInput,
}

/// In-memory name -> system prompt store shared by every request.
///
/// Entries are never removed. Registering an existing name replaces its prompt.
#[derive(Debug, Default)]
pub struct PersonalityRegistry {
    entries: RwLock<BTreeMap<String, String>>,
}

impl PersonalityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let entries = BUILTIN_PERSONALITIES
            .iter()
            .map(|(name, prompt)| ((*name).to_string(), (*prompt).to_string()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, name: &str) -> Option<Personality> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).map(|prompt| Personality {
            name: name.to_string(),
            system_prompt: prompt.clone(),
        })
    }

    pub fn add(&self, name: &str, system_prompt: &str) -> Result<(), RegistryError> {
        if name.is_empty() || system_prompt.is_empty() {
            return Err(RegistryError::InvalidInput);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_string(), system_prompt.to_string());
        Ok(())
    }

    /// Registered names in sorted order.
    pub fn list_names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
