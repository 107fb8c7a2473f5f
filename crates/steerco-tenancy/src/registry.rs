//! Tenant registry — the persisted slug→backing-store map.
//!
//! The registry file is a single JSON object mapping tenant slug to backing
//! store name and display name. The original implementation of this layer did
//! an unlocked whole-map read-modify-write on that file, so concurrent
//! registrations could silently lose updates. Here the in-memory map behind
//! an `RwLock` is authoritative and every mutation writes the whole map to a
//! temp file in the same directory and renames it into place, so readers
//! never observe a partial file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// The built-in tenant. Always resolvable, never removable.
pub const DEFAULT_TENANT: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum TenancyError {
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One tenant and the backing store it is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantEntry {
    /// Unique slug, the registry key.
    pub tenant_id: String,
    /// Identifier of the database instance assigned to this tenant.
    pub backing_store_name: String,
    pub display_name: String,
}

/// On-disk value shape; the slug is the JSON key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    backing_store_name: String,
    display_name: String,
}

/// The tenant registry: in-memory authoritative map with write-through
/// persistence to one JSON file.
#[derive(Debug)]
pub struct TenantRegistry {
    path: PathBuf,
    multi_tenant: AtomicBool,
    entries: RwLock<BTreeMap<String, StoredEntry>>,
}

impl TenantRegistry {
    /// Load the registry. A present file means multi-tenant mode; an absent
    /// file means single-tenant mode with one synthesized default entry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TenancyError> {
        let path = path.into();
        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let entries: BTreeMap<String, StoredEntry> = serde_json::from_str(&raw)?;
            tracing::info!(path = %path.display(), tenants = entries.len(), "tenant registry loaded");
            Ok(Self {
                path,
                multi_tenant: AtomicBool::new(true),
                entries: RwLock::new(entries),
            })
        } else {
            let mut entries = BTreeMap::new();
            entries.insert(DEFAULT_TENANT.to_string(), default_entry());
            tracing::info!(path = %path.display(), "no tenant registry file, running single-tenant");
            Ok(Self {
                path,
                multi_tenant: AtomicBool::new(false),
                entries: RwLock::new(entries),
            })
        }
    }

    /// Whether a registry file exists: present at load time, or written since
    /// by the first registration. Tenant resolution middleware only enforces
    /// lookups while this is true.
    pub fn is_multi_tenant(&self) -> bool {
        self.multi_tenant.load(Ordering::Acquire)
    }

    /// All entries, in slug order. Never fails.
    pub fn list(&self) -> Vec<TenantEntry> {
        let entries = self.entries.read().expect("tenant registry lock poisoned");
        entries
            .iter()
            .map(|(id, stored)| to_entry(id, stored))
            .collect()
    }

    pub fn get(&self, tenant_id: &str) -> Option<TenantEntry> {
        let entries = self.entries.read().expect("tenant registry lock poisoned");
        entries.get(tenant_id).map(|stored| to_entry(tenant_id, stored))
    }

    /// Insert or overwrite a tenant and persist the whole map.
    /// Re-registration is not an error; the new values win.
    pub fn register(
        &self,
        tenant_id: &str,
        backing_store_name: &str,
        display_name: Option<&str>,
    ) -> Result<TenantEntry, TenancyError> {
        let tenant_id = tenant_id.trim().to_ascii_lowercase();
        let stored = StoredEntry {
            backing_store_name: backing_store_name.to_string(),
            display_name: display_name.unwrap_or(&tenant_id).to_string(),
        };

        let mut entries = self.entries.write().expect("tenant registry lock poisoned");
        entries.insert(tenant_id.clone(), stored.clone());
        persist(&self.path, &entries)?;
        // First persisted registration switches the deployment to
        // multi-tenant without a restart.
        self.multi_tenant.store(true, Ordering::Release);
        tracing::info!(tenant = %tenant_id, store = %stored.backing_store_name, "🏢 tenant registered");
        Ok(to_entry(&tenant_id, &stored))
    }

    /// Remove a tenant pointer. Refused for the default tenant; false for an
    /// id that is not registered (no file mutation in that case). The backing
    /// store itself is never touched, only the pointer to it.
    pub fn remove(&self, tenant_id: &str) -> Result<bool, TenancyError> {
        if tenant_id == DEFAULT_TENANT {
            tracing::warn!("refusing to remove the default tenant");
            return Ok(false);
        }

        let mut entries = self.entries.write().expect("tenant registry lock poisoned");
        if entries.remove(tenant_id).is_none() {
            return Ok(false);
        }
        persist(&self.path, &entries)?;
        tracing::info!(tenant = %tenant_id, "tenant deregistered");
        Ok(true)
    }
}

fn to_entry(tenant_id: &str, stored: &StoredEntry) -> TenantEntry {
    TenantEntry {
        tenant_id: tenant_id.to_string(),
        backing_store_name: stored.backing_store_name.clone(),
        display_name: stored.display_name.clone(),
    }
}

fn default_entry() -> StoredEntry {
    StoredEntry {
        backing_store_name: format!("steerco_{DEFAULT_TENANT}"),
        display_name: "Default".to_string(),
    }
}

/// Write-temp-then-rename so a concurrent reader never sees a partial map.
fn persist(path: &Path, entries: &BTreeMap<String, StoredEntry>) -> Result<(), TenancyError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
