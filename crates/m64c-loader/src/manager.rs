//! Plugin manager: loads one plugin per role and attaches them to the core

use crate::search::{find_by_name, scan_plugin_dir, PluginSettings, PluginTarget};
use m64c_core::{
    EmulatorCore, LibHandle, PluginError, PluginLibrary, PluginLoader, PluginRole, DUMMY_PLUGIN,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// The plugin filling one role
pub struct PluginSlot {
    role: PluginRole,
    library: Option<Box<dyn PluginLibrary>>,
}

impl PluginSlot {
    fn dummy(role: PluginRole) -> Self {
        Self {
            role,
            library: None,
        }
    }

    pub fn role(&self) -> PluginRole {
        self.role
    }

    pub fn is_dummy(&self) -> bool {
        self.library.is_none()
    }

    /// Display name of the plugin
    pub fn name(&self) -> &str {
        self.library.as_ref().map_or(DUMMY_PLUGIN, |lib| lib.name())
    }

    /// Handle given to the core; null for the dummy
    pub fn handle(&self) -> LibHandle {
        self.library.as_ref().map_or(LibHandle::NULL, |lib| lib.handle())
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.library.as_ref().map(|lib| lib.path().to_path_buf())
    }
}

/// Owns the four loaded plugins for the lifetime of a run
///
/// Slots are kept in attach order. Dropping the manager releases any
/// plugins that are still loaded.
pub struct PluginManager {
    slots: Vec<PluginSlot>,
}

impl PluginManager {
    /// Find and load a plugin for every role
    ///
    /// Fails on the first role that cannot be satisfied; plugins loaded for
    /// earlier roles are released before returning.
    pub fn search_load(
        loader: &dyn PluginLoader,
        core_handle: LibHandle,
        settings: &PluginSettings,
    ) -> Result<Self, PluginError> {
        let mut candidates: Option<Vec<PathBuf>> = None;
        let mut slots = Vec::with_capacity(settings.targets.len());

        for (role, target) in &settings.targets {
            let role = *role;
            let path = match target {
                PluginTarget::Dummy => {
                    info!("Using dummy {} plugin", role);
                    slots.push(PluginSlot::dummy(role));
                    continue;
                }
                PluginTarget::Path(path) => path.clone(),
                PluginTarget::Name(name) => {
                    if candidates.is_none() {
                        candidates = Some(scan_plugin_dir(&settings.plugin_dir)?);
                    }
                    let found = candidates
                        .as_deref()
                        .and_then(|list| find_by_name(list, name));
                    match found {
                        Some(path) => path.clone(),
                        None => {
                            return Err(PluginError::NotFound {
                                role,
                                target: name.clone(),
                                dir: settings.plugin_dir.clone(),
                            })
                        }
                    }
                }
            };

            debug!("Loading {} plugin from {}", role, path.display());
            let library = loader
                .load(role, &path, core_handle)
                .map_err(|source| PluginError::Load { role, source })?;
            slots.push(PluginSlot {
                role,
                library: Some(library),
            });
        }

        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[PluginSlot] {
        &self.slots
    }

    pub fn slot(&self, role: PluginRole) -> Option<&PluginSlot> {
        self.slots.iter().find(|slot| slot.role == role)
    }

    /// Attach every plugin to the core in role order
    ///
    /// Stops at the first failure; plugins attached before it stay attached.
    pub fn attach_all(&self, core: &mut dyn EmulatorCore) -> Result<(), PluginError> {
        for slot in &self.slots {
            core.attach_plugin(slot.role, slot.handle())
                .map_err(|source| PluginError::Attach {
                    role: slot.role,
                    source,
                })?;
            debug!("Attached {} plugin '{}'", slot.role, slot.name());
        }
        Ok(())
    }

    /// Detach every plugin from the core in role order
    pub fn detach_all(&self, core: &mut dyn EmulatorCore) {
        for slot in &self.slots {
            if let Err(e) = core.detach_plugin(slot.role) {
                warn!("Error detaching {} plugin: {}", slot.role, e);
            }
        }
    }

    /// Shut down and release every loaded plugin. Safe to call more than once.
    pub fn unload(&mut self) {
        if !self.slots.is_empty() {
            debug!("Unloading {} plugins", self.slots.len());
        }
        self.slots.clear();
    }
}
