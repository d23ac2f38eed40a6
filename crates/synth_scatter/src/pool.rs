//! Prefab registry and recyclable instance storage.
//!
//! Layers never create or destroy objects directly. They [`InstancePool::acquire`] an
//! instance for a prefab, position it through its transform, and hand it back with
//! [`InstancePool::release`] when the iteration ends. [`PrefabArena`] is the in-memory
//! implementation: an arena of slots indexed by handle, with a free list per prefab so
//! capacity is reused across iterations.
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::bounds::{compute_bounds_unchecked, RootOverride, SceneNode, Transform};
use crate::error::{Error, Result};

/// Stable identifier of a prefab within a [`PrefabLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrefabId(pub u32);

/// Generational reference to a pooled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    index: u32,
    generation: u32,
}

impl InstanceHandle {
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// A named prefab hierarchy.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prefab {
    pub id: PrefabId,
    pub name: String,
    pub root: SceneNode,
}

/// Ordered collection of prefabs. Ids are assigned on insertion and never reused.
#[derive(Debug, Clone, Default)]
pub struct PrefabLibrary {
    prefabs: Vec<Prefab>,
    next_id: u32,
}

impl PrefabLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a prefab, naming it after its root node.
    pub fn add(&mut self, root: SceneNode) -> PrefabId {
        let id = PrefabId(self.next_id);
        self.next_id += 1;
        self.prefabs.push(Prefab {
            id,
            name: root.name.clone(),
            root,
        });
        id
    }

    pub fn with_prefab(mut self, root: SceneNode) -> Self {
        self.add(root);
        self
    }

    pub fn get(&self, id: PrefabId) -> Option<&Prefab> {
        self.prefabs
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.prefabs[i])
    }

    pub fn ids(&self) -> Vec<PrefabId> {
        self.prefabs.iter().map(|p| p.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prefab> {
        self.prefabs.iter()
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }

    /// Drops prefabs whose hierarchy contains no geometry and returns their names.
    ///
    /// Such prefabs cannot be normalized, so they are filtered out once at setup instead of
    /// failing a layer mid-iteration.
    pub fn retain_valid(&mut self) -> Vec<String> {
        let mut rejected = Vec::new();
        self.prefabs.retain(|p| {
            let valid = compute_bounds_unchecked(&p.root).is_valid();
            if !valid {
                error!("Prefab '{}' does not contain any geometry; dropping it.", p.name);
                rejected.push(p.name.clone());
            }
            valid
        });
        rejected
    }
}

/// Allocation and transform access for recyclable instances.
pub trait InstancePool {
    /// Returns an instance of `prefab` in its prefab pose, instantiating one if none is free.
    fn acquire(&mut self, prefab: PrefabId) -> Result<InstanceHandle>;

    /// Deactivates the instance and makes it available again. Releasing twice fails.
    fn release(&mut self, handle: InstanceHandle) -> Result<()>;

    fn transform(&self, handle: InstanceHandle) -> Result<Transform>;

    fn set_transform(&mut self, handle: InstanceHandle, transform: Transform) -> Result<()>;

    /// The instance's hierarchy, rooted at its current transform.
    fn hierarchy(&self, handle: InstanceHandle) -> Result<RootOverride<'_>>;

    fn prefab_of(&self, handle: InstanceHandle) -> Result<PrefabId>;

    /// Number of instances currently acquired.
    fn active_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Slot {
    prefab: PrefabId,
    transform: Transform,
    generation: u32,
    active: bool,
}

/// Arena-backed [`InstancePool`] over a [`PrefabLibrary`].
#[derive(Debug, Clone)]
pub struct PrefabArena {
    library: PrefabLibrary,
    slots: Vec<Slot>,
    free: HashMap<PrefabId, Vec<u32>>,
    active: usize,
}

impl PrefabArena {
    pub fn new(library: PrefabLibrary) -> Self {
        Self {
            library,
            slots: Vec::new(),
            free: HashMap::new(),
            active: 0,
        }
    }

    pub fn library(&self) -> &PrefabLibrary {
        &self.library
    }

    /// Total slots ever instantiated, active or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Instantiates `count` inactive instances of `prefab` up front.
    pub fn prewarm(&mut self, prefab: PrefabId, count: usize) -> Result<()> {
        let root_transform = self.prefab_root_transform(prefab)?;
        let free = self.free.entry(prefab).or_default();
        for _ in 0..count {
            free.push(self.slots.len() as u32);
            self.slots.push(Slot {
                prefab,
                transform: root_transform,
                generation: 0,
                active: false,
            });
        }
        Ok(())
    }

    fn prefab_root_transform(&self, prefab: PrefabId) -> Result<Transform> {
        self.library
            .get(prefab)
            .map(|p| p.root.transform)
            .ok_or(Error::UnknownPrefab(prefab))
    }

    fn slot(&self, handle: InstanceHandle) -> Result<&Slot> {
        match self.slots.get(handle.index()) {
            Some(slot) if slot.active && slot.generation == handle.generation => Ok(slot),
            _ => Err(Error::StaleHandle(handle)),
        }
    }

    fn slot_mut(&mut self, handle: InstanceHandle) -> Result<&mut Slot> {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.active && slot.generation == handle.generation => Ok(slot),
            _ => Err(Error::StaleHandle(handle)),
        }
    }
}

impl InstancePool for PrefabArena {
    fn acquire(&mut self, prefab: PrefabId) -> Result<InstanceHandle> {
        let root_transform = self.prefab_root_transform(prefab)?;

        let index = match self.free.get_mut(&prefab).and_then(Vec::pop) {
            Some(index) => index,
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    prefab,
                    transform: root_transform,
                    generation: 0,
                    active: false,
                });
                debug!("Instantiated {:?} into slot {}.", prefab, index);
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.active = true;
        // Recycled instances come back as freshly instantiated ones.
        slot.transform = root_transform;
        self.active += 1;
        Ok(InstanceHandle {
            index,
            generation: slot.generation,
        })
    }

    fn release(&mut self, handle: InstanceHandle) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        let prefab = slot.prefab;
        self.free.entry(prefab).or_default().push(handle.index);
        self.active -= 1;
        Ok(())
    }

    fn transform(&self, handle: InstanceHandle) -> Result<Transform> {
        self.slot(handle).map(|s| s.transform)
    }

    fn set_transform(&mut self, handle: InstanceHandle, transform: Transform) -> Result<()> {
        self.slot_mut(handle)?.transform = transform;
        Ok(())
    }

    fn hierarchy(&self, handle: InstanceHandle) -> Result<RootOverride<'_>> {
        let slot = self.slot(handle)?;
        let prefab = self
            .library
            .get(slot.prefab)
            .ok_or(Error::UnknownPrefab(slot.prefab))?;
        Ok(RootOverride {
            node: &prefab.root,
            transform: slot.transform,
        })
    }

    fn prefab_of(&self, handle: InstanceHandle) -> Result<PrefabId> {
        self.slot(handle).map(|s| s.prefab)
    }

    fn active_count(&self) -> usize {
        self.active
    }
}
