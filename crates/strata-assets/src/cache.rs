//! Ref-counted resource cache with readiness broadcasting.

use crossbeam_channel::{Receiver, Sender, unbounded};
use rustc_hash::FxHashMap;

use crate::{
    AssetError, Material, MaterialHandle, Model, ModelHandle, ReadinessEvent, ResourceId,
    ResourceState, Texture, TextureHandle,
};

/// What the scene and terrain code need from a resource manager.
///
/// Data getters only return a value once the resource is
/// [`Ready`](ResourceState::Ready).
pub trait ResourceManager {
    fn load_model(&mut self, path: &str) -> ModelHandle;
    fn load_material(&mut self, path: &str) -> MaterialHandle;
    fn load_texture(&mut self, path: &str) -> TextureHandle;

    /// Drops one reference. The slot is emptied when the count reaches zero.
    fn unload(&mut self, id: ResourceId);

    fn state(&self, id: ResourceId) -> ResourceState;
    fn path(&self, id: ResourceId) -> Option<&str>;

    fn model(&self, handle: ModelHandle) -> Option<&Model>;
    fn material(&self, handle: MaterialHandle) -> Option<&Material>;
    fn texture(&self, handle: TextureHandle) -> Option<&Texture>;

    fn is_ready(&self, id: ResourceId) -> bool {
        self.state(id) == ResourceState::Ready
    }
}

struct Slot<T> {
    path: String,
    ref_count: u32,
    state: ResourceState,
    data: Option<T>,
}

struct Store<T> {
    slots: Vec<Slot<T>>,
    by_path: FxHashMap<String, u32>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            by_path: FxHashMap::default(),
        }
    }
}

impl<T> Store<T> {
    /// Adds a reference to `path`. Returns the slot id and the previous state
    /// when the call moved the slot into `Loading`.
    fn acquire(&mut self, path: &str) -> (u32, Option<ResourceState>) {
        if let Some(&id) = self.by_path.get(path) {
            let slot = &mut self.slots[id as usize];
            slot.ref_count += 1;
            if slot.state == ResourceState::Empty {
                slot.state = ResourceState::Loading;
                return (id, Some(ResourceState::Empty));
            }
            return (id, None);
        }
        let id = self.slots.len() as u32;
        self.slots.push(Slot {
            path: path.to_string(),
            ref_count: 1,
            state: ResourceState::Loading,
            data: None,
        });
        self.by_path.insert(path.to_string(), id);
        (id, Some(ResourceState::Empty))
    }

    /// Drops a reference. Returns the released data and previous state when
    /// the slot became empty.
    fn release(&mut self, id: u32) -> Option<(Option<T>, ResourceState)> {
        let slot = self.slots.get_mut(id as usize)?;
        if slot.ref_count == 0 {
            return None;
        }
        slot.ref_count -= 1;
        if slot.ref_count > 0 {
            return None;
        }
        let old = slot.state;
        slot.state = ResourceState::Empty;
        Some((slot.data.take(), old))
    }

    fn slot_for_path(&mut self, path: &str) -> Result<(u32, &mut Slot<T>), AssetError> {
        let id = *self
            .by_path
            .get(path)
            .ok_or_else(|| AssetError::NotRequested(path.to_string()))?;
        let slot = &mut self.slots[id as usize];
        if slot.ref_count == 0 {
            return Err(AssetError::Unreferenced(path.to_string()));
        }
        Ok((id, slot))
    }

    fn state(&self, id: u32) -> ResourceState {
        self.slots
            .get(id as usize)
            .map_or(ResourceState::Empty, |s| s.state)
    }

    fn path(&self, id: u32) -> Option<&str> {
        self.slots.get(id as usize).map(|s| s.path.as_str())
    }

    fn ready(&self, id: u32) -> Option<&T> {
        let slot = self.slots.get(id as usize)?;
        if slot.state == ResourceState::Ready {
            slot.data.as_ref()
        } else {
            None
        }
    }

    fn set_state(&mut self, id: u32, state: ResourceState) -> Option<ResourceState> {
        let slot = self.slots.get_mut(id as usize)?;
        if slot.state == state {
            return None;
        }
        Some(std::mem::replace(&mut slot.state, state))
    }
}

/// In-memory [`ResourceManager`].
///
/// Requests are recorded by the `load_*` calls; data arrives later through
/// [`provide_model`](Self::provide_model) and friends. Every state transition
/// is broadcast to all channels handed out by [`subscribe`](Self::subscribe).
#[derive(Default)]
pub struct AssetCache {
    models: Store<Model>,
    materials: Store<Material>,
    textures: Store<Texture>,
    subscribers: Vec<Sender<ReadinessEvent>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new readiness channel. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<ReadinessEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Finishes loading a model.
    pub fn provide_model(&mut self, path: &str, model: Model) -> Result<ModelHandle, AssetError> {
        let (id, slot) = self.models.slot_for_path(path)?;
        slot.data = Some(model);
        let handle = ModelHandle(id);
        if let Some(old) = self.models.set_state(id, ResourceState::Ready) {
            self.emit(handle.into(), old, ResourceState::Ready);
        }
        Ok(handle)
    }

    /// Finishes loading a material. It turns ready as soon as all of its
    /// textures are ready, which may be immediately.
    pub fn provide_material(
        &mut self,
        path: &str,
        material: Material,
    ) -> Result<MaterialHandle, AssetError> {
        let (id, slot) = self.materials.slot_for_path(path)?;
        slot.data = Some(material);
        let handle = MaterialHandle(id);
        self.refresh_material(handle);
        Ok(handle)
    }

    /// Finishes loading a texture and re-evaluates materials waiting on it.
    pub fn provide_texture(
        &mut self,
        path: &str,
        texture: Texture,
    ) -> Result<TextureHandle, AssetError> {
        let (id, slot) = self.textures.slot_for_path(path)?;
        slot.data = Some(texture);
        let handle = TextureHandle(id);
        if let Some(old) = self.textures.set_state(id, ResourceState::Ready) {
            self.emit(handle.into(), old, ResourceState::Ready);
        }

        let waiting: Vec<MaterialHandle> = self
            .materials
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.state == ResourceState::Loading
                    && s.data.as_ref().is_some_and(|m| m.textures.contains(&handle))
            })
            .map(|(i, _)| MaterialHandle(i as u32))
            .collect();
        for material in waiting {
            self.refresh_material(material);
        }
        Ok(handle)
    }

    /// Marks a pending resource as failed.
    pub fn mark_failed(&mut self, id: ResourceId) {
        let old = match id {
            ResourceId::Model(h) => self.models.set_state(h.0, ResourceState::Failed),
            ResourceId::Material(h) => self.materials.set_state(h.0, ResourceState::Failed),
            ResourceId::Texture(h) => self.textures.set_state(h.0, ResourceState::Failed),
        };
        if let Some(old) = old {
            tracing::warn!("Resource {:?} failed to load", id);
            self.emit(id, old, ResourceState::Failed);
        }
    }

    /// Current reference count of a resource.
    pub fn ref_count(&self, id: ResourceId) -> u32 {
        let count = match id {
            ResourceId::Model(h) => self.models.slots.get(h.index()).map(|s| s.ref_count),
            ResourceId::Material(h) => self.materials.slots.get(h.index()).map(|s| s.ref_count),
            ResourceId::Texture(h) => self.textures.slots.get(h.index()).map(|s| s.ref_count),
        };
        count.unwrap_or(0)
    }

    fn refresh_material(&mut self, handle: MaterialHandle) {
        let Some(slot) = self.materials.slots.get(handle.index()) else {
            return;
        };
        let Some(material) = slot.data.as_ref() else {
            return;
        };
        let textures_ready = material
            .textures
            .iter()
            .all(|&t| self.textures.state(t.0) == ResourceState::Ready);
        if textures_ready
            && let Some(old) = self.materials.set_state(handle.0, ResourceState::Ready)
        {
            self.emit(handle.into(), old, ResourceState::Ready);
        }
    }

    fn emit(&mut self, resource: ResourceId, old_state: ResourceState, new_state: ResourceState) {
        tracing::debug!("Resource {:?}: {:?} -> {:?}", resource, old_state, new_state);
        let event = ReadinessEvent {
            resource,
            old_state,
            new_state,
        };
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

impl ResourceManager for AssetCache {
    fn load_model(&mut self, path: &str) -> ModelHandle {
        let (id, transition) = self.models.acquire(path);
        let handle = ModelHandle(id);
        if let Some(old) = transition {
            self.emit(handle.into(), old, ResourceState::Loading);
        }
        handle
    }

    fn load_material(&mut self, path: &str) -> MaterialHandle {
        let (id, transition) = self.materials.acquire(path);
        let handle = MaterialHandle(id);
        if let Some(old) = transition {
            self.emit(handle.into(), old, ResourceState::Loading);
        }
        handle
    }

    fn load_texture(&mut self, path: &str) -> TextureHandle {
        let (id, transition) = self.textures.acquire(path);
        let handle = TextureHandle(id);
        if let Some(old) = transition {
            self.emit(handle.into(), old, ResourceState::Loading);
        }
        handle
    }

    fn unload(&mut self, id: ResourceId) {
        match id {
            ResourceId::Model(h) => {
                if let Some((_, old)) = self.models.release(h.0) {
                    self.emit(id, old, ResourceState::Empty);
                }
            }
            ResourceId::Material(h) => {
                if let Some((data, old)) = self.materials.release(h.0) {
                    self.emit(id, old, ResourceState::Empty);
                    // The material owned one reference to each of its textures.
                    for texture in data.map(|m| m.textures).unwrap_or_default() {
                        self.unload(texture.into());
                    }
                }
            }
            ResourceId::Texture(h) => {
                if let Some((_, old)) = self.textures.release(h.0) {
                    self.emit(id, old, ResourceState::Empty);
                }
            }
        }
    }

    fn state(&self, id: ResourceId) -> ResourceState {
        match id {
            ResourceId::Model(h) => self.models.state(h.0),
            ResourceId::Material(h) => self.materials.state(h.0),
            ResourceId::Texture(h) => self.textures.state(h.0),
        }
    }

    fn path(&self, id: ResourceId) -> Option<&str> {
        match id {
            ResourceId::Model(h) => self.models.path(h.0),
            ResourceId::Material(h) => self.materials.path(h.0),
            ResourceId::Texture(h) => self.textures.path(h.0),
        }
    }

    fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.ready(handle.0)
    }

    fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.ready(handle.0)
    }

    fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.ready(handle.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, Mesh};

    fn empty_model() -> Model {
        Model::new(Geometry::default(), vec![Mesh::new("m", None, 0, 0)])
    }

    #[test]
    fn test_load_is_ref_counted() {
        let mut cache = AssetCache::new();
        let a = cache.load_model("rock.msh");
        let b = cache.load_model("rock.msh");
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(a.into()), 2);

        cache.unload(a.into());
        assert_eq!(cache.state(a.into()), ResourceState::Loading);
        cache.unload(a.into());
        assert_eq!(cache.state(a.into()), ResourceState::Empty);
    }

    #[test]
    fn test_model_ready_after_provide() {
        let mut cache = AssetCache::new();
        let h = cache.load_model("rock.msh");
        assert!(cache.model(h).is_none());
        cache.provide_model("rock.msh", empty_model()).unwrap();
        assert!(cache.is_ready(h.into()));
        assert!(cache.model(h).is_some());
        assert_eq!(cache.path(h.into()), Some("rock.msh"));
    }

    #[test]
    fn test_provide_unrequested_path_fails() {
        let mut cache = AssetCache::new();
        let err = cache.provide_model("ghost.msh", empty_model()).unwrap_err();
        assert!(matches!(err, AssetError::NotRequested(_)));
    }

    #[test]
    fn test_provide_after_unload_fails() {
        let mut cache = AssetCache::new();
        let h = cache.load_texture("hm.tga");
        cache.unload(h.into());
        let err = cache.provide_texture("hm.tga", Texture::new(4, 4)).unwrap_err();
        assert!(matches!(err, AssetError::Unreferenced(_)));
    }

    #[test]
    fn test_material_waits_for_textures() {
        let mut cache = AssetCache::new();
        let rx = cache.subscribe();
        let mat = cache.load_material("terrain.mat");
        let tex = cache.load_texture("heightmap.tga");
        cache
            .provide_material("terrain.mat", Material::new(vec![tex]))
            .unwrap();
        assert_eq!(cache.state(mat.into()), ResourceState::Loading);

        cache
            .provide_texture("heightmap.tga", Texture::new(1024, 512))
            .unwrap();
        assert!(cache.is_ready(mat.into()));

        let ready: Vec<_> = rx.try_iter().filter(|e| e.became_ready()).collect();
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[1].resource, ResourceId::Material(mat));
    }

    #[test]
    fn test_unloading_material_releases_textures() {
        let mut cache = AssetCache::new();
        let mat = cache.load_material("terrain.mat");
        let tex = cache.load_texture("heightmap.tga");
        cache.provide_texture("heightmap.tga", Texture::new(8, 8)).unwrap();
        cache
            .provide_material("terrain.mat", Material::new(vec![tex]))
            .unwrap();
        cache.unload(mat.into());
        assert_eq!(cache.state(tex.into()), ResourceState::Empty);
    }

    #[test]
    fn test_reload_after_empty_goes_back_to_loading() {
        let mut cache = AssetCache::new();
        let rx = cache.subscribe();
        let h = cache.load_model("a.msh");
        cache.provide_model("a.msh", empty_model()).unwrap();
        cache.unload(h.into());
        let again = cache.load_model("a.msh");
        assert_eq!(h, again);
        assert_eq!(cache.state(h.into()), ResourceState::Loading);
        let states: Vec<_> = rx.try_iter().map(|e| e.new_state).collect();
        assert_eq!(
            states,
            vec![
                ResourceState::Loading,
                ResourceState::Ready,
                ResourceState::Empty,
                ResourceState::Loading
            ]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut cache = AssetCache::new();
        let rx = cache.subscribe();
        drop(rx);
        cache.load_model("a.msh");
        assert!(cache.subscribers.is_empty());
    }

    #[test]
    fn test_mark_failed() {
        let mut cache = AssetCache::new();
        let h = cache.load_model("broken.msh");
        cache.mark_failed(h.into());
        assert_eq!(cache.state(h.into()), ResourceState::Failed);
        assert!(cache.model(h).is_none());
    }
}
