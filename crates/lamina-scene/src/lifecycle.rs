//! Node creation, visibility, sleep, destruction and scene open/close.

use std::any::TypeId;

use lamina_core::profiling::profile_function;
use lamina_core::Rect;

use crate::container::{ContainerState, refusal_error};
use crate::dirty::{DirtyState, LockFlags};
use crate::error::{InvariantViolation, NotPermitted, SceneResult};
use crate::layer::{Layer, LayerSpec, Level};
use crate::node::{Attachment, NodeBuilder, NodeData, NodeId, Placement, Visibility};
use crate::origin::Origin;
use crate::scene::Scene;
use crate::signal::Signal;
use crate::surface::Surface;

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Background => "background",
        Level::Mainground => "mainground",
        Level::Foreground => "foreground",
    }
}

impl Scene {
    /// Creates a node under `builder.parent` and returns its handle.
    ///
    /// The node is positioned from its origin right away, inserted into the
    /// chosen layer and scheduled for painting. No motion signal is emitted
    /// for the initial placement.
    pub fn create(&mut self, builder: NodeBuilder) -> SceneResult<NodeId> {
        profile_function!();
        let NodeBuilder {
            parent,
            surface,
            origin,
            placement,
            name,
            visible,
            touchable,
            enabled,
            asleep,
            mut widget,
            container,
            size,
            dirty,
            window,
            mut locks,
        } = builder;

        self.container(parent)?;
        if let Some(reference) = origin.reference
            && !self.is_alive(reference)
        {
            return Err(InvariantViolation::DeadNode(reference).into());
        }
        let is_container = container.is_some();
        let widget_type = widget.as_any().type_id();
        let slot = self.pick_layer(parent, placement, is_container, widget_type)?;

        let paintable = widget.as_paintable().is_some();
        let dirty = dirty.unwrap_or(if paintable {
            DirtyState::RepaintOnce
        } else {
            DirtyState::Clean
        });
        if origin.locked {
            locks.insert(LockFlags::ORIGIN);
        }
        let rect = Rect::from_size(surface.size());
        let container = container.map(|style| {
            let mut state = ContainerState::new(style);
            state.pending = (!rect.is_empty()).then_some(rect);
            Box::new(state)
        });
        let data = NodeData {
            name,
            parent: Some(parent),
            sleep_parent: None,
            rect,
            abs_rect: rect,
            window,
            hitbox: rect,
            abs_hitbox: rect,
            surface,
            origin: Origin::from_spec(&origin),
            asked_size: size,
            dirty,
            visibility: if visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            },
            attachment: Attachment::Awake,
            locks,
            touchable,
            enabled,
            layer: Some(slot),
            followers: Vec::new(),
            widget,
            container,
        };
        let id = NodeId::from_slot(self.nodes.push(data));

        if let Some(spec) = size.filter(|s| s.is_relative()) {
            let target = spec.resolve(self.get(parent)?.rect.size());
            let node = self.get_mut(id)?;
            node.surface = match node.container() {
                Some(state) => Surface::filled(target, state.style.background),
                None => node.surface.resized(target),
            };
            node.rect = node.rect.with_size(target);
            let full = Rect::from_size(target);
            if let Some(state) = node.container_mut() {
                state.pending = (!full.is_empty()).then_some(full);
            }
        }
        if let Some(target) = self.origin_target(id)? {
            let node = self.get_mut(id)?;
            node.rect = node.rect.with_point_at(node.origin.location, target);
        }
        let node = self.get_mut(id)?;
        node.hitbox = node.compute_hitbox();
        self.refresh_abs(id)?;
        self.subscribe_origin(id)?;
        self.attach(parent, id, slot)?;

        if asleep {
            self.sleep(id)?;
        }
        let node = self.get(id)?;
        tracing::debug!(node = %id, name = ?node.name, %parent, rect = %node.rect, "node created");
        self.update_hover();
        Ok(id)
    }

    /// Chooses and validates the layer a new or waking child goes into.
    fn pick_layer(
        &mut self,
        parent: NodeId,
        placement: Placement,
        is_container: bool,
        widget_type: TypeId,
    ) -> SceneResult<u32> {
        let layers = &mut self.container_mut(parent)?.layers;
        let accepts = |layer: &Layer| layer.accepts(is_container, widget_type);
        let slot = match placement {
            Placement::Layer(layer) => {
                if layer.container != parent {
                    return Err(InvariantViolation::ForeignLayer(parent).into());
                }
                layer.slot
            }
            Placement::Default => layers
                .layer_for(None, accepts)
                .ok_or(NotPermitted::NoLayerAccepts(parent))?,
            Placement::Level(level) => match layers.layer_for(Some(level), accepts) {
                Some(slot) => slot,
                None => layers
                    .add(LayerSpec::new(level_name(level)).level(level))
                    .ok_or(NotPermitted::NoLayerAccepts(parent))?,
            },
        };
        let layer = layers
            .get(slot)
            .ok_or(InvariantViolation::ForeignLayer(parent))?;
        if !layer.accepts(is_container, widget_type) {
            return Err(NotPermitted::LayerRejected(layer.name().to_owned()).into());
        }
        if layer.is_full() {
            return Err(NotPermitted::LayerFull(layer.name().to_owned()).into());
        }
        Ok(slot)
    }

    /// Links an awake node into its parent's bookkeeping.
    fn attach(&mut self, parent: NodeId, id: NodeId, slot: u32) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        let is_container = node.container.is_some();
        let widget_type = node.widget.as_any().type_id();
        let listener = node.widget.as_scene_listener().is_some();
        let (dirty, visible, hitbox) = (node.dirty, node.is_visible(), node.hitbox);

        let state = self.container_mut(parent)?;
        if state.children.contains(&id) {
            return Err(InvariantViolation::AlreadyChild(id).into());
        }
        let Some(layer) = state.layers.get_mut(slot) else {
            return Err(InvariantViolation::ForeignLayer(parent).into());
        };
        layer
            .check_insert(id, is_container, widget_type)
            .map_err(|refusal| refusal_error(refusal, id, layer))?;
        layer.push(id);
        state.children.insert(id);
        if is_container {
            state.containers.insert(id);
        }
        if listener {
            state.scene_listeners.insert(id);
        }
        if dirty.needs_paint() {
            state.to_paint.insert(id);
        }
        self.sort_layer(parent, slot)?;
        if visible {
            self.request_repaint(parent, hitbox)?;
        }
        self.adapt_layer_slot(parent, slot)
    }

    /// Unlinks an awake node from its parent's bookkeeping and returns the
    /// layer slot it occupied.
    fn detach(&mut self, parent: NodeId, id: NodeId) -> SceneResult<Option<u32>> {
        let state = self.container_mut(parent)?;
        state.children.shift_remove(&id);
        state.containers.shift_remove(&id);
        state.scene_listeners.shift_remove(&id);
        state.to_paint.shift_remove(&id);
        let slot = state.layers.slot_of(id);
        if let Some(layer) = slot.and_then(|slot| state.layers.get_mut(slot)) {
            layer.remove(id);
        }
        if let Some(slot) = slot {
            self.adapt_layer_slot(parent, slot)?;
        }
        Ok(slot)
    }

    pub fn show(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.get(id)?;
        if node.is_visible() {
            return Ok(());
        }
        if node.locks.visibility() {
            return Err(NotPermitted::VisibilityLocked(id).into());
        }
        let node = self.get_mut(id)?;
        node.visibility = Visibility::Visible;
        let hitbox = node.hitbox;
        self.emit(id, Signal::Show);
        self.send_display_request(id, hitbox)?;
        self.update_hover();
        Ok(())
    }

    /// Hides a node. Link and focus held inside its subtree are released.
    pub fn hide(&mut self, id: NodeId) -> SceneResult<()> {
        self.ensure_not_root(id, "hidden")?;
        let node = self.get(id)?;
        if !node.is_visible() {
            return Ok(());
        }
        if node.locks.visibility() {
            return Err(NotPermitted::VisibilityLocked(id).into());
        }
        let node = self.get_mut(id)?;
        node.visibility = Visibility::Hidden;
        let hitbox = node.hitbox;
        self.release_interactions(id);
        self.emit(id, Signal::Hide);
        self.send_display_request(id, hitbox)?;
        self.update_hover();
        Ok(())
    }

    /// Detaches a node from its parent while keeping it alive.
    ///
    /// The parent remembers it in its asleep set and the node remembers its
    /// layer, so [`Scene::wake`] puts it back where it was.
    pub fn sleep(&mut self, id: NodeId) -> SceneResult<()> {
        self.ensure_not_root(id, "put to sleep")?;
        let node = self.get(id)?;
        let Some(parent) = node.parent.filter(|_| node.is_awake()) else {
            return Ok(());
        };
        let (visible, hitbox) = (node.is_visible(), node.hitbox);
        self.release_interactions(id);
        let slot = self.detach(parent, id)?;
        self.container_mut(parent)?.asleep.insert(id);
        if visible {
            self.request_repaint(parent, hitbox)?;
        }

        let node = self.get_mut(id)?;
        node.parent = None;
        node.sleep_parent = Some(parent);
        node.attachment = Attachment::Asleep;
        node.layer = slot;
        self.emit(id, Signal::Sleep);
        tracing::debug!(node = %id, %parent, "node asleep");
        self.update_hover();
        Ok(())
    }

    /// Re-attaches a sleeping node. A node whose parent died meanwhile is
    /// killed instead.
    pub fn wake(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.get(id)?;
        if node.is_awake() {
            return Ok(());
        }
        let Some(parent) = node.sleep_parent else {
            return Ok(());
        };
        let is_container = node.container.is_some();
        let widget_type = node.widget.as_any().type_id();
        let remembered = node.layer;
        if !self.is_alive(parent) {
            tracing::debug!(node = %id, "parent died during sleep");
            return self.kill(id);
        }
        let remembered = remembered.filter(|slot| {
            self.container(parent)
                .ok()
                .and_then(|state| state.layers.get(*slot))
                .is_some_and(|layer| {
                    layer.accepts(is_container, widget_type) && !layer.is_full()
                })
        });
        let slot = match remembered {
            Some(slot) => slot,
            None => self.pick_layer(parent, Placement::Default, is_container, widget_type)?,
        };

        self.container_mut(parent)?.asleep.shift_remove(&id);
        let node = self.get_mut(id)?;
        node.parent = Some(parent);
        node.sleep_parent = None;
        node.attachment = Attachment::Awake;
        node.layer = Some(slot);
        node.hitbox = node.compute_hitbox();
        self.refresh_subtree_abs(id)?;
        self.refit_size(id)?;
        self.follow_origin(id)?;
        self.attach(parent, id, slot)?;
        self.emit(id, Signal::Wake);
        tracing::debug!(node = %id, %parent, "node woken");
        self.update_hover();
        Ok(())
    }

    /// Destroys a node and its whole subtree. Handles to any of them stop
    /// resolving.
    pub fn kill(&mut self, id: NodeId) -> SceneResult<()> {
        self.ensure_not_root(id, "killed")?;
        self.get(id)?;
        self.kill_subtree(id)?;
        self.update_hover();
        Ok(())
    }

    fn kill_subtree(&mut self, id: NodeId) -> SceneResult<()> {
        if let Some(state) = self.get(id)?.container() {
            let children: Vec<NodeId> = state
                .children
                .iter()
                .chain(state.asleep.iter())
                .copied()
                .collect();
            for child in children {
                self.kill_subtree(child)?;
            }
        }

        self.release_interactions(id);
        self.emit(id, Signal::Kill);
        let node = self.get(id)?;
        let (parent, sleep_parent) = (node.parent, node.sleep_parent);
        let (visible, hitbox) = (node.is_visible(), node.hitbox);
        if let Some(parent) = parent {
            self.detach(parent, id)?;
            if visible {
                self.request_repaint(parent, hitbox)?;
            }
        } else if let Some(owner) = sleep_parent
            && let Ok(state) = self.container_mut(owner)
        {
            state.asleep.shift_remove(&id);
        }
        self.unsubscribe_origin(id)?;

        let Some(data) = self.nodes.remove(id.slot()) else {
            return Err(InvariantViolation::DeadNode(id).into());
        };
        for follower in data.followers {
            let Some(node) = self.nodes.get_mut(follower.slot()) else {
                continue;
            };
            if node.origin.reference == Some(id) {
                node.origin.reference = None;
            }
            self.subscribe_origin(follower)?;
            self.follow_origin(follower)?;
        }
        tracing::debug!(node = %id, name = ?data.name, "node killed");
        Ok(())
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        if node.enabled == enabled {
            return Ok(());
        }
        node.enabled = enabled;
        if enabled {
            self.emit(id, Signal::Enable);
        } else {
            if self.input.focused == Some(id) {
                self.set_focus_internal(None);
            }
            if self.input.linked == Some(id) {
                self.unlink();
            }
            self.emit(id, Signal::Disable);
        }
        self.update_hover();
        Ok(())
    }

    pub fn set_touchable(&mut self, id: NodeId, touchable: bool) -> SceneResult<()> {
        self.get_mut(id)?.touchable = touchable;
        self.update_hover();
        Ok(())
    }

    pub fn set_dirty(&mut self, id: NodeId, dirty: DirtyState) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        node.dirty = dirty;
        let Some(parent) = node.parent else {
            return Ok(());
        };
        let to_paint = &mut self.container_mut(parent)?.to_paint;
        if dirty.needs_paint() {
            to_paint.insert(id);
        } else {
            to_paint.shift_remove(&id);
        }
        Ok(())
    }

    /// Schedules a repaint of the node's own surface on the next frame.
    pub fn request_paint(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        if node.dirty == DirtyState::Clean {
            node.dirty = DirtyState::RepaintOnce;
        }
        if let Some(parent) = node.parent {
            self.container_mut(parent)?.to_paint.insert(id);
        }
        Ok(())
    }

    /// Awake scene listeners, parents before their descendants.
    fn scene_listeners(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(state) = self.nodes.get(id.slot()).and_then(|n| n.container()) else {
                continue;
            };
            out.extend(state.scene_listeners.iter().copied());
            stack.extend(state.containers.iter().rev().copied());
        }
        out
    }

    pub fn open(&mut self) -> SceneResult<()> {
        if self.open {
            return Ok(());
        }
        self.open = true;
        self.emit(self.root, Signal::SceneOpen);
        for id in self.scene_listeners() {
            if let Some(listener) = self.get_mut(id)?.widget.as_scene_listener() {
                listener.on_scene_open();
            }
            self.emit(id, Signal::SceneOpen);
        }
        tracing::debug!("scene opened");
        self.update_hover();
        Ok(())
    }

    /// Closes the scene, releasing hover, link, focus and held keys.
    pub fn close(&mut self) -> SceneResult<()> {
        if !self.open {
            return Ok(());
        }
        self.release_all();
        self.set_hovered(None);
        self.set_focus_internal(None);
        self.open = false;
        for id in self.scene_listeners() {
            if let Some(listener) = self.get_mut(id)?.widget.as_scene_listener() {
                listener.on_scene_close();
            }
            self.emit(id, Signal::SceneClose);
        }
        self.emit(self.root, Signal::SceneClose);
        tracing::debug!("scene closed");
        Ok(())
    }
}
