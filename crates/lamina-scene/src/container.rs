//! Containers: damage accumulation, compositing and layer management.
//!
//! A container keeps the union of the rects that changed since its last
//! recomposite. Recompositing refills that rect with the background, blits
//! every visible child intersecting it in layer order, and forwards the
//! rect, translated into parent space, to the parent. The root pushes it
//! to the display update list instead.

use indexmap::IndexSet;
use lamina_core::alloc::HashMap;
use lamina_core::profiling::profile_function;
use lamina_core::{IRect, ISize, Location, Pos};

use crate::dirty::DirtyState;
use crate::error::{InvariantViolation, NotPermitted, SceneError, SceneResult};
use crate::layer::{Axis, Layer, LayerFilter, LayerId, LayerSpec, LayersManager, Refusal};
use crate::node::{NodeData, NodeId};
use crate::origin::{Coord, OriginUpdate};
use crate::scene::Scene;
use crate::surface::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub color: Color,
    pub width: i32,
}

/// How a container paints the area behind its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStyle {
    pub background: Color,
    pub border: Option<Border>,
}

impl ContainerStyle {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            border: None,
        }
    }

    pub fn with_border(mut self, color: Color, width: i32) -> Self {
        self.border = Some(Border { color, width });
        self
    }
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

/// Per-container bookkeeping.
#[derive(Debug)]
pub(crate) struct ContainerState {
    /// Awake children, in insertion order.
    pub(crate) children: IndexSet<NodeId>,
    pub(crate) asleep: IndexSet<NodeId>,
    /// Awake children that are containers themselves.
    pub(crate) containers: IndexSet<NodeId>,
    /// Awake children notified on scene open and close.
    pub(crate) scene_listeners: IndexSet<NodeId>,
    /// Children whose widget must repaint on the next frame.
    pub(crate) to_paint: IndexSet<NodeId>,
    pub(crate) layers: LayersManager,
    /// Damage in container coordinates, clipped to the hitbox.
    pub(crate) pending: Option<IRect>,
    pub(crate) style: ContainerStyle,
}

impl ContainerState {
    pub(crate) fn new(style: ContainerStyle) -> Self {
        Self {
            children: IndexSet::new(),
            asleep: IndexSet::new(),
            containers: IndexSet::new(),
            scene_listeners: IndexSet::new(),
            to_paint: IndexSet::new(),
            layers: LayersManager::new(),
            pending: None,
            style,
        }
    }
}

pub(crate) fn refusal_error(refusal: Refusal, node: NodeId, layer: &Layer) -> SceneError {
    match refusal {
        Refusal::AlreadyPresent => InvariantViolation::AlreadyInLayer {
            node,
            layer: layer.name().to_owned(),
        }
        .into(),
        Refusal::Filtered => NotPermitted::LayerRejected(layer.name().to_owned()).into(),
        Refusal::Full => NotPermitted::LayerFull(layer.name().to_owned()).into(),
    }
}

impl Scene {
    /// Marks `rect` (container coordinates) as needing recomposition.
    ///
    /// The rect is clipped to the visible part of the container; requests
    /// that fall outside it are dropped. Containers that repaint every
    /// frame ignore requests altogether.
    pub fn request_repaint(&mut self, container: NodeId, rect: IRect) -> SceneResult<()> {
        let node = self.get_mut(container)?;
        if node.dirty == DirtyState::AlwaysRepaint {
            return Ok(());
        }
        let visible = node.auto_hitbox();
        let state = node
            .container_mut()
            .ok_or(InvariantViolation::NotAContainer(container))?;
        let Some(rect) = rect.intersection(&visible) else {
            return Ok(());
        };
        state.pending = Some(match state.pending {
            Some(pending) => pending.union(&rect),
            None => rect,
        });
        Ok(())
    }

    /// Recomposes the pending rect of `container` from its background and
    /// children, then forwards it to the parent.
    ///
    /// Returns the recomposed rect in container coordinates, or `None` when
    /// nothing was pending or the container is hidden. A hidden container
    /// keeps its pending rect for when it is shown again.
    pub fn recomposite(&mut self, container: NodeId) -> SceneResult<Option<IRect>> {
        profile_function!();
        let Some(rect) = self.composite_pending(container)? else {
            return Ok(None);
        };
        self.warn_parent(container, rect)?;
        Ok(Some(rect))
    }

    fn composite_pending(&mut self, container: NodeId) -> SceneResult<Option<IRect>> {
        let node = self.get_mut(container)?;
        if !node.is_visible() {
            return Ok(None);
        }
        let state = node
            .container_mut()
            .ok_or(InvariantViolation::NotAContainer(container))?;
        let Some(rect) = state.pending.take() else {
            return Ok(None);
        };
        let style = state.style;
        let order = state.layers.paint_order_nodes();
        let mut surface = std::mem::take(&mut node.surface);

        surface.fill_rect(rect, style.background);
        if let Some(border) = style.border {
            surface.draw_border(border.color, border.width);
        }

        let mut broken = Vec::new();
        for child in order {
            let Some(data) = self.nodes.get(child.slot()) else {
                continue;
            };
            if !data.is_visible() {
                continue;
            }
            let Some(clip) = data.hitbox.intersection(&rect) else {
                continue;
            };
            let area = clip.translate(-data.rect.x, -data.rect.y);
            match data.surface.view(area) {
                Ok(view) => surface.blit(&view, clip.topleft()),
                Err(err) => {
                    tracing::warn!(
                        %container,
                        %child,
                        error = %err,
                        "child surface out of sync with its rect"
                    );
                    broken.push(child);
                }
            }
        }
        self.get_mut(container)?.surface = surface;

        for child in broken {
            self.force_full_repaint(container, child)?;
        }
        Ok(Some(rect))
    }

    /// Recovers a child whose surface no longer matches its rect by adopting
    /// the surface size and scheduling a complete repaint.
    fn force_full_repaint(&mut self, container: NodeId, child: NodeId) -> SceneResult<()> {
        let node = self.get_mut(child)?;
        if node.surface.size() != node.rect.size() {
            let surface = std::mem::take(&mut node.surface);
            self.apply_surface(child, surface)?;
        }
        let node = self.get_mut(child)?;
        let (hitbox, full) = (node.hitbox, node.auto_hitbox());
        match node.container_mut() {
            Some(state) => state.pending = (!full.is_empty()).then_some(full),
            None => {
                if node.dirty == DirtyState::Clean {
                    node.dirty = DirtyState::RepaintOnce;
                }
                self.container_mut(container)?.to_paint.insert(child);
            }
        }
        self.request_repaint(container, hitbox)
    }

    fn warn_parent(&mut self, container: NodeId, rect: IRect) -> SceneResult<()> {
        let node = self.get(container)?;
        match node.parent {
            Some(parent) => {
                let rect = rect.offset(node.rect.topleft());
                self.request_repaint(parent, rect)
            }
            None => {
                if container == self.root {
                    self.display_updates.push(rect);
                }
                Ok(())
            }
        }
    }

    /// Runs one paint pass over the whole tree and returns the display
    /// rects that changed. Frozen scenes produce nothing.
    pub fn render_frame(&mut self) -> SceneResult<Vec<IRect>> {
        profile_function!();
        if self.frozen {
            return Ok(Vec::new());
        }
        self.paint_container(self.root)?;
        Ok(self.take_display_updates())
    }

    fn paint_container(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.get_mut(id)?;
        if !node.is_visible() {
            return Ok(());
        }
        let dirty = node.dirty;
        let full = node.auto_hitbox();
        let parent = node.parent;
        let state = node
            .container_mut()
            .ok_or(InvariantViolation::NotAContainer(id))?;
        if dirty.needs_paint() {
            state.pending = (!full.is_empty()).then_some(full);
        }
        let containers: Vec<NodeId> = state.containers.iter().copied().collect();
        let to_paint: Vec<NodeId> = state.to_paint.iter().copied().collect();

        if dirty == DirtyState::RepaintOnce {
            self.get_mut(id)?.dirty = DirtyState::Clean;
            if let Some(parent) = parent {
                self.container_mut(parent)?.to_paint.shift_remove(&id);
            }
        }

        for child in containers {
            self.paint_container(child)?;
        }
        for child in to_paint {
            self.paint_leaf(id, child)?;
        }
        self.recomposite(id)?;
        Ok(())
    }

    fn paint_leaf(&mut self, container: NodeId, child: NodeId) -> SceneResult<()> {
        let Some(node) = self.nodes.get_mut(child.slot()) else {
            self.container_mut(container)?.to_paint.shift_remove(&child);
            return Ok(());
        };
        // containers repaint themselves in paint_container
        if node.container.is_some() || !node.is_visible() {
            return Ok(());
        }
        {
            let NodeData {
                widget, surface, ..
            } = &mut *node;
            if let Some(paintable) = widget.as_paintable() {
                paintable.paint(surface);
            }
        }
        let hitbox = node.hitbox;
        if node.dirty == DirtyState::RepaintOnce {
            node.dirty = DirtyState::Clean;
            self.container_mut(container)?.to_paint.shift_remove(&child);
        }
        self.request_repaint(container, hitbox)
    }

    pub fn set_background(&mut self, container: NodeId, color: Color) -> SceneResult<()> {
        self.restyle(container, |style| style.background = color)
    }

    pub fn set_border(&mut self, container: NodeId, border: Option<Border>) -> SceneResult<()> {
        self.restyle(container, |style| style.border = border)
    }

    fn restyle(
        &mut self,
        container: NodeId,
        change: impl FnOnce(&mut ContainerStyle),
    ) -> SceneResult<()> {
        change(&mut self.container_mut(container)?.style);
        self.repaint_all(container)
    }

    fn repaint_all(&mut self, container: NodeId) -> SceneResult<()> {
        let full = self.get(container)?.auto_hitbox();
        self.request_repaint(container, full)
    }

    pub fn add_layer(&mut self, container: NodeId, spec: LayerSpec) -> SceneResult<LayerId> {
        let name = spec.name.clone();
        let slot = self
            .container_mut(container)?
            .layers
            .add(spec)
            .ok_or(InvariantViolation::DuplicateLayer { container, name })?;
        tracing::debug!(%container, slot, "layer added");
        Ok(LayerId { container, slot })
    }

    pub fn layer_by_name(&self, container: NodeId, name: &str) -> SceneResult<Option<LayerId>> {
        Ok(self
            .container(container)?
            .layers
            .by_name(name)
            .map(|slot| LayerId { container, slot }))
    }

    pub fn default_layer(&self, container: NodeId) -> SceneResult<LayerId> {
        let slot = self.container(container)?.layers.default_slot();
        Ok(LayerId { container, slot })
    }

    pub fn layer(&self, id: LayerId) -> SceneResult<&Layer> {
        self.container(id.container)?
            .layers
            .get(id.slot)
            .ok_or_else(|| InvariantViolation::ForeignLayer(id.container).into())
    }

    pub fn layers(&self, container: NodeId) -> SceneResult<&LayersManager> {
        Ok(&self.container(container)?.layers)
    }

    /// The layer holding `node`, `None` while it sleeps.
    pub fn layer_of(&self, node: NodeId) -> SceneResult<Option<LayerId>> {
        let data = self.get(node)?;
        Ok(data
            .parent
            .zip(data.layer)
            .map(|(container, slot)| LayerId { container, slot }))
    }

    /// Awake children of `container`, back to front.
    pub fn paint_order(&self, container: NodeId) -> SceneResult<Vec<NodeId>> {
        Ok(self.container(container)?.layers.paint_order_nodes())
    }

    pub fn set_layer_weight(&mut self, layer: LayerId, weight: i32) -> SceneResult<()> {
        if !self
            .container_mut(layer.container)?
            .layers
            .set_weight(layer.slot, weight)
        {
            return Err(InvariantViolation::ForeignLayer(layer.container).into());
        }
        self.repaint_all(layer.container)
    }

    /// Kills the members of a layer, then drops the layer. Sleeping nodes
    /// that remember it wake into the default layer.
    pub fn remove_layer(&mut self, layer: LayerId) -> SceneResult<()> {
        if layer.slot == self.container(layer.container)?.layers.default_slot() {
            return Err(InvariantViolation::DefaultLayer(layer.container).into());
        }
        self.clear_layer(layer)?;
        if let Some(removed) = self.container_mut(layer.container)?.layers.remove(layer.slot) {
            tracing::debug!(container = %layer.container, name = removed.name(), "layer removed");
        }
        Ok(())
    }

    /// Changes the capacity of a layer. Fails if it already holds more
    /// members than `maxlen`.
    pub fn set_layer_maxlen(&mut self, layer: LayerId, maxlen: Option<usize>) -> SceneResult<()> {
        let current = self.layer(layer)?;
        if let Some(max) = maxlen
            && current.len() > max
        {
            return Err(NotPermitted::LayerOverfull {
                layer: current.name().to_owned(),
                len: current.len(),
            }
            .into());
        }
        if let Some(target) = self.container_mut(layer.container)?.layers.get_mut(layer.slot) {
            target.set_maxlen(maxlen);
        }
        Ok(())
    }

    /// Changes which nodes a layer admits. Fails if a current member would
    /// be refused.
    pub fn set_layer_filter(&mut self, layer: LayerId, filter: LayerFilter) -> SceneResult<()> {
        let current = self.layer(layer)?;
        for node in current.nodes() {
            let data = self.get(*node)?;
            if !filter.accepts(data.container.is_some(), data.widget.as_any().type_id()) {
                return Err(NotPermitted::LayerRejected(current.name().to_owned()).into());
            }
        }
        if let Some(target) = self.container_mut(layer.container)?.layers.get_mut(layer.slot) {
            target.set_filter(filter);
        }
        Ok(())
    }

    /// Resizes a container so its right and bottom edges reach those of
    /// its furthest awake child. Children do not move, locked dimensions
    /// are kept and a childless container keeps its size.
    pub fn adapt(&mut self, container: NodeId) -> SceneResult<()> {
        let members: Vec<NodeId> = self.container(container)?.children.iter().copied().collect();
        self.adapt_to(container, &members)?;
        self.update_hover();
        Ok(())
    }

    /// Like [`Scene::adapt`], considering only the members of `layer`.
    pub fn adapt_to_layer(&mut self, layer: LayerId) -> SceneResult<()> {
        let members = self.layer(layer)?.nodes().to_vec();
        self.adapt_to(layer.container, &members)?;
        self.update_hover();
        Ok(())
    }

    /// Re-adapts `container` if the layer in `slot` asks for it.
    pub(crate) fn adapt_layer_slot(&mut self, container: NodeId, slot: u32) -> SceneResult<()> {
        let members = match self.container(container)?.layers.get(slot) {
            Some(layer) if layer.is_adaptable() => layer.nodes().to_vec(),
            _ => return Ok(()),
        };
        self.adapt_to(container, &members)
    }

    fn adapt_to(&mut self, container: NodeId, members: &[NodeId]) -> SceneResult<()> {
        let mut extent: Option<(i32, i32)> = None;
        for member in members {
            let rect = self.get(*member)?.rect;
            extent = Some(match extent {
                Some((right, bottom)) => (right.max(rect.right()), bottom.max(rect.bottom())),
                None => (rect.right(), rect.bottom()),
            });
        }
        let Some((right, bottom)) = extent else {
            return Ok(());
        };
        let node = self.get(container)?;
        let (current, locks) = (node.rect.size(), node.locks);
        let size = ISize::new(
            if locks.width() { current.width } else { right.max(0) },
            if locks.height() { current.height } else { bottom.max(0) },
        );
        if size == current {
            return Ok(());
        }
        tracing::debug!(%container, width = size.width, height = size.height, "container adapted");
        self.resize_unchecked(container, size)
    }

    /// Re-sorts a layer with an automatic sort key.
    pub(crate) fn sort_layer(&mut self, container: NodeId, slot: u32) -> SceneResult<()> {
        let Some(layer) = self.container(container)?.layers.get(slot) else {
            return Ok(());
        };
        let Some(key) = layer.sort_key() else {
            return Ok(());
        };
        let keys: HashMap<NodeId, (i32, i32)> = layer
            .nodes()
            .iter()
            .filter_map(|id| self.nodes.get(id.slot()).map(|n| (*id, key.key(&n.rect))))
            .collect();
        if let Some(layer) = self.container_mut(container)?.layers.get_mut(slot) {
            layer.sort_by_key(|id| keys.get(&id).copied().unwrap_or_default());
        }
        Ok(())
    }

    /// Moves an awake node into another layer of its parent.
    pub fn swap_layer(&mut self, node: NodeId, layer: LayerId) -> SceneResult<()> {
        let data = self.get_mut(node)?;
        let parent = data.parent.ok_or(NotPermitted::Asleep(node))?;
        if layer.container != parent {
            return Err(InvariantViolation::ForeignLayer(parent).into());
        }
        if data.layer == Some(layer.slot) {
            return Ok(());
        }
        let is_container = data.container.is_some();
        let widget_type = data.widget.as_any().type_id();
        let (old, visible, hitbox) = (data.layer, data.is_visible(), data.hitbox);

        let layers = &mut self.container_mut(parent)?.layers;
        let target = layers
            .get(layer.slot)
            .ok_or(InvariantViolation::ForeignLayer(parent))?;
        target
            .check_insert(node, is_container, widget_type)
            .map_err(|refusal| refusal_error(refusal, node, target))?;
        if let Some(old) = old.and_then(|slot| layers.get_mut(slot)) {
            old.remove(node);
        }
        if let Some(target) = layers.get_mut(layer.slot) {
            target.push(node);
        }
        self.get_mut(node)?.layer = Some(layer.slot);
        self.sort_layer(parent, layer.slot)?;
        if visible {
            self.request_repaint(parent, hitbox)?;
        }
        Ok(())
    }

    fn shared_layer(&self, node: NodeId, other: NodeId) -> SceneResult<(NodeId, u32)> {
        let a = self.get(node)?;
        let b = self.get(other)?;
        match (a.parent, a.layer) {
            (Some(parent), Some(slot)) if b.parent == Some(parent) && b.layer == Some(slot) => {
                Ok((parent, slot))
            }
            _ => Err(InvariantViolation::DifferentLayers(node, other).into()),
        }
    }

    fn reorder(&mut self, node: NodeId, other: NodeId, after: bool) -> SceneResult<()> {
        let (parent, slot) = self.shared_layer(node, other)?;
        if let Some(layer) = self.container_mut(parent)?.layers.get_mut(slot) {
            layer.place_relative(node, other, after);
        }
        let hitbox = self.get(node)?.hitbox;
        self.request_repaint(parent, hitbox)
    }

    /// Places `node` directly behind `other`; both must share a layer.
    pub fn move_behind(&mut self, node: NodeId, other: NodeId) -> SceneResult<()> {
        self.reorder(node, other, false)
    }

    pub fn move_in_front_of(&mut self, node: NodeId, other: NodeId) -> SceneResult<()> {
        self.reorder(node, other, true)
    }

    /// Moves `node` to `index` inside its layer; larger indices paint later.
    pub fn overlay(&mut self, node: NodeId, index: usize) -> SceneResult<()> {
        let data = self.get(node)?;
        let (Some(parent), Some(slot)) = (data.parent, data.layer) else {
            return Err(NotPermitted::Asleep(node).into());
        };
        let hitbox = data.hitbox;
        if let Some(layer) = self.container_mut(parent)?.layers.get_mut(slot) {
            layer.move_to(node, index);
        }
        self.request_repaint(parent, hitbox)
    }

    /// Lays the members of a layer out in a row or column, in
    /// top-then-left order of their current position.
    ///
    /// The first hitbox is placed `padding` pixels from the container's
    /// top-left corner and each following one `margin` pixels after the
    /// previous one. Windowed members are offset so their hitbox, not
    /// their rect, lands on the cursor. Fails without moving anything if a
    /// member's origin is locked. Paint order is left unchanged.
    pub fn pack_layer(
        &mut self,
        layer: LayerId,
        axis: Axis,
        margin: i32,
        padding: i32,
    ) -> SceneResult<()> {
        let mut members = Vec::new();
        for node in self.layer(layer)?.nodes() {
            let data = self.get(*node)?;
            if data.locks.origin() {
                return Err(NotPermitted::OriginLocked(*node).into());
            }
            members.push((*node, (data.rect.top(), data.rect.left())));
        }
        members.sort_by_key(|(_, key)| *key);

        let mut cursor = Pos::new(padding, padding);
        for (node, _) in members {
            let data = self.get(node)?;
            let inset = if data.window.is_some() {
                data.hitbox.topleft() - data.rect.topleft()
            } else {
                Pos::new(0, 0)
            };
            let target = cursor - inset;
            let update = OriginUpdate::default()
                .pos(Coord::Px(target.x), Coord::Px(target.y))
                .location(Location::TopLeft)
                .reference(None)
                .reference_location(Location::TopLeft)
                .from_hitbox(false);
            self.configure_origin(node, update)?;
            let data = self.get(node)?;
            let placed = if data.hitbox.is_empty() {
                data.rect
            } else {
                data.hitbox
            };
            match axis {
                Axis::Horizontal => cursor.x = placed.right() + margin,
                Axis::Vertical => cursor.y = placed.bottom() + margin,
            }
        }
        Ok(())
    }

    /// Kills every member of a layer.
    pub fn clear_layer(&mut self, layer: LayerId) -> SceneResult<()> {
        let nodes = self.layer(layer)?.nodes().to_vec();
        for node in nodes {
            if self.is_alive(node) {
                self.kill(node)?;
            }
        }
        Ok(())
    }
}
