//! The node arena and its root container.

use lamina_core::alloc::sparse_set::SparseSet;
use lamina_core::{IRect, ISize, Rect};

use crate::config::SceneConfig;
use crate::container::{ContainerState, ContainerStyle};
use crate::dirty::{DirtyState, LockFlags};
use crate::error::{InvariantViolation, SceneResult};
use crate::node::{Attachment, NodeData, NodeId, NodeView, Visibility};
use crate::origin::{Origin, OriginSpec};
use crate::router::InputState;
use crate::signal::{Signal, SignalEvent, SignalQueue};
use crate::surface::Surface;
use crate::widget::{Inert, Widget};

/// A tree of nodes rooted at one top-level container.
///
/// The scene owns every node in a generational arena. Parents own their
/// children by handle; every other relation (origin references, hover,
/// link and focus) is a plain [`NodeId`] checked against the arena before
/// use, so it silently resolves to nothing once its target is killed.
pub struct Scene {
    pub(crate) nodes: SparseSet<NodeData>,
    pub(crate) root: NodeId,
    pub(crate) config: SceneConfig,
    pub(crate) input: InputState,
    pub(crate) signals: SignalQueue,
    /// Display-space rects repainted since the last frame was presented.
    pub(crate) display_updates: Vec<IRect>,
    pub(crate) frozen: bool,
    pub(crate) open: bool,
}

impl Scene {
    pub fn new(size: ISize) -> Self {
        Self::with_config(size, SceneConfig::default())
    }

    pub fn with_config(size: ISize, config: SceneConfig) -> Self {
        let style = ContainerStyle::new(config.background);
        let rect = Rect::from_size(size);
        let mut container = ContainerState::new(style);
        container.pending = Some(rect);
        let root = NodeData {
            name: Some("scene".to_owned()),
            parent: None,
            sleep_parent: None,
            rect,
            abs_rect: rect,
            window: None,
            hitbox: rect,
            abs_hitbox: rect,
            surface: Surface::filled(size, config.background),
            origin: Origin::from_spec(&OriginSpec::default()),
            asked_size: None,
            dirty: DirtyState::Clean,
            visibility: Visibility::Visible,
            attachment: Attachment::Awake,
            locks: LockFlags::ORIGIN,
            touchable: true,
            enabled: true,
            layer: None,
            followers: Vec::new(),
            widget: Box::new(Inert),
            container: Some(Box::new(container)),
        };
        let mut nodes = SparseSet::new();
        let root = NodeId::from_slot(nodes.push(root));
        tracing::debug!(%root, width = size.width, height = size.height, "scene created");
        Self {
            nodes,
            root,
            input: InputState::new(&config),
            signals: SignalQueue::with_capacity(config.signal_capacity),
            config,
            display_updates: Vec::new(),
            frozen: false,
            open: false,
        }
    }

    /// The top-level container.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.contains(id.slot())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn node(&self, id: NodeId) -> SceneResult<NodeView<'_>> {
        Ok(NodeView {
            id,
            data: self.get(id)?,
        })
    }

    /// Iterates over every live node, asleep ones included.
    pub fn nodes(&self) -> impl Iterator<Item = NodeView<'_>> {
        self.nodes.iter().map(|(slot, data)| NodeView {
            id: NodeId::from_slot(slot),
            data,
        })
    }

    pub fn widget_as<T: Widget>(&self, id: NodeId) -> SceneResult<Option<&T>> {
        Ok(self.get(id)?.widget.as_any().downcast_ref::<T>())
    }

    /// Mutable access to a widget. Call [`Scene::request_paint`] afterwards
    /// if the change affects its pixels.
    pub fn widget_mut<T: Widget>(&mut self, id: NodeId) -> SceneResult<Option<&mut T>> {
        Ok(self.get_mut(id)?.widget.as_any_mut().downcast_mut::<T>())
    }

    /// The surface presented to the display.
    pub fn display_surface(&self) -> &Surface {
        match self.nodes.get(self.root.slot()) {
            Some(root) => &root.surface,
            // the root cannot be killed
            None => unreachable!("scene root missing"),
        }
    }

    pub fn signals(&self) -> &SignalQueue {
        &self.signals
    }

    pub fn drain_signals(&mut self) -> Vec<SignalEvent> {
        self.signals.drain()
    }

    /// Takes the display rects accumulated by recomposites so far.
    pub fn take_display_updates(&mut self) -> Vec<IRect> {
        std::mem::take(&mut self.display_updates)
    }

    /// Whether `id` is awake and it and all its ancestors are visible.
    pub fn is_shown(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(node_id.slot()) {
                Some(node) if node.is_visible() && node.is_awake() => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Whether `ancestor` is `node` or one of its awake ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.slot()).and_then(|n| n.parent);
        }
        false
    }

    pub(crate) fn get(&self, id: NodeId) -> SceneResult<&NodeData> {
        self.nodes
            .get(id.slot())
            .ok_or_else(|| InvariantViolation::DeadNode(id).into())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> SceneResult<&mut NodeData> {
        self.nodes
            .get_mut(id.slot())
            .ok_or_else(|| InvariantViolation::DeadNode(id).into())
    }

    pub(crate) fn container(&self, id: NodeId) -> SceneResult<&ContainerState> {
        self.get(id)?
            .container()
            .ok_or_else(|| InvariantViolation::NotAContainer(id).into())
    }

    pub(crate) fn container_mut(&mut self, id: NodeId) -> SceneResult<&mut ContainerState> {
        self.get_mut(id)?
            .container_mut()
            .ok_or_else(|| InvariantViolation::NotAContainer(id).into())
    }

    pub(crate) fn emit(&mut self, id: NodeId, signal: Signal) {
        self.signals.push(id, signal);
    }

    pub(crate) fn ensure_not_root(&self, id: NodeId, action: &'static str) -> SceneResult<()> {
        if id == self.root {
            Err(InvariantViolation::RootOperation(action).into())
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("open", &self.open)
            .field("frozen", &self.frozen)
            .finish()
    }
}
