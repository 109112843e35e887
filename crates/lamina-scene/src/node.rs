//! Node handles, per-node state and the construction contract.

use std::any::Any;
use std::fmt;

use lamina_core::alloc::sparse_set::IndexSlot;
use lamina_core::{IRect, ISize, Rect};

use crate::container::{ContainerState, ContainerStyle};
use crate::dirty::{DirtyState, LockFlags};
use crate::layer::{LayerId, Level};
use crate::origin::{Origin, OriginSpec, SizeSpec};
use crate::surface::Surface;
use crate::widget::{Inert, Widget};

/// Non-owning handle to a node. Handles of killed nodes never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(IndexSlot);

impl NodeId {
    pub fn from_slot(slot: IndexSlot) -> Self {
        Self(slot)
    }

    pub fn slot(self) -> IndexSlot {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0.index(), self.0.generation())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    Awake,
    Asleep,
}

/// Parent-relative clip rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub rect: IRect,
    /// Translate the window along with the node when it moves.
    pub follow_movements: bool,
}

pub(crate) struct NodeData {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeId>,
    /// Parent remembered while asleep.
    pub(crate) sleep_parent: Option<NodeId>,
    pub(crate) rect: IRect,
    pub(crate) abs_rect: IRect,
    pub(crate) window: Option<Window>,
    pub(crate) hitbox: IRect,
    pub(crate) abs_hitbox: IRect,
    pub(crate) surface: Surface,
    pub(crate) origin: Origin,
    pub(crate) asked_size: Option<SizeSpec>,
    pub(crate) dirty: DirtyState,
    pub(crate) visibility: Visibility,
    pub(crate) attachment: Attachment,
    pub(crate) locks: LockFlags,
    pub(crate) touchable: bool,
    pub(crate) enabled: bool,
    /// Layer slot inside the parent, kept while asleep.
    pub(crate) layer: Option<u32>,
    /// Nodes whose origin resolves against this one.
    pub(crate) followers: Vec<NodeId>,
    pub(crate) widget: Box<dyn Widget>,
    pub(crate) container: Option<Box<ContainerState>>,
}

impl NodeData {
    pub(crate) fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub(crate) fn is_awake(&self) -> bool {
        self.attachment == Attachment::Awake
    }

    /// Parent, or the parent it will return to when woken.
    pub(crate) fn owner(&self) -> Option<NodeId> {
        self.parent.or(self.sleep_parent)
    }

    pub(crate) fn compute_hitbox(&self) -> IRect {
        match &self.window {
            Some(window) => self.rect.clip(&window.rect),
            None => self.rect,
        }
    }

    /// Hitbox expressed relative to the node's own top-left.
    pub(crate) fn auto_hitbox(&self) -> IRect {
        self.hitbox.translate(-self.rect.x, -self.rect.y)
    }

    pub(crate) fn container(&self) -> Option<&ContainerState> {
        self.container.as_deref()
    }

    pub(crate) fn container_mut(&mut self) -> Option<&mut ContainerState> {
        self.container.as_deref_mut()
    }
}

/// Where a new child is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// The parent's default mainground layer.
    #[default]
    Default,
    Layer(LayerId),
    Level(Level),
}

/// Construction contract for a node: parent, initial surface, origin,
/// optional layer or level, name, visibility and touchability.
pub struct NodeBuilder {
    pub(crate) parent: NodeId,
    pub(crate) surface: Surface,
    pub(crate) origin: OriginSpec,
    pub(crate) placement: Placement,
    pub(crate) name: Option<String>,
    pub(crate) visible: bool,
    pub(crate) touchable: bool,
    pub(crate) enabled: bool,
    pub(crate) asleep: bool,
    pub(crate) widget: Box<dyn Widget>,
    pub(crate) container: Option<ContainerStyle>,
    pub(crate) size: Option<SizeSpec>,
    pub(crate) dirty: Option<DirtyState>,
    pub(crate) window: Option<Window>,
    pub(crate) locks: LockFlags,
}

impl NodeBuilder {
    pub fn new(parent: NodeId, surface: Surface) -> Self {
        Self {
            parent,
            surface,
            origin: OriginSpec::default(),
            placement: Placement::Default,
            name: None,
            visible: true,
            touchable: true,
            enabled: true,
            asleep: false,
            widget: Box::new(Inert),
            container: None,
            size: None,
            dirty: None,
            window: None,
            locks: LockFlags::empty(),
        }
    }

    /// A container node with a background-filled surface of `size`.
    pub fn container(parent: NodeId, size: ISize, style: ContainerStyle) -> Self {
        let mut builder = Self::new(parent, Surface::filled(size, style.background));
        builder.container = Some(style);
        builder
    }

    pub fn origin(mut self, origin: OriginSpec) -> Self {
        self.origin = origin;
        self
    }

    pub fn layer(mut self, layer: LayerId) -> Self {
        self.placement = Placement::Layer(layer);
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.placement = Placement::Level(level);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn touchable(mut self, touchable: bool) -> Self {
        self.touchable = touchable;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Create the node directly in the asleep state.
    pub fn asleep(mut self) -> Self {
        self.asleep = true;
        self
    }

    pub fn widget(mut self, widget: impl Widget) -> Self {
        self.widget = Box::new(widget);
        self
    }

    /// Size relative to the parent, re-applied whenever the parent resizes.
    pub fn size(mut self, size: SizeSpec) -> Self {
        self.size = Some(size);
        self
    }

    pub fn dirty(mut self, dirty: DirtyState) -> Self {
        self.dirty = Some(dirty);
        self
    }

    pub fn window(mut self, rect: IRect, follow_movements: bool) -> Self {
        self.window = Some(Window {
            rect,
            follow_movements,
        });
        self
    }

    pub fn locks(mut self, locks: LockFlags) -> Self {
        self.locks = locks;
        self
    }
}

/// Read-only view of a live node.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    pub(crate) id: NodeId,
    pub(crate) data: &'a NodeData,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&'a str> {
        self.data.name.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.data.parent
    }

    /// Parent-relative rect.
    pub fn rect(&self) -> IRect {
        self.data.rect
    }

    /// Scene-relative rect.
    pub fn abs_rect(&self) -> IRect {
        self.data.abs_rect
    }

    pub fn hitbox(&self) -> IRect {
        self.data.hitbox
    }

    pub fn abs_hitbox(&self) -> IRect {
        self.data.abs_hitbox
    }

    /// Hitbox relative to the node's own top-left.
    pub fn auto_hitbox(&self) -> IRect {
        self.data.auto_hitbox()
    }

    /// The node rect at the origin, in its own coordinates.
    pub fn auto_rect(&self) -> IRect {
        Rect::from_size(self.data.rect.size())
    }

    pub fn window(&self) -> Option<Window> {
        self.data.window
    }

    pub fn surface(&self) -> &'a Surface {
        &self.data.surface
    }

    pub fn origin(&self) -> &'a Origin {
        &self.data.origin
    }

    pub fn size_spec(&self) -> Option<SizeSpec> {
        self.data.asked_size
    }

    pub fn dirty_state(&self) -> DirtyState {
        self.data.dirty
    }

    pub fn locks(&self) -> LockFlags {
        self.data.locks
    }

    pub fn is_visible(&self) -> bool {
        self.data.is_visible()
    }

    pub fn is_awake(&self) -> bool {
        self.data.is_awake()
    }

    pub fn is_enabled(&self) -> bool {
        self.data.enabled
    }

    pub fn is_touchable(&self) -> bool {
        self.data.touchable
    }

    pub fn is_container(&self) -> bool {
        self.data.container.is_some()
    }

    /// Awake children in insertion order, empty for leaves.
    pub fn children(&self) -> Vec<NodeId> {
        self.data
            .container()
            .map(|c| c.children.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn asleep_children(&self) -> Vec<NodeId> {
        self.data
            .container()
            .map(|c| c.asleep.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Pending damage of a container, in its own coordinates.
    pub fn pending_repaint(&self) -> Option<IRect> {
        self.data.container().and_then(|c| c.pending)
    }

    pub fn widget(&self) -> &'a dyn Any {
        self.data.widget.as_any()
    }

    pub fn widget_as<T: Widget>(&self) -> Option<&'a T> {
        self.data.widget.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.data.name)
            .field("rect", &self.data.rect)
            .field("visibility", &self.data.visibility)
            .field("attachment", &self.data.attachment)
            .finish()
    }
}
