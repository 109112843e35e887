//! Paint-order buckets.
//!
//! A [`Layer`] is an ordered list of sibling nodes. Each container owns a
//! [`LayersManager`] that groups its layers into three z-levels and orders
//! them by weight inside a level. Concatenating the layers in that order
//! gives the blit order of the container.

use std::any::TypeId;

use lamina_core::IRect;

use crate::node::NodeId;

/// Weight given to layers that do not ask for one.
pub const DEFAULT_WEIGHT: i32 = 2;

/// Name of the layer every container starts with.
pub const DEFAULT_LAYER: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Background,
    Mainground,
    Foreground,
}

/// Handle to a layer of a specific container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    pub(crate) container: NodeId,
    pub(crate) slot: u32,
}

impl LayerId {
    pub fn container(&self) -> NodeId {
        self.container
    }
}

/// Which nodes a layer admits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayerFilter {
    #[default]
    Any,
    Containers,
    Leaves,
    /// Only nodes whose widget has one of these concrete types.
    Only(Vec<TypeId>),
}

impl LayerFilter {
    pub fn only<T: 'static>() -> Self {
        LayerFilter::Only(vec![TypeId::of::<T>()])
    }

    pub fn accepts(&self, is_container: bool, widget_type: TypeId) -> bool {
        match self {
            LayerFilter::Any => true,
            LayerFilter::Containers => is_container,
            LayerFilter::Leaves => !is_container,
            LayerFilter::Only(types) => types.contains(&widget_type),
        }
    }
}

/// Automatic ordering applied after each insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TopThenLeft,
    LeftThenTop,
}

impl SortKey {
    pub fn key(self, rect: &IRect) -> (i32, i32) {
        match self {
            SortKey::TopThenLeft => (rect.top(), rect.left()),
            SortKey::LeftThenTop => (rect.left(), rect.top()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Parameters of a new layer.
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub name: String,
    pub level: Level,
    pub weight: i32,
    pub filter: LayerFilter,
    pub maxlen: Option<usize>,
    pub touchable: bool,
    pub sort_key: Option<SortKey>,
    /// Resize the owning container to the members after each insertion
    /// or removal.
    pub adaptable: bool,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Mainground,
            weight: DEFAULT_WEIGHT,
            filter: LayerFilter::Any,
            maxlen: None,
            touchable: true,
            sort_key: None,
            adaptable: false,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn filter(mut self, filter: LayerFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn maxlen(mut self, maxlen: usize) -> Self {
        self.maxlen = Some(maxlen);
        self
    }

    pub fn touchable(mut self, touchable: bool) -> Self {
        self.touchable = touchable;
        self
    }

    pub fn sort_key(mut self, key: SortKey) -> Self {
        self.sort_key = Some(key);
        self
    }

    pub fn adaptable(mut self, adaptable: bool) -> Self {
        self.adaptable = adaptable;
        self
    }
}

/// Why a layer refused a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refusal {
    AlreadyPresent,
    Filtered,
    Full,
}

#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    level: Level,
    weight: i32,
    filter: LayerFilter,
    maxlen: Option<usize>,
    touchable: bool,
    sort_key: Option<SortKey>,
    adaptable: bool,
    nodes: Vec<NodeId>,
}

impl Layer {
    fn from_spec(spec: LayerSpec) -> Self {
        Self {
            name: spec.name,
            level: spec.level,
            weight: spec.weight,
            filter: spec.filter,
            maxlen: spec.maxlen,
            touchable: spec.touchable,
            sort_key: spec.sort_key,
            adaptable: spec.adaptable,
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn filter(&self) -> &LayerFilter {
        &self.filter
    }

    pub fn maxlen(&self) -> Option<usize> {
        self.maxlen
    }

    pub fn is_touchable(&self) -> bool {
        self.touchable
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn is_adaptable(&self) -> bool {
        self.adaptable
    }

    /// Members in paint order, back to front.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.maxlen.is_some_and(|max| self.nodes.len() >= max)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| *n == node)
    }

    pub fn accepts(&self, is_container: bool, widget_type: TypeId) -> bool {
        self.filter.accepts(is_container, widget_type)
    }

    pub(crate) fn check_insert(
        &self,
        node: NodeId,
        is_container: bool,
        widget_type: TypeId,
    ) -> Result<(), Refusal> {
        if self.contains(node) {
            Err(Refusal::AlreadyPresent)
        } else if !self.accepts(is_container, widget_type) {
            Err(Refusal::Filtered)
        } else if self.is_full() {
            Err(Refusal::Full)
        } else {
            Ok(())
        }
    }

    pub(crate) fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub(crate) fn remove(&mut self, node: NodeId) -> bool {
        match self.position(node) {
            Some(index) => {
                self.nodes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Moves `node` to `index` (clamped). Returns `false` if absent.
    pub(crate) fn move_to(&mut self, node: NodeId, index: usize) -> bool {
        if !self.remove(node) {
            return false;
        }
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
        true
    }

    /// Moves `node` right behind (`after == false`) or right in front of
    /// `other`. Returns `false` if either is absent.
    pub(crate) fn place_relative(&mut self, node: NodeId, other: NodeId, after: bool) -> bool {
        if node == other || !self.contains(other) || !self.remove(node) {
            return false;
        }
        let Some(index) = self.position(other) else {
            return false;
        };
        let index = if after { index + 1 } else { index };
        self.nodes.insert(index, node);
        true
    }

    /// Stable sort of the members by `key`.
    pub(crate) fn sort_by_key(&mut self, mut key: impl FnMut(NodeId) -> (i32, i32)) {
        self.nodes.sort_by_cached_key(|node| key(*node));
    }

    pub(crate) fn set_weight(&mut self, weight: i32) {
        self.weight = weight;
    }

    pub(crate) fn set_maxlen(&mut self, maxlen: Option<usize>) {
        self.maxlen = maxlen;
    }

    pub(crate) fn set_filter(&mut self, filter: LayerFilter) {
        self.filter = filter;
    }
}

/// The layers of one container.
#[derive(Debug, Clone)]
pub struct LayersManager {
    /// Indexed by slot. Removed layers leave `None` so slots stay stable.
    layers: Vec<Option<Layer>>,
    /// Slots sorted by (level, weight, creation).
    order: Vec<u32>,
    default: u32,
}

impl Default for LayersManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayersManager {
    pub fn new() -> Self {
        let mut manager = Self {
            layers: Vec::new(),
            order: Vec::new(),
            default: 0,
        };
        manager.default = manager
            .add(LayerSpec::new(DEFAULT_LAYER))
            .unwrap_or_default();
        manager
    }

    /// Adds a layer, or returns `None` if the name is taken.
    pub fn add(&mut self, spec: LayerSpec) -> Option<u32> {
        if self.by_name(&spec.name).is_some() {
            return None;
        }
        let slot = self.layers.len() as u32;
        self.layers.push(Some(Layer::from_spec(spec)));
        self.order.push(slot);
        self.sort();
        Some(slot)
    }

    /// Drops a layer. The default layer cannot be removed.
    pub(crate) fn remove(&mut self, slot: u32) -> Option<Layer> {
        if slot == self.default {
            return None;
        }
        let layer = self.layers.get_mut(slot as usize)?.take()?;
        self.order.retain(|s| *s != slot);
        Some(layer)
    }

    fn sort(&mut self) {
        let layers = &self.layers;
        self.order.sort_by_key(|slot| {
            layers[*slot as usize]
                .as_ref()
                .map(|layer| (layer.level, layer.weight))
        });
    }

    pub fn get(&self, slot: u32) -> Option<&Layer> {
        self.layers.get(slot as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, slot: u32) -> Option<&mut Layer> {
        self.layers.get_mut(slot as usize)?.as_mut()
    }

    fn live(&self) -> impl Iterator<Item = (u32, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .filter_map(|(slot, layer)| layer.as_ref().map(|layer| (slot as u32, layer)))
    }

    pub fn by_name(&self, name: &str) -> Option<u32> {
        self.live()
            .find(|(_, layer)| layer.name == name)
            .map(|(slot, _)| slot)
    }

    pub fn default_slot(&self) -> u32 {
        self.default
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Slots in paint order, back to front.
    pub fn order(&self) -> &[u32] {
        &self.order
    }

    pub fn paint_order(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.order.iter().filter_map(|slot| self.get(*slot))
    }

    /// All member nodes in blit order.
    pub fn paint_order_nodes(&self) -> Vec<NodeId> {
        self.paint_order()
            .flat_map(|layer| layer.nodes.iter().copied())
            .collect()
    }

    /// Touchable layers, front-most first.
    pub fn touchable_front_to_back(&self) -> impl Iterator<Item = &Layer> {
        self.paint_order().rev().filter(|layer| layer.touchable)
    }

    pub fn slot_of(&self, node: NodeId) -> Option<u32> {
        self.live()
            .find(|(_, layer)| layer.contains(node))
            .map(|(slot, _)| slot)
    }

    pub(crate) fn set_weight(&mut self, slot: u32, weight: i32) -> bool {
        match self.get_mut(slot) {
            Some(layer) => {
                layer.set_weight(weight);
                self.sort();
                true
            }
            None => false,
        }
    }

    /// Picks the layer a new child lands in: the default layer unless a
    /// level is requested, in which case the first accepting layer of that
    /// level in paint order.
    pub fn layer_for(&self, level: Option<Level>, accepts: impl Fn(&Layer) -> bool) -> Option<u32> {
        match level {
            None => {
                if self.get(self.default).is_some_and(&accepts) {
                    Some(self.default)
                } else {
                    self.order
                        .iter()
                        .copied()
                        .find(|slot| self.get(*slot).is_some_and(&accepts))
                }
            }
            Some(level) => self.order.iter().copied().find(|slot| {
                self.get(*slot)
                    .is_some_and(|layer| layer.level == level && accepts(layer))
            }),
        }
    }
}
