//! Error types for scene operations.
//!
//! Two families are surfaced to callers. [`InvariantViolation`]s are
//! programming errors such as touching a dead handle; [`NotPermitted`]
//! errors are policy rejections the caller can avoid by checking state
//! first. Neither is retried internally.

use lamina_core::{IRect, ISize};

use crate::node::NodeId;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("not permitted: {0}")]
    NotPermitted(#[from] NotPermitted),
}

impl SceneError {
    pub fn is_invariant(&self) -> bool {
        matches!(self, SceneError::Invariant(_))
    }

    pub fn is_not_permitted(&self) -> bool {
        matches!(self, SceneError::NotPermitted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("node {0} is dead")]
    DeadNode(NodeId),
    #[error("node {0} is not a container")]
    NotAContainer(NodeId),
    #[error("node {node} is already in layer {layer:?}")]
    AlreadyInLayer { node: NodeId, layer: String },
    #[error("node {node} is not in layer {layer:?}")]
    NotInLayer { node: NodeId, layer: String },
    #[error("node {0} is already attached to its parent")]
    AlreadyChild(NodeId),
    #[error("asleep node {0} cannot be attached")]
    AsleepChild(NodeId),
    #[error("layer does not belong to container {0}")]
    ForeignLayer(NodeId),
    #[error("container {container} already has a layer named {name:?}")]
    DuplicateLayer { container: NodeId, name: String },
    #[error("the scene root cannot be {0}")]
    RootOperation(&'static str),
    #[error("nodes {0} and {1} do not share a layer")]
    DifferentLayers(NodeId, NodeId),
    #[error("{reference} cannot be the origin reference of {node}")]
    InvalidReference { node: NodeId, reference: NodeId },
    #[error("the default layer of container {0} cannot be removed")]
    DefaultLayer(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotPermitted {
    #[error("the width of {0} is locked")]
    WidthLocked(NodeId),
    #[error("the height of {0} is locked")]
    HeightLocked(NodeId),
    #[error("the origin of {0} is locked")]
    OriginLocked(NodeId),
    #[error("the visibility of {0} is locked")]
    VisibilityLocked(NodeId),
    #[error("layer {0:?} is full")]
    LayerFull(String),
    #[error("layer {layer:?} already holds {len} nodes")]
    LayerOverfull { layer: String, len: usize },
    #[error("layer {0:?} does not accept this node")]
    LayerRejected(String),
    #[error("no layer of container {0} accepts this node")]
    NoLayerAccepts(NodeId),
    #[error("node {0} is asleep")]
    Asleep(NodeId),
    #[error("node {0} cannot receive focus")]
    NotFocusable(NodeId),
}

/// A sub-region request that does not fit inside its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("region {area} lies outside a {}x{} surface", .size.width, .size.height)]
pub struct SurfaceError {
    pub area: IRect,
    pub size: ISize,
}
