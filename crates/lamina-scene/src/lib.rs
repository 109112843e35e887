//! Lamina Scene - retained-mode 2D scene graph
//!
//! A [`Scene`] is a tree of rectangular nodes, each owning a pixel
//! [`Surface`]. Containers composite their children in layer order and
//! track the rects that changed, so a frame only recomposes damaged
//! regions:
//! - Parent-relative geometry with optional clip windows
//! - Anchor-based origins, in pixels or percent, against any non-descendant
//! - Layers grouped into background, mainground and foreground levels
//! - Hover, link (press-and-drag) and keyboard focus routing
//! - Sleep and wake without losing a node's place
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lamina_core::{ISize, Location};
//! use lamina_scene::{Color, ContainerStyle, Coord, NodeBuilder, OriginSpec, Scene, Surface};
//!
//! let mut scene = Scene::new(ISize::new(320, 240));
//! let panel = scene
//!     .create(
//!         NodeBuilder::container(scene.root(), ISize::new(200, 100), ContainerStyle::new(Color::GRAY))
//!             .origin(OriginSpec::at(Coord::Percent(50), Coord::Percent(50)).location(Location::Center)),
//!     )
//!     .unwrap();
//! scene
//!     .create(NodeBuilder::new(panel, Surface::filled(ISize::new(20, 20), Color::RED)))
//!     .unwrap();
//!
//! let damaged = scene.render_frame().unwrap();
//! assert!(!damaged.is_empty());
//! ```

pub mod config;
pub mod container;
pub mod dirty;
pub mod error;
mod geometry;
pub mod layer;
mod lifecycle;
pub mod node;
pub mod origin;
mod router;
pub mod scene;
pub mod shared;
pub mod signal;
pub mod surface;
pub mod widget;

pub use config::SceneConfig;
pub use container::{Border, ContainerStyle};
pub use dirty::{DirtyState, LockFlags};
pub use error::{InvariantViolation, NotPermitted, SceneError, SceneResult, SurfaceError};
pub use layer::{Axis, Layer, LayerFilter, LayerId, LayerSpec, LayersManager, Level, SortKey};
pub use node::{NodeBuilder, NodeId, NodeView, Placement, Visibility, Window};
pub use origin::{Coord, Origin, OriginSpec, OriginUpdate, SizeSpec};
pub use scene::Scene;
pub use shared::{Compositor, CompositorHandle, DisplaySink, SceneLock, SharedScene};
pub use signal::{Signal, SignalEvent, SignalQueue};
pub use surface::{Color, Surface, SurfaceView};
pub use widget::{
    Focusable, Hoverable, Inert, KeyResponse, Linkable, Paintable, SceneLifecycle, Widget,
};

pub use lamina_input as input;
