//! Headless demo: a compositor thread presenting a scene while the main
//! thread drives input and animation.
//!
//! Run with `cargo run -p lamina-scene --example damage_demo`. Set
//! `RUST_LOG=lamina_scene=trace` to see every signal.

use std::any::Any;
use std::time::Duration;

use glam::IVec2;
use lamina_core::config::{Config, ProfilingMode};
use lamina_core::{IRect, ISize, Location};
use lamina_scene::input::{MouseButton, PointerEvent};
use lamina_scene::{
    Color, Compositor, ContainerStyle, Coord, DisplaySink, Hoverable, LayerSpec, Level, Linkable,
    NodeBuilder, OriginSpec, Scene, SceneConfig, SharedScene, SignalEvent, Surface, Widget,
};

/// Logs every presented frame instead of drawing it.
#[derive(Default)]
struct LogSink {
    frames: u32,
    pixels: u64,
    signals: usize,
}

impl DisplaySink for LogSink {
    fn present(&mut self, _surface: &Surface, damaged: &[IRect]) {
        self.frames += 1;
        self.pixels += damaged.iter().map(|r| r.size().area() as u64).sum::<u64>();
        tracing::info!(frame = self.frames, rects = ?damaged, "presented");
    }

    fn signals(&mut self, events: Vec<SignalEvent>) {
        self.signals += events.len();
        for event in events {
            tracing::trace!(node = %event.node, signal = ?event.signal, "delivered");
        }
    }
}

/// A handle the user can drag around.
struct Handle {
    hovered: bool,
    dragged: IVec2,
}

impl Widget for Handle {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_hoverable(&mut self) -> Option<&mut dyn Hoverable> {
        Some(self)
    }

    fn as_linkable(&mut self) -> Option<&mut dyn Linkable> {
        Some(self)
    }
}

impl Hoverable for Handle {
    fn on_hover(&mut self) {
        self.hovered = true;
    }

    fn on_unhover(&mut self) {
        self.hovered = false;
    }
}

impl Linkable for Handle {
    fn on_link_motion(&mut self, rel: IVec2) {
        self.dragged += rel;
    }
}

fn main() {
    Config::default()
        .with_profiling(ProfilingMode::On)
        .apply();

    let mut scene = Scene::with_config(
        ISize::new(640, 480),
        SceneConfig::default().with_frame_rate(30),
    );
    let root = scene.root();
    let overlay = scene
        .add_layer(root, LayerSpec::new("overlay").level(Level::Foreground))
        .expect("fresh layer name");
    let window = scene
        .create(
            NodeBuilder::container(
                root,
                ISize::new(300, 200),
                ContainerStyle::new(Color::GRAY).with_border(Color::BLACK, 2),
            )
            .origin(
                OriginSpec::at(Coord::Percent(50), Coord::Percent(50)).location(Location::Center),
            ),
        )
        .expect("window");
    let handle = scene
        .create(
            NodeBuilder::new(window, Surface::filled(ISize::new(40, 20), Color::BLUE))
                .origin(OriginSpec::at(Coord::Px(10), Coord::Px(10)))
                .widget(Handle {
                    hovered: false,
                    dragged: IVec2::ZERO,
                }),
        )
        .expect("handle");
    let badge = scene
        .create(
            NodeBuilder::new(root, Surface::filled(ISize::new(12, 12), Color::RED))
                .origin(
                    OriginSpec::at(Coord::Px(4), Coord::Px(0))
                        .reference(handle)
                        .reference_location(Location::TopRight),
                )
                .layer(overlay),
        )
        .expect("badge");
    scene.open().expect("open");

    let shared = SharedScene::new(scene);
    let compositor = Compositor::new(shared.clone(), LogSink::default())
        .spawn()
        .expect("compositor thread");

    // Drag the handle across the window; the badge follows it.
    let start = shared.read(|scene| {
        scene
            .node(handle)
            .map(|n| n.abs_rect().point_at(Location::Center))
    });
    let Ok(start) = start else {
        return;
    };
    let mut pos = IVec2::new(start.x, start.y);
    shared.mutate(|scene| {
        scene.handle_event(PointerEvent::Move { pos });
        scene.handle_event(PointerEvent::ButtonDown {
            button: MouseButton::Left,
            pos,
        });
    });
    for _ in 0..20 {
        pos += IVec2::new(5, 2);
        shared.mutate(|scene| {
            scene.handle_event(PointerEvent::Move { pos });
            let dragged = scene
                .widget_mut::<Handle>(handle)
                .ok()
                .flatten()
                .map(|h| std::mem::take(&mut h.dragged));
            if let Some(delta) = dragged
                && let Err(err) = scene.move_by(handle, delta.x, delta.y)
            {
                tracing::warn!(error = %err, "drag refused");
            }
        });
        std::thread::sleep(Duration::from_millis(40));
    }
    shared.mutate(|scene| {
        scene.handle_event(PointerEvent::ButtonUp {
            button: MouseButton::Left,
            pos,
        });
        let badge_rect = scene.node(badge).map(|n| n.abs_rect());
        let hovered = scene
            .widget_as::<Handle>(handle)
            .ok()
            .flatten()
            .is_some_and(|h| h.hovered);
        tracing::info!(?badge_rect, hovered, "drag finished");
    });

    std::thread::sleep(Duration::from_millis(100));
    shared.mutate(|scene| scene.close()).expect("close");
    if let Some(sink) = compositor.stop() {
        tracing::info!(
            frames = sink.frames,
            pixels = sink.pixels,
            signals = sink.signals,
            "compositor done"
        );
    }
}
