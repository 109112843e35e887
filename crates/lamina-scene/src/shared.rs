//! Sharing a scene between the input thread and a compositor thread.
//!
//! A [`SharedScene`] wraps the scene in a re-entrant lock so a caller can
//! hold it across several operations while the operations themselves lock
//! again. The freeze flag is mirrored beside the lock, so the compositor
//! can observe it without waiting for the scene.

use std::cell::RefCell;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use lamina_core::IRect;
use lamina_core::profiling::{self, profile_scope};
use parking_lot::{Condvar, Mutex, ReentrantMutex, ReentrantMutexGuard};

use crate::error::SceneResult;
use crate::scene::Scene;
use crate::signal::SignalEvent;
use crate::surface::Surface;

#[derive(Debug, Default)]
struct FreezeGate {
    frozen: Mutex<bool>,
    thawed: Condvar,
}

/// Cloneable handle to a scene shared across threads.
///
/// The scene lock is re-entrant but the scene itself sits in a `RefCell`:
/// calling [`mutate`](Self::mutate) or [`read`](Self::read) from inside
/// another `mutate` or `read` closure on the same thread panics. Pass the
/// `&mut Scene` down instead.
///
/// The freeze flag is mirrored into a gate every time the scene lock is
/// released, so [`is_frozen`](Self::is_frozen) and
/// [`wait_until_thawed`](Self::wait_until_thawed) never wait for the scene.
/// Locks are always taken scene first, gate second.
#[derive(Clone)]
pub struct SharedScene {
    inner: Arc<ReentrantMutex<RefCell<Scene>>>,
    gate: Arc<FreezeGate>,
}

impl SharedScene {
    pub fn new(scene: Scene) -> Self {
        let frozen = scene.is_frozen();
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(scene))),
            gate: Arc::new(FreezeGate {
                frozen: Mutex::new(frozen),
                thawed: Condvar::new(),
            }),
        }
    }

    /// Runs `f` with exclusive access to the scene.
    ///
    /// # Panics
    ///
    /// Panics if called from inside another `mutate` or `read` closure on
    /// the same thread.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        let guard = self.inner.lock();
        let (result, frozen) = {
            let mut scene = guard.borrow_mut();
            let result = f(&mut scene);
            (result, scene.is_frozen())
        };
        self.publish_frozen(frozen);
        result
    }

    /// Runs `f` with shared access to the scene.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a `mutate` closure on the same thread.
    pub fn read<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        let guard = self.inner.lock();
        let scene = guard.borrow();
        f(&scene)
    }

    /// Holds the scene lock until the guard drops. Other threads block in
    /// `mutate` and `read`; this thread may still call them while no
    /// borrow taken through the guard is alive.
    pub fn lock(&self) -> SceneLock<'_> {
        SceneLock {
            shared: self,
            guard: self.inner.lock(),
        }
    }

    pub fn freeze(&self) {
        self.mutate(Scene::freeze);
    }

    pub fn thaw(&self) {
        self.mutate(Scene::thaw);
    }

    pub fn is_frozen(&self) -> bool {
        *self.gate.frozen.lock()
    }

    /// Blocks until the scene is thawed or `timeout` elapses. Returns
    /// whether the scene is thawed. Calling it while this thread holds the
    /// scene lock waits out the whole timeout, since no other thread can
    /// thaw meanwhile.
    pub fn wait_until_thawed(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut frozen = self.gate.frozen.lock();
        while *frozen {
            if self
                .gate
                .thawed
                .wait_until(&mut frozen, deadline)
                .timed_out()
            {
                return !*frozen;
            }
        }
        true
    }

    /// Called with the scene lock held.
    fn publish_frozen(&self, frozen: bool) {
        let mut gate = self.gate.frozen.lock();
        if *gate == frozen {
            return;
        }
        *gate = frozen;
        if !frozen {
            self.gate.thawed.notify_all();
        }
    }
}

impl std::fmt::Debug for SharedScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedScene")
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// Scene lock held through [`SharedScene::lock`].
///
/// Dropping it publishes the scene's freeze flag like the end of a
/// `mutate` call does.
pub struct SceneLock<'a> {
    shared: &'a SharedScene,
    guard: ReentrantMutexGuard<'a, RefCell<Scene>>,
}

impl Deref for SceneLock<'_> {
    type Target = RefCell<Scene>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl Drop for SceneLock<'_> {
    fn drop(&mut self) {
        // An enclosing `mutate` on this thread still holds the borrow and
        // publishes on its own exit.
        let frozen = match self.guard.try_borrow() {
            Ok(scene) => scene.is_frozen(),
            Err(_) => return,
        };
        self.shared.publish_frozen(frozen);
    }
}

/// Receives finished frames.
pub trait DisplaySink: Send {
    /// `damaged` lists the display rects that changed since the previous
    /// call; the surface is the whole display.
    fn present(&mut self, surface: &Surface, damaged: &[IRect]);

    /// Receives the signals queued since the previous tick, oldest first.
    /// The default discards them.
    fn signals(&mut self, _events: Vec<SignalEvent>) {}
}

/// Periodically paints a shared scene and hands the result to a sink.
pub struct Compositor<S: DisplaySink> {
    scene: SharedScene,
    sink: S,
    interval: Duration,
    frames: u64,
}

impl<S: DisplaySink> Compositor<S> {
    pub fn new(scene: SharedScene, sink: S) -> Self {
        let interval = scene.read(|scene| scene.config().frame_interval());
        Self {
            scene,
            sink,
            interval,
            frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Paints one frame and presents it if anything changed, then hands the
    /// queued signals to the sink. Frozen scenes are skipped.
    pub fn tick(&mut self) -> SceneResult<bool> {
        profiling::new_frame();
        profile_scope!("compositor_tick");
        if self.scene.is_frozen() {
            return Ok(false);
        }
        let sink = &mut self.sink;
        let presented = self.scene.mutate(|scene| -> SceneResult<bool> {
            let damaged = scene.render_frame()?;
            let presented = !damaged.is_empty();
            if presented {
                sink.present(scene.display_surface(), &damaged);
            }
            let events = scene.drain_signals();
            if !events.is_empty() {
                sink.signals(events);
            }
            Ok(presented)
        })?;
        if presented {
            self.frames += 1;
        }
        Ok(presented)
    }

    /// Runs the compositor on its own thread until the handle is stopped.
    pub fn spawn(self) -> std::io::Result<CompositorHandle<S>>
    where
        S: 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = std::thread::Builder::new()
            .name("lamina-compositor".to_owned())
            .spawn(move || {
                let mut compositor = self;
                while !flag.load(Ordering::Acquire) {
                    let started = Instant::now();
                    if let Err(err) = compositor.tick() {
                        tracing::error!(error = %err, "frame failed");
                    }
                    if let Some(rest) = compositor.interval.checked_sub(started.elapsed()) {
                        std::thread::sleep(rest);
                    }
                }
                compositor.sink
            })?;
        tracing::debug!("compositor started");
        Ok(CompositorHandle { stop, thread })
    }
}

pub struct CompositorHandle<S> {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<S>,
}

impl<S> CompositorHandle<S> {
    /// Stops the compositor thread and returns its sink. `None` if the
    /// thread panicked.
    pub fn stop(self) -> Option<S> {
        self.stop.store(true, Ordering::Release);
        let sink = self.thread.join().ok();
        tracing::debug!("compositor stopped");
        sink
    }
}
