//! Motion, resizing, clip windows and origin maintenance.

use lamina_core::profiling::profile_function;
use lamina_core::{Edge, IPos, IRect, ISize, Location};

use crate::dirty::LockFlags;
use crate::error::{InvariantViolation, NotPermitted, SceneResult};
use crate::node::{NodeId, Window};
use crate::origin::{self, Coord, OriginUpdate};
use crate::scene::Scene;
use crate::signal::Signal;
use crate::surface::Surface;

/// What happened to a reference, as seen by its followers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Motion,
    Resize,
}

impl Scene {
    fn parent_abs(&self, parent: Option<NodeId>) -> IPos {
        parent
            .and_then(|p| self.nodes.get(p.slot()))
            .map_or(IPos::ZERO, |p| p.abs_rect.topleft())
    }

    pub(crate) fn refresh_abs(&mut self, id: NodeId) -> SceneResult<()> {
        let origin = self.parent_abs(self.get(id)?.parent);
        let node = self.get_mut(id)?;
        node.abs_rect = node.rect.offset(origin);
        node.abs_hitbox = node.hitbox.offset(origin);
        Ok(())
    }

    pub(crate) fn refresh_subtree_abs(&mut self, id: NodeId) -> SceneResult<()> {
        self.refresh_abs(id)?;
        let children: Vec<NodeId> = match self.get(id)?.container() {
            Some(state) => state.children.iter().copied().collect(),
            None => return Ok(()),
        };
        for child in children {
            self.refresh_subtree_abs(child)?;
        }
        Ok(())
    }

    /// The node an origin resolves against: its explicit reference while
    /// that is alive, the (possibly sleeping) parent otherwise.
    pub(crate) fn reference_of(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        let node = self.get(id)?;
        Ok(node
            .origin
            .reference
            .filter(|r| self.is_alive(*r))
            .or(node.owner()))
    }

    fn resolve_with(&self, id: NodeId, asked: [Coord; 2]) -> SceneResult<Option<IPos>> {
        let node = self.get(id)?;
        let Some(parent) = node.parent else {
            return Ok(None);
        };
        let reference = node
            .origin
            .reference
            .filter(|r| self.is_alive(*r))
            .unwrap_or(parent);
        let reference = self.get(reference)?;
        let frame = if node.origin.from_hitbox {
            reference.abs_hitbox
        } else {
            reference.abs_rect
        };
        Ok(Some(origin::resolve(
            asked,
            frame,
            node.origin.reference_location,
            self.parent_abs(Some(parent)),
        )))
    }

    /// Where the origin wants the node's anchor point, in parent space.
    /// `None` for the root and sleeping nodes.
    pub fn origin_target(&self, id: NodeId) -> SceneResult<Option<IPos>> {
        let asked = self.get(id)?.origin.asked;
        self.resolve_with(id, asked)
    }

    /// Moves the node so its anchor sits at the origin target.
    pub(crate) fn follow_origin(&mut self, id: NodeId) -> SceneResult<()> {
        let Some(target) = self.origin_target(id)? else {
            return Ok(());
        };
        let node = self.get(id)?;
        let current = node.rect.point_at(node.origin.location);
        if target != current {
            self.apply_move(id, target.x - current.x, target.y - current.y)?;
        }
        Ok(())
    }

    /// Rewrites the asked position as a pixel offset matching where the
    /// node actually is, so later re-resolution does not pull it back.
    fn reset_asked_pos(&mut self, id: NodeId) -> SceneResult<()> {
        let Some(target) = self.origin_target(id)? else {
            return Ok(());
        };
        let node = self.get(id)?;
        let current = node.rect.point_at(node.origin.location);
        if target == current {
            return Ok(());
        }
        let Some(base) = self.resolve_with(id, [Coord::Px(0), Coord::Px(0)])? else {
            return Ok(());
        };
        let asked = [Coord::Px(current.x - base.x), Coord::Px(current.y - base.y)];
        tracing::trace!(node = %id, ?asked, "asked position reset");
        self.get_mut(id)?.origin.asked = asked;
        Ok(())
    }

    pub(crate) fn subscribe_origin(&mut self, id: NodeId) -> SceneResult<()> {
        if let Some(reference) = self.reference_of(id)? {
            let followers = &mut self.get_mut(reference)?.followers;
            if !followers.contains(&id) {
                followers.push(id);
            }
        }
        Ok(())
    }

    pub(crate) fn unsubscribe_origin(&mut self, id: NodeId) -> SceneResult<()> {
        if let Some(reference) = self.reference_of(id)?
            && let Some(node) = self.nodes.get_mut(reference.slot())
        {
            node.followers.retain(|f| *f != id);
        }
        Ok(())
    }

    fn notify_followers(&mut self, id: NodeId, change: Change) -> SceneResult<()> {
        let followers = self.get(id)?.followers.clone();
        let mut alive = Vec::with_capacity(followers.len());
        for follower in followers {
            let Some(node) = self.nodes.get(follower.slot()) else {
                continue;
            };
            alive.push(follower);
            // children move along with their parent already
            if change == Change::Motion && node.parent == Some(id) {
                continue;
            }
            if node.is_awake() {
                self.follow_origin(follower)?;
            }
        }
        self.get_mut(id)?.followers = alive;
        Ok(())
    }

    /// Children referencing a node other than their moving parent must be
    /// re-resolved, since their reference stayed put.
    fn realign_children(&mut self, id: NodeId) -> SceneResult<()> {
        let children: Vec<NodeId> = match self.get(id)?.container() {
            Some(state) => state.children.iter().copied().collect(),
            None => return Ok(()),
        };
        for child in children {
            let foreign = self
                .get(child)?
                .origin
                .reference
                .is_some_and(|r| r != id && self.is_alive(r));
            if foreign {
                self.follow_origin(child)?;
            }
        }
        Ok(())
    }

    /// Translates a node, bypassing locks.
    pub(crate) fn apply_move(&mut self, id: NodeId, dx: i32, dy: i32) -> SceneResult<()> {
        profile_function!();
        let node = self.get_mut(id)?;
        let old_hitbox = node.hitbox;
        node.rect = node.rect.translate(dx, dy);
        if let Some(window) = node.window.as_mut().filter(|w| w.follow_movements) {
            window.rect = window.rect.translate(dx, dy);
        }
        node.hitbox = node.compute_hitbox();
        let (new_hitbox, visible) = (node.hitbox, node.is_visible());

        self.refresh_subtree_abs(id)?;
        self.realign_children(id)?;
        self.emit(id, Signal::Motion { dx, dy });
        self.notify_followers(id, Change::Motion)?;
        self.reset_asked_pos(id)?;
        if visible {
            self.send_display_request(id, old_hitbox.union(&new_hitbox))?;
        }
        Ok(())
    }

    /// Forwards a parent-space rect to the parent's damage. The root's
    /// rect doubles as display space.
    pub(crate) fn send_display_request(&mut self, id: NodeId, rect: IRect) -> SceneResult<()> {
        match self.get(id)?.parent {
            Some(parent) => self.request_repaint(parent, rect),
            None if id == self.root => self.request_repaint(id, rect),
            None => Ok(()),
        }
    }

    /// Moves a node by `(dx, dy)`. A zero move is a no-op.
    pub fn move_by(&mut self, id: NodeId, dx: i32, dy: i32) -> SceneResult<()> {
        let node = self.get(id)?;
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        self.ensure_not_root(id, "moved")?;
        if node.locks.origin() {
            return Err(NotPermitted::OriginLocked(id).into());
        }
        if !node.is_awake() {
            return Err(NotPermitted::Asleep(id).into());
        }
        self.apply_move(id, dx, dy)?;
        self.update_hover();
        Ok(())
    }

    /// Moves a node so its `location` anchor lands on `pos`.
    pub fn move_to(&mut self, id: NodeId, location: Location, pos: IPos) -> SceneResult<()> {
        let current = self.get(id)?.rect.point_at(location);
        self.move_by(id, pos.x - current.x, pos.y - current.y)
    }

    /// Moves a node so one of its edges (or center lines) lands on `value`.
    pub fn move_edge(&mut self, id: NodeId, edge: Edge, value: i32) -> SceneResult<()> {
        let current = self.get(id)?.rect.edge(edge);
        match edge {
            Edge::Left | Edge::Right | Edge::CenterX => self.move_by(id, value - current, 0),
            Edge::Top | Edge::Bottom | Edge::CenterY => self.move_by(id, 0, value - current),
        }
    }

    /// Replaces the surface of a node, resizing it if the sizes differ.
    ///
    /// Fails if a locked dimension would change.
    pub fn set_surface(&mut self, id: NodeId, surface: Surface) -> SceneResult<()> {
        self.check_size_locks(id, surface.size())?;
        self.apply_surface(id, surface)?;
        self.update_hover();
        Ok(())
    }

    fn check_size_locks(&self, id: NodeId, size: ISize) -> SceneResult<()> {
        let node = self.get(id)?;
        let current = node.rect.size();
        if node.locks.width() && size.width != current.width {
            return Err(NotPermitted::WidthLocked(id).into());
        }
        if node.locks.height() && size.height != current.height {
            return Err(NotPermitted::HeightLocked(id).into());
        }
        Ok(())
    }

    pub(crate) fn apply_surface(&mut self, id: NodeId, surface: Surface) -> SceneResult<()> {
        profile_function!();
        let node = self.get_mut(id)?;
        let size = surface.size();
        node.surface = surface;
        if size == node.rect.size() {
            let full = node.auto_hitbox();
            if let Some(state) = node.container_mut() {
                state.pending = (!full.is_empty()).then_some(full);
            }
            if node.is_visible() {
                let hitbox = node.hitbox;
                self.send_display_request(id, hitbox)?;
            }
            return Ok(());
        }

        let (old_size, old_hitbox) = (node.rect.size(), node.hitbox);
        node.rect = node.rect.with_size(size);
        node.hitbox = node.compute_hitbox();
        let full = node.auto_hitbox();
        if let Some(state) = node.container_mut() {
            state.pending = (!full.is_empty()).then_some(full);
        }
        self.refresh_abs(id)?;
        self.follow_origin(id)?;
        self.emit(id, Signal::Resize { old: old_size });
        self.notify_followers(id, Change::Resize)?;
        self.refit_children(id)?;

        let node = self.get(id)?;
        if node.is_visible() {
            let damaged = old_hitbox.union(&node.hitbox);
            self.send_display_request(id, damaged)?;
        }
        tracing::trace!(node = %id, from = ?old_size, to = ?size, "node resized");
        Ok(())
    }

    fn fresh_surface(&self, id: NodeId, size: ISize) -> SceneResult<(Surface, bool)> {
        let node = self.get(id)?;
        Ok(match node.container() {
            Some(state) => (Surface::filled(size, state.style.background), false),
            None => (node.surface.resized(size), true),
        })
    }

    /// Resizes a node. Containers get a fresh background, leaves keep the
    /// overlapping pixels and are scheduled for a repaint.
    pub fn resize(&mut self, id: NodeId, size: ISize) -> SceneResult<()> {
        self.check_size_locks(id, size)?;
        self.resize_unchecked(id, size)?;
        self.update_hover();
        Ok(())
    }

    pub(crate) fn resize_unchecked(&mut self, id: NodeId, size: ISize) -> SceneResult<()> {
        let (surface, leaf) = self.fresh_surface(id, size)?;
        self.apply_surface(id, surface)?;
        if leaf && self.get_mut(id)?.widget.as_paintable().is_some() {
            self.request_paint(id)?;
        }
        Ok(())
    }

    fn refit_children(&mut self, id: NodeId) -> SceneResult<()> {
        let children: Vec<NodeId> = match self.get(id)?.container() {
            Some(state) => state.children.iter().copied().collect(),
            None => return Ok(()),
        };
        for child in children {
            self.refit_size(child)?;
        }
        Ok(())
    }

    /// Re-applies a percentage size against the current parent size.
    /// Locked dimensions are kept.
    pub(crate) fn refit_size(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.get(id)?;
        let Some(spec) = node.asked_size.filter(|s| s.is_relative()) else {
            return Ok(());
        };
        let Some(parent) = node.parent else {
            return Ok(());
        };
        let (current, locks) = (node.rect.size(), node.locks);
        let target = spec.resolve(self.get(parent)?.rect.size());
        let size = ISize::new(
            if locks.width() { current.width } else { target.width },
            if locks.height() { current.height } else { target.height },
        );
        if size != current {
            self.resize_unchecked(id, size)?;
        }
        Ok(())
    }

    /// Sets or clears the clip window, in parent coordinates.
    pub fn set_window(
        &mut self,
        id: NodeId,
        window: Option<IRect>,
        follow_movements: bool,
    ) -> SceneResult<()> {
        self.ensure_not_root(id, "clipped")?;
        let node = self.get_mut(id)?;
        let old_hitbox = node.hitbox;
        node.window = window.map(|rect| Window {
            rect,
            follow_movements,
        });
        node.hitbox = node.compute_hitbox();
        let (hitbox, rect, visible) = (node.hitbox, node.rect, node.is_visible());
        let full = node.auto_hitbox();
        if let Some(state) = node.container_mut() {
            state.pending = (!full.is_empty()).then_some(full);
        }
        self.refresh_abs(id)?;

        if hitbox != old_hitbox {
            if hitbox.topleft() != old_hitbox.topleft() {
                self.emit(
                    id,
                    Signal::Motion {
                        dx: hitbox.x - old_hitbox.x,
                        dy: hitbox.y - old_hitbox.y,
                    },
                );
            }
            if hitbox.size() != old_hitbox.size() {
                self.emit(
                    id,
                    Signal::Resize {
                        old: old_hitbox.size(),
                    },
                );
            }
            self.notify_followers(id, Change::Resize)?;
        }
        if visible {
            self.send_display_request(id, old_hitbox.union(&rect))?;
        }
        self.update_hover();
        Ok(())
    }

    /// Reconfigures the origin of a node and moves it accordingly.
    ///
    /// `locked: Some(false)` unlocks before anything else is checked, so an
    /// update can both unlock and reposition.
    pub fn configure_origin(&mut self, id: NodeId, update: OriginUpdate) -> SceneResult<()> {
        self.ensure_not_root(id, "repositioned")?;
        if update.locked == Some(false) {
            self.get_mut(id)?.locks.remove(LockFlags::ORIGIN);
        }
        if self.get(id)?.locks.origin() {
            return Err(NotPermitted::OriginLocked(id).into());
        }
        if let Some(Some(reference)) = update.reference {
            self.validate_reference(id, reference)?;
        }
        self.unsubscribe_origin(id)?;
        self.get_mut(id)?.origin.apply(&update);
        self.subscribe_origin(id)?;
        self.follow_origin(id)?;
        if update.locked == Some(true) {
            self.get_mut(id)?.locks.insert(LockFlags::ORIGIN);
        }
        self.update_hover();
        Ok(())
    }

    /// A reference must be alive and must not be the node or one of its
    /// descendants.
    pub(crate) fn validate_reference(&self, id: NodeId, reference: NodeId) -> SceneResult<()> {
        if reference == id || !self.is_alive(reference) || self.is_ancestor(id, reference) {
            return Err(InvariantViolation::InvalidReference {
                node: id,
                reference,
            }
            .into());
        }
        Ok(())
    }

    pub fn set_lock(&mut self, id: NodeId, flags: LockFlags, locked: bool) -> SceneResult<()> {
        self.get_mut(id)?.locks.set(flags, locked);
        Ok(())
    }
}
