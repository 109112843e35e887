//! Input routing: hit testing, hover, link, focus and keyboard dispatch.
//!
//! The router is a set of `Scene` methods over [`InputState`]. Hover,
//! link and focus are plain handles; every read goes through the arena so
//! a killed node simply stops being hovered, linked or focused.

use std::time::Instant;

use glam::IVec2;
use lamina_core::IPos;
use lamina_core::profiling::profile_function;
use lamina_input::{
    ClickHistory, ClickRecord, HandleStatus, InputEvent, KeyCode, KeyEvent, KeyboardState,
    MouseButton, PointerEvent, PointerState,
};

use crate::config::SceneConfig;
use crate::error::{NotPermitted, SceneResult};
use crate::node::{NodeData, NodeId};
use crate::scene::Scene;
use crate::signal::Signal;
use crate::widget::KeyResponse;

#[derive(Debug)]
pub(crate) struct InputState {
    pub(crate) pointer: PointerState,
    pub(crate) keyboard: KeyboardState,
    pub(crate) clicks: ClickHistory,
    pub(crate) hovered: Option<NodeId>,
    pub(crate) linked: Option<NodeId>,
    pub(crate) focused: Option<NodeId>,
}

impl InputState {
    pub(crate) fn new(config: &SceneConfig) -> Self {
        Self {
            pointer: PointerState::new(),
            keyboard: KeyboardState::new(),
            clicks: ClickHistory::new(config.double_click, config.triple_click),
            hovered: None,
            linked: None,
            focused: None,
        }
    }
}

fn hoverable(node: &mut NodeData) -> bool {
    node.widget.as_hoverable().is_some()
}

fn focusable(node: &mut NodeData) -> bool {
    node.enabled && node.widget.as_focusable().is_some()
}

fn linkable(node: &mut NodeData) -> bool {
    node.enabled && node.widget.as_linkable().is_some()
}

impl Scene {
    /// Routes one event, timestamped now.
    pub fn handle_event(&mut self, event: impl Into<InputEvent>) -> HandleStatus {
        self.handle_event_at(event, Instant::now())
    }

    /// Routes one event. `now` timestamps button presses for multi-click
    /// detection. Frozen scenes ignore every event.
    pub fn handle_event_at(&mut self, event: impl Into<InputEvent>, now: Instant) -> HandleStatus {
        profile_function!();
        if self.frozen {
            return HandleStatus::ignored();
        }
        match event.into() {
            InputEvent::Pointer(event) => self.handle_pointer(event, now),
            InputEvent::Key(event) => self.handle_key(event),
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> HandleStatus {
        let Some(rel) = self.input.pointer.on_event(&event) else {
            return HandleStatus::ignored();
        };
        match event {
            PointerEvent::Move { .. } => {
                if let Some(linked) = self.linked()
                    && self.input.pointer.is_pressed(MouseButton::PRIMARY)
                {
                    if rel != IVec2::ZERO {
                        self.link_motion(linked, rel);
                    }
                    return HandleStatus::consumed();
                }
                self.update_hover();
                HandleStatus::handled()
            }
            PointerEvent::ButtonDown { button, pos } => {
                self.input.clicks.record(ClickRecord {
                    at: now,
                    button,
                    pos,
                });
                self.update_hover();
                if !button.is_primary() {
                    return HandleStatus::handled();
                }
                let pointed = self.pointed(pos.into());
                let focus = pointed.and_then(|id| self.find_ancestor(id, focusable));
                self.set_focus_internal(focus);
                if let Some(target) = pointed.and_then(|id| self.find_ancestor(id, linkable)) {
                    self.link(target);
                    return HandleStatus::consumed();
                }
                HandleStatus::handled()
            }
            PointerEvent::ButtonUp { button, .. } => {
                if button.is_primary() {
                    self.unlink();
                }
                self.update_hover();
                HandleStatus::handled()
            }
            PointerEvent::Scroll { direction } => {
                let status = match self.hovered() {
                    Some(id) => {
                        self.emit(id, Signal::Scroll { direction });
                        HandleStatus::consumed()
                    }
                    None => HandleStatus::ignored(),
                };
                self.update_hover();
                status
            }
        }
    }

    fn handle_key(&mut self, event: KeyEvent) -> HandleStatus {
        if !self.input.keyboard.on_event(&event) {
            return HandleStatus::ignored();
        }
        let focused = self.focused();
        match event {
            KeyEvent::KeyDown { code, modifiers } => {
                let Some(id) = focused else {
                    return HandleStatus::ignored();
                };
                self.emit(id, Signal::KeyDown { code, modifiers });
                let response = self
                    .nodes
                    .get_mut(id.slot())
                    .and_then(|node| node.widget.as_focusable())
                    .map_or(KeyResponse::Ignored, |f| f.on_key_down(code, modifiers));
                if response == KeyResponse::Handled || !self.config.focus_keys {
                    return HandleStatus::consumed();
                }
                let step = match code {
                    KeyCode::Tab if modifiers.shift() => -1,
                    KeyCode::Tab | KeyCode::ArrowRight | KeyCode::ArrowDown => 1,
                    KeyCode::ArrowLeft | KeyCode::ArrowUp => -1,
                    _ => return HandleStatus::handled(),
                };
                if let Err(err) = self.cycle_focus(step) {
                    tracing::warn!(error = %err, "focus navigation failed");
                }
                HandleStatus::consumed()
            }
            KeyEvent::KeyUp { code } => match focused {
                Some(id) => {
                    self.key_up(id, code);
                    HandleStatus::handled()
                }
                None => HandleStatus::ignored(),
            },
        }
    }

    fn key_up(&mut self, id: NodeId, code: KeyCode) {
        self.emit(id, Signal::KeyUp { code });
        if let Some(focusable) = self
            .nodes
            .get_mut(id.slot())
            .and_then(|node| node.widget.as_focusable())
        {
            focusable.on_key_up(code);
        }
    }

    /// The front-most visible, touchable node under `pos` (scene
    /// coordinates), descending into containers.
    pub fn pointed(&self, pos: IPos) -> Option<NodeId> {
        let root = self.nodes.get(self.root.slot())?;
        if !root.abs_hitbox.contains_point(pos) {
            return None;
        }
        Some(self.pointed_in(self.root, pos).unwrap_or(self.root))
    }

    fn pointed_in(&self, container: NodeId, pos: IPos) -> Option<NodeId> {
        let state = self.nodes.get(container.slot())?.container()?;
        for layer in state.layers.touchable_front_to_back() {
            for id in layer.nodes().iter().rev() {
                let Some(node) = self.nodes.get(id.slot()) else {
                    continue;
                };
                if !node.is_visible() || !node.touchable || !node.abs_hitbox.contains_point(pos) {
                    continue;
                }
                if node.container.is_some() {
                    return Some(self.pointed_in(*id, pos).unwrap_or(*id));
                }
                return Some(*id);
            }
        }
        None
    }

    /// Walks from `start` up through its ancestors and returns the first
    /// node matching `pred`.
    fn find_ancestor(
        &mut self,
        start: NodeId,
        pred: impl Fn(&mut NodeData) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.nodes.get_mut(id.slot())?;
            if pred(node) {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }

    /// Re-resolves the hovered node from the last pointer position.
    /// Suspended while a node is linked.
    pub fn update_hover(&mut self) {
        if self.frozen || self.input.linked.is_some() {
            return;
        }
        let Some(pos) = self.input.pointer.position() else {
            return;
        };
        let target = self
            .pointed(pos.into())
            .and_then(|id| self.find_ancestor(id, hoverable));
        self.set_hovered(target);
    }

    pub(crate) fn set_hovered(&mut self, target: Option<NodeId>) {
        let old = self.hovered();
        self.input.hovered = target;
        if old == target {
            return;
        }
        if let Some(old) = old {
            if let Some(hoverable) = self
                .nodes
                .get_mut(old.slot())
                .and_then(|node| node.widget.as_hoverable())
            {
                hoverable.on_unhover();
            }
            self.emit(old, Signal::Unhover);
        }
        if let Some(new) = target {
            if let Some(hoverable) = self
                .nodes
                .get_mut(new.slot())
                .and_then(|node| node.widget.as_hoverable())
            {
                hoverable.on_hover();
            }
            self.emit(new, Signal::Hover);
        }
    }

    fn link(&mut self, target: NodeId) {
        self.unlink();
        self.input.linked = Some(target);
        if let Some(linkable) = self
            .nodes
            .get_mut(target.slot())
            .and_then(|node| node.widget.as_linkable())
        {
            linkable.on_link();
        }
        self.emit(target, Signal::Link);
        tracing::trace!(node = %target, "linked");
    }

    fn link_motion(&mut self, target: NodeId, rel: IVec2) {
        if let Some(linkable) = self
            .nodes
            .get_mut(target.slot())
            .and_then(|node| node.widget.as_linkable())
        {
            linkable.on_link_motion(rel);
        }
        self.emit(target, Signal::LinkMotion { rel });
    }

    /// Releases the linked node, if any. Does not re-resolve hover.
    pub fn unlink(&mut self) {
        let Some(target) = self.input.linked.take() else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(target.slot()) {
            if let Some(linkable) = node.widget.as_linkable() {
                linkable.on_unlink();
            }
            self.emit(target, Signal::Unlink);
        }
    }

    /// Moves focus to `target`, or clears it.
    ///
    /// The target must be enabled, shown and focusable.
    pub fn focus(&mut self, target: Option<NodeId>) -> SceneResult<()> {
        if let Some(id) = target {
            let shown = self.is_shown(id);
            if !shown || !focusable(self.get_mut(id)?) {
                return Err(NotPermitted::NotFocusable(id).into());
            }
        }
        self.set_focus_internal(target);
        Ok(())
    }

    pub(crate) fn set_focus_internal(&mut self, target: Option<NodeId>) {
        let old = self.focused();
        self.input.focused = target;
        if old == target {
            return;
        }
        if let Some(old) = old {
            if let Some(focusable) = self
                .nodes
                .get_mut(old.slot())
                .and_then(|node| node.widget.as_focusable())
            {
                focusable.on_defocus();
            }
            self.emit(old, Signal::Defocus);
        }
        if let Some(new) = target {
            if let Some(focusable) = self
                .nodes
                .get_mut(new.slot())
                .and_then(|node| node.widget.as_focusable())
            {
                focusable.on_focus();
            }
            self.emit(new, Signal::Focus);
        }
        tracing::trace!(from = ?old, to = ?target, "focus changed");
    }

    /// Focuses the next focusable sibling of the focused node, in reading
    /// order (top, then left), wrapping around.
    pub fn focus_next(&mut self) -> SceneResult<()> {
        self.cycle_focus(1)
    }

    pub fn focus_previous(&mut self) -> SceneResult<()> {
        self.cycle_focus(-1)
    }

    fn cycle_focus(&mut self, step: isize) -> SceneResult<()> {
        let Some(current) = self.focused() else {
            return Ok(());
        };
        let Some(parent) = self.get(current)?.parent else {
            return Ok(());
        };
        let siblings: Vec<NodeId> = self.container(parent)?.children.iter().copied().collect();
        let mut chain = Vec::with_capacity(siblings.len());
        for id in siblings {
            let shown = self.is_shown(id);
            let node = self.get_mut(id)?;
            if shown && focusable(node) {
                chain.push((node.rect.top(), node.rect.left(), id));
            }
        }
        if chain.len() < 2 {
            return Ok(());
        }
        chain.sort_by_key(|(top, left, _)| (*top, *left));
        let Some(index) = chain.iter().position(|(_, _, id)| *id == current) else {
            return Ok(());
        };
        let next = (index as isize + step).rem_euclid(chain.len() as isize) as usize;
        self.set_focus_internal(Some(chain[next].2));
        Ok(())
    }

    /// Releases every pressed button and key and the link. Key releases
    /// are delivered to the focused node.
    pub fn release_all(&mut self) {
        self.input.pointer.release_all();
        let released = self.input.keyboard.release_all();
        if let Some(id) = self.focused() {
            for code in released {
                self.key_up(id, code);
            }
        }
        self.unlink();
    }

    /// Drops hover, link and focus held by `id` or its descendants.
    pub(crate) fn release_interactions(&mut self, id: NodeId) {
        if self.linked().is_some_and(|n| self.is_ancestor(id, n)) {
            self.unlink();
        }
        if self.focused().is_some_and(|n| self.is_ancestor(id, n)) {
            self.set_focus_internal(None);
        }
        if self.hovered().is_some_and(|n| self.is_ancestor(id, n)) {
            self.set_hovered(None);
        }
    }

    /// Stops input processing and painting until [`Scene::thaw`].
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.release_all();
        self.set_hovered(None);
        self.frozen = true;
        tracing::debug!("scene frozen");
    }

    pub fn thaw(&mut self) {
        if !self.frozen {
            return;
        }
        self.frozen = false;
        tracing::debug!("scene thawed");
        self.update_hover();
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.input.hovered.filter(|id| self.is_alive(*id))
    }

    pub fn linked(&self) -> Option<NodeId> {
        self.input.linked.filter(|id| self.is_alive(*id))
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.input.focused.filter(|id| self.is_alive(*id))
    }

    pub fn pointer_position(&self) -> Option<IPos> {
        self.input.pointer.position().map(IPos::from)
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.input.keyboard
    }

    pub fn clicks(&self) -> &ClickHistory {
        &self.input.clicks
    }

    pub fn has_double_clicked(&self) -> bool {
        self.input.clicks.has_double_clicked()
    }

    pub fn has_triple_clicked(&self) -> bool {
        self.input.clicks.has_triple_clicked()
    }
}
