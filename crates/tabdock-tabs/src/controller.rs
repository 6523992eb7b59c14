//! Tab List Controller
//!
//! Owns the ordered tabs keyed by id and enforces the single-active
//! invariant. It also runs drag sessions and tracks the pending menu target.
//! Host commands (`create_tab`, `remove_tab`, `activate_tab`) are
//! authoritative and fail loudly on unknown or duplicate ids. User input only
//! produces requests, and input that names a tab the host already removed is
//! dropped.

use std::collections::HashMap;

use crate::drag::{Bounds, DragPayload, DragSession, Placement};
use crate::effect::{Effect, Fetch, HostRequest, TimerEffect, TimerToken, ViewChange};
use crate::error::TabError;
use crate::menu::{MenuAction, MenuItem};
use crate::state::DragPhase;
use crate::tab::{Icon, Tab, TabId};
use crate::Result;

#[derive(Debug, Default)]
pub struct TabListController {
    /// Tabs by id
    tabs: HashMap<TabId, Tab>,
    /// Visual order. Purely local, never reported to the host.
    tab_order: Vec<TabId>,
    /// Currently active tab
    active: Option<TabId>,
    /// Tab being dragged, if a drag session is open
    drag: Option<DragSession>,
    /// Tab the next menu action applies to
    menu_target: Option<TabId>,
    /// Offer `reload_icon_title` after the standard actions
    reload_action: bool,
    next_timer: u64,
    effects: Vec<Effect>,
}

impl TabListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reload_action(mut self, enabled: bool) -> Self {
        self.reload_action = enabled;
        self
    }

    /// Drain the effects queued by previous calls, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // === Host push commands ===

    /// Append a new tab with a placeholder icon and ask the host for the
    /// real one.
    pub fn create_tab(&mut self, title: String, id: TabId) -> Result<&Tab> {
        if self.tabs.contains_key(&id) {
            tracing::error!(tab_id = %id, "Host created a tab with an id already in use");
            return Err(TabError::DuplicateId(id));
        }

        let tab = Tab::new(id, title);
        self.effects.push(Effect::View(ViewChange::Inserted {
            id,
            index: self.tab_order.len(),
            title: tab.title().to_string(),
            icon: tab.icon().clone(),
        }));
        self.effects.push(Effect::Fetch(Fetch::GetIcon { id }));

        self.tab_order.push(id);
        self.tabs.insert(id, tab);

        tracing::info!(tab_id = %id, "Created tab");

        self.get(id).ok_or(TabError::UnknownId(id))
    }

    /// Remove a tab. Removing the active tab leaves no tab active; the host
    /// is expected to activate a successor explicitly.
    pub fn remove_tab(&mut self, id: TabId) -> Result<Tab> {
        let Some(mut tab) = self.tabs.remove(&id) else {
            tracing::error!(tab_id = %id, "Host removed an unknown tab");
            return Err(TabError::UnknownId(id));
        };
        self.tab_order.retain(|t| *t != id);

        if self.active == Some(id) {
            self.active = None;
        }
        if self.menu_target == Some(id) {
            self.menu_target = None;
        }
        if self.drag.is_some_and(|d| d.tab() == id) {
            self.drag = None;
        }
        if let Some(token) = tab.take_hover_timer() {
            self.effects.push(Effect::Timer(TimerEffect::Cancel { token }));
        }

        self.effects.push(Effect::View(ViewChange::Removed { id }));

        tracing::info!(tab_id = %id, "Removed tab");

        Ok(tab)
    }

    /// Make `id` the only active tab. The previous one is deactivated first.
    pub fn activate_tab(&mut self, id: TabId) -> Result<()> {
        if !self.tabs.contains_key(&id) {
            tracing::error!(tab_id = %id, "Host activated an unknown tab");
            return Err(TabError::UnknownId(id));
        }
        if self.active == Some(id) {
            return Ok(());
        }

        if let Some(previous) = self.active.take() {
            if let Some(tab) = self.tabs.get_mut(&previous) {
                tab.deactivate();
                self.effects
                    .push(Effect::View(ViewChange::Deactivated { id: previous }));
            }
        }

        if let Some(tab) = self.tabs.get_mut(&id) {
            tab.activate();
            self.effects.push(Effect::View(ViewChange::Activated { id }));
        }
        self.active = Some(id);

        tracing::info!(tab_id = %id, "Activated tab");

        Ok(())
    }

    /// Apply an icon that arrived asynchronously. Returns false if the tab
    /// was removed in the meantime.
    pub fn update_icon(&mut self, id: TabId, icon: Icon) -> bool {
        let Some(tab) = self.tabs.get_mut(&id) else {
            tracing::debug!(tab_id = %id, "Discarding icon for a removed tab");
            return false;
        };
        tab.set_icon(icon.clone());
        self.effects
            .push(Effect::View(ViewChange::IconChanged { id, icon }));
        true
    }

    /// Apply a title that arrived asynchronously. Same staleness rule as
    /// [`update_icon`](Self::update_icon).
    pub fn update_title(&mut self, id: TabId, title: String) -> bool {
        let Some(tab) = self.tabs.get_mut(&id) else {
            tracing::debug!(tab_id = %id, "Discarding title for a removed tab");
            return false;
        };
        tab.set_title(title.clone());
        self.effects
            .push(Effect::View(ViewChange::TitleChanged { id, title }));
        true
    }

    // === Pointer input ===

    /// A click only requests activation, and only for a tab that is not
    /// already active.
    pub fn click(&mut self, id: TabId) {
        if !self.tabs.contains_key(&id) {
            tracing::debug!(tab_id = %id, "Ignoring click on a removed tab");
            return;
        }
        self.request_activate(id);
    }

    pub fn close_clicked(&mut self, id: TabId) {
        if !self.tabs.contains_key(&id) {
            tracing::debug!(tab_id = %id, "Ignoring close on a removed tab");
            return;
        }
        self.effects
            .push(Effect::Request(HostRequest::CloseTab { id }));
    }

    pub fn pointer_enter(&mut self, id: TabId) {
        if let Some(tab) = self.tabs.get_mut(&id) {
            tab.set_hovering(true);
        }
    }

    pub fn pointer_leave(&mut self, id: TabId) {
        if let Some(tab) = self.tabs.get_mut(&id) {
            tab.set_hovering(false);
        }
    }

    fn request_activate(&mut self, id: TabId) {
        if self.active == Some(id) {
            return;
        }
        tracing::debug!(tab_id = %id, "Requesting activation");
        self.effects
            .push(Effect::Request(HostRequest::ActivateTab { id }));
    }

    // === Drag and drop ===

    /// Open a drag session for `id`. The "in motion" style is applied one
    /// tick later via [`settle_drag`](Self::settle_drag).
    pub fn drag_start(&mut self, id: TabId) {
        if !self.tabs.contains_key(&id) {
            tracing::debug!(tab_id = %id, "Ignoring drag start on a removed tab");
            return;
        }
        if let Some(previous) = self.drag.take() {
            // a lost drag-end; clear its style before starting over
            if previous.phase().is_in_motion() {
                self.effects.push(Effect::View(ViewChange::DragStyle {
                    id: previous.tab(),
                    in_motion: false,
                }));
            }
        }

        tracing::debug!(tab_id = %id, "Drag started");
        self.drag = Some(DragSession::new(id));
        self.effects.push(Effect::SettleDrag);
    }

    pub fn settle_drag(&mut self) {
        let Some(session) = self.drag.as_mut() else {
            return;
        };
        if session.advance(DragPhase::InMotion) {
            self.effects.push(Effect::View(ViewChange::DragStyle {
                id: session.tab(),
                in_motion: true,
            }));
        }
    }

    /// Pointer moved over `target` while dragging. Moves the dragged tab
    /// before or after `target` depending on which half of `bounds` the
    /// pointer is in. Returns true if the order changed.
    pub fn drag_over(
        &mut self,
        target: TabId,
        payload: DragPayload,
        pointer_y: f32,
        bounds: &Bounds,
    ) -> bool {
        if !payload.is_tab() {
            return false;
        }
        let Some(session) = self.drag else {
            return false;
        };
        let dragged = session.tab();
        if dragged == target || !self.tabs.contains_key(&target) {
            return false;
        }

        let placement = Placement::for_pointer(bounds, pointer_y);
        self.move_relative(dragged, target, placement)
    }

    fn move_relative(&mut self, dragged: TabId, target: TabId, placement: Placement) -> bool {
        let Some(from) = self.position(dragged) else {
            return false;
        };
        let original = self.tab_order.clone();

        let id = self.tab_order.remove(from);
        let Some(target_index) = self.tab_order.iter().position(|t| *t == target) else {
            self.tab_order = original;
            return false;
        };
        let insert_at = match placement {
            Placement::Before => target_index,
            Placement::After => target_index + 1,
        };
        self.tab_order.insert(insert_at, id);

        if self.tab_order == original {
            return false;
        }

        tracing::debug!(tab_id = %dragged, over = %target, index = insert_at, "Reordered tab");
        self.effects.push(Effect::View(ViewChange::Moved {
            id: dragged,
            index: insert_at,
        }));
        true
    }

    /// Drag entered a tab's region (or one of its children). An external
    /// drag arms the hover-to-activate timer on the 0 -> 1 transition.
    pub fn drag_enter(&mut self, id: TabId, payload: DragPayload) {
        let Some(tab) = self.tabs.get_mut(&id) else {
            return;
        };
        if !tab.drag_entered() || payload.is_tab() {
            return;
        }

        self.next_timer += 1;
        let token = TimerToken::new(self.next_timer);
        if let Some(stale) = tab.arm_hover_timer(token) {
            self.effects
                .push(Effect::Timer(TimerEffect::Cancel { token: stale }));
        }
        tracing::debug!(tab_id = %id, token = %token, "Armed hover activation");
        self.effects
            .push(Effect::Timer(TimerEffect::Arm { tab: id, token }));
    }

    /// Drag left a tab's region (or one of its children). Only the return to
    /// zero cancels a pending hover activation.
    pub fn drag_leave(&mut self, id: TabId) {
        let Some(tab) = self.tabs.get_mut(&id) else {
            return;
        };
        if !tab.drag_left() {
            return;
        }
        if let Some(token) = tab.take_hover_timer() {
            tracing::debug!(tab_id = %id, token = %token, "Cancelled hover activation");
            self.effects
                .push(Effect::Timer(TimerEffect::Cancel { token }));
        }
    }

    /// Drop on a tab. The reorder already happened during `drag_over`, so
    /// this only resets the counter; a pending hover timer is left alone.
    pub fn drop_on(&mut self, id: TabId) {
        if let Some(tab) = self.tabs.get_mut(&id) {
            tab.reset_drag_depth();
        }
    }

    /// Drag ended, dropped or cancelled.
    pub fn drag_end(&mut self) {
        let Some(session) = self.drag.take() else {
            return;
        };
        tracing::debug!(tab_id = %session.tab(), "Drag ended");
        if session.phase().is_in_motion() {
            self.effects.push(Effect::View(ViewChange::DragStyle {
                id: session.tab(),
                in_motion: false,
            }));
        }
    }

    /// The hover delay for `id` ran out. Stale tokens (cancelled or
    /// re-armed meanwhile) are ignored.
    pub fn hover_elapsed(&mut self, id: TabId, token: TimerToken) {
        let Some(tab) = self.tabs.get_mut(&id) else {
            return;
        };
        if tab.hover_timer() != Some(token) {
            return;
        }
        tab.take_hover_timer();
        self.request_activate(id);
    }

    // === Context menu ===

    /// Resolve the menu for the tab under the pointer. `None` means the host
    /// should suppress the menu.
    pub fn context_menu(&mut self) -> Option<Vec<MenuItem>> {
        self.menu_target = self
            .tab_order
            .iter()
            .copied()
            .find(|id| self.tabs.get(id).is_some_and(Tab::is_hovering));

        let target = self.menu_target?;
        tracing::debug!(tab_id = %target, "Context menu target resolved");

        let mut items: Vec<MenuItem> = MenuAction::STANDARD.iter().map(MenuAction::item).collect();
        if self.reload_action {
            items.push(MenuAction::ReloadIconTitle.item());
        }
        Some(items)
    }

    /// Run the chosen action against the pending target. The target is
    /// cleared whether or not anything ran.
    pub fn execute_menu_action(&mut self, key: &str) {
        let Some(target) = self.menu_target.take() else {
            tracing::debug!(key, "Menu action without a target");
            return;
        };
        let Some(action) = MenuAction::from_key(key) else {
            tracing::debug!(key, "Ignoring unknown menu action");
            return;
        };

        tracing::debug!(tab_id = %target, action = %action, "Executing menu action");

        let closing: Vec<TabId> = match action {
            MenuAction::Close => vec![target],
            MenuAction::CloseAll => self.tab_order.clone(),
            MenuAction::CloseOthers => self
                .tab_order
                .iter()
                .copied()
                .filter(|id| *id != target)
                .collect(),
            MenuAction::ReloadIconTitle => {
                self.effects
                    .push(Effect::Fetch(Fetch::GetIcon { id: target }));
                self.effects
                    .push(Effect::Fetch(Fetch::GetTitle { id: target }));
                Vec::new()
            }
        };

        for id in closing {
            self.effects
                .push(Effect::Request(HostRequest::CloseTab { id }));
        }
    }

    // === Queries ===

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.tabs.contains_key(&id)
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tab_order.iter().position(|t| *t == id)
    }

    /// Tabs in visual order
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> + '_ {
        self.tab_order.iter().filter_map(|id| self.tabs.get(id))
    }

    pub fn order(&self) -> &[TabId] {
        &self.tab_order
    }

    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    pub fn dragging(&self) -> Option<DragSession> {
        self.drag
    }

    pub fn menu_target(&self) -> Option<TabId> {
        self.menu_target
    }

    pub fn len(&self) -> usize {
        self.tab_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab_order.is_empty()
    }
}
