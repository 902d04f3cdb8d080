use crate::bin::{BinId, Priority};
use crate::surface::ScreenPoint;

/// An entry of the per-marker context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Delete,
    SetPriority(Priority),
}

impl MenuAction {
    /// Menu entries in display order.
    pub const ALL: [MenuAction; 4] = [
        MenuAction::Delete,
        MenuAction::SetPriority(Priority::Low),
        MenuAction::SetPriority(Priority::Medium),
        MenuAction::SetPriority(Priority::High),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Delete => "Delete bin",
            MenuAction::SetPriority(Priority::Low) => "Priority: low",
            MenuAction::SetPriority(Priority::Medium) => "Priority: medium",
            MenuAction::SetPriority(Priority::High) => "Priority: high",
        }
    }
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    pub bin_id: BinId,
    pub at: ScreenPoint,
    /// Index into [`MenuAction::ALL`] of the highlighted entry.
    pub selected: usize,
}

impl MenuState {
    pub fn selected_action(&self) -> MenuAction {
        MenuAction::ALL[self.selected.min(MenuAction::ALL.len() - 1)]
    }
}

/// At most one menu is open at a time; opening retargets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenu {
    state: Option<MenuState>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, bin_id: BinId, at: ScreenPoint) {
        self.state = Some(MenuState {
            bin_id,
            at,
            selected: 0,
        });
    }

    pub fn close(&mut self) {
        self.state = None;
    }

    /// Closes the menu if it targets `bin_id`.
    pub fn close_if_targets(&mut self, bin_id: &str) {
        if self.target() == Some(bin_id) {
            self.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&MenuState> {
        self.state.as_ref()
    }

    pub fn target(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.bin_id.as_str())
    }

    pub fn select_up(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.selected = state.selected.saturating_sub(1);
        }
    }

    pub fn select_down(&mut self) {
        if let Some(state) = self.state.as_mut() {
            if state.selected + 1 < MenuAction::ALL.len() {
                state.selected += 1;
            }
        }
    }

    /// Takes the menu, leaving it closed, and returns the target and chosen action.
    pub fn take(&mut self, action: MenuAction) -> Option<(BinId, MenuAction)> {
        self.state.take().map(|s| (s.bin_id, action))
    }
}
