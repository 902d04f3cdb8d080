use std::collections::VecDeque;

use kerbside_core::{
    BinId, BinMap, MapEvent, MenuAction, Notice, PendingRequest, Priority, ScreenPoint,
    SyncCompletion,
};
use kerbside_rest::{BinBackend, Dispatcher, drain_ready};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use super::surface::{TerminalSurface, Viewport, contains};
use super::ui;
use crate::config::Role;

const MAX_NOTICES: usize = 5;
const DRAG_THRESHOLD: u16 = 1;
const ZOOM_STEP: f64 = 2.0;
const PAN_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragState {
    origin: (u16, u16),
    last: (u16, u16),
    moved: bool,
}

/// Terminal front end of the bin map.
///
/// Owns the bin map and feeds it pointer and key input; every request the
/// map returns is handed to the dispatcher, and completions are applied on
/// the next [`MapApp::poll_completions`].
pub struct MapApp<B: BinBackend + 'static> {
    pub map: BinMap<TerminalSurface>,
    dispatcher: Dispatcher<B>,
    completions: UnboundedReceiver<SyncCompletion>,
    pub role: Role,
    pub api_base: String,
    pub notices: VecDeque<Notice>,
    pub hovered: Option<BinId>,
    home: Viewport,
    drag: Option<DragState>,
    pointer_in_menu: bool,
    frame_area: Rect,
    pub should_quit: bool,
}

impl<B: BinBackend + 'static> MapApp<B> {
    pub fn new(
        viewport: Viewport,
        backend: B,
        role: Role,
        api_base: String,
        new_bin_priority: Priority,
    ) -> Self {
        let (dispatcher, completions) = Dispatcher::new(backend);
        let map =
            BinMap::new(TerminalSurface::new(viewport)).with_new_bin_priority(new_bin_priority);

        Self {
            map,
            dispatcher,
            completions,
            role,
            api_base,
            notices: VecDeque::new(),
            hovered: None,
            home: viewport,
            drag: None,
            pointer_in_menu: false,
            frame_area: Rect::default(),
            should_quit: false,
        }
    }

    /// Requests the initial bin list.
    pub fn mount(&mut self) {
        let pending = self.map.mount();
        self.send(pending);
    }

    /// Hands the surface back after removing every marker.
    pub fn unmount(self) -> TerminalSurface {
        self.map.unmount()
    }

    fn send(&mut self, pending: Option<PendingRequest>) {
        if let Some(pending) = pending {
            self.dispatcher.dispatch(pending);
        }
    }

    fn event(&mut self, event: MapEvent) {
        let pending = self.map.handle_event(event);
        self.send(pending);
    }

    /// Applies every completion that has arrived and collects notices.
    pub fn poll_completions(&mut self) {
        for completion in drain_ready(&mut self.completions) {
            self.map.apply(completion);
        }
        for notice in self.map.drain_notices() {
            if self.notices.len() == MAX_NOTICES {
                self.notices.pop_front();
            }
            self.notices.push_back(notice);
        }
        if let Some(id) = &self.hovered
            && !self.map.store().contains(id)
        {
            self.hovered = None;
        }
    }

    /// Records the frame size and lays out the canvas.
    pub fn resize(&mut self, frame: Rect) {
        self.frame_area = frame;
        let canvas = ui::canvas_area(frame);
        self.map.surface_mut().set_area(canvas);
    }

    pub fn viewport(&self) -> Viewport {
        self.map.surface().viewport
    }

    /// Screen rectangle of the open context menu.
    pub fn menu_area(&self) -> Option<Rect> {
        let state = self.map.menu().state()?;
        Some(ui::menu_rect(state.at, self.frame_area))
    }

    pub fn primary_click(&mut self, col: u16, row: u16) {
        if let Some(area) = self.menu_area()
            && contains(area, col, row)
        {
            self.menu_click(area, row);
            return;
        }

        match self.map.surface().to_geo(col, row) {
            Some((lat, lng)) => self.event(MapEvent::PrimaryClick { lat, lng }),
            None => self.map.close_menu(),
        }
    }

    fn menu_click(&mut self, area: Rect, row: u16) {
        let index = row.saturating_sub(area.y + 1) as usize;
        if row > area.y
            && let Some(action) = MenuAction::ALL.get(index).copied()
        {
            let pending = self.map.choose(action);
            self.send(pending);
        }
    }

    pub fn secondary_click(&mut self, col: u16, row: u16) {
        let Some(marker) = self.map.surface().marker_at(col, row) else {
            debug!("secondary click at ({}, {}) hit no marker", col, row);
            return;
        };
        let id = marker.bin_id.clone();
        self.pointer_in_menu = false;
        self.event(MapEvent::MarkerSecondaryClick {
            id,
            at: ScreenPoint::new(f32::from(col), f32::from(row)),
        });
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        self.drag = Some(DragState {
            origin: (col, row),
            last: (col, row),
            moved: false,
        });
    }

    pub fn mouse_drag(&mut self, col: u16, row: u16) {
        let Some(mut drag) = self.drag else {
            return;
        };
        if !drag.moved {
            let dx = col.abs_diff(drag.origin.0);
            let dy = row.abs_diff(drag.origin.1);
            drag.moved = dx > DRAG_THRESHOLD || dy > DRAG_THRESHOLD;
        }
        if drag.moved {
            let dcol = i32::from(col) - i32::from(drag.last.0);
            let drow = i32::from(row) - i32::from(drag.last.1);
            let area = self.map.surface().area();
            self.map.surface_mut().viewport.drag(area, dcol, drow);
            self.drag = Some(DragState {
                last: (col, row),
                ..drag
            });
            self.event(MapEvent::ViewportChange);
        } else {
            self.drag = Some(drag);
        }
    }

    /// Ends a press. Without movement past the threshold it is a click.
    pub fn mouse_up(&mut self, col: u16, row: u16) {
        match self.drag.take() {
            Some(drag) if drag.moved => {}
            _ => self.primary_click(col, row),
        }
    }

    pub fn mouse_move(&mut self, col: u16, row: u16) {
        self.hovered = self
            .map
            .surface()
            .marker_at(col, row)
            .map(|marker| marker.bin_id.clone());

        match self.menu_area() {
            Some(area) => {
                let inside = contains(area, col, row);
                if self.pointer_in_menu && !inside {
                    self.event(MapEvent::MenuPointerLeave);
                }
                self.pointer_in_menu = inside;
            }
            None => self.pointer_in_menu = false,
        }
    }

    pub fn zoom_in(&mut self) {
        self.map.surface_mut().viewport.zoom_by(ZOOM_STEP);
        self.event(MapEvent::ViewportChange);
    }

    pub fn zoom_out(&mut self) {
        self.map.surface_mut().viewport.zoom_by(1.0 / ZOOM_STEP);
        self.event(MapEvent::ViewportChange);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.map.surface_mut().viewport.pan(dx * PAN_STEP, dy * PAN_STEP);
        self.event(MapEvent::ViewportChange);
    }

    /// Returns to the viewport the session started with.
    pub fn recenter(&mut self) {
        self.map.surface_mut().viewport = self.home;
        self.event(MapEvent::ViewportChange);
    }

    pub fn toggle_placement(&mut self) {
        self.map.toggle_placement();
    }

    pub fn menu_up(&mut self) {
        self.map.menu_up();
    }

    pub fn menu_down(&mut self) {
        self.map.menu_down();
    }

    pub fn menu_select(&mut self) {
        let pending = self.map.choose_selected();
        self.send(pending);
    }

    pub fn close_menu(&mut self) {
        self.map.close_menu();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
