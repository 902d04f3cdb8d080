use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use kerbside_rest::BinBackend;

use super::app::MapApp;

pub fn handle_event<B: BinBackend + 'static>(app: &mut MapApp<B>, event: Event) {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        _ => {}
    }
}

fn handle_key<B: BinBackend + 'static>(app: &mut MapApp<B>, key: KeyEvent) {
    if app.map.menu().is_open() {
        handle_menu_key(app, key);
    } else {
        handle_map_key(app, key);
    }
}

fn handle_map_key<B: BinBackend + 'static>(app: &mut MapApp<B>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('a') => app.toggle_placement(),
        KeyCode::Char('c') => app.recenter(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Left => app.pan(-1.0, 0.0),
        KeyCode::Right => app.pan(1.0, 0.0),
        KeyCode::Up => app.pan(0.0, 1.0),
        KeyCode::Down => app.pan(0.0, -1.0),
        _ => {}
    }
}

fn handle_menu_key<B: BinBackend + 'static>(app: &mut MapApp<B>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_menu(),
        KeyCode::Enter => app.menu_select(),
        KeyCode::Up => app.menu_up(),
        KeyCode::Down => app.menu_down(),
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

fn handle_mouse<B: BinBackend + 'static>(app: &mut MapApp<B>, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(col, row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(col, row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(col, row),
        MouseEventKind::Down(MouseButton::Right) => app.secondary_click(col, row),
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        MouseEventKind::Moved => app.mouse_move(col, row),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyModifiers, MouseEvent};
    use kerbside_core::{Bin, FillLevel, NewBin, PlacementMode, Priority, SyncFailure};
    use ratatui::layout::Rect;

    use super::*;
    use crate::config::Role;
    use crate::map::surface::Viewport;

    struct StaticBackend(Vec<Bin>);

    impl BinBackend for StaticBackend {
        type Error = SyncFailure;

        async fn list_bins(&self) -> Result<Vec<Bin>, SyncFailure> {
            Ok(self.0.clone())
        }

        async fn create_bin(&self, _new: &NewBin) -> Result<Bin, SyncFailure> {
            Err(SyncFailure::Rejected {
                status: 400,
                message: Some("invalid coordinates".to_string()),
            })
        }

        async fn delete_bin(&self, _id: &str) -> Result<(), SyncFailure> {
            Ok(())
        }

        async fn update_priority(&self, _id: &str, _priority: Priority) -> Result<(), SyncFailure> {
            Ok(())
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    async fn app_with(bins: Vec<Bin>) -> MapApp<StaticBackend> {
        let mut app = MapApp::new(
            Viewport::new(0.0, 0.0, 1.0),
            StaticBackend(bins),
            Role::User,
            "http://localhost:8080".to_string(),
            Priority::Low,
        );
        app.resize(Rect::new(0, 0, 100, 40));
        app.mount();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.poll_completions();
            if !app.map.is_loading() {
                break;
            }
        }
        app
    }

    fn bin(id: &str) -> Bin {
        Bin {
            id: id.to_string(),
            lat: 20.0,
            lng: 20.0,
            fill_level: FillLevel::new(85),
            priority: Priority::Low,
        }
    }

    #[tokio::test]
    async fn keys_drive_mode_and_viewport() {
        let mut app = app_with(vec![]).await;

        handle_event(&mut app, key(KeyCode::Char('a')));
        assert_eq!(app.map.placement(), PlacementMode::Placing);
        handle_event(&mut app, key(KeyCode::Char('a')));
        assert_eq!(app.map.placement(), PlacementMode::Browsing);

        handle_event(&mut app, key(KeyCode::Char('+')));
        assert_eq!(app.viewport().zoom, 2.0);
        handle_event(&mut app, key(KeyCode::Right));
        assert!(app.viewport().center_lng > 0.0);
        handle_event(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.viewport(), Viewport::new(0.0, 0.0, 1.0));

        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn escape_closes_menu_before_quitting() {
        let mut app = app_with(vec![bin("A")]).await;
        let (col, row) = app.map.surface().to_cell(20.0, 20.0).unwrap();

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Right), col, row));
        assert_eq!(app.map.menu().target(), Some("A"));

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.map.menu().is_open());
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn menu_keys_navigate_and_select() {
        let mut app = app_with(vec![bin("A")]).await;
        let (col, row) = app.map.surface().to_cell(20.0, 20.0).unwrap();
        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Right), col, row));

        handle_event(&mut app, key(KeyCode::Down));
        handle_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.map.menu().state().unwrap().selected, 2);
        handle_event(&mut app, key(KeyCode::Enter));

        assert!(!app.map.menu().is_open());
        assert!(app.map.is_pending("A"));
    }

    #[tokio::test]
    async fn click_without_drag_reaches_the_map() {
        let mut app = app_with(vec![]).await;
        handle_event(&mut app, key(KeyCode::Char('a')));

        handle_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 50, 20));
        handle_event(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 51, 20));
        handle_event(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 51, 20));
        assert_eq!(app.map.pending_count(), 1);

        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.poll_completions();
            if app.map.pending_count() == 0 {
                break;
            }
        }
        assert!(app.map.store().is_empty());
        assert_eq!(
            app.notices.back().unwrap().text.split(": ").last(),
            Some("invalid coordinates")
        );
    }

    #[tokio::test]
    async fn scroll_zooms() {
        let mut app = app_with(vec![]).await;
        handle_event(&mut app, mouse(MouseEventKind::ScrollUp, 10, 10));
        handle_event(&mut app, mouse(MouseEventKind::ScrollUp, 10, 10));
        assert_eq!(app.viewport().zoom, 4.0);
        handle_event(&mut app, mouse(MouseEventKind::ScrollDown, 10, 10));
        assert_eq!(app.viewport().zoom, 2.0);
    }
}
