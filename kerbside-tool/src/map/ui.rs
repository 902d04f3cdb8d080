use kerbside_core::{BinId, FillStatus, MenuAction, NoticeLevel, Priority, ScreenPoint};
use kerbside_rest::BinBackend;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph,
        canvas::{Canvas, Map, MapResolution},
    },
};

use super::app::MapApp;
use super::surface::TerminalMarker;

const NOTICE_HEIGHT: u16 = 5;
const MENU_WIDTH: u16 = 22;
const MENU_HEIGHT: u16 = MenuAction::ALL.len() as u16 + 2;

fn chunks(frame: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Header
            Constraint::Min(3),                // Map
            Constraint::Length(NOTICE_HEIGHT), // Notices
            Constraint::Length(1),             // Status bar
        ])
        .split(frame);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

fn map_block(title: String) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(title)
}

/// Drawable area of the canvas within a frame of size `frame`.
pub fn canvas_area(frame: Rect) -> Rect {
    map_block(String::new()).inner(chunks(frame)[1])
}

/// Where the context menu opened at `at` is drawn, kept inside `frame`.
pub fn menu_rect(at: ScreenPoint, frame: Rect) -> Rect {
    let width = MENU_WIDTH.min(frame.width);
    let height = MENU_HEIGHT.min(frame.height);
    let x = (at.x.max(0.0) as u16)
        .saturating_add(1)
        .min(frame.right().saturating_sub(width))
        .max(frame.x);
    let y = (at.y.max(0.0) as u16)
        .min(frame.bottom().saturating_sub(height))
        .max(frame.y);
    Rect::new(x, y, width, height)
}

pub fn render<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>) {
    let [header, map, notices, status] = chunks(frame.area());

    render_header(frame, app, header);
    render_map(frame, app, map);
    render_notices(frame, app, notices);
    render_status_bar(frame, app, status);

    if app.map.menu().is_open() {
        render_menu(frame, app);
    } else if let Some(id) = &app.hovered {
        render_tooltip(frame, app, id);
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

/// Marker glyph by fill band; colour carries the priority.
fn marker_glyph(status: FillStatus) -> &'static str {
    match status {
        FillStatus::Normal => "○",
        FillStatus::Warning => "◐",
        FillStatus::Critical => "●",
    }
}

fn render_header<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>, area: Rect) {
    let loading = if app.map.is_loading() {
        "  loading..."
    } else {
        ""
    };
    let pending = match app.map.pending_count() {
        0 => String::new(),
        n => format!("  in progress: {}", n),
    };
    let title = format!(
        "kerb map - {} [{}]  bins: {}{}{}",
        app.api_base,
        app.role,
        app.map.store().len(),
        pending,
        loading
    );

    let header = Paragraph::new(title).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(header, area);
}

fn render_map<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>, area: Rect) {
    let viewport = app.viewport();
    let mode = app.map.placement();
    let title = format!(" Mode: {}  zoom x{} ", mode.label(), viewport.zoom);
    let block = if mode.is_placing() {
        map_block(title).border_style(Style::default().fg(Color::Yellow))
    } else {
        map_block(title)
    };

    let markers: Vec<(f64, f64, &'static str, Style)> = app
        .map
        .surface()
        .markers()
        .map(|marker| {
            let style = if app.map.is_pending(&marker.bin_id) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
                    .fg(priority_color(marker.priority))
                    .add_modifier(Modifier::BOLD)
            };
            let glyph = marker_glyph(marker.fill_level.status());
            (marker.lng, marker.lat, glyph, style)
        })
        .collect();

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (x, y, glyph, style) in &markers {
                ctx.print(*x, *y, Span::styled(*glyph, *style));
            }
        });

    frame.render_widget(canvas, area);
}

fn render_notices<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.notices.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .notices
        .iter()
        .skip(skip)
        .map(|notice| {
            let style = match notice.level {
                NoticeLevel::Info => Style::default(),
                NoticeLevel::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(notice.text.clone(), style))
        })
        .collect();

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Notices"));
    frame.render_widget(panel, area);
}

fn render_status_bar<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>, area: Rect) {
    let status = if app.map.menu().is_open() {
        "↑/↓: Navigate  Enter: Select  Esc: Close menu"
    } else {
        "Click: Add (in add mode)  Right click: Bin menu  Drag/arrows: Pan  Scroll/+/-: Zoom  a: Add mode  c: Recenter  q: Quit"
    };

    let status_bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

fn render_menu<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>) {
    let Some(state) = app.map.menu().state() else {
        return;
    };
    let current = app
        .map
        .store()
        .get(&state.bin_id)
        .map(|entry| entry.bin().priority);

    let items: Vec<ListItem> = MenuAction::ALL
        .iter()
        .map(|action| match action {
            MenuAction::SetPriority(priority) if Some(*priority) == current => {
                ListItem::new(format!("{} ✓", action.label()))
                    .style(Style::default().fg(Color::Green))
            }
            MenuAction::Delete => {
                ListItem::new(action.label()).style(Style::default().fg(Color::Red))
            }
            _ => ListItem::new(action.label()),
        })
        .collect();

    let area = menu_rect(state.at, frame.area());
    frame.render_widget(Clear, area);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bin {}", state.bin_id)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn tooltip_rect(marker: &TerminalMarker, cell: (u16, u16), frame: Rect) -> Rect {
    let text = marker.tooltip.as_deref().unwrap_or_default();
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 2;
    let height = text.lines().count() as u16 + 2;
    let width = width.min(frame.width);
    let height = height.min(frame.height);
    let x = cell.0.saturating_add(2).min(frame.right().saturating_sub(width));
    let y = cell.1.saturating_add(1).min(frame.bottom().saturating_sub(height));
    Rect::new(x, y, width, height)
}

fn render_tooltip<B: BinBackend + 'static>(frame: &mut Frame, app: &MapApp<B>, id: &BinId) {
    let surface = app.map.surface();
    let Some(marker) = surface.markers().find(|m| &m.bin_id == id) else {
        return;
    };
    let (Some(tooltip), Some(cell)) = (&marker.tooltip, surface.to_cell(marker.lat, marker.lng))
    else {
        return;
    };

    let area = tooltip_rect(marker, cell, frame.area());
    frame.render_widget(Clear, area);
    let lines: Vec<Line> = tooltip.lines().map(Line::from).collect();
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(priority_color(marker.priority))),
    );
    frame.render_widget(popup, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_sits_inside_map_block() {
        let frame = Rect::new(0, 0, 120, 40);
        let canvas = canvas_area(frame);
        assert_eq!(canvas, Rect::new(1, 2, 118, 40 - 1 - NOTICE_HEIGHT - 1 - 2));
    }

    #[test]
    fn menu_opens_beside_pointer() {
        let frame = Rect::new(0, 0, 120, 40);
        let rect = menu_rect(ScreenPoint::new(10.0, 5.0), frame);
        assert_eq!(rect, Rect::new(11, 5, MENU_WIDTH, MENU_HEIGHT));
    }

    #[test]
    fn menu_stays_on_screen() {
        let frame = Rect::new(0, 0, 120, 40);
        let rect = menu_rect(ScreenPoint::new(119.0, 39.0), frame);
        assert_eq!(rect.right(), frame.right());
        assert_eq!(rect.bottom(), frame.bottom());
    }

    #[test]
    fn tooltip_is_sized_to_text() {
        let marker = TerminalMarker {
            bin_id: "A".to_string(),
            lat: 0.0,
            lng: 0.0,
            priority: Priority::Low,
            fill_level: kerbside_core::FillLevel::new(10),
            tooltip: Some("Bin A\nFill level: 10% (normal)\nPriority: low".to_string()),
        };
        let rect = tooltip_rect(&marker, (10, 10), Rect::new(0, 0, 120, 40));
        assert_eq!(rect, Rect::new(12, 11, 26, 5));
    }
}
