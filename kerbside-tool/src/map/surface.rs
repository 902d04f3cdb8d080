use std::collections::HashMap;

use kerbside_core::{Bin, BinId, FillLevel, MapSurface, MarkerHandle, Priority};
use ratatui::layout::Rect;

pub const DEFAULT_CENTER: (f64, f64) = (6.93, 79.86);
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 4096.0;

/// Visible part of the world, in degrees.
///
/// At zoom 1 the whole globe fits; each doubling halves the span on both
/// axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1, 1.0)
    }
}

impl Viewport {
    pub fn new(center_lat: f64, center_lng: f64, zoom: f64) -> Self {
        let mut viewport = Self {
            center_lat,
            center_lng,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        viewport.clamp_center();
        viewport
    }

    fn span(&self) -> (f64, f64) {
        (360.0 / self.zoom, 180.0 / self.zoom)
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let half = self.span().0 / 2.0;
        [self.center_lng - half, self.center_lng + half]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let half = self.span().1 / 2.0;
        [self.center_lat - half, self.center_lat + half]
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Moves the centre by a fraction of the visible span. Positive `dx`
    /// goes east, positive `dy` goes north.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (width, height) = self.span();
        self.center_lng += dx * width;
        self.center_lat += dy * height;
        self.clamp_center();
    }

    /// Moves the map so the content under the pointer follows a drag of
    /// `(dcol, drow)` cells.
    pub fn drag(&mut self, area: Rect, dcol: i32, drow: i32) {
        if area.width <= 1 || area.height <= 1 {
            return;
        }
        let dx = -f64::from(dcol) / f64::from(area.width - 1);
        let dy = f64::from(drow) / f64::from(area.height - 1);
        self.pan(dx, dy);
    }

    fn clamp_center(&mut self) {
        self.center_lat = self.center_lat.clamp(-90.0, 90.0);
        self.center_lng = self.center_lng.clamp(-180.0, 180.0);
    }

    /// Coordinate under terminal cell `(col, row)` of the canvas `area`.
    pub fn to_geo(&self, area: Rect, col: u16, row: u16) -> Option<(f64, f64)> {
        if area.width <= 1 || area.height <= 1 || !contains(area, col, row) {
            return None;
        }
        let [left, right] = self.x_bounds();
        let [bottom, top] = self.y_bounds();
        let fx = f64::from(col - area.x) / f64::from(area.width - 1);
        let fy = f64::from(row - area.y) / f64::from(area.height - 1);
        let lng = left + fx * (right - left);
        let lat = top - fy * (top - bottom);
        Some((lat, lng))
    }

    /// Terminal cell where the canvas draws `(lat, lng)`, if visible.
    pub fn to_cell(&self, area: Rect, lat: f64, lng: f64) -> Option<(u16, u16)> {
        if area.width <= 1 || area.height <= 1 {
            return None;
        }
        let [left, right] = self.x_bounds();
        let [bottom, top] = self.y_bounds();
        if lng < left || lng > right || lat < bottom || lat > top {
            return None;
        }
        // Truncates like the canvas does for printed labels; the epsilon
        // absorbs rounding from `to_geo`.
        let col = ((lng - left) * f64::from(area.width - 1) / (right - left) + 1e-9) as u16;
        let row = ((top - lat) * f64::from(area.height - 1) / (top - bottom) + 1e-9) as u16;
        Some((area.x + col, area.y + row))
    }
}

pub fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalMarker {
    pub bin_id: BinId,
    pub lat: f64,
    pub lng: f64,
    pub priority: Priority,
    pub fill_level: FillLevel,
    pub tooltip: Option<String>,
}

/// Map surface drawn on a ratatui canvas.
///
/// Holds the markers and tooltips the bin map asked for, plus the viewport
/// and the canvas area of the last frame so pointer positions can be
/// resolved to coordinates and markers.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    markers: HashMap<u64, TerminalMarker>,
    next_handle: u64,
    pub viewport: Viewport,
    area: Rect,
}

impl TerminalSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn markers(&self) -> impl Iterator<Item = &TerminalMarker> {
        self.markers.values()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn to_geo(&self, col: u16, row: u16) -> Option<(f64, f64)> {
        self.viewport.to_geo(self.area, col, row)
    }

    pub fn to_cell(&self, lat: f64, lng: f64) -> Option<(u16, u16)> {
        self.viewport.to_cell(self.area, lat, lng)
    }

    /// Nearest visible marker within one cell of `(col, row)`.
    pub fn marker_at(&self, col: u16, row: u16) -> Option<&TerminalMarker> {
        self.markers
            .values()
            .filter_map(|marker| {
                let (mc, mr) = self.to_cell(marker.lat, marker.lng)?;
                let distance = mc.abs_diff(col).max(mr.abs_diff(row));
                (distance <= 1).then_some((distance, marker))
            })
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.bin_id.cmp(&b.1.bin_id)))
            .map(|(_, marker)| marker)
    }
}

impl MapSurface for TerminalSurface {
    fn place_marker(&mut self, bin: &Bin) -> MarkerHandle {
        self.next_handle += 1;
        self.markers.insert(
            self.next_handle,
            TerminalMarker {
                bin_id: bin.id.clone(),
                lat: bin.lat,
                lng: bin.lng,
                priority: bin.priority,
                fill_level: bin.fill_level,
                tooltip: None,
            },
        );
        MarkerHandle::new(self.next_handle)
    }

    fn remove_marker(&mut self, handle: &MarkerHandle) {
        self.markers.remove(&handle.raw());
    }

    fn bind_tooltip(&mut self, handle: &MarkerHandle, content: &str) {
        if let Some(marker) = self.markers.get_mut(&handle.raw()) {
            marker.tooltip = Some(content.to_string());
        }
    }

    fn unbind_tooltip(&mut self, handle: &MarkerHandle) {
        if let Some(marker) = self.markers.get_mut(&handle.raw()) {
            marker.tooltip = None;
        }
    }

    fn restyle_marker(&mut self, handle: &MarkerHandle, bin: &Bin) {
        if let Some(marker) = self.markers.get_mut(&handle.raw()) {
            marker.priority = bin.priority;
            marker.fill_level = bin.fill_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 1,
        y: 2,
        width: 81,
        height: 41,
    };

    fn bin(id: &str, lat: f64, lng: f64) -> Bin {
        Bin {
            id: id.to_string(),
            lat,
            lng,
            fill_level: FillLevel::new(30),
            priority: Priority::Low,
        }
    }

    #[test]
    fn whole_world_at_zoom_one() {
        let viewport = Viewport::new(0.0, 0.0, 1.0);
        assert_eq!(viewport.x_bounds(), [-180.0, 180.0]);
        assert_eq!(viewport.y_bounds(), [-90.0, 90.0]);
    }

    #[test]
    fn corners_and_centre_project() {
        let viewport = Viewport::new(0.0, 0.0, 1.0);
        assert_eq!(viewport.to_geo(AREA, 1, 2), Some((90.0, -180.0)));
        assert_eq!(viewport.to_geo(AREA, 81, 42), Some((-90.0, 180.0)));
        assert_eq!(viewport.to_geo(AREA, 41, 22), Some((0.0, 0.0)));
        assert_eq!(viewport.to_geo(AREA, 0, 2), None);
        assert_eq!(viewport.to_geo(AREA, 82, 2), None);
    }

    #[test]
    fn cell_round_trip() {
        let viewport = Viewport::new(10.0, 20.0, 4.0);
        for (col, row) in [(1, 2), (17, 9), (41, 22), (80, 41)] {
            let (lat, lng) = viewport.to_geo(AREA, col, row).unwrap();
            assert_eq!(viewport.to_cell(AREA, lat, lng), Some((col, row)));
        }
    }

    #[test]
    fn off_screen_has_no_cell() {
        let viewport = Viewport::new(6.93, 79.86, 64.0);
        assert_eq!(viewport.to_cell(AREA, 51.5, -0.12), None);
        assert!(viewport.to_cell(AREA, 6.93, 79.86).is_some());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_by(0.25);
        assert_eq!(viewport.zoom, MIN_ZOOM);
        viewport.zoom_by(1.0e6);
        assert_eq!(viewport.zoom, MAX_ZOOM);
    }

    #[test]
    fn pan_moves_by_span_and_clamps() {
        let mut viewport = Viewport::new(0.0, 0.0, 2.0);
        viewport.pan(0.25, -0.5);
        assert_eq!(viewport.center_lng, 45.0);
        assert_eq!(viewport.center_lat, -45.0);

        viewport.pan(0.0, -10.0);
        assert_eq!(viewport.center_lat, -90.0);
    }

    #[test]
    fn drag_follows_pointer() {
        let mut viewport = Viewport::new(0.0, 0.0, 1.0);
        // Dragging right pulls the western content into view.
        viewport.drag(AREA, 8, 0);
        assert!(viewport.center_lng < 0.0);
        viewport.drag(AREA, 0, 4);
        assert!(viewport.center_lat > 0.0);
    }

    #[test]
    fn marker_hit_test_tolerates_one_cell() {
        let mut surface = TerminalSurface::new(Viewport::new(0.0, 0.0, 1.0));
        surface.set_area(AREA);
        surface.place_marker(&bin("A", 0.0, 0.0));
        surface.place_marker(&bin("B", 45.0, 90.0));

        let (col, row) = surface.to_cell(0.0, 0.0).unwrap();
        assert_eq!(surface.marker_at(col, row).unwrap().bin_id, "A");
        assert_eq!(surface.marker_at(col + 1, row + 1).unwrap().bin_id, "A");
        assert!(surface.marker_at(col + 2, row).is_none());

        let (col, row) = surface.to_cell(45.0, 90.0).unwrap();
        assert_eq!(surface.marker_at(col, row).unwrap().bin_id, "B");
    }

    #[test]
    fn nearest_marker_wins() {
        let mut surface = TerminalSurface::new(Viewport::new(0.0, 0.0, 1.0));
        surface.set_area(AREA);
        surface.place_marker(&bin("far", 0.0, 0.0));
        let (col, row) = surface.to_cell(0.0, 0.0).unwrap();
        let (lat, lng) = surface.to_geo(col + 1, row).unwrap();
        surface.place_marker(&bin("near", lat, lng));

        assert_eq!(surface.marker_at(col + 1, row).unwrap().bin_id, "near");
        assert_eq!(surface.marker_at(col, row).unwrap().bin_id, "far");
    }

    #[test]
    fn restyle_tracks_priority() {
        let mut surface = TerminalSurface::default();
        let handle = surface.place_marker(&bin("A", 1.0, 1.0));
        surface.bind_tooltip(&handle, "Bin A");
        surface.restyle_marker(&handle, &bin("A", 1.0, 1.0).with_priority(Priority::High));

        let marker = surface.markers().next().unwrap();
        assert_eq!(marker.priority, Priority::High);
        assert_eq!(marker.tooltip.as_deref(), Some("Bin A"));

        surface.remove_marker(&handle);
        assert_eq!(surface.marker_count(), 0);
    }
}
