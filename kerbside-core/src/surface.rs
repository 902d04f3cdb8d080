use std::collections::HashMap;

use crate::bin::{Bin, BinId, Priority};

/// Opaque token for a marker drawn on a map surface.
///
/// Minted by [`MapSurface::place_marker`]. The bin record store is the only
/// component that hands handles back to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(raw: u64) -> Self {
        MarkerHandle(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Position on screen, in the surface's own units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        ScreenPoint { x, y }
    }
}

/// Structured input produced by a map surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Primary click on the map background at the given coordinate.
    PrimaryClick { lat: f64, lng: f64 },
    /// Secondary click on the marker of a bin.
    MarkerSecondaryClick { id: BinId, at: ScreenPoint },
    /// Pan or zoom.
    ViewportChange,
    /// Pointer left the context menu region.
    MenuPointerLeave,
}

/// Capability interface of an interactive map.
///
/// Implementations draw markers and tooltips; they never decide when a
/// marker exists. That is owned by the bin record store.
pub trait MapSurface {
    fn place_marker(&mut self, bin: &Bin) -> MarkerHandle;

    fn remove_marker(&mut self, handle: &MarkerHandle);

    fn bind_tooltip(&mut self, handle: &MarkerHandle, content: &str);

    fn unbind_tooltip(&mut self, handle: &MarkerHandle);

    /// Redraws a marker whose bin attributes changed (e.g. priority colour).
    fn restyle_marker(&mut self, _handle: &MarkerHandle, _bin: &Bin) {}

    /// Rebuilds the tooltip from scratch rather than patching it.
    fn update_tooltip(&mut self, handle: &MarkerHandle, content: &str) {
        self.unbind_tooltip(handle);
        self.bind_tooltip(handle, content);
    }
}

impl<S: MapSurface + ?Sized> MapSurface for &mut S {
    fn place_marker(&mut self, bin: &Bin) -> MarkerHandle {
        (**self).place_marker(bin)
    }

    fn remove_marker(&mut self, handle: &MarkerHandle) {
        (**self).remove_marker(handle)
    }

    fn bind_tooltip(&mut self, handle: &MarkerHandle, content: &str) {
        (**self).bind_tooltip(handle, content)
    }

    fn unbind_tooltip(&mut self, handle: &MarkerHandle) {
        (**self).unbind_tooltip(handle)
    }

    fn restyle_marker(&mut self, handle: &MarkerHandle, bin: &Bin) {
        (**self).restyle_marker(handle, bin)
    }

    fn update_tooltip(&mut self, handle: &MarkerHandle, content: &str) {
        (**self).update_tooltip(handle, content)
    }
}

/// A marker as drawn by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnMarker {
    pub bin_id: BinId,
    pub lat: f64,
    pub lng: f64,
    pub priority: Priority,
    pub tooltip: Option<String>,
}

/// A surface that keeps markers in a map and draws nothing.
///
/// Useful for testing and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemorySurface {
    markers: HashMap<u64, DrawnMarker>,
    next_handle: u64,
    tooltip_binds: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker(&self, handle: &MarkerHandle) -> Option<&DrawnMarker> {
        self.markers.get(&handle.raw())
    }

    pub fn markers(&self) -> impl Iterator<Item = &DrawnMarker> {
        self.markers.values()
    }

    pub fn marker_for(&self, bin_id: &str) -> Option<&DrawnMarker> {
        self.markers.values().find(|m| m.bin_id == bin_id)
    }

    /// Number of tooltip binds performed so far.
    pub fn tooltip_binds(&self) -> usize {
        self.tooltip_binds
    }
}

impl MapSurface for MemorySurface {
    fn place_marker(&mut self, bin: &Bin) -> MarkerHandle {
        self.next_handle += 1;
        self.markers.insert(
            self.next_handle,
            DrawnMarker {
                bin_id: bin.id.clone(),
                lat: bin.lat,
                lng: bin.lng,
                priority: bin.priority,
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
            self.tooltip_binds += 1;
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
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin::FillLevel;

    fn bin(id: &str) -> Bin {
        Bin {
            id: id.to_string(),
            lat: 1.0,
            lng: 2.0,
            fill_level: FillLevel::new(10),
            priority: Priority::Low,
        }
    }

    #[test]
    fn handles_are_unique() {
        let mut surface = MemorySurface::new();
        let a = surface.place_marker(&bin("A"));
        let b = surface.place_marker(&bin("B"));
        assert_ne!(a, b);
        assert_eq!(surface.marker_count(), 2);
    }

    #[test]
    fn update_tooltip_rebinds() {
        let mut surface = MemorySurface::new();
        let h = surface.place_marker(&bin("A"));
        surface.bind_tooltip(&h, "one");
        surface.update_tooltip(&h, "two");
        assert_eq!(surface.marker(&h).unwrap().tooltip.as_deref(), Some("two"));
        assert_eq!(surface.tooltip_binds(), 2);
    }

    #[test]
    fn operations_on_removed_handle_are_ignored() {
        let mut surface = MemorySurface::new();
        let h = surface.place_marker(&bin("A"));
        surface.remove_marker(&h);
        surface.bind_tooltip(&h, "ghost");
        surface.remove_marker(&h);
        assert_eq!(surface.marker_count(), 0);
        assert_eq!(surface.tooltip_binds(), 0);
    }
}
