//! Kerbside core: the interactive bin map of a waste-management console.
//!
//! Core concepts:
//! - **Bin**: a waste receptacle with a position, fill level and priority
//! - **MapSurface**: capability interface of the map the bins are drawn on
//! - **BinRecordStore**: bins keyed by id, each owning the marker that draws it
//! - **BinMap**: interprets map events, emits backend requests and reconciles
//!   their completions
//!
//! The crate does no IO. Requests are plain values; whoever dispatches them
//! reports back with a [`SyncCompletion`].
//!
//! # Example
//!
//! ```
//! use kerbside_core::{
//!     Bin, BinMap, FillLevel, MapEvent, MemorySurface, Priority, SyncCompletion, SyncRequest,
//!     SyncResponse,
//! };
//!
//! let mut map = BinMap::new(MemorySurface::new());
//! let load = map.mount().unwrap();
//! assert_eq!(load.request, SyncRequest::ListBins);
//!
//! // Pretend the backend answered.
//! map.apply(SyncCompletion {
//!     ticket: load.ticket,
//!     result: Ok(SyncResponse::Listed(vec![Bin {
//!         id: "BIN-1".to_string(),
//!         lat: 6.93,
//!         lng: 79.86,
//!         fill_level: FillLevel::new(70),
//!         priority: Priority::Medium,
//!     }])),
//! });
//! assert_eq!(map.surface().marker_count(), 1);
//!
//! // Clicks only create bins while placing.
//! assert!(map.handle_event(MapEvent::PrimaryClick { lat: 6.9, lng: 79.8 }).is_none());
//! map.toggle_placement();
//! assert!(map.handle_event(MapEvent::PrimaryClick { lat: 6.9, lng: 79.8 }).is_some());
//! ```

mod bin;
mod map;
mod menu;
mod placement;
pub mod serde_helpers;
mod store;
mod surface;
mod sync;

pub use bin::{Bin, BinId, FillLevel, FillStatus, NewBin, Priority};
pub use map::{BinMap, valid_coordinate};
pub use menu::{ContextMenu, MenuAction, MenuState};
pub use placement::PlacementMode;
pub use store::{BinEntry, BinRecordStore, BinSnapshot};
pub use surface::{DrawnMarker, MapEvent, MapSurface, MarkerHandle, MemorySurface, ScreenPoint};
pub use sync::{
    Notice, NoticeLevel, PendingRequest, SyncCompletion, SyncFailure, SyncRequest, SyncResponse,
    Ticket,
};
