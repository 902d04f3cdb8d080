use std::collections::{BTreeMap, VecDeque};

use log::{debug, info, warn};

use crate::bin::{FillLevel, NewBin, Priority};
use crate::menu::{ContextMenu, MenuAction};
use crate::placement::PlacementMode;
use crate::store::{BinRecordStore, BinSnapshot};
use crate::surface::{MapEvent, MapSurface};
use crate::sync::{Notice, PendingRequest, SyncCompletion, SyncRequest, SyncResponse, Ticket};

type FillSeed = Box<dyn FnMut() -> FillLevel + Send>;

/// The interactive bin map.
///
/// Interprets surface events, emits backend requests and reconciles their
/// completions into the bin record store. It performs no IO itself: the
/// caller dispatches every returned [`PendingRequest`] and feeds the result
/// back through [`BinMap::apply`]. Requests are independent; a failed one
/// never touches state owned by another.
pub struct BinMap<S: MapSurface> {
    surface: S,
    store: BinRecordStore,
    placement: PlacementMode,
    menu: ContextMenu,
    in_flight: BTreeMap<Ticket, SyncRequest>,
    next_ticket: u64,
    notices: VecDeque<Notice>,
    mounted: bool,
    new_bin_priority: Priority,
    fill_seed: FillSeed,
}

impl<S: MapSurface> BinMap<S> {
    /// Creates a bin map drawing on `surface`. Nothing is loaded until
    /// [`BinMap::mount`] is called.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            store: BinRecordStore::new(),
            placement: PlacementMode::default(),
            menu: ContextMenu::new(),
            in_flight: BTreeMap::new(),
            next_ticket: 0,
            notices: VecDeque::new(),
            mounted: false,
            new_bin_priority: Priority::default(),
            fill_seed: Box::new(FillLevel::random),
        }
    }

    /// Priority given to bins placed from the map.
    pub fn with_new_bin_priority(mut self, priority: Priority) -> Self {
        self.new_bin_priority = priority;
        self
    }

    /// Source of fill levels for bins placed from the map.
    pub fn with_fill_seed(mut self, seed: impl FnMut() -> FillLevel + Send + 'static) -> Self {
        self.fill_seed = Box::new(seed);
        self
    }

    /// Requests the initial bin list. Returns `None` if already mounted.
    pub fn mount(&mut self) -> Option<PendingRequest> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(self.issue(SyncRequest::ListBins))
    }

    /// Removes every marker and hands the surface back for disposal.
    ///
    /// Completions arriving afterwards have nowhere to go and are dropped
    /// with the map.
    pub fn unmount(mut self) -> S {
        self.menu.close();
        self.store.clear(&mut self.surface);
        if !self.in_flight.is_empty() {
            debug!("unmounting with {} request(s) in flight", self.in_flight.len());
        }
        self.surface
    }

    /// Interprets one surface event. Returns a request to dispatch, if any.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<PendingRequest> {
        match event {
            MapEvent::PrimaryClick { lat, lng } => {
                self.menu.close();
                if !self.placement.is_placing() {
                    return None;
                }
                if !valid_coordinate(lat, lng) {
                    debug!("ignoring click outside the globe at ({}, {})", lat, lng);
                    return None;
                }
                let new = NewBin {
                    lat,
                    lng,
                    fill_level: (self.fill_seed)(),
                    priority: self.new_bin_priority,
                };
                Some(self.issue(SyncRequest::CreateBin(new)))
            }
            MapEvent::MarkerSecondaryClick { id, at } => {
                if self.store.contains(&id) {
                    self.menu.open(id, at);
                } else {
                    debug!("secondary click on unknown bin {}", id);
                }
                None
            }
            MapEvent::ViewportChange | MapEvent::MenuPointerLeave => {
                self.menu.close();
                None
            }
        }
    }

    pub fn toggle_placement(&mut self) {
        self.placement.toggle();
        info!("placement mode: {}", self.placement.label());
    }

    /// Runs a menu action on the targeted bin and closes the menu.
    ///
    /// The menu closes whether or not a request results; choosing the
    /// bin's current priority sends nothing.
    pub fn choose(&mut self, action: MenuAction) -> Option<PendingRequest> {
        let (id, action) = self.menu.take(action)?;
        let entry = self.store.get(&id)?;

        match action {
            MenuAction::Delete => Some(self.issue(SyncRequest::DeleteBin(id))),
            MenuAction::SetPriority(priority) if priority == entry.bin().priority => None,
            MenuAction::SetPriority(priority) => {
                Some(self.issue(SyncRequest::UpdatePriority { id, priority }))
            }
        }
    }

    /// Runs the highlighted menu action.
    pub fn choose_selected(&mut self) -> Option<PendingRequest> {
        let action = self.menu.state()?.selected_action();
        self.choose(action)
    }

    pub fn menu_up(&mut self) {
        self.menu.select_up();
    }

    pub fn menu_down(&mut self) {
        self.menu.select_down();
    }

    pub fn close_menu(&mut self) {
        self.menu.close();
    }

    /// Reconciles a finished request into the store.
    pub fn apply(&mut self, completion: SyncCompletion) {
        let Some(request) = self.in_flight.remove(&completion.ticket) else {
            warn!("completion for unknown request {}", completion.ticket);
            return;
        };

        match completion.result {
            Ok(response) => self.apply_response(response),
            Err(failure) if request == SyncRequest::ListBins => {
                warn!("failed to load bins: {}", failure);
            }
            Err(failure) => {
                warn!("failed to {}: {}", request.describe(), failure);
                self.notices.push_back(Notice::error(format!(
                    "Could not {}: {}",
                    request.describe(),
                    failure.user_message()
                )));
            }
        }
    }

    fn apply_response(&mut self, response: SyncResponse) {
        match response {
            SyncResponse::Listed(bins) => {
                info!("loaded {} bin(s)", bins.len());
                self.store.load(&mut self.surface, bins);
                let stale = self
                    .menu
                    .target()
                    .is_some_and(|target| !self.store.contains(target));
                if stale {
                    self.menu.close();
                }
            }
            SyncResponse::Created(bin) => {
                if bin.id.trim().is_empty() {
                    warn!("backend created a bin without an id");
                    self.notices
                        .push_back(Notice::error("Could not add bin: backend returned no id"));
                    return;
                }
                info!("created bin {}", bin.id);
                let id = bin.id.clone();
                self.store.place(&mut self.surface, bin);
                self.notices.push_back(Notice::info(format!("Added bin {}", id)));
            }
            SyncResponse::Deleted(id) => {
                self.menu.close_if_targets(&id);
                if self.store.remove(&mut self.surface, &id) {
                    info!("deleted bin {}", id);
                    self.notices.push_back(Notice::info(format!("Deleted bin {}", id)));
                } else {
                    debug!("delete confirmed for absent bin {}", id);
                }
            }
            SyncResponse::PriorityUpdated { id, priority } => {
                if self.store.set_priority(&mut self.surface, &id, priority) {
                    info!("bin {} priority set to {}", id, priority);
                } else {
                    debug!("priority confirmed for absent bin {}", id);
                }
            }
        }
    }

    fn issue(&mut self, request: SyncRequest) -> PendingRequest {
        self.next_ticket += 1;
        let ticket = Ticket::new(self.next_ticket);
        debug!("issuing {} {}", ticket, request.describe());
        self.in_flight.insert(ticket, request.clone());
        PendingRequest { ticket, request }
    }

    /// Removes and returns queued notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn store(&self) -> &BinRecordStore {
        &self.store
    }

    pub fn snapshot(&self) -> BinSnapshot {
        self.store.snapshot()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn placement(&self) -> PlacementMode {
        self.placement
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a delete or priority change for `id` is outstanding.
    pub fn is_pending(&self, id: &str) -> bool {
        self.in_flight.values().any(|r| r.bin_id() == Some(id))
    }

    /// Whether the initial load is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.values().any(|r| *r == SyncRequest::ListBins)
    }
}

/// Whether `(lat, lng)` lies on the globe.
pub fn valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
