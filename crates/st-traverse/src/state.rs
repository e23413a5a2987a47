//! Immutable search states.
//!
//! A [`State`] is one node of a search tree: where the traveller is, how long
//! it took and what it cost to get there, and in which mode.  States are
//! linked to their predecessor through an `Arc`, so a path is a singly linked
//! chain back to the root and branches of the search share their common
//! prefix.  New states are only ever produced by a
//! [`StateEditor`](crate::StateEditor).

use std::fmt;
use std::sync::Arc;

use st_core::{EdgeId, RentalFormFactor, RoutingPreferences, TraverseMode, VertexId};
use st_graph::Vertex;

use crate::editor::StateEditor;
use crate::request::StreetSearchRequest;

// ── Sub-states ────────────────────────────────────────────────────────────────

/// Where a traveller is in the vehicle-rental life cycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleRentalState {
    #[default]
    BeforeRenting,
    RentingFromStation,
    RentingFloating,
    HaveRented,
}

/// Kiss-and-ride progress.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CarPickupState {
    WalkToPickup,
    InCar,
    WalkFromDropOff,
}

/// The mode-related part of a state.  Copied into every successor and
/// changed only through the editor.
#[derive(Clone, Debug, PartialEq)]
pub struct StateData {
    pub(crate) current_mode: TraverseMode,
    pub(crate) back_mode: Option<TraverseMode>,
    pub(crate) back_walking_bike: bool,
    pub(crate) vehicle_parked: bool,
    pub(crate) rental_state: VehicleRentalState,
    pub(crate) may_keep_rented_vehicle: bool,
    pub(crate) rental_network: Option<Arc<str>>,
    pub(crate) rental_form_factor: Option<RentalFormFactor>,
    pub(crate) car_pickup_state: Option<CarPickupState>,
    pub(crate) entered_no_thru_traffic_area: bool,
    pub(crate) inside_no_rental_drop_off_area: bool,
    /// Networks whose no-drop-off zone contains the origin of an arrive-by
    /// rental search.
    pub(crate) no_drop_off_zones_at_start: Vec<Arc<str>>,
}

impl StateData {
    pub(crate) fn new(mode: TraverseMode) -> Self {
        Self {
            current_mode: mode,
            back_mode: None,
            back_walking_bike: false,
            vehicle_parked: false,
            rental_state: VehicleRentalState::BeforeRenting,
            may_keep_rented_vehicle: false,
            rental_network: None,
            rental_form_factor: None,
            car_pickup_state: None,
            entered_no_thru_traffic_area: false,
            inside_no_rental_drop_off_area: false,
            no_drop_off_zones_at_start: Vec::new(),
        }
    }

    /// One entry per universe a search starts in.
    fn initial(request: &StreetSearchRequest) -> Vec<StateData> {
        let mode = request.mode();
        let arrive_by = request.arrive_by();

        if let Some(form_factor) = mode.rental_form_factor() {
            if !arrive_by {
                return vec![StateData::new(TraverseMode::Walk)];
            }
            // Arriving: either the vehicle was already returned, or the
            // traveller is still riding one from an unknown network.
            let mut have_rented = StateData::new(TraverseMode::Walk);
            have_rented.rental_state = VehicleRentalState::HaveRented;
            have_rented.rental_form_factor = Some(form_factor);

            let mut floating = StateData::new(form_factor.traverse_mode());
            floating.rental_state = VehicleRentalState::RentingFloating;
            floating.rental_form_factor = Some(form_factor);

            let mut out = vec![have_rented, floating];
            if request.preferences().rental.allow_arriving_in_rented_vehicle {
                let mut kept = StateData::new(form_factor.traverse_mode());
                kept.rental_state = VehicleRentalState::RentingFromStation;
                kept.rental_form_factor = Some(form_factor);
                kept.may_keep_rented_vehicle = true;
                out.push(kept);
            }
            return out;
        }

        if mode.includes_pickup() {
            let mut walking = StateData::new(TraverseMode::Walk);
            walking.car_pickup_state = Some(if arrive_by {
                CarPickupState::WalkFromDropOff
            } else {
                CarPickupState::WalkToPickup
            });
            let mut in_car = StateData::new(TraverseMode::Car);
            in_car.car_pickup_state = Some(CarPickupState::InCar);
            return vec![walking, in_car];
        }

        if let Some(vehicle) = mode.parked_vehicle_mode() {
            if arrive_by {
                let mut parked = StateData::new(TraverseMode::Walk);
                parked.vehicle_parked = true;
                return vec![parked];
            }
            return vec![StateData::new(vehicle)];
        }

        vec![StateData::new(mode.initial_mode())]
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// One immutable node of a street search.
pub struct State {
    pub(crate) vertex: VertexId,
    pub(crate) back_edge: Option<EdgeId>,
    pub(crate) back_state: Option<Arc<State>>,
    pub(crate) time_ms: i64,
    pub(crate) weight: f64,
    pub(crate) walk_distance: f64,
    pub(crate) data: StateData,
    pub(crate) request: Arc<StreetSearchRequest>,
}

impl State {
    /// A root state at `vertex` with `data`.
    pub(crate) fn root(vertex: &Vertex, request: Arc<StreetSearchRequest>, mut data: StateData) -> Self {
        if request.arrive_by() && request.mode().includes_renting() {
            data.no_drop_off_zones_at_start = vertex.rental_restrictions().no_drop_off_networks();
        }
        Self {
            vertex: vertex.id(),
            back_edge: None,
            back_state: None,
            time_ms: request.start_time_ms(),
            weight: 0.0,
            walk_distance: 0.0,
            data,
            request,
        }
    }

    /// Every state a search for `request` starts in at `vertex`.
    ///
    /// Most modes start in a single state.  Arrive-by rental searches start
    /// both on foot having returned the vehicle and still riding one (plus
    /// kept-at-destination when allowed), kiss-and-ride starts both walking
    /// and in the car, and arrive-by park-and-ride starts parked.
    pub fn initial_states(vertex: &Vertex, request: &Arc<StreetSearchRequest>) -> Vec<Arc<State>> {
        StateData::initial(request)
            .into_iter()
            .filter_map(|data| {
                StateEditor::from_state(State::root(vertex, Arc::clone(request), data)).make_state()
            })
            .collect()
    }

    // ── Position and cost ─────────────────────────────────────────────────

    #[inline]
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    #[inline]
    pub fn back_edge(&self) -> Option<EdgeId> {
        self.back_edge
    }

    #[inline]
    pub fn back_state(&self) -> Option<&Arc<State>> {
        self.back_state.as_ref()
    }

    #[inline]
    pub fn request(&self) -> &StreetSearchRequest {
        &self.request
    }

    #[inline]
    pub fn preferences(&self) -> &RoutingPreferences {
        self.request.preferences()
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }

    /// Whole seconds, rounded towards the search origin so a path never
    /// looks shorter than it is.
    pub fn time_seconds(&self) -> i64 {
        if self.request.arrive_by() {
            self.time_ms.div_euclid(1000)
        } else {
            (self.time_ms + 999).div_euclid(1000)
        }
    }

    pub fn elapsed_time_ms(&self) -> i64 {
        (self.time_ms - self.request.start_time_ms()).abs()
    }

    /// Elapsed seconds, rounded up.
    pub fn elapsed_time_seconds(&self) -> i64 {
        (self.elapsed_time_ms() + 999) / 1000
    }

    /// Metres travelled outside a car, including the turn tie-breaker.
    #[inline]
    pub fn walk_distance(&self) -> f64 {
        self.walk_distance
    }

    // ── Mode ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn data(&self) -> &StateData {
        &self.data
    }

    #[inline]
    pub fn current_mode(&self) -> TraverseMode {
        self.data.current_mode
    }

    /// Mode used on the back edge; `None` at the root and after connector
    /// edges.
    #[inline]
    pub fn back_mode(&self) -> Option<TraverseMode> {
        self.data.back_mode
    }

    #[inline]
    pub fn is_back_walking_bike(&self) -> bool {
        self.data.back_walking_bike
    }

    #[inline]
    pub fn is_vehicle_parked(&self) -> bool {
        self.data.vehicle_parked
    }

    #[inline]
    pub fn car_pickup_state(&self) -> Option<CarPickupState> {
        self.data.car_pickup_state
    }

    #[inline]
    pub fn has_entered_no_thru_traffic_area(&self) -> bool {
        self.data.entered_no_thru_traffic_area
    }

    // ── Rental ────────────────────────────────────────────────────────────

    #[inline]
    pub fn rental_state(&self) -> VehicleRentalState {
        self.data.rental_state
    }

    /// Network of the rented vehicle; `None` when not renting or, in a
    /// reverse search, when the network is not known yet.
    #[inline]
    pub fn rental_network(&self) -> Option<&str> {
        self.data.rental_network.as_deref()
    }

    pub(crate) fn rental_network_shared(&self) -> Option<Arc<str>> {
        self.data.rental_network.clone()
    }

    #[inline]
    pub fn rental_form_factor(&self) -> Option<RentalFormFactor> {
        self.data.rental_form_factor
    }

    #[inline]
    pub fn may_keep_rented_vehicle_at_destination(&self) -> bool {
        self.data.may_keep_rented_vehicle
    }

    #[inline]
    pub fn is_inside_no_rental_drop_off_area(&self) -> bool {
        self.data.inside_no_rental_drop_off_area
    }

    #[inline]
    pub fn no_rental_drop_off_zones_at_start(&self) -> &[Arc<str>] {
        &self.data.no_drop_off_zones_at_start
    }

    pub fn is_renting(&self) -> bool {
        matches!(
            self.data.rental_state,
            VehicleRentalState::RentingFromStation | VehicleRentalState::RentingFloating
        )
    }

    pub fn is_renting_floating(&self) -> bool {
        self.data.rental_state == VehicleRentalState::RentingFloating
    }

    pub fn is_renting_from_station(&self) -> bool {
        self.data.rental_state == VehicleRentalState::RentingFromStation
    }

    pub fn is_compatible_rental_state(&self, other: &State) -> bool {
        self.data.rental_state == other.data.rental_state
            && self.data.may_keep_rented_vehicle == other.data.may_keep_rented_vehicle
    }

    fn rental_finished(&self) -> bool {
        match self.data.rental_state {
            VehicleRentalState::HaveRented => true,
            VehicleRentalState::RentingFloating => !self.data.inside_no_rental_drop_off_area,
            VehicleRentalState::RentingFromStation => {
                self.request.preferences().rental.allow_arriving_in_rented_vehicle
                    && self.data.may_keep_rented_vehicle
            }
            VehicleRentalState::BeforeRenting => false,
        }
    }

    /// Whether a path may end in this state.
    ///
    /// Rental searches may not end holding a vehicle that cannot be left
    /// here; park-and-ride searches must have parked (forward) or reached
    /// the vehicle (arrive-by).
    pub fn is_final(&self) -> bool {
        let mode = self.request.mode();
        let renting_ok;
        let parking_ok;
        if self.request.arrive_by() {
            renting_ok = !mode.includes_renting() || !self.is_renting();
            parking_ok = !mode.includes_parking() || !self.data.vehicle_parked;
        } else {
            renting_ok = !mode.includes_renting()
                || self.data.rental_state == VehicleRentalState::BeforeRenting
                || self.rental_finished();
            parking_ok = !mode.includes_parking() || self.data.vehicle_parked;
        }
        renting_ok && parking_ok
    }

    /// Whether any state on the chain up to the root is in a car.
    pub fn contains_mode_car(&self) -> bool {
        self.chain().any(|s| s.current_mode().is_in_car())
    }

    /// Whether every state on the chain walked without a bike.
    pub fn contains_only_walk_mode(&self) -> bool {
        self.chain()
            .all(|s| s.current_mode().is_walking() && !s.data.back_walking_bike)
    }

    /// Renting a vehicle whose network a reverse search has not seen yet.
    pub fn unknown_rental_network(&self) -> bool {
        self.is_renting() && self.data.rental_network.is_none()
    }

    /// Milliseconds spent on the back edge.
    pub fn time_delta_ms(&self) -> i64 {
        self.back_state.as_ref().map_or(0, |b| (self.time_ms - b.time_ms).abs())
    }

    /// Weight added by the back edge.
    pub fn weight_delta(&self) -> f64 {
        self.back_state.as_ref().map_or(0.0, |b| self.weight - b.weight)
    }

    /// This state followed by its predecessors up to the root.
    pub fn chain(&self) -> impl Iterator<Item = &State> {
        std::iter::successors(Some(self), |s| s.back_state.as_deref())
    }
}

impl Drop for State {
    // Unlink iteratively so dropping a long path cannot overflow the stack.
    fn drop(&mut self) {
        let mut next = self.back_state.take();
        while let Some(state) = next {
            match Arc::try_unwrap(state) {
                Ok(mut unique) => next = unique.back_state.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("vertex", &self.vertex)
            .field("back_edge", &self.back_edge)
            .field("time_ms", &self.time_ms)
            .field("weight", &self.weight)
            .field("walk_distance", &self.walk_distance)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
