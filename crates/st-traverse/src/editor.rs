//! The only way to make a new [`State`].
//!
//! An editor starts as a copy of its parent with the back edge and vertex
//! already advanced, collects increments and mode changes, and is turned into
//! a state by [`StateEditor::make_state`].  Any invalid increment marks the
//! traversal defective: the problem is logged and `make_state` yields `None`
//! so the search sees a dead end instead of a corrupt path.

use std::sync::Arc;

use log::{error, warn};

use st_core::{EdgeId, RentalFormFactor, TraverseMode};
use st_graph::{Edge, Vertex};

use crate::request::StreetSearchRequest;
use crate::state::{CarPickupState, State, StateData, VehicleRentalState};

#[derive(Debug)]
pub struct StateEditor {
    child: State,
    defective: bool,
}

impl State {
    /// Open an editor for traversing `edge` (with id `id`) from this state.
    ///
    /// The child is placed at the edge's far end in search direction.  If
    /// this state is not at the near end the editor is defective.
    pub fn edit(self: &Arc<Self>, id: EdgeId, edge: &Edge) -> StateEditor {
        let arrive_by = self.request.arrive_by();
        let (entry, exit) = if arrive_by { (edge.to(), edge.from()) } else { (edge.from(), edge.to()) };
        let mut defective = false;
        if self.vertex != entry {
            error!(
                "state at {} cannot traverse {id} ({} -> {}) in {} search",
                self.vertex,
                edge.from(),
                edge.to(),
                if arrive_by { "arrive-by" } else { "depart-after" },
            );
            defective = true;
        }
        StateEditor {
            child: State {
                vertex: exit,
                back_edge: Some(id),
                back_state: Some(Arc::clone(self)),
                time_ms: self.time_ms,
                weight: self.weight,
                walk_distance: self.walk_distance,
                data: self.data.clone(),
                request: Arc::clone(&self.request),
            },
            defective,
        }
    }
}

impl StateEditor {
    /// An editor for a fresh root at `vertex`, starting in the request's
    /// initial traverse mode.
    pub fn initial(vertex: &Vertex, request: Arc<StreetSearchRequest>) -> Self {
        let data = StateData::new(request.mode().initial_mode());
        Self::from_state(State::root(vertex, request, data))
    }

    pub(crate) fn from_state(child: State) -> Self {
        Self { child, defective: false }
    }

    /// Freeze the edits.  `None` if the traversal was marked defective.
    pub fn make_state(self) -> Option<Arc<State>> {
        if self.defective {
            return None;
        }
        if let Some(parent) = &self.child.back_state {
            if self.child.weight < parent.weight {
                error!(
                    "weight decreased from {} to {} at {}",
                    parent.weight, self.child.weight, self.child.vertex
                );
                return None;
            }
        }
        Some(Arc::new(self.child))
    }

    #[inline]
    pub fn is_defective(&self) -> bool {
        self.defective
    }

    /// Read-only view of the state being built.
    #[inline]
    pub fn state(&self) -> &State {
        &self.child
    }

    fn request(&self) -> &StreetSearchRequest {
        &self.child.request
    }

    // ── Increments ────────────────────────────────────────────────────────

    pub fn increment_weight(&mut self, weight: f64) {
        if weight.is_nan() || weight < 0.0 {
            error!("invalid weight increment {weight} at {}", self.child.vertex);
            self.defective = true;
            return;
        }
        self.child.weight += weight;
    }

    /// Advance the clock by `ms`, backwards in an arrive-by search.
    pub fn increment_time_ms(&mut self, ms: i64) {
        if ms < 0 {
            error!("invalid time increment {ms} ms at {}", self.child.vertex);
            self.defective = true;
            return;
        }
        if self.request().arrive_by() {
            self.child.time_ms -= ms;
        } else {
            self.child.time_ms += ms;
        }
    }

    pub fn increment_time_s(&mut self, seconds: u32) {
        self.increment_time_ms(i64::from(seconds) * 1000);
    }

    pub fn increment_walk_distance(&mut self, metres: f64) {
        if metres.is_nan() || metres < 0.0 {
            error!("invalid walk distance increment {metres} at {}", self.child.vertex);
            self.defective = true;
            return;
        }
        self.child.walk_distance += metres;
    }

    // ── Mode ──────────────────────────────────────────────────────────────

    pub fn set_back_mode(&mut self, mode: Option<TraverseMode>) {
        self.child.data.back_mode = mode;
    }

    pub fn set_back_walking_bike(&mut self, walking_bike: bool) {
        self.child.data.back_walking_bike = walking_bike;
    }

    /// Park (or, reversed, un-park) the private vehicle and continue in `mode`.
    pub fn set_vehicle_parked(&mut self, parked: bool, mode: TraverseMode) {
        self.child.data.vehicle_parked = parked;
        self.child.data.current_mode = mode;
    }

    /// Moving into the car switches the mode to `Car`; every other
    /// kiss-and-ride state walks.
    pub fn set_car_pickup_state(&mut self, state: CarPickupState) {
        self.child.data.car_pickup_state = Some(state);
        self.child.data.current_mode = match state {
            CarPickupState::InCar => TraverseMode::Car,
            CarPickupState::WalkToPickup | CarPickupState::WalkFromDropOff => TraverseMode::Walk,
        };
    }

    pub fn set_entered_no_thru_traffic_area(&mut self) {
        self.child.data.entered_no_thru_traffic_area = true;
    }

    pub fn enter_no_rental_drop_off_area(&mut self) {
        self.child.data.inside_no_rental_drop_off_area = true;
    }

    pub fn leave_no_rental_drop_off_area(&mut self) {
        self.child.data.inside_no_rental_drop_off_area = false;
    }

    /// Forget the start-zone networks once a concrete network was chosen.
    pub fn reset_started_in_no_drop_off_zone(&mut self) {
        self.child.data.no_drop_off_zones_at_start.clear();
    }

    // ── Rental ────────────────────────────────────────────────────────────
    //
    // Each transition takes `reverse`.  In an arrive-by search the vehicle
    // life cycle runs backwards, so "begin renting" returns to the walking
    // state before the rental and "drop off" resumes riding.

    pub fn begin_floating_vehicle_renting(
        &mut self,
        form_factor: RentalFormFactor,
        network: Option<Arc<str>>,
        reverse: bool,
    ) {
        let data = &mut self.child.data;
        if reverse {
            data.may_keep_rented_vehicle = false;
            data.rental_state = VehicleRentalState::BeforeRenting;
            data.current_mode = TraverseMode::Walk;
            data.rental_network = None;
            data.rental_form_factor = None;
            data.back_walking_bike = false;
        } else {
            data.rental_state = VehicleRentalState::RentingFloating;
            data.current_mode = form_factor.traverse_mode();
            data.rental_network = network;
            data.rental_form_factor = Some(form_factor);
        }
    }

    pub fn begin_vehicle_renting_at_station(
        &mut self,
        form_factor: RentalFormFactor,
        network: Option<Arc<str>>,
        may_keep_at_destination: bool,
        reverse: bool,
    ) {
        let data = &mut self.child.data;
        if reverse {
            data.may_keep_rented_vehicle = may_keep_at_destination;
            data.rental_state = VehicleRentalState::BeforeRenting;
            data.current_mode = TraverseMode::Walk;
            data.rental_network = None;
            data.rental_form_factor = None;
            data.back_walking_bike = false;
        } else {
            data.may_keep_rented_vehicle = may_keep_at_destination;
            data.rental_state = VehicleRentalState::RentingFromStation;
            data.current_mode = form_factor.traverse_mode();
            data.rental_network = network;
            data.rental_form_factor = Some(form_factor);
        }
    }

    /// Leave a floating vehicle where the state is.
    ///
    /// Reversed, this picks one up: the form factor falls back to the
    /// request's rental mode when the state does not know it yet.
    pub fn drop_floating_vehicle(
        &mut self,
        form_factor: Option<RentalFormFactor>,
        network: Option<Arc<str>>,
        reverse: bool,
    ) {
        if reverse {
            let form_factor = form_factor.or_else(|| self.request().mode().rental_form_factor());
            let Some(form_factor) = form_factor else {
                warn!("cannot resume renting at {}: no rental form factor", self.child.vertex);
                self.defective = true;
                return;
            };
            let data = &mut self.child.data;
            data.may_keep_rented_vehicle = false;
            data.rental_state = VehicleRentalState::RentingFloating;
            data.current_mode = form_factor.traverse_mode();
            data.rental_network = network;
            data.rental_form_factor = Some(form_factor);
        } else {
            let data = &mut self.child.data;
            data.may_keep_rented_vehicle = false;
            data.rental_state = VehicleRentalState::HaveRented;
            data.current_mode = TraverseMode::Walk;
            data.rental_network = None;
            data.rental_form_factor = None;
            data.back_walking_bike = false;
        }
    }

    pub fn drop_off_rented_vehicle_at_station(
        &mut self,
        form_factor: RentalFormFactor,
        network: Option<Arc<str>>,
        reverse: bool,
    ) {
        let data = &mut self.child.data;
        if reverse {
            data.may_keep_rented_vehicle = false;
            data.rental_state = VehicleRentalState::RentingFromStation;
            data.current_mode = form_factor.traverse_mode();
            data.rental_network = network;
            data.rental_form_factor = Some(form_factor);
        } else {
            data.may_keep_rented_vehicle = false;
            data.rental_state = VehicleRentalState::HaveRented;
            data.current_mode = TraverseMode::Walk;
            data.rental_network = None;
            data.rental_form_factor = None;
            data.back_walking_bike = false;
        }
    }
}
