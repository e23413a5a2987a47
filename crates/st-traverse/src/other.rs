//! Traversal of every edge kind that is not a street.

use std::sync::Arc;

use st_core::{RentalFormFactor, TraverseMode};
use st_graph::{
    EdgeKind, ElevatorHopEdge, EscalatorEdge, PathwayEdge, VehicleRentalEdge, VertexKind,
};

use crate::editor::StateEditor;
use crate::state::{State, VehicleRentalState};
use crate::traverse::{successors, EdgeContext, Successors};

fn finish(editor: StateEditor) -> Successors {
    successors([editor.make_state()])
}

/// Seconds as whole milliseconds, rounded up.
fn seconds_to_ms(seconds: f64) -> i64 {
    (1000.0 * seconds).ceil() as i64
}

fn back_edge_is(ctx: &EdgeContext<'_>, s0: &State, f: impl Fn(&EdgeKind) -> bool) -> bool {
    s0.back_edge()
        .and_then(|id| ctx.graph.edge(id))
        .is_some_and(|e| f(e.kind()))
}

// ── Connectors ────────────────────────────────────────────────────────────────

pub(crate) fn free(ctx: &EdgeContext<'_>, s0: &Arc<State>) -> Successors {
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.increment_weight(1.0);
    editor.set_back_mode(None);
    finish(editor)
}

pub(crate) fn street_transit_link(ctx: &EdgeContext<'_>, s0: &Arc<State>) -> Successors {
    if s0.current_mode().is_in_car() || s0.is_renting() {
        return Successors::new();
    }
    if s0.request().mode().includes_parking() && !s0.is_vehicle_parked() {
        return Successors::new();
    }
    // Two links in a row would be a shortcut through a stop.
    if back_edge_is(ctx, s0, |k| matches!(k, EdgeKind::StreetTransitLink)) {
        return Successors::new();
    }
    if s0.request().wheelchair() {
        let inaccessible = |kind: &VertexKind| {
            matches!(kind, VertexKind::TransitStop { wheelchair_accessible: false })
        };
        if inaccessible(ctx.from.kind()) || inaccessible(ctx.to.kind()) {
            return Successors::new();
        }
    }
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.increment_weight(1.0);
    editor.set_back_mode(None);
    finish(editor)
}

pub(crate) fn vehicle_parking_link(ctx: &EdgeContext<'_>, s0: &Arc<State>) -> Successors {
    if back_edge_is(ctx, s0, |k| matches!(k, EdgeKind::VehicleParkingLink)) {
        return Successors::new();
    }
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.increment_weight(1.0);
    editor.set_back_mode(None);
    finish(editor)
}

// ── Elevators and escalators ──────────────────────────────────────────────────

fn driving_or_walking(mode: TraverseMode) -> TraverseMode {
    if mode.is_in_car() { TraverseMode::Car } else { TraverseMode::Walk }
}

pub(crate) fn elevator_board(ctx: &EdgeContext<'_>, s0: &Arc<State>) -> Successors {
    let elevator = &s0.preferences().elevator;
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.set_back_mode(Some(driving_or_walking(s0.current_mode())));
    editor.increment_weight(elevator.board_cost);
    editor.increment_time_s(elevator.board_time_s);
    finish(editor)
}

pub(crate) fn elevator_hop(ctx: &EdgeContext<'_>, hop: &ElevatorHopEdge, s0: &Arc<State>) -> Successors {
    if s0.request().wheelchair() && !hop.wheelchair_accessible {
        return Successors::new();
    }
    if !hop.permission.allows(s0.current_mode()) {
        return Successors::new();
    }
    let elevator = &s0.preferences().elevator;
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.set_back_mode(Some(driving_or_walking(s0.current_mode())));
    editor.increment_weight(hop.levels * elevator.hop_cost);
    match hop.travel_time_s {
        Some(seconds) => editor.increment_time_s(seconds),
        None => editor.increment_time_ms(seconds_to_ms(hop.levels * f64::from(elevator.hop_time_s))),
    }
    finish(editor)
}

pub(crate) fn elevator_alight(ctx: &EdgeContext<'_>, s0: &Arc<State>) -> Successors {
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.set_back_mode(Some(driving_or_walking(s0.current_mode())));
    editor.increment_weight(1.0);
    finish(editor)
}

pub(crate) fn escalator(ctx: &EdgeContext<'_>, escalator: &EscalatorEdge, s0: &Arc<State>) -> Successors {
    if s0.current_mode() != TraverseMode::Walk || s0.request().wheelchair() {
        return Successors::new();
    }
    let walk = &s0.preferences().walk;
    let time_s = escalator.duration_s.unwrap_or(escalator.length_m / walk.escalator_speed);
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.set_back_mode(Some(TraverseMode::Walk));
    editor.increment_weight(walk.escalator_reluctance * time_s);
    editor.increment_time_ms(time_s.round() as i64 * 1000);
    editor.increment_walk_distance(escalator.length_m);
    finish(editor)
}

pub(crate) fn pathway(ctx: &EdgeContext<'_>, pathway: &PathwayEdge, s0: &Arc<State>) -> Successors {
    if s0.current_mode().is_in_car() {
        return Successors::new();
    }
    if s0.request().wheelchair() && !pathway.wheelchair_accessible {
        return Successors::new();
    }
    let walk = &s0.preferences().walk;
    let stairs = pathway.steps > 0;
    let time_s = match pathway.traversal_time_s {
        Some(seconds) => f64::from(seconds),
        None if stairs => pathway.length_m / walk.speed * walk.stairs_time_factor,
        None => pathway.length_m / walk.speed,
    };
    let mut weight = time_s * walk.reluctance;
    if stairs {
        weight *= walk.stairs_reluctance;
    }
    let mut editor = s0.edit(ctx.id, ctx.edge);
    editor.set_back_mode(Some(TraverseMode::Walk));
    editor.increment_weight(weight);
    editor.increment_time_ms(seconds_to_ms(time_s));
    editor.increment_walk_distance(pathway.length_m);
    finish(editor)
}

// ── Park and ride ─────────────────────────────────────────────────────────────

fn has_places_for(kind: &VertexKind, vehicle: TraverseMode) -> bool {
    match *kind {
        VertexKind::VehicleParking { car_places, bicycle_places } => match vehicle {
            TraverseMode::Car => car_places,
            TraverseMode::Bicycle => bicycle_places,
            TraverseMode::Walk | TraverseMode::Scooter => false,
        },
        _ => false,
    }
}

/// Parking the private vehicle; un-parking it in an arrive-by search.
pub(crate) fn vehicle_parking(ctx: &EdgeContext<'_>, s0: &Arc<State>) -> Successors {
    let Some(vehicle) = s0.request().mode().parked_vehicle_mode() else {
        return Successors::new();
    };
    if !has_places_for(ctx.from.kind(), vehicle) {
        return Successors::new();
    }

    let mut editor = s0.edit(ctx.id, ctx.edge);
    if s0.request().arrive_by() {
        if s0.current_mode() != TraverseMode::Walk || !s0.is_vehicle_parked() {
            return Successors::new();
        }
        editor.set_vehicle_parked(false, vehicle);
    } else {
        if s0.is_vehicle_parked() || s0.current_mode() != vehicle {
            return Successors::new();
        }
        editor.set_vehicle_parked(true, TraverseMode::Walk);
    }
    let parking = &s0.preferences().parking;
    editor.set_back_mode(None);
    editor.increment_weight(parking.park_cost);
    editor.increment_time_s(parking.park_time_s);
    finish(editor)
}

// ── Vehicle rental ────────────────────────────────────────────────────────────

/// A known network must match; an unknown one matches anything.
fn compatible_network(place: &str, state: Option<&str>) -> bool {
    state.is_none_or(|n| n == place)
}

pub(crate) fn vehicle_rental(ctx: &EdgeContext<'_>, rental: &VehicleRentalEdge, s0: &Arc<State>) -> Successors {
    let request = s0.request();
    let VertexKind::VehicleRentalPlace { network: place, floating, allows_drop_off, .. } = ctx.from.kind()
    else {
        return Successors::new();
    };
    let (floating, allows_drop_off) = (*floating, *allows_drop_off);
    let form_factor: RentalFormFactor = rental.form_factor;
    if request.mode().rental_form_factor() != Some(form_factor) {
        return Successors::new();
    }
    let prefs = s0.preferences();
    if !prefs.rental.network_allowed(place) {
        return Successors::new();
    }
    let place_network: &str = place;
    let network = Some(Arc::clone(place));

    let mut editor = s0.edit(ctx.id, ctx.edge);
    let picked_up = if request.arrive_by() {
        match s0.rental_state() {
            VehicleRentalState::BeforeRenting => return Successors::new(),
            VehicleRentalState::HaveRented => {
                if !allows_drop_off {
                    return Successors::new();
                }
                editor.drop_off_rented_vehicle_at_station(form_factor, network, true);
                false
            }
            VehicleRentalState::RentingFloating => {
                if !floating || !compatible_network(place_network, s0.rental_network()) {
                    return Successors::new();
                }
                // The search started where this network bans drop-off, so a
                // vehicle of this network cannot have been left there.
                if s0.rental_network().is_none()
                    && s0.no_rental_drop_off_zones_at_start().iter().any(|n| &**n == place_network)
                {
                    return Successors::new();
                }
                editor.begin_floating_vehicle_renting(form_factor, network, true);
                true
            }
            VehicleRentalState::RentingFromStation => {
                if !compatible_network(place_network, s0.rental_network()) {
                    return Successors::new();
                }
                editor.begin_vehicle_renting_at_station(form_factor, network, false, true);
                true
            }
        }
    } else {
        match s0.rental_state() {
            VehicleRentalState::BeforeRenting => {
                if floating {
                    editor.begin_floating_vehicle_renting(form_factor, network, false);
                } else {
                    let may_keep = prefs.rental.allow_arriving_in_rented_vehicle;
                    editor.begin_vehicle_renting_at_station(form_factor, network, may_keep, false);
                }
                true
            }
            VehicleRentalState::HaveRented | VehicleRentalState::RentingFloating => {
                return Successors::new();
            }
            VehicleRentalState::RentingFromStation => {
                if !compatible_network(place_network, s0.rental_network()) || !allows_drop_off {
                    return Successors::new();
                }
                editor.drop_off_rented_vehicle_at_station(form_factor, network, false);
                false
            }
        }
    };

    let rental_prefs = &prefs.rental;
    if picked_up {
        editor.increment_weight(rental_prefs.pickup_cost);
        editor.increment_time_s(rental_prefs.pickup_time_s);
    } else {
        editor.increment_weight(rental_prefs.drop_off_cost);
        editor.increment_time_s(rental_prefs.drop_off_time_s);
    }
    editor.set_back_mode(None);
    finish(editor)
}
