//! Street-edge traversal.
//!
//! # Order of checks
//!
//! Rental geofencing comes first because it can replace the mode for the
//! whole edge; then bicycles may fall back to walking the bike; then the
//! plain permission check.  After the main successor is built, up to one
//! extra universe is forked off:
//!
//! | Situation                                    | Successors                         |
//! |----------------------------------------------|------------------------------------|
//! | entering a no-drop-off zone while renting    | drop-and-walk, keep riding         |
//! | arrive-by, leaving a restricted zone on foot | walk, resume riding                |
//! | kiss-and-ride, car allowed                   | in car, keep walking               |
//! | kiss-and-ride, car no longer allowed         | drop-off-and-walk only             |
//!
//! The main successor is built by `do_traverse`, which
//! applies the cost model:
//!
//! 1. refuse U-turns onto the reverse of the back edge;
//! 2. record or refuse no-thru-traffic transitions;
//! 3. track the rental no-drop-off area;
//! 4. time and weight for the mode (cycling optimise type, walking safety
//!    blend or wheelchair reluctance, driving reluctance);
//! 5. turn restrictions and intersection duration if the back edge is a
//!    street;
//! 6. mount/dismount penalty, walk distance, cost extension.

use std::sync::Arc;

use log::debug;

use st_core::{OptimizeType, RoutingPreferences, TraverseMode};
use st_graph::{Edge, StreetEdge};

use crate::editor::StateEditor;
use crate::reluctance::{compute_reluctance, compute_wheelchair_reluctance};
use crate::state::{CarPickupState, State, VehicleRentalState};
use crate::traverse::{successors, EdgeContext, Successors};

/// Bicycle safety factor at or below which `SafestStreets` discounts an
/// edge further.
const SAFEST_STREETS_SAFETY_FACTOR: f32 = 0.1;
const SAFEST_STREETS_DISCOUNT: f64 = 0.66;

struct TraversalCosts {
    time_s: f64,
    weight: f64,
}

/// Metres per second for `mode` on `street`.
///
/// Stairs slow every mode except cars by the walk stairs time factor.
pub fn calculate_speed(
    prefs: &RoutingPreferences,
    mode: TraverseMode,
    walking_bike: bool,
    street: &StreetEdge,
) -> f64 {
    let speed = match mode {
        TraverseMode::Walk if walking_bike => prefs.bike.walking.speed,
        TraverseMode::Walk => prefs.walk.speed,
        TraverseMode::Bicycle => prefs.bike.speed,
        TraverseMode::Scooter => prefs.scooter.speed,
        TraverseMode::Car => f64::from(street.car_speed()),
    };
    if street.is_stairs() && !mode.is_in_car() {
        speed / prefs.walk.stairs_time_factor
    } else {
        speed
    }
}

pub(crate) struct StreetTraversal<'a, 'g> {
    ctx: &'a EdgeContext<'g>,
    street: &'g StreetEdge,
    s0: &'a Arc<State>,
}

impl<'a, 'g> StreetTraversal<'a, 'g> {
    pub(crate) fn new(ctx: &'a EdgeContext<'g>, street: &'g StreetEdge, s0: &'a Arc<State>) -> Self {
        Self { ctx, street, s0 }
    }

    fn arrive_by(&self) -> bool {
        self.s0.request().arrive_by()
    }

    fn prefs(&self) -> &RoutingPreferences {
        self.s0.preferences()
    }

    /// Permission check including barriers at either end.
    fn can_traverse(&self, mode: TraverseMode) -> bool {
        self.ctx.graph.can_traverse_with_barriers(self.ctx.id, mode)
    }

    fn back_street(&self) -> Option<&'g StreetEdge> {
        self.ctx.graph.edge(self.s0.back_edge()?)?.as_street()
    }

    // ── Rental predicates ─────────────────────────────────────────────────

    fn to_traversal_banned(&self) -> bool {
        self.ctx.to.rental_traversal_banned(self.s0.is_renting(), self.s0.rental_network())
    }

    fn drop_off_banned_at_from(&self) -> bool {
        self.ctx.from.rental_drop_off_banned(self.s0.is_renting(), self.s0.rental_network())
    }

    fn drop_off_banned_at_to(&self) -> bool {
        self.ctx.to.rental_drop_off_banned(self.s0.is_renting(), self.s0.rental_network())
    }

    /// A reverse search that started on foot in a zone with rental
    /// restrictions reaches the edge of the zone, where a vehicle may have
    /// been picked up.
    fn leaves_restricted_zone_having_rented(&self) -> bool {
        self.s0.rental_state() == VehicleRentalState::HaveRented
            && !self.ctx.from.rental_restrictions().has_restrictions()
            && self.ctx.to.rental_restrictions().has_restrictions()
    }

    fn exits_start_no_drop_off_zone(&self) -> bool {
        self.s0.current_mode() == TraverseMode::Walk
            && !self.s0.no_rental_drop_off_zones_at_start().is_empty()
            && self.ctx.from.rental_restrictions().no_drop_off_networks().is_empty()
            && !self.ctx.to.rental_restrictions().no_drop_off_networks().is_empty()
    }

    // ── Kiss-and-ride predicates ──────────────────────────────────────────

    fn can_pickup_and_drive(&self) -> bool {
        self.s0.request().mode().includes_pickup()
            && self.s0.car_pickup_state()
                == Some(if self.arrive_by() { CarPickupState::InCar } else { CarPickupState::WalkToPickup })
    }

    fn can_drop_off_after_driving(&self) -> bool {
        self.s0.request().mode().includes_pickup()
            && self.s0.car_pickup_state()
                == Some(if self.arrive_by() { CarPickupState::WalkFromDropOff } else { CarPickupState::InCar })
    }

    fn drive_after_pickup(&self, editor: &mut StateEditor) {
        editor.set_car_pickup_state(if self.arrive_by() {
            CarPickupState::WalkToPickup
        } else {
            CarPickupState::InCar
        });
        editor.increment_time_s(self.prefs().car.pickup_time_s);
        editor.increment_weight(self.prefs().car.pickup_cost);
    }

    fn drop_off_after_driving(&self, editor: &mut StateEditor) {
        editor.set_car_pickup_state(if self.arrive_by() {
            CarPickupState::InCar
        } else {
            CarPickupState::WalkFromDropOff
        });
        editor.increment_time_s(self.prefs().car.pickup_time_s);
        editor.increment_weight(self.prefs().car.pickup_cost);
    }

    // ── Entry point ───────────────────────────────────────────────────────

    pub(crate) fn traverse(&self) -> Successors {
        let s0 = self.s0;
        let arrive_by = self.arrive_by();
        let renting_mode = s0.request().mode().includes_renting();
        let arrive_by_rental = renting_mode && arrive_by;

        let editor = if arrive_by_rental && self.to_traversal_banned() {
            return Successors::new();
        } else if arrive_by_rental && self.exits_start_no_drop_off_zone() {
            return self.split_after_exiting_start_zone();
        } else if renting_mode && self.to_traversal_banned() {
            // Not allowed to ride on: leave the vehicle and walk.
            self.walk_and_drop_vehicle()
        } else if arrive_by_rental && self.leaves_restricted_zone_having_rented() {
            self.walk_and_drop_vehicle()
        } else if s0.current_mode() == TraverseMode::Bicycle {
            if self.can_traverse(TraverseMode::Bicycle) {
                self.do_traverse(TraverseMode::Bicycle, false)
            } else if self.can_traverse(TraverseMode::Walk) {
                self.do_traverse(TraverseMode::Walk, true)
            } else {
                return Successors::new();
            }
        } else if self.can_traverse(s0.current_mode()) {
            self.do_traverse(s0.current_mode(), false)
        } else {
            None
        };

        let state = editor.and_then(StateEditor::make_state);

        if let Some(state) = &state {
            if !self.drop_off_banned_at_from() && self.drop_off_banned_at_to() {
                if let Some(mut after) = self.do_traverse(TraverseMode::Walk, false) {
                    after.drop_floating_vehicle(
                        state.rental_form_factor(),
                        state.rental_network_shared(),
                        arrive_by,
                    );
                    after.leave_no_rental_drop_off_area();
                    return successors([after.make_state(), Some(Arc::clone(state))]);
                }
            }

            // Keep walking too: the speculative vehicle may not exist.
            if arrive_by_rental && self.leaves_restricted_zone_having_rented() {
                let walking = self.do_traverse(TraverseMode::Walk, false).and_then(StateEditor::make_state);
                return successors([walking, Some(Arc::clone(state))]);
            }
        }

        if self.can_pickup_and_drive() && self.can_traverse(TraverseMode::Car) {
            if let Some(mut in_car) = self.do_traverse(TraverseMode::Car, false) {
                self.drive_after_pickup(&mut in_car);
                return successors([in_car.make_state(), state]);
            }
        }

        if self.can_drop_off_after_driving()
            && !self.street.permission().allows(TraverseMode::Car)
            && self.can_traverse(TraverseMode::Walk)
        {
            if let Some(mut drop_off) = self.do_traverse(TraverseMode::Walk, false) {
                self.drop_off_after_driving(&mut drop_off);
                return successors([drop_off.make_state()]);
            }
        }

        successors([state])
    }

    fn walk_and_drop_vehicle(&self) -> Option<StateEditor> {
        let mut editor = self.do_traverse(TraverseMode::Walk, false)?;
        editor.drop_floating_vehicle(
            self.s0.rental_form_factor(),
            self.s0.rental_network_shared(),
            self.arrive_by(),
        );
        Some(editor)
    }

    /// An arrive-by rental search that started in a no-drop-off zone leaves
    /// it on foot.  Fork one riding state per network whose zone it was,
    /// plus one for a vehicle of any network, next to the walking state.
    fn split_after_exiting_start_zone(&self) -> Successors {
        let mut out = Successors::new();
        if let Some(walking) = self.do_traverse(TraverseMode::Walk, false).and_then(StateEditor::make_state) {
            out.push(walking);
        }
        let mut has_network_states = false;
        for network in self.ctx.to.rental_restrictions().no_drop_off_networks() {
            if let Some(state) = self.resume_riding_after_zone(Some(network)) {
                out.push(state);
                has_network_states = true;
            }
        }
        if has_network_states {
            if let Some(state) = self.resume_riding_after_zone(None) {
                out.push(state);
            }
        }
        out
    }

    fn resume_riding_after_zone(&self, network: Option<Arc<str>>) -> Option<Arc<State>> {
        let mut editor = self.do_traverse(TraverseMode::Walk, false)?;
        editor.drop_floating_vehicle(self.s0.rental_form_factor(), network.clone(), self.arrive_by());
        if network.is_some() {
            editor.reset_started_in_no_drop_off_zone();
        }
        let state = editor.make_state()?;
        match network {
            Some(n) if !self.prefs().rental.network_allowed(&n) => None,
            _ => Some(state),
        }
    }

    // ── Cost model ────────────────────────────────────────────────────────

    /// Build the successor for traversing in `mode`, or `None` if the
    /// traversal is not allowed.
    fn do_traverse(&self, mode: TraverseMode, walking_bike: bool) -> Option<StateEditor> {
        let s0 = self.s0;
        let ctx = self.ctx;
        let street = self.street;
        let back = s0.back_edge().and_then(|id| ctx.graph.edge(id));

        if let Some(back) = back {
            if ctx.edge.is_reverse_of(back) || back.is_reverse_of(ctx.edge) {
                return None;
            }
        }

        let mut editor = s0.edit(ctx.id, ctx.edge);
        editor.set_back_mode(Some(mode));
        editor.set_back_walking_bike(walking_bike);

        if street.is_no_thru_traffic(mode) {
            if let Some(back_street) = back.and_then(Edge::as_street) {
                if !back_street.is_no_thru_traffic(mode) {
                    editor.set_entered_no_thru_traffic_area();
                }
            }
        } else if s0.has_entered_no_thru_traffic_area() {
            return None;
        }

        if s0.request().mode().includes_renting() {
            if self.drop_off_banned_at_to() {
                editor.enter_no_rental_drop_off_area();
            } else if s0.is_inside_no_rental_drop_off_area() {
                editor.leave_no_rental_drop_off_area();
            }
        }

        let prefs = self.prefs();
        let speed = calculate_speed(prefs, mode, walking_bike, street);
        if !(speed.is_finite() && speed > 0.0) {
            debug!("no usable {mode} speed ({speed}) on {}", ctx.id);
            return None;
        }

        let costs = match mode {
            TraverseMode::Bicycle | TraverseMode::Scooter => self.cycling_costs(mode, speed),
            TraverseMode::Walk => self.walking_costs(speed, walking_bike),
            TraverseMode::Car => {
                let time_s = street.distance_m() / speed;
                TraversalCosts {
                    time_s,
                    weight: time_s * compute_reluctance(prefs, mode, walking_bike, street.is_stairs()),
                }
            }
        };

        let mut time_ms = (1000.0 * costs.time_s).ceil() as i64;
        let mut weight = costs.weight;

        if let Some(back_street) = self.back_street() {
            let arrive_by = self.arrive_by();
            let back_id = s0.back_edge()?;
            let time_s = s0.time_seconds();
            let allowed = if arrive_by {
                street.can_turn_onto(ctx.graph, back_id, time_s, s0.back_mode())
            } else {
                back_street.can_turn_onto(ctx.graph, ctx.id, time_s, Some(mode))
            };
            if !allowed {
                return None;
            }

            let back_mode = s0.back_mode().unwrap_or(mode);
            let back_speed = calculate_speed(prefs, back_mode, s0.is_back_walking_bike(), back_street);
            let calculator = s0.request().intersection_calculator();
            let turn_s = if arrive_by && ctx.to.kind().is_intersection_like() {
                calculator.traversal_duration(ctx.to, street, back_street, back_mode, speed, back_speed)
            } else if !arrive_by && ctx.from.kind().is_intersection_like() {
                calculator.traversal_duration(ctx.from, back_street, street, mode, back_speed, speed)
            } else {
                debug!("not computing turn duration for {}", ctx.id);
                0.0
            };

            if !mode.is_in_car() {
                // Tie-breaker between otherwise equal walks.
                editor.increment_walk_distance(turn_s / 100.0);
            }
            time_ms += (1000.0 * turn_s).ceil() as i64;
            weight += prefs.street.turn_reluctance * turn_s;
        }

        if let Some(back_mode) = s0.back_mode() {
            let mounting = mode == TraverseMode::Bicycle && s0.is_back_walking_bike();
            let dismounting = walking_bike && back_mode == TraverseMode::Bicycle;
            if mounting || dismounting {
                let walking = &prefs.bike.walking;
                time_ms += i64::from(walking.mount_dismount_time_s) * 1000;
                weight += walking.mount_dismount_cost;
            }
        }

        if !mode.is_in_car() {
            editor.increment_walk_distance(street.distance_with_elevation());
        }

        if let Some(extension) = street.cost_extension() {
            weight += extension.extra_cost(mode, street.length_mm(), time_ms as f64 / 1000.0);
        }

        editor.increment_time_ms(time_ms);
        editor.increment_weight(weight);
        Some(editor)
    }

    fn cycling_costs(&self, mode: TraverseMode, speed: f64) -> TraversalCosts {
        let prefs = self.prefs();
        let street = self.street;
        let (optimize_type, triangle) = if mode == TraverseMode::Scooter {
            (prefs.scooter.optimize_type, prefs.scooter.triangle)
        } else {
            (prefs.bike.optimize_type, prefs.bike.triangle)
        };

        let time_s = street.effective_bike_distance() / speed;
        let mut weight = match optimize_type {
            OptimizeType::SafestStreets => {
                let safety = street.bicycle_safety_factor();
                let w = f64::from(safety) * street.distance_m() / speed;
                if safety <= SAFEST_STREETS_SAFETY_FACTOR { w * SAFEST_STREETS_DISCOUNT } else { w }
            }
            OptimizeType::SafeStreets => street.effective_bicycle_safety_distance() / speed,
            OptimizeType::FlatStreets => street.effective_bike_distance_for_work_cost() / speed,
            OptimizeType::ShortestDuration => street.effective_bike_distance() / speed,
            OptimizeType::Triangle => {
                let quick = street.effective_bike_distance();
                let slope = street.effective_bike_distance_for_work_cost();
                let safety = street.effective_bicycle_safety_distance();
                (quick * triangle.time + slope * triangle.slope + safety * triangle.safety) / speed
            }
        };
        weight *= compute_reluctance(prefs, mode, false, street.is_stairs());
        TraversalCosts { time_s, weight }
    }

    fn walking_costs(&self, speed: f64, walking_bike: bool) -> TraversalCosts {
        let prefs = self.prefs();
        let street = self.street;

        if self.s0.request().wheelchair() {
            let time_s = street.effective_walk_distance() / speed;
            let reluctance = compute_wheelchair_reluctance(
                prefs,
                f64::from(street.max_slope()),
                street.is_wheelchair_accessible(),
                street.is_stairs(),
            );
            return TraversalCosts {
                time_s,
                weight: street.effective_bike_distance() / speed * reluctance,
            };
        }

        let (time_s, mut weight) = if walking_bike {
            // Slopes count when pushing a bike.
            let t = street.effective_bike_distance() / speed;
            let w = if street.is_stairs() { t * prefs.bike.walking.stairs_reluctance } else { t };
            (t, w)
        } else {
            let safety = prefs.walk.safety_factor;
            let t = street.effective_walk_distance() / speed;
            let w = (street.effective_walk_safety_distance() * safety
                + street.effective_walk_distance() * (1.0 - safety))
                / speed;
            (t, w)
        };
        weight *= compute_reluctance(prefs, TraverseMode::Walk, walking_bike, street.is_stairs());
        TraversalCosts { time_s, weight }
    }
}
