//! Unit tests for st-graph.
//!
//! All tests use small hand-built graphs around a fixed origin; coordinates
//! are given as east/north metre offsets from it.

#[cfg(test)]
mod helpers {
    use st_core::{EdgeId, GeoPoint, StreetTraversalPermission, VertexId};

    use crate::{Graph, StreetEdgeBuilder, VertexKind};

    pub fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn origin() -> GeoPoint {
        GeoPoint::new(59.9, 10.7)
    }

    pub fn at(east: f64, north: f64) -> GeoPoint {
        origin().offset_m(east, north)
    }

    pub fn intersection() -> VertexKind {
        VertexKind::Intersection { traffic_light: false, free_flowing: None }
    }

    pub fn street(g: &mut Graph, from: VertexId, to: VertexId) -> EdgeId {
        let e = StreetEdgeBuilder::new(from, to).build(g).unwrap();
        g.connect(e).unwrap()
    }

    /// A forward edge and its back twin over the same geometry.
    pub fn two_way(
        g: &mut Graph,
        a: VertexId,
        b: VertexId,
        points: Vec<GeoPoint>,
        length_mm: i32,
    ) -> (EdgeId, EdgeId) {
        let mut back_points = points.clone();
        back_points.reverse();
        let fwd = StreetEdgeBuilder::new(a, b)
            .geometry(points)
            .length_mm(length_mm)
            .permission(StreetTraversalPermission::ALL)
            .build(g)
            .unwrap();
        let back = StreetEdgeBuilder::new(b, a)
            .geometry(back_points)
            .length_mm(length_mm)
            .back(true)
            .build(g)
            .unwrap();
        (g.connect(fwd).unwrap(), g.connect(back).unwrap())
    }

    /// `a(0,0) → b(100,0) → c(200,0)`, one-way streets `ab`, `bc`, plus a
    /// side street `bd` to `d(100,100)`.
    pub fn line_graph() -> (Graph, [VertexId; 4], [EdgeId; 3]) {
        let mut g = Graph::new();
        let a = g.add_vertex("a", at(0.0, 0.0), intersection());
        let b = g.add_vertex("b", at(100.0, 0.0), intersection());
        let c = g.add_vertex("c", at(200.0, 0.0), intersection());
        let d = g.add_vertex("d", at(100.0, 100.0), intersection());
        let ab = street(&mut g, a, b);
        let bc = street(&mut g, b, c);
        let bd = street(&mut g, b, d);
        (g, [a, b, c, d], [ab, bc, bd])
    }
}

// ── Topology ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod topology {
    use st_core::VertexId;

    use super::helpers::{at, intersection, line_graph};
    use crate::{Edge, EdgeKind, Graph, GraphError};

    #[test]
    fn connect_registers_both_sides() {
        let (g, [a, b, _, _], [ab, bc, bd]) = line_graph();
        assert_eq!(g.vertex(a).unwrap().outgoing(), &[ab]);
        assert_eq!(g.vertex(b).unwrap().incoming(), &[ab]);
        assert_eq!(g.vertex(b).unwrap().outgoing(), &[bc, bd]);
        assert!(g.is_reachable_from_graph(ab));
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.vertex_count(), 4);
    }

    #[test]
    fn connect_unknown_vertex_fails() {
        let (mut g, [a, ..], _) = line_graph();
        let err = g.connect(Edge::new(VertexId(99), a, EdgeKind::Free)).unwrap_err();
        assert_eq!(err, GraphError::VertexNotFound(VertexId(99)));
    }

    #[test]
    fn remove_deregisters_both_sides() {
        let (mut g, [a, b, _, _], [ab, ..]) = line_graph();
        let removed = g.remove_edge(ab).unwrap();
        assert_eq!(removed.from(), a);
        assert!(g.vertex(a).unwrap().outgoing().is_empty());
        assert!(g.vertex(b).unwrap().incoming().is_empty());
        assert!(!g.is_reachable_from_graph(ab));
        assert!(g.edge(ab).is_none());
        assert_eq!(g.remove_edge(ab).unwrap_err(), GraphError::EdgeNotFound(ab));
    }

    #[test]
    fn remove_vertex_removes_touching_edges() {
        let (mut g, [a, b, c, d], [ab, bc, bd]) = line_graph();
        g.remove_vertex(b).unwrap();
        assert!(g.vertex(b).is_none());
        for e in [ab, bc, bd] {
            assert!(g.edge(e).is_none());
        }
        assert!(g.vertex(a).unwrap().outgoing().is_empty());
        assert!(g.vertex(c).unwrap().incoming().is_empty());
        assert!(g.vertex(d).unwrap().incoming().is_empty());
        assert_eq!(g.vertex_by_label("b"), None);
        assert_eq!(g.vertex_by_label("a"), Some(a));
    }

    #[test]
    fn reverse_edges() {
        let mut g = Graph::new();
        let a = g.add_vertex("a", at(0.0, 0.0), intersection());
        let b = g.add_vertex("b", at(10.0, 0.0), intersection());
        let ab = g.connect(Edge::new(a, b, EdgeKind::Free)).unwrap();
        let ba = g.connect(Edge::new(b, a, EdgeKind::Free)).unwrap();
        let ab2 = g.connect(Edge::new(a, b, EdgeKind::Free)).unwrap();
        let (e_ab, e_ba, e_ab2) = (g.edge(ab).unwrap(), g.edge(ba).unwrap(), g.edge(ab2).unwrap());
        assert!(e_ab.is_reverse_of(e_ba));
        assert!(e_ba.is_reverse_of(e_ab2));
        assert!(!e_ab.is_reverse_of(e_ab2));
    }

    #[test]
    fn barriers_restrict_permission() {
        use st_core::{StreetTraversalPermission as P, TraverseMode};

        use crate::VertexKind;

        let mut g = Graph::new();
        let a = g.add_vertex("a", at(0.0, 0.0), intersection());
        let b = g.add_vertex("bollard", at(10.0, 0.0), VertexKind::Barrier {
            permission: P::PEDESTRIAN_AND_BICYCLE,
        });
        let ab = super::helpers::street(&mut g, a, b);
        assert!(g.street(ab).unwrap().can_traverse(TraverseMode::Car));
        assert!(!g.can_traverse_with_barriers(ab, TraverseMode::Car));
        assert!(g.can_traverse_with_barriers(ab, TraverseMode::Bicycle));
        assert_eq!(g.permission_with_barriers(ab).unwrap(), P::PEDESTRIAN_AND_BICYCLE);
    }
}

// ── Street edges ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod street {
    use std::sync::Arc;

    use st_core::{TraverseMode, TraverseModeSet};
    use st_geometry::ElevationProfile;

    use super::helpers::{at, init_log, intersection, line_graph, two_way};
    use crate::{
        ConstantCostExtension, Graph, GraphError, StreetEdgeBuilder, StreetEdgeCostExtension,
        StreetEdgeFlags,
    };

    #[test]
    fn length_and_bearings_from_geometry() {
        let (g, _, [ab, _, bd]) = line_graph();
        let s = g.street(ab).unwrap();
        assert!((99_990..=100_010).contains(&s.length_mm()), "got {}", s.length_mm());
        assert!((s.distance_m() - 100.0).abs() < 0.01);
        assert_eq!(s.in_angle(), 90);
        assert_eq!(s.out_angle(), 90);
        assert_eq!(g.street(bd).unwrap().in_angle(), 0);
        assert!(s.is_wheelchair_accessible());
        assert!(s.turn_restrictions().is_shared_empty());
    }

    #[test]
    fn zero_length_is_allowed() {
        init_log();
        let (g, [a, b, ..], _) = line_graph();
        let e = StreetEdgeBuilder::new(a, b).length_mm(0).build(&g).unwrap();
        assert_eq!(e.as_street().unwrap().length_mm(), 0);
    }

    #[test]
    fn invalid_safety_factors_are_rejected() {
        let (mut g, [a, b, ..], [ab, ..]) = line_graph();
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = StreetEdgeBuilder::new(a, b).bicycle_safety_factor(bad).build(&g).unwrap_err();
            assert!(matches!(err, GraphError::InvalidSafetyFactor { kind: "bicycle", .. }));
        }
        let err = g.set_walk_safety_factor(ab, 0.0).unwrap_err();
        assert!(matches!(err, GraphError::InvalidSafetyFactor { kind: "walk", .. }));

        g.set_walk_safety_factor(ab, 1.5).unwrap();
        let s = g.street(ab).unwrap();
        assert_eq!(s.walk_safety_factor(), 1.5);
        assert!((s.effective_walk_safety_distance() - 1.5 * s.distance_m()).abs() < 1e-9);
    }

    #[test]
    fn elevation_supersedes_safety_factors() {
        let (mut g, [a, b, ..], _) = line_graph();
        let profile = ElevationProfile::from_pairs(&[(0.0, 0.0), (100.0, 5.0)]).unwrap();
        let e = StreetEdgeBuilder::new(a, b)
            .length_m(100.0)
            .elevation_profile(profile)
            .build(&g)
            .unwrap();
        let id = g.connect(e).unwrap();

        let s = g.street(id).unwrap();
        assert!(s.has_elevation());
        assert!(s.effective_bike_distance() > 100.0);
        assert!(s.effective_walk_distance() > 100.0);
        assert!((s.distance_with_elevation() - 100.0_f64.hypot(5.0)).abs() < 1e-9);
        assert!((s.max_slope() - 0.05).abs() < 1e-6);

        assert_eq!(
            g.set_bicycle_safety_factor(id, 2.0).unwrap_err(),
            GraphError::SafetyFactorWithElevation("bicycle")
        );
        assert_eq!(
            g.set_walk_safety_factor(id, 2.0).unwrap_err(),
            GraphError::SafetyFactorWithElevation("walk")
        );
    }

    #[test]
    fn slope_override_skips_elevation() {
        let (g, [a, b, ..], _) = line_graph();
        let profile = ElevationProfile::from_pairs(&[(0.0, 0.0), (100.0, 5.0)]).unwrap();
        let e = StreetEdgeBuilder::new(a, b)
            .slope_override(true)
            .elevation_profile(profile)
            .build(&g)
            .unwrap();
        assert!(!e.as_street().unwrap().has_elevation());
    }

    #[test]
    fn set_name_clears_derived_flag() {
        let (mut g, [a, b, ..], _) = line_graph();
        let e = StreetEdgeBuilder::new(a, b).name("path").name_is_derived(true).build(&g).unwrap();
        let id = g.connect(e).unwrap();
        assert!(g.street(id).unwrap().name_is_derived());
        g.set_name(id, "Storgata").unwrap();
        let s = g.street(id).unwrap();
        assert_eq!(s.name(), Some("Storgata"));
        assert!(!s.name_is_derived());
    }

    #[test]
    fn flags_round_trip_through_update() {
        let (mut g, _, [ab, ..]) = line_graph();
        g.update_flags(ab, |f| {
            f.set_stairs(true);
            f.set_walk_no_thru_traffic(true);
        })
        .unwrap();
        let s = g.street(ab).unwrap();
        assert!(s.is_stairs());
        assert!(s.is_no_thru_traffic(TraverseMode::Walk));
        assert!(!s.is_no_thru_traffic(TraverseMode::Car));

        let mut f = StreetEdgeFlags::default();
        f.set_bicycle_no_thru_traffic(true);
        assert!(f.is_no_thru_traffic(TraverseMode::Scooter));
    }

    #[test]
    fn cost_extension_is_attached() {
        let (mut g, _, [ab, ..]) = line_graph();
        let ext: Arc<dyn StreetEdgeCostExtension> = Arc::new(ConstantCostExtension {
            cost: 7.0,
            modes: TraverseModeSet::of(&[TraverseMode::Car]),
        });
        g.set_cost_extension(ab, Some(ext)).unwrap();
        let ext = g.street(ab).unwrap().cost_extension().unwrap();
        assert_eq!(ext.extra_cost(TraverseMode::Car, 1_000, 1.0), 7.0);
        assert_eq!(ext.extra_cost(TraverseMode::Walk, 1_000, 1.0), 0.0);
    }

    #[test]
    fn twins_share_geometry() {
        init_log();
        let mut g = Graph::new();
        let a = g.add_vertex("a", at(0.0, 0.0), intersection());
        let b = g.add_vertex("b", at(100.0, 50.0), intersection());
        let bend = vec![at(0.0, 0.0), at(100.0, 0.0), at(100.0, 50.0)];
        let (fwd, back) = two_way(&mut g, a, b, bend, 150_000);
        assert!(g.share_geometry(back, fwd).unwrap());
        assert!(Arc::ptr_eq(
            g.street(back).unwrap().compact_geometry(),
            g.street(fwd).unwrap().compact_geometry()
        ));
        assert_eq!(g.street_geometry(back).unwrap().first(), Some(&at(100.0, 50.0)));

        let straight = super::helpers::street(&mut g, a, b);
        assert!(!g.share_geometry(straight, fwd).unwrap());
    }
}

// ── Turn restrictions ─────────────────────────────────────────────────────────

#[cfg(test)]
mod restrictions {
    use st_core::{TraverseMode, TraverseModeSet};

    use super::helpers::line_graph;
    use crate::{RepeatingTimePeriod, TurnRestriction, TurnRestrictionType};

    fn car() -> TraverseModeSet {
        TraverseModeSet::of(&[TraverseMode::Car])
    }

    #[test]
    fn add_remove_returns_to_shared_empty() {
        let (g, _, [ab, bc, bd]) = line_graph();
        let r1 = TurnRestriction::new(ab, bc, TurnRestrictionType::No, car());
        let r2 = TurnRestriction::new(ab, bd, TurnRestrictionType::No, car());
        g.add_turn_restriction(r1.clone()).unwrap();
        g.add_turn_restriction(r1.clone()).unwrap();
        g.add_turn_restriction(r2.clone()).unwrap();
        assert_eq!(g.turn_restrictions(ab).unwrap().len(), 2);

        let before = g.turn_restrictions(ab).unwrap();
        assert!(g.remove_turn_restriction(&r1).unwrap());
        assert!(!g.remove_turn_restriction(&r1).unwrap());
        assert_eq!(before.len(), 2, "snapshot taken earlier is unaffected");

        g.remove_turn_restriction(&r2).unwrap();
        assert!(g.street(ab).unwrap().turn_restrictions().is_shared_empty());
    }

    #[test]
    fn no_turn_blocks_only_listed_modes() {
        let (g, _, [ab, bc, bd]) = line_graph();
        g.add_turn_restriction(TurnRestriction::new(ab, bc, TurnRestrictionType::No, car()))
            .unwrap();
        let s = g.street(ab).unwrap();
        assert!(!s.can_turn_onto(&g, bc, 0, Some(TraverseMode::Car)));
        assert!(s.can_turn_onto(&g, bc, 0, Some(TraverseMode::Walk)));
        assert!(s.can_turn_onto(&g, bc, 0, None));
        assert!(s.can_turn_onto(&g, bd, 0, Some(TraverseMode::Car)));
    }

    #[test]
    fn only_turn_blocks_everything_else() {
        let (g, _, [ab, bc, bd]) = line_graph();
        let bike = TraverseModeSet::of(&[TraverseMode::Bicycle]);
        g.add_turn_restriction(TurnRestriction::new(ab, bd, TurnRestrictionType::Only, bike))
            .unwrap();
        let s = g.street(ab).unwrap();
        assert!(!s.can_turn_onto(&g, bc, 0, Some(TraverseMode::Bicycle)));
        assert!(s.can_turn_onto(&g, bd, 0, Some(TraverseMode::Bicycle)));
        assert!(s.can_turn_onto(&g, bc, 0, Some(TraverseMode::Car)));
    }

    #[test]
    fn time_dependent_restriction() {
        let (g, _, [ab, bc, _]) = line_graph();
        // Mondays 07:00-09:00.
        let window = RepeatingTimePeriod::daily_window(0, 7 * 3600, 9 * 3600);
        let r = TurnRestriction::new(ab, bc, TurnRestrictionType::No, car())
            .with_time(RepeatingTimePeriod::new(vec![window]));
        g.add_turn_restriction(r).unwrap();
        let s = g.street(ab).unwrap();

        // 1970-01-05 was a Monday.
        let monday = 4 * 86_400;
        assert!(!s.can_turn_onto(&g, bc, monday + 8 * 3600, Some(TraverseMode::Car)));
        assert!(s.can_turn_onto(&g, bc, monday + 10 * 3600, Some(TraverseMode::Car)));
        assert!(s.can_turn_onto(&g, bc, monday + 86_400 + 8 * 3600, Some(TraverseMode::Car)));
    }

    #[test]
    fn wrapping_window() {
        // Sunday 22:00 to Monday 02:00.
        let p = RepeatingTimePeriod::new(vec![(6 * 86_400 + 22 * 3600, 2 * 3600)]);
        let monday = 4 * 86_400;
        assert!(p.active(monday + 3600));
        assert!(p.active(monday - 3600));
        assert!(!p.active(monday + 3 * 3600));
    }

    #[test]
    fn unknown_edges_are_rejected() {
        use st_core::EdgeId;

        use crate::GraphError;

        let (g, _, [ab, ..]) = line_graph();
        let r = TurnRestriction::new(ab, EdgeId(42), TurnRestrictionType::No, car());
        assert_eq!(g.add_turn_restriction(r).unwrap_err(), GraphError::EdgeNotFound(EdgeId(42)));
    }

    #[test]
    fn edges_that_do_not_meet_are_rejected() {
        use crate::GraphError;

        let (g, _, [ab, bc, bd]) = line_graph();
        let r = TurnRestriction::new(bc, ab, TurnRestrictionType::No, car());
        assert_eq!(
            g.add_turn_restriction(r).unwrap_err(),
            GraphError::NonAdjacentTurnRestriction { from: bc, to: ab }
        );
        let r = TurnRestriction::new(bd, bc, TurnRestrictionType::Only, car());
        assert!(g.add_turn_restriction(r).is_err());
        assert!(g.turn_restrictions(bc).unwrap().is_empty());
        assert!(g.turn_restrictions(bd).unwrap().is_empty());
    }

    #[test]
    fn removing_target_clears_restrictions() {
        let (mut g, _, [ab, bc, bd]) = line_graph();
        g.add_turn_restriction(TurnRestriction::new(ab, bc, TurnRestrictionType::No, car()))
            .unwrap();
        g.add_turn_restriction(TurnRestriction::new(ab, bd, TurnRestrictionType::No, car()))
            .unwrap();
        g.remove_edge(bc).unwrap();
        let left = g.turn_restrictions(ab).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].to, bd);
    }
}

// ── Rental restrictions ───────────────────────────────────────────────────────

#[cfg(test)]
mod rental {
    use std::sync::Arc;

    use crate::{RentalRestriction, RentalRestrictions};

    fn zone(network: &str, drop_off_banned: bool, traversal_banned: bool) -> RentalRestriction {
        RentalRestriction::GeofencingZone { network: Arc::from(network), drop_off_banned, traversal_banned }
    }

    #[test]
    fn bans_apply_only_while_renting_the_network() {
        let mut r = RentalRestrictions::default();
        r.add(zone("tier", true, false));
        r.add(zone("voi", false, true));

        assert!(r.drop_off_banned(true, Some("tier")));
        assert!(!r.drop_off_banned(false, Some("tier")));
        assert!(!r.drop_off_banned(true, Some("voi")));
        assert!(!r.drop_off_banned(true, None));

        assert!(r.traversal_banned(true, Some("voi")));
        assert!(!r.traversal_banned(true, Some("tier")));
        assert!(!r.traversal_banned(false, Some("voi")));
    }

    #[test]
    fn business_area_border_bans_traversal() {
        let border = RentalRestriction::BusinessAreaBorder { network: Arc::from("tier") };
        assert!(border.traversal_banned(true, Some("tier")));
        assert!(!border.traversal_banned(true, Some("voi")));
        assert!(!border.drop_off_banned(true, Some("tier")));
    }

    #[test]
    fn no_drop_off_networks_in_first_seen_order() {
        let mut r = RentalRestrictions::default();
        assert!(!r.has_restrictions());
        r.add(zone("voi", true, false));
        r.add(zone("tier", true, true));
        r.add(zone("bolt", false, true));
        r.add(zone("voi", true, false));
        r.add(zone("voi", true, true));
        let networks = r.no_drop_off_networks();
        let names: Vec<&str> = networks.iter().map(|n| &**n).collect();
        assert_eq!(names, ["voi", "tier"]);
        assert!(r.has_restrictions());
        assert_eq!(r.iter().count(), 4);
    }
}

// ── Splitting ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod split {
    use std::sync::Arc;

    use st_core::{TraverseMode, TraverseModeSet};
    use st_geometry::ElevationProfile;

    use super::helpers::{at, init_log, intersection, line_graph, street};
    use crate::{
        DisposableEdgeCollection, Graph, LinkingDirection, RentalRestriction, StreetEdgeBuilder,
        StreetEdgeVariant, TurnRestriction, TurnRestrictionType, VertexKind,
    };

    fn car() -> TraverseModeSet {
        TraverseModeSet::of(&[TraverseMode::Car])
    }

    #[test]
    fn destructive_split_conserves_length_and_replaces_edge() {
        init_log();
        let (mut g, [_, b, c, _], [_, bc, _]) = line_graph();
        let total = g.street(bc).unwrap().length_mm();
        let s = g.add_vertex("s", at(130.0, 0.0), VertexKind::Splitter);

        let split = g.split_destructively(bc, s).unwrap();
        let (head, tail) = (split.head.unwrap(), split.tail.unwrap());

        assert!(g.edge(bc).is_none());
        assert_eq!(g.edge(head).unwrap().from(), b);
        assert_eq!(g.edge(head).unwrap().to(), s);
        assert_eq!(g.edge(tail).unwrap().from(), s);
        assert_eq!(g.edge(tail).unwrap().to(), c);

        let (h, t) = (g.street(head).unwrap(), g.street(tail).unwrap());
        assert_eq!(h.length_mm() + t.length_mm(), total);
        assert!((h.distance_m() - 30.0).abs() < 0.01);
        assert_eq!(h.variant(), &StreetEdgeVariant::Plain);
    }

    #[test]
    fn split_at_the_start_keeps_the_parent_length() {
        init_log();
        let (mut g, [_, b, ..], [_, bc, _]) = line_graph();
        let total = g.street(bc).unwrap().length_mm();
        let coordinate = g.vertex(b).unwrap().coordinate();
        let s = g.add_vertex("s", coordinate, VertexKind::Splitter);

        let split = g.split_destructively(bc, s).unwrap();
        let head = g.street(split.head.unwrap()).unwrap().length_mm();
        let tail = g.street(split.tail.unwrap()).unwrap().length_mm();
        assert_eq!((head, tail), (1, total - 1));
        assert_eq!(head + tail, total);
    }

    #[test]
    fn split_at_the_end_keeps_the_parent_length() {
        init_log();
        let (mut g, [_, _, c, _], [_, bc, _]) = line_graph();
        let total = g.street(bc).unwrap().length_mm();
        let coordinate = g.vertex(c).unwrap().coordinate();
        let s = g.add_vertex("s", coordinate, VertexKind::Splitter);

        let split = g.split_destructively(bc, s).unwrap();
        let head = g.street(split.head.unwrap()).unwrap().length_mm();
        let tail = g.street(split.tail.unwrap()).unwrap().length_mm();
        assert_eq!((head, tail), (total - 1, 1));
        assert_eq!(head + tail, total);
    }

    #[test]
    fn one_millimetre_edge_splits_into_two() {
        init_log();
        let mut g = Graph::new();
        let a = g.add_vertex("a", at(0.0, 0.0), intersection());
        let b = g.add_vertex("b", at(100.0, 0.0), intersection());
        let e = StreetEdgeBuilder::new(a, b).length_mm(1).build(&g).unwrap();
        let ab = g.connect(e).unwrap();
        let s = g.add_vertex("s", at(50.0, 0.0), VertexKind::Splitter);

        let split = g.split_destructively(ab, s).unwrap();
        let head = g.street(split.head.unwrap()).unwrap().length_mm();
        let tail = g.street(split.tail.unwrap()).unwrap().length_mm();
        assert_eq!((head, tail), (1, 1));
    }

    #[test]
    fn split_inherits_properties() {
        let (mut g, [_, b, c, _], _) = line_graph();
        let profile = ElevationProfile::from_pairs(&[(0.0, 0.0), (100.0, 10.0)]).unwrap();
        let e = StreetEdgeBuilder::new(b, c)
            .stairs(true)
            .car_speed(20.0)
            .name("Trappa")
            .length_m(100.0)
            .elevation_profile(profile)
            .build(&g)
            .unwrap();
        let id = g.connect(e).unwrap();
        let s = g.add_vertex("s", at(150.0, 0.0), VertexKind::Splitter);

        let split = g.split_destructively(id, s).unwrap();
        for frag in [split.head.unwrap(), split.tail.unwrap()] {
            let f = g.street(frag).unwrap();
            assert!(f.is_stairs());
            assert_eq!(f.car_speed(), 20.0);
            assert_eq!(f.name(), Some("Trappa"));
            assert!(f.has_elevation());
            assert!((f.max_slope() - 0.1).abs() < 1e-3);
        }
    }

    #[test]
    fn restrictions_follow_the_right_fragment() {
        let (mut g, [_, _, c, _], [ab, bc, _]) = line_graph();
        let e = g.add_vertex("e", at(300.0, 0.0), intersection());
        let ce = street(&mut g, c, e);
        g.add_turn_restriction(TurnRestriction::new(ab, bc, TurnRestrictionType::No, car()))
            .unwrap();
        g.add_turn_restriction(TurnRestriction::new(bc, ce, TurnRestrictionType::Only, car()))
            .unwrap();

        let s = g.add_vertex("s", at(150.0, 0.0), VertexKind::Splitter);
        let split = g.split_destructively(bc, s).unwrap();
        let (head, tail) = (split.head.unwrap(), split.tail.unwrap());

        let on_ab = g.turn_restrictions(ab).unwrap();
        assert!(on_ab.iter().any(|r| r.to == head));
        assert!(!on_ab.iter().any(|r| r.to == tail));

        let on_tail = g.turn_restrictions(tail).unwrap();
        assert_eq!(on_tail.len(), 1);
        assert_eq!(on_tail[0].to, ce);
        assert_eq!(on_tail[0].kind, TurnRestrictionType::Only);
        assert!(g.turn_restrictions(head).unwrap().is_empty());

        for (_, edge) in g.edges() {
            if let Some(st) = edge.as_street() {
                assert!(st.turn_restrictions().snapshot().iter().all(|r| r.to != bc && r.from != bc));
            }
        }
    }

    #[test]
    fn non_destructive_split_keeps_parent() {
        let (mut g, [_, b, c, _], [ab, bc, _]) = line_graph();
        g.add_turn_restriction(TurnRestriction::new(ab, bc, TurnRestrictionType::No, car()))
            .unwrap();
        let total = g.street(bc).unwrap().length_mm();
        let s = g.add_vertex("s", at(150.0, 0.0), VertexKind::Temporary);

        let mut temp = DisposableEdgeCollection::new();
        temp.add_vertex(s);
        let split = g
            .split_non_destructively(bc, s, &mut temp, LinkingDirection::Bidirectional)
            .unwrap();
        let (head, tail) = (split.head.unwrap(), split.tail.unwrap());

        assert!(g.is_reachable_from_graph(bc));
        assert_eq!(g.street(head).unwrap().parent(), Some(bc));
        assert_eq!(
            g.street(head).unwrap().length_mm() + g.street(tail).unwrap().length_mm(),
            total
        );
        assert!(g.is_equivalent(head, bc));
        assert!(!g.is_equivalent(bc, head));

        // The parent's restriction applies to the fragment.
        let s_ab = g.street(ab).unwrap();
        assert!(!s_ab.can_turn_onto(&g, head, 0, Some(TraverseMode::Car)));

        temp.dispose(&mut g);
        assert!(g.edge(head).is_none());
        assert!(g.edge(tail).is_none());
        assert!(g.vertex(s).is_none());
        assert_eq!(g.vertex(b).unwrap().outgoing().len(), 2);
        assert!(g.turn_restrictions(ab).unwrap().iter().all(|r| r.to == bc));
        assert_eq!(g.vertex(c).unwrap().incoming(), &[bc]);
    }

    #[test]
    fn linking_direction_limits_fragments() {
        let (mut g, _, [_, bc, _]) = line_graph();
        let s = g.add_vertex("s", at(150.0, 0.0), VertexKind::Temporary);
        let mut temp = DisposableEdgeCollection::new();

        let out = g.split_non_destructively(bc, s, &mut temp, LinkingDirection::Outgoing).unwrap();
        assert!(out.head.is_some() && out.tail.is_none());
        let inc = g.split_non_destructively(bc, s, &mut temp, LinkingDirection::Incoming).unwrap();
        assert!(inc.head.is_none() && inc.tail.is_some());
        assert_eq!(temp.edges().len(), 2);
    }

    #[test]
    fn split_vertex_inherits_rental_restrictions() {
        let (mut g, [_, b, _, _], [_, bc, _]) = line_graph();
        let zone = RentalRestriction::GeofencingZone {
            network: Arc::from("tier"),
            drop_off_banned: true,
            traversal_banned: false,
        };
        g.add_rental_restriction(b, zone.clone()).unwrap();
        let s = g.add_vertex("s", at(150.0, 0.0), VertexKind::Splitter);
        g.split_destructively(bc, s).unwrap();
        assert!(g.vertex(s).unwrap().rental_drop_off_banned(true, Some("tier")));
        assert!(g.remove_rental_restriction(s, &zone).unwrap());
    }

    #[test]
    fn partial_edge_between_two_points() {
        let (mut g, _, [_, bc, _]) = line_graph();
        let p = g.add_vertex("p", at(120.0, 0.0), VertexKind::Temporary);
        let q = g.add_vertex("q", at(170.0, 0.0), VertexKind::Temporary);

        let id = g.create_partial_edge(bc, p, q).unwrap().unwrap();
        let partial = g.street(id).unwrap();
        assert_eq!(partial.parent(), Some(bc));
        assert!((partial.distance_m() - 50.0).abs() < 0.01);

        assert_eq!(g.create_partial_edge(bc, q, p).unwrap(), None);
    }

    #[test]
    fn split_of_unknown_edge_fails() {
        use st_core::EdgeId;

        use crate::GraphError;

        let mut g = Graph::new();
        let s = g.add_vertex("s", at(0.0, 0.0), VertexKind::Splitter);
        assert_eq!(g.split_destructively(EdgeId(0), s).unwrap_err(), GraphError::EdgeNotFound(EdgeId(0)));
    }
}

// ── Spatial index ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod index {
    use super::helpers::{at, init_log, line_graph};
    use crate::{StreetIndex, VertexKind};

    #[test]
    fn finds_nearby_edges_nearest_first() {
        let (g, _, [ab, bc, bd]) = line_graph();
        let idx = StreetIndex::build(&g);
        assert_eq!(idx.segment_count(), 3);

        assert_eq!(idx.edges_near(&g, at(150.0, 5.0), 20.0), vec![bc]);
        let near_b = idx.edges_near(&g, at(95.0, 3.0), 10.0);
        assert_eq!(near_b[0], ab);
        assert!(near_b.contains(&bc) && near_b.contains(&bd));
        assert!(idx.edges_near(&g, at(150.0, 60.0), 20.0).is_empty());
    }

    #[test]
    fn stale_entries_are_skipped() {
        init_log();
        let (mut g, _, [_, bc, _]) = line_graph();
        let mut idx = StreetIndex::build(&g);
        let s = g.add_vertex("s", at(150.0, 0.0), VertexKind::Splitter);
        let split = g.split_destructively(bc, s).unwrap();

        assert!(idx.edges_near(&g, at(175.0, 2.0), 10.0).is_empty());

        idx.insert_edge(&g, split.tail.unwrap()).unwrap();
        assert_eq!(idx.edges_near(&g, at(175.0, 2.0), 10.0), vec![split.tail.unwrap()]);
    }

    #[test]
    fn nearest_vertex_skips_removed() {
        let (mut g, [a, b, ..], _) = line_graph();
        let idx = StreetIndex::build(&g);
        assert_eq!(idx.nearest_vertex(&g, at(90.0, 5.0)), Some(b));
        g.remove_vertex(b).unwrap();
        assert_ne!(idx.nearest_vertex(&g, at(90.0, 5.0)), Some(b));
        assert_eq!(idx.nearest_vertex(&g, at(10.0, 0.0)), Some(a));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::helpers::{at, intersection, two_way};
    use crate::{clamp_split_lengths, rescale_split_lengths, Graph, VertexKind};

    proptest! {
        #[test]
        fn clamped_lengths_stay_positive_and_add_up(len in 0i32..10_000_000, offset in -5i32..10) {
            // `head` ranges from a few mm before the start to a few mm past the end.
            let head = if offset < 0 { offset } else { len - 5 + offset };
            let (h, t) = clamp_split_lengths(len, head, len - head, at(0.0, 0.0));
            prop_assert!(h >= 1 && t >= 1);
            prop_assert_eq!(h + t, len.max(2));
        }

        #[test]
        fn rescaled_lengths_add_up(len in 1i32..10_000_000, l1 in 0i32..5_000_000, l2 in 0i32..5_000_000, back in any::<bool>()) {
            let (h, t) = rescale_split_lengths(len, l1, l2, back);
            prop_assert_eq!(h + t, len);
        }

        #[test]
        fn twins_split_identically(len in 1i32..10_000_000, l1 in 1i32..5_000_000, l2 in 1i32..5_000_000) {
            let (fh, ft) = rescale_split_lengths(len, l1, l2, false);
            // The back twin sees the halves swapped.
            let (bh, bt) = rescale_split_lengths(len, l2, l1, true);
            prop_assert_eq!(fh, bt);
            prop_assert_eq!(ft, bh);
        }

        #[test]
        fn graph_split_of_twins(fraction in 0.05f64..0.95, north in 0.0f64..80.0) {
            let mut g = Graph::new();
            let a = g.add_vertex("a", at(0.0, 0.0), intersection());
            let b = g.add_vertex("b", at(200.0, 0.0), intersection());
            let line = vec![at(0.0, 0.0), at(100.0, north), at(200.0, 0.0)];
            let (fwd, back) = two_way(&mut g, a, b, line, 233_457);

            let p = if fraction < 0.5 {
                at(200.0 * fraction, north * fraction * 2.0)
            } else {
                at(200.0 * fraction, north * (1.0 - fraction) * 2.0)
            };
            let s = g.add_vertex("s", p, VertexKind::Splitter);
            let f = g.split_destructively(fwd, s).unwrap();
            let r = g.split_destructively(back, s).unwrap();

            let len = |e| g.street(e).unwrap().length_mm();
            let (fh, ft) = (len(f.head.unwrap()), len(f.tail.unwrap()));
            let (bh, bt) = (len(r.head.unwrap()), len(r.tail.unwrap()));
            prop_assert_eq!(fh + ft, 233_457);
            prop_assert_eq!(bh + bt, 233_457);
            prop_assert_eq!(fh, bt);
            prop_assert_eq!(ft, bh);
        }
    }
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrency {
    use std::collections::HashSet;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rayon::prelude::*;

    use st_core::{TraverseMode, TraverseModeSet};

    use super::helpers::line_graph;
    use crate::{RepeatingTimePeriod, TurnRestriction, TurnRestrictionType};

    #[test]
    fn concurrent_writers_lose_no_updates() {
        let (g, _, [ab, bc, bd]) = line_graph();
        let modes = TraverseModeSet::of(&[TraverseMode::Car]);

        let kept: Vec<TurnRestriction> = (0u64..8)
            .into_par_iter()
            .flat_map_iter(|thread| {
                let mut rng = SmallRng::seed_from_u64(thread);
                let mut mine = Vec::new();
                for k in 0..50u32 {
                    let to = if rng.gen_bool(0.5) { bc } else { bd };
                    let start = (thread as u32) * 1_000 + k;
                    let r = TurnRestriction::new(ab, to, TurnRestrictionType::No, modes)
                        .with_time(RepeatingTimePeriod::new(vec![(start, start + 1)]));
                    g.add_turn_restriction(r.clone()).unwrap();

                    let snapshot = g.turn_restrictions(ab).unwrap();
                    assert!(snapshot.iter().all(|x| x.from == ab));
                    assert!(snapshot.contains(&r));

                    if rng.gen_bool(0.5) {
                        assert!(g.remove_turn_restriction(&r).unwrap());
                    } else {
                        mine.push(r);
                    }
                }
                mine
            })
            .collect();

        let expected: HashSet<_> = kept.into_iter().collect();
        let actual: HashSet<_> = g.turn_restrictions(ab).unwrap().iter().cloned().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn readers_see_whole_lists() {
        let (g, _, [ab, bc, _]) = line_graph();
        let modes = TraverseModeSet::of(&[TraverseMode::Car]);
        let pair = |k: u32| {
            let a = TurnRestriction::new(ab, bc, TurnRestrictionType::No, modes)
                .with_time(RepeatingTimePeriod::new(vec![(k, k + 1)]));
            let b = a.clone().with_time(RepeatingTimePeriod::new(vec![(k + 100_000, k + 100_001)]));
            (a, b)
        };

        rayon::join(
            || {
                for k in 0..500 {
                    let (a, b) = pair(k);
                    g.add_turn_restriction(a.clone()).unwrap();
                    g.add_turn_restriction(b.clone()).unwrap();
                    g.remove_turn_restriction(&a).unwrap();
                    g.remove_turn_restriction(&b).unwrap();
                }
            },
            || {
                for _ in 0..2_000 {
                    let snapshot = g.turn_restrictions(ab).unwrap();
                    assert!(snapshot.len() <= 2);
                    assert!(snapshot.iter().all(|r| r.from == ab && r.to == bc));
                }
            },
        );
        assert!(g.turn_restrictions(ab).unwrap().is_empty());
    }
}
