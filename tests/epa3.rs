use approx::assert_relative_eq;
use depth3d::math::{Isometry, Vector};
use depth3d::na::Unit;
use depth3d::query::epa::{run_epa, CsoPoint};
use depth3d::query::{ContactArena, NarrowPhaseContactRecord, PairShape, ShapeArena};
use depth3d::shape::{Ball, Cuboid, SupportMap};

/// Builds an initial tetrahedron from four support directions whose
/// Minkowski-difference support points enclose the origin. This stands in
/// for the upstream simplex algorithm; each test's directions are chosen so
/// that the enclosure holds for its specific pair of shapes.
fn simplex_toward<G1, G2>(pos12: &Isometry, g1: &G1, g2: &G2, dirs: [Vector; 4]) -> [CsoPoint; 4]
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    dirs.map(|dir| CsoPoint::from_shapes_toward(pos12, g1, g2, &Unit::new_normalize(dir)))
}

#[test]
fn cuboid_cuboid_epa() {
    // Two unit-half-extent boxes overlapping by 0.2 along x.
    let c = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
    let pos12 = Isometry::translation(1.8, 0.0, 0.0);

    let simplex = simplex_toward(
        &pos12,
        &c,
        &c,
        [
            Vector::new(1.0, 1.0, 1.0),
            Vector::new(1.0, -1.0, -1.0),
            Vector::new(-1.0, -1.0, 1.0),
            Vector::new(-1.0, 1.0, -1.0),
        ],
    );

    let contact = run_epa(&pos12, &c, &c, simplex).unwrap();

    assert_relative_eq!(contact.depth, 0.2, epsilon = 1.0e-4);
    assert_relative_eq!(contact.normal.into_inner(), Vector::x(), epsilon = 1.0e-4);
    assert_relative_eq!(contact.local_point1.x, 1.0, epsilon = 1.0e-4);
    assert_relative_eq!(contact.local_point2.x, -1.0, epsilon = 1.0e-4);
}

#[test]
fn ball_ball_epa() {
    // Two unit balls with centers 1.5 apart overlap by 0.5.
    let b = Ball::new(1.0);
    let pos12 = Isometry::translation(1.5, 0.0, 0.0);

    let simplex = simplex_toward(
        &pos12,
        &b,
        &b,
        [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(-0.5, 0.866, 0.0),
            Vector::new(-0.5, -0.433, 0.75),
            Vector::new(-0.5, -0.433, -0.75),
        ],
    );

    let contact = run_epa(&pos12, &b, &b, simplex).unwrap();

    assert_relative_eq!(contact.depth, 0.5, epsilon = 1.0e-3);
    // The normal must be parallel to the center-to-center axis.
    assert_relative_eq!(contact.normal.x.abs(), 1.0, epsilon = 1.0e-3);
    assert_relative_eq!(contact.local_point1.x, 1.0, epsilon = 1.0e-3);
}

#[test]
fn surface_contact_terminates() {
    // Two unit balls in exact surface contact: overlap zero. The run must
    // converge to a zero-depth contact, never loop forever.
    let b = Ball::new(1.0);
    let pos12 = Isometry::translation(2.0, 0.0, 0.0);

    let simplex = simplex_toward(
        &pos12,
        &b,
        &b,
        [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(-0.5, 0.866, 0.0),
            Vector::new(-0.5, -0.433, 0.75),
            Vector::new(-0.5, -0.433, -0.75),
        ],
    );

    let contact = run_epa(&pos12, &b, &b, simplex).unwrap();
    assert!(contact.depth.abs() < 1.0e-3);
}

#[test]
fn epa_output_flows_into_the_contact_record() {
    let b = Ball::new(1.0);
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(1.5, 0.0, 0.0);

    let mut contacts = ContactArena::new();
    let mut shapes = ShapeArena::new();
    let mut record = NarrowPhaseContactRecord::new(
        PairShape::Shared(&b),
        PairShape::Shared(&b),
        pos1,
        pos2,
    );

    let pos12 = record.pos12();
    let simplex = simplex_toward(
        &pos12,
        &b,
        &b,
        [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(-0.5, 0.866, 0.0),
            Vector::new(-0.5, -0.433, 0.75),
            Vector::new(-0.5, -0.433, -0.75),
        ],
    );

    let contact = run_epa(&pos12, &b, &b, simplex).unwrap();
    record.add_contact_point(
        &mut contacts,
        contact.normal,
        contact.depth,
        contact.local_point1,
        contact.local_point2,
    );

    assert_eq!(record.contact_points(&contacts).count(), 1);
    let recorded = record.contact_points(&contacts).next().unwrap();
    assert!(recorded.depth > 0.4);

    record.reset_contact_points(&mut contacts);
    assert!(contacts.is_empty());
    record.release(&mut shapes);
}
