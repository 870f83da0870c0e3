use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use arc_path::{
    build_path_from_waypoints, math::Point2, MotionConstraints, MotionGoal, MotionProfile,
    MotionState, PathBuilder, PathConfig, PathError, ProfileGenerator, TrapezoidGenerator,
    TrapezoidProfile, Waypoint,
};

fn l_course() -> Vec<Waypoint> {
    vec![
        Waypoint::new(0., 0., 0., 60.),
        Waypoint::new(50., 0., 20., 60.),
        Waypoint::new(50., 50., 0., 60.),
    ]
}

fn zigzag() -> Vec<Waypoint> {
    vec![
        Waypoint::new(0., 0., 0., 40.),
        Waypoint::new(80., 0., 15., 70.),
        Waypoint::new(80., 90., 25., 50.),
        Waypoint::new(-20., 40., 10., 90.),
        Waypoint::new(30., -30., 0., 30.),
    ]
}

/// Random course whose legs all leave room for both blend radii.
fn random_course(rng: &mut StdRng) -> Vec<Waypoint> {
    let n = rng.gen_range(2..=7);
    let mut course = vec![Waypoint::new(
        rng.gen_range(0.0..200.0),
        rng.gen_range(0.0..200.0),
        0.,
        rng.gen_range(5.0..100.0),
    )];
    while course.len() < n {
        let Some(previous) = course.last() else {
            break;
        };
        let last = course.len() + 1 == n;
        let radius = if last { 0. } else { rng.gen_range(0.0..12.0) };
        let candidate = Waypoint::new(
            rng.gen_range(0.0..200.0),
            rng.gen_range(0.0..200.0),
            radius,
            rng.gen_range(5.0..100.0),
        );
        let leg = (candidate.position() - previous.position()).norm();
        if leg > previous.radius() + radius + 1. {
            course.push(candidate);
        }
    }
    course
}

#[test]
fn random_courses_build_and_stay_continuous() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let course = random_course(&mut rng);
        let path = match build_path_from_waypoints(&course) {
            Ok(path) => path,
            Err(e) => panic!("{e} for {course:?}"),
        };
        assert!(!path.is_empty());
        for pair in path.segments().windows(2) {
            assert_eq!(pair[0].end_state(), pair[1].start_state());
        }
        assert_relative_eq!(path.last_motion_state().pos, path.length(), epsilon = 1e-6);

        for _ in 0..10 {
            let probe = Point2::new(rng.gen_range(-50.0..250.0), rng.gen_range(-50.0..250.0));
            assert!(path.speed_by_closest_point(probe).is_finite());
            for segment in path.segments() {
                assert!(segment.speed_by_closest_point(probe).is_finite());
            }
        }
    }
}

#[test]
fn straight_line_between_two_waypoints() {
    let path = build_path_from_waypoints(&[
        Waypoint::new(0., 0., 0., 60.),
        Waypoint::new(100., 0., 0., 60.),
    ])
    .expect("valid path");
    assert_eq!(path.len(), 1);
    let line = &path.segments()[0];
    assert!(line.is_line());
    assert_relative_eq!(line.length(), 100.0);
    assert_eq!(line.max_speed(), 60.0);
    assert_eq!(line.end_speed(), 0.0);
    assert!(line.extrapolates_lookahead());
}

#[test]
fn corner_gets_a_tangent_arc() {
    let path = build_path_from_waypoints(&l_course()).expect("valid path");
    assert_eq!(path.len(), 3);
    let [first, arc, last] = path.segments() else {
        panic!("expected three segments");
    };

    assert!(first.is_line());
    assert_eq!(first.start(), Point2::new(0., 0.));
    assert_relative_eq!(first.end().x, 30.0, epsilon = 1e-9);
    assert_relative_eq!(first.end().y, 0.0, epsilon = 1e-9);

    assert!(!arc.is_line());
    let center = arc.center().expect("arc has a center");
    assert_relative_eq!(center.x, 30.0, epsilon = 1e-9);
    assert_relative_eq!(center.y, 20.0, epsilon = 1e-9);
    assert_relative_eq!((arc.start() - center).norm(), 20.0, epsilon = 1e-9);
    assert_relative_eq!((arc.end() - center).norm(), 20.0, epsilon = 1e-9);
    assert_relative_eq!(arc.length(), 20. * FRAC_PI_2, epsilon = 1e-9);

    assert!(last.is_line());
    assert_relative_eq!(last.start().x, 50.0, epsilon = 1e-9);
    assert_relative_eq!(last.start().y, 20.0, epsilon = 1e-9);
    assert_eq!(last.end(), Point2::new(50., 50.));
    assert_eq!(last.end_speed(), 0.0);
}

#[test]
fn sharp_and_straight_corners_have_no_arc() {
    let sharp = build_path_from_waypoints(&[
        Waypoint::new(0., 0., 0., 60.),
        Waypoint::new(50., 0., 0., 60.),
        Waypoint::new(50., 50., 0., 60.),
    ])
    .expect("valid path");
    assert_eq!(sharp.len(), 2);
    assert!(sharp.segments().iter().all(|s| s.is_line()));

    let straight = build_path_from_waypoints(&[
        Waypoint::new(0., 0., 0., 60.),
        Waypoint::new(50., 0., 10., 60.),
        Waypoint::new(100., 0., 0., 60.),
    ])
    .expect("valid path");
    assert!(straight.segments().iter().all(|s| s.is_line()));
    assert_relative_eq!(straight.length(), 100.0, epsilon = 1e-9);
}

#[test]
fn path_length_is_the_sum_of_segments() {
    let path = build_path_from_waypoints(&zigzag()).expect("valid path");
    let sum: f64 = path.segments().iter().map(|s| s.length()).sum();
    assert_relative_eq!(path.length(), sum, epsilon = 1e-9);
    assert_relative_eq!(path.last_motion_state().pos, sum, epsilon = 1e-6);
}

#[test]
fn closest_points_stay_on_the_segment() {
    let path = build_path_from_waypoints(&zigzag()).expect("valid path");
    let probes = [
        Point2::new(-100., -100.),
        Point2::new(40., 40.),
        Point2::new(500., 3.),
        Point2::new(80., 0.),
    ];
    for segment in path.segments() {
        let ends = (segment.start() - segment.end()).norm();
        for probe in probes {
            let point = segment.closest_point(probe);
            let remaining = segment.remaining_distance(point);
            assert!(remaining >= -1e-9 && remaining <= segment.length() + 1e-9);
            if let Some(center) = segment.center() {
                let radius = (segment.start() - center).norm();
                assert_relative_eq!((point - center).norm(), radius, epsilon = 1e-6);
            } else {
                // on the chord between the two ends
                let via = (point - segment.start()).norm() + (segment.end() - point).norm();
                assert_relative_eq!(via, ends, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn point_by_distance_hits_the_ends() {
    let path = build_path_from_waypoints(&zigzag()).expect("valid path");
    let last = path.len() - 1;
    for (i, segment) in path.segments().iter().enumerate() {
        let start = segment.point_by_distance(0.);
        let end = segment.point_by_distance(segment.length());
        assert_relative_eq!((start - segment.start()).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!((end - segment.end()).norm(), 0.0, epsilon = 1e-6);

        let beyond = segment.point_by_distance(segment.length() + 10.);
        if i == last {
            assert_relative_eq!((beyond - segment.end()).norm(), 10.0, epsilon = 1e-6);
        } else {
            assert_relative_eq!((beyond - segment.end()).norm(), 0.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn segments_share_boundary_states() {
    let path = build_path_from_waypoints(&zigzag()).expect("valid path");
    for pair in path.segments().windows(2) {
        assert_eq!(pair[0].end_state(), pair[1].start_state());
        assert_relative_eq!(
            pair[0].end_state().pos - pair[0].start_state().pos,
            pair[0].length(),
            epsilon = 1e-6
        );
    }
    assert_relative_eq!(path.last_motion_state().vel, 0.0, epsilon = 1e-6);
}

#[test]
fn speed_lookup_never_fails() {
    let path = build_path_from_waypoints(&zigzag()).expect("valid path");
    for segment in path.segments() {
        for dist in [
            -10.,
            0.,
            segment.length() / 3.,
            segment.length(),
            segment.length() * 2.,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ] {
            let speed = segment.speed_by_distance(dist);
            assert!(speed.is_finite());
            assert!(speed >= -1e-9);
            assert!(speed <= segment.max_speed().max(segment.start_state().vel) + 1e-6);
        }
    }
}

#[test]
fn cruise_speed_is_respected() {
    let path = build_path_from_waypoints(&zigzag()).expect("valid path");
    for segment in path.segments() {
        let samples = 20;
        for k in 0..=samples {
            let speed = segment.speed_by_distance(segment.length() * k as f64 / samples as f64);
            assert!(speed <= segment.max_speed().max(segment.start_state().vel) + 1e-6);
        }
    }
}

#[test]
fn loaded_config_drives_the_profiles() {
    let config = PathConfig::from_toml_str("max_accel = 10.0").expect("valid config");
    let slow = PathBuilder::new(config)
        .build(&l_course())
        .expect("valid path");
    let fast = build_path_from_waypoints(&l_course()).expect("valid path");
    assert!(slow.duration() > fast.duration());
    assert_relative_eq!(slow.length(), fast.length(), epsilon = 1e-9);
}

#[test]
fn rejects_bad_input() {
    assert!(matches!(
        build_path_from_waypoints(&[Waypoint::new(0., 0., 0., 60.)]),
        Err(PathError::NotEnoughWaypoints(1))
    ));
    assert!(matches!(
        build_path_from_waypoints(&[]),
        Err(PathError::NotEnoughWaypoints(0))
    ));
    assert!(matches!(
        build_path_from_waypoints(&[
            Waypoint::new(3., 3., 0., 60.),
            Waypoint::new(3., 3., 0., 60.),
        ]),
        Err(PathError::NoSegments)
    ));
}

/// Trapezoid profiles capped at half the requested speed.
struct Cautious;

impl ProfileGenerator for Cautious {
    type Profile = TrapezoidProfile;

    fn generate(
        &self,
        constraints: MotionConstraints,
        goal: MotionGoal,
        start: MotionState,
    ) -> TrapezoidProfile {
        let constraints = MotionConstraints::new(constraints.max_vel / 2., constraints.max_accel);
        TrapezoidGenerator.generate(constraints, goal, start)
    }
}

#[test]
fn custom_generator_is_used_for_every_segment() {
    let path = PathBuilder::with_generator(PathConfig::default(), Cautious)
        .build(&l_course())
        .expect("valid path");
    for segment in path.segments() {
        let mid = segment
            .profile()
            .first_state_by_pos(segment.start_state().pos + segment.length() / 2.)
            .expect("profile covers the segment");
        assert!(mid.vel <= 30. + 1e-6);
    }
}
