//! End-to-end integration scenarios with known analytic solutions.

use std::f64::consts::{FRAC_PI_4, PI};

use approx::{assert_abs_diff_eq, assert_relative_eq};

use rb_core::builder::{harmonic_oscillator_scene, ObjectRegistry};
use rb_core::forces::{ConstantForce, ForceSum, LinearDamping, SpringForce, ZeroForce};
use rb_core::{BodyError, Matrix, Quaternion, RigidBody, Vector};

fn planar_body(mass: f64, position: Vector, momentum: Vector) -> RigidBody {
    let mut body = RigidBody::planar();
    body.set_mass(mass);
    body.set_state(position, Quaternion::IDENTITY, momentum, Vector::zeros(2))
        .unwrap();
    body.set_torque_function(ZeroForce);
    body
}

fn integrate(body: &mut RigidBody, dt: f64, steps: usize) {
    for i in 0..steps {
        body.update(i as f64 * dt, dt).unwrap();
    }
}

#[test]
fn test_free_body_stays_at_rest() {
    for dt in [1e-3, 0.2, 5.0] {
        let mut body = planar_body(3.0, Vector::zeros(2), Vector::zeros(2));
        body.set_force_function(ZeroForce);
        body.initialize().unwrap();

        integrate(&mut body, dt, 50);
        assert_eq!(body.position(), &Vector::zeros(2), "dt = {}", dt);
        assert_eq!(body.linear_momentum(), &Vector::zeros(2));
        assert_eq!(body.orientation(), Quaternion::IDENTITY);
    }
}

#[test]
fn test_constant_force_matches_kinematics() {
    let mut body = planar_body(1.0, Vector::zeros(2), Vector::zeros(2));
    body.set_force_function(ConstantForce(Vector::new2(10.0, 0.0)));
    body.initialize().unwrap();

    integrate(&mut body, 0.01, 100);

    // x(1) = 0.5 * F / m * t²
    assert_relative_eq!(body.position().get(0).unwrap(), 5.0, epsilon = 1e-9);
    assert_relative_eq!(body.position().get(1).unwrap(), 0.0);
    assert_relative_eq!(body.linear_velocity().get(0).unwrap(), 10.0, epsilon = 1e-9);
}

#[test]
fn test_harmonic_oscillator_period() {
    let (k, rest, mass) = (50.0, 50.0, 20.0);
    let spring = SpringForce::new(k, rest, 0.0);
    let omega = spring.angular_frequency(mass);
    let period = 2.0 * PI / omega;

    let mut body = planar_body(mass, Vector::new2(80.0, 0.0), Vector::zeros(2));
    body.set_force_function(spring);
    body.initialize().unwrap();

    let dt = 0.01;
    let mut crossings = Vec::new();
    let mut max_x = f64::MIN;
    let mut prev_x = body.position().get(0).unwrap();
    for i in 0..1300 {
        let t = i as f64 * dt;
        body.update(t, dt).unwrap();
        let x = body.position().get(0).unwrap();
        max_x = max_x.max(x);

        // downward crossings of the rest length
        if prev_x > rest && x <= rest {
            let fraction = (prev_x - rest) / (prev_x - x);
            crossings.push(t + fraction * dt);
        }
        prev_x = x;
    }

    assert!(crossings.len() >= 3, "Expected at least 3 crossings, got {}", crossings.len());
    // x(t) = 50 + 30 cos(ωt) first reaches 50 at ωt = π/2
    assert_abs_diff_eq!(crossings[0], 0.25 * period, epsilon = 1e-3);
    for pair in crossings.windows(2) {
        assert_abs_diff_eq!(pair[1] - pair[0], period, epsilon = 1e-3);
    }
    assert_abs_diff_eq!(max_x, 80.0, epsilon = 5e-3);
}

#[test]
fn test_zero_mass_fails_regardless_of_configuration() {
    let mut body = RigidBody::spatial();
    body.set_inertia(Matrix::identity(3)).unwrap();
    body.set_force_function(ZeroForce);
    body.set_torque_function(ZeroForce);
    body.set_state(
        Vector::new3(1.0, 2.0, 3.0),
        Quaternion::IDENTITY,
        Vector::new3(1.0, 0.0, 0.0),
        Vector::new3(0.0, 1.0, 0.0),
    )
    .unwrap();

    let err = body.initialize().unwrap_err();
    assert!(matches!(err, BodyError::Initialization { .. }), "got {:?}", err);
    assert!(body.update(0.0, 0.1).unwrap_err().is_not_initialized());
}

#[test]
fn test_isotropic_spin_about_z() {
    let mut body = RigidBody::spatial();
    body.set_mass(1.0);
    body.set_inertia(Matrix::from_diagonal(&[2.0, 2.0, 2.0])).unwrap();
    body.set_force_function(ZeroForce);
    body.set_torque_function(ZeroForce);
    body.set_state(
        Vector::zeros(3),
        Quaternion::IDENTITY,
        Vector::zeros(3),
        Vector::new3(0.0, 0.0, 2.0),
    )
    .unwrap();
    body.initialize().unwrap();
    assert_eq!(body.angular_velocity(), &Vector::new3(0.0, 0.0, 1.0));

    // W = 1 rad/s for π/2 s: a quarter turn
    integrate(&mut body, PI / 200.0, 100);

    let q = body.orientation();
    assert_abs_diff_eq!(q.w, FRAC_PI_4.cos(), epsilon = 1e-6);
    assert_abs_diff_eq!(q.x, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(q.y, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(q.z, FRAC_PI_4.sin(), epsilon = 1e-6);

    let r = body.rotation_matrix();
    assert_abs_diff_eq!(r.get(0, 1).unwrap(), -1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(r.get(1, 0).unwrap(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(r.get(2, 2).unwrap(), 1.0, epsilon = 1e-6);

    assert_eq!(body.angular_momentum(), &Vector::new3(0.0, 0.0, 2.0));
    assert_abs_diff_eq!(q.length(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_linear_damping_decays_exponentially() {
    let mut body = planar_body(1.0, Vector::zeros(2), Vector::new2(1.0, 0.0));
    body.set_force_function(LinearDamping { coefficient: 2.0 });
    body.initialize().unwrap();

    integrate(&mut body, 0.01, 100);

    // v(t) = e^(-2t), x(t) = (1 - e^(-2t)) / 2
    let decay = (-2.0_f64).exp();
    assert_relative_eq!(body.linear_momentum().get(0).unwrap(), decay, epsilon = 1e-8);
    assert_relative_eq!(body.position().get(0).unwrap(), 0.5 * (1.0 - decay), epsilon = 1e-8);
}

#[test]
fn test_projectile_with_sum_of_forces() {
    let gravity = Vector::new2(0.0, -9.81 * 2.0);
    let mut body = planar_body(2.0, Vector::zeros(2), Vector::new2(6.0, 20.0));
    body.set_force_function(ForceSum::new().with(ConstantForce(gravity)).with(ZeroForce));
    body.initialize().unwrap();

    integrate(&mut body, 0.05, 20);

    // vx = 3, vy0 = 10, g = 9.81, t = 1
    assert_relative_eq!(body.position().get(0).unwrap(), 3.0, epsilon = 1e-9);
    assert_relative_eq!(body.position().get(1).unwrap(), 10.0 - 0.5 * 9.81, epsilon = 1e-9);
}

#[test]
fn test_sum_with_wrong_size_term_fails_update() {
    let mut body = planar_body(1.0, Vector::new2(1.0, 2.0), Vector::zeros(2));
    body.set_force_function(
        ForceSum::new()
            .with(ConstantForce(Vector::new2(0.0, -9.81)))
            .with(ConstantForce(Vector::new3(5.0, 0.0, 0.0))),
    );
    body.initialize().unwrap();

    let err = body.update(0.0, 0.1).unwrap_err();
    assert!(matches!(err, BodyError::Math(_)), "got {:?}", err);
    assert_eq!(body.position(), &Vector::new2(1.0, 2.0));
}

#[test]
fn test_harmonic_scene_stays_between_anchor_and_turning_point() {
    let mut scene = harmonic_oscillator_scene(&ObjectRegistry::default()).unwrap();

    for _ in 0..100 {
        scene.step().unwrap();
        // spring-a: anchor 100, equilibrium 150, amplitude 50
        let a = scene.object("spring-a").unwrap().position().get(0).unwrap();
        assert!((98.0..=202.0).contains(&a), "spring-a out of range: {}", a);
        // spring-b: anchor 10, equilibrium 210, amplitude 200
        let b = scene.object("spring-b").unwrap().position().get(0).unwrap();
        assert!((8.0..=412.0).contains(&b), "spring-b out of range: {}", b);
    }
    assert_relative_eq!(scene.time(), 20.0, epsilon = 1e-9);
}
