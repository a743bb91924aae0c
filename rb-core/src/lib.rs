//! # RB Core
//!
//! Rigid-body dynamics in momentum space, integrated with classical RK4.
//!
//! ## Architecture
//!
//! - `linalg`: Vector, Matrix and Quaternion value types
//! - `forces`: Force/torque function contract and stock force laws
//! - `body`: Rigid-body state, configuration and lifecycle
//! - `integrator`: RK4 stepping and derived-quantity computation
//! - `scene`: Bodies stepped together on a fixed timestep
//! - `builder`: Object-kind registry and the harmonic oscillator preset
//! - `config`: YAML scene loader

pub mod body;
pub mod builder;
pub mod config;
pub mod forces;
pub mod integrator;
pub mod linalg;
pub mod scene;

pub use body::{BodyError, RigidBody};
pub use builder::{harmonic_oscillator_scene, ObjectKind, ObjectRegistry};
pub use config::{ConfigError, ObjectSpec, SceneConfig, SceneLoader};
pub use forces::{BodySnapshot, ForceFunction};
pub use linalg::{MathError, Matrix, Quaternion, Vector};
pub use scene::{Scene, SceneError, SceneObject};
