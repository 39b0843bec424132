//! Simulation state advanced once per frame.

mod camera;
mod height_field;
mod particles;
mod turbulence;
mod uniforms;

pub use camera::{Camera, Projected};
pub use height_field::HeightField;
pub use particles::{wrap_point, Particle, ParticleField};
pub use turbulence::{Displacement, DisplacementOptions};
pub use uniforms::ShaderUniformSet;
