mod armature;
mod bone;
mod scene;
mod transform;
mod weight;

pub use armature::*;
pub use bone::*;
pub use scene::*;
pub use transform::*;
pub use weight::*;


#[cfg(test)]
mod transform_tests;

#[cfg(test)]
mod weight_tests;
