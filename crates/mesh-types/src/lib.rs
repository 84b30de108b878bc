pub mod error;
pub mod face;
pub mod ids;
pub mod point;
pub mod tolerances;
pub mod vector;

pub use error::*;
pub use face::*;
pub use ids::*;
pub use point::*;
pub use tolerances::*;
pub use vector::*;
