//! Domain models for the route billing platform

mod bill;
mod item;
mod route;
mod vendor;

pub use bill::*;
pub use item::*;
pub use route::*;
pub use vendor::*;
