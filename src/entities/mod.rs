mod location;
mod query;
mod restaurant;

pub use location::{Coordinates, Fix, Region, Span, DEFAULT_SPAN_DEGREES};
pub use query::{SearchQuery, DEFAULT_PLACE_TYPE, DEFAULT_RADIUS};
pub use restaurant::Restaurant;
