mod interface;

pub use interface::{DynPlacesAPI, PlacesAPI};
