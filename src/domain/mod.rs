pub mod coerce;
pub mod geo;
pub mod normalize;
pub mod outliers;
pub mod table;
