pub mod bdeck;
pub mod bulletins;
pub mod fetch;
pub mod geometry;
pub mod ibtracs;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod output;
pub mod store;
pub mod summary;
