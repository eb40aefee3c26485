pub mod fitting;
pub mod geometry;
pub mod statistics;
