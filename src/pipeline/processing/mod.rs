// Table transformations: bronze normalization, quality checks, and the gold join

pub mod join;
pub mod normalize;
pub mod quality_gate;
