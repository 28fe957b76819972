pub mod actuals;
pub mod project;
pub mod solution;
pub mod team;
