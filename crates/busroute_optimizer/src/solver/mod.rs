pub mod construction;
pub mod error;
pub mod guided;
pub mod ls;
pub mod search;
pub mod solution;
pub mod solver;
pub mod solver_params;
pub mod statistics;
