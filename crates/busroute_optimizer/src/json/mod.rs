pub mod api_solution;
pub mod legacy;
pub mod schema;
pub mod types;
