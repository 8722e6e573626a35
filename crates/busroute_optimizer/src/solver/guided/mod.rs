pub mod edge_penalties;
