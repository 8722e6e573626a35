use crate::{define_index_newtype, problem::location::Location};

define_index_newtype!(NodeIdx, Node);

/// A stop of the problem. The depot is a node with zero demand.
#[derive(Debug, Clone)]
pub struct Node {
    location: Location,
    demand: u64,
}

impl Node {
    pub fn new(location: Location, demand: u64) -> Self {
        Node { location, demand }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn demand(&self) -> u64 {
        self.demand
    }
}
