// Domain layer: the retrieval data model and the configuration port.

pub mod model;
pub mod ports;
