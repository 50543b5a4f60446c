// Domain layer: depth types, feature vectors and ports (interfaces).

pub mod features;
pub mod model;
pub mod ports;
