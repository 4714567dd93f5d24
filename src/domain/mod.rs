// Domain layer: models and ports (interfaces) shared by the flows and the adapters.

pub mod model;
pub mod ports;
