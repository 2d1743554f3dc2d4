// Domain layer: request-scoped models and ports (interfaces). No HTTP framework types here.

pub mod model;
pub mod ports;
