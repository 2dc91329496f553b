// Domain layer: models and ports. No network or filesystem code lives here.

pub mod model;
pub mod ports;
