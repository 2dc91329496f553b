//! Corporate projection models and the calculations behind the service's
//! `/corporate/*` endpoints.

pub mod corporate;
pub mod schemas;

pub use corporate::{
    build_cash_flow_projection, build_financial_health_analysis, build_pyg_projection,
    ProjectionKind,
};
pub use schemas::*;
