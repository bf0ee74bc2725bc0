//! Numerical primitives for SCPN Geodesic Core.

pub mod brent;
pub mod jet;
pub mod rk45;
pub mod simplex;
