// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geodesic tracing and inverse-mapping engine: adaptive integration with
//! event-driven termination, image-plane inversion, target-point
//! optimization, forward-mode sensitivities, radiative transfer and
//! flux/redshift post-processing.

pub mod corona;
pub mod flux;
pub mod geometry;
pub mod inversion;
pub mod jacobian;
pub mod optimizer;
pub mod tracer;
pub mod transfer;

pub use corona::{CoronaModel, LampPost};
pub use flux::{lorentz_factor, reflected_flux_map, DiscTessellation};
pub use geometry::{AccretionGeometry, CrossingEffect, ThickDisc, ThinDisc};
pub use inversion::{find_offset_for_radius, impact_parameters_for_radius,
    impact_parameters_for_radius_into};
pub use jacobian::jacobian_area_factor;
pub use optimizer::{optimize_for_target, optimize_for_target_with, ImagePlaneMinimizer,
    SimplexMinimizer, TargetResult};
pub use tracer::{impact_parameter_velocity, trace_all, trace_geodesic, trace_with_transfer,
    TracerSession};
pub use transfer::disc_four_velocity;
