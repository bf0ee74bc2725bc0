// ─────────────────────────────────────────────────────────────────────
// SCPN Geodesic Core — Error Types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeodesicError {
    #[error("Output buffer length mismatch: alpha={alpha_len}, beta={beta_len}, expected {expected}")]
    BufferSizeMismatch {
        alpha_len: usize,
        beta_len: usize,
        expected: usize,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Radiative transfer requires an accretion geometry, none was supplied")]
    MissingGeometry,

    #[error("Not implemented for this combination: metric={metric}, model={model}, geometry={geometry}")]
    NotImplemented {
        metric: String,
        model: String,
        geometry: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GeodesicResult<T> = Result<T, GeodesicError>;
