//! Supported spec dialects.
//!
//! The `compiler` block of a spec selects one of a fixed set of dialects.
//! Each dialect is a compile-time variant carrying the conventions the
//! generator needs for that spec generation.

use std::fmt;

use semver::{Version, VersionReq};

use crate::models::CompilerInfo;

/// Compiler identifier this toolchain answers to.
pub const COMPILER_ID: &str = "appforge";

/// A supported spec dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecDialect {
    /// Pre-1.0 specs: flat page templates.
    V0,
    /// 1.x specs: island-hydrated pages.
    V1,
}

impl SpecDialect {
    /// Dialect assumed when the declared one is not recognised.
    pub const LATEST: SpecDialect = SpecDialect::V1;

    pub fn all() -> [SpecDialect; 2] {
        [SpecDialect::V0, SpecDialect::V1]
    }

    /// Compatible `compiler.version` range.
    pub fn version_range(&self) -> &'static str {
        match self {
            SpecDialect::V0 => ">=0.1.0, <1.0.0",
            SpecDialect::V1 => ">=1.0.0, <2.0.0",
        }
    }

    /// Template used when neither the caller nor the configuration picks one.
    pub fn default_template(&self) -> &'static str {
        match self {
            SpecDialect::V0 => "classic",
            SpecDialect::V1 => "islands",
        }
    }

    /// Where route metadata is written when the template does not say.
    pub fn route_metadata_file(&self) -> &'static str {
        match self {
            SpecDialect::V0 => "routes.json",
            SpecDialect::V1 => "app.routes.json",
        }
    }

    /// Select the dialect matching a `compiler` declaration.
    ///
    /// The error carries a human-readable reason, which the validator reports
    /// as a warning.
    pub fn detect(compiler: &CompilerInfo) -> Result<SpecDialect, String> {
        if compiler.id != COMPILER_ID {
            return Err(format!(
                "unknown compiler '{}' (expected '{}'), assuming dialect {}",
                compiler.id,
                COMPILER_ID,
                Self::LATEST
            ));
        }

        let version = parse_lenient(&compiler.version).ok_or_else(|| {
            format!(
                "compiler version '{}' is not a valid version, assuming dialect {}",
                compiler.version,
                Self::LATEST
            )
        })?;

        Self::all()
            .into_iter()
            .find(|dialect| {
                VersionReq::parse(dialect.version_range())
                    .map(|req| req.matches(&version))
                    .unwrap_or(false)
            })
            .ok_or_else(|| {
                format!(
                    "compiler version {} is outside the supported range, assuming dialect {}",
                    version,
                    Self::LATEST
                )
            })
    }
}

impl fmt::Display for SpecDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecDialect::V0 => f.write_str("v0"),
            SpecDialect::V1 => f.write_str("v1"),
        }
    }
}

/// Parse `1`, `1.2` and `1.2.3` alike.
fn parse_lenient(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches('v');
    let padded = match raw.matches('.').count() {
        0 => format!("{}.0.0", raw),
        1 => format!("{}.0", raw),
        _ => raw.to_string(),
    };
    Version::parse(&padded).ok()
}
