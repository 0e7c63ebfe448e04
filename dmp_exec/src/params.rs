//! Parameters structure for the DMP executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::dmp::FnApproxKind;
use serde::{Deserialize, Serialize};

use crate::plan::MAX_PLAN_LENGTH_S;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the DMP server and executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Minimum level of log messages, for example `"debug"`.
    pub log_level: String,

    /// If true every response is saved into the session directory.
    pub save_responses: bool,

    /// Approximator used by learn requests which don't specify one.
    ///
    /// Plans always replay the approximator each primitive was learned with.
    pub default_approx: FnApproxKind,

    /// Hard limit on the length of a plan.
    ///
    /// Units: seconds
    pub max_plan_length_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            save_responses: true,
            default_approx: FnApproxKind::Fourier,
            max_plan_length_s: MAX_PLAN_LENGTH_S,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params_file() {
        let params: Params = util::params::from_toml_str(
            "log_level = \"debug\"\ndefault_approx = \"Linear\"",
        )
        .unwrap();

        assert_eq!(params.log_level, "debug");
        assert_eq!(params.default_approx, FnApproxKind::Linear);
        assert_eq!(params.max_plan_length_s, MAX_PLAN_LENGTH_S);
        assert!(params.save_responses);
    }
}
