//! # DMP request script interpreter
//!
//! Scripts are a sequence of labelled JSON requests, each terminated by a
//! semicolon:
//!
//! ```text
//! learn_reach: {"type": "LEARN_FROM_DEMO", "payload": {...}};
//! plan_reach: {"type": "GET_PLAN", "payload": {...}};
//! ```
//!
//! Labels must be unique within a script as they name the saved responses.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use comms_if::dmp::{DmpRequest, RequestParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A labelled request read from a script.
#[derive(Debug, Clone)]
pub struct ScriptEntry {
    pub label: String,
    pub request: DmpRequest,
}

/// A script interpreter.
///
/// After loading a script use `.next_entry` to pop the requests in order.
pub struct ScriptInterpreter {
    entries: VecDeque<ScriptEntry>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("Could not build the script pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("The label \"{0}\" is used more than once")]
    DuplicateLabel(String),

    #[error("Script contains an invalid request at \"{0}\": {1}")]
    InvalidRequest(String, RequestParseError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let script = fs::read_to_string(script_path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_script(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        // Label, colon, then everything up to the next semicolon
        let re = RegexBuilder::new(r"^\s*([A-Za-z0-9_\-]+)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()?;

        let mut entries = VecDeque::new();
        let mut labels = HashSet::new();

        for cap in re.captures_iter(script) {
            let label = cap[1].to_string();

            if !labels.insert(label.clone()) {
                return Err(ScriptError::DuplicateLabel(label));
            }

            let request = DmpRequest::from_json(&cap[2])
                .map_err(|e| ScriptError::InvalidRequest(label.clone(), e))?;

            entries.push_back(ScriptEntry { label, request });
        }

        if entries.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { entries })
    }

    /// Pop the next request in the script, or `None` at the end of the script.
    pub fn next_entry(&mut self) -> Option<ScriptEntry> {
        self.entries.pop_front()
    }

    /// Get the number of requests left in the script
    pub fn get_num_requests(&self) -> usize {
        self.entries.len()
    }
}
