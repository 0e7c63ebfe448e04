//! # Communications interface crate.
//!
//! Provides the data types exchanged with the DMP software: demonstrations,
//! fitted primitives, plans and the requests/responses that carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Movement primitive data and service messages
pub mod dmp;
