//! Module interfaces
//!
//! Each processing module in `dmp_exec` implements the items in this
//! module, so the executable can drive them all the same way.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::warn;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for processing.
    type InputData;
    /// Data produced by processing.
    type OutputData;
    /// A report on the status of the processing.
    type StatusReport;
    /// An error which can occur during processing.
    type ProcError: std::fmt::Display;

    /// Short name of the module used in log messages.
    const NAME: &'static str;

    /// Initialise the module.
    ///
    /// # Inputs
    /// - `init_data`: The input data required by the module
    ///
    /// # Outputs
    /// - On success `Ok(())`.
    /// - On error an `InitError` instance.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Main module processing function.
    ///
    /// # Inputs
    /// - `input_data`: The data required for processing by the module.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Run `proc`, logging a warning tagged with the module name on failure.
    fn proc_logged(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.proc(input_data).map_err(|e| {
            warn!("{} processing failed: {}", Self::NAME, e);
            e
        })
    }
}
