//! Implementations for the DmpServer state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::ServerError;
use crate::{
    learn::learn_from_demo,
    params::Params,
    plan::{generate_plan, PlanStop},
};
use comms_if::dmp::{
    DmpData, DmpRequest, DmpResponse, GetActiveDmpResponse, GetDmpPlanRequest,
    GetDmpPlanResponse, LearnDmpFromDemoRequest, LearnDmpFromDemoResponse, SetActiveDmpRequest,
    SetActiveDmpResponse,
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// DMP server state
#[derive(Default)]
pub struct DmpServer {
    pub(crate) params: Params,

    /// The active primitive set.
    ///
    /// Replaced wholesale by `SetActive`, readers take a clone of the `Arc`
    /// so a set in use is never modified.
    active: Option<Arc<Vec<DmpData>>>,
}

/// Status report for DmpServer processing.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Name of the request that was processed
    pub request: &'static str,

    /// Number of primitives learned, activated or planned with
    pub num_dmps: usize,

    /// Number of points in the generated plan
    pub plan_points: usize,

    pub at_goal: bool,

    pub stop_reason: Option<PlanStop>,

    pub coupling_active: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DmpServer {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = DmpRequest;
    type OutputData = DmpResponse;
    type StatusReport = StatusReport;
    type ProcError = ServerError;

    const NAME: &'static str = "DmpServer";

    /// Initialise the DmpServer.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut report = StatusReport {
            request: input_data.name(),
            ..Default::default()
        };

        let response = match input_data {
            DmpRequest::LearnFromDemo(req) => {
                let res = self.learn(req)?;
                report.num_dmps = res.dmp_list.len();
                DmpResponse::LearnFromDemo(res)
            }
            DmpRequest::GetPlan(req) => DmpResponse::GetPlan(self.plan(req, &mut report)?),
            DmpRequest::SetActive(req) => {
                report.num_dmps = req.dmp_list.len();
                DmpResponse::SetActive(self.set_active(req))
            }
            DmpRequest::GetActive => {
                let dmp_list = self.active().map(|a| a.as_ref().clone());
                report.num_dmps = dmp_list.as_ref().map_or(0, |l| l.len());
                DmpResponse::GetActive(GetActiveDmpResponse { dmp_list })
            }
        };

        Ok((response, report))
    }
}

impl DmpServer {
    /// Create a server with the given parameters and no active set.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            active: None,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The active primitive set, if there is one.
    pub fn active(&self) -> Option<Arc<Vec<DmpData>>> {
        self.active.clone()
    }

    /// Learn a primitive set from a demonstration.
    pub fn learn(
        &self,
        req: &LearnDmpFromDemoRequest,
    ) -> Result<LearnDmpFromDemoResponse, ServerError> {
        let approx = req.approx.unwrap_or(self.params.default_approx);

        let out = learn_from_demo(&req.demo, &req.k_gains, &req.d_gains, req.num_bases, approx)?;

        info!(
            "Learned {} DMPs from a {} point demonstration (tau = {:.3} s)",
            out.dmp_list.len(),
            req.demo.len(),
            out.tau
        );

        Ok(LearnDmpFromDemoResponse {
            dmp_list: out.dmp_list,
            tau: out.tau,
        })
    }

    /// Plan with the request's primitive set, or the active one if it has none.
    pub fn plan(
        &self,
        req: &GetDmpPlanRequest,
        report: &mut StatusReport,
    ) -> Result<GetDmpPlanResponse, ServerError> {
        // Hold our own reference so the set can't change under the plan
        let active;
        let dmp_list: &[DmpData] = match &req.dmp_list {
            Some(l) => l,
            None => {
                active = self.active().ok_or(ServerError::NoActiveDmp)?;
                active.as_slice()
            }
        };

        let out = generate_plan(dmp_list, req, self.params.max_plan_length_s)?;

        report.num_dmps = dmp_list.len();
        report.plan_points = out.plan.len();
        report.at_goal = out.at_goal;
        report.stop_reason = Some(out.stop_reason);
        report.coupling_active = out.coupling_active;

        info!(
            "Planned {} points toward {:?} (at goal: {})",
            out.plan.len(),
            req.goal,
            out.at_goal
        );

        Ok(out.into_response())
    }

    /// Replace the active primitive set.
    pub fn set_active(&mut self, req: &SetActiveDmpRequest) -> SetActiveDmpResponse {
        debug!("Setting {} DMPs active", req.dmp_list.len());
        self.active = Some(Arc::new(req.dmp_list.clone()));
        SetActiveDmpResponse { success: true }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The response sent back when a request fails.
///
/// Learning gives an empty primitive set, planning an empty plan, and
/// activation reports no success.
pub fn failed_response(req: &DmpRequest) -> DmpResponse {
    match req {
        DmpRequest::LearnFromDemo(_) => {
            DmpResponse::LearnFromDemo(LearnDmpFromDemoResponse::default())
        }
        DmpRequest::GetPlan(_) => DmpResponse::GetPlan(GetDmpPlanResponse::default()),
        DmpRequest::SetActive(_) => DmpResponse::SetActive(SetActiveDmpResponse::default()),
        DmpRequest::GetActive => DmpResponse::GetActive(GetActiveDmpResponse::default()),
    }
}
