//! Main DMP executable entry point.
//!
//! # Architecture
//!
//! The executable runs a script of requests against a `DmpServer`:
//!
//!     - Initialise the session, server and logger
//!     - Optionally learn a primitive set from a CSV demonstration and make
//!       it active
//!     - For each scripted request:
//!         - Process the request
//!         - Save the response into the session
//!     - Log a summary of the run

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

// Internal
use comms_if::dmp::{DmpRequest, DmpResponse, LearnDmpFromDemoRequest, SetActiveDmpRequest};
use dmp_lib::{
    demo,
    server::{failed_response, DmpServer},
};
use util::{
    host,
    logger::{level_from_str, logger_init},
    module::State,
    script_interpreter::ScriptInterpreter,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file for the server, relative to the params directory.
const PARAMS_FILE: &str = "dmp_exec.toml";

/// Label given to the response of the CLI demonstration learn.
const DEMO_LABEL: &str = "demo_learn";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "dmp_exec", about = "Learn and plan with dynamic movement primitives")]
struct Opt {
    /// Request script to run
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// CSV demonstration to learn from and activate before the script runs
    #[structopt(long, parse(from_os_str))]
    demo: Option<PathBuf>,

    /// Spring gain used for every dimension of the demonstration
    #[structopt(long, default_value = "25.0")]
    k_gain: f64,

    /// Damping gain used for every dimension of the demonstration
    #[structopt(long, default_value = "10.0")]
    d_gain: f64,

    /// Number of basis functions to learn the demonstration with
    #[structopt(long, default_value = "20")]
    num_bases: usize,
}

/// Counts of how the scripted requests went.
#[derive(Debug, Default)]
struct Summary {
    succeeded: usize,
    failed: usize,
    plans_at_goal: usize,
    plans_not_at_goal: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("dmp_exec", "sessions").wrap_err("Failed to create the session")?;

    // The server's parameters pick the log level, so it's initialised first
    let mut server = DmpServer::default();
    server
        .init(PARAMS_FILE, &session)
        .wrap_err("Failed to initialise the DmpServer")?;

    let level = level_from_str(&server.params().log_level)
        .wrap_err("Invalid log level in the parameters")?;
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("DMP Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}", session.session_root);
    debug!("CLI options: {:?}", opt);
    debug!("Parameters: {:#?}\n", server.params());

    // ---- LOAD SCRIPT ----

    info!("Loading script from {:?}", opt.script);

    let mut si = ScriptInterpreter::new(&opt.script).wrap_err("Failed to load script")?;

    info!("Loaded script contains {} requests\n", si.get_num_requests());

    // ---- DEMONSTRATION ----

    if let Some(ref demo_path) = opt.demo {
        learn_demo(&mut server, &session, &opt, demo_path)?;
    }

    // ---- RUN SCRIPT ----

    let mut summary = Summary::default();

    while let Some(entry) = si.next_entry() {
        info!("Running \"{}\" ({})", entry.label, entry.request.name());

        let response = match server.proc_logged(&entry.request) {
            Ok((response, report)) => {
                summary.succeeded += 1;
                debug!("Status report: {:?}", report);
                response
            }
            Err(_) => {
                summary.failed += 1;
                failed_response(&entry.request)
            }
        };

        if let DmpResponse::GetPlan(ref res) = response {
            if res.at_goal {
                summary.plans_at_goal += 1;
            } else {
                summary.plans_not_at_goal += 1;
            }
        }

        save_response(&server, &session, &entry.label, response);
    }

    // ---- SUMMARY ----

    info!(
        "Script complete: {} requests succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    info!(
        "{} plans reached the goal, {} did not",
        summary.plans_at_goal, summary.plans_not_at_goal
    );
    if summary.failed > 0 {
        warn!("Some requests failed, see the log above for details");
    }

    session.exit();

    Ok(())
}

/// Learn from the demonstration at `demo_path` and make it the active set.
fn learn_demo(
    server: &mut DmpServer,
    session: &Session,
    opt: &Opt,
    demo_path: &Path,
) -> Result<(), Report> {
    info!("Loading demonstration from {:?}", demo_path);

    let demo = demo::load_csv(demo_path).wrap_err("Failed to load the demonstration")?;
    let dims = demo
        .dims()
        .ok_or_else(|| eyre!("The demonstration contains no points"))?;

    info!(
        "Demonstration has {} dimensions and {} points over {:.2} s",
        dims,
        demo.len(),
        demo.duration().unwrap_or(0.0)
    );

    let req = DmpRequest::LearnFromDemo(LearnDmpFromDemoRequest {
        demo,
        k_gains: vec![opt.k_gain; dims],
        d_gains: vec![opt.d_gain; dims],
        num_bases: opt.num_bases,
        approx: None,
    });

    let (response, _) = server
        .proc_logged(&req)
        .wrap_err("Failed to learn from the demonstration")?;

    if let DmpResponse::LearnFromDemo(ref res) = response {
        server.set_active(&SetActiveDmpRequest {
            dmp_list: res.dmp_list.clone(),
        });
        info!("Demonstration primitives are now active\n");
    }

    save_response(server, session, DEMO_LABEL, response);

    Ok(())
}

/// Save a response into the session if the parameters ask for it.
fn save_response(server: &DmpServer, session: &Session, label: &str, response: DmpResponse) {
    if server.params().save_responses {
        session.save(format!("responses/{}.json", label), response);
    }
}
