//! Main camera module executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Open the steering controller link
//!     - Set up the equipment (scripted scene or idle)
//!     - Frame loop, see `aog_lib::frame_loop`
//!
//! # Usage
//!
//! ```text
//! aog_exec [--scene <script>] [--exec-params <file>] [--zone-params <file>] [--max-frames <n>]
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info};
use std::{path::PathBuf, sync::atomic::AtomicBool};
use structopt::StructOpt;

// Internal
use aog_lib::{
    frame_loop::{FrameLoop, Link},
    link_client::{AngleReceiver, StatusSender},
    params::AogExecParams,
    sim::SimScene,
    zone_ctrl,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// AOG camera module: obstacle corridor detection and steering link.
#[derive(Debug, StructOpt)]
#[structopt(name = "aog_exec")]
struct Opts {
    /// Scene script driving simulated equipment. Without one the equipment
    /// is idle (no objects, no touches) and runs until stopped.
    #[structopt(short, long, parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Executable parameter file, instead of `params/aog_exec.toml`.
    #[structopt(long, parse(from_os_str))]
    exec_params: Option<PathBuf>,

    /// Zone control parameter file, instead of `params/zone_ctrl.toml`.
    #[structopt(long, parse(from_os_str))]
    zone_params: Option<PathBuf>,

    /// Stop after this many frames.
    #[structopt(short, long)]
    max_frames: Option<u64>,

    /// Log every frame.
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "aog_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        if opts.verbose { LevelFilter::Trace } else { LevelFilter::Debug },
        &session
    ).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("AOG Camera Module Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let exec_params: AogExecParams = match opts.exec_params {
        Some(ref p) => util::params::load_from_path(p),
        None => util::params::load("aog_exec.toml"),
    }.wrap_err("Could not load exec params")?;

    let zone_params: zone_ctrl::Params = match opts.zone_params {
        Some(ref p) => util::params::load_from_path(p),
        None => util::params::load("zone_ctrl.toml"),
    }.wrap_err("Could not load zone control params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE EQUIPMENT ----

    let scene = match opts.scene {
        Some(ref path) => {
            info!("Loading scene from {:?}", path);
            SimScene::new(
                path,
                exec_params.frame_width,
                exec_params.frame_height,
                exec_params.cycle_period_s
            ).wrap_err("Failed to load the scene script")?
        },
        None => {
            info!("No scene provided, running with idle equipment");
            SimScene::idle(
                exec_params.frame_width,
                exec_params.frame_height,
                exec_params.cycle_period_s
            )
        }
    };

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let status_sender = StatusSender::new(&exec_params.net);
    if status_sender.is_connected() {
        info!("Status link to {} open", exec_params.net.status_peer_addr);
    }

    let angle_receiver = AngleReceiver::new(&exec_params.net)
        .wrap_err("Failed to initialise the AngleReceiver")?;
    info!("Listening for steering angles on {}", exec_params.net.angle_listen_addr);

    info!("Network initialisation complete");

    // ---- INITIALISE FRAME LOOP ----

    let arch_frame_report = Archiver::from_path(&session, "frame_report.csv")
        .wrap_err("Failed to create the frame report archive")?;

    let mut frame_loop = FrameLoop::new(
        exec_params,
        zone_params,
        scene.equipment(),
        Link {
            status_sender,
            angle_receiver: Some(angle_receiver),
        },
        Some(arch_frame_report)
    ).wrap_err("Failed to initialise the frame loop")?;

    // ---- MAIN LOOP ----

    let exit = AtomicBool::new(false);
    let num_frames = frame_loop.run(&exit, opts.max_frames)
        .wrap_err("Frame loop failed")?;

    // ---- SHUTDOWN ----

    info!("End of execution, {} frames processed", num_frames);

    Ok(())
}
