//! # Steering Console
//!
//! Interactive stand-in for the steering controller. Sends `ANGLE:` datagrams
//! to the camera module and prints the obstacle status datagrams it sends
//! back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    net::{SocketAddr, ToSocketAddrs},
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

use comms_if::{
    eqpt::steer::{AngleReport, ObstacleStatus},
    net::{DatagramSocket, SocketOptions},
};
use util::logger::{logger_init_stdout, LevelFilter};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PROMPT: &str = "AOG $ ";

/// Polling interval while watching for status datagrams.
const WATCH_POLL_INTERVAL_MS: u64 = 10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Steering controller console for the AOG camera module.
#[derive(Debug, StructOpt)]
#[structopt(name = "steer_console")]
struct Opts {
    /// Address obstacle status datagrams are received on.
    #[structopt(short, long, default_value = "0.0.0.0:8888")]
    listen: String,

    /// Address of the camera module's angle receiver.
    #[structopt(short, long, default_value = "192.168.4.1:8889")]
    target: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A console command.
#[derive(Debug, PartialEq, StructOpt)]
#[structopt(name = "AOG")]
enum ConsoleCmd {
    /// Send a single steering angle in degrees, positive to the right.
    #[structopt(name = "angle")]
    Angle {
        #[structopt(allow_hyphen_values = true)]
        angle_deg: f64,
    },

    /// Send angles from `from_deg` to `to_deg` in steps of `step_deg`, one
    /// every `period_ms`.
    #[structopt(name = "sweep")]
    Sweep {
        #[structopt(allow_hyphen_values = true)]
        from_deg: f64,

        #[structopt(allow_hyphen_values = true)]
        to_deg: f64,

        step_deg: f64,

        #[structopt(default_value = "100")]
        period_ms: u64,
    },

    /// Send a raw text datagram, e.g. to try malformed angles.
    #[structopt(name = "raw")]
    Raw { msg: Vec<String> },

    /// Print status datagrams as they arrive for the given number of seconds.
    #[structopt(name = "watch")]
    Watch { duration_s: f64 },

    /// Leave the console.
    #[structopt(name = "quit")]
    Quit,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    util::session::init_epoch().wrap_err("Failed to initialise the session epoch")?;
    logger_init_stdout(LevelFilter::Info).wrap_err("Failed to initialise logging")?;

    let target = opts.target
        .to_socket_addrs()
        .wrap_err_with(|| format!("Invalid target address {}", opts.target))?
        .next()
        .ok_or_else(|| color_eyre::eyre::eyre!("Target {} did not resolve", opts.target))?;

    let mut socket = DatagramSocket::new(SocketOptions {
        bind_addr: opts.listen.clone(),
        ..Default::default()
    }).wrap_err("Failed to open the console socket")?;

    info!("Listening for obstacle status on {}", opts.listen);
    info!("Sending steering angles to {}", target);

    let mut rl = DefaultEditor::new().wrap_err("Failed to start the line editor")?;

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("Unhandled error: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            drain_status(&mut socket);
            continue;
        }
        rl.add_history_entry(line.as_str()).ok();

        let cmd = match parse_cmd(&line) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e.message);
                continue;
            }
        };

        match cmd {
            ConsoleCmd::Angle { angle_deg } => send_angle(&socket, target, angle_deg),
            ConsoleCmd::Sweep { from_deg, to_deg, step_deg, period_ms } => {
                for angle_deg in sweep_angles(from_deg, to_deg, step_deg) {
                    send_angle(&socket, target, angle_deg);
                    drain_status(&mut socket);
                    thread::sleep(Duration::from_millis(period_ms));
                }
            },
            ConsoleCmd::Raw { msg } => {
                let msg = msg.join(" ");
                match socket.send_to(&msg, target) {
                    Ok(()) => info!("Sent {:?}", msg),
                    Err(e) => warn!("Could not send: {}", e),
                }
            },
            ConsoleCmd::Watch { duration_s } => {
                let end = Instant::now() + Duration::from_secs_f64(duration_s.max(0.0));
                while Instant::now() < end {
                    drain_status(&mut socket);
                    thread::sleep(Duration::from_millis(WATCH_POLL_INTERVAL_MS));
                }
            },
            ConsoleCmd::Quit => break,
        }

        drain_status(&mut socket);
    }

    info!("Exiting...");

    Ok(())
}

fn parse_cmd(line: &str) -> Result<ConsoleCmd, structopt::clap::Error> {
    // Clap expects the binary name first
    ConsoleCmd::from_iter_safe(std::iter::once("AOG").chain(line.split_whitespace()))
}

/// Angles of a sweep, both ends included. A zero step only sends the start.
fn sweep_angles(from_deg: f64, to_deg: f64, step_deg: f64) -> Vec<f64> {
    let step = step_deg.abs();
    if step == 0.0 || !step.is_finite() {
        return vec![from_deg];
    }

    let dir = if to_deg >= from_deg { 1.0 } else { -1.0 };
    let num_steps = ((to_deg - from_deg).abs() / step).floor() as usize;

    (0..=num_steps)
        .map(|i| from_deg + dir * step * i as f64)
        .collect()
}

fn send_angle(socket: &DatagramSocket, target: SocketAddr, angle_deg: f64) {
    let msg = AngleReport { steering_angle_deg: angle_deg }.to_datagram();

    match socket.send_to(&msg, target) {
        Ok(()) => info!("Sent {}", msg),
        Err(e) => warn!("Could not send the angle: {}", e),
    }
}

/// Print every status datagram waiting on the socket.
fn drain_status(socket: &mut DatagramSocket) {
    loop {
        match socket.recv() {
            Ok(Some((payload, from))) => match ObstacleStatus::from_datagram(payload) {
                Ok(s) if s.has_obstacle => println!(
                    "[{}] OBSTACLE x{} at {:.1} deg",
                    from, s.count, s.steering_angle_deg
                ),
                Ok(s) => println!("[{}] clear at {:.1} deg", from, s.steering_angle_deg),
                Err(e) => warn!("[{}] {}", from, e),
            },
            Ok(None) => break,
            Err(e) => {
                warn!("Receive error: {}", e);
                break;
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
