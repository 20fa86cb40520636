use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::{
    body::Body,
    constants::{DEFAULT_GRAVITY, DEFAULT_PORT, DEFAULT_TIME_STEP},
    presets,
    scenario::Scenario,
    session::SessionConfig,
    sim::{CollisionModel, PhysicsParams},
};

fn default_destination() -> SocketAddr {
    (Ipv4Addr::LOCALHOST, DEFAULT_PORT).into()
}

fn default_listen() -> SocketAddr {
    (Ipv4Addr::UNSPECIFIED, DEFAULT_PORT).into()
}

/// Headless planet simulation replicated over UDP.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation and send snapshots to a destination.
    Host(HostArgs),
    /// Apply snapshots received from a host.
    Observe(ObserveArgs),
}

#[derive(Args, Debug)]
pub struct HostArgs {
    /// Where snapshots are sent, e.g. 255.255.255.255:8080.
    #[arg(long, default_value_t = default_destination())]
    pub destination: SocketAddr,

    /// Also accept snapshots from other hosts on this address.
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// JSON file with the initial planets.
    #[arg(long, conflicts_with = "random")]
    pub scenario: Option<PathBuf>,

    /// Start with a star and this many random satellites.
    #[arg(long)]
    pub random: Option<usize>,

    #[arg(long, default_value_t = 0, requires = "random")]
    pub seed: u64,

    #[arg(long, default_value_t = DEFAULT_GRAVITY)]
    pub gravity: f32,

    #[arg(long, default_value_t = DEFAULT_TIME_STEP)]
    pub time_step: f32,

    /// 0 is perfectly inelastic, 1 perfectly elastic.
    #[arg(long, default_value_t = 0.0)]
    pub restitution: f32,

    #[arg(long, default_value_t = 0.0)]
    pub friction: f32,

    /// Stop after this many seconds instead of waiting for stdin.
    #[arg(long)]
    pub seconds: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ObserveArgs {
    #[arg(long, default_value_t = default_listen())]
    pub listen: SocketAddr,

    /// Stop after this many seconds instead of waiting for stdin.
    #[arg(long)]
    pub seconds: Option<f64>,
}

impl HostArgs {
    pub fn session(&self) -> SessionConfig {
        let config = SessionConfig::host(self.destination);
        match self.listen {
            Some(listen) => config.with_listen(listen),
            None => config,
        }
    }

    pub fn physics(&self) -> PhysicsParams {
        PhysicsParams {
            gravity: self.gravity,
            time_step: self.time_step,
            collisions: CollisionModel {
                restitution: self.restitution,
                friction: self.friction,
            },
        }
    }

    /// Initial bodies: the scenario file, a random system, or the head-on pair.
    pub fn initial_bodies(&self) -> anyhow::Result<Vec<Body>> {
        if let Some(path) = &self.scenario {
            let scenario = Scenario::load(path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?;
            return Ok(scenario.bodies());
        }
        Ok(match self.random {
            Some(satellites) => presets::star_with_satellites(satellites, self.seed),
            None => presets::head_on_pair(),
        })
    }
}

impl ObserveArgs {
    pub fn session(&self) -> SessionConfig {
        SessionConfig::observer(self.listen)
    }
}

impl Command {
    /// How long to run, `None` meaning until stdin closes.
    pub fn run_for(&self) -> anyhow::Result<Option<Duration>> {
        let seconds = match self {
            Command::Host(args) => args.seconds,
            Command::Observe(args) => args.seconds,
        };
        seconds
            .map(|s| Duration::try_from_secs_f64(s).context("--seconds must be a positive number"))
            .transpose()
    }
}
