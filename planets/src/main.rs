use std::{
    io::BufRead,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use log::{info, warn};
use planets::{
    Controls, Session, World,
    config::{Cli, Command},
    frame::Trails,
    sim,
};

const FRAME_PERIOD: Duration = Duration::from_millis(16);
const REPORT_PERIOD: Duration = Duration::from_secs(1);

/// Set `token` once stdin reaches a newline or EOF.
fn watch_stdin(token: Arc<AtomicBool>) {
    let spawned = thread::Builder::new()
        .name("stdin".to_owned())
        .spawn(move || {
            let mut line = String::new();
            let _ = std::io::stdin().lock().read_line(&mut line);
            token.store(true, Ordering::Relaxed);
        });
    if let Err(e) = spawned {
        warn!("cannot watch stdin, stop with ctrl-c: {e}");
    }
}

/// Stand-in for a renderer: sample the world every frame, keep the trails
/// and log what would be drawn.
fn run_frame_loop(world: &World, token: &AtomicBool, deadline: Option<Instant>) {
    let mut trails = Trails::default();
    let mut frames: u64 = 0;
    let mut last_report = Instant::now();

    while !token.load(Ordering::Relaxed) && deadline.is_none_or(|d| Instant::now() < d) {
        let bodies = world.snapshot();
        trails.record(&bodies);
        frames += 1;

        if last_report.elapsed() >= REPORT_PERIOD {
            let momentum = sim::total_momentum(&bodies);
            match sim::center_of_mass(&bodies) {
                Some(center) => info!(
                    "{} bodies, momentum ({:.3}, {:.3}), energy {:.1}, center of mass ({:.1}, {:.1})",
                    bodies.len(),
                    momentum.x,
                    momentum.y,
                    sim::total_kinetic_energy(&bodies),
                    center.x,
                    center.y
                ),
                None => info!("no bodies"),
            }
            last_report = Instant::now();
        }

        thread::sleep(FRAME_PERIOD);
    }
    info!("rendered {frames} frames");
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let run_for = cli.command.run_for()?;

    let (config, world, controls) = match &cli.command {
        Command::Host(args) => {
            let bodies = args.initial_bodies()?;
            let controls = Controls::new(args.physics());
            if controls.physics() != args.physics() {
                warn!("settings clamped to {:?}", controls.physics());
            }
            info!("hosting {} bodies", bodies.len());
            (args.session(), World::new(bodies), controls)
        }
        Command::Observe(args) => (args.session(), World::default(), Controls::default()),
    };

    let world = Arc::new(world);
    let token = Arc::new(AtomicBool::new(false));
    let mut session =
        Session::start_with_token(&config, world.clone(), Arc::new(controls), token.clone())?;

    let deadline = match run_for {
        Some(duration) => Some(Instant::now() + duration),
        None => {
            info!("press enter to stop");
            watch_stdin(token.clone());
            None
        }
    };

    run_frame_loop(&world, &token, deadline);

    session.stop();
    Ok(())
}
