use std::{
    io::ErrorKind,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, bail};
use log::{debug, error, info, trace, warn};

use crate::{
    codec::{self, Encoded},
    constants::{BROADCAST_PERIOD, MAX_UDP_PAYLOAD, RECEIVE_TIMEOUT},
    world::{Controls, World},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns the simulation and sends a snapshot to `destination` every period.
    Host { destination: SocketAddr },
    /// Only applies snapshots it receives.
    Observer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub role: Role,
    /// Address to receive snapshots on. Required for observers.
    pub listen: Option<SocketAddr>,
    pub period: Duration,
    pub receive_timeout: Duration,
}

impl SessionConfig {
    pub fn host(destination: SocketAddr) -> Self {
        Self {
            role: Role::Host { destination },
            listen: None,
            period: BROADCAST_PERIOD,
            receive_timeout: RECEIVE_TIMEOUT,
        }
    }

    pub fn observer(listen: SocketAddr) -> Self {
        Self {
            role: Role::Observer,
            listen: Some(listen),
            period: BROADCAST_PERIOD,
            receive_timeout: RECEIVE_TIMEOUT,
        }
    }

    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = Some(listen);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// Shutdown was requested, some task has not returned yet.
    Stopping,
    /// Every task has returned and its socket is closed.
    Stopped,
}

/// Background tasks replicating a [`World`] over UDP.
pub struct Session {
    token: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    listen_addr: Option<SocketAddr>,
}

fn unspecified_for(addr: &SocketAddr) -> SocketAddr {
    if addr.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    }
}

impl Session {
    /// Bind the sockets and spawn the tasks for `config.role`.
    ///
    /// A host reads its physics from `controls` every tick. [`Controls::new`]
    /// keeps G and Δt inside the slider ranges, [`Controls::unclamped`] does
    /// not.
    pub fn start(
        config: &SessionConfig,
        world: Arc<World>,
        controls: Arc<Controls>,
    ) -> anyhow::Result<Self> {
        Self::start_with_token(config, world, controls, Arc::new(AtomicBool::new(false)))
    }

    /// Like [`Session::start`], stopping when `token` is set.
    pub fn start_with_token(
        config: &SessionConfig,
        world: Arc<World>,
        controls: Arc<Controls>,
        token: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        if config.role == Role::Observer && config.listen.is_none() {
            bail!("an observer needs a listen address");
        }

        // Dropping a half-started session joins whatever was already spawned.
        let mut session = Self {
            token,
            handles: Vec::new(),
            listen_addr: None,
        };

        if let Some(listen) = config.listen {
            let socket = UdpSocket::bind(listen)
                .with_context(|| format!("failed to bind receive socket on {listen}"))?;
            socket
                .set_read_timeout(Some(config.receive_timeout))
                .context("failed to set receive timeout")?;
            let local = socket.local_addr().context("receive socket has no address")?;
            session.listen_addr = Some(local);
            info!("listening for snapshots on {local}");

            let world = world.clone();
            let token = session.token.clone();
            let handle = thread::Builder::new()
                .name("receive".to_owned())
                .spawn(move || run_receive_loop(&world, &socket, &token))
                .context("failed to spawn receive task")?;
            session.handles.push(handle);
        }

        if let Role::Host { destination } = config.role {
            let socket = UdpSocket::bind(unspecified_for(&destination))
                .context("failed to bind broadcast socket")?;
            socket
                .set_broadcast(true)
                .context("failed to enable broadcast")?;
            info!("sending snapshots to {destination}");

            let token = session.token.clone();
            let period = config.period;
            let handle = thread::Builder::new()
                .name("broadcast".to_owned())
                .spawn(move || {
                    run_broadcast_loop(&world, &controls, &socket, destination, period, &token)
                })
                .context("failed to spawn broadcast task")?;
            session.handles.push(handle);
        }

        Ok(session)
    }

    /// Address the receive task is bound to, if any.
    pub fn listen_addr(&self) -> Option<SocketAddr> {
        self.listen_addr
    }

    pub fn token(&self) -> Arc<AtomicBool> {
        self.token.clone()
    }

    pub fn state(&self) -> SessionState {
        if !self.token.load(Ordering::Relaxed) {
            SessionState::Running
        } else if self.handles.iter().all(JoinHandle::is_finished) {
            SessionState::Stopped
        } else {
            SessionState::Stopping
        }
    }

    /// Ask every task to return without waiting for them.
    pub fn request_stop(&self) {
        self.token.store(true, Ordering::Relaxed);
    }

    /// Stop and join every task. Sockets are closed once this returns.
    pub fn stop(&mut self) {
        self.request_stop();
        if self.handles.is_empty() {
            return;
        }
        debug!("waiting for session tasks");
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("session").to_owned();
            if handle.join().is_err() {
                error!("{name} task panicked");
            }
        }
        info!("session stopped");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Remembers whether the last snapshot was truncated, so the warning is
/// logged when truncation starts instead of on every tick.
#[derive(Debug, Default)]
struct TruncationWatch {
    truncated: bool,
}

impl TruncationWatch {
    /// Returns `true` if `encoded` changed the state and a line was logged.
    fn observe(&mut self, encoded: &Encoded) -> bool {
        if encoded.is_truncated() == self.truncated {
            return false;
        }
        self.truncated = encoded.is_truncated();
        if self.truncated {
            warn!(
                "snapshot holds only {} bodies, {} do not fit in one datagram",
                encoded.body_count, encoded.dropped
            );
        } else {
            info!("snapshot fits again ({} bodies)", encoded.body_count);
        }
        true
    }
}

/// Host loop: step the world, encode it, send it, sleep.
///
/// The world is locked twice per period, once for the physics step and once
/// for encoding. Nothing else writes to a host's world in between.
pub fn run_broadcast_loop(
    world: &World,
    controls: &Controls,
    socket: &UdpSocket,
    destination: SocketAddr,
    period: Duration,
    token: &AtomicBool,
) {
    let mut tick: u64 = 0;
    let mut truncation = TruncationWatch::default();
    while !token.load(Ordering::Relaxed) {
        world.step(controls.physics());
        let encoded = world.with_bodies(codec::encode);
        truncation.observe(&encoded);

        match socket.send_to(&encoded.bytes, destination) {
            Ok(sent) if sent != encoded.bytes.len() => {
                warn!("sent {sent} bytes, expected {}", encoded.bytes.len());
            }
            Ok(sent) => trace!("tick {tick}: sent {} bodies ({sent} bytes)", encoded.body_count),
            Err(e) => error!("send to {destination} failed: {e}"),
        }

        tick += 1;
        thread::sleep(period);
    }
    debug!("broadcast task finished after {tick} ticks");
}

/// Observer loop: wait for a snapshot and swap it into the world.
///
/// The socket must have a read timeout, otherwise shutdown is only noticed
/// on the next datagram.
pub fn run_receive_loop(world: &World, socket: &UdpSocket, token: &AtomicBool) {
    let mut buffer = vec![0u8; MAX_UDP_PAYLOAD];
    while !token.load(Ordering::Relaxed) {
        match socket.recv_from(&mut buffer) {
            Ok((len, sender)) => match codec::decode(&buffer[..len]) {
                Ok(bodies) => {
                    trace!("snapshot of {} bodies from {sender}", bodies.len());
                    world.replace(bodies);
                }
                Err(e) => warn!("discarding snapshot from {sender}: {e}"),
            },
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => error!("receive failed: {e}"),
        }
    }
    debug!("receive task finished");
}
