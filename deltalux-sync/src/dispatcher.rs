//! Serial per-group event dispatch
//!
//! Owns a [`SyncCoordinator`] on a dedicated background thread and
//! feeds it events through an mpsc channel, so all events for one
//! group are processed serially while independent groups run on
//! independent threads. The channel `recv_timeout` doubles as the
//! tick that drives confirmation timeouts.

use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use deltalux_model::{GroupConfig, GroupState, LightId, LightState};

use crate::command::GroupCommand;
use crate::controller::{DeviceCommandFailure, LightController};
use crate::coordinator::{StateChangeOutcome, SyncCoordinator};
use crate::error::{Result, SyncError};

/// How often the worker wakes up with no events to expire timeouts
const TICK: Duration = Duration::from_millis(100);

/// Events delivered to a group's worker
#[derive(Debug, Clone)]
pub enum GroupEvent {
    /// A group-level command from the host
    Command(GroupCommand),
    /// A member light's state changed
    StateChanged { id: LightId, state: LightState },
    /// Hot-reload the group configuration
    Reload(GroupConfig),
    /// Stop the worker
    Shutdown,
}

/// Reports emitted by a group's worker for the host to consume
#[derive(Debug, Clone, PartialEq)]
pub enum GroupReport {
    /// The group's representative state changed (after reconciling an
    /// external member change)
    StateChanged {
        group_state: GroupState,
        /// Group level inferred from the changed member, if computable
        inferred_level: Option<u8>,
    },
    /// One or more per-light commands failed to dispatch
    CommandFailed {
        seq: u64,
        failures: Vec<DeviceCommandFailure>,
    },
}

/// Snapshot of the group's externally visible state
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSnapshot {
    pub group_state: GroupState,
    /// The brightness a bare turn-on would restore
    pub master_brightness: u8,
}

impl Default for GroupSnapshot {
    fn default() -> Self {
        Self {
            group_state: GroupState::off(),
            master_brightness: 50,
        }
    }
}

/// Handle to a group's serial event worker
///
/// All methods are sync and non-blocking except the report iterator.
/// Dropping the handle closes the event channel, which shuts the
/// worker down.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = GroupDispatcher::spawn(SyncCoordinator::new(config, controller));
/// dispatcher.command(GroupCommand::turn_on().with_brightness(50))?;
///
/// for report in dispatcher.reports() {
///     println!("report: {:?}", report);
/// }
/// ```
pub struct GroupDispatcher {
    /// Send events to the worker
    event_tx: mpsc::Sender<GroupEvent>,

    /// Receive reports from the worker (wrapped for cloning iterators)
    report_rx: Arc<Mutex<mpsc::Receiver<GroupReport>>>,

    /// Externally visible state, refreshed by the worker after every event
    snapshot: Arc<RwLock<GroupSnapshot>>,

    /// Background worker handle (kept alive)
    worker: Option<JoinHandle<()>>,
}

impl GroupDispatcher {
    /// Spawn a worker thread owning the given coordinator
    pub fn spawn<C>(coordinator: SyncCoordinator<C>) -> Self
    where
        C: LightController + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::channel();
        let (report_tx, report_rx) = mpsc::channel();

        let snapshot = Arc::new(RwLock::new(GroupSnapshot {
            group_state: coordinator.group_state(),
            master_brightness: coordinator.master_brightness(),
        }));

        let worker_snapshot = Arc::clone(&snapshot);
        let worker = thread::spawn(move || {
            run_group_worker(coordinator, event_rx, report_tx, worker_snapshot);
        });

        Self {
            event_tx,
            report_rx: Arc::new(Mutex::new(report_rx)),
            snapshot,
            worker: Some(worker),
        }
    }

    /// Send a raw event to the worker
    pub fn send(&self, event: GroupEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .map_err(|_| SyncError::ChannelClosed)
    }

    /// Issue a group-level command
    pub fn command(&self, cmd: GroupCommand) -> Result<()> {
        self.send(GroupEvent::Command(cmd))
    }

    /// Deliver a member state-change notification
    pub fn notify_state_changed(&self, id: LightId, state: LightState) -> Result<()> {
        self.send(GroupEvent::StateChanged { id, state })
    }

    /// Hot-reload the group configuration
    ///
    /// Applied between events, never mid-computation.
    pub fn reload(&self, config: GroupConfig) -> Result<()> {
        self.send(GroupEvent::Reload(config))
    }

    /// Current externally visible group state
    pub fn snapshot(&self) -> GroupSnapshot {
        self.snapshot
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Blocking iterator over worker reports
    pub fn reports(&self) -> ReportIterator {
        ReportIterator::new(Arc::clone(&self.report_rx))
    }

    /// Stop the worker and wait for it to finish
    pub fn shutdown(mut self) {
        let _ = self.event_tx.send(GroupEvent::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Worker loop: serially applies events to the coordinator
fn run_group_worker<C: LightController>(
    mut coordinator: SyncCoordinator<C>,
    event_rx: mpsc::Receiver<GroupEvent>,
    report_tx: mpsc::Sender<GroupReport>,
    snapshot: Arc<RwLock<GroupSnapshot>>,
) {
    info!(group = coordinator.config().name(), "group worker started");

    loop {
        match event_rx.recv_timeout(TICK) {
            Ok(GroupEvent::Command(cmd)) => {
                let outcome = coordinator.handle_group_command(&cmd, Instant::now());
                if !outcome.failures.is_empty() {
                    let _ = report_tx.send(GroupReport::CommandFailed {
                        seq: outcome.seq,
                        failures: outcome.failures,
                    });
                }
            }
            Ok(GroupEvent::StateChanged { id, state }) => {
                let outcome = coordinator.handle_state_change(&id, state, Instant::now());
                if let StateChangeOutcome::Reconciled {
                    inferred_level,
                    group_state,
                } = outcome
                {
                    let _ = report_tx.send(GroupReport::StateChanged {
                        group_state,
                        inferred_level,
                    });
                }
            }
            Ok(GroupEvent::Reload(config)) => {
                coordinator.reload_config(config);
            }
            Ok(GroupEvent::Shutdown) => {
                debug!("group worker received shutdown");
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                coordinator.poll_timeouts(Instant::now());
                continue;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                debug!("event sender dropped, shutting down group worker");
                break;
            }
        }

        if let Ok(mut snap) = snapshot.write() {
            snap.group_state = coordinator.group_state();
            snap.master_brightness = coordinator.master_brightness();
        }
    }

    info!("group worker shut down");
}

/// Blocking iterator over group reports
///
/// Blocks on `next()` until a report is available or the worker is
/// gone. Use `try_recv()` for non-blocking access.
pub struct ReportIterator {
    rx: Arc<Mutex<mpsc::Receiver<GroupReport>>>,
}

impl ReportIterator {
    pub(crate) fn new(rx: Arc<Mutex<mpsc::Receiver<GroupReport>>>) -> Self {
        Self { rx }
    }

    /// Block until a report is available
    ///
    /// Returns `None` if the channel is closed.
    pub fn recv(&self) -> Option<GroupReport> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Try to receive a report without blocking
    pub fn try_recv(&self) -> Option<GroupReport> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Block until a report is available or the timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<GroupReport> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Non-blocking iterator over currently available reports
    pub fn try_iter(&self) -> TryReports<'_> {
        TryReports { inner: self }
    }
}

impl Iterator for ReportIterator {
    type Item = GroupReport;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Clone for ReportIterator {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

/// Non-blocking iterator over currently available reports
pub struct TryReports<'a> {
    inner: &'a ReportIterator,
}

impl<'a> Iterator for TryReports<'a> {
    type Item = GroupReport;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}
