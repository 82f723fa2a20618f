use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::TrackerConfig;
use crate::host::HostFactSource;
use crate::introspect::{collect_device_info, collect_os_info, FactSource};
use crate::network::{GeoLookup, IpApiClient, Outcome};
use crate::snapshot::{DeviceRecord, LoadingState, NetworkRecord, OsRecord, Snapshot};
use crate::store::{SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to collect device data: {0}")]
    Introspection(String),
    #[error("failed to persist snapshot: {0}")]
    Persist(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerView {
    pub state: LoadingState,
    pub error_message: Option<String>,
    pub network: NetworkRecord,
    pub os: OsRecord,
    pub device: DeviceRecord,
    pub last_updated: Option<i64>,
    pub revalidating: bool,
}

impl TrackerView {
    pub fn is_loading(&self) -> bool {
        self.state == LoadingState::Loading
    }

    pub fn has_error(&self) -> bool {
        self.state == LoadingState::Error
    }

    pub fn has_data(&self) -> bool {
        self.state == LoadingState::Success
            && (self.network.ip.is_some()
                || self.os.os_name.is_some()
                || self.device.device_type.is_some())
    }
}

#[derive(Debug)]
pub enum Startup {
    Cold(LoadingState),
    Warm(JoinHandle<LoadingState>),
    AlreadyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleMode {
    Foreground,
    // Revalidates cached data; skipped once `clear_data` moved the epoch on.
    Background { epoch: u64 },
}

struct TrackerInner {
    facts: Arc<dyn FactSource>,
    lookup: Arc<dyn GeoLookup>,
    store: SnapshotStore,
    view: watch::Sender<TrackerView>,
    cycle: Mutex<()>,
    epoch: AtomicU64,
    initialized: AtomicBool,
}

#[derive(Clone)]
pub struct ExposureTracker {
    inner: Arc<TrackerInner>,
}

impl ExposureTracker {
    pub fn new(
        facts: Arc<dyn FactSource>,
        lookup: Arc<dyn GeoLookup>,
        store: SnapshotStore,
    ) -> Self {
        let (view, _) = watch::channel(TrackerView::default());
        Self {
            inner: Arc::new(TrackerInner {
                facts,
                lookup,
                store,
                view,
                cycle: Mutex::new(()),
                epoch: AtomicU64::new(0),
                initialized: AtomicBool::new(false),
            }),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            Arc::new(HostFactSource::new(config.user_agent.clone())),
            Arc::new(IpApiClient::from_config(config)),
            SnapshotStore::from_config(config),
        )
    }

    pub fn view(&self) -> TrackerView {
        self.inner.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerView> {
        self.inner.view.subscribe()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    pub async fn initialize(&self) -> Startup {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("tracker already initialized");
            return Startup::AlreadyInitialized;
        }

        match self.inner.store.load() {
            Some(snapshot) => {
                info!(ts = snapshot.timestamp, "showing stored snapshot, refreshing in background");
                self.adopt(snapshot);
                let mode = CycleMode::Background {
                    epoch: self.inner.epoch.load(Ordering::SeqCst),
                };
                let tracker = self.clone();
                let handle = tokio::spawn(async move { tracker.run_cycle(mode).await });
                Startup::Warm(handle)
            }
            None => Startup::Cold(self.run_cycle(CycleMode::Foreground).await),
        }
    }

    pub async fn refresh(&self) -> LoadingState {
        self.run_cycle(CycleMode::Foreground).await
    }

    pub async fn clear_data(&self, also_refresh: bool) -> LoadingState {
        {
            let _cycle = self.inner.cycle.lock().await;
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            self.inner.store.clear();
            self.inner.view.send_modify(|view| {
                view.network = NetworkRecord::empty();
                view.os = OsRecord::empty();
                view.device = DeviceRecord::empty();
                view.last_updated = None;
                if !also_refresh {
                    view.state = LoadingState::Idle;
                    view.error_message = None;
                }
            });
        }

        if also_refresh {
            self.refresh().await
        } else {
            LoadingState::Idle
        }
    }

    fn adopt(&self, snapshot: Snapshot) {
        self.inner.view.send_modify(|view| {
            view.network = snapshot.network;
            view.os = snapshot.os;
            view.device = snapshot.device;
            view.last_updated = Some(snapshot.timestamp);
            view.state = LoadingState::Success;
            view.error_message = None;
            view.revalidating = false;
        });
    }

    async fn run_cycle(&self, mode: CycleMode) -> LoadingState {
        let _cycle = self.inner.cycle.lock().await;

        if let CycleMode::Background { epoch } = mode {
            if epoch != self.inner.epoch.load(Ordering::SeqCst) {
                debug!("stored data was cleared, skipping background refresh");
                return self.inner.view.borrow().state;
            }
        }

        self.inner.view.send_modify(|view| {
            view.state = LoadingState::Loading;
            view.revalidating = matches!(mode, CycleMode::Background { .. });
            view.error_message = None;
        });

        match self.collect().await {
            Ok(snapshot) => {
                self.adopt(snapshot);
                LoadingState::Success
            }
            Err(err) => {
                error!(error = %err, "failed to collect exposure data");
                self.inner.view.send_modify(|view| {
                    view.error_message = Some(err.to_string());
                    view.state = LoadingState::Error;
                    view.revalidating = false;
                });
                LoadingState::Error
            }
        }
    }

    async fn collect(&self) -> Result<Snapshot, TrackerError> {
        let facts = Arc::clone(&self.inner.facts);
        let (os, device) = tokio::task::spawn_blocking(move || {
            let gathered = facts.gather();
            (collect_os_info(&gathered), collect_device_info(&gathered))
        })
        .await
        .map_err(|err| TrackerError::Introspection(err.to_string()))?;

        let outcome = self.inner.lookup.fetch_network_info().await;
        if let Outcome::Degraded { cause, .. } = &outcome {
            debug!(error = %cause, "continuing with empty network record");
        }

        let snapshot = Snapshot::capture(outcome.into_value(), os, device);
        self.inner.store.save(&snapshot)?;
        Ok(snapshot)
    }
}
