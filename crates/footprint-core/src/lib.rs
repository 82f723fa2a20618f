pub mod config;
pub mod host;
pub mod introspect;
pub mod network;
pub mod signatures;
pub mod snapshot;
pub mod store;
pub mod tracker;

#[cfg(test)]
mod introspect_tests;

pub use config::TrackerConfig;
pub use host::HostFactSource;
pub use introspect::{
    collect_device_info, collect_os_info, ClientHints, FactSource, HostFacts, StaticFactSource,
};
pub use network::{GeoLookup, IpApiClient, LookupError, Outcome};
pub use snapshot::{DeviceRecord, DeviceType, LoadingState, NetworkRecord, OsRecord, Snapshot};
pub use store::{FileStore, KeyValueStore, MemoryStore, PersistedEnvelope, SnapshotStore, StoreError};
pub use tracker::{ExposureTracker, Startup, TrackerError, TrackerView};
