//! NVS persistence for per-direction encryption parameters with schema versioning.
//!
//! # Version History
//!
//! - **v1** (current): one fixed 41-byte blob per direction (`tx_params`, `rx_params`),
//!   see [`EncryptionParams::to_bytes`]
//!
//! # Future Migration Example
//!
//! When the blob layout changes in v2:
//! 1. Increment CURRENT_SCHEMA_VERSION to 2
//! 2. Add a `(1, 2)` arm to `migrate()` that rewrites both blobs
//! 3. Bump PARAMS_BLOB_LEN / to_bytes / from_bytes
//!
//! On non-ESP targets the store is backed by a [`MemoryPartition`] with the same
//! behaviour, so the console and tests exercise identical code paths.

use core::cmp::Ordering;
use core::fmt;

use super::{Direction, EncryptionParams, PARAMS_BLOB_LEN};

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Current NVS schema version for link parameters
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for link configuration
pub const NVS_NAMESPACE: &str = "vlc_link";

/// NVS key for schema version
#[cfg(target_os = "espidf")]
const VERSION_KEY: &str = "schema_ver";

const fn params_key(direction: Direction) -> &'static str {
    match direction {
        Direction::Tx => "tx_params",
        Direction::Rx => "rx_params",
    }
}

/// Outcome of opening the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationResult {
    /// Nothing stored yet
    FreshInstall,
    /// Schema matches, stored params usable as-is
    UpToDate,
    /// Migrated from older version
    Migrated { from_version: u32, to_version: u32 },
}

/// NVS operation errors
#[derive(Debug)]
pub enum NvsError {
    /// Schema version too new (downgrade not supported)
    TooNew { stored_version: u32 },
    /// Stored blob has the wrong size or an unknown variant tag
    Corrupt { key: &'static str },
    /// Unsupported migration path
    UnsupportedMigration { from: u32, to: u32 },
    /// NVS read/write error
    #[cfg(target_os = "espidf")]
    Io(EspError),
}

#[cfg(target_os = "espidf")]
impl From<EspError> for NvsError {
    fn from(e: EspError) -> Self {
        NvsError::Io(e)
    }
}

impl fmt::Display for NvsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NvsError::TooNew { stored_version } => write!(
                f,
                "stored schema v{} newer than v{}",
                stored_version, CURRENT_SCHEMA_VERSION
            ),
            NvsError::Corrupt { key } => write!(f, "corrupt entry '{}'", key),
            NvsError::UnsupportedMigration { from, to } => {
                write!(f, "no migration v{} -> v{}", from, to)
            }
            #[cfg(target_os = "espidf")]
            NvsError::Io(e) => write!(f, "NVS I/O: {:?}", e),
        }
    }
}

/// Decide what to do with a stored schema version.
fn check_version(stored_version: u32) -> Result<MigrationResult, NvsError> {
    match stored_version.cmp(&CURRENT_SCHEMA_VERSION) {
        Ordering::Equal => Ok(MigrationResult::UpToDate),
        Ordering::Less if stored_version == 0 => Ok(MigrationResult::FreshInstall),
        Ordering::Less => migrate(stored_version, CURRENT_SCHEMA_VERSION).map(|()| {
            MigrationResult::Migrated {
                from_version: stored_version,
                to_version: CURRENT_SCHEMA_VERSION,
            }
        }),
        Ordering::Greater => Err(NvsError::TooNew { stored_version }),
    }
}

fn migrate(from_version: u32, to_version: u32) -> Result<(), NvsError> {
    // Router for migration paths. Future arms:
    //
    // (1, 2) => migrate_v1_to_v2(storage)?,
    match (from_version, to_version) {
        _ => Err(NvsError::UnsupportedMigration {
            from: from_version,
            to: to_version,
        }),
    }
}

fn decode(key: &'static str, blob: Option<&[u8]>) -> Result<Option<EncryptionParams>, NvsError> {
    match blob {
        None => Ok(None),
        Some(bytes) => EncryptionParams::from_bytes(bytes)
            .map(Some)
            .ok_or(NvsError::Corrupt { key }),
    }
}

// ========================================
// ESP-IDF backend
// ========================================

/// Versioned parameter store on the default NVS partition.
#[cfg(target_os = "espidf")]
pub struct ParamStore {
    storage: EspNvs<NvsDefault>,
    status: MigrationResult,
}

#[cfg(target_os = "espidf")]
impl ParamStore {
    /// Open the namespace and check its schema version.
    ///
    /// The partition handle is taken once by the caller and moved in.
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self, NvsError> {
        let storage = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        let stored_version = storage.get_u32(VERSION_KEY)?.unwrap_or(0);
        let status = check_version(stored_version)?;
        Ok(Self { storage, status })
    }

    pub fn status(&self) -> MigrationResult {
        self.status
    }

    /// Persist one direction's params, stamping the schema version first.
    pub fn save(&mut self, direction: Direction, params: &EncryptionParams) -> Result<(), NvsError> {
        self.storage.set_u32(VERSION_KEY, CURRENT_SCHEMA_VERSION)?;
        self.storage
            .set_blob(params_key(direction), &params.to_bytes())?;
        self.status = MigrationResult::UpToDate;
        Ok(())
    }

    /// Load one direction's params; `Ok(None)` if never saved.
    pub fn load(&self, direction: Direction) -> Result<Option<EncryptionParams>, NvsError> {
        let key = params_key(direction);
        // One spare byte so an oversized blob reads as corrupt instead of failing.
        let mut buf = [0u8; PARAMS_BLOB_LEN + 1];
        let blob = self.storage.get_blob(key, &mut buf)?;
        decode(key, blob)
    }
}

// ========================================
// In-memory backend
// ========================================

/// Host stand-in for an NVS partition.
#[cfg(not(target_os = "espidf"))]
#[derive(Clone, Debug, Default)]
pub struct MemoryPartition {
    pub schema_version: u32,
    pub tx: Option<[u8; PARAMS_BLOB_LEN]>,
    pub rx: Option<[u8; PARAMS_BLOB_LEN]>,
}

#[cfg(not(target_os = "espidf"))]
impl MemoryPartition {
    pub const fn new() -> Self {
        Self {
            schema_version: 0,
            tx: None,
            rx: None,
        }
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<[u8; PARAMS_BLOB_LEN]> {
        match direction {
            Direction::Tx => &mut self.tx,
            Direction::Rx => &mut self.rx,
        }
    }
}

/// Versioned parameter store backed by memory.
#[cfg(not(target_os = "espidf"))]
pub struct ParamStore {
    partition: MemoryPartition,
    status: MigrationResult,
}

#[cfg(not(target_os = "espidf"))]
impl ParamStore {
    pub fn open(partition: MemoryPartition) -> Result<Self, NvsError> {
        let status = check_version(partition.schema_version)?;
        Ok(Self { partition, status })
    }

    pub fn status(&self) -> MigrationResult {
        self.status
    }

    pub fn save(&mut self, direction: Direction, params: &EncryptionParams) -> Result<(), NvsError> {
        self.partition.schema_version = CURRENT_SCHEMA_VERSION;
        *self.partition.slot(direction) = Some(params.to_bytes());
        self.status = MigrationResult::UpToDate;
        Ok(())
    }

    pub fn load(&self, direction: Direction) -> Result<Option<EncryptionParams>, NvsError> {
        let blob = match direction {
            Direction::Tx => self.partition.tx.as_ref(),
            Direction::Rx => self.partition.rx.as_ref(),
        };
        decode(params_key(direction), blob.map(|b| &b[..]))
    }

    /// Hand the partition back, e.g. to reopen it as after a reboot.
    pub fn into_partition(self) -> MemoryPartition {
        self.partition
    }
}
