use parking_lot::{Mutex, RwLock};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use steemvote_db_exports::{
    VoteStoreConfig, VoteStoreController, VoteStoreError, VoteStoreResult, CF_ERROR, CRUD_ERROR,
    METADATA_CF, MIN_SUPPORTED_SCHEMA_VERSION, SCHEMA_VERSION, SCHEMA_VERSION_DESER_ERROR,
    SCHEMA_VERSION_KEY, VOTES_CF, VOTE_RECORD_DESER_ERROR,
};
use steemvote_models::{ContentId, VoteRecord};
use steemvote_time::SteemTime;
use tracing::{debug, info};

/// Wrapped RocksDB database holding vote records
pub struct VoteStore {
    /// The rocksdb instance, `None` once closed
    db: RwLock<Option<DB>>,
    /// Serializes writers, so that the existence check and the write of a record are atomic
    write_lock: Mutex<()>,
    /// configuration for the `VoteStore`
    config: VoteStoreConfig,
}

impl std::fmt::Debug for VoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteStore")
            .field("config", &self.config)
            .field("open", &self.db.read().is_some())
            .finish()
    }
}

fn storage_error(context: &str, err: rocksdb::Error) -> VoteStoreError {
    VoteStoreError::StorageError(format!("{}: {}", context, err))
}

fn cf_handle<'a>(db: &'a DB, name: &str) -> VoteStoreResult<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| VoteStoreError::StorageError(format!("{}: {}", CF_ERROR, name)))
}

fn decode_schema_version(bytes: &[u8]) -> VoteStoreResult<u32> {
    let bytes: [u8; 4] = bytes
        .try_into()
        .map_err(|_| VoteStoreError::CorruptedEntry(SCHEMA_VERSION_DESER_ERROR.to_string()))?;
    Ok(u32::from_be_bytes(bytes))
}

fn decode_voted_at(bytes: &[u8]) -> VoteStoreResult<SteemTime> {
    let bytes: [u8; 8] = bytes
        .try_into()
        .map_err(|_| VoteStoreError::CorruptedEntry(VOTE_RECORD_DESER_ERROR.to_string()))?;
    Ok(SteemTime::from_millis(u64::from_be_bytes(bytes)))
}

fn flush_all(db: &DB) -> VoteStoreResult<()> {
    for name in [VOTES_CF, METADATA_CF] {
        db.flush_cf(cf_handle(db, name)?)
            .map_err(|err| storage_error("could not flush vote store", err))?;
    }
    Ok(())
}

fn sync_write_options() -> WriteOptions {
    let mut write_opts = WriteOptions::default();
    write_opts.set_sync(true);
    write_opts
}

impl VoteStore {
    /// Opens (or creates) the vote store at the configured path.
    ///
    /// Fails with `DBVersionError` if the data on disk was written with an
    /// unsupported schema version.
    pub fn open(config: VoteStoreConfig) -> VoteStoreResult<Self> {
        Self::open_with_options(config, Self::default_db_opts())
    }

    /// Default RocksDB options
    pub fn default_db_opts() -> Options {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts
    }

    /// Opens the vote store given a config and RocksDB options
    pub fn open_with_options(config: VoteStoreConfig, db_opts: Options) -> VoteStoreResult<Self> {
        let db = DB::open_cf_descriptors(
            &db_opts,
            &config.path,
            vec![
                ColumnFamilyDescriptor::new(VOTES_CF, Options::default()),
                ColumnFamilyDescriptor::new(METADATA_CF, Options::default()),
            ],
        )
        .map_err(|err| storage_error("could not open vote store", err))?;

        let version = Self::check_schema_version(&db)?;
        info!(
            "vote store opened at {} (schema version {})",
            config.path.display(),
            version
        );

        Ok(VoteStore {
            db: RwLock::new(Some(db)),
            write_lock: Mutex::new(()),
            config,
        })
    }

    /// Reads the schema version, stamping a fresh database with the current one.
    fn check_schema_version(db: &DB) -> VoteStoreResult<u32> {
        let metadata = cf_handle(db, METADATA_CF)?;
        let stored = db
            .get_cf(metadata, SCHEMA_VERSION_KEY)
            .map_err(|err| storage_error(CRUD_ERROR, err))?;

        let found = match stored {
            Some(bytes) => decode_schema_version(&bytes)?,
            None => {
                let votes = cf_handle(db, VOTES_CF)?;
                if db.iterator_cf(votes, IteratorMode::Start).next().is_some() {
                    // votes written before the schema was versioned
                    0
                } else {
                    let mut batch = WriteBatch::default();
                    batch.put_cf(metadata, SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_be_bytes());
                    db.write_opt(batch, &sync_write_options())
                        .map_err(|err| storage_error(CRUD_ERROR, err))?;
                    SCHEMA_VERSION
                }
            }
        };

        if !(MIN_SUPPORTED_SCHEMA_VERSION..=SCHEMA_VERSION).contains(&found) {
            return Err(VoteStoreError::DBVersionError {
                found,
                min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(found)
    }

    /// Runs `f` on the open database, or fails with `Closed`.
    fn with_db<T>(&self, f: impl FnOnce(&DB) -> VoteStoreResult<T>) -> VoteStoreResult<T> {
        let guard = self.db.read();
        match guard.as_ref() {
            Some(db) => f(db),
            None => Err(VoteStoreError::Closed),
        }
    }
}

impl VoteStoreController for VoteStore {
    fn has_voted(&self, content_id: &ContentId) -> VoteStoreResult<bool> {
        Ok(self.get_vote(content_id)?.is_some())
    }

    fn get_vote(&self, content_id: &ContentId) -> VoteStoreResult<Option<VoteRecord>> {
        self.with_db(|db| {
            let votes = cf_handle(db, VOTES_CF)?;
            let value = db
                .get_cf(votes, content_id.to_key_bytes())
                .map_err(|err| storage_error(CRUD_ERROR, err))?;
            value
                .map(|bytes| {
                    Ok(VoteRecord {
                        content_id: content_id.clone(),
                        voted_at: decode_voted_at(&bytes)?,
                    })
                })
                .transpose()
        })
    }

    fn record_vote(&self, content_id: &ContentId, voted_at: SteemTime) -> VoteStoreResult<()> {
        let _write_guard = self.write_lock.lock();
        self.with_db(|db| {
            let votes = cf_handle(db, VOTES_CF)?;
            let key = content_id.to_key_bytes();
            if db
                .get_cf(votes, &key)
                .map_err(|err| storage_error(CRUD_ERROR, err))?
                .is_some()
            {
                debug!("vote for {} already recorded, keeping the first record", content_id);
                return Ok(());
            }
            let mut batch = WriteBatch::default();
            batch.put_cf(votes, key, voted_at.to_millis().to_be_bytes());
            db.write_opt(batch, &sync_write_options())
                .map_err(|err| storage_error("could not record vote", err))
        })
    }

    fn vote_count(&self) -> VoteStoreResult<u64> {
        self.with_db(|db| {
            let votes = cf_handle(db, VOTES_CF)?;
            let mut count = 0u64;
            for entry in db.iterator_cf(votes, IteratorMode::Start) {
                entry.map_err(|err| storage_error(CRUD_ERROR, err))?;
                count += 1;
            }
            Ok(count)
        })
    }

    fn flush(&self) -> VoteStoreResult<()> {
        self.with_db(flush_all)
    }

    fn close(&self) -> VoteStoreResult<()> {
        let _write_guard = self.write_lock.lock();
        let Some(db) = self.db.write().take() else {
            return Ok(());
        };
        let flushed = flush_all(&db);
        drop(db);
        info!("vote store at {} closed", self.config.path.display());
        flushed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn config(path: &Path) -> VoteStoreConfig {
        VoteStoreConfig {
            path: path.to_path_buf(),
        }
    }

    fn id(author: &str, permlink: &str) -> ContentId {
        ContentId::new(author, permlink).unwrap()
    }

    /// Writes raw entries the way another version of the code would have.
    fn write_raw(path: &Path, version: Option<u32>, votes: &[(&str, u64)]) {
        let db = DB::open_cf_descriptors(
            &VoteStore::default_db_opts(),
            path,
            vec![
                ColumnFamilyDescriptor::new(VOTES_CF, Options::default()),
                ColumnFamilyDescriptor::new(METADATA_CF, Options::default()),
            ],
        )
        .unwrap();
        if let Some(version) = version {
            let metadata = db.cf_handle(METADATA_CF).unwrap();
            db.put_cf(metadata, SCHEMA_VERSION_KEY, version.to_be_bytes())
                .unwrap();
        }
        let handle = db.cf_handle(VOTES_CF).unwrap();
        for (key, millis) in votes {
            db.put_cf(handle, key.as_bytes(), millis.to_be_bytes()).unwrap();
        }
    }

    #[test]
    fn test_record_then_has_voted() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        let store = VoteStore::open(config(temp_dir.path())).unwrap();
        let alice = id("alice", "first-post");

        assert!(!store.has_voted(&alice).unwrap());
        store
            .record_vote(&alice, SteemTime::from_millis(1_000))
            .unwrap();
        for _ in 0..3 {
            assert!(store.has_voted(&alice).unwrap());
        }
        assert!(!store.has_voted(&id("alice", "second-post")).unwrap());
        assert_eq!(store.vote_count().unwrap(), 1);
    }

    #[test]
    fn test_votes_survive_reopen() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        let alice = id("alice", "first-post");
        {
            let store = VoteStore::open(config(temp_dir.path())).unwrap();
            store
                .record_vote(&alice, SteemTime::from_millis(42))
                .unwrap();
            store.close().unwrap();
        }
        let store = VoteStore::open(config(temp_dir.path())).unwrap();
        assert_eq!(
            store.get_vote(&alice).unwrap(),
            Some(VoteRecord {
                content_id: alice,
                voted_at: SteemTime::from_millis(42),
            })
        );
    }

    #[test]
    fn test_second_record_keeps_first() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        let store = VoteStore::open(config(temp_dir.path())).unwrap();
        let bob = id("bob", "post");
        store.record_vote(&bob, SteemTime::from_millis(10)).unwrap();
        store.record_vote(&bob, SteemTime::from_millis(20)).unwrap();
        assert_eq!(
            store.get_vote(&bob).unwrap().map(|record| record.voted_at),
            Some(SteemTime::from_millis(10))
        );
        assert_eq!(store.vote_count().unwrap(), 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        write_raw(temp_dir.path(), Some(3), &[("alice/post", 7)]);

        assert_matches!(
            VoteStore::open(config(temp_dir.path())),
            Err(VoteStoreError::DBVersionError {
                found: 3,
                supported: SCHEMA_VERSION,
                ..
            })
        );

        // the data was not touched
        let db = DB::open_cf_descriptors(
            &VoteStore::default_db_opts(),
            temp_dir.path(),
            vec![
                ColumnFamilyDescriptor::new(VOTES_CF, Options::default()),
                ColumnFamilyDescriptor::new(METADATA_CF, Options::default()),
            ],
        )
        .unwrap();
        let metadata = db.cf_handle(METADATA_CF).unwrap();
        assert_eq!(
            db.get_cf(metadata, SCHEMA_VERSION_KEY).unwrap(),
            Some(3u32.to_be_bytes().to_vec())
        );
    }

    #[test]
    fn test_unversioned_votes_are_rejected() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        write_raw(temp_dir.path(), None, &[("alice/post", 7)]);
        assert_matches!(
            VoteStore::open(config(temp_dir.path())),
            Err(VoteStoreError::DBVersionError { found: 0, .. })
        );
    }

    #[test]
    fn test_fresh_store_is_stamped() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        VoteStore::open(config(temp_dir.path()))
            .unwrap()
            .close()
            .unwrap();
        // an empty but stamped store reopens fine
        let store = VoteStore::open(config(temp_dir.path())).unwrap();
        assert_eq!(store.vote_count().unwrap(), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        let store = VoteStore::open(config(temp_dir.path())).unwrap();
        store.close().unwrap();
        store.close().unwrap();
        assert_matches!(
            store.has_voted(&id("alice", "post")),
            Err(VoteStoreError::Closed)
        );
        assert_matches!(
            store.record_vote(&id("alice", "post"), SteemTime::from_millis(1)),
            Err(VoteStoreError::Closed)
        );
    }

    #[test]
    fn test_concurrent_writers() {
        let temp_dir = tempdir().expect("Unable to create a temp folder");
        let store = Arc::new(VoteStore::open(config(temp_dir.path())).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for n in 0..25 {
                        let content = id("author", &format!("post-{}-{}", writer, n));
                        store
                            .record_vote(&content, SteemTime::from_millis(n))
                            .unwrap();
                        assert!(store.has_voted(&content).unwrap());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.vote_count().unwrap(), 200);
    }
}
