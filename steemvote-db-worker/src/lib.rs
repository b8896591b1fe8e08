// Copyright (c) 2022 THE STEEMVOTE AUTHORS

//! # General description
//!
//! VoteStore is a wrapper around a RocksDB database (on disk) recording every
//! content the bot voted for, so that a restart never leads to a second vote.
//!
//! # RocksDB
//!
//! We use 2 rocksdb columns:
//! * votes: key `author/permlink` (utf-8) -> value `voted_at` (u64 millis, big endian)
//! * metadata: key `v` -> schema version (u32, big endian)
//!
//! # Schema version
//!
//! A fresh database is stamped with `SCHEMA_VERSION`. Opening a database whose
//! version is outside `MIN_SUPPORTED_SCHEMA_VERSION..=SCHEMA_VERSION` fails
//! with `DBVersionError` and leaves the files untouched. A database holding
//! votes but no version tag was written before versioning and is reported as
//! version 0.
//!
//! # Durability
//!
//! Each vote is written in its own batch with `sync` enabled, so it is on disk
//! once `record_vote` returns.

mod vote_store;

pub use crate::vote_store::*;
