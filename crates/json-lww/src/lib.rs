//! Path-granular last-write-wins recording and merging of JSON documents.
//!
//! A [`Recorder`] holds a JSON value together with a [`TimestampIndex`]:
//! for every path ever observed, when it last changed and whether that
//! change removed it. Two recorders holding replicas of the same document
//! are reconciled with [`Recorder::merge`], which takes each path from
//! whichever side touched it last.
//!
//! ```
//! use json_lww::{ManualClock, Recorder};
//! use serde_json::json;
//!
//! let clock = ManualClock::new(1);
//! let mut phone = Recorder::with_clock(json!({"theme": "dark", "font": 12}), clock.clone());
//! let mut laptop = Recorder::deserialize_with_clock(&phone.serialize(), clock.clone()).unwrap();
//!
//! clock.advance(1);
//! phone.update(json!({"theme": "light", "font": 12})).unwrap();
//! clock.advance(1);
//! laptop.update(json!({"theme": "dark", "font": 14})).unwrap();
//!
//! phone.merge(&laptop);
//! assert_eq!(phone.get_value(), json!({"theme": "light", "font": 14}));
//! ```

pub mod cli;
pub mod clock;
pub mod codec;
pub mod diff;
pub mod error;
pub mod index;
pub mod merge;
pub mod recorder;
pub mod sync;
pub mod value;

pub use json_lww_path as path;
pub use json_lww_path::{Path, PathStep};

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use codec::Snapshot;
pub use diff::{Change, ChangeSet};
pub use error::{RecorderError, RecorderResult};
pub use index::{TimestampEntry, TimestampIndex};
pub use merge::MergeOutcome;
pub use recorder::Recorder;
