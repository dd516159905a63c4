//! Client-side state synchronization for a paginated, filterable record list.
//!
//! # Overview
//! An operator browses, filters, pages through, creates, updates and
//! soft-deletes records exposed by a remote HTTP API. This crate owns the
//! local side of that conversation: which page is visible, what the filters
//! are, which draft is being edited, and how all of it stays consistent with
//! a remote source that may be slow or failing. Rendering is left to the
//! host, which reads [`ViewState`] and feeds user intents into
//! [`SyncController`].
//!
//! # Design
//! - `RecordClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. A [`Transport`] does the I/O.
//! - `RecordStore`, `QueryParams` and `EditSession` are plain owned state
//!   with no I/O. `SyncController` owns one of each and is the only thing
//!   that issues remote calls.
//! - Fetch results are tagged with a generation and stale ones are dropped.
//! - Mutations resynchronize by refetching, never by patching the store.

pub mod client;
pub mod config;
pub mod edit;
pub mod error;
pub mod http;
pub mod query;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;

pub use client::RecordClient;
pub use config::ClientConfig;
pub use edit::{EditSession, EditState, Field, NewRecord, StagedCommit};
pub use error::{ApiError, ConfigError, SyncError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{ParamsChanged, QueryParams};
pub use store::RecordStore;
pub use sync::{FetchReport, FetchStatus, SyncController, ViewState};
pub use transport::{Transport, UreqTransport};
pub use types::{timestamp, CreateRecord, Record};
