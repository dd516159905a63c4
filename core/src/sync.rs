//! Keeps the local view consistent with the remote record source.
//!
//! # Design
//! All local state (query parameters, record store, edit session) lives in
//! one [`Session`] behind a single async mutex. Completion handlers take the
//! lock only to apply a result and never hold it across a remote call, so
//! user intents are never blocked by a slow request and no two completions
//! interleave partial updates.
//!
//! Every list fetch is tagged with a generation number taken at dispatch.
//! A response is applied only if its generation is still the newest one;
//! anything older is dropped, which keeps a slow fetch for superseded
//! parameters from overwriting newer state.
//!
//! Mutations never patch the store from their own response. A successful
//! create, update or delete is always followed by a fresh fetch, so ids and
//! `isDeleted` flags only ever come from the server's list endpoints.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::client::RecordClient;
use crate::config::ClientConfig;
use crate::edit::{EditSession, EditState, Field, NewRecord, StagedCommit};
use crate::error::{ApiError, SyncError};
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{ParamsChanged, QueryParams};
use crate::store::RecordStore;
use crate::transport::Transport;
use crate::types::{timestamp, CreateRecord, Record};

/// What happened to one of the two list requests in a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// The result was written to the store; carries the record count.
    Applied(usize),
    /// A newer fetch was dispatched before this one came back.
    Stale,
    Failed(ApiError),
}

/// Outcome of one `fetch_page` round: the visible page and the
/// include-deleted snapshot are requested and applied independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub generation: u64,
    pub page: FetchStatus,
    pub snapshot: FetchStatus,
}

impl FetchReport {
    pub fn is_applied(&self) -> bool {
        matches!(self.page, FetchStatus::Applied(_))
            && matches!(self.snapshot, FetchStatus::Applied(_))
    }

    pub fn errors(&self) -> impl Iterator<Item = &ApiError> {
        [&self.page, &self.snapshot]
            .into_iter()
            .filter_map(|status| match status {
                FetchStatus::Failed(err) => Some(err),
                _ => None,
            })
    }
}

/// Everything a view layer needs to render the record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub records: Vec<Record>,
    pub deleted: Vec<Record>,
    /// The deleted-records table is only shown while the toggle is on.
    pub show_deleted_panel: bool,
    pub loading: bool,
    pub edit: EditState,
    pub params: QueryParams,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Session {
    params: QueryParams,
    store: RecordStore,
    edit: EditSession,
    generation: u64,
    loading: bool,
    last_error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Page,
    Snapshot,
}

pub struct SyncController<T> {
    client: RecordClient,
    transport: T,
    timeout: Duration,
    clock: fn() -> DateTime<Utc>,
    session: Mutex<Session>,
}

impl<T: Transport> SyncController<T> {
    /// Nothing is fetched until the first intent; call
    /// [`refresh`](Self::refresh) for the initial load.
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: RecordClient::new(&config.base_url),
            transport,
            timeout: config.timeout,
            clock: Utc::now,
            session: Mutex::new(Session::default()),
        }
    }

    /// Replaces the wall clock used to stamp `currentTime` on commit.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn client(&self) -> &RecordClient {
        &self.client
    }

    pub async fn view(&self) -> ViewState {
        let session = self.session.lock().await;
        ViewState {
            records: session.store.page().to_vec(),
            deleted: session.store.deleted().to_vec(),
            show_deleted_panel: session.params.include_deleted(),
            loading: session.loading,
            edit: session.edit.state().clone(),
            params: session.params.clone(),
            last_error: session.last_error.clone(),
        }
    }

    pub async fn store(&self) -> RecordStore {
        self.session.lock().await.store.clone()
    }

    // --- query parameters ---

    pub async fn set_page(&self, page: i64) -> Result<FetchReport, SyncError> {
        let changed = self.session.lock().await.params.set_page(page)?;
        Ok(self.refetch(changed).await)
    }

    pub async fn first_page(&self) -> Result<FetchReport, SyncError> {
        self.set_page(1).await
    }

    /// Fails with `InvalidPage(0)` on the first page instead of asking the
    /// server for page 0.
    pub async fn prev_page(&self) -> Result<FetchReport, SyncError> {
        let changed = {
            let mut session = self.session.lock().await;
            let prev = i64::from(session.params.page()) - 1;
            session.params.set_page(prev)?
        };
        Ok(self.refetch(changed).await)
    }

    pub async fn next_page(&self) -> Result<FetchReport, SyncError> {
        let changed = {
            let mut session = self.session.lock().await;
            let next = i64::from(session.params.page()) + 1;
            session.params.set_page(next)?
        };
        Ok(self.refetch(changed).await)
    }

    pub async fn set_search(&self, search: impl Into<String>) -> FetchReport {
        let changed = self.session.lock().await.params.set_search(search);
        self.refetch(changed).await
    }

    pub async fn set_include_deleted(&self, include_deleted: bool) -> FetchReport {
        let changed = self
            .session
            .lock()
            .await
            .params
            .set_include_deleted(include_deleted);
        self.refetch(changed).await
    }

    pub async fn refresh(&self) -> FetchReport {
        self.fetch_page().await
    }

    async fn refetch(&self, _changed: ParamsChanged) -> FetchReport {
        self.fetch_page().await
    }

    // --- fetching ---

    /// Requests the current page and the include-deleted snapshot for the
    /// parameters as they are now. Either result is applied on its own; a
    /// failure leaves the previous contents for that half in place.
    pub async fn fetch_page(&self) -> FetchReport {
        let (generation, params) = {
            let mut session = self.session.lock().await;
            session.generation += 1;
            session.loading = true;
            session.last_error = None;
            (session.generation, session.params.clone())
        };
        tracing::debug!(
            generation,
            page = params.page(),
            search = params.search(),
            include_deleted = params.include_deleted(),
            "fetching records"
        );

        let (page, snapshot) = tokio::join!(
            self.fetch_and_apply(
                generation,
                self.client.build_list_records(&params),
                Target::Page
            ),
            self.fetch_and_apply(
                generation,
                self.client.build_snapshot_records(&params),
                Target::Snapshot
            ),
        );

        let mut session = self.session.lock().await;
        if session.generation == generation {
            session.loading = false;
        }
        FetchReport {
            generation,
            page,
            snapshot,
        }
    }

    async fn fetch_and_apply(
        &self,
        generation: u64,
        request: HttpRequest,
        target: Target,
    ) -> FetchStatus {
        let result = self
            .round_trip(request)
            .await
            .and_then(|response| self.client.parse_list_records(response));

        let mut session = self.session.lock().await;
        if session.generation != generation {
            tracing::debug!(
                generation,
                current = session.generation,
                ?target,
                ok = result.is_ok(),
                "discarding stale fetch result"
            );
            return FetchStatus::Stale;
        }
        match result {
            Ok(records) => {
                let count = records.len();
                match target {
                    Target::Page => session.store.apply_list_result(records),
                    Target::Snapshot => session.store.apply_full_snapshot(records),
                }
                tracing::debug!(generation, ?target, count, "applied fetch result");
                FetchStatus::Applied(count)
            }
            Err(err) => {
                tracing::warn!(generation, ?target, error = %err, "fetching records failed");
                session.last_error = Some(format!("fetching records failed: {err}"));
                FetchStatus::Failed(err)
            }
        }
    }

    // --- edit session ---

    pub async fn begin_create(&self) {
        self.session.lock().await.edit.begin_create();
    }

    /// Starts editing the record with `id` from the current page.
    pub async fn begin_edit(&self, id: i64) -> Result<(), SyncError> {
        let mut guard = self.session.lock().await;
        let session = &mut *guard;
        if session.store.find(id).is_none() {
            return Err(SyncError::NoSelection(id));
        }
        session.edit.begin_edit(session.store.find(id));
        Ok(())
    }

    pub async fn update_field(&self, field: Field, value: impl Into<String>) {
        self.session.lock().await.edit.update_field(field, value);
    }

    pub async fn cancel(&self) {
        self.session.lock().await.edit.cancel();
    }

    /// Sends the active draft. Returns `Ok(None)` without touching the
    /// network while idle. On failure the draft is kept as typed.
    pub async fn commit(&self) -> Result<Option<FetchReport>, SyncError> {
        let (staged, epoch) = {
            let session = self.session.lock().await;
            (session.edit.stage((self.clock)()), session.edit.epoch())
        };
        let report = match staged {
            None => {
                tracing::debug!("commit requested with no active draft");
                return Ok(None);
            }
            Some(StagedCommit::Create(input)) => self.submit_create(&input, epoch).await?,
            Some(StagedCommit::Update { id, record }) => {
                self.submit_update(id, &record, epoch).await?
            }
        };
        Ok(Some(report))
    }

    // --- mutations ---

    pub async fn create(&self, draft: &NewRecord) -> Result<FetchReport, SyncError> {
        let epoch = self.session.lock().await.edit.epoch();
        let input = CreateRecord {
            name: draft.name.clone(),
            email: draft.email.clone(),
            current_time: timestamp((self.clock)()),
        };
        self.submit_create(&input, epoch).await
    }

    pub async fn update(&self, id: i64, draft: &Record) -> Result<FetchReport, SyncError> {
        let epoch = self.session.lock().await.edit.epoch();
        let record = Record {
            id,
            current_time: timestamp((self.clock)()),
            ..draft.clone()
        };
        self.submit_update(id, &record, epoch).await
    }

    /// On failure the store is left alone; the record is still there
    /// remotely, so it stays on screen.
    pub async fn delete(&self, id: i64) -> Result<FetchReport, SyncError> {
        let request = Ok(self.client.build_delete_record(id));
        self.mutate("delete", request, |c, r| c.parse_delete_record(r))
            .await?;
        tracing::debug!(id, "record deleted");
        Ok(self.fetch_page().await)
    }

    async fn submit_create(
        &self,
        input: &CreateRecord,
        epoch: u64,
    ) -> Result<FetchReport, SyncError> {
        let request = self.client.build_create_record(input);
        let created = self
            .mutate("create", request, |c, r| c.parse_create_record(r))
            .await?;
        match created {
            Some(record) => tracing::debug!(id = record.id, "record created"),
            None => tracing::debug!("record created without echo"),
        }
        self.session.lock().await.edit.finish(epoch);
        Ok(self.fetch_page().await)
    }

    async fn submit_update(
        &self,
        id: i64,
        record: &Record,
        epoch: u64,
    ) -> Result<FetchReport, SyncError> {
        let request = self.client.build_update_record(id, record);
        self.mutate("update", request, |c, r| c.parse_update_record(r))
            .await?;
        tracing::debug!(id, "record updated");
        self.session.lock().await.edit.finish(epoch);
        Ok(self.fetch_page().await)
    }

    async fn mutate<R>(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&RecordClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, SyncError> {
        let result = match request {
            Ok(request) => match self.round_trip(request).await {
                Ok(response) => parse(&self.client, response),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(operation, error = %err, "remote call failed");
                self.session.lock().await.last_error = Some(format!("{operation} failed: {err}"));
                Err(err.into())
            }
        }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        match tokio::time::timeout(self.timeout, self.transport.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }
}
