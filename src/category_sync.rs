// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local category list with delete-then-resync.
//!
//! A delete moves the book through `Idle -> Deleting -> Reconciling` and
//! back to `Idle`, or into `Failed` when the refetch after the delete does
//! not succeed. Only `Idle` accepts a new delete, so at most one is ever
//! in flight. The transitions hand out tickets ([`DeleteTicket`],
//! [`ReconcileTicket`]) so a step cannot be skipped.
//!
//! Ids that were removed locally are tombstoned for the life of the book:
//! fetched lists never bring them back and they cannot be deleted twice.
//! Until a resync succeeds they are also *pending*; only pending ids are
//! persisted, and the next successful fetch settles them. An id the server
//! no longer lists is confirmed; one it still lists is reported back as an
//! unconfirmed delete and shown again.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{CategoryApi, DeleteOutcome};
use crate::error::ApiError;
use crate::models::{Category, CategoryKind};
use crate::utils::{retry_request, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeleteState {
    Idle,
    Deleting { id: i64 },
    Reconciling { id: i64 },
    Failed { id: i64, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteRejection {
    #[error("a category delete is already in progress, please wait")]
    Busy,
    #[error("category {0} has already been deleted")]
    AlreadyDeleted(i64),
    #[error("category {0} is not in the list")]
    Unknown(i64),
    #[error("default categories cannot be deleted")]
    DefaultCategory,
}

/// How the delete call itself ended, before the resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeleteResolution {
    Removed,
    AlreadyGone,
    /// The request failed in transit; removed locally on the assumption the server got it.
    AssumedRemoved,
    /// The server refused; the category stays.
    Rejected(String),
}

impl DeleteResolution {
    pub fn removed_locally(&self) -> bool {
        !matches!(self, DeleteResolution::Rejected(_))
    }
}

#[derive(Debug)]
pub struct DeleteTicket {
    id: i64,
}

#[derive(Debug)]
pub struct ReconcileTicket {
    id: i64,
}

#[derive(Debug)]
pub struct DeleteReport {
    pub id: i64,
    pub name: String,
    pub resolution: DeleteResolution,
    pub resync_error: Option<ApiError>,
}

impl DeleteReport {
    pub fn message(&self) -> String {
        let base = match &self.resolution {
            DeleteResolution::Removed => format!("Deleted category '{}'.", self.name),
            DeleteResolution::AlreadyGone => format!(
                "Category '{}' no longer exists on the server or was already deleted.",
                self.name
            ),
            DeleteResolution::AssumedRemoved => format!(
                "Deleted category '{}' locally, but the server could not confirm because of a network error.",
                self.name
            ),
            DeleteResolution::Rejected(msg) => {
                format!("Could not delete category '{}': {}", self.name, msg)
            }
        };
        match &self.resync_error {
            None => base,
            Some(e) => format!(
                "{} Sync failed ({}); refresh the category list to retry.",
                base,
                e.user_message()
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryBook {
    categories: Vec<Category>,
    tombstones: BTreeSet<i64>,
    pending: BTreeSet<i64>,
    unconfirmed: Vec<Category>,
    state: DeleteState,
}

impl CategoryBook {
    /// Builds the book from a fresh fetch, settling deletes left pending by an earlier run.
    pub fn new(categories: Vec<Category>, pending: BTreeSet<i64>) -> Self {
        let unconfirmed: Vec<Category> = categories
            .iter()
            .filter(|c| pending.contains(&c.id))
            .cloned()
            .collect();
        if !unconfirmed.is_empty() {
            warn!(count = unconfirmed.len(), "earlier category deletes were not applied by the server");
        }
        CategoryBook {
            categories,
            tombstones: BTreeSet::new(),
            pending: BTreeSet::new(),
            unconfirmed,
            state: DeleteState::Idle,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn of_kind(&self, kind: CategoryKind) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.kind == kind)
    }

    pub fn get(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn tombstones(&self) -> &BTreeSet<i64> {
        &self.tombstones
    }

    /// Tombstones not yet settled by a successful resync. These are what gets persisted.
    pub fn pending(&self) -> &BTreeSet<i64> {
        &self.pending
    }

    /// Categories an earlier run removed locally but the server still lists.
    pub fn unconfirmed(&self) -> &[Category] {
        &self.unconfirmed
    }

    pub fn state(&self) -> &DeleteState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state != DeleteState::Idle
    }

    /// Takes a freshly fetched list, hiding tombstoned ids.
    pub fn replace(&mut self, fetched: Vec<Category>) {
        self.categories = fetched
            .into_iter()
            .filter(|c| !self.tombstones.contains(&c.id))
            .collect();
    }

    /// A successful resync settles every pending delete. Ids the server no longer
    /// lists are confirmed and dropped; the rest stay hidden for this book only.
    fn settle(&mut self, fetched: Vec<Category>) {
        let listed: BTreeSet<i64> = fetched.iter().map(|c| c.id).collect();
        self.tombstones.retain(|id| listed.contains(id));
        self.pending.clear();
        self.replace(fetched);
    }

    pub fn upsert(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    /// Validates a delete without changing state.
    pub fn check_delete(&self, id: i64) -> Result<&Category, DeleteRejection> {
        if self.is_busy() {
            return Err(DeleteRejection::Busy);
        }
        if self.tombstones.contains(&id) {
            return Err(DeleteRejection::AlreadyDeleted(id));
        }
        let category = self.get(id).ok_or(DeleteRejection::Unknown(id))?;
        if category.is_default {
            return Err(DeleteRejection::DefaultCategory);
        }
        Ok(category)
    }

    /// `Idle -> Deleting`.
    pub fn begin_delete(&mut self, id: i64) -> Result<DeleteTicket, DeleteRejection> {
        self.check_delete(id)?;
        self.state = DeleteState::Deleting { id };
        debug!(id, "category delete started");
        Ok(DeleteTicket { id })
    }

    /// `Deleting -> Reconciling`, applying the delete call's result locally.
    pub fn finish_delete(
        &mut self,
        ticket: DeleteTicket,
        outcome: Result<DeleteOutcome, ApiError>,
    ) -> (DeleteResolution, ReconcileTicket) {
        let id = ticket.id;
        let resolution = match outcome {
            Ok(DeleteOutcome::Deleted) => DeleteResolution::Removed,
            Ok(DeleteOutcome::AlreadyGone) => DeleteResolution::AlreadyGone,
            Err(e) if e.is_transient() => {
                warn!(id, error = %e, "delete not confirmed, removing locally");
                DeleteResolution::AssumedRemoved
            }
            Err(e) => DeleteResolution::Rejected(e.user_message()),
        };
        if resolution.removed_locally() {
            self.tombstones.insert(id);
            self.pending.insert(id);
            self.categories.retain(|c| c.id != id);
        }
        self.state = DeleteState::Reconciling { id };
        (resolution, ReconcileTicket { id })
    }

    /// `Reconciling -> Idle` on a successful refetch, `Reconciling -> Failed` otherwise.
    /// A failed refetch never restores a locally removed category.
    pub fn reconcile(
        &mut self,
        ticket: ReconcileTicket,
        fetched: Result<Vec<Category>, ApiError>,
    ) -> Result<(), ApiError> {
        match fetched {
            Ok(list) => {
                self.settle(list);
                self.state = DeleteState::Idle;
                info!(id = ticket.id, "category list reconciled");
                Ok(())
            }
            Err(e) => {
                warn!(id = ticket.id, error = %e, "category resync failed");
                self.state = DeleteState::Failed {
                    id: ticket.id,
                    reason: e.user_message(),
                };
                Err(e)
            }
        }
    }

    /// `Failed -> Reconciling`; `None` in any other state.
    pub fn retry_reconcile(&mut self) -> Option<ReconcileTicket> {
        match self.state {
            DeleteState::Failed { id, .. } => {
                self.state = DeleteState::Reconciling { id };
                Some(ReconcileTicket { id })
            }
            _ => None,
        }
    }
}

/// Fetches the category list, retrying transient failures.
pub fn fetch_categories<A: CategoryApi + ?Sized>(
    api: &A,
    retry: RetryPolicy,
) -> Result<Vec<Category>, ApiError> {
    retry_request(retry, || api.list_categories())
}

/// Deletes one category and always refetches the list afterwards.
pub fn run_delete<A: CategoryApi + ?Sized>(
    api: &A,
    book: &mut CategoryBook,
    id: i64,
    retry: RetryPolicy,
) -> Result<DeleteReport, DeleteRejection> {
    let ticket = book.begin_delete(id)?;
    let name = book.get(id).map(|c| c.name.clone()).unwrap_or_default();
    let outcome = api.delete_category(id);
    let (resolution, pending) = book.finish_delete(ticket, outcome);
    let resync_error = book
        .reconcile(pending, fetch_categories(api, retry))
        .err();
    Ok(DeleteReport {
        id,
        name,
        resolution,
        resync_error,
    })
}

/// Re-runs a failed resync. `Ok(false)` when there was nothing to retry.
pub fn retry_resync<A: CategoryApi + ?Sized>(
    api: &A,
    book: &mut CategoryBook,
    retry: RetryPolicy,
) -> Result<bool, ApiError> {
    match book.retry_reconcile() {
        Some(ticket) => book
            .reconcile(ticket, fetch_categories(api, retry))
            .map(|_| true),
        None => Ok(false),
    }
}

pub fn load_tombstones(conn: &Connection) -> rusqlite::Result<BTreeSet<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM category_tombstones")?;
    let rows = stmt.query_map([], |r| r.get::<_, i64>(0))?;
    rows.collect()
}

/// Replaces the stored set with `ids`, normally [`CategoryBook::pending`].
pub fn save_tombstones(conn: &Connection, ids: &BTreeSet<i64>) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM category_tombstones", [])?;
    for id in ids {
        tx.execute(
            "INSERT INTO category_tombstones(id) VALUES (?1)",
            params![id],
        )?;
    }
    tx.commit()
}
