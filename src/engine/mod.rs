//! Request semantics on top of a [`Store`]
//!
//! The engine turns storage outcomes into forum behavior: idempotent creates
//! that report the existing entity on conflict, partial updates, vote upserts
//! and the existence checks behind empty listings.

mod forums;
mod posts;
mod service;
mod threads;
mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Thread, ThreadRef};
use crate::store::{Store, ThreadStore};

/// Outcome of a create: the new entity, or whatever already holds its keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Creation<T, C = T> {
    Created(T),
    Conflict(C),
}

impl<T: Serialize, C: Serialize> IntoResponse for Creation<T, C> {
    fn into_response(self) -> Response {
        match self {
            Creation::Created(value) => (StatusCode::CREATED, Json(value)).into_response(),
            Creation::Conflict(existing) => (StatusCode::CONFLICT, Json(existing)).into_response(),
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn Store>,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Look a thread up by id or slug
    pub async fn resolve_thread(&self, thread: &ThreadRef) -> Result<Thread> {
        let found = match thread {
            ThreadRef::Id(id) => self.store.thread_by_id(*id).await?,
            ThreadRef::Slug(slug) => self.store.thread_by_slug(slug).await?,
        };
        found.ok_or_else(|| AppError::NotFound(format!("Can't find thread by {}", thread)))
    }
}
