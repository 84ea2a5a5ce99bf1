mod forums;
mod posts;
mod service;
mod threads;
mod users;

use sqlx::PgPool;

/// Postgres-backed store. Counters, forum membership, post paths and vote
/// tallies are maintained by triggers in `migrations/`.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
