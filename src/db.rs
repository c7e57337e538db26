use diesel::pg::PgConnection;

use crate::pool::{Pool, PoolError};

pub type DbPool = Pool<PgConnection>;

/// Open a pool of `size` Postgres connections. Fails fatally if any of the
/// initial connections cannot be established.
pub fn create_pool(database_url: &str, size: usize) -> Result<DbPool, PoolError> {
    DbPool::establish(database_url, size)
}
