//! Bounded database connection pool.
//!
//! The pool opens a fixed number of physical connections up front and hands
//! them out as [`PooledConnection`] handles. Releasing a handle (dropping it)
//! returns the connection to the idle queue instead of closing it; physical
//! teardown happens only through [`Pool::shutdown`]. The pool is generic over
//! the connection type so its behavior can be tested without a database.
//!
//! There is no health checking: a connection that failed mid-use goes back
//! into the idle queue unchanged.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to open connection: {0}")]
    Connection(String),

    #[error("pool is shut down")]
    ShutDown,

    #[error("timed out waiting for a connection")]
    Timeout,
}

struct State<C> {
    idle: VecDeque<C>,
    shut_down: bool,
}

struct Shared<C> {
    state: Mutex<State<C>>,
    available: Condvar,
    size: usize,
}

impl<C> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().expect("pool lock poisoned")
    }
}

/// A fixed-size pool of `size` connections. Cloning is cheap and all clones
/// share the same underlying set of connections.
pub struct Pool<C> {
    inner: Arc<Shared<C>>,
}

impl<C> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Pool<C> {
    /// Open `size` connections through `connect`. Fails on the first
    /// connector error; connections opened so far are closed again, so a
    /// partially constructed pool never escapes.
    pub fn with_connector<F, E>(size: usize, mut connect: F) -> Result<Self, PoolError>
    where
        F: FnMut() -> Result<C, E>,
        E: std::fmt::Display,
    {
        let mut idle = VecDeque::with_capacity(size);
        for _ in 0..size {
            idle.push_back(connect().map_err(|e| PoolError::Connection(e.to_string()))?);
        }
        Ok(Self {
            inner: Arc::new(Shared {
                state: Mutex::new(State {
                    idle,
                    shut_down: false,
                }),
                available: Condvar::new(),
                size,
            }),
        })
    }

    /// Number of connections the pool was built with.
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Check out a connection, blocking until one is idle. Fails only once
    /// the pool has been shut down. There is no upper bound on the wait; use
    /// [`Pool::acquire_timeout`] when a deadline is needed.
    pub fn acquire(&self) -> Result<PooledConnection<C>, PoolError> {
        let mut state = self.inner.lock();
        loop {
            if state.shut_down {
                return Err(PoolError::ShutDown);
            }
            if let Some(conn) = state.idle.pop_front() {
                return Ok(PooledConnection {
                    conn: Some(conn),
                    pool: Arc::clone(&self.inner),
                });
            }
            state = self
                .inner
                .available
                .wait(state)
                .expect("pool lock poisoned");
        }
    }

    /// Like [`Pool::acquire`], but gives up with [`PoolError::Timeout`] once
    /// `timeout` has elapsed without a connection becoming idle.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<PooledConnection<C>, PoolError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.lock();
        loop {
            if state.shut_down {
                return Err(PoolError::ShutDown);
            }
            if let Some(conn) = state.idle.pop_front() {
                return Ok(PooledConnection {
                    conn: Some(conn),
                    pool: Arc::clone(&self.inner),
                });
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(PoolError::Timeout);
            }
            let (guard, _) = self
                .inner
                .available
                .wait_timeout(state, deadline - now)
                .expect("pool lock poisoned");
            state = guard;
        }
    }

    /// Close every idle connection and refuse further checkouts. Blocked and
    /// future `acquire` calls fail with [`PoolError::ShutDown`]. A handle
    /// still in circulation closes its connection when it is released, so
    /// each physical connection is torn down exactly once. Idempotent.
    pub fn shutdown(&self) {
        let drained: Vec<C> = {
            let mut state = self.inner.lock();
            state.shut_down = true;
            self.inner.available.notify_all();
            state.idle.drain(..).collect()
        };
        // Physical teardown outside the lock.
        drop(drained);
    }
}

impl<C: diesel::Connection> Pool<C> {
    /// Open a pool of `size` connections against `database_url`.
    pub fn establish(database_url: &str, size: usize) -> Result<Self, PoolError> {
        Self::with_connector(size, || C::establish(database_url))
    }
}

/// A checked-out connection. Dereferences to the underlying connection for
/// the duration of one repository call; dropping it releases the connection
/// back to the pool on every exit path.
pub struct PooledConnection<C> {
    conn: Option<C>,
    pool: Arc<Shared<C>>,
}

impl<C> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.conn.as_ref().expect("connection already released")
    }
}

impl<C> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().expect("connection already released")
    }
}

impl<C> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let mut state = self.pool.lock();
        if state.shut_down {
            drop(state);
            // The pool is gone; this is the real close.
            drop(conn);
        } else {
            state.idle.push_back(conn);
            self.pool.available.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;

    /// Connection stand-in that counts how often it is physically closed.
    struct FakeConn {
        id: usize,
        closed: Arc<AtomicUsize>,
    }

    impl Drop for FakeConn {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fake_pool(size: usize) -> (Pool<FakeConn>, Arc<AtomicUsize>) {
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = closed.clone();
        let mut next_id = 0;
        let pool = Pool::with_connector(size, move || {
            next_id += 1;
            Ok::<_, Infallible>(FakeConn {
                id: next_id,
                closed: counter.clone(),
            })
        })
        .expect("pool construction failed");
        (pool, closed)
    }

    #[test]
    fn hands_out_at_most_size_connections() {
        let (pool, _) = fake_pool(2);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let active = active.clone();
            let peak = peak.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..20 {
                    let conn = pool.acquire().expect("acquire failed");
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(1));
                    active.fetch_sub(1, Ordering::SeqCst);
                    drop(conn);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn third_caller_blocks_until_a_release() {
        let (pool, _) = fake_pool(2);
        let first = pool.acquire().expect("first acquire failed");
        let _second = pool.acquire().expect("second acquire failed");

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let pool = pool.clone();
            thread::spawn(move || {
                let conn = pool.acquire().expect("blocked acquire failed");
                tx.send(conn.id).expect("send failed");
            })
        };

        // Pool is exhausted, so the third caller must still be waiting.
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        let released_id = first.id;
        drop(first);
        let acquired_id = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("third caller never proceeded");
        assert_eq!(acquired_id, released_id);
        waiter.join().expect("waiter panicked");
    }

    #[test]
    fn never_hands_the_same_connection_to_two_callers() {
        let (pool, _) = fake_pool(3);
        let held = Arc::new(Mutex::new(HashSet::new()));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let pool = pool.clone();
            let held = held.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let conn = pool.acquire().expect("acquire failed");
                    assert!(
                        held.lock().unwrap().insert(conn.id),
                        "connection {} handed out twice",
                        conn.id
                    );
                    thread::yield_now();
                    held.lock().unwrap().remove(&conn.id);
                    drop(conn);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("worker panicked");
        }
    }

    #[test]
    fn handle_drop_returns_the_connection_instead_of_closing_it() {
        let (pool, closed) = fake_pool(1);
        for _ in 0..5 {
            let conn = pool.acquire().expect("acquire failed");
            drop(conn);
        }
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shutdown_closes_idle_connections_exactly_once() {
        let (pool, closed) = fake_pool(3);
        pool.shutdown();
        assert_eq!(closed.load(Ordering::SeqCst), 3);

        pool.shutdown();
        assert_eq!(closed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn shutdown_fails_blocked_and_later_acquires() {
        let (pool, closed) = fake_pool(1);
        let outstanding = pool.acquire().expect("acquire failed");

        let blocked = {
            let pool = pool.clone();
            thread::spawn(move || pool.acquire())
        };
        thread::sleep(Duration::from_millis(50));
        pool.shutdown();

        assert!(matches!(
            blocked.join().expect("waiter panicked"),
            Err(PoolError::ShutDown)
        ));
        assert!(matches!(pool.acquire(), Err(PoolError::ShutDown)));

        // The checked-out connection is closed on release, not re-pooled.
        assert_eq!(closed.load(Ordering::SeqCst), 0);
        drop(outstanding);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn acquire_timeout_expires_when_exhausted() {
        let (pool, _) = fake_pool(1);
        let _held = pool.acquire().expect("acquire failed");

        let start = Instant::now();
        let result = pool.acquire_timeout(Duration::from_millis(50));
        assert!(matches!(result, Err(PoolError::Timeout)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn acquire_timeout_succeeds_when_idle() {
        let (pool, _) = fake_pool(1);
        let conn = pool
            .acquire_timeout(Duration::from_millis(50))
            .expect("timed acquire failed");
        drop(conn);
    }

    #[test]
    fn construction_fails_without_leaking_opened_connections() {
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = closed.clone();
        let mut attempts = 0;
        let result: Result<Pool<FakeConn>, _> = Pool::with_connector(3, move || {
            attempts += 1;
            if attempts > 2 {
                return Err("connection refused");
            }
            Ok(FakeConn {
                id: attempts,
                closed: counter.clone(),
            })
        });

        assert!(matches!(result, Err(PoolError::Connection(_))));
        // Both successfully opened connections were closed again.
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }
}
