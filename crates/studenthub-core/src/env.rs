//! Environment abstraction for deterministic testing.
//!
//! Decouples sync logic from system resources (time, randomness). Production
//! code uses [`SystemEnv`]; tests use [`test_utils::MockEnv`] with a virtual
//! clock and a counting RNG.

use std::time::Duration;

/// Abstract environment providing time and randomness.
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards within a single execution context
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; simulation
    /// environments may use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Current wall-clock time in unix milliseconds.
    ///
    /// Used only to stamp optimistic messages; ordering decisions always use
    /// `now()`.
    fn unix_millis(&self) -> i64;

    /// Sleeps for the specified duration.
    ///
    /// The only async method in the trait; used by driver code, never by
    /// state machines.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Generates a random `u128`.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }

    /// Generates a fresh correlation id for an optimistic send.
    fn correlation_id(&self) -> String {
        format!("{:032x}", self.random_u128())
    }
}

/// Production environment backed by system resources.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn unix_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as i64)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        use rand::RngCore;
        rand::rngs::OsRng.fill_bytes(buffer);
    }
}

/// Deterministic environments for tests.
pub mod test_utils {
    use std::{
        future::Future,
        pin::Pin,
        sync::{Arc, Mutex},
        task::{Context, Poll},
        time::Duration,
    };

    use super::Environment;

    /// Future that resolves immediately; virtual time never actually waits.
    struct ImmediateFuture;

    impl Future for ImmediateFuture {
        type Output = ();
        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            Poll::Ready(())
        }
    }

    #[derive(Debug)]
    struct MockState {
        epoch: std::time::Instant,
        elapsed: Duration,
        unix_millis: i64,
        rng_counter: u64,
    }

    /// Deterministic environment with a manually advanced clock and a
    /// counting byte source.
    #[derive(Debug, Clone)]
    pub struct MockEnv {
        state: Arc<Mutex<MockState>>,
    }

    impl MockEnv {
        /// Create a mock environment at time zero.
        pub fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(MockState {
                    epoch: std::time::Instant::now(),
                    elapsed: Duration::ZERO,
                    unix_millis: 1_700_000_000_000,
                    rng_counter: 0,
                })),
            }
        }

        /// Advance the virtual clock.
        pub fn advance(&self, by: Duration) {
            if let Ok(mut state) = self.state.lock() {
                state.elapsed += by;
                state.unix_millis += by.as_millis() as i64;
            }
        }

        /// Pin the wall clock to a specific unix-millis value.
        pub fn set_unix_millis(&self, millis: i64) {
            if let Ok(mut state) = self.state.lock() {
                state.unix_millis = millis;
            }
        }
    }

    impl Default for MockEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Environment for MockEnv {
        type Instant = std::time::Instant;

        fn now(&self) -> Self::Instant {
            self.state.lock().map_or_else(|_| std::time::Instant::now(), |s| s.epoch + s.elapsed)
        }

        fn unix_millis(&self) -> i64 {
            self.state.lock().map_or(0, |s| s.unix_millis)
        }

        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            ImmediateFuture
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let counter = self.state.lock().map_or(0, |mut s| {
                s.rng_counter += 1;
                s.rng_counter
            });
            let seed = counter.to_be_bytes();
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = seed[i % seed.len()] ^ (i as u8);
            }
        }
    }

}
