//! Resolver lifecycle and refresh coordination.
//!
//! [`Resolver`] owns the parts a concrete strategy should not have to handle:
//! - one-time listener registration
//! - at most one attempt in flight, extra refreshes are dropped
//! - cancellation of that attempt on disposal
//! - strategy errors and panics delivered as [`ResolverResult`] failures
//!
//! Strategies only implement [`ResolveStrategy`].

use crate::base::{ResolvePanic, ResolverError, ResolverState, Status};
use crate::resolver::{options::ResolverOptions, result::ResolverResult, sink::ResolverSink};
use futures::FutureExt;
use std::{
    cell::RefCell,
    error::Error,
    fmt,
    future::{self, Future},
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, OnceLock, PoisonError, RwLock, Weak,
    },
};
use tokio::{runtime::Handle, task::JoinHandle};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Error type strategies report resolution failures with.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Future returned by [`ResolveStrategy::resolve`].
pub type ResolveFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;

/// A concrete resolution strategy (DNS, static list, service discovery...).
///
/// Results are never returned from [`resolve`](ResolveStrategy::resolve);
/// they are pushed through [`ResolveContext::deliver`]. An `Err` or a panic
/// is reported to the listener as an `Unavailable` failure, unless the
/// resolver was disposed in the meantime.
pub trait ResolveStrategy: Send + Sync + 'static {
    /// Name used in log records. Defaults to the type name.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Runs inside [`Resolver::start`] after the listener is registered.
    ///
    /// Strategies usually trigger their first resolution here.
    fn on_started(&self, resolver: &ResolverHandle) {
        let _ = resolver;
    }

    /// Perform one resolution attempt.
    ///
    /// At most one attempt per resolver runs at a time. Implementations must
    /// stop promptly once `cx` is cancelled.
    fn resolve(&self, cx: ResolveContext) -> ResolveFuture {
        let _ = cx;
        Box::pin(future::ready(Ok(())))
    }

    /// Teardown hook, run once by [`Resolver::dispose`] after cancellation.
    fn on_disposed(&self) {}
}

thread_local! {
    /// Delivery gates whose listener is running on this thread.
    static DELIVERING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

fn gate_key(gate: &Arc<RwLock<()>>) -> usize {
    Arc::as_ptr(gate) as usize
}

/// Marks this thread as inside a listener call for one resolver.
struct DeliveryScope {
    key: usize,
}

impl DeliveryScope {
    fn enter(gate: &Arc<RwLock<()>>) -> Self {
        let key = gate_key(gate);
        DELIVERING.with(|d| d.borrow_mut().push(key));
        Self { key }
    }

    fn is_active(gate: &Arc<RwLock<()>>) -> bool {
        let key = gate_key(gate);
        DELIVERING.with(|d| d.borrow().contains(&key))
    }
}

impl Drop for DeliveryScope {
    fn drop(&mut self) {
        DELIVERING.with(|d| {
            let mut keys = d.borrow_mut();
            if let Some(pos) = keys.iter().rposition(|k| *k == self.key) {
                keys.remove(pos);
            }
        });
    }
}

/// The registered callback, wrapped with result logging.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<dyn Fn(ResolverResult) + Send + Sync>,
    sink: Arc<dyn ResolverSink>,
    resolver: &'static str,
    token: CancellationToken,
    gate: Arc<RwLock<()>>,
}

impl Listener {
    /// Log `result` and hand it to the callback.
    ///
    /// Results arriving after the resolver was disposed are dropped. Delivery
    /// holds the resolver's delivery gate for reading, so once
    /// [`Resolver::dispose`] returns the callback is not entered again.
    pub fn deliver(&self, result: ResolverResult) {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        if self.token.is_cancelled() {
            tracing::debug!(
                resolver = %self.resolver,
                status = ?result.status().code(),
                "resolver result dropped after dispose"
            );
            return;
        }
        self.sink.result_received(
            self.resolver,
            result.status().code(),
            result.address_count(),
        );

        let _scope = DeliveryScope::enter(&self.gate);
        (self.callback)(result);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// What a strategy gets for one resolution attempt.
#[derive(Clone, Debug)]
pub struct ResolveContext {
    listener: Listener,
    token: CancellationToken,
}

impl ResolveContext {
    /// Deliver a result to the registered listener.
    pub fn deliver(&self, result: ResolverResult) {
        self.listener.deliver(result);
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the resolver is disposed.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Token cancelled on disposal, for passing into other cancellable work.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Non-owning handle given to strategies.
///
/// Strategies may store it to schedule their own refreshes; it does not keep
/// the resolver alive.
#[derive(Clone, Debug)]
pub struct ResolverHandle {
    inner: Weak<Inner>,
    token: CancellationToken,
    runtime: Option<Handle>,
}

impl ResolverHandle {
    /// Same as [`Resolver::refresh`]. Fails with
    /// [`ResolverError::Disposed`] once the resolver is gone.
    pub fn refresh(&self) -> Result<(), ResolverError> {
        match self.inner.upgrade() {
            Some(inner) => inner.refresh(),
            None => Err(ResolverError::Disposed),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token cancelled when the resolver is disposed or dropped.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Runtime the resolver spawns work on: the configured one, otherwise
    /// the runtime current on the calling thread.
    pub fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }
}

struct Inner {
    strategy: Arc<dyn ResolveStrategy>,
    sink: Arc<dyn ResolverSink>,
    name: &'static str,
    runtime: Option<Handle>,
    listener: OnceLock<Listener>,
    task: Mutex<Option<JoinHandle<()>>>,
    token: CancellationToken,
    gate: Arc<RwLock<()>>,
    closing: AtomicBool,
    disposed: AtomicBool,
}

impl Inner {
    fn refresh(&self) -> Result<(), ResolverError> {
        if self.closing.load(Ordering::Acquire) {
            return Err(ResolverError::Disposed);
        }
        let listener = self
            .listener
            .get()
            .ok_or(ResolverError::InvalidOperation("resolver hasn't been started"))?
            .clone();

        self.sink.refresh_requested(self.name);
        if !self.launch(listener)? {
            self.sink.refresh_ignored(self.name);
        }
        Ok(())
    }

    /// Spawn an attempt unless one is still running. Returns whether an
    /// attempt was spawned.
    fn launch(&self, listener: Listener) -> Result<bool, ResolverError> {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(false);
        }

        let runtime = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(ResolverError::NoRuntime)?;

        let started = Arc::new(AtomicBool::new(false));
        let attempt = Attempt {
            strategy: Arc::clone(&self.strategy),
            sink: Arc::clone(&self.sink),
            name: self.name,
            token: self.token.clone(),
            listener,
            started: Arc::clone(&started),
        };
        let join = runtime.spawn(attempt.run());

        // A runtime that has shut down completes the task without polling it.
        if join.is_finished() && !started.load(Ordering::Acquire) {
            tracing::warn!(resolver = %self.name, "runtime shut down, refresh not started");
            return Err(ResolverError::NoRuntime);
        }
        *task = Some(join);
        Ok(true)
    }

    fn is_running(&self) -> Option<bool> {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().map(|t| !t.is_finished())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// One spawned resolution attempt. Holds no reference to `Inner`; dropping
/// every [`Resolver`] still cancels an attempt stuck in its strategy.
struct Attempt {
    strategy: Arc<dyn ResolveStrategy>,
    sink: Arc<dyn ResolverSink>,
    name: &'static str,
    token: CancellationToken,
    listener: Listener,
    started: Arc<AtomicBool>,
}

impl Attempt {
    /// Run one attempt. Every failure ends up as data: a delivered failure
    /// result, or nothing when the resolver was disposed.
    async fn run(self) {
        self.started.store(true, Ordering::Release);
        let cx = ResolveContext {
            listener: self.listener.clone(),
            token: self.token.child_token(),
        };

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.strategy.resolve(cx))) {
            Ok(attempt) => AssertUnwindSafe(attempt)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ResolvePanic::from_payload(payload).into())),
            Err(payload) => Err(ResolvePanic::from_payload(payload).into()),
        };

        let Err(error) = outcome else {
            return;
        };
        if self.token.is_cancelled() {
            tracing::trace!(resolver = %self.name, error = %error, "resolution cancelled");
            return;
        }

        self.sink.refresh_error(self.name, error.as_ref());
        let status =
            Status::unavailable(format!("Error refreshing resolver: {error}")).with_source(error);
        self.listener.deliver(ResolverResult::failure(status));
    }
}

/// Lifecycle-and-concurrency coordinator around a [`ResolveStrategy`].
///
/// Cloning is cheap and every clone controls the same resolver. Dropping the
/// last clone cancels in-flight work without running
/// [`ResolveStrategy::on_disposed`].
///
/// # Example
///
/// ```rust,ignore
/// use rpcresolve::resolver::{Resolver, StaticResolver, BalancerAddress};
///
/// let resolver = Resolver::new(StaticResolver::new(vec![BalancerAddress::new("10.0.0.1", 80)]));
/// resolver.start(|result| println!("{:?}", result.addresses()))?;
/// resolver.refresh()?;
/// // ...
/// resolver.dispose();
/// ```
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<Inner>,
}

impl Resolver {
    /// Wrap `strategy` with default options.
    pub fn new<S: ResolveStrategy>(strategy: S) -> Self {
        Self::with_options(strategy, &ResolverOptions::default())
    }

    pub fn with_options<S: ResolveStrategy>(strategy: S, options: &ResolverOptions) -> Self {
        Self::from_strategy(Arc::new(strategy), options)
    }

    pub fn from_strategy(strategy: Arc<dyn ResolveStrategy>, options: &ResolverOptions) -> Self {
        let name = strategy.name();
        Self {
            inner: Arc::new(Inner {
                strategy,
                sink: Arc::clone(&options.sink),
                name,
                runtime: options.runtime.clone(),
                listener: OnceLock::new(),
                task: Mutex::new(None),
                token: CancellationToken::new(),
                gate: Arc::new(RwLock::new(())),
                closing: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Register the listener and run [`ResolveStrategy::on_started`].
    ///
    /// Fails with [`ResolverError::InvalidOperation`] when already started and
    /// [`ResolverError::Disposed`] after disposal. The first listener is never
    /// replaced.
    pub fn start<F>(&self, listener: F) -> Result<(), ResolverError>
    where
        F: Fn(ResolverResult) + Send + Sync + 'static,
    {
        if self.inner.closing.load(Ordering::Acquire) {
            return Err(ResolverError::Disposed);
        }
        let listener = Listener {
            callback: Arc::new(listener),
            sink: Arc::clone(&self.inner.sink),
            resolver: self.inner.name,
            token: self.inner.token.clone(),
            gate: Arc::clone(&self.inner.gate),
        };
        self.inner
            .listener
            .set(listener)
            .map_err(|_| ResolverError::InvalidOperation("resolver has already been started"))?;

        tracing::debug!(resolver = %self.inner.name, "resolver started");
        self.inner.strategy.on_started(&self.handle());
        Ok(())
    }

    /// Hint that a new resolution would be useful.
    ///
    /// Starts an attempt unless one is already running, in which case the
    /// call is ignored. Never waits for the attempt. The attempt runs on the
    /// configured runtime, otherwise on the runtime current on the calling
    /// thread.
    pub fn refresh(&self) -> Result<(), ResolverError> {
        self.inner.refresh()
    }

    /// Cancel in-flight work and run the strategy's teardown. Idempotent.
    ///
    /// Waits for a listener call running on another thread to return. Called
    /// from inside the listener, the current call simply finishes.
    pub fn dispose(&self) {
        if self.inner.closing.swap(true, Ordering::AcqRel) {
            return;
        }
        if DeliveryScope::is_active(&self.inner.gate) {
            self.inner.token.cancel();
        } else {
            let _gate = self
                .inner
                .gate
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.token.cancel();
        }
        self.inner.strategy.on_disposed();
        self.inner.disposed.store(true, Ordering::Release);
        tracing::debug!(resolver = %self.inner.name, "resolver disposed");
    }

    /// True once teardown has completed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ResolverState {
        if self.inner.closing.load(Ordering::Acquire) {
            return ResolverState::Disposed;
        }
        if self.inner.listener.get().is_none() {
            return ResolverState::Created;
        }
        match self.inner.is_running() {
            None => ResolverState::Started,
            Some(true) => ResolverState::Resolving,
            Some(false) => ResolverState::Idle,
        }
    }

    /// Name reported in log records.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn handle(&self) -> ResolverHandle {
        ResolverHandle {
            inner: Arc::downgrade(&self.inner),
            token: self.inner.token.clone(),
            runtime: self.inner.runtime.clone(),
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}
