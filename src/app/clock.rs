//! # Clock: the application.
//!
//! [`Clock`] owns the registered tasks, the dependency [`Provider`], the
//! optional [`Lifespan`] hook, and the runtime configuration. A single
//! blocking call — [`Clock::serve`] — drives the whole lifecycle:
//!
//! ```text
//! serve(self):
//!   validate every trigger              (fail fast, nothing has run)
//!   Starting:  lifespan.on_start()
//!              run OnStartUp tasks, await all
//!   Running:   spawn one TaskActor per periodic task
//!              ├─ all triggers exhaust  → fall through
//!              └─ OS signal             → cancel runtime token,
//!                                         wait up to Config::grace
//!   Stopping:  in-flight waits aborted; stragglers reported as stuck
//!   ShutDown:  run OnShutDown tasks exactly once (fresh token)
//!              lifespan.on_stop()       (every exit path past setup)
//!   Terminated
//! ```
//!
//! `serve` consumes the clock, so a terminated application cannot be
//! restarted; state transitions are strictly forward and observable through
//! [`Clock::state_watch`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::app::active::ActiveTracker;
use crate::app::actor::TaskActor;
use crate::app::runner::{run_once, RunIdent};
use crate::app::{shutdown, AppState, ClockBuilder, Lifespan};
use crate::config::Config;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::provider::Provider;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{Group, Task, TaskId, TaskSpec};
use crate::triggers::TriggerKind;

/// Trigger-driven task scheduler application.
///
/// ## Example
/// ```rust,no_run
/// use std::time::Duration;
/// use chime::{Clock, Config, JobFn, TaskContext, TaskError, TaskSpec, Trigger};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut app = Clock::new(Config::default());
///
///     app.task(TaskSpec::new(
///         JobFn::arc("ticker", |_ctx: TaskContext| async {
///             println!("tick");
///             Ok::<_, TaskError>(())
///         }),
///         Trigger::every(Duration::from_secs(3)),
///     ));
///
///     // blocks until all triggers exhaust or a termination signal arrives
///     app.serve().await?;
///     Ok(())
/// }
/// ```
pub struct Clock {
    cfg: Config,
    provider: Arc<Provider>,
    lifespan: Option<Arc<dyn Lifespan>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tasks: Vec<Task>,
    state_tx: watch::Sender<AppState>,
}

impl Clock {
    /// Creates a clock with the given configuration and no subscribers.
    pub fn new(cfg: Config) -> Self {
        Self::assemble(cfg, Vec::new(), None, Arc::new(Provider::new()))
    }

    /// Starts a builder for wiring subscribers, a lifespan hook, or a shared
    /// provider.
    pub fn builder(cfg: Config) -> ClockBuilder {
        ClockBuilder::new(cfg)
    }

    pub(crate) fn assemble(
        cfg: Config,
        subscribers: Vec<Arc<dyn Subscribe>>,
        lifespan: Option<Arc<dyn Lifespan>>,
        provider: Arc<Provider>,
    ) -> Self {
        let (state_tx, _state_rx) = watch::channel(AppState::Idle);
        Self {
            cfg,
            provider,
            lifespan,
            subscribers,
            tasks: Vec::new(),
            state_tx,
        }
    }

    /// Registers a task directly on the application.
    ///
    /// The returned [`TaskId`] reflects registration order. Tasks without a
    /// timeout inherit [`Config::timeout`] (when non-zero).
    pub fn task(&mut self, spec: TaskSpec) -> TaskId {
        let id = TaskId(self.tasks.len() as u64);
        let spec = self.with_default_timeout(spec);
        self.tasks.push(Task::from_spec(id, spec, None));
        id
    }

    /// Includes a group of tasks; each receives the next [`TaskId`] in order.
    pub fn include_group(&mut self, group: Group) {
        let (name, specs) = group.into_parts();
        for spec in specs {
            let id = TaskId(self.tasks.len() as u64);
            let spec = self.with_default_timeout(spec);
            self.tasks.push(Task::from_spec(id, spec, Some(name.clone())));
        }
    }

    /// The registered tasks, in registration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The dependency provider backing this application.
    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AppState {
        *self.state_tx.borrow()
    }

    /// A watch receiver observing every lifecycle transition.
    pub fn state_watch(&self) -> watch::Receiver<AppState> {
        self.state_tx.subscribe()
    }

    fn with_default_timeout(&self, spec: TaskSpec) -> TaskSpec {
        match (spec.timeout(), self.cfg.default_timeout()) {
            (None, Some(default)) => spec.with_timeout(default),
            _ => spec,
        }
    }

    fn transition(&self, bus: &Bus, state: AppState) {
        self.state_tx.send_replace(state);
        bus.publish(Event::new(EventKind::StateChanged).with_state(state));
    }

    /// Serves the application until all triggers exhaust or a termination
    /// signal arrives; consumes the clock (no restart from `Terminated`).
    ///
    /// Returns [`RuntimeError::InvalidTrigger`] before anything runs when a
    /// trigger fails validation, [`RuntimeError::LifespanFailed`] when setup
    /// fails, and [`RuntimeError::GraceExceeded`] when in-flight tasks outlive
    /// the grace period — in that last case the shutdown tasks and lifespan
    /// teardown still run before the error is returned.
    pub async fn serve(mut self) -> Result<(), RuntimeError> {
        for task in &self.tasks {
            task.trigger()
                .validate()
                .map_err(|source| RuntimeError::InvalidTrigger {
                    task: task.name().to_string(),
                    source,
                })?;
        }

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(
            std::mem::take(&mut self.subscribers),
            bus.clone(),
        ));
        let active = Arc::new(ActiveTracker::new());
        spawn_bus_listener(&bus, Arc::clone(&subs), Arc::clone(&active));

        let mut startup = Vec::new();
        let mut at_shutdown = Vec::new();
        let mut periodic = Vec::new();
        for task in std::mem::take(&mut self.tasks) {
            match task.trigger().kind() {
                TriggerKind::OnStartUp => startup.push(task),
                TriggerKind::OnShutDown => at_shutdown.push(task),
                _ => periodic.push(task),
            }
        }

        self.transition(&bus, AppState::Starting);
        if let Some(lifespan) = self.lifespan.clone() {
            if let Err(e) = lifespan.on_start().await {
                self.transition(&bus, AppState::Terminated);
                return Err(RuntimeError::LifespanFailed {
                    error: e.to_string(),
                });
            }
        }

        let runtime_token = CancellationToken::new();
        let semaphore = self
            .cfg
            .concurrency_limit()
            .map(|n| Arc::new(Semaphore::new(n)));

        // startup tasks complete fully before any periodic loop spawns
        run_lifecycle_tasks(startup, &bus, &self.provider, &runtime_token).await;

        self.transition(&bus, AppState::Running);
        let mut actors = JoinSet::new();
        for task in periodic {
            let actor = TaskActor::new(
                task,
                bus.clone(),
                Arc::clone(&self.provider),
                semaphore.clone(),
            );
            actors.spawn(actor.run(runtime_token.child_token()));
        }

        let outcome = tokio::select! {
            _ = shutdown::wait_for_shutdown_signal() => {
                bus.publish(Event::new(EventKind::ShutdownRequested));
                self.transition(&bus, AppState::Stopping);
                runtime_token.cancel();
                self.wait_with_grace(&mut actors, &bus, &active).await
            }
            _ = drain(&mut actors) => {
                self.transition(&bus, AppState::Stopping);
                runtime_token.cancel();
                Ok(())
            }
        };

        self.transition(&bus, AppState::ShutDown);
        // shutdown tasks run exactly once, on a fresh token, after the
        // periodic loops are gone
        let shutdown_token = CancellationToken::new();
        run_lifecycle_tasks(at_shutdown, &bus, &self.provider, &shutdown_token).await;

        if let Some(lifespan) = &self.lifespan {
            lifespan.on_stop().await;
        }

        self.transition(&bus, AppState::Terminated);
        // let the bus listener forward the tail before the queues close
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        subs.shutdown().await;

        outcome
    }

    /// Waits for all actors to finish within the configured grace period.
    async fn wait_with_grace(
        &self,
        actors: &mut JoinSet<()>,
        bus: &Bus,
        active: &ActiveTracker,
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        match time::timeout(grace, drain(actors)).await {
            Ok(()) => {
                bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck = active.snapshot().await;
                actors.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}

/// Joins every task in the set.
async fn drain(set: &mut JoinSet<()>) {
    while set.join_next().await.is_some() {}
}

/// Runs lifecycle tasks (OnStartUp/OnShutDown) concurrently to completion.
async fn run_lifecycle_tasks(
    tasks: Vec<Task>,
    bus: &Bus,
    provider: &Arc<Provider>,
    token: &CancellationToken,
) {
    let mut set = JoinSet::new();
    for mut task in tasks {
        let bus = bus.clone();
        let provider = Arc::clone(provider);
        let token = token.child_token();
        set.spawn(async move {
            let id = task.id();
            task.trigger_mut().mark_fired(Utc::now());
            bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_task(task.name())
                    .with_task_id(id)
                    .with_run(1),
            );
            let _ = run_once(
                task.job(),
                &token,
                task.timeout(),
                &provider,
                &bus,
                RunIdent {
                    id,
                    name: task.name(),
                    run: 1,
                },
            )
            .await;
        });
    }
    while set.join_next().await.is_some() {}
}

/// Forwards bus events to the subscriber set and the in-flight tracker.
fn spawn_bus_listener(bus: &Bus, subs: Arc<SubscriberSet>, active: Arc<ActiveTracker>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    active.update(&ev).await;
                    subs.emit_arc(Arc::new(ev));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TaskError, TriggerError};
    use crate::tasks::{JobFn, TaskContext};
    use crate::triggers::{Every, FirstRun, Trigger};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, entry: &'static str) -> Arc<dyn crate::tasks::Job> {
        let log = log.clone();
        JobFn::arc(entry, move |_ctx: TaskContext| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(entry.to_string());
                Ok::<(), TaskError>(())
            }
        })
    }

    #[tokio::test]
    async fn once_task_runs_exactly_once_and_serve_returns() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::new(Config::default());
        app.task(TaskSpec::new(recorder(&log, "only"), Trigger::once()));

        app.serve().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["only".to_string()]);
    }

    #[tokio::test]
    async fn startup_completes_before_any_periodic_invocation() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::new(Config::default());

        let slow_startup = {
            let log = log.clone();
            JobFn::arc("warmup", move |_ctx: TaskContext| {
                let log = log.clone();
                async move {
                    time::sleep(Duration::from_millis(50)).await;
                    log.lock().unwrap().push("warmup".to_string());
                    Ok::<(), TaskError>(())
                }
            })
        };
        app.task(TaskSpec::new(slow_startup, Trigger::on_start_up()));
        app.task(TaskSpec::new(recorder(&log, "periodic"), Trigger::once()));

        app.serve().await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["warmup".to_string(), "periodic".to_string()]
        );
    }

    #[tokio::test]
    async fn shutdown_tasks_run_once_after_periodic_loops() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::new(Config::default());

        app.task(TaskSpec::new(recorder(&log, "cleanup"), Trigger::on_shut_down()));
        app.task(TaskSpec::new(
            recorder(&log, "tick"),
            Every::new(Duration::from_millis(10)).with_max_runs(2),
        ));

        app.serve().await.unwrap();
        let entries = log.lock().unwrap().clone();
        assert_eq!(entries, vec!["tick", "tick", "cleanup"]);
    }

    #[tokio::test]
    async fn every_fires_are_evenly_spaced() {
        let instants: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::new(Config::default());

        let stamps = instants.clone();
        app.task(TaskSpec::new(
            JobFn::arc("metronome", move |_ctx: TaskContext| {
                let stamps = stamps.clone();
                async move {
                    stamps.lock().unwrap().push(Instant::now());
                    Ok::<(), TaskError>(())
                }
            }),
            Every::new(Duration::from_millis(50)).with_max_runs(3),
        ));

        app.serve().await.unwrap();
        let stamps = instants.lock().unwrap();
        assert_eq!(stamps.len(), 3);
        for pair in stamps.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(
                gap >= Duration::from_millis(40) && gap <= Duration::from_millis(200),
                "fire spacing {gap:?} outside jitter tolerance"
            );
        }
    }

    #[tokio::test]
    async fn failing_task_does_not_disturb_siblings() {
        let healthy = Arc::new(AtomicUsize::new(0));
        let mut app = Clock::new(Config::default());

        app.task(TaskSpec::new(
            JobFn::arc("faulty", |_ctx: TaskContext| async {
                Err::<(), TaskError>(TaskError::failed("kaput"))
            }),
            Every::new(Duration::from_millis(10)).with_max_runs(3),
        ));
        let seen = healthy.clone();
        app.task(TaskSpec::new(
            JobFn::arc("healthy", move |_ctx: TaskContext| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), TaskError>(())
                }
            }),
            Every::new(Duration::from_millis(10)).with_max_runs(3),
        ));

        app.serve().await.unwrap();
        assert_eq!(healthy.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_trigger_fails_fast_before_any_run() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut app = Clock::new(Config::default());

        let seen = ran.clone();
        app.task(TaskSpec::new(
            JobFn::arc("never", move |_ctx: TaskContext| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), TaskError>(())
                }
            }),
            Trigger::every(Duration::ZERO),
        ));

        let err = app.serve().await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::InvalidTrigger {
                source: TriggerError::ZeroInterval,
                ..
            }
        ));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_override_is_observed_within_the_run() {
        #[derive(Clone)]
        struct Greeting(&'static str);

        let seen: Log = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(Provider::new());
        provider.register(|| Greeting("live"));

        let mut app = Clock::builder(Config::default())
            .with_provider(provider.clone())
            .build();

        let log = seen.clone();
        app.task(TaskSpec::new(
            JobFn::arc("greeter", move |ctx: TaskContext| {
                let log = log.clone();
                async move {
                    let greeting = ctx.get::<Greeting>()?;
                    log.lock().unwrap().push(greeting.0.to_string());
                    Ok::<(), TaskError>(())
                }
            }),
            Trigger::once(),
        ));

        let _guard = provider.override_with(|| Greeting("double"));
        app.serve().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["double".to_string()]);
    }

    #[tokio::test]
    async fn lifespan_wraps_the_whole_run() {
        struct Span(Log);

        #[async_trait]
        impl Lifespan for Span {
            async fn on_start(&self) -> Result<(), TaskError> {
                self.0.lock().unwrap().push("up".to_string());
                Ok(())
            }

            async fn on_stop(&self) {
                self.0.lock().unwrap().push("down".to_string());
            }
        }

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::builder(Config::default())
            .with_lifespan(Span(log.clone()))
            .build();

        app.task(TaskSpec::new(recorder(&log, "startup"), Trigger::on_start_up()));
        app.task(TaskSpec::new(recorder(&log, "work"), Trigger::once()));
        app.task(TaskSpec::new(recorder(&log, "cleanup"), Trigger::on_shut_down()));

        app.serve().await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["up", "startup", "work", "cleanup", "down"]
        );
    }

    #[tokio::test]
    async fn failed_lifespan_setup_aborts_without_teardown() {
        struct Broken(Log);

        #[async_trait]
        impl Lifespan for Broken {
            async fn on_start(&self) -> Result<(), TaskError> {
                Err(TaskError::failed("no database"))
            }

            async fn on_stop(&self) {
                self.0.lock().unwrap().push("down".to_string());
            }
        }

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::builder(Config::default())
            .with_lifespan(Broken(log.clone()))
            .build();
        app.task(TaskSpec::new(recorder(&log, "work"), Trigger::once()));

        let err = app.serve().await.unwrap_err();
        assert!(matches!(err, RuntimeError::LifespanFailed { .. }));
        assert!(log.lock().unwrap().is_empty(), "no task ran, no teardown");
    }

    #[tokio::test]
    async fn state_transitions_are_observable_and_forward_only() {
        struct StateCollector(Arc<Mutex<Vec<AppState>>>);

        #[async_trait]
        impl Subscribe for StateCollector {
            async fn on_event(&self, event: &Event) {
                if let Some(state) = event.state {
                    self.0.lock().unwrap().push(state);
                }
            }

            fn name(&self) -> &'static str {
                "state_collector"
            }
        }

        let states = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::builder(Config::default())
            .with_subscriber(Arc::new(StateCollector(states.clone())))
            .build();
        assert_eq!(app.state(), AppState::Idle);
        let watch = app.state_watch();
        app.task(TaskSpec::new(
            JobFn::arc("noop", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));

        app.serve().await.unwrap();
        assert_eq!(*watch.borrow(), AppState::Terminated);
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                AppState::Starting,
                AppState::Running,
                AppState::Stopping,
                AppState::ShutDown,
                AppState::Terminated,
            ]
        );
    }

    #[tokio::test]
    async fn subscribers_observe_task_events() {
        struct KindCollector(Arc<Mutex<Vec<EventKind>>>);

        #[async_trait]
        impl Subscribe for KindCollector {
            async fn on_event(&self, event: &Event) {
                self.0.lock().unwrap().push(event.kind);
            }

            fn name(&self) -> &'static str {
                "kind_collector"
            }
        }

        let kinds = Arc::new(Mutex::new(Vec::new()));
        let mut app = Clock::builder(Config::default())
            .with_subscriber(Arc::new(KindCollector(kinds.clone())))
            .build();
        app.task(TaskSpec::new(
            JobFn::arc("noop", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));

        app.serve().await.unwrap();
        let kinds = kinds.lock().unwrap();
        assert!(kinds.contains(&EventKind::TaskStarting));
        assert!(kinds.contains(&EventKind::TaskCompleted));
        assert!(kinds.contains(&EventKind::TriggerExhausted));
    }

    #[tokio::test]
    async fn immediate_every_fires_then_waits() {
        let fires = Arc::new(AtomicUsize::new(0));
        let mut app = Clock::new(Config::default());

        let seen = fires.clone();
        app.task(TaskSpec::new(
            JobFn::arc("eager", move |_ctx: TaskContext| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), TaskError>(())
                }
            }),
            Every::new(Duration::from_millis(20))
                .with_first_run(FirstRun::Immediate)
                .with_max_runs(2),
        ));

        let started = Instant::now();
        app.serve().await.unwrap();
        assert_eq!(fires.load(Ordering::SeqCst), 2);
        // first fire immediate, second after one period
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn registration_assigns_ids_in_order_across_groups() {
        let mut app = Clock::new(Config::default());
        let first = app.task(TaskSpec::new(
            JobFn::arc("direct", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));

        let mut group = Group::new("pack");
        group.task(TaskSpec::new(
            JobFn::arc("grouped", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));
        app.include_group(group);

        assert_eq!(first, TaskId(0));
        assert_eq!(app.tasks()[1].id(), TaskId(1));
        assert_eq!(app.tasks()[1].group(), Some("pack"));
    }

    #[test]
    fn default_timeout_is_inherited_from_config() {
        let cfg = Config {
            timeout: Duration::from_secs(7),
            ..Config::default()
        };
        let mut app = Clock::new(cfg);
        app.task(TaskSpec::new(
            JobFn::arc("inherits", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));
        app.task(TaskSpec::new(
            JobFn::arc("explicit", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        )
        .with_timeout(Duration::from_secs(1)));

        assert_eq!(app.tasks()[0].timeout(), Some(Duration::from_secs(7)));
        assert_eq!(app.tasks()[1].timeout(), Some(Duration::from_secs(1)));
    }
}
