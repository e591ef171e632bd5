//! Check Daemon
//!
//! Background task that walks every region of the cluster on a fixed
//! interval, feeds each one to the anti-rule checker and hands the built
//! operators to the operator sink.

use antiaffinity_scheduler::{
    AntiRuleChecker, Cluster, OperatorBuilder, OperatorSink, SchedulerConfig,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Periodic anti-rule checking over all regions
pub struct CheckDaemon<C, B> {
    config: SchedulerConfig,
    cluster: Arc<C>,
    checker: Arc<AntiRuleChecker<B>>,
    sink: Arc<dyn OperatorSink>,
}

impl<C, B> CheckDaemon<C, B>
where
    C: Cluster + 'static,
    B: OperatorBuilder + 'static,
{
    /// Create a new check daemon
    pub fn new(
        config: SchedulerConfig,
        cluster: Arc<C>,
        checker: Arc<AntiRuleChecker<B>>,
        sink: Arc<dyn OperatorSink>,
    ) -> Self {
        Self {
            config,
            cluster,
            checker,
            sink,
        }
    }

    /// Check every region once. Returns the number of operators built.
    #[instrument(skip(self))]
    pub fn run_once(&self) -> usize {
        let regions = self.cluster.regions();
        let mut built = 0;

        for region in &regions {
            let Some(op) = self.checker.check(region) else {
                continue;
            };
            built += 1;
            if self.config.dry_run {
                info!(operator = %op, "Dry run, operator not dispatched");
            } else {
                self.sink.dispatch(op);
            }
        }

        debug!(regions = regions.len(), operators = built, "Check pass complete");
        built
    }

    /// Start the daemon as a background task, stopping when `shutdown` flips
    pub fn start(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                checker = self.checker.name(),
                interval = ?self.config.check_interval(),
                dry_run = self.config.dry_run,
                "Starting anti-rule check daemon"
            );

            let mut ticker = tokio::time::interval(self.config.check_interval());
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                    _ = shutdown.changed() => {
                        info!("Check daemon stopping");
                        break;
                    }
                }
            }
        })
    }
}
