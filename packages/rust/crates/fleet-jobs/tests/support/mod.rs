#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use fleet_jobs::{
    DispatchStatus, JOB_CLASS_NAME, JobBackends, JobOptions, JobRecord, JobService, JobSubtype, METHOD_SIGNAL,
    ManualClock, MemoryBackends, QueueMessage, QueueWorker, STATE_FINISHED, SignalHandler,
    SupervisorConfig, TargetKind, TargetRef, WorkQueue,
};

pub const SCAN_JOB_TYPE: &str = "VmScan";
pub const SCANNING: &str = "scanning";

/// Service over in-memory backends driven by a manual clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub backends: MemoryBackends,
    pub service: Arc<JobService>,
}

impl Harness {
    pub fn new(config: SupervisorConfig) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let backends = MemoryBackends::new(clock.clone());
        let service = Arc::new(JobService::new(backends.backends(), config));
        Self {
            clock,
            backends,
            service,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(SupervisorConfig {
            base_timeout: timeout,
            ..SupervisorConfig::default()
        })
    }

    /// Rebuild the service over the same stores with some collaborators swapped.
    pub fn rewire(&mut self, swap: impl FnOnce(&mut JobBackends)) {
        let mut backends = self.backends.backends();
        swap(&mut backends);
        self.service = Arc::new(JobService::new(backends, self.service.config().clone()));
    }

    /// Worker with the built-in handlers plus the scan subtype.
    pub fn worker(&self) -> QueueWorker {
        self.service.default_worker().with_handler(
            JOB_CLASS_NAME,
            METHOD_SIGNAL,
            Arc::new(
                SignalHandler::new(Arc::clone(&self.service))
                    .with_subtype(SCAN_JOB_TYPE, Arc::new(ScanSubtype)),
            ),
        )
    }

    /// Register a VM in the inventory and return its reference.
    pub async fn add_vm(&self, id: u64, zone: Option<&str>) -> TargetRef {
        self.backends
            .inventory
            .add(TargetKind::VmOrTemplate, id, &format!("vm-{id}"), zone)
            .await
    }

    /// Create a scan job against `target` in `zone`.
    pub async fn create_scan_job(
        &self,
        target: Option<TargetRef>,
        zone: Option<&str>,
    ) -> anyhow::Result<JobRecord> {
        let mut options = JobOptions::named("Scan from Vm").with_userid("admin");
        options.target = target;
        options.zone = zone.map(str::to_string);
        Ok(self.service.create_job(SCAN_JOB_TYPE, options).await?)
    }

    /// Move a job into an in-flight, dispatched state.
    pub async fn activate(&self, id: u64) -> anyhow::Result<JobRecord> {
        Ok(self
            .service
            .update_job(id, |job| {
                job.state = SCANNING.to_string();
                job.dispatch_status = DispatchStatus::Active;
            })
            .await?)
    }

    /// Drive a job to `finished/ok`.
    pub async fn finish(&self, id: u64) -> anyhow::Result<JobRecord> {
        Ok(self
            .service
            .update_job(id, |job| {
                job.state = STATE_FINISHED.to_string();
                job.dispatch_status = DispatchStatus::Pending;
                job.message = "scan complete".to_string();
            })
            .await?)
    }

    pub async fn job(&self, id: u64) -> anyhow::Result<JobRecord> {
        self.service
            .get_job(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("job {id} missing"))
    }

    pub async fn messages_for(&self, method_name: &str) -> anyhow::Result<Vec<QueueMessage>> {
        Ok(self
            .backends
            .queue
            .messages()
            .await?
            .into_iter()
            .filter(|message| message.method_name == method_name)
            .collect())
    }
}

/// Minimal subtype: `start` moves the job into `scanning` and marks it dispatched.
pub struct ScanSubtype;

#[async_trait]
impl JobSubtype for ScanSubtype {
    async fn signal(
        &self,
        service: &JobService,
        job: &JobRecord,
        signal: &str,
    ) -> fleet_jobs::Result<()> {
        if signal != "start" {
            return Ok(());
        }
        service
            .update_job(job.id, |job| {
                job.state = SCANNING.to_string();
                job.dispatch_status = DispatchStatus::Active;
                job.message = "scanning".to_string();
            })
            .await?;
        Ok(())
    }
}
