//! Orchestration: phase 1 once, phase 2 per input size, then trend fitting.
//!
//! A single `Driver` value is constructed from a [`Config`] and a `Host`
//! and driven to completion by [`Driver::run`] — no process-wide state,
//! just a concrete value handed down into the orchestration.

use std::fs;

use log::{info, warn};

use crate::config::Config;
use crate::error::{AnalysisError, PolicyIoError};
use crate::host::Host;
use crate::policy::{HeuristicSearch, PolicyGenerator, PolicyTrie};
use crate::trend::Series;

pub struct Driver<'h, H: Host> {
    config: &'h Config,
    host: &'h mut H,
}

impl<'h, H: Host> Driver<'h, H> {
    pub fn new(config: &'h Config, host: &'h mut H) -> Self {
        Self { config, host }
    }

    /// Runs both phases to completion and returns the assembled `(n, WC(n))`
    /// series. Any host or policy-I/O failure aborts the whole pipeline —
    /// no partial series is ever returned.
    pub fn run(&mut self) -> Result<Series, AnalysisError> {
        let policy = self.phase_one()?;
        let series = self.phase_two(&policy)?;
        Ok(series)
    }

    fn phase_one(&mut self) -> Result<PolicyTrie, AnalysisError> {
        let policy_path = self.config.policy_file();

        if self.config.reuse_policy && policy_path.exists() {
            info!("reusing existing policy at {}", policy_path.display());
            let bytes = fs::read(&policy_path).map_err(PolicyIoError::from)?;
            return Ok(PolicyTrie::from_bytes(&bytes)?);
        }

        info!(
            "phase 1: exhaustive exploration at N0 = {}",
            self.config.policy.input_size
        );
        let mut generator = PolicyGenerator::new(self.config.policy.max_history);
        self.host
            .explore(self.config.policy.input_size, &mut generator)
            .map_err(|reason| AnalysisError::Host {
                phase: "policy generation",
                reason,
            })?;
        let policy = generator.finish();

        if let Some(parent) = policy_path.parent() {
            fs::create_dir_all(parent).map_err(PolicyIoError::from)?;
        }
        fs::write(&policy_path, policy.to_bytes()?).map_err(PolicyIoError::from)?;
        info!("wrote policy to {}", policy_path.display());

        Ok(policy)
    }

    fn phase_two(&mut self, policy: &PolicyTrie) -> Result<Series, AnalysisError> {
        info!(
            "phase 2: sweeping n in [0, {}]",
            self.config.input.max
        );
        let fallback = self.config.heuristic.fallback.into();
        let progress = crate::progress(self.config.input.max + 1);

        let mut points = Vec::new();
        for n in 0..=self.config.input.max {
            let mut search = HeuristicSearch::new(policy, self.config.policy.max_history, fallback);
            self.host
                .explore(n, &mut search)
                .map_err(|reason| AnalysisError::Host {
                    phase: "heuristic search",
                    reason,
                })?;
            if search.worst_history().is_some() {
                points.push((n, search.worst_cost()));
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        if points.is_empty() {
            warn!("phase 2 produced an empty series; trend fitting will be skipped");
        }

        Ok(Series::from(points))
    }
}
