// src/tasks/sanction_sweep.rs

use tracing::info;

use crate::models::SanctionKind;
use crate::repositories::ModerationRepository;
use crate::Error;

/// Rows deactivated by one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub mutes: u64,
    pub bans: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.mutes + self.bans
    }
}

pub async fn sweep_expired_mutes<R: ModerationRepository + ?Sized>(repo: &R) -> Result<u64, Error> {
    repo.sweep_expired(SanctionKind::Mute).await
}

pub async fn sweep_expired_bans<R: ModerationRepository + ?Sized>(repo: &R) -> Result<u64, Error> {
    repo.sweep_expired(SanctionKind::Ban).await
}

/// Deactivates every lapsed mute, then every lapsed ban.
///
/// Safe to call on any cadence, including overlapping runs: a row that is
/// already inactive is never touched again. Scheduling is left to the caller.
pub async fn run_sanction_sweep<R: ModerationRepository + ?Sized>(repo: &R) -> Result<SweepReport, Error> {
    let report = SweepReport {
        mutes: sweep_expired_mutes(repo).await?,
        bans: sweep_expired_bans(repo).await?,
    };
    info!("Sanction sweep complete: {} mute(s), {} ban(s) deactivated", report.mutes, report.bans);
    Ok(report)
}
