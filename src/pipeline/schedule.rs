// src/pipeline/schedule.rs

//! Daily trigger loop.

use std::future::Future;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::Result;
use crate::pipeline::RunResult;

/// Next local wall-clock occurrence of `at` strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        (now.date() + TimeDelta::days(1)).and_time(at)
    }
}

/// Invoke `job` every day at `at` (local time) until Ctrl-C.
///
/// Each invocation receives the local date at the moment it starts. A failed
/// run is logged and the loop keeps going.
pub async fn run_scheduled<F, Fut>(at: NaiveTime, run_on_start: bool, mut job: F) -> Result<()>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<RunResult>>,
{
    log::info!("Scheduler started, daily run at {}", at.format("%H:%M"));

    if run_on_start {
        log::info!("Running initial scan...");
        run_logged(&mut job).await;
    }

    loop {
        let now = Local::now().naive_local();
        let next = next_run_after(now, at);
        let wait = (next - now).to_std().unwrap_or_default();
        log::info!("Next run at {}", next.format("%Y-%m-%d %H:%M"));

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Scheduler stopped");
                return Ok(());
            }
        }

        run_logged(&mut job).await;
    }
}

async fn run_logged<F, Fut>(job: &mut F)
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<RunResult>>,
{
    let as_of = Local::now().date_naive();
    log::info!("Running scheduled job for {}", as_of);
    match job(as_of).await {
        Ok(result) => log::info!(
            "Scheduled run done: {} new of {} postings",
            result.new_count,
            result.total_count
        ),
        Err(error) => log::error!("Scheduled run failed: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_time(at(h, m))
    }

    #[test]
    fn test_next_run_later_today() {
        assert_eq!(next_run_after(dt(18, 6, 30), at(8, 0)), dt(18, 8, 0));
    }

    #[test]
    fn test_next_run_tomorrow_when_passed() {
        assert_eq!(next_run_after(dt(18, 9, 15), at(8, 0)), dt(19, 8, 0));
    }

    #[test]
    fn test_next_run_exact_time_moves_to_tomorrow() {
        assert_eq!(next_run_after(dt(18, 8, 0), at(8, 0)), dt(19, 8, 0));
    }

    #[test]
    fn test_next_run_crosses_month() {
        assert_eq!(next_run_after(dt(31, 23, 0), at(8, 0)).date().to_string(), "2026-11-01");
    }
}
