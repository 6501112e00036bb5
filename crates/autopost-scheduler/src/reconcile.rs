use autopost_core::{
    types::{column, format_date},
    Job, Mode,
};
use autopost_store::Mutation;
use chrono::NaiveDate;
use tracing::warn;

/// Where a due job goes after its publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `once` job published; its row is removed.
    Completed,
    /// `daily` job published; it waits for `next_date`.
    Rescheduled { next_date: NaiveDate },
    /// Publish failed; the row stays as it is and is tried again next cycle.
    RetryPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub transition: Transition,
    /// Store change to record in the cycle's plan, if any.
    pub mutation: Option<Mutation>,
}

/// Map a job's mode and publish outcome to its next state.
pub fn reconcile(job: &Job, succeeded: bool) -> Reconciliation {
    if !succeeded {
        return retry();
    }
    match job.mode {
        Mode::Once => Reconciliation {
            transition: Transition::Completed,
            mutation: Some(Mutation::Delete { id: job.id.clone() }),
        },
        Mode::Daily => match job.next_date() {
            Some(next_date) => Reconciliation {
                transition: Transition::Rescheduled { next_date },
                mutation: Some(Mutation::SetCell {
                    id: job.id.clone(),
                    column: column::DATE,
                    value: format_date(next_date),
                }),
            },
            None => {
                warn!(job_id = %job.id, "next date out of calendar range, row left unchanged");
                retry()
            }
        },
    }
}

fn retry() -> Reconciliation {
    Reconciliation {
        transition: Transition::RetryPending,
        mutation: None,
    }
}

#[cfg(test)]
mod tests {
    use autopost_core::{types::SCHEDULE_FORMAT, JobId};
    use chrono::NaiveDateTime;

    use super::*;

    fn job(mode: Mode, at: &str) -> Job {
        Job {
            id: JobId::fingerprint(&[at.to_string()], 0),
            product: "ProductA".into(),
            keywords: String::new(),
            platform: "facebook".into(),
            scheduled_at: NaiveDateTime::parse_from_str(at, SCHEDULE_FORMAT).unwrap(),
            token: None,
            account_id: None,
            mode,
            caption: "Hello".into(),
            image: None,
        }
    }

    #[test]
    fn once_success_deletes() {
        let j = job(Mode::Once, "2024-01-01 09:00");
        let r = reconcile(&j, true);
        assert_eq!(r.transition, Transition::Completed);
        assert_eq!(r.mutation, Some(Mutation::Delete { id: j.id.clone() }));
    }

    #[test]
    fn daily_success_advances_scheduled_date() {
        let j = job(Mode::Daily, "2024-02-28 23:30");
        let r = reconcile(&j, true);
        let next = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(r.transition, Transition::Rescheduled { next_date: next });
        assert_eq!(
            r.mutation,
            Some(Mutation::SetCell {
                id: j.id.clone(),
                column: 7,
                value: "2024-02-29".into(),
            })
        );
    }

    #[test]
    fn failures_never_mutate() {
        for mode in [Mode::Once, Mode::Daily] {
            let r = reconcile(&job(mode, "2024-01-01 09:00"), false);
            assert_eq!(r.transition, Transition::RetryPending);
            assert!(r.mutation.is_none());
        }
    }
}
