//! Lifecycle transition tables. The store rejects anything not listed here,
//! so a caller cannot push a record into an arbitrary status.

use crate::models::{ApplicationStatus, JobStatus};

/// draft -> active (publish), active -> closed (close), closed -> active (reopen).
pub fn job_transition_allowed(from: JobStatus, to: JobStatus) -> bool {
    use JobStatus::*;
    matches!((from, to), (Draft, Active) | (Active, Closed) | (Closed, Active))
}

/// The transitions the original review flow offers, including the
/// rejected -> pending restore. Accepted is terminal.
pub fn application_transition_allowed(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    use ApplicationStatus::*;
    matches!(
        (from, to),
        (Pending, Reviewing)
            | (Pending, Shortlisted)
            | (Reviewing, Shortlisted)
            | (Reviewing, Rejected)
            | (Shortlisted, Accepted)
            | (Shortlisted, Rejected)
            | (Rejected, Pending)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationStatus::*, JobStatus};

    #[test]
    fn job_lifecycle() {
        assert!(job_transition_allowed(JobStatus::Draft, JobStatus::Active));
        assert!(job_transition_allowed(JobStatus::Active, JobStatus::Closed));
        assert!(job_transition_allowed(JobStatus::Closed, JobStatus::Active));

        assert!(!job_transition_allowed(JobStatus::Draft, JobStatus::Closed));
        assert!(!job_transition_allowed(JobStatus::Active, JobStatus::Draft));
        assert!(!job_transition_allowed(JobStatus::Active, JobStatus::Active));
    }

    #[test]
    fn application_review_flow() {
        assert!(application_transition_allowed(Pending, Reviewing));
        assert!(application_transition_allowed(Pending, Shortlisted));
        assert!(application_transition_allowed(Reviewing, Shortlisted));
        assert!(application_transition_allowed(Reviewing, Rejected));
        assert!(application_transition_allowed(Shortlisted, Accepted));
        assert!(application_transition_allowed(Shortlisted, Rejected));
        assert!(application_transition_allowed(Rejected, Pending));
    }

    #[test]
    fn accepted_is_terminal() {
        for to in [Pending, Reviewing, Shortlisted, Rejected] {
            assert!(!application_transition_allowed(Accepted, to));
        }
    }

    #[test]
    fn no_self_transitions() {
        for s in [Pending, Reviewing, Shortlisted, Rejected, Accepted] {
            assert!(!application_transition_allowed(s, s));
        }
    }

    #[test]
    fn pending_cannot_jump_to_accepted() {
        assert!(!application_transition_allowed(Pending, Accepted));
        assert!(!application_transition_allowed(Reviewing, Accepted));
    }
}
