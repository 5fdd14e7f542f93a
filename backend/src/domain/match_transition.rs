//! Pure planning of match status transitions.
//!
//! [`plan_transition`] decides whether an actor may move a match to a new
//! status and computes every write that must follow: the updated match, the
//! donation's new status, and the competing requests rejected by an approval.
//! It performs no I/O; the workflow service commits the plan atomically.

use chrono::{DateTime, Utc};

use super::{Donation, DonationStatus, Match, MatchStatus, Rating, UserId};

/// Role of the actor relative to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Donor,
    Requester,
}

impl Party {
    /// Resolve the actor's role, or `None` for outsiders.
    pub fn of(actor: &UserId, request: &Match, donation: &Donation) -> Option<Self> {
        if donation.is_owned_by(actor) {
            Some(Self::Donor)
        } else if &request.requester_id == actor {
            Some(Self::Requester)
        } else {
            None
        }
    }
}

/// Requested status plus the auxiliary fields to merge.
///
/// Absent fields leave the stored values untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: MatchStatus,
    pub pickup_date: Option<DateTime<Utc>>,
    pub pickup_notes: Option<String>,
    pub donor_notes: Option<String>,
    pub rating: Option<Rating>,
}

impl StatusChange {
    /// A bare status change without auxiliary fields.
    pub fn to(status: MatchStatus) -> Self {
        Self {
            status,
            pickup_date: None,
            pickup_notes: None,
            donor_notes: None,
            rating: None,
        }
    }
}

/// Writes produced by an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// The match after the change.
    pub updated: Match,
    /// New donation status, when the transition changes it.
    pub donation_status: Option<DonationStatus>,
    /// Competing PENDING requests rejected by an approval.
    pub rejected: Vec<Match>,
    /// Status the stored match must still hold when the plan is committed.
    pub expected_status: MatchStatus,
    /// Status the stored donation must still hold when the plan is committed.
    pub expected_donation_status: DonationStatus,
}

/// Reasons a transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("status {0} cannot be set by an update")]
    UnsupportedTarget(MatchStatus),
    #[error("only the donor or the requester may update this match")]
    NotAParticipant,
    #[error("only the donor may set status {0}")]
    DonorOnly(MatchStatus),
    #[error("match is {0} and can no longer change")]
    Terminal(MatchStatus),
    #[error("match cannot move from {from} to {to}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },
    #[error("donation is {0} and cannot be reserved")]
    DonationUnavailable(DonationStatus),
}

impl TransitionError {
    /// Whether the refusal is an authorisation failure rather than a state
    /// conflict or bad input.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::NotAParticipant | Self::DonorOnly(_))
    }
}

fn authorise(
    target: MatchStatus,
    party: Option<Party>,
) -> Result<Party, TransitionError> {
    if target == MatchStatus::Pending {
        return Err(TransitionError::UnsupportedTarget(target));
    }
    let party = party.ok_or(TransitionError::NotAParticipant)?;
    let donor_only = matches!(target, MatchStatus::Approved | MatchStatus::Rejected);
    if donor_only && party != Party::Donor {
        return Err(TransitionError::DonorOnly(target));
    }
    Ok(party)
}

fn check_lifecycle(
    request: &Match,
    donation: &Donation,
    target: MatchStatus,
) -> Result<(), TransitionError> {
    use MatchStatus::{Approved, Cancelled, Completed, InProgress, Pending, Rejected};

    let from = request.status;
    if from.is_terminal() {
        return Err(TransitionError::Terminal(from));
    }

    let allowed = match target {
        Approved => matches!(from, Pending | Approved),
        Rejected => from == Pending,
        InProgress => matches!(from, Approved | InProgress),
        Completed | Cancelled => true,
        Pending => false,
    };
    if !allowed {
        return Err(TransitionError::InvalidTransition { from, to: target });
    }

    if target == Approved {
        let reservable = match from {
            Approved => donation.status == DonationStatus::Reserved,
            _ => donation.status == DonationStatus::Available,
        };
        if !reservable {
            return Err(TransitionError::DonationUnavailable(donation.status));
        }
    }
    Ok(())
}

fn donation_effect(target: MatchStatus, donation: &Donation) -> Option<DonationStatus> {
    let next = match target {
        MatchStatus::Approved => Some(DonationStatus::Reserved),
        MatchStatus::Completed => Some(DonationStatus::Completed),
        MatchStatus::Cancelled if donation.status == DonationStatus::Reserved => {
            Some(DonationStatus::Available)
        }
        _ => None,
    };
    next.filter(|status| *status != donation.status)
}

fn apply_change(mut request: Match, change: StatusChange, party: Party, now: DateTime<Utc>) -> Match {
    let StatusChange {
        status,
        pickup_date,
        pickup_notes,
        donor_notes,
        rating,
    } = change;

    request.status = status;
    if let Some(date) = pickup_date {
        request.pickup_date = Some(date);
    }
    if let Some(notes) = pickup_notes {
        request.pickup_notes = Some(notes);
    }
    if let Some(notes) = donor_notes {
        request.donor_notes = Some(notes);
    }
    if let Some(score) = rating {
        match party {
            Party::Requester => request.requester_rating = Some(score),
            Party::Donor => request.donor_rating = Some(score),
        }
    }

    if matches!(status, MatchStatus::Approved | MatchStatus::Rejected) {
        request.responded_at.get_or_insert(now);
    }
    if status == MatchStatus::Completed {
        request.completed_at.get_or_insert(now);
    }
    request.updated_at = now;
    request
}

/// Plan a status change requested by `actor`.
///
/// `pending_siblings` lists the PENDING requests on the same donation; it is
/// consulted only when the target is APPROVED. Entries matching the updated
/// match or not PENDING are ignored.
///
/// # Errors
/// Returns a [`TransitionError`] describing why the change is refused.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use donations::domain::{
///     Donation, DonationDetails, DonationDraft, DonationStatus, Match, MatchStatus,
///     StatusChange, UserId, plan_transition,
/// };
///
/// let donor = UserId::random();
/// let details = DonationDetails::try_from_draft(DonationDraft {
///     title: "Garden tools".into(),
///     description: "Rake, spade, and a pair of gloves.".into(),
///     category: "Garden".into(),
///     ..DonationDraft::default()
/// })
/// .unwrap();
/// let donation = Donation::offer(donor.clone(), details, Utc::now());
/// let request = Match::request(donation.id, UserId::random(), None, Utc::now());
///
/// let plan = plan_transition(
///     request,
///     &donation,
///     &donor,
///     StatusChange::to(MatchStatus::Approved),
///     Vec::new(),
///     Utc::now(),
/// )
/// .unwrap();
/// assert_eq!(plan.donation_status, Some(DonationStatus::Reserved));
/// ```
pub fn plan_transition(
    request: Match,
    donation: &Donation,
    actor: &UserId,
    change: StatusChange,
    pending_siblings: Vec<Match>,
    now: DateTime<Utc>,
) -> Result<TransitionPlan, TransitionError> {
    let target = change.status;
    let expected_status = request.status;
    let party = authorise(target, Party::of(actor, &request, donation))?;
    check_lifecycle(&request, donation, target)?;

    let rejected = if target == MatchStatus::Approved {
        pending_siblings
            .into_iter()
            .filter(|sibling| sibling.id != request.id && sibling.status == MatchStatus::Pending)
            .map(|sibling| sibling.rejected_by_approval(now))
            .collect()
    } else {
        Vec::new()
    };

    Ok(TransitionPlan {
        donation_status: donation_effect(target, donation),
        updated: apply_change(request, change, party, now),
        rejected,
        expected_status,
        expected_donation_status: donation.status,
    })
}

#[cfg(test)]
#[path = "match_transition_tests.rs"]
mod tests;
