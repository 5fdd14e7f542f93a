//! Tests for match transition planning.

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{DonationDetails, DonationDraft};

struct Parties {
    donor: UserId,
    requester: UserId,
    donation: Donation,
}

impl Parties {
    fn with_donation_status(mut self, status: DonationStatus) -> Self {
        self.donation.status = status;
        self
    }

    fn request(&self, status: MatchStatus) -> Match {
        let mut request = Match::request(
            self.donation.id,
            self.requester.clone(),
            Some("I can collect on Saturday".to_owned()),
            Utc::now() - Duration::hours(1),
        );
        request.status = status;
        request
    }

    fn sibling(&self) -> Match {
        Match::request(self.donation.id, UserId::random(), None, Utc::now())
    }
}

#[fixture]
fn parties() -> Parties {
    let donor = UserId::random();
    let details = DonationDetails::try_from_draft(DonationDraft {
        title: "Bookshelf".to_owned(),
        description: "Pine bookshelf with five shelves.".to_owned(),
        category: "Furniture".to_owned(),
        ..DonationDraft::default()
    })
    .expect("valid details");
    Parties {
        donation: Donation::offer(donor.clone(), details, Utc::now()),
        donor,
        requester: UserId::random(),
    }
}

#[rstest]
fn donor_approval_reserves_and_rejects_pending_siblings(parties: Parties) {
    let request = parties.request(MatchStatus::Pending);
    let sibling = parties.sibling();
    let mut settled = parties.sibling();
    settled.status = MatchStatus::Cancelled;
    let now = Utc::now();

    let plan = plan_transition(
        request.clone(),
        &parties.donation,
        &parties.donor,
        StatusChange::to(MatchStatus::Approved),
        vec![request.clone(), sibling.clone(), settled],
        now,
    )
    .expect("approval allowed");

    assert_eq!(plan.updated.status, MatchStatus::Approved);
    assert_eq!(plan.updated.responded_at, Some(now));
    assert_eq!(plan.updated.updated_at, now);
    assert_eq!(plan.donation_status, Some(DonationStatus::Reserved));
    assert_eq!(plan.expected_status, MatchStatus::Pending);
    assert_eq!(plan.expected_donation_status, DonationStatus::Available);
    assert_eq!(plan.rejected.len(), 1);
    let rejected = plan.rejected.first().expect("one sibling rejected");
    assert_eq!(rejected.id, sibling.id);
    assert_eq!(rejected.status, MatchStatus::Rejected);
    assert_eq!(rejected.responded_at, Some(now));
}

#[rstest]
#[case(MatchStatus::Approved)]
#[case(MatchStatus::Rejected)]
fn requester_cannot_respond(parties: Parties, #[case] target: MatchStatus) {
    let err = plan_transition(
        parties.request(MatchStatus::Pending),
        &parties.donation,
        &parties.requester,
        StatusChange::to(target),
        Vec::new(),
        Utc::now(),
    )
    .expect_err("requester may not respond");
    assert_eq!(err, TransitionError::DonorOnly(target));
    assert!(err.is_forbidden());
}

#[rstest]
fn outsiders_are_forbidden(parties: Parties) {
    let err = plan_transition(
        parties.request(MatchStatus::Pending),
        &parties.donation,
        &UserId::random(),
        StatusChange::to(MatchStatus::Cancelled),
        Vec::new(),
        Utc::now(),
    )
    .expect_err("outsider");
    assert_eq!(err, TransitionError::NotAParticipant);
}

#[rstest]
fn pending_is_not_a_valid_target(parties: Parties) {
    let err = plan_transition(
        parties.request(MatchStatus::Approved),
        &parties.donation,
        &parties.donor,
        StatusChange::to(MatchStatus::Pending),
        Vec::new(),
        Utc::now(),
    )
    .expect_err("pending target");
    assert_eq!(err, TransitionError::UnsupportedTarget(MatchStatus::Pending));
    assert!(!err.is_forbidden());
}

#[rstest]
#[case(MatchStatus::Rejected, MatchStatus::Approved)]
#[case(MatchStatus::Completed, MatchStatus::Cancelled)]
#[case(MatchStatus::Cancelled, MatchStatus::Completed)]
#[case(MatchStatus::Cancelled, MatchStatus::InProgress)]
fn terminal_matches_are_frozen(
    parties: Parties,
    #[case] current: MatchStatus,
    #[case] target: MatchStatus,
) {
    let err = plan_transition(
        parties.request(current),
        &parties.donation,
        &parties.donor,
        StatusChange::to(target),
        Vec::new(),
        Utc::now(),
    )
    .expect_err("terminal match");
    assert_eq!(err, TransitionError::Terminal(current));
}

#[rstest]
#[case(MatchStatus::Pending, MatchStatus::InProgress)]
#[case(MatchStatus::InProgress, MatchStatus::Approved)]
#[case(MatchStatus::Approved, MatchStatus::Rejected)]
fn out_of_order_transitions_are_refused(
    parties: Parties,
    #[case] from: MatchStatus,
    #[case] to: MatchStatus,
) {
    let parties = parties.with_donation_status(DonationStatus::Reserved);
    let err = plan_transition(
        parties.request(from),
        &parties.donation,
        &parties.donor,
        StatusChange::to(to),
        Vec::new(),
        Utc::now(),
    )
    .expect_err("invalid transition");
    assert_eq!(err, TransitionError::InvalidTransition { from, to });
}

#[rstest]
#[case(DonationStatus::Reserved)]
#[case(DonationStatus::Completed)]
#[case(DonationStatus::Cancelled)]
fn approval_requires_available_donation(parties: Parties, #[case] status: DonationStatus) {
    let parties = parties.with_donation_status(status);
    let err = plan_transition(
        parties.request(MatchStatus::Pending),
        &parties.donation,
        &parties.donor,
        StatusChange::to(MatchStatus::Approved),
        Vec::new(),
        Utc::now(),
    )
    .expect_err("donation not available");
    assert_eq!(err, TransitionError::DonationUnavailable(status));
}

#[rstest]
fn reasserting_approval_keeps_reservation_and_response_time(parties: Parties) {
    let parties = parties.with_donation_status(DonationStatus::Reserved);
    let mut request = parties.request(MatchStatus::Approved);
    let responded = Utc::now() - Duration::minutes(30);
    request.responded_at = Some(responded);

    let plan = plan_transition(
        request,
        &parties.donation,
        &parties.donor,
        StatusChange::to(MatchStatus::Approved),
        Vec::new(),
        Utc::now(),
    )
    .expect("re-approval allowed");
    assert_eq!(plan.donation_status, None);
    assert_eq!(plan.updated.responded_at, Some(responded));
}

#[rstest]
fn cancelling_approved_match_releases_donation(parties: Parties) {
    let parties = parties.with_donation_status(DonationStatus::Reserved);
    let plan = plan_transition(
        parties.request(MatchStatus::Approved),
        &parties.donation,
        &parties.requester,
        StatusChange::to(MatchStatus::Cancelled),
        Vec::new(),
        Utc::now(),
    )
    .expect("cancel allowed");
    assert_eq!(plan.updated.status, MatchStatus::Cancelled);
    assert_eq!(plan.donation_status, Some(DonationStatus::Available));
    assert!(plan.rejected.is_empty());
}

#[rstest]
fn cancelling_pending_match_leaves_donation_alone(parties: Parties) {
    let plan = plan_transition(
        parties.request(MatchStatus::Pending),
        &parties.donation,
        &parties.requester,
        StatusChange::to(MatchStatus::Cancelled),
        Vec::new(),
        Utc::now(),
    )
    .expect("cancel allowed");
    assert_eq!(plan.donation_status, None);
}

#[rstest]
fn completion_completes_donation(
    parties: Parties,
    #[values(MatchStatus::Pending, MatchStatus::Approved, MatchStatus::InProgress)]
    from: MatchStatus,
    #[values(DonationStatus::Reserved, DonationStatus::Available)] donation_status: DonationStatus,
) {
    let parties = parties.with_donation_status(donation_status);
    let now = Utc::now();
    let plan = plan_transition(
        parties.request(from),
        &parties.donation,
        &parties.requester,
        StatusChange::to(MatchStatus::Completed),
        Vec::new(),
        now,
    )
    .expect("completion allowed");
    assert_eq!(plan.updated.completed_at, Some(now));
    assert_eq!(plan.donation_status, Some(DonationStatus::Completed));
    assert_eq!(plan.expected_donation_status, donation_status);
}

#[rstest]
#[case::requester(true)]
#[case::donor(false)]
fn rating_lands_on_the_acting_party(parties: Parties, #[case] by_requester: bool) {
    let actor = if by_requester {
        parties.requester.clone()
    } else {
        parties.donor.clone()
    };
    let rating = Rating::new(4).expect("valid rating");
    let change = StatusChange {
        rating: Some(rating),
        ..StatusChange::to(MatchStatus::Completed)
    };

    let plan = plan_transition(
        parties.request(MatchStatus::InProgress),
        &parties.donation,
        &actor,
        change,
        Vec::new(),
        Utc::now(),
    )
    .expect("completion allowed");

    if by_requester {
        assert_eq!(plan.updated.requester_rating, Some(rating));
        assert_eq!(plan.updated.donor_rating, None);
    } else {
        assert_eq!(plan.updated.donor_rating, Some(rating));
        assert_eq!(plan.updated.requester_rating, None);
    }
}

#[rstest]
fn absent_fields_preserve_stored_values(parties: Parties) {
    let parties = parties.with_donation_status(DonationStatus::Reserved);
    let mut request = parties.request(MatchStatus::Approved);
    request.pickup_notes = Some("Ring the side door".to_owned());
    let pickup = Utc::now() + Duration::days(2);

    let plan = plan_transition(
        request,
        &parties.donation,
        &parties.donor,
        StatusChange {
            pickup_date: Some(pickup),
            donor_notes: Some("Bring a van".to_owned()),
            ..StatusChange::to(MatchStatus::InProgress)
        },
        Vec::new(),
        Utc::now(),
    )
    .expect("progress allowed");

    assert_eq!(plan.updated.pickup_date, Some(pickup));
    assert_eq!(plan.updated.pickup_notes.as_deref(), Some("Ring the side door"));
    assert_eq!(plan.updated.donor_notes.as_deref(), Some("Bring a van"));
    assert_eq!(plan.updated.message.as_deref(), Some("I can collect on Saturday"));
}

#[rstest]
fn non_approval_targets_ignore_siblings(parties: Parties) {
    let sibling = parties.sibling();
    let plan = plan_transition(
        parties.request(MatchStatus::Pending),
        &parties.donation,
        &parties.donor,
        StatusChange::to(MatchStatus::Rejected),
        vec![sibling],
        Utc::now(),
    )
    .expect("rejection allowed");
    assert!(plan.rejected.is_empty());
    assert_eq!(plan.donation_status, None);
    assert!(plan.updated.responded_at.is_some());
}
