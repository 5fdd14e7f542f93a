//! Behaviour tests for the match status workflow.
//!
//! Scenarios drive the domain services over the in-memory store and check
//! the donation side effects of each transition.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use donations::domain::ports::{RequestDonationRequest, UpdateMatchStatusRequest};
use donations::domain::{
    DonationDraft, DonationId, Error, MatchId, MatchStatus, StatusChange, UserId,
};
use donations::inbound::http::state::HttpState;
use donations::outbound::memory::InMemoryStore;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

const DONOR: &str = "the donor";

struct WorkflowWorld {
    runtime: Runtime,
    state: HttpState,
    donor: UserId,
    users: RefCell<HashMap<String, UserId>>,
    donation: RefCell<Option<DonationId>>,
    requests: RefCell<HashMap<String, MatchId>>,
    last_error: RefCell<Option<Error>>,
}

impl WorkflowWorld {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            runtime: Runtime::new().expect("create runtime"),
            state: HttpState::from_repositories(
                store.clone(),
                store.clone(),
                store,
                Arc::new(DefaultClock),
            ),
            donor: UserId::random(),
            users: RefCell::new(HashMap::new()),
            donation: RefCell::new(None),
            requests: RefCell::new(HashMap::new()),
            last_error: RefCell::new(None),
        }
    }

    fn user(&self, name: &str) -> UserId {
        if name == DONOR {
            return self.donor.clone();
        }
        self.users
            .borrow_mut()
            .entry(name.to_owned())
            .or_insert_with(UserId::random)
            .clone()
    }

    fn donation_id(&self) -> DonationId {
        self.donation.borrow().expect("donation should be offered")
    }

    fn request_id(&self, name: &str) -> MatchId {
        *self
            .requests
            .borrow()
            .get(name)
            .expect("request should exist for user")
    }

    fn offer_donation(&self) {
        let draft = DonationDraft {
            title: "Kitchen table".to_owned(),
            description: "Solid oak table that seats four people.".to_owned(),
            category: "Furniture".to_owned(),
            city: Some("Portland".to_owned()),
            ..DonationDraft::default()
        };
        let donation = self
            .runtime
            .block_on(self.state.donations.create(&self.donor, draft))
            .expect("donation created");
        *self.donation.borrow_mut() = Some(donation.id);
    }

    fn request(&self, name: &str) -> Result<MatchId, Error> {
        let request = RequestDonationRequest {
            donation_id: self.donation_id(),
            requester_id: self.user(name),
            message: None,
        };
        self.runtime
            .block_on(self.state.matches.request_donation(request))
            .map(|record| record.request.id)
    }

    fn record_outcome<T>(&self, outcome: Result<T, Error>) {
        *self.last_error.borrow_mut() = outcome.err();
    }

    fn move_request(&self, owner: &str, actor: &str, status: &str) {
        let status: MatchStatus = status.parse().expect("known match status");
        let request = UpdateMatchStatusRequest {
            match_id: self.request_id(owner),
            actor_id: self.user(actor),
            change: StatusChange::to(status),
        };
        let outcome = self
            .runtime
            .block_on(self.state.matches.update_status(request));
        self.record_outcome(outcome);
    }

    fn status_of(&self, name: &str) -> MatchStatus {
        let id = self.request_id(name);
        let records = self
            .runtime
            .block_on(self.state.matches_query.list_for_donation(&self.donation_id()))
            .expect("list requests");
        records
            .into_iter()
            .find(|record| record.request.id == id)
            .map(|record| record.request.status)
            .expect("request listed for donation")
    }

    fn last_error(&self) -> Error {
        self.last_error
            .borrow()
            .clone()
            .expect("last action should have failed")
    }
}

#[fixture]
fn world() -> WorkflowWorld {
    WorkflowWorld::new()
}

#[given("an available donation offered by the donor")]
fn an_available_donation(world: &WorkflowWorld) {
    world.offer_donation();
}

#[given("a pending request from {name}")]
fn a_pending_request_from(world: &WorkflowWorld, name: String) {
    let id = world.request(&name).expect("request accepted");
    world.requests.borrow_mut().insert(name, id);
}

#[when("{actor} requests the donation")]
fn actor_requests_the_donation(world: &WorkflowWorld, actor: String) {
    let outcome = world.request(&actor);
    world.record_outcome(outcome);
}

#[when("the donor moves the request from {name} to {status}")]
fn the_donor_moves_the_request(world: &WorkflowWorld, name: String, status: String) {
    world.move_request(&name, DONOR, &status);
}

#[when("{name} moves their request to {status}")]
fn the_requester_moves_their_request(world: &WorkflowWorld, name: String, status: String) {
    world.move_request(&name, &name, &status);
}

#[then("the donation status is {status}")]
fn the_donation_status_is(world: &WorkflowWorld, status: String) {
    let donation = world
        .runtime
        .block_on(world.state.donations_query.get(&world.donation_id()))
        .expect("donation exists");
    assert_eq!(donation.status.as_str(), status);
}

#[then("the request from {name} has status {status}")]
fn the_request_has_status(world: &WorkflowWorld, name: String, status: String) {
    assert_eq!(world.status_of(&name).as_str(), status);
}

#[then("the last action fails with forbidden")]
fn the_last_action_is_forbidden(world: &WorkflowWorld) {
    let error = world.last_error();
    assert_eq!(
        serde_json::to_value(error.code()).expect("serialise code"),
        "forbidden"
    );
}

#[then("the last action fails with conflict code {code}")]
fn the_last_action_conflicts(world: &WorkflowWorld, code: String) {
    let error = world.last_error();
    assert_eq!(
        serde_json::to_value(error.code()).expect("serialise code"),
        "conflict"
    );
    let detail = error
        .details()
        .and_then(|details| details.get("code"))
        .and_then(serde_json::Value::as_str);
    assert_eq!(detail, Some(code.as_str()));
}

#[scenario(path = "tests/features/match_workflow.feature")]
fn match_workflow_scenarios(world: WorkflowWorld) {
    drop(world);
}
