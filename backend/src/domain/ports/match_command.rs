//! Driving port for the match workflow mutations.
//!
//! The acting user is always passed explicitly; inbound adapters resolve it
//! from their own authentication mechanism.

use async_trait::async_trait;

use crate::domain::{DonationId, Error, MatchId, MatchRecord, StatusChange, UserId};

/// Request a donation on behalf of `requester_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDonationRequest {
    pub donation_id: DonationId,
    pub requester_id: UserId,
    /// Already trimmed and bounded message.
    pub message: Option<String>,
}

/// Move a match to a new status on behalf of `actor_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMatchStatusRequest {
    pub match_id: MatchId,
    pub actor_id: UserId,
    pub change: StatusChange,
}

/// Driving port for creating requests and driving their lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchCommand: Send + Sync {
    /// Open a PENDING request against an AVAILABLE donation.
    async fn request_donation(&self, request: RequestDonationRequest)
    -> Result<MatchRecord, Error>;

    /// Apply a status transition and its donation side effects.
    async fn update_status(&self, request: UpdateMatchStatusRequest) -> Result<MatchRecord, Error>;
}
