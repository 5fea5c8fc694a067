use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a payout authorizer gets to see before funds move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub room_id: String,
    pub winner_id: String,
    pub net: u64,
}

/// Seam for wallet-signature checks or any other sign-off on a winning payout.
///
/// Returning `Err(reason)` aborts settlement and leaves the room untouched.
#[async_trait]
pub trait PayoutAuthorizer {
    async fn authorize(&self, request: &PayoutRequest) -> Result<(), String>;
}

/// Authorizer that signs off on everything
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproveAll;

#[async_trait]
impl PayoutAuthorizer for ApproveAll {
    async fn authorize(&self, _request: &PayoutRequest) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_approve_all() {
        let request = PayoutRequest {
            room_id: "room".into(),
            winner_id: "alice".into(),
            net: 360,
        };
        assert!(ApproveAll.authorize(&request).await.is_ok());
    }
}
