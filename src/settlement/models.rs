use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{DEFAULT_FEE_BPS, MAX_FEE_BPS};
use crate::shared::AppError;

/// Ledger account that receives the platform rake
pub const PLATFORM_ACCOUNT: &str = "platform";

const BPS_DENOMINATOR: u128 = 10_000;

/// Pot split for one game: `net + fee == pot` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSettlement {
    pub pot: u64,
    pub fee: u64,
    pub net: u64,
}

impl StakeSettlement {
    /// `pot = stake * players`, `fee = round(pot * fee_bps / 10000)`, `net = pot - fee`.
    ///
    /// Rounding is half-up and happens once, on the fee.
    pub fn compute(stake: u64, players: usize, fee_bps: u32) -> Result<Self, AppError> {
        if fee_bps > MAX_FEE_BPS {
            return Err(AppError::BadRequest(format!(
                "Fee of {} bps exceeds the pot",
                fee_bps
            )));
        }
        let pot = pot(stake, players)?;
        let fee = (pot as u128 * fee_bps as u128 + BPS_DENOMINATOR / 2) / BPS_DENOMINATOR;
        // fee <= pot because fee_bps <= 10000
        let fee = fee as u64;

        Ok(Self {
            pot,
            fee,
            net: pot - fee,
        })
    }

    /// Zero-fee split used when stakes go back to the players
    pub fn refund(stake: u64, players: usize) -> Result<Self, AppError> {
        let pot = pot(stake, players)?;
        Ok(Self { pot, fee: 0, net: pot })
    }
}

/// Settlement at the default platform rake
pub fn compute_settlement(stake: u64, players: usize) -> Result<StakeSettlement, AppError> {
    StakeSettlement::compute(stake, players, DEFAULT_FEE_BPS)
}

fn pot(stake: u64, players: usize) -> Result<u64, AppError> {
    u64::try_from(players)
        .ok()
        .and_then(|players| stake.checked_mul(players))
        .ok_or(AppError::Overflow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutKind {
    Win,
    Fee,
    Refund,
}

/// One transfer out of the pot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEntry {
    pub account: String,
    pub amount: u64,
    pub kind: PayoutKind,
}

impl PayoutEntry {
    /// Winner takes `net`, the platform takes `fee`
    pub fn for_winner(winner_id: &str, settlement: &StakeSettlement) -> Vec<Self> {
        let mut entries = vec![Self {
            account: winner_id.to_string(),
            amount: settlement.net,
            kind: PayoutKind::Win,
        }];
        if settlement.fee > 0 {
            entries.push(Self {
                account: PLATFORM_ACCOUNT.to_string(),
                amount: settlement.fee,
                kind: PayoutKind::Fee,
            });
        }
        entries
    }

    /// Every participant gets their own stake back
    pub fn refunds(participants: &[String], stake: u64) -> Vec<Self> {
        participants
            .iter()
            .map(|player| Self {
                account: player.clone(),
                amount: stake,
                kind: PayoutKind::Refund,
            })
            .collect()
    }
}

/// Immutable record of a concluded (or voided) game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub id: String,
    /// `None` for a void game
    pub winner: Option<String>,
    /// Room players at settlement time
    pub participants: Vec<String>,
    /// Originating room
    pub table_id: Option<String>,
    pub game_id: String,
    pub stake_per_player: u64,
    pub settlement: StakeSettlement,
    pub payouts: Vec<PayoutEntry>,
    pub created_at: DateTime<Utc>,
}

impl GameResult {
    pub fn new(
        table_id: &str,
        game_id: &str,
        participants: Vec<String>,
        winner: Option<String>,
        stake_per_player: u64,
        settlement: StakeSettlement,
        payouts: Vec<PayoutEntry>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            winner,
            participants,
            table_id: Some(table_id.to_string()),
            game_id: game_id.to_string(),
            stake_per_player,
            settlement,
            payouts,
            created_at: Utc::now(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.winner.is_none()
    }

    pub fn total_paid(&self) -> u64 {
        self.payouts.iter().map(|p| p.amount).sum()
    }
}
