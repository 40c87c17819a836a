//! Wager escrow and payout flows.
//!
//! Amounts are integers scaled by 1000 (fixed-point-3); no floats anywhere.
//! Funds move through the host's custody primitives: `draw` escrows from
//! the current sender, `transfer` pays out of custody. Every flow here runs
//! only after the calling entry point has passed all validations.

use crate::codec;
use crate::error::{EngineError, Result};
use crate::host::{Asset, HostEnv, Intent};
use crate::store::{GameState, Meta};
use tracing::{debug, instrument};

/// A parsed `transfer.allow` intent: the token and the maximum amount the
/// sender authorized, scaled by 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAllow {
    /// Authorized token.
    pub token: Asset,
    /// Authorized amount, fixed-point-3 units.
    pub limit: u64,
}

/// Scans the call's intents for the first `transfer.allow` and parses it.
/// Unknown tokens and unparseable limits abort; absence is `None`.
pub fn first_transfer_allow(intents: &[Intent]) -> Result<Option<TransferAllow>> {
    for intent in intents {
        if intent.intent_type != "transfer.allow" {
            continue;
        }
        let token = intent
            .args
            .get("token")
            .ok_or(EngineError::InvalidIntentToken)?;
        let token = Asset::from_symbol(token)?;
        let limit = intent
            .args
            .get("limit")
            .ok_or(EngineError::InvalidIntentLimit)?;
        let limit =
            codec::parse_fixed_point3(limit).map_err(|_| EngineError::InvalidIntentLimit)?;
        return Ok(Some(TransferAllow { token, limit }));
    }
    Ok(None)
}

/// Escrows the creator's optional wager. When a `transfer.allow` intent is
/// present, its limit becomes the game's bet and is drawn immediately.
#[instrument(skip(host, meta))]
pub fn escrow_on_create<H: HostEnv>(host: &mut H, meta: &mut Meta) -> Result<()> {
    if let Some(allow) = first_transfer_allow(&host.intents())? {
        debug!(token = %allow.token, amount = allow.limit, "escrowing creator bet");
        host.draw(allow.limit, allow.token);
        meta.set_wager(allow.token, allow.limit);
    }
    Ok(())
}

/// Settles the joiner's side of the wager and assigns roles.
///
/// Without a wager the roles default to creator-as-X. With one, the joiner
/// must authorize at least the base bet in the game's asset; authorizing
/// `bet + first_move_cost` buys the first move, which pays the fee to the
/// creator and flips the roles. Returns whether the purchase happened.
#[instrument(skip(host, meta, state))]
pub fn settle_join<H: HostEnv>(
    host: &mut H,
    meta: &Meta,
    state: &mut GameState,
    joiner: &str,
) -> Result<bool> {
    if !meta.has_wager() {
        state.assign_roles(meta.creator().clone(), joiner.to_string());
        return Ok(false);
    }

    // has_wager guarantees both are present
    let asset = (*meta.asset()).ok_or(EngineError::StateMissing)?;
    let bet = (*meta.bet()).ok_or(EngineError::StateMissing)?;
    let fmc = (*meta.first_move_cost()).unwrap_or(0);

    let allow = first_transfer_allow(&host.intents())?.ok_or(EngineError::IntentMissing)?;
    if allow.token != asset {
        return Err(EngineError::WrongBetToken);
    }
    if allow.limit < bet {
        return Err(EngineError::MustCoverBaseBet);
    }

    if fmc > 0 && allow.limit >= bet + fmc {
        debug!(bet, fmc, "first-move purchase");
        host.draw(bet + fmc, asset);
        host.transfer(meta.creator(), fmc, asset);
        state.assign_roles(joiner.to_string(), meta.creator().clone());
        Ok(true)
    } else {
        host.draw(bet, asset);
        state.assign_roles(meta.creator().clone(), joiner.to_string());
        Ok(false)
    }
}

/// Pays the full pot to `to`: the bet itself before an opponent joined,
/// twice the bet afterwards.
#[instrument(skip(host, meta))]
pub fn transfer_pot<H: HostEnv>(host: &mut H, meta: &Meta, to: &str) {
    if let (Some(asset), Some(bet)) = (*meta.asset(), *meta.bet()) {
        if bet == 0 {
            return;
        }
        let pot = if meta.opponent().is_some() { bet * 2 } else { bet };
        host.transfer(to, pot, asset);
    }
}

/// Returns each player their own stake on a draw.
#[instrument(skip(host, meta, state))]
pub fn split_pot<H: HostEnv>(host: &mut H, meta: &Meta, state: &GameState) {
    if let (Some(asset), Some(bet)) = (*meta.asset(), *meta.bet()) {
        if bet == 0 {
            return;
        }
        if let Some(player_o) = state.player_o() {
            host.transfer(state.player_x(), bet, asset);
            host.transfer(player_o, bet, asset);
        }
    }
}
