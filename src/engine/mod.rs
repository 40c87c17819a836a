//! Entry points.
//!
//! `GameEngine` wires the boundary ABI to the domain modules: it parses the
//! pipe-delimited payloads, enforces the lifecycle and permission
//! preconditions, reconstructs boards from the move log, and commits
//! results through the store, the economy and the event log. Each method is
//! one atomic host call; returning an error aborts it.

pub mod events;

use crate::codec::{self, time};
use crate::economy;
use crate::error::{EngineError, Result};
use crate::games::{rules, Cell, GameKind, Grid, Placement, Player};
use crate::host::HostEnv;
use crate::opening::{Phase, SwapChoice, Swap2State};
use crate::store::{self, GameState, GameStatus, Meta, MoveRecord};
use tracing::{info, instrument};

/// Inactivity window after which the waiting player may claim the game.
pub const GAME_TIMEOUT_SECS: u64 = 7 * 24 * 3600;

/// The deterministic core behind the boundary ABI.
///
/// Holds a mutable borrow of the host for the duration of one call; the
/// host serializes calls, so there is never more than one engine alive.
#[derive(Debug)]
pub struct GameEngine<'h, H: HostEnv> {
    host: &'h mut H,
}

impl<'h, H: HostEnv> GameEngine<'h, H> {
    /// Wraps the host for one entry-point call.
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    /// Routes a boundary entry-point name to its handler.
    pub fn dispatch(&mut self, entry: &str, payload: &str) -> Result<Option<String>> {
        match entry {
            "g_create" => self.create(payload),
            "g_join" => self.join(payload),
            "g_move" => self.make_move(payload),
            "g_swap" => self.swap(payload),
            "g_timeout" => self.claim_timeout(payload),
            "g_resign" => self.resign(payload),
            "g_get" => self.get(payload),
            "g_waiting" => self.waiting(),
            _ => Err(EngineError::UnknownEntryPoint),
        }
    }

    // ---- g_create ----

    /// Creates a game lobby: `type|name|first_move_cost?`.
    ///
    /// Escrows an optional wager from the creator's first `transfer.allow`
    /// intent, registers the game on the waiting list, and returns the new
    /// id as decimal text.
    #[instrument(skip(self, payload))]
    pub fn create(&mut self, payload: &str) -> Result<Option<String>> {
        let mut input = payload;
        let kind_str = codec::next_field(&mut input);
        let name = codec::next_field(&mut input);
        let fmc_str = codec::next_field(&mut input);
        exhausted(input)?;

        if name.contains('|') {
            return Err(EngineError::NameContainsSeparator);
        }
        let code = codec::parse_u8(kind_str).map_err(|_| EngineError::InvalidType)?;
        let kind = GameKind::from_code(code)?;
        let fmc = if fmc_str.is_empty() {
            0
        } else {
            codec::parse_fixed_point3(fmc_str)?
        };

        let sender = self.host.sender();
        let created_at = self.block_unix()?.0;
        let id = store::game_count(self.host)?;

        let mut meta = Meta::new(
            kind,
            name.to_string(),
            sender.clone(),
            None,
            None,
            None,
            if fmc > 0 { Some(fmc) } else { None },
            created_at,
        );
        economy::escrow_on_create(self.host, &mut meta)?;
        if fmc > 0 && meta.asset().is_none() {
            // buying the first move only makes sense against a wager
            return Err(EngineError::InvalidFirstMoveCost);
        }

        store::save_meta(self.host, id, &meta)?;
        store::save_state(self.host, id, &GameState::waiting(sender.clone()))?;
        store::set_move_count(self.host, id, 0);
        store::add_waiting(self.host, id)?;
        store::set_game_count(self.host, id + 1);

        let bet = (*meta.asset()).zip(*meta.bet());
        events::game_created(
            self.host,
            id,
            &sender,
            kind.code(),
            name,
            bet,
            *meta.first_move_cost(),
            created_at,
        );
        info!(id, kind = kind.code(), "game created");
        Ok(Some(codec::decimal_string(id)))
    }

    // ---- g_join ----

    /// Joins a waiting game: `id`.
    ///
    /// Settles the wager (possibly buying the first move), fixes the
    /// identity pair, starts the game and, for Gomoku, opens the Swap2
    /// protocol.
    #[instrument(skip(self, payload))]
    pub fn join(&mut self, payload: &str) -> Result<Option<String>> {
        let id = parse_single_id(payload)?;
        let (mut meta, mut state) = self.load_game(id)?;

        if *state.status() != GameStatus::Waiting {
            return Err(EngineError::CannotJoin(state.status().code()));
        }
        let joiner = self.host.sender();
        if joiner == *meta.creator() {
            return Err(EngineError::CreatorCannotJoin);
        }

        meta.set_opponent(joiner.clone());
        let purchased = economy::settle_join(self.host, &meta, &mut state, &joiner)?;
        state.start();

        store::save_meta(self.host, id, &meta)?;
        store::save_state(self.host, id, &state)?;
        store::remove_waiting(self.host, id)?;

        if *meta.kind() == GameKind::Gomoku {
            store::save_swap2(self.host, id, &Swap2State::init());
        }

        let ts = self.block_unix()?.0;
        if purchased {
            events::first_move_purchased(self.host, id, &joiner);
        }
        events::game_joined(self.host, id, &joiner, purchased, ts);
        info!(id, purchased, "game joined");
        Ok(None)
    }

    // ---- g_move ----

    /// Commits a move: `id|row|col`.
    ///
    /// The mark is derived from move-count parity; for Connect Four the row
    /// argument is ignored and the piece drops to the lowest empty row of
    /// the column. Win, misère and draw detection run on the updated board.
    #[instrument(skip(self, payload))]
    pub fn make_move(&mut self, payload: &str) -> Result<Option<String>> {
        let mut input = payload;
        let id = codec::parse_u64(codec::next_field(&mut input))?;
        let row = codec::parse_u8(codec::next_field(&mut input))
            .map_err(|_| EngineError::InvalidCoord)?;
        let col = codec::parse_u8(codec::next_field(&mut input))
            .map_err(|_| EngineError::InvalidCoord)?;
        exhausted(input)?;

        let (meta, mut state) = self.load_game(id)?;
        if *state.status() != GameStatus::InProgress {
            return Err(EngineError::GameNotInProgress);
        }
        let sender = self.host.sender();
        if !state.is_player(&sender) {
            return Err(EngineError::NotAPlayer);
        }
        if *meta.kind() == GameKind::Gomoku && store::load_swap2(self.host, id)?.is_some() {
            return Err(EngineError::OpeningInProgress);
        }

        let kind = *meta.kind();
        let (rows, cols) = kind.dims();
        if usize::from(row) >= rows || usize::from(col) >= cols {
            return Err(EngineError::InvalidCoord);
        }

        let moves = store::load_moves(self.host, id)?;
        let count = moves.len() as u64;
        let mut grid = Grid::replay(kind, moves.iter().map(|m| (m.row, m.col)));

        let mark = state.role_of(&sender).ok_or(EngineError::NotAPlayer)?;
        if mark != Player::next_to_play(count) {
            return Err(EngineError::NotYourTurn);
        }

        // resolve the landing cell and mutate the in-memory board
        let (row, col) = if kind.is_gravity() {
            let r = grid.drop_row(usize::from(col)).ok_or(EngineError::ColumnFull)?;
            (r, usize::from(col))
        } else {
            if !grid.is_empty(usize::from(row), usize::from(col)) {
                return Err(EngineError::CellOccupied);
            }
            (usize::from(row), usize::from(col))
        };
        grid.set(row, col, Cell::Occupied(mark));

        let (now, _) = self.block_unix()?;
        let dts = move_delta(now, *meta.created_at())?;
        let n = count + 1;
        store::save_move(self.host, id, n, &MoveRecord::new(row as u8, col as u8, dts));
        store::set_move_count(self.host, id, n);
        events::move_made(self.host, id, &sender, (row * cols + col) as u64, now);

        match rules::evaluate_placement(kind, &grid, row, col) {
            Placement::Wins => self.finish_with_winner(id, &meta, &mut state, mark, now)?,
            Placement::Loses => {
                self.finish_with_winner(id, &meta, &mut state, mark.opponent(), now)?
            }
            Placement::Neutral => {
                if n >= (rows * cols) as u64 {
                    state.finish(None);
                    economy::split_pot(self.host, &meta, &state);
                    store::save_state(self.host, id, &state)?;
                    events::game_draw(self.host, id, now);
                }
            }
        }
        Ok(None)
    }

    // ---- g_swap ----

    /// Drives the Swap2 opening: `id|op|…` with ops `place`, `choose`,
    /// `add`, `color` (§ opening module). Only the opening's current actor
    /// may call; placements append move records like normal moves.
    #[instrument(skip(self, payload))]
    pub fn swap(&mut self, payload: &str) -> Result<Option<String>> {
        let mut input = payload;
        let id = codec::parse_u64(codec::next_field(&mut input))?;
        let op = codec::next_field(&mut input);

        let (meta, mut state) = self.load_game(id)?;
        if *meta.kind() != GameKind::Gomoku {
            return Err(EngineError::NotInOpening);
        }
        if state.player_o().is_none() {
            return Err(EngineError::OpponentRequired);
        }
        if *state.status() != GameStatus::InProgress {
            return Err(EngineError::GameNotInProgress);
        }
        let mut st = store::load_swap2(self.host, id)?.ok_or(EngineError::NotInOpening)?;

        let sender = self.host.sender();
        let actor = state
            .address_of(st.next_actor())
            .ok_or(EngineError::OpponentRequired)?;
        if sender != actor {
            return Err(EngineError::NotYourOpeningTurn);
        }

        match op {
            "place" => {
                if st.phase() != Phase::Opening {
                    return Err(EngineError::WrongPhase);
                }
                let stones = collect_tuples(&mut input, 3)?;
                self.place_opening_stones(id, &meta, &sender, &mut st, &stones, false)?;
                store::save_swap2(self.host, id, &st);
            }
            "add" => {
                if st.phase() != Phase::ExtraPlace {
                    return Err(EngineError::WrongPhase);
                }
                let stones = collect_tuples(&mut input, 2)?;
                self.place_opening_stones(id, &meta, &sender, &mut st, &stones, true)?;
                store::save_swap2(self.host, id, &st);
            }
            "choose" => {
                let choice = codec::next_field(&mut input);
                exhausted(input)?;
                let decision = st.choose(choice)?;
                events::swap_choice_made(self.host, id, &sender, choice);
                match decision {
                    SwapChoice::Swap => {
                        state.swap_roles();
                        self.complete_opening(id, &state)?;
                    }
                    SwapChoice::Stay => self.complete_opening(id, &state)?,
                    SwapChoice::Add => store::save_swap2(self.host, id, &st),
                }
            }
            "color" => {
                let color_str = codec::next_field(&mut input);
                exhausted(input)?;
                let code =
                    codec::parse_u8(color_str).map_err(|_| EngineError::InvalidColor)?;
                let swap = st.choose_color(code)?;
                events::swap_choice_made(self.host, id, &sender, color_str);
                if swap {
                    state.swap_roles();
                }
                self.complete_opening(id, &state)?;
            }
            _ => return Err(EngineError::InvalidSwapOp),
        }
        Ok(None)
    }

    // ---- g_timeout ----

    /// Claims a win by inactivity: `id`.
    ///
    /// Allowed only to the waiting player — the one whose opponent's action
    /// is overdue — once seven days have passed since the last recorded
    /// move (or creation).
    #[instrument(skip(self, payload))]
    pub fn claim_timeout(&mut self, payload: &str) -> Result<Option<String>> {
        let id = parse_single_id(payload)?;
        let (meta, mut state) = self.load_game(id)?;

        if *state.status() != GameStatus::InProgress {
            return Err(EngineError::GameNotInProgress);
        }
        let sender = self.host.sender();
        if !state.is_player(&sender) {
            return Err(EngineError::NotAPlayer);
        }
        if state.player_o().is_none() {
            return Err(EngineError::OpponentRequired);
        }

        let (now, now_iso) = self.block_unix()?;
        let last = store::last_move_at(self.host, id, *meta.created_at())?;
        let deadline = last + GAME_TIMEOUT_SECS;
        if now <= deadline {
            return Err(EngineError::TimeoutNotReached {
                now: now_iso,
                expires_at: time::unix_to_iso8601(deadline + 1),
            });
        }

        // the role whose action is overdue loses; the other claims
        let opening = store::load_swap2(self.host, id)?;
        let due = match &opening {
            Some(st) => st.next_actor(),
            None => Player::next_to_play(store::move_count(self.host, id)?),
        };
        let winner = own(state.address_of(due.opponent()))?;
        let loser = own(state.address_of(due))?;
        if sender != winner {
            return Err(if opening.is_some() {
                EngineError::OnlyWinnerCanClaimTimeout
            } else {
                EngineError::OnlyOpponentCanClaimTimeout
            });
        }

        state.finish(Some(winner.clone()));
        economy::transfer_pot(self.host, &meta, &winner);
        store::save_state(self.host, id, &state)?;
        if opening.is_some() {
            store::clear_swap2(self.host, id);
        }
        events::game_timed_out(self.host, id, &loser, now);
        events::game_won(self.host, id, &winner, now);
        info!(id, winner = %winner, "timeout claimed");
        Ok(None)
    }

    // ---- g_resign ----

    /// Concedes: `id`.
    ///
    /// Before a join this cancels the lobby and refunds the creator's
    /// stake; afterwards the other player wins the pot.
    #[instrument(skip(self, payload))]
    pub fn resign(&mut self, payload: &str) -> Result<Option<String>> {
        let id = parse_single_id(payload)?;
        let (meta, mut state) = self.load_game(id)?;

        if *state.status() == GameStatus::Finished {
            return Err(EngineError::GameAlreadyFinished);
        }
        let sender = self.host.sender();
        if !state.is_player(&sender) {
            return Err(EngineError::NotAPlayer);
        }

        let (now, _) = self.block_unix()?;
        let winner = match state.player_o() {
            None => {
                economy::transfer_pot(self.host, &meta, meta.creator());
                store::remove_waiting(self.host, id)?;
                None
            }
            Some(player_o) => {
                let winner = if sender == *state.player_x() {
                    player_o.clone()
                } else {
                    state.player_x().clone()
                };
                economy::transfer_pot(self.host, &meta, &winner);
                Some(winner)
            }
        };

        state.finish(winner.clone());
        store::save_state(self.host, id, &state)?;
        store::clear_swap2(self.host, id);
        events::game_resigned(self.host, id, &sender, now);
        if let Some(winner) = winner {
            events::game_won(self.host, id, &winner, now);
        }
        Ok(None)
    }

    // ---- g_get ----

    /// Renders the full game view as one pipe-delimited line ending in the
    /// row-major ASCII board (`0` empty, `1` X, `2` O). Optional fields
    /// render as empty strings.
    #[instrument(skip(self, payload))]
    pub fn get(&mut self, payload: &str) -> Result<Option<String>> {
        let id = parse_single_id(payload)?;
        let (meta, state) = self.load_game(id)?;

        let kind = *meta.kind();
        let (rows, cols) = kind.dims();
        let moves = store::load_moves(self.host, id)?;
        let count = moves.len() as u64;
        let grid = Grid::replay(kind, moves.iter().map(|m| (m.row, m.col)));
        let turn = Player::next_to_play(count).code();
        let last_move_at = store::last_move_at(self.host, id, *meta.created_at())?;

        let fields = [
            id.to_string(),
            kind.code().to_string(),
            meta.name().clone(),
            meta.creator().clone(),
            meta.opponent().clone().unwrap_or_default(),
            rows.to_string(),
            cols.to_string(),
            turn.to_string(),
            count.to_string(),
            state.status().code().to_string(),
            state.winner().clone().unwrap_or_default(),
            (*meta.asset()).map(|a| a.symbol().to_string()).unwrap_or_default(),
            (*meta.bet()).map(|b| b.to_string()).unwrap_or_default(),
            last_move_at.to_string(),
            state.player_x().clone(),
            state.player_o().clone().unwrap_or_default(),
            grid.ascii(),
        ];
        Ok(Some(fields.join("|")))
    }

    // ---- g_waiting ----

    /// Lists the ids of games waiting for an opponent, comma-separated.
    #[instrument(skip(self))]
    pub fn waiting(&mut self) -> Result<Option<String>> {
        let ids = store::waiting_ids(self.host)?;
        let csv = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Ok(Some(csv))
    }

    // ---- shared helpers ----

    fn load_game(&self, id: u64) -> Result<(Meta, GameState)> {
        let meta = store::load_meta(self.host, id)?;
        let state = store::load_state(self.host, id)?;
        Ok((meta, state))
    }

    fn block_unix(&self) -> Result<(u64, String)> {
        let iso = self.host.block_time();
        let unix = time::iso8601_to_unix(&iso)?;
        Ok((unix, iso))
    }

    fn finish_with_winner(
        &mut self,
        id: u64,
        meta: &Meta,
        state: &mut GameState,
        role: Player,
        now: u64,
    ) -> Result<()> {
        let winner = own(state.address_of(role))?;
        state.finish(Some(winner.clone()));
        economy::transfer_pot(self.host, meta, &winner);
        store::save_state(self.host, id, state)?;
        events::game_won(self.host, id, &winner, now);
        info!(id, winner = %winner, "game won");
        Ok(())
    }

    /// Validates and applies a batch of opening placements (`place` when
    /// `extra` is false, `add` when true), appending one move record per
    /// stone so the board stays reconstructible from the log alone.
    fn place_opening_stones(
        &mut self,
        id: u64,
        meta: &Meta,
        sender: &str,
        st: &mut Swap2State,
        stones: &[(u8, u8, u8)],
        extra: bool,
    ) -> Result<()> {
        let kind = *meta.kind();
        let (rows, cols) = kind.dims();
        let moves = store::load_moves(self.host, id)?;
        let mut count = moves.len() as u64;
        let mut grid = Grid::replay(kind, moves.iter().map(|m| (m.row, m.col)));

        let (now, _) = self.block_unix()?;
        let dts = move_delta(now, *meta.created_at())?;

        for &(row, col, color_code) in stones {
            if usize::from(row) >= rows || usize::from(col) >= cols {
                return Err(EngineError::InvalidCoord);
            }
            let color = Player::from_code(color_code).ok_or(EngineError::InvalidCell)?;
            if !grid.is_empty(usize::from(row), usize::from(col)) {
                return Err(EngineError::CellOccupied);
            }

            if extra {
                st.place_extra(color)?;
            } else {
                st.place_opening(color)?;
            }
            grid.set(usize::from(row), usize::from(col), Cell::Occupied(color));
            count += 1;
            store::save_move(self.host, id, count, &MoveRecord::new(row, col, dts));
            store::set_move_count(self.host, id, count);

            if extra {
                let (x, o) = st.extra_counts();
                events::swap_extra_placed(self.host, id, sender, row, col, color_code, x, o);
            } else {
                let (x, o) = st.opening_counts();
                events::swap_opening_placed(self.host, id, sender, row, col, color_code, x, o);
            }
        }
        Ok(())
    }

    fn complete_opening(&mut self, id: u64, state: &GameState) -> Result<()> {
        store::clear_swap2(self.host, id);
        store::save_state(self.host, id, state)?;
        let player_o = own(state.player_o().as_deref())?;
        events::swap_phase_complete(self.host, id, state.player_x(), &player_o);
        info!(id, "opening complete");
        Ok(())
    }
}

fn exhausted(input: &str) -> Result<()> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(EngineError::TooManyArguments)
    }
}

fn parse_single_id(payload: &str) -> Result<u64> {
    let mut input = payload;
    let id = codec::parse_u64(codec::next_field(&mut input))?;
    exhausted(input)?;
    Ok(id)
}

fn move_delta(now: u64, created_at: u64) -> Result<u32> {
    if now < created_at {
        return Err(EngineError::TimestampBeforeCreation);
    }
    u32::try_from(now - created_at).map_err(|_| EngineError::InvalidTimestamp)
}

/// Splits the remaining payload into `row-col-color` triples, capped at
/// `max` per call. Zero triples is a malformed placement.
fn collect_tuples(input: &mut &str, max: usize) -> Result<Vec<(u8, u8, u8)>> {
    let mut tuples = Vec::new();
    while !input.is_empty() {
        let field = codec::next_field(input);
        if field.is_empty() {
            continue;
        }
        let mut parts = field.split('-');
        let (row, col, color) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(r), Some(c), Some(v), None) => (r, c, v),
            _ => return Err(EngineError::InvalidPlacement),
        };
        let row = codec::parse_u8(row).map_err(|_| EngineError::InvalidCoord)?;
        let col = codec::parse_u8(col).map_err(|_| EngineError::InvalidCoord)?;
        let color = codec::parse_u8(color).map_err(|_| EngineError::InvalidCell)?;
        tuples.push((row, col, color));
    }
    if tuples.is_empty() {
        return Err(EngineError::InvalidPlacement);
    }
    if tuples.len() > max {
        return Err(EngineError::TooManyArguments);
    }
    Ok(tuples)
}

fn own(addr: Option<&str>) -> Result<String> {
    addr.map(str::to_string).ok_or(EngineError::OpponentRequired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;

    #[test]
    fn test_dispatch_routes_by_entry_name() {
        let mut host = MockHost::new();
        host.set_sender("hive:alice");
        host.set_block_time("2025-09-01T12:00:00");

        let id = GameEngine::new(&mut host)
            .dispatch("g_create", "1|routed|")
            .unwrap()
            .unwrap();
        assert_eq!(id, "0");

        let csv = GameEngine::new(&mut host)
            .dispatch("g_waiting", "")
            .unwrap()
            .unwrap();
        assert_eq!(csv, "0");

        assert_eq!(
            GameEngine::new(&mut host).dispatch("g_frobnicate", ""),
            Err(EngineError::UnknownEntryPoint)
        );
    }

    #[test]
    fn test_collect_tuples_shapes() {
        let mut input = "7-7-1|7-8-2";
        assert_eq!(
            collect_tuples(&mut input, 3).unwrap(),
            vec![(7, 7, 1), (7, 8, 2)]
        );

        let mut input = "";
        assert_eq!(collect_tuples(&mut input, 3), Err(EngineError::InvalidPlacement));

        let mut input = "7-7";
        assert_eq!(collect_tuples(&mut input, 3), Err(EngineError::InvalidPlacement));

        let mut input = "1-1-1|2-2-2|3-3-1|4-4-2";
        assert_eq!(collect_tuples(&mut input, 3), Err(EngineError::TooManyArguments));
    }
}
