//! Chain-log event emission.
//!
//! Events are single log lines in the compact form `<code>|k1=v1|k2=v2|…`
//! consumed by off-chain indexers. Codes are one short token per lifecycle
//! step; attribute order within an event is stable but consumers must not
//! rely on it.

use crate::host::{Asset, HostEnv};

fn emit<H: HostEnv>(host: &mut H, code: &str, attrs: &[(&str, &str)]) {
    let mut line = String::with_capacity(16 + code.len() + attrs.len() * 16);
    line.push_str(code);
    for (k, v) in attrs {
        line.push('|');
        line.push_str(k);
        line.push('=');
        line.push_str(v);
    }
    host.log(&line);
}

/// `c` — a new game lobby was created.
#[allow(clippy::too_many_arguments)]
pub fn game_created<H: HostEnv>(
    host: &mut H,
    id: u64,
    by: &str,
    kind: u8,
    name: &str,
    bet: Option<(Asset, u64)>,
    fmc: Option<u64>,
    ts: u64,
) {
    let id = id.to_string();
    let kind = kind.to_string();
    let ts = ts.to_string();
    let asset_s = bet.map(|(asset, _)| asset.symbol().to_string());
    let bet_s = bet.map(|(_, amount)| amount.to_string());
    let fmc_s = fmc.map(|fmc| fmc.to_string());

    let mut attrs: Vec<(&str, &str)> = vec![
        ("id", &id),
        ("by", by),
        ("type", &kind),
        ("name", name),
        ("ts", &ts),
    ];
    if let (Some(asset), Some(amount)) = (&asset_s, &bet_s) {
        attrs.push(("asset", asset));
        attrs.push(("bet", amount));
    }
    if let Some(fmc) = &fmc_s {
        attrs.push(("fmc", fmc));
    }
    emit(host, "c", &attrs);
}

/// `j` — an opponent joined; `fm` flags a first-move purchase.
pub fn game_joined<H: HostEnv>(host: &mut H, id: u64, by: &str, first_move: bool, ts: u64) {
    let id = id.to_string();
    let fm = if first_move { "1" } else { "0" };
    let ts = ts.to_string();
    emit(host, "j", &[("id", &id), ("by", by), ("fm", fm), ("ts", &ts)]);
}

/// `fmc` — the joiner bought the first move.
pub fn first_move_purchased<H: HostEnv>(host: &mut H, id: u64, player: &str) {
    let id = id.to_string();
    emit(host, "fmc", &[("id", &id), ("player", player)]);
}

/// `m` — a move was committed; `cell` is the flattened `row*cols+col`.
pub fn move_made<H: HostEnv>(host: &mut H, id: u64, by: &str, cell: u64, ts: u64) {
    let id = id.to_string();
    let cell = cell.to_string();
    let ts = ts.to_string();
    emit(host, "m", &[("id", &id), ("by", by), ("cell", &cell), ("ts", &ts)]);
}

/// `w` — the game was decided in favor of `winner`.
pub fn game_won<H: HostEnv>(host: &mut H, id: u64, winner: &str, ts: u64) {
    let id = id.to_string();
    let ts = ts.to_string();
    emit(host, "w", &[("id", &id), ("winner", winner), ("ts", &ts)]);
}

/// `r` — a player resigned.
pub fn game_resigned<H: HostEnv>(host: &mut H, id: u64, resigner: &str, ts: u64) {
    let id = id.to_string();
    let ts = ts.to_string();
    emit(host, "r", &[("id", &id), ("resigner", resigner), ("ts", &ts)]);
}

/// `t` — a player lost to the inactivity timeout.
pub fn game_timed_out<H: HostEnv>(host: &mut H, id: u64, timed_out: &str, ts: u64) {
    let id = id.to_string();
    let ts = ts.to_string();
    emit(host, "t", &[("id", &id), ("timedOut", timed_out), ("ts", &ts)]);
}

/// `d` — the board filled with no winner.
pub fn game_draw<H: HostEnv>(host: &mut H, id: u64, ts: u64) {
    let id = id.to_string();
    let ts = ts.to_string();
    emit(host, "d", &[("id", &id), ("ts", &ts)]);
}

/// `s_op` — one trio stone placed during the Swap2 opening.
#[allow(clippy::too_many_arguments)]
pub fn swap_opening_placed<H: HostEnv>(
    host: &mut H,
    id: u64,
    by: &str,
    row: u8,
    col: u8,
    color: u8,
    x: u8,
    o: u8,
) {
    let id = id.to_string();
    let (row, col) = (row.to_string(), col.to_string());
    let (color, x, o) = (color.to_string(), x.to_string(), o.to_string());
    emit(
        host,
        "s_op",
        &[
            ("id", &id),
            ("by", by),
            ("r", &row),
            ("c", &col),
            ("cell", &color),
            ("x", &x),
            ("o", &o),
        ],
    );
}

/// `s_cc` — a swap/stay/add or final color decision was taken.
pub fn swap_choice_made<H: HostEnv>(host: &mut H, id: u64, by: &str, choice: &str) {
    let id = id.to_string();
    emit(host, "s_cc", &[("id", &id), ("by", by), ("choice", choice)]);
}

/// `s_ep` — one extra stone placed after an `add` choice.
#[allow(clippy::too_many_arguments)]
pub fn swap_extra_placed<H: HostEnv>(
    host: &mut H,
    id: u64,
    by: &str,
    row: u8,
    col: u8,
    color: u8,
    extra_x: u8,
    extra_o: u8,
) {
    let id = id.to_string();
    let (row, col) = (row.to_string(), col.to_string());
    let (color, x, o) = (color.to_string(), extra_x.to_string(), extra_o.to_string());
    emit(
        host,
        "s_ep",
        &[
            ("id", &id),
            ("by", by),
            ("row", &row),
            ("col", &col),
            ("cell", &color),
            ("extraX", &x),
            ("extraO", &o),
        ],
    );
}

/// `s_pc` — the opening completed; attributes carry the final role pair.
pub fn swap_phase_complete<H: HostEnv>(host: &mut H, id: u64, player_x: &str, player_o: &str) {
    let id = id.to_string();
    emit(
        host,
        "s_pc",
        &[("id", &id), ("playerX", player_x), ("playerO", player_o)],
    );
}
