//! Wager accounting tests: escrow, first-move purchase, pot flows.

use in_a_row::{Asset, EngineError, GameEngine, Intent, MockHost};

const ALICE: &str = "hive:alice";
const BOB: &str = "hive:bob";

fn create_wagered(host: &mut MockHost, payload: &str, allow: &str) -> u64 {
    host.set_block_time("2025-09-01T12:00:00");
    host.set_sender(ALICE);
    host.set_intents(vec![Intent::transfer_allow("HIVE", allow)]);
    let id = GameEngine::new(host)
        .create(payload)
        .expect("create failed")
        .expect("id")
        .parse()
        .expect("decimal id");
    host.set_intents(vec![]);
    id
}

fn join_with(host: &mut MockHost, sender: &str, id: u64, allow: Option<&str>) {
    host.set_sender(sender);
    host.set_intents(match allow {
        Some(limit) => vec![Intent::transfer_allow("HIVE", limit)],
        None => vec![],
    });
    GameEngine::new(host).join(&id.to_string()).expect("join failed");
    host.set_intents(vec![]);
}

fn mv(host: &mut MockHost, sender: &str, id: u64, row: u8, col: u8) {
    host.set_sender(sender);
    GameEngine::new(host)
        .make_move(&format!("{id}|{row}|{col}"))
        .expect("move failed");
}

fn winner_of(host: &mut MockHost, id: u64) -> String {
    let v = GameEngine::new(host).get(&id.to_string()).unwrap().unwrap();
    v.split('|').nth(10).unwrap().to_string()
}

#[test]
fn test_create_escrows_intent_limit_as_bet() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|stakes|", "1.000");

    assert_eq!(host.drawn_from(ALICE, Asset::Hive), 1000);
    let v = GameEngine::new(&mut host).get(&id.to_string()).unwrap().unwrap();
    let fields: Vec<&str> = v.split('|').collect();
    assert_eq!(fields[11], "HIVE");
    assert_eq!(fields[12], "1000");
}

#[test]
fn test_fmc_without_bet_rejected() {
    let mut host = MockHost::new();
    host.set_block_time("2025-09-01T12:00:00");
    host.set_sender(ALICE);
    assert_eq!(
        GameEngine::new(&mut host).create("1|freeloader|0.2"),
        Err(EngineError::InvalidFirstMoveCost)
    );
}

#[test]
fn test_join_covers_bet_only_keeps_roles() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|X|0.2", "1.000");

    // 1.100 >= bet but < bet + fmc (1.200): plain join
    join_with(&mut host, BOB, id, Some("1.100"));
    assert_eq!(host.drawn_from(BOB, Asset::Hive), 1000);
    assert!(host.events_with_code("fmc").is_empty());

    let v = GameEngine::new(&mut host).get(&id.to_string()).unwrap().unwrap();
    let fields: Vec<&str> = v.split('|').collect();
    assert_eq!(fields[14], ALICE, "creator keeps X");
    assert_eq!(fields[15], BOB);
}

#[test]
fn test_first_move_purchase_swaps_roles_and_pays_fee() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|X|0.2", "1.000");

    // 1.500 >= bet + fmc: purchase
    join_with(&mut host, BOB, id, Some("1.500"));
    assert_eq!(host.drawn_from(BOB, Asset::Hive), 1200);
    assert_eq!(host.transferred_to(ALICE, Asset::Hive), 200);
    assert_eq!(host.events_with_code("fmc").len(), 1);

    let v = GameEngine::new(&mut host).get(&id.to_string()).unwrap().unwrap();
    let fields: Vec<&str> = v.split('|').collect();
    assert_eq!(fields[14], BOB, "joiner bought X");
    assert_eq!(fields[15], ALICE);

    // the purchased first move belongs to Bob now
    host.set_sender(ALICE);
    assert_eq!(
        GameEngine::new(&mut host).make_move(&format!("{id}|0|0")),
        Err(EngineError::NotYourTurn)
    );
    mv(&mut host, BOB, id, 0, 0);
}

#[test]
fn test_join_funding_failures() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|gated|", "1.000");

    host.set_sender(BOB);
    host.set_intents(vec![]);
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::IntentMissing)
    );

    host.set_intents(vec![Intent::transfer_allow("HBD", "1.000")]);
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::WrongBetToken)
    );

    host.set_intents(vec![Intent::transfer_allow("HIVE", "0.999")]);
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::MustCoverBaseBet)
    );

    host.set_intents(vec![Intent::transfer_allow("DOGE", "1.000")]);
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::InvalidIntentToken)
    );

    host.set_intents(vec![Intent::transfer_allow("HIVE", "1.2.3")]);
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::InvalidIntentLimit)
    );
}

#[test]
fn test_win_pays_double_bet_to_winner() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|payout|", "1.000");
    join_with(&mut host, BOB, id, Some("1.000"));

    mv(&mut host, ALICE, id, 1, 1);
    mv(&mut host, BOB, id, 0, 1);
    mv(&mut host, ALICE, id, 2, 0);
    mv(&mut host, BOB, id, 1, 0);
    mv(&mut host, ALICE, id, 0, 2);

    assert_eq!(winner_of(&mut host, id), ALICE);
    // both stakes drawn, full pot to the winner
    assert_eq!(host.drawn_from(ALICE, Asset::Hive), 1000);
    assert_eq!(host.drawn_from(BOB, Asset::Hive), 1000);
    assert_eq!(host.transferred_to(ALICE, Asset::Hive), 2000);
    assert_eq!(host.transferred_to(BOB, Asset::Hive), 0);
}

#[test]
fn test_purchase_then_opponent_win_accounting() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|auction|0.2", "1.000");
    join_with(&mut host, BOB, id, Some("1.200"));

    // Bob plays X after the purchase and wins on the anti-diagonal
    mv(&mut host, BOB, id, 1, 1);
    mv(&mut host, ALICE, id, 0, 1);
    mv(&mut host, BOB, id, 2, 0);
    mv(&mut host, ALICE, id, 1, 0);
    mv(&mut host, BOB, id, 0, 2);

    assert_eq!(winner_of(&mut host, id), BOB);
    assert_eq!(host.drawn_from(ALICE, Asset::Hive), 1000);
    assert_eq!(host.drawn_from(BOB, Asset::Hive), 1200);
    // fee at join plus the doubled pot at the finish
    assert_eq!(host.transferred_to(ALICE, Asset::Hive), 200);
    assert_eq!(host.transferred_to(BOB, Asset::Hive), 2000);
}

#[test]
fn test_draw_splits_pot_between_roles() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|even|", "0.500");
    join_with(&mut host, BOB, id, Some("0.500"));

    for (i, (r, c)) in [
        (0, 0), (0, 2), (0, 1), (1, 0), (1, 2), (1, 1), (2, 0), (2, 1), (2, 2),
    ]
    .iter()
    .enumerate()
    {
        let sender = if i % 2 == 0 { ALICE } else { BOB };
        mv(&mut host, sender, id, *r, *c);
    }

    assert_eq!(winner_of(&mut host, id), "");
    assert_eq!(host.transferred_to(ALICE, Asset::Hive), 500);
    assert_eq!(host.transferred_to(BOB, Asset::Hive), 500);
}

#[test]
fn test_prejoin_resign_refunds_single_stake() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|refund|", "1.000");

    host.set_sender(ALICE);
    GameEngine::new(&mut host).resign(&id.to_string()).unwrap();

    assert_eq!(host.drawn_from(ALICE, Asset::Hive), 1000);
    assert_eq!(host.transferred_to(ALICE, Asset::Hive), 1000, "no doubling");
}

#[test]
fn test_resignation_forfeits_pot_to_opponent() {
    let mut host = MockHost::new();
    let id = create_wagered(&mut host, "1|forfeit|", "1.000");
    join_with(&mut host, BOB, id, Some("1.000"));

    host.set_sender(BOB);
    GameEngine::new(&mut host).resign(&id.to_string()).unwrap();

    assert_eq!(winner_of(&mut host, id), ALICE);
    assert_eq!(host.transferred_to(ALICE, Asset::Hive), 2000);
}
