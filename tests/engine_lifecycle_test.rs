//! End-to-end lifecycle tests driving the public engine API.

use in_a_row::{EngineError, GameEngine, GameStatus, MockHost};

const ALICE: &str = "hive:alice";
const BOB: &str = "hive:bob";

fn create(host: &mut MockHost, sender: &str, payload: &str) -> u64 {
    host.set_sender(sender);
    let id = GameEngine::new(host)
        .create(payload)
        .expect("create failed")
        .expect("create returns id");
    id.parse().expect("id is decimal")
}

fn join(host: &mut MockHost, sender: &str, id: u64) {
    host.set_sender(sender);
    GameEngine::new(host)
        .join(&id.to_string())
        .expect("join failed");
}

fn try_move(
    host: &mut MockHost,
    sender: &str,
    id: u64,
    row: u8,
    col: u8,
) -> Result<Option<String>, EngineError> {
    host.set_sender(sender);
    GameEngine::new(host).make_move(&format!("{id}|{row}|{col}"))
}

fn mv(host: &mut MockHost, sender: &str, id: u64, row: u8, col: u8) {
    try_move(host, sender, id, row, col).expect("move failed");
}

/// Splits the `g_get` view into its 17 pipe-delimited fields.
fn view(host: &mut MockHost, id: u64) -> Vec<String> {
    let out = GameEngine::new(host)
        .get(&id.to_string())
        .expect("get failed")
        .expect("get returns view");
    let fields: Vec<String> = out.split('|').map(str::to_string).collect();
    assert_eq!(fields.len(), 17, "unexpected view shape: {out}");
    fields
}

fn setup() -> MockHost {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut host = MockHost::new();
    host.set_block_time("2025-09-01T12:00:00");
    host
}

#[test]
fn test_tictactoe_creator_wins() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|XOXO|");
    join(&mut host, BOB, id);

    // anti-diagonal for X: (1,1), (2,0), (0,2)
    mv(&mut host, ALICE, id, 1, 1);
    mv(&mut host, BOB, id, 0, 1);
    mv(&mut host, ALICE, id, 2, 0);
    mv(&mut host, BOB, id, 1, 0);
    mv(&mut host, ALICE, id, 0, 2);

    let v = view(&mut host, id);
    assert_eq!(v[8], "5", "move count");
    assert_eq!(v[9], GameStatus::Finished.code().to_string());
    assert_eq!(v[10], ALICE, "winner is player_x");
    assert_eq!(v[16], "021210100", "board content");
    assert_eq!(host.events_with_code("w").len(), 1);
}

#[test]
fn test_tictactoe_draw_splits_nothing_without_wager() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|full house|");
    join(&mut host, BOB, id);

    for (i, (r, c)) in [
        (0, 0), (0, 2), (0, 1), (1, 0), (1, 2), (1, 1), (2, 0), (2, 1), (2, 2),
    ]
    .iter()
    .enumerate()
    {
        let sender = if i % 2 == 0 { ALICE } else { BOB };
        mv(&mut host, sender, id, *r, *c);
    }

    let v = view(&mut host, id);
    assert_eq!(v[8], "9");
    assert_eq!(v[9], GameStatus::Finished.code().to_string());
    assert_eq!(v[10], "", "no winner on a draw");
    assert!(!v[16].contains('0'), "board is full");
    assert_eq!(host.events_with_code("d").len(), 1);
    assert!(host.transfers.is_empty());
}

#[test]
fn test_connect_four_drops_and_vertical_win() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "2|gravity|");

    // no move before an opponent joined
    assert_eq!(
        try_move(&mut host, ALICE, id, 0, 0),
        Err(EngineError::GameNotInProgress)
    );

    join(&mut host, BOB, id);

    // O cannot open
    assert_eq!(try_move(&mut host, BOB, id, 0, 1), Err(EngineError::NotYourTurn));

    for _ in 0..3 {
        mv(&mut host, ALICE, id, 0, 0); // row argument is ignored for drops
        mv(&mut host, BOB, id, 0, 1);
    }
    mv(&mut host, ALICE, id, 0, 0); // fourth piece in column 0

    let v = view(&mut host, id);
    assert_eq!(v[9], GameStatus::Finished.code().to_string());
    assert_eq!(v[10], ALICE);

    // pieces stacked from the bottom row upwards
    let board = v[16].as_bytes();
    let cols = 7;
    for row in 2..6 {
        assert_eq!(board[row * cols], b'1', "X piece at row {row}, col 0");
    }
    assert_eq!(board[2 * cols + 1], b'0', "column 1 only three high");
}

#[test]
fn test_connect_four_column_full() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "2|stack|");
    join(&mut host, BOB, id);

    // alternate into columns 2 and 3 until column 2 holds six pieces
    for _ in 0..3 {
        mv(&mut host, ALICE, id, 0, 2);
        mv(&mut host, BOB, id, 0, 2);
    }
    mv(&mut host, ALICE, id, 0, 3);
    assert_eq!(try_move(&mut host, BOB, id, 0, 2), Err(EngineError::ColumnFull));
}

#[test]
fn test_squava_three_in_a_row_loses() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "5|misere|");
    join(&mut host, BOB, id);

    mv(&mut host, ALICE, id, 0, 0);
    mv(&mut host, BOB, id, 4, 4);
    mv(&mut host, ALICE, id, 0, 1);
    mv(&mut host, BOB, id, 4, 3);
    mv(&mut host, ALICE, id, 0, 2); // X makes exactly three

    let v = view(&mut host, id);
    assert_eq!(v[9], GameStatus::Finished.code().to_string());
    assert_eq!(v[10], BOB, "placer of a bare three loses");
}

#[test]
fn test_squava_completing_four_through_a_gap_wins() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "5|gap|");
    join(&mut host, BOB, id);

    // X builds _XX_X with no intermediate three, then fills the gap
    mv(&mut host, ALICE, id, 0, 0);
    mv(&mut host, BOB, id, 4, 4);
    mv(&mut host, ALICE, id, 0, 1);
    mv(&mut host, BOB, id, 4, 3);
    mv(&mut host, ALICE, id, 0, 3);
    mv(&mut host, BOB, id, 3, 4);
    mv(&mut host, ALICE, id, 0, 2); // completes four: win, not misère loss

    let v = view(&mut host, id);
    assert_eq!(v[10], ALICE, "four-in-a-row outranks the misère three");
}

#[test]
fn test_cell_occupied_and_bounds() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|bounds|");
    join(&mut host, BOB, id);

    mv(&mut host, ALICE, id, 1, 1);
    assert_eq!(try_move(&mut host, BOB, id, 1, 1), Err(EngineError::CellOccupied));
    assert_eq!(try_move(&mut host, BOB, id, 3, 0), Err(EngineError::InvalidCoord));
    assert_eq!(try_move(&mut host, BOB, id, 0, 3), Err(EngineError::InvalidCoord));
}

#[test]
fn test_waiting_list_tracks_membership() {
    let mut host = setup();
    let a = create(&mut host, ALICE, "1|one|");
    let b = create(&mut host, ALICE, "2|two|");
    let c = create(&mut host, ALICE, "4|three|");

    let csv = GameEngine::new(&mut host).waiting().unwrap().unwrap();
    assert_eq!(csv, format!("{a},{b},{c}"));

    join(&mut host, BOB, b);
    // swap-with-last removal: the final entry moved into the vacated slot
    let csv = GameEngine::new(&mut host).waiting().unwrap().unwrap();
    assert_eq!(csv, format!("{a},{c}"));
}

#[test]
fn test_join_preconditions() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|solo|");

    host.set_sender(ALICE);
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::CreatorCannotJoin)
    );

    join(&mut host, BOB, id);
    host.set_sender("hive:carol");
    assert_eq!(
        GameEngine::new(&mut host).join(&id.to_string()),
        Err(EngineError::CannotJoin(1))
    );

    assert_eq!(
        GameEngine::new(&mut host).join("99"),
        Err(EngineError::GameNotFound)
    );
}

#[test]
fn test_resign_with_opponent_awards_other_player() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|quit|");
    join(&mut host, BOB, id);
    mv(&mut host, ALICE, id, 0, 0);

    host.set_sender(ALICE);
    GameEngine::new(&mut host).resign(&id.to_string()).unwrap();

    let v = view(&mut host, id);
    assert_eq!(v[9], GameStatus::Finished.code().to_string());
    assert_eq!(v[10], BOB);
    assert_eq!(host.events_with_code("r").len(), 1);
    assert_eq!(host.events_with_code("w").len(), 1);
}

#[test]
fn test_resign_before_join_cancels_lobby() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|lonely|");

    host.set_sender(ALICE);
    GameEngine::new(&mut host).resign(&id.to_string()).unwrap();

    let v = view(&mut host, id);
    assert_eq!(v[9], GameStatus::Finished.code().to_string());
    assert_eq!(v[10], "", "no winner when cancelling a lobby");
    let csv = GameEngine::new(&mut host).waiting().unwrap().unwrap();
    assert_eq!(csv, "");

    // a finished game cannot be resigned again
    host.set_sender(ALICE);
    assert_eq!(
        GameEngine::new(&mut host).resign(&id.to_string()),
        Err(EngineError::GameAlreadyFinished)
    );
}

#[test]
fn test_outsiders_are_rejected() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|private|");
    join(&mut host, BOB, id);

    assert_eq!(
        try_move(&mut host, "hive:carol", id, 0, 0),
        Err(EngineError::NotAPlayer)
    );
    host.set_sender("hive:carol");
    assert_eq!(
        GameEngine::new(&mut host).resign(&id.to_string()),
        Err(EngineError::NotAPlayer)
    );
}

#[test]
fn test_trailing_arguments_rejected() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "1|strict|");
    join(&mut host, BOB, id);

    host.set_sender(ALICE);
    assert_eq!(
        GameEngine::new(&mut host).make_move(&format!("{id}|0|0|junk")),
        Err(EngineError::TooManyArguments)
    );
    assert_eq!(
        GameEngine::new(&mut host).create("1|name|0.1|extra"),
        Err(EngineError::TooManyArguments)
    );
}

#[test]
fn test_invalid_type_rejected() {
    let mut host = setup();
    host.set_sender(ALICE);
    assert_eq!(
        GameEngine::new(&mut host).create("9|bogus|"),
        Err(EngineError::InvalidType)
    );
    assert_eq!(
        GameEngine::new(&mut host).create("x|bogus|"),
        Err(EngineError::InvalidType)
    );
}

#[test]
fn test_get_view_metadata_fields() {
    let mut host = setup();
    let id = create(&mut host, ALICE, "3|viewer|");
    let v = view(&mut host, id);

    assert_eq!(v[0], id.to_string());
    assert_eq!(v[1], "3");
    assert_eq!(v[2], "viewer");
    assert_eq!(v[3], ALICE);
    assert_eq!(v[4], "", "no opponent yet");
    assert_eq!(v[5], "15");
    assert_eq!(v[6], "15");
    assert_eq!(v[7], "1", "X to move");
    assert_eq!(v[8], "0");
    assert_eq!(v[9], GameStatus::Waiting.code().to_string());
    assert_eq!(v[14], ALICE, "creator starts as player_x");
    assert_eq!(v[15], "");
    assert_eq!(v[16].len(), 225);
}
