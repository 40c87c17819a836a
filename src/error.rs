//! Engine error type.
//!
//! Every precondition violation in the engine is a fatal abort from the
//! host's point of view: the entry point returns an error, the host discards
//! any partial writes, and the `Display` text is the abort message shown to
//! the caller. There is no partial-success or retry path at this layer.

/// A fatal abort raised by an engine entry point.
///
/// The `Display` implementation yields the exact abort message; hosts
/// surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    // ---- argument errors ----
    /// The payload contained more fields than the operation accepts.
    #[display("too many arguments")]
    TooManyArguments,
    /// The numeric game type is not one of the supported variants.
    #[display("invalid type")]
    InvalidType,
    /// Game names are forbidden from containing the field separator.
    #[display("name must not contain '|'")]
    NameContainsSeparator,
    /// A row/column pair is outside the board for this game type.
    #[display("invalid coord")]
    InvalidCoord,
    /// An opening stone color was neither 1 (X) nor 2 (O).
    #[display("invalid cell")]
    InvalidCell,
    /// The final color choice was neither 1 nor 2.
    #[display("invalid color")]
    InvalidColor,
    /// The swap choice was not one of `swap`, `stay`, `add`.
    #[display("invalid choice")]
    InvalidChoice,
    /// The swap operation name is unknown.
    #[display("invalid swap op")]
    InvalidSwapOp,
    /// A placement tuple did not parse as `row-col-color`.
    #[display("invalid placement")]
    InvalidPlacement,
    /// A first-move cost was given without a matching wager.
    #[display("invalid first move cost")]
    InvalidFirstMoveCost,
    /// A decimal field contained something other than ASCII digits.
    #[display("invalid number")]
    InvalidNumber,
    /// A fixed-point amount contained more than one dot.
    #[display("invalid number: multiple dots")]
    MultipleDots,
    /// A fixed-point amount contained a non-digit character.
    #[display("invalid character in number")]
    InvalidNumberChar,
    /// A fixed-point amount carried more than three fractional digits.
    #[display("too many fractional digits")]
    TooManyFractionDigits,
    /// The host block timestamp was not the 19-byte ISO-8601 form.
    #[display("invalid timestamp")]
    InvalidTimestamp,
    /// A dispatched entry-point name is not part of the ABI.
    #[display("unknown entry point")]
    UnknownEntryPoint,

    // ---- state errors ----
    /// The game id has never been allocated.
    #[display("game not found")]
    GameNotFound,
    /// The meta record for an allocated id is absent.
    #[display("meta missing")]
    MetaMissing,
    /// The mutable state record for an allocated id is absent.
    #[display("state missing")]
    StateMissing,
    /// Join attempted on a game that is not waiting; carries the status code.
    #[display("cannot join: state is {_0}")]
    CannotJoin(u8),
    /// The creator tried to join their own game.
    #[display("creator cannot join")]
    CreatorCannotJoin,
    /// The operation requires an in-progress game.
    #[display("game not in progress")]
    GameNotInProgress,
    /// The operation requires a game that has not finished.
    #[display("game is already finished")]
    GameAlreadyFinished,
    /// A normal move was attempted while the Swap2 opening is active.
    #[display("opening phase in progress; use g_swap")]
    OpeningInProgress,
    /// A swap operation was attempted with no active opening.
    #[display("not in opening")]
    NotInOpening,
    /// The swap operation does not match the current opening phase.
    #[display("wrong phase")]
    WrongPhase,
    /// The operation requires a joined opponent.
    #[display("opponent required")]
    OpponentRequired,

    // ---- permission errors ----
    /// The sender is neither of the game's players.
    #[display("not a player")]
    NotAPlayer,
    /// The sender's mark does not match the move parity.
    #[display("not your turn")]
    NotYourTurn,
    /// The sender is not the opening's expected actor.
    #[display("not your opening turn")]
    NotYourOpeningTurn,
    /// Timeout claimed by the player whose move is due (parity path).
    #[display("only opponent can claim timeout")]
    OnlyOpponentCanClaimTimeout,
    /// Timeout claimed by the player whose opening action is due.
    #[display("only winning player can claim timeout")]
    OnlyWinnerCanClaimTimeout,

    // ---- board errors ----
    /// The target cell already holds a mark.
    #[display("cell occupied")]
    CellOccupied,
    /// The drop column has no empty cell left.
    #[display("column full")]
    ColumnFull,
    /// More than two X stones in the Swap2 opening trio.
    #[display("too many X in opening")]
    TooManyXInOpening,
    /// More than one O stone in the Swap2 opening trio.
    #[display("too many O in opening")]
    TooManyOInOpening,
    /// The extra X stone was already placed.
    #[display("extra X already placed")]
    ExtraXAlreadyPlaced,
    /// The extra O stone was already placed.
    #[display("extra O already placed")]
    ExtraOAlreadyPlaced,

    // ---- economy errors ----
    /// A wagered join arrived without a transfer.allow intent.
    #[display("intent missing")]
    IntentMissing,
    /// The intent token differs from the game's wager asset.
    #[display("wrong bet token")]
    WrongBetToken,
    /// The intent limit does not cover the base bet.
    #[display("must cover base bet")]
    MustCoverBaseBet,
    /// The intent token is not an accepted asset.
    #[display("invalid intent token")]
    InvalidIntentToken,
    /// The intent limit did not parse as a fixed-point amount.
    #[display("invalid intent limit")]
    InvalidIntentLimit,

    // ---- codec errors ----
    /// A binary record ended before the requested read.
    #[display("decode overflow")]
    DecodeOverflow,
    /// A stored move record has the wrong size.
    #[display("corrupt move data")]
    CorruptMoveData,
    /// A numbered move record is absent from the store.
    #[display("move {_0} missing")]
    MoveMissing(u64),
    /// A binary record had bytes left over after decoding.
    #[display("trailing bytes")]
    TrailingBytes,
    /// A string exceeds the 16-bit length prefix.
    #[display("string too long")]
    StringTooLong,
    /// A name or address exceeds the 8-bit length prefix.
    #[display("name too long")]
    NameTooLong,

    // ---- time errors ----
    /// The inactivity window has not elapsed yet.
    #[display("{now}: timeout not reached. Expires at: {expires_at}")]
    TimeoutNotReached {
        /// Block time of the failed claim, ISO-8601.
        now: String,
        /// First instant at which the claim would succeed, ISO-8601.
        expires_at: String,
    },
    /// The block timestamp precedes the game's creation time.
    #[display("timestamp before game creation")]
    TimestampBeforeCreation,
}

impl std::error::Error for EngineError {}

/// Shorthand result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
