//! in_a_row - a deterministic, turn-based multi-game engine for sandboxed
//! host runtimes.
//!
//! Five abstract two-player games share one framework: 3×3 and 5×5
//! three/four-in-a-row, the 5×5 misère variant Squava, 6×7 gravity-drop
//! Connect Four, and 15×15 Gomoku with the Swap2 fair-opening protocol.
//! The engine manages the full lifecycle (create, join, move, resignation,
//! timeout), optional escrowed wagers with a first-move-purchase auction,
//! and compact binary persistence over the host's key/value store.
//!
//! # Architecture
//!
//! - **Host**: the [`host::HostEnv`] capability trait — state, identity,
//!   block clock, token custody, event log. [`host::MockHost`] runs it all
//!   in memory for tests.
//! - **Store**: typed keyed records — immutable meta, mutable state, an
//!   append-only move log, the Swap2 record, and the waiting list.
//! - **Games**: per-variant dimensions and rules; boards are reconstructed
//!   from the move log with parity-derived marks and never persisted.
//! - **Engine**: the boundary entry points (`g_create` … `g_waiting`) with
//!   their validation, economy and event side effects.
//!
//! # Example
//!
//! ```
//! use in_a_row::{GameEngine, MockHost};
//!
//! let mut host = MockHost::new();
//! host.set_sender("hive:alice");
//! host.set_block_time("2025-09-01T12:00:00");
//!
//! let mut engine = GameEngine::new(&mut host);
//! let id = engine.create("1|first game|").unwrap().unwrap();
//! assert_eq!(id, "0");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod economy;
pub mod engine;
pub mod error;
pub mod games;
pub mod host;
pub mod opening;
pub mod store;

// Crate-level exports - Engine
pub use engine::{GameEngine, GAME_TIMEOUT_SECS};

// Crate-level exports - Errors
pub use error::{EngineError, Result};

// Crate-level exports - Host capabilities
pub use host::{Asset, HostEnv, Intent, MockHost};

// Crate-level exports - Game domain
pub use games::{Cell, GameKind, Grid, Player};

// Crate-level exports - Records
pub use store::{GameState, GameStatus, Meta, MoveRecord};

// Crate-level exports - Swap2 opening
pub use opening::{Phase, Swap2State, SwapChoice};
