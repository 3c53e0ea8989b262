//! Card targeting shapes and the multi-step targeting state machine.
//!
//! A card starts in the state given by its `Targeting` shape. Each confirmed
//! target either advances the machine to a follow-on state or resolves into a
//! `ResolvedTarget` that the effect executor consumes. A rejected target
//! leaves the state unchanged.

use serde::{Deserialize, Serialize};

use crate::cards::card_catalog::CardId;
use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::status::StatusRegistry;

/// Restricts which pieces a card may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceFilter {
    Any,
    NotKing,
    NotKingOrPawn,
    PawnOnly,
    /// Kings and pawns, the pieces whose reach is counted in steps.
    StepLimited,
}

impl PieceFilter {
    #[inline]
    pub fn accepts(self, piece: &Piece) -> bool {
        match self {
            PieceFilter::Any => true,
            PieceFilter::NotKing => piece.kind != PieceKind::King,
            PieceFilter::NotKingOrPawn => {
                !matches!(piece.kind, PieceKind::King | PieceKind::Pawn)
            }
            PieceFilter::PawnOnly => piece.kind == PieceKind::Pawn,
            PieceFilter::StepLimited => matches!(piece.kind, PieceKind::King | PieceKind::Pawn),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            PieceFilter::Any => "a piece",
            PieceFilter::NotKing => "a piece other than the king",
            PieceFilter::NotKingOrPawn => "a piece other than a king or pawn",
            PieceFilter::PawnOnly => "a pawn",
            PieceFilter::StepLimited => "your king or a pawn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquareFilter {
    Any,
    /// Rows 6 and 7, the player's side of the board.
    PlayerBackRows,
}

impl SquareFilter {
    #[inline]
    pub fn accepts(self, square: Square) -> bool {
        match self {
            SquareFilter::Any => square.is_on_board(),
            SquareFilter::PlayerBackRows => square.is_on_board() && square.row >= 6,
        }
    }
}

/// Shape of the input a card needs before it can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Targeting {
    Instant,
    OwnPiece(PieceFilter),
    EnemyPiece(PieceFilter),
    AnyPiece(PieceFilter),
    EmptySquare(SquareFilter),
    TwoPieces {
        requires_adjacent: bool,
        requires_friendly: bool,
    },
    OwnPieceThenAdjacentEnemy,
    OwnPieceThenDirection,
    OwnPieceThenPromotion,
    CapturedThenEmptySquare,
}

/// Input supplied by the host while a card is being targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardTarget {
    Square(Square),
    Direction(Direction),
    Promotion(PieceKind),
    /// Index into the list of captured player pieces.
    Captured(usize),
}

/// Fully collected targets, ready for the effect executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTarget {
    None,
    Piece(PieceId),
    Square(Square),
    TwoPieces(PieceId, PieceId),
    PieceAndEnemy { mover: PieceId, enemy: PieceId },
    PieceAndDirection(PieceId, Direction),
    PieceAndKind(PieceId, PieceKind),
    Revive { captured_index: usize, square: Square },
}

/// Where a card is in its targeting flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    Idle,
    AwaitingOwnPiece {
        card: CardId,
        filter: PieceFilter,
    },
    AwaitingEnemyPiece {
        card: CardId,
        filter: PieceFilter,
    },
    AwaitingAnyPiece {
        card: CardId,
        filter: PieceFilter,
    },
    AwaitingEmptySquare {
        card: CardId,
        filter: SquareFilter,
        /// Set once Resurrect has picked which piece returns.
        revive: Option<usize>,
    },
    AwaitingTwoPieces {
        card: CardId,
        first: Option<PieceId>,
        requires_adjacent: bool,
        requires_friendly: bool,
    },
    AwaitingAdjacentEnemy {
        card: CardId,
        mover: PieceId,
    },
    AwaitingDirection {
        card: CardId,
        mover: PieceId,
    },
    AwaitingPromotionChoice {
        card: CardId,
        pawn: PieceId,
    },
    AwaitingCapturedPieceChoice {
        card: CardId,
    },
}

/// Result of feeding one target into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStep {
    Continue(CardState),
    Resolve(ResolvedTarget),
}

impl CardState {
    /// State a card enters when selected, or `None` for instant cards.
    pub fn begin(card: CardId) -> Option<CardState> {
        let state = match card.targeting() {
            Targeting::Instant => return None,
            Targeting::OwnPiece(filter) => CardState::AwaitingOwnPiece { card, filter },
            Targeting::EnemyPiece(filter) => CardState::AwaitingEnemyPiece { card, filter },
            Targeting::AnyPiece(filter) => CardState::AwaitingAnyPiece { card, filter },
            Targeting::EmptySquare(filter) => CardState::AwaitingEmptySquare {
                card,
                filter,
                revive: None,
            },
            Targeting::TwoPieces {
                requires_adjacent,
                requires_friendly,
            } => CardState::AwaitingTwoPieces {
                card,
                first: None,
                requires_adjacent,
                requires_friendly,
            },
            // The first step of every compound shape picks one of our pieces.
            Targeting::OwnPieceThenAdjacentEnemy
            | Targeting::OwnPieceThenDirection
            | Targeting::OwnPieceThenPromotion => CardState::AwaitingOwnPiece {
                card,
                filter: if card_wants_pawn(card) {
                    PieceFilter::PawnOnly
                } else {
                    PieceFilter::Any
                },
            },
            Targeting::CapturedThenEmptySquare => CardState::AwaitingCapturedPieceChoice { card },
        };
        Some(state)
    }

    pub fn card(&self) -> Option<CardId> {
        match *self {
            CardState::Idle => None,
            CardState::AwaitingOwnPiece { card, .. }
            | CardState::AwaitingEnemyPiece { card, .. }
            | CardState::AwaitingAnyPiece { card, .. }
            | CardState::AwaitingEmptySquare { card, .. }
            | CardState::AwaitingTwoPieces { card, .. }
            | CardState::AwaitingAdjacentEnemy { card, .. }
            | CardState::AwaitingDirection { card, .. }
            | CardState::AwaitingPromotionChoice { card, .. }
            | CardState::AwaitingCapturedPieceChoice { card } => Some(card),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, CardState::Idle)
    }

    /// Prompt shown to the player for the current step.
    pub fn prompt(&self) -> String {
        match *self {
            CardState::Idle => "no card in play".to_owned(),
            CardState::AwaitingOwnPiece { filter, .. } => {
                format!("choose {} of yours", filter.describe())
            }
            CardState::AwaitingEnemyPiece { filter, .. } => {
                format!("choose {} of the enemy's", filter.describe())
            }
            CardState::AwaitingAnyPiece { filter, .. } => format!("choose {}", filter.describe()),
            CardState::AwaitingEmptySquare { filter, .. } => match filter {
                SquareFilter::Any => "choose an empty square".to_owned(),
                SquareFilter::PlayerBackRows => {
                    "choose an empty square in your back two rows".to_owned()
                }
            },
            CardState::AwaitingTwoPieces { first: None, .. } => {
                "choose the first piece".to_owned()
            }
            CardState::AwaitingTwoPieces { first: Some(_), .. } => {
                "choose the second piece".to_owned()
            }
            CardState::AwaitingAdjacentEnemy { .. } => "choose an adjacent enemy".to_owned(),
            CardState::AwaitingDirection { .. } => "choose a direction".to_owned(),
            CardState::AwaitingPromotionChoice { .. } => {
                "choose knight, bishop, rook or queen".to_owned()
            }
            CardState::AwaitingCapturedPieceChoice { .. } => {
                "choose a fallen piece to return".to_owned()
            }
        }
    }

    /// Validate `target` against the current step.
    ///
    /// `Err` carries the rejection message; the caller keeps its state.
    pub fn advance(
        &self,
        target: CardTarget,
        board: &Board,
        status: &StatusRegistry,
        captured: &[PieceKind],
    ) -> Result<TargetStep, String> {
        match (*self, target) {
            (CardState::Idle, _) => Err("no card is waiting for a target".to_owned()),

            (CardState::AwaitingOwnPiece { card, filter }, CardTarget::Square(square)) => {
                let piece = piece_on(board, square)?;
                if piece.owner != Side::Player {
                    return Err("that piece is not yours".to_owned());
                }
                if !filter.accepts(piece) {
                    return Err(format!("choose {}", filter.describe()));
                }
                Ok(match card.targeting() {
                    Targeting::OwnPieceThenAdjacentEnemy => {
                        TargetStep::Continue(CardState::AwaitingAdjacentEnemy {
                            card,
                            mover: piece.id,
                        })
                    }
                    Targeting::OwnPieceThenDirection => {
                        if !status.is_actionable(piece.id) {
                            return Err("that piece cannot move".to_owned());
                        }
                        TargetStep::Continue(CardState::AwaitingDirection {
                            card,
                            mover: piece.id,
                        })
                    }
                    Targeting::OwnPieceThenPromotion => {
                        TargetStep::Continue(CardState::AwaitingPromotionChoice {
                            card,
                            pawn: piece.id,
                        })
                    }
                    _ => TargetStep::Resolve(ResolvedTarget::Piece(piece.id)),
                })
            }

            (CardState::AwaitingEnemyPiece { filter, .. }, CardTarget::Square(square)) => {
                let piece = piece_on(board, square)?;
                if piece.owner != Side::Enemy {
                    return Err("choose an enemy piece".to_owned());
                }
                if !filter.accepts(piece) {
                    return Err(format!("choose {}", filter.describe()));
                }
                Ok(TargetStep::Resolve(ResolvedTarget::Piece(piece.id)))
            }

            (CardState::AwaitingAnyPiece { filter, .. }, CardTarget::Square(square)) => {
                let piece = piece_on(board, square)?;
                if !filter.accepts(piece) {
                    return Err(format!("choose {}", filter.describe()));
                }
                Ok(TargetStep::Resolve(ResolvedTarget::Piece(piece.id)))
            }

            (
                CardState::AwaitingEmptySquare { filter, revive, .. },
                CardTarget::Square(square),
            ) => {
                if !board.is_empty(square) {
                    return Err("that square is not empty".to_owned());
                }
                if !filter.accepts(square) {
                    return Err("that square is out of range".to_owned());
                }
                Ok(TargetStep::Resolve(match revive {
                    Some(captured_index) => ResolvedTarget::Revive {
                        captured_index,
                        square,
                    },
                    None => ResolvedTarget::Square(square),
                }))
            }

            (
                CardState::AwaitingTwoPieces {
                    card,
                    first,
                    requires_adjacent,
                    requires_friendly,
                },
                CardTarget::Square(square),
            ) => {
                let piece = piece_on(board, square)?;
                if requires_friendly && piece.owner != Side::Player {
                    return Err("choose one of your pieces".to_owned());
                }
                let Some(first_id) = first else {
                    return Ok(TargetStep::Continue(CardState::AwaitingTwoPieces {
                        card,
                        first: Some(piece.id),
                        requires_adjacent,
                        requires_friendly,
                    }));
                };
                if first_id == piece.id {
                    return Err("choose a different piece".to_owned());
                }
                let first_square = board
                    .find(first_id)
                    .ok_or_else(|| "the first piece is gone".to_owned())?;
                if requires_adjacent && first_square.chebyshev(square) != 1 {
                    return Err("the pieces must be adjacent".to_owned());
                }
                Ok(TargetStep::Resolve(ResolvedTarget::TwoPieces(
                    first_id, piece.id,
                )))
            }

            (CardState::AwaitingAdjacentEnemy { mover, .. }, CardTarget::Square(square)) => {
                let piece = piece_on(board, square)?;
                let mover_square = board
                    .find(mover)
                    .ok_or_else(|| "your piece is gone".to_owned())?;
                if piece.owner != Side::Enemy || mover_square.chebyshev(square) != 1 {
                    return Err("choose an enemy next to your piece".to_owned());
                }
                Ok(TargetStep::Resolve(ResolvedTarget::PieceAndEnemy {
                    mover,
                    enemy: piece.id,
                }))
            }

            (CardState::AwaitingDirection { mover, .. }, CardTarget::Direction(direction)) => {
                if !direction.is_unit() {
                    return Err("that is not a single-step direction".to_owned());
                }
                let from = board
                    .find(mover)
                    .ok_or_else(|| "your piece is gone".to_owned())?;
                match from.step(direction) {
                    Some(to) if board.is_empty(to) => Ok(TargetStep::Resolve(
                        ResolvedTarget::PieceAndDirection(mover, direction),
                    )),
                    Some(_) => Err("that square is occupied".to_owned()),
                    None => Err("that step leaves the board".to_owned()),
                }
            }

            (CardState::AwaitingPromotionChoice { pawn, .. }, CardTarget::Promotion(kind)) => {
                if matches!(kind, PieceKind::King | PieceKind::Pawn) {
                    return Err("choose knight, bishop, rook or queen".to_owned());
                }
                Ok(TargetStep::Resolve(ResolvedTarget::PieceAndKind(pawn, kind)))
            }

            (CardState::AwaitingCapturedPieceChoice { card }, CardTarget::Captured(index)) => {
                if index >= captured.len() {
                    return Err("no fallen piece with that number".to_owned());
                }
                Ok(TargetStep::Continue(CardState::AwaitingEmptySquare {
                    card,
                    filter: SquareFilter::PlayerBackRows,
                    revive: Some(index),
                }))
            }

            (state, _) => Err(format!("expected input: {}", state.prompt())),
        }
    }
}

fn card_wants_pawn(card: CardId) -> bool {
    matches!(card.targeting(), Targeting::OwnPieceThenPromotion)
}

fn piece_on(board: &Board, square: Square) -> Result<&Piece, String> {
    if !square.is_on_board() {
        return Err("that square is off the board".to_owned());
    }
    board
        .piece_at(square)
        .ok_or_else(|| "there is no piece there".to_owned())
}
