//! Move codes such as `e2e4` or `e7e8q` for the oracle boundary.

use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic, Orientation};

/// A move decoded from (or encoded to) a four- or five-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCode {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

pub fn move_to_long_algebraic(code: &MoveCode, orientation: Orientation) -> Result<String, String> {
    let mut out = String::with_capacity(5);
    out.push_str(&square_to_algebraic(code.from, orientation)?);
    out.push_str(&square_to_algebraic(code.to, orientation)?);
    if let Some(kind) = code.promotion {
        out.push(promotion_to_char(kind)?);
    }
    Ok(out)
}

pub fn long_algebraic_to_move(text: &str, orientation: Orientation) -> Result<MoveCode, String> {
    let text = text.trim();
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(format!("Invalid long algebraic move: {text}"));
    }

    let from = algebraic_to_square(&text[0..2], orientation)?;
    let to = algebraic_to_square(&text[2..4], orientation)?;
    if from == to {
        return Err(format!("Null move is not playable: {text}"));
    }
    let promotion = match text.as_bytes().get(4) {
        Some(ch) => Some(char_to_promotion(*ch as char)?),
        None => None,
    };

    Ok(MoveCode {
        from,
        to,
        promotion,
    })
}

fn promotion_to_char(kind: PieceKind) -> Result<char, String> {
    match kind {
        PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            Ok(kind.letter())
        }
        _ => Err(format!("Invalid promotion piece: {kind:?}")),
    }
}

fn char_to_promotion(ch: char) -> Result<PieceKind, String> {
    match ch.to_ascii_lowercase() {
        'n' => Ok(PieceKind::Knight),
        'b' => Ok(PieceKind::Bishop),
        'r' => Ok(PieceKind::Rook),
        'q' => Ok(PieceKind::Queen),
        _ => Err(format!("Invalid promotion character: {ch}")),
    }
}
