use cozy_chess::{Board as CozyBoard, File, Move, Piece, Square};
use crate::error::BridgeError;

#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default() }
    }

    /// Parses a FEN. Four-field FENs (no move counters) get `0 1` appended.
    pub fn from_fen(fen: &str) -> Result<Self, BridgeError> {
        let fen = fen.trim();
        if fen.is_empty() { return Err(BridgeError::InvalidFen("empty position string".into())); }
        let owned;
        let full = if fen.split_whitespace().count() == 4 { owned = format!("{fen} 0 1"); owned.as_str() } else { fen };
        CozyBoard::from_fen(full, false)
            .map(|b| Self { board: b })
            .map_err(|e| BridgeError::InvalidFen(format!("{fen} ({e:?})")))
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn legal_moves(&self) -> Vec<Move> { legal_moves(&self.board) }

    pub fn legal_moves_count(&self) -> usize {
        let mut ct = 0usize;
        self.board.generate_moves(|moves| { ct += moves.len(); false });
        ct
    }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn is_checkmate(&self) -> bool { self.in_check() && self.legal_moves_count() == 0 }
}

pub fn legal_moves(board: &CozyBoard) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    board.generate_moves(|ml| { out.extend(ml); false });
    out
}

/// UCI text for `mv`. Castling is printed as the king's two-square step
/// rather than the king-takes-rook form used internally.
pub fn uci_move(board: &CozyBoard, mv: Move) -> String {
    let stm = board.side_to_move();
    if board.piece_on(mv.from) == Some(Piece::King) && board.color_on(mv.to) == Some(stm) {
        let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
        let to = Square::new(file, mv.from.rank());
        return format!("{}{}", mv.from, to);
    }
    format!("{}", mv)
}
