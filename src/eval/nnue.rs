use cozy_chess::{Board, Color, Piece, Square};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use anyhow::{bail, ensure, Context, Result};
use crate::search::eval::{material_eval_cp_side_agnostic, MATE_BOUND};

const MAGIC: &[u8; 8] = b"PIENNUE1";
/// Piece counts for each side.
pub const COUNT_INPUTS: usize = 12;
/// One-hot piece-square planes, side-to-move relative.
pub const PSQ_INPUTS: usize = 2 * 6 * 64;
const MAX_HIDDEN: usize = 4096;
/// Material imbalance beyond which the small network is preferred.
pub const SMALL_NET_THRESHOLD: i32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NnueMeta {
    pub version: u32,
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub output_dim: usize,
}

/// Float network: one ReLU hidden layer and a scalar head producing centipawns
/// for the side to move.
#[derive(Debug, Clone)]
pub struct Nnue {
    pub meta: NnueMeta,
    source: PathBuf,
    w1: Vec<f32>, // hidden_dim x input_dim
    b1: Vec<f32>, // hidden_dim
    w2: Vec<f32>, // hidden_dim
    b2: f32,
}

impl Nnue {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Format:
        // magic: 8 bytes b"PIENNUE1"
        // u32 version, u32 input_dim, u32 hidden_dim, u32 output_dim (LE)
        // f32 w1[hidden_dim * input_dim], b1[hidden_dim], w2[hidden_dim], b2[1]
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open nnue file: {}", path.display()))?;
        let mut r = BufReader::new(f);
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic).context("read magic")?;
        if &magic != MAGIC { bail!("bad NNUE magic in {}", path.display()); }
        let version = read_u32(&mut r).context("read version")?;
        let input_dim = read_u32(&mut r).context("read input_dim")? as usize;
        let hidden_dim = read_u32(&mut r).context("read hidden_dim")? as usize;
        let output_dim = read_u32(&mut r).context("read output_dim")? as usize;
        ensure!(input_dim == COUNT_INPUTS || input_dim == PSQ_INPUTS, "unsupported input_dim {input_dim}");
        ensure!(hidden_dim > 0 && hidden_dim <= MAX_HIDDEN, "unsupported hidden_dim {hidden_dim}");
        ensure!(output_dim == 1, "unsupported output_dim {output_dim}");
        let w1 = read_f32s(&mut r, hidden_dim * input_dim).context("read w1")?;
        let b1 = read_f32s(&mut r, hidden_dim).context("read b1")?;
        let w2 = read_f32s(&mut r, hidden_dim).context("read w2")?;
        let b2 = read_f32s(&mut r, 1).context("read b2")?[0];
        Ok(Self {
            meta: NnueMeta { version, input_dim, hidden_dim, output_dim },
            source: path.to_path_buf(),
            w1, b1, w2, b2,
        })
    }

    pub fn source(&self) -> &Path { &self.source }

    pub fn evaluate(&self, board: &Board) -> i32 {
        let n = self.meta.input_dim;
        let h = self.meta.hidden_dim;
        let mut out = self.b2;
        if n == COUNT_INPUTS {
            let x = piece_counts(board);
            for j in 0..h {
                let row = &self.w1[j * n..(j + 1) * n];
                let sum = self.b1[j] + row.iter().zip(&x).map(|(w, v)| w * v).sum::<f32>();
                out += self.w2[j] * sum.max(0.0);
            }
        } else {
            let active = psq_indices(board);
            for j in 0..h {
                let row = &self.w1[j * n..(j + 1) * n];
                let sum = self.b1[j] + active.iter().map(|&i| row[i]).sum::<f32>();
                out += self.w2[j] * sum.max(0.0);
            }
        }
        // Keep network output out of the mate range.
        (out.round() as i32).clamp(-(MATE_BOUND - 1), MATE_BOUND - 1)
    }
}

fn read_u32(r: &mut impl Read) -> std::io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_f32s(r: &mut impl Read, n: usize) -> std::io::Result<Vec<f32>> {
    let mut buf = vec![0u8; n * 4];
    r.read_exact(&mut buf)?;
    Ok(buf.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

fn perspective(board: &Board) -> (Color, Color) {
    let us = board.side_to_move();
    (us, !us)
}

fn piece_counts(board: &Board) -> [f32; COUNT_INPUTS] {
    let (us, them) = perspective(board);
    let mut out = [0f32; COUNT_INPUTS];
    for (i, &p) in Piece::ALL.iter().enumerate() {
        out[i] = (board.pieces(p) & board.colors(us)).len() as f32;
        out[6 + i] = (board.pieces(p) & board.colors(them)).len() as f32;
    }
    out
}

fn relative_square(us: Color, sq: Square) -> usize {
    let idx = sq as usize;
    if us == Color::White { idx } else { idx ^ 56 }
}

fn psq_indices(board: &Board) -> Vec<usize> {
    let (us, them) = perspective(board);
    let mut out = Vec::with_capacity(32);
    for (side_off, color) in [(0usize, us), (1usize, them)] {
        for (pi, &p) in Piece::ALL.iter().enumerate() {
            for sq in board.pieces(p) & board.colors(color) {
                out.push((side_off * 6 + pi) * 64 + relative_square(us, sq));
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetTier {
    Main,
    Small,
}

impl std::fmt::Display for NetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self { NetTier::Main => "main", NetTier::Small => "small" })
    }
}

/// The networks held by a session: at most one per tier.
#[derive(Debug, Clone, Default)]
pub struct NetworkSet {
    main: Option<Nnue>,
    small: Option<Nnue>,
}

impl NetworkSet {
    pub fn set(&mut self, tier: NetTier, net: Nnue) {
        match tier {
            NetTier::Main => self.main = Some(net),
            NetTier::Small => self.small = Some(net),
        }
    }

    pub fn get(&self, tier: NetTier) -> Option<&Nnue> {
        match tier {
            NetTier::Main => self.main.as_ref(),
            NetTier::Small => self.small.as_ref(),
        }
    }

    pub fn loaded(&self) -> usize { self.main.is_some() as usize + self.small.is_some() as usize }

    pub fn is_empty(&self) -> bool { self.loaded() == 0 }

    pub fn clear(&mut self) { *self = Self::default(); }

    /// Picks the network for `board`: small for lopsided material, main
    /// otherwise, whichever exists as fallback.
    pub fn select(&self, board: &Board) -> Option<&Nnue> {
        let lopsided = material_eval_cp_side_agnostic(board).abs() >= SMALL_NET_THRESHOLD;
        let (first, second) = if lopsided { (&self.small, &self.main) } else { (&self.main, &self.small) };
        first.as_ref().or(second.as_ref())
    }

    pub fn evaluate(&self, board: &Board) -> Option<i32> { self.select(board).map(|n| n.evaluate(board)) }
}
