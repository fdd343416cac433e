use serde::{Deserialize, Serialize};

use crate::block::BlockKind;
use crate::WORLD_SIZE;

/// One cell of a Y-layer projection: just enough to redraw a 2D map or
/// rebuild the cell through an ordinary placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCell {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub powered: bool,
}

/// A read-only horizontal slice of the world at a fixed `y`.
///
/// `rows[z][x]`, both in `0..WORLD_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub y: i32,
    pub rows: Vec<Vec<LayerCell>>,
}

impl Layer {
    /// An all-air layer.
    pub fn empty(y: i32) -> Self {
        let w = WORLD_SIZE as usize;
        Self {
            y,
            rows: vec![vec![LayerCell::default(); w]; w],
        }
    }

    pub fn get(&self, x: i32, z: i32) -> Option<LayerCell> {
        let row = self.rows.get(usize::try_from(z).ok()?)?;
        row.get(usize::try_from(x).ok()?).copied()
    }

    /// Write a cell; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: i32, z: i32, cell: LayerCell) {
        let (Ok(x), Ok(z)) = (usize::try_from(x), usize::try_from(z)) else {
            return;
        };
        if let Some(slot) = self.rows.get_mut(z).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Iterate `(x, z, cell)` over every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, LayerCell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(z, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, cell)| (x as i32, z as i32, *cell))
        })
    }

    /// Number of non-air cells.
    pub fn occupied(&self) -> usize {
        self.cells()
            .filter(|(_, _, c)| c.kind != BlockKind::Air)
            .count()
    }
}
