//! Conversion between wells and microscope tiles.
//!
//! 'Tile000001' is the prefix with which the Surveyor microscope
//! software saves images (Tile000001.bmp); the same prefix names the
//! corresponding DevStaR output (Tile000001res.png, Tile000001cnt.txt).
//!
//! Tiles are numbered in the "snake" order in which the scopes image a
//! plate, back and forth along each row:
//!
//! ```text
//! A01, A02, ..., A12, B12, B11, ..., B01, C01, ...
//! ```

use crate::error::{NemascreenError, Result};
use crate::wells::{parse_well, well_name, NUM_COLS_96, ROWS_96};

const BACKWARDS_ROWS: [char; 4] = ['B', 'D', 'F', 'H'];

/// Convert a well (e.g. "B05") to a tile (e.g. "Tile000020").
pub fn well_to_tile(well: &str) -> Result<String> {
    let index = well_to_index(well)?;
    Ok(index_to_tile(index))
}

/// Convert a tile (e.g. "Tile000020") to a well (e.g. "B05").
pub fn tile_to_well(tile: &str) -> Result<String> {
    let index = tile_to_index(tile)?;
    Ok(index_to_well(index))
}

/// Convert a well to its 0-indexed position in snake order.
fn well_to_index(well: &str) -> Result<u32> {
    let (row, column) = parse_well(well)?;

    let position_from_left = u32::from(column - 1);
    let min_row_index = (row as u32 - 'A' as u32) * u32::from(NUM_COLS_96);

    let index_in_row = if BACKWARDS_ROWS.contains(&row) {
        u32::from(NUM_COLS_96) - 1 - position_from_left
    } else {
        position_from_left
    };

    Ok(min_row_index + index_in_row)
}

fn index_to_tile(index: u32) -> String {
    format!("Tile0000{:02}", index + 1)
}

fn tile_to_index(tile: &str) -> Result<u32> {
    let number: u32 = tile
        .strip_prefix("Tile0000")
        .and_then(|rest| rest.get(..2))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| NemascreenError::InvalidTile(tile.to_string()))?;

    if number < 1 || number > 96 {
        return Err(NemascreenError::InvalidTile(tile.to_string()));
    }

    Ok(number - 1)
}

fn index_to_well(index: u32) -> String {
    let row = ROWS_96[(index / u32::from(NUM_COLS_96)) as usize];
    let index_in_row = (index % u32::from(NUM_COLS_96)) as u8;

    let position_from_left = if BACKWARDS_ROWS.contains(&row) {
        NUM_COLS_96 - 1 - index_in_row
    } else {
        index_in_row
    };

    well_name(row, position_from_left + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_to_tile_forward_row() {
        assert_eq!(well_to_tile("A01").unwrap(), "Tile000001");
        assert_eq!(well_to_tile("A12").unwrap(), "Tile000012");
    }

    #[test]
    fn test_well_to_tile_backwards_row() {
        // Row B snakes right to left: B12 is tile 13, B05 is tile 20.
        assert_eq!(well_to_tile("B12").unwrap(), "Tile000013");
        assert_eq!(well_to_tile("B05").unwrap(), "Tile000020");
        assert_eq!(well_to_tile("B01").unwrap(), "Tile000024");
    }

    #[test]
    fn test_tile_to_well() {
        assert_eq!(tile_to_well("Tile000001").unwrap(), "A01");
        assert_eq!(tile_to_well("Tile000020").unwrap(), "B05");
        assert_eq!(tile_to_well("Tile000096").unwrap(), "H01");
    }

    #[test]
    fn test_round_trip_all_wells() {
        for well in crate::wells::well_list_96() {
            let tile = well_to_tile(&well).unwrap();
            assert_eq!(tile_to_well(&tile).unwrap(), well);
        }
    }

    #[test]
    fn test_rejects_bad_tiles() {
        for bad in ["Tile000000", "Tile000097", "Til000001", "Tile0000", ""] {
            assert!(tile_to_well(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_rejects_bad_wells() {
        assert!(well_to_tile("Z01").is_err());
        assert!(well_to_tile("A13").is_err());
    }
}
