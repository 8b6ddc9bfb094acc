use monopack::{
    pack,
    test_support::checkerboard,
    BitGrid, PackMode, PackedBitmap,
};
use pretty_assertions::assert_eq;

/// Deterministic pseudo-random grid (xorshift), so failures are reproducible.
fn noise(width: usize, height: usize, seed: u32) -> BitGrid {
    let mut state = seed.max(1);
    BitGrid::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state & 1 == 1
    })
}

#[test]
fn row_padded_round_trip() {
    for size in 1..=24 {
        for seed in [1, 7, 0xDEAD_BEEF] {
            let grid = noise(size, size + 3, seed);
            let packed = pack(&grid, PackMode::RowPadded).unwrap();
            assert_eq!(packed.as_bytes().len(), size.div_ceil(8) * (size + 3));
            assert_eq!(packed.unpack(), grid, "size {size} seed {seed}");
        }
    }
}

#[test]
fn fixed16_round_trip() {
    for grid in [noise(16, 16, 42), checkerboard(16, 16), BitGrid::filled(16, 16, false)] {
        let packed = pack(&grid, PackMode::Fixed16).unwrap();
        assert_eq!(packed.as_bytes().len(), 32);
        assert_eq!(packed.unpack(), grid);
        let reloaded =
            PackedBitmap::from_bytes(packed.as_bytes().to_vec(), 16, 16, PackMode::Fixed16).unwrap();
        assert_eq!(reloaded.unpack(), grid);
    }
}

#[test]
fn fixed16_all_on_is_all_ff() {
    let packed = pack(&BitGrid::filled(16, 16, true), PackMode::Fixed16).unwrap();
    assert_eq!(packed.as_bytes(), &[0xFF; 32][..]);
}

#[test]
fn row_padded_64_all_off_is_all_zero() {
    let packed = pack(&BitGrid::filled(64, 64, false), PackMode::RowPadded).unwrap();
    assert_eq!(packed.as_bytes().len(), 512);
    assert!(packed.as_bytes().iter().all(|b| *b == 0));
}

#[test]
fn padding_bits_stay_clear() {
    let packed = pack(&BitGrid::filled(20, 20, true), PackMode::RowPadded).unwrap();
    assert_eq!(packed.stride(), 3);
    assert_eq!(packed.as_bytes().len(), 60);
    for row in packed.as_bytes().chunks(3) {
        assert_eq!(row, &[0xFF, 0xFF, 0xF0]);
    }
}

#[test]
fn checkerboard_bytes() {
    let packed = pack(&checkerboard(16, 2), PackMode::RowPadded).unwrap();
    assert_eq!(packed.as_bytes(), &[0xAA, 0xAA, 0x55, 0x55]);
}

#[test]
fn fixed16_and_row_padded_agree_on_16_wide() {
    let grid = noise(16, 16, 99);
    let fixed = pack(&grid, PackMode::Fixed16).unwrap();
    let padded = pack(&grid, PackMode::RowPadded).unwrap();
    assert_eq!(fixed.as_bytes(), padded.as_bytes());
}
