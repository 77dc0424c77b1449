use crate::data::training_set::TrainingSet;
use crate::error::{contract, ContractViolation};
use crate::math::matrix::Matrix;

/// The four-row XOR table: inputs `(a, b)`, target `a ^ b`.
pub fn xor() -> TrainingSet {
    let mut t = Matrix::zeros(4, 3);
    for a in 0..2usize {
        for b in 0..2usize {
            let row = t.row_slice_mut(a * 2 + b);
            row[0] = a as f64;
            row[1] = b as f64;
            row[2] = (a ^ b) as f64;
        }
    }
    TrainingSet::new(t, 2)
}

/// Every pair `(x, y)` of `bits`-bit numbers with target `x + y`.
///
/// Row `i` holds `x = i / 2^bits`, `y = i % 2^bits`. Inputs are the bits of
/// `x` then the bits of `y`, least significant first (`2·bits` columns).
/// Targets are the low `bits` bits of the sum, least significant first, plus
/// an overflow column set when `x + y >= 2^bits`.
pub fn adder(bits: usize) -> TrainingSet {
    contract!(
        (1..=12).contains(&bits),
        ContractViolation::OutOfBounds { op: "adder bits", index: bits, len: 13 }
    );
    let n = 1usize << bits;
    let mut t = Matrix::zeros(n * n, 2 * bits + bits + 1);
    for i in 0..n * n {
        let (x, y) = (i / n, i % n);
        let z = x + y;
        let row = t.row_slice_mut(i);
        for j in 0..bits {
            row[j] = ((x >> j) & 1) as f64;
            row[bits + j] = ((y >> j) & 1) as f64;
            row[2 * bits + j] = ((z >> j) & 1) as f64;
        }
        row[3 * bits] = if z >= n { 1.0 } else { 0.0 };
    }
    TrainingSet::new(t, 2 * bits)
}

/// Rounds each output at `threshold` into a 0/1 bit.
pub fn threshold(outputs: &[f64], threshold: f64) -> Vec<u8> {
    outputs.iter().map(|&v| u8::from(v >= threshold)).collect()
}

/// Reassembles a little-endian bit pattern into a number.
pub fn bits_to_number(bits: &[u8]) -> usize {
    bits.iter().enumerate().map(|(i, &b)| (b as usize) << i).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_table() {
        let set = xor();
        assert_eq!(set.len(), 4);
        let targets: Vec<f64> = set.targets().values().collect();
        assert_eq!(targets, vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(set.inputs().row_slice(2), &[1.0, 0.0]);
    }

    #[test]
    fn adder_rows_encode_sums() {
        let bits = 3;
        let set = adder(bits);
        assert_eq!(set.len(), 64);
        assert_eq!(set.input_cols(), 6);
        assert_eq!(set.target_cols(), 4);
        for i in 0..set.len() {
            let inputs = threshold(set.inputs().row_slice(i), 0.5);
            let targets = threshold(set.targets().row_slice(i), 0.5);
            let x = bits_to_number(&inputs[..bits]);
            let y = bits_to_number(&inputs[bits..]);
            assert_eq!(bits_to_number(&targets), x + y, "row {i}");
        }
    }

    #[test]
    fn threshold_rounds_at_half() {
        assert_eq!(threshold(&[0.49, 0.5, 0.9], 0.5), vec![0, 1, 1]);
        assert_eq!(bits_to_number(&[1, 0, 1]), 5);
    }
}
