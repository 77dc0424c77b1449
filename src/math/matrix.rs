use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::activation::sigmoid::sigmoid;
use crate::error::{contract, ContractViolation};
use crate::math::view::MatrixView;

/// Dense row-major `f64` matrix that owns its buffer.
///
/// Element `(r, c)` is stored at `data[r * stride + c]`. `stride` may exceed
/// `cols`, in which case the trailing elements of each row are padding and
/// never read by any operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "StoredMatrix", try_from = "StoredMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    stride: usize,
    data: Vec<f64>,
}

/// Number of elements a `rows × cols` buffer with the given stride touches.
pub(crate) fn storage_len(rows: usize, cols: usize, stride: usize) -> usize {
    (rows - 1) * stride + cols
}

impl Matrix {
    /// Allocates a zero-filled matrix. Zero dimensions or `stride < cols`
    /// are contract violations.
    pub fn alloc(rows: usize, cols: usize, stride: usize) -> Matrix {
        contract!(
            rows > 0 && cols > 0 && stride > 0,
            ContractViolation::ZeroSized { rows, cols, stride }
        );
        contract!(stride >= cols, ContractViolation::StrideTooSmall { cols, stride });
        Matrix {
            rows,
            cols,
            stride,
            data: vec![0.0; storage_len(rows, cols, stride)],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::alloc(rows, cols, cols)
    }

    /// Builds a compact matrix from row-major values.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Matrix {
        contract!(
            rows > 0 && cols > 0,
            ContractViolation::ZeroSized { rows, cols, stride: cols }
        );
        contract!(
            data.len() == rows * cols,
            ContractViolation::ShapeMismatch { op: "from_vec", left: (rows, cols), right: (data.len(), 1) }
        );
        Matrix { rows, cols, stride: cols, data }
    }

    /// Builds a compact matrix from a list of equally long rows.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        for (i, row) in data.iter().enumerate() {
            contract!(
                row.len() == cols,
                ContractViolation::ShapeMismatch { op: "from_data", left: (i, row.len()), right: (rows, cols) }
            );
        }
        Matrix::from_vec(rows, cols, data.into_iter().flatten().collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn view(&self) -> MatrixView<'_> {
        MatrixView::new(self.rows, self.cols, self.stride, &self.data)
    }

    pub fn row(&self, i: usize) -> MatrixView<'_> {
        self.view().row(i)
    }

    pub fn columns(&self, start: usize, count: usize) -> MatrixView<'_> {
        self.view().columns(start, count)
    }

    pub fn row_slice(&self, i: usize) -> &[f64] {
        self.view().row_slice(i)
    }

    pub fn row_slice_mut(&mut self, i: usize) -> &mut [f64] {
        contract!(
            i < self.rows,
            ContractViolation::OutOfBounds { op: "row_slice_mut", index: i, len: self.rows }
        );
        let start = i * self.stride;
        &mut self.data[start..start + self.cols]
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.view().values()
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        let cols = self.cols;
        self.data
            .chunks_mut(self.stride)
            .flat_map(move |row| row[..cols].iter_mut())
    }

    fn check_same_shape(&self, op: &'static str, other: &MatrixView<'_>) {
        contract!(
            self.shape() == other.shape(),
            ContractViolation::ShapeMismatch { op, left: self.shape(), right: other.shape() }
        );
    }

    pub fn fill(&mut self, value: f64) {
        self.values_mut().for_each(|x| *x = value);
    }

    /// Sets every element to a uniform sample from `[low, high)`.
    pub fn randomise<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) {
        contract!(low < high, ContractViolation::EmptyRange { low, high });
        self.values_mut().for_each(|x| *x = rng.gen_range(low..high));
    }

    /// Overwrites `self` with the product `a · b`.
    pub fn multiply<'a, 'b>(&mut self, a: impl Into<MatrixView<'a>>, b: impl Into<MatrixView<'b>>) {
        let (a, b) = (a.into(), b.into());
        contract!(
            a.cols() == b.rows(),
            ContractViolation::ShapeMismatch { op: "multiply", left: a.shape(), right: b.shape() }
        );
        contract!(
            self.rows == a.rows() && self.cols == b.cols(),
            ContractViolation::ShapeMismatch { op: "multiply", left: self.shape(), right: (a.rows(), b.cols()) }
        );

        for i in 0..self.rows {
            let a_row = a.row_slice(i);
            let out = self.row_slice_mut(i);
            for (j, cell) in out.iter_mut().enumerate() {
                let mut sum = 0.0;
                for (k, &x) in a_row.iter().enumerate() {
                    sum += x * b.at(k, j);
                }
                *cell = sum;
            }
        }
    }

    /// Elementwise `self += other`.
    pub fn add<'a>(&mut self, other: impl Into<MatrixView<'a>>) {
        self.add_scaled(other, 1.0);
    }

    /// Elementwise `self += factor * other`.
    pub fn add_scaled<'a>(&mut self, other: impl Into<MatrixView<'a>>, factor: f64) {
        let other = other.into();
        self.check_same_shape("add", &other);
        for (x, y) in self.values_mut().zip(other.values()) {
            *x += factor * y;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.values_mut().for_each(|x| *x *= factor);
    }

    /// Applies the logistic sigmoid to every element in place.
    pub fn sigmoid(&mut self) {
        self.values_mut().for_each(|x| *x = sigmoid(*x));
    }

    pub fn copy_from<'a>(&mut self, src: impl Into<MatrixView<'a>>) {
        let src = src.into();
        self.check_same_shape("copy", &src);
        for (x, y) in self.values_mut().zip(src.values()) {
            *x = y;
        }
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        contract!(
            row < self.rows,
            ContractViolation::OutOfBounds { op: "index", index: row, len: self.rows }
        );
        contract!(
            col < self.cols,
            ContractViolation::OutOfBounds { op: "index", index: col, len: self.cols }
        );
        row * self.stride + col
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let at = self.offset(row, col);
        &mut self.data[at]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in self.view().row_slices() {
            write!(f, "   ")?;
            for x in row {
                write!(f, " {x:>10.6}")?;
            }
            writeln!(f)?;
        }
        write!(f, "]")
    }
}

/// On-disk JSON shape of a matrix: compact, no stride.
#[derive(Clone, Serialize, Deserialize)]
struct StoredMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl From<Matrix> for StoredMatrix {
    fn from(m: Matrix) -> Self {
        StoredMatrix {
            rows: m.rows,
            cols: m.cols,
            data: m.values().collect(),
        }
    }
}

impl TryFrom<StoredMatrix> for Matrix {
    type Error = String;

    fn try_from(s: StoredMatrix) -> Result<Self, Self::Error> {
        if s.rows == 0 || s.cols == 0 {
            return Err(format!("matrix has zero size {}x{}", s.rows, s.cols));
        }
        if s.data.len() != s.rows * s.cols {
            return Err(format!(
                "matrix {}x{} carries {} values",
                s.rows,
                s.cols,
                s.data.len()
            ));
        }
        Ok(Matrix { rows: s.rows, cols: s.cols, stride: s.cols, data: s.data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn alloc_is_zeroed_and_respects_stride() {
        let m = Matrix::alloc(3, 2, 5);
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.stride(), 5);
        assert!(m.values().all(|x| x == 0.0));
        assert_eq!(m.values().count(), 6);
    }

    #[test]
    #[should_panic(expected = "zero-sized")]
    fn alloc_zero_rows_is_fatal() {
        Matrix::alloc(0, 3, 3);
    }

    #[test]
    #[should_panic(expected = "stride")]
    fn alloc_short_stride_is_fatal() {
        Matrix::alloc(2, 3, 2);
    }

    #[test]
    fn fill_skips_padding() {
        let mut m = Matrix::alloc(2, 2, 3);
        m.fill(7.0);
        assert_eq!(m.values().collect::<Vec<_>>(), vec![7.0; 4]);
        assert_eq!(m.data[2], 0.0);
    }

    #[test]
    fn multiply_computes_dot_products() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0, 6.0, 7.0], vec![8.0, 9.0, 10.0]]);
        let mut dest = Matrix::zeros(2, 3);
        dest.fill(100.0);
        dest.multiply(&a, &b);
        assert_eq!(dest.row_slice(0), &[21.0, 24.0, 27.0]);
        assert_eq!(dest.row_slice(1), &[47.0, 54.0, 61.0]);
    }

    #[test]
    fn multiply_accepts_row_views() {
        let t = Matrix::from_data(vec![vec![1.0, 0.0, 9.0], vec![0.0, 1.0, 9.0]]);
        let w = Matrix::from_data(vec![vec![2.0], vec![3.0]]);
        let mut out = Matrix::zeros(1, 1);
        out.multiply(t.columns(0, 2).row(1), &w);
        assert_eq!(out[(0, 0)], 3.0);
    }

    #[test]
    #[should_panic(expected = "multiply")]
    fn multiply_shape_mismatch_is_fatal() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        let mut dest = Matrix::zeros(2, 3);
        dest.multiply(&a, &b);
    }

    #[test]
    fn add_and_copy() {
        let mut m = Matrix::from_data(vec![vec![1.0, 2.0]]);
        let b = Matrix::from_data(vec![vec![0.5, -1.0]]);
        m.add(&b);
        assert_eq!(m.row_slice(0), &[1.5, 1.0]);
        m.copy_from(&b);
        assert_eq!(m, b);
    }

    #[test]
    #[should_panic(expected = "add")]
    fn add_shape_mismatch_is_fatal() {
        let mut m = Matrix::zeros(1, 2);
        m.add(&Matrix::zeros(2, 1));
    }

    #[test]
    fn sigmoid_is_elementwise() {
        let mut m = Matrix::from_data(vec![vec![0.0, 2.0]]);
        m.sigmoid();
        assert_abs_diff_eq!(m[(0, 0)], 0.5);
        assert_abs_diff_eq!(m[(0, 1)], 1.0 / (1.0 + (-2.0f64).exp()));
    }

    #[test]
    fn row_views_share_storage() {
        let mut m = Matrix::zeros(3, 2);
        m[(1, 0)] = 4.0;
        m[(1, 1)] = 5.0;
        assert_eq!(m.row(1).row_slice(0), &[4.0, 5.0]);
    }

    #[test]
    fn json_drops_padding() {
        let mut m = Matrix::alloc(2, 2, 4);
        m.fill(1.5);
        let json = serde_json::to_string(&m).unwrap();
        let back: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stride(), 2);
        assert_eq!(back.values().collect::<Vec<_>>(), vec![1.5; 4]);
    }

    #[test]
    fn json_rejects_short_payload() {
        let err = serde_json::from_str::<Matrix>(r#"{"rows":2,"cols":2,"data":[1.0]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn display_lists_rows() {
        let m = Matrix::from_data(vec![vec![1.0], vec![2.0]]);
        let text = m.to_string();
        assert!(text.starts_with('['));
        assert_eq!(text.lines().count(), 4);
    }

    proptest! {
        #[test]
        fn randomise_stays_in_range(seed: u64, low in -10.0f64..10.0, width in 1e-3f64..10.0) {
            let high = low + width;
            let mut rng = StdRng::seed_from_u64(seed);
            let mut m = Matrix::alloc(4, 3, 5);
            m.randomise(&mut rng, low, high);
            for x in m.values() {
                prop_assert!(x >= low && x < high);
            }
        }
    }
}
