use crate::error::{contract, ContractViolation};
use crate::math::matrix::{storage_len, Matrix};

/// A borrowed, non-owning window onto a matrix buffer.
///
/// Element `(r, c)` lives at `data[r * stride + c]`. A view never owns its
/// storage, so it cannot be released on its own and cannot outlive the
/// `Matrix` it was cut from. Splitting one training buffer into an
/// inputs view and a targets view is done with [`MatrixView::columns`].
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    rows: usize,
    cols: usize,
    stride: usize,
    data: &'a [f64],
}

impl<'a> MatrixView<'a> {
    pub(crate) fn new(rows: usize, cols: usize, stride: usize, data: &'a [f64]) -> MatrixView<'a> {
        contract!(
            rows > 0 && cols > 0 && stride > 0,
            ContractViolation::ZeroSized { rows, cols, stride }
        );
        contract!(stride >= cols, ContractViolation::StrideTooSmall { cols, stride });
        let len = storage_len(rows, cols, stride);
        contract!(
            data.len() >= len,
            ContractViolation::OutOfBounds { op: "view", index: len, len: data.len() }
        );
        MatrixView { rows, cols, stride, data: &data[..len] }
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

    pub fn at(&self, row: usize, col: usize) -> f64 {
        contract!(
            row < self.rows,
            ContractViolation::OutOfBounds { op: "at", index: row, len: self.rows }
        );
        contract!(
            col < self.cols,
            ContractViolation::OutOfBounds { op: "at", index: col, len: self.cols }
        );
        self.data[row * self.stride + col]
    }

    /// 1×cols view of row `i`, sharing storage and stride with `self`.
    pub fn row(&self, i: usize) -> MatrixView<'a> {
        contract!(
            i < self.rows,
            ContractViolation::OutOfBounds { op: "row", index: i, len: self.rows }
        );
        let start = i * self.stride;
        MatrixView {
            rows: 1,
            cols: self.cols,
            stride: self.stride,
            data: &self.data[start..start + self.cols],
        }
    }

    /// View of `count` consecutive columns starting at `start`, keeping the
    /// original stride.
    pub fn columns(&self, start: usize, count: usize) -> MatrixView<'a> {
        contract!(
            count > 0 && start + count <= self.cols,
            ContractViolation::OutOfBounds { op: "columns", index: start + count, len: self.cols }
        );
        MatrixView::new(self.rows, count, self.stride, &self.data[start..])
    }

    /// The `cols` contiguous elements of row `i`.
    pub fn row_slice(&self, i: usize) -> &'a [f64] {
        contract!(
            i < self.rows,
            ContractViolation::OutOfBounds { op: "row_slice", index: i, len: self.rows }
        );
        let start = i * self.stride;
        &self.data[start..start + self.cols]
    }

    pub fn row_slices(&self) -> impl Iterator<Item = &'a [f64]> {
        let view = *self;
        (0..view.rows).map(move |i| view.row_slice(i))
    }

    /// Every element in row-major order, skipping stride padding.
    pub fn values(&self) -> impl Iterator<Item = f64> + 'a {
        self.row_slices().flat_map(|row| row.iter().copied())
    }

    /// Compact owned copy (stride == cols).
    pub fn to_matrix(&self) -> Matrix {
        let mut m = Matrix::zeros(self.rows, self.cols);
        m.copy_from(*self);
        m
    }
}

impl<'a> From<&'a Matrix> for MatrixView<'a> {
    fn from(m: &'a Matrix) -> Self {
        m.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> Matrix {
        Matrix::from_data(vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn columns_split_shares_the_buffer() {
        let t = table();
        let ti = t.columns(0, 2);
        let to = t.columns(2, 1);
        assert_eq!(ti.shape(), (4, 2));
        assert_eq!(to.shape(), (4, 1));
        assert_eq!(ti.stride(), 3);
        assert_eq!(to.stride(), 3);
        assert_eq!(ti.row_slice(2), &[1.0, 0.0]);
        assert_eq!(to.row_slice(2), &[1.0]);
        assert_eq!(to.values().collect::<Vec<_>>(), vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn row_keeps_stride() {
        let t = table();
        let r = t.columns(1, 2).row(3);
        assert_eq!(r.shape(), (1, 2));
        assert_eq!(r.stride(), 3);
        assert_eq!(r.at(0, 0), 1.0);
        assert_eq!(r.at(0, 1), 0.0);
    }

    #[test]
    fn to_matrix_compacts_stride() {
        let t = table();
        let m = t.columns(1, 2).to_matrix();
        assert_eq!(m.stride(), 2);
        assert_eq!(m.row_slice(1), &[1.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "row")]
    fn row_out_of_bounds_is_fatal() {
        table().row(4);
    }

    #[test]
    #[should_panic(expected = "columns")]
    fn columns_past_the_edge_are_fatal() {
        table().columns(2, 2);
    }

    proptest! {
        #[test]
        fn column_views_agree_with_owner(
            rows in 1usize..6,
            cols in 1usize..6,
            pad in 0usize..3,
            split in 0usize..6,
        ) {
            let mut m = Matrix::alloc(rows, cols, cols + pad);
            for r in 0..rows {
                for c in 0..cols {
                    m[(r, c)] = (r * 10 + c) as f64;
                }
            }
            let split = split % cols;
            let right = m.columns(split, cols - split);
            for r in 0..rows {
                for c in 0..cols - split {
                    prop_assert_eq!(right.at(r, c), m[(r, split + c)]);
                }
            }
        }
    }
}
