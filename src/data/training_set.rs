use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use crate::data::mat_file::{read_matrix, write_matrix};
use crate::error::{contract, ContractViolation, Error, Result};
use crate::math::matrix::Matrix;
use crate::math::view::MatrixView;

/// Training pairs stored in one buffer: each row holds the input columns
/// immediately followed by the target columns.
///
/// [`TrainingSet::inputs`] and [`TrainingSet::targets`] are views into that
/// single allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    data: Matrix,
    input_cols: usize,
}

impl TrainingSet {
    /// Wraps `data`, treating its first `input_cols` columns as inputs and the
    /// rest as targets. At least one column must remain on each side.
    pub fn new(data: Matrix, input_cols: usize) -> TrainingSet {
        contract!(
            input_cols > 0 && input_cols < data.cols(),
            ContractViolation::OutOfBounds { op: "training split", index: input_cols, len: data.cols() }
        );
        TrainingSet { data, input_cols }
    }

    /// Copies two separately owned, row-aligned matrices into one buffer.
    pub fn from_pair<'a, 'b>(ti: impl Into<MatrixView<'a>>, to: impl Into<MatrixView<'b>>) -> TrainingSet {
        let (ti, to) = (ti.into(), to.into());
        contract!(
            ti.rows() == to.rows(),
            ContractViolation::ShapeMismatch { op: "training pair", left: ti.shape(), right: to.shape() }
        );
        let mut data = Matrix::zeros(ti.rows(), ti.cols() + to.cols());
        for i in 0..ti.rows() {
            let row = data.row_slice_mut(i);
            row[..ti.cols()].copy_from_slice(ti.row_slice(i));
            row[ti.cols()..].copy_from_slice(to.row_slice(i));
        }
        TrainingSet::new(data, ti.cols())
    }

    pub fn len(&self) -> usize {
        self.data.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_cols(&self) -> usize {
        self.input_cols
    }

    pub fn target_cols(&self) -> usize {
        self.data.cols() - self.input_cols
    }

    pub fn inputs(&self) -> MatrixView<'_> {
        self.data.columns(0, self.input_cols)
    }

    pub fn targets(&self) -> MatrixView<'_> {
        self.data.columns(self.input_cols, self.target_cols())
    }

    pub fn matrix(&self) -> &Matrix {
        &self.data
    }

    /// Writes the combined buffer as a matrix file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_matrix(&mut writer, self.data.view())?;
        info!(path = %path.display(), rows = self.len(), cols = self.data.cols(), "saved training set");
        Ok(())
    }

    /// Reads a matrix file and splits it after `input_cols` columns.
    pub fn load<P: AsRef<Path>>(path: P, input_cols: usize) -> Result<TrainingSet> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let data = read_matrix(&mut reader)?;
        if input_cols == 0 || input_cols >= data.cols() {
            return Err(Error::InvalidData(format!(
                "{} has {} columns, cannot take {input_cols} as inputs and keep a target",
                path.display(),
                data.cols()
            )));
        }
        info!(path = %path.display(), rows = data.rows(), cols = data.cols(), "loaded training set");
        Ok(TrainingSet::new(data, input_cols))
    }
}
