//! Binary matrix files.
//!
//! Layout, all little-endian:
//! - 8 bytes magic `FNNMAT\0\x01`
//! - `rows: u64`, `cols: u64`
//! - `rows * cols` values as `f64`, row-major, no stride padding

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::math::view::MatrixView;

const MAGIC: &[u8; 8] = b"FNNMAT\0\x01";

pub fn write_matrix<W: Write>(writer: &mut W, m: MatrixView<'_>) -> io::Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&(m.rows() as u64).to_le_bytes())?;
    writer.write_all(&(m.cols() as u64).to_le_bytes())?;
    for x in m.values() {
        writer.write_all(&x.to_le_bytes())?;
    }
    writer.flush()
}

pub fn read_matrix<R: Read>(reader: &mut R) -> Result<Matrix> {
    let mut magic = [0u8; 8];
    read_exact(reader, &mut magic, "magic")?;
    if &magic != MAGIC {
        return Err(Error::InvalidData("not a matrix file: magic bytes mismatch".into()));
    }

    let rows = read_u64(reader, "row count")?;
    let cols = read_u64(reader, "column count")?;
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidData(format!("matrix file declares {rows}x{cols}")));
    }
    let len = rows
        .checked_mul(cols)
        .ok_or_else(|| Error::InvalidData(format!("matrix file declares {rows}x{cols}")))?;

    let mut data = Vec::with_capacity(len.min(1 << 20));
    let mut buf = [0u8; 8];
    for _ in 0..len {
        read_exact(reader, &mut buf, "matrix payload")?;
        data.push(f64::from_le_bytes(buf));
    }
    Ok(Matrix::from_vec(rows, cols, data))
}

fn read_u64<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf, what)?;
    usize::try_from(u64::from_le_bytes(buf))
        .map_err(|_| Error::InvalidData(format!("{what} does not fit in memory")))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::InvalidData(format!("truncated matrix file while reading {what}")),
        _ => Error::Io(e),
    })
}
