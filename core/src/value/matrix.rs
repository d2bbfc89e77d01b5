//! Opaque numeric buffer.
//!
//! The tree never interprets matrix contents; it only carries them. A matrix
//! is copied whole whenever the value holding it is cloned.

use std::fmt;

use serde::{Deserialize, Serialize};


/// Element kind of a matrix buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    U8,
    I32,
    F32,
    #[default]
    F64,
}

impl MatrixKind {
    pub fn element_size(&self) -> usize {
        match self {
            MatrixKind::U8 => 1,
            MatrixKind::I32 | MatrixKind::F32 => 4,
            MatrixKind::F64 => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixKind::U8 => "u8",
            MatrixKind::I32 => "i32",
            MatrixKind::F32 => "f32",
            MatrixKind::F64 => "f64",
        }
    }
}


/// Rows x cols buffer of raw elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    kind: MatrixKind,
    data: Vec<u8>,
}

impl Matrix {
    /// Zero-filled matrix. Fails when the shape does not fit in memory.
    pub fn zeros(rows: usize, cols: usize, kind: MatrixKind) -> Result<Self, String> {
        let size = byte_len(rows, cols, kind)?;
        Ok(Matrix {
            rows,
            cols,
            kind,
            data: vec![0; size],
        })
    }

    /// Wrap an existing buffer. Fails when the byte length does not match
    /// the declared shape.
    pub fn from_bytes(
        rows: usize,
        cols: usize,
        kind: MatrixKind,
        data: Vec<u8>,
    ) -> Result<Self, String> {
        let expected = byte_len(rows, cols, kind)?;
        if data.len() != expected {
            return Err(format!(
                "matrix {}x{} {} needs {} bytes, got {}",
                rows,
                cols,
                kind.as_str(),
                expected,
                data.len()
            ));
        }
        Ok(Matrix {
            rows,
            cols,
            kind,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// Number of elements. Constructors bound the shape, so this cannot
    /// overflow.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

fn byte_len(rows: usize, cols: usize, kind: MatrixKind) -> Result<usize, String> {
    rows.checked_mul(cols)
        .and_then(|n| n.checked_mul(kind.element_size()))
        .ok_or_else(|| format!("matrix {}x{} {} is too large", rows, cols, kind.as_str()))
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Matrix {}x{} {}>", self.rows, self.cols, self.kind.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_sizes_buffer() {
        let m = Matrix::zeros(2, 3, MatrixKind::F32).unwrap();
        assert_eq!(m.len(), 6);
        assert_eq!(m.as_bytes().len(), 24);
        assert_eq!(m.to_string(), "<Matrix 2x3 f32>");
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(Matrix::from_bytes(2, 2, MatrixKind::U8, vec![1, 2, 3, 4]).is_ok());
        let err = Matrix::from_bytes(2, 2, MatrixKind::I32, vec![0; 4]).unwrap_err();
        assert!(err.contains("needs 16 bytes"));
    }

    #[test]
    fn overflowing_shape_is_an_error() {
        let err = Matrix::from_bytes(usize::MAX / 2, 3, MatrixKind::U8, vec![]).unwrap_err();
        assert!(err.contains("too large"));
        assert!(Matrix::zeros(usize::MAX, 2, MatrixKind::F64).is_err());
        assert!(Matrix::zeros(usize::MAX / 4, 1, MatrixKind::I32).is_err());
    }

    #[test]
    fn default_is_empty() {
        let m = Matrix::default();
        assert!(m.is_empty());
        assert_eq!(m.kind(), MatrixKind::F64);
    }
}
