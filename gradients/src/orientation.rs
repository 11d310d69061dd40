use ndarray::{arr2, Array2};
use crate::dicom_header::{DicomHeader, DicomTagId};
use crate::error::GradientError;
use crate::gradient_table::GradientTable;

/// In-plane direction cosines of an image (row and column axes in patient space)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub row:[f64;3],
    pub column:[f64;3],
}

impl Orientation {

    pub fn identity() -> Self {
        Self {
            row:[1.0, 0.0, 0.0],
            column:[0.0, 1.0, 0.0],
        }
    }

    /// from the six values of ImageOrientationPatient. Extra values are ignored.
    pub fn from_cosines(values:&[f64]) -> Result<Self,GradientError> {
        if values.len() < 6 {
            return Err(GradientError::ShapeMismatch { expected: 6, found: values.len() });
        }
        Ok(Self {
            row:[values[0], values[1], values[2]],
            column:[values[3], values[4], values[5]],
        })
    }

    pub fn from_header(header:&DicomHeader) -> Result<Self,GradientError> {
        let cosines = header.floats(DicomTagId::ImageOrientationPatient)?;
        Self::from_cosines(&cosines)
    }

    pub fn slice_normal(&self) -> [f64;3] {
        cross(&self.row, &self.column)
    }

    /// rows: row cosine, column cosine, slice normal
    pub fn matrix(&self) -> Array2<f64> {
        let n = self.slice_normal();
        arr2(&[self.row, self.column, n])
    }

    /// true when every axis is a signed standard basis vector
    pub fn is_axis_aligned(&self,tol:f64) -> bool {
        self.matrix().rows().into_iter().all(|r| {
            let n_unit = r.iter().filter(|v| (v.abs() - 1.0).abs() < tol).count();
            let n_zero = r.iter().filter(|v| v.abs() < tol).count();
            n_unit == 1 && n_zero == 2
        })
    }

    /// rotate device-space vectors into the image frame: Oᵀ·G with G the 3×N table
    pub fn to_real_world(&self,table:&GradientTable) -> GradientTable {
        let rotated = self.matrix().t().dot(&table.components());
        GradientTable::from_components(&rotated)
    }
}

fn cross(a:&[f64;3],b:&[f64;3]) -> [f64;3] {
    [
        a[1]*b[2] - a[2]*b[1],
        a[2]*b[0] - a[0]*b[2],
        a[0]*b[1] - a[1]*b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a:&[f64;3],b:&[f64;3]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x*y).sum()
    }

    #[test]
    fn slice_normal_is_orthogonal() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let cases = [
            Orientation::identity(),
            Orientation { row:[0.0, 1.0, 0.0], column:[0.0, 0.0, -1.0] },
            Orientation { row:[s, s, 0.0], column:[-s, s, 0.0] },
            Orientation { row:[0.9998477, 0.0, -0.0174524], column:[0.0, 1.0, 0.0] },
        ];
        for o in cases.iter() {
            let n = o.slice_normal();
            assert!(dot(&n, &o.row).abs() < 1e-6, "normal {:?} not orthogonal to row of {:?}", n, o);
            assert!(dot(&n, &o.column).abs() < 1e-6, "normal {:?} not orthogonal to column of {:?}", n, o);
        }
        assert_eq!(Orientation::identity().slice_normal(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn identity_leaves_table_unchanged() {
        let table = GradientTable::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.267, -0.534, 0.802],
            [-0.707, 0.0, 0.707],
        ]);
        let corrected = Orientation::identity().to_real_world(&table);
        assert_eq!(corrected, table);
    }

    #[test]
    fn sagittal_rotation() {
        // rows along +y, columns along -z, normal along -x
        let o = Orientation::from_cosines(&[0.0, 1.0, 0.0, 0.0, 0.0, -1.0]).unwrap();
        assert_eq!(o.slice_normal(), [-1.0, 0.0, 0.0]);
        let table = GradientTable::new(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let corrected = o.to_real_world(&table);
        assert_eq!(corrected.vectors(), &[[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]);
    }

    #[test]
    fn alignment_and_short_cosines() {
        assert!(Orientation::identity().is_axis_aligned(1e-6));
        let o = Orientation::from_cosines(&[0.9998477, 0.0, -0.0174524, 0.0, 1.0, 0.0]).unwrap();
        assert!(!o.is_axis_aligned(1e-6));
        match Orientation::from_cosines(&[1.0, 0.0, 0.0]) {
            Err(GradientError::ShapeMismatch { expected: 6, found: 3 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
