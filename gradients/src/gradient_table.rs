use std::path::Path;
use ndarray::Array2;
use crate::error::GradientError;

/// decimals written per gradient component
pub const TABLE_DECIMALS:usize = 12;

/// One b-vector per volume, in volume order.
///
/// On disk a table is three lines (x, y and z components) of N numbers each, the layout
/// dcm2nii writes and the Anima tools read.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientTable {
    vectors:Vec<[f64;3]>,
}

impl GradientTable {

    pub fn new(vectors:Vec<[f64;3]>) -> Self {
        Self { vectors }
    }

    /// from a 3×N component matrix
    pub fn from_components(components:&Array2<f64>) -> Self {
        let vectors = components.columns().into_iter()
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self { vectors }
    }

    /// 3×N component matrix
    pub fn components(&self) -> Array2<f64> {
        Array2::from_shape_fn((3, self.vectors.len()), |(i, j)| self.vectors[j][i])
    }

    pub fn vectors(&self) -> &[[f64;3]] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn parse(text:&str,file:&Path) -> Result<Self,GradientError> {
        let lines = text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| utils::parse_row(l).map_err(|e| GradientError::Parse {
                file: file.to_owned(),
                message: e.to_string(),
            }))
            .collect::<Result<Vec<Vec<f64>>,_>>()?;
        if lines.len() != 3 {
            return Err(GradientError::ShapeMismatch { expected: 3, found: lines.len() });
        }
        let n = lines[0].len();
        if let Some((i, l)) = lines.iter().enumerate().find(|(_, l)| l.len() != n) {
            return Err(GradientError::RaggedTable { line: i + 1, expected: n, found: l.len() });
        }
        let vectors = (0..n).map(|j| [lines[0][j], lines[1][j], lines[2][j]]).collect();
        Ok(Self { vectors })
    }

    pub fn read(file:&Path) -> Result<Self,GradientError> {
        let text = utils::read_to_string(file).map_err(GradientError::io(file))?;
        Self::parse(&text, file)
    }

    pub fn to_text(&self) -> String {
        let mut s = String::new();
        for axis in 0..3 {
            let row:Vec<f64> = self.vectors.iter().map(|v| v[axis]).collect();
            s.push_str(&utils::row_to_string(&row, TABLE_DECIMALS));
            s.push('\n');
        }
        s
    }

    pub fn write(&self,file:&Path) -> Result<(),GradientError> {
        utils::write_to_file(file, &self.to_text()).map_err(GradientError::io(file))
    }
}

/// every number in a b-value file, in order
pub fn read_b_values(file:&Path) -> Result<Vec<f64>,GradientError> {
    let text = utils::read_to_string(file).map_err(GradientError::io(file))?;
    utils::parse_row(&text).map_err(|e| GradientError::Parse {
        file: file.to_owned(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use super::*;

    #[test]
    fn parse_three_line_layout() {
        let text = "0 1 0\n0 0 1\n0 0 0\n";
        let t = GradientTable::parse(text, Path::new("x.bvec")).unwrap();
        assert_eq!(t.vectors(), &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let c = t.components();
        assert_eq!(c.dim(), (3, 3));
        assert_eq!(GradientTable::from_components(&c), t);
    }

    #[test]
    fn parse_rejects_wrong_line_count_and_ragged_lines() {
        let f = PathBuf::from("x.bvec");
        assert!(matches!(
            GradientTable::parse("1 0\n0 1\n", &f),
            Err(GradientError::ShapeMismatch { expected: 3, found: 2 })
        ));
        assert!(matches!(
            GradientTable::parse("1 0\n0 1\n0 0\n1 1\n", &f),
            Err(GradientError::ShapeMismatch { expected: 3, found: 4 })
        ));
        assert!(matches!(
            GradientTable::parse("1 0\n0 1 0\n0 0\n", &f),
            Err(GradientError::RaggedTable { line: 2, expected: 2, found: 3 })
        ));
        assert!(matches!(
            GradientTable::parse("1 0\n0 a\n0 0\n", &f),
            Err(GradientError::Parse { .. })
        ));
    }

    #[test]
    fn written_with_twelve_decimals() {
        let t = GradientTable::new(vec![[0.0, 0.0, 0.0], [0.5, -0.25, 1.0]]);
        assert_eq!(
            t.to_text(),
            "0.000000000000 0.500000000000\n0.000000000000 -0.250000000000\n0.000000000000 1.000000000000\n"
        );
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("t.bvec");
        t.write(&f).unwrap();
        assert_eq!(GradientTable::read(&f).unwrap(), t);
    }

    #[test]
    fn b_values() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("dwi.bval");
        utils::write_to_file(&f, "0 1000 1000\n").unwrap();
        assert_eq!(read_b_values(&f).unwrap(), vec![0.0, 1000.0, 1000.0]);
        assert!(matches!(read_b_values(&dir.path().join("missing.bval")), Err(GradientError::Io { .. })));
    }
}
