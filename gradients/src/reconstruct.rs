use std::path::{Path, PathBuf};
use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, info};
use crate::dicom_header::{DicomHeader, DicomTagId};
use crate::error::GradientError;
use crate::gradient_table::GradientTable;
use crate::orientation::Orientation;

/// suffix of the corrected table written next to the scratch prefix
pub const REAL_BVEC_SUFFIX:&str = "_real.bvec";

/// directionality code of volumes acquired without a diffusion gradient
const NO_DIRECTION:&str = "NONE";

/// Where the gradients of a run come from
#[derive(Clone, Debug, PartialEq)]
pub enum GradientSource {
    /// device-space table rotated with the orientation of a reference DICOM
    Corrected { table:PathBuf, reference:PathBuf },
    /// vectors read from the private diffusion tags of one DICOM per volume
    Dicom { files:Vec<PathBuf> },
    /// table used as given
    Table(PathBuf),
}

impl GradientSource {

    /// pick the reconstruction mode from the supplied inputs. DICOM inputs may be
    /// files, directories or glob patterns.
    pub fn resolve(grad:Option<&Path>,dicom:&[PathBuf]) -> Result<Self,GradientError> {
        if let Some(table) = grad {
            if !table.is_file() {
                return Err(GradientError::SourceMissing(format!("gradient file {} does not exist", table.display())));
            }
        }
        match (grad, dicom.is_empty()) {
            (None, true) => Err(GradientError::SourceMissing(
                String::from("gradient file needs to be provided, either through DICOM files or through a gradient table")
            )),
            (Some(table), true) => Ok(GradientSource::Table(table.to_owned())),
            (Some(table), false) => {
                let files = expand_dicom_inputs(dicom)?;
                Ok(GradientSource::Corrected { table: table.to_owned(), reference: first_readable(&files)? })
            }
            (None, false) => Ok(GradientSource::Dicom { files: expand_dicom_inputs(dicom)? }),
        }
    }

    /// Produce the real-world table. Reconstructed tables are written to
    /// `<prefix>_real.bvec`; a plain table is validated and its own path returned.
    pub fn reconstruct(&self,prefix:&Path) -> Result<(PathBuf,GradientTable),GradientError> {
        let output = utils::with_suffix(prefix, REAL_BVEC_SUFFIX);
        let table = match self {
            GradientSource::Table(table) => {
                let t = GradientTable::read(table)?;
                info!("using {} gradients from {}", t.len(), table.display());
                return Ok((table.clone(), t));
            }
            GradientSource::Corrected { table, reference } => {
                info!("correcting {} with the orientation of {}", table.display(), reference.display());
                let device = GradientTable::read(table)?;
                let header = DicomHeader::open(reference)?;
                correct_table(&device, &header)?
            }
            GradientSource::Dicom { files } => {
                info!("extracting gradients from {} DICOM files", files.len());
                let headers = files.iter()
                    .map(|f| DicomHeader::open(f))
                    .collect::<Result<Vec<_>,_>>()?;
                extract_table(headers)?
            }
        };
        table.write(&output)?;
        debug!("wrote {} gradients to {}", table.len(), output.display());
        Ok((output, table))
    }
}

/// One acquired DICOM volume as far as its diffusion encoding is concerned
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeDescriptor {
    pub source:PathBuf,
    pub acquisition_number:i64,
    pub b_value:f64,
    /// device-space direction, None for volumes without diffusion weighting
    pub direction:Option<[f64;3]>,
    pub orientation:Option<Orientation>,
}

impl VolumeDescriptor {

    /// The direction tag is only decoded for diffusion-weighted volumes, so b=0 volumes
    /// and volumes flagged NONE give the zero vector whatever (0019,100E) holds.
    pub fn from_header(header:&DicomHeader) -> Result<Self,GradientError> {
        let acquisition_number = header.int(DicomTagId::AcquisitionNumber)?;
        let b_value = header.float(DicomTagId::SiemensBValue)?;
        let unweighted = b_value == 0.0 || match header.contains(DicomTagId::SiemensDiffusionDirectionality) {
            true => header.text(DicomTagId::SiemensDiffusionDirectionality)? == NO_DIRECTION,
            false => false,
        };
        let direction = match unweighted {
            true => None,
            false => {
                let bytes = header.bytes(DicomTagId::SiemensDiffusionGradientDirection)?;
                let v = decode_packed_vector(&bytes).ok_or(GradientError::Decode {
                    file: header.path().to_owned(),
                    len: bytes.len(),
                })?;
                Some(v)
            }
        };
        let orientation = match header.contains(DicomTagId::ImageOrientationPatient) {
            true => Some(Orientation::from_header(header)?),
            false => None,
        };
        Ok(Self {
            source:header.path().to_owned(),
            acquisition_number,
            b_value,
            direction,
            orientation,
        })
    }

    pub fn b_vector(&self) -> [f64;3] {
        self.direction.unwrap_or([0.0, 0.0, 0.0])
    }
}

/// three little endian doubles, nothing more and nothing less
pub fn decode_packed_vector(bytes:&[u8]) -> Option<[f64;3]> {
    if bytes.len() != 24 {
        return None;
    }
    let mut v = [0.0;3];
    LittleEndian::read_f64_into(bytes, &mut v);
    Some(v)
}

/// Drop volumes repeating the acquisition number of the volume kept just before them.
/// Only consecutive repeats are dropped; an acquisition number coming back later is kept.
pub fn deduplicate_acquisitions(volumes:Vec<VolumeDescriptor>) -> Vec<VolumeDescriptor> {
    let mut last:Option<i64> = None;
    volumes.into_iter().filter(|v| {
        let repeat = last == Some(v.acquisition_number);
        last = Some(v.acquisition_number);
        !repeat
    }).collect()
}

/// table correction: rotate a device-space table into the frame of the reference image
pub fn correct_table(table:&GradientTable,reference:&DicomHeader) -> Result<GradientTable,GradientError> {
    let orientation = Orientation::from_header(reference)?;
    debug!("orientation matrix of {}: {:?}", reference.path().display(), orientation.matrix());
    Ok(orientation.to_real_world(table))
}

/// direct extraction: one vector per acquisition, DICOMs taken in file name order
pub fn extract_table(mut headers:Vec<DicomHeader>) -> Result<GradientTable,GradientError> {
    headers.sort_by_key(|h| h.path().to_string_lossy().into_owned());
    let volumes = headers.iter()
        .map(VolumeDescriptor::from_header)
        .collect::<Result<Vec<_>,_>>()?;
    let n_read = volumes.len();
    let volumes = deduplicate_acquisitions(volumes);
    info!("kept {} of {} DICOM volumes after removing repeated acquisitions", volumes.len(), n_read);

    // vectors stay in the device frame; only worth a note when the two frames differ
    if let Some(o) = volumes.iter().find_map(|v| v.orientation) {
        if !o.is_axis_aligned(1e-6) {
            debug!("image axes are oblique ({:?}); DICOM vectors are kept in device coordinates", o);
        }
    }

    Ok(GradientTable::new(volumes.iter().map(|v| v.b_vector()).collect()))
}

/// First file that opens as a DICOM, so stray files in a series directory are skipped.
/// Fails with the error of the first file when none does.
pub fn first_readable(files:&[PathBuf]) -> Result<PathBuf,GradientError> {
    let mut first_error:Option<GradientError> = None;
    for f in files {
        match DicomHeader::open(f) {
            Ok(_) => return Ok(f.clone()),
            Err(e) => {
                debug!("skipping {}: {}", f.display(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    Err(first_error.unwrap_or_else(|| GradientError::NoDicomFiles(files.to_vec())))
}

/// Expand directories (recursively, sorted) and glob patterns into DICOM files.
pub fn expand_dicom_inputs(inputs:&[PathBuf]) -> Result<Vec<PathBuf>,GradientError> {
    let mut files = Vec::<PathBuf>::new();
    for input in inputs {
        let as_str = input.to_string_lossy();
        if input.is_dir() {
            let mut found = utils::find_files(input).unwrap_or_default();
            found.sort();
            files.extend(found);
        } else if !input.exists() && utils::is_glob_pattern(&as_str) {
            files.extend(utils::get_all_matches(&as_str).unwrap_or_default());
        } else {
            files.push(input.clone());
        }
    }
    match files.is_empty() {
        true => Err(GradientError::NoDicomFiles(inputs.to_vec())),
        false => Ok(files),
    }
}
