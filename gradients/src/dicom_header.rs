use std::fmt;
use std::path::{Path, PathBuf};
use byteorder::{LittleEndian, WriteBytesExt};
use dicom::core::{PrimitiveValue, Tag};
use dicom::dictionary_std::tags;
use dicom::object::mem::InMemElement;
use dicom::object::{InMemDicomObject, OpenFileOptions};
use crate::error::GradientError;

/// DICOM attributes the gradient reconstruction depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DicomTagId {
    /// (0020,0012)
    AcquisitionNumber,
    /// (0020,0037) row and column direction cosines
    ImageOrientationPatient,
    /// Siemens (0019,100C)
    SiemensBValue,
    /// Siemens (0019,100D), "NONE" for volumes without diffusion weighting
    SiemensDiffusionDirectionality,
    /// Siemens (0019,100E), three packed doubles in device coordinates
    SiemensDiffusionGradientDirection,
}

impl DicomTagId {
    pub fn tag(&self) -> Tag {
        match self {
            DicomTagId::AcquisitionNumber => Tag(0x0020, 0x0012),
            DicomTagId::ImageOrientationPatient => Tag(0x0020, 0x0037),
            DicomTagId::SiemensBValue => Tag(0x0019, 0x100C),
            DicomTagId::SiemensDiffusionDirectionality => Tag(0x0019, 0x100D),
            DicomTagId::SiemensDiffusionGradientDirection => Tag(0x0019, 0x100E),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DicomTagId::AcquisitionNumber => "AcquisitionNumber",
            DicomTagId::ImageOrientationPatient => "ImageOrientationPatient",
            DicomTagId::SiemensBValue => "B_value",
            DicomTagId::SiemensDiffusionDirectionality => "DiffusionDirectionality",
            DicomTagId::SiemensDiffusionGradientDirection => "DiffusionGradientDirection",
        }
    }
}

impl fmt::Display for DicomTagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        write!(f, "{} ({:04X},{:04X})", self.name(), tag.group(), tag.element())
    }
}

/// Header of one DICOM file with typed access to the attributes in [DicomTagId].
///
/// Every accessor fails with [GradientError::MissingAttribute] when the attribute is
/// absent. Private attributes read from implicit VR files come back as raw bytes (UN), so
/// text and numbers are also recovered from byte values.
pub struct DicomHeader {
    path:PathBuf,
    object:InMemDicomObject,
}

impl DicomHeader {

    /// read the header, stopping before pixel data
    pub fn open(path:&Path) -> Result<Self,GradientError> {
        let file = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .map_err(|e| GradientError::DicomRead { file: path.to_owned(), message: e.to_string() })?;
        Ok(Self::from_object(path, file.into_inner()))
    }

    pub fn from_object(path:&Path,object:InMemDicomObject) -> Self {
        Self {
            path:path.to_owned(),
            object,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self,id:DicomTagId) -> bool {
        self.object.element(id.tag()).is_ok()
    }

    fn element(&self,id:DicomTagId) -> Result<&InMemElement,GradientError> {
        self.object.element(id.tag()).map_err(|_| GradientError::MissingAttribute {
            tag: id,
            file: self.path.clone(),
        })
    }

    fn value_error(&self,id:DicomTagId,expected:&'static str) -> GradientError {
        GradientError::AttributeValue { tag: id, file: self.path.clone(), expected }
    }

    /// attribute value as trimmed text
    pub fn text(&self,id:DicomTagId) -> Result<String,GradientError> {
        let elem = self.element(id)?;
        let trim = |s:&str| s.trim_matches(|c:char| c == '\0' || c.is_whitespace()).to_string();
        match elem.value().primitive() {
            Some(PrimitiveValue::U8(bytes)) => Ok(trim(&String::from_utf8_lossy(bytes))),
            _ => elem.to_str()
                .map(|s| trim(&s))
                .map_err(|_| self.value_error(id, "text")),
        }
    }

    pub fn float(&self,id:DicomTagId) -> Result<f64,GradientError> {
        let elem = self.element(id)?;
        match elem.value().primitive() {
            Some(PrimitiveValue::U8(_)) => self.text(id)?
                .parse::<f64>()
                .map_err(|_| self.value_error(id, "a number")),
            _ => elem.to_float64().map_err(|_| self.value_error(id, "a number")),
        }
    }

    pub fn int(&self,id:DicomTagId) -> Result<i64,GradientError> {
        let elem = self.element(id)?;
        match elem.value().primitive() {
            Some(PrimitiveValue::U8(_)) => self.text(id)?
                .parse::<i64>()
                .map_err(|_| self.value_error(id, "an integer")),
            _ => elem.to_int::<i64>().map_err(|_| self.value_error(id, "an integer")),
        }
    }

    /// multi-valued numeric attribute (DS values are separated by '\')
    pub fn floats(&self,id:DicomTagId) -> Result<Vec<f64>,GradientError> {
        let elem = self.element(id)?;
        match elem.value().primitive() {
            Some(PrimitiveValue::U8(_)) => self.text(id)?
                .split('\\')
                .map(|s| s.trim().parse::<f64>())
                .collect::<Result<Vec<f64>,_>>()
                .map_err(|_| self.value_error(id, "a list of numbers")),
            _ => elem.to_multi_float64().map_err(|_| self.value_error(id, "a list of numbers")),
        }
    }

    /// raw value bytes. Values already decoded as doubles (explicit VR FD) are packed back
    /// into little endian bytes so both encodings unpack the same way.
    pub fn bytes(&self,id:DicomTagId) -> Result<Vec<u8>,GradientError> {
        let elem = self.element(id)?;
        match elem.value().primitive() {
            Some(PrimitiveValue::U8(bytes)) => Ok(bytes.to_vec()),
            Some(PrimitiveValue::F64(values)) => {
                let mut packed = Vec::<u8>::with_capacity(values.len() * 8);
                for v in values.iter() {
                    packed.write_f64::<LittleEndian>(*v).map_err(|_| self.value_error(id, "doubles"))?;
                }
                Ok(packed)
            }
            _ => elem.to_bytes()
                .map(|b| b.to_vec())
                .map_err(|_| self.value_error(id, "bytes")),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use dicom::core::{DataElement, PrimitiveValue, VR};
    use dicom::object::InMemDicomObject;
    use byteorder::{LittleEndian, WriteBytesExt};
    use super::{DicomHeader, DicomTagId};

    pub fn strs(values:&[&str]) -> PrimitiveValue {
        PrimitiveValue::Strs(values.iter().map(|s| s.to_string()).collect())
    }

    pub fn packed(v:[f64;3]) -> PrimitiveValue {
        let mut bytes = Vec::<u8>::new();
        for x in v {
            bytes.write_f64::<LittleEndian>(x).unwrap();
        }
        PrimitiveValue::U8(bytes.into_iter().collect())
    }

    pub fn header(path:&str,elements:Vec<(DicomTagId,VR,PrimitiveValue)>) -> DicomHeader {
        let obj = InMemDicomObject::from_element_iter(
            elements.into_iter().map(|(id, vr, value)| DataElement::new(id.tag(), vr, value))
        );
        DicomHeader::from_object(Path::new(path), obj)
    }

    /// one diffusion volume the way an implicit VR Siemens file decodes
    pub fn volume(path:&str,acquisition:i64,b_value:&str,directionality:&str,direction:PrimitiveValue) -> DicomHeader {
        header(path, vec![
            (DicomTagId::AcquisitionNumber, VR::IS, PrimitiveValue::from(acquisition.to_string())),
            (DicomTagId::SiemensBValue, VR::UN, PrimitiveValue::U8(b_value.bytes().collect())),
            (DicomTagId::SiemensDiffusionDirectionality, VR::UN, PrimitiveValue::U8(directionality.bytes().collect())),
            (DicomTagId::SiemensDiffusionGradientDirection, VR::UN, direction),
            (DicomTagId::ImageOrientationPatient, VR::DS, strs(&["1", "0", "0", "0", "1", "0"])),
        ])
    }
}
