//! Diffusion gradient tables recovered from Siemens DICOM headers.
//!
//! Two ways in: an existing device-space table rotated into the image frame with the
//! orientation of a reference DICOM, or vectors read directly from the private
//! diffusion tags of one DICOM per volume.

pub mod dicom_header;
pub mod error;
pub mod gradient_table;
pub mod orientation;
pub mod reconstruct;

pub use dicom_header::{DicomHeader, DicomTagId};
pub use error::GradientError;
pub use gradient_table::{read_b_values, GradientTable};
pub use orientation::Orientation;
pub use reconstruct::{GradientSource, VolumeDescriptor};
