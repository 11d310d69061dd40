use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read, Write};
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};
use glob::glob;
use walkdir::WalkDir;

pub fn read_to_string(filepath:&Path) -> io::Result<String> {
    let mut f = File::open(filepath)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    Ok(s)
}

pub fn write_to_file(filepath:&Path,string:&str) -> io::Result<()> {
    let mut f = File::create(filepath)?;
    f.write_all(string.as_bytes())
}

/// space-separated row of fixed-point numbers, the way numpy.savetxt writes "%.{decimals}f"
pub fn row_to_string(row:&[f64],decimals:usize) -> String {
    let vstr:Vec<String> = row.iter().map(|num| format!("{:.*}",decimals,num)).collect();
    vstr.join(" ")
}

/// parse a whitespace-separated row of numbers. Empty lines give an empty row.
pub fn parse_row(line:&str) -> Result<Vec<f64>,ParseFloatError> {
    line.split_whitespace().map(|entry| entry.parse::<f64>()).collect()
}

/// the image path with its extension removed. A trailing .gz is removed first so that
/// "dwi.nii.gz" and "dwi.nrrd" both give "dwi"
pub fn image_prefix(image:&Path) -> PathBuf {
    let stem = match image.extension() {
        Some(ext) if ext == "gz" => image.with_extension(""),
        _ => image.to_owned()
    };
    stem.with_extension("")
}

/// append a suffix to the final component of a prefix: ("/tmp/dwi","_B0.nrrd") -> "/tmp/dwi_B0.nrrd"
pub fn with_suffix(prefix:&Path,suffix:&str) -> PathBuf {
    let mut s = OsString::from(prefix.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// prefix relocated into another directory: ("/data/subj/dwi.nii.gz","/tmp/x") -> "/tmp/x/dwi"
pub fn relocated_prefix(image:&Path,dir:&Path) -> PathBuf {
    let prefix = image_prefix(image);
    match prefix.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_owned()
    }
}

// single depth search
pub fn get_all_matches(pattern:&str) -> Option<Vec<PathBuf>> {
    let matches:Vec<PathBuf> = match glob(pattern) {
        Ok(paths) => paths.flat_map(|m| m).filter(|p| p.is_file()).collect(),
        Err(_) => return None
    };
    match matches.is_empty() {
        true => None,
        false => Some(matches)
    }
}

pub fn is_glob_pattern(s:&str) -> bool {
    s.contains(|c| c == '*' || c == '?' || c == '[')
}

// recursive walk
pub fn find_files(base_dir:&Path) -> Option<Vec<PathBuf>> {
    let files:Vec<PathBuf> = WalkDir::new(base_dir).into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_owned())
        .collect();
    match files.len(){
        0 => None,
        _=> Some(files)
    }
}
