use crate::errors::CliError;
use camino::Utf8Path;
use std::fs::{self, File};
use std::io::BufWriter;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack the contents of `dir` into the zip file `dest`, paths relative to `dir`.
///
/// `dest` must not lie inside `dir`.
pub fn zip_dir(dir: &Utf8Path, dest: &Utf8Path) -> Result<usize, CliError> {
    if dest.as_std_path().exists() {
        fs::remove_file(dest.as_std_path())?;
    }
    let mut zip = ZipWriter::new(BufWriter::new(File::create(dest.as_std_path())?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in WalkDir::new(dir.as_std_path()).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(rel) = entry.path().strip_prefix(dir.as_std_path()) else {
            continue;
        };
        let name = rel.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            std::io::copy(&mut File::open(entry.path())?, &mut zip)?;
            files += 1;
        }
    }
    zip.finish()?;
    tracing::debug!("Packed {} files into {}", files, dest);
    Ok(files)
}
