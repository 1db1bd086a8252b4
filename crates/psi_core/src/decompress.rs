//! Gzip decompression of Whippet quantification files.
//!
//! Equivalent to `gunzip -k`: the archive is kept. Output is written to a
//! temp file next to the target and renamed into place, so an interrupted
//! run never leaves a truncated `.psi` that would be taken as done.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Decompress `archive` into `target`, keeping `archive`.
///
/// Returns the number of decompressed bytes written.
pub fn gunzip_keep(archive: &Path, target: &Path) -> io::Result<u64> {
    let input = File::open(archive)?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));

    let mut temp_name = target.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    let result = (|| -> io::Result<u64> {
        let mut out = BufWriter::new(File::create(temp_path)?);
        let written = io::copy(&mut decoder, &mut out)?;
        out.flush()?;
        Ok(written)
    })();

    match result {
        Ok(written) => {
            fs::rename(temp_path, target)?;
            tracing::debug!(
                "Decompressed {} to {} ({} bytes)",
                archive.display(),
                target.display(),
                written
            );
            Ok(written)
        }
        Err(e) => {
            let _ = fs::remove_file(temp_path);
            Err(e)
        }
    }
}
