use crate::error::{DeployError, Result};
use crate::utils::PathValidator;
use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tar::Archive;
use tracing::trace;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Unpacks a streamed archive into a directory.
pub trait Extractor: Send + Sync {
    /// Returns the number of entries written.
    fn extract(&self, reader: &mut dyn Read, dest: &Path) -> Result<usize>;
}

/// Streaming tar extractor; gzip compression is detected from the magic bytes.
///
/// Archives come from our own release pipeline, but entries that would land
/// outside `dest` are still refused.
#[derive(Debug, Default)]
pub struct TarballExtractor;

impl Extractor for TarballExtractor {
    fn extract(&self, reader: &mut dyn Read, dest: &Path) -> Result<usize> {
        let mut buffered = BufReader::new(reader);
        let is_gzip = buffered
            .fill_buf()
            .map_err(|e| DeployError::Extraction(format!("Failed to read archive: {e}")))?
            .starts_with(&GZIP_MAGIC);

        if is_gzip {
            unpack(Archive::new(GzDecoder::new(buffered)), dest)
        } else {
            unpack(Archive::new(buffered), dest)
        }
    }
}

fn unpack<R: Read>(mut archive: Archive<R>, dest: &Path) -> Result<usize> {
    archive.set_preserve_mtime(true);

    let entries = archive
        .entries()
        .map_err(|e| DeployError::Extraction(format!("Failed to read archive: {e}")))?;

    let mut count = 0;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| DeployError::Extraction(format!("Corrupt archive entry: {e}")))?;

        let entry_path = entry
            .path()
            .map_err(|e| DeployError::Extraction(format!("Invalid entry path: {e}")))?
            .into_owned();
        PathValidator::resolve_entry_path(&entry_path, dest)?;

        trace!(entry = %entry_path.display(), "unpacking");
        entry.unpack_in(dest).map_err(|e| {
            DeployError::Extraction(format!(
                "Failed to unpack '{}': {e}",
                entry_path.display()
            ))
        })?;
        count += 1;
    }

    if count == 0 {
        return Err(DeployError::Extraction(
            "Archive contains no entries".to_string(),
        ));
    }

    Ok(count)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    /// Builds a `.tar.gz` in memory from `(path, contents)` pairs.
    pub(crate) fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn plain_tar(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn extracts_gzipped_tarball() {
        let dir = tempdir().unwrap();
        let data = tarball(&[("index.html", "<h1>hi</h1>"), ("css/site.css", "body{}")]);

        let count = TarballExtractor
            .extract(&mut Cursor::new(data), dir.path())
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("index.html")).unwrap(),
            "<h1>hi</h1>"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("css/site.css")).unwrap(),
            "body{}"
        );
    }

    #[test]
    fn extracts_uncompressed_tarball() {
        let dir = tempdir().unwrap();
        let data = plain_tar(&[("index.html", "plain")]);

        TarballExtractor
            .extract(&mut Cursor::new(data), dir.path())
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("index.html")).unwrap(),
            "plain"
        );
    }

    #[test]
    fn truncated_archive_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let mut data = tarball(&[("index.html", &"x".repeat(4096))]);
        data.truncate(data.len() / 2);

        let err = TarballExtractor
            .extract(&mut Cursor::new(data), dir.path())
            .unwrap_err();
        assert!(matches!(err, DeployError::Extraction(_)));
    }

    #[test]
    fn garbage_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let err = TarballExtractor
            .extract(&mut Cursor::new(vec![0x1f, 0x8b, 0, 1, 2, 3]), dir.path())
            .unwrap_err();
        assert!(matches!(err, DeployError::Extraction(_)));
    }

    #[test]
    fn empty_stream_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let err = TarballExtractor
            .extract(&mut Cursor::new(Vec::new()), dir.path())
            .unwrap_err();
        assert!(matches!(err, DeployError::Extraction(_)));
    }
}
