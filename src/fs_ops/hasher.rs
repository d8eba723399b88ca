//! Content digests used to confirm a copy is byte-identical to its source.
//! MD5 is enough here: this is a corruption check, not a security boundary.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

use crate::errors::RelayError;

const READ_CHUNK: usize = 1024 * 1024;

/// Lower-case hex MD5 of a file's full content. Equality is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the whole file at `path`.
pub fn digest(path: &Path) -> Result<Digest, RelayError> {
    let read_failure = |source: io::Error| RelayError::HashReadFailure {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(read_failure)?;
    let mut ctx = md5::Context::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_failure(e)),
        };
        ctx.consume(&buf[..n]);
    }
    let d = Digest(format!("{:x}", ctx.compute()));
    info!(path = %path.display(), digest = %d, "Computed digest");
    Ok(d)
}
