//! Streaming copy into a fresh file, fsynced before returning.
//!
//! - Opens the source by path, so a symlink source copies its target's bytes.
//! - Writes to a newly created destination (O_EXCL semantics; never clobbers).
//! - Linux: in-kernel `copy_file_range`, falling back to buffered I/O when the
//!   filesystem pair does not support it.
//!
//! Snapshot semantics: the source is read once from start to EOF; bytes
//! appended concurrently may or may not be included. Hash verification after
//! the copy is what catches that.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy `src` -> `dst` and fsync `dst`. Returns the number of bytes written.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    #[cfg(target_os = "linux")]
    {
        if let Some(bytes) = copy_in_kernel(&src_f, &dst_f)? {
            dst_f.sync_all()?;
            return Ok(bytes);
        }
    }

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

/// Ok(None) means the kernel refused before any byte moved; use the buffered path.
#[cfg(target_os = "linux")]
fn copy_in_kernel(src: &File, dst: &File) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: usize = 16 * 1024 * 1024;
    let mut total: u64 = 0;
    loop {
        let rc = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                CHUNK,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
            continue;
        }
        if rc == 0 {
            return Ok(Some(total));
        }
        let err = io::Error::last_os_error();
        let unsupported = matches!(
            err.raw_os_error(),
            Some(libc::EXDEV) | Some(libc::ENOSYS) | Some(libc::EINVAL) | Some(libc::EPERM) | Some(libc::EOPNOTSUPP)
        );
        if total == 0 && unsupported {
            return Ok(None);
        }
        return Err(err);
    }
}
