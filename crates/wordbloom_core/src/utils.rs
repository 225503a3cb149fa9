use crate::errors::Result;
use byteorder::{LittleEndian as LE, ReadBytesExt};
use std::io::{self, Read, Write};
use std::path::Path;

pub fn crc32(data: &[u8]) -> u32 { crc32fast::hash(data) }

pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> { r.read_u32::<LE>() }
pub fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> { r.read_u16::<LE>() }

/// Bytes needed to hold `bits` bits.
#[inline]
pub fn packed_len(bits: u32) -> usize { (bits as usize + 7) / 8 }

/// Reduce a big-endian unsigned integer modulo `m` one byte at a time.
#[inline]
pub fn reduce_be(digest: &[u8], m: u32) -> u32 {
    let m = m as u64;
    let mut acc = 0u64;
    for &b in digest {
        acc = ((acc << 8) | b as u64) % m;
    }
    acc as u32
}

#[cfg(unix)]
pub fn fsync_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let f = std::fs::OpenOptions::new().read(true).custom_flags(libc::O_DIRECTORY).open(dir)?;
    f.sync_all()
}
#[cfg(not(unix))]
pub fn fsync_dir(_path: &Path) -> io::Result<()> { Ok(()) }

/// Publish `data` at `path`: temp file in the same directory, fsync, rename,
/// then fsync the directory.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new().prefix(".wordbloom_").tempfile_in(dir)?;
    tmp.as_file_mut().write_all(data)?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path)?;
    fsync_dir(path)?;
    Ok(())
}
