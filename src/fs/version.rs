//! Best-effort file version lookup for PE binaries (`.exe`, `.dll`, ...).
//!
//! Only the `.rsrc` section is read, and within it only the
//! `VS_FIXEDFILEINFO` block; string tables are ignored.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const HEADER_BYTES: u64 = 4096;
const MAX_SCAN_BYTES: u64 = 4 * 1024 * 1024;
const FIXED_INFO_SIGNATURE: [u8; 4] = 0xFEEF_04BDu32.to_le_bytes();
const VERSIONED_EXTENSIONS: &[&str] = &["exe", "dll", "sys", "ocx"];

/// Returns `major.minor.build.revision`, or `None` whenever the file has no
/// readable version resource.
pub fn file_version(path: &Path) -> Option<String> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  if !VERSIONED_EXTENSIONS.contains(&ext.as_str()) {
    return None;
  }
  let mut file = match File::open(path) {
    Ok(f) => f,
    Err(e) => {
      log::debug!("version scan of {} failed: {e}", path.display());
      return None;
    }
  };
  let head = read_at(&mut file, 0, HEADER_BYTES)?;
  if !head.starts_with(b"MZ") {
    return None;
  }
  match resource_section(&head) {
    Some((offset, size)) => {
      let section = read_at(&mut file, offset, size.min(MAX_SCAN_BYTES))?;
      scan_fixed_file_info(&section)
    }
    None => parse_fixed_file_info(&read_at(&mut file, 0, MAX_SCAN_BYTES)?),
  }
}

fn read_at(file: &mut File, offset: u64, len: u64) -> Option<Vec<u8>> {
  file.seek(SeekFrom::Start(offset)).ok()?;
  let mut data = Vec::new();
  file.take(len).read_to_end(&mut data).ok()?;
  Some(data)
}

/// File offset and size of the `.rsrc` section, from the PE section table.
fn resource_section(head: &[u8]) -> Option<(u64, u64)> {
  let pe = read_u32(head, 0x3C)? as usize;
  if head.get(pe..pe + 4)? != b"PE\0\0" {
    return None;
  }
  let sections = read_u16(head, pe + 6)? as usize;
  let optional = read_u16(head, pe + 20)? as usize;
  let table = pe + 24 + optional;
  (0..sections).find_map(|i| {
    let header = head.get(table + i * 40..table + (i + 1) * 40)?;
    if !header.starts_with(b".rsrc") {
      return None;
    }
    let size = read_u32(header, 16)?;
    let offset = read_u32(header, 20)?;
    Some((u64::from(offset), u64::from(size)))
  })
}

fn parse_fixed_file_info(data: &[u8]) -> Option<String> {
  if !data.starts_with(b"MZ") {
    return None;
  }
  scan_fixed_file_info(data)
}

fn scan_fixed_file_info(data: &[u8]) -> Option<String> {
  let marker: Vec<u8> = "VS_VERSION_INFO"
    .encode_utf16()
    .flat_map(|u| u.to_le_bytes())
    .collect();
  let start = find(data, &marker)?;
  let sig = start + find(&data[start..], &FIXED_INFO_SIGNATURE)?;

  // dwSignature, dwStrucVersion, dwFileVersionMS, dwFileVersionLS
  let ms = read_u32(data, sig + 8)?;
  let ls = read_u32(data, sig + 12)?;
  Some(format!("{}.{}.{}.{}", ms >> 16, ms & 0xFFFF, ls >> 16, ls & 0xFFFF))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
  let bytes = data.get(offset..offset + 2)?;
  Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
  let bytes = data.get(offset..offset + 4)?;
  Some(u32::from_le_bytes(bytes.try_into().ok()?))
}
