use std::path::PathBuf;

use embedzip_format::{Archive, ArchiveEntry, ChunkStore};

use super::human_size;
use crate::error::{Error, Result};

pub fn run(chunks: PathBuf, json: bool) -> Result<()> {
    let store = ChunkStore::open_dir(&chunks).map_err(|source| Error::OpenChunks {
        path: chunks.clone(),
        source,
    })?;
    let archive = Archive::open(store).map_err(|source| Error::OpenArchive {
        path: chunks.clone(),
        source,
    })?;

    if json {
        print_json(archive.entries())
    } else {
        print_table(archive.entries());
        Ok(())
    }
}

fn print_json(entries: &[ArchiveEntry]) -> Result<()> {
    let entries: Vec<_> = entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "name": e.name(),
                "kind": if e.is_dir() { "directory" } else { "file" },
                "compression": e.compression().to_string(),
                "compressed_size": e.compressed_size(),
                "size": e.size(),
                "crc32": e.crc32(),
                "mode": e.mode().map(|m| m & 0o777),
            })
        })
        .collect();

    let out = serde_json::to_string_pretty(&entries).map_err(|source| Error::Serialize { source })?;
    println!("{}", out);
    Ok(())
}

fn print_table(entries: &[ArchiveEntry]) {
    println!("Method        Compressed     Length         CRC32      Unix ACL    Path");
    println!("------------  -------------  -------------  ---------  ----------  --------");

    for entry in entries.iter() {
        let acl = entry
            .mode()
            .map(from_acl)
            .unwrap_or_else(|| "-".into());

        if entry.is_dir() {
            println!(
                "{:12}  {:>12}   {:>12}   {:<9}  {:<9}   {}",
                "<directory>",
                "-",
                "-",
                "-",
                acl,
                entry.name(),
            );
        } else {
            println!(
                "{:12}  {:>12}   {:>12}   {:08x}   {:<9}   {}",
                entry.compression().to_string(),
                human_size(entry.compressed_size()),
                human_size(entry.size()),
                entry.crc32(),
                acl,
                entry.name(),
            );
        }
    }
}

macro_rules! add {
    ($ident:ident, $value:tt => $s:ident) => {
        if $ident {
            $s.push($value);
        } else {
            $s.push('-');
        }
    };
}

#[inline(always)]
fn from_acl(acl: u32) -> String {
    let or = (acl & 0b1_0000_0000) > 0;
    let ow = (acl & 0b0_1000_0000) > 0;
    let ox = (acl & 0b0_0100_0000) > 0;
    let gr = (acl & 0b0_0010_0000) > 0;
    let gw = (acl & 0b0_0001_0000) > 0;
    let gx = (acl & 0b0_0000_1000) > 0;
    let ar = (acl & 0b0_0000_0100) > 0;
    let aw = (acl & 0b0_0000_0010) > 0;
    let ax = (acl & 0b0_0000_0001) > 0;

    let mut s = String::new();
    add!(or, 'r' => s);
    add!(ow, 'w' => s);
    add!(ox, 'x' => s);
    add!(gr, 'r' => s);
    add!(gw, 'w' => s);
    add!(gx, 'x' => s);
    add!(ar, 'r' => s);
    add!(aw, 'w' => s);
    add!(ax, 'x' => s);

    s
}

#[cfg(test)]
mod tests {
    use super::from_acl;

    #[test]
    fn acl_strings() {
        assert_eq!(from_acl(0o755), "rwxr-xr-x");
        assert_eq!(from_acl(0o640), "rw-r-----");
        assert_eq!(from_acl(0o100644), "rw-r--r--");
    }
}
