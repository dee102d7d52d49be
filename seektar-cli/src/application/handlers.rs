use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use seektar_core::error::Result;
use seektar_core::{Archive, DirFs, EntryInfo, EntryKind, TarOptions, VirtualFs, tar_dir, tar_vfs};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::presentation::cli::SourceArgs;

fn archive_from_args(source: &SourceArgs) -> Result<Archive> {
    let opts = TarOptions {
        prefix: source.prefix.clone(),
        deterministic: source.deterministic,
        follow_links: source.follow_links,
        end_of_archive: !source.no_trailer,
        ..Default::default()
    };
    if source.vfs {
        let fs: Arc<dyn VirtualFs> = Arc::new(DirFs::new(&source.dir));
        tar_vfs(fs, "/", Some(&opts))
    } else {
        tar_dir(&source.dir, Some(&opts))
    }
}

fn copy_range(archive: &Archive, start: u64, len: Option<u64>, out: &mut dyn Write) -> Result<u64> {
    let mut reader = archive
        .aggregate()
        .open_range(start, len.unwrap_or(u64::MAX))?;
    let mut buf = [0u8; 256 * 1024];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        total += n as u64;
    }
    out.flush()?;
    Ok(total)
}

fn format_mtime(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| secs.to_string())
}

fn long_row(e: &EntryInfo) -> String {
    let kind = match e.kind {
        EntryKind::Dir => 'd',
        EntryKind::File => '-',
        EntryKind::Other => '?',
    };
    format!(
        "{}{:04o}  {:>12}  {}  {:>10}  {:>10}  {}",
        kind,
        e.mode,
        e.size,
        format_mtime(e.mtime),
        e.header_offset,
        e.data_offset,
        e.name
    )
}

pub fn handle_info(source: SourceArgs) -> Result<()> {
    let archive = archive_from_args(&source)?;
    println!("size     {}", archive.size());
    println!("pieces   {}", archive.aggregate().len());
    println!("entries  {}", archive.entries().len());
    println!("etag     {}", archive.etag());
    Ok(())
}

pub fn handle_ls(source: SourceArgs, long: bool, json: bool) -> Result<()> {
    let archive = archive_from_args(&source)?;
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, archive.entries()).map_err(std::io::Error::from)?;
        writeln!(out)?;
    } else if long {
        for e in archive.entries() {
            writeln!(out, "{}", long_row(e))?;
        }
    } else {
        for e in archive.entries() {
            writeln!(out, "{}", e.name)?;
        }
    }
    Ok(())
}

pub fn handle_cat(source: SourceArgs, start: u64, len: Option<u64>) -> Result<()> {
    let archive = archive_from_args(&source)?;
    let mut out = std::io::stdout().lock();
    copy_range(&archive, start, len, &mut out)?;
    Ok(())
}

pub fn handle_get(source: SourceArgs, out: PathBuf, start: u64, len: Option<u64>) -> Result<()> {
    let archive = archive_from_args(&source)?;
    let mut file = std::fs::File::create(&out)?;
    let n = copy_range(&archive, start, len, &mut file)?;
    eprintln!("get: {} bytes -> {}", n, out.display());
    Ok(())
}
