use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seektar_core::{
    Archive, DirFs, EntryKind, MemFs, NoOwners, TarOptions, VirtualFs, tar_dir, tar_vfs,
};

fn long_dir() -> String {
    "a".repeat(50)
}

fn long_file() -> String {
    "b".repeat(80)
}

fn fixture(root: &Path) {
    fs::write(root.join("file1"), b"testing").unwrap();
    fs::write(root.join("file2"), b"toasting123").unwrap();
    let sub = root.join(long_dir());
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join(long_file()), vec![b'x'; 700]).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(root.join("file1"), fs::Permissions::from_mode(0o654)).unwrap();
    }
}

fn opts(prefix: &str) -> TarOptions {
    TarOptions {
        prefix: prefix.to_string(),
        deterministic: true,
        owners: Arc::new(NoOwners),
        ..Default::default()
    }
}

fn read_all(archive: &Archive) -> Vec<u8> {
    let mut data = Vec::new();
    archive.open().read_to_end(&mut data).unwrap();
    data
}

/// (path, is_dir, content) of every member, as the `tar` crate sees them.
fn members(data: &[u8]) -> Vec<(String, bool, Vec<u8>)> {
    let mut out = Vec::new();
    let mut ar = tar::Archive::new(data);
    for e in ar.entries().unwrap() {
        let mut e = e.unwrap();
        let path = e.path().unwrap().to_string_lossy().to_string();
        let is_dir = e.header().entry_type().is_dir();
        let mut content = Vec::new();
        e.read_to_end(&mut content).unwrap();
        out.push((path, is_dir, content));
    }
    out
}

#[test]
fn two_files_read_back_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file1"), b"testing").unwrap();
    fs::write(dir.path().join("file2"), b"toasting123").unwrap();

    let archive = tar_dir(dir.path(), None).unwrap();
    let data = read_all(&archive);
    assert_eq!(data.len(), 4 * 512 + 1024);

    let got = members(&data);
    assert_eq!(got.len(), 2);
    assert_eq!((got[0].0.as_str(), got[0].2.as_slice()), ("file1", &b"testing"[..]));
    assert_eq!((got[1].0.as_str(), got[1].2.as_slice()), ("file2", &b"toasting123"[..]));
}

#[test]
fn directory_without_prefix() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let archive = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let data = read_all(&archive);
    assert_eq!(data.len() as u64, archive.size());
    assert_eq!(data.len() % 512, 0);

    let long = format!("{}/{}", long_dir(), long_file());
    let got = members(&data);
    let names: Vec<&str> = got.iter().map(|(n, _, _)| n.trim_end_matches('/')).collect();
    assert_eq!(names, vec![long_dir().as_str(), long.as_str(), "file1", "file2"]);
    assert!(got[0].1);
    assert_eq!(got[1].2, vec![b'x'; 700]);
    assert_eq!(got[2].2, b"testing");
    assert_eq!(got[3].2, b"toasting123");
}

#[test]
fn directory_with_prefix() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let archive = tar_dir(dir.path(), Some(&opts("Dir"))).unwrap();
    let got = members(&read_all(&archive));
    let names: Vec<String> = got
        .iter()
        .map(|(n, _, _)| n.trim_end_matches('/').to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "Dir".to_string(),
            format!("Dir/{}", long_dir()),
            format!("Dir/{}/{}", long_dir(), long_file()),
            "Dir/file1".to_string(),
            "Dir/file2".to_string(),
        ]
    );
    assert!(got[0].1);
}

#[cfg(unix)]
#[test]
fn permissions_survive() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let archive = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let data = read_all(&archive);
    let mut ar = tar::Archive::new(&data[..]);
    let file1 = ar
        .entries()
        .unwrap()
        .map(|e| e.unwrap())
        .find(|e| e.path().unwrap().to_string_lossy() == "file1")
        .unwrap();
    assert_eq!(file1.header().mode().unwrap(), 0o654);
    assert_eq!(file1.header().mtime().unwrap(), 0);
}

#[test]
fn entry_table_points_into_stream() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let archive = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let data = read_all(&archive);
    for info in archive.entries() {
        let header = tar::Header::from_byte_slice(
            &data[info.header_offset as usize..info.header_offset as usize + 512],
        );
        assert_eq!(header.size().unwrap(), info.size);
        if info.kind == EntryKind::File {
            let mut content = Vec::new();
            archive
                .aggregate()
                .open_range(info.data_offset, info.size)
                .unwrap()
                .read_to_end(&mut content)
                .unwrap();
            let start = info.data_offset as usize;
            assert_eq!(content, &data[start..start + info.size as usize]);
        }
    }
}

#[test]
fn trailer_is_optional() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let with = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let without = tar_dir(
        dir.path(),
        Some(&TarOptions {
            end_of_archive: false,
            ..opts("")
        }),
    )
    .unwrap();
    assert_eq!(with.size(), without.size() + 1024);
    let data = read_all(&with);
    assert!(data[data.len() - 1024..].iter().all(|&b| b == 0));
    assert_eq!(members(&read_all(&without)).len(), 4);
}

#[test]
fn local_and_virtual_walks_agree() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let local = tar_dir(dir.path(), Some(&opts("Dir"))).unwrap();
    let vfs: Arc<dyn VirtualFs> = Arc::new(DirFs::new(dir.path()));
    let virt = tar_vfs(vfs, "/", Some(&opts("Dir"))).unwrap();

    assert_eq!(local.entries(), virt.entries());
    assert_eq!(read_all(&local), read_all(&virt));
}

#[test]
fn memory_tree_subdirectory() {
    let mut fs = MemFs::new();
    fs.add_file("/srv/www/index.html", b"<html></html>".to_vec(), 0o644)
        .unwrap();
    fs.add_file("/srv/www/css/site.css", b"body{}".to_vec(), 0o600)
        .unwrap();
    fs.add_file("/etc/hosts", b"127.0.0.1 localhost".to_vec(), 0o644)
        .unwrap();

    let archive = tar_vfs(Arc::new(fs), "/srv/www/", Some(&opts("site"))).unwrap();
    let got = members(&read_all(&archive));
    let names: Vec<String> = got
        .iter()
        .map(|(n, _, _)| n.trim_end_matches('/').to_string())
        .collect();
    assert_eq!(names, vec!["site", "site/css", "site/css/site.css", "site/index.html"]);
    assert_eq!(got[3].2, b"<html></html>");
}

#[test]
fn virtual_walk_rejects_escaping_root() {
    let fs: Arc<dyn VirtualFs> = Arc::new(MemFs::new());
    assert!(tar_vfs(fs, "/../etc", None).is_err());
}

#[test]
fn random_seeks_match_linear_read() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let archive = tar_dir(dir.path(), Some(&opts("Dir"))).unwrap();
    let data = read_all(&archive);
    let size = data.len() as u64;

    let mut rng = StdRng::seed_from_u64(0x5eec);
    let mut cur = archive.open();
    for _ in 0..500 {
        let at = rng.random_range(0..size);
        let len = rng.random_range(1..=1500usize);
        let pos = match rng.random_range(0..3) {
            0 => cur.seek(SeekFrom::Start(at)).unwrap(),
            1 => {
                let here = cur.position() as i64;
                cur.seek(SeekFrom::Current(at as i64 - here)).unwrap()
            }
            _ => cur.seek(SeekFrom::End(at as i64 - size as i64)).unwrap(),
        };
        assert_eq!(pos, at);

        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = cur.read(&mut buf[filled..]).unwrap();
            if n == 0 {
                break;
            }
            filled += n;
        }
        let end = (at as usize + len).min(data.len());
        assert_eq!(&buf[..filled], &data[at as usize..end]);
    }
}

#[test]
fn concurrent_cursors_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let archive = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let expect = read_all(&archive);

    std::thread::scope(|s| {
        for i in 0..4u64 {
            let archive = &archive;
            let expect = &expect;
            s.spawn(move || {
                let mut cur = archive.open();
                let start = i * 300;
                cur.seek(SeekFrom::Start(start)).unwrap();
                let mut got = Vec::new();
                cur.read_to_end(&mut got).unwrap();
                assert_eq!(got, &expect[start as usize..]);
            });
        }
    });
}

#[test]
fn etag_is_stable_and_tracks_content() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());

    let a = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let b = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    assert_eq!(a.etag(), b.etag());
    assert_eq!(a.etag().len(), 64);

    let c = tar_dir(dir.path(), Some(&opts("other"))).unwrap();
    assert_ne!(a.etag(), c.etag());
}

fn entry_names(archive: &Archive) -> Vec<&str> {
    archive.entries().iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn sibling_order_matches_between_walks() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a/x"), b"x").unwrap();
    fs::write(dir.path().join("a-b"), b"ab").unwrap();

    let local = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let vfs: Arc<dyn VirtualFs> = Arc::new(DirFs::new(dir.path()));
    let virt = tar_vfs(vfs, "/", Some(&opts(""))).unwrap();

    assert_eq!(entry_names(&local), vec!["a", "a/x", "a-b"]);
    assert_eq!(entry_names(&virt), entry_names(&local));
    assert_eq!(read_all(&virt), read_all(&local));
}

#[cfg(unix)]
#[test]
fn self_referencing_link_is_skipped_by_both_walks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("f"), b"data").unwrap();
    std::os::unix::fs::symlink(".", dir.path().join("loop")).unwrap();

    let local = tar_dir(dir.path(), Some(&opts(""))).unwrap();
    let vfs: Arc<dyn VirtualFs> = Arc::new(DirFs::new(dir.path()));
    let virt = tar_vfs(vfs, "/", Some(&opts(""))).unwrap();

    assert_eq!(entry_names(&local), vec!["f"]);
    assert_eq!(entry_names(&virt), vec!["f"]);
}

#[cfg(unix)]
#[test]
fn followed_links_stay_inside_the_virtual_root() {
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("secret"), b"s3cr3t").unwrap();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("f"), b"data").unwrap();
    std::os::unix::fs::symlink(dir.path().join("f"), dir.path().join("g")).unwrap();

    let follow = TarOptions {
        follow_links: true,
        ..opts("")
    };
    let vfs: Arc<dyn VirtualFs> = Arc::new(DirFs::new(dir.path()));
    let virt = tar_vfs(vfs.clone(), "/", Some(&follow)).unwrap();
    let got = members(&read_all(&virt));
    assert_eq!(got.len(), 2);
    assert_eq!((got[1].0.as_str(), got[1].2.as_slice()), ("g", &b"data"[..]));

    std::os::unix::fs::symlink(outside.path().join("secret"), dir.path().join("leak")).unwrap();
    assert!(tar_vfs(vfs.clone(), "/", Some(&follow)).is_err());
    assert_eq!(entry_names(&tar_vfs(vfs, "/", Some(&opts(""))).unwrap()), vec!["f"]);
}
