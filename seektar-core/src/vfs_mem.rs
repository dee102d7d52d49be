// seektar_core/src/vfs_mem.rs
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::Arc;

use crate::domain::EntryMeta;
use crate::segment::ReadSeek;
use crate::vfs::{VirtualFs, clean};

#[derive(Clone, Debug)]
enum Node {
    File { meta: EntryMeta, data: Arc<[u8]> },
    Dir { meta: EntryMeta },
}

/// In-memory virtual tree. Parent directories are created on insert.
#[derive(Clone, Debug)]
pub struct MemFs {
    nodes: BTreeMap<String, Node>,
}

impl Default for MemFs {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "/".to_string(),
            Node::Dir {
                meta: EntryMeta::dir(0o755),
            },
        );
        Self { nodes }
    }
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: &str, data: impl Into<Vec<u8>>, mode: u32) -> io::Result<()> {
        let path = checked(path)?;
        let data: Vec<u8> = data.into();
        let data: Arc<[u8]> = data.into();
        self.add_parents(&path);
        let meta = EntryMeta::file(data.len() as u64, mode);
        self.nodes.insert(path, Node::File { meta, data });
        Ok(())
    }

    pub fn add_dir(&mut self, path: &str, mode: u32) -> io::Result<()> {
        let path = checked(path)?;
        self.add_parents(&path);
        self.nodes.insert(
            path,
            Node::Dir {
                meta: EntryMeta::dir(mode),
            },
        );
        Ok(())
    }

    /// Override the modification time of an existing entry.
    pub fn set_mtime(&mut self, path: &str, mtime: u64) -> io::Result<()> {
        let path = checked(path)?;
        match self.nodes.get_mut(&path) {
            Some(Node::File { meta, .. }) | Some(Node::Dir { meta }) => {
                meta.mtime = mtime;
                Ok(())
            }
            None => Err(not_found(&path)),
        }
    }

    fn add_parents(&mut self, path: &str) {
        let mut cur = path;
        while let Some(idx) = cur.rfind('/') {
            cur = &cur[..idx];
            let parent = if cur.is_empty() { "/" } else { cur };
            self.nodes
                .entry(parent.to_string())
                .or_insert_with(|| Node::Dir {
                    meta: EntryMeta::dir(0o755),
                });
            if cur.is_empty() {
                break;
            }
        }
    }

    fn node(&self, path: &str) -> io::Result<&Node> {
        let path = checked(path)?;
        self.nodes.get(&path).ok_or_else(|| not_found(&path))
    }
}

impl VirtualFs for MemFs {
    fn metadata(&self, path: &str) -> io::Result<EntryMeta> {
        match self.node(path)? {
            Node::File { meta, .. } | Node::Dir { meta } => Ok(meta.clone()),
        }
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let dir = checked(path)?;
        match self.nodes.get(&dir) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a directory: {dir}"),
                ));
            }
            None => return Err(not_found(&dir)),
        }
        let prefix = if dir == "/" { dir } else { format!("{dir}/") };
        let names = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .filter_map(|(p, _)| {
                let rest = &p[prefix.len()..];
                (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        Ok(names)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn ReadSeek>> {
        match self.node(path)? {
            Node::File { data, .. } => Ok(Box::new(Cursor::new(data.clone()))),
            Node::Dir { .. } => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {path}"),
            )),
        }
    }
}

fn checked(path: &str) -> io::Result<String> {
    clean(path).ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("unsafe path: {path}")))
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {path}"))
}
