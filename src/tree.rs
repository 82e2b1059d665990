//! The tree engine: constructing and querying a `.tree` file.
//!
//! `Db` owns one open file handle positioned over a `.tree` file plus the
//! database name and optional verifier key. All queries are served with
//! positioned reads; no in-memory mirror of the tree is kept. Queries are
//! not safe to call concurrently on the same handle — the file descriptor's
//! position is shared mutable state reused across every seek.

use std::{
    fs::{
        File,
        OpenOptions,
    },
    io::{
        Seek,
        SeekFrom,
        Write,
    },
};

use camino::{
    Utf8Path,
    Utf8PathBuf,
};
use tracing::{
    debug,
    info,
    warn,
};

use crate::{
    error::Error,
    format::{
        self,
        Header,
        Node,
        DATA_SIGNATURE,
        HEADER_SIZE,
        TREE_SIGNATURE,
    },
    hash,
};

/// The root of a tree together with its two children, in `(left, right,
/// root)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootTriple {
    pub left: Node,
    pub right: Node,
    pub root: Node,
}

/// A handle onto an open `.tree` file.
pub struct Db {
    file: File,
    dbname: Utf8PathBuf,
    verifier_key: Option<Vec<u8>>,
    numrecords: u32,
}

impl Db {
    /// Opens `<dbname>.tree`, constructing it from `<dbname>.data` first if
    /// it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingVerifierKey`] if construction is needed but
    /// `verifier_key` is `None`, [`Error::MalformedTree`] if an existing
    /// tree file fails header/size validation, and propagates any
    /// construction or I/O error.
    pub fn open(dbname: impl AsRef<Utf8Path>, verifier_key: Option<&[u8]>) -> Result<Self, Error> {
        let dbname = dbname.as_ref().to_owned();
        let tree_path = tree_path(&dbname);
        let data_path = data_path(&dbname);

        if !tree_path.exists() {
            let key = verifier_key.ok_or(Error::MissingVerifierKey)?;
            construct(&data_path, &tree_path, key)?;
        }

        let mut file = File::open(&tree_path).map_err(Error::Io)?;
        let header = Header::read_from(&mut file)?;
        let numrecords = validate_tree_header(&header, &mut file, &tree_path)?;

        info!(dbname = %dbname, numrecords, "opened tree database");
        Ok(Self {
            file,
            dbname,
            verifier_key: verifier_key.map(<[u8]>::to_vec),
            numrecords,
        })
    }

    #[must_use]
    pub fn dbname(&self) -> &Utf8Path {
        &self.dbname
    }

    #[must_use]
    pub fn numrecords(&self) -> u32 {
        self.numrecords
    }

    #[must_use]
    pub fn verifier_key(&self) -> Option<&[u8]> {
        self.verifier_key.as_deref()
    }

    /// Streams the digest of every node in file order to `out`, one
    /// lowercase-hex digest per line.
    pub fn dump(&mut self, out: &mut impl Write) -> Result<(), Error> {
        const BLOCK: usize = 512;
        let total = total_nodes(self.numrecords) as usize;
        self.file
            .seek(SeekFrom::Start(HEADER_SIZE))
            .map_err(Error::Io)?;

        let mut remaining = total;
        while remaining > 0 {
            let len = remaining.min(BLOCK);
            for _ in 0..len {
                let node = Node::read_from(&mut self.file)?;
                writeln!(out, "{}", hex::encode(node.digest)).map_err(Error::Io)?;
            }
            remaining -= len;
        }
        Ok(())
    }

    /// Returns the root's two children and the root itself.
    ///
    /// Relies on the layout invariant that the last three node records in
    /// the file are always `(root-left-child, root-right-child, root)`.
    pub fn root(&mut self) -> Result<RootTriple, Error> {
        let total = total_nodes(self.numrecords);
        let nodes = format::read_nodes_at(&mut self.file, total - 3, 3)?;
        Ok(RootTriple {
            left: nodes[0],
            right: nodes[1],
            root: nodes[2],
        })
    }

    /// Returns the inclusion-proof chain for leaf `index`: the leaf itself
    /// then each ancestor up to and including the root, `1 + log2(N)`
    /// entries in total.
    pub fn nodes_by_position(&mut self, index: u32) -> Result<Vec<Node>, Error> {
        if index >= self.numrecords {
            return Err(Error::OutOfRange {
                index,
                len: self.numrecords,
            });
        }

        debug!(index, "computing inclusion proof chain");
        let mut chain = Vec::new();
        let mut pos = u64::from(index);
        let mut depthpos: u64 = 0;
        let mut depthlen: u64 = u64::from(self.numrecords);
        while depthlen > 0 {
            let node = format::read_nodes_at(&mut self.file, depthpos + pos, 1)?
                .into_iter()
                .next()
                .expect("read_nodes_at(.., 1) always returns exactly one node");
            chain.push(node);
            pos /= 2;
            depthpos += depthlen;
            depthlen /= 2;
        }
        Ok(chain)
    }

    /// Returns the inclusion-proof chain for the lowest-indexed leaf whose
    /// digest equals `hash`.
    ///
    /// Leaf digests are not guaranteed unique; ties are broken in favour of
    /// the lowest index.
    pub fn nodes_by_hash(&mut self, hash: &[u8; 32]) -> Result<Vec<Node>, Error> {
        const BLOCK: usize = 512;
        self.file
            .seek(SeekFrom::Start(HEADER_SIZE))
            .map_err(Error::Io)?;

        let mut pos: u32 = 0;
        while pos < self.numrecords {
            let len = (self.numrecords - pos).min(BLOCK as u32) as usize;
            for i in 0..len {
                let node = Node::read_from(&mut self.file)?;
                if node.digest == *hash {
                    return self.nodes_by_position(pos + i as u32);
                }
            }
            pos += len as u32;
        }
        Err(Error::HashNotFound)
    }
}

fn data_path(dbname: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{dbname}.data"))
}

fn tree_path(dbname: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{dbname}.tree"))
}

fn total_nodes(numrecords: u32) -> u64 {
    2 * u64::from(numrecords) - 1
}

fn validate_tree_header(
    header: &Header,
    file: &mut File,
    tree_path: &Utf8Path,
) -> Result<u32, Error> {
    let malformed = |reason: &str| Error::MalformedTree {
        reason: format!("{tree_path}: {reason}"),
    };

    if header.signature != TREE_SIGNATURE {
        return Err(malformed("bad signature"));
    }
    if header.numrecords < 2 {
        return Err(malformed("numrecords must be >= 2"));
    }
    if !format::is_power_of_two(header.numrecords) {
        return Err(malformed("numrecords must be a power of two"));
    }
    let fsize = file.seek(SeekFrom::End(0)).map_err(Error::Io)?;
    let expected = format::expected_tree_file_size(header.numrecords);
    if fsize != expected {
        return Err(malformed(&format!(
            "expected file size {expected}, found {fsize}"
        )));
    }
    Ok(header.numrecords)
}

/// Constructs `tree_path` from `data_path` per the leaf-pass/internal-pass
/// algorithm, using the output file itself as scratch space.
///
/// On any failure the partially written tree file is closed and removed, so
/// that the operation is atomic with respect to visible successful
/// completion. This is the idiomatic replacement for the source's
/// `goto fail; unlink();` cleanup path.
pub fn construct(data_path: &Utf8Path, tree_path: &Utf8Path, verifier_key: &[u8]) -> Result<(), Error> {
    info!(%data_path, %tree_path, "constructing tree file");

    let mut data_file = File::open(data_path).map_err(Error::Io)?;
    let data_header = Header::read_from(&mut data_file)?;
    let numrecords = validate_data_header(&data_header, &mut data_file, data_path)?;

    let tree_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tree_path)
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists {
                path: tree_path.to_owned(),
            },
            _ => Error::Io(source),
        })?;

    let result = write_tree_body(tree_file, &mut data_file, numrecords, verifier_key);
    if result.is_err() {
        let _ = std::fs::remove_file(tree_path);
    }
    result?;
    info!(numrecords, "tree file constructed");
    Ok(())
}

/// Writes the header and every node of a freshly created, empty tree file.
///
/// Takes ownership of `tree_file` so it is closed (dropped) before
/// [`construct`] considers removing it on failure.
fn write_tree_body(
    mut tree_file: File,
    data_file: &mut File,
    numrecords: u32,
    verifier_key: &[u8],
) -> Result<(), Error> {
    let header = Header {
        signature: TREE_SIGNATURE,
        numrecords,
    };
    header.write_to(&mut tree_file)?;

    // Leaf pass: hash every value in the data file and append as a leaf node.
    for i in 0..numrecords {
        let value = format::read_value_at(data_file, u64::from(i))?;
        if value < 0 {
            warn!(position = i, value, "leaf contains a negative value");
        }
        let node = Node {
            digest: hash::leaf_hash(i, value),
            value,
        };
        node.write_to(&mut tree_file)?;
    }

    // Internal pass: for each consecutive pair already written, compute and
    // append their parent. The loop runs exactly `numrecords - 1` times,
    // producing every internal node up to and including the root.
    for j in 0..(numrecords - 1) {
        let pair = format::read_nodes_at(&mut tree_file, 2 * u64::from(j), 2)?;
        let parent = hash::combine(verifier_key, &pair[0], &pair[1]);
        tree_file.seek(SeekFrom::End(0)).map_err(Error::Io)?;
        parent.write_to(&mut tree_file)?;
    }

    tree_file.sync_all().map_err(Error::Io)
}

fn validate_data_header(header: &Header, file: &mut File, data_path: &Utf8Path) -> Result<u32, Error> {
    let malformed = |reason: &str| Error::MalformedData {
        reason: format!("{data_path}: {reason}"),
    };

    if header.signature != DATA_SIGNATURE {
        return Err(malformed("bad signature"));
    }
    if header.numrecords < 2 {
        return Err(malformed("numrecords must be >= 2"));
    }
    if !format::is_power_of_two(header.numrecords) {
        return Err(malformed("numrecords must be a power of two"));
    }
    let fsize = file.seek(SeekFrom::End(0)).map_err(Error::Io)?;
    let expected = format::expected_data_file_size(header.numrecords);
    if fsize != expected {
        return Err(malformed(&format!(
            "expected file size {expected}, found {fsize}"
        )));
    }
    Ok(header.numrecords)
}
