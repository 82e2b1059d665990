//! Synthetic data-file generator.
//!
//! An external collaborator in spec terms (the `gendata` CLI mode): it
//! writes a fixed eight-leaf `.data` file and removes any stale `.tree` file
//! for the same database so that the next `Db::open` regenerates it.

use std::{
    fs::OpenOptions,
    io::Write,
};

use camino::{
    Utf8Path,
    Utf8PathBuf,
};

use crate::{
    error::Error,
    format::{
        Header,
        DATA_SIGNATURE,
    },
};

/// The fixed test vector used by the `gendata` CLI mode (spec scenario S1).
pub const TEST_VALUES: [i64; 8] = [1000, 2000, 3000, 5000, -2000, 8000, 4000, 2000];

/// Writes `<dbname>.data` with [`TEST_VALUES`] and removes `<dbname>.tree`
/// if present, so that the tree is regenerated on next open.
///
/// # Errors
///
/// Returns [`Error::AlreadyExists`] if `<dbname>.data` already exists.
pub fn generate(dbname: &Utf8Path) -> Result<(), Error> {
    let data_path = Utf8PathBuf::from(format!("{dbname}.data"));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&data_path)
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists {
                path: data_path.clone(),
            },
            _ => Error::Io(source),
        })?;

    let header = Header {
        signature: DATA_SIGNATURE,
        numrecords: TEST_VALUES.len() as u32,
    };
    header.write_to(&mut file)?;
    for value in TEST_VALUES {
        file.write_all(&value.to_le_bytes()).map_err(Error::Io)?;
    }

    let tree_path = Utf8PathBuf::from(format!("{dbname}.tree"));
    let _ = std::fs::remove_file(&tree_path);
    Ok(())
}
