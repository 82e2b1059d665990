//! Command-line surface.
//!
//! The grammar fixed by the specification — `<dbname> [key=<verifier>]
//! [<position> | <hash> | root | dump | gendata]` — disambiguates its mode
//! token by *shape* rather than by flag name, which doesn't fit `clap`'s
//! ordinary subcommand model. `Cli` uses `clap::Parser` for the plumbing
//! `clap` is good at (help/version text, collecting the dbname and the
//! trailing tokens); [`resolve`] hand-rolls the source's shape-based
//! recognition over those tokens, mirroring `astria-cli`'s split between a
//! thin derived `Parser` and hand-written command resolution.

use camino::Utf8PathBuf;
use clap::Parser;

/// A proof-of-solvency audit database: construct a keyed summation Merkle
/// tree from a data file and answer inclusion-proof queries against it.
#[derive(Debug, Parser)]
#[command(name = "solvency-audit", version, about)]
pub struct Cli {
    /// Base name shared by the `<dbname>.data` and `<dbname>.tree` files.
    pub dbname: Utf8PathBuf,

    /// `key=<verifier>`, a mode keyword (`root`, `dump`, `gendata`), a
    /// 64-character hex leaf hash, or a decimal leaf position. At most one
    /// mode token may be given; default mode is `root`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

/// The resolved query mode, after shape-based recognition of the trailing
/// tokens.
#[derive(Debug, Clone, Copy)]
pub enum Mode {
    Root,
    Dump,
    GenTestData,
    Position(u32),
    Hash([u8; 32]),
}

/// The fully-resolved invocation: database name, optional verifier key, and
/// mode.
#[derive(Debug)]
pub struct Resolved {
    pub dbname: Utf8PathBuf,
    pub verifier_key: Option<Vec<u8>>,
    pub mode: Mode,
}

/// Resolves the trailing tokens of a [`Cli`] into a [`Resolved`]
/// invocation.
///
/// # Errors
///
/// Returns an error describing the first unrecognised, malformed, or
/// duplicate-mode token encountered.
pub fn resolve(cli: Cli) -> Result<Resolved, String> {
    let mut verifier_key = None;
    let mut mode = None;

    for token in cli.rest {
        if let Some(key) = token.strip_prefix("key=") {
            verifier_key = Some(key.as_bytes().to_vec());
        } else if token == "dump" {
            set_mode(&mut mode, Mode::Dump)?;
        } else if token == "root" {
            set_mode(&mut mode, Mode::Root)?;
        } else if token == "gendata" {
            set_mode(&mut mode, Mode::GenTestData)?;
        } else if token.len() == 64 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
            let mut hash = [0u8; 32];
            hex::decode_to_slice(&token, &mut hash)
                .map_err(|_| format!("invalid hash value: {token}"))?;
            set_mode(&mut mode, Mode::Hash(hash))?;
        } else if token.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            let position: u32 = token
                .parse()
                .map_err(|_| format!("invalid position value: {token}"))?;
            set_mode(&mut mode, Mode::Position(position))?;
        } else {
            return Err(format!("unknown option: {token}"));
        }
    }

    Ok(Resolved {
        dbname: cli.dbname,
        verifier_key,
        mode: mode.unwrap_or(Mode::Root),
    })
}

fn set_mode(mode: &mut Option<Mode>, new: Mode) -> Result<(), String> {
    if mode.is_some() {
        return Err("more than one mode was specified".to_string());
    }
    *mode = Some(new);
    Ok(())
}
