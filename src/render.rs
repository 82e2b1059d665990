//! Stdout rendering for the CLI's query modes.
//!
//! Kept separate from [`crate::cli`] and [`crate::tree`] so that the exact
//! text format (`"Root <value>: <hex>"`, `"<index>: <hex>"`, …) lives in one
//! place and the query logic itself stays decoupled from presentation.

use std::io::Write;

use crate::{
    format::Node,
    tree::RootTriple,
};

pub fn root(out: &mut impl Write, triple: &RootTriple) -> std::io::Result<()> {
    writeln!(out, "Root {}: {}", triple.root.value, hex::encode(triple.root.digest))?;
    writeln!(out, "Left: {}", hex::encode(triple.left.digest))?;
    writeln!(out, "Right: {}", hex::encode(triple.right.digest))?;
    Ok(())
}

pub fn chain(out: &mut impl Write, nodes: &[Node]) -> std::io::Result<()> {
    for (index, node) in nodes.iter().enumerate() {
        writeln!(out, "{index}: {}", hex::encode(node.digest))?;
    }
    Ok(())
}
