//! Reading tree files.
//!
//! A file is tried against an ordered list of formats (Newick, then NEXUS by
//! default) and the first one that parses wins. NEXUS input takes the first
//! TREE statement of the TREES block and applies its TRANSLATE table. Bracket
//! comments are stripped, `.gz` files are decompressed, and malformed input
//! always ends in a [`CompareError`] rather than a panic.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use flate2::read::GzDecoder;
use phylotree::tree::Tree as PhyloTree;

use crate::error::{CompareError, CompareResult};

/// Tree description formats understood by [`read_tree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeFormat {
    Newick,
    Nexus,
}

impl TreeFormat {
    /// Newick first, NEXUS as the fallback.
    pub const DEFAULT_ORDER: [TreeFormat; 2] = [TreeFormat::Newick, TreeFormat::Nexus];

    /// Parse the first tree found in `content`.
    pub fn parse(self, content: &str) -> CompareResult<PhyloTree> {
        match self {
            TreeFormat::Newick => parse_newick(content),
            TreeFormat::Nexus => parse_nexus(content),
        }
    }
}

impl fmt::Display for TreeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeFormat::Newick => write!(f, "newick"),
            TreeFormat::Nexus => write!(f, "nexus"),
        }
    }
}

/// Read a single tree from `path`, trying each format of `formats` in order.
///
/// The first format that parses wins. If every format fails the error lists
/// each attempt with its own message. Files ending in `.gz` are decompressed
/// before parsing.
pub fn read_tree<P: AsRef<Path>>(path: P, formats: &[TreeFormat]) -> CompareResult<PhyloTree> {
    let path = path.as_ref();
    let content = read_text(path)?;

    let mut attempts = Vec::with_capacity(formats.len());
    for (idx, &format) in formats.iter().enumerate() {
        match format.parse(&content) {
            Ok(tree) => return Ok(tree),
            Err(e) => {
                if let Some(next) = formats.get(idx + 1) {
                    log::warn!("Error reading {} as {format}, trying {next}: {e}", path.display());
                }
                attempts.push((format, e.to_string()));
            }
        }
    }

    Err(CompareError::Parse { path: path.to_path_buf(), attempts })
}

fn read_text(path: &Path) -> CompareResult<String> {
    let io_err = |source| CompareError::Io { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(io_err)?;

    let is_gz = path.to_string_lossy().ends_with(".gz");
    let mut reader: Box<dyn Read> = if is_gz {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut content = String::new();
    reader.read_to_string(&mut content).map_err(io_err)?;
    Ok(content)
}

/// Remove bracket comments such as `[&R]` or BEAST annotations
/// (`:[&rate=0.123]2.45` becomes `:2.45`). Nested brackets are handled.
fn strip_comments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => result.push(ch),
            _ => {}
        }
    }

    result
}

fn is_structural(ch: char) -> bool {
    matches!(ch, '(' | ')' | ',' | ':' | ';')
}

/// Reduce Newick text to the single-line form `phylotree` expects.
///
/// Whitespace next to structural characters is dropped, whitespace inside a
/// label collapses to one space, and everything after the first `;` is ignored.
fn normalize_newick(text: &str) -> CompareResult<String> {
    let stripped = strip_comments(text);
    let end = stripped
        .find(';')
        .ok_or_else(|| CompareError::Format("missing ';' terminator".to_string()))?;

    let chars: Vec<char> = stripped[..end].chars().collect();
    let mut out = String::with_capacity(chars.len() + 1);

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_whitespace() {
            out.push(ch);
            continue;
        }
        let prev = out.chars().last();
        let next = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
        if let (Some(p), Some(n)) = (prev, next) {
            if p != ' ' && !is_structural(p) && !is_structural(n) {
                out.push(' ');
            }
        }
    }

    if !out.starts_with('(') {
        return Err(CompareError::Format(
            "expected a Newick tree starting with '('".to_string(),
        ));
    }
    if !is_balanced(&out) {
        return Err(CompareError::Format("unbalanced parentheses".to_string()));
    }

    out.push(';');
    Ok(out)
}

/// Parentheses outside quoted labels never close below depth zero and the
/// tree ends back at depth zero.
fn is_balanced(newick: &str) -> bool {
    let mut depth = 0i64;
    let mut quote: Option<char> = None;

    for ch in newick.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0 && quote.is_none()
}

fn parse_newick(content: &str) -> CompareResult<PhyloTree> {
    let newick = normalize_newick(content)?;
    // phylotree panics on some malformed input instead of returning an error
    let parsed = panic::catch_unwind(AssertUnwindSafe(|| PhyloTree::from_newick(&newick)))
        .map_err(|_| CompareError::Format("malformed Newick tree".to_string()))?;
    let mut tree = parsed.map_err(|e| CompareError::Format(e.to_string()))?;
    unquote_leaf_labels(&mut tree)?;
    Ok(tree)
}

fn parse_nexus(content: &str) -> CompareResult<PhyloTree> {
    let stripped = strip_comments(content);
    if !stripped.trim_start().to_ascii_uppercase().starts_with("#NEXUS") {
        return Err(CompareError::Format("missing #NEXUS header".to_string()));
    }

    let block = collect_trees_block(&stripped);
    let first = block
        .trees
        .first()
        .ok_or_else(|| CompareError::Format("no TREE statement in a TREES block".to_string()))?;

    let mut tree = parse_newick(&first.body).map_err(|e| {
        CompareError::Format(format!("tree '{}': {e}", first.name))
    })?;

    if !block.translate.is_empty() {
        rename_leaf_nodes(&mut tree, &block.translate)?;
    }

    Ok(tree)
}

struct TreeStatement<'a> {
    name: &'a str,
    body: String,
}

#[derive(Default)]
struct TreesBlock<'a> {
    translate: HashMap<String, String>,
    trees: Vec<TreeStatement<'a>>,
}

/// Split the document into `;`-terminated statements and pick out the
/// TRANSLATE table and TREE statements of the first TREES block.
fn collect_trees_block(content: &str) -> TreesBlock<'_> {
    let mut block = TreesBlock::default();
    let mut in_block = false;

    for statement in content.split(';') {
        let words: Vec<&str> = statement.split_whitespace().collect();

        if !in_block {
            in_block = matches!(
                words.as_slice(),
                [.., begin, kind] if begin.eq_ignore_ascii_case("begin") && kind.eq_ignore_ascii_case("trees")
            );
            continue;
        }

        let Some(keyword) = words.first() else { continue };
        let rest = statement.trim_start()[keyword.len()..].trim();

        match keyword.to_ascii_lowercase().as_str() {
            "end" | "endblock" => break,
            "translate" => block.translate.extend(parse_translate(rest)),
            "tree" | "utree" => {
                if let Some((header, body)) = rest.split_once('=') {
                    block.trees.push(TreeStatement {
                        name: header.trim().trim_start_matches('*').trim(),
                        body: format!("{};", body.trim()),
                    });
                }
            }
            _ => {}
        }
    }

    block
}

// STRUCTURE:
// 1 '1959.M.CD.59.ZR59',
// 2 Homo_sapiens
fn parse_translate(body: &str) -> impl Iterator<Item = (String, String)> + '_ {
    body.split(',').filter_map(|entry| {
        let mut parts = entry.trim().splitn(2, char::is_whitespace);
        let id = parts.next()?.trim();
        let label = unquote(parts.next()?.trim());
        (!id.is_empty() && !label.is_empty()).then(|| (id.to_string(), label.to_string()))
    })
}

fn unquote(label: &str) -> &str {
    let bytes = label.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &label[1..label.len() - 1];
        }
    }
    label
}

fn unquote_leaf_labels(tree: &mut PhyloTree) -> CompareResult<()> {
    for leaf_id in tree.get_leaves() {
        let node = tree
            .get_mut(&leaf_id)
            .map_err(|e| CompareError::Tree(e.to_string()))?;
        if let Some(name) = node.name.as_mut() {
            let unquoted = unquote(name.trim()).to_string();
            *name = unquoted;
        }
    }
    Ok(())
}

/// Replace TRANSLATE ids on leaves with their labels. Leaves whose name has
/// no entry keep it unchanged.
pub fn rename_leaf_nodes(
    tree: &mut PhyloTree,
    translate: &HashMap<String, String>,
) -> CompareResult<()> {
    for leaf_id in tree.get_leaves() {
        let node = tree
            .get_mut(&leaf_id)
            .map_err(|e| CompareError::Tree(e.to_string()))?;
        if let Some(label) = node.name.as_ref().and_then(|n| translate.get(n)) {
            node.name = Some(label.clone());
        }
    }
    Ok(())
}
