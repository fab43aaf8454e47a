//! Ordered HCL document builder.
//!
//! A [`Body`] is a list of attributes, blocks and blank lines kept in the
//! order they were appended. Attribute values are token text produced by
//! [`crate::render`]; the builder only lays them out.

use crate::render::quote_string;

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Structure {
    Attribute { key: String, tokens: String },
    Block(Block),
    Newline,
}

/// A block such as `module "network" { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    identifier: String,
    labels: Vec<String>,
    body: Body,
}

impl Block {
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// Body of a document or block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    structures: Vec<Structure>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute from raw token text.
    pub fn set_attribute_raw(&mut self, key: impl Into<String>, tokens: impl Into<String>) {
        self.structures.push(Structure::Attribute {
            key: key.into(),
            tokens: tokens.into(),
        });
    }

    /// Append a block and return its body for filling in.
    pub fn append_block<I, S>(&mut self, identifier: impl Into<String>, labels: I) -> &mut Body
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structures.push(Structure::Block(Block {
            identifier: identifier.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            body: Body::new(),
        }));
        match self.structures.last_mut() {
            Some(Structure::Block(block)) => block.body_mut(),
            _ => unreachable!("block was just pushed"),
        }
    }

    /// Append a block without labels.
    pub fn append_plain_block(&mut self, identifier: impl Into<String>) -> &mut Body {
        self.append_block(identifier, std::iter::empty::<String>())
    }

    pub fn append_newline(&mut self) {
        self.structures.push(Structure::Newline);
    }

    /// Render the body. With `aligned`, the `=` of consecutive attributes
    /// line up the way `terraform fmt` lays them out.
    pub fn to_hcl(&self, aligned: bool) -> String {
        let mut out = String::new();
        self.write_into(&mut out, 0, aligned);
        out
    }

    fn write_into(&self, out: &mut String, depth: usize, aligned: bool) {
        let indent = INDENT.repeat(depth);

        for (idx, structure) in self.structures.iter().enumerate() {
            match structure {
                Structure::Attribute { key, tokens } => {
                    let width = if aligned { self.run_key_width(idx) } else { key.len() };
                    out.push_str(&indent);
                    out.push_str(&format!("{:<width$} = {}\n", key, tokens, width = width));
                }
                Structure::Block(block) => {
                    out.push_str(&indent);
                    out.push_str(&block.identifier);
                    for label in &block.labels {
                        out.push(' ');
                        out.push_str(&quote_string(label));
                    }
                    out.push_str(" {\n");
                    block.body.write_into(out, depth + 1, aligned);
                    out.push_str(&indent);
                    out.push_str("}\n");
                }
                Structure::Newline => out.push('\n'),
            }
        }
    }

    /// Widest key in the run of consecutive attributes containing `idx`.
    fn run_key_width(&self, idx: usize) -> usize {
        let is_attr = |s: &Structure| matches!(s, Structure::Attribute { .. });

        let start = self.structures[..idx]
            .iter()
            .rposition(|s| !is_attr(s))
            .map_or(0, |p| p + 1);
        let end = self.structures[idx..]
            .iter()
            .position(|s| !is_attr(s))
            .map_or(self.structures.len(), |p| idx + p);

        self.structures[start..end]
            .iter()
            .filter_map(|s| match s {
                Structure::Attribute { key, .. } => Some(key.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}
