use std::path::Path;

use libxml::parser::{Parser, ParserOptions};
use libxml::tree::{Document, Node};
use libxml::xpath::Context;

use crate::error::{Error, Result};

fn strict_options() -> ParserOptions<'static> {
    ParserOptions {
        recover: false,
        ..ParserOptions::default()
    }
}

/// Parse an XML file, failing on malformed documents.
pub fn read_xml_file(path: &Path) -> Result<Document> {
    let filename = path
        .to_str()
        .ok_or_else(|| Error::parse(path, "path is not valid UTF-8"))?;
    Parser::default()
        .parse_file_with_options(filename, strict_options())
        .map_err(|err| Error::parse(path, format!("{:?}", err)))
}

/// Evaluate an XPath expression, returning the matching nodes in document order.
pub fn find_nodes(path: &Path, doc: &Document, xpath: &str) -> Result<Vec<Node>> {
    let context =
        Context::new(doc).map_err(|_| Error::parse(path, "cannot create XPath context"))?;
    let found = context
        .evaluate(xpath)
        .map_err(|_| Error::parse(path, format!("cannot evaluate `{}`", xpath)))?;
    Ok(found.get_nodes_as_vec())
}

/// The first child element with the given name.
pub fn child_element(node: &Node, name: &str) -> Option<Node> {
    node.get_child_elements()
        .into_iter()
        .find(|child| child.get_name() == name)
}

/// Text content of the first child element with the given name.
pub fn child_text(node: &Node, name: &str) -> Option<String> {
    child_element(node, name).map(|child| child.get_content())
}
