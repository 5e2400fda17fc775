use std::path::Path;

use libxml::tree::{Document, Node};

use crate::error::{Error, Result};
use crate::util::{child_element, child_text, find_nodes, read_xml_file};

/// A tweet of a TASS corpus.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub id: String,
    pub content: String,
    pub polarity: Option<String>,
}

/// Read the tweets of a TASS corpus file in document order.
pub fn read_corpus(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let doc = read_xml_file(path)?;
    records(path, &doc)
}

fn records(path: &Path, doc: &Document) -> Result<Vec<Record>> {
    find_nodes(path, doc, "//tweet")?
        .iter()
        .map(|tweet| record(path, tweet))
        .collect()
}

fn record(path: &Path, tweet: &Node) -> Result<Record> {
    let id = child_text(tweet, "tweetid").ok_or_else(|| Error::MissingField {
        path: path.to_owned(),
        field: "tweetid",
    })?;

    let content = child_text(tweet, "content").unwrap_or_default();

    let polarity = child_element(tweet, "sentiments")
        .and_then(|sentiments| child_element(&sentiments, "polarity"))
        .and_then(|polarity| child_text(&polarity, "value"));

    Ok(Record {
        id,
        content,
        polarity,
    })
}
