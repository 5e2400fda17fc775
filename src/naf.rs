use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;

use libxml::tree::{Document, Node, SaveOptions};

use crate::error::{Error, Result};
use crate::tokenizer::Token;
use crate::util::{find_nodes, read_xml_file};

/// NAF version written by default.
pub const NAF_VERSION: &str = "v1.naf";

/// A word form (`wf`) layer entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordForm {
    pub id: String,
    pub sent: usize,
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

/// A document-level topic, used to store the polarity of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Topic {
    pub value: String,
    pub source: Option<String>,
    pub method: Option<String>,
    pub confidence: Option<f64>,
}

impl Topic {
    pub fn new(value: impl Into<String>) -> Self {
        Topic {
            value: value.into(),
            source: None,
            method: None,
            confidence: None,
        }
    }
}

/// In-memory NAF annotation document.
///
/// Only the layers used for sentiment corpora are represented: the
/// header's public identifier, the text layer and the topics layer.
#[derive(Clone, Debug, PartialEq)]
pub struct NafDocument {
    lang: String,
    version: String,
    public_id: Option<String>,
    word_forms: Vec<WordForm>,
    topics: Vec<Topic>,
}

impl NafDocument {
    pub fn new(lang: impl Into<String>, version: impl Into<String>) -> Self {
        NafDocument {
            lang: lang.into(),
            version: version.into(),
            public_id: None,
            word_forms: Vec::new(),
            topics: Vec::new(),
        }
    }

    /// Read a NAF document from a file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = read_xml_file(path)?;
        Self::from_xml(path, &doc)
    }

    /// Add a token as word form of sentence `sent`.
    ///
    /// Word form identifiers are assigned sequentially (`w1`, `w2`, ...).
    pub fn add_word_form(&mut self, token: &Token, sent: usize) {
        let id = format!("w{}", self.word_forms.len() + 1);
        self.word_forms.push(WordForm {
            id,
            sent,
            offset: token.offset(),
            length: token.length(),
            text: token.text().to_owned(),
        });
    }

    pub fn add_topic(&mut self, topic: Topic) {
        self.topics.push(topic);
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    pub fn set_public_id(&mut self, public_id: impl Into<String>) {
        self.public_id = Some(public_id.into());
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn word_forms(&self) -> &[WordForm] {
        &self.word_forms
    }

    /// Serialize the document as NAF XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut doc = Document::new().map_err(build_error)?;
        let mut root = Node::new("NAF", None, &doc).map_err(build_error)?;
        doc.set_root_element(&root);
        root.set_attribute("xml:lang", &self.lang).map_err(build_error)?;
        root.set_attribute("version", &self.version).map_err(build_error)?;

        let mut header = root.new_child(None, "nafHeader").map_err(build_error)?;
        if let Some(public_id) = &self.public_id {
            let mut public = header.new_child(None, "public").map_err(build_error)?;
            public
                .set_attribute("publicId", public_id)
                .map_err(build_error)?;
        }

        let mut text = root.new_child(None, "text").map_err(build_error)?;
        for wf in &self.word_forms {
            let mut node = text.new_child(None, "wf").map_err(build_error)?;
            for (attr, value) in &[
                ("id", wf.id.clone()),
                ("sent", wf.sent.to_string()),
                ("offset", wf.offset.to_string()),
                ("length", wf.length.to_string()),
            ] {
                node.set_attribute(attr, value).map_err(build_error)?;
            }
            node.append_text(&wf.text).map_err(build_error)?;
        }

        if !self.topics.is_empty() {
            let mut topics = root.new_child(None, "topics").map_err(build_error)?;
            for topic in &self.topics {
                let mut node = topics.new_child(None, "topic").map_err(build_error)?;
                if let Some(source) = &topic.source {
                    node.set_attribute("source", source).map_err(build_error)?;
                }
                if let Some(method) = &topic.method {
                    node.set_attribute("method", method).map_err(build_error)?;
                }
                if let Some(confidence) = topic.confidence {
                    node.set_attribute("confidence", &confidence.to_string())
                        .map_err(build_error)?;
                }
                node.append_text(&topic.value).map_err(build_error)?;
            }
        }

        Ok(doc.to_string_with_options(SaveOptions {
            format: true,
            ..SaveOptions::default()
        }))
    }

    /// Write the document to a new file.
    ///
    /// Fails with `Error::FileExists` when `path` already exists, the
    /// existing file is never overwritten.
    pub fn write_new(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_xml()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => Error::FileExists(path.to_owned()),
                _ => Error::Io(err),
            })?;
        file.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn from_xml(path: &Path, doc: &Document) -> Result<Self> {
        let root = doc
            .get_root_element()
            .filter(|root| root.get_name() == "NAF")
            .ok_or_else(|| Error::parse(path, "root element is not NAF"))?;

        let mut naf = NafDocument::new(
            root.get_attribute("lang").unwrap_or_default(),
            root.get_attribute("version").unwrap_or_default(),
        );

        naf.public_id = find_nodes(path, doc, "/NAF/nafHeader/public")?
            .first()
            .and_then(|public| public.get_attribute("publicId"));

        for node in find_nodes(path, doc, "/NAF/text/wf")? {
            let id = node
                .get_attribute("id")
                .ok_or_else(|| Error::parse(path, "word form without identifier"))?;
            let text = node.get_content();
            let length = match node.get_attribute("length") {
                Some(length) => parse_attribute(path, "length", &length)?,
                None => text.chars().count(),
            };
            naf.word_forms.push(WordForm {
                id,
                sent: required_attribute(path, &node, "sent")?,
                offset: required_attribute(path, &node, "offset")?,
                length,
                text,
            });
        }

        for node in find_nodes(path, doc, "/NAF/topics/topic")? {
            let confidence = node
                .get_attribute("confidence")
                .map(|confidence| parse_attribute(path, "confidence", &confidence))
                .transpose()?;
            naf.topics.push(Topic {
                value: node.get_content().trim().to_string(),
                source: node.get_attribute("source"),
                method: node.get_attribute("method"),
                confidence,
            });
        }

        Ok(naf)
    }
}

fn build_error(err: impl Debug) -> Error {
    Error::Build(format!("{:?}", err))
}

fn required_attribute<T: FromStr>(path: &Path, node: &Node, attr: &str) -> Result<T> {
    let value = node
        .get_attribute(attr)
        .ok_or_else(|| Error::parse(path, format!("word form without `{}` attribute", attr)))?;
    parse_attribute(path, attr, &value)
}

fn parse_attribute<T: FromStr>(path: &Path, attr: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        Error::parse(
            path,
            format!("invalid value for attribute `{}`: {}", attr, value),
        )
    })
}
