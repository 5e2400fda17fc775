use std::fs;
use std::io::{self, Write};
use std::path::{is_separator, Path, PathBuf};

use walkdir::WalkDir;

use crate::classifier::{DocumentClassifier, NaiveBayes};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::naf::{NafDocument, Topic};
use crate::tabulated::TabulatedLine;
use crate::tass::{read_corpus, Record};
use crate::tokenizer::{join_tokens, Token, Tokenizer};
use crate::unicode::normalize;

fn tokenize_record(
    record: &Record,
    config: &Config,
    tokenizer: &dyn Tokenizer,
) -> Vec<Vec<Token>> {
    tokenizer.tokenize(&normalize(&record.content, config.normalization))
}

/// Convert TASS records to tabulated lines `id<TAB>polarity<TAB>tokens`.
pub fn tabulate_records(
    records: &[Record],
    config: &Config,
    tokenizer: &dyn Tokenizer,
) -> Vec<TabulatedLine> {
    records
        .iter()
        .map(|record| {
            let sentences = tokenize_record(record, config, tokenizer);
            TabulatedLine::new(
                record.id.as_str(),
                record
                    .polarity
                    .as_deref()
                    .unwrap_or(config.missing_polarity.as_str()),
                join_tokens(&sentences),
            )
        })
        .collect()
}

/// Convert a TASS corpus to tabulated lines, written to `write` in one go.
///
/// Returns the number of tweets.
pub fn xml_to_tabulated<P, W>(
    path: P,
    config: &Config,
    tokenizer: &dyn Tokenizer,
    mut write: W,
) -> Result<usize>
where
    P: AsRef<Path>,
    W: Write,
{
    let records = read_corpus(path)?;
    let lines = tabulate_records(&records, config, tokenizer);

    let mut buf = String::new();
    for line in &lines {
        buf.push_str(&line.to_string());
        buf.push('\n');
    }
    write.write_all(buf.as_bytes())?;
    write.flush()?;

    log::info!("Converted {} tweets", lines.len());

    Ok(lines.len())
}

/// Write one NAF document with the word forms of each tweet of a TASS corpus.
///
/// Documents are written to `<output_dir>/<tweet id>.naf`. Existing files
/// are never overwritten, the conversion stops at the first file that
/// already exists. Returns the paths of the written documents.
pub fn xml_to_naf<P>(path: P, config: &Config, tokenizer: &dyn Tokenizer) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let output_dir = config.naf.output_dir();

    let mut written = Vec::new();
    for record in read_corpus(path)? {
        if record.id.is_empty() || record.id.contains(is_separator) {
            return Err(Error::parse(
                path,
                format!("tweet id `{}` cannot be used as a file name", record.id),
            ));
        }

        let mut naf = NafDocument::new(config.language.as_str(), config.naf.version.as_str());
        naf.set_public_id(record.id.as_str());
        for token in tokenize_record(&record, config, tokenizer)
            .iter()
            .flatten()
        {
            naf.add_word_form(token, 1);
        }

        let naf_path = output_dir.join(format!("{}.naf", record.id));
        naf.write_new(&naf_path)?;
        log::info!("Wrote NAF document to {}", naf_path.display());

        written.push(naf_path);
    }

    Ok(written)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

fn append_naf_topic(path: &Path, buf: &mut String) -> Result<()> {
    let naf = NafDocument::read(path)?;
    let id = naf.public_id().ok_or_else(|| Error::MissingField {
        path: path.to_owned(),
        field: "publicId",
    })?;
    let topic = naf.topics().first().ok_or_else(|| Error::MissingField {
        path: path.to_owned(),
        field: "topic",
    })?;

    buf.push_str(id);
    buf.push('\t');
    buf.push_str(&topic.value);
    buf.push('\n');

    Ok(())
}

/// Files in `path` whose names end with `suffix`.
///
/// `path` is either a single file or a directory that is walked
/// recursively, directory entries are visited in file name order.
fn files_with_suffix(path: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if has_suffix(path, suffix) {
            return Ok(vec![path.to_owned()]);
        }
        log::debug!("Skipping {}", path.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && has_suffix(entry.path(), suffix) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Extract `id<TAB>topic` lines from NAF documents.
///
/// `path` is either a single NAF file or a directory that is walked
/// recursively. Only files whose names end with `suffix` are read.
pub fn naf_to_tabulated<P>(path: P, suffix: &str) -> Result<String>
where
    P: AsRef<Path>,
{
    let mut buf = String::new();
    for naf_path in files_with_suffix(path.as_ref(), suffix)? {
        append_naf_topic(&naf_path, &mut buf)?;
    }

    Ok(buf)
}

/// Classify the word forms of NAF documents, adding the label as topic.
///
/// `path` is either a single `.naf` file or a directory that is walked
/// recursively for `.naf` files. Each annotated document is written next
/// to its input as `<file>.<suffix>` (`42.naf.topic`), existing files are
/// never overwritten. Returns the paths of the written documents.
pub fn annotate_naf<P>(
    path: P,
    config: &Config,
    classifier: &dyn DocumentClassifier,
) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let mut written = Vec::new();
    for naf_path in files_with_suffix(path.as_ref(), ".naf")? {
        let mut naf = NafDocument::read(&naf_path)?;
        if naf.lang() != config.language {
            return Err(Error::Config(format!(
                "{} has language `{}`, expected `{}`",
                naf_path.display(),
                naf.lang(),
                config.language
            )));
        }

        let tokens = naf
            .word_forms()
            .iter()
            .map(|wf| wf.text.clone())
            .collect::<Vec<_>>();
        let mut topic = Topic::new(classifier.classify(&tokens));
        topic.source = Some(env!("CARGO_PKG_NAME").to_string());
        naf.add_topic(topic);

        let mut topic_path = naf_path.into_os_string();
        topic_path.push(".");
        topic_path.push(&config.naf.suffix);
        let topic_path = PathBuf::from(topic_path);

        naf.write_new(&topic_path)?;
        log::info!("Wrote topic document to {}", topic_path.display());

        written.push(topic_path);
    }

    Ok(written)
}

fn read_tabulated(path: &Path) -> Result<Vec<TabulatedLine>> {
    let text = fs::read_to_string(path)?;
    let mut lines = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if !line.contains('\t') && line.trim().is_empty() {
            log::debug!("Skipping empty line {}", idx + 1);
            continue;
        }
        lines.push(TabulatedLine::parse(line, idx + 1)?);
    }
    Ok(lines)
}

/// Classify the documents of a tabulated file, writing `id<TAB>label` lines.
///
/// The first malformed line aborts the batch before any document is
/// classified. Returns the number of classified documents.
pub fn classify_tabulated<P, W>(
    path: P,
    classifier: &dyn DocumentClassifier,
    mut write: W,
) -> Result<usize>
where
    P: AsRef<Path>,
    W: Write,
{
    let lines = read_tabulated(path.as_ref())?;

    let mut buf = String::new();
    for line in &lines {
        let label = classifier.classify(&line.tokens());
        buf.push_str(&line.id);
        buf.push('\t');
        buf.push_str(&label);
        buf.push('\n');
    }
    write.write_all(buf.as_bytes())?;
    write.flush()?;

    log::info!("Classified {} documents", lines.len());

    Ok(lines.len())
}

/// Train a naive Bayes classifier on a labeled tabulated file.
pub fn train_tabulated<P>(path: P, config: &Config, lowercase: bool) -> Result<NaiveBayes>
where
    P: AsRef<Path>,
{
    let lines = read_tabulated(path.as_ref())?;
    log::info!("Training on {} documents", lines.len());
    NaiveBayes::train(&lines, config.language.as_str(), lowercase)
}
