use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tabulated::TabulatedLine;

/// Statistical document classifier.
pub trait DocumentClassifier {
    /// Predict the label of a tokenized document.
    fn classify(&self, tokens: &[String]) -> String;
}

/// Options for loading a document classifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifierProperties {
    /// Path of the trained model.
    pub model: PathBuf,

    /// Language of the documents, must match the model language.
    pub language: String,

    /// Clear adaptive features after each document.
    pub clear_features: bool,
}

impl ClassifierProperties {
    pub fn new(
        model: impl Into<PathBuf>,
        language: impl Into<String>,
        clear_features: bool,
    ) -> Self {
        ClassifierProperties {
            model: model.into(),
            language: language.into(),
            clear_features,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LabelCounts {
    /// Number of training documents with this label.
    pub documents: usize,

    /// Token frequencies in training documents with this label.
    pub tokens: IndexMap<String, usize>,
}

/// Multinomial naive Bayes document classifier with add-one smoothing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NaiveBayes {
    language: String,

    #[serde(default)]
    lowercase: bool,

    labels: IndexMap<String, LabelCounts>,

    #[serde(skip)]
    clear_features: bool,

    #[serde(skip)]
    vocab_size: usize,
}

impl NaiveBayes {
    /// Load a model, checking it against the classifier properties.
    pub fn load(properties: &ClassifierProperties) -> Result<Self> {
        let read = BufReader::new(File::open(&properties.model)?);
        let mut model: NaiveBayes = serde_yaml::from_reader(read)?;

        if model.language != properties.language {
            return Err(Error::Config(format!(
                "Model {} was trained for language `{}`, not `{}`",
                properties.model.display(),
                model.language,
                properties.language
            )));
        }

        model.clear_features = properties.clear_features;
        model.finalize()?;

        log::info!(
            "Loaded classifier model {}: {} labels, {} token types",
            properties.model.display(),
            model.labels.len(),
            model.vocab_size
        );

        Ok(model)
    }

    /// Estimate a model from tabulated lines.
    ///
    /// Lines with an empty label are skipped.
    pub fn train<'a>(
        lines: impl IntoIterator<Item = &'a TabulatedLine>,
        language: impl Into<String>,
        lowercase: bool,
    ) -> Result<Self> {
        let mut labels: IndexMap<String, LabelCounts> = IndexMap::new();

        for line in lines {
            if line.label.is_empty() {
                log::debug!("Skipping unlabeled document {}", line.id);
                continue;
            }

            let counts = labels.entry(line.label.clone()).or_default();
            counts.documents += 1;
            for token in line.tokens() {
                let token = if lowercase { token.to_lowercase() } else { token };
                *counts.tokens.entry(token).or_default() += 1;
            }
        }

        let mut model = NaiveBayes {
            language: language.into(),
            lowercase,
            labels,
            clear_features: false,
            vocab_size: 0,
        };
        model.finalize()?;

        Ok(model)
    }

    /// Write the model as YAML.
    pub fn write<W>(&self, write: W) -> Result<()>
    where
        W: Write,
    {
        serde_yaml::to_writer(write, self)?;
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Log-probability scores of every label, in model label order.
    pub fn scores(&self, tokens: &[String]) -> Vec<(&str, f64)> {
        let n_documents: usize = self.labels.values().map(|counts| counts.documents).sum();

        self.labels
            .iter()
            .map(|(label, counts)| {
                let total: usize = counts.tokens.values().sum();
                let denominator = (total + self.vocab_size) as f64;
                let prior = (counts.documents as f64 / n_documents as f64).ln();

                let likelihood: f64 = tokens
                    .iter()
                    .map(|token| {
                        let count = if self.lowercase {
                            counts.tokens.get(&token.to_lowercase())
                        } else {
                            counts.tokens.get(token)
                        };
                        ((count.copied().unwrap_or(0) + 1) as f64 / denominator).ln()
                    })
                    .sum();

                (label.as_str(), prior + likelihood)
            })
            .collect()
    }

    fn finalize(&mut self) -> Result<()> {
        if self.labels.values().all(|counts| counts.documents == 0) {
            return Err(Error::Config(
                "Classifier model does not contain any labeled documents".to_string(),
            ));
        }

        let mut vocab = self
            .labels
            .values()
            .flat_map(|counts| counts.tokens.keys())
            .collect::<Vec<_>>();
        vocab.sort_unstable();
        vocab.dedup();
        self.vocab_size = vocab.len();

        if self.clear_features {
            log::debug!("Naive Bayes has no adaptive features to clear");
        }

        Ok(())
    }
}

impl DocumentClassifier for NaiveBayes {
    fn classify(&self, tokens: &[String]) -> String {
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.scores(tokens) {
            match best {
                Some((_, best_score)) if best_score >= score => (),
                _ => best = Some((label, score)),
            }
        }

        best.map(|(label, _)| label.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use crate::error::Error;
    use crate::tabulated::TabulatedLine;

    use super::{ClassifierProperties, DocumentClassifier, NaiveBayes};

    fn training_lines() -> Vec<TabulatedLine> {
        vec![
            TabulatedLine::new("1", "P", "qué día tan bonito"),
            TabulatedLine::new("2", "P", "me encanta este día"),
            TabulatedLine::new("3", "N", "odio los lunes"),
            TabulatedLine::new("4", "N", "qué día tan horrible"),
            TabulatedLine::new("5", "", "sin etiqueta"),
        ]
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(' ').map(ToOwned::to_owned).collect()
    }

    #[test]
    fn classifies_by_token_evidence() {
        let model = NaiveBayes::train(&training_lines(), "es", true).unwrap();
        assert_eq!(model.labels().collect::<Vec<_>>(), vec!["P", "N"]);
        assert_eq!(model.classify(&tokens("me encanta")), "P");
        assert_eq!(model.classify(&tokens("Odio el lunes")), "N");
    }

    #[test]
    fn ties_go_to_first_label() {
        let model = NaiveBayes::train(&training_lines(), "es", false).unwrap();
        assert_eq!(model.classify(&[]), "P");
    }

    #[test]
    fn model_without_documents_is_rejected() {
        assert!(matches!(
            NaiveBayes::train(&[TabulatedLine::new("1", "", "hola")], "es", false),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn load_checks_language() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        let model = NaiveBayes::train(&training_lines(), "es", true).unwrap();
        model.write(File::create(&path).unwrap()).unwrap();

        let loaded = NaiveBayes::load(&ClassifierProperties::new(&path, "es", false)).unwrap();
        assert_eq!(loaded.classify(&tokens("odio")), "N");
        assert_eq!(loaded.language(), "es");

        assert!(matches!(
            NaiveBayes::load(&ClassifierProperties::new(&path, "eu", false)),
            Err(Error::Config(_))
        ));
    }
}
