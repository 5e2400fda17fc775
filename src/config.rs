use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classifier::ClassifierProperties;
use crate::error::{Error, Result};
use crate::naf::NAF_VERSION;
use crate::tokenizer::{RuleTokenizer, Tokenizer, WhitespaceTokenizer};
use crate::unicode::Normalization;

/// TASS conversion configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Language of the corpus.
    pub language: String,

    /// Tokenizer used for tweet contents.
    pub tokenizer: TokenizerConfig,

    /// Unicode normalization applied before tokenization.
    pub normalization: Normalization,

    /// Label written when a tweet has no polarity.
    pub missing_polarity: String,

    pub naf: NafConfig,

    pub classifier: ClassifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            language: "es".to_string(),
            tokenizer: TokenizerConfig::default(),
            normalization: Normalization::default(),
            missing_polarity: String::new(),
            naf: NafConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Config {
    /// Read a configuration file.
    ///
    /// Relative paths in the configuration are resolved against the
    /// directory of `config_path`.
    pub fn read<P, R>(config_path: P, mut read: R) -> Result<Self>
    where
        P: AsRef<Path>,
        R: Read,
    {
        let mut toml = String::new();
        read.read_to_string(&mut toml)?;

        let mut config: Config = toml::from_str(&toml)?;

        if let Some(model) = &mut config.classifier.model {
            *model = canonicalize_path(config_path.as_ref(), model)?;
        }

        if let Some(output_dir) = &mut config.naf.output_dir {
            *output_dir = canonicalize_path(config_path.as_ref(), output_dir)?;
        }

        Ok(config)
    }

    /// Classifier properties, `model` overrides the configured model.
    pub fn classifier_properties(&self, model: Option<&str>) -> Result<ClassifierProperties> {
        let model = model
            .or_else(|| self.classifier.model.as_deref())
            .ok_or_else(|| Error::Config("No classifier model was specified".to_string()))?;

        Ok(ClassifierProperties::new(
            model,
            &self.language,
            self.classifier.clear_features,
        ))
    }
}

/// NAF input and output settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NafConfig {
    /// NAF version of written documents.
    pub version: String,

    /// Only files with names ending in this suffix are read as NAF topic documents.
    pub suffix: String,

    /// Directory that NAF documents are written to, the working directory if absent.
    pub output_dir: Option<String>,
}

impl Default for NafConfig {
    fn default() -> Self {
        NafConfig {
            version: NAF_VERSION.to_string(),
            suffix: "topic".to_string(),
            output_dir: None,
        }
    }
}

impl NafConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Path of the classifier model.
    pub model: Option<String>,

    /// Clear adaptive features after classifying a document.
    pub clear_features: bool,
}

/// Configuration for a tokenizer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerConfig {
    /// Punctuation-aware tokenizer for social media text.
    RuleTokenizer,

    /// Whitespace tokenizer.
    ///
    /// Splits sentences on `\n` or `\r\n`, split tokens on whitespace.
    WhitespaceTokenizer,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig::RuleTokenizer
    }
}

impl TokenizerConfig {
    /// Load a tokenizer.
    pub fn load(self) -> Box<dyn Tokenizer> {
        match self {
            TokenizerConfig::RuleTokenizer => Box::new(RuleTokenizer),
            TokenizerConfig::WhitespaceTokenizer => Box::new(WhitespaceTokenizer),
        }
    }
}

/// Canonicalize a (relative) filename.
///
/// The configuration file can contain file names relative to the configuration
/// file directory. However, the program can be run in a different directory
/// than the configuration. This function gives the absolute path of a file
/// name that is relative to a configuration file directory.
fn canonicalize_path(config_path: &Path, filename: &str) -> Result<String> {
    if filename.is_empty() {
        return Ok(filename.to_owned());
    }

    let path = Path::new(&filename);

    // Don't touch absolute paths.
    if path.is_absolute() {
        return Ok(filename.to_owned());
    }

    let abs_config_path = config_path.canonicalize()?;
    Ok(abs_config_path
        .parent()
        .ok_or_else(|| {
            Error::Config(format!(
                "Cannot get parent path of the configuration file: {}",
                abs_config_path.to_string_lossy()
            ))
        })?
        .join(path)
        .canonicalize()?
        .to_str()
        .ok_or_else(|| {
            Error::Config(format!(
                "Cannot convert path to string: {}",
                abs_config_path.to_string_lossy()
            ))
        })?
        .to_owned())
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use tempfile::tempdir;

    use crate::error::Error;
    use crate::unicode::Normalization;

    use super::{Config, TokenizerConfig};

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::read("tass.toml", "".as_bytes()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.language, "es");
        assert_eq!(config.naf.suffix, "topic");
        assert_eq!(config.naf.version, "v1.naf");
        assert_eq!(config.tokenizer, TokenizerConfig::RuleTokenizer);
    }

    #[test]
    fn relative_model_path_is_resolved() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("model.yaml"), "").unwrap();
        let config_path = dir.path().join("tass.toml");
        fs::write(
            &config_path,
            r#"
language = "es"
tokenizer = "whitespace_tokenizer"
normalization = "none"
missing_polarity = "NA"

[classifier]
model = "model.yaml"
"#,
        )
        .unwrap();

        let config = Config::read(&config_path, File::open(&config_path).unwrap()).unwrap();
        assert_eq!(config.tokenizer, TokenizerConfig::WhitespaceTokenizer);
        assert_eq!(config.normalization, Normalization::None);
        assert_eq!(config.missing_polarity, "NA");

        let properties = config.classifier_properties(None).unwrap();
        assert_eq!(
            properties.model,
            dir.path().canonicalize().unwrap().join("model.yaml")
        );
        assert_eq!(properties.language, "es");
        assert!(!properties.clear_features);
    }

    #[test]
    fn classifier_model_is_required() {
        assert!(matches!(
            Config::default().classifier_properties(None),
            Err(Error::Config(_))
        ));
        let properties = Config::default()
            .classifier_properties(Some("tass.yaml"))
            .unwrap();
        assert_eq!(properties.model.to_str(), Some("tass.yaml"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            Config::read("tass.toml", "lang = \"es\"".as_bytes()),
            Err(Error::Toml(_))
        ));
    }
}
