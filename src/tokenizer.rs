use std::mem;

use lazy_static::lazy_static;
use regex::Regex;

/// A token with its character offset and length in the tokenized text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    text: String,
    offset: usize,
    length: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Token {
            text,
            offset,
            length,
        }
    }

    /// Character length of the token.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Character offset of the token in the text.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Sentence splitter and word tokenizer.
pub trait Tokenizer {
    /// Split `text` into sentences of tokens.
    ///
    /// Text without tokens results in an empty vector.
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>>;
}

/// Join the tokens of all sentences with single spaces.
pub fn join_tokens(sentences: &[Vec<Token>]) -> String {
    sentences
        .iter()
        .flatten()
        .map(Token::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Simple whitespace-based tokenizer.
///
/// Splits sentences on newlines (`\n` or `\r\n`) and tokens on whitespace.
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>> {
        let mut sentences = Vec::new();
        let mut sentence = Vec::new();
        let mut word = String::new();
        let mut word_start = 0;

        for (idx, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    sentence.push(Token::new(mem::take(&mut word), word_start));
                }
                if c == '\n' && !sentence.is_empty() {
                    sentences.push(mem::take(&mut sentence));
                }
            } else {
                if word.is_empty() {
                    word_start = idx;
                }
                word.push(c);
            }
        }

        if !word.is_empty() {
            sentence.push(Token::new(word, word_start));
        }
        if !sentence.is_empty() {
            sentences.push(sentence);
        }

        sentences
    }
}

/// Rule-based tokenizer for short social media texts.
///
/// Whitespace-separated chunks are split further by peeling off leading and
/// trailing punctuation. Runs of the same punctuation character (`!!!`,
/// `...`) form one token. URLs, `@mentions` and `#hashtags` are never
/// split, wherever they start in a chunk. A sentence ends after a token that only consists of
/// `.`, `!`, `?` or `…`.
pub struct RuleTokenizer;

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>> {
        let mut sentences = Vec::new();
        let mut sentence = Vec::new();

        for chunk in whitespace_chunks(text) {
            for token in split_chunk(&chunk) {
                let ends_sentence = is_sentence_end(token.text());
                sentence.push(token);
                if ends_sentence {
                    sentences.push(mem::take(&mut sentence));
                }
            }
        }

        if !sentence.is_empty() {
            sentences.push(sentence);
        }

        sentences
    }
}

type Chunk = Vec<(usize, char)>;

fn whitespace_chunks(text: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut chunk = Vec::new();

    for (idx, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            if !chunk.is_empty() {
                chunks.push(mem::take(&mut chunk));
            }
        } else {
            chunk.push((idx, c));
        }
    }

    if !chunk.is_empty() {
        chunks.push(chunk);
    }

    chunks
}

fn split_chunk(chunk: &[(usize, char)]) -> Vec<Token> {
    let mut start = 0;
    let mut end = chunk.len();

    let mut tokens = Vec::new();
    while start < end {
        if let Some(len) = protected_len(&chunk[start..end]) {
            tokens.push(chunk_token(&chunk[start..start + len]));
            start += len;
        } else if is_punctuation(chunk[start].1) {
            let mut run_end = start + 1;
            while run_end < end && chunk[run_end].1 == chunk[start].1 {
                run_end += 1;
            }
            tokens.push(chunk_token(&chunk[start..run_end]));
            start = run_end;
        } else {
            break;
        }
    }

    let mut trailing = Vec::new();
    while end > start && is_punctuation(chunk[end - 1].1) {
        let mut run_start = end - 1;
        while run_start > start && chunk[run_start - 1].1 == chunk[end - 1].1 {
            run_start -= 1;
        }
        trailing.push(chunk_token(&chunk[run_start..end]));
        end = run_start;
    }

    if start < end {
        tokens.push(chunk_token(&chunk[start..end]));
    }
    tokens.extend(trailing.into_iter().rev());

    tokens
}

fn chunk_token(chars: &[(usize, char)]) -> Token {
    Token::new(chars.iter().map(|&(_, c)| c).collect::<String>(), chars[0].0)
}

/// Length in characters of a URL, mention, or hashtag at the start of `chars`.
fn protected_len(chars: &[(usize, char)]) -> Option<usize> {
    lazy_static! {
        static ref PROTECTED: Regex = Regex::new(
            r"^(?:(?i:https?://|www\.)\S*[\p{L}\p{N}/=_&%#+~-]|[@#][\p{L}\p{N}_]+)"
        )
        .unwrap();
    }

    let text = chars.iter().map(|&(_, c)| c).collect::<String>();
    PROTECTED
        .find(&text)
        .map(|found| found.as_str().chars().count())
}

fn is_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && c != '_'
}

fn is_sentence_end(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| matches!(c, '.' | '!' | '?' | '…'))
}

#[cfg(test)]
mod tests {
    use super::{join_tokens, RuleTokenizer, Token, Tokenizer, WhitespaceTokenizer};

    fn texts(sentences: &[Vec<Token>]) -> Vec<Vec<&str>> {
        sentences
            .iter()
            .map(|s| s.iter().map(Token::text).collect())
            .collect()
    }

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer;
        let sentences =
            tokenizer.tokenize("Esto es una frase .\nEsta es la segunda frase .\r\nY la tercera\n");
        assert_eq!(
            texts(&sentences),
            vec![
                vec!["Esto", "es", "una", "frase", "."],
                vec!["Esta", "es", "la", "segunda", "frase", "."],
                vec!["Y", "la", "tercera"]
            ]
        );
        assert_eq!(sentences[1][0], Token::new("Esta", 20));
    }

    #[test]
    fn test_whitespace_tokenizer_empty() {
        assert!(WhitespaceTokenizer.tokenize("").is_empty());
        assert!(WhitespaceTokenizer.tokenize(" \n\n ").is_empty());
    }

    #[test]
    fn rule_tokenizer_splits_punctuation() {
        let sentences = RuleTokenizer.tokenize("¡Qué día tan bonito!! Me encanta, de verdad...");
        assert_eq!(
            texts(&sentences),
            vec![
                vec!["¡", "Qué", "día", "tan", "bonito", "!!"],
                vec!["Me", "encanta", ",", "de", "verdad", "..."]
            ]
        );
    }

    #[test]
    fn rule_tokenizer_character_offsets() {
        let sentences = RuleTokenizer.tokenize("¿Mañana? Sí");
        let tokens = sentences.into_iter().flatten().collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                Token::new("¿", 0),
                Token::new("Mañana", 1),
                Token::new("?", 7),
                Token::new("Sí", 9)
            ]
        );
        assert_eq!(tokens[1].length(), 6);
    }

    #[test]
    fn rule_tokenizer_keeps_social_media_entities() {
        let sentences =
            RuleTokenizer.tokenize("@usuario_1 mira #FelizLunes: http://t.co/abc123, (genial)");
        assert_eq!(
            join_tokens(&sentences),
            "@usuario_1 mira #FelizLunes : http://t.co/abc123 , ( genial )"
        );
    }

    #[test]
    fn rule_tokenizer_keeps_entities_after_punctuation() {
        assert_eq!(
            join_tokens(&RuleTokenizer.tokenize("(@usuario) gracias")),
            "( @usuario ) gracias"
        );
        assert_eq!(
            join_tokens(&RuleTokenizer.tokenize("¡#FelizLunes!")),
            "¡ #FelizLunes !"
        );
        assert_eq!(
            join_tokens(&RuleTokenizer.tokenize("\"@pepe dice\"")),
            "\" @pepe dice \""
        );
        assert_eq!(
            join_tokens(&RuleTokenizer.tokenize("@usuario... (http://t.co/abc/)")),
            "@usuario ... ( http://t.co/abc/ )"
        );
    }

    #[test]
    fn rule_tokenizer_keeps_url_slash() {
        let tokens = RuleTokenizer.tokenize("mira http://t.co/abc/");
        assert_eq!(tokens[0][1], Token::new("http://t.co/abc/", 5));
        assert_eq!(join_tokens(&RuleTokenizer.tokenize("# @ www.")), "# @ www .");
    }

    #[test]
    fn rule_tokenizer_keeps_inner_punctuation() {
        let sentences = RuleTokenizer.tokenize("son 3.5 km, e-mail");
        assert_eq!(join_tokens(&sentences), "son 3.5 km , e-mail");
    }

    #[test]
    fn rule_tokenizer_empty_text() {
        assert!(RuleTokenizer.tokenize("").is_empty());
        assert_eq!(join_tokens(&RuleTokenizer.tokenize("   ")), "");
    }
}
