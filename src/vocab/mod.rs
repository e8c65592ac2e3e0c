use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

static VOCAB_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/vocab");

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("vocabulary '{0}' is not bundled")]
    Missing(String),
    #[error("vocabulary '{0}' is not valid UTF-8")]
    Encoding(String),
    #[error("vocabulary '{name}' is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Bundled list of tokens used by the repeat/omission drills
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub words: Vec<String>,
}

/// One row of a congruence table: the words shown together and whether they agree
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CongruenceItem {
    pub words: Vec<String>,
    pub correct: bool,
}

impl CongruenceItem {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct CongruenceTable {
    pub name: String,
    pub items: Vec<CongruenceItem>,
}

pub fn word_list(name: &str) -> Result<WordList, VocabError> {
    read(name)
}

pub fn congruence_table(name: &str) -> Result<CongruenceTable, VocabError> {
    read(name)
}

fn read<T: DeserializeOwned>(name: &str) -> Result<T, VocabError> {
    let file = VOCAB_DIR
        .get_file(format!("{name}.json"))
        .ok_or_else(|| VocabError::Missing(name.to_string()))?;
    let text = file
        .contents_utf8()
        .ok_or_else(|| VocabError::Encoding(name.to_string()))?;
    serde_json::from_str(text).map_err(|source| VocabError::Malformed {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use itertools::Itertools;

    #[test]
    fn bundled_word_lists_are_distinct() {
        for name in ["words", "word_pairs", "months"] {
            let list = word_list(name).unwrap();
            assert_eq!(list.name, name);
            assert!(list.words.iter().all_unique(), "{name} has duplicates");
        }
    }

    #[test]
    fn months_has_twelve_entries() {
        assert_eq!(word_list("months").unwrap().words.len(), 12);
    }

    #[test]
    fn congruence_tables_have_consistent_arity() {
        for (name, arity) in [
            ("article_noun", 2),
            ("noun_adjective", 2),
            ("article_noun_adjective", 3),
        ] {
            let table = congruence_table(name).unwrap();
            assert_eq!(table.items.len(), 10);
            assert!(table.items.iter().all(|i| i.words.len() == arity));
            assert!(table.items.iter().any(|i| i.correct));
            assert!(table.items.iter().any(|i| !i.correct));
        }
    }

    #[test]
    fn table_order_is_preserved() {
        let table = congruence_table("article_noun").unwrap();
        assert_eq!(table.items[0].text(), "el perro");
        assert!(table.items[0].correct);
        assert_eq!(table.items[1].text(), "la gato");
        assert!(!table.items[1].correct);
    }

    #[test]
    fn missing_vocabulary_is_an_error() {
        assert_matches!(word_list("klingon"), Err(VocabError::Missing(name)) if name == "klingon");
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert_matches!(word_list("article_noun"), Err(VocabError::Malformed { .. }));
    }
}
