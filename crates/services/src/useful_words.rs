use vocab_core::model::{Word, WordDraft, WordId};

/// A read-only themed list that ships with the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsefulWordList {
    slug: &'static str,
    name: &'static str,
    words: Vec<Word>,
}

impl UsefulWordList {
    fn build(slug: &'static str, name: &'static str, pairs: &[(&str, &str)]) -> Self {
        let words = pairs
            .iter()
            .zip(1_u64..)
            .filter_map(|(&(original, translation), id)| {
                WordDraft::new(original, translation)
                    .validate(WordId::new(id))
                    .ok()
            })
            .collect();
        Self { slug, name, words }
    }

    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.slug
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

/// Built-in word lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsefulWordsCatalog {
    lists: Vec<UsefulWordList>,
}

impl UsefulWordsCatalog {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            lists: vec![
                UsefulWordList::build(
                    "greetings",
                    "Greetings",
                    &[
                        ("hello", "שלום"),
                        ("good morning", "בוקר טוב"),
                        ("good evening", "ערב טוב"),
                        ("thank you", "תודה"),
                        ("please", "בבקשה"),
                        ("goodbye", "להתראות"),
                    ],
                ),
                UsefulWordList::build(
                    "food",
                    "Food & Drink",
                    &[
                        ("bread", "לחם"),
                        ("water", "מים"),
                        ("apple", "תפוח"),
                        ("coffee", "קפה"),
                        ("cheese", "גבינה"),
                        ("egg", "ביצה"),
                    ],
                ),
                UsefulWordList::build(
                    "travel",
                    "Travel",
                    &[
                        ("station", "תחנה"),
                        ("ticket", "כרטיס"),
                        ("airport", "שדה תעופה"),
                        ("hotel", "מלון"),
                        ("map", "מפה"),
                        ("street", "רחוב"),
                    ],
                ),
            ],
        }
    }

    #[must_use]
    pub fn lists(&self) -> &[UsefulWordList] {
        &self.lists
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&UsefulWordList> {
        self.lists.iter().find(|list| list.slug == slug)
    }
}

impl Default for UsefulWordsCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_are_complete() {
        let catalog = UsefulWordsCatalog::builtin();
        assert_eq!(catalog.lists().len(), 3);
        for list in catalog.lists() {
            assert_eq!(list.words().len(), 6, "{} lost a word", list.slug());
            let first = list.words().first().unwrap();
            assert_eq!(first.id(), WordId::new(1));
        }
    }

    #[test]
    fn lookup_by_slug() {
        let catalog = UsefulWordsCatalog::builtin();
        assert_eq!(catalog.get("travel").unwrap().name(), "Travel");
        assert!(catalog.get("nope").is_none());
    }
}
