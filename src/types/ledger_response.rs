use std::{collections::HashMap, fmt};

use serde::{
    de::{
        Error as DeError, IgnoredAny, MapAccess, SeqAccess, Unexpected,
        Visitor,
    },
    Deserialize, Deserializer,
};

use super::LedgerEntry;

/// Envelope returned by the private ledger endpoint:
/// `{"error": [...], "result": {"ledger": {id: entry}}}`.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerResponse {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub result: Option<LedgerResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerResult {
    #[serde(default)]
    pub ledger: LedgerPage,
}

impl LedgerResponse {
    pub fn into_page(self) -> LedgerPage {
        self.result.map(|r| r.ledger).unwrap_or_default()
    }
}

/// One page of ledger entries keyed by ledger id, in the order the
/// upstream listed them. A repeated id keeps its first position and its
/// last entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerPage {
    pub entries: Vec<(String, LedgerEntry)>,
}

impl LedgerPage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> impl Iterator<Item = LedgerEntry> {
        self.entries.into_iter().map(|(_, entry)| entry)
    }
}

impl FromIterator<(String, LedgerEntry)> for LedgerPage {
    fn from_iter<T: IntoIterator<Item = (String, LedgerEntry)>>(
        iter: T,
    ) -> Self {
        LedgerPage {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for LedgerPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PageVisitor;

        impl<'de> Visitor<'de> for PageVisitor {
            type Value = LedgerPage;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of ledger id to ledger entry")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let capacity = map.size_hint().unwrap_or(0);
                let mut entries: Vec<(String, LedgerEntry)> =
                    Vec::with_capacity(capacity);
                let mut positions: HashMap<String, usize> = HashMap::with_capacity(capacity);

                while let Some((id, entry)) =
                    map.next_entry::<String, LedgerEntry>()?
                {
                    match positions.get(&id) {
                        Some(&index) => entries[index].1 = entry,
                        None => {
                            positions.insert(id.to_owned(), entries.len());
                            entries.push((id, entry));
                        },
                    }
                }

                Ok(LedgerPage { entries })
            }

            // an empty ledger is sometimes sent as `[]`
            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                if seq.next_element::<IgnoredAny>()?.is_some() {
                    return Err(DeError::invalid_type(Unexpected::Seq, &self));
                }
                Ok(LedgerPage::default())
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(LedgerPage::default())
            }
        }

        deserializer.deserialize_any(PageVisitor)
    }
}
