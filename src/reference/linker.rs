//! Referential linker
//!
//! Records which documents point at which. Links are bookkeeping only: a
//! link to a missing target is stored like any other.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A document addressed by collection and key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity: String,
    pub key: String,
}

impl EntityRef {
    pub fn new(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            key: key.into(),
        }
    }
}

/// One recorded soft reference
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Link {
    pub source: EntityRef,
    /// Field path of the source holding the identifier, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    pub target: EntityRef,
}

/// Declares that `path` of a collection holds a key of `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceField {
    pub path: String,
    pub target: String,
}

impl ReferenceField {
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }
}

/// Forward and reverse soft-reference maps
#[derive(Debug, Default)]
pub struct ReferenceLinker {
    forward: BTreeMap<EntityRef, BTreeSet<(Option<String>, EntityRef)>>,
    reverse: BTreeMap<EntityRef, BTreeSet<EntityRef>>,
}

impl ReferenceLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a soft reference. Returns false if it was already known.
    pub fn link(
        &mut self,
        source_type: &str,
        source_id: &str,
        target_type: &str,
        target_id: &str,
    ) -> bool {
        self.insert(
            EntityRef::new(source_type, source_id),
            None,
            EntityRef::new(target_type, target_id),
        )
    }

    fn insert(&mut self, source: EntityRef, via: Option<String>, target: EntityRef) -> bool {
        let added = self
            .forward
            .entry(source.clone())
            .or_default()
            .insert((via, target.clone()));
        self.reverse.entry(target).or_default().insert(source);
        added
    }

    /// Replaces every field-derived link of `source` with `links`.
    ///
    /// Links recorded through `link` (no field) are kept.
    pub fn replace_field_links(&mut self, source: &EntityRef, links: Vec<(String, EntityRef)>) {
        if let Some(existing) = self.forward.get_mut(source) {
            let stale: Vec<(Option<String>, EntityRef)> = existing
                .iter()
                .filter(|(via, _)| via.is_some())
                .cloned()
                .collect();
            for entry in &stale {
                existing.remove(entry);
            }
            for (_, target) in stale {
                self.drop_reverse(&target, source);
            }
        }
        if self.forward.get(source).map_or(false, BTreeSet::is_empty) {
            self.forward.remove(source);
        }

        for (via, target) in links {
            self.insert(source.clone(), Some(via), target);
        }
    }

    fn drop_reverse(&mut self, target: &EntityRef, source: &EntityRef) {
        let still_linked = self
            .forward
            .get(source)
            .map_or(false, |entries| entries.iter().any(|(_, t)| t == target));
        if still_linked {
            return;
        }
        if let Some(sources) = self.reverse.get_mut(target) {
            sources.remove(source);
            if sources.is_empty() {
                self.reverse.remove(target);
            }
        }
    }

    /// Documents pointing at `target`
    pub fn referrers(&self, target: &EntityRef) -> Vec<EntityRef> {
        self.reverse
            .get(target)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Links recorded from `source`
    pub fn references_from(&self, source: &EntityRef) -> Vec<Link> {
        self.forward
            .get(source)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(via, target)| Link {
                        source: source.clone(),
                        via: via.clone(),
                        target: target.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every recorded link, ordered by source
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.forward.iter().flat_map(|(source, entries)| {
            entries.iter().map(move |(via, target)| Link {
                source: source.clone(),
                via: via.clone(),
                target: target.clone(),
            })
        })
    }

    /// Number of recorded links
    pub fn len(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(key: &str) -> EntityRef {
        EntityRef::new("tickets", key)
    }

    fn user(key: &str) -> EntityRef {
        EntityRef::new("users", key)
    }

    #[test]
    fn test_link_and_referrers() {
        let mut linker = ReferenceLinker::new();
        assert!(linker.link("tickets", "T1", "users", "U1"));
        assert!(!linker.link("tickets", "T1", "users", "U1"));
        linker.link("payments", "P1", "users", "U1");

        assert_eq!(
            linker.referrers(&user("U1")),
            vec![EntityRef::new("payments", "P1"), ticket("T1")]
        );
        assert_eq!(linker.len(), 2);
    }

    #[test]
    fn test_replace_field_links() {
        let mut linker = ReferenceLinker::new();
        let source = ticket("T1");
        linker.replace_field_links(&source, vec![("userId".into(), user("U1"))]);
        assert_eq!(linker.referrers(&user("U1")), vec![source.clone()]);

        linker.replace_field_links(&source, vec![("userId".into(), user("U2"))]);
        assert!(linker.referrers(&user("U1")).is_empty());
        assert_eq!(linker.referrers(&user("U2")), vec![source.clone()]);

        let links = linker.references_from(&source);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].via.as_deref(), Some("userId"));
    }

    #[test]
    fn test_manual_links_survive_replacement() {
        let mut linker = ReferenceLinker::new();
        let source = ticket("T1");
        linker.link("tickets", "T1", "users", "U1");
        linker.replace_field_links(&source, vec![("userId".into(), user("U1"))]);
        linker.replace_field_links(&source, Vec::new());

        assert_eq!(linker.referrers(&user("U1")), vec![source]);
        assert_eq!(linker.len(), 1);
    }

    #[test]
    fn test_key_change_leaves_no_empty_source() {
        let mut linker = ReferenceLinker::new();
        linker.replace_field_links(&ticket("T1"), vec![("userId".into(), user("U1"))]);

        // the document was re-keyed from T1 to T2
        linker.replace_field_links(&ticket("T1"), Vec::new());
        linker.replace_field_links(&ticket("T2"), vec![("userId".into(), user("U1"))]);

        assert_eq!(linker.forward.len(), 1);
        assert!(linker.references_from(&ticket("T1")).is_empty());
        assert_eq!(linker.referrers(&user("U1")), vec![ticket("T2")]);
    }
}
