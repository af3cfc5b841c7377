//! Reconciliation planning: source document + current catalogue → the
//! minimal set of store operations that makes the catalogue match.
//!
//! Planning is pure. A backend loads a [`Snapshot`] and applies the resulting
//! [`SyncPlan`] inside one transaction, so a failed run leaves nothing behind.
//! Rows whose values already match produce no operation, which makes a second
//! run with the same document a no-op.

use std::{
  collections::{HashMap, HashSet},
  fmt,
  path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  site::{Alternative, AlternativeId, AlternativeRecord, Site, SiteId, SiteRecord},
  source::SourceDocument,
  store::CatalogStore,
};

/// Whether records absent from the source are deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
  /// Insert and update only.
  #[default]
  Merge,
  /// Also delete alternatives and sites the source no longer lists.
  Prune,
}

impl SyncMode {
  pub fn from_prune_flag(prune: bool) -> Self {
    if prune { SyncMode::Prune } else { SyncMode::Merge }
  }
}

/// The full catalogue as read at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub sites:        Vec<Site>,
  pub alternatives: Vec<Alternative>,
}

/// Store operations for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
  pub site_inserts:           Vec<SiteRecord>,
  pub site_updates:           Vec<(SiteId, SiteRecord)>,
  /// Keyed by site name: the owning site may only be created by this plan.
  pub alternative_inserts:    Vec<(String, AlternativeRecord)>,
  pub alternative_updates:    Vec<(AlternativeId, AlternativeRecord)>,
  pub alternative_deletes:    Vec<AlternativeId>,
  pub site_deletes:           Vec<SiteId>,
  pub sites_unchanged:        usize,
  pub alternatives_unchanged: usize,
  /// Alternatives removed by cascade when their site is pruned.
  pub cascaded_alternatives:  usize,
}

impl SyncPlan {
  pub fn is_empty(&self) -> bool {
    self.site_inserts.is_empty()
      && self.site_updates.is_empty()
      && self.alternative_inserts.is_empty()
      && self.alternative_updates.is_empty()
      && self.alternative_deletes.is_empty()
      && self.site_deletes.is_empty()
  }

  pub fn report(&self) -> SyncReport {
    SyncReport {
      sites_created:          self.site_inserts.len(),
      sites_updated:          self.site_updates.len(),
      sites_unchanged:        self.sites_unchanged,
      sites_pruned:           self.site_deletes.len(),
      alternatives_created:   self.alternative_inserts.len(),
      alternatives_updated:   self.alternative_updates.len(),
      alternatives_unchanged: self.alternatives_unchanged,
      alternatives_pruned:    self.alternative_deletes.len() + self.cascaded_alternatives,
    }
  }
}

/// Counts describing what a run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
  pub sites_created:          usize,
  pub sites_updated:          usize,
  pub sites_unchanged:        usize,
  pub sites_pruned:           usize,
  pub alternatives_created:   usize,
  pub alternatives_updated:   usize,
  pub alternatives_unchanged: usize,
  pub alternatives_pruned:    usize,
}

impl SyncReport {
  pub fn changed(&self) -> bool {
    self.sites_created
      + self.sites_updated
      + self.sites_pruned
      + self.alternatives_created
      + self.alternatives_updated
      + self.alternatives_pruned
      > 0
  }
}

impl fmt::Display for SyncReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "sites: {} created, {} updated, {} unchanged, {} pruned; \
       alternatives: {} created, {} updated, {} unchanged, {} pruned",
      self.sites_created,
      self.sites_updated,
      self.sites_unchanged,
      self.sites_pruned,
      self.alternatives_created,
      self.alternatives_updated,
      self.alternatives_unchanged,
      self.alternatives_pruned,
    )
  }
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// A source site after folding repeated entries with the same name.
struct Entry<'a> {
  record:       &'a SiteRecord,
  alternatives: Vec<&'a AlternativeRecord>,
}

/// Compute the operations that bring `snapshot` in line with `document`.
///
/// Entries are applied in document order. When a name appears more than
/// once, the later entry's fields win; its alternatives are merged over the
/// earlier ones, or replace them in [`SyncMode::Prune`].
pub fn plan(snapshot: &Snapshot, document: &SourceDocument, mode: SyncMode) -> SyncPlan {
  let entries = fold_entries(document, mode);

  let sites_by_name: HashMap<&str, &Site> =
    snapshot.sites.iter().map(|s| (s.name.as_str(), s)).collect();
  let mut alternatives_by_site: HashMap<SiteId, Vec<&Alternative>> = HashMap::new();
  for alt in &snapshot.alternatives {
    alternatives_by_site.entry(alt.site_id).or_default().push(alt);
  }

  let mut plan = SyncPlan::default();

  for entry in &entries {
    let name = entry.record.name.as_str();

    let Some(site) = sites_by_name.get(name) else {
      plan.site_inserts.push(entry.record.clone());
      for alt in &entry.alternatives {
        plan.alternative_inserts.push((name.to_owned(), (*alt).clone()));
      }
      continue;
    };

    if site.record() == *entry.record {
      plan.sites_unchanged += 1;
    } else {
      plan.site_updates.push((site.id, entry.record.clone()));
    }

    let existing: HashMap<&str, &Alternative> = alternatives_by_site
      .get(&site.id)
      .into_iter()
      .flatten()
      .map(|a| (a.alt_name.as_str(), *a))
      .collect();

    for alt in &entry.alternatives {
      match existing.get(alt.alt_name.as_str()) {
        Some(current) if current.record() == **alt => plan.alternatives_unchanged += 1,
        Some(current) => plan.alternative_updates.push((current.id, (*alt).clone())),
        None => plan.alternative_inserts.push((name.to_owned(), (*alt).clone())),
      }
    }

    if mode == SyncMode::Prune {
      let listed: HashSet<&str> =
        entry.alternatives.iter().map(|a| a.alt_name.as_str()).collect();
      let mut stale: Vec<AlternativeId> = existing
        .values()
        .filter(|a| !listed.contains(a.alt_name.as_str()))
        .map(|a| a.id)
        .collect();
      stale.sort_unstable();
      plan.alternative_deletes.extend(stale);
    }
  }

  if mode == SyncMode::Prune {
    let listed: HashSet<&str> = entries.iter().map(|e| e.record.name.as_str()).collect();
    for site in snapshot.sites.iter().filter(|s| !listed.contains(s.name.as_str())) {
      plan.site_deletes.push(site.id);
      plan.cascaded_alternatives +=
        alternatives_by_site.get(&site.id).map_or(0, Vec::len);
    }
  }

  plan
}

fn fold_entries(document: &SourceDocument, mode: SyncMode) -> Vec<Entry<'_>> {
  let mut entries: Vec<Entry<'_>> = Vec::new();
  let mut index: HashMap<&str, usize> = HashMap::new();

  for site in &document.sites {
    let alternatives = dedup_alternatives(site.alternatives.iter());
    match index.get(site.record.name.as_str()) {
      Some(&i) => {
        let entry = &mut entries[i];
        entry.record = &site.record;
        entry.alternatives = match mode {
          SyncMode::Prune => alternatives,
          SyncMode::Merge => {
            dedup_alternatives(entry.alternatives.iter().copied().chain(alternatives))
          }
        };
      }
      None => {
        index.insert(site.record.name.as_str(), entries.len());
        entries.push(Entry { record: &site.record, alternatives });
      }
    }
  }

  entries
}

/// Keep one alternative per name: first position, last value.
fn dedup_alternatives<'a>(
  alternatives: impl Iterator<Item = &'a AlternativeRecord>,
) -> Vec<&'a AlternativeRecord> {
  let mut out: Vec<&AlternativeRecord> = Vec::new();
  let mut index: HashMap<&str, usize> = HashMap::new();
  for alt in alternatives {
    match index.get(alt.alt_name.as_str()) {
      Some(&i) => out[i] = alt,
      None => {
        index.insert(alt.alt_name.as_str(), out.len());
        out.push(alt);
      }
    }
  }
  out
}

// ─── Running ─────────────────────────────────────────────────────────────────

/// Load the document at `path` and reconcile `store` against it.
///
/// A missing file is returned as [`crate::Error::SourceMissing`] before the
/// store is touched.
pub async fn sync_from_file<S: CatalogStore>(
  store: &S,
  path: &Path,
  mode: SyncMode,
) -> Result<SyncReport> {
  let document = SourceDocument::load(path)?;
  store.reconcile(&document, mode).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::SourceSite;

  fn record(name: &str, status: &str) -> SiteRecord {
    SiteRecord {
      name: name.into(),
      url: format!("https://{}.example", name.to_lowercase()),
      category: "Test".into(),
      status: status.into(),
      ..Default::default()
    }
  }

  fn alt(name: &str, url: &str) -> AlternativeRecord {
    AlternativeRecord {
      alt_name:        name.into(),
      alt_url:         url.into(),
      alt_description: String::new(),
    }
  }

  fn doc(sites: Vec<(SiteRecord, Vec<AlternativeRecord>)>) -> SourceDocument {
    SourceDocument {
      sites: sites
        .into_iter()
        .map(|(record, alternatives)| SourceSite { record, alternatives })
        .collect(),
    }
  }

  /// Snapshot equivalent to having applied `document` to an empty store.
  fn snapshot_of(document: &SourceDocument) -> Snapshot {
    let mut snap = Snapshot::default();
    let mut next_alt = 100;
    for (i, s) in document.sites.iter().enumerate() {
      let id = i as SiteId + 1;
      snap.sites.push(Site::from_record(id, s.record.clone()));
      for a in &s.alternatives {
        snap.alternatives.push(Alternative {
          id:              next_alt,
          site_id:         id,
          alt_name:        a.alt_name.clone(),
          alt_url:         a.alt_url.clone(),
          alt_description: a.alt_description.clone(),
        });
        next_alt += 1;
      }
    }
    snap
  }

  #[test]
  fn empty_store_inserts_everything() {
    let d = doc(vec![
      (record("A", "x"), vec![alt("A1", "u1"), alt("A2", "u2")]),
      (record("B", "y"), vec![]),
    ]);
    let p = plan(&Snapshot::default(), &d, SyncMode::Merge);
    assert_eq!(p.site_inserts.len(), 2);
    assert_eq!(p.alternative_inserts.len(), 2);
    assert_eq!(p.alternative_inserts[0].0, "A");
    assert!(p.site_updates.is_empty());
  }

  #[test]
  fn matching_store_is_a_no_op() {
    let d = doc(vec![(record("A", "x"), vec![alt("A1", "u1")])]);
    let p = plan(&snapshot_of(&d), &d, SyncMode::Prune);
    assert!(p.is_empty(), "{p:?}");
    assert_eq!(p.sites_unchanged, 1);
    assert_eq!(p.alternatives_unchanged, 1);
    assert!(!p.report().changed());
  }

  #[test]
  fn changed_status_is_an_update_in_place() {
    let before = doc(vec![(record("A", "Vérification requise"), vec![])]);
    let after = doc(vec![(record("A", "Bloqué"), vec![])]);
    let p = plan(&snapshot_of(&before), &after, SyncMode::Merge);
    assert!(p.site_inserts.is_empty());
    assert_eq!(p.site_updates, vec![(1, record("A", "Bloqué"))]);
  }

  #[test]
  fn changed_alternative_url_is_an_update() {
    let before = doc(vec![(record("A", "x"), vec![alt("A1", "old")])]);
    let after = doc(vec![(record("A", "x"), vec![alt("A1", "new"), alt("A2", "u")])]);
    let p = plan(&snapshot_of(&before), &after, SyncMode::Merge);
    assert_eq!(p.alternative_updates, vec![(100, alt("A1", "new"))]);
    assert_eq!(p.alternative_inserts, vec![("A".to_string(), alt("A2", "u"))]);
  }

  #[test]
  fn merge_never_deletes() {
    let before = doc(vec![
      (record("A", "x"), vec![alt("A1", "u"), alt("A2", "u")]),
      (record("B", "x"), vec![alt("B1", "u")]),
    ]);
    let after = doc(vec![(record("A", "x"), vec![alt("A1", "u")])]);
    let p = plan(&snapshot_of(&before), &after, SyncMode::Merge);
    assert!(p.is_empty());
    assert!(p.site_deletes.is_empty());
    assert!(p.alternative_deletes.is_empty());
  }

  #[test]
  fn prune_removes_unlisted_sites_and_alternatives() {
    let before = doc(vec![
      (record("A", "x"), vec![alt("A1", "u"), alt("A2", "u")]),
      (record("B", "x"), vec![alt("B1", "u"), alt("B2", "u")]),
    ]);
    let after = doc(vec![(record("A", "x"), vec![alt("A1", "u")])]);
    let p = plan(&snapshot_of(&before), &after, SyncMode::Prune);
    assert_eq!(p.alternative_deletes, vec![101]);
    assert_eq!(p.site_deletes, vec![2]);
    let report = p.report();
    assert_eq!(report.sites_pruned, 1);
    assert_eq!(report.alternatives_pruned, 3);
  }

  #[test]
  fn repeated_names_fold_into_one_entry() {
    let d = doc(vec![
      (record("A", "first"), vec![alt("A1", "u1")]),
      (record("A", "second"), vec![alt("A1", "u2"), alt("A2", "u")]),
    ]);
    let p = plan(&Snapshot::default(), &d, SyncMode::Merge);
    assert_eq!(p.site_inserts, vec![record("A", "second")]);
    assert_eq!(p.alternative_inserts, vec![
      ("A".to_string(), alt("A1", "u2")),
      ("A".to_string(), alt("A2", "u")),
    ]);

    let d = doc(vec![
      (record("A", "first"), vec![alt("A1", "u1")]),
      (record("A", "second"), vec![alt("A2", "u")]),
    ]);
    let p = plan(&Snapshot::default(), &d, SyncMode::Prune);
    assert_eq!(p.alternative_inserts, vec![("A".to_string(), alt("A2", "u"))]);
  }
}
