//! JSON file backend.

use crate::error::MapperResult;
use crate::file;
use crate::kind::MapperKind;
use crate::mapper::Mapper;
use crate::params::MapperParams;
use crate::record::Record;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// A mapper that stores one record per flat JSON file.
///
/// The query is a filesystem path without extension; the physical target is
/// `<query>.json` holding a single JSON object. An absent file reads as an
/// empty record and a write is a full-file overwrite of compact JSON with
/// sorted keys.
///
/// # Example
///
/// ```no_run
/// use recstore_mapper::{JsonMapper, Mapper, MapperParams};
///
/// let mut mapper = JsonMapper::new();
/// mapper.init(&MapperParams::new().with_query("prefs/alice"));
/// let data = mapper.record();
/// ```
#[derive(Debug, Default)]
pub struct JsonMapper {
    data: Option<Record>,
    query: Option<String>,
    init: Option<MapperParams>,
}

impl JsonMapper {
    /// Creates an unselected JSON mapper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn extension(&self) -> &'static str {
        // File-backed kind, always present
        self.kind().extension().unwrap_or_default()
    }

    fn target(&self) -> Option<PathBuf> {
        self.query
            .as_deref()
            .map(|query| file::target_path(query, self.extension()))
    }
}

impl Mapper for JsonMapper {
    fn kind(&self) -> MapperKind {
        MapperKind::Json
    }

    fn init(&mut self, params: &MapperParams) {
        self.data = None;
        self.init = Some(params.clone());
        if let Some(query) = params.query.clone() {
            self.select(&query);
        }
    }

    fn initialization(&self) -> Option<&MapperParams> {
        self.init.as_ref()
    }

    fn select(&mut self, query: &str) {
        if self.query.as_deref() != Some(query) {
            self.data = None;
        }
        self.query = Some(query.to_owned());
    }

    fn current_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn exists(&self) -> bool {
        self.target().is_some_and(|file| file.is_file())
    }

    fn record(&mut self) -> Record {
        if let Some(data) = &self.data {
            return data.clone();
        }
        let Some(file) = self.target() else {
            return Record::new();
        };
        if !file.is_file() {
            return Record::new();
        }
        let contents = match fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(file = %file.display(), %err, "cannot read record file");
                return Record::new();
            }
        };
        if let Err(err) = self.set_serialized(&contents) {
            warn!(file = %file.display(), %err, "record file is not a JSON object");
            return Record::new();
        }
        self.data.clone().unwrap_or_default()
    }

    fn serialized(&mut self) -> String {
        serde_json::to_string(&self.record()).unwrap_or_else(|err| {
            warn!(%err, "cannot serialize record");
            String::new()
        })
    }

    fn set_record(&mut self, data: Record) {
        self.data = Some(data);
    }

    fn set_serialized(&mut self, data: &str) -> MapperResult<()> {
        self.data = Some(serde_json::from_str(data)?);
        Ok(())
    }

    fn modify(&mut self) -> bool {
        let Some(file) = self.target() else {
            return false;
        };
        let payload = self.serialized();
        file::write_target(&file, &payload)
    }

    fn delete(&mut self) -> bool {
        let Some(file) = self.target() else {
            return false;
        };
        file::delete_target(&file)
    }

    fn rename(&mut self, query: &str) -> bool {
        let Some(current) = self.query.clone() else {
            return false;
        };
        if current == query {
            return true;
        }
        let old = file::target_path(&current, self.extension());
        let new = file::target_path(query, self.extension());
        if !file::rename_target(&old, &new) {
            return false;
        }
        self.select(query);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record_from;
    use serde_json::json;
    use tempfile::tempdir;

    fn query_in(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn missing_file_reads_as_empty_record() {
        let dir = tempdir().unwrap();
        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(query_in(&dir, "absent")));

        assert!(!mapper.exists());
        assert!(mapper.record().is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "prefs/alice");

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));
        mapper.set_record(record_from([
            ("theme", json!("dark")),
            ("lang", json!("en")),
        ]));
        assert!(mapper.modify());

        let mut reader = JsonMapper::new();
        reader.init(&MapperParams::new().with_query(&query));
        assert!(reader.exists());
        assert_eq!(
            reader.record(),
            record_from([("lang", json!("en")), ("theme", json!("dark"))])
        );
    }

    #[test]
    fn serialized_form_is_compact_sorted_json() {
        let dir = tempdir().unwrap();
        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(query_in(&dir, "prefs/alice")));
        mapper.set_record(record_from([
            ("theme", json!("dark")),
            ("lang", json!("en")),
        ]));

        assert_eq!(mapper.serialized(), r#"{"lang":"en","theme":"dark"}"#);
    }

    #[test]
    fn file_contents_match_serialized_form() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "prefs/alice");

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));
        mapper.set_record(record_from([
            ("theme", json!("dark")),
            ("lang", json!("en")),
        ]));
        assert!(mapper.modify());

        let contents = fs::read_to_string(format!("{query}.json")).unwrap();
        assert_eq!(contents, r#"{"lang":"en","theme":"dark"}"#);
    }

    #[test]
    fn corrupt_file_reads_as_empty_record() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "broken");
        fs::write(format!("{query}.json"), "not json at all").unwrap();

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));
        assert!(mapper.record().is_empty());
    }

    #[test]
    fn non_object_document_reads_as_empty_record() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "list");
        fs::write(format!("{query}.json"), "[1,2,3]").unwrap();

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));
        assert!(mapper.record().is_empty());
    }

    #[test]
    fn select_drops_record_cached_for_previous_query() {
        let dir = tempdir().unwrap();
        let first = query_in(&dir, "first");
        let second = query_in(&dir, "second");

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&first));
        mapper.set_record(record_from([("k", json!("v"))]));
        assert!(mapper.modify());

        mapper.select(&second);
        assert!(mapper.record().is_empty());
    }

    #[test]
    fn rename_same_query_is_trivial_success() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "same");
        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));

        assert!(mapper.rename(&query));
    }

    #[test]
    fn rename_moves_record_and_reselects() {
        let dir = tempdir().unwrap();
        let old = query_in(&dir, "old/name");
        let new = query_in(&dir, "new/name");

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&old));
        mapper.set_record(record_from([("k", json!("v"))]));
        assert!(mapper.modify());

        assert!(mapper.rename(&new));
        assert_eq!(mapper.current_query(), Some(new.as_str()));
        assert!(mapper.exists());

        let mut at_old = JsonMapper::new();
        at_old.init(&MapperParams::new().with_query(&old));
        assert!(!at_old.exists());
    }

    #[test]
    fn rename_fails_when_target_exists() {
        let dir = tempdir().unwrap();
        let old = query_in(&dir, "old");
        let new = query_in(&dir, "new");

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&old));
        mapper.set_record(record_from([("k", json!("old"))]));
        assert!(mapper.modify());

        let mut other = JsonMapper::new();
        other.init(&MapperParams::new().with_query(&new));
        other.set_record(record_from([("k", json!("new"))]));
        assert!(other.modify());

        assert!(!mapper.rename(&new));
        assert_eq!(mapper.current_query(), Some(old.as_str()));
    }

    #[test]
    fn delete_removes_the_record() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "sole/target");

        let mut mapper = JsonMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));
        mapper.set_record(record_from([("k", json!("v"))]));
        assert!(mapper.modify());
        assert!(mapper.exists());

        assert!(mapper.delete());
        assert!(!mapper.exists());
    }

    #[test]
    fn unselected_mapper_refuses_writes() {
        let mut mapper = JsonMapper::new();
        assert!(!mapper.modify());
        assert!(!mapper.delete());
        assert!(!mapper.rename("anywhere"));
        assert!(!mapper.exists());
    }
}
