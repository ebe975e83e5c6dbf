//! XML file backend.

use crate::error::MapperResult;
use crate::file;
use crate::kind::MapperKind;
use crate::mapper::Mapper;
use crate::params::MapperParams;
use crate::record::{Record, Value};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::warn;

/// Element tag used when the initialization parameters carry no type tag.
const DEFAULT_TAG: &str = "record";

/// A mapper that stores one record per flat XML file.
///
/// The query is a filesystem path without extension; the physical target is
/// `<query>.xml`. The document wraps one element per top-level key inside a
/// root tag pluralized from the record type tag:
///
/// ```xml
/// <?xml version="1.0" encoding="utf-8"?>
/// <records>
///     <record id="KEY">BASE64(VALUE)</record>
/// </records>
/// ```
///
/// Element bodies carry the base64 of the value's JSON serialization so
/// non-string values survive the trip; decoding falls back to the raw
/// decoded text for documents produced by other tools.
#[derive(Debug)]
pub struct XmlMapper {
    data: Option<Record>,
    query: Option<String>,
    tag: String,
    init: Option<MapperParams>,
}

impl Default for XmlMapper {
    fn default() -> Self {
        Self {
            data: None,
            query: None,
            tag: DEFAULT_TAG.to_owned(),
            init: None,
        }
    }
}

/// Parser state threaded through one streaming parse.
///
/// Accumulates character data per element and owns the partially-built
/// record, so a parse holds no state outside its own call.
struct XmlParseContext {
    data: Record,
    current: Option<String>,
    text: String,
}

impl XmlParseContext {
    fn new() -> Self {
        Self {
            data: Record::new(),
            current: None,
            text: String::new(),
        }
    }

    /// Enters a record element identified by `id`.
    fn open(&mut self, id: String) {
        self.current = Some(id);
        self.text.clear();
    }

    /// Accumulates character data inside the current element.
    fn push_text(&mut self, chunk: &str) {
        if self.current.is_some() {
            self.text.push_str(chunk);
        }
    }

    /// Leaves the current element, decoding its accumulated body.
    fn close(&mut self) -> MapperResult<()> {
        if let Some(key) = self.current.take() {
            let decoded = BASE64.decode(self.text.trim())?;
            let raw = String::from_utf8(decoded)?;
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            self.data.insert(key, value);
        }
        self.text.clear();
        Ok(())
    }
}

impl XmlMapper {
    /// Creates an unselected XML mapper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the element tag used for record keys.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn extension(&self) -> &'static str {
        self.kind().extension().unwrap_or_default()
    }

    fn target(&self) -> Option<PathBuf> {
        self.query
            .as_deref()
            .map(|query| file::target_path(query, self.extension()))
    }

    fn to_document(&mut self) -> MapperResult<String> {
        let record = self.record();
        let root = format!("{}s", self.tag);
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b'\t', 1);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(root.as_str())))?;
        for (key, value) in &record {
            let mut element = BytesStart::new(self.tag.as_str());
            element.push_attribute(("id", key.as_str()));
            writer.write_event(Event::Start(element))?;
            let encoded = BASE64.encode(serde_json::to_string(value)?);
            writer.write_event(Event::Text(BytesText::new(&encoded)))?;
            writer.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;
        }
        writer.write_event(Event::End(BytesEnd::new(root.as_str())))?;

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}

impl Mapper for XmlMapper {
    fn kind(&self) -> MapperKind {
        MapperKind::Xml
    }

    fn init(&mut self, params: &MapperParams) {
        self.data = None;
        self.init = Some(params.clone());
        self.tag = params
            .type_tag
            .clone()
            .unwrap_or_else(|| DEFAULT_TAG.to_owned());
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
            warn!(file = %file.display(), %err, "record file is not a valid document");
            return Record::new();
        }
        self.data.clone().unwrap_or_default()
    }

    fn serialized(&mut self) -> String {
        self.to_document().unwrap_or_else(|err| {
            warn!(%err, "cannot serialize record");
            String::new()
        })
    }

    fn set_record(&mut self, data: Record) {
        self.data = Some(data);
    }

    fn set_serialized(&mut self, data: &str) -> MapperResult<()> {
        let mut reader = Reader::from_str(data);
        let mut ctx = XmlParseContext::new();
        loop {
            match reader.read_event()? {
                Event::Start(element) => {
                    if !element
                        .local_name()
                        .as_ref()
                        .eq_ignore_ascii_case(self.tag.as_bytes())
                    {
                        continue;
                    }
                    for attribute in element.attributes() {
                        let attribute = attribute.map_err(quick_xml::Error::from)?;
                        if attribute.key.as_ref().eq_ignore_ascii_case(b"id") {
                            ctx.open(attribute.unescape_value()?.into_owned());
                        }
                    }
                }
                Event::Text(chunk) => ctx.push_text(&chunk.unescape()?),
                Event::End(element) => {
                    if element
                        .local_name()
                        .as_ref()
                        .eq_ignore_ascii_case(self.tag.as_bytes())
                    {
                        ctx.close()?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        self.data = Some(ctx.data);
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
    fn document_round_trips_scalars_and_arrays() {
        let mut mapper = XmlMapper::new();
        mapper.init(&MapperParams::new().with_type_tag("preference"));
        mapper.set_record(record_from([
            ("theme", json!("dark")),
            ("count", json!(3)),
            ("tags", json!(["a", "b"])),
        ]));
        let document = mapper.serialized();

        let mut parsed = XmlMapper::new();
        parsed.init(&MapperParams::new().with_type_tag("preference"));
        parsed.set_serialized(&document).unwrap();
        assert_eq!(
            parsed.record(),
            record_from([
                ("count", json!(3)),
                ("tags", json!(["a", "b"])),
                ("theme", json!("dark")),
            ])
        );
    }

    #[test]
    fn document_uses_pluralized_root_and_id_attributes() {
        let mut mapper = XmlMapper::new();
        mapper.init(&MapperParams::new().with_type_tag("preference"));
        mapper.set_record(record_from([("theme", json!("dark"))]));
        let document = mapper.serialized();

        assert!(document.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(document.contains("<preferences>"));
        assert!(document.contains(r#"<preference id="theme">"#));
        assert!(document.ends_with("</preferences>"));
    }

    #[test]
    fn element_bodies_are_base64() {
        let mut mapper = XmlMapper::new();
        mapper.set_record(record_from([("k", json!("v"))]));
        let document = mapper.serialized();

        let encoded = BASE64.encode(r#""v""#);
        assert!(document.contains(&encoded));
    }

    #[test]
    fn parse_matches_tags_case_insensitively() {
        let document = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Records>\n\
             <Record id=\"k\">InYi</Record>\n</Records>";

        let mut mapper = XmlMapper::new();
        mapper.set_serialized(document).unwrap();
        assert_eq!(mapper.record(), record_from([("k", json!("v"))]));
    }

    #[test]
    fn plain_text_bodies_decode_as_strings() {
        // Body is base64 of `hello`, not of a JSON document
        let encoded = BASE64.encode("hello");
        let document = format!("<records><record id=\"k\">{encoded}</record></records>");

        let mut mapper = XmlMapper::new();
        mapper.set_serialized(&document).unwrap();
        assert_eq!(mapper.record(), record_from([("k", json!("hello"))]));
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "prefs/alice");

        let mut mapper = XmlMapper::new();
        mapper.init(
            &MapperParams::new()
                .with_query(&query)
                .with_type_tag("preference"),
        );
        mapper.set_record(record_from([
            ("theme", json!("dark")),
            ("lang", json!("en")),
        ]));
        assert!(mapper.modify());

        let mut reader = XmlMapper::new();
        reader.init(
            &MapperParams::new()
                .with_query(&query)
                .with_type_tag("preference"),
        );
        assert!(reader.exists());
        assert_eq!(
            reader.record(),
            record_from([("lang", json!("en")), ("theme", json!("dark"))])
        );
    }

    #[test]
    fn missing_file_reads_as_empty_record() {
        let dir = tempdir().unwrap();
        let mut mapper = XmlMapper::new();
        mapper.init(&MapperParams::new().with_query(query_in(&dir, "absent")));
        assert!(mapper.record().is_empty());
    }

    #[test]
    fn malformed_document_reads_as_empty_record() {
        let dir = tempdir().unwrap();
        let query = query_in(&dir, "broken");
        fs::write(format!("{query}.xml"), "<records><record id=").unwrap();

        let mut mapper = XmlMapper::new();
        mapper.init(&MapperParams::new().with_query(&query));
        assert!(mapper.record().is_empty());
    }

    #[test]
    fn rename_moves_record() {
        let dir = tempdir().unwrap();
        let old = query_in(&dir, "old");
        let new = query_in(&dir, "fresh");

        let mut mapper = XmlMapper::new();
        mapper.init(&MapperParams::new().with_query(&old));
        mapper.set_record(record_from([("k", json!("v"))]));
        assert!(mapper.modify());

        assert!(mapper.rename(&new));
        assert!(mapper.exists());
        assert_eq!(mapper.current_query(), Some(new.as_str()));
    }
}
