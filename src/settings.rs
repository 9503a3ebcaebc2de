//! Typed widget settings.
//!
//! The page editor stores every widget as a flat bag of field values keyed by
//! control name. These structs pick out the fields the renderers read, keep
//! the editor's key names, and turn missing or `null` values into empty
//! strings and `false` flags. Style controls in the same bag are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::attachments::{AttachmentResolver, FileRef};
use crate::error::Result;
use crate::markup::TextMode;
use crate::nav::{NavEntry, NavList};
use crate::table::{ManualRow, TableSource};

/// Rendering configuration shared by both widgets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub text_mode: TextMode,
}

impl RenderOptions {
    pub fn trusted() -> Self {
        Self {
            text_mode: TextMode::Trusted,
        }
    }
}

/// Treat an explicit `null` the same as an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Switcher controls store `"yes"` when on and `""` when off.
pub(crate) fn switcher<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(on) => on,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "1" | "on"
        ),
        Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    })
}

/// Attachment ids arrive as numbers or numeric strings; anything else is no id.
pub(crate) fn attachment_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// One repeater entry of the manual table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManualRowSettings {
    #[serde(rename = "sh_details_title", deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "sh_data_description", deserialize_with = "null_as_default")]
    pub description: String,
}

/// Settings of the table widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// `true` renders the manual table, `false` the uploaded spreadsheet.
    #[serde(rename = "sh_tabe_or_file", deserialize_with = "switcher")]
    pub manual_mode: bool,
    #[serde(rename = "sh_details_heading_title", deserialize_with = "null_as_default")]
    pub details_heading: String,
    #[serde(rename = "sh_data_heading_title", deserialize_with = "null_as_default")]
    pub data_heading: String,
    #[serde(rename = "sh_table_info", deserialize_with = "null_as_default")]
    pub rows: Vec<ManualRowSettings>,
    #[serde(rename = "sh_file_upload_excel", deserialize_with = "null_as_default")]
    pub file: FileRef,
}

impl TableSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Pick the active source. The attachment is only looked up in upload
    /// mode and only when a file URL is present.
    pub fn into_source<R>(self, resolver: &R) -> TableSource
    where
        R: AttachmentResolver + ?Sized,
    {
        if self.manual_mode {
            return TableSource::Manual {
                heading_details: self.details_heading,
                heading_data: self.data_heading,
                rows: self
                    .rows
                    .into_iter()
                    .map(|row| ManualRow::new(row.title, row.description))
                    .collect(),
            };
        }

        let local_path = if self.file.is_empty() {
            None
        } else {
            resolver.attached_file(&self.file)
        };
        TableSource::upload(self.file.url, local_path)
    }
}

/// One repeater entry of the navigation widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NavItemSettings {
    #[serde(rename = "sh_nav_label", deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(rename = "sh_nav_anchor", deserialize_with = "null_as_default")]
    pub anchor: String,
}

/// Settings of the navigation widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    #[serde(rename = "sh_nav_list", deserialize_with = "null_as_default")]
    pub items: Vec<NavItemSettings>,
    #[serde(rename = "sh_show_label", deserialize_with = "switcher")]
    pub show_labels: bool,
}

impl NavSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_list(self) -> NavList {
        NavList {
            entries: self
                .items
                .into_iter()
                .map(|item| NavEntry::new(item.label, item.anchor))
                .collect(),
            show_labels: self.show_labels,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_case::test_case;

    fn no_files(_: &FileRef) -> Option<PathBuf> {
        None
    }

    #[test_case(r#""yes""#, true ; "yes")]
    #[test_case(r#""""#, false ; "empty string")]
    #[test_case("true", true ; "bool true")]
    #[test_case("false", false ; "bool false")]
    #[test_case("1", true ; "number one")]
    #[test_case("0", false ; "number zero")]
    #[test_case(r#"" YES ""#, true ; "padded uppercase")]
    #[test_case(r#""no""#, false ; "no")]
    #[test_case("null", false ; "null")]
    fn test_switcher_values(raw: &str, expected: bool) {
        let json = format!(r#"{{"sh_tabe_or_file": {raw}}}"#);
        let settings = TableSettings::from_json(&json).unwrap();
        assert_eq!(settings.manual_mode, expected);
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let settings = TableSettings::from_json("{}").unwrap();
        assert_eq!(settings, TableSettings::default());
        assert!(!settings.manual_mode);

        let nav = NavSettings::from_json("{}").unwrap();
        assert!(nav.items.is_empty());
        assert!(!nav.show_labels);
    }

    #[test]
    fn test_nulls_default_to_empty() {
        let settings = TableSettings::from_json(
            r#"{"sh_details_heading_title": null, "sh_table_info": null, "sh_file_upload_excel": null,
                "sh_table_info_extra": 3}"#,
        )
        .unwrap();
        assert_eq!(settings, TableSettings::default());
    }

    #[test]
    fn test_full_editor_record() {
        let settings = TableSettings::from_json(
            r##"{
                "sh_tabe_or_file": "yes",
                "sh_details_heading_title": "Feature",
                "sh_data_heading_title": "Detail",
                "sh_table_info": [
                    {"_id": "a1b2c3", "sh_details_title": "Speed", "sh_data_description": "Fast"},
                    {"_id": "d4e5f6", "sh_details_title": "Cost"}
                ],
                "sh_file_upload_excel": {"url": "", "id": ""},
                "sh_heading_alignment": "center",
                "sh_heading_color": "#333"
            }"##,
        )
        .unwrap();
        assert!(settings.manual_mode);
        assert_eq!(settings.details_heading, "Feature");
        assert_eq!(settings.rows.len(), 2);
        assert_eq!(settings.rows[1].title, "Cost");
        assert_eq!(settings.rows[1].description, "");
        assert_eq!(settings.file.id, None);
    }

    #[test_case(r#"42"#, Some(42) ; "number")]
    #[test_case(r#""42""#, Some(42) ; "numeric string")]
    #[test_case(r#""""#, None ; "empty string")]
    #[test_case(r#"-1"#, None ; "negative")]
    #[test_case(r#"null"#, None ; "null")]
    fn test_attachment_ids(raw: &str, expected: Option<u64>) {
        let json = format!(r#"{{"sh_file_upload_excel": {{"url": "x.xlsx", "id": {raw}}}}}"#);
        let settings = TableSettings::from_json(&json).unwrap();
        assert_eq!(settings.file.id, expected);
    }

    #[test]
    fn test_manual_source_never_resolves_attachment() {
        let settings = TableSettings {
            manual_mode: true,
            details_heading: "A".into(),
            data_heading: "B".into(),
            rows: vec![ManualRowSettings {
                title: "t".into(),
                description: "d".into(),
            }],
            file: FileRef::new("https://example.com/uploads/x.xlsx", Some(1)),
        };
        let resolver = |_: &FileRef| -> Option<PathBuf> { panic!("manual mode looked up a file") };
        let source = settings.into_source(&resolver);
        assert_eq!(
            source,
            TableSource::Manual {
                heading_details: "A".into(),
                heading_data: "B".into(),
                rows: vec![ManualRow::new("t", "d")],
            }
        );
    }

    #[test]
    fn test_upload_source_takes_extension_from_url() {
        let settings = TableSettings {
            file: FileRef::new("https://example.com/uploads/report.v2.xlsx", Some(5)),
            ..TableSettings::default()
        };
        let resolver = |f: &FileRef| Some(PathBuf::from(format!("/files/{}", f.id.unwrap())));
        match settings.into_source(&resolver) {
            TableSource::Upload {
                file_url,
                file_extension,
                local_path,
            } => {
                assert_eq!(file_url, "https://example.com/uploads/report.v2.xlsx");
                assert_eq!(file_extension, "xlsx");
                assert_eq!(local_path, Some(PathBuf::from("/files/5")));
            }
            other => panic!("expected upload source, got {other:?}"),
        }
    }

    #[test]
    fn test_upload_without_file_skips_resolver() {
        let source = TableSettings::default().into_source(&no_files);
        assert_eq!(
            source,
            TableSource::Upload {
                file_url: String::new(),
                file_extension: String::new(),
                local_path: None,
            }
        );
    }

    #[test]
    fn test_nav_settings_into_list() {
        let nav = NavSettings::from_json(
            r#"{"sh_show_label": "yes", "sh_nav_list": [
                {"sh_nav_label": "Intro", "sh_nav_anchor": "intro"},
                {"sh_nav_label": "Pricing", "sh_nav_anchor": "pricing"}
            ]}"#,
        )
        .unwrap();
        let list = nav.into_list();
        assert!(list.show_labels);
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[1], NavEntry::new("Pricing", "pricing"));
    }

    #[test]
    fn test_render_options_from_json() {
        let opts: RenderOptions = serde_json::from_str(r#"{"text_mode": "trusted"}"#).unwrap();
        assert_eq!(opts, RenderOptions::trusted());
        let opts: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.text_mode, TextMode::Escaped);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let err = TableSettings::from_json(r#"{"sh_table_info": "not a list"}"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid settings:"));
    }
}
