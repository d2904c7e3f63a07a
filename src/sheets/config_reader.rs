use crate::sheets::io_common::ColumnNames;
use crate::sheets::io_output::OutputFormat;
use crate::sheets::*;

use serde::{Deserialize, Serialize};
use slot_filler::builder::LayoutBuilder;
use slot_filler::templates::*;
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
    #[serde(rename = "yearFormat")]
    pub year_format: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RosterColumns {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: Option<String>,
}

impl RosterColumns {
    pub fn column_names(&self) -> ColumnNames {
        let d = ColumnNames::default();
        ColumnNames {
            name: self.name.clone().unwrap_or(d.name),
            street: self.street.clone().unwrap_or(d.street),
            city: self.city.clone().unwrap_or(d.city),
            postal: self.postal.clone().unwrap_or(d.postal),
            email: self.email.clone().unwrap_or(d.email),
            phone: self.phone.clone().unwrap_or(d.phone),
            date_of_birth: self.date_of_birth.clone().unwrap_or(d.date_of_birth),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct RosterSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub columns: Option<RosterColumns>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CourseDef {
    pub key: String,
    pub layout: Option<String>,
    pub document: Option<String>,
    #[serde(rename = "outputStem")]
    pub output_stem: Option<String>,
    /// Logical host attribute -> fields
    #[serde(rename = "hostFields")]
    pub host_fields: Option<BTreeMap<String, Vec<String>>>,
    /// Field -> value, replaces the host profile for this course.
    #[serde(rename = "hostInfo")]
    pub host_info: Option<BTreeMap<String, String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideDef {
    Literal(String),
    FanOut(Vec<String>),
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SlotDef {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub overrides: Option<BTreeMap<String, OverrideDef>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDef {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    #[serde(rename = "yearFormat")]
    pub year_format: Option<JSValue>,
    pub slots: Vec<SlotDef>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SheetsConfig {
    pub course: Option<String>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "rosterSource")]
    pub roster_source: Option<RosterSource>,
    /// The host profile: logical host attribute -> value
    pub host: Option<BTreeMap<String, String>>,
    pub courses: Option<Vec<CourseDef>>,
    pub layouts: Option<Vec<LayoutDef>>,
}

/// A course, once the configuration has been merged with the built-in courses.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Course {
    pub key: String,
    pub layout: String,
    /// The fillable PDF of the course.
    pub document: String,
    pub output_stem: String,
    pub host_fields: HostFieldMap,
    pub host_info: Option<HostInfo>,
}

pub fn read_config(path: &str) -> BSheetResult<SheetsConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SheetsConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> BSheetResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn builtin_courses() -> Vec<Course> {
    let courses: [(&str, &str, &str); 5] = [
        (
            BRONZE_CROSS,
            "95tsbronzecross2020_fillable.pdf",
            "Bronze_Cross_Test_Sheet",
        ),
        (
            BRONZE_MEDALLION,
            "95tsbronzemedallion2020_fillable.pdf",
            "Bronze_Medallion_Test_Sheet",
        ),
        (
            BRONZE_STAR,
            "95tsbronzestar2020_fillable.pdf",
            "Bronze_Star_Filled",
        ),
        (EMERGENCY_FIRST_AID, "95efa_on2014.pdf", "EFA_Test_Sheet"),
        (
            STANDARD_FIRST_AID,
            "95on_sfa_test_sheet-20231121-fillable.pdf",
            "SFA_Exam_Sheet",
        ),
    ];
    courses
        .iter()
        .map(|(key, document, stem)| Course {
            key: key.to_string(),
            layout: key.to_string(),
            document: document.to_string(),
            output_stem: stem.to_string(),
            host_fields: builtin_host_fields(key).unwrap_or_default(),
            host_info: None,
        })
        .collect()
}

/// Merges the courses of the configuration into the built-in ones.
/// A course with the key of a built-in course only replaces the settings it provides.
pub fn validate_courses(defs: &[CourseDef]) -> SheetResult<Vec<Course>> {
    let mut res = builtin_courses();
    for def in defs.iter() {
        let host_fields: Option<HostFieldMap> = def
            .host_fields
            .clone()
            .map(|m| m.into_iter().collect());
        let host_info: Option<HostInfo> = def.host_info.as_ref().map(|m| HostInfo {
            fields: m.iter().map(|(t, v)| (t.clone(), v.clone())).collect(),
        });
        if let Some(c) = res.iter_mut().find(|c| c.key == def.key) {
            if let Some(l) = &def.layout {
                c.layout = l.clone();
            }
            if let Some(d) = &def.document {
                c.document = d.clone();
            }
            if let Some(s) = &def.output_stem {
                c.output_stem = s.clone();
            }
            if let Some(hf) = host_fields {
                c.host_fields = hf;
            }
            if host_info.is_some() {
                c.host_info = host_info;
            }
        } else {
            let document = match &def.document {
                Some(d) => d.clone(),
                None => whatever!("course {}: the document is required", def.key),
            };
            res.push(Course {
                key: def.key.clone(),
                layout: def.layout.clone().unwrap_or_else(|| def.key.clone()),
                document,
                output_stem: def.output_stem.clone().unwrap_or_else(|| def.key.clone()),
                host_fields: host_fields.unwrap_or_default(),
                host_info,
            });
        }
    }
    Ok(res)
}

pub fn validate_year_format(x: &Option<JSValue>) -> SheetResult<Option<YearFormat>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) if n.as_u64() == Some(2) => Ok(Some(YearFormat::TwoDigit)),
        Some(JSValue::Number(n)) if n.as_u64() == Some(4) => Ok(Some(YearFormat::FourDigit)),
        Some(JSValue::String(s)) => validate_year_format_str(s).map(Some),
        Some(x) => whatever!("Cannot use year format {:?}: expected 2 or 4", x),
    }
}

pub fn validate_year_format_str(s: &str) -> SheetResult<YearFormat> {
    match s {
        "2" | "yy" => Ok(YearFormat::TwoDigit),
        "4" | "yyyy" => Ok(YearFormat::FourDigit),
        x => whatever!("Cannot use year format {:?}: expected 2 or 4", x),
    }
}

pub fn validate_output_format(s: &str) -> SheetResult<OutputFormat> {
    match s {
        "fdf" => Ok(OutputFormat::Fdf),
        "json" => Ok(OutputFormat::Json),
        x => whatever!("Cannot use output format {:?}: expected fdf or json", x),
    }
}

fn validate_attribute(layout: &str, key: &str) -> SheetResult<Attribute> {
    match Attribute::from_key(key) {
        Some(a) => Ok(a),
        None => whatever!("layout {}: unknown attribute {:?}", layout, key),
    }
}

/// Turns a layout table of the configuration into a layout.
pub fn validate_layout_def(def: &LayoutDef) -> SheetResult<SlotLayout> {
    for key in def.labels.keys() {
        validate_attribute(&def.name, key)?;
    }
    let mut labels: Vec<&str> = Vec::new();
    for a in Attribute::ALL {
        match def.labels.get(a.key()) {
            Some(l) => labels.push(l.as_str()),
            None => whatever!("layout {}: missing label for {}", def.name, a),
        }
    }
    let labels: [&str; 9] = match labels.try_into() {
        Ok(l) => l,
        Err(_) => whatever!("layout {}: wrong number of labels", def.name),
    };

    let mut b = LayoutBuilder::new(&def.name, Labels::new(labels));
    if let Some(yf) = validate_year_format(&def.year_format)? {
        b = b.year_format(yf);
    }
    for slot in def.slots.iter() {
        b = b.slot(&slot.prefix, &slot.suffix);
    }
    for (position, slot) in def.slots.iter().enumerate() {
        for (key, o) in slot.overrides.clone().unwrap_or_default() {
            let attribute = validate_attribute(&def.name, &key)?;
            b = match o {
                OverrideDef::Literal(t) => b.literal(position, attribute, &t),
                OverrideDef::FanOut(l) => {
                    let targets: Vec<&str> = l.iter().map(|s| s.as_str()).collect();
                    b.fan_out(position, attribute, &targets)
                }
            };
        }
    }
    b.build().context(LayoutSnafu {})
}
