// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// The logical attributes written for every candidate.
///
/// The date of birth of a record is split into the three `Day`, `Month`
/// and `Year` attributes when it is written.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Attribute {
    Name,
    Street,
    City,
    Postal,
    Email,
    Phone,
    Day,
    Month,
    Year,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Name,
        Attribute::Street,
        Attribute::City,
        Attribute::Postal,
        Attribute::Email,
        Attribute::Phone,
        Attribute::Day,
        Attribute::Month,
        Attribute::Year,
    ];

    /// The key used to refer to this attribute in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Street => "street",
            Attribute::City => "city",
            Attribute::Postal => "postal",
            Attribute::Email => "email",
            Attribute::Phone => "phone",
            Attribute::Day => "day",
            Attribute::Month => "month",
            Attribute::Year => "year",
        }
    }

    pub fn from_key(key: &str) -> Option<Attribute> {
        Attribute::ALL.iter().copied().find(|a| a.key() == key)
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One candidate, as read from the roster.
///
/// Missing cells are expected to be empty strings.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    /// The full name, usually written as "Last, First".
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
}

// ********* Layouts **********

/// How the year of birth is written on a document.
///
/// Not all the sheets of the same family agree on this, so it is
/// attached to each layout.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum YearFormat {
    /// The last two digits: 1990 -> "90"
    #[default]
    TwoDigit,
    /// The full year: 1990 -> "1990"
    FourDigit,
}

/// The label of each attribute, before the slot prefix and suffix are applied.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Labels {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal: String,
    pub email: String,
    pub phone: String,
    pub day: String,
    pub month: String,
    pub year: String,
}

impl Labels {
    pub fn new(labels: [&str; 9]) -> Labels {
        let [name, street, city, postal, email, phone, day, month, year] = labels;
        Labels {
            name: name.to_string(),
            street: street.to_string(),
            city: city.to_string(),
            postal: postal.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            day: day.to_string(),
            month: month.to_string(),
            year: year.to_string(),
        }
    }

    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Name => &self.name,
            Attribute::Street => &self.street,
            Attribute::City => &self.city,
            Attribute::Postal => &self.postal,
            Attribute::Email => &self.email,
            Attribute::Phone => &self.phone,
            Attribute::Day => &self.day,
            Attribute::Month => &self.month,
            Attribute::Year => &self.year,
        }
    }
}

/// Replaces the derived field name of one attribute in one slot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Override {
    /// A single field name, unrelated to the slot tokens.
    Literal(String),
    /// The value is written into all these fields.
    FanOut(Vec<String>),
}

impl Override {
    pub fn targets(&self) -> Vec<String> {
        match self {
            Override::Literal(s) => vec![s.clone()],
            Override::FanOut(l) => l.clone(),
        }
    }
}

/// One candidate position in a document.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SlotSpec {
    pub prefix: String,
    pub suffix: String,
    pub overrides: BTreeMap<Attribute, Override>,
}

impl SlotSpec {
    pub fn new(prefix: &str, suffix: &str) -> SlotSpec {
        SlotSpec {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            overrides: BTreeMap::new(),
        }
    }

    /// The field names for an attribute in this slot. The names are opaque keys.
    pub fn targets(&self, labels: &Labels, attribute: Attribute) -> Vec<String> {
        match self.overrides.get(&attribute) {
            Some(o) => o.targets(),
            None => vec![format!(
                "{}{}{}",
                self.prefix,
                labels.get(attribute),
                self.suffix
            )],
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SlotLayout {
    pub name: String,
    pub labels: Labels,
    pub slots: Vec<SlotSpec>,
    pub year_format: YearFormat,
}

impl SlotLayout {
    /// The number of candidates that fit in one document.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

// ********* Host and facility **********

/// Maps a logical host attribute (`host_name`, `facility_name`, ...) to the fields that receive it.
pub type HostFieldMap = Vec<(String, Vec<String>)>;

/// The constant host and facility fields, written before any candidate.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct HostInfo {
    pub fields: Vec<(String, String)>,
}

impl HostInfo {
    pub fn new(fields: &[(&str, &str)]) -> HostInfo {
        HostInfo {
            fields: fields
                .iter()
                .map(|(t, v)| (t.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Builds the fields from a profile of logical values and the field map of a template.
    /// Logical attributes missing from the profile are left out.
    pub fn from_profile(profile: &BTreeMap<String, String>, field_map: &HostFieldMap) -> HostInfo {
        let mut fields: Vec<(String, String)> = Vec::new();
        for (key, targets) in field_map.iter() {
            if let Some(value) = profile.get(key) {
                for target in targets.iter() {
                    fields.push((target.clone(), value.clone()));
                }
            }
        }
        HostInfo { fields }
    }
}

// ******** Output data structures *********

/// The values for one document, by field name.
pub type FillMap = BTreeMap<String, String>;

/// A defect in a layout table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LayoutIssue {
    EmptyLayout,
    EmptyOverride {
        position: usize,
        attribute: Attribute,
    },
    /// The same field name is produced twice: one candidate would overwrite the other.
    Collision {
        target: String,
        first: (usize, Attribute),
        second: (usize, Attribute),
    },
    /// A candidate field overwrites a host constant.
    HostCollision {
        target: String,
        position: usize,
        attribute: Attribute,
    },
}

impl Display for LayoutIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutIssue::EmptyLayout => write!(f, "the layout has no slot"),
            LayoutIssue::EmptyOverride {
                position,
                attribute,
            } => write!(
                f,
                "slot {}: the override for {} has no target",
                position + 1,
                attribute
            ),
            LayoutIssue::Collision {
                target,
                first,
                second,
            } => write!(
                f,
                "field {:?} is used by slot {} ({}) and slot {} ({})",
                target,
                first.0 + 1,
                first.1,
                second.0 + 1,
                second.1
            ),
            LayoutIssue::HostCollision {
                target,
                position,
                attribute,
            } => write!(
                f,
                "field {:?} of slot {} ({}) is also a host field",
                target,
                position + 1,
                attribute
            ),
        }
    }
}

/// Errors from the resolver and the registries.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FillError {
    PositionOutOfRange { position: usize, capacity: usize },
    UnknownLayout(String),
    UnknownHostInfo(String),
    InvalidLayout(String, Vec<LayoutIssue>),
}

impl Error for FillError {}

impl Display for FillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillError::PositionOutOfRange { position, capacity } => write!(
                f,
                "position {} is out of range for a layout of {} slots",
                position, capacity
            ),
            FillError::UnknownLayout(name) => write!(f, "unknown layout {:?}", name),
            FillError::UnknownHostInfo(name) => write!(f, "unknown host info {:?}", name),
            FillError::InvalidLayout(name, issues) => {
                write!(f, "layout {:?} is invalid:", name)?;
                for issue in issues.iter() {
                    write!(f, " {};", issue)?;
                }
                Ok(())
            }
        }
    }
}
