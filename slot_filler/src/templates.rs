//! The layouts of the Lifesaving Society test sheets.
//!
//! Each document names its fields in its own way. The names below come from
//! the field dumps of the fillable PDF files.

use crate::builder::LayoutBuilder;
use crate::{Attribute, FillError, HostFieldMap, Labels, LayoutRegistry, SlotLayout};

pub const BRONZE_CROSS: &str = "bronze_cross";
pub const BRONZE_MEDALLION: &str = "bronze_medallion";
pub const BRONZE_STAR: &str = "bronze_star";
pub const EMERGENCY_FIRST_AID: &str = "emergency_first_aid";
pub const STANDARD_FIRST_AID: &str = "standard_first_aid";

pub const ALL_TEMPLATES: [&str; 5] = [
    BRONZE_CROSS,
    BRONZE_MEDALLION,
    BRONZE_STAR,
    EMERGENCY_FIRST_AID,
    STANDARD_FIRST_AID,
];

// The nested suffixes of the bronze sheets, one per candidate on a page.
const BRONZE_PAGE_SUFFIXES: [&str; 6] = [
    ".0",
    ".1.0",
    ".1.1.0",
    ".1.1.1.0",
    ".1.1.1.1.0",
    ".1.1.1.1.1",
];

fn bronze_labels(number: &str) -> Labels {
    let l = |label: &str| format!("{}{}", label, number);
    Labels {
        name: l("Name"),
        street: l("Address"),
        city: l("City"),
        postal: l("Postal"),
        email: l("Email"),
        phone: l("Phone"),
        day: l("DOBD"),
        month: l("DOBM"),
        year: l("DOBY"),
    }
}

/// 95tsbronzecross2020: 6 candidates on the first page, 7 on the second.
///
/// The second page numbers its fields with a prefix. Candidate 9 has a second,
/// hidden address field and candidate 10 has a bare name field.
pub fn bronze_cross() -> Result<SlotLayout, FillError> {
    let mut b = LayoutBuilder::new(BRONZE_CROSS, bronze_labels("1"));
    for suffix in BRONZE_PAGE_SUFFIXES {
        b = b.slot("", suffix);
    }
    let second_page: [(&str, &str); 7] = [
        ("7", ".0"),
        ("8", ".1.0"),
        ("9", ".1.1.0"),
        ("10", ".1.1.1.0"),
        ("11", ".1.1.1.1.0"),
        ("12", ".1.1.1.1.1"),
        ("13", ".1.1.1.1.1"),
    ];
    for (prefix, suffix) in second_page {
        b = b.slot(prefix, suffix);
    }
    b.fan_out(
        8,
        Attribute::Street,
        &["9Address1.1.1.0", "Address1.1.1.0X"],
    )
    .literal(9, Attribute::Name, "10")
    .build()
}

/// 95tsbronzemedallion2020: the second page drops the "1" of the labels.
pub fn bronze_medallion() -> Result<SlotLayout, FillError> {
    let mut b = LayoutBuilder::new(BRONZE_MEDALLION, bronze_labels(""));
    for suffix in BRONZE_PAGE_SUFFIXES {
        b = b.slot("", format!("1{}", suffix).as_str());
    }
    for suffix in [
        ".0.0",
        ".0.1.0",
        ".0.1.1.0",
        ".0.1.1.1.0",
        ".0.1.1.1.1.0",
        ".0.1.1.1.1.1.0",
        ".0.1.1.1.1.1.1",
    ] {
        b = b.slot("", suffix);
    }
    b.build()
}

/// 95tsbronzestar2020: plain numbers on the first page, nested suffixes on the second.
pub fn bronze_star() -> Result<SlotLayout, FillError> {
    let mut b = LayoutBuilder::new(BRONZE_STAR, bronze_labels("")).numbered("", 1..=6);
    for suffix in [
        ".0",
        ".1.0",
        ".1.1.0",
        ".1.1.1.0",
        ".1.1.1.1.0",
        ".1.1.1.1.1.0",
        ".1.1.1.1.1.1",
    ] {
        b = b.slot("", suffix);
    }
    b.build()
}

/// 95efa_on2014: "Label N" fields, except the name of candidate 10.
pub fn emergency_first_aid() -> Result<SlotLayout, FillError> {
    LayoutBuilder::new(
        EMERGENCY_FIRST_AID,
        Labels::new([
            "Name", "Address", "City", "Postal", "Email", "Phone", "Day", "Month", "Year",
        ]),
    )
    .numbered(" ", 1..=10)
    .literal(9, Attribute::Name, "10")
    .build()
}

/// 95on_sfa_test_sheet-20231121
pub fn standard_first_aid() -> Result<SlotLayout, FillError> {
    LayoutBuilder::new(
        STANDARD_FIRST_AID,
        Labels::new([
            "NAME",
            "Address",
            "City",
            "Postal Code",
            "Email",
            "Phone",
            "Day",
            "Month",
            "Year",
        ]),
    )
    .numbered(" ", 1..=10)
    .build()
}

pub fn builtin_layout(name: &str) -> Result<SlotLayout, FillError> {
    match name {
        BRONZE_CROSS => bronze_cross(),
        BRONZE_MEDALLION => bronze_medallion(),
        BRONZE_STAR => bronze_star(),
        EMERGENCY_FIRST_AID => emergency_first_aid(),
        STANDARD_FIRST_AID => standard_first_aid(),
        x => Err(FillError::UnknownLayout(x.to_string())),
    }
}

pub fn builtin_layouts() -> Result<LayoutRegistry, FillError> {
    let mut res = LayoutRegistry::new();
    for name in ALL_TEMPLATES {
        res.register(builtin_layout(name)?);
    }
    Ok(res)
}

// ********* Host fields **********

// Logical host attributes, as used in the host profiles.
pub const HOST_NAME: &str = "host_name";
pub const HOST_AREA_CODE: &str = "host_area_code";
pub const HOST_PHONE_NUMBER: &str = "host_phone_num";
pub const HOST_PHONE: &str = "host_phone";
pub const HOST_ADDRESS: &str = "host_addr";
pub const HOST_CITY: &str = "host_city";
pub const HOST_PROVINCE: &str = "host_prov";
pub const HOST_POSTAL: &str = "host_postal";
pub const FACILITY_NAME: &str = "facility_name";
pub const FACILITY_AREA_CODE: &str = "facility_area_code";
pub const FACILITY_PHONE_NUMBER: &str = "facility_phone_num";
pub const FACILITY_PHONE: &str = "facility_phone";

fn field_map(entries: &[(&str, &[&str])]) -> HostFieldMap {
    entries
        .iter()
        .map(|(k, targets)| {
            (
                k.to_string(),
                targets.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

/// The invoicing fields of a built-in template.
pub fn builtin_host_fields(name: &str) -> Option<HostFieldMap> {
    match name {
        // The three bronze sheets share the same invoicing block.
        BRONZE_CROSS | BRONZE_MEDALLION | BRONZE_STAR => Some(field_map(&[
            (HOST_NAME, &["Text19"]),
            (HOST_AREA_CODE, &["Text20"]),
            (HOST_PHONE_NUMBER, &["Text21"]),
            (HOST_ADDRESS, &["Text22"]),
            (HOST_CITY, &["Text23"]),
            (HOST_PROVINCE, &["Text24"]),
            (HOST_POSTAL, &["Text25"]),
            (FACILITY_NAME, &["Text29"]),
        ])),
        EMERGENCY_FIRST_AID => Some(field_map(&[
            (HOST_NAME, &["Host Name"]),
            (HOST_ADDRESS, &["Host Address"]),
            (HOST_CITY, &["Host City"]),
            (HOST_PROVINCE, &["Host Province"]),
            (HOST_POSTAL, &["Host Postal Code"]),
            (HOST_AREA_CODE, &["Host Area Code"]),
            (HOST_PHONE_NUMBER, &["Host Number"]),
            (FACILITY_NAME, &["Facility Name"]),
            (FACILITY_AREA_CODE, &["Facility Area Code"]),
            (FACILITY_PHONE_NUMBER, &["Facility Number"]),
            // Older revisions of the sheet have a single phone field.
            (HOST_PHONE, &["Host Phone", "Telephone", "Phone"]),
            (FACILITY_PHONE, &["Facility Phone"]),
        ])),
        STANDARD_FIRST_AID => Some(field_map(&[
            (HOST_NAME, &["Host Name"]),
            (HOST_PHONE, &["Host Phone"]),
            (HOST_ADDRESS, &["Host Address"]),
            (HOST_CITY, &["Host City"]),
            (HOST_PROVINCE, &["Host Province"]),
            (HOST_POSTAL, &["Host Postal Code"]),
            (FACILITY_NAME, &["Facility Name"]),
        ])),
        _ => None,
    }
}
