mod config;
mod normalize;

pub mod builder;
pub mod manual;
pub mod templates;

use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use crate::config::*;
pub use crate::normalize::{derive_dob, normalize_name, parse_day_first};

/// The field names that receive an attribute of the candidate at `position`.
///
/// All the irregularities of a document are described by the overrides of its
/// slots: there is no special case here.
pub fn resolve(
    layout: &SlotLayout,
    position: usize,
    attribute: Attribute,
) -> Result<Vec<String>, FillError> {
    let slot = layout
        .slots
        .get(position)
        .ok_or(FillError::PositionOutOfRange {
            position,
            capacity: layout.capacity(),
        })?;
    Ok(slot.targets(&layout.labels, attribute))
}

/// Fills one document.
///
/// Arguments:
/// * `layout` the slots of the document
/// * `host` the constant fields, written first
/// * `records` the candidates of this batch, in order. The records that do not fit
/// in the layout are dropped.
pub fn fill(layout: &SlotLayout, host: &HostInfo, records: &[Record]) -> FillMap {
    let mut res: FillMap = FillMap::new();
    for (target, value) in host.fields.iter() {
        res.insert(target.clone(), value.clone());
    }

    if records.len() > layout.capacity() {
        debug!(
            "fill: layout {}: dropping {} record(s) beyond the {} slots",
            layout.name,
            records.len() - layout.capacity(),
            layout.capacity()
        );
    }

    for (slot, record) in layout.slots.iter().zip(records.iter()) {
        let (day, month, year) = derive_dob(&record.date_of_birth, layout.year_format);
        for attribute in Attribute::ALL {
            let value = match attribute {
                Attribute::Name => normalize_name(&record.name),
                Attribute::Street => record.street.clone(),
                Attribute::City => record.city.clone(),
                Attribute::Postal => record.postal.clone(),
                Attribute::Email => record.email.clone(),
                Attribute::Phone => record.phone.clone(),
                Attribute::Day => day.clone(),
                Attribute::Month => month.clone(),
                Attribute::Year => year.clone(),
            };
            for target in slot.targets(&layout.labels, attribute) {
                res.insert(target, value.clone());
            }
        }
    }
    res
}

/// Splits the records into the batches of one document each.
pub fn batches<'a>(layout: &SlotLayout, records: &'a [Record]) -> Vec<&'a [Record]> {
    if layout.capacity() == 0 {
        return vec![];
    }
    records.chunks(layout.capacity()).collect()
}

/// Every field of every slot, filled with its own name.
///
/// Opening the result shows which box each field name addresses.
pub fn debug_fill(layout: &SlotLayout) -> FillMap {
    let mut res: FillMap = FillMap::new();
    for slot in layout.slots.iter() {
        for attribute in Attribute::ALL {
            for target in slot.targets(&layout.labels, attribute) {
                res.insert(target.clone(), target);
            }
        }
    }
    res
}

/// Fills every field of a document with its own name.
///
/// Unlike [`debug_fill`], this shows the fields that no layout knows about.
pub fn name_fill(document_fields: &[String]) -> FillMap {
    document_fields
        .iter()
        .map(|f| (f.clone(), f.clone()))
        .collect()
}

// Every field written by the layout or the host.
fn written_targets(layout: &SlotLayout, host: &HostInfo) -> BTreeSet<String> {
    let mut res: BTreeSet<String> = host.fields.iter().map(|(t, _)| t.clone()).collect();
    for slot in layout.slots.iter() {
        for attribute in Attribute::ALL {
            res.extend(slot.targets(&layout.labels, attribute));
        }
    }
    res
}

/// The fields written by the layout or the host that the document does not have.
/// A document ignores these values.
pub fn missing_targets(
    layout: &SlotLayout,
    host: &HostInfo,
    document_fields: &[String],
) -> Vec<String> {
    let known: BTreeSet<&String> = document_fields.iter().collect();
    written_targets(layout, host)
        .into_iter()
        .filter(|t| !known.contains(t))
        .collect()
}

/// The fields of the document that nothing writes, in document order.
pub fn unused_fields(
    layout: &SlotLayout,
    host: &HostInfo,
    document_fields: &[String],
) -> Vec<String> {
    let written = written_targets(layout, host);
    document_fields
        .iter()
        .filter(|f| !written.contains(*f))
        .cloned()
        .collect()
}

/// Looks for the defects that silently overwrite the data of a candidate.
pub fn validate_layout(layout: &SlotLayout) -> Vec<LayoutIssue> {
    let mut issues: Vec<LayoutIssue> = Vec::new();
    if layout.slots.is_empty() {
        issues.push(LayoutIssue::EmptyLayout);
    }
    let mut seen: HashMap<String, (usize, Attribute)> = HashMap::new();
    for (position, slot) in layout.slots.iter().enumerate() {
        for attribute in Attribute::ALL {
            let targets = slot.targets(&layout.labels, attribute);
            if targets.is_empty() {
                issues.push(LayoutIssue::EmptyOverride {
                    position,
                    attribute,
                });
            }
            for target in targets {
                match seen.get(&target) {
                    // A fan-out listing the same name twice is harmless.
                    Some(first) if *first == (position, attribute) => {}
                    Some(first) => issues.push(LayoutIssue::Collision {
                        target: target.clone(),
                        first: *first,
                        second: (position, attribute),
                    }),
                    None => {
                        seen.insert(target, (position, attribute));
                    }
                }
            }
        }
    }
    debug!(
        "validate_layout: {}: {} fields, {} issue(s)",
        layout.name,
        seen.len(),
        issues.len()
    );
    issues
}

/// Looks for candidate fields that would overwrite a host field.
pub fn validate_host(layout: &SlotLayout, host: &HostInfo) -> Vec<LayoutIssue> {
    let mut issues: Vec<LayoutIssue> = Vec::new();
    for (position, slot) in layout.slots.iter().enumerate() {
        for attribute in Attribute::ALL {
            for target in slot.targets(&layout.labels, attribute) {
                if host.fields.iter().any(|(t, _)| *t == target) {
                    issues.push(LayoutIssue::HostCollision {
                        target,
                        position,
                        attribute,
                    });
                }
            }
        }
    }
    issues
}

pub fn check_layout(layout: &SlotLayout) -> Result<(), FillError> {
    let issues = validate_layout(layout);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(FillError::InvalidLayout(layout.name.clone(), issues))
    }
}

// ********* Registries **********

/// The layouts known for a run, by template name.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: BTreeMap<String, SlotLayout>,
}

impl LayoutRegistry {
    pub fn new() -> LayoutRegistry {
        LayoutRegistry::default()
    }

    /// Adds a layout, replacing any layout with the same name.
    pub fn register(&mut self, layout: SlotLayout) {
        info!(
            "Registering layout {} ({} slots)",
            layout.name,
            layout.capacity()
        );
        self.layouts.insert(layout.name.clone(), layout);
    }

    pub fn get(&self, name: &str) -> Result<&SlotLayout, FillError> {
        self.layouts
            .get(name)
            .ok_or_else(|| FillError::UnknownLayout(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.layouts.keys().cloned().collect()
    }
}

/// The host and facility fields known for a run, by name.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct HostRegistry {
    hosts: BTreeMap<String, HostInfo>,
}

impl HostRegistry {
    pub fn new() -> HostRegistry {
        HostRegistry::default()
    }

    pub fn register(&mut self, name: &str, host: HostInfo) {
        self.hosts.insert(name.to_string(), host);
    }

    pub fn get(&self, name: &str) -> Result<&HostInfo, FillError> {
        self.hosts
            .get(name)
            .ok_or_else(|| FillError::UnknownHostInfo(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::builder::LayoutBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn two_slots() -> SlotLayout {
        LayoutBuilder::new(
            "two",
            Labels::new(["Name", "Addr", "City", "Zip", "Mail", "Tel", "D", "M", "Y"]),
        )
        .slot("", "A")
        .slot("", "B")
        .build()
        .unwrap()
    }

    fn record(name: &str, dob: &str) -> Record {
        Record {
            name: name.to_string(),
            date_of_birth: dob.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_derived_names() {
        let layout = two_slots();
        assert_eq!(
            resolve(&layout, 0, Attribute::Name).unwrap(),
            vec!["NameA".to_string()]
        );
        assert_eq!(
            resolve(&layout, 1, Attribute::Postal).unwrap(),
            vec!["ZipB".to_string()]
        );
    }

    #[test]
    fn resolve_out_of_range() {
        let layout = two_slots();
        assert_eq!(
            resolve(&layout, 2, Attribute::Name),
            Err(FillError::PositionOutOfRange {
                position: 2,
                capacity: 2
            })
        );
    }

    #[test]
    fn resolve_overrides() {
        let layout = LayoutBuilder::new(
            "irregular",
            Labels::new(["Name", "Addr", "City", "Zip", "Mail", "Tel", "D", "M", "Y"]),
        )
        .slot("", " 1")
        .slot("", " 2")
        .literal(1, Attribute::Name, "2")
        .fan_out(0, Attribute::Street, &["Addr 1", "Addr 1X"])
        .build()
        .unwrap();
        assert_eq!(
            resolve(&layout, 1, Attribute::Name).unwrap(),
            vec!["2".to_string()]
        );
        assert_eq!(
            resolve(&layout, 1, Attribute::City).unwrap(),
            vec!["City 2".to_string()]
        );
        assert_eq!(
            resolve(&layout, 0, Attribute::Street).unwrap(),
            vec!["Addr 1".to_string(), "Addr 1X".to_string()]
        );
    }

    #[test]
    fn fill_two_candidates() {
        init();
        let layout = two_slots();
        let records = vec![record("Doe, Jane", "15/06/1990"), record("Public, John", "")];
        let res = fill(&layout, &HostInfo::default(), &records);
        assert_eq!(res.get("NameA"), Some(&"Jane Doe".to_string()));
        assert_eq!(res.get("NameB"), Some(&"John Public".to_string()));
        assert_eq!(res.get("DA"), Some(&"15".to_string()));
        assert_eq!(res.get("MA"), Some(&"06".to_string()));
        assert_eq!(res.get("YA"), Some(&"90".to_string()));
        for f in ["DB", "MB", "YB", "AddrB", "TelB"] {
            assert_eq!(res.get(f), Some(&"".to_string()), "{}", f);
        }
        assert_eq!(res.len(), 18);
    }

    #[test]
    fn fill_writes_host_first() {
        let layout = two_slots();
        let host = HostInfo::new(&[("Text19", "City of Markham"), ("NameB", "placeholder")]);
        let res = fill(&layout, &host, &[record("A", ""), record("B", "")]);
        assert_eq!(res.get("Text19"), Some(&"City of Markham".to_string()));
        // Candidate data wins over a misconfigured host field.
        assert_eq!(res.get("NameB"), Some(&"B".to_string()));
        assert_eq!(validate_host(&layout, &host).len(), 1);
    }

    #[test]
    fn fill_fans_out() {
        let layout = LayoutBuilder::new(
            "fan",
            Labels::new(["Name", "Addr", "City", "Zip", "Mail", "Tel", "D", "M", "Y"]),
        )
        .slot("9", "")
        .fan_out(0, Attribute::Street, &["9Addr", "AddrX", "AddrY"])
        .build()
        .unwrap();
        let mut r = record("X", "");
        r.street = "1 Main St".to_string();
        let res = fill(&layout, &HostInfo::default(), &[r]);
        for f in ["9Addr", "AddrX", "AddrY"] {
            assert_eq!(res.get(f), Some(&"1 Main St".to_string()));
        }
        assert_eq!(res.len(), 11);
    }

    #[test]
    fn fill_drops_extra_records() {
        init();
        let layout = two_slots();
        let records = vec![record("A", ""), record("B", ""), record("C", "")];
        let res = fill(&layout, &HostInfo::default(), &records);
        assert_eq!(res.len(), 18);
        assert!(!res.values().any(|v| v == "C"));
    }

    #[test]
    fn fill_empty_batch_only_has_host() {
        let layout = two_slots();
        let host = HostInfo::new(&[("Host Name", "City of Markham")]);
        let res = fill(&layout, &host, &[]);
        assert_eq!(res.len(), 1);
    }

    #[test]
    fn batches_by_capacity() {
        let layout = two_slots();
        let records: Vec<Record> = (0..5).map(|i| record(&i.to_string(), "")).collect();
        let b = batches(&layout, &records);
        assert_eq!(b.iter().map(|x| x.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert!(batches(&layout, &[]).is_empty());
    }

    #[test]
    fn debug_fill_names_itself() {
        let layout = two_slots();
        let res = debug_fill(&layout);
        assert_eq!(res.len(), 18);
        assert_eq!(res.get("CityB"), Some(&"CityB".to_string()));
    }

    #[test]
    fn compare_with_document_fields() {
        let layout = two_slots();
        let host = HostInfo::new(&[("Host Name", "City of Markham")]);
        let mut document: Vec<String> = debug_fill(&layout).into_keys().collect();
        document.retain(|f| f != "TelB");
        document.push("Host Name".to_string());
        document.push("NameB.X".to_string());
        assert_eq!(
            missing_targets(&layout, &host, &document),
            vec!["TelB".to_string()]
        );
        assert_eq!(
            unused_fields(&layout, &host, &document),
            vec!["NameB.X".to_string()]
        );

        let res = name_fill(&document);
        assert_eq!(res.len(), 19);
        assert_eq!(res.get("NameB.X"), Some(&"NameB.X".to_string()));
    }

    #[test]
    fn validate_detects_collisions() {
        let layout = LayoutBuilder::new(
            "ghost",
            Labels::new(["Name", "Addr", "City", "Zip", "Mail", "Tel", "D", "M", "Y"]),
        )
        .slot("", "1.0")
        .slot("", "1.1.0")
        .slot("9", "1.1.0")
        .fan_out(2, Attribute::Street, &["9Addr1.1.0", "Addr1.0"])
        .build()
        .unwrap();
        let issues = validate_layout(&layout);
        assert_eq!(
            issues,
            vec![LayoutIssue::Collision {
                target: "Addr1.0".to_string(),
                first: (0, Attribute::Street),
                second: (2, Attribute::Street),
            }]
        );
        assert!(check_layout(&layout).is_err());
        assert!(check_layout(&two_slots()).is_ok());
    }

    #[test]
    fn validate_detects_empty() {
        let layout = LayoutBuilder::new(
            "empty",
            Labels::new(["Name", "Addr", "City", "Zip", "Mail", "Tel", "D", "M", "Y"]),
        )
        .build()
        .unwrap();
        assert_eq!(validate_layout(&layout), vec![LayoutIssue::EmptyLayout]);

        let layout = LayoutBuilder::new(
            "no-target",
            Labels::new(["Name", "Addr", "City", "Zip", "Mail", "Tel", "D", "M", "Y"]),
        )
        .slot("", "1")
        .fan_out(0, Attribute::Phone, &[])
        .build()
        .unwrap();
        assert_eq!(
            validate_layout(&layout),
            vec![LayoutIssue::EmptyOverride {
                position: 0,
                attribute: Attribute::Phone
            }]
        );
    }

    #[test]
    fn registries() {
        let mut layouts = LayoutRegistry::new();
        layouts.register(two_slots());
        assert_eq!(layouts.get("two").unwrap().capacity(), 2);
        assert_eq!(
            layouts.get("three"),
            Err(FillError::UnknownLayout("three".to_string()))
        );
        let mut hosts = HostRegistry::new();
        hosts.register("markham", HostInfo::new(&[("Host Name", "City of Markham")]));
        assert!(hosts.get("markham").is_ok());
        assert!(hosts.get("toronto").is_err());
    }
}
