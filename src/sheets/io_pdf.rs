// Reading the form fields of the fillable templates.

use std::collections::HashSet;

use lopdf::{Document, Object};

use crate::sheets::*;

// Field trees are shallow, this only guards against reference cycles.
const MAX_FIELD_DEPTH: usize = 32;

/// The fully qualified names of the form fields of a PDF (`/T` entries under
/// `/AcroForm /Fields`, joined with '.'), in document order.
pub fn read_template_fields(path: &Path) -> BSheetResult<Vec<String>> {
    let p = path.display().to_string();
    let doc = Document::load(path).context(ReadingPdfSnafu { path: &p })?;
    let fields = acroform_fields(&doc).context(ReadingPdfSnafu { path: &p })?;
    let fields = match fields {
        Some(f) => f,
        None => {
            warn!("read_template_fields: {} has no form fields", p);
            return Ok(vec![]);
        }
    };

    let mut res: Vec<String> = Vec::new();
    for field in fields.iter() {
        collect_fields(&doc, field, "", 0, &mut res).context(ReadingPdfSnafu { path: &p })?;
    }
    // A field with several widgets is listed once.
    let mut seen: HashSet<String> = HashSet::new();
    res.retain(|f| seen.insert(f.clone()));
    debug!("read_template_fields: {}: {} fields", p, res.len());
    Ok(res)
}

fn acroform_fields(doc: &Document) -> lopdf::Result<Option<&Vec<Object>>> {
    let catalog = doc.catalog()?;
    let acroform = match catalog.get(b"AcroForm") {
        Ok(o) => doc.dereference(o)?.1.as_dict()?,
        Err(_) => return Ok(None),
    };
    match acroform.get(b"Fields") {
        Ok(o) => Ok(Some(doc.dereference(o)?.1.as_array()?)),
        Err(_) => Ok(None),
    }
}

fn collect_fields(
    doc: &Document,
    field: &Object,
    parent: &str,
    depth: usize,
    res: &mut Vec<String>,
) -> lopdf::Result<()> {
    if depth > MAX_FIELD_DEPTH {
        warn!("collect_fields: field tree too deep under {:?}", parent);
        return Ok(());
    }
    let dict = doc.dereference(field)?.1.as_dict()?;
    // Widgets without a name belong to their parent field.
    let name = match dict.get(b"T") {
        Ok(t) => match (parent, pdf_text(doc.dereference(t)?.1.as_str()?)) {
            ("", n) => n,
            (p, n) => format!("{}.{}", p, n),
        },
        Err(_) => parent.to_string(),
    };
    match dict.get(b"Kids") {
        Ok(kids) => {
            for kid in doc.dereference(kids)?.1.as_array()?.iter() {
                collect_fields(doc, kid, &name, depth + 1, res)?;
            }
        }
        Err(_) if !name.is_empty() => res.push(name),
        Err(_) => {}
    }
    Ok(())
}

/// Text strings are either UTF-16BE with a byte order mark, or single bytes.
fn pdf_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|b| *b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mini_sheet() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/mini_sheet/mini_sheet.pdf")
    }

    #[test]
    fn fields_of_mini_sheet() {
        let fields = read_template_fields(&mini_sheet()).unwrap();
        assert_eq!(fields.len(), 24);
        assert_eq!(fields[0], "Name 1");
        assert!(fields.contains(&"Address 2X".to_string()));
        assert!(!fields.contains(&"Addr2".to_string()));
        assert_eq!(
            &fields[21..],
            &[
                "Notes.0".to_string(),
                "Notes.1".to_string(),
                "Comments".to_string()
            ]
        );
    }

    #[test]
    fn not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("roster.pdf");
        fs::write(&p, "AttendeeName\n").unwrap();
        assert!(matches!(
            read_template_fields(&p).map_err(|e| *e),
            Err(SheetError::ReadingPdf { .. })
        ));
    }

    #[test]
    fn text_strings() {
        assert_eq!(pdf_text(b"Name 1"), "Name 1");
        assert_eq!(pdf_text(&[0xFE, 0xFF, 0x00, 0x5A, 0x00, 0xEB]), "Z\u{eb}");
        assert_eq!(pdf_text(&[0xE9]), "\u{e9}");
    }
}
