// Writers for the filled documents.

use crate::sheets::*;

/// The format of the filled documents.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Forms Data Format, merged into the template by any FDF-aware PDF tool.
    Fdf,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Fdf => "fdf",
            OutputFormat::Json => "json",
        }
    }
}

/// Writes one filled document per batch.
pub trait DocumentWriter {
    /// Writes the fields for the document `stem` and returns the written path.
    fn write(&self, fields: &FillMap, stem: &str) -> BSheetResult<PathBuf>;
}

pub struct FdfWriter {
    /// The fillable PDF the fields belong to.
    pub template: PathBuf,
    pub directory: PathBuf,
}

impl DocumentWriter for FdfWriter {
    fn write(&self, fields: &FillMap, stem: &str) -> BSheetResult<PathBuf> {
        if !self.template.is_file() {
            return Err(Box::new(SheetError::TemplateNotFound {
                path: self.template.display().to_string(),
            }));
        }
        let p = self
            .directory
            .join(format!("{}.{}", stem, OutputFormat::Fdf.extension()));
        let contents = fdf_document(&self.template.display().to_string(), fields);
        fs::write(&p, contents).context(WritingOutputSnafu {
            path: p.display().to_string(),
        })?;
        Ok(p)
    }
}

pub struct JsonWriter {
    pub template: PathBuf,
    pub directory: PathBuf,
}

impl DocumentWriter for JsonWriter {
    fn write(&self, fields: &FillMap, stem: &str) -> BSheetResult<PathBuf> {
        let p = self
            .directory
            .join(format!("{}.{}", stem, OutputFormat::Json.extension()));
        let js = json!({
            "document": self.template.display().to_string(),
            "fields": fields,
        });
        let pretty_js = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
        fs::write(&p, pretty_js).context(WritingOutputSnafu {
            path: p.display().to_string(),
        })?;
        Ok(p)
    }
}

/// Does not write anything. Used when only the summary is requested.
pub struct SummaryOnlyWriter {
    pub format: OutputFormat,
}

impl DocumentWriter for SummaryOnlyWriter {
    fn write(&self, _fields: &FillMap, stem: &str) -> BSheetResult<PathBuf> {
        Ok(PathBuf::from(format!("{}.{}", stem, self.format.extension())))
    }
}

/// A FDF file filling the fields of the given PDF.
pub fn fdf_document(template: &str, fields: &FillMap) -> String {
    let mut res = String::new();
    res.push_str("%FDF-1.2\n1 0 obj\n<<\n/FDF\n<<\n");
    res.push_str(&format!("/F {}\n", pdf_string(template)));
    res.push_str("/Fields [\n");
    for (name, value) in fields.iter() {
        res.push_str(&format!(
            "<< /T {} /V {} >>\n",
            pdf_string(name),
            pdf_string(value)
        ));
    }
    res.push_str("]\n>>\n>>\nendobj\ntrailer\n<<\n/Root 1 0 R\n>>\n%%EOF\n");
    res
}

/// A PDF string literal. Text outside of ASCII is encoded in UTF-16BE.
fn pdf_string(s: &str) -> String {
    if s.is_ascii() {
        let mut res = String::with_capacity(s.len() + 2);
        res.push('(');
        for c in s.chars() {
            match c {
                '\\' => res.push_str("\\\\"),
                '(' => res.push_str("\\("),
                ')' => res.push_str("\\)"),
                '\n' => res.push_str("\\n"),
                '\r' => res.push_str("\\r"),
                c => res.push(c),
            }
        }
        res.push(')');
        res
    } else {
        let hex: String = s.encode_utf16().map(|unit| format!("{:04X}", unit)).collect();
        format!("<FEFF{}>", hex)
    }
}
