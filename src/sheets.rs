use log::{debug, info, warn};

use slot_filler::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::sheets::config_reader::*;
use crate::sheets::io_common::{simplify_file_name, ColumnNames};
use crate::sheets::io_output::*;
use crate::sheets::io_pdf::read_template_fields;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_output;
mod io_pdf;

#[derive(Debug, Snafu)]
pub enum SheetError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV roster: {source}"))]
    CsvLineParse { source: csv::Error, lineno: usize },

    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("The Excel file {path} has no worksheet named {name:?}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "The Excel file {path} has several worksheets: choose one with --excel-worksheet-name"
    ))]
    TooManyWorksheets { path: String },

    #[snafu(display("Unknown roster provider {provider:?} for {path}: expected csv or xlsx"))]
    UnknownProvider { provider: String, path: String },
    #[snafu(display("No roster: use --input or rosterSource.filePath"))]
    MissingRoster {},
    #[snafu(display("No course: use --course or the course key of the configuration"))]
    MissingCourse {},
    #[snafu(display("Unknown course {name:?}, known courses: {known:?}"))]
    UnknownCourse { name: String, known: Vec<String> },
    #[snafu(display("{source}"))]
    Layout { source: FillError },

    #[snafu(display("Error reading the form fields of {path}: {source}"))]
    ReadingPdf { source: lopdf::Error, path: String },
    #[snafu(display("Template not found: {path}"))]
    TemplateNotFound { path: String },
    #[snafu(display("Error creating directory {path}: {source}"))]
    CreatingDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the summary and the reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SheetResult<T> = Result<T, SheetError>;
pub type BSheetResult<T> = Result<T, Box<SheetError>>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Xlsx,
}

/// The provider named in the arguments or the configuration, else the one of the file extension.
fn infer_provider(path: &str, provider: Option<&str>) -> BSheetResult<Provider> {
    let name = match provider {
        Some(p) => p.to_lowercase(),
        None => Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase(),
    };
    match name.as_str() {
        "csv" => Ok(Provider::Csv),
        "xlsx" | "excel" => Ok(Provider::Xlsx),
        _ => Err(Box::new(SheetError::UnknownProvider {
            provider: name,
            path: path.to_string(),
        })),
    }
}

/// Where the candidates come from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterSettings {
    pub path: String,
    pub provider: Provider,
    pub worksheet_name: Option<String>,
    pub columns: ColumnNames,
}

/// Everything a run needs, after merging the configuration with the arguments.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub course: Course,
    pub layout: SlotLayout,
    pub host: HostInfo,
    pub roster: Option<RosterSettings>,
    /// The fillable PDF of the course.
    pub document: PathBuf,
    /// None when the documents are not written (--out stdout).
    pub out_dir: Option<PathBuf>,
    pub output_format: OutputFormat,
}

// Paths of the configuration are relative to its directory.
fn config_relative(root: &Path, p: &str) -> PathBuf {
    let path = Path::new(p);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub fn resolve_settings(args: &Args) -> BSheetResult<RunSettings> {
    let (config, root): (SheetsConfig, PathBuf) = match &args.config {
        Some(p) => {
            let config = read_config(p)?;
            info!("config: {:?}", config);
            let root = Path::new(p)
                .parent()
                .map(|d| d.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (SheetsConfig::default(), PathBuf::new()),
    };
    let output_settings = config.output_settings.clone().unwrap_or_default();
    let roster_source = config.roster_source.clone().unwrap_or_default();

    // Layouts: the built-in tables, then the ones of the configuration.
    let mut layouts = templates::builtin_layouts().context(LayoutSnafu {})?;
    for def in config.layouts.clone().unwrap_or_default().iter() {
        layouts.register(validate_layout_def(def)?);
    }

    let courses = validate_courses(&config.courses.clone().unwrap_or_default())?;
    let course_name = match args.course.clone().or_else(|| config.course.clone()) {
        Some(c) => c,
        None => return Err(Box::new(SheetError::MissingCourse {})),
    };
    let course = match courses.iter().find(|c| c.key == course_name) {
        Some(c) => c.clone(),
        None => {
            return Err(Box::new(SheetError::UnknownCourse {
                name: course_name,
                known: courses.iter().map(|c| c.key.clone()).collect(),
            }))
        }
    };
    info!("course: {:?}", course);

    let mut layout = layouts.get(&course.layout).context(LayoutSnafu {})?.clone();
    let year_format = match &args.year_format {
        Some(s) => Some(validate_year_format_str(s)?),
        None => validate_year_format(&output_settings.year_format)?,
    };
    if let Some(yf) = year_format {
        debug!("resolve_settings: year format {:?} for {}", yf, layout.name);
        layout.year_format = yf;
    }

    // A course may carry its own fields, else they come from the host profile.
    let profile: BTreeMap<String, String> = config.host.clone().unwrap_or_default();
    let mut hosts = HostRegistry::new();
    for c in courses.iter() {
        let host = match &c.host_info {
            Some(h) => h.clone(),
            None => HostInfo::from_profile(&profile, &c.host_fields),
        };
        hosts.register(&c.key, host);
    }
    let host = hosts.get(&course.key).context(LayoutSnafu {})?.clone();

    let roster = match (&args.input, &roster_source.file_path) {
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) => Some(config_relative(&root, p).display().to_string()),
        (None, None) => None,
    };
    let roster = match roster {
        Some(path) => {
            let provider = infer_provider(
                &path,
                args.input_type
                    .as_deref()
                    .or(roster_source.provider.as_deref()),
            )?;
            Some(RosterSettings {
                path,
                provider,
                worksheet_name: args
                    .excel_worksheet_name
                    .clone()
                    .or_else(|| roster_source.excel_worksheet_name.clone()),
                columns: roster_source
                    .columns
                    .clone()
                    .map(|c| c.column_names())
                    .unwrap_or_default(),
            })
        }
        None => None,
    };

    let out_dir = match (&args.out, &output_settings.output_directory) {
        (Some(o), _) if o == "stdout" => None,
        (Some(o), _) => Some(PathBuf::from(o)),
        (None, Some(o)) => Some(config_relative(&root, o)),
        (None, None) => Some(PathBuf::from("filled_forms")),
    };
    let output_format = match args
        .output_format
        .as_deref()
        .or(output_settings.output_format.as_deref())
    {
        Some(f) => validate_output_format(f)?,
        None => OutputFormat::Fdf,
    };

    Ok(RunSettings {
        document: config_relative(&root, &course.document),
        course,
        layout,
        host,
        roster,
        out_dir,
        output_format,
    })
}

fn read_roster(roster: &RosterSettings) -> BSheetResult<Vec<Record>> {
    info!(
        "Attempting to read roster {:?} ({:?})",
        roster.path, roster.provider
    );
    match roster.provider {
        Provider::Csv => io_csv::read_csv_roster(&roster.path, &roster.columns),
        Provider::Xlsx => io_excel::read_excel_roster(
            &roster.path,
            roster.worksheet_name.as_deref(),
            &roster.columns,
        ),
    }
}

fn get_writer(settings: &RunSettings) -> BSheetResult<Box<dyn DocumentWriter>> {
    let directory = match &settings.out_dir {
        Some(d) => d.clone(),
        None => {
            return Ok(Box::new(SummaryOnlyWriter {
                format: settings.output_format,
            }))
        }
    };
    fs::create_dir_all(&directory).context(CreatingDirectorySnafu {
        path: directory.display().to_string(),
    })?;
    let template = settings.document.clone();
    match settings.output_format {
        OutputFormat::Fdf => Ok(Box::new(FdfWriter {
            template,
            directory,
        })),
        OutputFormat::Json => Ok(Box::new(JsonWriter {
            template,
            directory,
        })),
    }
}

/// The form fields of the template, None when the template does not exist.
fn template_fields(settings: &RunSettings) -> BSheetResult<Option<Vec<String>>> {
    if !settings.document.is_file() {
        debug!(
            "template_fields: no template at {}",
            settings.document.display()
        );
        return Ok(None);
    }
    read_template_fields(&settings.document).map(Some)
}

/// The field names of every slot, one line per attribute, then the fields of the
/// template that nothing fills.
pub fn list_fields(
    layout: &SlotLayout,
    host: &HostInfo,
    template_fields: Option<&[String]>,
) -> BSheetResult<Vec<String>> {
    let show = |t: &String| -> String {
        match template_fields {
            Some(fields) if !fields.contains(t) => format!("{:?} (not in the template)", t),
            _ => format!("{:?}", t),
        }
    };
    let mut res: Vec<String> = Vec::new();
    for (target, value) in host.fields.iter() {
        res.push(format!("host: {} = {:?}", show(target), value));
    }
    for position in 0..layout.capacity() {
        for attribute in Attribute::ALL {
            let targets = resolve(layout, position, attribute).context(LayoutSnafu {})?;
            res.push(format!(
                "slot {} {}: {}",
                position + 1,
                attribute,
                targets.iter().map(&show).collect::<Vec<String>>().join(", ")
            ));
        }
    }
    if let Some(fields) = template_fields {
        for f in unused_fields(layout, host, fields) {
            res.push(format!("not filled: {:?}", f));
        }
    }
    Ok(res)
}

fn build_summary_js(settings: &RunSettings, candidates: usize, batches: Vec<JSValue>) -> JSValue {
    let year_format = match settings.layout.year_format {
        YearFormat::TwoDigit => 2,
        YearFormat::FourDigit => 4,
    };
    json!({
        "config": {
            "course": settings.course.key,
            "layout": settings.layout.name,
            "capacity": settings.layout.capacity(),
            "candidates": candidates,
            "yearFormat": year_format,
        },
        "batches": batches,
    })
}

fn check_reference(summary: &JSValue, reference_path: &str) -> BSheetResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("check_reference: reference: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    let pretty_js_summary = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_summary.as_ref(),
            "\n",
        );
        return Err(Box::new(SheetError::ReferenceMismatch {
            path: reference_path.to_string(),
        }));
    }
    Ok(())
}

/// Fills the test sheets of one course and returns the summary of the run.
pub fn run(args: &Args) -> BSheetResult<JSValue> {
    let settings = resolve_settings(args)?;
    let layout = &settings.layout;

    check_layout(layout).context(LayoutSnafu {})?;
    for issue in validate_host(layout, &settings.host) {
        warn!("layout {}: {}", layout.name, issue);
    }

    // Only the field tools need the template to be readable.
    let template_fields = match template_fields(&settings) {
        Ok(f) => f,
        Err(e) if !(args.list_fields || args.debug_names) => {
            warn!("{}", e);
            None
        }
        Err(e) => return Err(e),
    };
    if let Some(fields) = &template_fields {
        for t in missing_targets(layout, &settings.host, fields) {
            warn!(
                "layout {}: the field {:?} is not in the template {}",
                layout.name,
                t,
                settings.document.display()
            );
        }
    }

    if args.list_fields {
        for line in list_fields(layout, &settings.host, template_fields.as_deref())? {
            println!("{}", line);
        }
        return Ok(json!({}));
    }

    let writer = get_writer(&settings)?;

    if args.debug_names {
        let fields = match &template_fields {
            Some(f) if !f.is_empty() => name_fill(f),
            _ => {
                warn!(
                    "No form fields read from {}, using the field names of the layout",
                    settings.document.display()
                );
                debug_fill(layout)
            }
        };
        let stem = format!("{}_field_names", settings.course.output_stem);
        let p = writer.write(&fields, &stem)?;
        info!("Wrote the field names of {} to {}", layout.name, p.display());
        return Ok(json!({ "document": simplify_file_name(&p.display().to_string()), "fields": fields }));
    }

    let roster = match &settings.roster {
        Some(r) => r,
        None => return Err(Box::new(SheetError::MissingRoster {})),
    };
    let records = read_roster(roster)?;
    info!("Read {} candidate(s)", records.len());
    if records.is_empty() {
        warn!("The roster {:?} has no candidates", roster.path);
    }

    let mut batches_js: Vec<JSValue> = Vec::new();
    for (idx, batch) in batches(layout, &records).iter().enumerate() {
        let fields = fill(layout, &settings.host, batch);
        let stem = format!("{}_{}", settings.course.output_stem, idx + 1);
        let p = writer.write(&fields, &stem)?;
        info!(
            "Batch {}: {} candidate(s) written to {}",
            idx + 1,
            batch.len(),
            p.display()
        );
        batches_js.push(json!({
            "batch": idx + 1,
            "document": simplify_file_name(&p.display().to_string()),
            "candidates": batch.len(),
            "fields": fields,
        }));
    }

    let summary = build_summary_js(&settings, records.len(), batches_js);
    let pretty_js_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    println!("summary:{}", pretty_js_summary);

    if let Some(reference_path) = &args.reference {
        check_reference(&summary, reference_path)?;
    }
    Ok(summary)
}
