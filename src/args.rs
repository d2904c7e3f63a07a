use clap::Parser;

/// This program fills the Lifesaving Society test sheets from a course roster.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration file. The paths inside it are relative to
    /// the directory of this file. All the other options override the content of the configuration.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The roster, one candidate per row (CSV or Excel).
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the roster. By default, guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// The course, which selects the test sheet: bronze_cross, bronze_medallion, bronze_star,
    /// emergency_first_aid, standard_first_aid, or any course defined in the configuration.
    #[clap(short = 't', long, value_parser)]
    pub course: Option<String>,

    /// (directory or 'stdout') Where the filled documents are written (default filled_forms).
    /// With 'stdout', only the summary is printed.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (fdf or json, default fdf) The format of the filled documents.
    #[clap(long, value_parser)]
    pub output_format: Option<String>,

    /// (2 or 4) How many digits of the year of birth are written. Overrides the layout.
    #[clap(long, value_parser)]
    pub year_format: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the program checks that
    /// the filled fields match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Prints the field names of each slot of the course sheet, then stops.
    /// When the template exists, also prints the form fields nothing fills.
    #[clap(long, takes_value = false)]
    pub list_fields: bool,

    /// Writes a single document in which every form field of the template contains its own name.
    #[clap(long, takes_value = false)]
    pub debug_names: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
