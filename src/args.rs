use clap::Parser;

/// Attendance statistics for check-in forms.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON. The options passed on the command line take
    /// precedence over the ones of the configuration. See the manual of attendance_log for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The check-ins, as exported from the form. Setting this option overrides the path
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default, it is guessed from the extension of the file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, the name of the worksheet to use. The first worksheet by default.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// (YYYY-MM-DD) The first day to take into account.
    #[clap(long, value_parser)]
    pub start: Option<String>,

    /// (YYYY-MM-DD) The last day to take into account.
    #[clap(long, value_parser)]
    pub end: Option<String>,

    /// (repeatable) Only take into account this person. The name is the corrected name.
    #[clap(long = "person", value_parser)]
    pub people: Vec<String>,

    /// (repeatable, FROM=>TO) Merges the check-ins of a name into another name. Applied after the
    /// corrections of the configuration file.
    #[clap(long = "correct", value_parser)]
    pub corrections: Vec<String>,

    /// Searches the people whose name contains this text (case-insensitive).
    #[clap(long, value_parser)]
    pub search: Option<String>,

    /// Only lists the people with at least this number of check-ins.
    #[clap(long, value_parser)]
    pub min_count: Option<usize>,

    /// Only lists the people with at least this frequency (in percent).
    #[clap(long, value_parser)]
    pub min_frequency: Option<f64>,

    /// (attendance, frequency or name) The order of the list of people.
    #[clap(long, value_parser)]
    pub sort_by: Option<String>,

    /// (5 to 50, default 10) The size of the ranking in the report.
    #[clap(long, value_parser)]
    pub top_n: Option<usize>,

    /// The title of the report.
    #[clap(long, value_parser)]
    pub title: Option<String>,

    /// The author of the report.
    #[clap(long, value_parser)]
    pub author: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the output directory of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) If specified, the check-ins are written to this CSV file with the corrected names.
    #[clap(long, value_parser)]
    pub export: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, attlog will check that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
