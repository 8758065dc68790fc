use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "matrixview",
    version,
    about = "priced matrix viewer for headless-CMS records",
    long_about = "Matrixview fetches matrix records from a headless CMS, renders the priced grid and tracks a selection against the matrix budget.\n\nExamples:\n  matrixview --list\n  matrixview -m \"Kitchen Remodel\" -s 2:1 -s 3:2\n  matrixview -m \"Kitchen Remodel\" -s 2:1 -o kitchen.html\n  matrixview -i ./matrices.json --search kitchen --date 2023-07-14 --list\n\nTip: Use --config to persist the API URL and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'u',
        long = "api",
        visible_alias = "api-url",
        value_name = "URL",
        help_heading = "Input",
        help = "Matrices collection endpoint of the CMS API."
    )]
    pub api_url: Option<String>,

    #[arg(
        short = 'i',
        long = "in",
        visible_alias = "input",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read the matrices collection from a JSON file instead of the API."
    )]
    pub input: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.matrixview/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file (to --config or ~/.matrixview/config.yml) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'm',
        long = "mx",
        visible_alias = "matrix",
        value_name = "TITLE",
        help_heading = "Matrix",
        help = "Title of the matrix to open (defaults to the first record)."
    )]
    pub matrix: Option<String>,

    #[arg(
        short = 's',
        long = "sel",
        visible_alias = "select",
        value_name = "COL:ROW",
        action = ArgAction::Append,
        help_heading = "Matrix",
        help = "Toggle a cell (1-based, repeatable, applied in order)."
    )]
    pub select: Vec<String>,

    #[arg(
        long = "var",
        visible_alias = "variant",
        value_name = "VARIANT",
        help_heading = "Matrix",
        help = "Price variant: auto, point or range."
    )]
    pub variant: Option<String>,

    #[arg(
        long = "lfc",
        visible_alias = "lock-first-column",
        help_heading = "Matrix",
        help = "Ignore selections in the first column."
    )]
    pub lock_first_column: bool,

    #[arg(
        long = "mb",
        visible_alias = "media-base-url",
        value_name = "URL",
        help_heading = "Matrix",
        help = "Base URL prepended to photo paths (defaults to the API origin)."
    )]
    pub media_base_url: Option<String>,

    #[arg(
        long = "up",
        visible_alias = "upload-prefix",
        value_name = "PATH",
        help_heading = "Matrix",
        help = "Photo paths must start with this prefix to be shown."
    )]
    pub upload_prefix: Option<String>,

    #[arg(
        short = 'l',
        long = "ls",
        visible_alias = "list",
        help_heading = "Catalog",
        help = "List matrices instead of rendering one."
    )]
    pub list: bool,

    #[arg(
        short = 'q',
        long = "sq",
        visible_alias = "search",
        value_name = "QUERY",
        help_heading = "Catalog",
        help = "Only list matrices whose title contains QUERY (case-insensitive)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'd',
        long = "dt",
        visible_alias = "date",
        value_name = "YYYY-MM-DD",
        help_heading = "Catalog",
        help = "Only list matrices created on this day."
    )]
    pub date: Option<String>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered matrix to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, xml, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,
}
