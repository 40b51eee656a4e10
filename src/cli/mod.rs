//! Command-line interface module

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::conversion::config::DelimiterType;
use crate::conversion::inference::ColumnTypePolicy;
use crate::conversion::{ConversionConfig, ConversionEngine, ConversionMetadata};
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::formatter::to_pretty_json;
use crate::parser::InputSource;
use crate::validation::{validate_against_schema, validate_well_formed, ValidationReport};

/// Main CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "xmlconv")]
#[command(about = "Convert between CSV, XML and JSON, infer XSD schemas and run XPath queries")]
#[command(version)]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Output file path (default: stdout)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Spaces per indentation level (0-8, default: 2)
    #[arg(long, global = true)]
    pub indent: Option<u8>,

    /// Disable pretty-printing
    #[arg(long, global = true)]
    pub plain: bool,

    /// Write an XML declaration before markup output
    #[arg(long, global = true)]
    pub declaration: bool,

    /// Deepest XML element nesting accepted (default: 1000)
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Output conversion statistics on stderr
    #[arg(long, global = true)]
    pub stats: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// CLI subcommands. `INPUT` is a file path or `-` for standard input.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert CSV to annotated XML
    Csv {
        input: String,
        /// Root element tag (default: dataset)
        #[arg(long)]
        root: Option<String>,
        /// Row element tag (default: record)
        #[arg(long)]
        row: Option<String>,
        /// Field delimiter
        #[arg(long, value_enum)]
        delimiter: Option<Delimiter>,
        /// How a column type is chosen from its cell types
        #[arg(long, value_enum)]
        policy: Option<Policy>,
        /// Cell spelling treated as null; repeat to replace the defaults
        #[arg(long = "null-marker")]
        null_markers: Vec<String>,
        /// Value of the root `source` attribute
        #[arg(long)]
        source: Option<String>,
    },
    /// Convert XML to JSON
    ToJson {
        input: String,
        /// Fail instead of regrouping interleaved siblings
        #[arg(long)]
        strict: bool,
    },
    /// Convert JSON to XML
    FromJson {
        input: String,
        /// Root tag when the document has no single top-level key
        #[arg(long)]
        root: Option<String>,
        /// Tag for members of a top-level array
        #[arg(long)]
        item_tag: Option<String>,
    },
    /// Infer an XSD schema from XML
    Schema {
        input: String,
        /// Schema target namespace
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Run an XPath expression against XML
    Query {
        input: String,
        expression: String,
        /// Read EXPRESSION as XQuery (`for $x in PATH return $x`)
        #[arg(long)]
        xquery: bool,
    },
    /// Check XML well-formedness, or validity against an XSD file
    Validate {
        input: String,
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

/// Delimiter types for CLI
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Delimiter {
    #[value(name = "comma", alias = ",")]
    Comma,
    #[value(name = "semicolon", alias = ";")]
    Semicolon,
    #[value(name = "tab", alias = "\t")]
    Tab,
    #[value(name = "pipe", alias = "|")]
    Pipe,
}

impl From<Delimiter> for DelimiterType {
    fn from(delimiter: Delimiter) -> Self {
        match delimiter {
            Delimiter::Comma => DelimiterType::Comma,
            Delimiter::Semicolon => DelimiterType::Semicolon,
            Delimiter::Tab => DelimiterType::Tab,
            Delimiter::Pipe => DelimiterType::Pipe,
        }
    }
}

/// Column type policies for CLI
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Policy {
    Widening,
    Majority,
    #[value(name = "first-non-null")]
    FirstNonNull,
}

impl From<Policy> for ColumnTypePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Widening => ColumnTypePolicy::Widening,
            Policy::Majority => ColumnTypePolicy::Majority,
            Policy::FirstNonNull => ColumnTypePolicy::FirstNonNull,
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub args: Args,
    pub conversion_config: ConversionConfig,
}

impl CliConfig {
    /// Create CLI configuration from arguments
    pub fn from_args(args: Args) -> ConversionResult<Self> {
        let conversion_config = Self::create_conversion_config(&args)?;

        Ok(Self {
            args,
            conversion_config,
        })
    }

    /// Create conversion configuration from CLI arguments
    fn create_conversion_config(args: &Args) -> ConversionResult<ConversionConfig> {
        let mut config = ConversionConfig::default()
            .with_indent_size(args.indent.unwrap_or(2))
            .map_err(ConversionError::configuration)?
            .with_pretty(!args.plain)
            .with_declaration(args.declaration);
        if let Some(depth) = args.max_depth {
            config = config.with_max_depth(depth);
        }

        match &args.command {
            Commands::Csv {
                delimiter,
                policy,
                null_markers,
                source,
                ..
            } => {
                if let Some(delimiter) = delimiter {
                    config = config.with_delimiter((*delimiter).into());
                }
                if let Some(policy) = policy {
                    config = config.with_type_policy((*policy).into());
                }
                if !null_markers.is_empty() {
                    config = config.with_null_markers(null_markers.clone());
                }
                if let Some(source) = source {
                    config = config.with_source_label(source.as_str());
                }
            }
            Commands::ToJson { strict, .. } => {
                config = config.with_strict_round_trip(*strict);
            }
            Commands::FromJson { item_tag, .. } => {
                if let Some(tag) = item_tag {
                    config.sequence_item_tag = tag.clone();
                }
            }
            Commands::Schema { namespace, .. } => {
                if let Some(namespace) = namespace {
                    config = config.with_target_namespace(namespace.as_str());
                }
            }
            Commands::Query { .. } | Commands::Validate { .. } => {}
        }

        config.validate().map_err(ConversionError::configuration)?;
        Ok(config)
    }

    pub fn is_quiet(&self) -> bool {
        self.args.quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.args.verbose
    }

    pub fn want_stats(&self) -> bool {
        self.args.stats
    }

    /// Get output destination description
    pub fn output_description(&self) -> String {
        if let Some(output) = &self.args.output {
            format!("'{}'", output.display())
        } else {
            "standard output".to_string()
        }
    }
}

/// Result of one command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub content: String,
    pub metadata: Option<ConversionMetadata>,
    /// False when validation found problems; the content still holds the report
    pub success: bool,
}

impl CommandOutput {
    fn converted(output: crate::conversion::ConversionOutput) -> Self {
        Self {
            content: output.content,
            metadata: Some(output.metadata),
            success: true,
        }
    }
}

/// Run the selected command and return its output text
pub fn execute(config: &CliConfig) -> CliResult<CommandOutput> {
    let engine = ConversionEngine::new(config.conversion_config.clone());

    let output = match &config.args.command {
        Commands::Csv {
            input, root, row, ..
        } => CommandOutput::converted(engine.csv_to_markup(
            &read_input(input)?,
            root.as_deref(),
            row.as_deref(),
        )?),
        Commands::ToJson { input, .. } => {
            CommandOutput::converted(engine.markup_to_json(&read_input(input)?)?)
        }
        Commands::FromJson { input, root, .. } => {
            CommandOutput::converted(engine.json_to_markup(&read_input(input)?, root.as_deref())?)
        }
        Commands::Schema { input, .. } => {
            CommandOutput::converted(engine.markup_to_schema(&read_input(input)?)?)
        }
        Commands::Query {
            input,
            expression,
            xquery,
        } => {
            let markup = read_input(input)?;
            let output = if *xquery {
                engine.xquery_markup(&markup, expression)?
            } else {
                engine.query_markup(&markup, expression)?
            };
            CommandOutput::converted(output)
        }
        Commands::Validate { input, schema } => {
            let markup = read_input(input)?;
            let report = match schema {
                Some(path) => {
                    let schema_text = InputSource::File(path.clone()).read()?;
                    validate_against_schema(&markup, &schema_text)
                }
                None => match validate_well_formed(&markup) {
                    Ok(_) => ValidationReport::from_errors(Vec::new()),
                    Err(e) => ValidationReport::invalid(e.user_message()),
                },
            };
            CommandOutput {
                content: to_pretty_json(&report, &config.conversion_config)?,
                metadata: None,
                success: report.valid,
            }
        }
    };

    Ok(output)
}

fn read_input(arg: &str) -> ConversionResult<String> {
    InputSource::from_arg(arg).read()
}

/// Write command output to the output file, or stdout
pub fn write_output(config: &CliConfig, output: &CommandOutput) -> CliResult<()> {
    match &config.args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| io_error(e, path))?;
            }
            fs::write(path, &output.content).map_err(|e| io_error(e, path))?;
            CliUtils::show_success(
                &format!("Written to {}", config.output_description()),
                config.is_quiet(),
            );
        }
        None => {
            if output.content.ends_with('\n') {
                print!("{}", output.content);
            } else {
                println!("{}", output.content);
            }
        }
    }

    if config.want_stats() && !config.is_quiet() {
        if let Some(metadata) = &output.metadata {
            CliUtils::show_statistics(metadata);
        }
    }
    Ok(())
}

fn io_error(error: std::io::Error, path: &std::path::Path) -> ConversionError {
    ConversionError::conversion(ConversionErrorKind::io(
        error.to_string(),
        Some(path.to_path_buf()),
    ))
}

/// CLI utilities and helpers
pub struct CliUtils;

impl CliUtils {
    /// Format a file size in human-readable format
    pub fn format_file_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.1} {}", size, UNITS[unit_index])
        }
    }

    /// Format a duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_millis = duration.as_millis();

        if total_millis < 1000 {
            format!("{}ms", total_millis)
        } else if total_millis < 60_000 {
            format!("{:.1}s", total_millis as f64 / 1000.0)
        } else {
            let minutes = total_millis / 60_000;
            let seconds = (total_millis % 60_000) / 1000;
            format!("{}m {}s", minutes, seconds)
        }
    }

    pub fn show_statistics(metadata: &ConversionMetadata) {
        eprintln!("\nConversion Statistics:");
        eprintln!("Input size: {}", Self::format_file_size(metadata.input_size));
        eprintln!("Output size: {}", Self::format_file_size(metadata.output_size));
        eprintln!("Records: {}", metadata.records);
        if metadata.regrouped_siblings > 0 {
            eprintln!("Regrouped siblings: {}", metadata.regrouped_siblings);
        }
        eprintln!(
            "Processing time: {}",
            Self::format_duration(Duration::from_millis(metadata.processing_time_ms))
        );
    }

    /// Show a success message (if not in quiet mode)
    pub fn show_success(message: &str, quiet: bool) {
        if !quiet {
            eprintln!("✓ {}", message);
        }
    }

    /// Show an error message
    pub fn show_error(message: &str) {
        eprintln!("✗ {}", message);
    }
}

/// Handle CLI errors with user-friendly messages
pub fn handle_error(error: &ConversionError) {
    CliUtils::show_error(&error.user_message());

    match error {
        ConversionError::QueryError(_) => {
            eprintln!("\nTip: Supported functions include count(), sum(), contains() and position()");
        }
        ConversionError::EncodingError(_) => {
            eprintln!("\nTip: Drop --strict to regroup interleaved siblings");
        }
        _ => {}
    }

    eprintln!("\nTry 'xmlconv --help' for usage information.");
}

/// Command execution result
pub type CliResult<T> = Result<T, ConversionError>;
