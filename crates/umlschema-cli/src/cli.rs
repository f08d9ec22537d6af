//! Command-line interface for the umlschema utility
//!
//! Reads PlantUML class-diagram text and prints the parsed model, a layout or
//! the generated entity schemas as JSON.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use umlschema::core::logging::init_logging;
use umlschema::core::Parser as _;
use umlschema::plugins::plantuml::{
    snap_all, ClusterLayout, GridLayout, LayoutConfig, ParsedModel, PlantUmlParser,
};
use umlschema::plugins::schema::{generate_schemas, SchemaHeuristics};
use umlschema::PositionMap;

/// umlschema - PlantUML class diagrams to JSON models, layouts and entity schemas
#[derive(Parser)]
#[command(name = "umlschema")]
#[command(about = "Turn PlantUML class diagrams into JSON models, layouts and entity schemas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error); overrides UMLSCHEMA_LOG_LEVEL
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json); overrides UMLSCHEMA_LOG_FORMAT
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a diagram and print the model as JSON
    Parse {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print entity and relation counts
    Summary {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List relations, one per line
    Relations {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Only relations touching this entity
        #[arg(long)]
        node: Option<String>,
    },

    /// Compute entity positions and print them as JSON
    Layout {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plain row-major grid instead of the cluster layout
        #[arg(long)]
        grid: bool,

        /// Round positions to the snap grid
        #[arg(long)]
        snap: bool,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Generate entity schemas as JSON
    Schema {
        /// Input file containing the diagram (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only this class; prints a single object
        #[arg(long = "class")]
        class_name: Option<String>,

        /// JSON file overriding the naming heuristics
        #[arg(long)]
        heuristics: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

/// Main CLI application
pub struct UmlSchemaApp {
    parser: PlantUmlParser,
    layout_config: LayoutConfig,
}

impl UmlSchemaApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_layout_config(LayoutConfig::default())
    }

    pub fn with_layout_config(layout_config: LayoutConfig) -> Self {
        Self {
            parser: PlantUmlParser::new(),
            layout_config,
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        if let Err(e) = init_logging(
            cli.log_level.map(|l| l.as_str()),
            cli.log_format.map(|f| f.as_str()),
        ) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("umlschema v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Parse {
                input,
                output,
                compact,
            } => {
                let model = self.load(input, cli.verbose)?;
                self.write_output(output, &to_json(&model, compact)?)
            }
            Commands::Summary { input } => {
                let model = self.load(input, cli.verbose)?;
                self.write_output(None, &self.summary_text(&model))
            }
            Commands::Relations { input, node } => {
                let model = self.load(input, cli.verbose)?;
                self.write_output(None, &self.relations_text(&model, node.as_deref()))
            }
            Commands::Layout {
                input,
                output,
                grid,
                snap,
                compact,
            } => {
                let model = self.load(input, cli.verbose)?;
                let positions = self.positions(&model, grid, snap);
                self.write_output(output, &to_json(&positions, compact)?)
            }
            Commands::Schema {
                input,
                output,
                class_name,
                heuristics,
                compact,
            } => {
                let model = self.load(input, cli.verbose)?;
                let json = self.schema_json(&model, class_name.as_deref(), heuristics, compact)?;
                self.write_output(output, &json)
            }
        }
    }

    fn load(&self, input: Option<PathBuf>, verbose: bool) -> Result<ParsedModel> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        let model = self.parser.parse(&content);
        if verbose {
            eprintln!("{}", model.summary());
        }
        Ok(model)
    }

    /// Counts line followed by the package list
    pub fn summary_text(&self, model: &ParsedModel) -> String {
        let mut text = model.summary().to_string();
        if !model.packages.is_empty() {
            text.push_str(&format!("\npackages: {}", model.packages.join(", ")));
        }
        text
    }

    /// `from <symbol> to (kind)` per relation
    pub fn relations_text(&self, model: &ParsedModel, node: Option<&str>) -> String {
        let lines: Vec<String> = match node {
            Some(name) => model.relations_of(name).map(ToString::to_string).collect(),
            None => model.relations.iter().map(ToString::to_string).collect(),
        };
        debug!(count = lines.len(), "Relations listed");
        lines.join("\n")
    }

    pub fn positions(&self, model: &ParsedModel, grid: bool, snap: bool) -> PositionMap {
        let nodes = model.diagram_nodes();
        let mut positions = if grid {
            GridLayout::with_config(self.layout_config).compute(&nodes)
        } else {
            ClusterLayout::with_config(self.layout_config).compute(&nodes, &model.relations)
        };
        if snap {
            snap_all(&mut positions, self.layout_config.snap_size);
        }
        info!(nodes = positions.len(), grid, snap, "Layout computed");
        positions
    }

    pub fn schema_json(
        &self,
        model: &ParsedModel,
        class_name: Option<&str>,
        heuristics: Option<PathBuf>,
        compact: bool,
    ) -> Result<String> {
        let heuristics = match heuristics {
            Some(path) => SchemaHeuristics::from_file(&path).map_err(|e| {
                anyhow!("Failed to load heuristics '{}': {}", path.display(), e)
            })?,
            None => SchemaHeuristics::default(),
        };
        let output = generate_schemas(model, class_name, heuristics)?;
        to_json(&output, compact)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) => {
                if path.to_string_lossy() == "-" {
                    let mut content = String::new();
                    io::stdin().read_to_string(&mut content)?;
                    Ok(content)
                } else {
                    fs::read_to_string(&path).map_err(|e| {
                        anyhow!("Failed to read input file '{}': {}", path.display(), e)
                    })
                }
            }
            None => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) => {
                if path.to_string_lossy() == "-" {
                    print!("{}", stdout_content);
                    io::stdout().flush()?;
                } else {
                    fs::write(&path, content).map_err(|e| {
                        anyhow!("Failed to write output file '{}': {}", path.display(), e)
                    })?;
                }
            }
            None => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for UmlSchemaApp {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DIAGRAM: &str = "@startuml
package vendite {
  class Ordine {
    codice : String
    righe : Riga[1..n]
  }
  class Riga {
    quantita : Int
  }
}
class Cliente
Ordine *-- Riga
Cliente --> Ordine
@enduml
";

    fn model() -> ParsedModel {
        PlantUmlParser::new().parse(DIAGRAM)
    }

    #[test]
    fn test_cli_parsing_parse_command() {
        let args = vec!["umlschema", "parse", "--input", "model.puml", "--compact"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Parse {
                input,
                output,
                compact,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "model.puml");
                assert!(output.is_none());
                assert!(compact);
            }
            _ => panic!("Expected Parse command"),
        }
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_parsing_schema_command() {
        let args = vec![
            "umlschema",
            "schema",
            "-i",
            "model.puml",
            "--class",
            "Ordine",
            "--heuristics",
            "rules.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Schema {
                class_name,
                heuristics,
                compact,
                ..
            } => {
                assert_eq!(class_name.as_deref(), Some("Ordine"));
                assert_eq!(heuristics.unwrap().to_string_lossy(), "rules.json");
                assert!(!compact);
            }
            _ => panic!("Expected Schema command"),
        }
    }

    #[test]
    fn test_cli_parsing_layout_flags() {
        let args = vec!["umlschema", "layout", "--grid", "--snap"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Layout { grid, snap, .. } => {
                assert!(grid);
                assert!(snap);
            }
            _ => panic!("Expected Layout command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = vec![
            "umlschema",
            "relations",
            "--node",
            "Ordine",
            "--verbose",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(vec!["umlschema", "render"]).is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let app = UmlSchemaApp::new();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("model.puml");
        fs::write(&file_path, DIAGRAM).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, DIAGRAM);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = UmlSchemaApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/no/such/model.puml")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = UmlSchemaApp::new();

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.json");

        app.write_output(Some(file_path.clone()), "{}").unwrap();

        let read_content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(read_content, "{}");
    }

    #[test]
    fn test_summary_text() {
        let app = UmlSchemaApp::new();
        assert_eq!(
            app.summary_text(&model()),
            "3 classes · 0 enums · 0 interfaces · 2 relations\npackages: vendite"
        );
    }

    #[test]
    fn test_relations_text_filtered() {
        let app = UmlSchemaApp::new();
        let all = app.relations_text(&model(), None);
        assert_eq!(all.lines().count(), 2);

        let riga = app.relations_text(&model(), Some("Riga"));
        assert_eq!(riga.lines().count(), 1);
        assert!(riga.contains("Ordine"));
        assert!(riga.contains("composition"));
    }

    #[test]
    fn test_positions_grid_and_snap() {
        let app = UmlSchemaApp::new();
        let cluster = app.positions(&model(), false, false);
        let grid = app.positions(&model(), true, true);
        assert_eq!(cluster.len(), 3);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid["Cliente"].x, 750.0);
    }

    #[test]
    fn test_schema_json_single_and_all() {
        let app = UmlSchemaApp::new();
        let model = model();

        let all: serde_json::Value =
            serde_json::from_str(&app.schema_json(&model, None, None, true).unwrap()).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 3);

        let one: serde_json::Value = serde_json::from_str(
            &app.schema_json(&model, Some("Ordine"), None, false).unwrap(),
        )
        .unwrap();
        assert_eq!(one["name"], "Ordine");
        assert_eq!(one["attributes"][1]["relation"]["embedded"], true);
    }

    #[test]
    fn test_schema_json_missing_class() {
        let app = UmlSchemaApp::new();
        let err = app
            .schema_json(&model(), Some("Fattura"), None, false)
            .unwrap_err();
        assert_eq!(err.to_string(), "Class not found: Fattura");
    }

    #[test]
    fn test_schema_json_with_heuristics_file() {
        let app = UmlSchemaApp::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{"icon": "cart"}"#).unwrap();

        let json = app
            .schema_json(&model(), Some("Ordine"), Some(path), true)
            .unwrap();
        assert!(json.contains("\"icon\":\"cart\""));
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("model.puml");
        let output = dir.path().join("schema.json");
        fs::write(&input, DIAGRAM).unwrap();

        let cli = Cli::try_parse_from(vec![
            "umlschema".to_string(),
            "schema".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
        ])
        .unwrap();
        UmlSchemaApp::new().run(cli).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 3);
    }
}
