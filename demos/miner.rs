// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{bail, Context, Result};
use clap::{Parser as _, Subcommand};

use constraint_miner::unstable::*;
use constraint_miner::*;

fn load_engine(templates: &[String], config: Option<String>) -> Result<Engine> {
    let mut engine = Engine::new();

    // The config decides the default policy, so it is applied before parsing.
    if let Some(file) = config {
        engine.set_config(MinerConfig::from_file(&file)?);
    }

    for file in templates.iter() {
        engine.add_templates_from_file(file)?;
    }
    Ok(engine)
}

fn load_data(file: &str) -> Result<SimpleDataCollection> {
    let contents =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;

    let value = if file.ends_with(".json") {
        Value::from_json_str(&contents)?
    } else if file.ends_with(".yaml") || file.ends_with(".yml") {
        Value::from_yaml_str(&contents)?
    } else {
        bail!("Unsupported data file `{file}`. Must be json or yaml.")
    };

    match value {
        Value::Array(items) => Ok(SimpleDataCollection::from_values(items.as_ref().clone())),
        _ => bail!("{file} must contain an array of records"),
    }
}

fn mine(
    templates: &[String],
    data: String,
    schema: Option<String>,
    config: Option<String>,
) -> Result<()> {
    let mut engine = load_engine(templates, config)?;
    for invalid in engine.validate_templates() {
        eprintln!(
            "invalid template {}:\n{}",
            invalid.template,
            serde_json::to_string_pretty(&invalid.messages)?
        );
    }

    let data = load_data(&data)?;
    let mined = match schema {
        Some(file) => engine.mine_from_schema(&SimpleDataSchema::from_file(file)?, &data),
        None => engine.mine_from_data(&data),
    };

    println!("{}", serde_json::to_string_pretty(&mined)?);
    Ok(())
}

fn validate(templates: &[String]) -> Result<()> {
    let mut engine = load_engine(templates, None)?;
    let invalid = engine.validate_templates();
    println!("{}", serde_json::to_string_pretty(&invalid)?);
    if !invalid.is_empty() {
        bail!("{} invalid templates", invalid.len());
    }
    Ok(())
}

fn eval(term: String, bindings: Option<String>) -> Result<()> {
    let engine = Engine::new();
    let mut term = engine.parse_term(&term)?;

    if let Some(file) = bindings {
        let record = load_data(&file)?;
        let Some(entry) = record.entries().first() else {
            bail!("{file} has no records");
        };
        let mut values = Bindings::new();
        for name in term.free_variables() {
            if let Some(l) = Literal::from_value(entry.get_path(&name)) {
                values.insert(name, Term::literal(l));
            }
        }
        term = term.substitute(&values);
    }

    println!("{}", term.evaluate());
    Ok(())
}

fn lex(file: String, verbose: bool) -> Result<()> {
    let source = Source::from_file(file)?;

    // Create lexer.
    let mut lexer = Lexer::new(&source);

    // Read tokens until EOF.
    loop {
        let token = lexer.next_token()?;
        if token.0 == TokenKind::Eof {
            break;
        }

        if verbose {
            // Print each token's line and mark with with ^.
            println!("{}", token.1.message("", ""));
        }

        println!("{token:?}");
    }
    Ok(())
}

fn parse(file: String) -> Result<()> {
    let source = Source::from_file(file)?;
    let mut parser = Parser::new(&source)?;
    let templates = parser.parse()?;
    println!("{templates:#?}");
    Ok(())
}

#[derive(Subcommand)]
enum MinerCommand {
    /// Mine constraints from a data set.
    Mine {
        /// Constraint template files.
        #[arg(required(true), long, short, value_name = "templates.txt")]
        templates: Vec<String>,

        /// Records. A json or yaml array of objects.
        #[arg(long, short, value_name = "data.json|data.yaml")]
        data: String,

        /// Schema used to generate candidates instead of the data.
        #[arg(long, short, value_name = "schema.json|schema.yaml")]
        schema: Option<String>,

        /// Miner configuration.
        #[arg(long, short, value_name = "config.json|config.yaml")]
        config: Option<String>,
    },

    /// Report templates that do not type check.
    Validate {
        /// Constraint template files.
        #[arg(required(true))]
        templates: Vec<String>,
    },

    /// Evaluate a single term.
    Eval {
        /// Term to evaluate.
        term: String,

        /// Bind free variables to the first record of this file.
        #[arg(long, short, value_name = "data.json|data.yaml")]
        bindings: Option<String>,
    },

    /// Tokenize a template file.
    Lex {
        /// Template file.
        file: String,

        /// Verbose output.
        #[arg(long, short)]
        verbose: bool,
    },

    /// Parse a template file.
    Parse {
        /// Template file.
        file: String,
    },
}

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: MinerCommand,
}

fn main() -> Result<()> {
    env_logger::init();

    // Parse and dispatch command.
    let cli = Cli::parse();
    match cli.command {
        MinerCommand::Mine {
            templates,
            data,
            schema,
            config,
        } => mine(&templates, data, schema, config),
        MinerCommand::Validate { templates } => validate(&templates),
        MinerCommand::Eval { term, bindings } => eval(term, bindings),
        MinerCommand::Lex { file, verbose } => lex(file, verbose),
        MinerCommand::Parse { file } => parse(file),
    }
}
