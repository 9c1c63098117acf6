//! Minimal CLI: declarations → (pretty | ir | expression | function | module)
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use guardgen::codegen::{emit_expression, emit_function, emit_module, FunctionOptions};
use guardgen::declarations::{DeclarationDocument, DeclarationSet};
use guardgen::lower::lower_to_validation;
use guardgen::pretty::pretty_print_graph;
use guardgen::resolver::TypeGraph;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// build type graphs from JSON declaration documents and emit runtime type guards
#[derive(Parser, Debug)]
#[command(name = "guardgen")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// pretty-print the type graph reachable from the root declaration
    Print(PrintOut),
    /// emit the boolean guard expression for the root declaration
    Expr(ExprOut),
    /// emit a type-guard function for the root declaration
    Function(FunctionOut),
    /// dump the root's Validation IR as JSON
    Ir(IrOut),
    /// emit type-guard functions for the root and every exported declaration
    Module(FunctionOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more declaration documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// name of the root declaration
    #[arg(long)]
    root: String,
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct PrintOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct ExprOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// free variable the expression tests
    #[arg(long, default_value = "value")]
    variable: String,

    #[command(flatten)]
    output_settings: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct FunctionOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// prefix emitted functions with `export`
    #[arg(long)]
    export: bool,

    /// parameter name of the emitted functions
    #[arg(long, default_value = "value")]
    parameter: String,

    #[command(flatten)]
    output_settings: OutputSettings,
}

#[derive(clap::Parser, Debug)]
struct IrOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    output_settings: OutputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_graph(&self) -> anyhow::Result<TypeGraph> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut set = DeclarationSet::new();
        for source_path in source_paths {
            let document = DeclarationDocument::load(&source_path)?;
            set.extend(document)
                .with_context(|| format!("while adding {}", source_path.display()))?;
        }
        tracing::info!(declarations = set.len(), root = %self.root, "building type graph");
        set.build(&self.root)
            .with_context(|| format!("failed to build type graph for `{}`", self.root))
    }
}

impl FunctionOut {
    fn options(&self) -> FunctionOptions {
        FunctionOptions {
            export: self.export,
            parameter: self.parameter.clone(),
        }
    }
}

impl OutputSettings {
    fn write(&self, src: &str) -> anyhow::Result<()> {
        let Some(out) = self.out.as_ref() else {
            println!("{src}");
            return Ok(());
        };
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Print(target) => {
                if target.output_settings.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let graph = target.input_settings.load_graph()?;
                let src = pretty_print_graph(&graph)?.to_string();
                target.output_settings.write(&src)
            }
            Command::Expr(target) => {
                if target.output_settings.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let graph = target.input_settings.load_graph()?;
                let validation = lower_to_validation(&graph.root().target);
                let src = emit_expression(&validation, &target.variable)?;
                target.output_settings.write(&src)
            }
            Command::Function(target) => {
                if target.output_settings.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let graph = target.input_settings.load_graph()?;
                let src = emit_function(graph.root(), &target.options())?;
                target.output_settings.write(&src)
            }
            Command::Ir(target) => {
                if target.output_settings.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let graph = target.input_settings.load_graph()?;
                let validation = lower_to_validation(&graph.root().target);
                let src = serde_json::to_string_pretty(&validation)?;
                target.output_settings.write(&src)
            }
            Command::Module(target) => {
                if target.output_settings.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let graph = target.input_settings.load_graph()?;
                let src = emit_module(&graph, &target.options())?;
                target.output_settings.write(&src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    // several patterns may name the same document
    out.sort();
    out.dedup();
    Ok(out)
}
