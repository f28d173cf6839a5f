use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "oxel")]
/// Oxel command line EL reasoner
pub struct Args {
    /// Emit logs as JSON lines on stderr
    ///
    /// Log verbosity is controlled with the RUST_LOG environment variable (default: warn).
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args)]
pub struct OntologyArgs {
    /// File to read the ontology from
    ///
    /// If no file is given, stdin is read.
    /// Files ending with `.gz` are decompressed on the fly.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
    /// The format of the ontology file
    ///
    /// It can be an extension like "ttl" or a MIME type like "text/turtle".
    /// By default the format is guessed from the file extension.
    #[arg(long, required_unless_present = "file")]
    pub format: Option<String>,
    /// Base IRI of the ontology file
    #[arg(long, value_hint = ValueHint::Url)]
    pub base: Option<String>,
    /// Skip axioms using constructors outside of the EL fragment instead of failing
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the subsumers of a class, one per line
    ///
    /// An unknown class prints nothing.
    Subsumers {
        #[command(flatten)]
        ontology: OntologyArgs,
        /// The class, given by its full IRI or its local name
        class: String,
        /// Also print owl:Thing
        #[arg(long)]
        include_top: bool,
        /// Read names from every element of the completion graph and not only from the root
        #[arg(long)]
        all_elements: bool,
        /// Class IRI never to print (can be repeated)
        #[arg(long, value_hint = ValueHint::Url)]
        exclude: Vec<String>,
        /// Print full IRIs instead of local names
        #[arg(long)]
        full_iri: bool,
        /// Maximum number of processed worklist entries
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Maximum reasoning time in seconds
        #[arg(long)]
        timeout: Option<f64>,
        /// Print the size of the completion graph and the rule firings on stderr
        #[arg(long)]
        stats: bool,
    },
    /// Print the subsumers of every class of the ontology
    ///
    /// Each line has the shape `Class: Subsumer1 Subsumer2...`.
    Classify {
        #[command(flatten)]
        ontology: OntologyArgs,
        /// Number of threads used to saturate the classes
        ///
        /// By default one thread per CPU is used.
        #[arg(long)]
        threads: Option<usize>,
        /// Also print owl:Thing
        #[arg(long)]
        include_top: bool,
        /// Class IRI never to print as a subsumer (can be repeated)
        #[arg(long, value_hint = ValueHint::Url)]
        exclude: Vec<String>,
        /// Print full IRIs instead of local names
        #[arg(long)]
        full_iri: bool,
    },
    /// Print the classes declared or used in the ontology
    Classes {
        #[command(flatten)]
        ontology: OntologyArgs,
        /// Print full IRIs instead of local names
        #[arg(long)]
        full_iri: bool,
    },
}
