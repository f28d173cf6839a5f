#![allow(clippy::print_stderr)]
use anyhow::{Context, bail};
use clap::Parser;
use cli::{Args, Command, OntologyArgs};
use flate2::read::MultiGzDecoder;
use oxel::{
    ConceptName, ElReasoner, ElRule, ExtractionScope, Ontology, ParserConfig, ReasonerConfig,
    Saturation, SubsumerPolicy, read_ontology,
};
use oxrdfio::RdfFormat;
use rayon::ThreadPoolBuilder;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write, stdin, stdout};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);
    match args.command {
        Command::Subsumers {
            ontology,
            class,
            include_top,
            all_elements,
            exclude,
            full_iri,
            max_iterations,
            timeout,
            stats,
        } => {
            let ontology = load_ontology(&ontology)?;
            let Some(target) = ontology.resolve(&class) else {
                warn!(class = %class, "Class not found in the ontology");
                return Ok(());
            };
            let config = ReasonerConfig {
                max_iterations,
                timeout: timeout
                    .map(Duration::try_from_secs_f64)
                    .transpose()
                    .context("Invalid timeout")?,
                policy: SubsumerPolicy {
                    scope: if all_elements {
                        ExtractionScope::AllElements
                    } else {
                        ExtractionScope::Root
                    },
                    include_top,
                    excluded: class_names(&ontology, &exclude)?,
                },
            };
            let reasoner = ElReasoner::with_config(&ontology, config);
            let start = Instant::now();
            let saturation = reasoner.saturate(target)?;
            let subsumers = saturation.subsumers(&reasoner.config().policy);
            if stats {
                print_stats(&saturation, subsumers.len(), start.elapsed());
            }
            let mut out = BufWriter::new(stdout().lock());
            for subsumer in &subsumers {
                writeln!(out, "{}", display_name(subsumer, full_iri))?;
            }
            out.flush()?;
            Ok(())
        }
        Command::Classify {
            ontology,
            threads,
            include_top,
            exclude,
            full_iri,
        } => {
            let ontology = load_ontology(&ontology)?;
            let config = ReasonerConfig {
                policy: SubsumerPolicy {
                    include_top,
                    excluded: class_names(&ontology, &exclude)?,
                    ..SubsumerPolicy::default()
                },
                ..ReasonerConfig::default()
            };
            let reasoner = ElReasoner::with_config(&ontology, config);
            let start = Instant::now();
            let classification = if let Some(threads) = threads {
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?
                    .install(|| reasoner.classify())
            } else {
                reasoner.classify()
            }?;
            info!(
                classes = classification.len(),
                elapsed = ?start.elapsed(),
                "Classification complete"
            );
            let mut out = BufWriter::new(stdout().lock());
            for (class, subsumers) in classification.iter() {
                write!(out, "{}:", display_name(class, full_iri))?;
                for subsumer in subsumers.iter().filter(|s| *s != class) {
                    write!(out, " {}", display_name(subsumer, full_iri))?;
                }
                writeln!(out)?;
            }
            out.flush()?;
            Ok(())
        }
        Command::Classes { ontology, full_iri } => {
            let ontology = load_ontology(&ontology)?;
            let mut classes = ontology.classes().collect::<Vec<_>>();
            classes.sort_unstable();
            let mut out = BufWriter::new(stdout().lock());
            for class in classes {
                writeln!(out, "{}", display_name(class, full_iri))?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn load_ontology(args: &OntologyArgs) -> anyhow::Result<Ontology> {
    let config = if args.lenient {
        ParserConfig::new().lenient()
    } else {
        ParserConfig::new()
    };
    let format = args.format.as_deref().map(rdf_format_from_name).transpose()?;
    let base = args.base.as_deref();
    let start = Instant::now();
    let ontology = if let Some(file) = &args.file {
        let fp = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
        if file.extension().is_some_and(|e| e == OsStr::new("gz")) {
            let format = match format {
                Some(format) => format,
                None => rdf_format_from_path(&file.with_extension(""))?,
            };
            read_ontology(MultiGzDecoder::new(fp), format, base, config)
        } else {
            let format = match format {
                Some(format) => format,
                None => rdf_format_from_path(file)?,
            };
            read_ontology(fp, format, base, config)
        }
        .with_context(|| format!("Failed to read the ontology from {}", file.display()))?
    } else {
        let format =
            format.context("The --format option must be set when reading from stdin")?;
        read_ontology(stdin().lock(), format, base, config)
            .context("Failed to read the ontology from stdin")?
    };
    info!(
        axioms = ontology.axiom_count(),
        elapsed = ?start.elapsed(),
        "Ontology loaded"
    );
    Ok(ontology)
}

/// Resolves class names given by local name or IRI.
fn class_names(ontology: &Ontology, names: &[String]) -> anyhow::Result<Vec<ConceptName>> {
    names
        .iter()
        .map(|name| {
            if let Some(class) = ontology.resolve(name) {
                return Ok(class.clone());
            }
            ConceptName::new_from_iri(name.as_str())
                .with_context(|| format!("'{name}' is neither a known class nor a valid IRI"))
        })
        .collect()
}

fn display_name(name: &ConceptName, full_iri: bool) -> &str {
    if full_iri {
        name.as_str()
    } else {
        name.local_name()
    }
}

fn print_stats(saturation: &Saturation, subsumers: usize, elapsed: Duration) {
    let stats = saturation.stats();
    eprintln!(
        "{subsumers} subsumers of {} computed in {:.3}s",
        saturation.target(),
        elapsed.as_secs_f64()
    );
    eprintln!(
        "{} elements, {} iterations, {} rule firings",
        saturation.element_count(),
        stats.iterations(),
        stats.total_firings()
    );
    for rule in ElRule::all() {
        eprintln!("  {}: {}", rule.name(), stats.firings(*rule));
    }
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    format_from_path(path, |ext| {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    })
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}
