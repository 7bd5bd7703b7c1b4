use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use wiki_abstracts::categories::{CategoryStore, InMemoryCategoryStore};
use wiki_abstracts::filters::{FilterContext, FilterRegistry, FilterSpec};
use wiki_abstracts::output::WriterSink;
use wiki_abstracts::wiki::SiteConfig;
use wiki_abstracts::xml_parser::{DumpReader, RevisionMode};

/// Write an abstract feed from a MediaWiki XML dump
#[derive(Parser, Debug)]
#[command(name = "abstracts")]
struct Args {
    /// Dump file to read, `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,
    /// Feed file to write, `-` for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
    /// Only use the last revision of each page
    #[arg(long)]
    current: bool,
    /// Filter to apply: `abstract`, `noredirect` or `namespace:LIST`.
    /// Repeatable; the first filter given sees pages first.
    #[arg(long = "filter", value_name = "FILTER")]
    filters: Vec<FilterSpec>,
    /// Site name to put in front of titles
    #[arg(long)]
    sitename: Option<String>,
    /// Main page URL of the wiki, e.g. https://en.wikipedia.org/wiki/Main_Page
    #[arg(long)]
    base_url: Option<String>,
    /// JSON site settings, used instead of the dump's <siteinfo>
    #[arg(long)]
    site_config: Option<String>,
    /// JSON object mapping page ids to category names
    #[arg(long)]
    categories: Option<String>,
    /// Log progress every this many pages, 0 to never log
    #[arg(long, default_value_t = 0u64)]
    report: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiki_abstracts=info,abstracts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let registry = FilterRegistry::with_builtin();

    let filters = if args.filters.is_empty() {
        vec!["abstract".parse::<FilterSpec>()?]
    } else {
        args.filters.clone()
    };
    if !filters.iter().any(|spec| spec.name == "abstract") {
        warn!("no abstract filter given, the output will be empty");
    }

    let (input, input_size) = open_input(&args.input)?;
    let mode = if args.current {
        RevisionMode::Current
    } else {
        RevisionMode::Full
    };
    let mut reader = DumpReader::new(input, mode).with_progress(input_size, args.report);

    let site_info = reader.read_site_info()?;
    let mut site = match (&args.site_config, site_info) {
        (Some(path), _) => load_site_config(path)?,
        (None, Some(info)) => info.site_config(),
        (None, None) => {
            warn!("dump has no <siteinfo>, using default site settings");
            SiteConfig::default()
        }
    };
    if let Some(sitename) = &args.sitename {
        site.sitename = sitename.clone();
    }
    if let Some(base_url) = &args.base_url {
        site.set_base_url(base_url);
    }
    info!(sitename = %site.sitename, server = %site.server, "site settings");

    let categories: Arc<dyn CategoryStore> = match &args.categories {
        Some(path) => {
            let store = InMemoryCategoryStore::from_json_file(path)?;
            info!(pages = store.page_count(), "loaded categories");
            Arc::new(store)
        }
        None => Arc::new(InMemoryCategoryStore::new()),
    };

    let context = FilterContext {
        site: Arc::new(site),
        categories,
    };

    let sink = WriterSink::new(BufWriter::new(open_output(&args.output)?));
    let mut chain = registry.build_chain(&filters, Box::new(sink), &context)?;

    let stats = reader.dump_into(chain.as_mut())?;
    info!(
        pages = stats.pages,
        revisions = stats.revisions,
        output = %args.output,
        "done"
    );

    Ok(())
}

fn open_input(filename: &str) -> io::Result<(Box<dyn BufRead>, u64)> {
    if filename == "-" {
        return Ok((Box::new(io::stdin().lock()), 0));
    }

    let file = File::open(filename)?;
    let size = file.metadata()?.len();
    Ok((Box::new(BufReader::new(file)), size))
}

fn open_output(filename: &str) -> io::Result<Box<dyn Write>> {
    if filename == "-" {
        return Ok(Box::new(io::stdout()));
    }

    ensure_parent_folder_exists(filename)?;
    Ok(Box::new(File::create(filename)?))
}

fn load_site_config(filename: &str) -> Result<SiteConfig, Box<dyn Error>> {
    let file = File::open(filename)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn ensure_parent_folder_exists(filename: &str) -> io::Result<()> {
    match Path::new(filename).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
