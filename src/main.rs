//! libris CLI: flat-file book catalog.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::Result;
use serde::Serialize;

use libris::config::ServiceConfig;
use libris::query::{BookFilter, SortOrder};
use libris::record::Book;
use libris::store::{BookPatch, CatalogStore, NewBook};

#[derive(Parser)]
#[command(name = "libris", version, about = "Flat-file book catalog")]
struct Cli {
    /// Catalog file path (overrides the config file).
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book; the store assigns its id.
    Add {
        #[command(flatten)]
        fields: BookFields,
    },

    /// Show one book by id.
    Get {
        id: String,
    },

    /// List books, filtered and paginated.
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// 1-based page number.
        #[arg(long, default_value = "1")]
        page: usize,

        /// Records per page (defaults to the configured page size).
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Create or fully overwrite the book with the given id.
    Put {
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },

    /// Update only the supplied fields of an existing book.
    Patch {
        id: String,
        #[command(flatten)]
        fields: PatchFields,
    },

    /// Delete a book by id.
    Delete {
        id: String,
    },

    /// List books published between two MM/DD/YYYY dates, date-sorted.
    Range {
        start: String,
        end: String,

        /// Sort order: ASC or DESC.
        #[arg(long, default_value = "ASC")]
        order: String,
    },

    /// Write a default config file.
    InitConfig {
        /// Destination path.
        #[arg(default_value = "libris.toml")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct BookFields {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    authors: String,
    #[arg(long, default_value = "")]
    avg_rating: String,
    #[arg(long, default_value = "")]
    isbn: String,
    #[arg(long, default_value = "")]
    isbn13: String,
    #[arg(long, default_value = "")]
    language_code: String,
    #[arg(long, default_value = "")]
    num_pages: String,
    #[arg(long, default_value = "")]
    ratings_count: String,
    #[arg(long, default_value = "")]
    text_reviews_count: String,
    /// Publication date as MM/DD/YYYY.
    #[arg(long, default_value = "")]
    publication_date: String,
    #[arg(long, default_value = "")]
    publisher: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    price: String,
}

impl From<BookFields> for NewBook {
    fn from(f: BookFields) -> Self {
        NewBook {
            title: f.title,
            authors: f.authors,
            avg_rating: f.avg_rating,
            isbn: f.isbn,
            isbn13: f.isbn13,
            language_code: f.language_code,
            num_pages: f.num_pages,
            ratings_count: f.ratings_count,
            text_reviews_count: f.text_reviews_count,
            publication_date: f.publication_date,
            publisher: f.publisher,
            description: f.description,
            category: f.category,
            price: f.price,
        }
    }
}

#[derive(Args)]
struct PatchFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    authors: Option<String>,
    #[arg(long)]
    avg_rating: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    isbn13: Option<String>,
    #[arg(long)]
    language_code: Option<String>,
    #[arg(long)]
    num_pages: Option<String>,
    #[arg(long)]
    ratings_count: Option<String>,
    #[arg(long)]
    text_reviews_count: Option<String>,
    /// Publication date as MM/DD/YYYY.
    #[arg(long)]
    publication_date: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    price: Option<String>,
}

impl From<PatchFields> for BookPatch {
    fn from(f: PatchFields) -> Self {
        BookPatch {
            title: f.title,
            authors: f.authors,
            avg_rating: f.avg_rating,
            isbn: f.isbn,
            isbn13: f.isbn13,
            language_code: f.language_code,
            num_pages: f.num_pages,
            ratings_count: f.ratings_count,
            text_reviews_count: f.text_reviews_count,
            publication_date: f.publication_date,
            publisher: f.publisher,
            description: f.description,
            category: f.category,
            price: f.price,
        }
    }
}

#[derive(Args)]
struct FilterArgs {
    /// Exact title match.
    #[arg(long)]
    title: Option<String>,
    /// Substring match against the contributor list.
    #[arg(long)]
    authors: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    publication_date: Option<String>,
    #[arg(long)]
    language_code: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
}

impl From<FilterArgs> for BookFilter {
    fn from(f: FilterArgs) -> Self {
        BookFilter {
            title: f.title,
            authors: f.authors,
            category: f.category,
            publisher: f.publisher,
            price: f.price,
            publication_date: f.publication_date,
            language_code: f.language_code,
            isbn: f.isbn,
        }
    }
}

#[derive(Serialize)]
struct ListOutput {
    total: usize,
    page: usize,
    page_size: usize,
    books: Vec<Book>,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::InitConfig { path } = &cli.command {
        let config = ServiceConfig::default();
        config.save(path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let mut config = ServiceConfig::load_or_default(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }
    let store = CatalogStore::open(&config.catalog_path)?;

    match cli.command {
        Commands::Add { fields } => {
            let book = store.create(fields.into())?;
            print_json(&book);
        }
        Commands::Get { id } => {
            let book = store.get(&id)?;
            print_json(&book);
        }
        Commands::List {
            filter,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(config.default_page_size);
            let (books, total) = store.list(&filter.into(), page, page_size)?;
            print_json(&ListOutput {
                total,
                page,
                page_size,
                books,
            });
        }
        Commands::Put { id, fields } => {
            let (book, outcome) = store.replace(&id, fields.into())?;
            eprintln!("{outcome:?}");
            print_json(&book);
        }
        Commands::Patch { id, fields } => {
            let book = store.update(&id, &fields.into())?;
            print_json(&book);
        }
        Commands::Delete { id } => {
            store.delete(&id)?;
            println!("deleted {id}");
        }
        Commands::Range { start, end, order } => {
            let order = SortOrder::parse(&order)
                .ok_or_else(|| miette::miette!("sort order must be ASC or DESC, got \"{order}\""))?;
            let books = store.range_query(&start, &end, order)?;
            print_json(&books);
        }
        Commands::InitConfig { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}
