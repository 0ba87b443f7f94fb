use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use ledger::config::{data_dir, load_config, CONFIG_TEMPLATE};
use ledger::logging::init_tracing;
use ledger::report::{
    render_customer, render_customer_list, render_report, render_summary, render_update,
};
use ledger::{
    coerce_number, CellAddress, Config, Field, FileStore, LedgerEngine, LedgerError, Result,
    RowInputs,
};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version, about = "Per-customer billing ledger", long_about = None)]
struct Cli {
    /// Path to data directory (default: XDG data dir or ~/.ledger)
    #[arg(short = 'C', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory with a config template
    Init,

    /// Add a customer with a fresh set of rows
    New {
        /// Customer name (default: "Customer N")
        name: Option<String>,
    },

    /// List customers
    Customers,

    /// Show a customer's rows and summary
    Show {
        /// Customer index from 'customers' or id; index is tried before id (default: first)
        #[arg(short, long)]
        customer: Option<String>,
    },

    /// Set one cell of a row
    Set {
        /// Customer index from 'customers' or id; index is tried before id (default: first)
        #[arg(short, long)]
        customer: Option<String>,

        /// Row number, starting at 1
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        row: u32,

        /// label, sold, rate, deduction1 or deduction2
        #[arg(short, long)]
        field: Field,

        /// New value; non-numeric input counts as 0 for numeric fields
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Replace all numeric inputs of a row; omitted inputs become 0
    Fill {
        /// Customer index from 'customers' or id; index is tried before id (default: first)
        #[arg(short, long)]
        customer: Option<String>,

        /// Row number, starting at 1
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        row: u32,

        #[arg(long, allow_hyphen_values = true)]
        sold: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        rate: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        deduction1: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        deduction2: Option<String>,
    },

    /// Reset a row to its placeholder label and zeros
    Clear {
        /// Customer index from 'customers' or id; index is tried before id (default: first)
        #[arg(short, long)]
        customer: Option<String>,

        /// Row number, starting at 1
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        row: u32,
    },

    /// Set the carried-forward balance
    Balance {
        /// Customer index from 'customers' or id; index is tried before id (default: first)
        #[arg(short, long)]
        customer: Option<String>,

        /// Balance amount (may be negative)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Rename a customer
    Rename {
        /// Customer index from 'customers' or id; index is tried before id (default: first)
        #[arg(short, long)]
        customer: Option<String>,

        name: String,
    },

    /// Print the ledger document as JSON
    Export,

    /// Replace the ledger with a JSON document
    Import {
        file: PathBuf,
    },

    /// Balances of every customer with grand totals
    Report,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = match cli.data_dir {
        Some(p) => p,
        None => data_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&dir),
        Commands::New { name } => cmd_new(&dir, name.as_deref().unwrap_or("")),
        Commands::Customers => cmd_customers(&dir),
        Commands::Show { customer } => cmd_show(&dir, customer.as_deref()),
        Commands::Set {
            customer,
            row,
            field,
            value,
        } => cmd_set(&dir, customer.as_deref(), row, field, &value),
        Commands::Fill {
            customer,
            row,
            sold,
            rate,
            deduction1,
            deduction2,
        } => {
            let inputs = RowInputs::from_raw(
                sold.as_deref(),
                rate.as_deref(),
                deduction1.as_deref(),
                deduction2.as_deref(),
            );
            cmd_fill(&dir, customer.as_deref(), row, inputs)
        }
        Commands::Clear { customer, row } => cmd_clear(&dir, customer.as_deref(), row),
        Commands::Balance { customer, value } => cmd_balance(&dir, customer.as_deref(), &value),
        Commands::Rename { customer, name } => cmd_rename(&dir, customer.as_deref(), &name),
        Commands::Export => cmd_export(&dir),
        Commands::Import { file } => cmd_import(&dir, &file),
        Commands::Report => cmd_report(&dir),
    }
}

fn open_engine(dir: &Path) -> Result<(LedgerEngine<FileStore>, Config)> {
    let config = load_config(dir)?;
    let engine = LedgerEngine::open(FileStore::new(dir), config.engine_options())?;
    Ok((engine, config))
}

/// Resolve a customer reference (id or 1-based index) to an id
fn resolve_customer_id(
    engine: &LedgerEngine<FileStore>,
    reference: Option<&str>,
) -> Result<String> {
    let Some(reference) = reference else {
        return Ok(engine.first_customer()?.id.clone());
    };

    if let Ok(idx) = reference.parse::<usize>() {
        if idx >= 1 && idx <= engine.customers().len() {
            return Ok(engine.customers()[idx - 1].id.clone());
        }
    }

    Ok(engine.customer(reference)?.id.clone())
}

fn row_index(row: u32) -> usize {
    row as usize - 1
}

fn cmd_init(dir: &Path) -> Result<()> {
    let config_path = dir.join("config.toml");
    if config_path.exists() {
        return Err(LedgerError::AlreadyInitialized(config_path));
    }

    fs::create_dir_all(dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;

    let (engine, _) = open_engine(dir)?;

    println!("Initialized ledger at: {}", dir.display());
    println!("  Config:    {}", config_path.display());
    println!("  Customers: {}", engine.customers().len());
    println!();
    println!("Next steps:");
    println!("  ledger show");
    println!("  ledger set --row 1 --field sold 10");

    Ok(())
}

fn cmd_new(dir: &Path, name: &str) -> Result<()> {
    let (mut engine, _) = open_engine(dir)?;
    let customer = engine.create_customer(name)?;

    println!("Created customer '{}'", customer.name);
    println!("  ID:   {}", customer.id);
    println!("  Rows: {}", customer.rows.len());

    Ok(())
}

fn cmd_customers(dir: &Path) -> Result<()> {
    let (engine, config) = open_engine(dir)?;
    println!(
        "{}",
        render_customer_list(engine.customers(), &config.display.currency_symbol)
    );
    Ok(())
}

fn cmd_show(dir: &Path, customer_ref: Option<&str>) -> Result<()> {
    let (engine, config) = open_engine(dir)?;
    let id = resolve_customer_id(&engine, customer_ref)?;
    println!(
        "{}",
        render_customer(engine.customer(&id)?, &config.display.currency_symbol)
    );
    Ok(())
}

fn cmd_set(
    dir: &Path,
    customer_ref: Option<&str>,
    row: u32,
    field: Field,
    value: &str,
) -> Result<()> {
    let (mut engine, config) = open_engine(dir)?;
    let address = CellAddress {
        customer_id: resolve_customer_id(&engine, customer_ref)?,
        row_index: row_index(row),
        field,
    };
    let update = engine.update_cell(&address, value)?;
    println!("{}", render_update(&update, &config.display.currency_symbol));
    Ok(())
}

fn cmd_fill(dir: &Path, customer_ref: Option<&str>, row: u32, inputs: RowInputs) -> Result<()> {
    let (mut engine, config) = open_engine(dir)?;
    let id = resolve_customer_id(&engine, customer_ref)?;
    let update = engine.recalculate_row(&id, row_index(row), inputs)?;
    println!("{}", render_update(&update, &config.display.currency_symbol));
    Ok(())
}

fn cmd_clear(dir: &Path, customer_ref: Option<&str>, row: u32) -> Result<()> {
    let (mut engine, config) = open_engine(dir)?;
    let id = resolve_customer_id(&engine, customer_ref)?;
    let update = engine.clear_row(&id, row_index(row))?;
    println!("Cleared row {}", row);
    println!("{}", render_update(&update, &config.display.currency_symbol));
    Ok(())
}

fn cmd_balance(dir: &Path, customer_ref: Option<&str>, value: &str) -> Result<()> {
    let (mut engine, config) = open_engine(dir)?;
    let id = resolve_customer_id(&engine, customer_ref)?;
    let summary = engine.set_balance(&id, coerce_number(value))?;
    println!("{}", render_summary(&summary, &config.display.currency_symbol));
    Ok(())
}

fn cmd_rename(dir: &Path, customer_ref: Option<&str>, name: &str) -> Result<()> {
    let (mut engine, _) = open_engine(dir)?;
    let id = resolve_customer_id(&engine, customer_ref)?;
    engine.rename_customer(&id, name)?;
    println!("Renamed {} to '{}'", id, name);
    Ok(())
}

fn cmd_export(dir: &Path) -> Result<()> {
    let (engine, _) = open_engine(dir)?;
    println!("{}", engine.serialize()?);
    Ok(())
}

fn cmd_import(dir: &Path, file: &Path) -> Result<()> {
    let blob = fs::read_to_string(file)?;
    let customers = LedgerEngine::<FileStore>::deserialize(&blob)?;

    let (mut engine, _) = open_engine(dir)?;
    engine.replace_customers(customers)?;

    println!(
        "Imported {} customer(s) from {}",
        engine.customers().len(),
        file.display()
    );
    Ok(())
}

fn cmd_report(dir: &Path) -> Result<()> {
    let (engine, config) = open_engine(dir)?;
    println!(
        "{}",
        render_report(engine.customers(), &config.display.currency_symbol)
    );
    Ok(())
}
