use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use pgmapper::{Direction, JoinKind, MapperConfig, Param, PgMapper, Record, Statement};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// pgmapper CLI
#[derive(Parser, Debug)]
#[command(name = "pgmapper")]
#[command(about = "Inspect catalog-derived column types and run typed SELECTs", long_about = None)]
struct Args {
    /// Config file (default: /etc/pgmapper/pgmapper.toml, then ./pgmapper.toml)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Connection string; overrides the config file and PGMAPPER_URL
    #[arg(short = 'u', long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register tables and print their column types
    Describe {
        #[arg(required = true)]
        tables: Vec<String>,
    },
    /// Run a SELECT and print the decoded records
    Select {
        /// Qualified fields, e.g. t_users.id t_users.email
        #[arg(required = true)]
        fields: Vec<String>,

        /// Source table
        #[arg(long)]
        from: String,

        /// Inner-join this table (requires --on)
        #[arg(long, requires = "on")]
        join: Option<String>,

        /// Join condition
        #[arg(long, requires = "join")]
        on: Option<String>,

        /// WHERE template using ? markers, e.g. "t_users.age > ?"
        #[arg(long = "where")]
        filter: Option<String>,

        /// Argument for the next ? marker (null, true/false, integers and
        /// RFC 3339 timestamps are typed; anything else is text)
        #[arg(long = "arg")]
        args: Vec<String>,

        #[arg(long)]
        order: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        #[arg(long)]
        limit: Option<u64>,

        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn parse_arg(raw: &str) -> Param {
    match raw {
        "null" | "NULL" => Param::Null,
        "true" => Param::Bool(true),
        "false" => Param::Bool(false),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                Param::Int(i)
            } else if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
                Param::Timestamp(t.with_timezone(&Utc))
            } else {
                Param::Text(raw.to_string())
            }
        }
    }
}

/// Tables whose columns a select list references, by `table.` prefix.
fn referenced_tables<'a>(fields: &'a [String], extra: &[&'a str]) -> BTreeSet<&'a str> {
    fields
        .iter()
        .filter_map(|f| f.split_once('.').map(|(table, _)| table))
        .chain(extra.iter().copied())
        .collect()
}

fn print_records(fields: &[String], records: &[Record], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(fields.iter().map(Cell::new));
    for record in records {
        table.add_row(record.iter().map(|(_, value)| Cell::new(value)));
    }
    println!("{table}");
    println!("({} row{})", records.len(), if records.len() == 1 { "" } else { "s" });
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();
    let mut config = MapperConfig::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        config.url = url;
    }

    let mapper = PgMapper::connect(&config)?;
    info!(target: "pgmapper", "connected, {} table(s) preregistered", config.tables.len());

    match args.command {
        Command::Describe { tables } => {
            let mut out = Table::new();
            out.load_preset(UTF8_FULL);
            out.set_header(vec!["field", "type"]);
            for name in &tables {
                mapper.register(name)?;
                for (column, ty) in mapper.registry().columns_of(name) {
                    out.add_row(vec![Cell::new(format!("{name}.{column}")), Cell::new(ty)]);
                }
            }
            println!("{out}");
        }
        Command::Select {
            fields,
            from,
            join,
            on,
            filter,
            args,
            order,
            desc,
            limit,
            json,
        } => {
            let mut sources = vec![from.as_str()];
            sources.extend(join.as_deref());
            mapper.register_all(referenced_tables(&fields, &sources))?;

            let mut stmt = Statement::select(fields.iter().map(String::as_str));
            stmt = match (join.as_deref(), on.as_deref()) {
                (Some(right), Some(condition)) => stmt.from_join(JoinKind::Inner, &from, right, condition),
                _ => stmt.from(&from),
            };
            if let Some(template) = filter {
                stmt = stmt.filter(&template, args.iter().map(|a| parse_arg(a)).collect());
            }
            if let Some(field) = order {
                let direction = if desc { Direction::Desc } else { Direction::Asc };
                stmt = stmt.order(&field, direction);
            }
            if let Some(n) = limit {
                stmt = stmt.limit(n);
            }

            let records = stmt.run(&mapper)?;
            print_records(&fields, &records, json)?;
        }
    }

    Ok(())
}
