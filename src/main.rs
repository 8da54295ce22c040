//! Binary entry point: resolve configuration, start logging, open the store,
//! prepare the schema, then either print the records or run the terminal UI.
use clap::Parser;
use library_loans::config::{resolve_database_path, Cli, Command, Settings};
use library_loans::logging::{init_logging, log_path_for};
use library_loans::ui::plain_table;
use library_loans::{initialize_schema, list_records, open_store, run_app, App};
use tracing::error;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let db_path = resolve_database_path(cli.database, &settings)?;
    init_logging(&log_path_for(&db_path), settings.log_filter())?;

    // Without a connection nothing else can work, so this is the one failure
    // that ends the process.
    let conn = open_store(&db_path).inspect_err(|err| {
        error!(error = %format!("{err:#}"), "could not open the library store");
    })?;
    let issues = initialize_schema(&conn);

    match cli.command {
        Some(Command::List) => {
            for issue in &issues {
                eprintln!("warning: {issue:#}");
            }
            let records = list_records(&conn)?;
            print!("{}", plain_table(&records));
            Ok(())
        }
        None => {
            let mut app = App::new(conn, issues);
            run_app(&mut app)
        }
    }
}
