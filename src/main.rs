use clap::Parser;
use nsrl_extract::{
    Cli, NsrlError, NsrlExtract, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli);

    let exit_code = run(&cli);
    process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    if cli.generate_config {
        return handle_generate_config(cli);
    }

    let app = match NsrlExtract::from_cli(cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(cli, &app);
    }

    let output_path = cli.resolve_output_path(app.config());

    match app.export(&cli.databases, &output_path) {
        Ok(report) => {
            app.output_formatter().print_extraction_report(&report);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &NsrlError) -> i32 {
    match error {
        NsrlError::NoInputSelected => 2,
        NsrlError::ColumnNotFound { .. } => 3,
        NsrlError::Database { .. } => 4,
        NsrlError::Io(_) | NsrlError::SourceNotFound { .. } => 5,
        NsrlError::Config { .. } => 6,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "nsrl-extract.toml".to_string());

    match NsrlExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  nsrl-extract <databases>... --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &NsrlExtract) -> i32 {
    let formatter = app.output_formatter();

    formatter.info("DRY RUN MODE - No hashes will be written");
    formatter.print_separator();

    let planned = match app.plan(&cli.databases) {
        Ok(planned) => planned,
        Err(e) => {
            app.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    let config = app.config();
    formatter.info("Export plan:");
    formatter.print_export_plan(
        &config.export.hash_type,
        &config.export.table,
        &cli.resolve_output_path(config),
        &planned,
    );

    formatter.print_separator();
    formatter.success(&format!("{} database(s) ready for export", planned.len()));
    formatter.info("Run without --dry-run to write the hash file");

    0
}

fn print_startup_error(error: &NsrlError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(level) = cli.log_level() {
        builder.filter_level(level);
    }

    // Tests may initialise the logger more than once.
    let _ = builder.try_init();
}
