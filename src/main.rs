use campaign_eda::error_display::user_message_from_report;
use campaign_eda::report::{export_chart, full_report_commands, SectionOutcome};
use campaign_eda::{
    run_report, AppConfig, Args, ConfigManager, LoadOptions, ReportSettings, Session, APP_NAME,
};
use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::LevelFilter;

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    // RUST_LOG still wins when set
    builder.parse_default_env();
    builder.init();
}

/// Handle --generate-config. Returns Some(()) when the program should exit.
fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Configuration written to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

fn run(args: &Args) -> Result<()> {
    let config = AppConfig::load(APP_NAME)?;
    let settings = ReportSettings::from_args_and_config(args, &config)?;
    let options = LoadOptions::from_args_and_config(args, &config);

    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("No input file given"))?;
    let mut session = Session::new();
    let table = session.load(path, &options)?;

    let commands = match &args.command {
        Some(command) => vec![command.clone()],
        None => {
            if settings.chart.is_some() {
                log::warn!("--chart applies to a single command; ignored for the full report");
            }
            full_report_commands()
        }
    };

    // Tables are already cut to max_table_rows before display
    std::env::set_var("POLARS_FMT_MAX_ROWS", (settings.max_table_rows + 1).to_string());
    std::env::set_var("POLARS_FMT_MAX_COLS", "64");

    let report = run_report(&table, &commands, &settings);
    println!("{}", report.render(&settings)?);

    if let (Some(chart_path), Some(_), [section]) = (
        settings.chart.as_deref(),
        args.command.as_ref(),
        report.sections.as_slice(),
    ) {
        if let SectionOutcome::Output(output) = &section.outcome {
            export_chart(output, chart_path, &settings.chart_style)?;
            eprintln!("Chart written to {}", chart_path.display());
        }
    }

    match report.failures() {
        0 => Ok(()),
        1 => Err(eyre!("1 section failed")),
        n => Err(eyre!("{} sections failed", n)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", user_message_from_report(&e));
        std::process::exit(1);
    }
    Ok(())
}
