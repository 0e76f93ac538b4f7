use anyhow::{anyhow, Context};
use clap::Parser;
use drumbrute_pedal::{
    app,
    cli::{preselect_port, select_port_from_menu, validate_port, Args},
    create_shared_state, handle_device_list, logging,
    midi::{list_input_ports, list_output_ports, query_port, PortSelection},
    store::{self, StateStore},
    Config,
};
use std::path::PathBuf;
use std::sync::Arc;

fn main() {
    let args = Args::parse();
    initialize_logging(&args);

    if args.device_list {
        list_available_devices();
        return;
    }

    if let Err(e) = run(args) {
        log::error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn initialize_logging(args: &Args) {
    let level = args
        .log_level
        .clone()
        .or_else(|| std::env::var(logging::LOG_LEVEL_ENV).ok());
    let log_file = args
        .log_file
        .clone()
        .or_else(|| std::env::var(logging::LOG_FILE_ENV).ok().map(PathBuf::from));

    let level = logging::parse_level(level.as_deref());
    if let Err(e) = logging::init_logger(level, log_file.as_deref()) {
        eprintln!("Logger initialization failed: {}", e);
        std::process::exit(1);
    }
    log::info!("Application starting");
}

fn list_available_devices() {
    println!("Available MIDI ports:");
    for device in handle_device_list() {
        println!("  {}", device);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;

    let db_path = args.db_file_path.clone().unwrap_or_else(|| config.db_path());
    let store: Arc<dyn StateStore> = Arc::from(
        store::open_store(&db_path)
            .with_context(|| format!("Failed to open state store at {}", db_path.display()))?,
    );

    let ports = select_ports(&args, &config, store.as_ref())?;
    let tempo = create_shared_state(&config, store.as_ref());
    log::info!(
        "LAST PATTERN:{} BPM:{}",
        tempo.pattern_index() + 1,
        tempo.tempo()
    );

    app::run(&config, tempo, store, ports)
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if args.input_query.is_some() {
        config.input_query = args.input_query.clone();
    }
    if args.output_query.is_some() {
        config.output_query = args.output_query.clone();
    }
    config.validate()?;
    Ok(config)
}

fn select_ports(
    args: &Args,
    config: &Config,
    store: &dyn StateStore,
) -> anyhow::Result<PortSelection> {
    let inputs = list_input_ports()?;
    let outputs = list_output_ports()?;
    if inputs.is_empty() || outputs.is_empty() {
        return Err(anyhow!(
            "No MIDI ports available ({} inputs, {} outputs)",
            inputs.len(),
            outputs.len()
        ));
    }

    if args.auto_select {
        log::info!("Auto-selecting MIDI ports...");
    }
    let queried_input = config
        .input_query
        .as_deref()
        .and_then(|q| query_port(&inputs, q));
    let queried_output = config
        .output_query
        .as_deref()
        .and_then(|q| query_port(&outputs, q));

    let mut input = preselect_port(
        args.input_port,
        queried_input,
        store.input_port(),
        args.auto_select,
    );
    let mut output = preselect_port(
        args.output_port,
        queried_output,
        store.output_port(),
        args.auto_select,
    );

    if args.interactive() {
        input = Some(select_port_from_menu(&inputs, input, "midi input")?);
        output = Some(select_port_from_menu(&outputs, output, "midi output")?);
    }

    let input = validate_port("input", input, &inputs).map_err(|e| anyhow!(e))?;
    let output = validate_port("output", output, &outputs).map_err(|e| anyhow!(e))?;
    store.set_input_port(input)?;
    store.set_output_port(output)?;

    log::info!(
        "Selected MIDI ports: INPUT {} ({}) OUTPUT {} ({})",
        input,
        inputs[input],
        output,
        outputs[output]
    );
    Ok(PortSelection::new(input, output))
}
