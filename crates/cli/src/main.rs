mod overrides;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use fluentgen_engine::{GeneratorContract, GeneratorFactory, ReturnType};
use tracing::debug;

fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("build", sub)) => run_build(sub),
        Some(("describe", sub)) => run_describe(sub),
        other => bail!("unsupported subcommand: {:?}", other.map(|(name, _)| name)),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cli() -> Command {
    let file = || {
        Arg::new("file")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Path to a YAML or JSON contract definition")
    };

    Command::new("fluentgen")
        .about("Build JSON documents from fluent generator contracts")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Bind properties and print the generated documents")
                .arg(file())
                .arg(
                    Arg::new("set")
                        .long("set")
                        .short('s')
                        .value_name("KEY=VALUE")
                        .action(ArgAction::Append)
                        .help("Bind a literal; VALUE is parsed as JSON, falling back to a string"),
                )
                .arg(
                    Arg::new("sequence")
                        .long("sequence")
                        .value_name("KEY=PREFIX")
                        .action(ArgAction::Append)
                        .help("Bind PREFIX1, PREFIX2, ... across builds"),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .value_parser(value_parser!(usize))
                        .default_value("1")
                        .help("Number of documents to build"),
                )
                .arg(Arg::new("pretty").long("pretty").action(ArgAction::SetTrue).help("Pretty-print each document")),
        )
        .subcommand(Command::new("describe").about("Print the methods a contract declares").arg(file()))
}

fn load(factory: &GeneratorFactory, matches: &ArgMatches) -> Result<GeneratorContract> {
    let file = matches.get_one::<PathBuf>("file").context("missing contract file")?;
    factory.load_contract(file)
}

fn run_build(matches: &ArgMatches) -> Result<()> {
    let factory = GeneratorFactory::new();
    let contract = load(&factory, matches)?;
    let mut generator = factory.create_generator(contract);

    overrides::apply(
        &mut generator,
        matches.get_many::<String>("set").into_iter().flatten(),
        matches.get_many::<String>("sequence").into_iter().flatten(),
    )?;

    let count = matches.get_one::<usize>("count").copied().unwrap_or(1);
    let pretty = matches.get_flag("pretty");
    debug!(contract = %generator.contract().name(), count, bindings = generator.bindings().len(), "building documents");

    for _ in 0..count {
        let document = generator.document()?;
        let rendered = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        println!("{rendered}");
    }
    Ok(())
}

fn run_describe(matches: &ArgMatches) -> Result<()> {
    let factory = GeneratorFactory::new();
    let contract = load(&factory, matches)?;
    let naming = contract.naming().unwrap_or(factory.naming());

    println!("contract: {}", contract.name());
    match contract.target() {
        Some(target) => println!("target: {target}"),
        None => println!("target: (generic, pass a type to the terminal call)"),
    }
    println!("terminal: {}", contract.names().terminal.join(", "));
    println!("constructor: {}", contract.names().constructor);
    println!("methods:");
    for setter in contract.setters() {
        let parameter = setter.parameter();
        let returns = match setter.returns() {
            ReturnType::Contract | ReturnType::Untyped => "chains".to_string(),
            ReturnType::Unit => "unit".to_string(),
            ReturnType::Type(key) => key.to_string(),
        };
        println!(
            "  {}({}{}) -> {returns}  [mutator {}]",
            setter.name(),
            parameter.kind,
            if parameter.provider { " provider" } else { "" },
            naming.mutator_name(setter.name())
        );
    }

    let defaults: Vec<_> = contract.default_methods().map(|method| method.name()).collect();
    if !defaults.is_empty() {
        println!("default methods: {}", defaults.join(", "));
    }
    Ok(())
}
