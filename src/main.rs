use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use jfrag::diagnostics::render_error;
use jfrag::wrap::{FragmentKind, check_embeddable, wrap_expression, wrap_statement};
use jfrag::{HarnessConfig, HarnessError, JavaVersion, NodeKind, ParsingContext, version};

#[derive(Parser)]
#[command(name = "jfrag", version, about = "Inspect how Java fragments parse across language versions")]
struct Cli {
    /// Harness config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap and parse an expression fragment
    Expr(FragmentArgs),
    /// Wrap and parse a statement fragment (include its trailing `;`)
    Stmt(FragmentArgs),
    /// List the versions between two endpoints, inclusive
    Versions {
        from: JavaVersion,
        to: JavaVersion,
    },
}

#[derive(Args)]
struct FragmentArgs {
    /// Java source fragment
    fragment: String,

    /// Java version to parse under (defaults to the config's default_version)
    #[arg(long)]
    java: Option<JavaVersion>,

    /// Import as written after `import`, e.g. java.util.List (repeatable)
    #[arg(long = "import")]
    imports: Vec<String>,

    /// Node kind to locate on the fragment's straight line
    #[arg(long)]
    locate: Option<NodeKind>,

    /// Print the tree as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let config = match &cli.config {
        Some(path) => HarnessConfig::load(path),
        None => Ok(HarnessConfig::default()),
    };

    let result = config.and_then(|config| match cli.command {
        Commands::Expr(args) => inspect(FragmentKind::Expression, &args, &config),
        Commands::Stmt(args) => inspect(FragmentKind::Statement, &args, &config),
        Commands::Versions { from, to } => {
            let names: Vec<&str> = version::range(from, to).into_iter().map(JavaVersion::name).collect();
            println!("{}", names.join(" "));
            Ok(())
        }
    });

    if let Err(err) = result {
        render_error(&err);
        std::process::exit(1);
    }
}

fn inspect(kind: FragmentKind, args: &FragmentArgs, config: &HarnessConfig) -> Result<(), HarnessError> {
    let version = args.java.unwrap_or(config.default_version);
    let mut ctx = ParsingContext::new(version).with_config(config.clone());
    for import in &args.imports {
        ctx.import(import.as_str())?;
    }

    let fragment = args.fragment.as_str();
    let node = match (kind, args.locate) {
        (FragmentKind::Expression, Some(target)) => ctx.parse_expression(fragment, target)?,
        (FragmentKind::Statement, Some(target)) => ctx.parse_statement(fragment, target)?,
        (_, None) => {
            check_embeddable(fragment, kind)?;
            let unit = match kind {
                FragmentKind::Expression => wrap_expression(fragment, &ctx.imports()),
                FragmentKind::Statement => wrap_statement(fragment, &ctx.imports()),
            };
            ctx.parse_unit(&unit)?
        }
    };

    if args.json {
        let text = serde_json::to_string_pretty(&node)
            .map_err(|e| HarnessError::malformed(format!("cannot serialize tree: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", node.dump());
    }
    Ok(())
}
