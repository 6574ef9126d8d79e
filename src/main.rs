use clap::Parser;
use sqlseal::cli::{commands, init_logging, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Create {
            ref password,
            ref output,
            force,
        } => commands::create::execute(password.as_deref(), output.as_deref(), force),
        Commands::Verify {
            ref file,
            ref password,
        } => commands::verify::execute(file, password.as_deref()),
        Commands::Decrypt {
            ref file,
            ref output,
            ref password,
            force,
        } => commands::decrypt::execute(file, output, password.as_deref(), force),
        Commands::Inspect { ref file, json } => commands::inspect::execute(file, json),
        Commands::Detect { ref file, json } => commands::detect::execute(file, json),
        Commands::Version => commands::version::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        sqlseal::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
