use clap::{Parser, Subcommand};

mod commands;

use commands::{abuild, build, deploy, gen, lint, test, CmdResult, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "pluginsmith")]
#[command(version = VERSION)]
#[command(about = "Build, test, and publish multi-variant IntelliJ plugin distributions")]
struct Cli {
    /// Release identifier; enables release-mode checks and release paths
    #[arg(long, global = true, value_name = "ID")]
    release: Option<String>,

    /// Run against an alternate root directory (relative path, test mode)
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every declared variant
    Build(build::BuildArgs),
    /// Build via the external ant build description
    Abuild(abuild::AbuildArgs),
    /// Compile tests for every declared variant
    Test(test::TestArgs),
    /// Upload packaged archives to the plugin registry (release mode)
    Deploy(deploy::DeployArgs),
    /// Regenerate the plugin descriptor from its template
    Gen(gen::GenArgs),
    /// Validate the declaration document and descriptor template
    Lint(lint::LintArgs),
}

fn main() -> std::process::ExitCode {
    let Cli {
        release,
        cwd,
        command,
    } = Cli::parse();

    let global = GlobalArgs { release, cwd };

    let code = match command {
        Commands::Build(args) => report(build::run(args, &global)),
        Commands::Abuild(args) => report(abuild::run(args, &global)),
        Commands::Test(args) => report(test::run(args, &global)),
        Commands::Deploy(args) => report(deploy::run(args, &global)),
        Commands::Gen(args) => report(gen::run(args, &global)),
        Commands::Lint(args) => report(lint::run(args, &global)),
    };

    std::process::ExitCode::from(exit_code_to_u8(code))
}

fn report<T>(result: CmdResult<T>) -> i32 {
    match result {
        Ok((_, code)) => code,
        Err(err) => {
            eprintln!("[{}] {}", err.code.as_str(), err.message);
            for hint in &err.hints {
                eprintln!("  hint: {}", hint.message);
            }
            err.status
        }
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
