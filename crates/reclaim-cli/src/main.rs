use clap::{Parser, Subcommand};

mod commands;
mod telemetry;

#[derive(Parser)]
#[command(name = "reclaim-cli", version, about = "Reclaim CLI")]
struct Cli {
    /// User the command applies to
    #[arg(long, global = true, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity logging
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Recovery score
    Score {
        #[command(subcommand)]
        action: commands::score::ScoreAction,
    },
    /// Sobriety tracking and milestones
    Sobriety {
        #[command(subcommand)]
        action: commands::sobriety::SobrietyAction,
    },
    /// Daily encouragement message
    Daily {
        #[command(subcommand)]
        action: commands::daily::DailyAction,
    },
    /// Reset the thermometer: delete all activities in the window
    Reset {
        /// Window length in days (defaults to the configured window)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    telemetry::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Activity { action } => commands::activity::run(&cli.user, action),
        Commands::Score { action } => commands::score::run(&cli.user, action),
        Commands::Sobriety { action } => commands::sobriety::run(&cli.user, action),
        Commands::Daily { action } => commands::daily::run(&cli.user, action),
        Commands::Reset { days } => commands::reset::run(&cli.user, days),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
