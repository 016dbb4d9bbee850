use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tk")]
#[command(about = "Track time spent on projects", long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new project
    New {
        /// Project name
        name: Option<String>,
    },

    /// Start a project by reference or ID, or create one by name
    Start {
        /// Reference, ID or new project name (defaults to reference 0)
        target: Option<String>,
    },

    /// Stop the current project
    Stop,

    /// Context-aware start/stop
    #[command(name = "s")]
    Toggle {
        /// Reference, ID or new project name (defaults to reference 0)
        target: Option<String>,
    },

    /// List projects
    #[command(visible_aliases = ["ls", "l"])]
    List {
        /// List all active projects
        #[arg(short, long)]
        all: bool,

        /// List all projects, including archived
        #[arg(short = 'A', long)]
        all_archived: bool,

        /// List the first n projects
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Archive (or unarchive) projects
    #[command(visible_alias = "a")]
    Archive {
        /// References or IDs (defaults to reference 0)
        refs: Vec<String>,
    },

    /// Remove projects
    #[command(visible_aliases = ["rm", "r"])]
    Remove {
        /// Remove all projects
        #[arg(short, long)]
        all: bool,

        /// References or IDs (defaults to reference 0)
        refs: Vec<String>,
    },

    /// Show a summary of the current week
    Week,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Initialize default configuration
    Init,
    /// Open configuration file in editor
    Edit,
    /// Show current configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::try_parse_from(["tk", "ls", "-A", "-n", "3"]).unwrap();
        match cli.command {
            Some(Commands::List {
                all,
                all_archived,
                limit,
            }) => {
                assert!(!all);
                assert!(all_archived);
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected list"),
        }

        let cli = Cli::try_parse_from(["tk", "rm", "--all"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Remove { all: true, .. })));

        let cli = Cli::try_parse_from(["tk", "a", "1", "2"]).unwrap();
        match cli.command {
            Some(Commands::Archive { refs }) => assert_eq!(refs, vec!["1", "2"]),
            _ => panic!("expected archive"),
        }
    }

    #[test]
    fn test_toggle_and_default() {
        let cli = Cli::try_parse_from(["tk", "s", "Write spec"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Toggle { target: Some(ref t) }) if t == "Write spec"
        ));

        let cli = Cli::try_parse_from(["tk", "--no-color"]).unwrap();
        assert!(cli.no_color);
        assert!(cli.command.is_none());
    }
}
