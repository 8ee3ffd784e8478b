use clap::{Parser, Subcommand};

/// Rebelle admin - data source diagnostics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Borrow a pooled connection and print the server version
    Check {
        /// Data source name (default: "JDBC/FRENCHY")
        #[arg(short, long)]
        name: Option<String>,

        /// Number of connections to borrow at the same time
        #[arg(short, long, default_value = "1")]
        concurrency: usize,
    },

    /// List data sources bound in the environment context
    Bindings {
        /// Show database passwords
        #[arg(long)]
        show_secrets: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let args = Args::try_parse_from(["rebelle-admin", "check"]).unwrap();
        match args.command {
            Command::Check { name, concurrency } => {
                assert_eq!(name, None);
                assert_eq!(concurrency, 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_with_name() {
        let args =
            Args::try_parse_from(["rebelle-admin", "check", "--name", "JDBC/REPORTS", "-c", "4"]).unwrap();
        match args.command {
            Command::Check { name, concurrency } => {
                assert_eq!(name.as_deref(), Some("JDBC/REPORTS"));
                assert_eq!(concurrency, 4);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bindings_flag() {
        let args = Args::try_parse_from(["rebelle-admin", "bindings", "--show-secrets"]).unwrap();
        assert!(matches!(args.command, Command::Bindings { show_secrets: true }));
    }
}
