use super::enums::TemplateArg;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Open the interactive console (default)")]
    Console {
        /// Use the built-in demo tenant instead of Azure
        #[arg(long)]
        demo: bool,
    },

    #[command(about = "Print a recommended CAF structure")]
    Template {
        #[arg(value_enum)]
        template: TemplateArg,

        /// Subscription name to place under the Corp management group
        #[arg(long)]
        subscription: Option<String>,
    },

    #[command(about = "Compare the current hierarchy with a recommended structure")]
    Compare {
        #[arg(value_enum)]
        template: TemplateArg,

        #[arg(long)]
        demo: bool,

        /// Total output width (defaults to the terminal width)
        #[arg(long)]
        width: Option<usize>,
    },

    #[command(about = "Authenticate and print the Azure environment summary")]
    Status {
        #[arg(long)]
        demo: bool,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Console { .. } => "console",
            Commands::Template { .. } => "template",
            Commands::Compare { .. } => "compare",
            Commands::Status { .. } => "status",
        }
    }
}
