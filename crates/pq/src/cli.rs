//! CLI argument parsing using clap derive macros.

use clap::Parser;

/// pq - translate filter strings into query predicates
#[derive(Parser, Debug)]
#[command(name = "pq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Filter string to translate (e.g. "mtime>=2019-04-23 AND label LIKE 'calc%'")
    #[arg(required_unless_present = "grammar")]
    pub filter: Option<String>,

    /// Validate property paths against this entity kind's fields
    /// (e.g. Node, Computer, User)
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Compact single-line JSON output
    #[arg(long)]
    pub compact: bool,

    /// Print the filter grammar and exit
    #[arg(long)]
    pub grammar: bool,

    /// Disable colors in output
    #[arg(long)]
    pub no_color: bool,
}
