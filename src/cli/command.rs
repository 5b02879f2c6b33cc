use clap::{Subcommand, ValueEnum};

use crate::content::ContentKind;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Experiences,
    Projects,
    Blogs,
}

impl From<KindArg> for ContentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Experiences => ContentKind::Experience,
            KindArg::Projects => ContentKind::Project,
            KindArg::Blogs => ContentKind::Blog,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedKindArg {
    Experiences,
    Projects,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Insert sample content into empty collections",
        long_about = "Fill the experiences and projects collections with sample rows when they are empty. Collections that already hold rows are left alone."
    )]
    Seed,
    #[command(
        about = "Print a collection as JSON",
        long_about = "Print every row of a collection, in display order, as pretty JSON."
    )]
    List {
        #[arg(value_enum, value_name = "KIND")]
        kind: KindArg,
    },
    #[command(
        about = "Log in as admin",
        long_about = "Prompt for the admin password and, when it matches, persist the logged-in flag in the data dir."
    )]
    Login {
        #[arg(long, value_name = "USER", help = "Username (defaults to --admin-user)")]
        username: Option<String>,
    },
    #[command(about = "Log out and clear the persisted flag")]
    Logout,
    #[command(
        about = "Drag one row onto another",
        long_about = "Move DRAGGED to the position of ONTO and renumber the whole collection. Requires an admin login."
    )]
    Move {
        #[arg(value_enum, value_name = "KIND")]
        kind: OrderedKindArg,
        #[arg(value_name = "DRAGGED")]
        dragged: i64,
        #[arg(long, value_name = "ONTO")]
        onto: i64,
    },
}
