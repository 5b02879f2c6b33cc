mod args;
mod command;

pub use args::Cli;
pub use command::{Command, KindArg, OrderedKindArg};

pub use args::parse;
