mod cli;
mod tui;

pub(crate) use cli::{as_cli, parse_parent, shellexpand};
pub(crate) use tui::as_tui;
