mod cli;
mod tui;

pub(crate) use cli::{as_cli, expand_home, parse_add_args};
pub(crate) use tui::as_tui;
