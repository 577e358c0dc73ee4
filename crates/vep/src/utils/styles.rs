use anstyle::{AnsiColor, Color, Style};
use clap::builder::Styles;

use crate::utils::{CHECK, MARK, WARN};

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Magenta)));
    let failure = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(failure)
        .error(failure)
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

fn fmt_style(msg: &str, style: &Style) -> String {
    format!("{style}{msg}{style:#}")
}

fn fmt_color(msg: &str, color: AnsiColor) -> String {
    fmt_style(msg, &Style::new().fg_color(Some(Color::Ansi(color))))
}

pub(crate) fn fmt_green(msg: &str) -> String {
    fmt_color(msg, AnsiColor::Green)
}

pub(crate) fn fmt_cyan(msg: &str) -> String {
    fmt_color(msg, AnsiColor::BrightCyan)
}

pub(crate) fn fmt_red(msg: &str) -> String {
    fmt_color(msg, AnsiColor::Red)
}

pub(crate) fn fmt_yellow(msg: &str) -> String {
    fmt_color(msg, AnsiColor::Yellow)
}

pub(crate) fn fmt_bold(msg: &str) -> String {
    fmt_style(msg, &Style::new().bold())
}

pub(crate) fn fmt_dimmed(msg: &str) -> String {
    fmt_style(msg, &Style::new().dimmed())
}

pub(crate) fn fmt_success(msg: &str) -> String {
    format!("{} {msg}", fmt_green(CHECK))
}

pub(crate) fn fmt_error(msg: &str) -> String {
    format!("{} {msg}", fmt_red(MARK))
}

pub(crate) fn fmt_warning(msg: &str) -> String {
    format!("{} {msg}", fmt_yellow(WARN))
}
