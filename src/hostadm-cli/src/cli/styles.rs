//! CLI styling for the usage output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme: bold cyan headers, green literals, yellow placeholders.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section documenting the well-known variables.
pub const AFTER_HELP: &str = color_print::cstr!(
    r#"<cyan,bold>Variables</> (set with <green,bold>--var</> <yellow>KEY=VALUE</>)
    <yellow>CONFDIR</>      Configuration directory (default: /etc/hostadm)
    <yellow>CONFIG</>       Configuration file (default: ${CONFDIR}/hostadm.toml)
    <yellow>SCRIPTDIR</>    Script library directory (default: /usr/share/hostadm/lua)

<cyan,bold>Environment</>
    <yellow>HOSTADM_LOG_LEVEL</>    Log verbosity (error, warn, info, debug, trace)
    <yellow>RUST_LOG</>             Full tracing filter, overrides the above

<cyan,bold>Commands</>
    <green,bold>hostadm help</>                 List available commands
    <green,bold>hostadm help</> <yellow>command</>         Show help for a command"#
);
