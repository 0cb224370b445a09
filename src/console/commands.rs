//! Command handlers

use core::fmt::Write;

use super::parser::ParsedCommand;
use super::shell::Shell;
use super::ConsoleError;
use crate::cipher::{EncryptionContext, MapVariant};
use crate::config::{self, Direction, EncryptionParams, MapSeed, MAX_MESSAGE_BYTES};

/// Command handler signature
pub type Handler =
    fn(&ParsedCommand<'_>, &mut Shell<'_>, &mut dyn Write) -> Result<(), ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    /// Short form accepted in place of `name`
    pub alias: Option<&'static str>,
    pub usage: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", alias: None, usage: "help [cmd]", brief: "List commands", handler: cmd_help },
    CommandDescriptor {
        name: "set_encryption",
        alias: Some("se"),
        usage: "se -TX|-RX <duffing|logistic|mccm> <x1> <y1> <it1> <x2> <y2> <it2>",
        brief: "Seed a direction's keystream",
        handler: cmd_set_encryption,
    },
    CommandDescriptor { name: "get_encryption", alias: Some("ge"), usage: "ge -TX|-RX", brief: "Show a direction's keystream state (RX: as seeded, not live)", handler: cmd_get_encryption },
    CommandDescriptor { name: "transmit", alias: Some("t"), usage: "t <data>", brief: "Encrypt and send data", handler: cmd_transmit },
    CommandDescriptor { name: "clear", alias: Some("c"), usage: "clear", brief: "Clear the screen", handler: cmd_clear },
    CommandDescriptor { name: "freq", alias: Some("f"), usage: "freq", brief: "Show link bit rate", handler: cmd_freq },
    CommandDescriptor { name: "stats", alias: None, usage: "stats", brief: "Link statistics", handler: cmd_stats },
    CommandDescriptor { name: "save", alias: None, usage: "save", brief: "Persist encryption params to NVS", handler: cmd_save },
    CommandDescriptor { name: "reboot", alias: None, usage: "reboot confirm", brief: "Restart system", handler: cmd_reboot },
];

/// Map names offered by tab completion
pub const MAP_NAMES: &[&str] = &["duffing", "logistic", "mccm"];

/// Direction flags offered by tab completion
pub const DIRECTION_FLAGS: &[&str] = &["-TX", "-RX"];

/// Look up a command by name or alias
pub fn find(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS
        .iter()
        .find(|c| c.name == name || c.alias == Some(name))
}

/// Execute a parsed command
pub fn execute(
    cmd: &ParsedCommand<'_>,
    shell: &mut Shell<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if cmd.command.is_empty() {
        return Ok(()); // Empty line, do nothing
    }

    let descriptor = find(cmd.command).ok_or(ConsoleError::UnknownCommand)?;
    (descriptor.handler)(cmd, shell, out)
}

/// Get all command names for completion (aliases are not offered)
pub fn command_names() -> impl Iterator<Item = &'static str> + Clone {
    COMMANDS.iter().map(|c| c.name)
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, _shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        let c = find(name).ok_or(ConsoleError::UnknownCommand)?;
        let _ = writeln!(out, "{}: {}", c.name, c.brief);
        let _ = writeln!(out, "usage: {}", c.usage);
    } else {
        for c in COMMANDS {
            match c.alias {
                Some(alias) => {
                    let _ = writeln!(out, "  {:<16} [{:<2}] {}", c.name, alias, c.brief);
                }
                None => {
                    let _ = writeln!(out, "  {:<16}      {}", c.name, c.brief);
                }
            }
        }
    }
    Ok(())
}

fn direction_arg(cmd: &ParsedCommand<'_>) -> Result<Direction, ConsoleError> {
    cmd.arg(0)
        .and_then(Direction::parse)
        .ok_or(ConsoleError::DirectionRequired)
}

fn number<T: core::str::FromStr>(cmd: &ParsedCommand<'_>, idx: usize) -> Result<T, ConsoleError> {
    cmd.arg(idx)
        .ok_or(ConsoleError::MissingArg)?
        .parse()
        .map_err(|_| ConsoleError::InvalidValue)
}

/// Parse `<map> <x1> <y1> <it1> <x2> <y2> <it2>` starting at argument 1.
fn params_args(cmd: &ParsedCommand<'_>) -> Result<EncryptionParams, ConsoleError> {
    let variant = MapVariant::parse(cmd.arg(1).ok_or(ConsoleError::MissingArg)?)
        .ok_or(ConsoleError::InvalidValue)?;
    let map1 = MapSeed::new(number(cmd, 2)?, number(cmd, 3)?, number(cmd, 4)?);
    let map2 = MapSeed::new(number(cmd, 5)?, number(cmd, 6)?, number(cmd, 7)?);
    Ok(EncryptionParams::new(variant, map1, map2))
}

fn cmd_set_encryption(cmd: &ParsedCommand<'_>, shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let direction = direction_arg(cmd)?;
    let params = params_args(cmd)?;

    let applied = shell.configure(direction, params).map_err(|e| {
        let _ = writeln!(out, "{}", e);
        ConsoleError::OutOfRange
    })?;

    let _ = writeln!(
        out,
        "{} encryption: {} map1=({}, {}) x{} map2=({}, {}) x{}",
        direction,
        applied.variant,
        applied.map1.x,
        applied.map1.y,
        applied.map1.iterations,
        applied.map2.x,
        applied.map2.y,
        applied.map2.iterations
    );
    Ok(())
}

fn print_context(out: &mut dyn Write, direction: Direction, ctx: &EncryptionContext) {
    let map1 = ctx.map1();
    let map2 = ctx.map2();
    let generator = ctx.generator();
    let _ = writeln!(out, "{} map: {}", direction, ctx.variant());
    let _ = writeln!(
        out,
        "  map1: x={} y={} iterations={}",
        map1.state.x, map1.state.y, map1.iterations
    );
    let _ = writeln!(
        out,
        "  map2: x={} y={} iterations={}",
        map2.state.x, map2.state.y, map2.iterations
    );
    let _ = writeln!(
        out,
        "  msws: x={:016X} w={:016X} s={:016X}",
        generator.x, generator.w, generator.s
    );
}

fn cmd_get_encryption(cmd: &ParsedCommand<'_>, shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let direction = direction_arg(cmd)?;
    let ctx = shell
        .context(direction)
        .ok_or(ConsoleError::NotConfigured)?;
    print_context(out, direction, ctx);
    if direction == Direction::Rx {
        let _ = writeln!(out, "  (as seeded)");
    }
    Ok(())
}

fn cmd_transmit(cmd: &ParsedCommand<'_>, shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let data = cmd.rest.as_bytes();
    if data.is_empty() {
        return Err(ConsoleError::MissingArg);
    }
    if data.len() > MAX_MESSAGE_BYTES {
        return Err(ConsoleError::OutOfRange);
    }
    if !shell.is_configured(Direction::Rx) {
        return Err(ConsoleError::NotConfigured);
    }

    let queued = shell.transmit(data).ok_or(ConsoleError::NotConfigured)?;
    let _ = writeln!(out, "queued {} bytes in {} words", data.len(), queued.words);
    if queued.dropped > 0 {
        let _ = writeln!(out, "TX ring full: {} words dropped", queued.dropped);
    }
    Ok(())
}

fn cmd_clear(_cmd: &ParsedCommand<'_>, _shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let _ = write!(out, "\x1B[2J\x1B[H");
    Ok(())
}

fn cmd_freq(_cmd: &ParsedCommand<'_>, _shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let _ = writeln!(
        out,
        "link: {} Hz ({} us/bit)",
        config::link_frequency_hz(),
        config::BIT_PERIOD_US
    );
    Ok(())
}

fn cmd_stats(_cmd: &ParsedCommand<'_>, shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let _ = writeln!(out, "{}", shell.stats());

    #[cfg(target_os = "espidf")]
    {
        let uptime_us = crate::hal::esp::now_us();
        // SAFETY: Read-only query of the heap allocator, callable from any task.
        let heap_free = unsafe { esp_idf_svc::sys::esp_get_free_heap_size() };
        let _ = writeln!(out, "uptime: {}s", uptime_us / 1_000_000);
        let _ = writeln!(out, "heap: {} bytes free", heap_free);
    }

    Ok(())
}

fn cmd_save(_cmd: &ParsedCommand<'_>, shell: &mut Shell<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    match shell.save() {
        Ok(true) => {
            let _ = writeln!(out, "saved");
            Ok(())
        }
        Ok(false) => {
            let _ = writeln!(out, "no storage attached");
            Err(ConsoleError::NvsError)
        }
        Err(e) => {
            log::error!("save failed: {}", e);
            Err(ConsoleError::NvsError)
        }
    }
}

fn cmd_reboot(cmd: &ParsedCommand<'_>, _shell: &mut Shell<'_>, _out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.arg(0) != Some("confirm") {
        return Err(ConsoleError::RequiresConfirm);
    }

    // SAFETY: No preconditions; the chip resets and the call never returns.
    #[cfg(target_os = "espidf")]
    unsafe {
        esp_idf_svc::sys::esp_restart();
    }

    Ok(())
}
