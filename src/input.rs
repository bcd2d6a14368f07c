use crate::event_loop::HostEvent;
use crate::host::ControllerKind;

/// Context used when a command line does not name one.
pub const DEFAULT_CONTEXT: &str = "panel-1";

pub const HELP: &str = "+N/-N: turn dial | m: press dial | t: tap | h: hold | \
a/d: attach/detach panel | append @name to target another panel | q: quit";

/// Maps one typed line to a host event, the way a panel would report it.
///
/// A trailing `@name` targets another panel, e.g. `+5@panel-2`.
pub fn map_line(line: &str, controller: ControllerKind) -> Option<HostEvent> {
    let line = line.trim();
    let (command, context) = match line.split_once('@') {
        Some((command, context)) if !context.trim().is_empty() => {
            (command.trim(), context.trim().to_string())
        }
        Some(_) => return None,
        None => (line, DEFAULT_CONTEXT.to_string()),
    };

    match command {
        "m" | "M" => Some(HostEvent::DialDown { context }),
        "t" | "T" => Some(HostEvent::TouchTap {
            context,
            hold: false,
        }),
        "h" | "H" => Some(HostEvent::TouchTap {
            context,
            hold: true,
        }),
        "a" | "A" => Some(HostEvent::WillAppear {
            context,
            controller,
        }),
        "d" | "D" => Some(HostEvent::WillDisappear { context }),
        "q" | "Q" => Some(HostEvent::Shutdown),
        _ if command.starts_with('+') || command.starts_with('-') => command
            .parse::<i32>()
            .ok()
            .map(|ticks| HostEvent::DialRotate { context, ticks }),
        _ => None,
    }
}
