use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// User-facing error line on stderr, colored when attached to a terminal
pub fn error(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{} {}", "jn:".red().bold(), message);
    } else {
        eprintln!("jn: {}", message);
    }
}

/// Progress note on stderr; stdout stays reserved for data
pub fn note(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}", message.dimmed());
    } else {
        eprintln!("{}", message);
    }
}
